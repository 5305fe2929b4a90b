//! Picks a point worth zooming into from a computed iteration field.
//!
//! Used by auto-exploration: high escape counts sit close to the set
//! boundary, and a neighbourhood with a wide spread of counts is where the
//! detail is.

use rand::Rng;
use tracing::{debug, warn};

use crate::escape::MAX_ITER;

/// Candidates kept by the reservoir.
const RESERVOIR_SIZE: usize = 100;
/// How far below the highest escape count a pixel may be and still qualify.
const THRESHOLD_BAND: u32 = 5;
/// Fraction of the best-scoring candidates the final pick is drawn from.
const TOP_FRACTION: f64 = 0.2;

/// Result of [`ZoomPointChooser::find_interesting_point`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomPoint {
    pub x: u32,
    pub y: u32,
    /// `false` when no interesting point was found and `(x, y)` is the
    /// field centre.
    pub found: bool,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    x: u32,
    y: u32,
    score: i64,
}

/// Chooser for fields of a fixed pixel size.
#[derive(Debug, Clone, Copy)]
pub struct ZoomPointChooser {
    width: u32,
    height: u32,
}

impl ZoomPointChooser {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn center(&self) -> ZoomPoint {
        ZoomPoint {
            x: self.width / 2,
            y: self.height / 2,
            found: false,
        }
    }

    /// Choose a pixel near the set boundary whose surroundings show a wide
    /// spread of escape counts.
    ///
    /// `data` is a row-major `width × height` field. The neighbourhood scored
    /// around each candidate is `rect_width × rect_height`, which should be
    /// the rectangle the caller intends to zoom into.
    pub fn find_interesting_point<R: Rng + ?Sized>(
        &self,
        data: &[u32],
        rect_width: u32,
        rect_height: u32,
        rng: &mut R,
    ) -> ZoomPoint {
        let width = self.width as usize;
        let pixel_count = width * self.height as usize;
        if data.len() < pixel_count {
            warn!(
                len = data.len(),
                expected = pixel_count,
                "iteration field smaller than chooser size"
            );
            return self.center();
        }
        let field = &data[..pixel_count];

        let max_found = field
            .iter()
            .copied()
            .filter(|&v| v < MAX_ITER)
            .max()
            .unwrap_or(0);
        if max_found == 0 {
            return self.center();
        }

        let threshold = max_found.saturating_sub(THRESHOLD_BAND);

        // Reservoir sample over qualifying pixels in row-major order.
        let mut sampled: Vec<(u32, u32)> = Vec::with_capacity(RESERVOIR_SIZE);
        let mut count = 0usize;
        for (p, &value) in field.iter().enumerate() {
            if value < threshold || value >= MAX_ITER {
                continue;
            }
            count += 1;
            let point = ((p % width) as u32, (p / width) as u32);
            if sampled.len() < RESERVOIR_SIZE {
                sampled.push(point);
            } else {
                let j = rng.gen_range(0..count);
                if j < RESERVOIR_SIZE {
                    sampled[j] = point;
                }
            }
        }

        let mut candidates: Vec<Candidate> = sampled
            .into_iter()
            .filter_map(|(x, y)| {
                let score = self.diversity_score(field, x, y, rect_width, rect_height);
                (score > 0).then_some(Candidate { x, y, score })
            })
            .collect();

        if candidates.is_empty() {
            return self.center();
        }

        candidates.sort_by(|a, b| b.score.cmp(&a.score));
        let top = ((candidates.len() as f64 * TOP_FRACTION) as usize).max(1);
        let pick = candidates[rng.gen_range(0..top)];

        debug!(
            qualifying = count,
            candidates = candidates.len(),
            x = pick.x,
            y = pick.y,
            score = pick.score,
            "zoom point chosen"
        );

        ZoomPoint {
            x: pick.x,
            y: pick.y,
            found: true,
        }
    }

    /// `(max - min) * max` over the escaping pixels of a rectangle centred
    /// on `(cx, cy)` and clamped to the field. Zero or negative when the
    /// rectangle holds no escaping pixels.
    fn diversity_score(
        &self,
        data: &[u32],
        cx: u32,
        cy: u32,
        rect_width: u32,
        rect_height: u32,
    ) -> i64 {
        let x = cx as i64 - rect_width as i64 / 2;
        let y = cy as i64 - rect_height as i64 / 2;
        let x1 = x.max(0) as usize;
        let y1 = y.max(0) as usize;
        let x2 = (x + rect_width as i64).clamp(0, self.width as i64) as usize;
        let y2 = (y + rect_height as i64).clamp(0, self.height as i64) as usize;

        let width = self.width as usize;
        let mut min = MAX_ITER as i64;
        let mut max = 0i64;
        for py in y1..y2 {
            for &value in &data[py * width + x1..py * width + x2.max(x1)] {
                if value < MAX_ITER {
                    min = min.min(value as i64);
                    max = max.max(value as i64);
                }
            }
        }

        (max - min) * max
    }
}
