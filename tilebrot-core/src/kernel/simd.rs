use tracing::trace;

use super::{Kernel, PROGRESS_ROWS};
use crate::escape::MAX_ITER;
use crate::storage::StorageBuffer;
use crate::viewport::Viewport;

/// Pixels iterated together. Eight `f64` lanes fill one AVX-512 register or
/// two AVX2 registers.
pub const LANES: usize = 8;

/// Batched kernel laid out for auto-vectorisation.
///
/// Each row is cut into batches of [`LANES`] pixels. Lanes carry an
/// active mask instead of breaking out individually: an escaped lane stops
/// advancing its counter and its `z`, while the batch keeps stepping until
/// every lane is inactive. The arithmetic is the same as
/// [`escape_time`](crate::escape_time) so results match the scalar kernel
/// bit for bit.
#[derive(Debug, Clone)]
pub struct SimdKernel {
    viewport: Viewport,
    storage: StorageBuffer,
    speed_mode: bool,
}

impl SimdKernel {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: Viewport::new(width, height),
            storage: StorageBuffer::new(width, height),
            speed_mode: false,
        }
    }
}

/// Iterate one batch. Lanes at or beyond `active` are padding and start
/// inactive; their counts are meaningless.
#[inline]
fn iterate_batch(cr: &[f64; LANES], ci: &[f64; LANES], active: usize) -> [u64; LANES] {
    let mut zr = *cr;
    let mut zi = *ci;
    let mut iters = [0u64; LANES];
    let mut mask = [0u64; LANES];
    for (lane, m) in mask.iter_mut().enumerate() {
        *m = (lane < active) as u64;
    }

    for _ in 0..MAX_ITER {
        for lane in 0..LANES {
            let r2 = zr[lane] * zr[lane];
            let i2 = zi[lane] * zi[lane];
            let ri = zr[lane] * zi[lane];

            let next_zr = r2 - i2 + cr[lane];
            let next_zi = ri + ri + ci[lane];

            let escaped = (r2 + i2 >= 4.0) as u64;
            mask[lane] &= escaped ^ 1;

            let keep = mask[lane] == 1;
            zr[lane] = if keep { next_zr } else { zr[lane] };
            zi[lane] = if keep { next_zi } else { zi[lane] };
            iters[lane] += mask[lane];
        }

        // Reduce outside the lane loop so it stays vectorisable.
        let any_active = mask.iter().fold(0, |acc, &m| acc | m);
        if any_active == 0 {
            break;
        }
    }

    iters
}

impl Kernel for SimdKernel {
    fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    fn compute(&mut self, on_progress: &mut dyn FnMut(&[u32])) {
        let vp = self.viewport;
        if vp.pixel_count() == 0 {
            return;
        }
        let width = vp.width() as usize;
        let mut processed = 0usize;

        for py in 0..vp.height() {
            let (_, cy) = vp.pixel_to_complex(0, py);
            let row_start = py as usize * width;

            let mut x = 0usize;
            while x < width {
                let batch = LANES.min(width - x);

                let mut cr = [0.0f64; LANES];
                let ci = [cy; LANES];
                for (lane, slot) in cr.iter_mut().enumerate() {
                    // Padding lanes reuse the first pixel's coordinate; they
                    // start masked off and their counts are dropped.
                    let offset = if lane < batch { lane } else { 0 };
                    *slot = vp.pixel_to_complex((x + offset) as u32, py).0;
                }

                let iters = iterate_batch(&cr, &ci, batch);

                let out = &mut self.storage.data_mut()[row_start + x..row_start + x + batch];
                for (slot, &count) in out.iter_mut().zip(iters.iter()) {
                    *slot = count as u32;
                }

                processed += batch;
                x += LANES;
            }

            if !self.speed_mode && processed % (width * PROGRESS_ROWS) < LANES {
                on_progress(self.storage.data());
            }
        }

        trace!(width = vp.width(), height = vp.height(), "simd kernel done");
    }

    fn reset(&mut self) {
        self.storage.reset();
    }

    fn data(&self) -> &[u32] {
        self.storage.data()
    }

    fn engine_name(&self) -> &'static str {
        "simd"
    }

    fn speed_mode(&self) -> bool {
        self.speed_mode
    }

    fn set_speed_mode(&mut self, speed_mode: bool) {
        self.speed_mode = speed_mode;
    }
}
