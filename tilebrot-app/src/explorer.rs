//! Headless exploration driver: owns a grid calculator and turns pixel
//! rectangles and auto-zoom picks into new views.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use tilebrot_core::navigation::{centered_rect, is_zoom_exhausted, zoom_in_bounds, zoom_out_bounds};
use tilebrot_core::viewport::{HOME_CENTER_IM, HOME_CENTER_RE, HOME_DIAMETER};
use tilebrot_core::{EngineType, ZoomPoint, ZoomPointChooser};
use tilebrot_gpu::GpuContext;
use tilebrot_render::{GridCalculator, Result};

use crate::preferences::ExplorerPreferences;

/// Tile layout for an engine and speed mode.
///
/// GPU engines always draw a single tile. CPU engines split into the
/// configured speed grid in speed mode and otherwise run as one progressive
/// tile.
pub fn grid_layout(prefs: &ExplorerPreferences, engine: EngineType, speed_mode: bool) -> (u32, u32) {
    if engine.is_gpu() || !speed_mode {
        (1, 1)
    } else {
        (prefs.speed_grid_rows, prefs.speed_grid_cols)
    }
}

pub struct Explorer {
    grid: GridCalculator,
    prefs: ExplorerPreferences,
    chooser: ZoomPointChooser,
    rng: StdRng,
}

impl Explorer {
    /// Build the grid for `prefs`, attaching `gpu` when the host has one.
    pub fn new(prefs: ExplorerPreferences, gpu: Option<Arc<GpuContext>>) -> Result<Self> {
        let (rows, cols) = grid_layout(&prefs, prefs.engine, prefs.speed_mode);
        let mut grid = GridCalculator::new(prefs.width, prefs.height, rows, cols)?;
        if let Some(context) = gpu {
            grid.set_gpu_context(context);
        }
        grid.set_engine_type(prefs.engine);
        grid.set_speed_mode(prefs.speed_mode);

        let rng = match prefs.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            chooser: ZoomPointChooser::new(prefs.width, prefs.height),
            grid,
            prefs,
            rng,
        })
    }

    pub fn grid(&self) -> &GridCalculator {
        &self.grid
    }

    /// Compute the current view. Returns how many redraws the grid asked
    /// for along the way.
    pub fn compute(&mut self) -> usize {
        let mut redraws = 0;
        self.grid.compute(&mut || redraws += 1);
        debug!(redraws, engine = %self.grid.engine_name(), "field ready");
        redraws
    }

    fn show(&mut self, center_re: f64, center_im: f64, diameter: f64) {
        self.grid.update_bounds(center_re, center_im, diameter);
        info!(
            "Zoomed to: center=({:.10e}, {:.10e}), diameter={:.10e}",
            self.grid.center_re(),
            self.grid.center_im(),
            self.grid.diameter()
        );
        self.grid.reset();
        self.compute();
    }

    /// Whether the current view is already too deep to zoom into.
    pub fn is_zoom_exhausted(&self) -> bool {
        is_zoom_exhausted(self.grid.diameter())
    }

    /// Zoom so the pixel rectangle fills the view, then recompute.
    ///
    /// Returns `false`, leaving the view alone, for a zero-area rectangle or
    /// when the current view is already deeper than `f64` can resolve.
    pub fn zoom_to_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> bool {
        if self.is_zoom_exhausted() {
            warn!(diameter = self.grid.diameter(), "Zoom limit reached");
            return false;
        }
        let Some((center_re, center_im, diameter)) =
            zoom_in_bounds(self.grid.viewport(), x1, y1, x2, y2)
        else {
            return false;
        };
        self.show(center_re, center_im, diameter);
        true
    }

    /// Zoom out so the current view shrinks into the pixel rectangle, then
    /// recompute.
    pub fn zoom_out_of_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> bool {
        let Some((center_re, center_im, diameter)) =
            zoom_out_bounds(self.grid.viewport(), x1, y1, x2, y2)
        else {
            return false;
        };
        self.show(center_re, center_im, diameter);
        true
    }

    pub fn reset_home(&mut self) {
        self.show(HOME_CENTER_RE, HOME_CENTER_IM, HOME_DIAMETER);
    }

    /// Switch engines keeping the view, re-apply the layout policy and
    /// recompute.
    pub fn set_engine(&mut self, engine: EngineType) -> Result<()> {
        if engine == self.grid.engine_type() {
            return Ok(());
        }
        let (rows, cols) = grid_layout(&self.prefs, engine, self.grid.speed_mode());
        self.grid.set_grid(rows, cols)?;
        self.grid.set_engine_type(engine);
        info!("Engine: {}", self.grid.engine_name());
        self.grid.reset();
        self.compute();
        Ok(())
    }

    /// Advance to the next engine in cycle order.
    pub fn cycle_engine(&mut self) -> Result<EngineType> {
        let next = self.grid.engine_type().next();
        self.set_engine(next)?;
        Ok(next)
    }

    /// Toggle speed mode. Takes effect on the next compute.
    pub fn set_speed_mode(&mut self, speed_mode: bool) -> Result<()> {
        let (rows, cols) = grid_layout(&self.prefs, self.grid.engine_type(), speed_mode);
        self.grid.set_grid(rows, cols)?;
        self.grid.set_speed_mode(speed_mode);
        info!("Speed mode: {}", if speed_mode { "ON" } else { "OFF" });
        Ok(())
    }

    /// One auto-exploration step: pick an interesting point in the current
    /// field and zoom into a quarter-size rectangle around it. Once the zoom
    /// has bottomed out the view returns home instead, and the field centre
    /// is reported as not found.
    pub fn auto_zoom_step(&mut self) -> ZoomPoint {
        if self.is_zoom_exhausted() {
            info!("Auto-zoom cannot go deeper, returning home");
            self.reset_home();
            return ZoomPoint {
                x: self.chooser.width() / 2,
                y: self.chooser.height() / 2,
                found: false,
            };
        }

        let rect_width = self.chooser.width() / 4;
        let rect_height = self.chooser.height() / 4;
        let point = self.chooser.find_interesting_point(
            self.grid.data(),
            rect_width,
            rect_height,
            &mut self.rng,
        );

        let (x1, y1, x2, y2) = centered_rect(
            point.x as i32,
            point.y as i32,
            rect_width as i32,
            rect_height as i32,
        );
        self.zoom_to_rect(x1, y1, x2, y2);
        point
    }
}
