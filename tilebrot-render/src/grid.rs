use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info};

use tilebrot_core::{CoreError, EngineType, Kernel, StorageBuffer, Viewport};
use tilebrot_gpu::GpuContext;

use crate::engine::TileKernel;
use crate::tile::{build_tile_grid, Tile};
use crate::Result;

/// Splits the viewport into tiles, runs one kernel per tile, and composites
/// the tile buffers into a single field.
///
/// Outside speed mode tiles run one after another on the calling thread and
/// every progress signal from a tile is composited immediately, so the
/// caller can redraw a partially computed field. In speed mode CPU tiles run
/// in parallel on the rayon pool with no intermediate signals. GPU engines
/// always use a single tile on the calling thread.
pub struct GridCalculator {
    viewport: Viewport,
    storage: StorageBuffer,
    rows: u32,
    cols: u32,
    engine: EngineType,
    speed_mode: bool,
    gpu: Option<Arc<GpuContext>>,
    tiles: Vec<Tile>,
    kernels: Vec<TileKernel>,
}

impl GridCalculator {
    /// Scheduler over a `width × height` field split into `rows × cols`
    /// tiles, showing the home view with the border-tracing engine.
    pub fn new(width: u32, height: u32, rows: u32, cols: u32) -> Result<Self> {
        validate(width, height, rows, cols)?;
        let mut grid = Self {
            viewport: Viewport::new(width, height),
            storage: StorageBuffer::new(width, height),
            rows,
            cols,
            engine: EngineType::default(),
            speed_mode: false,
            gpu: None,
            tiles: Vec::new(),
            kernels: Vec::new(),
        };
        grid.rebuild();
        Ok(grid)
    }

    /// Attach the host's graphics device for the GPU engines.
    pub fn with_gpu_context(mut self, context: Arc<GpuContext>) -> Self {
        self.set_gpu_context(context);
        self
    }

    pub fn set_gpu_context(&mut self, context: Arc<GpuContext>) {
        self.gpu = Some(context);
        self.rebuild();
    }

    /// Tile layout actually in use. GPU engines always run as one tile.
    pub fn layout(&self) -> (u32, u32) {
        if self.engine.is_gpu() {
            (1, 1)
        } else {
            (self.rows, self.cols)
        }
    }

    /// Configured layout, used whenever a CPU engine is selected.
    pub fn grid(&self) -> (u32, u32) {
        (self.rows, self.cols)
    }

    pub fn set_grid(&mut self, rows: u32, cols: u32) -> Result<()> {
        if rows == 0 || cols == 0 {
            return Err(CoreError::InvalidGrid { rows, cols }.into());
        }
        if (rows, cols) != (self.rows, self.cols) {
            self.rows = rows;
            self.cols = cols;
            self.rebuild();
        }
        Ok(())
    }

    /// Recompute tile geometry and replace every tile kernel with a fresh
    /// one for the current engine, bounds and speed mode.
    fn rebuild(&mut self) {
        let (rows, cols) = self.layout();
        let tiles = build_tile_grid(&self.viewport, rows, cols);

        let kernels: Vec<TileKernel> = tiles
            .iter()
            .map(|tile| {
                let mut kernel =
                    TileKernel::build(self.engine, tile.width, tile.height, self.gpu.as_ref());
                kernel.update_bounds_explicit(tile.min_re, tile.min_im, tile.max_re, tile.max_im);
                kernel.set_speed_mode(self.speed_mode);
                kernel
            })
            .collect();

        debug!(
            engine = %self.engine,
            rows,
            cols,
            width = self.viewport.width(),
            height = self.viewport.height(),
            "tile kernels rebuilt"
        );

        self.tiles = tiles;
        self.kernels = kernels;
    }

    pub fn update_bounds(&mut self, center_re: f64, center_im: f64, diameter: f64) {
        self.viewport.update_bounds(center_re, center_im, diameter);
        self.rebuild();
    }

    pub fn update_bounds_explicit(&mut self, min_re: f64, min_im: f64, max_re: f64, max_im: f64) {
        self.viewport
            .update_bounds_explicit(min_re, min_im, max_re, max_im);
        self.rebuild();
    }

    /// Change the field size, keeping centre and diameter.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        validate(width, height, self.rows, self.cols)?;
        self.viewport.resize(width, height);
        self.storage = StorageBuffer::new(width, height);
        self.rebuild();
        Ok(())
    }

    pub fn set_engine_type(&mut self, engine: EngineType) {
        if engine != self.engine {
            self.engine = engine;
            self.rebuild();
        }
    }

    pub fn set_speed_mode(&mut self, speed_mode: bool) {
        self.speed_mode = speed_mode;
        for kernel in &mut self.kernels {
            kernel.set_speed_mode(speed_mode);
        }
    }

    /// Unified buffer and every tile back to `MAX_ITER`.
    pub fn reset(&mut self) {
        self.storage.reset();
        for kernel in &mut self.kernels {
            kernel.reset();
        }
    }

    /// Compute every tile.
    ///
    /// `on_progress` fires whenever new data has been composited into
    /// [`data`](Self::data); it never fires in parallel mode.
    pub fn compute(&mut self, on_progress: &mut dyn FnMut()) {
        let start = Instant::now();
        let parallel = self.speed_mode && !self.engine.is_gpu();

        if parallel {
            let threads = rayon::current_num_threads().max(1);
            let chunk = self.kernels.len().div_ceil(threads).max(1);
            self.kernels.par_chunks_mut(chunk).for_each(|chunk| {
                for kernel in chunk {
                    kernel.compute(&mut |_| {});
                }
            });
        } else {
            let Self {
                storage,
                tiles,
                kernels,
                ..
            } = self;
            for (tile, kernel) in tiles.iter().zip(kernels.iter_mut()) {
                kernel.compute(&mut |data| {
                    blit_tile(storage, tile, data);
                    on_progress();
                });
                blit_tile(storage, tile, kernel.data());
                on_progress();
            }
        }

        if self.speed_mode {
            self.composite();
        }

        let (rows, cols) = self.layout();
        info!(
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            engine = %self.engine_name(),
            tiles = rows * cols,
            parallel,
            "grid compute complete"
        );
    }

    /// Copy every tile buffer into the unified buffer.
    fn composite(&mut self) {
        for (tile, kernel) in self.tiles.iter().zip(&self.kernels) {
            blit_tile(&mut self.storage, tile, kernel.data());
        }
    }

    pub fn data(&self) -> &[u32] {
        self.storage.data()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn width(&self) -> u32 {
        self.viewport.width()
    }

    pub fn height(&self) -> u32 {
        self.viewport.height()
    }

    pub fn center_re(&self) -> f64 {
        self.viewport.center_re()
    }

    pub fn center_im(&self) -> f64 {
        self.viewport.center_im()
    }

    pub fn diameter(&self) -> f64 {
        self.viewport.diameter()
    }

    pub fn min_re(&self) -> f64 {
        self.viewport.min_re()
    }

    pub fn min_im(&self) -> f64 {
        self.viewport.min_im()
    }

    pub fn step_re(&self) -> f64 {
        self.viewport.step_re()
    }

    pub fn step_im(&self) -> f64 {
        self.viewport.step_im()
    }

    pub fn engine_type(&self) -> EngineType {
        self.engine
    }

    pub fn speed_mode(&self) -> bool {
        self.speed_mode
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn kernels(&self) -> &[TileKernel] {
        &self.kernels
    }

    /// Tile engine name, with the layout appended when there is more than
    /// one tile.
    pub fn engine_name(&self) -> String {
        let Some(first) = self.kernels.first() else {
            return "unknown".to_string();
        };
        let (rows, cols) = self.layout();
        if rows * cols > 1 {
            format!("{} {rows:>4}x{cols:<4}", first.engine_name())
        } else {
            first.engine_name().to_string()
        }
    }
}

fn validate(width: u32, height: u32, rows: u32, cols: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(CoreError::InvalidDimensions { width, height }.into());
    }
    if rows == 0 || cols == 0 {
        return Err(CoreError::InvalidGrid { rows, cols }.into());
    }
    Ok(())
}

fn blit_tile(storage: &mut StorageBuffer, tile: &Tile, data: &[u32]) {
    storage.blit(tile.start_x, tile.start_y, tile.width, tile.height, data);
}
