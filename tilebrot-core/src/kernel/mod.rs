//! Interchangeable escape-time kernels.
//!
//! Every kernel owns a [`Viewport`] and a [`StorageBuffer`](crate::StorageBuffer)
//! of matching size and fills the buffer on [`Kernel::compute`]. The CPU
//! kernels here produce identical buffers for identical bounds; the GPU
//! kernel lives in `tilebrot-gpu` and implements the same trait.

mod border;
mod simd;
mod standard;

pub use border::BorderKernel;
pub use simd::SimdKernel;
pub use standard::StandardKernel;

use crate::viewport::Viewport;

/// Contract shared by every computation engine.
///
/// Designed for enum dispatch: the tile scheduler wraps concrete kernels in a
/// tagged union and forwards each call, so no trait objects are involved in
/// the hot loops.
pub trait Kernel {
    /// Bounds and pixel size this kernel computes.
    fn viewport(&self) -> &Viewport;

    /// Mutable access to the bounds. Implementations that cache anything
    /// derived from the bounds must override the `update_*` methods instead.
    fn viewport_mut(&mut self) -> &mut Viewport;

    /// Fill the buffer for the current bounds.
    ///
    /// `on_progress` receives the partially computed buffer as an incremental
    /// render hint and may be called any number of times, including zero.
    /// Calling `compute` again with unchanged bounds yields the same buffer.
    fn compute(&mut self, on_progress: &mut dyn FnMut(&[u32]));

    /// Return the buffer to the uncomputed state (all `MAX_ITER`), keeping
    /// the bounds.
    fn reset(&mut self);

    /// Current buffer contents, row-major.
    fn data(&self) -> &[u32];

    /// Short engine label for status lines and logs.
    fn engine_name(&self) -> &'static str;

    fn speed_mode(&self) -> bool;

    /// In speed mode CPU kernels skip their incremental progress calls.
    fn set_speed_mode(&mut self, speed_mode: bool);

    /// Aspect-preserving re-bound; see [`Viewport::update_bounds`].
    fn update_bounds(&mut self, center_re: f64, center_im: f64, diameter: f64) {
        self.viewport_mut()
            .update_bounds(center_re, center_im, diameter);
    }

    /// Exact re-bound; see [`Viewport::update_bounds_explicit`].
    fn update_bounds_explicit(&mut self, min_re: f64, min_im: f64, max_re: f64, max_im: f64) {
        self.viewport_mut()
            .update_bounds_explicit(min_re, min_im, max_re, max_im);
    }

    fn width(&self) -> u32 {
        self.viewport().width()
    }

    fn height(&self) -> u32 {
        self.viewport().height()
    }
}

/// Rows between progress calls in the row-major kernels.
pub(crate) const PROGRESS_ROWS: usize = 10;
