use tracing::trace;

use super::{Kernel, PROGRESS_ROWS};
use crate::escape::escape_time;
use crate::storage::StorageBuffer;
use crate::viewport::Viewport;

/// Scalar row-major kernel: one [`escape_time`] call per pixel, no shortcuts.
///
/// The reference the other engines are checked against, and the cheapest
/// choice for tiny tiles where setup cost dominates.
#[derive(Debug, Clone)]
pub struct StandardKernel {
    viewport: Viewport,
    storage: StorageBuffer,
    speed_mode: bool,
}

impl StandardKernel {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: Viewport::new(width, height),
            storage: StorageBuffer::new(width, height),
            speed_mode: false,
        }
    }
}

impl Kernel for StandardKernel {
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
            let row_start = py as usize * width;
            let row = &mut self.storage.data_mut()[row_start..row_start + width];
            for (px, slot) in row.iter_mut().enumerate() {
                let (x, y) = vp.pixel_to_complex(px as u32, py);
                *slot = escape_time(x, y);
            }
            processed += width;

            if !self.speed_mode && processed % (width * PROGRESS_ROWS) == 0 {
                on_progress(self.storage.data());
            }
        }

        trace!(
            width = vp.width(),
            height = vp.height(),
            "standard kernel done"
        );
    }

    fn reset(&mut self) {
        self.storage.reset();
    }

    fn data(&self) -> &[u32] {
        self.storage.data()
    }

    fn engine_name(&self) -> &'static str {
        "standard"
    }

    fn speed_mode(&self) -> bool {
        self.speed_mode
    }

    fn set_speed_mode(&mut self, speed_mode: bool) {
        self.speed_mode = speed_mode;
    }
}
