use std::sync::Arc;

use tilebrot_core::{
    BorderKernel, EngineType, Kernel, SimdKernel, StandardKernel, Viewport,
};
use tilebrot_gpu::{GpuContext, GpuKernel, Precision};

/// A tile's kernel, dispatched statically over the known engines.
pub enum TileKernel {
    Standard(StandardKernel),
    Simd(SimdKernel),
    Border(BorderKernel),
    Gpu(GpuKernel),
}

macro_rules! dispatch {
    ($self:expr, $k:ident => $body:expr) => {
        match $self {
            TileKernel::Standard($k) => $body,
            TileKernel::Simd($k) => $body,
            TileKernel::Border($k) => $body,
            TileKernel::Gpu($k) => $body,
        }
    };
}

impl TileKernel {
    /// Kernel for `engine` covering a `width × height` tile.
    ///
    /// GPU engines use `gpu` when given; without it the kernel comes up
    /// degraded and computes nothing.
    pub fn build(
        engine: EngineType,
        width: u32,
        height: u32,
        gpu: Option<&Arc<GpuContext>>,
    ) -> Self {
        match engine {
            EngineType::Standard => TileKernel::Standard(StandardKernel::new(width, height)),
            EngineType::Simd => TileKernel::Simd(SimdKernel::new(width, height)),
            EngineType::Border => TileKernel::Border(BorderKernel::new(width, height)),
            EngineType::GpuFloat => TileKernel::Gpu(GpuKernel::new(
                gpu.cloned(),
                width,
                height,
                Precision::Float,
            )),
            EngineType::GpuDouble => TileKernel::Gpu(GpuKernel::new(
                gpu.cloned(),
                width,
                height,
                Precision::Double,
            )),
        }
    }
}

impl Kernel for TileKernel {
    fn viewport(&self) -> &Viewport {
        dispatch!(self, k => k.viewport())
    }

    fn viewport_mut(&mut self) -> &mut Viewport {
        dispatch!(self, k => k.viewport_mut())
    }

    fn compute(&mut self, on_progress: &mut dyn FnMut(&[u32])) {
        dispatch!(self, k => k.compute(on_progress))
    }

    fn reset(&mut self) {
        dispatch!(self, k => k.reset())
    }

    fn data(&self) -> &[u32] {
        dispatch!(self, k => k.data())
    }

    fn engine_name(&self) -> &'static str {
        dispatch!(self, k => k.engine_name())
    }

    fn speed_mode(&self) -> bool {
        dispatch!(self, k => k.speed_mode())
    }

    fn set_speed_mode(&mut self, speed_mode: bool) {
        dispatch!(self, k => k.set_speed_mode(speed_mode))
    }

    fn update_bounds(&mut self, center_re: f64, center_im: f64, diameter: f64) {
        dispatch!(self, k => k.update_bounds(center_re, center_im, diameter))
    }

    fn update_bounds_explicit(&mut self, min_re: f64, min_im: f64, max_re: f64, max_im: f64) {
        dispatch!(self, k => k.update_bounds_explicit(min_re, min_im, max_re, max_im))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_picks_matching_kernel() {
        for engine in EngineType::ALL {
            let kernel = TileKernel::build(engine, 8, 6, None);
            let expected = match engine {
                EngineType::Border => "border",
                EngineType::Standard => "standard",
                EngineType::Simd => "simd",
                EngineType::GpuFloat => " gpuf",
                EngineType::GpuDouble => " gpud",
            };
            assert_eq!(kernel.engine_name(), expected);
            assert_eq!((kernel.width(), kernel.height()), (8, 6));
        }
    }

    #[test]
    fn forwards_bounds_and_speed_mode() {
        let mut kernel = TileKernel::build(EngineType::Simd, 10, 10, None);
        kernel.update_bounds_explicit(-1.0, -0.5, 0.0, 0.5);
        kernel.set_speed_mode(true);
        assert_eq!(kernel.viewport().min_re(), -1.0);
        assert_eq!(kernel.viewport().step_re(), 0.1);
        assert!(kernel.speed_mode());
    }
}
