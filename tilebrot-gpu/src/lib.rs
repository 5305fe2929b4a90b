//! Fragment-shader escape-time kernel on wgpu.
//!
//! The graphics device is created by the host application and shared into
//! kernels as an `Arc<GpuContext>`. A kernel that cannot build its GPU
//! resources logs the failure and degrades to a no-op, so callers can keep
//! running and switch to a CPU engine.

mod buffers;
mod device;
mod error;
mod kernel;
mod pipeline;
mod shader;

pub use buffers::{decode_readback, padded_bytes_per_row, DoubleBounds, FloatBounds};
pub use device::{GpuAvailability, GpuContext};
pub use error::GpuError;
pub use kernel::{GpuKernel, Precision};
pub use pipeline::FieldPipeline;
pub use shader::shader_source;

/// Convenience result type for the GPU crate.
pub type Result<T> = std::result::Result<T, GpuError>;
