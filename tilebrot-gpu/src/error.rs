//! GPU error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GpuError {
    #[error("No GPU adapter found")]
    NoAdapter,

    #[error("Failed to create device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),

    #[error("Buffer mapping failed: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),

    #[error("No GPU context attached")]
    MissingContext,

    #[error("Render target has zero size: {width}×{height}")]
    EmptyTarget { width: u32, height: u32 },

    #[error("Render target {width}×{height} exceeds the device limit of {max}")]
    TargetTooLarge { width: u32, height: u32, max: u32 },

    #[error("Adapter does not support double-precision shaders")]
    DoubleUnsupported,

    #[error("Shader pipeline rejected: {0}")]
    Pipeline(String),

    #[error("GPU unavailable: {0}")]
    Unavailable(String),
}
