//! GPU device initialization and capability detection.

use tracing::{info, warn};

use crate::error::GpuError;

/// Holds the wgpu device and queue.
///
/// Created once by the host and shared into every GPU kernel; kernels never
/// create or destroy it.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    /// Whether the device was created with `SHADER_F64`.
    pub supports_f64: bool,
}

/// Result of GPU initialization attempt.
pub enum GpuAvailability {
    Available(GpuContext),
    Unavailable(String),
}

impl GpuContext {
    /// Wrap a device the host created itself.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let supports_f64 = device.features().contains(wgpu::Features::SHADER_F64);
        Self {
            device,
            queue,
            supports_f64,
        }
    }

    /// Attempt to initialize GPU. Returns Unavailable on any failure.
    pub async fn try_init() -> GpuAvailability {
        match Self::init_internal().await {
            Ok(ctx) => GpuAvailability::Available(ctx),
            Err(e) => {
                warn!("GPU initialization failed: {e}");
                GpuAvailability::Unavailable(e.to_string())
            }
        }
    }

    async fn init_internal() -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        // Double precision is optional; ask for it only where it exists.
        let optional = adapter.features() & wgpu::Features::SHADER_F64;
        info!(
            adapter = ?adapter.get_info(),
            shader_f64 = !optional.is_empty(),
            "GPU adapter"
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("tilebrot"),
                    required_features: optional,
                    required_limits: wgpu::Limits::downlevel_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        Ok(Self::new(device, queue))
    }
}
