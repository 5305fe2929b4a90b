//! The GPU kernel: draws the field into an off-screen texture and reads it
//! back into a CPU buffer.

use std::sync::Arc;
use std::time::Instant;

use tilebrot_core::{Kernel, StorageBuffer, Viewport};
use tracing::{debug, error, warn};

use crate::buffers::{decode_readback, padded_bytes_per_row, DoubleBounds, FloatBounds};
use crate::device::GpuContext;
use crate::error::GpuError;
use crate::pipeline::{FieldPipeline, TARGET_FORMAT};

/// Scalar type the shader iterates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    Float,
    Double,
}

/// Everything that lives on the device for one kernel.
struct GpuResources {
    context: Arc<GpuContext>,
    pipeline: FieldPipeline,
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    target: wgpu::Texture,
    target_view: wgpu::TextureView,
    readback: wgpu::Buffer,
    padded_row: u32,
}

impl GpuResources {
    fn new(
        context: Arc<GpuContext>,
        width: u32,
        height: u32,
        precision: Precision,
    ) -> Result<Self, GpuError> {
        if width == 0 || height == 0 {
            return Err(GpuError::EmptyTarget { width, height });
        }
        let max = context.device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            return Err(GpuError::TargetTooLarge { width, height, max });
        }
        if precision == Precision::Double && !context.supports_f64 {
            return Err(GpuError::DoubleUnsupported);
        }

        let device = &context.device;
        let pipeline = FieldPipeline::new(device, precision)?;

        let uniform_size = match precision {
            Precision::Float => std::mem::size_of::<FloatBounds>(),
            Precision::Double => std::mem::size_of::<DoubleBounds>(),
        };
        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tilebrot_bounds"),
            size: uniform_size as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tilebrot_field_bind_group"),
            layout: &pipeline.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            }],
        });

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tilebrot_field_target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

        let padded_row = padded_bytes_per_row(width);
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tilebrot_readback"),
            size: padded_row as u64 * height as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            context,
            pipeline,
            uniforms,
            bind_group,
            target,
            target_view,
            readback,
            padded_row,
        })
    }

    async fn read_back(&self, width: u32, height: u32, out: &mut [u32]) -> Result<(), GpuError> {
        let slice = self.readback.slice(..);

        let (tx, rx) = futures_channel::oneshot::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        self.context.device.poll(wgpu::Maintain::Wait);

        rx.await
            .map_err(|_| GpuError::Unavailable("Channel closed".into()))?
            .map_err(GpuError::BufferMap)?;

        {
            let view = slice.get_mapped_range();
            decode_readback(&view, width, height, self.padded_row, out);
        }
        self.readback.unmap();

        Ok(())
    }
}

/// Escape-time kernel running as a fragment shader.
///
/// Construction never fails: if the device resources cannot be built the
/// error is logged and the kernel stays degraded, with [`compute`] doing
/// nothing and [`data`] returning the untouched buffer.
///
/// [`compute`]: Kernel::compute
/// [`data`]: Kernel::data
pub struct GpuKernel {
    viewport: Viewport,
    storage: StorageBuffer,
    speed_mode: bool,
    precision: Precision,
    resources: Option<GpuResources>,
}

impl GpuKernel {
    /// Build a kernel, degrading (and logging why) on any failure.
    pub fn new(
        context: Option<Arc<GpuContext>>,
        width: u32,
        height: u32,
        precision: Precision,
    ) -> Self {
        let resources = match context {
            Some(ctx) => GpuResources::new(ctx, width, height, precision),
            None => Err(GpuError::MissingContext),
        };
        let resources = match resources {
            Ok(resources) => Some(resources),
            Err(e) => {
                error!(?precision, width, height, "GPU kernel unavailable: {e}");
                None
            }
        };

        Self {
            viewport: Viewport::new(width, height),
            storage: StorageBuffer::new(width, height),
            speed_mode: false,
            precision,
            resources,
        }
    }

    /// Build a kernel, returning the construction error instead of
    /// degrading.
    pub fn try_new(
        context: Arc<GpuContext>,
        width: u32,
        height: u32,
        precision: Precision,
    ) -> Result<Self, GpuError> {
        let resources = GpuResources::new(context, width, height, precision)?;
        Ok(Self {
            viewport: Viewport::new(width, height),
            storage: StorageBuffer::new(width, height),
            speed_mode: false,
            precision,
            resources: Some(resources),
        })
    }

    /// Whether the device resources were built.
    pub fn is_ready(&self) -> bool {
        self.resources.is_some()
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    fn write_uniforms(&self, res: &GpuResources) {
        let queue = &res.context.queue;
        match self.precision {
            Precision::Float => {
                let bounds = FloatBounds::from_viewport(&self.viewport);
                queue.write_buffer(&res.uniforms, 0, bytemuck::bytes_of(&bounds));
            }
            Precision::Double => {
                let bounds = DoubleBounds::from_viewport(&self.viewport);
                queue.write_buffer(&res.uniforms, 0, bytemuck::bytes_of(&bounds));
            }
        }
    }

    fn draw(&self, res: &GpuResources) {
        let width = self.viewport.width();
        let height = self.viewport.height();

        let mut encoder = res
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tilebrot_field_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("tilebrot_field_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &res.target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&res.pipeline.render_pipeline);
            pass.set_bind_group(0, &res.bind_group, &[]);
            pass.draw(0..4, 0..1);
        }

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &res.target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &res.readback,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(res.padded_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        res.context.queue.submit(std::iter::once(encoder.finish()));
    }
}

impl Kernel for GpuKernel {
    fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    fn compute(&mut self, on_progress: &mut dyn FnMut(&[u32])) {
        let Some(res) = self.resources.as_ref() else {
            warn!(engine = self.engine_name(), "GPU resources missing, compute skipped");
            return;
        };
        let start = Instant::now();

        self.write_uniforms(res);
        self.draw(res);

        let width = self.viewport.width();
        let height = self.viewport.height();
        let result = pollster::block_on(res.read_back(width, height, self.storage.data_mut()));
        if let Err(e) = result {
            error!("GPU readback failed: {e}");
            return;
        }

        debug!(
            engine = self.engine_name(),
            width,
            height,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "gpu kernel done"
        );
        on_progress(self.storage.data());
    }

    fn reset(&mut self) {
        self.storage.reset();
    }

    fn data(&self) -> &[u32] {
        self.storage.data()
    }

    fn engine_name(&self) -> &'static str {
        match self.precision {
            Precision::Float => " gpuf",
            Precision::Double => " gpud",
        }
    }

    fn speed_mode(&self) -> bool {
        self.speed_mode
    }

    fn set_speed_mode(&mut self, speed_mode: bool) {
        self.speed_mode = speed_mode;
    }
}
