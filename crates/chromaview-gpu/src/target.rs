//! Offscreen render target with blocking texture readback.
//!
//! Render passes here never touch a surface/swapchain: the default display
//! target belongs to the viewer and is left untouched on every path.

use chromaview_core::{CHANNELS_PER_PIXEL, Camera, OffscreenTarget, TargetError};
use wgpu::util::DeviceExt;

use crate::context::GpuContext;
use crate::mesh::{Appearance, MeshScene};
use crate::pipelines::{CapturePipelines, COLOR_FORMAT, DEPTH_FORMAT, DrawUniforms};

/// Sized color and depth attachments, reallocated when dimensions change.
struct Attachments {
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
}

/// Offscreen capture surface: one render pass plus staging readback.
pub struct CaptureTarget {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipelines: CapturePipelines,
    attachments: Option<Attachments>,
    /// Cached staging buffer, reallocated only on growth.
    staging: Option<wgpu::Buffer>,
}

impl CaptureTarget {
    pub fn new(context: &GpuContext) -> Self {
        Self {
            device: context.device.clone(),
            queue: context.queue.clone(),
            pipelines: CapturePipelines::new(&context.device),
            attachments: None,
            staging: None,
        }
    }

    fn ensure_attachments(&mut self, width: u32, height: u32) -> Result<(), TargetError> {
        let needs_realloc = match &self.attachments {
            Some(a) => a.width != width || a.height != height,
            None => true,
        };
        if !needs_realloc {
            return Ok(());
        }

        // Texture creation past device limits raises a validation error on
        // the error scope of the device, not here; reject it up front so the
        // failure surfaces as an allocation error.
        let limit = self.device.limits().max_texture_dimension_2d;
        if width > limit || height > limit {
            return Err(TargetError::Allocation(format!(
                "requested {width}x{height} exceeds device limit {limit}"
            )));
        }

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let color = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("chromaview_capture_color"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let depth = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("chromaview_capture_depth"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        self.attachments = Some(Attachments {
            color_view: color.create_view(&wgpu::TextureViewDescriptor::default()),
            depth_view: depth.create_view(&wgpu::TextureViewDescriptor::default()),
            color,
            width,
            height,
        });
        tracing::debug!("allocated {width}x{height} capture target");
        Ok(())
    }
}

impl OffscreenTarget<MeshScene> for CaptureTarget {
    fn render(
        &mut self,
        scene: &MeshScene,
        camera: &Camera,
        width: u32,
        height: u32,
    ) -> Result<(), TargetError> {
        self.ensure_attachments(width, height)?;
        let attachments = self
            .attachments
            .as_ref()
            .expect("attachments just ensured");

        let view_projection = camera.view_projection();

        // One uniform bind group per draw. Scenes are a handful of meshes
        // and the capture is single-shot, so the allocation churn is noise.
        let mut draws = Vec::with_capacity(scene.meshes.len());
        for mesh in &scene.meshes {
            let uniforms = DrawUniforms {
                mvp: (view_projection * mesh.transform).to_cols_array_2d(),
                color: match mesh.appearance {
                    Appearance::Flat { color } => color,
                    Appearance::Depth => [1.0; 4],
                },
            };
            let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("chromaview_draw_uniforms"),
                contents: bytemuck::bytes_of(&uniforms),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("chromaview_draw_bg"),
                layout: &self.pipelines.layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            });
            draws.push((mesh, bind_group, buffer));
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("chromaview_capture_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("chromaview_capture_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &attachments.color_view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        // The background clears to the far-plane encoding:
                        // depth 255 everywhere no geometry lands.
                        load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &attachments.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for (mesh, bind_group, _uniforms) in &draws {
                let pipeline = match mesh.appearance {
                    Appearance::Depth => &self.pipelines.depth_encode,
                    Appearance::Flat { .. } => &self.pipelines.flat,
                };
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn read_back(&mut self) -> Result<Vec<u8>, TargetError> {
        let Some(attachments) = self.attachments.as_ref() else {
            return Err(TargetError::Readback("nothing rendered yet".into()));
        };
        let (width, height) = (attachments.width, attachments.height);

        let bytes_per_row = width as u64 * CHANNELS_PER_PIXEL as u64;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as u64;
        let padded_bytes_per_row = bytes_per_row.div_ceil(align) * align;
        let size = padded_bytes_per_row * height as u64;

        let needs_new_staging = match self.staging.as_ref() {
            Some(buf) => buf.size() < size,
            None => true,
        };
        if needs_new_staging {
            self.staging = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("chromaview_readback_staging"),
                size,
                usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
                mapped_at_creation: false,
            }));
        }
        let staging = self
            .staging
            .as_ref()
            .expect("staging cache should be initialized");

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("chromaview_readback_encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &attachments.color,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row as u32),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        staging.slice(..size).map_async(wgpu::MapMode::Read, |_| {});
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| TargetError::Readback(format!("device poll failed: {e}")))?;

        // Strip the row padding into a tight buffer.
        let data = staging.slice(..size).get_mapped_range();
        let mut bytes = Vec::with_capacity((bytes_per_row * height as u64) as usize);
        for row in 0..height as usize {
            let start = row * padded_bytes_per_row as usize;
            bytes.extend_from_slice(&data[start..start + bytes_per_row as usize]);
        }
        drop(data);
        staging.unmap();

        Ok(bytes)
    }
}
