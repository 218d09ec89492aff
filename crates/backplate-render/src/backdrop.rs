//! The camera backdrop pass.
//!
//! Blits the most recent camera frame across the whole render target as the
//! scene background. The pass owns the GPU half of the frame pipeline: it
//! allocates the padded power-of-two texture once, uploads only the
//! camera-sized sub-rectangle on each new frame, and keeps the quad's UV
//! coordinates and the overlay scale factors in step with the current
//! viewport geometry.

use wgpu::util::DeviceExt;

use backplate_core::{Correction, FrameStaging, Options, ViewportGeometry};

use crate::error::{RenderError, RenderResult};

/// GPU uniforms for the backdrop quad.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BackdropUniforms {
    /// Screen-rotation model matrix.
    pub matrix: [[f32; 4]; 4],
}

/// One vertex of the backdrop quad: clip-space position plus UV.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct BackdropVertex {
    position: [f32; 2],
    uv: [f32; 2],
}

/// Clip-space corners of the fullscreen quad in triangle-strip order:
/// bottom-left, bottom-right, top-left, top-right.
const QUAD_POSITIONS: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]];

/// Camera backdrop render resources.
pub struct BackdropPass {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    staging: FrameStaging,
    clear_color: wgpu::Color,
    texture: Option<wgpu::Texture>,
    bind_group: Option<wgpu::BindGroup>,
    camera_extent: Option<(u32, u32)>,
    texture_extent: Option<(u32, u32)>,
    last_viewport: Option<ViewportGeometry>,
    scale_x: f32,
    scale_y: f32,
}

impl BackdropPass {
    /// Creates the backdrop pass.
    ///
    /// Fails if the shader or pipeline does not validate; the pass cannot
    /// operate without its GPU program, so nothing partially initialized is
    /// ever returned.
    pub fn new(
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
        options: &Options,
    ) -> RenderResult<Self> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Backdrop Bind Group Layout"),
            entries: &[
                // Camera texture
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // Sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                // Rotation uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Backdrop Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/backdrop.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Backdrop Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Backdrop Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<BackdropVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: output_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Backdrop Uniform Buffer"),
            contents: bytemuck::cast_slice(&[BackdropUniforms {
                matrix: glam::Mat4::IDENTITY.to_cols_array_2d(),
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        // Full-image UVs until the first frame's correction lands.
        let vertices = Self::vertices([[0.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0]]);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Backdrop Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        // The camera image is never shown below native resolution, so
        // minification stays nearest while magnification follows options.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Backdrop Sampler"),
            mag_filter: if options.linear_magnify {
                wgpu::FilterMode::Linear
            } else {
                wgpu::FilterMode::Nearest
            },
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        // Validation errors surface synchronously on native backends.
        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::PipelineCreationFailed(error.to_string()));
        }

        Ok(Self {
            pipeline,
            bind_group_layout,
            sampler,
            uniform_buffer,
            vertex_buffer,
            staging: FrameStaging::new(options.max_texture_dim),
            clear_color: wgpu::Color {
                r: f64::from(options.clear_color.x),
                g: f64::from(options.clear_color.y),
                b: f64::from(options.clear_color.z),
                a: 1.0,
            },
            texture: None,
            bind_group: None,
            camera_extent: None,
            texture_extent: None,
            last_viewport: None,
            scale_x: 1.0,
            scale_y: 1.0,
        })
    }

    /// Handle for the frame-delivery thread. Cheap to clone, holds no GPU
    /// state.
    #[must_use]
    pub fn staging(&self) -> FrameStaging {
        self.staging.clone()
    }

    /// Overlay correction factor along X for the most recent frame.
    #[must_use]
    pub fn scale_x(&self) -> f32 {
        self.scale_x
    }

    /// Overlay correction factor along Y for the most recent frame.
    #[must_use]
    pub fn scale_y(&self) -> f32 {
        self.scale_y
    }

    /// Padded texture dimensions once the GPU storage exists.
    #[must_use]
    pub fn texture_extent(&self) -> Option<(u32, u32)> {
        self.texture_extent
    }

    /// The camera texture, for overlay renderers sharing the device.
    ///
    /// `None` until the first [`draw`](Self::draw) with a pending frame has
    /// performed the one-time allocation.
    #[must_use]
    pub fn texture(&self) -> Option<&wgpu::Texture> {
        self.texture.as_ref()
    }

    /// Uploads any pending frame and records the backdrop blit.
    ///
    /// Must be called on the render thread. Before the first frame arrives
    /// the pass only clears the target.
    pub fn draw(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        viewport: &ViewportGeometry,
    ) {
        let geometry_changed = self.last_viewport != Some(*viewport);
        self.last_viewport = Some(*viewport);

        let staging = self.staging.clone();
        if let Some(staged) = staging.acquire() {
            let (camera_width, camera_height) = staged.camera_extent();
            let (texture_width, texture_height) = staged.texture_extent();

            if self.texture.is_none() {
                self.allocate_texture(device, texture_width, texture_height);
                self.camera_extent = Some((camera_width, camera_height));
                self.texture_extent = Some((texture_width, texture_height));
            }

            if let Some(texture) = &self.texture {
                // Only the camera-sized top-left sub-rectangle is written;
                // the power-of-two padding is never touched.
                let (layout, extent) = Self::upload_layout(camera_width, camera_height);
                queue.write_texture(
                    wgpu::TexelCopyTextureInfo {
                        texture,
                        mip_level: 0,
                        origin: wgpu::Origin3d::ZERO,
                        aspect: wgpu::TextureAspect::All,
                    },
                    staged.pixels(),
                    layout,
                    extent,
                );
            }

            self.update_correction(queue, viewport);
        } else if geometry_changed {
            // Rotation or resize between frames: recompute the crop for the
            // image already on the GPU.
            self.update_correction(queue, viewport);
        }

        let uniforms = BackdropUniforms {
            matrix: viewport.rotation.model_matrix().to_cols_array_2d(),
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Camera Backdrop Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            ..Default::default()
        });

        if let Some(bind_group) = &self.bind_group {
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.draw(0..4, 0..1);
        }
    }

    /// Buffer layout and copy extent for a sub-image upload. Sized by the
    /// camera image, never by the padded texture.
    fn upload_layout(
        camera_width: u32,
        camera_height: u32,
    ) -> (wgpu::TexelCopyBufferLayout, wgpu::Extent3d) {
        (
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(camera_width * 4),
                rows_per_image: Some(camera_height),
            },
            wgpu::Extent3d {
                width: camera_width,
                height: camera_height,
                depth_or_array_layers: 1,
            },
        )
    }

    /// Allocates the camera texture once, at the padded power-of-two size.
    fn allocate_texture(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Camera Backdrop Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Backdrop Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
            ],
        }));
        self.texture = Some(texture);
    }

    /// Recomputes the crop and pushes fresh UVs and scale factors.
    ///
    /// Scale factors are only ever written here, on the render thread, after
    /// the upload: readers always see a snapshot consistent with the frame
    /// on the GPU.
    fn update_correction(&mut self, queue: &wgpu::Queue, viewport: &ViewportGeometry) {
        let (Some((camera_width, camera_height)), Some((texture_width, texture_height))) =
            (self.camera_extent, self.texture_extent)
        else {
            return;
        };

        let x_ratio = camera_width as f32 / texture_width as f32;
        let y_ratio = camera_height as f32 / texture_height as f32;

        let correction = Correction::compute(camera_width, camera_height, viewport);
        let vertices = Self::vertices(correction.uv_quad(x_ratio, y_ratio));
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));

        self.scale_x = correction.scale_x;
        self.scale_y = correction.scale_y;
    }

    fn vertices(uv: [[f32; 2]; 4]) -> [BackdropVertex; 4] {
        [
            BackdropVertex {
                position: QUAD_POSITIONS[0],
                uv: uv[0],
            },
            BackdropVertex {
                position: QUAD_POSITIONS[1],
                uv: uv[1],
            },
            BackdropVertex {
                position: QUAD_POSITIONS[2],
                uv: uv[2],
            },
            BackdropVertex {
                position: QUAD_POSITIONS[3],
                uv: uv[3],
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout_is_tight() {
        assert_eq!(std::mem::size_of::<BackdropVertex>(), 16);
        assert_eq!(std::mem::size_of::<BackdropUniforms>(), 64);
    }

    #[test]
    fn test_upload_is_sized_by_the_camera_image() {
        use backplate_core::OwnedFrame;

        let staging = FrameStaging::default();
        let frame = OwnedFrame::rgba8(640, 480, vec![0; 640 * 480 * 4]).unwrap();
        staging.submit(&frame).unwrap();

        let staged = staging.acquire().unwrap();
        let (camera_width, camera_height) = staged.camera_extent();
        assert_ne!(staged.camera_extent(), staged.texture_extent());

        // The copy covers the camera sub-rectangle, not the padded texture.
        let (layout, extent) = BackdropPass::upload_layout(camera_width, camera_height);
        assert_eq!(layout.bytes_per_row, Some(640 * 4));
        assert_eq!(layout.rows_per_image, Some(480));
        assert_eq!((extent.width, extent.height), (640, 480));
        assert_eq!(extent.depth_or_array_layers, 1);
    }

    #[test]
    fn test_vertices_pair_positions_with_uvs() {
        let uv = [[0.1, 0.9], [0.6, 0.9], [0.1, 0.2], [0.6, 0.2]];
        let vertices = BackdropPass::vertices(uv);
        for (vertex, (position, uv)) in vertices.iter().zip(QUAD_POSITIONS.iter().zip(uv.iter())) {
            assert_eq!(&vertex.position, position);
            assert_eq!(&vertex.uv, uv);
        }
    }
}
