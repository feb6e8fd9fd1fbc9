use std::mem::size_of;

use bytemuck::{bytes_of, cast_slice, Pod, Zeroable};
use glam::{EulerRot, Mat4, Quat, Vec3};
use wgpu::util::DeviceExt;

use crate::entity::Scene;

#[derive(Debug, Copy, Clone, Default, Pod, Zeroable)]
#[repr(C)]
struct Uniforms {
    mvp_mat: Mat4,
}

impl Uniforms {
    fn new(scene: &Scene) -> Self {
        let Scene {
            camera, starfield, ..
        } = scene;

        let p_mat = Mat4::perspective_rh(
            camera.fov.to_radians(),
            camera.aspect_ratio,
            camera.near,
            camera.far,
        );

        let v_mat = {
            let center = camera.position + camera.rotation * -Vec3::Z;
            let up = Vec3::Y;
            Mat4::look_at_rh(camera.position, center, up)
        };

        // Star positions never change; the drift lives in the model matrix.
        let m_mat = Mat4::from_quat(Quat::from_euler(
            EulerRot::XYZ,
            starfield.pitch,
            starfield.yaw,
            0.,
        ));

        Self {
            mvp_mat: p_mat * v_mat * m_mat,
        }
    }
}

pub struct StarfieldRenderer {
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    bind_group: wgpu::BindGroup,
    render_pipeline: wgpu::RenderPipeline,
}

impl StarfieldRenderer {
    pub fn new(
        device: &wgpu::Device,
        scene: &Scene,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Starfield Vertex Buffer"),
            contents: cast_slice(scene.starfield.points.as_slice()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let vertex_count = scene.starfield.points.len() as u32;

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Starfield Uniform Buffer"),
            size: size_of::<Uniforms>() as _,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: None,
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(size_of::<Uniforms>() as _),
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: None,
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader_module = device.create_shader_module(&wgpu::include_wgsl!("starfield.wgsl"));

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: None,
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: None,
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: size_of::<Vec3>() as _,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x3,
                        offset: 0,
                        shader_location: 0,
                    }],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: "fs_main",
                targets: &[color_format.into()],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::PointList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState {
                    constant: 0,
                    slope_scale: 0.0,
                    clamp: 0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self {
            uniform_buffer,
            vertex_buffer,
            vertex_count,
            bind_group,
            render_pipeline,
        }
    }

    pub fn update(&self, queue: &wgpu::Queue, scene: &Scene) {
        queue.write_buffer(&self.uniform_buffer, 0, bytes_of(&Uniforms::new(scene)));
    }

    pub fn draw<'rpass>(&'rpass self, rpass: &mut impl wgpu::util::RenderEncoder<'rpass>) {
        rpass.set_pipeline(&self.render_pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        rpass.draw(0..self.vertex_count, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use glam::vec4;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    use crate::window::Size;

    use super::*;

    #[test]
    fn uniforms_fit_the_bind_group_layout() {
        assert_eq!(size_of::<Uniforms>(), 64);
    }

    #[test]
    fn fresh_scene_keeps_the_origin_centered_in_clip_space() {
        let mut rng = Pcg64Mcg::seed_from_u64(11);
        let scene = Scene::new(
            Size {
                width: 1280,
                height: 720,
            },
            &mut rng,
        );

        // The camera sits on +Z looking down the axis, so the cube's center
        // lands dead center, in front of the near plane.
        let clip = Uniforms::new(&scene).mvp_mat * vec4(0., 0., 0., 1.);
        assert_eq!(clip.x, 0.);
        assert_eq!(clip.y, 0.);
        assert!(clip.w > 0.);
        assert!(clip.z / clip.w > 0. && clip.z / clip.w < 1.);
    }
}
