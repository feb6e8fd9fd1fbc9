use std::mem::size_of;

use bytemuck::{bytes_of, cast_slice, Pod, Zeroable};
use glam::{const_vec3, Mat4, Vec3, Vec4};
use wgpu::util::DeviceExt;

use crate::entity::{Meteor, Scene, METEOR_COUNT};

const QUAD_VERTICES: [Vec3; 4] = [
    const_vec3!([-0.5, -0.5, 0.]),
    const_vec3!([-0.5, 0.5, 0.]),
    const_vec3!([0.5, -0.5, 0.]),
    const_vec3!([0.5, 0.5, 0.]),
];
const QUAD_INDICES: [u16; 6] = [0, 2, 1, 1, 2, 3];

/// World-space edge of an unscaled billboard. Per-meteor scale multiplies
/// this in the vertex shader.
const METEOR_BASE_SIZE: f32 = 0.5;

#[derive(Debug, Copy, Clone, Default, Pod, Zeroable)]
#[repr(C)]
struct Uniforms {
    v_mat: Mat4,
    p_mat: Mat4,
    meteor_size: f32,
    _pad0: [u8; 12],
}

impl Uniforms {
    fn new(scene: &Scene) -> Self {
        let Scene { camera, .. } = scene;

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

        Self {
            v_mat,
            p_mat,
            meteor_size: METEOR_BASE_SIZE,
            ..Default::default()
        }
    }
}

#[derive(Debug, Copy, Clone, Default, Pod, Zeroable)]
#[repr(C)]
struct Instance {
    /// xyz is the world position, w the per-meteor scale.
    position: Vec4,
    /// rgb is the glow color, a the current opacity.
    color: Vec4,
}

impl Instance {
    fn new(meteor: &Meteor) -> Self {
        Self {
            position: (meteor.position, meteor.scale).into(),
            color: (meteor.color, meteor.opacity).into(),
        }
    }
}

fn instances(scene: &Scene) -> [Instance; METEOR_COUNT] {
    scene.meteors.map(|meteor| Instance::new(&meteor))
}

pub struct MeteorRenderer {
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    render_pipeline: wgpu::RenderPipeline,
}

impl MeteorRenderer {
    pub fn update(&self, queue: &wgpu::Queue, scene: &Scene) {
        // Every meteor moves, fades, and shifts hue each tick, so the whole
        // pool is rewritten unconditionally.
        queue.write_buffer(&self.instance_buffer, 0, cast_slice(&instances(scene)));
        queue.write_buffer(&self.uniform_buffer, 0, bytes_of(&Uniforms::new(scene)));
    }

    pub fn draw<'rpass>(&'rpass self, rpass: &mut impl wgpu::util::RenderEncoder<'rpass>) {
        rpass.set_pipeline(&self.render_pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..(QUAD_INDICES.len() as _), 0, 0..METEOR_COUNT as _);
    }
}

pub struct MeteorRendererBuilder<'a> {
    scene: &'a Scene,
    color_format: Option<wgpu::TextureFormat>,
    depth_format: Option<wgpu::TextureFormat>,
}

impl<'a> MeteorRendererBuilder<'a> {
    pub fn new(scene: &'a Scene) -> Self {
        Self {
            scene,
            color_format: None,
            depth_format: None,
        }
    }

    pub fn color_target_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.color_format = Some(format);
        self
    }

    pub fn depth_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.depth_format = Some(format);
        self
    }

    pub fn build(self, device: &wgpu::Device) -> MeteorRenderer {
        let scene = self.scene;
        let color_format = self.color_format.expect("No color format provided");
        let depth_format = self.depth_format.expect("No depth format provided");

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Meteor Vertex Buffer"),
            contents: bytes_of(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Meteor Index Buffer"),
            contents: bytes_of(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Meteor Instance Buffer"),
            contents: cast_slice(&instances(scene)),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::STORAGE,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Meteor Uniform Buffer"),
            size: size_of::<Uniforms>() as _,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: None,
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(size_of::<Instance>() as _),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(size_of::<Uniforms>() as _),
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: None,
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: instance_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: uniform_buffer.as_entire_binding(),
                },
            ],
        });

        let shader_module = device.create_shader_module(&wgpu::include_wgsl!("meteor.wgsl"));

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
                targets: &[wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                }],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            // Meteors read depth so stars can occlude them, but never write
            // it; translucent quads writing depth would clip each other.
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_format,
                depth_write_enabled: false,
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

        MeteorRenderer {
            uniform_buffer,
            vertex_buffer,
            index_buffer,
            instance_buffer,
            bind_group,
            render_pipeline,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::vec3;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    use crate::window::Size;

    use super::*;

    #[test]
    fn uniforms_fit_the_bind_group_layout() {
        assert_eq!(size_of::<Uniforms>(), 144);
        assert_eq!(size_of::<Instance>(), 32);
    }

    #[test]
    fn instances_pack_scale_and_opacity_into_w() {
        let meteor = Meteor {
            position: vec3(100., 70., -10.),
            velocity: vec3(-1., -1., 0.),
            scale: 2.5,
            opacity: 0.4,
            hue_offset: 0.,
            color: vec3(1., 0.2, 0.2),
        };

        let instance = Instance::new(&meteor);
        assert_eq!(instance.position, (meteor.position, 2.5).into());
        assert_eq!(instance.color, (meteor.color, 0.4).into());
    }

    #[test]
    fn every_meteor_gets_an_instance() {
        let mut rng = Pcg64Mcg::seed_from_u64(21);
        let scene = Scene::new(
            Size {
                width: 1280,
                height: 720,
            },
            &mut rng,
        );

        let instances = instances(&scene);
        assert_eq!(instances.len(), METEOR_COUNT);
        for (instance, meteor) in instances.iter().zip(&scene.meteors) {
            assert_eq!(instance.position.w, meteor.scale);
            assert_eq!(instance.color.w, 1.);
        }
    }
}
