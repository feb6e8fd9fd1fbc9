use anyhow::{Context, Ok, Result};

use crate::{
    entity::Scene,
    renderer::{
        meteor::{MeteorRenderer, MeteorRendererBuilder},
        starfield::StarfieldRenderer,
    },
    window::{Size, Window},
};

mod meteor;
mod starfield;

// 0x030014, the dark violet the scene sits on.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0x03 as f64 / 255.,
    g: 0.,
    b: 0x14 as f64 / 255.,
    a: 1.,
};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub struct Renderer {
    surface: wgpu::Surface,
    surface_format: wgpu::TextureFormat,
    device: wgpu::Device,
    queue: wgpu::Queue,
    depth_buffer: DepthBuffer,
    starfield_renderer: StarfieldRenderer,
    meteor_renderer: MeteorRenderer,
}

impl Renderer {
    pub async fn new(window: &impl Window, scene: &Scene) -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::Backends::PRIMARY);
        let surface = unsafe { instance.create_surface(&window) };

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No adapter found")?;

        let surface_format = surface
            .get_preferred_format(&adapter)
            .context("No preferred format found")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default(), None)
            .await
            .context("No device found")?;

        let size = window.size();

        Self::configure_surface(&surface, &device, surface_format, size);

        let depth_buffer = DepthBuffer::new(&device, size);

        let starfield_renderer =
            StarfieldRenderer::new(&device, scene, surface_format, DEPTH_FORMAT);

        let meteor_renderer = MeteorRendererBuilder::new(scene)
            .color_target_format(surface_format)
            .depth_format(DEPTH_FORMAT)
            .build(&device);

        Ok(Self {
            surface,
            surface_format,
            device,
            queue,
            depth_buffer,
            starfield_renderer,
            meteor_renderer,
        })
    }

    fn configure_surface(
        surface: &wgpu::Surface,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: Size,
    ) {
        surface.configure(
            device,
            &wgpu::SurfaceConfiguration {
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                format,
                width: size.width,
                height: size.height,
                present_mode: wgpu::PresentMode::Fifo,
            },
        )
    }

    pub fn resize(&mut self, size: Size) {
        Self::configure_surface(&self.surface, &self.device, self.surface_format, size);
        self.depth_buffer = DepthBuffer::new(&self.device, size);
    }

    pub fn render(&self, scene: &Scene) {
        self.starfield_renderer.update(&self.queue, scene);
        self.meteor_renderer.update(&self.queue, scene);

        let surface_texture = self
            .surface
            .get_current_texture()
            .expect("Failed to get next surface texture");

        let surface_texture_view = surface_texture.texture.create_view(&Default::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Command Encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: true,
                    },
                }],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_buffer.texture_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: false,
                    }),
                    stencil_ops: None,
                }),
            });
            self.starfield_renderer.draw(&mut rpass);
            self.meteor_renderer.draw(&mut rpass);
        }

        self.queue.submit(Some(encoder.finish()));

        surface_texture.present();
    }
}

struct DepthBuffer {
    texture_view: wgpu::TextureView,
}

impl DepthBuffer {
    fn new(device: &wgpu::Device, size: Size) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        });
        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self { texture_view }
    }
}
