use std::time::SystemTime;

use anyhow::Result;
use chrono::prelude::*;
use log::{debug, info};
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use winit::window::Window;

use crate::{
    entity::Scene,
    renderer::Renderer,
    window::{HasSize, Size},
};

pub struct App {
    window: Window,
    scene: Scene,
    rng: Pcg64Mcg,
    renderer: Renderer,
}

impl App {
    pub async fn new(window: Window) -> Result<Self> {
        let rand_seed = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap()
            .as_millis() as _;
        let mut rng = Pcg64Mcg::seed_from_u64(rand_seed);
        info!("Seeded RNG with {}", rand_seed);

        let scene = Scene::new(window.size(), &mut rng);
        info!("{:#?}", &scene);

        let renderer = Renderer::new(&window, &scene).await?;

        Ok(Self {
            window,
            scene,
            rng,
            renderer,
        })
    }

    pub fn on_resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        let size = Size::from(size);

        // Minimized windows report a zero extent the surface cannot take.
        if size.is_empty() {
            return;
        }

        debug!("resize: {:?}", size);
        self.scene.handle_resize(size);
        self.renderer.resize(size);
    }

    pub fn frame(&mut self) {
        let now_ms = Local::now().timestamp_millis() as f64;
        self.scene.tick(&mut self.rng, now_ms);
        self.renderer.render(&self.scene);
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }
}
