use anyhow::{Context, Result};
use pollster::FutureExt as _;
use winit::{
    dpi::LogicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

mod animation;
mod app;
mod entity;
mod renderer;
mod window;

use app::App;

fn main() -> Result<()> {
    env_logger::init();

    let event_loop = EventLoop::new();

    let window = WindowBuilder::new()
        .with_title("starfall")
        .with_inner_size(LogicalSize::<u32> {
            width: 1280,
            height: 720,
        })
        .build(&event_loop)
        .context("Failed to build window")?;

    let mut app = App::new(window).block_on()?;

    event_loop.run(move |e, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        match e {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => *control_flow = ControlFlow::Exit,
                WindowEvent::Resized(size) => app.on_resize(size),
                WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                    app.on_resize(*new_inner_size)
                }
                _ => (),
            },
            Event::MainEventsCleared => app.request_redraw(),
            Event::RedrawRequested(..) => app.frame(),
            _ => (),
        }
    });
}
