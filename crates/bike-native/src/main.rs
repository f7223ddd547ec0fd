use std::time::Instant;

use anyhow::Context;
use bike_core::{HudView, Scene, SceneConfig, SceneController, SoftwarePlatform};
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{Key, NamedKey},
    window::WindowBuilder,
};

mod audio;
mod gpu;

use gpu::GpuState;

/// Pixels of virtual page scroll per wheel line or arrow press.
const SCROLL_STEP_PX: f32 = 60.0;
const FALLBACK_SAMPLE_RATE: f32 = 48_000.0;

fn config_from_env() -> SceneConfig {
    let mut config = SceneConfig::default();
    if let Some(seed) = std::env::var("BIKE_SEED")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
    {
        config = config.with_seed(seed);
    }
    if std::env::var_os("BIKE_MUTE").is_some() {
        config = config.muted();
    }
    config
}

/// Page scroll emulation over one window height, the span the hero reacts to.
struct VirtualScroll {
    y: f32,
}

impl VirtualScroll {
    fn scroll_by(&mut self, dy: f32, viewport_height: f32) {
        self.y = (self.y + dy).clamp(0.0, viewport_height.max(0.0));
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut config = config_from_env();
    // The output stream must outlive the controller's use of its graph.
    let output = if config.audio_enabled {
        audio::start_output()
    } else {
        None
    };
    let platform = match &output {
        Some(out) => SoftwarePlatform::with_graph(out.graph.clone()),
        None => {
            if config.audio_enabled {
                log::warn!("[native] no audio output, running muted");
                config = config.muted();
            }
            SoftwarePlatform::new(FALLBACK_SAMPLE_RATE)
        }
    };

    let mut scene = Scene::mounted(&config);
    let mut controller = SceneController::new(platform, config);

    let event_loop = EventLoop::new().context("event loop")?;
    let window = WindowBuilder::new()
        .with_title(HudView::StartPrompt.summary())
        .build(&event_loop)
        .context("window")?;

    let mut state = pollster::block_on(GpuState::new(
        &window,
        controller.config().particle_count,
    ))?;
    let start = Instant::now();
    let mut scroll = VirtualScroll { y: 0.0 };
    let mut title = HudView::StartPrompt;

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => {
            let height = state.window.inner_size().height as f32;
            match event {
                WindowEvent::Resized(size) => {
                    state.resize(size);
                    controller.report_scroll(scroll.y, size.height as f32);
                }
                WindowEvent::CloseRequested => {
                    controller.dispose();
                    elwt.exit();
                }
                WindowEvent::MouseInput {
                    state: ElementState::Pressed,
                    button: MouseButton::Left,
                    ..
                } => start_engine(&mut controller, start),
                WindowEvent::MouseWheel { delta, .. } => {
                    let dy = match delta {
                        MouseScrollDelta::LineDelta(_, y) => -y * SCROLL_STEP_PX,
                        MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
                    };
                    scroll.scroll_by(dy, height);
                    controller.report_scroll(scroll.y, height);
                }
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            logical_key,
                            state: ElementState::Pressed,
                            repeat: false,
                            ..
                        },
                    ..
                } => match logical_key.as_ref() {
                    Key::Named(NamedKey::Space) => start_engine(&mut controller, start),
                    Key::Named(NamedKey::ArrowDown) => {
                        scroll.scroll_by(SCROLL_STEP_PX, height);
                        controller.report_scroll(scroll.y, height);
                    }
                    Key::Named(NamedKey::ArrowUp) => {
                        scroll.scroll_by(-SCROLL_STEP_PX, height);
                        controller.report_scroll(scroll.y, height);
                    }
                    Key::Character(c) if c.eq_ignore_ascii_case("r") => {
                        controller.rev();
                    }
                    Key::Character(c) if c.eq_ignore_ascii_case("s") => controller.stop_audio(),
                    Key::Named(NamedKey::Escape) => {
                        controller.dispose();
                        elwt.exit();
                    }
                    _ => {}
                },
                _ => {}
            }
        }
        Event::AboutToWait => {
            let elapsed = start.elapsed();
            controller.tick(elapsed);
            controller.frame(elapsed.as_secs_f32(), state.viewport_width(), &mut scene);

            let hud = controller.hud();
            if hud != title {
                state.window.set_title(&hud.summary());
                title = hud;
            }

            match state.render(&scene) {
                Ok(_) => state.window.request_redraw(),
                Err(wgpu::SurfaceError::Lost) => state.resize(state.window.inner_size()),
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    controller.dispose();
                    elwt.exit();
                }
                Err(e) => log::warn!("[native] surface error: {e:?}"),
            }
        }
        _ => {}
    })?;
    drop(output);
    Ok(())
}

fn start_engine(controller: &mut SceneController<SoftwarePlatform>, start: Instant) {
    match controller.start_engine(start.elapsed()) {
        Ok(true) => log::info!("[native] engine start"),
        Ok(false) => {}
        Err(e) => log::error!("[native] audio unavailable: {e}"),
    }
}
