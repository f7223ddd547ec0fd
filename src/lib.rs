#![cfg(target_arch = "wasm32")]
use bike_core::{Scene, SceneConfig, SceneController};
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod audio;
mod constants;
mod dom;
mod events;
mod frame;
mod layout;
mod overlay;
mod render;

pub use audio::{WebAudioGraph, WebAudioPlatform};

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("bike-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let started = Instant::now();
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas = dom::canvas_by_id(&document, constants::CANVAS_ID)?;
    dom::sync_canvas_backing_size(&canvas);

    let config = SceneConfig::default();
    let scene = Scene::mounted(&config);
    let particles = config.particle_count;
    // The AudioContext is only created inside the first user gesture.
    let controller = Rc::new(RefCell::new(SceneController::new(
        audio::WebAudioPlatform,
        config,
    )));

    events::wire_page_events(&window, controller.clone(), started);

    // Without WebGPU the HUD and audio still work; the canvas stays blank.
    let gpu = frame::init_gpu(&canvas, particles).await;

    let overlay = overlay::Overlay::new(document, canvas.clone());
    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        controller,
        scene,
        canvas,
        overlay,
        gpu,
        started,
    }));
    frame::start_loop(frame_ctx);
    Ok(())
}
