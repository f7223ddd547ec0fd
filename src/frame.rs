use crate::audio::WebAudioPlatform;
use crate::dom;
use crate::overlay::Overlay;
use crate::render;
use bike_core::{fade_in_opacity, page_progress, Camera, Scene, SceneController};
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub type SharedController = Rc<RefCell<SceneController<WebAudioPlatform>>>;

pub struct FrameContext<'a> {
    pub controller: SharedController,
    pub scene: Scene,
    pub canvas: web::HtmlCanvasElement,
    pub overlay: Overlay,
    pub gpu: Option<render::GpuState<'a>>,
    /// Page load; every controller time is measured from here.
    pub started: Instant,
}

impl<'a> FrameContext<'a> {
    pub fn frame(&mut self) {
        let now = self.started.elapsed();
        let elapsed = now.as_secs_f32();

        if let Some((w, h)) = dom::sync_canvas_backing_size(&self.canvas) {
            if let Some(gpu) = self.gpu.as_mut() {
                gpu.resize_if_needed(w, h);
            }
        }
        let viewport_width = match &self.gpu {
            Some(gpu) => gpu.viewport_width(),
            None => {
                let aspect = self.canvas.width().max(1) as f32 / self.canvas.height().max(1) as f32;
                Camera::hero(aspect).viewport_width()
            }
        };

        let (hud, fade_sec) = {
            let mut controller = self.controller.borrow_mut();
            controller.tick(now);
            controller.frame(elapsed, viewport_width, &mut self.scene);
            (controller.hud(), controller.config().fade_in_sec)
        };

        let progress = match web::window() {
            Some(w) => page_progress(
                dom::scroll_y(&w),
                dom::document_height(self.overlay.document()),
                dom::viewport_height(&w),
            ),
            None => 0.0,
        };
        self.overlay
            .update(&hud, progress, fade_in_opacity(elapsed, fade_sec));

        if let Some(gpu) = self.gpu.as_mut() {
            match gpu.render(&self.scene) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu.reconfigure(),
                Err(e) => log::warn!("[frame] surface error: {:?}", e),
            }
        }
    }
}

pub async fn init_gpu(
    canvas: &web::HtmlCanvasElement,
    particles: usize,
) -> Option<render::GpuState<'static>> {
    // leak a canvas clone to satisfy 'static lifetime for surface
    let leaked_canvas = Box::leak(Box::new(canvas.clone()));
    match render::GpuState::new(leaked_canvas, particles).await {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("WebGPU init error: {:?}", e);
            None
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext<'static>>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let mut ctx = frame_ctx.borrow_mut();
        ctx.frame();
        // stop the loop once the page has torn the controller down
        if ctx.controller.borrow().is_disposed() {
            return;
        }
        drop(ctx);
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    let Some(w) = web::window() else {
        return;
    };
    if let Some(cb) = tick.borrow().as_ref() {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
