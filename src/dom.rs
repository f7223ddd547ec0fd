use crate::layout;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub fn canvas_by_id(document: &web::Document, id: &str) -> anyhow::Result<web::HtmlCanvasElement> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| anyhow::anyhow!("missing #{id}"))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("#{id} is not a canvas: {:?}", e)))
}

/// Match the canvas backing store to its CSS size times devicePixelRatio.
/// Returns the new size when it changed.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) -> Option<(u32, u32)> {
    let window = web::window()?;
    let rect = canvas.get_bounding_client_rect();
    let (w, h) = layout::backing_size(rect.width(), rect.height(), window.device_pixel_ratio());
    if canvas.width() == w && canvas.height() == h {
        return None;
    }
    canvas.set_width(w);
    canvas.set_height(h);
    Some((w, h))
}

/// Attach a listener that lives for the rest of the page.
pub fn listen(target: &web::EventTarget, event: &str, f: impl FnMut(web::Event) + 'static) {
    let closure = Closure::wrap(Box::new(f) as Box<dyn FnMut(web::Event)>);
    if let Err(e) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
    {
        log::warn!("[dom] {event} listener failed: {:?}", e);
    }
    closure.forget();
}

/// Like [`listen`], marked passive so scroll and touch stay smooth.
pub fn listen_passive(target: &web::EventTarget, event: &str, f: impl FnMut(web::Event) + 'static) {
    let closure = Closure::wrap(Box::new(f) as Box<dyn FnMut(web::Event)>);
    let opts = web::AddEventListenerOptions::new();
    opts.set_passive(true);
    if let Err(e) = target.add_event_listener_with_callback_and_add_event_listener_options(
        event,
        closure.as_ref().unchecked_ref(),
        &opts,
    ) {
        log::warn!("[dom] {event} listener failed: {:?}", e);
    }
    closure.forget();
}

#[inline]
pub fn viewport_height(window: &web::Window) -> f32 {
    window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0) as f32
}

#[inline]
pub fn scroll_y(window: &web::Window) -> f32 {
    window.scroll_y().unwrap_or(0.0) as f32
}

#[inline]
pub fn document_height(document: &web::Document) -> f32 {
    document
        .document_element()
        .map(|el| el.scroll_height() as f32)
        .unwrap_or(0.0)
}
