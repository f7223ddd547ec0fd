use crate::dom;
use crate::layout::{self, PageHide};
use crate::frame::SharedController;
use instant::Instant;
use wasm_bindgen::JsCast;
use web_sys as web;

fn start_engine(controller: &SharedController, started: Instant) {
    match controller.borrow_mut().start_engine(started.elapsed()) {
        Ok(true) => log::info!("[input] engine start"),
        Ok(false) => {}
        // Autoplay refusal: the prompt stays up and the next gesture retries.
        Err(e) => log::warn!("[input] {e}"),
    }
}

fn report_scroll(controller: &SharedController) {
    if let Some(w) = web::window() {
        controller
            .borrow_mut()
            .report_scroll(dom::scroll_y(&w), dom::viewport_height(&w));
    }
}

pub fn wire_page_events(window: &web::Window, controller: SharedController, started: Instant) {
    let target: &web::EventTarget = window.as_ref();

    // Any click or tap on the page counts as the start gesture.
    {
        let c = controller.clone();
        dom::listen(target, "click", move |_| start_engine(&c, started));
        let c = controller.clone();
        dom::listen_passive(target, "touchstart", move |_| start_engine(&c, started));
    }

    {
        let c = controller.clone();
        dom::listen_passive(target, "scroll", move |_| report_scroll(&c));
        let c = controller.clone();
        dom::listen(target, "resize", move |_| report_scroll(&c));
    }

    {
        let c = controller.clone();
        dom::listen(target, "keydown", move |ev| {
            let Some(ev) = ev.dyn_ref::<web::KeyboardEvent>() else {
                return;
            };
            if ev.repeat() {
                return;
            }
            match ev.key().as_str() {
                "r" | "R" => {
                    if c.borrow_mut().rev() {
                        log::info!("[keys] rev");
                    }
                }
                "Enter" => start_engine(&c, started),
                _ => {}
            }
        });
    }

    // bfcache navigations may never fire unload
    {
        let c = controller.clone();
        dom::listen(target, "pagehide", move |ev| {
            let persisted = ev
                .dyn_ref::<web::PageTransitionEvent>()
                .is_some_and(|e| e.persisted());
            match layout::page_hide_action(persisted) {
                PageHide::Keep => log::info!("[page] pagehide into bfcache, keeping scene"),
                PageHide::Dispose => {
                    log::info!("[page] pagehide, disposing scene");
                    c.borrow_mut().dispose();
                }
            }
        });
        dom::listen(target, "pageshow", |ev| {
            if ev
                .dyn_ref::<web::PageTransitionEvent>()
                .is_some_and(|e| e.persisted())
            {
                log::info!("[page] restored from bfcache");
            }
        });
    }

    report_scroll(&controller);
}
