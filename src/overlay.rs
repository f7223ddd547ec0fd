use crate::constants::*;
use crate::layout;
use bike_core::HudView;
use web_sys as web;

/// DOM side of the HUD. Writes only when the derived view changes.
pub struct Overlay {
    document: web::Document,
    canvas: web::HtmlCanvasElement,
    shown: Option<HudView>,
    progress_css: String,
    opacity_css: String,
}

impl Overlay {
    pub fn new(document: web::Document, canvas: web::HtmlCanvasElement) -> Self {
        Self {
            document,
            canvas,
            shown: None,
            progress_css: String::new(),
            opacity_css: String::new(),
        }
    }

    pub fn document(&self) -> &web::Document {
        &self.document
    }

    pub fn update(&mut self, view: &HudView, page_progress: f32, canvas_opacity: f32) {
        if self.shown.as_ref() != Some(view) {
            self.show(view);
            self.shown = Some(view.clone());
        }

        let progress = layout::progress_width_css(page_progress);
        if progress != self.progress_css {
            if let Some(bar) = self.element(PROGRESS_BAR_ID) {
                _ = bar.style().set_property("width", &progress);
            }
            self.progress_css = progress;
        }

        let opacity = layout::opacity_css(canvas_opacity);
        if opacity != self.opacity_css {
            _ = self.canvas.style().set_property("opacity", &opacity);
            self.opacity_css = opacity;
        }
    }

    fn show(&self, view: &HudView) {
        if let Some(el) = self.element(HUD_TITLE_ID) {
            el.set_text_content(Some(view.title()));
        }
        if let Some(el) = self.element(HUD_DETAIL_ID) {
            el.set_text_content(Some(&view.detail()));
        }
        if let Some(root) = self.document.get_element_by_id(HUD_ID) {
            let cl = root.class_list();
            _ = cl.remove_3(HUD_CLASS_PROMPT, HUD_CLASS_STARTING, HUD_CLASS_RUNNING);
            _ = cl.add_1(match view {
                HudView::StartPrompt => HUD_CLASS_PROMPT,
                HudView::Starting => HUD_CLASS_STARTING,
                HudView::Running { .. } => HUD_CLASS_RUNNING,
            });
        }
    }

    fn element(&self, id: &str) -> Option<web::HtmlElement> {
        use wasm_bindgen::JsCast;
        self.document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<web::HtmlElement>().ok())
    }
}
