//! Pure helpers for sizing the canvas, styling the overlay and page lifecycle.

use crate::constants::MAX_DEVICE_PIXEL_RATIO;

/// Backing-store size for a canvas laid out at `css_w` × `css_h` CSS pixels.
/// Never returns a zero dimension.
pub fn backing_size(css_w: f64, css_h: f64, device_pixel_ratio: f64) -> (u32, u32) {
    let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio.min(MAX_DEVICE_PIXEL_RATIO)
    } else {
        1.0
    };
    let px = |css: f64| {
        if css.is_finite() && css > 0.0 {
            ((css * dpr).round() as u32).max(1)
        } else {
            1
        }
    };
    (px(css_w), px(css_h))
}

/// CSS width for the page progress bar.
pub fn progress_width_css(progress: f32) -> String {
    let pct = if progress.is_finite() {
        progress.clamp(0.0, 1.0) * 100.0
    } else {
        0.0
    };
    format!("{pct:.1}%")
}

/// CSS opacity, rounded so unchanged frames produce identical strings.
pub fn opacity_css(opacity: f32) -> String {
    format!("{:.3}", opacity.clamp(0.0, 1.0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageHide {
    /// The page went into the back/forward cache and may be shown again.
    Keep,
    Dispose,
}

/// `persisted` is `PageTransitionEvent.persisted` from `pagehide`.
pub fn page_hide_action(persisted: bool) -> PageHide {
    if persisted {
        PageHide::Keep
    } else {
        PageHide::Dispose
    }
}
