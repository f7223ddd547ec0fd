//! Page scroll → engine state.
//!
//! Scroll events can arrive far faster than frames, so reports are only
//! recorded here and folded into the state once per frame.

use crate::constants::*;
use crate::state::EngineState;

/// Fraction of one viewport height scrolled, clamped to \[0, 1\].
#[inline]
pub fn scroll_progress(scroll_y: f32, viewport_height: f32) -> f32 {
    if viewport_height <= 0.0 || !scroll_y.is_finite() {
        return 0.0;
    }
    (scroll_y / viewport_height).clamp(0.0, 1.0)
}

/// Fraction of the whole page scrolled, for the progress bar.
#[inline]
pub fn page_progress(scroll_y: f32, document_height: f32, viewport_height: f32) -> f32 {
    let scrollable = document_height - viewport_height;
    if scrollable <= 0.0 || !scroll_y.is_finite() {
        return 0.0;
    }
    (scroll_y / scrollable).clamp(0.0, 1.0)
}

/// Write the scroll-derived fields. Speed and RPM follow scroll only once the
/// engine has settled, so the startup script keeps sole ownership of them
/// until then.
pub fn apply_scroll(state: &mut EngineState, progress: f32) {
    state.scroll_progress = progress.clamp(0.0, 1.0);
    if state.is_settled() {
        state.wheel_speed = SCROLL_WHEEL_BASE + state.scroll_progress * SCROLL_WHEEL_SPAN;
        state.current_rpm = SCROLL_RPM_BASE + state.scroll_progress * SCROLL_RPM_SPAN;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ScrollReport {
    scroll_y: f32,
    viewport_height: f32,
}

/// Coalesces raw scroll reports; the last one before a frame wins.
#[derive(Clone, Debug, Default)]
pub struct ScrollMapper {
    pending: Option<ScrollReport>,
}

impl ScrollMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, scroll_y: f32, viewport_height: f32) {
        self.pending = Some(ScrollReport {
            scroll_y,
            viewport_height,
        });
    }

    /// Fold the latest report into `state`. Returns whether there was one.
    pub fn apply(&mut self, state: &mut EngineState) -> bool {
        let Some(report) = self.pending.take() else {
            return false;
        };
        apply_scroll(
            state,
            scroll_progress(report.scroll_y, report.viewport_height),
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_clamped() {
        assert_eq!(scroll_progress(-50.0, 800.0), 0.0);
        assert_eq!(scroll_progress(400.0, 800.0), 0.5);
        assert_eq!(scroll_progress(5000.0, 800.0), 1.0);
        assert_eq!(scroll_progress(100.0, 0.0), 0.0);
    }

    #[test]
    fn page_progress_handles_short_pages() {
        assert_eq!(page_progress(0.0, 600.0, 800.0), 0.0);
        assert_eq!(page_progress(600.0, 2000.0, 800.0), 0.5);
    }

    #[test]
    fn only_the_latest_report_is_applied() {
        let mut mapper = ScrollMapper::new();
        let mut state = EngineState::default();
        mapper.report(100.0, 1000.0);
        mapper.report(250.0, 1000.0);
        assert!(mapper.apply(&mut state));
        assert_eq!(state.scroll_progress, 0.25);
        assert!(!mapper.apply(&mut state));
    }
}
