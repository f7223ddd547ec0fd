// Host-side tests for the web front-end's DOM ids.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}

use constants::*;

#[test]
fn element_ids_are_distinct_and_selector_safe() {
    let ids = [
        CANVAS_ID,
        HUD_ID,
        HUD_TITLE_ID,
        HUD_DETAIL_ID,
        PROGRESS_BAR_ID,
    ];
    for (i, a) in ids.iter().enumerate() {
        assert!(!a.is_empty());
        assert!(
            a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'),
            "{a} should be usable as a bare #id"
        );
        for b in &ids[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn hud_state_classes_are_distinct() {
    assert_ne!(HUD_CLASS_PROMPT, HUD_CLASS_STARTING);
    assert_ne!(HUD_CLASS_STARTING, HUD_CLASS_RUNNING);
    assert_ne!(HUD_CLASS_PROMPT, HUD_CLASS_RUNNING);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn pixel_ratio_cap_is_at_least_one() {
    assert!(MAX_DEVICE_PIXEL_RATIO >= 1.0);
}
