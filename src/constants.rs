/// DOM element ids and page-level tuning for the web front-end.
///
/// Kept free of `web_sys` so the host test suite can include it directly.
pub const CANVAS_ID: &str = "bike-canvas";

// HUD overlay
pub const HUD_ID: &str = "hud";
pub const HUD_TITLE_ID: &str = "hud-title";
pub const HUD_DETAIL_ID: &str = "hud-detail";
pub const PROGRESS_BAR_ID: &str = "scroll-progress";

/// Class toggled on the HUD root; styling hooks off these.
pub const HUD_CLASS_PROMPT: &str = "hud-prompt";
pub const HUD_CLASS_STARTING: &str = "hud-starting";
pub const HUD_CLASS_RUNNING: &str = "hud-running";

/// Backing store is capped so high-DPI phones do not allocate huge surfaces.
pub const MAX_DEVICE_PIXEL_RATIO: f64 = 2.0;
