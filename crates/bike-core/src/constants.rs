// Shared audio/visual tuning constants used by both web and native frontends.
//
// These values were tuned by ear and eye; keep them literal.

// Engine state defaults
pub const IDLE_RPM: f32 = 1200.0;

// Scroll mapping (applied only once the engine has settled)
pub const SCROLL_WHEEL_BASE: f32 = 0.1;
pub const SCROLL_WHEEL_SPAN: f32 = 0.2;
pub const SCROLL_RPM_BASE: f32 = 1800.0;
pub const SCROLL_RPM_SPAN: f32 = 2000.0;

// Engine audio: RPM -> voice retuning
pub const RPM_RAMP_SEC: f64 = 0.1; // short ramp avoids clicks on retune
pub const VOICE_MULTIPLIERS: [f32; 5] = [1.0, 2.0, 4.0, 6.0, 0.5];
pub const FILTER0_BASE_HZ: f32 = 150.0;
pub const FILTER0_HZ_PER_RPM: f32 = 0.5;
pub const MASTER_GAIN_BASE: f32 = 0.3;
pub const MASTER_GAIN_PER_RPM: f32 = 0.0001;
pub const MASTER_GAIN_MAX: f32 = 0.5;
pub const STOP_FADE_SEC: f64 = 0.5;

// Startup sound timeline (seconds from play_startup)
pub const STARTUP_DURATION_SEC: f64 = 4.5;
pub const STARTER_STOP_SEC: f64 = 3.0;
pub const IGNITION_POP_SEC: f64 = 2.0;
pub const IGNITION_POP_PEAK_SEC: f64 = 2.05;
pub const IGNITION_POP_DECAY_SEC: f64 = 2.3;
pub const VOICES_START_SEC: f64 = 2.3;
pub const MASTER_FADE_IN_END_SEC: f64 = 2.8;
pub const MASTER_FADE_IN_PEAK: f32 = 0.5;
pub const IDLE_MASTER_GAIN: f32 = 0.35;
pub const REV_START_SEC: f64 = 2.5;
pub const REV_PEAK_SEC: f64 = 3.0;
pub const REV_FALL_SEC: f64 = 3.5;

// Startup sequencer: (offset ms, vibration, wheel speed, rpm)
pub const STAGE_CRANK_MS: u64 = 500;
pub const STAGE_CATCH_MS: u64 = 1500;
pub const STAGE_REV_MS: u64 = 2500;
pub const STAGE_SETTLE_MS: u64 = 4000;

pub const CRANK_VIBRATION: f32 = 0.003;
pub const CATCH_VIBRATION: f32 = 0.008;
pub const CATCH_WHEEL_SPEED: f32 = 0.02;
pub const REV_VIBRATION: f32 = 0.006;
pub const REV_WHEEL_SPEED: f32 = 0.06;
pub const REV_RPM: f32 = 2500.0;
pub const SETTLE_VIBRATION: f32 = 0.003;
pub const SETTLE_WHEEL_SPEED: f32 = 0.1;
pub const SETTLE_RPM: f32 = 1800.0;

// Visual motion
pub const BODY_THUMP_HZ: f32 = 50.0; // single-cylinder thump proxy
pub const BODY_FLEX_HZ: f32 = 40.0; // chassis flex, deliberately not a harmonic of the thump
pub const BODY_ROLL_AMPLITUDE: f32 = 0.003;
pub const RIG_HOVER_HZ: f32 = 2.0;
pub const RIG_HOVER_AMPLITUDE: f32 = 0.02;
pub const RIG_BASE_Y: f32 = -0.3;
pub const RIG_BASE_YAW: f32 = -0.3;
pub const RIG_YAW_SPAN: f32 = 0.3;
pub const RIG_SCALE_DIVISOR: f32 = 12.0;
pub const RIG_SCALE_MAX: f32 = 0.85;

// Exhaust smoke
pub const SMOKE_PARTICLES: usize = 50;
pub const SMOKE_ORIGIN_X: f32 = 1.5;
pub const SMOKE_ORIGIN_Y: f32 = -0.5;
pub const SMOKE_ORIGIN_Z: f32 = 0.4;
pub const SMOKE_SPREAD_X: f32 = 0.5;
pub const SMOKE_SPREAD_Y: f32 = 0.3;
pub const SMOKE_SPREAD_Z: f32 = 0.2;
pub const SMOKE_STEP_X: f32 = 0.02;
pub const SMOKE_JITTER_X: f32 = 0.01;
pub const SMOKE_STEP_Y: f32 = 0.005;
pub const SMOKE_JITTER_Y: f32 = 0.005;
pub const SMOKE_RECYCLE_X: f32 = 3.0;

// Road markings
pub const ROAD_STEP: f32 = 0.15;
pub const ROAD_TILE_PERIOD: f32 = 4.0;

// Lamps (emissive intensity off/on)
pub const HEADLAMP_IDLE: f32 = 0.3;
pub const HEADLAMP_RUNNING: f32 = 2.0;
pub const TAILLAMP_IDLE: f32 = 0.2;
pub const TAILLAMP_RUNNING: f32 = 1.0;

// Camera
pub const CAMERA_EYE: [f32; 3] = [0.0, 1.5, 8.0];
pub const CAMERA_FOVY_DEG: f32 = 45.0;

// Page presentation
pub const FADE_IN_SEC: f32 = 1.5;
