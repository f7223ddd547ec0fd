//! Platform-free core of the thumper hero scene.
//!
//! The web and native frontends own the window, the render loop and the
//! platform audio output; everything they animate or play is decided here.

pub mod audio;
pub mod automation;
pub mod config;
pub mod constants;
pub mod controller;
pub mod hud;
pub mod model;
pub mod motion;
pub mod scene;
pub mod scroll;
pub mod sequencer;
pub mod soft;
pub mod state;
pub mod synth;

pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");

pub use audio::*;
pub use automation::*;
pub use config::*;
pub use controller::*;
pub use hud::*;
pub use model::*;
pub use motion::*;
pub use scene::*;
pub use scroll::*;
pub use sequencer::*;
pub use soft::*;
pub use state::*;
pub use synth::*;
