//! Runtime knobs for one hero scene instance.

use crate::constants::{FADE_IN_SEC, SMOKE_PARTICLES};

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    /// Seed for the exhaust-smoke jitter.
    pub seed: u64,
    pub particle_count: usize,
    /// Seconds for the canvas to fade in after load.
    pub fade_in_sec: f32,
    /// When false the controller never acquires an audio output.
    pub audio_enabled: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: 0x7417_4ca1,
            particle_count: SMOKE_PARTICLES,
            fade_in_sec: FADE_IN_SEC,
            audio_enabled: true,
        }
    }
}

impl SceneConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn muted(mut self) -> Self {
        self.audio_enabled = false;
        self
    }
}
