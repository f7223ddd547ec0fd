//! Owns the engine state and wires the startup script, scroll input, engine
//! sound and scene motion together.
//!
//! Single-threaded: the host calls [`SceneController::tick`] and
//! [`SceneController::frame`] from its render loop and forwards input events
//! as they arrive. Time is whatever monotonic clock the host uses, expressed
//! as a [`Duration`] since an arbitrary origin.

use crate::audio::{AudioError, AudioPlatform};
use crate::config::SceneConfig;
use crate::hud::HudView;
use crate::motion::MotionDriver;
use crate::scene::Scene;
use crate::scroll::ScrollMapper;
use crate::sequencer::{StartupSequencer, StartupStage};
use crate::state::{EngineState, FrameInfo};
use crate::synth::EngineSynth;
use std::time::Duration;

pub struct SceneController<P: AudioPlatform> {
    config: SceneConfig,
    state: EngineState,
    sequencer: StartupSequencer,
    scroll: ScrollMapper,
    motion: MotionDriver,
    synth: EngineSynth<P>,
    /// Last RPM handed to the synthesizer.
    pushed_rpm: Option<f32>,
    /// Audio-clock end of the scheduled startup sound. RPM pushes wait for
    /// it, or the script's own idle ramps would land on top of them.
    script_ends_at: Option<f64>,
    disposed: bool,
}

impl<P: AudioPlatform> SceneController<P> {
    pub fn new(platform: P, config: SceneConfig) -> Self {
        let motion = MotionDriver::new(config.seed.wrapping_add(1));
        Self {
            state: EngineState::default(),
            sequencer: StartupSequencer::new(),
            scroll: ScrollMapper::new(),
            motion,
            synth: EngineSynth::new(platform),
            pushed_rpm: None,
            script_ends_at: None,
            disposed: false,
            config,
        }
    }

    /// Copy of the current engine state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn stage(&self) -> StartupStage {
        self.sequencer.stage()
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn synth(&self) -> &EngineSynth<P> {
        &self.synth
    }

    pub fn synth_mut(&mut self) -> &mut EngineSynth<P> {
        &mut self.synth
    }

    pub fn hud(&self) -> HudView {
        HudView::derive(&self.state)
    }

    /// When the next startup stage is due, while the script is still running.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.sequencer.next_deadline()
    }

    /// Start the engine on the first user interaction.
    ///
    /// Returns `Ok(false)` when the engine is already starting or running.
    /// If the platform refuses an audio output the state stays untouched and
    /// a later interaction may try again.
    pub fn start_engine(&mut self, now: Duration) -> Result<bool, AudioError> {
        if self.disposed || self.sequencer.stage() != StartupStage::Off {
            log::debug!("[controller] start ignored in {:?}", self.sequencer.stage());
            return Ok(false);
        }
        if self.config.audio_enabled {
            let playback = self.synth.play_startup()?;
            log::debug!(
                "[controller] startup sound runs until t={:.3}",
                playback.finishes_at
            );
            self.script_ends_at = Some(playback.finishes_at);
        }
        self.pushed_rpm = None;
        Ok(self.sequencer.trigger(now, &mut self.state))
    }

    /// Record the latest page scroll. Folded into the state on the next tick.
    pub fn report_scroll(&mut self, scroll_y: f32, viewport_height: f32) {
        self.scroll.report(scroll_y, viewport_height);
    }

    /// Advance the startup script, apply pending scroll and retune the sound.
    pub fn tick(&mut self, now: Duration) {
        if self.disposed {
            return;
        }
        self.sequencer.advance(now, &mut self.state);
        self.scroll.apply(&mut self.state);
        if let Some(end) = self.script_ends_at {
            // A lost output has no script left to wait for.
            if self.synth.current_time().map_or(true, |t| t >= end) {
                self.script_ends_at = None;
            }
        }
        let rpm = self.state.current_rpm;
        let audio_settled = self.script_ends_at.is_none();
        if self.state.is_running && audio_settled && self.pushed_rpm != Some(rpm) {
            if let Err(e) = self.synth.set_rpm(rpm) {
                log::warn!("[controller] rpm update failed: {e}");
            }
            self.pushed_rpm = Some(rpm);
        }
        self.synth.poll();
    }

    /// Animate the mounted scene for one rendered frame.
    pub fn frame(&mut self, elapsed: f32, viewport_width: f32, scene: &mut Scene) {
        let info = FrameInfo {
            elapsed,
            viewport_width,
        };
        self.motion.update(&self.state, info, scene.handles());
    }

    /// Throttle blip. Only once the engine has settled.
    pub fn rev(&mut self) -> bool {
        if self.disposed || !self.config.audio_enabled || !self.state.is_settled() {
            return false;
        }
        match self.synth.play_rev() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("[controller] rev failed: {e}");
                false
            }
        }
    }

    /// Fade the engine sound out. The visuals and the state keep running.
    pub fn stop_audio(&mut self) {
        if let Err(e) = self.synth.stop() {
            log::warn!("[controller] stop failed: {e}");
        }
    }

    /// Release the audio output. Further calls are no-ops.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.synth.teardown();
        self.disposed = true;
        log::info!("[controller] disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl<P: AudioPlatform> Drop for SceneController<P> {
    fn drop(&mut self) {
        self.dispose();
    }
}
