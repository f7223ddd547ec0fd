//! Scripted engine startup: off → cranking → caught → revving → idle.
//!
//! Every step has an absolute offset from the single trigger instant, and a
//! monotonic step index records how far the script has run. A late frame
//! applies all overdue steps in order, so observers may see several stages
//! collapse into one update.

use crate::constants::*;
use crate::state::EngineState;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StartupStage {
    Off,
    Cranking,
    Caught,
    Revving,
    IdleRunning,
}

/// Fields a step writes into [`EngineState`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageWrite {
    pub is_running: bool,
    pub is_starting: bool,
    pub engine_vibration: f32,
    pub wheel_speed: f32,
    pub current_rpm: f32,
}

impl StageWrite {
    fn apply(&self, state: &mut EngineState) {
        state.is_running = self.is_running;
        state.is_starting = self.is_starting;
        state.engine_vibration = self.engine_vibration;
        state.wheel_speed = self.wheel_speed;
        state.current_rpm = self.current_rpm;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StartupStep {
    /// Offset from the trigger.
    pub offset: Duration,
    pub stage: StartupStage,
    pub write: StageWrite,
}

pub const STARTUP_STEPS: [StartupStep; 4] = [
    StartupStep {
        offset: Duration::from_millis(STAGE_CRANK_MS),
        stage: StartupStage::Cranking,
        write: StageWrite {
            is_running: false,
            is_starting: true,
            engine_vibration: CRANK_VIBRATION,
            wheel_speed: 0.0,
            current_rpm: IDLE_RPM,
        },
    },
    StartupStep {
        offset: Duration::from_millis(STAGE_CATCH_MS),
        stage: StartupStage::Caught,
        write: StageWrite {
            is_running: false,
            is_starting: true,
            engine_vibration: CATCH_VIBRATION,
            wheel_speed: CATCH_WHEEL_SPEED,
            current_rpm: IDLE_RPM,
        },
    },
    StartupStep {
        offset: Duration::from_millis(STAGE_REV_MS),
        stage: StartupStage::Revving,
        write: StageWrite {
            is_running: true,
            is_starting: true,
            engine_vibration: REV_VIBRATION,
            wheel_speed: REV_WHEEL_SPEED,
            current_rpm: REV_RPM,
        },
    },
    StartupStep {
        offset: Duration::from_millis(STAGE_SETTLE_MS),
        stage: StartupStage::IdleRunning,
        write: StageWrite {
            is_running: true,
            is_starting: false,
            engine_vibration: SETTLE_VIBRATION,
            wheel_speed: SETTLE_WHEEL_SPEED,
            current_rpm: SETTLE_RPM,
        },
    },
];

#[derive(Clone, Debug)]
pub struct StartupSequencer {
    stage: StartupStage,
    triggered_at: Option<Duration>,
    next_step: usize,
}

impl Default for StartupSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl StartupSequencer {
    pub fn new() -> Self {
        Self {
            stage: StartupStage::Off,
            triggered_at: None,
            next_step: 0,
        }
    }

    pub fn stage(&self) -> StartupStage {
        self.stage
    }

    pub fn triggered_at(&self) -> Option<Duration> {
        self.triggered_at
    }

    /// Start the script at `now`. Only the first trigger counts; later ones
    /// return `false` and change nothing.
    pub fn trigger(&mut self, now: Duration, state: &mut EngineState) -> bool {
        if self.stage != StartupStage::Off {
            log::debug!("[startup] trigger ignored in {:?}", self.stage);
            return false;
        }
        self.stage = StartupStage::Cranking;
        self.triggered_at = Some(now);
        self.next_step = 0;
        state.is_starting = true;
        log::info!("[startup] triggered at {:.3}s", now.as_secs_f64());
        true
    }

    /// Apply every step that is due at `now`, oldest first. Returns how many
    /// steps ran.
    pub fn advance(&mut self, now: Duration, state: &mut EngineState) -> usize {
        let Some(t0) = self.triggered_at else {
            return 0;
        };
        let mut applied = 0;
        while let Some(step) = STARTUP_STEPS.get(self.next_step) {
            if now < t0 + step.offset {
                break;
            }
            step.write.apply(state);
            self.stage = step.stage;
            self.next_step += 1;
            applied += 1;
            log::info!(
                "[startup] {:?}: rpm={} wheel={} vibration={}",
                step.stage,
                step.write.current_rpm,
                step.write.wheel_speed,
                step.write.engine_vibration
            );
        }
        applied
    }

    /// When the next step is due, if any remain.
    pub fn next_deadline(&self) -> Option<Duration> {
        let t0 = self.triggered_at?;
        STARTUP_STEPS.get(self.next_step).map(|s| t0 + s.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_strictly_increasing() {
        for pair in STARTUP_STEPS.windows(2) {
            assert!(pair[0].offset < pair[1].offset);
            assert!(pair[0].stage < pair[1].stage);
        }
    }

    #[test]
    fn late_frame_applies_every_overdue_step() {
        let mut seq = StartupSequencer::new();
        let mut state = EngineState::default();
        assert!(seq.trigger(Duration::from_secs(10), &mut state));
        let applied = seq.advance(Duration::from_secs(13), &mut state);
        assert_eq!(applied, 3);
        assert_eq!(seq.stage(), StartupStage::Revving);
        assert_eq!(state.current_rpm, REV_RPM);
        assert_eq!(seq.next_deadline(), Some(Duration::from_secs(14)));
    }

    #[test]
    fn second_trigger_is_ignored() {
        let mut seq = StartupSequencer::new();
        let mut state = EngineState::default();
        assert!(seq.trigger(Duration::ZERO, &mut state));
        seq.advance(Duration::from_millis(600), &mut state);
        assert!(!seq.trigger(Duration::from_millis(700), &mut state));
        assert_eq!(seq.triggered_at(), Some(Duration::ZERO));
    }
}
