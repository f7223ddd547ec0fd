//! Per-frame animation of the mounted scene from the engine state.
//!
//! Called once per rendered frame. Reads a snapshot of [`EngineState`], never
//! writes it, and touches only the handles that are present.

use crate::constants::*;
use crate::scene::SceneHandles;
use crate::state::{EngineState, FrameInfo};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub struct MotionDriver {
    rng: StdRng,
    /// Road travel, kept wrapped to one marking period.
    road_travel: f32,
}

impl MotionDriver {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            road_travel: 0.0,
        }
    }

    pub fn road_travel(&self) -> f32 {
        self.road_travel
    }

    pub fn update(&mut self, state: &EngineState, frame: FrameInfo, handles: SceneHandles<'_>) {
        let t = frame.elapsed;
        let running = state.is_running;

        if running {
            for wheel in [handles.front_wheel, handles.rear_wheel].into_iter().flatten() {
                wheel.rotation.z -= state.wheel_speed;
            }
            if let Some(body) = handles.body {
                body.translation.y = (t * BODY_THUMP_HZ).sin() * state.engine_vibration;
                body.rotation.z = (t * BODY_FLEX_HZ).sin() * BODY_ROLL_AMPLITUDE;
            }
        }

        if let Some(rig) = handles.rig {
            if running {
                rig.translation.y = (t * RIG_HOVER_HZ).sin() * RIG_HOVER_AMPLITUDE + RIG_BASE_Y;
            }
            rig.rotation.y = RIG_BASE_YAW + state.scroll_progress * RIG_YAW_SPAN;
            let scale = (frame.viewport_width / RIG_SCALE_DIVISOR).min(RIG_SCALE_MAX);
            rig.scale = glam::Vec3::splat(scale.max(0.0));
        }

        if let Some(smoke) = handles.smoke {
            smoke.visible = running;
            if running {
                smoke.advance(&mut self.rng);
            }
        }

        if running {
            self.road_travel = (self.road_travel + ROAD_STEP) % ROAD_TILE_PERIOD;
            if let Some(road) = handles.road_markings {
                road.translation.x = -self.road_travel;
            }
        }

        if let Some(lamps) = handles.lamps {
            (lamps.headlamp, lamps.taillamp) = if running {
                (HEADLAMP_RUNNING, TAILLAMP_RUNNING)
            } else {
                (HEADLAMP_IDLE, TAILLAMP_IDLE)
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::scene::Scene;

    fn running() -> EngineState {
        EngineState {
            is_running: true,
            wheel_speed: 0.1,
            engine_vibration: 0.003,
            ..EngineState::default()
        }
    }

    #[test]
    fn idle_scene_only_tracks_scroll_and_viewport() {
        let mut scene = Scene::mounted(&SceneConfig::default());
        let mut driver = MotionDriver::new(1);
        let state = EngineState {
            scroll_progress: 1.0,
            ..EngineState::default()
        };
        let frame = FrameInfo {
            elapsed: 0.7,
            viewport_width: 6.0,
        };
        driver.update(&state, frame, scene.handles());

        let rig = scene.rig.unwrap_or_default();
        assert_eq!(rig.rotation.y, 0.0);
        assert_eq!(rig.scale.x, 0.5);
        assert_eq!(rig.translation.y, RIG_BASE_Y);
        assert_eq!(scene.front_wheel.unwrap_or_default().rotation.z, 0.0);
        assert_eq!(driver.road_travel(), 0.0);
        assert!(!scene.smoke.as_ref().is_some_and(|s| s.visible));
    }

    #[test]
    fn road_wraps_at_the_tile_period() {
        let mut scene = Scene::mounted(&SceneConfig::default());
        let mut driver = MotionDriver::new(1);
        let frame = FrameInfo {
            elapsed: 0.0,
            viewport_width: 20.0,
        };
        for _ in 0..30 {
            driver.update(&running(), frame, scene.handles());
        }
        // 30 * 0.15 = 4.5, one full period plus 0.5
        assert!((driver.road_travel() - 0.5).abs() < 1e-4);
        let x = scene.road_markings.unwrap_or_default().translation.x;
        assert!((x + 0.5).abs() < 1e-4);
        assert_eq!(scene.rig.unwrap_or_default().scale.x, RIG_SCALE_MAX);
    }
}
