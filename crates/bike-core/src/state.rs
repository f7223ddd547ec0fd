//! Engine and camera state shared between the controller and the frontends.
//!
//! These types avoid referencing platform-specific APIs and are suitable for
//! both native and web targets.

use crate::constants::{CAMERA_EYE, CAMERA_FOVY_DEG, IDLE_RPM};
use glam::{Mat4, Vec3};

/// Snapshot of the running engine.
///
/// Owned by [`crate::SceneController`]; everyone else gets copies. The audio
/// and visual consumers never talk to each other, they only read this.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineState {
    pub is_running: bool,
    pub is_starting: bool,
    pub current_rpm: f32,
    /// Radians of wheel rotation per rendered frame.
    pub wheel_speed: f32,
    pub engine_vibration: f32,
    /// Fraction of one viewport height scrolled, in \[0, 1\].
    pub scroll_progress: f32,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            is_running: false,
            is_starting: false,
            current_rpm: IDLE_RPM,
            wheel_speed: 0.0,
            engine_vibration: 0.0,
            scroll_progress: 0.0,
        }
    }
}

impl EngineState {
    /// True once the startup sequence has settled; scroll may drive speed/RPM.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.is_running && !self.is_starting
    }
}

/// Per-frame inputs supplied by the render host.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInfo {
    /// Seconds since the render clock started.
    pub elapsed: f32,
    /// Visible width in world units at the scene origin.
    pub viewport_width: f32,
}

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    /// Hero-scene camera looking at the origin.
    pub fn hero(aspect: f32) -> Self {
        Self {
            eye: Vec3::from(CAMERA_EYE),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect,
            fovy_radians: CAMERA_FOVY_DEG.to_radians(),
            znear: 0.1,
            zfar: 100.0,
        }
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }
    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Width of the view frustum at the target plane, in world units.
    pub fn viewport_width(&self) -> f32 {
        let distance = (self.eye - self.target).length();
        2.0 * distance * (self.fovy_radians * 0.5).tan() * self.aspect
    }
}
