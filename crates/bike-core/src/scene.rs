//! Render-host-owned scene graph for the hero motorcycle.
//!
//! Every handle is optional: a host may mount parts of the scene over several
//! frames, and the motion driver skips whatever is not there yet.

use crate::config::SceneConfig;
use crate::constants::*;
use crate::model::{BikeModel, Glow, Instance, SMOKE_COLOR, SMOKE_SIZE};
use glam::{EulerRot, Mat4, Quat, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Position, Euler rotation (XYZ, radians) and scale of one scene group.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn at(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        let r = self.rotation;
        Mat4::from_scale_rotation_translation(
            self.scale,
            Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z),
            self.translation,
        )
    }
}

/// Fixed arena of exhaust particles, positions in rig space.
#[derive(Clone, Debug)]
pub struct ExhaustSmoke {
    particles: Vec<Vec3>,
    pub visible: bool,
}

impl ExhaustSmoke {
    pub fn new<R: Rng>(count: usize, rng: &mut R) -> Self {
        let particles = (0..count)
            .map(|_| {
                Vec3::new(
                    SMOKE_ORIGIN_X + rng.gen::<f32>() * SMOKE_SPREAD_X,
                    SMOKE_ORIGIN_Y + rng.gen::<f32>() * SMOKE_SPREAD_Y,
                    SMOKE_ORIGIN_Z + rng.gen::<f32>() * SMOKE_SPREAD_Z,
                )
            })
            .collect();
        Self {
            particles,
            visible: false,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Vec3] {
        &self.particles
    }

    /// Drift every particle away from the exhaust and recycle the ones past
    /// the bound. Works in place; the arena never grows.
    pub fn advance<R: Rng>(&mut self, rng: &mut R) {
        for p in self.particles.iter_mut() {
            p.x += SMOKE_STEP_X + rng.gen::<f32>() * SMOKE_JITTER_X;
            p.y += SMOKE_STEP_Y + rng.gen::<f32>() * SMOKE_JITTER_Y;
            if p.x > SMOKE_RECYCLE_X {
                p.x = SMOKE_ORIGIN_X;
                p.y = SMOKE_ORIGIN_Y + rng.gen::<f32>() * SMOKE_SPREAD_Y;
            }
        }
    }
}

/// Emissive intensity of the head and tail lamps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lamps {
    pub headlamp: f32,
    pub taillamp: f32,
}

impl Default for Lamps {
    fn default() -> Self {
        Self {
            headlamp: HEADLAMP_IDLE,
            taillamp: TAILLAMP_IDLE,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    /// Camera-relative group holding the whole bike.
    pub rig: Option<Transform>,
    pub body: Option<Transform>,
    pub front_wheel: Option<Transform>,
    pub rear_wheel: Option<Transform>,
    pub road_markings: Option<Transform>,
    pub smoke: Option<ExhaustSmoke>,
    pub lamps: Option<Lamps>,
}

/// Mutable borrows of whichever scene groups are mounted this frame.
#[derive(Debug, Default)]
pub struct SceneHandles<'a> {
    pub rig: Option<&'a mut Transform>,
    pub body: Option<&'a mut Transform>,
    pub front_wheel: Option<&'a mut Transform>,
    pub rear_wheel: Option<&'a mut Transform>,
    pub road_markings: Option<&'a mut Transform>,
    pub smoke: Option<&'a mut ExhaustSmoke>,
    pub lamps: Option<&'a mut Lamps>,
}

impl Scene {
    /// Nothing mounted yet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every group in its rest pose.
    pub fn mounted(config: &SceneConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        Self {
            rig: Some(Transform {
                translation: Vec3::new(0.0, RIG_BASE_Y, 0.0),
                rotation: Vec3::new(0.0, RIG_BASE_YAW, 0.0),
                scale: Vec3::splat(RIG_SCALE_MAX),
            }),
            body: Some(Transform::default()),
            front_wheel: Some(Transform::at(Vec3::new(-1.7, -0.85, 0.0))),
            rear_wheel: Some(Transform::at(Vec3::new(1.7, -0.85, 0.0))),
            road_markings: Some(Transform::at(Vec3::new(0.0, -2.3, 0.0))),
            smoke: Some(ExhaustSmoke::new(config.particle_count, &mut rng)),
            lamps: Some(Lamps::default()),
        }
    }

    pub fn handles(&mut self) -> SceneHandles<'_> {
        SceneHandles {
            rig: self.rig.as_mut(),
            body: self.body.as_mut(),
            front_wheel: self.front_wheel.as_mut(),
            rear_wheel: self.rear_wheel.as_mut(),
            road_markings: self.road_markings.as_mut(),
            smoke: self.smoke.as_mut(),
            lamps: self.lamps.as_mut(),
        }
    }

    /// Flatten the mounted groups into instance data, reusing `out`'s storage.
    pub fn instances(&self, model: &BikeModel, out: &mut Vec<Instance>) {
        out.clear();
        let rig = self.rig.map(|t| t.matrix()).unwrap_or(Mat4::IDENTITY);
        let lamps = self.lamps.unwrap_or_default();

        if let Some(body) = &self.body {
            let m = rig * body.matrix();
            out.extend(model.body.iter().map(|part| {
                let emissive = match part.glow {
                    Glow::None => 0.0,
                    Glow::Headlamp => lamps.headlamp,
                    Glow::Taillamp => lamps.taillamp,
                };
                Instance::new(m * part.local, part.color, emissive)
            }));
        }
        for wheel in [&self.front_wheel, &self.rear_wheel].into_iter().flatten() {
            let m = rig * wheel.matrix();
            out.extend(
                model
                    .wheel
                    .iter()
                    .map(|part| Instance::new(m * part.local, part.color, 0.0)),
            );
        }
        out.extend(
            model
                .ground
                .iter()
                .map(|part| Instance::new(part.local, part.color, 0.0)),
        );
        if let Some(road) = &self.road_markings {
            let m = road.matrix();
            out.extend(
                model
                    .road_markings
                    .iter()
                    .map(|part| Instance::new(m * part.local, part.color, 0.0)),
            );
        }
        if let Some(smoke) = self.smoke.as_ref().filter(|s| s.visible) {
            let size = Vec3::splat(SMOKE_SIZE);
            out.extend(smoke.particles().iter().map(|p| {
                let local = Mat4::from_scale_rotation_translation(size, Quat::IDENTITY, *p);
                Instance::new(rig * local, SMOKE_COLOR, 0.0)
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_starts_inside_the_emission_box() {
        let mut rng = StdRng::seed_from_u64(7);
        let smoke = ExhaustSmoke::new(SMOKE_PARTICLES, &mut rng);
        assert_eq!(smoke.len(), SMOKE_PARTICLES);
        for p in smoke.particles() {
            assert!(p.x >= SMOKE_ORIGIN_X && p.x <= SMOKE_ORIGIN_X + SMOKE_SPREAD_X);
            assert!(p.y >= SMOKE_ORIGIN_Y && p.y <= SMOKE_ORIGIN_Y + SMOKE_SPREAD_Y);
            assert!(p.z >= SMOKE_ORIGIN_Z && p.z <= SMOKE_ORIGIN_Z + SMOKE_SPREAD_Z);
        }
    }

    #[test]
    fn hidden_smoke_emits_no_instances() {
        let config = SceneConfig::default();
        let model = BikeModel::himalayan();
        let mut scene = Scene::mounted(&config);
        let mut out = Vec::new();
        scene.instances(&model, &mut out);
        let hidden = out.len();
        assert_eq!(hidden, model.instance_capacity(0));

        if let Some(smoke) = scene.smoke.as_mut() {
            smoke.visible = true;
        }
        scene.instances(&model, &mut out);
        assert_eq!(out.len(), hidden + config.particle_count);
    }

    #[test]
    fn lamp_intensity_reaches_the_instance() {
        let model = BikeModel::himalayan();
        let mut scene = Scene::mounted(&SceneConfig::default());
        scene.lamps = Some(Lamps {
            headlamp: HEADLAMP_RUNNING,
            taillamp: TAILLAMP_RUNNING,
        });
        let mut out = Vec::new();
        scene.instances(&model, &mut out);
        let glows: Vec<f32> = out.iter().map(|i| i.color[3]).filter(|e| *e > 0.0).collect();
        assert_eq!(glows, vec![HEADLAMP_RUNNING, TAILLAMP_RUNNING]);
    }
}
