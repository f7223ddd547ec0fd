//! Static geometry of the hero motorcycle, expressed as coloured boxes.
//!
//! Every part is a unit cube scaled, rotated and placed inside its group. The
//! renderer draws one instanced cube mesh, so a part only needs a local matrix
//! and a colour.

use bytemuck::{Pod, Zeroable};
use glam::{EulerRot, Mat4, Quat, Vec3};
use std::f32::consts::{PI, TAU};

/// Per-instance data consumed by the scene shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Instance {
    pub model: [[f32; 4]; 4],
    /// rgb albedo, w = emissive intensity.
    pub color: [f32; 4],
}

impl Instance {
    pub fn new(model: Mat4, rgb: [f32; 3], emissive: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: [rgb[0], rgb[1], rgb[2], emissive],
        }
    }
}

/// Which lamp, if any, a part belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Glow {
    None,
    Headlamp,
    Taillamp,
}

#[derive(Clone, Copy, Debug)]
pub struct Part {
    pub local: Mat4,
    pub color: [f32; 3],
    pub glow: Glow,
}

impl Part {
    fn new(center: [f32; 3], size: [f32; 3], rotation: [f32; 3], color: u32) -> Self {
        let rotation = Quat::from_euler(EulerRot::XYZ, rotation[0], rotation[1], rotation[2]);
        Self {
            local: Mat4::from_scale_rotation_translation(
                Vec3::from(size),
                rotation,
                Vec3::from(center),
            ),
            color: hex(color),
            glow: Glow::None,
        }
    }

    fn glowing(mut self, glow: Glow) -> Self {
        self.glow = glow;
        self
    }
}

/// `0xRRGGBB` to normalized rgb.
pub const fn hex(rgb: u32) -> [f32; 3] {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
    ]
}

pub const SMOKE_COLOR: [f32; 3] = hex(0x666666);
pub const SMOKE_SIZE: f32 = 0.08;

/// Box parts grouped by the transform that moves them.
#[derive(Clone, Debug)]
pub struct BikeModel {
    /// Frame, tank, engine, lamps. Child of the body transform.
    pub body: Vec<Part>,
    /// One wheel; drawn under both wheel transforms.
    pub wheel: Vec<Part>,
    /// Centre-line stripes, child of the road transform.
    pub road_markings: Vec<Part>,
    /// Road surface, fixed in world space.
    pub ground: Vec<Part>,
}

impl BikeModel {
    pub fn himalayan() -> Self {
        Self {
            body: body_parts(),
            wheel: wheel_parts(),
            road_markings: (0..20)
                .map(|i| {
                    Part::new(
                        [-10.0 + i as f32 * 2.0, 0.01, 0.0],
                        [0.8, 0.01, 0.15],
                        [0.0; 3],
                        0xffcc00,
                    )
                })
                .collect(),
            ground: vec![Part::new([0.0, -2.3, 0.0], [30.0, 0.02, 20.0], [0.0; 3], 0x1a1a1a)],
        }
    }

    /// Upper bound on instances a fully mounted scene produces.
    pub fn instance_capacity(&self, particles: usize) -> usize {
        self.body.len() + self.wheel.len() * 2 + self.road_markings.len() + self.ground.len()
            + particles
    }
}

impl Default for BikeModel {
    fn default() -> Self {
        Self::himalayan()
    }
}

fn body_parts() -> Vec<Part> {
    let mut parts = vec![
        // frame
        Part::new([0.0, 0.4, 0.0], [3.0, 0.12, 0.12], [0.0, 0.0, 0.08 * PI], 0x1a1a1a),
        Part::new([-0.8, -0.1, 0.0], [0.1, 1.5, 0.1], [0.0, 0.0, -0.5], 0x1a1a1a),
        // tank
        Part::new([-0.2, 1.0, 0.0], [1.1, 0.9, 1.0], [0.0; 3], 0x1e3a5f),
        Part::new([0.1, 0.9, 0.0], [1.04, 0.64, 0.72], [0.0; 3], 0x1e3a5f),
        Part::new([-0.2, 1.05, 0.56], [0.8, 0.1, 0.02], [0.0; 3], 0xff4500),
        Part::new([-0.2, 1.2, 0.56], [0.24, 0.24, 0.02], [0.0; 3], 0xc0a000),
        Part::new([-0.2, 1.55, 0.0], [0.16, 0.05, 0.16], [0.0; 3], 0x333333),
        // seat and rack
        Part::new([0.7, 0.7, 0.0], [1.4, 0.2, 0.55], [0.0; 3], 0x1a1a1a),
        Part::new([0.7, 0.81, 0.0], [1.3, 0.01, 0.02], [0.0; 3], 0x333333),
        Part::new([1.5, 0.9, 0.0], [0.5, 0.05, 0.4], [0.0, 0.0, 0.1], 0x222222),
        Part::new([1.3, 0.75, 0.18], [0.04, 0.3, 0.04], [0.0; 3], 0x222222),
        Part::new([1.3, 0.75, -0.18], [0.04, 0.3, 0.04], [0.0; 3], 0x222222),
        // engine
        Part::new([0.0, -0.1, 0.0], [0.7, 0.65, 0.5], [0.0; 3], 0x2a2a2a),
        Part::new([-0.1, 0.25, 0.0], [0.38, 0.5, 0.38], [0.0, 0.0, 0.15], 0x1a1a1a),
        Part::new([-0.15, 0.55, 0.0], [0.35, 0.15, 0.35], [0.0, 0.0, 0.15], 0x333333),
        Part::new([0.1, -0.4, 0.0], [0.5, 0.25, 0.4], [0.0; 3], 0x1a1a1a),
        // exhaust
        Part::new([0.2, -0.35, 0.35], [0.6, 0.12, 0.12], [0.0, 0.0, 0.3], 0x444444),
        Part::new([1.0, -0.45, 0.45], [1.2, 0.18, 0.18], [0.0, 0.0, -0.05], 0x333333),
        Part::new([1.6, -0.5, 0.45], [0.15, 0.2, 0.2], [0.0; 3], 0x222222),
        Part::new([1.0, -0.45, 0.55], [0.8, 0.24, 0.02], [0.0, 0.0, -0.05], 0x555555),
        // front fork, mudguard, bars
        Part::new([-1.4, 0.2, 0.15], [0.12, 2.0, 0.12], [0.0, 0.0, -0.35], 0xc0c0c0),
        Part::new([-1.4, 0.2, -0.15], [0.12, 2.0, 0.12], [0.0, 0.0, -0.35], 0xc0c0c0),
        Part::new([-1.1, 0.8, 0.0], [0.15, 0.08, 0.5], [0.0; 3], 0x222222),
        Part::new([-1.7, -0.3, 0.0], [0.9, 0.06, 0.5], [0.0, 0.0, 0.3], 0x1e3a5f),
        Part::new([-1.1, 1.2, 0.0], [0.05, 0.05, 1.1], [0.0; 3], 0x222222),
        Part::new([-1.1, 1.1, 0.2], [0.04, 0.2, 0.04], [0.0; 3], 0x222222),
        Part::new([-1.1, 1.1, -0.2], [0.04, 0.2, 0.04], [0.0; 3], 0x222222),
        Part::new([-1.1, 1.2, 0.5], [0.07, 0.07, 0.15], [0.0; 3], 0x1a1a1a),
        Part::new([-1.1, 1.2, -0.5], [0.07, 0.07, 0.15], [0.0; 3], 0x1a1a1a),
        Part::new([-1.0, 1.35, 0.55], [0.16, 0.16, 0.16], [0.0; 3], 0x111111),
        Part::new([-1.0, 1.35, -0.55], [0.16, 0.16, 0.16], [0.0; 3], 0x111111),
        // headlamp
        Part::new([-1.6, 0.9, 0.0], [0.15, 0.44, 0.44], [0.0; 3], 0x222222),
        Part::new([-1.68, 0.9, 0.0], [0.02, 0.36, 0.36], [0.0; 3], 0xffffee)
            .glowing(Glow::Headlamp),
        Part::new([-1.7, 0.9, 0.0], [0.02, 0.4, 0.4], [0.0; 3], 0x333333),
        // rear
        Part::new([1.1, -0.2, 0.0], [1.3, 0.12, 0.2], [0.0, 0.0, 0.15], 0x1a1a1a),
        Part::new([1.3, 0.1, 0.0], [1.0, 0.06, 0.4], [0.0, 0.0, -0.2], 0x1e3a5f),
        Part::new([1.8, 0.5, 0.0], [0.08, 0.1, 0.15], [0.0; 3], 0xff0000)
            .glowing(Glow::Taillamp),
        Part::new([0.5, 0.2, 0.35], [0.6, 0.4, 0.05], [0.0; 3], 0x1e3a5f),
        Part::new([0.5, 0.2, -0.35], [0.6, 0.4, 0.05], [0.0; 3], 0x1e3a5f),
        Part::new([0.3, -0.7, 0.3], [0.05, 0.6, 0.05], [0.3, 0.0, 0.7], 0x333333),
    ];
    // cooling fins
    parts.extend((0..8).map(|i| {
        Part::new(
            [-0.1, 0.1 + i as f32 * 0.05, 0.0],
            [0.45, 0.01, 0.55],
            [0.0, 0.0, 0.15],
            0x222222,
        )
    }));
    parts
}

fn wheel_parts() -> Vec<Part> {
    let mut parts = Vec::with_capacity(112);
    // Rings are approximated by boxes laid tangentially around the hub.
    let ring = |parts: &mut Vec<Part>, count: usize, radius: f32, tube: f32, color: u32| {
        let chord = TAU * radius / count as f32;
        for i in 0..count {
            let a = i as f32 * TAU / count as f32;
            parts.push(Part::new(
                [a.cos() * radius, a.sin() * radius, 0.0],
                [tube * 2.0, chord, tube * 2.0],
                [0.0, 0.0, a],
                color,
            ));
        }
    };
    ring(&mut parts, 24, 1.2, 0.35, 0x1a1a1a);
    ring(&mut parts, 24, 0.85, 0.12, 0x2a2a2a);
    for i in 0..24 {
        let a = i as f32 * TAU / 24.0;
        parts.push(Part::new(
            [a.cos() * 1.55, a.sin() * 1.55, 0.0],
            [0.15, 0.08, 0.25],
            [0.0, 0.0, a],
            0x0d0d0d,
        ));
    }
    for i in 0..36 {
        let a = i as f32 * TAU / 36.0;
        let z = if i % 2 == 0 { 0.08 } else { -0.08 };
        parts.push(Part::new(
            [a.cos() * 0.35, a.sin() * 0.35, z],
            [0.008, 0.55, 0.015],
            [0.0, 0.0, a],
            0xc0c0c0,
        ));
    }
    parts.push(Part::new([0.0; 3], [0.36, 0.36, 0.4], [0.0; 3], 0x333333));
    parts.push(Part::new([0.0, 0.0, 0.22], [0.24, 0.24, 0.05], [0.0; 3], 0xff4500));
    parts.push(Part::new([0.0, 0.0, -0.22], [0.24, 0.24, 0.05], [0.0; 3], 0xff4500));
    parts.push(Part::new([0.0, 0.0, -0.15], [0.8, 0.8, 0.02], [0.0; 3], 0x444444));
    parts
}
