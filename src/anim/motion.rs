//! Particle motion terms
//!
//! Both terms are stateless: orbital offset depends only on the particle's
//! motion parameters and the clock, repulsion only on positions.

use glam::{Vec2, Vec3};

use super::entity::MotionParams;

/// Time-driven wander around the base position.
///
/// Every component is of the form `sin(θ·k + φ) - sin(φ)`, so the offset is
/// exactly zero at `t = 0` for any phase.
pub fn orbital_offset(motion: &MotionParams, phase: f32, t: f32, amplitude: f32) -> Vec3 {
    let theta = t * motion.speed;
    let f = motion.factor;
    let x = (theta + phase).sin() - phase.sin();
    let y = (theta * f + phase).cos() - phase.cos();
    let z = 0.5 * ((theta * (0.5 * f + 0.5) + 2.0 * phase).sin() - (2.0 * phase).sin());
    Vec3::new(x, y, z) * amplitude
}

/// `max(0, radius - distance)`
#[inline]
pub fn repulsion_force(distance: f32, radius: f32) -> f32 {
    (radius - distance).max(0.0)
}

/// Map a pointer in NDC onto the `z = 0` plane
#[inline]
pub fn pointer_to_world(pointer: Vec2, extent: Vec2) -> Vec3 {
    (pointer * extent).extend(0.0)
}

/// Push `position` away from `pointer_world`, scaled by `force * strength`.
///
/// A particle sitting exactly on the pointer is pushed toward the camera (+Z).
pub fn pointer_repulsion(position: Vec3, pointer_world: Vec3, radius: f32, strength: f32) -> Vec3 {
    let away = position - pointer_world;
    let force = repulsion_force(away.length(), radius);
    if force <= 0.0 {
        return Vec3::ZERO;
    }
    away.try_normalize().unwrap_or(Vec3::Z) * force * strength
}
