//! Animated entities and the transforms derived from them
//!
//! Entities are created once per scene and never mutated afterwards. The
//! per-frame transform is recomputed from the entity and the frame inputs.

use glam::{Mat4, Quat, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// What an entity represents in its scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Particle,
    StructuralPart,
    CoreBody,
}

/// Geometry + material pair an entity is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKey {
    /// Instanced sprite with the point material
    ParticleSprite,
    /// Panel mesh with the metal material
    PartPanel,
    /// Icosphere with the distorting transmission material
    CoreSphere,
}

impl ResourceKey {
    pub const ALL: [ResourceKey; 3] = [
        ResourceKey::ParticleSprite,
        ResourceKey::PartPanel,
        ResourceKey::CoreSphere,
    ];

    /// Resource an entity kind is drawn with
    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Particle => ResourceKey::ParticleSprite,
            EntityKind::StructuralPart => ResourceKey::PartPanel,
            EntityKind::CoreBody => ResourceKey::CoreSphere,
        }
    }
}

/// Motion parameters derived from an entity seed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionParams {
    /// Frequency multiplier for secondary orbit terms
    pub factor: f32,
    /// Angular rate (radians/sec)
    pub speed: f32,
    /// Unit direction for the GPU displacement field
    pub direction: Vec3,
}

impl MotionParams {
    /// Derive parameters from a seed. Same seed, same parameters.
    pub fn from_seed(seed: f32) -> Self {
        let mut rng = Pcg32::seed_from_u64(u64::from(seed.to_bits()));
        let factor: f32 = rng.random_range(0.5..1.5);
        let speed: f32 = rng.random_range(0.3..0.9);

        // Uniform direction on the unit sphere
        let z: f32 = rng.random_range(-1.0..1.0);
        let theta: f32 = rng.random_range(0.0..std::f32::consts::TAU);
        let r = (1.0 - z * z).max(0.0).sqrt();
        let direction = Vec3::new(r * theta.cos(), r * theta.sin(), z);

        Self {
            factor,
            speed,
            direction,
        }
    }
}

/// A scene entity (particle, structural part or core body)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimatedEntity {
    pub id: u32,
    pub seed: f32,
    pub base_position: Vec3,
    /// Phase offset (radians) desynchronising otherwise identical motion
    pub phase: f32,
    pub kind: EntityKind,
    pub base_scale: f32,
    /// Index into the palette list for this kind
    pub color_index: usize,
    /// Cached, recomputable from `seed`
    pub motion: MotionParams,
}

impl AnimatedEntity {
    pub fn new(id: u32, seed: f32, base_position: Vec3, phase: f32, kind: EntityKind) -> Self {
        Self {
            id,
            seed,
            base_position,
            phase,
            kind,
            base_scale: 1.0,
            color_index: 0,
            motion: MotionParams::from_seed(seed),
        }
    }

    pub fn with_scale(mut self, base_scale: f32) -> Self {
        self.base_scale = base_scale;
        self
    }

    pub fn with_color(mut self, color_index: usize) -> Self {
        self.color_index = color_index;
        self
    }

    #[inline]
    pub fn resource(&self) -> ResourceKey {
        ResourceKey::for_kind(self.kind)
    }
}

/// Position, rotation and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Compose `self` (parent) with `child` (local to the parent)
    pub fn mul_transform(&self, child: &Transform) -> Transform {
        Transform {
            translation: self.transform_point(child.translation),
            rotation: self.rotation * child.rotation,
            scale: self.scale * child.scale,
        }
    }

    /// Apply scale, then rotation, then translation to a point
    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * (self.scale * point) + self.translation
    }
}

/// One committed transform for the rendering surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityTransform {
    pub id: u32,
    pub kind: EntityKind,
    pub resource: ResourceKey,
    pub color_index: usize,
    /// GPU displacement direction (particles only, zero otherwise)
    pub direction: Vec3,
    pub transform: Transform,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_params_deterministic() {
        let a = MotionParams::from_seed(42.0);
        let b = MotionParams::from_seed(42.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_motion_params_vary_by_seed() {
        let a = MotionParams::from_seed(1.0);
        let b = MotionParams::from_seed(2.0);
        assert_ne!(a.factor, b.factor);
    }

    #[test]
    fn test_motion_params_ranges() {
        for seed in 0..500 {
            let m = MotionParams::from_seed(seed as f32);
            assert!((0.5..1.5).contains(&m.factor));
            assert!((0.3..0.9).contains(&m.speed));
            assert!((m.direction.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_transform_compose_translates_then_rotates() {
        let parent = Transform {
            translation: Vec3::new(1.0, 0.0, 0.0),
            rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            scale: Vec3::splat(2.0),
        };
        let child = Transform::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let world = parent.mul_transform(&child);
        // (1,0,0) scaled to (2,0,0), rotated +90 deg about Y to (0,0,-2), then offset
        assert!((world.translation - Vec3::new(1.0, 0.0, -2.0)).length() < 1e-5);
        assert_eq!(world.scale, Vec3::splat(2.0));
    }

    #[test]
    fn test_transform_matrix_matches_point_transform() {
        let t = Transform {
            translation: Vec3::new(0.5, -1.0, 2.0),
            rotation: Quat::from_rotation_x(0.7),
            scale: Vec3::splat(1.5),
        };
        let p = Vec3::new(0.3, 0.2, -0.1);
        let via_matrix = t.to_matrix().transform_point3(p);
        assert!((via_matrix - t.transform_point(p)).length() < 1e-5);
    }

    #[test]
    fn test_resource_for_kind() {
        assert_eq!(ResourceKey::for_kind(EntityKind::Particle), ResourceKey::ParticleSprite);
        assert_eq!(ResourceKey::for_kind(EntityKind::CoreBody), ResourceKey::CoreSphere);
    }
}
