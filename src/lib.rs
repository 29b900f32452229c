//! Lumen Scenes - procedural hero scenes for the web
//!
//! Core modules:
//! - `anim`: Deterministic per-frame animator (entities, motion, scene graph)
//! - `scene`: Scene construction (particle field, assembly, liquid core)
//! - `renderer`: WebGPU instanced rendering surface
//! - `platform`: Browser input and frame clock translation
//! - `settings`: Data-driven tuning, palette and post-fx configuration

pub mod anim;
pub mod error;
pub mod platform;
pub mod renderer;
pub mod scene;
pub mod settings;

pub use anim::{Animator, Frame};
pub use error::{ConfigError, RenderError};
pub use scene::{Scene, SceneKind};
pub use settings::{QualityPreset, Settings};

/// Default tuning constants
pub mod consts {
    /// Per-frame pointer smoothing factor
    pub const POINTER_ALPHA: f32 = 0.1;
    /// Pointer repulsion radius (world units)
    pub const REPULSION_RADIUS: f32 = 2.0;
    /// Displacement per unit of repulsion force
    pub const REPULSION_STRENGTH: f32 = 0.6;
    /// Half extents of the pointer plane at z = 0 (world units)
    pub const POINTER_EXTENT: [f32; 2] = [8.0, 4.5];

    /// Particle shell around the origin
    pub const FIELD_INNER_RADIUS: f32 = 3.0;
    pub const FIELD_OUTER_RADIUS: f32 = 12.0;
    /// Peak orbital wander per particle (world units)
    pub const ORBIT_AMPLITUDE: f32 = 0.35;
    /// Scale pulse as a fraction of base scale
    pub const PARTICLE_PULSE: f32 = 0.2;
    pub const PARTICLE_SCALE: f32 = 0.05;

    /// Structural assembly layout (rings x parts per ring = 50 parts)
    pub const ASSEMBLY_RINGS: usize = 5;
    pub const PARTS_PER_RING: usize = 10;
    pub const ASSEMBLY_RADIUS: f32 = 1.6;
    pub const RING_SPACING: f32 = 0.55;
    /// Extra radial distance at full explosion, as a multiple of the rest distance
    pub const EXPLODE_SPREAD: f32 = 1.5;

    /// Scroll band driving the explosion
    pub const EXPLODE_BAND: [f32; 2] = [0.2, 0.5];
    /// Camera depth at scroll offset 0 and 1
    pub const CAMERA_START_Z: f32 = 10.0;
    pub const CAMERA_END_Z: f32 = 4.0;
    pub const CAMERA_FOV_Y: f32 = 45.0;
    /// Camera shift per unit of smoothed pointer
    pub const CAMERA_PARALLAX: f32 = 0.5;

    /// Frames in the FPS averaging window
    pub const FPS_WINDOW: usize = 60;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Map `value` from `[from_min, from_max]` to `[0, 1]`, clamped at both ends
#[inline]
pub fn remap_clamped(value: f32, from_min: f32, from_max: f32) -> f32 {
    let span = from_max - from_min;
    if span <= f32::EPSILON {
        return if value >= from_max { 1.0 } else { 0.0 };
    }
    ((value - from_min) / span).clamp(0.0, 1.0)
}

/// Replace NaN/infinite or negative values with zero
#[inline]
pub fn non_negative_or_zero(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}

/// Clamp to `[min, max]`, mapping NaN to zero
#[inline]
pub fn clamp_finite(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(min, max)
    }
}
