//! Smoothed pointer state

use glam::Vec2;

use crate::clamp_finite;

/// Pointer in normalized device coordinates, eased toward raw input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    /// Latest raw sample (sanitized)
    pub raw: Vec2,
    /// Smoothed position consumed by the animator
    pub smoothed: Vec2,
    /// Fraction of the remaining distance covered each frame
    pub alpha: f32,
}

impl PointerState {
    pub fn new(alpha: f32) -> Self {
        Self {
            raw: Vec2::ZERO,
            smoothed: Vec2::ZERO,
            alpha: alpha.clamp(f32::EPSILON, 1.0),
        }
    }

    /// Record a raw sample; components are clamped to [-1, 1], NaN becomes 0
    pub fn set_raw(&mut self, pointer: Vec2) {
        self.raw = Vec2::new(
            clamp_finite(pointer.x, -1.0, 1.0),
            clamp_finite(pointer.y, -1.0, 1.0),
        );
    }

    /// One smoothing step: `smoothed += (raw - smoothed) * alpha`
    pub fn step(&mut self) -> Vec2 {
        self.smoothed += (self.raw - self.smoothed) * self.alpha;
        self.smoothed
    }

    /// Snap to the raw value (used when motion is reduced)
    pub fn snap(&mut self) {
        self.smoothed = self.raw;
    }
}

impl Default for PointerState {
    fn default() -> Self {
        Self::new(crate::consts::POINTER_ALPHA)
    }
}
