//! Scroll-driven explosion and camera depth

use crate::{clamp_finite, lerp, remap_clamped};

/// Scroll position supplied by the page, read-only to the animator
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollState {
    /// Normalized offset in [0, 1]
    pub offset: f32,
    /// Offset change per second
    pub velocity: f32,
}

impl ScrollState {
    pub fn new(offset: f32, velocity: f32) -> Self {
        Self { offset, velocity }
    }

    /// Clamp offset to [0, 1]; non-finite values become 0
    pub fn sanitized(self) -> Self {
        Self {
            offset: clamp_finite(self.offset, 0.0, 1.0),
            velocity: if self.velocity.is_finite() {
                self.velocity
            } else {
                0.0
            },
        }
    }
}

/// Explosion amount in [0, 1]: `offset` remapped from `band`
#[inline]
pub fn explosion_factor(offset: f32, band: [f32; 2]) -> f32 {
    remap_clamped(offset, band[0], band[1])
}

/// Camera Z as a linear function of the full scroll offset
#[inline]
pub fn camera_depth(offset: f32, start_z: f32, end_z: f32) -> f32 {
    lerp(start_z, end_z, offset.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::EXPLODE_BAND;
    use proptest::prelude::*;

    #[test]
    fn test_explosion_band_endpoints() {
        assert_eq!(explosion_factor(0.0, EXPLODE_BAND), 0.0);
        assert_eq!(explosion_factor(0.2, EXPLODE_BAND), 0.0);
        assert_eq!(explosion_factor(0.5, EXPLODE_BAND), 1.0);
        assert_eq!(explosion_factor(1.0, EXPLODE_BAND), 1.0);
    }

    #[test]
    fn test_camera_depth_endpoints() {
        assert_eq!(camera_depth(0.0, 10.0, 4.0), 10.0);
        assert_eq!(camera_depth(1.0, 10.0, 4.0), 4.0);
        assert_eq!(camera_depth(0.5, 10.0, 4.0), 7.0);
    }

    #[test]
    fn test_camera_and_explosion_decoupled() {
        // Camera already moving while the explosion has not started
        let offset = 0.1;
        assert_eq!(explosion_factor(offset, EXPLODE_BAND), 0.0);
        assert!(camera_depth(offset, 10.0, 4.0) < 10.0);
    }

    #[test]
    fn test_sanitized() {
        let s = ScrollState::new(f32::NAN, f32::INFINITY).sanitized();
        assert_eq!(s, ScrollState::new(0.0, 0.0));
        assert_eq!(ScrollState::new(1.4, -2.0).sanitized().offset, 1.0);
    }

    proptest! {
        #[test]
        fn prop_explosion_monotonic(a in 0.0f32..1.0, b in 0.0f32..1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(explosion_factor(lo, EXPLODE_BAND) <= explosion_factor(hi, EXPLODE_BAND));
        }
    }
}
