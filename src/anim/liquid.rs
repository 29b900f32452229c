//! Liquid core interaction state
//!
//! A single binary flag. Flipping it swaps the material parameters in one
//! step; there is no transition state.

use crate::settings::{CoreTuning, Palette};

/// Material parameters handed to the distorting core material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoreParams {
    pub color: [f32; 3],
    pub scale: f32,
    pub distort: f32,
    pub speed: f32,
}

/// Active/idle toggle for the liquid core
#[derive(Debug, Clone)]
pub struct LiquidCore {
    active: bool,
    idle_params: CoreParams,
    active_params: CoreParams,
    /// Incremented on every effective flip
    revision: u32,
}

impl LiquidCore {
    pub fn new(tuning: &CoreTuning, palette: &Palette) -> Self {
        Self {
            active: false,
            idle_params: CoreParams {
                color: palette.core_idle,
                scale: tuning.idle.scale,
                distort: tuning.idle.distort,
                speed: tuning.idle.speed,
            },
            active_params: CoreParams {
                color: palette.core_active,
                scale: tuning.active.scale,
                distort: tuning.active.distort,
                speed: tuning.active.speed,
            },
            revision: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// Set the flag; returns true if it changed
    pub fn set_active(&mut self, active: bool) -> bool {
        if self.active == active {
            return false;
        }
        self.active = active;
        self.revision = self.revision.wrapping_add(1);
        log::debug!("Liquid core active = {active}");
        true
    }

    pub fn toggle(&mut self) -> bool {
        self.set_active(!self.active)
    }

    /// Parameters for the current flag
    pub fn params(&self) -> CoreParams {
        if self.active {
            self.active_params
        } else {
            self.idle_params
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core() -> LiquidCore {
        LiquidCore::new(&CoreTuning::default(), &Palette::default())
    }

    #[test]
    fn test_starts_idle() {
        let c = core();
        assert!(!c.is_active());
        assert_eq!(c.params().color, Palette::default().core_idle);
    }

    #[test]
    fn test_toggle_switches_params_immediately() {
        let mut c = core();
        let idle = c.params();
        assert!(c.set_active(true));
        let active = c.params();
        assert_ne!(idle.color, active.color);
        assert_ne!(idle.scale, active.scale);
        assert_ne!(idle.distort, active.distort);
        assert_eq!(c.revision(), 1);
    }

    #[test]
    fn test_setting_same_value_is_noop() {
        let mut c = core();
        assert!(!c.set_active(false));
        assert!(c.set_active(true));
        assert!(!c.set_active(true));
        assert_eq!(c.revision(), 1);
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut c = core();
        let idle = c.params();
        c.toggle();
        c.toggle();
        assert_eq!(c.params(), idle);
        assert_eq!(c.revision(), 2);
    }
}
