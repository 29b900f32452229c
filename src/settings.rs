//! Scene settings and tuning
//!
//! Persisted in LocalStorage on the web, loaded from a JSON file natively.
//! Every field has a default so partial JSON documents are accepted.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Particles spawned in the particle field for this preset
    pub fn particle_count(&self) -> usize {
        match self {
            QualityPreset::Low => 3000,
            QualityPreset::Medium => 3500,
            QualityPreset::High => 4000,
        }
    }

    /// Whether the bloom pass should run
    pub fn bloom_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Scene colour palette (linear RGB)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub background: [f32; 3],
    /// Particle colours, picked per particle by seed
    pub particles: Vec<[f32; 3]>,
    /// Structural part colours, cycled per ring
    pub parts: Vec<[f32; 3]>,
    pub core_idle: [f32; 3],
    pub core_active: [f32; 3],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: [0.01, 0.01, 0.03],
            particles: vec![[0.36, 0.72, 1.0], [0.62, 0.45, 1.0], [0.95, 0.95, 1.0]],
            parts: vec![[0.55, 0.58, 0.66], [0.78, 0.8, 0.86], [0.98, 0.55, 0.2]],
            core_idle: [0.8, 0.82, 0.88],
            core_active: [1.0, 0.32, 0.56],
        }
    }
}

impl Palette {
    /// Colour for a palette index, wrapping; white for an empty list
    pub fn pick(colors: &[[f32; 3]], index: usize) -> [f32; 3] {
        if colors.is_empty() {
            [1.0, 1.0, 1.0]
        } else {
            colors[index % colors.len()]
        }
    }
}

/// Pointer and particle motion tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionTuning {
    /// Per-frame smoothing factor toward the raw pointer (0, 1]
    pub pointer_alpha: f32,
    pub repulsion_radius: f32,
    pub repulsion_strength: f32,
    /// World half extents mapped from pointer NDC
    pub pointer_extent: [f32; 2],
    pub orbit_amplitude: f32,
    pub particle_pulse: f32,
    pub particle_scale: f32,
    pub field_inner_radius: f32,
    pub field_outer_radius: f32,
    /// Amplitude of the GPU-side displacement field
    pub shader_displacement: f32,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            pointer_alpha: POINTER_ALPHA,
            repulsion_radius: REPULSION_RADIUS,
            repulsion_strength: REPULSION_STRENGTH,
            pointer_extent: POINTER_EXTENT,
            orbit_amplitude: ORBIT_AMPLITUDE,
            particle_pulse: PARTICLE_PULSE,
            particle_scale: PARTICLE_SCALE,
            field_inner_radius: FIELD_INNER_RADIUS,
            field_outer_radius: FIELD_OUTER_RADIUS,
            shader_displacement: 0.15,
        }
    }
}

/// Scroll-driven camera and explosion tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollTuning {
    /// Scroll offset band remapped to explosion factor [0, 1]
    pub explode_band: [f32; 2],
    pub explode_spread: f32,
    pub camera_start_z: f32,
    pub camera_end_z: f32,
    pub camera_fov_y_deg: f32,
    pub camera_parallax: f32,
    /// Assembly yaw speed (radians/sec)
    pub assembly_spin: f32,
    /// Pitch per unit of scroll velocity, clamped to `max_tilt`
    pub velocity_tilt: f32,
    pub max_tilt: f32,
}

impl Default for ScrollTuning {
    fn default() -> Self {
        Self {
            explode_band: EXPLODE_BAND,
            explode_spread: EXPLODE_SPREAD,
            camera_start_z: CAMERA_START_Z,
            camera_end_z: CAMERA_END_Z,
            camera_fov_y_deg: CAMERA_FOV_Y,
            camera_parallax: CAMERA_PARALLAX,
            assembly_spin: 0.15,
            velocity_tilt: 0.25,
            max_tilt: 0.35,
        }
    }
}

/// Liquid core material parameters for one state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoreLook {
    pub scale: f32,
    pub distort: f32,
    pub speed: f32,
}

/// Liquid core tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreTuning {
    pub idle: CoreLook,
    pub active: CoreLook,
    pub bob_amplitude: f32,
    pub bob_speed: f32,
    pub spin: f32,
}

impl Default for CoreTuning {
    fn default() -> Self {
        Self {
            idle: CoreLook {
                scale: 1.0,
                distort: 0.3,
                speed: 1.5,
            },
            active: CoreLook {
                scale: 1.25,
                distort: 0.6,
                speed: 4.0,
            },
            bob_amplitude: 0.12,
            bob_speed: 1.1,
            spin: 0.2,
        }
    }
}

/// Post-processing configuration forwarded to the rendering surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostFxConfig {
    pub bloom_intensity: f32,
    pub bloom_threshold: f32,
    pub chromatic_offset: [f32; 2],
    pub noise_opacity: f32,
    pub vignette_offset: f32,
    pub vignette_darkness: f32,
}

impl Default for PostFxConfig {
    fn default() -> Self {
        Self {
            bloom_intensity: 1.2,
            bloom_threshold: 0.2,
            chromatic_offset: [0.0015, 0.0012],
            noise_opacity: 0.04,
            vignette_offset: 0.3,
            vignette_darkness: 0.8,
        }
    }
}

/// Scene settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Layout seed for particle and part placement
    pub seed: u64,
    pub palette: Palette,
    pub motion: MotionTuning,
    pub scroll: ScrollTuning,
    pub core: CoreTuning,
    pub post_fx: PostFxConfig,

    // === Accessibility ===
    /// Reduced motion (freezes time-driven motion)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            seed: 0x5eed,
            palette: Palette::default(),
            motion: MotionTuning::default(),
            scroll: ScrollTuning::default(),
            core: CoreTuning::default(),
            post_fx: PostFxConfig::default(),
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective bloom intensity (respects quality and reduced_motion)
    pub fn effective_bloom(&self) -> f32 {
        if self.quality.bloom_enabled() && !self.reduced_motion {
            self.post_fx.bloom_intensity
        } else {
            0.0
        }
    }

    /// Check ranges the animator relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check_finite()?;

        let m = &self.motion;
        if !(m.pointer_alpha > 0.0 && m.pointer_alpha <= 1.0) {
            return Err(ConfigError::invalid(
                "motion.pointer_alpha",
                format!("must be in (0, 1], got {}", m.pointer_alpha),
            ));
        }
        non_negative("motion.repulsion_radius", m.repulsion_radius)?;
        // Negative strength would pull particles toward the pointer
        non_negative("motion.repulsion_strength", m.repulsion_strength)?;
        non_negative("motion.orbit_amplitude", m.orbit_amplitude)?;
        positive("motion.particle_scale", m.particle_scale)?;
        if m.field_inner_radius > m.field_outer_radius {
            return Err(ConfigError::invalid(
                "motion.field_inner_radius",
                "must not exceed field_outer_radius",
            ));
        }
        // A centred pointer must leave the resting field untouched
        if m.field_inner_radius < m.repulsion_radius {
            return Err(ConfigError::invalid(
                "motion.field_inner_radius",
                format!(
                    "must be at least repulsion_radius ({}), got {}",
                    m.repulsion_radius, m.field_inner_radius
                ),
            ));
        }
        let [lo, hi] = self.scroll.explode_band;
        if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || lo >= hi {
            return Err(ConfigError::invalid(
                "scroll.explode_band",
                format!("must satisfy 0 <= lo < hi <= 1, got [{lo}, {hi}]"),
            ));
        }
        if !(self.scroll.camera_fov_y_deg > 0.0 && self.scroll.camera_fov_y_deg < 180.0) {
            return Err(ConfigError::invalid(
                "scroll.camera_fov_y_deg",
                "must be in (0, 180)",
            ));
        }
        positive("core.idle.scale", self.core.idle.scale)?;
        positive("core.active.scale", self.core.active.scale)?;
        Ok(())
    }

    /// Reject NaN/infinite tuning values (JSON floats beyond f32 parse as inf)
    fn check_finite(&self) -> Result<(), ConfigError> {
        let m = &self.motion;
        let s = &self.scroll;
        let c = &self.core;
        let fx = &self.post_fx;
        let fields: [(&'static str, f32); 37] = [
            ("motion.pointer_alpha", m.pointer_alpha),
            ("motion.repulsion_radius", m.repulsion_radius),
            ("motion.repulsion_strength", m.repulsion_strength),
            ("motion.pointer_extent", m.pointer_extent[0]),
            ("motion.pointer_extent", m.pointer_extent[1]),
            ("motion.orbit_amplitude", m.orbit_amplitude),
            ("motion.particle_pulse", m.particle_pulse),
            ("motion.particle_scale", m.particle_scale),
            ("motion.field_inner_radius", m.field_inner_radius),
            ("motion.field_outer_radius", m.field_outer_radius),
            ("motion.shader_displacement", m.shader_displacement),
            ("scroll.explode_band", s.explode_band[0]),
            ("scroll.explode_band", s.explode_band[1]),
            ("scroll.explode_spread", s.explode_spread),
            ("scroll.camera_start_z", s.camera_start_z),
            ("scroll.camera_end_z", s.camera_end_z),
            ("scroll.camera_fov_y_deg", s.camera_fov_y_deg),
            ("scroll.camera_parallax", s.camera_parallax),
            ("scroll.assembly_spin", s.assembly_spin),
            ("scroll.velocity_tilt", s.velocity_tilt),
            ("scroll.max_tilt", s.max_tilt),
            ("core.idle.scale", c.idle.scale),
            ("core.idle.distort", c.idle.distort),
            ("core.idle.speed", c.idle.speed),
            ("core.active.scale", c.active.scale),
            ("core.active.distort", c.active.distort),
            ("core.active.speed", c.active.speed),
            ("core.bob_amplitude", c.bob_amplitude),
            ("core.bob_speed", c.bob_speed),
            ("core.spin", c.spin),
            ("post_fx.bloom_intensity", fx.bloom_intensity),
            ("post_fx.noise_opacity", fx.noise_opacity),
            ("post_fx.vignette_offset", fx.vignette_offset),
            ("post_fx.vignette_darkness", fx.vignette_darkness),
            ("post_fx.bloom_threshold", fx.bloom_threshold),
            ("post_fx.chromatic_offset", fx.chromatic_offset[0]),
            ("post_fx.chromatic_offset", fx.chromatic_offset[1]),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::invalid(
                    field,
                    format!("must be a finite number, got {value}"),
                ));
            }
        }
        Ok(())
    }

    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file (native)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "lumen_scenes_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {e}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value < 0.0 {
        return Err(ConfigError::invalid(field, format!("must be >= 0, got {value}")));
    }
    Ok(())
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value <= 0.0 {
        return Err(ConfigError::invalid(field, format!("must be > 0, got {value}")));
    }
    Ok(())
}
