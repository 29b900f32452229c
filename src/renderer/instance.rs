//! GPU data layouts for the instanced pipeline
//!
//! Both structs must match `shader.wgsl` byte for byte.

use bytemuck::{Pod, Zeroable};

use crate::anim::{CoreParams, EntityKind, Frame};
use crate::settings::{Palette, PostFxConfig};

/// Maximum instances per draw (largest particle preset plus headroom)
pub const MAX_INSTANCES: usize = 4096;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Globals {
    pub view_proj: [[f32; 4]; 4],   // offset 0
    pub pointer: [f32; 2],          // offset 64
    pub time: f32,                  // offset 72
    pub displacement: f32,          // offset 76
    pub vignette_offset: f32,       // offset 80
    pub vignette_darkness: f32,     // offset 84
    pub noise_opacity: f32,         // offset 88
    pub bloom: f32,                 // offset 92
    pub chromatic_offset: [f32; 2], // offset 96
    pub bloom_threshold: f32,       // offset 104
    pub _pad: f32,                  // offset 108
    pub camera_right: [f32; 4],     // offset 112
    pub camera_up: [f32; 4],        // offset 128, total 144
}

impl Globals {
    pub fn from_frame(frame: &Frame, post_fx: &PostFxConfig, bloom: f32, aspect: f32) -> Self {
        let (right, up) = frame.camera.billboard_axes();
        Self {
            view_proj: frame.camera.view_proj(aspect).to_cols_array_2d(),
            pointer: frame.uniforms.pointer.to_array(),
            time: frame.uniforms.time,
            displacement: frame.uniforms.displacement,
            vignette_offset: post_fx.vignette_offset,
            vignette_darkness: post_fx.vignette_darkness,
            noise_opacity: post_fx.noise_opacity,
            bloom,
            chromatic_offset: post_fx.chromatic_offset,
            bloom_threshold: post_fx.bloom_threshold,
            _pad: 0.0,
            camera_right: right.extend(0.0).to_array(),
            camera_up: up.extend(0.0).to_array(),
        }
    }
}

/// Per-instance attributes
///
/// Particles and the core are drawn as camera-facing sprites: the shader
/// keeps the model translation and uniform scale and ignores its rotation.
///
/// `extra` depends on the entity kind:
/// - particle: displacement direction in xyz, w = 1
/// - structural part: all zero
/// - core: (distort, speed, 0, -1)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub extra: [f32; 4],
}

impl InstanceData {
    const ATTRIBUTES: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        0 => Float32x4,
        1 => Float32x4,
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Flatten a frame into instance data, capped at [`MAX_INSTANCES`]
pub fn build_instances(frame: &Frame, palette: &Palette) -> Vec<InstanceData> {
    let core = frame.core.unwrap_or(CoreParams {
        color: palette.core_idle,
        scale: 1.0,
        distort: 0.0,
        speed: 0.0,
    });

    frame
        .transforms
        .iter()
        .take(MAX_INSTANCES)
        .map(|t| {
            let (rgb, alpha, extra) = match t.kind {
                EntityKind::Particle => (
                    Palette::pick(&palette.particles, t.color_index),
                    0.85,
                    t.direction.extend(1.0).to_array(),
                ),
                EntityKind::StructuralPart => (
                    Palette::pick(&palette.parts, t.color_index),
                    1.0,
                    [0.0; 4],
                ),
                EntityKind::CoreBody => (core.color, 1.0, [core.distort, core.speed, 0.0, -1.0]),
            };
            InstanceData {
                model: t.transform.to_matrix().to_cols_array_2d(),
                color: [rgb[0], rgb[1], rgb[2], alpha],
                extra,
            }
        })
        .collect()
}
