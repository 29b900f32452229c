//! Per-frame procedural animator
//!
//! `advance` is called exactly once per display refresh. It poses every
//! graph node from the frame inputs, recomputes world transforms and commits
//! one transform per drawable entity whose resources are ready.

use std::collections::HashSet;

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

use super::entity::{AnimatedEntity, EntityKind, EntityTransform, ResourceKey, Transform};
use super::graph::{NodeId, NodeRole};
use super::liquid::{CoreParams, LiquidCore};
use super::motion::{orbital_offset, pointer_repulsion, pointer_to_world};
use super::pointer::PointerState;
use super::scroll::{ScrollState, camera_depth, explosion_factor};
use crate::consts::FPS_WINDOW;
use crate::non_negative_or_zero;
use crate::scene::Scene;
use crate::settings::{CoreTuning, MotionTuning, ScrollTuning, Settings};

/// Set of resources the rendering surface has finished loading
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    ready: HashSet<ResourceKey>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every key ready (headless use and tests)
    pub fn all_ready() -> Self {
        Self {
            ready: ResourceKey::ALL.into_iter().collect(),
        }
    }

    pub fn mark_ready(&mut self, key: ResourceKey) {
        if self.ready.insert(key) {
            log::info!("Resource ready: {:?}", key);
        }
    }

    pub fn mark_lost(&mut self, key: ResourceKey) {
        if self.ready.remove(&key) {
            log::warn!("Resource lost: {:?}", key);
        }
    }

    #[inline]
    pub fn is_ready(&self, key: ResourceKey) -> bool {
        self.ready.contains(&key)
    }

    /// Every drawable resource is loaded
    pub fn all_keys_ready(&self) -> bool {
        ResourceKey::ALL.iter().all(|key| self.ready.contains(key))
    }
}

/// Camera placement for the frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub eye: Vec3,
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov_y: f32,
}

impl CameraPose {
    pub const NEAR: f32 = 0.1;
    pub const FAR: f32 = 100.0;

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_y, aspect.max(1e-3), Self::NEAR, Self::FAR);
        let view = Mat4::look_at_rh(self.eye, self.target, Vec3::Y);
        proj * view
    }

    /// World-space (right, up) axes of the view plane
    pub fn billboard_axes(&self) -> (Vec3, Vec3) {
        let forward = (self.target - self.eye).try_normalize().unwrap_or(Vec3::NEG_Z);
        let right = forward.cross(Vec3::Y).try_normalize().unwrap_or(Vec3::X);
        let up = right.cross(forward);
        (right, up)
    }
}

/// Uniform inputs for the GPU-side displacement field
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FieldUniforms {
    pub time: f32,
    pub pointer: Vec2,
    pub displacement: f32,
}

/// Loop bookkeeping
#[derive(Debug, Clone)]
pub struct FrameStats {
    pub frame: u64,
    pub last_dt: f32,
    pub fps: u32,
    /// Entities omitted from the last frame (resources not ready)
    pub skipped: usize,
    dt_window: [f32; FPS_WINDOW],
}

impl Default for FrameStats {
    fn default() -> Self {
        Self {
            frame: 0,
            last_dt: 0.0,
            fps: 0,
            skipped: 0,
            dt_window: [0.0; FPS_WINDOW],
        }
    }
}

impl FrameStats {
    fn record(&mut self, dt: f32) {
        self.dt_window[(self.frame % FPS_WINDOW as u64) as usize] = dt;
        self.frame += 1;
        self.last_dt = dt;

        let filled = (self.frame as usize).min(FPS_WINDOW);
        let total: f32 = self.dt_window[..filled].iter().sum();
        if total > 0.0 {
            self.fps = (filled as f32 / total).round() as u32;
        }
    }
}

/// Everything the rendering surface needs for one frame
#[derive(Debug, Clone)]
pub struct Frame {
    /// One transform per live entity, ordered by entity id
    pub transforms: Vec<EntityTransform>,
    pub camera: CameraPose,
    pub uniforms: FieldUniforms,
    /// Present in the liquid core scene
    pub core: Option<CoreParams>,
    pub explosion: f32,
}

/// Drives one scene
pub struct Animator {
    scene: Scene,
    motion: MotionTuning,
    scroll_tuning: ScrollTuning,
    core_tuning: CoreTuning,
    reduced_motion: bool,
    has_core: bool,
    pointer: PointerState,
    core: LiquidCore,
    resources: ResourceRegistry,
    stats: FrameStats,
    frame: Frame,
}

impl Animator {
    pub fn new(scene: Scene, settings: &Settings) -> Self {
        let entity_count = scene.entities.len();
        let has_core = scene.count(EntityKind::CoreBody) > 0;
        let scroll_tuning = settings.scroll.clone();
        let camera = CameraPose {
            eye: Vec3::new(0.0, 0.0, scroll_tuning.camera_start_z),
            target: Vec3::ZERO,
            fov_y: scroll_tuning.camera_fov_y_deg.to_radians(),
        };
        Self {
            scene,
            motion: settings.motion.clone(),
            scroll_tuning,
            core_tuning: settings.core.clone(),
            reduced_motion: settings.reduced_motion,
            has_core,
            pointer: PointerState::new(settings.motion.pointer_alpha),
            core: LiquidCore::new(&settings.core, &settings.palette),
            resources: ResourceRegistry::new(),
            stats: FrameStats::default(),
            frame: Frame {
                transforms: Vec::with_capacity(entity_count),
                camera,
                uniforms: FieldUniforms::default(),
                core: None,
                explosion: 0.0,
            },
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut ResourceRegistry {
        &mut self.resources
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// Last committed frame
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn core(&self) -> &LiquidCore {
        &self.core
    }

    /// Flip the liquid core flag; takes effect on the next `advance`
    pub fn toggle_core(&mut self) -> bool {
        self.core.toggle()
    }

    pub fn set_core_active(&mut self, active: bool) -> bool {
        self.core.set_active(active)
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
    }

    /// Compute the frame for `clock_seconds`.
    ///
    /// Negative or non-finite `dt`/`clock_seconds` are treated as zero.
    /// Entities whose resources are not ready are left out.
    pub fn advance(
        &mut self,
        dt: f32,
        clock_seconds: f32,
        pointer: Vec2,
        scroll: Option<ScrollState>,
    ) -> &Frame {
        let dt = non_negative_or_zero(dt);
        let clock = non_negative_or_zero(clock_seconds);
        let t = if self.reduced_motion { 0.0 } else { clock };

        self.pointer.set_raw(pointer);
        let smoothed = if self.reduced_motion {
            self.pointer.snap();
            self.pointer.smoothed
        } else {
            self.pointer.step()
        };
        let scroll = scroll.map(ScrollState::sanitized).unwrap_or_default();
        let explosion = explosion_factor(scroll.offset, self.scroll_tuning.explode_band);

        self.pose_nodes(t, smoothed, scroll, explosion);
        self.scene.graph.update_world();
        let skipped = self.commit();

        let st = &self.scroll_tuning;
        self.frame.camera = CameraPose {
            eye: Vec3::new(
                smoothed.x * st.camera_parallax,
                smoothed.y * st.camera_parallax,
                camera_depth(scroll.offset, st.camera_start_z, st.camera_end_z),
            ),
            target: Vec3::ZERO,
            fov_y: st.camera_fov_y_deg.to_radians(),
        };
        self.frame.uniforms = FieldUniforms {
            time: t,
            pointer: smoothed,
            displacement: if self.reduced_motion {
                0.0
            } else {
                self.motion.shader_displacement
            },
        };
        self.frame.core = self.has_core.then(|| self.core.params());
        self.frame.explosion = explosion;

        self.stats.record(dt);
        self.stats.skipped = skipped;
        if skipped > 0 {
            log::debug!("Frame {}: skipped {} entities", self.stats.frame, skipped);
        }

        &self.frame
    }

    /// Write every node's local transform for time `t`
    fn pose_nodes(&mut self, t: f32, smoothed: Vec2, scroll: ScrollState, explosion: f32) {
        let pointer_world = pointer_to_world(smoothed, Vec2::from(self.motion.pointer_extent));
        let core = self.core.params();
        let st = &self.scroll_tuning;
        let tilt = (scroll.velocity * st.velocity_tilt).clamp(-st.max_tilt, st.max_tilt);

        let Scene {
            entities, graph, ..
        } = &mut self.scene;

        for i in 0..graph.len() {
            let id = NodeId(i);
            let Some(role) = graph.get(id).map(|node| node.role) else {
                continue;
            };
            let local = match role {
                NodeRole::Group => continue,
                NodeRole::AssemblyRoot => Transform::from_rotation(
                    Quat::from_rotation_y(t * st.assembly_spin) * Quat::from_rotation_x(tilt),
                ),
                NodeRole::Ring { index } => {
                    let dir = if index % 2 == 0 { 1.0 } else { -1.0 };
                    let rate = st.assembly_spin * 0.5 * (index as f32 + 1.0);
                    Transform::from_rotation(Quat::from_rotation_y(dir * rate * t))
                }
                NodeRole::Entity { index } => pose_entity(
                    &entities[index],
                    t,
                    pointer_world,
                    explosion,
                    &self.motion,
                    st,
                    &self.core_tuning,
                    &core,
                ),
            };
            graph.set_local(id, local);
        }
    }

    /// Copy world transforms of ready entities into the frame
    fn commit(&mut self) -> usize {
        self.frame.transforms.clear();
        let mut skipped = 0;
        for (entity, &node) in self.scene.entities.iter().zip(&self.scene.entity_nodes) {
            let resource = entity.resource();
            if !self.resources.is_ready(resource) {
                skipped += 1;
                continue;
            }
            let Some(world) = self.scene.graph.world(node) else {
                skipped += 1;
                continue;
            };
            self.frame.transforms.push(EntityTransform {
                id: entity.id,
                kind: entity.kind,
                resource,
                color_index: entity.color_index,
                direction: if entity.kind == EntityKind::Particle {
                    entity.motion.direction
                } else {
                    Vec3::ZERO
                },
                transform: world,
            });
        }
        skipped
    }
}

/// Local transform of one entity at time `t`
#[allow(clippy::too_many_arguments)]
fn pose_entity(
    entity: &AnimatedEntity,
    t: f32,
    pointer_world: Vec3,
    explosion: f32,
    motion: &MotionTuning,
    scroll: &ScrollTuning,
    core_tuning: &CoreTuning,
    core: &CoreParams,
) -> Transform {
    let m = &entity.motion;
    match entity.kind {
        EntityKind::Particle => {
            let theta = t * m.speed;
            let translation = entity.base_position
                + orbital_offset(m, entity.phase, t, motion.orbit_amplitude)
                + pointer_repulsion(
                    entity.base_position,
                    pointer_world,
                    motion.repulsion_radius,
                    motion.repulsion_strength,
                );
            let pulse = 1.0 + motion.particle_pulse * (theta * m.factor).sin();
            Transform {
                translation,
                rotation: Quat::from_euler(EulerRot::XYZ, theta * m.factor * 0.5, theta, 0.0),
                scale: Vec3::splat(entity.base_scale * pulse),
            }
        }
        EntityKind::StructuralPart => {
            // Local +Z points along the outward radius at `phase`
            let facing = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2 - entity.phase);
            let tumble = Quat::from_euler(
                EulerRot::XYZ,
                explosion * m.factor * std::f32::consts::PI,
                explosion * m.speed * std::f32::consts::PI,
                0.0,
            );
            Transform {
                translation: entity.base_position * (1.0 + explosion * scroll.explode_spread),
                rotation: facing * tumble,
                scale: Vec3::splat(entity.base_scale),
            }
        }
        EntityKind::CoreBody => {
            let bob = core_tuning.bob_amplitude * (t * core_tuning.bob_speed).sin();
            Transform {
                translation: entity.base_position + Vec3::Y * bob,
                rotation: Quat::from_rotation_y(t * core_tuning.spin),
                scale: Vec3::splat(entity.base_scale * core.scale),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneKind;

    fn animator(kind: SceneKind) -> Animator {
        let settings = Settings::default();
        let mut a = Animator::new(Scene::build(kind, &settings), &settings);
        *a.resources_mut() = ResourceRegistry::all_ready();
        a
    }

    #[test]
    fn test_baseline_fixture_particles_at_rest() {
        let settings = Settings::default();
        let scene = Scene::particle_field(3000, &settings);
        let bases: Vec<Vec3> = scene.entities.iter().map(|e| e.base_position).collect();
        let mut a = Animator::new(scene, &settings);
        *a.resources_mut() = ResourceRegistry::all_ready();

        let frame = a.advance(0.0, 0.0, Vec2::ZERO, None);
        assert_eq!(frame.transforms.len(), 3000);
        for (t, base) in frame.transforms.iter().zip(&bases) {
            assert_eq!(t.transform.translation, *base, "particle {}", t.id);
        }
    }

    #[test]
    fn test_same_inputs_same_output() {
        let mut a = animator(SceneKind::ParticleField);
        let first = a.advance(0.016, 3.25, Vec2::ZERO, None).transforms.clone();
        let second = a.advance(0.016, 3.25, Vec2::ZERO, None).transforms.clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_pause_resume_does_not_desync() {
        let mut a = animator(SceneKind::Assembly);
        let scroll = Some(ScrollState::new(0.3, 0.0));
        let at_five = a.advance(0.016, 5.0, Vec2::ZERO, scroll).transforms.clone();
        for i in 0..50 {
            a.advance(0.016, 5.0 + i as f32 * 0.1, Vec2::ZERO, scroll);
        }
        let again = a.advance(0.016, 5.0, Vec2::ZERO, scroll).transforms.clone();
        assert_eq!(at_five, again);
    }

    #[test]
    fn test_two_animators_agree() {
        let mut a = animator(SceneKind::ParticleField);
        let mut b = animator(SceneKind::ParticleField);
        let inputs = [
            (0.016, 0.5, Vec2::new(0.2, 0.1)),
            (0.016, 0.516, Vec2::new(0.4, -0.3)),
            (0.020, 0.536, Vec2::new(-0.9, 0.9)),
        ];
        for (dt, clock, p) in inputs {
            let fa = a.advance(dt, clock, p, None).transforms.clone();
            let fb = b.advance(dt, clock, p, None).transforms.clone();
            assert_eq!(fa, fb);
        }
    }

    #[test]
    fn test_unready_resources_skip_entities() {
        let settings = Settings::default();
        let mut a = Animator::new(Scene::build(SceneKind::LiquidCore, &settings), &settings);
        assert!(a.advance(0.016, 1.0, Vec2::ZERO, None).transforms.is_empty());
        assert_eq!(a.stats().skipped, 1);

        a.resources_mut().mark_ready(ResourceKey::CoreSphere);
        assert_eq!(a.advance(0.016, 1.016, Vec2::ZERO, None).transforms.len(), 1);
        assert_eq!(a.stats().skipped, 0);
    }

    #[test]
    fn test_lost_resources_skip_until_ready_again() {
        let mut a = animator(SceneKind::Assembly);
        let total = a.scene().entities.len();
        assert!(a.resources().all_keys_ready());

        for key in ResourceKey::ALL {
            a.resources_mut().mark_lost(key);
        }
        assert!(!a.resources().all_keys_ready());
        assert!(a.advance(0.016, 1.0, Vec2::ZERO, None).transforms.is_empty());
        assert_eq!(a.stats().skipped, total);

        a.resources_mut().mark_ready(ResourceKey::PartPanel);
        assert_eq!(a.advance(0.016, 1.016, Vec2::ZERO, None).transforms.len(), total);
        assert!(!a.resources().all_keys_ready());
    }

    #[test]
    fn test_converged_pointer_reproduces_frame() {
        let mut a = animator(SceneKind::ParticleField);
        let pointer = Vec2::new(0.5, 0.3);
        for _ in 0..500 {
            a.advance(0.016, 2.0, pointer, None);
        }
        let first = a.advance(0.016, 2.0, pointer, None).clone();
        let second = a.advance(0.016, 2.0, pointer, None).clone();
        assert_eq!(first.transforms, second.transforms);
        assert_eq!(first.uniforms, second.uniforms);
        assert!((first.uniforms.pointer - pointer).length() < 1e-4);
    }

    #[test]
    fn test_parts_face_outward_at_rest() {
        let mut a = animator(SceneKind::Assembly);
        let frame = a.advance(0.0, 0.0, Vec2::ZERO, Some(ScrollState::new(0.0, 0.0))).clone();
        assert!(!frame.transforms.is_empty());
        for t in &frame.transforms {
            let outward = Vec3::new(t.transform.translation.x, 0.0, t.transform.translation.z)
                .normalize();
            let facing = t.transform.rotation * Vec3::Z;
            assert!(facing.dot(outward) > 0.999, "part {} faces {facing}", t.id);
        }
    }

    #[test]
    fn test_billboard_axes_span_view_plane() {
        for kind in [SceneKind::ParticleField, SceneKind::Assembly, SceneKind::LiquidCore] {
            let mut a = animator(kind);
            for offset in [0.0, 0.4, 1.0] {
                let camera = a
                    .advance(0.016, 1.0, Vec2::new(0.3, -0.2), Some(ScrollState::new(offset, 0.0)))
                    .camera;
                let (right, up) = camera.billboard_axes();
                let forward = (camera.target - camera.eye).normalize();
                assert!((right.length() - 1.0).abs() < 1e-4);
                assert!((up.length() - 1.0).abs() < 1e-4);
                assert!(right.dot(up).abs() < 1e-4);
                assert!(right.dot(forward).abs() < 1e-4);
                assert!(up.dot(forward).abs() < 1e-4);
                assert!(up.y > 0.0);
            }
        }
    }

    #[test]
    fn test_invalid_dt_and_clock_clamped() {
        let mut a = animator(SceneKind::ParticleField);
        let nan = a.advance(f32::NAN, f32::NAN, Vec2::ZERO, None).transforms.clone();
        assert_eq!(a.stats().last_dt, 0.0);
        let neg = a.advance(-1.0, -5.0, Vec2::ZERO, None).transforms.clone();
        let zero = a.advance(0.0, 0.0, Vec2::ZERO, None).transforms.clone();
        assert_eq!(nan, zero);
        assert_eq!(neg, zero);
        assert_eq!(a.frame().uniforms.time, 0.0);
    }

    #[test]
    fn test_pointer_repels_nearby_particles() {
        let mut a = animator(SceneKind::ParticleField);
        // Converge the pointer onto the right edge of the pointer plane
        for _ in 0..300 {
            a.advance(0.016, 0.0, Vec2::new(0.5, 0.0), None);
        }
        let frame = a.frame().clone();
        let pointer_world = Vec3::new(0.5 * crate::consts::POINTER_EXTENT[0], 0.0, 0.0);
        let radius = crate::consts::REPULSION_RADIUS;
        let mut moved = 0;
        for (t, e) in frame.transforms.iter().zip(&a.scene().entities) {
            let d = e.base_position.distance(pointer_world);
            let shift = t.transform.translation - e.base_position;
            if d > radius + 1e-3 {
                assert!(shift.length() < 1e-5, "particle {} moved outside radius", e.id);
            } else if d < radius - 1e-2 {
                assert!(shift.length() > 0.0);
                moved += 1;
            }
        }
        assert!(moved > 0, "expected some particles inside the repulsion radius");
    }

    #[test]
    fn test_explosion_scales_part_distance() {
        let mut a = animator(SceneKind::Assembly);
        let rest: Vec<f32> = a
            .advance(0.016, 0.0, Vec2::ZERO, Some(ScrollState::new(0.2, 0.0)))
            .transforms
            .iter()
            .map(|t| t.transform.translation.length())
            .collect();
        let spread = crate::consts::EXPLODE_SPREAD;
        let frame = a.advance(0.016, 0.0, Vec2::ZERO, Some(ScrollState::new(0.5, 0.0)));
        assert_eq!(frame.explosion, 1.0);
        for (t, r0) in frame.transforms.iter().zip(&rest) {
            let r1 = t.transform.translation.length();
            assert!((r1 - r0 * (1.0 + spread)).abs() < 1e-4, "{r1} vs {r0}");
        }
    }

    #[test]
    fn test_camera_follows_full_scroll_range() {
        let mut a = animator(SceneKind::Assembly);
        let st = ScrollTuning::default();
        let z0 = a.advance(0.016, 0.0, Vec2::ZERO, Some(ScrollState::new(0.0, 0.0))).camera.eye.z;
        let z1 = a.advance(0.016, 0.0, Vec2::ZERO, Some(ScrollState::new(1.0, 0.0))).camera.eye.z;
        assert_eq!(z0, st.camera_start_z);
        assert_eq!(z1, st.camera_end_z);
    }

    #[test]
    fn test_core_toggle_applies_on_next_frame_without_transition() {
        let mut a = animator(SceneKind::LiquidCore);
        let idle = a.advance(0.016, 0.0, Vec2::ZERO, None).core;
        assert!(a.toggle_core());
        let active = a.advance(0.016, 0.016, Vec2::ZERO, None).core;
        assert_ne!(idle, active);
        // Following frames hold the active params exactly
        for i in 2..10 {
            let next = a.advance(0.016, i as f32 * 0.016, Vec2::ZERO, None).core;
            assert_eq!(next, active);
        }
        assert_eq!(a.core().revision(), 1);

        let tuning = CoreTuning::default();
        let scale = a.frame().transforms[0].transform.scale.x;
        assert!((scale - tuning.active.scale).abs() < 1e-6);
    }

    #[test]
    fn test_core_absent_outside_core_scene() {
        let mut a = animator(SceneKind::ParticleField);
        assert!(a.advance(0.016, 0.0, Vec2::ZERO, None).core.is_none());
    }

    #[test]
    fn test_reduced_motion_freezes_time() {
        let mut a = animator(SceneKind::ParticleField);
        a.set_reduced_motion(true);
        let early = a.advance(0.016, 1.0, Vec2::ZERO, None).transforms.clone();
        let late = a.advance(0.016, 9.0, Vec2::ZERO, None).transforms.clone();
        assert_eq!(early, late);
        assert_eq!(a.frame().uniforms.displacement, 0.0);
    }

    #[test]
    fn test_uniforms_carry_time_and_smoothed_pointer() {
        let mut a = animator(SceneKind::ParticleField);
        let frame = a.advance(0.016, 2.5, Vec2::new(1.0, 0.0), None);
        assert_eq!(frame.uniforms.time, 2.5);
        assert!((frame.uniforms.pointer.x - crate::consts::POINTER_ALPHA).abs() < 1e-6);
    }

    #[test]
    fn test_fps_from_dt_window() {
        let mut a = animator(SceneKind::LiquidCore);
        for i in 0..120 {
            a.advance(1.0 / 60.0, i as f32 / 60.0, Vec2::ZERO, None);
        }
        assert_eq!(a.stats().fps, 60);
        assert_eq!(a.stats().frame, 120);
    }
}
