//! Scene construction
//!
//! Builds the entity list and scene graph for each of the three scenes.
//! Layout randomness comes from a `Pcg32` seeded with `Settings::seed`, so a
//! given settings file always produces the same scene.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::anim::graph::NodeRole;
use crate::anim::{AnimatedEntity, EntityKind, NodeId, SceneGraph, Transform};
use crate::consts::*;
use crate::settings::Settings;

/// Which hero scene to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneKind {
    /// Instanced particles drifting around a hollow centre
    #[default]
    ParticleField,
    /// Rings of structural parts that explode on scroll
    Assembly,
    /// Single distorting core body
    LiquidCore,
}

impl SceneKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SceneKind::ParticleField => "particles",
            SceneKind::Assembly => "assembly",
            SceneKind::LiquidCore => "core",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "particles" | "particle-field" | "field" => Some(SceneKind::ParticleField),
            "assembly" | "parts" => Some(SceneKind::Assembly),
            "core" | "liquid-core" | "liquid" => Some(SceneKind::LiquidCore),
            _ => None,
        }
    }

    /// Whether the page feeds scroll state to this scene
    pub fn scroll_driven(&self) -> bool {
        matches!(self, SceneKind::Assembly)
    }
}

/// Entities plus the graph that places them
#[derive(Debug, Clone)]
pub struct Scene {
    pub kind: SceneKind,
    /// Sorted by id; ids equal indices
    pub entities: Vec<AnimatedEntity>,
    pub graph: SceneGraph,
    /// Graph node of each entity, parallel to `entities`
    pub entity_nodes: Vec<NodeId>,
}

impl Scene {
    pub fn build(kind: SceneKind, settings: &Settings) -> Self {
        let scene = match kind {
            SceneKind::ParticleField => {
                Self::particle_field(settings.quality.particle_count(), settings)
            }
            SceneKind::Assembly => Self::assembly(settings),
            SceneKind::LiquidCore => Self::liquid_core(settings),
        };
        log::info!(
            "Built {} scene: {} entities, {} nodes",
            kind.as_str(),
            scene.entities.len(),
            scene.graph.len()
        );
        scene
    }

    fn empty(kind: SceneKind) -> Self {
        Self {
            kind,
            entities: Vec::new(),
            graph: SceneGraph::new(),
            entity_nodes: Vec::new(),
        }
    }

    fn push_entity(&mut self, entity: AnimatedEntity, parent: NodeId, local: Transform) {
        let index = self.entities.len();
        let node = self.graph.add(
            format!("{:?}#{}", entity.kind, entity.id),
            NodeRole::Entity { index },
            local,
            Some(parent),
        );
        self.entities.push(entity);
        self.entity_nodes.push(node);
    }

    /// `count` particles with seeds `0..count`, placed in a hollow shell
    pub fn particle_field(count: usize, settings: &Settings) -> Self {
        let mut scene = Self::empty(SceneKind::ParticleField);
        let mut rng = Pcg32::seed_from_u64(settings.seed);
        let m = &settings.motion;
        let colors = settings.palette.particles.len().max(1);

        let root = scene
            .graph
            .add("field", NodeRole::Group, Transform::IDENTITY, None);

        scene.entities.reserve(count);
        scene.entity_nodes.reserve(count);
        for i in 0..count {
            let base = shell_point(&mut rng, m.field_inner_radius, m.field_outer_radius);
            let phase = rng.random_range(0.0..TAU);
            let scale = m.particle_scale * rng.random_range(0.6..1.4f32);
            let entity = AnimatedEntity::new(i as u32, i as f32, base, phase, EntityKind::Particle)
                .with_scale(scale)
                .with_color(i % colors);
            scene.push_entity(entity, root, Transform::from_translation(base));
        }
        scene
    }

    /// Rings of structural parts under a spinning pivot
    pub fn assembly(settings: &Settings) -> Self {
        let mut scene = Self::empty(SceneKind::Assembly);
        let mut rng = Pcg32::seed_from_u64(settings.seed ^ 0xa55e_b1e5);

        let root = scene
            .graph
            .add("assembly", NodeRole::AssemblyRoot, Transform::IDENTITY, None);

        let half_height = (ASSEMBLY_RINGS as f32 - 1.0) * RING_SPACING / 2.0;
        let mut id = 0u32;
        for ring in 0..ASSEMBLY_RINGS {
            let ring_node = scene.graph.add(
                format!("ring{ring}"),
                NodeRole::Ring { index: ring },
                Transform::IDENTITY,
                Some(root),
            );
            let y = ring as f32 * RING_SPACING - half_height;
            // Waist the middle rings for a turbine silhouette
            let radius = ASSEMBLY_RADIUS * (1.0 - 0.25 * (1.0 - (y / half_height.max(1e-3)).abs()));
            for slot in 0..PARTS_PER_RING {
                let angle = slot as f32 / PARTS_PER_RING as f32 * TAU
                    + if ring % 2 == 1 { TAU / (2 * PARTS_PER_RING) as f32 } else { 0.0 };
                let base = Vec3::new(radius * angle.cos(), y, radius * angle.sin());
                let entity = AnimatedEntity::new(
                    id,
                    rng.random_range(0.0..10_000.0f32).floor(),
                    base,
                    angle,
                    EntityKind::StructuralPart,
                )
                .with_scale(rng.random_range(0.22..0.34))
                .with_color(ring);
                scene.push_entity(entity, ring_node, Transform::from_translation(base));
                id += 1;
            }
        }
        scene
    }

    /// One core body at the origin
    pub fn liquid_core(_settings: &Settings) -> Self {
        let mut scene = Self::empty(SceneKind::LiquidCore);
        let root = scene
            .graph
            .add("stage", NodeRole::Group, Transform::IDENTITY, None);
        let entity = AnimatedEntity::new(0, 0.0, Vec3::ZERO, 0.0, EntityKind::CoreBody);
        scene.push_entity(entity, root, Transform::IDENTITY);
        scene
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|e| e.kind == kind).count()
    }
}

/// Uniform direction, radius uniform in `[inner, outer]`
fn shell_point(rng: &mut Pcg32, inner: f32, outer: f32) -> Vec3 {
    let z: f32 = rng.random_range(-1.0..1.0);
    let theta: f32 = rng.random_range(0.0..TAU);
    let r_xy = (1.0 - z * z).max(0.0).sqrt();
    let dir = Vec3::new(r_xy * theta.cos(), r_xy * theta.sin(), z);
    let radius = if outer > inner {
        rng.random_range(inner..outer)
    } else {
        inner
    };
    dir * radius
}
