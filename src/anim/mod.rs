//! Deterministic per-frame animator
//!
//! Every transform produced here must be a pure function of its inputs:
//! - Entity seed, base position and phase (fixed at scene creation)
//! - Clock seconds, smoothed pointer and scroll state (per frame)
//! - No accumulated positions, no rendering or platform dependencies

pub mod animator;
pub mod entity;
pub mod graph;
pub mod liquid;
pub mod motion;
pub mod pointer;
pub mod scroll;

pub use animator::{Animator, CameraPose, FieldUniforms, Frame, FrameStats, ResourceRegistry};
pub use entity::{AnimatedEntity, EntityKind, EntityTransform, MotionParams, ResourceKey, Transform};
pub use graph::{NodeId, NodeRole, SceneGraph, SceneNode};
pub use liquid::{CoreParams, LiquidCore};
pub use motion::{orbital_offset, pointer_repulsion, pointer_to_world, repulsion_force};
pub use pointer::PointerState;
pub use scroll::{ScrollState, camera_depth, explosion_factor};
