//! WebGPU rendering module
//!
//! Draws every entity as an instanced quad. The WGSL shader adds the
//! particle displacement field and the liquid core wobble on top of the
//! CPU transforms.

pub mod instance;
pub mod pipeline;

pub use instance::{Globals, InstanceData, MAX_INSTANCES, build_instances};
pub use pipeline::InstancedRenderState;
