//! wgpu render backend for the scene graph.
//!
//! Draws a ground grid in the XY plane and every model or actor node as a box
//! spanning its geometry bounds.
//!
//! # Invariants
//! - Renderer never mutates the scene.
//! - Instance data is rebuilt from world matrices every frame.

mod gpu;
mod instances;
mod shaders;

pub use gpu::WgpuRenderer;
pub use instances::{InstanceData, build_instances};
