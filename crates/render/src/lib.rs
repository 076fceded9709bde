//! Rendering adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers never mutate the scene graph.
//! - The view derives from the camera node's world transform.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};
