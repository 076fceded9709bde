//! Scene graph: the hierarchy of renderable nodes and their transforms.
//!
//! # Invariants
//! - The render root and the camera node exist for the lifetime of the graph.
//! - Every mutation goes through an explicit operation and is logged.
//! - Parent links never form a cycle.

mod graph;
mod node;

pub use graph::{SceneError, SceneEvent, SceneGraph, TextOverlay};
pub use node::{ActorState, CameraLens, ModelRef, Node, NodeKind, Playback};
