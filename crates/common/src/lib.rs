//! Shared value types used across the tweetstage crates.
//!
//! Coordinates are Z-up: +X right, +Y forward, +Z up. Rotations are stored as
//! heading/pitch/roll in degrees.

mod types;

pub use types::{Aabb, AnimClip, AssetId, NodeId, Transform, hpr_to_quat};
