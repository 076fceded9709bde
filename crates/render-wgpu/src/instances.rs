use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use tweetstage_scene::{NodeKind, SceneGraph};

const MODEL_COLOR: [f32; 4] = [0.45, 0.6, 0.35, 1.0];
const ACTOR_COLOR: [f32; 4] = [0.95, 0.95, 0.9, 1.0];
/// Flat models (terrain planes) still get a visible slab.
const MIN_EXTENT: f32 = 0.05;

/// Per-box GPU data: model matrix columns and a flat color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    pub model_0: [f32; 4],
    pub model_1: [f32; 4],
    pub model_2: [f32; 4],
    pub model_3: [f32; 4],
    pub color: [f32; 4],
}

/// One instance per drawable node, mapping the unit cube onto the node's
/// bounds in world space. At most `max` instances are produced.
pub fn build_instances(scene: &SceneGraph, max: usize) -> Vec<InstanceData> {
    let mut instances = Vec::new();
    for (id, node) in scene.nodes() {
        if instances.len() >= max {
            tracing::warn!(max, "instance budget exhausted, skipping remaining nodes");
            break;
        }
        let Some(bounds) = node.kind.bounds() else {
            continue;
        };
        let Ok(world) = scene.world_matrix(*id) else {
            continue;
        };
        let fit = Mat4::from_translation(bounds.center()) * Mat4::from_scale(bounds.size().max(Vec3::splat(MIN_EXTENT)));
        let cols = (world * fit).to_cols_array_2d();
        let color = match node.kind {
            NodeKind::Actor(_) => ACTOR_COLOR,
            _ => MODEL_COLOR,
        };
        instances.push(InstanceData {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color,
        });
    }
    instances
}
