//! Minimal glTF 2.0 JSON reader.
//!
//! Only the metadata the scene needs is read: per-primitive vertex and index
//! counts, position bounds from accessor `min`/`max`, and animation lengths
//! from sampler input accessors. Buffer contents are never touched.

use crate::{AssetError, Mesh};
use glam::Vec3;
use serde_json::Value;
use tweetstage_common::Aabb;

/// What a glTF file declares, before registration.
#[derive(Debug, Clone, Default)]
pub struct GltfSummary {
    pub meshes: Vec<Mesh>,
    /// (animation name, duration in seconds)
    pub animations: Vec<(String, f32)>,
}

pub fn parse(text: &str) -> Result<GltfSummary, AssetError> {
    let json: Value =
        serde_json::from_str(text).map_err(|e| AssetError::GltfParse(e.to_string()))?;
    if !json.is_object() {
        return Err(AssetError::GltfParse("top level is not an object".into()));
    }
    let accessors = json
        .get("accessors")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut summary = GltfSummary::default();

    if let Some(meshes) = json.get("meshes").and_then(Value::as_array) {
        for (i, mesh_val) in meshes.iter().enumerate() {
            let name = mesh_val
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("unnamed")
                .to_string();
            let mut mesh = Mesh {
                name: format!("{name}_{i}"),
                vertex_count: 0,
                index_count: 0,
                bounds: None,
            };
            let primitives = mesh_val
                .get("primitives")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            for prim in primitives {
                if let Some(pos) = prim
                    .get("attributes")
                    .and_then(|a| a.get("POSITION"))
                    .and_then(|p| accessor(accessors, p))
                {
                    mesh.vertex_count += accessor_count(pos);
                    if let Some(b) = accessor_bounds(pos) {
                        mesh.bounds = Some(match mesh.bounds {
                            Some(existing) => existing.union(&b),
                            None => b,
                        });
                    }
                }
                if let Some(idx) = prim.get("indices").and_then(|p| accessor(accessors, p)) {
                    mesh.index_count += accessor_count(idx);
                }
            }
            summary.meshes.push(mesh);
        }
    }

    if let Some(animations) = json.get("animations").and_then(Value::as_array) {
        for (i, anim) in animations.iter().enumerate() {
            let name = anim
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("animation_{i}"));
            let duration = anim
                .get("samplers")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default()
                .iter()
                .filter_map(|s| s.get("input").and_then(|p| accessor(accessors, p)))
                .filter_map(|a| a.get("max").and_then(Value::as_array))
                .filter_map(|max| max.first().and_then(Value::as_f64))
                .fold(0.0f64, f64::max);
            summary.animations.push((name, duration as f32));
        }
    }

    Ok(summary)
}

fn accessor<'a>(accessors: &'a [Value], index: &Value) -> Option<&'a Value> {
    accessors.get(index.as_u64()? as usize)
}

fn accessor_count(accessor: &Value) -> u32 {
    accessor.get("count").and_then(Value::as_u64).unwrap_or(0) as u32
}

fn accessor_bounds(accessor: &Value) -> Option<Aabb> {
    let min = vec3(accessor.get("min")?)?;
    let max = vec3(accessor.get("max")?)?;
    Some(Aabb::new(min, max))
}

fn vec3(value: &Value) -> Option<Vec3> {
    let arr = value.as_array()?;
    if arr.len() < 3 {
        return None;
    }
    Some(Vec3::new(
        arr[0].as_f64()? as f32,
        arr[1].as_f64()? as f32,
        arr[2].as_f64()? as f32,
    ))
}
