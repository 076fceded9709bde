//! Asset pipeline: content-addressed registry and the model loader.
//!
//! Assets are identified by content hashes. The scene refers to loaded
//! geometry by `AssetId`, never by raw file paths.

pub mod gltf;
mod loader;

pub use loader::{LoadedModel, ModelLoader};

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tweetstage_common::{Aabb, AnimClip, AssetId};

/// Frame rate assumed for clips, glTF stores keyframe times not frames.
pub const DEFAULT_FRAME_RATE: f32 = 24.0;

/// Mesh metadata read from a model file.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub vertex_count: u32,
    pub index_count: u32,
    pub bounds: Option<Aabb>,
}

/// An asset entry in the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum Asset {
    Mesh(Mesh),
    Clip(AnimClip),
}

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("asset {name:?} not found (tried {tried:?})")]
    NotFound { name: String, tried: Vec<PathBuf> },
    #[error("glTF parse error: {0}")]
    GltfParse(String),
    #[error("{0:?} contains no animation")]
    NoAnimation(String),
}

/// Content-addressed asset registry.
///
/// Identical content registers once.
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    assets: BTreeMap<AssetId, Asset>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_mesh(&mut self, mesh: Mesh) -> AssetId {
        let mut hasher = Sha256::new();
        hasher.update(b"mesh");
        hasher.update(mesh.name.as_bytes());
        hasher.update(mesh.vertex_count.to_le_bytes());
        hasher.update(mesh.index_count.to_le_bytes());
        if let Some(b) = mesh.bounds {
            for v in b.min.to_array().into_iter().chain(b.max.to_array()) {
                hasher.update(v.to_le_bytes());
            }
        }
        let id = finish(hasher);
        self.assets.insert(id, Asset::Mesh(mesh));
        id
    }

    pub fn register_clip(&mut self, clip: AnimClip) -> AssetId {
        let mut hasher = Sha256::new();
        hasher.update(b"clip");
        hasher.update(clip.name.as_bytes());
        hasher.update(clip.duration.to_le_bytes());
        hasher.update(clip.frame_rate.to_le_bytes());
        let id = finish(hasher);
        self.assets.insert(id, Asset::Clip(clip));
        id
    }

    pub fn get(&self, id: AssetId) -> Option<&Asset> {
        self.assets.get(&id)
    }

    pub fn get_mesh(&self, id: AssetId) -> Option<&Mesh> {
        match self.assets.get(&id) {
            Some(Asset::Mesh(m)) => Some(m),
            _ => None,
        }
    }

    pub fn get_clip(&self, id: AssetId) -> Option<&AnimClip> {
        match self.assets.get(&id) {
            Some(Asset::Clip(c)) => Some(c),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

}

/// Content id of raw bytes: the first eight bytes of their SHA-256.
pub fn content_id(data: &[u8]) -> AssetId {
    let mut hasher = Sha256::new();
    hasher.update(data);
    finish(hasher)
}

fn finish(hasher: Sha256) -> AssetId {
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[..8]);
    AssetId(u64::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn cube() -> Mesh {
        Mesh {
            name: "cube".into(),
            vertex_count: 24,
            index_count: 36,
            bounds: Some(Aabb::UNIT),
        }
    }

    #[test]
    fn register_mesh() {
        let mut store = AssetStore::new();
        let id = store.register_mesh(cube());
        assert_eq!(store.get_mesh(id), Some(&cube()));
        assert!(store.get_clip(id).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn content_addressed_dedup() {
        let mut store = AssetStore::new();
        let id1 = store.register_mesh(cube());
        let id2 = store.register_mesh(cube());
        assert_eq!(id1, id2);
        assert_eq!(store.len(), 1);

        let mut bigger = cube();
        bigger.bounds = Some(Aabb::new(Vec3::ZERO, Vec3::splat(2.0)));
        assert_ne!(store.register_mesh(bigger), id1);
    }

    #[test]
    fn clips_and_meshes_do_not_collide() {
        let mut store = AssetStore::new();
        let clip = store.register_clip(AnimClip {
            name: "cube".into(),
            duration: 1.0,
            frame_rate: DEFAULT_FRAME_RATE,
        });
        let mesh = store.register_mesh(cube());
        assert_ne!(clip, mesh);
        assert_eq!(store.get_clip(clip).unwrap().name, "cube");
    }

    #[test]
    fn content_id_is_stable() {
        assert_eq!(content_id(b"panda"), content_id(b"panda"));
        assert_ne!(content_id(b"panda"), content_id(b"pandas"));
    }
}
