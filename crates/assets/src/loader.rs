use crate::{AssetError, AssetStore, DEFAULT_FRAME_RATE, content_id, gltf};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tweetstage_common::{Aabb, AnimClip, AssetId};

/// A model ready to be attached to the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModel {
    pub id: AssetId,
    pub name: String,
    /// Union of every mesh's bounds, or the unit box if none are declared.
    pub bounds: Aabb,
    pub meshes: Vec<AssetId>,
}

/// Loads models and animation clips by asset name.
///
/// Names follow the `models/environment` convention: a path relative to the
/// asset root, with or without the `.gltf` extension. Loaded models are
/// cached by name.
#[derive(Debug)]
pub struct ModelLoader {
    root: PathBuf,
    store: AssetStore,
    cache: BTreeMap<String, LoadedModel>,
}

impl ModelLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            store: AssetStore::new(),
            cache: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    /// Find the file an asset name refers to.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, AssetError> {
        let direct = self.root.join(name);
        let with_ext = self.root.join(format!("{name}.gltf"));
        for candidate in [&direct, &with_ext] {
            if candidate.is_file() {
                return Ok(candidate.clone());
            }
        }
        Err(AssetError::NotFound {
            name: name.to_string(),
            tried: vec![direct, with_ext],
        })
    }

    pub fn load_model(&mut self, name: &str) -> Result<LoadedModel, AssetError> {
        if let Some(model) = self.cache.get(name) {
            tracing::debug!(%name, "model served from cache");
            return Ok(model.clone());
        }
        let path = self.resolve(name)?;
        let text = std::fs::read_to_string(&path)?;
        let summary = gltf::parse(&text)?;

        let bounds = summary
            .meshes
            .iter()
            .filter_map(|m| m.bounds)
            .reduce(|a, b| a.union(&b))
            .unwrap_or(Aabb::UNIT);
        let meshes = summary
            .meshes
            .into_iter()
            .map(|m| self.store.register_mesh(m))
            .collect::<Vec<_>>();

        let model = LoadedModel {
            id: content_id(text.as_bytes()),
            name: name.to_string(),
            bounds,
            meshes,
        };
        tracing::info!(
            %name,
            path = %path.display(),
            meshes = model.meshes.len(),
            "loaded model"
        );
        self.cache.insert(name.to_string(), model.clone());
        Ok(model)
    }

    /// Load the first animation in `name` and bind it as `clip_name`.
    pub fn load_clip(&mut self, name: &str, clip_name: &str) -> Result<AnimClip, AssetError> {
        let path = self.resolve(name)?;
        let summary = gltf::parse(&std::fs::read_to_string(&path)?)?;
        let (_, duration) = summary
            .animations
            .first()
            .cloned()
            .ok_or_else(|| AssetError::NoAnimation(name.to_string()))?;
        let clip = AnimClip {
            name: clip_name.to_string(),
            duration,
            frame_rate: DEFAULT_FRAME_RATE,
        };
        self.store.register_clip(clip.clone());
        tracing::info!(%name, clip = clip_name, duration, "loaded animation");
        Ok(clip)
    }
}
