use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tweetstage_common::{Aabb, AnimClip, AssetId, NodeId, Transform};

/// Projection parameters of a camera node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraLens {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraLens {
    fn default() -> Self {
        Self {
            fov_degrees: 40.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Geometry reference held by model and actor nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRef {
    pub asset: AssetId,
    /// Asset name the model was loaded from, e.g. `models/environment`.
    pub source: String,
    pub bounds: Aabb,
    /// Registry ids of the meshes the model file declares.
    pub meshes: Vec<AssetId>,
}

/// The clip an actor is currently playing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playback {
    pub clip: String,
    /// Seconds into the clip.
    pub time: f32,
    pub looping: bool,
}

/// An animated model: geometry plus named clips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorState {
    pub model: ModelRef,
    pub clips: BTreeMap<String, AnimClip>,
    pub playing: Option<Playback>,
}

impl ActorState {
    pub fn new(model: ModelRef, clips: impl IntoIterator<Item = AnimClip>) -> Self {
        Self {
            model,
            clips: clips.into_iter().map(|c| (c.name.clone(), c)).collect(),
            playing: None,
        }
    }

    /// Frame index of the playing clip, if any.
    pub fn current_frame(&self) -> Option<u32> {
        let playback = self.playing.as_ref()?;
        let clip = self.clips.get(&playback.clip)?;
        let frame = (playback.time * clip.frame_rate).floor() as u32;
        if playback.looping {
            Some(frame % clip.frame_count())
        } else {
            Some(frame.min(clip.frame_count() - 1))
        }
    }

    pub(crate) fn advance(&mut self, dt: f32) {
        let Some(playback) = self.playing.as_mut() else {
            return;
        };
        let Some(clip) = self.clips.get(&playback.clip) else {
            return;
        };
        playback.time += dt;
        if clip.duration <= 0.0 {
            playback.time = 0.0;
        } else if playback.looping {
            playback.time %= clip.duration;
        } else {
            playback.time = playback.time.min(clip.duration);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Grouping node with no geometry.
    Empty,
    Camera(CameraLens),
    Model(ModelRef),
    Actor(ActorState),
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Camera(_) => "camera",
            Self::Model(_) => "model",
            Self::Actor(_) => "actor",
        }
    }

    pub fn model(&self) -> Option<&ModelRef> {
        match self {
            Self::Model(m) => Some(m),
            Self::Actor(a) => Some(&a.model),
            Self::Empty | Self::Camera(_) => None,
        }
    }

    /// Geometry bounds for drawable nodes.
    pub fn bounds(&self) -> Option<Aabb> {
        self.model().map(|m| m.bounds)
    }
}

/// A node in the scene graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub parent: Option<NodeId>,
    pub transform: Transform,
    pub kind: NodeKind,
}
