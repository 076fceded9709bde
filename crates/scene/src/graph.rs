use crate::node::{ActorState, CameraLens, ModelRef, Node, NodeKind, Playback};
use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tweetstage_common::{AnimClip, NodeId, Transform};

/// Errors from scene graph operations.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("node {0:?} not found")]
    NodeNotFound(NodeId),
    #[error("node {0:?} is not an actor")]
    NotAnActor(NodeId),
    #[error("actor {node:?} has no clip named {clip:?}")]
    ClipNotFound { node: NodeId, clip: String },
    #[error("reparenting {child:?} under {parent:?} would create a cycle")]
    Cycle { child: NodeId, parent: NodeId },
    #[error("node {0:?} is a scene root and cannot be removed or reparented")]
    RootNode(NodeId),
}

/// A record of one mutation to the scene graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    Attached {
        id: NodeId,
        parent: NodeId,
        name: String,
    },
    Reparented {
        id: NodeId,
        old: Option<NodeId>,
        new: NodeId,
    },
    /// Carries the removed subtree size for diagnostics.
    Removed { id: NodeId, count: usize },
    TransformUpdated {
        id: NodeId,
        old: Transform,
        new: Transform,
    },
    AnimationStarted {
        id: NodeId,
        clip: String,
        looping: bool,
    },
    AnimationStopped { id: NodeId },
    OverlayAdded { index: usize, text: String },
}

/// A line of screen-space text drawn over the 3D view.
///
/// `position` is in aspect-2D units: y runs from -1 (bottom) to 1 (top), x is
/// scaled by the window aspect ratio, and the origin is the screen centre.
/// `scale` is the glyph height in the same units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOverlay {
    pub text: String,
    pub position: Vec2,
    pub scale: f32,
}

impl TextOverlay {
    pub fn new(text: impl Into<String>, position: Vec2, scale: f32) -> Self {
        Self {
            text: text.into(),
            position,
            scale,
        }
    }
}

/// The scene graph.
///
/// Owns every node, the render root under which drawable geometry hangs, the
/// camera node, and the list of text overlays. Nodes live in a `BTreeMap` so
/// iteration order is stable across runs.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: BTreeMap<NodeId, Node>,
    render: NodeId,
    camera: NodeId,
    overlays: Vec<TextOverlay>,
    event_log: Vec<SceneEvent>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a graph holding only the render root and the camera.
    pub fn new() -> Self {
        let render = NodeId::new();
        let camera = NodeId::new();
        let mut nodes = BTreeMap::new();
        nodes.insert(
            render,
            Node {
                name: "render".into(),
                parent: None,
                transform: Transform::default(),
                kind: NodeKind::Empty,
            },
        );
        nodes.insert(
            camera,
            Node {
                name: "camera".into(),
                parent: None,
                transform: Transform::default(),
                kind: NodeKind::Camera(CameraLens::default()),
            },
        );
        Self {
            nodes,
            render,
            camera,
            overlays: Vec::new(),
            event_log: Vec::new(),
        }
    }

    pub fn render_root(&self) -> NodeId {
        self.render
    }

    pub fn camera(&self) -> NodeId {
        self.camera
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &BTreeMap<NodeId, Node> {
        &self.nodes
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// First node with the given name, in id order.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| *id)
    }

    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Add a node of any kind under `parent`.
    pub fn add_node(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        kind: NodeKind,
    ) -> Result<NodeId, SceneError> {
        if !self.nodes.contains_key(&parent) {
            return Err(SceneError::NodeNotFound(parent));
        }
        let id = NodeId::new();
        let name = name.into();
        tracing::debug!(node = %id.short(), %name, kind = kind.label(), "attached node");
        self.nodes.insert(
            id,
            Node {
                name: name.clone(),
                parent: Some(parent),
                transform: Transform::default(),
                kind,
            },
        );
        self.event_log
            .push(SceneEvent::Attached { id, parent, name });
        Ok(id)
    }

    pub fn attach_model(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        model: ModelRef,
    ) -> Result<NodeId, SceneError> {
        self.add_node(parent, name, NodeKind::Model(model))
    }

    pub fn attach_actor(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        model: ModelRef,
        clips: impl IntoIterator<Item = AnimClip>,
    ) -> Result<NodeId, SceneError> {
        self.add_node(parent, name, NodeKind::Actor(ActorState::new(model, clips)))
    }

    /// Move `id` under `parent`, keeping its local transform.
    pub fn reparent(&mut self, id: NodeId, parent: NodeId) -> Result<(), SceneError> {
        if id == self.render {
            return Err(SceneError::RootNode(id));
        }
        if !self.nodes.contains_key(&parent) {
            return Err(SceneError::NodeNotFound(parent));
        }
        if !self.nodes.contains_key(&id) {
            return Err(SceneError::NodeNotFound(id));
        }
        if self.is_ancestor_or_self(id, parent) {
            return Err(SceneError::Cycle { child: id, parent });
        }
        let node = self.nodes.get_mut(&id).ok_or(SceneError::NodeNotFound(id))?;
        let old = node.parent.replace(parent);
        self.event_log.push(SceneEvent::Reparented {
            id,
            old,
            new: parent,
        });
        Ok(())
    }

    /// Remove a node and its whole subtree. Returns the number of nodes removed.
    pub fn remove(&mut self, id: NodeId) -> Result<usize, SceneError> {
        if id == self.render || id == self.camera {
            return Err(SceneError::RootNode(id));
        }
        if !self.nodes.contains_key(&id) {
            return Err(SceneError::NodeNotFound(id));
        }
        let doomed: Vec<NodeId> = self
            .nodes
            .keys()
            .copied()
            .filter(|n| self.is_ancestor_or_self(id, *n))
            .collect();
        if doomed.contains(&self.camera) {
            return Err(SceneError::RootNode(self.camera));
        }
        for n in &doomed {
            self.nodes.remove(n);
        }
        self.event_log.push(SceneEvent::Removed {
            id,
            count: doomed.len(),
        });
        Ok(doomed.len())
    }

    pub fn set_transform(&mut self, id: NodeId, new: Transform) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(&id).ok_or(SceneError::NodeNotFound(id))?;
        let old = node.transform;
        node.transform = new;
        self.event_log
            .push(SceneEvent::TransformUpdated { id, old, new });
        Ok(())
    }

    pub fn set_pos(&mut self, id: NodeId, position: Vec3) -> Result<(), SceneError> {
        let current = self.transform_of(id)?;
        self.set_transform(id, Transform { position, ..current })
    }

    /// Set heading, pitch and roll in degrees.
    pub fn set_hpr(&mut self, id: NodeId, hpr: Vec3) -> Result<(), SceneError> {
        let current = self.transform_of(id)?;
        self.set_transform(id, Transform { hpr, ..current })
    }

    pub fn set_scale(&mut self, id: NodeId, scale: Vec3) -> Result<(), SceneError> {
        let current = self.transform_of(id)?;
        self.set_transform(id, Transform { scale, ..current })
    }

    /// Model-to-world matrix, composed through every ancestor.
    pub fn world_matrix(&self, id: NodeId) -> Result<Mat4, SceneError> {
        let mut node = self.nodes.get(&id).ok_or(SceneError::NodeNotFound(id))?;
        let mut matrix = node.transform.matrix();
        while let Some(parent) = node.parent {
            node = self
                .nodes
                .get(&parent)
                .ok_or(SceneError::NodeNotFound(parent))?;
            matrix = node.transform.matrix() * matrix;
        }
        Ok(matrix)
    }

    /// Start playing `clip` on an actor, from the beginning.
    pub fn play_animation(
        &mut self,
        id: NodeId,
        clip: &str,
        looping: bool,
    ) -> Result<(), SceneError> {
        let actor = self.actor_mut(id)?;
        if !actor.clips.contains_key(clip) {
            return Err(SceneError::ClipNotFound {
                node: id,
                clip: clip.to_string(),
            });
        }
        actor.playing = Some(Playback {
            clip: clip.to_string(),
            time: 0.0,
            looping,
        });
        self.event_log.push(SceneEvent::AnimationStarted {
            id,
            clip: clip.to_string(),
            looping,
        });
        Ok(())
    }

    pub fn loop_animation(&mut self, id: NodeId, clip: &str) -> Result<(), SceneError> {
        self.play_animation(id, clip, true)
    }

    pub fn stop_animation(&mut self, id: NodeId) -> Result<(), SceneError> {
        let actor = self.actor_mut(id)?;
        if actor.playing.take().is_some() {
            self.event_log.push(SceneEvent::AnimationStopped { id });
        }
        Ok(())
    }

    /// Advance every playing actor clip by `dt` seconds.
    pub fn advance_animations(&mut self, dt: f32) {
        for node in self.nodes.values_mut() {
            if let NodeKind::Actor(actor) = &mut node.kind {
                actor.advance(dt);
            }
        }
    }

    pub fn add_text(&mut self, overlay: TextOverlay) -> usize {
        let index = self.overlays.len();
        self.event_log.push(SceneEvent::OverlayAdded {
            index,
            text: overlay.text.clone(),
        });
        self.overlays.push(overlay);
        index
    }

    pub fn overlays(&self) -> &[TextOverlay] {
        &self.overlays
    }

    fn transform_of(&self, id: NodeId) -> Result<Transform, SceneError> {
        self.nodes
            .get(&id)
            .map(|n| n.transform)
            .ok_or(SceneError::NodeNotFound(id))
    }

    fn actor_mut(&mut self, id: NodeId) -> Result<&mut ActorState, SceneError> {
        match self.nodes.get_mut(&id) {
            Some(Node {
                kind: NodeKind::Actor(actor),
                ..
            }) => Ok(actor),
            Some(_) => Err(SceneError::NotAnActor(id)),
            None => Err(SceneError::NodeNotFound(id)),
        }
    }

    /// True if `ancestor` is `node` or lies on its parent chain.
    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tweetstage_common::{Aabb, AssetId};

    fn model(source: &str) -> ModelRef {
        ModelRef {
            asset: AssetId(7),
            source: source.into(),
            bounds: Aabb::UNIT,
            meshes: Vec::new(),
        }
    }

    fn walk_clip() -> AnimClip {
        AnimClip {
            name: "walk".into(),
            duration: 1.0,
            frame_rate: 24.0,
        }
    }

    #[test]
    fn new_graph_has_roots() {
        let scene = SceneGraph::new();
        assert_eq!(scene.node_count(), 2);
        assert_eq!(scene.get(scene.render_root()).unwrap().name, "render");
        assert!(matches!(
            scene.get(scene.camera()).unwrap().kind,
            NodeKind::Camera(_)
        ));
    }

    #[test]
    fn attach_and_transform_model() {
        let mut scene = SceneGraph::new();
        let root = scene.render_root();
        let id = scene
            .attach_model(root, "environment", model("models/environment"))
            .unwrap();
        scene.set_scale(id, Vec3::splat(0.25)).unwrap();
        scene.set_pos(id, Vec3::new(-8.0, 42.0, 0.0)).unwrap();

        let node = scene.get(id).unwrap();
        assert_eq!(node.parent, Some(root));
        assert_eq!(node.transform.scale, Vec3::splat(0.25));
        assert_eq!(node.transform.position, Vec3::new(-8.0, 42.0, 0.0));
        // attach + two transform updates
        assert_eq!(scene.events().len(), 3);
        assert_eq!(scene.find("environment"), Some(id));
    }

    #[test]
    fn unknown_node_is_an_error() {
        let mut scene = SceneGraph::new();
        let ghost = NodeId::new();
        assert!(matches!(
            scene.set_pos(ghost, Vec3::ONE),
            Err(SceneError::NodeNotFound(_))
        ));
        assert!(scene.add_node(ghost, "orphan", NodeKind::Empty).is_err());
    }

    #[test]
    fn world_matrix_composes_parents() {
        let mut scene = SceneGraph::new();
        let root = scene.render_root();
        let group = scene.add_node(root, "group", NodeKind::Empty).unwrap();
        scene.set_pos(group, Vec3::new(10.0, 0.0, 0.0)).unwrap();
        scene.set_scale(group, Vec3::splat(2.0)).unwrap();
        let child = scene.attach_model(group, "box", model("box")).unwrap();
        scene.set_pos(child, Vec3::new(1.0, 1.0, 0.0)).unwrap();

        let p = scene.world_matrix(child).unwrap().transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(12.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn reparent_rejects_cycles() {
        let mut scene = SceneGraph::new();
        let root = scene.render_root();
        let a = scene.add_node(root, "a", NodeKind::Empty).unwrap();
        let b = scene.add_node(a, "b", NodeKind::Empty).unwrap();
        assert!(matches!(
            scene.reparent(a, b),
            Err(SceneError::Cycle { .. })
        ));
        assert!(matches!(scene.reparent(a, a), Err(SceneError::Cycle { .. })));
        assert!(matches!(
            scene.reparent(root, a),
            Err(SceneError::RootNode(_))
        ));
        // Attaching the camera under a node is allowed.
        let camera = scene.camera();
        scene.reparent(camera, b).unwrap();
        assert_eq!(scene.get(camera).unwrap().parent, Some(b));
    }

    #[test]
    fn remove_takes_subtree() {
        let mut scene = SceneGraph::new();
        let root = scene.render_root();
        let a = scene.add_node(root, "a", NodeKind::Empty).unwrap();
        let b = scene.add_node(a, "b", NodeKind::Empty).unwrap();
        scene.add_node(b, "c", NodeKind::Empty).unwrap();
        let keep = scene.add_node(root, "keep", NodeKind::Empty).unwrap();

        assert_eq!(scene.remove(a).unwrap(), 3);
        assert_eq!(scene.node_count(), 3);
        assert!(scene.get(keep).is_some());
        assert!(matches!(
            scene.remove(scene.camera()),
            Err(SceneError::RootNode(_))
        ));
    }

    #[test]
    fn removing_the_camera_parent_is_refused() {
        let mut scene = SceneGraph::new();
        let root = scene.render_root();
        let rig = scene.add_node(root, "rig", NodeKind::Empty).unwrap();
        let camera = scene.camera();
        scene.reparent(camera, rig).unwrap();
        assert!(matches!(scene.remove(rig), Err(SceneError::RootNode(_))));
        assert!(scene.get(rig).is_some());
    }

    #[test]
    fn loop_animation_requires_known_clip() {
        let mut scene = SceneGraph::new();
        let root = scene.render_root();
        let panda = scene
            .attach_actor(root, "panda", model("models/panda-model"), [walk_clip()])
            .unwrap();
        assert!(matches!(
            scene.loop_animation(panda, "run"),
            Err(SceneError::ClipNotFound { .. })
        ));
        scene.loop_animation(panda, "walk").unwrap();
        scene.advance_animations(1.5);

        let NodeKind::Actor(actor) = &scene.get(panda).unwrap().kind else {
            panic!("expected actor");
        };
        let playback = actor.playing.as_ref().unwrap();
        assert!(playback.looping);
        assert!((playback.time - 0.5).abs() < 1e-5);

        scene.stop_animation(panda).unwrap();
        assert!(matches!(
            scene.events().last(),
            Some(SceneEvent::AnimationStopped { .. })
        ));
    }

    #[test]
    fn animating_a_model_is_rejected() {
        let mut scene = SceneGraph::new();
        let root = scene.render_root();
        let env = scene.attach_model(root, "env", model("env")).unwrap();
        assert!(matches!(
            scene.loop_animation(env, "walk"),
            Err(SceneError::NotAnActor(_))
        ));
    }

    #[test]
    fn overlays_are_recorded() {
        let mut scene = SceneGraph::new();
        let index = scene.add_text(TextOverlay::new("hello", Vec2::new(-0.5, 0.02), 0.07));
        assert_eq!(index, 0);
        assert_eq!(scene.overlays()[0].text, "hello");
        let drained = scene.drain_events();
        assert_eq!(drained.len(), 1);
        assert!(scene.events().is_empty());
    }
}
