use glam::{Mat4, Vec3};
use std::fmt::Write;
use tweetstage_scene::{CameraLens, NodeKind, SceneGraph};

/// Camera/view configuration for rendering, in world space (Z up).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    pub eye: Vec3,
    /// Unit vector the camera looks along.
    pub forward: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        let lens = CameraLens::default();
        Self {
            eye: Vec3::ZERO,
            forward: Vec3::Y,
            up: Vec3::Z,
            fov_degrees: lens.fov_degrees,
            near: lens.near,
            far: lens.far,
        }
    }
}

impl RenderView {
    /// View of the scene's camera node.
    pub fn from_scene(scene: &SceneGraph) -> Self {
        let camera = scene.camera();
        let lens = match scene.get(camera).map(|n| &n.kind) {
            Some(NodeKind::Camera(lens)) => *lens,
            _ => CameraLens::default(),
        };
        let m = scene.world_matrix(camera).unwrap_or_default();
        Self {
            eye: m.transform_point3(Vec3::ZERO),
            forward: m.transform_vector3(Vec3::Y).normalize_or(Vec3::Y),
            up: m.transform_vector3(Vec3::Z).normalize_or(Vec3::Z),
            fov_degrees: lens.fov_degrees,
            near: lens.near,
            far: lens.far,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.eye, self.forward, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            aspect.max(f32::EPSILON),
            self.near,
            self.far,
        )
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene and a view, then produces output. It never
/// mutates the scene.
pub trait Renderer {
    type Output;

    fn render(&self, scene: &SceneGraph, view: &RenderView) -> Self::Output;
}

/// Produces a human-readable dump of one frame.
///
/// Used by the headless run loop and in tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &SceneGraph, view: &RenderView) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Scene (nodes={}, overlays={}) ===",
            scene.node_count(),
            scene.overlays().len()
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) forward=({:.2}, {:.2}, {:.2}) fov={:.0}",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.forward.x,
            view.forward.y,
            view.forward.z,
            view.fov_degrees
        );

        for (id, node) in scene.nodes() {
            let p = node.transform.position;
            let r = node.transform.hpr;
            let _ = write!(
                out,
                "  [{}] {} {} pos=({:.2}, {:.2}, {:.2}) hpr=({:.1}, {:.1}, {:.1})",
                id.short(),
                node.name,
                node.kind.label(),
                p.x,
                p.y,
                p.z,
                r.x,
                r.y,
                r.z
            );
            if let Some(model) = node.kind.model() {
                let _ = write!(out, " meshes={}", model.meshes.len());
            }
            if let NodeKind::Actor(actor) = &node.kind {
                if let (Some(playback), Some(frame)) = (&actor.playing, actor.current_frame()) {
                    let _ = write!(out, " anim={}#{}", playback.clip, frame);
                }
            }
            out.push('\n');
        }

        for overlay in scene.overlays() {
            let _ = writeln!(
                out,
                "Text {:?} at ({:.2}, {:.2}) scale={:.2}",
                overlay.text, overlay.position.x, overlay.position.y, overlay.scale
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use tweetstage_common::{Aabb, AnimClip, AssetId};
    use tweetstage_scene::{ModelRef, TextOverlay};

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn default_view_looks_down_y() {
        let view = RenderView::default();
        assert_eq!(view.forward, Vec3::Y);
        assert_eq!(view.up, Vec3::Z);
        assert_eq!(view.fov_degrees, 40.0);
    }

    #[test]
    fn view_follows_camera_node() {
        let mut scene = SceneGraph::new();
        let camera = scene.camera();
        scene.set_pos(camera, Vec3::new(20.0, 0.0, 3.0)).unwrap();
        scene.set_hpr(camera, Vec3::new(90.0, 0.0, 0.0)).unwrap();

        let view = RenderView::from_scene(&scene);
        assert!(approx(view.eye, Vec3::new(20.0, 0.0, 3.0)));
        // Heading 90 from the +X side looks back along -X, at the origin.
        assert!(approx(view.forward, Vec3::NEG_X));
        assert!(approx(view.up, Vec3::Z));
    }

    #[test]
    fn view_projection_is_finite() {
        let view = RenderView::from_scene(&SceneGraph::new());
        let vp = view.view_projection(16.0 / 9.0);
        assert!(vp.is_finite());
        assert!(view.view_projection(0.0).is_finite());
    }

    #[test]
    fn debug_renderer_empty_scene() {
        let scene = SceneGraph::new();
        let output = DebugTextRenderer::new().render(&scene, &RenderView::from_scene(&scene));
        assert!(output.contains("nodes=2"));
        assert!(output.contains("overlays=0"));
        assert!(output.contains("camera camera"));
    }

    #[test]
    fn debug_renderer_lists_actors_and_text() {
        let mut scene = SceneGraph::new();
        let root = scene.render_root();
        let model = ModelRef {
            asset: AssetId(9),
            source: "models/panda-model".into(),
            bounds: Aabb::UNIT,
            meshes: vec![AssetId(10), AssetId(11)],
        };
        let clip = AnimClip {
            name: "walk".into(),
            duration: 1.0,
            frame_rate: 24.0,
        };
        let panda = scene.attach_actor(root, "panda", model, [clip]).unwrap();
        scene.loop_animation(panda, "walk").unwrap();
        scene.add_text(TextOverlay::new("four more years", Vec2::new(-0.5, 0.02), 0.07));

        let output = DebugTextRenderer::new().render(&scene, &RenderView::from_scene(&scene));
        assert!(output.contains("panda actor"));
        assert!(output.contains("meshes=2"));
        assert!(output.contains("anim=walk#0"));
        assert!(output.contains("Text \"four more years\" at (-0.50, 0.02) scale=0.07"));
    }
}
