use crate::task::{FrameContext, FrameControl, FrameListener};

/// Advances every playing actor clip by the frame delta.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActorAnimator;

impl FrameListener for ActorAnimator {
    fn on_frame(&mut self, ctx: &mut FrameContext<'_>) -> FrameControl {
        ctx.scene.advance_animations(ctx.time.dt as f32);
        FrameControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TaskManager;
    use tweetstage_common::{Aabb, AnimClip, AssetId};
    use tweetstage_scene::{ModelRef, NodeKind, SceneGraph};

    #[test]
    fn animator_advances_looping_clip() {
        let mut scene = SceneGraph::new();
        let root = scene.render_root();
        let model = ModelRef {
            asset: AssetId(3),
            source: "models/panda-model".into(),
            bounds: Aabb::UNIT,
            meshes: Vec::new(),
        };
        let clip = AnimClip {
            name: "walk".into(),
            duration: 1.0,
            frame_rate: 10.0,
        };
        let panda = scene.attach_actor(root, "panda", model, [clip]).unwrap();
        scene.loop_animation(panda, "walk").unwrap();

        let mut tasks = TaskManager::new();
        tasks.add("animate-actors", ActorAnimator).unwrap();
        tasks.step(&mut scene, 0.25);
        tasks.step(&mut scene, 1.0);

        let NodeKind::Actor(actor) = &scene.get(panda).unwrap().kind else {
            panic!("expected actor");
        };
        assert_eq!(actor.current_frame(), Some(2));
    }
}
