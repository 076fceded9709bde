use glam::Vec3;
use tweetstage_tasks::{FrameContext, FrameControl, FrameListener};

/// Camera placement at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    /// Heading, pitch, roll in degrees.
    pub hpr: Vec3,
}

/// Orbits the camera around the origin at a fixed radius and height, always
/// facing inward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinCamera {
    pub radius: f64,
    pub height: f64,
    pub degrees_per_second: f64,
}

impl Default for SpinCamera {
    fn default() -> Self {
        Self {
            radius: 20.0,
            height: 3.0,
            degrees_per_second: 6.0,
        }
    }
}

impl SpinCamera {
    pub fn pose(&self, task_time: f64) -> CameraPose {
        let angle_degrees = task_time * self.degrees_per_second;
        let (sin, cos) = angle_degrees.to_radians().sin_cos();
        CameraPose {
            position: Vec3::new(
                (self.radius * sin) as f32,
                (-self.radius * cos) as f32,
                self.height as f32,
            ),
            hpr: Vec3::new(angle_degrees as f32, 0.0, 0.0),
        }
    }
}

/// Pose of the default orbit after `task_time` seconds.
pub fn camera_pose(task_time: f64) -> CameraPose {
    SpinCamera::default().pose(task_time)
}

impl FrameListener for SpinCamera {
    fn on_frame(&mut self, ctx: &mut FrameContext<'_>) -> FrameControl {
        let pose = self.pose(ctx.time.task_time);
        let camera = ctx.scene.camera();
        if let Err(e) = ctx
            .scene
            .set_pos(camera, pose.position)
            .and_then(|()| ctx.scene.set_hpr(camera, pose.hpr))
        {
            tracing::warn!("camera not updated: {e}");
        }
        FrameControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tweetstage_scene::SceneGraph;
    use tweetstage_tasks::TaskManager;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn starts_behind_the_origin() {
        let pose = camera_pose(0.0);
        assert!(approx(pose.position, Vec3::new(0.0, -20.0, 3.0)));
        assert_eq!(pose.hpr, Vec3::ZERO);
    }

    #[test]
    fn quarter_turn_after_fifteen_seconds() {
        let pose = camera_pose(15.0);
        assert!(approx(pose.position, Vec3::new(20.0, 0.0, 3.0)));
        assert!(approx(pose.hpr, Vec3::new(90.0, 0.0, 0.0)));
    }

    #[test]
    fn full_turn_after_one_minute() {
        let pose = camera_pose(60.0);
        assert!(approx(pose.position, Vec3::new(0.0, -20.0, 3.0)));
        assert!(approx(pose.hpr, Vec3::new(360.0, 0.0, 0.0)));
    }

    #[test]
    fn listener_moves_camera_and_keeps_running() {
        let mut scene = SceneGraph::new();
        let mut tasks = TaskManager::new();
        tasks.add("SpinCameraTask", SpinCamera::default()).unwrap();

        for _ in 0..15 {
            tasks.step(&mut scene, 1.0);
        }
        assert!(tasks.contains("SpinCameraTask"));

        let camera = scene.get(scene.camera()).unwrap();
        assert!(approx(camera.transform.position, Vec3::new(20.0, 0.0, 3.0)));
        assert!(approx(camera.transform.hpr, Vec3::new(90.0, 0.0, 0.0)));
    }
}
