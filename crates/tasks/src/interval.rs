use crate::task::{FrameContext, FrameControl, FrameListener};
use glam::Vec3;
use tweetstage_common::NodeId;
use tweetstage_scene::{SceneError, SceneGraph};

/// Which node attribute an interval drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LerpProperty {
    Pos,
    /// Heading, pitch, roll in degrees, blended per component.
    Hpr,
    Scale,
}

/// Linear blend of one node attribute from `start` to `end` over `duration`
/// seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct LerpInterval {
    pub node: NodeId,
    pub property: LerpProperty,
    pub start: Vec3,
    pub end: Vec3,
    pub duration: f64,
}

impl LerpInterval {
    pub fn pos(node: NodeId, duration: f64, start: Vec3, end: Vec3) -> Self {
        Self {
            node,
            property: LerpProperty::Pos,
            start,
            end,
            duration,
        }
    }

    pub fn hpr(node: NodeId, duration: f64, start: Vec3, end: Vec3) -> Self {
        Self {
            node,
            property: LerpProperty::Hpr,
            start,
            end,
            duration,
        }
    }

    pub fn scale(node: NodeId, duration: f64, start: Vec3, end: Vec3) -> Self {
        Self {
            node,
            property: LerpProperty::Scale,
            start,
            end,
            duration,
        }
    }

    /// Value at local time `t`, clamped to the interval.
    pub fn value_at(&self, t: f64) -> Vec3 {
        if self.duration <= 0.0 {
            return self.end;
        }
        let fraction = (t / self.duration).clamp(0.0, 1.0) as f32;
        self.start.lerp(self.end, fraction)
    }

    pub fn apply(&self, scene: &mut SceneGraph, t: f64) -> Result<(), SceneError> {
        let value = self.value_at(t);
        match self.property {
            LerpProperty::Pos => scene.set_pos(self.node, value),
            LerpProperty::Hpr => scene.set_hpr(self.node, value),
            LerpProperty::Scale => scene.set_scale(self.node, value),
        }
    }
}

/// Intervals played back to back.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub name: String,
    pub intervals: Vec<LerpInterval>,
}

impl Sequence {
    pub fn new(name: impl Into<String>, intervals: Vec<LerpInterval>) -> Self {
        Self {
            name: name.into(),
            intervals,
        }
    }

    pub fn duration(&self) -> f64 {
        self.intervals.iter().map(|i| i.duration.max(0.0)).sum()
    }

    /// Put the scene in the state the sequence describes at time `t`.
    ///
    /// Every interval that has started by `t` is applied, in order, at its
    /// clamped local time, so earlier intervals leave their final values
    /// behind even when a frame skips past them.
    pub fn apply_at(&self, scene: &mut SceneGraph, t: f64) -> Result<(), SceneError> {
        let mut offset = 0.0;
        for interval in &self.intervals {
            if t < offset {
                break;
            }
            interval.apply(scene, t - offset)?;
            offset += interval.duration.max(0.0);
        }
        Ok(())
    }

    /// Like [`apply_at`](Self::apply_at) for a pass that follows a full one.
    ///
    /// Intervals not yet started at `t` hold the values the previous pass
    /// ended on.
    pub fn apply_repeat_at(&self, scene: &mut SceneGraph, t: f64) -> Result<(), SceneError> {
        let mut offset = 0.0;
        for interval in &self.intervals {
            if t < offset {
                interval.apply(scene, interval.duration)?;
            }
            offset += interval.duration.max(0.0);
        }
        self.apply_at(scene, t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    Once,
    Loop,
}

/// Frame listener that drives a [`Sequence`] from task time.
#[derive(Debug, Clone)]
pub struct SequencePlayer {
    sequence: Sequence,
    mode: PlayMode,
}

impl SequencePlayer {
    pub fn new(sequence: Sequence, mode: PlayMode) -> Self {
        Self { sequence, mode }
    }

    pub fn looping(sequence: Sequence) -> Self {
        Self::new(sequence, PlayMode::Loop)
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    /// Sequence time for a given task time.
    pub fn local_time(&self, task_time: f64) -> f64 {
        let duration = self.sequence.duration();
        match self.mode {
            PlayMode::Loop if duration > 0.0 => task_time.rem_euclid(duration),
            PlayMode::Loop => 0.0,
            PlayMode::Once => task_time.min(duration),
        }
    }
}

impl FrameListener for SequencePlayer {
    fn on_frame(&mut self, ctx: &mut FrameContext<'_>) -> FrameControl {
        let t = self.local_time(ctx.time.task_time);
        let repeat = self.mode == PlayMode::Loop
            && self.sequence.duration() > 0.0
            && ctx.time.task_time >= self.sequence.duration();
        let applied = if repeat {
            self.sequence.apply_repeat_at(ctx.scene, t)
        } else {
            self.sequence.apply_at(ctx.scene, t)
        };
        if let Err(e) = applied {
            tracing::warn!(sequence = %self.sequence.name, "sequence stopped: {e}");
            return FrameControl::Stop;
        }
        match self.mode {
            PlayMode::Once if ctx.time.task_time >= self.sequence.duration() => FrameControl::Stop,
            _ => FrameControl::Continue,
        }
    }
}
