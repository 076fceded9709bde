use tweetstage_scene::SceneGraph;

/// What a listener wants after handling a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    /// Call again next frame.
    Continue,
    /// Remove the listener from the manager.
    Stop,
}

/// Timing information handed to a listener.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Seconds since this listener was added.
    pub task_time: f64,
    /// Seconds since the previous frame.
    pub dt: f64,
    /// Number of frames stepped so far, counting this one.
    pub frame: u64,
}

/// Everything a listener may touch during a frame.
pub struct FrameContext<'a> {
    pub scene: &'a mut SceneGraph,
    pub time: FrameTime,
}

/// A per-frame callback owned by the [`TaskManager`].
pub trait FrameListener {
    fn on_frame(&mut self, ctx: &mut FrameContext<'_>) -> FrameControl;
}

impl<F> FrameListener for F
where
    F: FnMut(&mut FrameContext<'_>) -> FrameControl,
{
    fn on_frame(&mut self, ctx: &mut FrameContext<'_>) -> FrameControl {
        self(ctx)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("a task named {0:?} is already registered")]
    DuplicateName(String),
}

struct Task {
    name: String,
    added_at: f64,
    listener: Box<dyn FrameListener>,
}

/// Runs registered listeners once per frame, in registration order.
#[derive(Default)]
pub struct TaskManager {
    tasks: Vec<Task>,
    clock: f64,
    frame: u64,
}

impl std::fmt::Debug for TaskManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskManager")
            .field("tasks", &self.names())
            .field("clock", &self.clock)
            .field("frame", &self.frame)
            .finish()
    }
}

impl TaskManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener under a unique name. Its task time starts at zero.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        listener: impl FrameListener + 'static,
    ) -> Result<(), TaskError> {
        let name = name.into();
        if self.contains(&name) {
            return Err(TaskError::DuplicateName(name));
        }
        tracing::debug!(task = %name, "task added");
        self.tasks.push(Task {
            name,
            added_at: self.clock,
            listener: Box::new(listener),
        });
        Ok(())
    }

    /// Remove a listener by name. Returns whether it was registered.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.name != name);
        before != self.tasks.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.iter().any(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name.as_str()).collect()
    }

    /// Seconds advanced since the manager was created.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advance the clock by `dt` and run every listener once.
    ///
    /// A negative or non-finite `dt` counts as zero.
    pub fn step(&mut self, scene: &mut SceneGraph, dt: f64) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.clock += dt;
        self.frame += 1;
        let clock = self.clock;
        let frame = self.frame;

        self.tasks.retain_mut(|task| {
            let mut ctx = FrameContext {
                scene: &mut *scene,
                time: FrameTime {
                    task_time: clock - task.added_at,
                    dt,
                    frame,
                },
            };
            match task.listener.on_frame(&mut ctx) {
                FrameControl::Continue => true,
                FrameControl::Stop => {
                    tracing::debug!(task = %task.name, "task finished");
                    false
                }
            }
        });
    }
}
