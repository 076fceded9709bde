use crate::{EmptyResultPolicy, RunLoop, SpinCamera, StageConfig, StageError, ensure_local_clone};
use glam::{Vec2, Vec3};
use tweetstage_assets::{LoadedModel, ModelLoader};
use tweetstage_common::NodeId;
use tweetstage_dolt::{Repository, Row, VersionedStore};
use tweetstage_scene::{ModelRef, SceneGraph, TextOverlay};
use tweetstage_tasks::{ActorAnimator, LerpInterval, Sequence, SequencePlayer, TaskManager};

pub const RANDOM_TWEET_QUERY: &str = "select * from tweets order by rand() limit 1;";

const ENVIRONMENT_MODEL: &str = "models/environment";
const PANDA_MODEL: &str = "models/panda-model";
const PANDA_WALK: &str = "models/panda-walk4";
const WALK_CLIP: &str = "walk";
const TEXT_COLUMN: &str = "text";

const SPIN_TASK: &str = "SpinCameraTask";
const PACE_SEQUENCE: &str = "pandaPace";
const ANIMATE_TASK: &str = "animate-actors";

/// Engine handles for one running demo.
#[derive(Debug)]
pub struct Stage {
    scene: SceneGraph,
    loader: ModelLoader,
    tasks: TaskManager,
}

impl Stage {
    /// A stage with an empty scene. Actor animation is driven from the
    /// first frame on.
    pub fn new(loader: ModelLoader) -> Result<Self, StageError> {
        let mut tasks = TaskManager::new();
        tasks.add(ANIMATE_TASK, ActorAnimator)?;
        Ok(Self {
            scene: SceneGraph::new(),
            loader,
            tasks,
        })
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    pub fn loader(&self) -> &ModelLoader {
        &self.loader
    }

    pub fn tasks(&self) -> &TaskManager {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut TaskManager {
        &mut self.tasks
    }

    /// Run every frame listener once. Rendering is left to the caller.
    pub fn tick(&mut self, dt: f64) {
        self.tasks.step(&mut self.scene, dt);
        let mutations = self.scene.drain_events().len();
        tracing::trace!(frame = self.tasks.frame(), mutations, "tick");
    }
}

/// Nodes and text produced by [`Orchestrator::build_scene`].
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltScene {
    pub environment: NodeId,
    pub panda: NodeId,
    pub text: String,
}

/// Runs the startup sequence against a [`Stage`] and hands it to a run loop.
#[derive(Debug)]
pub struct Orchestrator {
    stage: Stage,
    config: StageConfig,
}

impl Orchestrator {
    pub fn new(stage: Stage, config: StageConfig) -> Self {
        Self { stage, config }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Clone or open the configured repository.
    pub fn bootstrap<S: VersionedStore>(&self, store: &S) -> Result<S::Repo, StageError> {
        ensure_local_clone(&self.config.directories, &self.config.remote, store)
    }

    /// Populate the scene and register the per-frame tasks.
    pub fn build_scene<R: Repository>(&mut self, repo: &R) -> Result<BuiltScene, StageError> {
        let stage = &mut self.stage;
        let root = stage.scene.render_root();

        let environment = stage.loader.load_model(ENVIRONMENT_MODEL)?;
        let environment = stage
            .scene
            .attach_model(root, "environment", model_ref(&environment))?;
        stage.scene.set_scale(environment, Vec3::splat(0.25))?;
        stage.scene.set_pos(environment, Vec3::new(-8.0, 42.0, 0.0))?;

        stage.tasks.add(SPIN_TASK, SpinCamera::default())?;

        let panda_model = stage.loader.load_model(PANDA_MODEL)?;
        let walk = stage.loader.load_clip(PANDA_WALK, WALK_CLIP)?;
        let panda = stage
            .scene
            .attach_actor(root, "panda", model_ref(&panda_model), [walk])?;
        stage.scene.set_scale(panda, Vec3::splat(0.005))?;
        stage.scene.loop_animation(panda, WALK_CLIP)?;

        stage
            .tasks
            .add(PACE_SEQUENCE, SequencePlayer::looping(pace_sequence(panda)))?;

        let rows = repo.sql(RANDOM_TWEET_QUERY)?;
        let text = select_text(&rows, &self.config.on_empty)?;
        stage
            .scene
            .add_text(TextOverlay::new(text.clone(), Vec2::new(-0.5, 0.02), 0.07));
        tracing::info!(%text, "showing tweet");

        Ok(BuiltScene {
            environment,
            panda,
            text,
        })
    }

    /// Bootstrap, build the scene, then return the orchestrator ready to run.
    pub fn prepare<S: VersionedStore>(mut self, store: &S) -> Result<Self, StageError> {
        let repo = self.bootstrap(store)?;
        self.build_scene(&repo)?;
        Ok(self)
    }

    /// Hand the stage to `run_loop`; returns when the loop ends.
    pub fn run<L: RunLoop>(self, run_loop: L) -> Result<(), L::Error> {
        run_loop.run(self.stage)
    }
}

fn model_ref(model: &LoadedModel) -> ModelRef {
    ModelRef {
        asset: model.id,
        source: model.name.clone(),
        bounds: model.bounds,
        meshes: model.meshes.clone(),
    }
}

/// Walk 20 units along -Y, turn around, walk back, turn again.
fn pace_sequence(panda: NodeId) -> Sequence {
    let north = Vec3::new(0.0, 10.0, 0.0);
    let south = Vec3::new(0.0, -10.0, 0.0);
    let facing_north = Vec3::ZERO;
    let facing_south = Vec3::new(180.0, 0.0, 0.0);
    Sequence::new(
        PACE_SEQUENCE,
        vec![
            LerpInterval::pos(panda, 13.0, north, south),
            LerpInterval::hpr(panda, 3.0, facing_north, facing_south),
            LerpInterval::pos(panda, 13.0, south, north),
            LerpInterval::hpr(panda, 3.0, facing_south, facing_north),
        ],
    )
}

/// The `text` of the first row, or the policy's answer for no rows.
pub fn select_text(rows: &[Row], on_empty: &EmptyResultPolicy) -> Result<String, StageError> {
    let Some(first) = rows.first() else {
        return match on_empty {
            EmptyResultPolicy::Abort => Err(StageError::EmptyResult {
                query: RANDOM_TWEET_QUERY.to_string(),
            }),
            EmptyResultPolicy::Placeholder(text) => {
                tracing::warn!("query returned no rows, showing placeholder");
                Ok(text.clone())
            }
        };
    };
    first
        .get(TEXT_COLUMN)
        .cloned()
        .ok_or_else(|| StageError::MissingColumn {
            column: TEXT_COLUMN.to_string(),
        })
}
