//! The tweet stage: a fixed startup sequence followed by a frame loop.
//!
//! Startup makes sure a local clone of the tweet repository exists, builds
//! the scene (terrain, a pacing panda, a spinning camera) and overlays one
//! randomly selected tweet. A [`RunLoop`] then drives [`Stage::tick`] once
//! per frame until it decides to stop.
//!
//! # Invariants
//! - The repository is cloned at most once per clone directory.
//! - Scene construction steps run in a fixed order with no branching other
//!   than the empty-result policy.
//! - The engine is only reachable through the handles owned by [`Stage`].

mod bootstrap;
mod camera;
mod config;
mod orchestrator;
mod run;

pub use bootstrap::ensure_local_clone;
pub use camera::{CameraPose, SpinCamera, camera_pose};
pub use config::{EmptyResultPolicy, StageConfig, WorkingDirectories};
pub use orchestrator::{BuiltScene, Orchestrator, RANDOM_TWEET_QUERY, Stage, select_text};
pub use run::{HeadlessLoop, RunLoop};

use std::path::PathBuf;
use tweetstage_assets::AssetError;
use tweetstage_dolt::StoreError;
use tweetstage_scene::SceneError;
use tweetstage_tasks::TaskError;

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("data store: {0}")]
    Store(#[from] StoreError),
    #[error("asset: {0}")]
    Asset(#[from] AssetError),
    #[error("scene: {0}")]
    Scene(#[from] SceneError),
    #[error("task: {0}")]
    Task(#[from] TaskError),
    #[error("query returned no rows: {query}")]
    EmptyResult { query: String },
    #[error("row has no column {column:?}")]
    MissingColumn { column: String },
}
