mod overlay;
mod window;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tweetstage_assets::ModelLoader;
use tweetstage_dolt::DoltCli;
use tweetstage_stage::{EmptyResultPolicy, Orchestrator, Stage, StageConfig, WorkingDirectories};

#[derive(Parser)]
#[command(name = "tweetstage-desktop", about = "A panda, a spinning camera and a random tweet")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding the local clone
    #[arg(long, default_value = "working")]
    working_dir: PathBuf,

    /// Dolt remote to clone, as owner/name
    #[arg(long, default_value = StageConfig::DEFAULT_REMOTE)]
    remote: String,

    /// Root that model names resolve against
    #[arg(long, default_value = "assets")]
    asset_dir: PathBuf,

    /// What to do when the tweets table is empty
    #[arg(long, value_enum, default_value_t = OnEmpty::Abort)]
    on_empty: OnEmpty,

    /// Text shown with `--on-empty placeholder`
    #[arg(long, default_value = "(no tweets found)")]
    placeholder_text: String,

    /// Path to the dolt binary; searched on PATH when omitted
    #[arg(long)]
    dolt: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OnEmpty {
    Abort,
    Placeholder,
}

impl Cli {
    fn config(&self) -> StageConfig {
        StageConfig {
            directories: WorkingDirectories::under(&self.working_dir),
            remote: self.remote.clone(),
            asset_dir: self.asset_dir.clone(),
            on_empty: match self.on_empty {
                OnEmpty::Abort => EmptyResultPolicy::Abort,
                OnEmpty::Placeholder => EmptyResultPolicy::Placeholder(self.placeholder_text.clone()),
            },
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("tweetstage-desktop starting");

    let config = cli.config();
    let store = match &cli.dolt {
        Some(path) => DoltCli::with_binary(path),
        None => DoltCli::locate()?,
    };
    let stage = Stage::new(ModelLoader::new(&config.asset_dir))?;
    let orchestrator = Orchestrator::new(stage, config).prepare(&store)?;
    orchestrator.run(window::WindowLoop::default())
}
