use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tweetstage_assets::ModelLoader;
use tweetstage_dolt::{DoltCli, Repository};
use tweetstage_stage::{
    EmptyResultPolicy, HeadlessLoop, Orchestrator, RANDOM_TWEET_QUERY, Stage, StageConfig,
    WorkingDirectories, select_text,
};

#[derive(Parser)]
#[command(name = "tweetstage-cli", about = "Headless tweet stage tools")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    stage: StageArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct StageArgs {
    /// Directory holding the local clone
    #[arg(long, global = true, default_value = "working")]
    working_dir: PathBuf,

    /// Dolt remote to clone, as owner/name
    #[arg(long, global = true, default_value = StageConfig::DEFAULT_REMOTE)]
    remote: String,

    /// Root that model names resolve against
    #[arg(long, global = true, default_value = "assets")]
    asset_dir: PathBuf,

    /// What to do when the tweets table is empty
    #[arg(long, global = true, value_enum, default_value_t = OnEmpty::Abort)]
    on_empty: OnEmpty,

    /// Text shown with `--on-empty placeholder`
    #[arg(long, global = true, default_value = "(no tweets found)")]
    placeholder_text: String,

    /// Path to the dolt binary; searched on PATH when omitted
    #[arg(long, global = true)]
    dolt: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OnEmpty {
    Abort,
    Placeholder,
}

impl StageArgs {
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

    fn store(&self) -> anyhow::Result<DoltCli> {
        Ok(match &self.dolt {
            Some(path) => DoltCli::with_binary(path),
            None => DoltCli::locate()?,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and effective configuration
    Info,
    /// Clone or open the repository and print one random tweet
    Tweet,
    /// Build the scene and run it without a window, printing frames as text
    Run {
        /// Number of frames to run; runs until interrupted when omitted
        #[arg(short, long)]
        frames: Option<u64>,
        /// Simulated frames per second
        #[arg(long, default_value = "60")]
        fps: f64,
        /// Print a frame every N frames (0 disables)
        #[arg(long, default_value = "60")]
        report_every: u64,
        /// Sleep between frames to keep wall-clock pace
        #[arg(long)]
        realtime: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("tweetstage-cli starting");

    let config = cli.stage.config();
    match cli.command {
        Commands::Info => {
            println!("tweetstage-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("remote: {}", config.remote);
            println!("clone: {}", config.directories.tweets_directory.display());
            println!("assets: {}", config.asset_dir.display());
            println!("query: {RANDOM_TWEET_QUERY}");
            match &config.on_empty {
                EmptyResultPolicy::Abort => println!("on empty: abort"),
                EmptyResultPolicy::Placeholder(text) => println!("on empty: show {text:?}"),
            }
        }
        Commands::Tweet => {
            let store = cli.stage.store()?;
            let stage = Stage::new(ModelLoader::new(&config.asset_dir))?;
            let orchestrator = Orchestrator::new(stage, config);
            let repo = orchestrator.bootstrap(&store)?;
            let rows = repo.sql(RANDOM_TWEET_QUERY)?;
            println!("{}", select_text(&rows, &orchestrator.config().on_empty)?);
        }
        Commands::Run {
            frames,
            fps,
            report_every,
            realtime,
        } => {
            let store = cli.stage.store()?;
            let stage = Stage::new(ModelLoader::new(&config.asset_dir))?;
            let orchestrator = Orchestrator::new(stage, config).prepare(&store)?;

            let mut looper = HeadlessLoop::new(std::io::stdout().lock())
                .fps(fps)
                .report_every(report_every)
                .realtime(realtime);
            looper.frames = frames;
            orchestrator.run(looper)?;
        }
    }

    Ok(())
}
