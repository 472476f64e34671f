use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mirror_core::{EmotionState, PersonState, SimulatedBackend, VideoSource};
use mirror_engine::{ControllerConfig, DetectionController, Readiness};
use mirror_hw::{PatternSource, StillImageSource};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod keyboard;
mod presenter;

use keyboard::Command;
use presenter::Presenter;

#[derive(Parser)]
#[command(name = "mirrord", about = "Magic mirror detection loop")]
struct Cli {
    /// TOML configuration file (MIRROR_* environment variables override it)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Image file to use as the video frame
    #[arg(long, conflicts_with = "level")]
    image: Option<PathBuf>,
    /// Brightness of the synthetic frame when no image is given
    #[arg(long, default_value_t = 51)]
    level: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the detection loop; read keyboard overrides from stdin
    Run {
        #[command(flatten)]
        source: SourceArgs,
        /// Print each state change as a JSON line
        #[arg(long)]
        json: bool,
    },
    /// Run a single detection cycle and print the result as JSON
    Once {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print the effective configuration
    Config,
}

/// The video source plus, for synthetic frames, a handle to adjust brightness.
fn open_source(args: &SourceArgs) -> Result<(Arc<dyn VideoSource>, Option<Arc<PatternSource>>)> {
    match &args.image {
        Some(path) => {
            let still = StillImageSource::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            let video: Arc<dyn VideoSource> = Arc::new(still);
            Ok((video, None))
        }
        None => {
            let pattern = Arc::new(PatternSource::new(64, 48, args.level));
            let video: Arc<dyn VideoSource> = pattern.clone();
            Ok((video, Some(pattern)))
        }
    }
}

async fn build_controller(
    config: &ControllerConfig,
) -> Arc<DetectionController<SimulatedBackend>> {
    let backend = SimulatedBackend::new(&config.model_dir);
    let controller = DetectionController::from_config(backend, config);
    match controller.initialize().await {
        Readiness::Ready => tracing::info!("mirror ready"),
        Readiness::Degraded => tracing::warn!(
            model_dir = %config.model_dir.display(),
            "models not found; mirror running on fallback detection"
        ),
    }
    Arc::new(controller)
}

async fn run(config: ControllerConfig, source: SourceArgs, json: bool) -> Result<()> {
    let (video, pattern) = open_source(&source)?;
    let controller = build_controller(&config).await;

    let mut presenter = Presenter::new(json);
    let handle = controller.start(video, move |result| {
        if let Some(line) = presenter.update(&result) {
            println!("{line}");
        }
    })?;
    tracing::info!(session = %handle.session_id(), "{}", keyboard::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    stdin_open = false;
                    continue;
                };
                match keyboard::parse(&line) {
                    Some(Command::Override(person, emotion)) => {
                        handle.override_state(person, emotion);
                    }
                    Some(Command::Retry) => {
                        handle.override_state(PersonState::Unresolved, EmotionState::Neutral);
                    }
                    Some(Command::Level(level)) => match &pattern {
                        Some(p) => p.set_level(level),
                        None => tracing::warn!("brightness only applies to the synthetic source"),
                    },
                    Some(Command::Quit) => break,
                    None => eprintln!("{}", keyboard::HELP),
                }
            }
        }
    }

    tracing::info!("mirror shutting down");
    handle.shutdown().await?;
    Ok(())
}

async fn once(config: ControllerConfig, source: SourceArgs) -> Result<()> {
    let (video, _) = open_source(&source)?;
    let controller = build_controller(&config).await;
    let result = controller.run_one_cycle(&video).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ControllerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run { source, json } => run(config, source, json).await,
        Commands::Once { source } => once(config, source).await,
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}
