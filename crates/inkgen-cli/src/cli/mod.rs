//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use inkgen_core::config;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

mod commands;
mod options;

use options::{BackendArgs, EffectArgs};

#[derive(Parser)]
#[command(name = "inkgen")]
#[command(version)]
#[command(about = "Generate or rewrite SVG text with a local LLM (Ollama, llamafile, OpenAI-compatible)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log requests and responses to stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(flatten)]
    effect: EffectArgs,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// List the models the configured backend offers
    Models {
        #[command(flatten)]
        backend: BackendArgs,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

/// Installs the stderr logger. stdout carries the SVG document.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("warn,inkgen=debug,inkgen_core=debug,inkgen_providers=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli {
        command,
        debug: _,
        effect,
    } = cli;

    match command {
        None => {
            let mut config = config::Config::load().context("load config")?;
            effect.apply_to(&mut config);
            commands::apply::run(&effect, &config).await
        }
        Some(Commands::Models { backend }) => {
            let mut config = config::Config::load().context("load config")?;
            backend.apply_to(&mut config);
            commands::models::list(&config).await
        }
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
