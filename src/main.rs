use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use launcher_ext::game::GameConfig;
use launcher_ext::modes::{HumanMode, SpeedtestMode};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "launcher_ext")]
#[command(version, about = "Snake and speedtest in the terminal")]
struct Cli {
    /// Default log filter when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Play snake with keyboard controls
    Play {
        /// JSON file with game settings
        #[arg(long)]
        config: Option<PathBuf>,

        /// Grid width, overrides the config file
        #[arg(long)]
        width: Option<usize>,

        /// Grid height, overrides the config file
        #[arg(long)]
        height: Option<usize>,

        /// Write logs here; the terminal is taken by the game
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
    /// Measure bandwidth with the speedtest CLI
    Speedtest {
        /// Path to the speedtest executable
        #[arg(long, default_value = "speedtest")]
        cli_path: PathBuf,

        /// Print the final result as JSON
        #[arg(long)]
        json: bool,

        /// Keep running, repeating the test once the last result is this many seconds old
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,
    },
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn load_config(path: Option<PathBuf>, width: Option<usize>, height: Option<usize>) -> Result<GameConfig> {
    let mut config = match path {
        Some(path) => GameConfig::load(&path)?,
        None => GameConfig::default(),
    };
    if let Some(width) = width {
        config.grid_width = width;
    }
    if let Some(height) = height {
        config.grid_height = height;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Command::Play {
        config: None,
        width: None,
        height: None,
        log_file: None,
    });

    match command {
        Command::Play {
            config,
            width,
            height,
            log_file,
        } => {
            if let Some(path) = log_file {
                let file = File::create(&path)
                    .with_context(|| format!("Failed to create log file {}", path.display()))?;
                tracing_subscriber::fmt()
                    .with_env_filter(env_filter(&cli.log_level))
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .init();
            }

            let config = load_config(config, width, height)?;
            let mut human_mode = HumanMode::new(config)?;
            human_mode.run().await?;
        }
        Command::Speedtest {
            cli_path,
            json,
            watch,
        } => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter(&cli.log_level))
                .with_writer(std::io::stderr)
                .init();

            let watch = watch.map(Duration::from_secs);
            SpeedtestMode::new(cli_path, json, watch).run().await?;
        }
    }

    Ok(())
}
