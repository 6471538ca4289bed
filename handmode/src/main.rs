//! handmode - hand-gesture mode controller
//!
//! Drives the gesture pipeline headlessly from a landmark recording or a
//! synthetic hand, logging mode changes and pipeline status.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use handmode::backend::{self, BackendOptions, BackendType};
use handmode::SessionConfig;

#[derive(Parser, Debug)]
#[command(name = "handmode", about = "Hand-gesture mode controller")]
struct Cli {
    /// Backend to use: replay, synthetic, or auto
    #[arg(long, default_value = "auto")]
    backend: String,

    /// Landmark recording to replay
    #[arg(long)]
    recording: Option<PathBuf>,

    /// Restart the recording when it ends
    #[arg(long = "loop")]
    looping: bool,

    /// Landmark model asset (default: built-in)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Simulate a denied camera permission
    #[arg(long)]
    deny_camera: bool,

    /// S-expression config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frame loop tick-rate cap in Hz
    #[arg(long)]
    tick_hz: Option<f64>,

    /// Minimum time a new mode must be held before it commits
    #[arg(long)]
    min_dwell_ms: Option<f64>,

    /// Cursor smoothing factor in [0, 1)
    #[arg(long)]
    smoothing: Option<f32>,

    /// Mirror the cursor horizontally
    #[arg(long)]
    mirror_x: bool,

    /// Exit after N seconds
    #[arg(long)]
    exit_after: Option<u64>,

    /// Seconds between status log lines
    #[arg(long, default_value_t = 5)]
    status_interval: u64,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

impl Cli {
    /// Config file (if any) with command-line overrides on top.
    fn session_config(&self) -> anyhow::Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::load_file(path)?,
            None => SessionConfig::default(),
        };
        if let Some(hz) = self.tick_hz {
            config.lifecycle.tick_hz = hz;
        }
        if let Some(dwell) = self.min_dwell_ms {
            config.pipeline.mode.min_dwell_ms = dwell;
        }
        if let Some(smoothing) = self.smoothing {
            config.pipeline.cursor.smoothing = smoothing;
        }
        if self.mirror_x {
            config.pipeline.cursor.mirror_x = true;
        }
        config.validate().context("invalid command-line settings")?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("handmode {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "handmode=info".into()),
        )
        .init();

    info!("handmode v{} starting", env!("CARGO_PKG_VERSION"));

    let config = cli.session_config()?;
    let backend_type = BackendType::from_name(&cli.backend, cli.recording.is_some())?;
    info!("backend: {:?}", backend_type);

    let options = BackendOptions {
        recording: cli.recording,
        looping: cli.looping,
        model: cli.model,
        deny_camera: cli.deny_camera,
        exit_after: cli.exit_after,
        status_interval_secs: cli.status_interval,
    };

    backend::run(backend_type, options, config)
}
