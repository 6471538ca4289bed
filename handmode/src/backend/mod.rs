//! Backend abstraction: recorded and synthetic landmark sources driven by
//! the headless session loop.

pub mod headless;
pub mod recording;
pub mod synthetic;

use std::path::PathBuf;

use anyhow::Context;

use crate::config::SessionConfig;

/// Backend type selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Replay,
    Synthetic,
}

impl BackendType {
    /// Resolve a CLI backend name. "auto" picks replay when a recording is given.
    pub fn from_name(name: &str, have_recording: bool) -> anyhow::Result<Self> {
        match name {
            "replay" => Ok(Self::Replay),
            "synthetic" => Ok(Self::Synthetic),
            "auto" if have_recording => Ok(Self::Replay),
            "auto" => Ok(Self::Synthetic),
            other => anyhow::bail!("unknown backend: {}. Use: replay, synthetic, or auto", other),
        }
    }
}

/// Options shared by all backends.
#[derive(Debug, Clone, Default)]
pub struct BackendOptions {
    /// Landmark recording for the replay backend.
    pub recording: Option<PathBuf>,
    /// Restart the recording when it ends.
    pub looping: bool,
    /// Model asset file; `None` uses the built-in model.
    pub model: Option<PathBuf>,
    /// Simulate a denied camera permission.
    pub deny_camera: bool,
    /// Stop after N seconds.
    pub exit_after: Option<u64>,
    /// Seconds between status log lines.
    pub status_interval_secs: u64,
}

/// Run a session with the selected backend.
pub fn run(
    backend: BackendType,
    options: BackendOptions,
    config: SessionConfig,
) -> anyhow::Result<()> {
    match backend {
        BackendType::Replay => {
            let path = options
                .recording
                .as_deref()
                .context("the replay backend needs --recording")?;
            let recording = recording::Recording::load(path)?;
            let source = recording::ReplaySource::new(recording, options.looping);
            let finished = source.finished_flag();
            headless::run(config, source, Some(finished), &options)
        }
        BackendType::Synthetic => {
            headless::run(config, synthetic::SyntheticSource::default(), None, &options)
        }
    }
}
