//! Session configuration.
//!
//! Defaults come from each stage's own config struct. Overrides are read
//! from an s-expression plist, either inline or from a config file:
//!
//! ```text
//! ;; handmode.el
//! (:pinch-threshold 0.04
//!  :min-dwell-ms 120
//!  :smoothing 0.3
//!  :tick-hz 30)
//! ```

use std::path::Path;

use anyhow::Context;
use lexpr::Value;
use tracing::debug;

use crate::gesture::PipelineConfig;
use crate::lifecycle::LifecycleConfig;
use crate::sexp::{as_f64, is_nil, plist_entries};

/// Upper bound on the frame loop tick rate.
pub const MAX_TICK_HZ: f64 = 240.0;

/// All tunables for one gesture session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionConfig {
    pub pipeline: PipelineConfig,
    pub lifecycle: LifecycleConfig,
}

impl SessionConfig {
    /// Read a config file on top of the defaults.
    pub fn load_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config = Self::default();
        config
            .apply_sexp(&text)
            .with_context(|| format!("in config {}", path.display()))?;
        Ok(config)
    }

    /// Override the keys present in `text`. Nothing changes on error.
    pub fn apply_sexp(&mut self, text: &str) -> anyhow::Result<()> {
        let body: String = text
            .lines()
            .filter(|line| !line.trim_start().starts_with(';'))
            .collect::<Vec<_>>()
            .join("\n");
        if body.trim().is_empty() {
            return Ok(());
        }

        let value = lexpr::from_str(&body).context("parsing config s-expression")?;
        let mut next = self.clone();
        for (key, val) in plist_entries(&value)? {
            next.apply_key(key, val)?;
            debug!("Config :{} = {}", key, val);
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    fn apply_key(&mut self, key: &str, val: &Value) -> anyhow::Result<()> {
        let features = &mut self.pipeline.features;
        let lifecycle = &mut self.lifecycle;
        match key {
            "pinch-threshold" => features.pinch_threshold = number(key, val)? as f32,
            "extension-margin" => features.extension_margin = number(key, val)? as f32,
            "min-dwell-ms" => self.pipeline.mode.min_dwell_ms = number(key, val)?,
            "smoothing" => self.pipeline.cursor.smoothing = number(key, val)? as f32,
            "mirror-x" => self.pipeline.cursor.mirror_x = !is_nil(val),
            "tick-hz" => lifecycle.tick_hz = number(key, val)?,
            "first-frame-timeout-ms" => {
                let ms = number(key, val)?;
                anyhow::ensure!(ms >= 0.0, ":first-frame-timeout-ms must not be negative");
                lifecycle.first_frame_timeout_ms = ms as u64;
            }
            "frame-budget-ms" => lifecycle.frame_budget_ms = number(key, val)?,
            other => anyhow::bail!("unknown config key :{}", other),
        }
        Ok(())
    }

    /// Check value ranges.
    pub fn validate(&self) -> anyhow::Result<()> {
        let features = &self.pipeline.features;
        anyhow::ensure!(
            features.pinch_threshold > 0.0,
            ":pinch-threshold must be positive, got {}",
            features.pinch_threshold
        );
        anyhow::ensure!(
            features.extension_margin > 0.0,
            ":extension-margin must be positive, got {}",
            features.extension_margin
        );
        anyhow::ensure!(
            self.pipeline.mode.min_dwell_ms >= 0.0,
            ":min-dwell-ms must not be negative, got {}",
            self.pipeline.mode.min_dwell_ms
        );
        let smoothing = self.pipeline.cursor.smoothing;
        anyhow::ensure!(
            (0.0..1.0).contains(&smoothing),
            ":smoothing must be in [0, 1), got {}",
            smoothing
        );
        let tick_hz = self.lifecycle.tick_hz;
        anyhow::ensure!(
            tick_hz > 0.0 && tick_hz <= MAX_TICK_HZ,
            ":tick-hz must be in (0, {}], got {}",
            MAX_TICK_HZ,
            tick_hz
        );
        anyhow::ensure!(
            self.lifecycle.frame_budget_ms > 0.0,
            ":frame-budget-ms must be positive, got {}",
            self.lifecycle.frame_budget_ms
        );
        Ok(())
    }

    /// Generate s-expression for the effective configuration.
    pub fn config_sexp(&self) -> String {
        let p = &self.pipeline;
        let l = &self.lifecycle;
        format!(
            "(:pinch-threshold {:.3} :extension-margin {:.2} :min-dwell-ms {:.0} :smoothing {:.2} :mirror-x {} :tick-hz {:.1} :first-frame-timeout-ms {} :frame-budget-ms {:.1})",
            p.features.pinch_threshold,
            p.features.extension_margin,
            p.mode.min_dwell_ms,
            p.cursor.smoothing,
            if p.cursor.mirror_x { "t" } else { "nil" },
            l.tick_hz,
            l.first_frame_timeout_ms,
            l.frame_budget_ms,
        )
    }
}

fn number(key: &str, val: &Value) -> anyhow::Result<f64> {
    as_f64(val)
        .filter(|n| n.is_finite())
        .ok_or_else(|| anyhow::anyhow!(":{} expects a number, got {}", key, val))
}
