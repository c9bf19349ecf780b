use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::metrics::stats::StatsConfig;

/// Tunables for one monitoring session.
///
/// Defaults match the clinical dashboard: a 30-unit view window over a
/// ten-minute live buffer at 1 Hz.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// View window span, in sample time units.
    pub window_size: f64,
    /// Live buffer capacity, in samples.
    pub buffer_capacity: usize,
    /// Trailing baseline length for the excursion counters, in samples.
    pub baseline_window: usize,
    /// Excursion threshold, bpm.
    pub delta_threshold: f64,
    /// Maximum retained events.
    pub max_events: usize,
    /// Distance from the live edge within which following resumes.
    pub live_edge_epsilon: f64,
    /// Reconciliation tick interval, seconds.
    pub tick_interval: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            window_size: 30.0,
            buffer_capacity: 600,
            baseline_window: 15,
            delta_threshold: 15.0,
            max_events: 20,
            live_edge_epsilon: 1.0,
            tick_interval: 0.5,
        }
    }
}

impl SessionConfig {
    pub fn stats(&self) -> StatsConfig {
        StatsConfig {
            baseline_window: self.baseline_window,
            delta_threshold: self.delta_threshold,
        }
    }

    /// Load from a TOML file; missing keys fall back to the defaults.
    pub fn from_toml_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: SessionConfig = toml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }
}
