use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::metrics::stats::{window_stats, StatsConfig, WindowStats};
use crate::signal::Sample;

/// Snapshot of a finished session, written at the session boundary and
/// read back by the archive viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionArchive {
    pub session_id: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// Wall-clock end of the session, seconds since the Unix epoch.
    pub ended_at: f64,
    pub samples: Vec<Sample>,
    pub events: Vec<Event>,
    /// Whole-recording statistics, precomputed for the archive list view.
    pub summary: WindowStats,
}

impl SessionArchive {
    pub fn new(
        session_id: impl Into<String>,
        notes: Option<String>,
        ended_at: f64,
        samples: Vec<Sample>,
        events: Vec<Event>,
        stats_cfg: &StatsConfig,
    ) -> Self {
        let summary = window_stats(&samples, stats_cfg);
        Self {
            session_id: session_id.into(),
            notes,
            ended_at,
            samples,
            events,
            summary,
        }
    }

    pub fn duration(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.t - first.t,
            _ => 0.0,
        }
    }
}

pub fn write_archive(path: &Path, archive: &SessionArchive) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("creating archive {}", path.display()))?;
    serde_json::to_writer_pretty(file, archive)?;
    Ok(())
}

pub fn read_archive(path: &Path) -> Result<SessionArchive> {
    let file =
        fs::File::open(path).with_context(|| format!("opening archive {}", path.display()))?;
    let archive = serde_json::from_reader::<_, SessionArchive>(file)
        .with_context(|| format!("parsing archive {}", path.display()))?;
    Ok(archive)
}
