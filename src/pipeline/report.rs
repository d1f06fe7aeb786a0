use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::pipeline::orchestrator::PipelineState;
use crate::pipeline::summary::EventTable;
use crate::render::MapOutcome;

/// Outcome of a completed pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// States visited, in order
    pub states: Vec<PipelineState>,
    pub output_dir: PathBuf,
    /// Unified counts table copied to the output directory
    pub counts_table: PathBuf,
    /// Event tables copied to the output directory
    pub events: Vec<EventTable>,
    pub summary_file: PathBuf,
    /// SNV files used unfiltered because the exon filter failed on them
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter_fallbacks: Vec<PathBuf>,
    pub map: MapOutcome,
    /// Preserved workspace, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<PathBuf>,
}

impl RunReport {
    /// Total event records across all tables
    #[must_use]
    pub fn total_events(&self) -> usize {
        self.events.iter().map(|e| e.records).sum()
    }

    /// Wall-clock duration of the run
    #[must_use]
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
