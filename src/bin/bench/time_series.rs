// Per-Tick JSONL Time Series Recorder
// One JSON line per timer tick of a demo session

use anyhow::Context;
use scorecard_engine::{
    EffectivenessResult, EffectivenessTier, HealthTier, MetricScore, ProjectPhase, ProjectProfile,
};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct TickSnapshot {
    pub tick: u64,
    pub refreshed: bool,
    pub phase: ProjectPhase,
    pub team_size: u32,
    pub project_size: f64,
    pub effectiveness: u8,
    pub status: EffectivenessTier,
    pub weight_used: f64,
    pub metrics_used: usize,
    pub critical_count: usize,
    pub warning_count: usize,
}

impl TickSnapshot {
    pub fn new(
        tick: u64,
        refreshed: bool,
        profile: &ProjectProfile,
        result: &EffectivenessResult,
        rows: &[MetricScore],
    ) -> Self {
        Self {
            tick,
            refreshed,
            phase: profile.phase,
            team_size: profile.team_size,
            project_size: profile.project_size,
            effectiveness: result.score,
            status: result.status,
            weight_used: result.weight_used,
            metrics_used: result.metrics_used,
            critical_count: count_tier(rows, HealthTier::Critical),
            warning_count: count_tier(rows, HealthTier::Warning),
        }
    }
}

pub fn count_tier(rows: &[MetricScore], tier: HealthTier) -> usize {
    rows.iter().filter(|row| row.tier == tier).count()
}

/// Accumulates snapshots and writes JSONL.
pub struct TimeSeriesRecorder {
    snapshots: Vec<TickSnapshot>,
}

impl TimeSeriesRecorder {
    pub fn new() -> Self {
        Self { snapshots: Vec::new() }
    }

    pub fn record(&mut self, snapshot: TickSnapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn write_jsonl(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        for snapshot in &self.snapshots {
            writeln!(file, "{}", serde_json::to_string(snapshot)?)?;
        }
        Ok(())
    }
}
