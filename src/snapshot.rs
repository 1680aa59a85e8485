// Copyright 2026 Hypermesh Foundation. All rights reserved.
// V&V Scorecard Engine - Last-Snapshot Persistence
//
// One snapshot is kept: the last sample, its aggregate score and when it was
// taken. It is stored as a flat record under three well-known keys so a
// browser host can map it straight onto localStorage.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::MetricSample;

pub const METRICS_KEY: &str = "vv-scorecard.metrics";
pub const EFFECTIVENESS_KEY: &str = "vv-scorecard.effectiveness";
pub const TIMESTAMP_KEY: &str = "vv-scorecard.timestamp";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("stored metrics are corrupt: {0}")]
    Metrics(#[from] serde_json::Error),
    #[error("stored effectiveness `{0}` is not a percentage")]
    Effectiveness(String),
    #[error("stored timestamp is not ISO-8601: {0}")]
    Timestamp(#[from] chrono::ParseError),
    #[error("snapshot record is missing `{0}`")]
    MissingKey(&'static str),
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// String key-value storage in the shape of the Web Storage API.
pub trait SnapshotStore {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: String);
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_items(self) -> HashMap<String, String> {
        self.items
    }
}

impl From<HashMap<String, String>> for MemoryStore {
    fn from(items: HashMap<String, String>) -> Self {
        Self { items }
    }
}

impl SnapshotStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) {
        self.items.insert(key.to_string(), value);
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub metrics: MetricSample,
    pub effectiveness: u8,
    pub timestamp: DateTime<Utc>,
}

/// Write all three keys.
pub fn save_snapshot<S: SnapshotStore + ?Sized>(
    store: &mut S,
    snapshot: &Snapshot,
) -> Result<(), SnapshotError> {
    let metrics = serde_json::to_string(&snapshot.metrics)?;
    store.set_item(METRICS_KEY, metrics);
    store.set_item(EFFECTIVENESS_KEY, snapshot.effectiveness.to_string());
    store.set_item(
        TIMESTAMP_KEY,
        snapshot.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
    );
    Ok(())
}

/// `Ok(None)` when nothing has been saved yet.
pub fn load_snapshot<S: SnapshotStore + ?Sized>(store: &S) -> Result<Option<Snapshot>, SnapshotError> {
    let Some(metrics) = store.get_item(METRICS_KEY) else {
        return Ok(None);
    };
    let metrics: MetricSample = serde_json::from_str(&metrics)?;

    let effectiveness = store
        .get_item(EFFECTIVENESS_KEY)
        .ok_or(SnapshotError::MissingKey(EFFECTIVENESS_KEY))?;
    let effectiveness = effectiveness
        .trim()
        .parse::<u8>()
        .ok()
        .filter(|v| *v <= 100)
        .ok_or(SnapshotError::Effectiveness(effectiveness))?;

    let timestamp = store
        .get_item(TIMESTAMP_KEY)
        .ok_or(SnapshotError::MissingKey(TIMESTAMP_KEY))?;
    let timestamp = DateTime::parse_from_rfc3339(timestamp.trim())?.with_timezone(&Utc);

    Ok(Some(Snapshot { metrics, effectiveness, timestamp }))
}
