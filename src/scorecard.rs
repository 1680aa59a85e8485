// Copyright 2026 Hypermesh Foundation. All rights reserved.
// V&V Scorecard Engine - Scorecard Session

//! Host-side session: owns the catalog and the current [`MetricSample`].
//!
//! Every update builds a complete new sample, validates it, and only then
//! swaps it in. Rejected input leaves the current sample as it was. The
//! aggregate is derived on demand and never stored.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{MetricCatalog, MetricDefinition};
use crate::engine::{ScoreEngine, ScoreError};
use crate::input::{validate_value, ManualEntry, ValidationError};
use crate::recommendations::{recommendations, Recommendation};
use crate::simulation::{simulate, ProjectProfile};
use crate::snapshot::{load_snapshot, save_snapshot, Snapshot, SnapshotError, SnapshotStore};
use crate::types::*;

// ─── Refresh Policy ──────────────────────────────────────────────────────────

/// Demo-mode auto refresh: every `interval_secs` the host timer asks whether
/// to draw a new simulated sample. Stopping the timer cancels it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RefreshPolicy {
    pub interval_secs: u32,
    /// Chance per timer tick of a refresh, 0.0-1.0.
    pub probability: f64,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self { interval_secs: 30, probability: 0.2 }
    }
}

impl RefreshPolicy {
    pub fn should_refresh<R: Rng>(&self, rng: &mut R) -> bool {
        rng.gen::<f64>() < self.probability
    }
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// One metric card: evaluation plus display metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCard {
    #[serde(flatten)]
    pub score: MetricScore,
    pub title: String,
    pub unit: String,
    pub description: String,
    pub iso_reference: Option<String>,
    pub good_threshold: f64,
    pub warning_threshold: f64,
}

impl MetricCard {
    fn new(score: MetricScore, def: &MetricDefinition) -> Self {
        Self {
            score,
            title: def.title.clone(),
            unit: def.unit.clone(),
            description: def.description.clone(),
            iso_reference: def.iso_reference.clone(),
            good_threshold: def.good_threshold,
            warning_threshold: def.warning_threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorecardReport {
    pub metrics: Vec<MetricCard>,
    pub effectiveness: EffectivenessResult,
    pub recommendations: Vec<Recommendation>,
}

// ─── Update errors ───────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Score(#[from] ScoreError),
}

// ─── Scorecard ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Scorecard {
    catalog: MetricCatalog,
    sample: MetricSample,
}

impl Scorecard {
    pub fn new(catalog: MetricCatalog, sample: MetricSample) -> Self {
        Self { catalog, sample }
    }

    /// Start from the stored snapshot, or from a fresh simulation when there
    /// is none, it cannot be read, or any stored value fails validation.
    pub fn restore<S: SnapshotStore + ?Sized, R: Rng>(
        catalog: MetricCatalog,
        store: &S,
        profile: &ProjectProfile,
        rng: &mut R,
    ) -> Result<Self, ValidationError> {
        match load_snapshot(store) {
            Ok(Some(snapshot)) => {
                let invalid = snapshot
                    .metrics
                    .iter()
                    .find_map(|(id, value)| validate_value(id, value, &catalog).err());
                match invalid {
                    None => {
                        log::info!("restored snapshot from {}", snapshot.timestamp);
                        return Ok(Self::new(catalog, snapshot.metrics));
                    }
                    Some(err) => log::warn!("ignoring snapshot with invalid metrics: {err}"),
                }
            }
            Ok(None) => log::debug!("no stored snapshot; simulating initial sample"),
            Err(err) => log::warn!("ignoring unreadable snapshot: {err}"),
        }
        let sample = simulate(profile, rng)?;
        Ok(Self::new(catalog, sample))
    }

    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    pub fn sample(&self) -> &MetricSample {
        &self.sample
    }

    pub fn engine(&self) -> ScoreEngine<'_> {
        ScoreEngine::new(&self.catalog)
    }

    pub fn effectiveness(&self) -> EffectivenessResult {
        self.engine().aggregate(&self.sample)
    }

    /// Swap in a whole new sample. Every value must be finite.
    pub fn replace(&mut self, sample: MetricSample) -> Result<EffectivenessResult, UpdateError> {
        if let Some((id, _)) = sample.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ValidationError::NotFinite { field: id.as_str() }.into());
        }
        let result = self.engine().aggregate(&sample);
        log::info!(
            "sample replaced: {} metrics, effectiveness {} ({:?})",
            sample.len(),
            result.score,
            result.status
        );
        self.sample = sample;
        Ok(result)
    }

    pub fn simulate<R: Rng>(
        &mut self,
        profile: &ProjectProfile,
        rng: &mut R,
    ) -> Result<EffectivenessResult, UpdateError> {
        let sample = simulate(profile, rng)?;
        self.replace(sample)
    }

    pub fn submit_manual(&mut self, entry: &ManualEntry) -> Result<EffectivenessResult, UpdateError> {
        let sample = entry.to_sample(&self.catalog).inspect_err(|err| {
            log::warn!("manual entry rejected: {err}");
        })?;
        self.replace(sample)
    }

    /// Edit one metric by building a new sample around it.
    pub fn set_metric(&mut self, id: MetricId, value: f64) -> Result<EffectivenessResult, UpdateError> {
        let value = validate_value(id, value, &self.catalog).inspect_err(|err| {
            log::warn!("value for {id} rejected: {err}");
        })?;
        self.replace(self.sample.with_value(id, value))
    }

    /// Timer hook: redraws the sample when the policy fires.
    pub fn tick<R: Rng>(
        &mut self,
        policy: &RefreshPolicy,
        profile: &ProjectProfile,
        rng: &mut R,
    ) -> Result<Option<EffectivenessResult>, UpdateError> {
        if !policy.should_refresh(rng) {
            return Ok(None);
        }
        self.simulate(profile, rng).map(Some)
    }

    pub fn report(&self) -> Result<ScorecardReport, ScoreError> {
        let engine = self.engine();
        let metrics = engine
            .evaluate(&self.sample)?
            .into_iter()
            .filter_map(|score| {
                let def = self.catalog.get(score.id).ok()?;
                Some(MetricCard::new(score, def))
            })
            .collect();
        Ok(ScorecardReport {
            metrics,
            effectiveness: engine.aggregate(&self.sample),
            recommendations: recommendations(&self.sample, &self.catalog)?,
        })
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> Snapshot {
        Snapshot {
            metrics: self.sample.clone(),
            effectiveness: self.effectiveness().score,
            timestamp: now,
        }
    }

    pub fn save<S: SnapshotStore + ?Sized>(
        &self,
        store: &mut S,
        now: DateTime<Utc>,
    ) -> Result<(), SnapshotError> {
        save_snapshot(store, &self.snapshot(now))
    }
}
