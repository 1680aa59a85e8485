// Copyright 2026 Hypermesh Foundation. All rights reserved.
// V&V Scorecard Engine - Type Definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ─── Metric Id ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricId {
    AutomationRate,
    CodeCoverage,
    DefectDensity,
    Regressions,
    ResolutionTime,
    TestSuccess,
    BuildStability,
    Traceability,
    ReviewEffectiveness,
    Dre,
}

impl MetricId {
    pub const ALL: [MetricId; 10] = [
        Self::AutomationRate,
        Self::CodeCoverage,
        Self::DefectDensity,
        Self::Regressions,
        Self::ResolutionTime,
        Self::TestSuccess,
        Self::BuildStability,
        Self::Traceability,
        Self::ReviewEffectiveness,
        Self::Dre,
    ];

    /// Wire name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutomationRate => "automationRate",
            Self::CodeCoverage => "codeCoverage",
            Self::DefectDensity => "defectDensity",
            Self::Regressions => "regressions",
            Self::ResolutionTime => "resolutionTime",
            Self::TestSuccess => "testSuccess",
            Self::BuildStability => "buildStability",
            Self::Traceability => "traceability",
            Self::ReviewEffectiveness => "reviewEffectiveness",
            Self::Dre => "dre",
        }
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricId {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown metric id `{0}`")]
pub struct UnknownMetric(pub String);

// ─── Direction ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

// ─── Health Tier ─────────────────────────────────────────────────────────────

/// Per-metric classification. Ordered best to worst.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HealthTier {
    Healthy = 0,
    Warning = 1,
    Critical = 2,
}

impl HealthTier {
    pub fn needs_attention(&self) -> bool {
        !matches!(self, Self::Healthy)
    }
}

// ─── Effectiveness Tier ──────────────────────────────────────────────────────

/// Status band of the aggregate score, ordered best to worst.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EffectivenessTier {
    Excellent = 0,
    Good = 1,
    Regular = 2,
    Deficient = 3,
}

/// Lower bound (inclusive) of each band, checked top-down.
const EFFECTIVENESS_BANDS: [(u8, EffectivenessTier); 3] = [
    (90, EffectivenessTier::Excellent),
    (75, EffectivenessTier::Good),
    (60, EffectivenessTier::Regular),
];

impl EffectivenessTier {
    pub fn from_score(score: u8) -> Self {
        EFFECTIVENESS_BANDS
            .iter()
            .find(|(floor, _)| score >= *floor)
            .map(|(_, tier)| *tier)
            .unwrap_or(Self::Deficient)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "EXCELLENT",
            Self::Good => "GOOD",
            Self::Regular => "REGULAR",
            Self::Deficient => "DEFICIENT",
        }
    }

    pub fn guidance(&self) -> &'static str {
        match self {
            Self::Excellent => "Fully compliant",
            Self::Good => "Acceptable with monitoring",
            Self::Regular => "Requires improvement",
            Self::Deficient => "Urgent corrective action",
        }
    }
}

// ─── MetricSample ────────────────────────────────────────────────────────────

/// Raw values keyed by metric. Replaced as a whole on every update; the
/// `with_*` helpers return a new sample instead of patching in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSample {
    values: BTreeMap<MetricId, f64>,
}

impl MetricSample {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: MetricId) -> Option<f64> {
        self.values.get(&id).copied()
    }

    pub fn contains(&self, id: MetricId) -> bool {
        self.values.contains_key(&id)
    }

    /// Copy of this sample with `id` set to `value`.
    pub fn with_value(&self, id: MetricId, value: f64) -> Self {
        let mut values = self.values.clone();
        values.insert(id, value);
        Self { values }
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricId, f64)> + '_ {
        self.values.iter().map(|(id, v)| (*id, *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(MetricId, f64)> for MetricSample {
    fn from_iter<T: IntoIterator<Item = (MetricId, f64)>>(iter: T) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}

impl<const N: usize> From<[(MetricId, f64); N]> for MetricSample {
    fn from(pairs: [(MetricId, f64); N]) -> Self {
        pairs.into_iter().collect()
    }
}

// ─── EffectivenessResult ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectivenessResult {
    /// Weighted average of normalized scores, 0-100.
    pub score: u8,
    pub status: EffectivenessTier,
    /// Sum of weights of the metrics that contributed.
    pub weight_used: f64,
    pub metrics_used: usize,
}

impl EffectivenessResult {
    /// Result used when nothing weighted was present.
    pub fn fallback() -> Self {
        Self {
            score: 0,
            status: EffectivenessTier::Deficient,
            weight_used: 0.0,
            metrics_used: 0,
        }
    }
}

// ─── MetricScore ─────────────────────────────────────────────────────────────

/// Per-metric evaluation row, in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricScore {
    pub id: MetricId,
    pub value: f64,
    pub tier: HealthTier,
    /// Normalized sub-score, 0-100.
    pub score: f64,
    pub weight: f64,
}
