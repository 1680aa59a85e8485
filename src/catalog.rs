// Copyright 2026 Hypermesh Foundation. All rights reserved.
// V&V Scorecard Engine - Metric Catalog

//! Static metric definitions: display metadata, direction, thresholds,
//! declared input range and aggregate weight.
//!
//! The default catalog follows the ISO/IEC 29110 Basic profile weighting.
//! Weighted entries are not required to sum to 1; the engine divides by the
//! weight actually present.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::adapter;
use crate::types::{Direction, MetricId};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("metric catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("metric `{0}` is defined more than once")]
    Duplicate(MetricId),
    #[error("metric `{id}` thresholds are out of order for {direction:?} (good {good}, warning {warning})")]
    Thresholds {
        id: MetricId,
        direction: Direction,
        good: f64,
        warning: f64,
    },
    #[error("metric `{id}` has negative weight {weight}")]
    NegativeWeight { id: MetricId, weight: Decimal },
    #[error("metric `{id}` declares an empty range {min}..{max}")]
    Range { id: MetricId, min: f64, max: f64 },
    #[error("metric `{0}` not found in catalog")]
    NotFound(MetricId),
    #[error("metric `{id}` weight {weight} times {factor} overflows")]
    WeightOverflow { id: MetricId, weight: Decimal, factor: Decimal },
}

// ---------------------------------------------------------------------------
// MetricDefinition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub id: MetricId,
    pub title: String,
    pub unit: String,
    pub description: String,
    /// ISO/IEC 29110 activity the metric is traced to, e.g. "SI.4.4".
    #[serde(default)]
    pub iso_reference: Option<String>,
    pub direction: Direction,
    pub good_threshold: f64,
    pub warning_threshold: f64,
    pub weight: Decimal,
    #[serde(default)]
    pub min_value: f64,
    #[serde(default = "default_max_value")]
    pub max_value: f64,
}

fn default_max_value() -> f64 {
    f64::MAX
}

impl MetricDefinition {
    pub fn is_weighted(&self) -> bool {
        self.weight > Decimal::ZERO
    }

    pub fn weight_f64(&self) -> f64 {
        adapter::from_decimal(self.weight)
    }

    /// Unit as appended to a formatted value: "%" and "/KLOC" attach directly,
    /// word units get a separating space.
    pub fn unit_suffix(&self) -> String {
        match self.unit.chars().next() {
            Some(c) if c.is_alphabetic() => format!(" {}", self.unit),
            _ => self.unit.clone(),
        }
    }

    pub fn in_range(&self, value: f64) -> bool {
        value >= self.min_value && value <= self.max_value
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let ordered = match self.direction {
            Direction::HigherIsBetter => self.good_threshold >= self.warning_threshold,
            Direction::LowerIsBetter => self.good_threshold <= self.warning_threshold,
        };
        if !ordered || !self.good_threshold.is_finite() || !self.warning_threshold.is_finite() {
            return Err(CatalogError::Thresholds {
                id: self.id,
                direction: self.direction,
                good: self.good_threshold,
                warning: self.warning_threshold,
            });
        }
        if self.weight < Decimal::ZERO {
            return Err(CatalogError::NegativeWeight { id: self.id, weight: self.weight });
        }
        if self.min_value.is_nan() || self.max_value.is_nan() || self.min_value > self.max_value {
            return Err(CatalogError::Range { id: self.id, min: self.min_value, max: self.max_value });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MetricCatalog
// ---------------------------------------------------------------------------

/// Read-only set of definitions, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricCatalog {
    definitions: Vec<MetricDefinition>,
}

impl Default for MetricCatalog {
    fn default() -> Self {
        Self::iso29110()
    }
}

impl MetricCatalog {
    /// Build a catalog, rejecting duplicates and malformed thresholds.
    pub fn new(definitions: Vec<MetricDefinition>) -> Result<Self, CatalogError> {
        for (i, def) in definitions.iter().enumerate() {
            def.validate()?;
            if definitions[..i].iter().any(|d| d.id == def.id) {
                return Err(CatalogError::Duplicate(def.id));
            }
        }
        let catalog = Self { definitions };
        let total = catalog.total_weight();
        if total != Decimal::ONE {
            log::debug!("metric catalog weights sum to {total}; aggregate divides by the weight present");
        }
        Ok(catalog)
    }

    /// Load a catalog from a JSON array of definitions.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let definitions: Vec<MetricDefinition> = serde_json::from_str(json)?;
        Self::new(definitions)
    }

    pub fn to_json(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(&self.definitions)?)
    }

    pub fn get(&self, id: MetricId) -> Result<&MetricDefinition, CatalogError> {
        self.definitions
            .iter()
            .find(|d| d.id == id)
            .ok_or(CatalogError::NotFound(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricDefinition> {
        self.definitions.iter()
    }

    /// Definitions that contribute to the aggregate score.
    pub fn weighted(&self) -> impl Iterator<Item = &MetricDefinition> {
        self.definitions.iter().filter(|d| d.is_weighted())
    }

    /// Sum of all weights, saturating at `Decimal::MAX`.
    pub fn total_weight(&self) -> Decimal {
        self.definitions
            .iter()
            .fold(Decimal::ZERO, |acc, d| acc.saturating_add(d.weight))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Same definitions with every weight multiplied by `factor`.
    pub fn rescaled(&self, factor: Decimal) -> Result<Self, CatalogError> {
        let definitions = self
            .definitions
            .iter()
            .map(|d| {
                let weight = d.weight.checked_mul(factor).ok_or(CatalogError::WeightOverflow {
                    id: d.id,
                    weight: d.weight,
                    factor,
                })?;
                Ok(MetricDefinition { weight, ..d.clone() })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;
        Self::new(definitions)
    }

    /// Default ISO/IEC 29110 catalog.
    pub fn iso29110() -> Self {
        use Direction::{HigherIsBetter, LowerIsBetter};
        let definitions = vec![
            def(MetricId::AutomationRate, "Test Automation Rate", "%",
                "Share of test cases that are automated", Some("SI.5"),
                HigherIsBetter, 80.0, 60.0, dec!(0.20), PERCENT),
            def(MetricId::CodeCoverage, "Code Coverage", "%",
                "Share of code exercised by tests", Some("SI.4.4"),
                HigherIsBetter, 80.0, 60.0, dec!(0.25), PERCENT),
            def(MetricId::DefectDensity, "Defect Density", "/KLOC",
                "Defects per thousand lines of code", Some("SI.5.5"),
                LowerIsBetter, 2.0, 5.0, dec!(0.20), (0.0, 1000.0)),
            def(MetricId::Regressions, "Regressions", "cases",
                "Regressions detected in the period", Some("SI.5.6"),
                LowerIsBetter, 3.0, 8.0, dec!(0.15), (0.0, 10_000.0)),
            def(MetricId::ResolutionTime, "Defect Resolution Time", "days",
                "Average time to resolve a defect", Some("SI.5.7"),
                LowerIsBetter, 3.0, 7.0, dec!(0.10), (0.0, 365.0)),
            def(MetricId::TestSuccess, "Test Success Rate", "%",
                "Share of executed tests that pass", Some("SI.4.5"),
                HigherIsBetter, 90.0, 75.0, dec!(0.15), PERCENT),
            def(MetricId::BuildStability, "Build Stability", "%",
                "Share of successful builds", Some("SI.3.3"),
                HigherIsBetter, 95.0, 85.0, dec!(0.10), PERCENT),
            def(MetricId::Traceability, "Requirements Traceability", "%",
                "Share of requirements traced to tests", None,
                HigherIsBetter, 95.0, 80.0, dec!(0), PERCENT),
            def(MetricId::ReviewEffectiveness, "Review Effectiveness", "%",
                "Share of defects caught in code review", None,
                HigherIsBetter, 85.0, 70.0, dec!(0), PERCENT),
            def(MetricId::Dre, "Defect Removal Efficiency", "%",
                "Share of defects removed before release", None,
                HigherIsBetter, 90.0, 75.0, dec!(0), PERCENT),
        ];
        Self::new(definitions).expect("built-in ISO/IEC 29110 catalog is valid")
    }
}

const PERCENT: (f64, f64) = (0.0, 100.0);

#[allow(clippy::too_many_arguments)]
fn def(
    id: MetricId,
    title: &str,
    unit: &str,
    description: &str,
    iso_reference: Option<&str>,
    direction: Direction,
    good_threshold: f64,
    warning_threshold: f64,
    weight: Decimal,
    (min_value, max_value): (f64, f64),
) -> MetricDefinition {
    MetricDefinition {
        id,
        title: title.to_string(),
        unit: unit.to_string(),
        description: description.to_string(),
        iso_reference: iso_reference.map(str::to_string),
        direction,
        good_threshold,
        warning_threshold,
        weight,
        min_value,
        max_value,
    }
}

// ===========================================================================
// Tests
// ===========================================================================
