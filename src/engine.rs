// Copyright 2026 Hypermesh Foundation. All rights reserved.
// V&V Scorecard Engine - Score Engine

//! Classification, normalization and weighted aggregation of raw metric values.
//!
//! Every function here is pure: the same sample and catalog always give the
//! same result, and nothing is cached between calls.

use rust_decimal::Decimal;

use crate::adapter;
use crate::catalog::MetricCatalog;
use crate::catalog::MetricDefinition;
use crate::types::*;

const FULL_SCORE: f64 = 100.0;
const WARNING_SCORE: f64 = 50.0;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoreError {
    #[error("invalid metric `{id}`: {reason}")]
    InvalidMetric { id: String, reason: &'static str },
    #[error("no weighted metric present in sample")]
    NoWeightedMetrics,
    #[error("weighted sum overflowed at metric `{0}`")]
    Overflow(MetricId),
}

impl ScoreError {
    fn not_finite(id: MetricId) -> Self {
        Self::InvalidMetric { id: id.to_string(), reason: "value is not finite" }
    }

    fn undefined(id: MetricId) -> Self {
        Self::InvalidMetric { id: id.to_string(), reason: "no definition in catalog" }
    }
}

// ---------------------------------------------------------------------------
// Free functions over a single definition
// ---------------------------------------------------------------------------

/// Health tier of `value`. Boundaries are inclusive toward the better tier.
pub fn classify(value: f64, definition: &MetricDefinition) -> Result<HealthTier, ScoreError> {
    if !value.is_finite() {
        return Err(ScoreError::not_finite(definition.id));
    }
    let good = definition.good_threshold;
    let warning = definition.warning_threshold;
    let tier = match definition.direction {
        Direction::HigherIsBetter => {
            if value >= good {
                HealthTier::Healthy
            } else if value >= warning {
                HealthTier::Warning
            } else {
                HealthTier::Critical
            }
        }
        Direction::LowerIsBetter => {
            if value <= good {
                HealthTier::Healthy
            } else if value <= warning {
                HealthTier::Warning
            } else {
                HealthTier::Critical
            }
        }
    };
    Ok(tier)
}

/// Piecewise-linear 0-100 sub-score, continuous at both thresholds:
/// 100 at or beyond `good`, 50 at `warning`, falling to 0 further out.
pub fn normalize(value: f64, definition: &MetricDefinition) -> Result<f64, ScoreError> {
    if !value.is_finite() {
        return Err(ScoreError::not_finite(definition.id));
    }
    let good = definition.good_threshold;
    let warning = definition.warning_threshold;
    let score = match definition.direction {
        Direction::HigherIsBetter => {
            if value >= good {
                FULL_SCORE
            } else if value >= warning {
                // good > warning here, so the span is non-zero
                WARNING_SCORE + WARNING_SCORE * (value - warning) / (good - warning)
            } else if warning > 0.0 {
                WARNING_SCORE * value.max(0.0) / warning
            } else {
                0.0
            }
        }
        Direction::LowerIsBetter => {
            if value <= good {
                FULL_SCORE
            } else if value <= warning {
                FULL_SCORE - WARNING_SCORE * (value - good) / (warning - good)
            } else if warning > 0.0 {
                let excess = (value - warning) / warning;
                (WARNING_SCORE * (1.0 - excess)).max(0.0)
            } else {
                0.0
            }
        }
    };
    Ok(score.clamp(0.0, FULL_SCORE))
}

// ---------------------------------------------------------------------------
// ScoreEngine
// ---------------------------------------------------------------------------

/// Stateless scorer bound to a catalog.
#[derive(Debug, Clone, Copy)]
pub struct ScoreEngine<'a> {
    catalog: &'a MetricCatalog,
}

impl<'a> ScoreEngine<'a> {
    pub fn new(catalog: &'a MetricCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a MetricCatalog {
        self.catalog
    }

    fn definition(&self, id: MetricId) -> Result<&'a MetricDefinition, ScoreError> {
        self.catalog.get(id).map_err(|_| ScoreError::undefined(id))
    }

    pub fn classify(&self, id: MetricId, value: f64) -> Result<HealthTier, ScoreError> {
        classify(value, self.definition(id)?)
    }

    pub fn normalize(&self, id: MetricId, value: f64) -> Result<f64, ScoreError> {
        normalize(value, self.definition(id)?)
    }

    /// Weighted average of normalized scores over the weighted metrics
    /// present in `sample`, divided by the weight actually present.
    pub fn try_aggregate(&self, sample: &MetricSample) -> Result<EffectivenessResult, ScoreError> {
        let mut weighted_sum = Decimal::ZERO;
        let mut weight_sum = Decimal::ZERO;
        let mut metrics_used = 0;

        for def in self.catalog.weighted() {
            let Some(value) = sample.get(def.id) else {
                log::debug!("{} absent from sample; skipped", def.id);
                continue;
            };
            let score = normalize(value, def)?;
            weighted_sum = adapter::to_decimal(score)
                .checked_mul(def.weight)
                .and_then(|term| weighted_sum.checked_add(term))
                .ok_or(ScoreError::Overflow(def.id))?;
            weight_sum = weight_sum
                .checked_add(def.weight)
                .ok_or(ScoreError::Overflow(def.id))?;
            metrics_used += 1;
        }

        if weight_sum <= Decimal::ZERO {
            return Err(ScoreError::NoWeightedMetrics);
        }

        let mean = weighted_sum
            .checked_div(weight_sum)
            .ok_or(ScoreError::NoWeightedMetrics)?;
        let score = adapter::to_percent(mean);
        Ok(EffectivenessResult {
            score,
            status: EffectivenessTier::from_score(score),
            weight_used: adapter::from_decimal(weight_sum),
            metrics_used,
        })
    }

    /// Like [`try_aggregate`](Self::try_aggregate), but any failure yields the
    /// score-0 fallback so callers never see a partial result.
    pub fn aggregate(&self, sample: &MetricSample) -> EffectivenessResult {
        match self.try_aggregate(sample) {
            Ok(result) => result,
            Err(ScoreError::NoWeightedMetrics) => {
                log::debug!("no weighted metrics in sample; effectiveness falls back to 0");
                EffectivenessResult::fallback()
            }
            Err(err) => {
                log::error!("aggregate failed: {err}; effectiveness falls back to 0");
                EffectivenessResult::fallback()
            }
        }
    }

    /// Per-metric rows for every catalog entry present in `sample`.
    pub fn evaluate(&self, sample: &MetricSample) -> Result<Vec<MetricScore>, ScoreError> {
        self.catalog
            .iter()
            .filter_map(|def| sample.get(def.id).map(|value| (def, value)))
            .map(|(def, value)| {
                Ok(MetricScore {
                    id: def.id,
                    value,
                    tier: classify(value, def)?,
                    score: normalize(value, def)?,
                    weight: def.weight_f64(),
                })
            })
            .collect()
    }
}

/// Aggregate `sample` against `catalog` with the score-0 fallback.
pub fn aggregate(sample: &MetricSample, catalog: &MetricCatalog) -> EffectivenessResult {
    ScoreEngine::new(catalog).aggregate(sample)
}

// ===========================================================================
// Tests
// ===========================================================================
