// Copyright 2026 Hypermesh Foundation. All rights reserved.
// V&V Scorecard Engine - Recommendations

use serde::{Deserialize, Serialize};

use crate::catalog::MetricCatalog;
use crate::engine::{classify, ScoreError};
use crate::types::{HealthTier, MetricId, MetricSample};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub severity: HealthTier,
    /// None for the all-healthy summary.
    pub metric: Option<MetricId>,
    pub title: String,
    pub detail: String,
}

/// Advice for every metric needing attention, in catalog order.
/// A single healthy entry when nothing needs attention.
pub fn recommendations(
    sample: &MetricSample,
    catalog: &MetricCatalog,
) -> Result<Vec<Recommendation>, ScoreError> {
    let mut out = Vec::new();
    for def in catalog.iter() {
        let Some(value) = sample.get(def.id) else { continue };
        let reading = format!("{value:.1}{}", def.unit_suffix());
        match classify(value, def)? {
            HealthTier::Critical => out.push(Recommendation {
                severity: HealthTier::Critical,
                metric: Some(def.id),
                title: format!("{} needs urgent attention", def.title),
                detail: format!("Current value ({reading}) is in the critical zone. Immediate action is recommended."),
            }),
            HealthTier::Warning => out.push(Recommendation {
                severity: HealthTier::Warning,
                metric: Some(def.id),
                title: format!("{} requires improvement", def.title),
                detail: format!("Current value ({reading}) can be improved to raise overall quality."),
            }),
            HealthTier::Healthy => {}
        }
    }

    if out.is_empty() {
        out.push(Recommendation {
            severity: HealthTier::Healthy,
            metric: None,
            title: "All metrics healthy".to_string(),
            detail: "Every metric is within its healthy range. Keep up the current practices.".to_string(),
        });
    }
    Ok(out)
}
