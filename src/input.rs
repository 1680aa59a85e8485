// Copyright 2026 Hypermesh Foundation. All rights reserved.
// V&V Scorecard Engine - Manual Entry & Validation
//
// Counts typed into the dashboard form are checked here and converted into a
// MetricSample before anything reaches the score engine. A rejected entry
// never touches the current sample.

use serde::{Deserialize, Serialize};

use crate::catalog::MetricCatalog;
use crate::types::{MetricId, MetricSample};

const LINES_PER_KLOC: f64 = 1000.0;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("malformed input: {0}")]
    Malformed(String),
    #[error("`{field}` must be a finite number")]
    NotFinite { field: &'static str },
    #[error("`{field}` = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("`{field}` must be greater than zero")]
    ZeroTotal { field: &'static str },
    #[error("`{part}` ({part_value}) cannot exceed `{total}` ({total_value})")]
    PartExceedsTotal {
        part: &'static str,
        part_value: u64,
        total: &'static str,
        total_value: u64,
    },
}

impl ValidationError {
    pub fn out_of_range(field: &'static str, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange { field, value, min, max }
    }
}

/// Check a single raw value against the metric's declared range.
pub fn validate_value(
    id: MetricId,
    value: f64,
    catalog: &MetricCatalog,
) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field: id.as_str() });
    }
    let def = catalog
        .get(id)
        .map_err(|e| ValidationError::Malformed(e.to_string()))?;
    if !def.in_range(value) {
        return Err(ValidationError::out_of_range(id.as_str(), value, def.min_value, def.max_value));
    }
    Ok(value)
}

// ---------------------------------------------------------------------------
// ManualEntry
// ---------------------------------------------------------------------------

/// Raw counts from the manual-entry form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualEntry {
    pub automated_tests: u64,
    pub total_tests: u64,
    pub passed_tests: u64,
    pub covered_lines: u64,
    pub total_lines: u64,
    pub defects_found: u64,
    pub regressions: u64,
    /// Average days to resolve a defect.
    pub avg_resolution_days: f64,
    pub successful_builds: u64,
    pub total_builds: u64,
    #[serde(default)]
    pub traced_requirements: Option<u64>,
    #[serde(default)]
    pub total_requirements: Option<u64>,
    /// Defects caught during code review, out of `defects_found`.
    #[serde(default)]
    pub review_defects: Option<u64>,
    /// Defects that escaped to production after release.
    #[serde(default)]
    pub escaped_defects: Option<u64>,
}

impl ManualEntry {
    /// Validate every field and derive the metric values.
    pub fn to_sample(&self, catalog: &MetricCatalog) -> Result<MetricSample, ValidationError> {
        if !self.avg_resolution_days.is_finite() {
            return Err(ValidationError::NotFinite { field: "avgResolutionDays" });
        }

        let automation = ratio(self.automated_tests, "automatedTests", self.total_tests, "totalTests")?;
        let success = ratio(self.passed_tests, "passedTests", self.total_tests, "totalTests")?;
        let coverage = ratio(self.covered_lines, "coveredLines", self.total_lines, "totalLines")?;
        let stability = ratio(self.successful_builds, "successfulBuilds", self.total_builds, "totalBuilds")?;
        let density = self.defects_found as f64 / (self.total_lines as f64 / LINES_PER_KLOC);

        let mut values = vec![
            (MetricId::AutomationRate, automation),
            (MetricId::CodeCoverage, coverage),
            (MetricId::DefectDensity, density),
            (MetricId::Regressions, self.regressions as f64),
            (MetricId::ResolutionTime, self.avg_resolution_days),
            (MetricId::TestSuccess, success),
            (MetricId::BuildStability, stability),
        ];

        match (self.traced_requirements, self.total_requirements) {
            (Some(traced), Some(total)) => {
                values.push((
                    MetricId::Traceability,
                    ratio(traced, "tracedRequirements", total, "totalRequirements")?,
                ));
            }
            (None, None) => {}
            _ => {
                return Err(ValidationError::Malformed(
                    "tracedRequirements and totalRequirements must be given together".to_string(),
                ))
            }
        }

        if let Some(review) = self.review_defects {
            if self.defects_found > 0 {
                values.push((
                    MetricId::ReviewEffectiveness,
                    ratio(review, "reviewDefects", self.defects_found, "defectsFound")?,
                ));
            } else if review > 0 {
                return Err(ValidationError::PartExceedsTotal {
                    part: "reviewDefects",
                    part_value: review,
                    total: "defectsFound",
                    total_value: 0,
                });
            }
        }

        if let Some(escaped) = self.escaped_defects {
            let total = self.defects_found.saturating_add(escaped);
            if total > 0 {
                values.push((MetricId::Dre, self.defects_found as f64 * 100.0 / total as f64));
            }
        }

        for (id, value) in &values {
            validate_value(*id, *value, catalog)?;
        }
        Ok(values.into_iter().collect())
    }
}

/// `part / total` as a percentage.
fn ratio(
    part: u64,
    part_name: &'static str,
    total: u64,
    total_name: &'static str,
) -> Result<f64, ValidationError> {
    if total == 0 {
        return Err(ValidationError::ZeroTotal { field: total_name });
    }
    if part > total {
        return Err(ValidationError::PartExceedsTotal {
            part: part_name,
            part_value: part,
            total: total_name,
            total_value: total,
        });
    }
    Ok(part as f64 * 100.0 / total as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> ManualEntry {
        ManualEntry {
            automated_tests: 120,
            total_tests: 150,
            passed_tests: 141,
            covered_lines: 8_200,
            total_lines: 10_000,
            defects_found: 25,
            regressions: 4,
            avg_resolution_days: 3.5,
            successful_builds: 96,
            total_builds: 100,
            ..ManualEntry::default()
        }
    }

    #[test]
    fn converts_counts_to_metric_values() {
        let sample = entry().to_sample(&MetricCatalog::iso29110()).unwrap();
        assert_eq!(sample.get(MetricId::AutomationRate), Some(80.0));
        assert_eq!(sample.get(MetricId::TestSuccess), Some(94.0));
        assert_eq!(sample.get(MetricId::CodeCoverage), Some(82.0));
        assert_eq!(sample.get(MetricId::DefectDensity), Some(2.5));
        assert_eq!(sample.get(MetricId::Regressions), Some(4.0));
        assert_eq!(sample.get(MetricId::ResolutionTime), Some(3.5));
        assert_eq!(sample.get(MetricId::BuildStability), Some(96.0));
        assert!(!sample.contains(MetricId::Traceability));
        assert!(!sample.contains(MetricId::Dre));
    }

    #[test]
    fn optional_counts_add_unweighted_metrics() {
        let full = ManualEntry {
            traced_requirements: Some(38),
            total_requirements: Some(40),
            review_defects: Some(20),
            escaped_defects: Some(0),
            ..entry()
        };
        let sample = full.to_sample(&MetricCatalog::iso29110()).unwrap();
        assert_eq!(sample.get(MetricId::Traceability), Some(95.0));
        assert_eq!(sample.get(MetricId::ReviewEffectiveness), Some(80.0));
        assert_eq!(sample.get(MetricId::Dre), Some(100.0));
    }

    #[test]
    fn successful_builds_cannot_exceed_total() {
        let bad = ManualEntry { successful_builds: 101, ..entry() };
        let err = bad.to_sample(&MetricCatalog::iso29110()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::PartExceedsTotal {
                part: "successfulBuilds",
                part_value: 101,
                total: "totalBuilds",
                total_value: 100,
            }
        );
    }

    #[test]
    fn zero_denominators_are_rejected() {
        let bad = ManualEntry { total_tests: 0, automated_tests: 0, passed_tests: 0, ..entry() };
        assert_eq!(
            bad.to_sample(&MetricCatalog::iso29110()),
            Err(ValidationError::ZeroTotal { field: "totalTests" })
        );
        let no_lines = ManualEntry { total_lines: 0, covered_lines: 0, ..entry() };
        assert!(no_lines.to_sample(&MetricCatalog::iso29110()).is_err());
    }

    #[test]
    fn resolution_time_outside_declared_range() {
        let bad = ManualEntry { avg_resolution_days: 400.0, ..entry() };
        assert!(matches!(
            bad.to_sample(&MetricCatalog::iso29110()),
            Err(ValidationError::OutOfRange { field: "resolutionTime", .. })
        ));
        let nan = ManualEntry { avg_resolution_days: f64::NAN, ..entry() };
        assert!(matches!(
            nan.to_sample(&MetricCatalog::iso29110()),
            Err(ValidationError::NotFinite { .. })
        ));
    }

    #[test]
    fn half_given_requirement_counts_are_malformed() {
        let bad = ManualEntry { traced_requirements: Some(3), ..entry() };
        assert!(matches!(
            bad.to_sample(&MetricCatalog::iso29110()),
            Err(ValidationError::Malformed(_))
        ));
    }

    #[test]
    fn single_values_checked_against_catalog_range() {
        let catalog = MetricCatalog::iso29110();
        assert_eq!(validate_value(MetricId::CodeCoverage, 100.0, &catalog), Ok(100.0));
        assert!(validate_value(MetricId::CodeCoverage, 100.5, &catalog).is_err());
        assert!(validate_value(MetricId::DefectDensity, -0.1, &catalog).is_err());
        assert!(validate_value(MetricId::Regressions, f64::NAN, &catalog).is_err());
    }

    #[test]
    fn deserializes_form_payload() {
        let json = r#"{
            "automatedTests": 120, "totalTests": 150, "passedTests": 140,
            "coveredLines": 700, "totalLines": 1000, "defectsFound": 3,
            "regressions": 1, "avgResolutionDays": 2, "successfulBuilds": 9,
            "totalBuilds": 10
        }"#;
        let entry: ManualEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.automated_tests, 120);
        assert_eq!(entry.escaped_defects, None);
        assert!(serde_json::from_str::<ManualEntry>(r#"{"automatedTests": "many"}"#).is_err());
    }
}
