// Copyright 2026 Hypermesh Foundation. All rights reserved.
// V&V Scorecard Engine - Simulated Metric Source

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::input::ValidationError;
use crate::types::{MetricId, MetricSample};

// ─── Project Phase ───────────────────────────────────────────────────────────

/// ISO/IEC 29110 Software Implementation activities SI.1 - SI.6.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProjectPhase {
    /// Initiation
    Si1,
    /// Requirements analysis
    Si2,
    /// Architectural and detailed design
    Si3,
    /// Construction
    Si4,
    /// Integration and tests
    Si5,
    /// Product delivery
    Si6,
}

impl ProjectPhase {
    pub fn factor(&self) -> f64 {
        match self {
            Self::Si1 => 0.6,
            Self::Si2 => 0.7,
            Self::Si3 => 0.8,
            Self::Si4 => 0.85,
            Self::Si5 => 1.0,
            Self::Si6 => 0.9,
        }
    }
}

impl FromStr for ProjectPhase {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "si1" => Ok(Self::Si1),
            "si2" => Ok(Self::Si2),
            "si3" => Ok(Self::Si3),
            "si4" => Ok(Self::Si4),
            "si5" => Ok(Self::Si5),
            "si6" => Ok(Self::Si6),
            other => Err(ValidationError::Malformed(format!("unknown project phase `{other}`"))),
        }
    }
}

// ─── Project Profile ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectProfile {
    /// Size in KLOC.
    pub project_size: f64,
    pub team_size: u32,
    pub phase: ProjectPhase,
    /// Safety integrity level, 1 (lowest) to 4 (highest).
    pub integrity_level: u8,
}

impl Default for ProjectProfile {
    fn default() -> Self {
        Self {
            project_size: 50.0,
            team_size: 5,
            phase: ProjectPhase::Si5,
            integrity_level: 2,
        }
    }
}

impl ProjectProfile {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.project_size.is_finite() {
            return Err(ValidationError::NotFinite { field: "project_size" });
        }
        if self.project_size < 0.0 {
            return Err(ValidationError::out_of_range("project_size", self.project_size, 0.0, f64::MAX));
        }
        if self.team_size == 0 {
            return Err(ValidationError::out_of_range("team_size", 0.0, 1.0, f64::from(u32::MAX)));
        }
        if !(1..=4).contains(&self.integrity_level) {
            return Err(ValidationError::out_of_range(
                "integrity_level",
                f64::from(self.integrity_level),
                1.0,
                4.0,
            ));
        }
        Ok(())
    }

    pub fn size_factor(&self) -> f64 {
        if self.project_size > 100.0 { 0.9 } else { 1.1 }
    }

    pub fn team_factor(&self) -> f64 {
        if self.team_size > 10 { 0.95 } else { 1.05 }
    }

    /// Higher integrity levels demand more rigor, so raw rates scale down.
    pub fn integrity_factor(&self) -> f64 {
        (5.0 - f64::from(self.integrity_level)) * 0.1 + 0.8
    }
}

// ─── Generator ───────────────────────────────────────────────────────────────

/// Draw a full sample for `profile`. Deterministic for a seeded `rng`.
pub fn simulate<R: Rng>(
    profile: &ProjectProfile,
    rng: &mut R,
) -> Result<MetricSample, ValidationError> {
    profile.validate()?;

    let size = profile.size_factor();
    let team = profile.team_factor();
    let phase = profile.phase.factor();
    let integrity = profile.integrity_factor();

    let mut draw = |base: f64, spread: f64| base + rng.gen::<f64>() * spread;

    let sample = MetricSample::from([
        (MetricId::AutomationRate, percent(draw(60.0, 35.0) * team * phase)),
        (MetricId::CodeCoverage, percent(draw(65.0, 30.0) * size * integrity)),
        (MetricId::DefectDensity, (draw(1.0, 6.0) / size / integrity).max(0.1)),
        (MetricId::Regressions, (draw(2.0, 12.0) / team).round().max(0.0)),
        (MetricId::ResolutionTime, (draw(2.0, 8.0) / team).max(0.5)),
        (MetricId::TestSuccess, percent(draw(75.0, 24.0) * phase * integrity)),
        (MetricId::BuildStability, percent(draw(80.0, 20.0) * team * phase)),
        (MetricId::Traceability, percent(draw(70.0, 29.0) * integrity)),
        (MetricId::ReviewEffectiveness, percent(draw(65.0, 30.0) * team)),
        (MetricId::Dre, percent(draw(70.0, 28.0) * integrity * phase)),
    ]);
    Ok(sample)
}

fn percent(v: f64) -> f64 {
    v.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_factors_match_profile() {
        let profile = ProjectProfile {
            project_size: 150.0,
            team_size: 12,
            phase: ProjectPhase::Si3,
            integrity_level: 4,
        };
        assert_eq!(profile.size_factor(), 0.9);
        assert_eq!(profile.team_factor(), 0.95);
        assert_eq!(profile.phase.factor(), 0.8);
        assert!((profile.integrity_factor() - 0.9).abs() < 1e-12);

        let small = ProjectProfile { integrity_level: 1, ..ProjectProfile::default() };
        assert_eq!(small.size_factor(), 1.1);
        assert_eq!(small.team_factor(), 1.05);
        assert!((small.integrity_factor() - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_same_seed_same_sample() {
        let profile = ProjectProfile::default();
        let a = simulate(&profile, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        let b = simulate(&profile, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        let c = simulate(&profile, &mut ChaCha8Rng::seed_from_u64(8)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_values_stay_in_declared_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let catalog = crate::catalog::MetricCatalog::iso29110();
        for phase in [ProjectPhase::Si1, ProjectPhase::Si5, ProjectPhase::Si6] {
            for integrity_level in 1..=4 {
                let profile = ProjectProfile {
                    project_size: 20.0,
                    team_size: 3,
                    phase,
                    integrity_level,
                };
                for _ in 0..50 {
                    let sample = simulate(&profile, &mut rng).unwrap();
                    assert_eq!(sample.len(), MetricId::ALL.len());
                    for (id, value) in sample.iter() {
                        let def = catalog.get(id).unwrap();
                        assert!(def.in_range(value), "{id}={value} outside declared range");
                    }
                    assert!(sample.get(MetricId::DefectDensity).unwrap() >= 0.1);
                    assert!(sample.get(MetricId::ResolutionTime).unwrap() >= 0.5);
                    let regressions = sample.get(MetricId::Regressions).unwrap();
                    assert_eq!(regressions, regressions.round());
                }
            }
        }
    }

    #[test]
    fn test_rejects_invalid_profiles() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let bad_level = ProjectProfile { integrity_level: 5, ..ProjectProfile::default() };
        assert!(matches!(
            simulate(&bad_level, &mut rng),
            Err(ValidationError::OutOfRange { field: "integrity_level", .. })
        ));
        let no_team = ProjectProfile { team_size: 0, ..ProjectProfile::default() };
        assert!(simulate(&no_team, &mut rng).is_err());
        let nan_size = ProjectProfile { project_size: f64::NAN, ..ProjectProfile::default() };
        assert!(matches!(
            simulate(&nan_size, &mut rng),
            Err(ValidationError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_phase_parses_from_form_value() {
        assert_eq!("si4".parse::<ProjectPhase>().unwrap(), ProjectPhase::Si4);
        assert_eq!(" SI6 ".parse::<ProjectPhase>().unwrap(), ProjectPhase::Si6);
        assert!("testing".parse::<ProjectPhase>().is_err());
    }
}
