// Scenario Definitions: named project profiles driven through a demo session
// Profiles can drift across refreshes through curve functions

use scorecard_engine::{ProjectPhase, ProjectProfile};

// ─── Scenario Configuration ─────────────────────────────────────────────────

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    pub profile: ProjectProfile,
    /// Timer ticks per run; the refresh policy decides which ones redraw.
    pub ticks: u64,
    pub phase_curve: Option<fn(u64) -> ProjectPhase>,
    pub team_curve: Option<fn(u64) -> u32>,
    pub size_curve: Option<fn(u64) -> f64>,
    pub criteria: PassCriteria,
}

impl Scenario {
    /// Profile in effect at `tick`.
    pub fn profile_at(&self, tick: u64) -> ProjectProfile {
        ProjectProfile {
            phase: self.phase_curve.map_or(self.profile.phase, |curve| curve(tick)),
            team_size: self.team_curve.map_or(self.profile.team_size, |curve| curve(tick)),
            project_size: self.size_curve.map_or(self.profile.project_size, |curve| curve(tick)),
            ..self.profile.clone()
        }
    }
}

pub struct PassCriteria {
    /// Every simulated value inside its catalog range.
    pub require_value_bounds: bool,
    /// Aggregate unchanged when all weights are scaled.
    pub require_rescale_invariance: bool,
    /// Snapshot save/load returns the same sample and score.
    pub require_snapshot_round_trip: bool,
    pub min_mean_effectiveness: Option<f64>,
}

impl Default for PassCriteria {
    fn default() -> Self {
        Self {
            require_value_bounds: true,
            require_rescale_invariance: true,
            require_snapshot_round_trip: false,
            min_mean_effectiveness: None,
        }
    }
}

// ─── Curve Functions ────────────────────────────────────────────────────────

/// Walks SI.1 through SI.6 over 600 ticks.
fn lifecycle_phase(tick: u64) -> ProjectPhase {
    match tick / 100 {
        0 => ProjectPhase::Si1,
        1 => ProjectPhase::Si2,
        2 => ProjectPhase::Si3,
        3 => ProjectPhase::Si4,
        4 => ProjectPhase::Si5,
        _ => ProjectPhase::Si6,
    }
}

/// Hiring ramp from 3 to 20 people.
fn hiring_ramp(tick: u64) -> u32 {
    (3 + tick / 25).min(20) as u32
}

/// Codebase growing from 20 to 180 KLOC.
fn codebase_growth(tick: u64) -> f64 {
    20.0 + (tick as f64 * 0.4).min(160.0)
}

// ─── Scenario Table ─────────────────────────────────────────────────────────

fn profile(project_size: f64, team_size: u32, phase: ProjectPhase, integrity_level: u8) -> ProjectProfile {
    ProjectProfile { project_size, team_size, phase, integrity_level }
}

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "BASELINE_SI5",
            label: "Baseline (50 KLOC, 5 devs, SI.5)",
            category: "baseline",
            profile: ProjectProfile::default(),
            ticks: 200,
            phase_curve: None,
            team_curve: None,
            size_curve: None,
            criteria: PassCriteria {
                require_snapshot_round_trip: true,
                ..PassCriteria::default()
            },
        },
        Scenario {
            name: "STARTUP_SI1",
            label: "Small team at initiation",
            category: "profile",
            profile: profile(8.0, 3, ProjectPhase::Si1, 1),
            ticks: 200,
            phase_curve: None,
            team_curve: None,
            size_curve: None,
            criteria: PassCriteria::default(),
        },
        Scenario {
            name: "LARGE_SIL4",
            label: "Large project, integrity level 4",
            category: "profile",
            profile: profile(250.0, 40, ProjectPhase::Si4, 4),
            ticks: 200,
            phase_curve: None,
            team_curve: None,
            size_curve: None,
            criteria: PassCriteria::default(),
        },
        Scenario {
            name: "DELIVERY_SI6",
            label: "Product delivery, mid-size",
            category: "profile",
            profile: profile(90.0, 8, ProjectPhase::Si6, 2),
            ticks: 200,
            phase_curve: None,
            team_curve: None,
            size_curve: None,
            criteria: PassCriteria::default(),
        },
        Scenario {
            name: "LIFECYCLE_WALK",
            label: "Phase walk SI.1 to SI.6",
            category: "drift",
            profile: ProjectProfile::default(),
            ticks: 600,
            phase_curve: Some(lifecycle_phase),
            team_curve: None,
            size_curve: None,
            criteria: PassCriteria::default(),
        },
        Scenario {
            name: "HIRING_RAMP",
            label: "Team growth 3 to 20",
            category: "drift",
            profile: ProjectProfile::default(),
            ticks: 500,
            phase_curve: None,
            team_curve: Some(hiring_ramp),
            size_curve: None,
            criteria: PassCriteria::default(),
        },
        Scenario {
            name: "CODEBASE_GROWTH",
            label: "Codebase growth 20 to 180 KLOC",
            category: "drift",
            profile: ProjectProfile::default(),
            ticks: 500,
            phase_curve: None,
            team_curve: None,
            size_curve: Some(codebase_growth),
            criteria: PassCriteria {
                require_snapshot_round_trip: true,
                ..PassCriteria::default()
            },
        },
        Scenario {
            name: "SCORE_FLOOR",
            label: "Baseline effectiveness floor",
            category: "regression",
            profile: profile(40.0, 6, ProjectPhase::Si5, 1),
            ticks: 100,
            phase_curve: None,
            team_curve: None,
            size_curve: None,
            criteria: PassCriteria {
                min_mean_effectiveness: Some(40.0),
                ..PassCriteria::default()
            },
        },
    ]
}
