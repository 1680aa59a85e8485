// Copyright 2026 Hypermesh Foundation. All rights reserved.
// V&V Scorecard Engine

pub mod types;
pub mod adapter;
pub mod catalog;
pub mod engine;
pub mod simulation;
pub mod input;
pub mod trend;
pub mod recommendations;
pub mod snapshot;
pub mod scorecard;

pub use types::*;
pub use catalog::{CatalogError, MetricCatalog, MetricDefinition};
pub use engine::{aggregate, classify, normalize, ScoreEngine, ScoreError};
pub use input::{validate_value, ManualEntry, ValidationError};
pub use recommendations::{recommendations, Recommendation};
pub use scorecard::{MetricCard, RefreshPolicy, Scorecard, ScorecardReport, UpdateError};
pub use simulation::{simulate, ProjectPhase, ProjectProfile};
pub use snapshot::{load_snapshot, save_snapshot, MemoryStore, Snapshot, SnapshotError, SnapshotStore};

use chrono::Utc;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ─── JS boundary helpers ─────────────────────────────────────────────────────

/// Plain objects instead of `Map`s, so samples read as `{ codeCoverage: 80 }`.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(Into::into)
}

fn js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn set_panic_hook() {
    #[cfg(target_arch = "wasm32")]
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
pub struct ScorecardSession {
    scorecard: Scorecard,
    profile: ProjectProfile,
    policy: RefreshPolicy,
    rng: ChaCha8Rng,
}

#[wasm_bindgen]
impl ScorecardSession {
    /// Fresh session on the default catalog, seeded with a simulated sample.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u32) -> Result<ScorecardSession, JsValue> {
        Self::restore(JsValue::UNDEFINED, seed)
    }

    /// Resume from a flat record as written by `snapshot_record`. A missing
    /// or corrupt record starts a simulated session instead.
    pub fn restore(record: JsValue, seed: u32) -> Result<ScorecardSession, JsValue> {
        set_panic_hook();

        let store: MemoryStore = if record.is_undefined() || record.is_null() {
            MemoryStore::new()
        } else {
            serde_wasm_bindgen::from_value(record).unwrap_or_else(|err| {
                log::warn!("snapshot record is not a string map: {err}");
                MemoryStore::new()
            })
        };

        let mut rng = ChaCha8Rng::seed_from_u64(u64::from(seed));
        let profile = ProjectProfile::default();
        let scorecard = Scorecard::restore(MetricCatalog::default(), &store, &profile, &mut rng)
            .map_err(js_err)?;

        Ok(Self {
            scorecard,
            profile,
            policy: RefreshPolicy::default(),
            rng,
        })
    }

    /// Redraw the sample for a new project profile. Returns the effectiveness.
    pub fn simulate(
        &mut self,
        project_size: f64,
        team_size: u32,
        phase: &str,
        integrity_level: u8,
    ) -> Result<JsValue, JsValue> {
        let profile = ProjectProfile {
            project_size,
            team_size,
            phase: phase.parse().map_err(js_err)?,
            integrity_level,
        };
        let result = self.scorecard.simulate(&profile, &mut self.rng).map_err(js_err)?;
        self.profile = profile;
        to_js(&result)
    }

    pub fn submit_manual(&mut self, entry: JsValue) -> Result<JsValue, JsValue> {
        let entry: ManualEntry = serde_wasm_bindgen::from_value(entry)
            .map_err(|err| js_err(ValidationError::Malformed(err.to_string())))?;
        let result = self.scorecard.submit_manual(&entry).map_err(js_err)?;
        to_js(&result)
    }

    pub fn set_metric(&mut self, id: &str, value: f64) -> Result<JsValue, JsValue> {
        let id: MetricId = id.parse().map_err(js_err)?;
        let result = self.scorecard.set_metric(id, value).map_err(js_err)?;
        to_js(&result)
    }

    pub fn sample(&self) -> Result<JsValue, JsValue> {
        to_js(self.scorecard.sample())
    }

    pub fn effectiveness(&self) -> Result<JsValue, JsValue> {
        to_js(&self.scorecard.effectiveness())
    }

    pub fn report(&self) -> Result<JsValue, JsValue> {
        let report = self.scorecard.report().map_err(js_err)?;
        to_js(&report)
    }

    pub fn catalog(&self) -> Result<JsValue, JsValue> {
        to_js(self.scorecard.catalog())
    }

    /// Simulated history ending on the metric's current value.
    pub fn trend(&mut self, id: &str, points: Option<usize>) -> Result<Vec<f64>, JsValue> {
        let id: MetricId = id.parse().map_err(js_err)?;
        let current = self
            .scorecard
            .sample()
            .get(id)
            .ok_or_else(|| js_err(format!("no current value for `{id}`")))?;
        Ok(trend::trend(current, points.unwrap_or(trend::DEFAULT_POINTS), &mut self.rng))
    }

    pub fn refresh_interval_secs(&self) -> u32 {
        self.policy.interval_secs
    }

    pub fn should_refresh(&mut self) -> bool {
        self.policy.should_refresh(&mut self.rng)
    }

    /// Timer tick: maybe redraw with the last profile. Null when skipped.
    pub fn tick(&mut self) -> Result<JsValue, JsValue> {
        match self
            .scorecard
            .tick(&self.policy, &self.profile, &mut self.rng)
            .map_err(js_err)?
        {
            Some(result) => to_js(&result),
            None => Ok(JsValue::NULL),
        }
    }

    /// Flat key/value record for `localStorage`, stamped now.
    pub fn snapshot_record(&self) -> Result<JsValue, JsValue> {
        let mut store = MemoryStore::new();
        self.scorecard.save(&mut store, Utc::now()).map_err(js_err)?;
        to_js(&store)
    }
}

// ─── Free functions over the default catalog ─────────────────────────────────

#[wasm_bindgen]
pub fn classify_metric(id: &str, value: f64) -> Result<JsValue, JsValue> {
    let id: MetricId = id.parse().map_err(js_err)?;
    let catalog = MetricCatalog::default();
    let tier = ScoreEngine::new(&catalog).classify(id, value).map_err(js_err)?;
    to_js(&tier)
}

#[wasm_bindgen]
pub fn normalize_metric(id: &str, value: f64) -> Result<f64, JsValue> {
    let id: MetricId = id.parse().map_err(js_err)?;
    let catalog = MetricCatalog::default();
    ScoreEngine::new(&catalog).normalize(id, value).map_err(js_err)
}

#[wasm_bindgen]
pub fn aggregate_metrics(sample: JsValue) -> Result<JsValue, JsValue> {
    let sample: MetricSample = serde_wasm_bindgen::from_value(sample).map_err(js_err)?;
    to_js(&aggregate(&sample, &MetricCatalog::default()))
}
