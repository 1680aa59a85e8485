// Monte Carlo Infrastructure: N runs per scenario with statistical aggregation
// Each scenario runs N times with seeds base..base+N, computing mean ± 95% CI

use anyhow::Context;
use chrono::Utc;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_decimal_macros::dec;
use scorecard_engine::*;

use crate::report::*;
use crate::scenarios::Scenario;
use crate::time_series::{count_tier, TickSnapshot, TimeSeriesRecorder};

use std::path::Path;
use std::time::Instant;

/// Run a single scenario iteration with a specific seed.
pub fn run_single(
    scenario: &Scenario,
    seed: u64,
    time_series_dir: Option<&Path>,
) -> anyhow::Result<BenchResult> {
    let start = Instant::now();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let catalog = MetricCatalog::iso29110();
    let rescaled = catalog.rescaled(dec!(2.5))?;
    let policy = RefreshPolicy::default();

    let initial = simulate(&scenario.profile_at(0), &mut rng)?;
    let mut card = Scorecard::new(catalog, initial);

    let mut time_series = time_series_dir.map(|_| TimeSeriesRecorder::new());
    let mut scores: Vec<f64> = Vec::with_capacity(scenario.ticks as usize);
    let mut min_effectiveness = u8::MAX;
    let mut max_effectiveness = 0;
    let mut refresh_count = 0;
    let mut value_bound_violations = 0;
    let mut rescale_mismatches = 0;

    for tick in 0..scenario.ticks {
        let profile = scenario.profile_at(tick);
        let refreshed = card.tick(&policy, &profile, &mut rng)?.is_some();
        if refreshed {
            refresh_count += 1;
        }

        let result = card.effectiveness();
        scores.push(f64::from(result.score));
        min_effectiveness = min_effectiveness.min(result.score);
        max_effectiveness = max_effectiveness.max(result.score);

        for (id, value) in card.sample().iter() {
            if validate_value(id, value, card.catalog()).is_err() {
                log::warn!("{}: seed {seed} tick {tick}: {id} = {value} out of range", scenario.name);
                value_bound_violations += 1;
            }
        }
        if aggregate(card.sample(), &rescaled).score != result.score {
            rescale_mismatches += 1;
        }

        if let Some(ts) = time_series.as_mut() {
            let rows = card.engine().evaluate(card.sample())?;
            ts.record(TickSnapshot::new(tick, refreshed, &profile, &result, &rows));
        }
    }

    if let (Some(ts), Some(dir)) = (&time_series, time_series_dir) {
        let path = dir.join(format!("seed-{seed}.jsonl"));
        if let Err(e) = ts.write_jsonl(&path) {
            log::warn!("failed to write time series: {e:#}");
        }
    }

    let snapshot_round_trip = {
        let mut store = MemoryStore::new();
        let snapshot = card.snapshot(Utc::now());
        save_snapshot(&mut store, &snapshot)?;
        load_snapshot(&store)?
            .map(|loaded| loaded.metrics == snapshot.metrics && loaded.effectiveness == snapshot.effectiveness)
            .unwrap_or(false)
    };

    let elapsed = start.elapsed();
    let elapsed_secs = elapsed.as_secs_f64().max(0.001);

    let final_result = card.effectiveness();
    let final_rows = card.engine().evaluate(card.sample())?;
    let mean_effectiveness = Stats::from_samples(&scores).mean;

    let criteria = &scenario.criteria;
    let mut pass = true;
    if criteria.require_value_bounds && value_bound_violations > 0 {
        pass = false;
    }
    if criteria.require_rescale_invariance && rescale_mismatches > 0 {
        pass = false;
    }
    if criteria.require_snapshot_round_trip && !snapshot_round_trip {
        pass = false;
    }
    if let Some(floor) = criteria.min_mean_effectiveness {
        if mean_effectiveness < floor {
            pass = false;
        }
    }

    Ok(BenchResult {
        scenario: scenario.label.to_string(),
        name: scenario.name.to_string(),
        category: scenario.category.to_string(),
        seed,
        pass,
        ticks: scenario.ticks,
        refresh_count,
        final_effectiveness: final_result.score,
        final_status: final_result.status,
        mean_effectiveness,
        min_effectiveness: if scores.is_empty() { final_result.score } else { min_effectiveness },
        max_effectiveness: if scores.is_empty() { final_result.score } else { max_effectiveness },
        final_critical_count: count_tier(&final_rows, HealthTier::Critical),
        final_warning_count: count_tier(&final_rows, HealthTier::Warning),
        value_bound_violations,
        rescale_mismatches,
        snapshot_round_trip,
        elapsed_ms: elapsed.as_millis(),
        throughput_per_sec: scenario.ticks as f64 / elapsed_secs,
    })
}

/// Run Monte Carlo: N runs of a scenario, aggregate stats.
pub fn run_monte_carlo(
    scenario: &Scenario,
    n_runs: usize,
    base_seed: u64,
    time_series_base: Option<&Path>,
) -> anyhow::Result<MonteCarloReport> {
    let ts_dir = time_series_base.map(|base| base.join(scenario.name.to_lowercase()));

    let mut results = Vec::with_capacity(n_runs);
    for i in 0..n_runs {
        let seed = base_seed + i as u64;
        let result = run_single(scenario, seed, ts_dir.as_deref())
            .with_context(|| format!("{} seed {seed}", scenario.name))?;
        results.push(result);
    }

    Ok(aggregate_runs(scenario, results))
}

/// Aggregate individual runs into a MonteCarloReport.
fn aggregate_runs(scenario: &Scenario, results: Vec<BenchResult>) -> MonteCarloReport {
    let n = results.len();
    let passed = results.iter().filter(|r| r.pass).count();
    let pass_rate = if n > 0 { passed as f64 / n as f64 } else { 0.0 };

    let stats = |f: fn(&BenchResult) -> f64| {
        Stats::from_samples(&results.iter().map(f).collect::<Vec<_>>())
    };

    let mut status_distribution = [0; 4];
    for r in &results {
        status_distribution[r.final_status as usize] += 1;
    }

    MonteCarloReport {
        scenario_name: scenario.name.to_string(),
        label: scenario.label.to_string(),
        category: scenario.category.to_string(),
        n_runs: n,
        pass_rate,
        effectiveness: stats(|r| r.mean_effectiveness),
        final_effectiveness: stats(|r| f64::from(r.final_effectiveness)),
        critical_count: stats(|r| r.final_critical_count as f64),
        warning_count: stats(|r| r.final_warning_count as f64),
        refresh_count: stats(|r| f64::from(r.refresh_count)),
        elapsed_ms: stats(|r| r.elapsed_ms as f64),
        throughput_per_sec: stats(|r| r.throughput_per_sec),
        status_distribution,
        individual_runs: results,
    }
}
