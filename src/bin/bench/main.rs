// Scorecard Benchmark Runner
// Monte Carlo over project profiles, seedable PRNG, optional per-tick JSONL
//
// Usage:
//   cargo run --release --bin bench                      # All scenarios, 30 runs each
//   cargo run --release --bin bench -- --runs 5          # Quick mode
//   cargo run --release --bin bench -- LIFECYCLE         # Filter by name/label/category
//   cargo run --release --bin bench -- --time-series     # Write JSONL per run
//   cargo run --release --bin bench -- --seed 42         # Custom base seed

mod monte_carlo;
mod report;
mod scenarios;
mod time_series;

use anyhow::{bail, Context};
use chrono::{SecondsFormat, Utc};
use clap::Parser;
use report::*;
use scenarios::*;
use std::path::PathBuf;
use std::time::Instant;

// ─── CLI ────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "bench", about = "Monte Carlo runner for the V&V scorecard engine")]
struct CliArgs {
    /// Runs per scenario
    #[arg(long, default_value_t = 30)]
    runs: usize,
    /// Base seed; run i uses seed + i
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Write per-tick JSONL under <out-dir>/time-series
    #[arg(long)]
    time_series: bool,
    #[arg(long, default_value = "benchmark-results")]
    out_dir: PathBuf,
    /// Case-insensitive match on scenario name, label or category
    filter: Option<String>,
}

/// Share of runs that must pass for a scenario to pass.
const PASS_THRESHOLD: f64 = 0.933;

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = CliArgs::parse();
    let all_scenarios = scenarios();

    let to_run: Vec<&Scenario> = match &cli.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios.iter()
                .filter(|s| s.name.to_lowercase().contains(&f_lower)
                          || s.label.to_lowercase().contains(&f_lower)
                          || s.category.to_lowercase().contains(&f_lower))
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        bail!("no scenarios match filter {:?}", cli.filter);
    }

    let ts_dir = cli.time_series.then(|| cli.out_dir.join("time-series"));

    println!("\n  Scorecard Benchmark Runner v{}", env!("CARGO_PKG_VERSION"));
    println!("  PRNG: ChaCha8Rng | Runs/scenario: {} | Base seed: {}", cli.runs, cli.seed);
    println!("  Running {} scenario(s)...\n", to_run.len());
    println!("  {:<36} {:>5} {:>11} {:>6} {:>6} {:>7} {:>7}",
        "Scenario", "Pass%", "Eff", "Crit", "Warn", "Refr", "Time");
    println!("  {}", "-".repeat(88));

    let suite_start = Instant::now();
    let mut mc_reports = Vec::new();

    for scenario in &to_run {
        let report = monte_carlo::run_monte_carlo(scenario, cli.runs, cli.seed, ts_dir.as_deref())?;

        let pass_pct = report.pass_rate * 100.0;
        let eff_ci = (report.effectiveness.ci_upper - report.effectiveness.ci_lower) / 2.0;
        let status = if report.pass_rate >= PASS_THRESHOLD { "PASS" } else { "FAIL" };

        println!("  {:<36} {:>4}% {:>6.1}±{:<4.1} {:>6.1} {:>6.1} {:>7.1} {:>5.0}ms  {}",
            report.label,
            pass_pct as u32,
            report.effectiveness.mean, eff_ci,
            report.critical_count.mean,
            report.warning_count.mean,
            report.refresh_count.mean,
            report.elapsed_ms.mean,
            status,
        );

        mc_reports.push(report);
    }

    let suite_elapsed = suite_start.elapsed();

    // ─── Summary ────────────────────────────────────────────────────────

    let total = mc_reports.len();
    let passed = mc_reports.iter().filter(|r| r.pass_rate >= PASS_THRESHOLD).count();
    let failed = total - passed;

    println!("  {}", "-".repeat(88));
    println!("  Total: {}  Passed: {}  Failed: {}  Suite time: {:.1}s\n",
        total, passed, failed, suite_elapsed.as_secs_f64());

    // ─── Write JSON Report ──────────────────────────────────────────────

    let now = Utc::now();
    let report = BenchReport {
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        version: env!("CARGO_PKG_VERSION"),
        prng: "ChaCha8Rng",
        n_runs_per_scenario: cli.runs,
        summary: Summary {
            total,
            passed,
            failed,
            pass_rate: passed as f64 / total as f64,
        },
        scenarios: mc_reports,
    };

    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating {}", cli.out_dir.display()))?;
    let path = cli.out_dir.join(format!("bench-{}.json", now.timestamp_millis()));
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    println!("  Results saved to: {}\n", path.display());

    if failed > 0 {
        bail!("{failed} scenario(s) failed");
    }
    Ok(())
}
