// Copyright 2026 Hypermesh Foundation. All rights reserved.
// V&V Scorecard Engine - Simulated Trend Series

use rand::Rng;

/// One point per month for the chart cards.
pub const DEFAULT_POINTS: usize = 12;

const START_FLOOR: f64 = 0.7;
const START_SPREAD: f64 = 0.3;
const STEP_NOISE: f64 = 0.15;
/// Fraction of the gap to `current` closed on every step.
const PULL: f64 = 0.05;

/// Simulated history that drifts toward `current` and ends exactly on it.
/// Points are never negative.
pub fn trend<R: Rng>(current: f64, points: usize, rng: &mut R) -> Vec<f64> {
    if points == 0 {
        return Vec::new();
    }
    let mut series = Vec::with_capacity(points);
    let mut value = current * (START_FLOOR + rng.gen::<f64>() * START_SPREAD);

    for _ in 0..points {
        series.push(value.max(0.0));
        value += (rng.gen::<f64>() - 0.5) * (current * STEP_NOISE);
        value = value * (1.0 - PULL) + current * PULL;
    }

    if let Some(last) = series.last_mut() {
        *last = current.max(0.0);
    }
    series
}
