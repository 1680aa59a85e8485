#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rust_decimal_macros::dec;
    use scorecard_engine::*;

    fn manual_entry() -> ManualEntry {
        ManualEntry {
            automated_tests: 120,
            total_tests: 150,
            passed_tests: 138,
            covered_lines: 41_000,
            total_lines: 50_000,
            defects_found: 90,
            regressions: 2,
            avg_resolution_days: 2.0,
            successful_builds: 48,
            total_builds: 50,
            ..ManualEntry::default()
        }
    }

    // ========== Engine Scenarios ==========

    #[test]
    fn test_code_coverage_at_good_threshold() {
        let catalog = MetricCatalog::iso29110();
        let engine = ScoreEngine::new(&catalog);
        assert_eq!(engine.classify(MetricId::CodeCoverage, 80.0), Ok(HealthTier::Healthy));
        assert_eq!(engine.normalize(MetricId::CodeCoverage, 80.0), Ok(100.0));
    }

    #[test]
    fn test_defect_density_at_warning_threshold() {
        let catalog = MetricCatalog::iso29110();
        let engine = ScoreEngine::new(&catalog);
        assert_eq!(engine.classify(MetricId::DefectDensity, 5.0), Ok(HealthTier::Warning));
        assert_eq!(engine.normalize(MetricId::DefectDensity, 5.0), Ok(50.0));
    }

    #[test]
    fn test_two_healthy_metrics_score_full() {
        let sample = MetricSample::from([
            (MetricId::CodeCoverage, 80.0),
            (MetricId::DefectDensity, 2.0),
        ]);
        let result = aggregate(&sample, &MetricCatalog::iso29110());
        assert_eq!(result.score, 100);
        assert_eq!(result.status, EffectivenessTier::Excellent);
        assert_eq!(result.status.label(), "EXCELLENT");
    }

    #[test]
    fn test_manual_automation_rate() {
        let catalog = MetricCatalog::iso29110();
        let sample = manual_entry().to_sample(&catalog).unwrap();
        assert_eq!(sample.get(MetricId::AutomationRate), Some(80.0));
        assert_eq!(
            ScoreEngine::new(&catalog).classify(MetricId::AutomationRate, 80.0),
            Ok(HealthTier::Healthy)
        );
    }

    #[test]
    fn test_unweighted_only_sample_scores_zero() {
        let sample = MetricSample::from([(MetricId::Traceability, 100.0)]);
        let result = aggregate(&sample, &MetricCatalog::iso29110());
        assert_eq!(result, EffectivenessResult::fallback());
    }

    // ========== Simulation Properties ==========

    #[test]
    fn test_simulation_is_deterministic_per_seed() {
        let profile = ProjectProfile::default();
        let a = simulate(&profile, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
        let b = simulate(&profile, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
        let c = simulate(&profile, &mut ChaCha8Rng::seed_from_u64(43)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_simulated_values_stay_in_catalog_range() {
        let catalog = MetricCatalog::iso29110();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for phase in ["si1", "si2", "si3", "si4", "si5", "si6"] {
            for integrity_level in 1..=4 {
                let profile = ProjectProfile {
                    project_size: 150.0,
                    team_size: 12,
                    phase: phase.parse().unwrap(),
                    integrity_level,
                };
                for _ in 0..50 {
                    let sample = simulate(&profile, &mut rng).unwrap();
                    for (id, value) in sample.iter() {
                        assert!(
                            validate_value(id, value, &catalog).is_ok(),
                            "{id} = {value} for {profile:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_rescaled_weights_give_same_score_on_simulated_samples() {
        let catalog = MetricCatalog::iso29110();
        let tenfold = catalog.rescaled(dec!(10)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(2026);
        for _ in 0..200 {
            let sample = simulate(&ProjectProfile::default(), &mut rng).unwrap();
            assert_eq!(
                aggregate(&sample, &catalog).score,
                aggregate(&sample, &tenfold).score
            );
        }
    }

    // ========== Report & Recommendations ==========

    #[test]
    fn test_every_flagged_metric_gets_a_recommendation() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..50 {
            let sample = simulate(&ProjectProfile::default(), &mut rng).unwrap();
            let card = Scorecard::new(MetricCatalog::iso29110(), sample);
            let report = card.report().unwrap();

            let flagged: Vec<_> = report
                .metrics
                .iter()
                .filter(|m| m.score.tier.needs_attention())
                .map(|m| (m.score.tier, Some(m.score.id)))
                .collect();
            let advised: Vec<_> = report
                .recommendations
                .iter()
                .map(|r| (r.severity, r.metric))
                .collect();

            if flagged.is_empty() {
                assert_eq!(advised, vec![(HealthTier::Healthy, None)]);
            } else {
                assert_eq!(advised, flagged);
            }
            assert_eq!(report.effectiveness, card.effectiveness());
        }
    }

    #[test]
    fn test_report_serializes_flat_cards() {
        let card = Scorecard::new(
            MetricCatalog::iso29110(),
            MetricSample::from([(MetricId::BuildStability, 90.0)]),
        );
        let json = serde_json::to_value(card.report().unwrap()).unwrap();
        let first = &json["metrics"][0];
        assert_eq!(first["id"], "buildStability");
        assert_eq!(first["tier"], "Warning");
        assert_eq!(first["title"], "Build Stability");
        assert_eq!(json["effectiveness"]["score"], 75);
    }

    // ========== Session Behavior ==========

    #[test]
    fn test_session_keeps_sample_on_rejected_input() {
        let catalog = MetricCatalog::iso29110();
        let mut card = Scorecard::new(catalog, MetricSample::new());
        card.submit_manual(&manual_entry()).unwrap();
        let accepted = card.sample().clone();

        let too_many_passes = ManualEntry { passed_tests: 151, ..manual_entry() };
        assert!(card.submit_manual(&too_many_passes).is_err());
        assert!(card.set_metric(MetricId::TestSuccess, -1.0).is_err());
        assert!(card.set_metric(MetricId::Dre, f64::INFINITY).is_err());
        assert_eq!(card.sample(), &accepted);
    }

    #[test]
    fn test_session_persists_and_restores() {
        let mut rng = ChaCha8Rng::seed_from_u64(77);
        let mut card = Scorecard::new(MetricCatalog::iso29110(), MetricSample::new());
        card.simulate(&ProjectProfile::default(), &mut rng).unwrap();

        let mut store = MemoryStore::new();
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 30, 0).unwrap();
        card.save(&mut store, now).unwrap();

        let loaded = load_snapshot(&store).unwrap().unwrap();
        assert_eq!(loaded.timestamp, now);
        assert_eq!(loaded.effectiveness, card.effectiveness().score);

        let restored = Scorecard::restore(
            MetricCatalog::iso29110(),
            &store,
            &ProjectProfile::default(),
            &mut ChaCha8Rng::seed_from_u64(0),
        )
        .unwrap();
        assert_eq!(restored.sample(), card.sample());
    }

    #[test]
    fn test_corrupt_snapshot_falls_back_to_simulation() {
        let mut store = MemoryStore::new();
        store.set_item(snapshot::METRICS_KEY, "[1, 2".to_string());
        store.set_item(snapshot::EFFECTIVENESS_KEY, "80".to_string());
        store.set_item(snapshot::TIMESTAMP_KEY, "2026-10-16T12:30:00.000Z".to_string());

        let profile = ProjectProfile::default();
        let restored = Scorecard::restore(
            MetricCatalog::iso29110(),
            &store,
            &profile,
            &mut ChaCha8Rng::seed_from_u64(3),
        )
        .unwrap();
        let expected = simulate(&profile, &mut ChaCha8Rng::seed_from_u64(3)).unwrap();
        assert_eq!(restored.sample(), &expected);
    }

    #[test]
    fn test_out_of_range_snapshot_falls_back_to_simulation() {
        let mut store = MemoryStore::new();
        store.set_item(
            snapshot::METRICS_KEY,
            r#"{"codeCoverage":-500.0,"defectDensity":99999.0}"#.to_string(),
        );
        store.set_item(snapshot::EFFECTIVENESS_KEY, "80".to_string());
        store.set_item(snapshot::TIMESTAMP_KEY, "2026-10-16T12:30:00.000Z".to_string());
        assert!(load_snapshot(&store).unwrap().is_some());

        let profile = ProjectProfile::default();
        let restored = Scorecard::restore(
            MetricCatalog::iso29110(),
            &store,
            &profile,
            &mut ChaCha8Rng::seed_from_u64(8),
        )
        .unwrap();
        let expected = simulate(&profile, &mut ChaCha8Rng::seed_from_u64(8)).unwrap();
        assert_eq!(restored.sample(), &expected);
        for (id, value) in restored.sample().iter() {
            assert!(validate_value(id, value, restored.catalog()).is_ok(), "{id} = {value}");
        }
    }

    #[test]
    fn test_trend_ends_on_current_value() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let sample = simulate(&ProjectProfile::default(), &mut rng).unwrap();
        for (id, value) in sample.iter() {
            let series = trend::trend(value, trend::DEFAULT_POINTS, &mut rng);
            assert_eq!(series.len(), 12);
            assert_eq!(series.last().copied(), Some(value), "{id}");
            assert!(series.iter().all(|v| *v >= 0.0));
        }
    }

    // ========== Configuration ==========

    #[test]
    fn test_huge_configured_weight_does_not_panic() {
        let json = r#"[
            {
                "id": "codeCoverage",
                "title": "Code Coverage",
                "unit": "%",
                "description": "Lines covered",
                "direction": "HigherIsBetter",
                "good_threshold": 80,
                "warning_threshold": 60,
                "weight": "1000000000000000000000000000"
            }
        ]"#;
        let catalog = MetricCatalog::from_json(json).unwrap();
        let sample = MetricSample::from([(MetricId::CodeCoverage, 80.0)]);

        assert_eq!(
            ScoreEngine::new(&catalog).try_aggregate(&sample),
            Err(ScoreError::Overflow(MetricId::CodeCoverage))
        );
        assert_eq!(aggregate(&sample, &catalog), EffectivenessResult::fallback());
        assert!(matches!(
            catalog.rescaled(dec!(100)),
            Err(CatalogError::WeightOverflow { id: MetricId::CodeCoverage, .. })
        ));
    }

    #[test]
    fn test_catalog_from_json_drives_engine() {
        let json = r#"[
            {
                "id": "regressions",
                "title": "Regressions",
                "unit": "cases",
                "description": "Regressions per release",
                "direction": "LowerIsBetter",
                "good_threshold": 0,
                "warning_threshold": 4,
                "weight": "1"
            }
        ]"#;
        let catalog = MetricCatalog::from_json(json).unwrap();
        let sample = MetricSample::from([
            (MetricId::Regressions, 2.0),
            (MetricId::CodeCoverage, 10.0),
        ]);
        let result = aggregate(&sample, &catalog);
        assert_eq!(result.score, 75);
        assert_eq!(result.metrics_used, 1);
        assert_eq!(result.status, EffectivenessTier::Good);
    }
}
