//! Engine integration tests: determinism, cache behavior, weight
//! responsiveness, failure isolation, and cancellation.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use photo_picks_core::domain::{Assessor, Percentage, Photo, PhotoId};
use photo_picks_core::engine::{AssessorRegistry, BatchAnalyzer, BatchOptions, ScoreCache};
use photo_picks_test_support::{MockAssessor, MockProgressSink, SyntheticImageBuilder};
use tokio_util::sync::CancellationToken;

fn photos(n: usize) -> Vec<Photo> {
    (0..n)
        .map(|i| {
            let mut photo = SyntheticImageBuilder::uniform_gray(8, 8, 100);
            photo.id = PhotoId::new(format!("p{i:03}"));
            photo
        })
        .collect()
}

fn scripted(name: &'static str, scores: &[(usize, f64)]) -> Arc<MockAssessor> {
    let map: HashMap<PhotoId, f64> = scores
        .iter()
        .map(|(i, s)| (PhotoId::new(format!("p{i:03}")), *s))
        .collect();
    Arc::new(MockAssessor::scripted(name, map))
}

fn options(photo_concurrency: usize, percentage: f64) -> BatchOptions {
    BatchOptions {
        photo_concurrency,
        assessor_concurrency: photo_concurrency * 4,
        percentage: Percentage::new(percentage).unwrap(),
    }
}

#[tokio::test]
async fn test_determinism_across_concurrency_limits() {
    let mut reference: Option<Vec<(PhotoId, f64)>> = None;

    for concurrency in [1, 3, 16] {
        let scorer = scripted(
            "mix",
            &(0..20usize).map(|i| (i, f64::from((i % 7) as u32) / 7.0)).collect::<Vec<_>>(),
        );
        let registry = AssessorRegistry::new();
        registry.register(scorer).unwrap();

        let analyzer = BatchAnalyzer::new(Arc::new(ScoreCache::new()), options(concurrency, 100.0));
        let report = analyzer
            .run(photos(20), registry.snapshot(), CancellationToken::new())
            .await;

        let ranking: Vec<(PhotoId, f64)> = report
            .picks
            .iter()
            .map(|p| (p.id.clone(), p.total))
            .collect();

        match &reference {
            None => reference = Some(ranking),
            Some(expected) => assert_eq!(
                &ranking, expected,
                "ranking changed at concurrency {concurrency}"
            ),
        }
    }
}

#[tokio::test]
async fn test_disable_reenable_rerun_hits_cache() {
    let scorer = Arc::new(MockAssessor::returning("stable", 0.6));
    let registry = AssessorRegistry::new();
    registry.register(scorer.clone()).unwrap();

    let cache = Arc::new(ScoreCache::new());
    let analyzer = BatchAnalyzer::new(Arc::clone(&cache), options(4, 100.0));

    analyzer
        .run(photos(5), registry.snapshot(), CancellationToken::new())
        .await;
    assert_eq!(scorer.call_count(), 5);

    registry.set_enabled("stable", false).unwrap();
    registry.set_enabled("stable", true).unwrap();

    let report = analyzer
        .run(photos(5), registry.snapshot(), CancellationToken::new())
        .await;
    assert_eq!(scorer.call_count(), 5, "cached pairs must not re-run");
    assert_eq!(report.completed, 5);
}

#[tokio::test]
async fn test_weight_change_updates_totals_without_invocations() {
    let a = Arc::new(MockAssessor::returning("a", 0.8));
    let b = Arc::new(MockAssessor::returning("b", 0.2));
    let registry = AssessorRegistry::new();
    registry.register(a.clone()).unwrap();
    registry.register(b.clone()).unwrap();

    let cache = Arc::new(ScoreCache::new());
    let analyzer = BatchAnalyzer::new(Arc::clone(&cache), options(2, 100.0));

    let first = analyzer
        .run(photos(3), registry.snapshot(), CancellationToken::new())
        .await;
    assert_eq!(first.picks[0].total, 0.5);
    let calls_after_first = a.call_count() + b.call_count();
    assert_eq!(calls_after_first, 6);

    registry.set_weight("a", 2.0).unwrap();
    let second = analyzer
        .run(photos(3), registry.snapshot(), CancellationToken::new())
        .await;

    // (2 * 0.8 + 1 * 0.2) / 3
    assert!((second.picks[0].total - 0.6).abs() < 1e-9);
    assert_eq!(
        a.call_count() + b.call_count(),
        calls_after_first,
        "weight changes must not invoke assessors"
    );
}

#[tokio::test]
async fn test_aggregate_formula_weighted_mean() {
    let a = Arc::new(MockAssessor::returning("a", 0.8).with_weight(2.0));
    let b = Arc::new(MockAssessor::returning("b", 0.2));
    let registry = AssessorRegistry::new();
    registry.register(a).unwrap();
    registry.register(b).unwrap();

    let analyzer = BatchAnalyzer::new(Arc::new(ScoreCache::new()), options(1, 100.0));
    let report = analyzer
        .run(photos(1), registry.snapshot(), CancellationToken::new())
        .await;

    assert!((report.picks[0].total - 0.6).abs() < 1e-9);
}

#[tokio::test]
async fn test_top_k_boundaries() {
    let scorer = scripted("s", &(0..10usize).map(|i| (i, f64::from(i as u32) / 10.0)).collect::<Vec<_>>());
    let registry = AssessorRegistry::new();
    registry.register(scorer).unwrap();

    let analyzer = BatchAnalyzer::new(Arc::new(ScoreCache::new()), options(4, 20.0));
    let report = analyzer
        .run(photos(10), registry.snapshot(), CancellationToken::new())
        .await;
    assert_eq!(report.picks.len(), 2);
    assert_eq!(report.picks[0].id, PhotoId::new("p009"));

    let registry = AssessorRegistry::new();
    registry.register(Arc::new(MockAssessor::returning("s", 0.5))).unwrap();
    let analyzer = BatchAnalyzer::new(Arc::new(ScoreCache::new()), options(4, 1.0));
    let report = analyzer
        .run(photos(1), registry.snapshot(), CancellationToken::new())
        .await;
    assert_eq!(report.picks.len(), 1, "floor-then-max-1 keeps one pick");
}

#[tokio::test]
async fn test_failure_isolation() {
    let broken = Arc::new(MockAssessor::failing("broken"));
    let healthy = Arc::new(MockAssessor::returning("healthy", 0.9));
    let registry = AssessorRegistry::new();
    registry.register(broken.clone()).unwrap();
    registry.register(healthy.clone()).unwrap();

    let cache = Arc::new(ScoreCache::new());
    let analyzer = BatchAnalyzer::new(Arc::clone(&cache), options(4, 100.0));
    let report = analyzer
        .run(photos(4), registry.snapshot(), CancellationToken::new())
        .await;

    assert_eq!(report.completed, 4, "failures must not abort the batch");
    assert_eq!(report.failure_counts.get("broken"), Some(&4));
    for pick in &report.picks {
        assert_eq!(pick.per_assessor.get("broken"), Some(&0.0));
        assert_eq!(pick.per_assessor.get("healthy"), Some(&0.9));
        assert_eq!(pick.total, 0.45);
        assert_eq!(pick.failures, vec!["broken".to_owned()]);
    }

    // Failures never poison the cache: a rerun retries the broken assessor
    // but serves the healthy one from cache.
    let broken_calls = broken.call_count();
    analyzer
        .run(photos(4), registry.snapshot(), CancellationToken::new())
        .await;
    assert_eq!(broken.call_count(), broken_calls + 4);
    assert_eq!(healthy.call_count(), 4);
}

#[tokio::test]
async fn test_cancellation_mid_run() {
    let cancel = CancellationToken::new();
    // First invocation cancels the batch, then finishes normally: in-flight
    // work completes and is cached, nothing new launches.
    let tripwire = Arc::new(
        MockAssessor::returning("tripwire", 0.7)
            .cancelling(cancel.clone())
            .with_delay(Duration::from_millis(5)),
    );
    let registry = AssessorRegistry::new();
    registry.register(tripwire.clone()).unwrap();

    let cache = Arc::new(ScoreCache::new());
    let sink = Arc::new(MockProgressSink::new());
    let analyzer = BatchAnalyzer::new(Arc::clone(&cache), options(1, 100.0))
        .with_progress_sink(sink.clone());

    let report = analyzer.run(photos(10), registry.snapshot(), cancel).await;

    assert!(report.cancelled);
    assert_eq!(report.completed, 1);
    assert_eq!(tripwire.call_count(), 1, "no launches after cancellation");
    assert_eq!(report.picks.len(), 1);
    assert_eq!(cache.len(), 1, "in-flight result still cached");
    assert_eq!(sink.finished(), Some((1, true)));
}

#[tokio::test]
async fn test_cancelled_before_start_yields_empty_flagged_report() {
    let scorer = Arc::new(MockAssessor::returning("s", 0.5));
    let registry = AssessorRegistry::new();
    registry.register(scorer.clone()).unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let analyzer = BatchAnalyzer::new(Arc::new(ScoreCache::new()), options(4, 100.0));
    let report = analyzer.run(photos(5), registry.snapshot(), cancel).await;

    assert!(report.cancelled);
    assert_eq!(report.completed, 0);
    assert!(report.picks.is_empty());
    assert_eq!(scorer.call_count(), 0);
}

#[tokio::test]
async fn test_empty_candidate_list_yields_empty_report() {
    let registry = AssessorRegistry::new();
    registry.register(Arc::new(MockAssessor::returning("s", 0.5))).unwrap();

    let analyzer = BatchAnalyzer::new(Arc::new(ScoreCache::new()), options(4, 50.0));
    let report = analyzer
        .run(Vec::new(), registry.snapshot(), CancellationToken::new())
        .await;

    assert!(report.picks.is_empty());
    assert_eq!(report.completed, 0);
    assert_eq!(report.total, 0);
    assert!(!report.cancelled);
}

#[tokio::test]
async fn test_progress_counter_advances_to_total() {
    let registry = AssessorRegistry::new();
    registry.register(Arc::new(MockAssessor::returning("s", 0.5))).unwrap();

    let analyzer = BatchAnalyzer::new(Arc::new(ScoreCache::new()), options(3, 100.0));
    let progress = analyzer.progress();
    assert_eq!(progress.snapshot(), (0, 0));

    analyzer
        .run(photos(7), registry.snapshot(), CancellationToken::new())
        .await;
    assert_eq!(progress.snapshot(), (7, 7));
}

#[tokio::test]
async fn test_mid_run_registry_mutation_does_not_affect_run() {
    let a = Arc::new(MockAssessor::returning("a", 1.0).with_delay(Duration::from_millis(2)));
    let registry = AssessorRegistry::new();
    registry.register(a.clone()).unwrap();

    let snapshot = registry.snapshot();
    // Mutations after the snapshot: disable the assessor and register a new
    // one. Neither may affect the in-flight run.
    registry.set_enabled("a", false).unwrap();
    registry
        .register(Arc::new(MockAssessor::returning("late", 0.1)))
        .unwrap();

    let analyzer = BatchAnalyzer::new(Arc::new(ScoreCache::new()), options(2, 100.0));
    let report = analyzer
        .run(photos(4), snapshot, CancellationToken::new())
        .await;

    assert_eq!(report.completed, 4);
    for pick in &report.picks {
        assert_eq!(pick.total, 1.0);
        assert!(!pick.per_assessor.contains_key("late"));
    }
}
