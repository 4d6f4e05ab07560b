use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tempfile::tempdir;

use crate::engine::errors::ServiceError;
use crate::engine::history::CleanHistory;
use crate::engine::policy::PressureColor;
use crate::engine::preferences::{PreferencesFile, PreferencesPatch};
use crate::engine::reclaim::ReclaimEngine;
use crate::engine::service::MemoryService;
use crate::logging::Diagnostics;
use crate::test_helpers::fakes::{ScriptedSampler, StubReclaimer, snapshot_gb};

struct Fixture {
    service: MemoryService,
    sampler: Arc<ScriptedSampler>,
    reclaimer: Arc<StubReclaimer>,
}

fn fixture(dir: &Path, reclaimer: StubReclaimer) -> Fixture {
    let sampler = Arc::new(ScriptedSampler::new([]));
    let reclaimer = Arc::new(reclaimer);
    let engine = ReclaimEngine::new(sampler.clone(), reclaimer.clone(), Diagnostics::silent());
    let history = CleanHistory::new(dir.join("logs/clean.log"), Diagnostics::silent()).unwrap();
    let prefs = PreferencesFile::new(dir.join("config.json"), Diagnostics::silent());
    Fixture {
        service: MemoryService::new(engine, history, prefs, Diagnostics::silent()),
        sampler,
        reclaimer,
    }
}

fn enable_auto_clean(service: &MemoryService, threshold: f64) {
    service
        .update_preferences(&PreferencesPatch {
            auto_clean: Some(true),
            auto_clean_threshold: Some(threshold),
            ..Default::default()
        })
        .unwrap();
}

#[test]
fn status_classifies_against_warning_threshold() {
    let dir = tempdir().unwrap();
    let f = fixture(dir.path(), StubReclaimer::ok());

    f.sampler.push(snapshot_gb(14.0));
    let status = f.service.status().unwrap();
    assert_eq!(status.snapshot.percent_used(), 87.5);
    assert_eq!(status.color, PressureColor::High);
    assert!(status.over_warning);

    f.sampler.push(snapshot_gb(12.0));
    let status = f.service.status().unwrap();
    assert_eq!(status.color, PressureColor::Medium);
    assert!(!status.over_warning);
}

#[test]
fn successful_clean_is_recorded() {
    let dir = tempdir().unwrap();
    let f = fixture(dir.path(), StubReclaimer::ok());
    f.sampler.push(snapshot_gb(14.0));
    f.sampler.push(snapshot_gb(10.0));

    let result = f.service.clean().unwrap();
    assert!(result.success);
    assert_eq!(result.freed_gb, 4.0);

    let history = f.service.recent(10);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].before_percent, 87.5);
    assert_eq!(history[0].after_percent, 62.5);
    assert_eq!(history[0].freed_gb, 4.0);
}

#[test]
fn failed_clean_is_not_recorded() {
    let dir = tempdir().unwrap();
    let f = fixture(dir.path(), StubReclaimer::failing("access denied"));
    f.sampler.push(snapshot_gb(14.0));

    let result = f.service.clean().unwrap();
    assert!(!result.success);
    assert!(f.service.recent(10).is_empty());
}

#[test]
fn sample_failure_during_clean_is_an_error() {
    let dir = tempdir().unwrap();
    let f = fixture(dir.path(), StubReclaimer::ok());
    assert!(matches!(f.service.clean(), Err(ServiceError::Sample(_))));
    assert_eq!(f.reclaimer.calls(), 0);
}

#[test]
fn preferences_load_from_file_at_construction() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.json"), br#"{"warning_threshold": 60}"#).unwrap();
    let f = fixture(dir.path(), StubReclaimer::ok());

    assert_eq!(f.service.preferences().warning_threshold(), 60.0);
    f.sampler.push(snapshot_gb(10.0));
    assert!(f.service.status().unwrap().over_warning);
}

#[test]
fn preference_changes_are_saved() {
    let dir = tempdir().unwrap();
    let f = fixture(dir.path(), StubReclaimer::ok());

    f.service
        .set_preference("refresh_interval", &json!(9))
        .unwrap();
    let err = f
        .service
        .set_preference("warning_threshold", &json!(101))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let reloaded = PreferencesFile::new(dir.path().join("config.json"), Diagnostics::silent()).load();
    assert_eq!(reloaded.refresh_interval_secs(), 9.0);
    assert_eq!(reloaded.warning_threshold(), 85.0);
}

#[test]
fn auto_clean_disabled_never_cleans() {
    let dir = tempdir().unwrap();
    let f = fixture(dir.path(), StubReclaimer::ok());
    f.sampler.push(snapshot_gb(15.5));

    let tick = f.service.auto_clean_tick().unwrap();
    assert!(tick.cleaned.is_none());
    assert!(tick.status.over_warning);
    assert_eq!(f.reclaimer.calls(), 0);
}

#[test]
fn auto_clean_fires_once_per_crossing() {
    let dir = tempdir().unwrap();
    let f = fixture(dir.path(), StubReclaimer::ok());
    enable_auto_clean(&f.service, 80.0);

    // crossing: tick sample, clean before, clean after
    f.sampler.push(snapshot_gb(14.0));
    f.sampler.push(snapshot_gb(14.0));
    f.sampler.push(snapshot_gb(13.5));
    let tick = f.service.auto_clean_tick().unwrap();
    assert!(tick.cleaned.as_ref().unwrap().success);
    assert_eq!(f.reclaimer.calls(), 1);

    // still above: no second clean
    f.sampler.push(snapshot_gb(13.5));
    assert!(f.service.auto_clean_tick().unwrap().cleaned.is_none());
    assert_eq!(f.reclaimer.calls(), 1);

    // drop below, then cross again
    f.sampler.push(snapshot_gb(8.0));
    assert!(f.service.auto_clean_tick().unwrap().cleaned.is_none());
    f.sampler.push(snapshot_gb(13.0));
    f.sampler.push(snapshot_gb(13.0));
    f.sampler.push(snapshot_gb(11.0));
    assert!(f.service.auto_clean_tick().unwrap().cleaned.is_some());
    assert_eq!(f.reclaimer.calls(), 2);
    assert_eq!(f.service.recent(10).len(), 2);
}

#[test]
fn auto_clean_retries_after_sampling_failure() {
    let dir = tempdir().unwrap();
    let f = fixture(dir.path(), StubReclaimer::ok());
    enable_auto_clean(&f.service, 80.0);

    // tick sample succeeds, the clean's first sample does not
    f.sampler.push(snapshot_gb(14.0));
    let err = f.service.auto_clean_tick().unwrap_err();
    assert!(matches!(err, ServiceError::Sample(_)));
    assert_eq!(f.reclaimer.calls(), 0);

    f.sampler.push(snapshot_gb(14.0));
    f.sampler.push(snapshot_gb(14.0));
    f.sampler.push(snapshot_gb(12.0));
    let tick = f.service.auto_clean_tick().unwrap();
    assert!(tick.cleaned.as_ref().unwrap().success);
    assert_eq!(f.reclaimer.calls(), 1);
    assert_eq!(f.service.recent(10).len(), 1);
}

#[test]
fn failed_auto_clean_is_not_repeated_while_above() {
    let dir = tempdir().unwrap();
    let f = fixture(dir.path(), StubReclaimer::failing("access denied"));
    enable_auto_clean(&f.service, 80.0);

    f.sampler.push(snapshot_gb(14.0));
    f.sampler.push(snapshot_gb(14.0));
    let tick = f.service.auto_clean_tick().unwrap();
    assert!(!tick.cleaned.unwrap().success);

    f.sampler.push(snapshot_gb(14.0));
    assert!(f.service.auto_clean_tick().unwrap().cleaned.is_none());
    assert_eq!(f.reclaimer.calls(), 1);
}

#[test]
fn auto_clean_below_threshold_does_nothing() {
    let dir = tempdir().unwrap();
    let f = fixture(dir.path(), StubReclaimer::ok());
    enable_auto_clean(&f.service, 90.0);

    f.sampler.push(snapshot_gb(14.0));
    let tick = f.service.auto_clean_tick().unwrap();
    assert!(tick.cleaned.is_none());
    assert_eq!(f.reclaimer.calls(), 0);
}

#[test]
fn concurrent_cleans_are_serialized_and_all_recorded() {
    let dir = tempdir().unwrap();
    let f = fixture(dir.path(), StubReclaimer::ok());
    for _ in 0..8 {
        f.sampler.push(snapshot_gb(12.0));
        f.sampler.push(snapshot_gb(10.0));
    }

    let service = Arc::new(f.service);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            std::thread::spawn(move || {
                for _ in 0..2 {
                    let result = service.clean().unwrap();
                    // each clean saw its own before/after pair
                    assert_eq!(result.freed_gb, 2.0);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(service.recent(100).len(), 8);
}
