use imsconf_carrier::platform::mock::{
    Fault, MockBroker, MockCarrierConfig, MockSubscriptions, OverrideShape,
};
use imsconf_carrier::{
    failure_message, ApplyError, ApplyGuard, ApplyMode, ApplyPipeline, ApplyStatus,
    GuardDecision, PipelineConfig,
};
use imsconf_storage::FeatureStore;
use imsconf_types::{keys, Bundle, Configuration, Feature, SubId};
use std::sync::Arc;

const BUILD: i32 = 42;

struct Harness {
    pipeline: ApplyPipeline,
    broker: Arc<MockBroker>,
    carrier: Arc<MockCarrierConfig>,
    subscriptions: Arc<MockSubscriptions>,
}

fn harness(sub_ids: &[i32]) -> Harness {
    let broker = Arc::new(MockBroker::ready());
    let carrier =
        Arc::new(MockCarrierConfig::new(OverrideShape::TwoArg).requiring_identity(broker.clone()));
    let subscriptions = Arc::new(MockSubscriptions::with_ids(sub_ids));
    let pipeline = ApplyPipeline::new(
        PipelineConfig::new(BUILD, 10_001),
        FeatureStore::open_in_memory().unwrap(),
        broker.clone(),
        carrier.clone(),
        subscriptions.clone(),
    );
    Harness {
        pipeline,
        broker,
        carrier,
        subscriptions,
    }
}

fn stamped(version: i32) -> Bundle {
    let mut b = Bundle::new();
    b.set_config_version(version);
    b
}

// ── Guard ─────────────────────────────────────────────────────────

#[test]
fn guard_decides_on_stamp_only() {
    let guard = ApplyGuard::new(BUILD);
    assert_eq!(guard.decide(&stamped(42)), GuardDecision::Current);
    assert_eq!(
        guard.decide(&stamped(41)),
        GuardDecision::Stale {
            active_version: Some(41)
        }
    );
    assert_eq!(
        guard.decide(&Bundle::new()),
        GuardDecision::Stale {
            active_version: None
        }
    );
}

#[test]
fn current_stamp_makes_zero_privileged_calls() {
    let h = harness(&[1]);
    h.carrier.set_active(SubId::new(1), stamped(42));

    let status = h
        .pipeline
        .apply(SubId::new(1), &Configuration::defaults(), ApplyMode::IfStale)
        .unwrap();

    assert_eq!(status, ApplyStatus::AlreadyCurrent);
    assert_eq!(h.broker.starts(), 0);
    assert!(h.carrier.calls().is_empty());
}

#[test]
fn stale_stamp_applies_once_and_restamps() {
    let h = harness(&[1]);
    h.carrier.set_active(SubId::new(1), stamped(41));

    let status = h
        .pipeline
        .apply(SubId::new(1), &Configuration::defaults(), ApplyMode::IfStale)
        .unwrap();

    assert_eq!(status, ApplyStatus::Applied);
    assert_eq!(h.carrier.calls().len(), 1);
    assert_eq!(h.broker.starts(), 1);
    assert_eq!(h.broker.stops(), 1);
    let active = h.carrier.active(SubId::new(1)).unwrap();
    assert_eq!(active.config_version(), Some(42));
}

#[test]
fn unreadable_active_config_counts_as_stale() {
    let h = harness(&[1]);
    h.carrier.set_active(SubId::new(1), stamped(42));
    h.carrier.set_fail_reads(true);

    let status = h
        .pipeline
        .apply(SubId::new(1), &Configuration::defaults(), ApplyMode::IfStale)
        .unwrap();
    assert_eq!(status, ApplyStatus::Applied);
}

#[test]
fn forced_apply_ignores_current_stamp() {
    let h = harness(&[1]);
    h.carrier.set_active(SubId::new(1), stamped(42));

    let status = h
        .pipeline
        .apply(
            SubId::new(1),
            &Configuration::new().with(Feature::Ut, true),
            ApplyMode::Force,
        )
        .unwrap();

    assert_eq!(status, ApplyStatus::Applied);
    assert_eq!(h.carrier.reads(), 0);
    let active = h.carrier.active(SubId::new(1)).unwrap();
    assert_eq!(active.get_bool(keys::CARRIER_SUPPORTS_SS_OVER_UT), Some(true));
}

// ── Settings screen path ──────────────────────────────────────────

#[test]
fn save_and_apply_persists_then_applies() {
    let h = harness(&[3]);
    let config = Configuration::new()
        .with(Feature::Nr5g, true)
        .with(Feature::CarrierName, "Example");

    let result = h.pipeline.save_and_apply(SubId::new(3), &config);
    assert_eq!(failure_message(&result), None);

    let saved = h.pipeline.store().load(SubId::new(3)).unwrap().unwrap();
    assert!(saved.is_enabled(Feature::Nr5g));
    let active = h.carrier.active(SubId::new(3)).unwrap();
    assert_eq!(active.get_string(keys::CARRIER_NAME), Some("Example"));
}

#[test]
fn save_and_apply_reports_a_message_on_failure() {
    let h = harness(&[3]);
    h.broker.set_running(false);

    let result = h
        .pipeline
        .save_and_apply(SubId::new(3), &Configuration::defaults());
    assert_eq!(
        failure_message(&result).as_deref(),
        Some("privilege broker is not running")
    );
    assert!(h.pipeline.store().load(SubId::new(3)).unwrap().is_some());
}

// ── Boot path ─────────────────────────────────────────────────────

#[test]
fn reapply_without_saved_config_does_nothing() {
    let h = harness(&[1]);
    assert_eq!(
        h.pipeline.reapply_saved(SubId::new(1)).unwrap(),
        ApplyStatus::NotConfigured
    );
    assert_eq!(h.carrier.reads(), 0);
    assert!(h.carrier.calls().is_empty());
}

#[test]
fn reapply_uses_guard() {
    let h = harness(&[1]);
    h.pipeline
        .store()
        .save(SubId::new(1), &Configuration::defaults())
        .unwrap();

    assert_eq!(
        h.pipeline.reapply_saved(SubId::new(1)).unwrap(),
        ApplyStatus::Applied
    );
    assert_eq!(
        h.pipeline.reapply_saved(SubId::new(1)).unwrap(),
        ApplyStatus::AlreadyCurrent
    );
    assert_eq!(h.carrier.calls().len(), 1);
}

#[test]
fn reapply_falls_back_to_config_saved_for_all() {
    let h = harness(&[1, 2]);
    h.pipeline
        .store()
        .save(SubId::ALL, &Configuration::new().with(Feature::Nr5g, true))
        .unwrap();

    for raw in [1, 2] {
        assert_eq!(
            h.pipeline.reapply_saved(SubId::new(raw)).unwrap(),
            ApplyStatus::Applied
        );
    }

    let calls = h.carrier.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].sub_id, SubId::new(1));
    assert_eq!(calls[1].sub_id, SubId::new(2));
    for call in calls {
        let bundle = call.overrides.unwrap();
        assert_eq!(
            bundle.get_int_array(keys::CARRIER_NR_AVAILABILITIES),
            Some(&[keys::NR_AVAILABILITY_NSA, keys::NR_AVAILABILITY_SA][..])
        );
        assert!(!bundle.contains_key(keys::CARRIER_NAME_OVERRIDE));
        assert_eq!(bundle.config_version(), Some(BUILD));
    }

    // Second boot: already current, no more writes.
    assert_eq!(
        h.pipeline.reapply_saved(SubId::new(1)).unwrap(),
        ApplyStatus::AlreadyCurrent
    );
    assert_eq!(h.carrier.calls().len(), 2);
}

#[test]
fn own_record_wins_over_config_saved_for_all() {
    let h = harness(&[1]);
    h.pipeline
        .store()
        .save(SubId::ALL, &Configuration::new().with(Feature::Nr5g, true))
        .unwrap();
    h.pipeline
        .store()
        .save(
            SubId::new(1),
            &Configuration::new()
                .with(Feature::Nr5g, false)
                .with(Feature::CarrierName, "Own"),
        )
        .unwrap();

    h.pipeline.reapply_saved(SubId::new(1)).unwrap();

    let bundle = h.carrier.calls()[0].overrides.clone().unwrap();
    assert!(!bundle.contains_key(keys::CARRIER_NR_AVAILABILITIES));
    assert_eq!(bundle.get_string(keys::CARRIER_NAME), Some("Own"));
}

// ── All subscriptions ─────────────────────────────────────────────

#[test]
fn sentinel_applies_to_every_active_subscription() {
    let h = harness(&[1, 2]);
    let config = Configuration::new().with(Feature::CarrierName, "Ignored");

    let status = h.pipeline.apply(SubId::ALL, &config, ApplyMode::Force).unwrap();
    assert_eq!(status, ApplyStatus::Applied);

    let targets: Vec<SubId> = h.carrier.calls().iter().map(|c| c.sub_id).collect();
    assert_eq!(targets, vec![SubId::new(1), SubId::new(2)]);
    for call in h.carrier.calls() {
        let bundle = call.overrides.unwrap();
        assert!(!bundle.contains_key(keys::CARRIER_NAME));
    }
}

#[test]
fn sentinel_attempts_all_and_reports_first_failure() {
    let h = harness(&[1, 2, 3]);
    h.carrier
        .inject_fault(SubId::new(2), Fault::Reject("sim locked".into()));

    let err = h
        .pipeline
        .apply(SubId::ALL, &Configuration::defaults(), ApplyMode::Force)
        .unwrap_err();
    assert!(err.to_string().contains("sim locked"));
    assert!(h.carrier.active(SubId::new(1)).is_some());
    assert!(h.carrier.active(SubId::new(3)).is_some());
}

#[test]
fn sentinel_without_subscriptions_fails() {
    let h = harness(&[]);
    let err = h
        .pipeline
        .apply(SubId::ALL, &Configuration::defaults(), ApplyMode::Force)
        .unwrap_err();
    assert!(matches!(err, ApplyError::NoActiveSubscriptions));
}

#[test]
fn subscription_service_failure_surfaces() {
    let h = harness(&[1]);
    h.subscriptions.set_fail(true);
    let err = h.pipeline.reset(SubId::ALL).unwrap_err();
    assert!(matches!(err, ApplyError::Platform(_)));
}

// ── Reset and dump ────────────────────────────────────────────────

#[test]
fn reset_clears_override() {
    let h = harness(&[1]);
    h.pipeline
        .apply(SubId::new(1), &Configuration::defaults(), ApplyMode::Force)
        .unwrap();
    assert!(h.carrier.active(SubId::new(1)).is_some());

    h.pipeline.reset(SubId::new(1)).unwrap();
    assert_eq!(h.carrier.active(SubId::new(1)), None);
    assert_eq!(h.broker.stops(), 2);
}

#[test]
fn current_bundle_reads_active_value() {
    let h = harness(&[1]);
    h.carrier.set_active(SubId::new(1), stamped(17));
    let bundle = h
        .pipeline
        .current_bundle(SubId::new(1), keys::CONFIG_VERSION)
        .unwrap();
    assert_eq!(bundle.config_version(), Some(17));
}

#[test]
fn pipeline_config_from_json() {
    let config: PipelineConfig =
        serde_json::from_str(r#"{"build_version": 31, "delegate_uid": 10234}"#).unwrap();
    assert_eq!(config.build_version, 31);
    assert_eq!(config.delegate_uid, 10234);
}
