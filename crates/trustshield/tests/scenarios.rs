use std::sync::Arc;

use tempfile::tempdir;
use trustshield::engine::{CheckoutRequest, LoginRequest, PaymentRequest, ZeroTrustRequest};
use trustshield::events::{replay_scores, verdict_trace};
use trustshield::gates::{
    CartVerdict, CheckoutVerdict, GateVerdict, MfaVerdict, OtpVerdict,
};
use trustshield::signals::CartRule;
use trustshield::{
    EngineConfig, EngineError, PinnedRandom, RandomSource, SeededRandom, SubjectId, TrustEngine,
};

fn engine_with(config: EngineConfig, rng: impl RandomSource + 'static) -> TrustEngine {
    TrustEngine::builder(config)
        .random(Arc::new(rng))
        .build()
        .expect("engine")
}

fn login_request(ip: &str) -> LoginRequest {
    LoginRequest {
        username: "alice".to_string(),
        password: "secret".to_string(),
        typing_sample: "the quick brown fox jumps".to_string(),
        ip: ip.to_string(),
        user_agent: Some("Mozilla/5.0 (X11; Linux x86_64)".to_string()),
    }
}

fn log_in(engine: &TrustEngine) -> String {
    let session = engine.open_session();
    let outcome = engine.login(&session, &login_request("10.0.0.1")).expect("login");
    if outcome.verdict == MfaVerdict::RequireOtp {
        let otp = engine.submit_otp(&session, "123456").expect("otp");
        assert_eq!(otp.verdict, OtpVerdict::Verified);
    }
    session
}

fn defaults() -> CheckoutRequest {
    let config = EngineConfig::default();
    CheckoutRequest {
        shipping: config.checkout.default_shipping,
        payment: config.checkout.default_payment,
        password: None,
    }
}

#[test]
fn changed_checkout_details_need_the_password() {
    let engine = engine_with(EngineConfig::default(), PinnedRandom::low());
    let session = log_in(&engine);
    assert_eq!(engine.global_score().score, 73);
    engine.add_to_cart(&session, "phone-case").expect("add");

    let mut changed = defaults();
    changed.shipping = "42 Elsewhere Rd".to_string();

    let pending = engine.checkout(&session, &changed).expect("checkout");
    assert_eq!(pending.verdict, CheckoutVerdict::PendingReauth);
    assert!(pending.changes.shipping && !pending.changes.payment);
    assert_eq!(pending.global.score, 73);
    let snapshot = engine.session_snapshot(&session).expect("snapshot");
    assert!(snapshot.checkout.pending_reauth);
    assert_eq!(snapshot.shopping.items_in_cart, 1);

    changed.password = Some("wrong".to_string());
    let failed = engine.checkout(&session, &changed).expect("checkout");
    assert_eq!(failed.verdict, CheckoutVerdict::Failed);
    assert_eq!(failed.global.score, 65);
    assert!(engine.session_snapshot(&session).expect("snapshot").checkout.pending_reauth);

    changed.password = Some("password123".to_string());
    let completed = engine.checkout(&session, &changed).expect("checkout");
    assert_eq!(completed.verdict, CheckoutVerdict::Completed);
    assert_eq!(completed.order_total, Some(25));
    assert_eq!(completed.global.score, 70);

    let snapshot = engine.session_snapshot(&session).expect("snapshot");
    assert!(!snapshot.checkout.pending_reauth);
    assert_eq!(snapshot.checkout.original_shipping, "42 Elsewhere Rd");
    assert!(snapshot.shopping.is_empty());

    // The confirmed address is now the original one.
    engine.add_to_cart(&session, "usb-c-cable").expect("add");
    changed.password = None;
    let direct = engine.checkout(&session, &changed).expect("checkout");
    assert_eq!(direct.verdict, CheckoutVerdict::Completed);
    assert!(!direct.changes.any());
}

#[test]
fn luxury_only_cart_locks_on_threshold() {
    let mut config = EngineConfig::default();
    config.thresholds.cart_warn_value = 1_000_000;
    config.thresholds.cart_lock_value = 1_000_000;
    let engine = engine_with(config, PinnedRandom::low());
    let session = log_in(&engine);

    for _ in 0..5 {
        let outcome = engine.add_to_cart(&session, "dslr-camera").expect("add");
        assert!(outcome.findings.is_empty());
    }
    let sixth = engine.add_to_cart(&session, "dslr-camera").expect("add");
    assert_eq!(sixth.verdict, CartVerdict::Added);
    assert_eq!(sixth.findings.len(), 1);
    assert_eq!(sixth.findings[0].rule, CartRule::LuxuryOnly);
    assert!(sixth.shopping.locked);
    assert_eq!(sixth.global.score, 61);

    let seventh = engine.add_to_cart(&session, "usb-c-cable").expect("add");
    assert_eq!(seventh.verdict, CartVerdict::Blocked);
    assert_eq!(seventh.global.score, 61);
}

#[test]
fn value_lock_holds_until_checkout_completes() {
    let engine = engine_with(EngineConfig::default(), PinnedRandom::low());
    let session = log_in(&engine);

    let locked = engine.add_to_cart(&session, "smart-tv-65").expect("add");
    assert!(locked.shopping.locked);
    let rules: Vec<_> = locked.findings.iter().map(|f| f.rule).collect();
    assert_eq!(rules, vec![CartRule::HighValue, CartRule::ValueLock]);
    // 73 - 8 (high value) - 15 (value lock)
    assert_eq!(locked.global.score, 50);

    for _ in 0..2 {
        let blocked = engine.add_to_cart(&session, "usb-c-cable").expect("add");
        assert_eq!(blocked.verdict, CartVerdict::Blocked);
        assert!(blocked.shopping.locked);
        assert_eq!(blocked.shopping.items_in_cart, 1);
    }

    let order = engine.checkout(&session, &defaults()).expect("checkout");
    assert_eq!(order.verdict, CheckoutVerdict::Completed);
    assert_eq!(order.order_total, Some(900));
    assert_eq!(order.global.score, 53);

    let reopened = engine.add_to_cart(&session, "usb-c-cable").expect("add");
    assert_eq!(reopened.verdict, CartVerdict::Added);
    assert!(!reopened.shopping.locked);
    assert!(!reopened.shopping.high_value_warned);
    assert_eq!(reopened.shopping.cart_value, 15);

    engine
        .add_to_cart(&session, "noise-cancelling-headphones")
        .expect("add");
    let warned_again = engine
        .add_to_cart(&session, "noise-cancelling-headphones")
        .expect("add");
    assert_eq!(warned_again.shopping.cart_value, 515);
    assert_eq!(warned_again.findings.len(), 1);
    assert_eq!(warned_again.findings[0].rule, CartRule::HighValue);
    assert!(!warned_again.shopping.locked);
    assert_eq!(warned_again.global.score, 45);
}

#[test]
fn high_value_warning_fires_once_per_cart() {
    let engine = engine_with(EngineConfig::default(), PinnedRandom::low());
    let session = log_in(&engine);

    engine.add_to_cart(&session, "noise-cancelling-headphones").expect("add");
    let warned = engine
        .add_to_cart(&session, "noise-cancelling-headphones")
        .expect("add");
    assert_eq!(warned.shopping.cart_value, 500);
    assert!(warned.findings.is_empty());

    let over = engine.add_to_cart(&session, "usb-c-cable").expect("add");
    assert_eq!(over.findings.len(), 1);
    assert_eq!(over.findings[0].rule, CartRule::HighValue);
    assert!(over.shopping.high_value_warned);
    assert!(!over.shopping.locked);

    let again = engine.add_to_cart(&session, "usb-c-cable").expect("add");
    assert!(again.findings.is_empty());
}

#[test]
fn sessions_are_scored_independently() {
    let engine = engine_with(EngineConfig::default(), PinnedRandom::low());
    let steady = log_in(&engine);

    let hurried = engine.open_session();
    let mut request = login_request("10.0.0.2");
    request.typing_sample = "hi".to_string();
    let outcome = engine.login(&hurried, &request).expect("login");
    assert_eq!(outcome.verdict, MfaVerdict::RequireOtp);
    assert_eq!(outcome.session_score, 50);

    assert_eq!(engine.session_snapshot(&steady).expect("snapshot").trust_score, 85);
    assert!(engine.session_snapshot(&hurried).expect("snapshot").awaiting_otp);
}

#[test]
fn concurrent_adds_on_one_session_are_serialised() {
    let engine = engine_with(EngineConfig::default(), SeededRandom::new(3));
    let session = log_in(&engine);

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                engine.add_to_cart(&session, "usb-c-cable").expect("add");
            });
        }
    });

    let snapshot = engine.session_snapshot(&session).expect("snapshot");
    assert_eq!(snapshot.shopping.items_in_cart, 8);
    assert_eq!(snapshot.shopping.cart_value, 120);
}

#[test]
fn audit_log_replays_to_current_scores() {
    let engine = engine_with(EngineConfig::default(), SeededRandom::new(11));
    let session = log_in(&engine);
    engine.add_to_cart(&session, "smartwatch").expect("add");
    engine.add_to_cart(&session, "gaming-laptop").expect("add");
    engine.add_to_cart(&session, "usb-c-cable").expect("add");
    engine
        .run_zero_trust_check(&ZeroTrustRequest {
            user_id: "user_456".to_string(),
            device_id: "device_123".to_string(),
            location: "New York".to_string(),
            current_location: Some("New York, USA".to_string()),
        })
        .expect("zero trust");
    engine
        .record_payment(&PaymentRequest {
            customer: "bob".to_string(),
            amount_cents: 1_250,
            payment_method: "4111 1111 1111 1111".to_string(),
        })
        .expect("payment");

    let events = engine.audit_events();
    let replayed = replay_scores(&events, |_| 70);
    let global = SubjectId::global();
    let subject = SubjectId::session(&session);
    assert_eq!(replayed.get(&global).copied(), Some(engine.global_score().score));
    assert_eq!(
        replayed.get(&subject).copied(),
        Some(engine.session_snapshot(&session).expect("snapshot").trust_score)
    );

    let trace = verdict_trace(&events, &subject);
    assert!(matches!(trace[0], GateVerdict::Mfa(_)));
    let shopping: Vec<_> = trace
        .iter()
        .filter(|verdict| matches!(verdict, GateVerdict::Shopping(_)))
        .collect();
    assert_eq!(
        shopping,
        vec![
            &GateVerdict::Shopping(CartVerdict::Added),
            &GateVerdict::Shopping(CartVerdict::Added),
            &GateVerdict::Shopping(CartVerdict::Blocked),
        ]
    );
}

#[tokio::test]
async fn firmware_scan_recovers_and_remembers() {
    let home = tempdir().expect("tempdir");
    let dir = home.path().join("firmware");
    std::fs::create_dir_all(&dir).expect("mkdir");
    std::fs::write(dir.join("baseline_firmware.bin"), b"trusted image v1").expect("write");
    std::fs::write(dir.join("lojax_modified.bin"), b"trusted image v1 + implant").expect("write");
    std::fs::write(dir.join("clean_modified.bin"), b"trusted image v1").expect("write");

    let engine = TrustEngine::builder(EngineConfig::default())
        .home(home.path())
        .random(Arc::new(PinnedRandom::low()))
        .build()
        .expect("engine");

    let first = engine.run_firmware_scan().await.expect("scan");
    let labels: Vec<_> = first
        .report
        .artifacts
        .iter()
        .map(|a| a.artifact.as_str())
        .collect();
    assert_eq!(labels, vec!["clean", "lojax"]);
    assert_eq!(first.report.recovered(), 1);
    assert_eq!(first.report.unrecoverable(), 0);
    // 70 + 1 (safe) + 5 (recovered)
    assert_eq!(first.global.score, 76);
    assert_eq!(
        std::fs::read(dir.join("lojax_modified.bin")).expect("read"),
        b"trusted image v1"
    );

    let second = engine.run_firmware_scan().await.expect("scan");
    assert_eq!(second.report.recovered(), 0);
    let lojax = &second.report.artifacts[1];
    assert_eq!(lojax.previous_scan, firmware::IntegrityStatus::Safe);
    assert_eq!(lojax.prior_status, firmware::IntegrityStatus::Safe);
    assert_eq!(second.global.score, 78);

    let scanned = engine
        .audit_events()
        .iter()
        .filter(|event| event.kind() == "firmware_scanned")
        .count();
    assert_eq!(scanned, 4);
}

#[tokio::test]
async fn firmware_scan_without_baseline_fails_whole_scan() {
    let home = tempdir().expect("tempdir");
    let engine = TrustEngine::builder(EngineConfig::default())
        .home(home.path())
        .build()
        .expect("engine");

    let result = engine.run_firmware_scan().await;
    assert!(matches!(result, Err(EngineError::Firmware(_))));
    assert_eq!(engine.global_score().score, 70);
    assert!(engine.audit_events().is_empty());
}
