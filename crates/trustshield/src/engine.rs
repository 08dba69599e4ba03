//! Primary facade for the trust engine.
//!
//! Every inbound operation goes through [`TrustEngine`]: it evaluates
//! signals, moves scores, consults gates and records each step in the
//! audit trail before returning a verdict and the updated score.

pub mod admin;
pub mod commerce;
pub mod login;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use utoipa::ToSchema;

use firmware::FirmwareMonitor;

use crate::admin::{AdminLogSource, SimulatedAdminLogs};
use crate::bus::Bus;
use crate::catalog::{Catalog, CatalogItem};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::events::{AuditEvent, AuditRecord, AuditSink, AuditTrail, MemoryAuditLog};
use crate::gates::Verifiers;
use crate::identity::DeviceRegistry;
use crate::payments::PaymentLedger;
use crate::random::{DeltaRange, RandomSource, ThreadRandom};
use crate::score::{ScoreAggregator, ScoreBand, ScoreEvent, ScoreReason, SubjectId};
use crate::session::{SessionManager, SessionSnapshot, SessionState};

pub use admin::{
    AdminLogsOutcome, FirmwareOutcome, HoneypotOutcome, HoneypotRequest, PaymentOutcome,
    PaymentRequest, ZeroTrustOutcome, ZeroTrustRequest,
};
pub use commerce::{CartOutcome, CheckoutOutcome, CheckoutRequest};
pub use login::{LoginOutcome, LoginRequest, LogoutOutcome, OtpOutcome};

/// A score with its display band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScoreView {
    pub score: u8,
    pub band: ScoreBand,
}

impl ScoreView {
    pub fn of(score: u8) -> Self {
        Self {
            score,
            band: ScoreBand::of(score),
        }
    }
}

pub struct TrustEngine {
    config: EngineConfig,
    rng: Arc<dyn RandomSource>,
    verifiers: Verifiers,
    scores: ScoreAggregator,
    registry: DeviceRegistry,
    sessions: SessionManager,
    catalog: Catalog,
    firmware: Arc<FirmwareMonitor>,
    admin_logs: Arc<dyn AdminLogSource>,
    payments: PaymentLedger,
    trail: AuditTrail,
    /// Serialises admin-side decision sequences on the global subject.
    admin_lock: Mutex<()>,
}

pub struct TrustEngineBuilder {
    config: EngineConfig,
    home: PathBuf,
    rng: Option<Arc<dyn RandomSource>>,
    verifiers: Option<Verifiers>,
    admin_logs: Option<Arc<dyn AdminLogSource>>,
    lock_wait: Option<Duration>,
}

impl TrustEngineBuilder {
    /// Directory relative firmware paths resolve against.
    pub fn home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = home.into();
        self
    }

    pub fn random(mut self, rng: Arc<dyn RandomSource>) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn verifiers(mut self, verifiers: Verifiers) -> Self {
        self.verifiers = Some(verifiers);
        self
    }

    pub fn admin_logs(mut self, source: Arc<dyn AdminLogSource>) -> Self {
        self.admin_logs = Some(source);
        self
    }

    pub fn session_lock_wait(mut self, wait: Duration) -> Self {
        self.lock_wait = Some(wait);
        self
    }

    pub fn build(self) -> EngineResult<TrustEngine> {
        self.config.validate()?;
        let config = self.config;

        let log = Arc::new(MemoryAuditLog::new(config.audit.capacity));
        let bus = Bus::new(config.audit.bus_capacity);
        let trail = AuditTrail::new(log, bus);
        let sink: Arc<dyn AuditSink> = Arc::new(trail.clone());

        let mut sessions = SessionManager::new(&config.sessions, &config.checkout);
        if let Some(wait) = self.lock_wait {
            sessions = sessions.with_lock_wait(wait);
        }

        let firmware = Arc::new(FirmwareMonitor::new(
            config.firmware.baseline_path(&self.home),
            config.firmware.artifact_set(&self.home),
        ));

        tracing::info!(
            "trust engine ready (global score {}, firmware baseline {})",
            config.scores.initial_global,
            firmware.baseline().display()
        );

        Ok(TrustEngine {
            rng: self.rng.unwrap_or_else(|| Arc::new(ThreadRandom)),
            verifiers: self
                .verifiers
                .unwrap_or_else(|| Verifiers::from_config(&config)),
            scores: ScoreAggregator::new(&config.scores, &config.sessions, sink),
            registry: DeviceRegistry::new(&config.sessions),
            sessions,
            catalog: Catalog::new(config.catalog.clone()),
            firmware,
            admin_logs: self
                .admin_logs
                .unwrap_or_else(|| Arc::new(SimulatedAdminLogs)),
            payments: PaymentLedger::new(config.audit.capacity),
            trail,
            admin_lock: Mutex::new(()),
            config,
        })
    }
}

impl TrustEngine {
    pub fn builder(config: EngineConfig) -> TrustEngineBuilder {
        TrustEngineBuilder {
            config,
            home: PathBuf::from("."),
            rng: None,
            verifiers: None,
            admin_logs: None,
            lock_wait: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &[CatalogItem] {
        self.catalog.items()
    }

    pub fn global_score(&self) -> ScoreView {
        ScoreView::of(self.scores.global_score())
    }

    pub fn score_history(&self, subject: &SubjectId) -> Vec<ScoreEvent> {
        self.scores.history(subject)
    }

    pub fn open_session(&self) -> String {
        let session_id = self.sessions.open();
        self.trail.record(AuditEvent::SessionOpened {
            id: uuid::Uuid::new_v4(),
            timestamp: std::time::SystemTime::now(),
            session_id: session_id.clone(),
        });
        tracing::debug!("opened session {session_id}");
        session_id
    }

    pub fn session_snapshot(&self, session_id: &str) -> EngineResult<SessionSnapshot> {
        self.sessions.with_session(session_id, |state| {
            Ok(state.snapshot(self.scores.score(&SubjectId::session(&state.id))))
        })
    }

    pub fn audit_tail(&self, limit: usize) -> Vec<AuditRecord> {
        self.trail.log().tail(limit)
    }

    /// Up to `limit` records starting at `seq`, oldest first.
    pub fn audit_since(&self, seq: u64, limit: usize) -> Vec<AuditRecord> {
        let mut records = self.trail.log().since(seq);
        records.truncate(limit);
        records
    }

    pub fn audit_events(&self) -> Vec<AuditEvent> {
        self.trail.log().events()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuditRecord> {
        self.trail.bus().subscribe()
    }

    fn record(&self, event: AuditEvent) {
        self.trail.record(event);
    }

    /// Draws from `range` and applies it to `subject`.
    fn reward(&self, subject: &SubjectId, range: DeltaRange, reason: ScoreReason) -> ScoreEvent {
        let delta = range.draw(self.rng.as_ref());
        self.scores.apply(subject, delta, reason)
    }

    fn reward_global(&self, range: DeltaRange, reason: ScoreReason) -> ScoreEvent {
        self.reward(&SubjectId::global(), range, reason)
    }
}

fn require_logged_in(state: &SessionState) -> EngineResult<&str> {
    state
        .user
        .as_deref()
        .ok_or_else(|| EngineError::validation(format!("session {} is not logged in", state.id)))
}

fn require_text<'a>(value: &'a str, field: &str) -> EngineResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(EngineError::validation(format!("{field} must not be empty")))
    } else {
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::PinnedRandom;

    fn engine() -> TrustEngine {
        TrustEngine::builder(EngineConfig::default())
            .random(Arc::new(PinnedRandom::low()))
            .build()
            .expect("engine")
    }

    #[test]
    fn fresh_engine_is_healthy() {
        let engine = engine();
        assert_eq!(engine.global_score(), ScoreView::of(70));
        assert_eq!(engine.global_score().band, ScoreBand::Healthy);
        assert_eq!(engine.catalog().len(), 12);
    }

    #[test]
    fn open_session_is_audited() {
        let engine = engine();
        let id = engine.open_session();
        let snapshot = engine.session_snapshot(&id).expect("snapshot");
        assert_eq!(snapshot.trust_score, 70);
        assert!(snapshot.user.is_none());
        assert_eq!(engine.audit_events()[0].kind(), "session_opened");
    }

    #[test]
    fn audit_since_resumes_from_sequence() {
        let engine = engine();
        for _ in 0..4 {
            engine.open_session();
        }
        let seqs: Vec<u64> = engine.audit_since(1, 2).iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![1, 2]);
        assert_eq!(engine.audit_since(3, 10).len(), 1);
        assert!(engine.audit_since(9, 10).is_empty());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = EngineConfig::default();
        config.otp_length = 0;
        assert!(matches!(
            TrustEngine::builder(config).build(),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn require_text_trims() {
        assert_eq!(require_text("  abc ", "field").expect("text"), "abc");
        assert!(require_text("   ", "field").is_err());
    }
}
