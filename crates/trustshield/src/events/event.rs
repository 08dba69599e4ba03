//! Canonical audit event types.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use firmware::{ArtifactReport, IntegrityStatus, ScanAction};

use crate::gates::GateVerdict;
use crate::score::{ScoreEvent, ScoreReason, SubjectId};
use crate::signals::Signal;

/// An entry in the audit trail.
///
/// Events are append-only. Per subject they appear in the order the
/// signals and gates were invoked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// A subject's score moved.
    ScoreChanged {
        id: Uuid,
        timestamp: SystemTime,
        subject_id: SubjectId,
        reason: ScoreReason,
        delta: i32,
        applied: i32,
        score_after: u8,
    },
    /// A signal evaluator produced a verdict.
    SignalEvaluated {
        id: Uuid,
        timestamp: SystemTime,
        subject_id: SubjectId,
        signal: Signal,
        detail: Option<String>,
    },
    /// A gate reached a decision.
    GateDecided {
        id: Uuid,
        timestamp: SystemTime,
        subject_id: SubjectId,
        verdict: GateVerdict,
    },
    /// One artifact was checked by a firmware scan.
    FirmwareScanned {
        id: Uuid,
        timestamp: SystemTime,
        artifact: String,
        prior_status: IntegrityStatus,
        action: ScanAction,
        previous_scan: IntegrityStatus,
    },
    /// An admin log entry matched the denylist.
    AdminActionFlagged {
        id: Uuid,
        timestamp: SystemTime,
        user: String,
        action: String,
    },
    HoneypotTriggered {
        id: Uuid,
        timestamp: SystemTime,
        username_hash: String,
        source_ip: String,
    },
    PaymentRecorded {
        id: Uuid,
        timestamp: SystemTime,
        customer: String,
        amount_cents: u64,
        credential_hash: String,
    },
    SessionOpened {
        id: Uuid,
        timestamp: SystemTime,
        session_id: String,
    },
    SessionLoggedOut {
        id: Uuid,
        timestamp: SystemTime,
        session_id: String,
    },
}

impl AuditEvent {
    pub fn score_changed(event: &ScoreEvent) -> Self {
        AuditEvent::ScoreChanged {
            id: Uuid::new_v4(),
            timestamp: event.timestamp,
            subject_id: event.subject_id.clone(),
            reason: event.reason,
            delta: event.delta,
            applied: event.applied,
            score_after: event.score_after,
        }
    }

    pub fn signal(subject_id: &SubjectId, signal: Signal, detail: Option<String>) -> Self {
        AuditEvent::SignalEvaluated {
            id: Uuid::new_v4(),
            timestamp: SystemTime::now(),
            subject_id: subject_id.clone(),
            signal,
            detail,
        }
    }

    pub fn gate(subject_id: &SubjectId, verdict: GateVerdict) -> Self {
        AuditEvent::GateDecided {
            id: Uuid::new_v4(),
            timestamp: SystemTime::now(),
            subject_id: subject_id.clone(),
            verdict,
        }
    }

    pub fn firmware(report: &ArtifactReport) -> Self {
        AuditEvent::FirmwareScanned {
            id: Uuid::new_v4(),
            timestamp: SystemTime::now(),
            artifact: report.artifact.clone(),
            prior_status: report.prior_status,
            action: report.action.clone(),
            previous_scan: report.previous_scan,
        }
    }

    /// Returns the unique ID of this event.
    pub fn id(&self) -> Uuid {
        match self {
            AuditEvent::ScoreChanged { id, .. }
            | AuditEvent::SignalEvaluated { id, .. }
            | AuditEvent::GateDecided { id, .. }
            | AuditEvent::FirmwareScanned { id, .. }
            | AuditEvent::AdminActionFlagged { id, .. }
            | AuditEvent::HoneypotTriggered { id, .. }
            | AuditEvent::PaymentRecorded { id, .. }
            | AuditEvent::SessionOpened { id, .. }
            | AuditEvent::SessionLoggedOut { id, .. } => *id,
        }
    }

    /// Returns the timestamp of this event.
    pub fn timestamp(&self) -> SystemTime {
        match self {
            AuditEvent::ScoreChanged { timestamp, .. }
            | AuditEvent::SignalEvaluated { timestamp, .. }
            | AuditEvent::GateDecided { timestamp, .. }
            | AuditEvent::FirmwareScanned { timestamp, .. }
            | AuditEvent::AdminActionFlagged { timestamp, .. }
            | AuditEvent::HoneypotTriggered { timestamp, .. }
            | AuditEvent::PaymentRecorded { timestamp, .. }
            | AuditEvent::SessionOpened { timestamp, .. }
            | AuditEvent::SessionLoggedOut { timestamp, .. } => *timestamp,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AuditEvent::ScoreChanged { .. } => "score_changed",
            AuditEvent::SignalEvaluated { .. } => "signal_evaluated",
            AuditEvent::GateDecided { .. } => "gate_decided",
            AuditEvent::FirmwareScanned { .. } => "firmware_scanned",
            AuditEvent::AdminActionFlagged { .. } => "admin_action_flagged",
            AuditEvent::HoneypotTriggered { .. } => "honeypot_triggered",
            AuditEvent::PaymentRecorded { .. } => "payment_recorded",
            AuditEvent::SessionOpened { .. } => "session_opened",
            AuditEvent::SessionLoggedOut { .. } => "session_logged_out",
        }
    }

    /// Subject the event is attributed to. Admin-side events count against
    /// the global subject; session lifecycle events against the session.
    pub fn subject_id(&self) -> SubjectId {
        match self {
            AuditEvent::ScoreChanged { subject_id, .. }
            | AuditEvent::SignalEvaluated { subject_id, .. }
            | AuditEvent::GateDecided { subject_id, .. } => subject_id.clone(),
            AuditEvent::SessionOpened { session_id, .. }
            | AuditEvent::SessionLoggedOut { session_id, .. } => SubjectId::session(session_id),
            AuditEvent::FirmwareScanned { .. }
            | AuditEvent::AdminActionFlagged { .. }
            | AuditEvent::HoneypotTriggered { .. }
            | AuditEvent::PaymentRecorded { .. } => SubjectId::global(),
        }
    }

    pub fn delta(&self) -> Option<i32> {
        match self {
            AuditEvent::ScoreChanged { delta, .. } => Some(*delta),
            AuditEvent::SignalEvaluated { signal, .. } => Some(signal.delta),
            _ => None,
        }
    }

    pub fn verdict(&self) -> Option<String> {
        match self {
            AuditEvent::SignalEvaluated { signal, .. } => Some(signal.verdict.as_str().to_string()),
            AuditEvent::GateDecided { verdict, .. } => {
                Some(format!("{}:{}", verdict.gate(), verdict.as_str()))
            }
            AuditEvent::FirmwareScanned { action, .. } => Some(
                match action {
                    ScanAction::None => "safe",
                    ScanAction::Recovered => "recovered",
                    ScanAction::Unrecoverable { .. } => "unrecoverable",
                }
                .to_string(),
            ),
            _ => None,
        }
    }
}
