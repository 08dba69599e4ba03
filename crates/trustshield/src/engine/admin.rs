use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use firmware::{ScanAction, ScanReport};

use super::{require_text, ScoreView, TrustEngine};
use crate::admin::AdminLogEntry;
use crate::error::{EngineError, EngineResult};
use crate::events::AuditEvent;
use crate::gates::{zero_trust_gate, GateVerdict, HoneypotVerdict, ZeroTrustVerdict};
use crate::identity::sha256_hex;
use crate::payments::TransactionRecord;
use crate::score::{ScoreReason, SubjectId};
use crate::signals::{
    admin_action_anomaly, device_trust_check, firmware_integrity, geo_check, tpm_check, Signal,
    Verdict,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ZeroTrustRequest {
    pub user_id: String,
    pub device_id: String,
    pub location: String,
    /// Overrides the configured location of the requester.
    #[serde(default)]
    pub current_location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ZeroTrustOutcome {
    pub verdict: ZeroTrustVerdict,
    pub tpm: Signal,
    pub geo: Signal,
    pub device: Signal,
    pub user_hash: String,
    pub device_hash: String,
    pub global: ScoreView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirmwareOutcome {
    pub report: ScanReport,
    pub global: ScoreView,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminLogsOutcome {
    pub entries: Vec<AdminLogEntry>,
    pub flagged: Vec<AdminLogEntry>,
    pub verdict: Verdict,
    pub global: ScoreView,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HoneypotRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub source_ip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HoneypotOutcome {
    pub verdict: HoneypotVerdict,
    pub username_hash: String,
    pub global: ScoreView,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentRequest {
    pub customer: String,
    pub amount_cents: u64,
    pub payment_method: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentOutcome {
    pub transaction: TransactionRecord,
    pub global: ScoreView,
}

impl TrustEngine {
    /// Combines TPM, geo and device checks into an access decision on the
    /// global score.
    pub fn run_zero_trust_check(&self, request: &ZeroTrustRequest) -> EngineResult<ZeroTrustOutcome> {
        let user_id = require_text(&request.user_id, "user_id")?;
        let device_id = require_text(&request.device_id, "device_id")?;
        let location = require_text(&request.location, "location")?;
        let current_location = request
            .current_location
            .as_deref()
            .map(str::trim)
            .filter(|current| !current.is_empty())
            .unwrap_or(&self.config.geo.current_location);

        let _guard = self.admin_lock.lock();
        let subject = SubjectId::global();

        let tpm = tpm_check(device_id, self.verifiers.tpm.as_ref());
        self.record(AuditEvent::signal(&subject, tpm, None));
        let geo = geo_check(location, current_location, self.verifiers.geo.as_ref());
        self.record(AuditEvent::signal(&subject, geo, Some(location.to_string())));
        let device = device_trust_check(device_id, self.verifiers.device.as_ref(), self.rng.as_ref());
        self.record(AuditEvent::signal(&subject, device, None));

        let verdict = zero_trust_gate(tpm.verdict, geo.verdict, device.verdict);
        self.record(AuditEvent::gate(&subject, GateVerdict::ZeroTrust(verdict)));
        match verdict {
            ZeroTrustVerdict::Granted => {
                self.reward_global(self.config.rewards.zero_trust_granted, ScoreReason::ZeroTrustGranted)
            }
            ZeroTrustVerdict::Denied => {
                self.reward_global(self.config.rewards.zero_trust_denied, ScoreReason::ZeroTrustDenied)
            }
        };

        tracing::info!(
            "zero trust {verdict:?} (tpm {}, geo {}, device {})",
            tpm.verdict.as_str(),
            geo.verdict.as_str(),
            device.verdict.as_str()
        );
        Ok(ZeroTrustOutcome {
            verdict,
            tpm,
            geo,
            device,
            user_hash: sha256_hex(user_id),
            device_hash: sha256_hex(device_id),
            global: self.global_score(),
        })
    }

    /// Scans every firmware artifact against the baseline, restoring the
    /// compromised ones.
    ///
    /// A missing baseline fails the whole scan. Artifacts that cannot be
    /// restored are reported as unrecoverable and earn nothing.
    pub async fn run_firmware_scan(&self) -> EngineResult<FirmwareOutcome> {
        let monitor = self.firmware.clone();
        let report = tokio::task::spawn_blocking(move || monitor.scan())
            .await
            .map_err(|error| EngineError::internal(format!("firmware scan task failed: {error}")))??;

        let _guard = self.admin_lock.lock();
        let subject = SubjectId::global();
        for artifact in &report.artifacts {
            self.record(AuditEvent::firmware(artifact));
            let reason = match &artifact.action {
                ScanAction::Recovered => ScoreReason::FirmwareRecovered,
                ScanAction::None => ScoreReason::FirmwareSafe,
                ScanAction::Unrecoverable { reason } => {
                    tracing::warn!("firmware artifact {} unrecoverable: {reason}", artifact.artifact);
                    continue;
                }
            };
            if let Some(signal) = firmware_integrity(artifact, &self.config.rewards, self.rng.as_ref()) {
                self.record(AuditEvent::signal(&subject, signal, Some(artifact.artifact.clone())));
                self.scores.apply(&subject, signal.delta, reason);
            }
        }

        tracing::info!(
            "firmware scan checked {} artifacts, {} recovered, {} unrecoverable",
            report.artifacts.len(),
            report.recovered(),
            report.unrecoverable()
        );
        Ok(FirmwareOutcome {
            report,
            global: self.global_score(),
        })
    }

    /// Pulls admin logs and flags denylisted actions. One penalty per
    /// refresh, however many entries matched.
    pub async fn refresh_admin_logs(&self) -> EngineResult<AdminLogsOutcome> {
        let entries = self.admin_logs.fetch().await?;

        let _guard = self.admin_lock.lock();
        let subject = SubjectId::global();
        let assessment = admin_action_anomaly(
            &entries,
            &self.config.admin.denylist,
            &self.config.rewards,
            self.rng.as_ref(),
        );
        let flagged: Vec<AdminLogEntry> = assessment
            .flagged
            .iter()
            .filter_map(|index| entries.get(*index).cloned())
            .collect();
        for entry in &flagged {
            self.record(AuditEvent::AdminActionFlagged {
                id: Uuid::new_v4(),
                timestamp: SystemTime::now(),
                user: entry.user.clone(),
                action: entry.action.clone(),
            });
        }
        self.record(AuditEvent::signal(&subject, assessment.signal, None));
        if !flagged.is_empty() {
            tracing::warn!("{} admin actions flagged", flagged.len());
            self.scores
                .apply(&subject, assessment.signal.delta, ScoreReason::AdminAnomaly);
        }

        Ok(AdminLogsOutcome {
            entries,
            flagged,
            verdict: assessment.signal.verdict,
            global: self.global_score(),
        })
    }

    /// Records a decoy login. Only the username hash is kept.
    pub fn trigger_honeypot(&self, request: &HoneypotRequest) -> EngineResult<HoneypotOutcome> {
        let username = require_text(&request.username, "username")?;
        if request.password.is_empty() {
            return Err(EngineError::validation("password must not be empty"));
        }
        let source_ip = request.source_ip.trim();
        let source_ip = if source_ip.is_empty() { "unknown" } else { source_ip };

        let _guard = self.admin_lock.lock();
        let subject = SubjectId::global();
        let username_hash = sha256_hex(username);
        self.record(AuditEvent::HoneypotTriggered {
            id: Uuid::new_v4(),
            timestamp: SystemTime::now(),
            username_hash: username_hash.clone(),
            source_ip: source_ip.to_string(),
        });
        let verdict = HoneypotVerdict::Triggered;
        self.record(AuditEvent::gate(&subject, GateVerdict::Honeypot(verdict)));
        self.reward_global(self.config.rewards.honeypot, ScoreReason::Honeypot);

        tracing::warn!("honeypot triggered from {source_ip}");
        Ok(HoneypotOutcome {
            verdict,
            username_hash,
            global: self.global_score(),
        })
    }

    pub fn record_payment(&self, request: &PaymentRequest) -> EngineResult<PaymentOutcome> {
        let customer = require_text(&request.customer, "customer")?;
        let method = require_text(&request.payment_method, "payment_method")?;
        if request.amount_cents == 0 {
            return Err(EngineError::validation("amount_cents must be positive"));
        }

        let _guard = self.admin_lock.lock();
        let transaction = self.payments.record(customer, request.amount_cents, method);
        self.record(AuditEvent::PaymentRecorded {
            id: Uuid::new_v4(),
            timestamp: SystemTime::now(),
            customer: transaction.customer.clone(),
            amount_cents: transaction.amount_cents,
            credential_hash: transaction.payment_credential_hash.clone(),
        });
        self.reward_global(self.config.rewards.payment, ScoreReason::Payment);

        tracing::info!("payment of {} cents recorded", transaction.amount_cents);
        Ok(PaymentOutcome {
            transaction,
            global: self.global_score(),
        })
    }

    /// Newest first.
    pub fn transactions(&self) -> Vec<TransactionRecord> {
        self.payments.list()
    }
}
