use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{require_text, ScoreView, TrustEngine};
use crate::error::{EngineError, EngineResult};
use crate::events::AuditEvent;
use crate::gates::{mfa_gate, otp_gate, GateVerdict, MfaVerdict, OtpVerdict};
use crate::score::{ScoreReason, SubjectId};
use crate::session::PendingOtp;
use crate::signals::{ip_consistency, typing_biometric, Signal};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Free text typed by the user; only its length is scored.
    #[serde(default)]
    pub typing_sample: String,
    pub ip: String,
    #[serde(default)]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginOutcome {
    pub verdict: MfaVerdict,
    pub session_score: u8,
    pub global: ScoreView,
    pub typing: Signal,
    pub ip: Signal,
    pub fingerprint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OtpOutcome {
    pub verdict: OtpVerdict,
    pub user: Option<String>,
    pub global: ScoreView,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogoutOutcome {
    pub session_score: u8,
    pub global: ScoreView,
}

impl TrustEngine {
    /// Scores a login attempt on `session_id` and decides MFA.
    ///
    /// The session subject restarts from its baseline, then takes the
    /// typing and IP deltas. A first login registers the device, which
    /// counts as a consistent IP.
    pub fn login(&self, session_id: &str, request: &LoginRequest) -> EngineResult<LoginOutcome> {
        let username = require_text(&request.username, "username")?;
        if request.password.is_empty() {
            return Err(EngineError::validation("password must not be empty"));
        }
        let ip = require_text(&request.ip, "ip")?;
        let user_agent = request
            .user_agent
            .as_deref()
            .map(str::trim)
            .filter(|agent| !agent.is_empty())
            .unwrap_or(&self.config.sessions.default_user_agent);

        self.sessions.with_session(session_id, |state| {
            let subject = SubjectId::session(&state.id);
            self.scores.rebaseline(&subject);

            let typing = typing_biometric(
                &request.typing_sample,
                &self.config.thresholds,
                &self.config.rewards,
                self.rng.as_ref(),
            );
            self.record(AuditEvent::signal(&subject, typing, None));
            self.scores.apply(&subject, typing.delta, ScoreReason::Typing);

            let (fingerprint, last_ip) = match self.registry.get(&state.id) {
                Some(registration) => (registration.fingerprint_hash, registration.last_ip),
                None => {
                    let hash = self
                        .registry
                        .register(&state.id, user_agent, ip, self.rng.as_ref());
                    (hash, ip.to_string())
                }
            };
            let ip_signal = ip_consistency(ip, &last_ip, &self.config.rewards, self.rng.as_ref());
            self.registry.check_drift(&state.id, ip)?;
            self.record(AuditEvent::signal(&subject, ip_signal, None));
            let session_score = self
                .scores
                .apply(&subject, ip_signal.delta, ScoreReason::IpConsistency)
                .score_after;

            let verdict = mfa_gate(session_score, self.config.thresholds.mfa_bypass);
            self.record(AuditEvent::gate(&subject, GateVerdict::Mfa(verdict)));
            match verdict {
                MfaVerdict::Bypass => {
                    state.user = Some(username.to_string());
                    state.pending_otp = None;
                    self.reward_global(self.config.rewards.mfa_bypass, ScoreReason::MfaBypass);
                }
                MfaVerdict::RequireOtp => {
                    state.user = None;
                    state.pending_otp = Some(PendingOtp {
                        username: username.to_string(),
                        issued_at: SystemTime::now(),
                    });
                }
            }

            tracing::info!(
                "login on session {} scored {session_score}, mfa {verdict:?}",
                state.id
            );
            Ok(LoginOutcome {
                verdict,
                session_score,
                global: self.global_score(),
                typing,
                ip: ip_signal,
                fingerprint,
            })
        })
    }

    /// Checks the OTP for a pending login. A rejected code leaves the
    /// challenge open.
    pub fn submit_otp(&self, session_id: &str, code: &str) -> EngineResult<OtpOutcome> {
        self.sessions.with_session(session_id, |state| {
            let pending = state.pending_otp.clone().ok_or_else(|| {
                EngineError::validation(format!("session {} has no pending OTP", state.id))
            })?;
            let subject = SubjectId::session(&state.id);

            let verdict = otp_gate(code, self.verifiers.otp.as_ref());
            self.record(AuditEvent::gate(&subject, GateVerdict::Otp(verdict)));
            if verdict == OtpVerdict::Verified {
                state.user = Some(pending.username);
                state.pending_otp = None;
                self.reward_global(self.config.rewards.otp_verified, ScoreReason::OtpVerified);
            }

            tracing::info!("otp on session {} {verdict:?}", state.id);
            Ok(OtpOutcome {
                verdict,
                user: state.user.clone(),
                global: self.global_score(),
            })
        })
    }

    /// Ends the login: the device registration is destroyed and the
    /// session score returns to baseline.
    pub fn logout(&self, session_id: &str) -> EngineResult<LogoutOutcome> {
        self.sessions.with_session(session_id, |state| {
            state.user = None;
            state.pending_otp = None;
            self.registry.remove(&state.id);
            let session_score = self
                .scores
                .rebaseline(&SubjectId::session(&state.id))
                .score_after;
            self.record(AuditEvent::SessionLoggedOut {
                id: Uuid::new_v4(),
                timestamp: SystemTime::now(),
                session_id: state.id.clone(),
            });

            tracing::info!("session {} logged out", state.id);
            Ok(LogoutOutcome {
                session_score,
                global: self.global_score(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::random::PinnedRandom;
    use std::sync::Arc;

    fn engine(rng: PinnedRandom) -> TrustEngine {
        TrustEngine::builder(EngineConfig::default())
            .random(Arc::new(rng))
            .build()
            .expect("engine")
    }

    fn request(sample: &str) -> LoginRequest {
        LoginRequest {
            username: "alice".to_string(),
            password: "secret".to_string(),
            typing_sample: sample.to_string(),
            ip: "10.0.0.1".to_string(),
            user_agent: None,
        }
    }

    #[test]
    fn natural_typing_bypasses_mfa() {
        let engine = engine(PinnedRandom::low());
        let session = engine.open_session();
        let outcome = engine
            .login(&session, &request("a natural typing sample"))
            .expect("login");

        // 70 + 10 (typing) + 5 (first IP)
        assert_eq!(outcome.session_score, 85);
        assert_eq!(outcome.verdict, MfaVerdict::Bypass);
        assert_eq!(outcome.global.score, 73);
        assert_eq!(outcome.fingerprint.len(), 64);

        let snapshot = engine.session_snapshot(&session).expect("snapshot");
        assert_eq!(snapshot.user.as_deref(), Some("alice"));
    }

    #[test]
    fn short_typing_requires_otp() {
        let engine = engine(PinnedRandom::high());
        let session = engine.open_session();
        let outcome = engine.login(&session, &request("hi")).expect("login");

        // 70 - 15 (typing) + 10 (first IP)
        assert_eq!(outcome.session_score, 65);
        assert_eq!(outcome.verdict, MfaVerdict::RequireOtp);
        assert_eq!(outcome.global.score, 70);

        let rejected = engine.submit_otp(&session, "12").expect("otp");
        assert_eq!(rejected.verdict, OtpVerdict::Rejected);
        assert!(rejected.user.is_none());

        // Codes are taken as supplied, padding included.
        let padded = engine.submit_otp(&session, "123456 ").expect("otp");
        assert_eq!(padded.verdict, OtpVerdict::Rejected);
        assert!(padded.user.is_none());

        let verified = engine.submit_otp(&session, "123456").expect("otp");
        assert_eq!(verified.verdict, OtpVerdict::Verified);
        assert_eq!(verified.user.as_deref(), Some("alice"));
        assert_eq!(verified.global.score, 74);
    }

    #[test]
    fn otp_without_challenge_is_validation() {
        let engine = engine(PinnedRandom::low());
        let session = engine.open_session();
        assert!(matches!(
            engine.submit_otp(&session, "123456"),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn empty_credentials_are_validation() {
        let engine = engine(PinnedRandom::low());
        let session = engine.open_session();
        let mut bad = request("a natural typing sample");
        bad.password.clear();
        assert!(matches!(
            engine.login(&session, &bad),
            Err(EngineError::Validation(_))
        ));
        assert_eq!(engine.audit_events().len(), 1);
    }

    #[test]
    fn ip_change_between_logins_warns() {
        let engine = engine(PinnedRandom::low());
        let session = engine.open_session();
        engine
            .login(&session, &request("a natural typing sample"))
            .expect("login");

        let mut moved = request("a natural typing sample");
        moved.ip = "203.0.113.7".to_string();
        let outcome = engine.login(&session, &moved).expect("login");
        assert_eq!(outcome.ip.verdict, crate::signals::Verdict::Warn);
        // 70 + 10 - 30
        assert_eq!(outcome.session_score, 50);
        assert_eq!(outcome.verdict, MfaVerdict::RequireOtp);
    }

    #[test]
    fn logout_resets_registration_and_score() {
        let engine = engine(PinnedRandom::low());
        let session = engine.open_session();
        let first = engine
            .login(&session, &request("a natural typing sample"))
            .expect("login");
        let out = engine.logout(&session).expect("logout");
        assert_eq!(out.session_score, 70);

        let mut moved = request("a natural typing sample");
        moved.ip = "203.0.113.7".to_string();
        let second = engine.login(&session, &moved).expect("login");
        assert_eq!(second.ip.verdict, crate::signals::Verdict::Pass);
        assert_ne!(second.fingerprint, first.fingerprint);
    }

    #[test]
    fn evicted_registration_acts_like_logout() {
        let engine = engine(PinnedRandom::low());
        let session = engine.open_session();
        let first = engine
            .login(&session, &request("a natural typing sample"))
            .expect("login");
        engine.registry.remove(&session);

        let mut moved = request("a natural typing sample");
        moved.ip = "203.0.113.7".to_string();
        let second = engine.login(&session, &moved).expect("login");
        // No drift penalty: the session registers afresh.
        assert_eq!(second.ip.verdict, crate::signals::Verdict::Pass);
        assert_eq!(second.session_score, 85);
        assert_ne!(second.fingerprint, first.fingerprint);
    }
}
