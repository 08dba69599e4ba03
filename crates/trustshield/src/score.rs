//! Bounded trust scores.
//!
//! A [`Subject`] is either the global system or one shopper session. Every
//! accepted delta is clamped to `0..=100` and recorded as a [`ScoreEvent`].

pub mod aggregator;
pub mod subject;

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use aggregator::ScoreAggregator;
pub use subject::{clamp_score, Subject};

pub const MIN_SCORE: u8 = 0;
pub const MAX_SCORE: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub const GLOBAL: &'static str = "global";

    pub fn global() -> Self {
        Self(Self::GLOBAL.to_string())
    }

    pub fn session(session_id: &str) -> Self {
        Self(format!("session:{session_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_global(&self) -> bool {
        self.0 == Self::GLOBAL
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a score moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScoreReason {
    /// Reset to the configured starting score.
    Baseline,
    Typing,
    IpConsistency,
    ZeroTrustGranted,
    ZeroTrustDenied,
    MfaBypass,
    OtpVerified,
    HighValueCart,
    CartValueLock,
    LuxuryOnlyCart,
    CheckoutCompleted,
    ReauthCompleted,
    ReauthFailed,
    AdminAnomaly,
    FirmwareRecovered,
    FirmwareSafe,
    Honeypot,
    Payment,
}

/// Immutable record of one accepted delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEvent {
    pub subject_id: SubjectId,
    /// Requested delta.
    pub delta: i32,
    /// Delta after clamping.
    pub applied: i32,
    pub reason: ScoreReason,
    pub score_after: u8,
    pub timestamp: SystemTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Critical,
    Elevated,
    Healthy,
}

impl ScoreBand {
    pub fn of(score: u8) -> Self {
        if score < 40 {
            ScoreBand::Critical
        } else if score < 70 {
            ScoreBand::Elevated
        } else {
            ScoreBand::Healthy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges() {
        assert_eq!(ScoreBand::of(0), ScoreBand::Critical);
        assert_eq!(ScoreBand::of(39), ScoreBand::Critical);
        assert_eq!(ScoreBand::of(40), ScoreBand::Elevated);
        assert_eq!(ScoreBand::of(69), ScoreBand::Elevated);
        assert_eq!(ScoreBand::of(70), ScoreBand::Healthy);
        assert_eq!(ScoreBand::of(100), ScoreBand::Healthy);
    }

    #[test]
    fn subject_ids() {
        assert!(SubjectId::global().is_global());
        assert_eq!(SubjectId::session("abc").as_str(), "session:abc");
        assert_eq!(
            serde_json::to_string(&SubjectId::session("abc")).expect("json"),
            "\"session:abc\""
        );
    }
}
