//! Signal evaluators: pure functions from a raw observation to a signed
//! score delta and a qualitative verdict.
//!
//! Randomized deltas are drawn through the injected [`RandomSource`], never
//! from a global RNG.
//!
//! [`RandomSource`]: crate::random::RandomSource

pub mod admin;
pub mod cart;
pub mod device;
pub mod firmware;
pub mod network;
pub mod typing;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use admin::{admin_action_anomaly, AdminAssessment};
pub use cart::{cart_anomaly, CartAssessment, CartFinding, CartObservation, CartRule};
pub use device::{device_trust_check, tpm_check};
pub use firmware::firmware_integrity;
pub use network::{geo_check, ip_consistency};
pub use typing::typing_biometric;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Warn,
    Fail,
}

impl Verdict {
    pub fn is_pass(self) -> bool {
        matches!(self, Verdict::Pass)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::Warn => "warn",
            Verdict::Fail => "fail",
        }
    }
}

/// Which evaluator produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Typing,
    IpConsistency,
    Geo,
    DeviceTrust,
    Tpm,
    CartAnomaly,
    AdminAction,
    FirmwareIntegrity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Signal {
    pub kind: SignalKind,
    pub delta: i32,
    pub verdict: Verdict,
}

impl Signal {
    pub fn new(kind: SignalKind, delta: i32, verdict: Verdict) -> Self {
        Self {
            kind,
            delta,
            verdict,
        }
    }

    /// A verdict with no score effect.
    pub fn neutral(kind: SignalKind, verdict: Verdict) -> Self {
        Self::new(kind, 0, verdict)
    }
}
