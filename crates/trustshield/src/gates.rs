//! Policy gates.
//!
//! Each gate is a pure decision over current inputs. Denied, RequireOtp,
//! Blocked, PendingReauth and Failed are ordinary verdicts, not errors.

pub mod checkout;
pub mod mfa;
pub mod shopping;
pub mod verifiers;
pub mod zero_trust;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use checkout::{
    checkout_reauth_gate, CheckoutAssessment, CheckoutChanges, CheckoutDecision, CheckoutVerdict,
};
pub use mfa::{mfa_gate, otp_gate, MfaVerdict, OtpVerdict};
pub use shopping::{add_item_allowed, CartVerdict};
pub use verifiers::Verifiers;
pub use zero_trust::{zero_trust_gate, ZeroTrustVerdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HoneypotVerdict {
    Triggered,
}

/// A verdict from any gate, as recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(tag = "gate", content = "verdict", rename_all = "snake_case")]
pub enum GateVerdict {
    ZeroTrust(ZeroTrustVerdict),
    Mfa(MfaVerdict),
    Otp(OtpVerdict),
    Shopping(CartVerdict),
    Checkout(CheckoutVerdict),
    Honeypot(HoneypotVerdict),
}

impl GateVerdict {
    pub fn gate(&self) -> &'static str {
        match self {
            GateVerdict::ZeroTrust(_) => "zero_trust",
            GateVerdict::Mfa(_) => "mfa",
            GateVerdict::Otp(_) => "otp",
            GateVerdict::Shopping(_) => "shopping",
            GateVerdict::Checkout(_) => "checkout",
            GateVerdict::Honeypot(_) => "honeypot",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GateVerdict::ZeroTrust(ZeroTrustVerdict::Granted) => "granted",
            GateVerdict::ZeroTrust(ZeroTrustVerdict::Denied) => "denied",
            GateVerdict::Mfa(MfaVerdict::Bypass) => "bypass",
            GateVerdict::Mfa(MfaVerdict::RequireOtp) => "require_otp",
            GateVerdict::Otp(OtpVerdict::Verified) => "verified",
            GateVerdict::Otp(OtpVerdict::Rejected) => "rejected",
            GateVerdict::Shopping(CartVerdict::Added) => "added",
            GateVerdict::Shopping(CartVerdict::Blocked) => "blocked",
            GateVerdict::Checkout(CheckoutVerdict::Completed) => "completed",
            GateVerdict::Checkout(CheckoutVerdict::PendingReauth) => "pending_reauth",
            GateVerdict::Checkout(CheckoutVerdict::Failed) => "failed",
            GateVerdict::Honeypot(HoneypotVerdict::Triggered) => "triggered",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_verdict_serializes_tagged() {
        let json = serde_json::to_value(GateVerdict::Checkout(CheckoutVerdict::PendingReauth))
            .expect("serialize");
        assert_eq!(json["gate"], "checkout");
        assert_eq!(json["verdict"], "pending_reauth");
    }
}
