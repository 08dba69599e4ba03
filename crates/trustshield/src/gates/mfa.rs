use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::gates::verifiers::OtpVerifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MfaVerdict {
    Bypass,
    RequireOtp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OtpVerdict {
    Verified,
    Rejected,
}

pub fn mfa_gate(trust_score: u8, bypass_threshold: u8) -> MfaVerdict {
    if trust_score >= bypass_threshold {
        MfaVerdict::Bypass
    } else {
        MfaVerdict::RequireOtp
    }
}

pub fn otp_gate(code: &str, verifier: &dyn OtpVerifier) -> OtpVerdict {
    if verifier.verify(code) {
        OtpVerdict::Verified
    } else {
        OtpVerdict::Rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::verifiers::LengthOtpVerifier;

    #[test]
    fn bypass_at_threshold() {
        assert_eq!(mfa_gate(75, 75), MfaVerdict::Bypass);
        assert_eq!(mfa_gate(100, 75), MfaVerdict::Bypass);
        assert_eq!(mfa_gate(74, 75), MfaVerdict::RequireOtp);
        assert_eq!(mfa_gate(0, 75), MfaVerdict::RequireOtp);
    }

    #[test]
    fn otp_uses_verifier() {
        let verifier = LengthOtpVerifier::new(6);
        assert_eq!(otp_gate("424242", &verifier), OtpVerdict::Verified);
        assert_eq!(otp_gate("42", &verifier), OtpVerdict::Rejected);
    }
}
