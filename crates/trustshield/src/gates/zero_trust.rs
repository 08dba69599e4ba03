use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::signals::Verdict;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ZeroTrustVerdict {
    Granted,
    Denied,
}

/// Granted only when all three component checks pass.
pub fn zero_trust_gate(tpm: Verdict, geo: Verdict, device: Verdict) -> ZeroTrustVerdict {
    if tpm.is_pass() && geo.is_pass() && device.is_pass() {
        ZeroTrustVerdict::Granted
    } else {
        ZeroTrustVerdict::Denied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_pass_grants() {
        assert_eq!(
            zero_trust_gate(Verdict::Pass, Verdict::Pass, Verdict::Pass),
            ZeroTrustVerdict::Granted
        );
    }

    #[test]
    fn any_non_pass_denies() {
        let all = [Verdict::Pass, Verdict::Warn, Verdict::Fail];
        for tpm in all {
            for geo in all {
                for device in all {
                    let expected = if tpm.is_pass() && geo.is_pass() && device.is_pass() {
                        ZeroTrustVerdict::Granted
                    } else {
                        ZeroTrustVerdict::Denied
                    };
                    assert_eq!(zero_trust_gate(tpm, geo, device), expected);
                }
            }
        }
    }

    #[test]
    fn geo_failure_denies() {
        assert_eq!(
            zero_trust_gate(Verdict::Pass, Verdict::Fail, Verdict::Pass),
            ZeroTrustVerdict::Denied
        );
    }
}
