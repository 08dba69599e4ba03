use firmware::{ArtifactReport, ScanAction};

use crate::config::Rewards;
use crate::random::RandomSource;
use crate::signals::{Signal, SignalKind, Verdict};

/// Affirmation for one scanned artifact.
///
/// Never negative: discovering a compromise does not penalise by itself.
/// An unrecoverable artifact yields no signal at all.
pub fn firmware_integrity(
    report: &ArtifactReport,
    rewards: &Rewards,
    rng: &dyn RandomSource,
) -> Option<Signal> {
    let range = match report.action {
        ScanAction::Recovered => rewards.firmware_recovered,
        ScanAction::None => rewards.firmware_safe,
        ScanAction::Unrecoverable { .. } => return None,
    };
    Some(Signal::new(
        SignalKind::FirmwareIntegrity,
        range.draw(rng).max(0),
        Verdict::Pass,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::PinnedRandom;
    use firmware::IntegrityStatus;
    use std::path::PathBuf;

    fn report(action: ScanAction) -> ArtifactReport {
        ArtifactReport {
            artifact: "LoJax".to_string(),
            path: PathBuf::from("lojax_modified.bin"),
            prior_status: IntegrityStatus::Compromised,
            action,
            previous_scan: IntegrityStatus::Unknown,
            observed_hash: None,
        }
    }

    #[test]
    fn recovered_and_safe_ranges() {
        let rewards = Rewards::default();
        let recovered = firmware_integrity(&report(ScanAction::Recovered), &rewards, &PinnedRandom::high());
        let safe = firmware_integrity(&report(ScanAction::None), &rewards, &PinnedRandom::low());
        assert_eq!(recovered.map(|s| s.delta), Some(10));
        assert_eq!(safe.map(|s| s.delta), Some(1));
    }

    #[test]
    fn unrecoverable_has_no_signal() {
        let action = ScanAction::Unrecoverable {
            reason: "copy failed".to_string(),
        };
        assert!(firmware_integrity(&report(action), &Rewards::default(), &PinnedRandom::low()).is_none());
    }

    #[test]
    fn misconfigured_negative_range_is_floored() {
        let rewards = Rewards {
            firmware_safe: crate::random::DeltaRange::new(-4, -1),
            ..Rewards::default()
        };
        let signal = firmware_integrity(&report(ScanAction::None), &rewards, &PinnedRandom::low());
        assert_eq!(signal.map(|s| s.delta), Some(0));
    }
}
