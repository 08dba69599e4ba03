use crate::admin::AdminLogEntry;
use crate::config::Rewards;
use crate::random::RandomSource;
use crate::signals::{Signal, SignalKind, Verdict};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminAssessment {
    /// Indexes into the evaluated entries.
    pub flagged: Vec<usize>,
    /// One warning per evaluation, however many entries matched.
    pub signal: Signal,
}

/// Flags entries whose action contains a denylisted phrase, ignoring case.
pub fn admin_action_anomaly(
    entries: &[AdminLogEntry],
    denylist: &[String],
    rewards: &Rewards,
    rng: &dyn RandomSource,
) -> AdminAssessment {
    let patterns: Vec<String> = denylist
        .iter()
        .map(|pattern| pattern.trim().to_lowercase())
        .filter(|pattern| !pattern.is_empty())
        .collect();

    let flagged: Vec<usize> = entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| {
            let action = entry.action.to_lowercase();
            patterns.iter().any(|pattern| action.contains(pattern))
        })
        .map(|(index, _)| index)
        .collect();

    let signal = if flagged.is_empty() {
        Signal::neutral(SignalKind::AdminAction, Verdict::Pass)
    } else {
        Signal::new(SignalKind::AdminAction, rewards.admin_anomaly.draw(rng), Verdict::Warn)
    };

    AdminAssessment { flagged, signal }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::PinnedRandom;

    fn entry(user: &str, action: &str) -> AdminLogEntry {
        AdminLogEntry {
            timestamp: "2025-01-01T00:00:00+00:00".to_string(),
            user: user.to_string(),
            action: action.to_string(),
            status: "Success".to_string(),
        }
    }

    #[test]
    fn flags_denylisted_action_case_insensitively() {
        let entries = vec![
            entry("alice", "Accessed sales reports"),
            entry("charlie", "Attempted to DOWNLOAD customer data"),
        ];
        let assessment = admin_action_anomaly(
            &entries,
            &["download customer data".to_string()],
            &Rewards::default(),
            &PinnedRandom::low(),
        );
        assert_eq!(assessment.flagged, vec![1]);
        assert_eq!(assessment.signal.verdict, Verdict::Warn);
        assert_eq!(assessment.signal.delta, -5);
    }

    #[test]
    fn clean_log_passes_without_delta() {
        let entries = vec![entry("bob", "Modified product pricing")];
        let assessment = admin_action_anomaly(
            &entries,
            &["download customer data".to_string(), "  ".to_string()],
            &Rewards::default(),
            &PinnedRandom::high(),
        );
        assert!(assessment.flagged.is_empty());
        assert_eq!(assessment.signal, Signal::neutral(SignalKind::AdminAction, Verdict::Pass));
    }
}
