use crate::config::{Rewards, Thresholds};
use crate::random::RandomSource;
use crate::signals::{Signal, SignalKind, Verdict};

/// Scores a typing sample by its character count.
///
/// An empty sample takes the too-short path.
pub fn typing_biometric(
    sample: &str,
    thresholds: &Thresholds,
    rewards: &Rewards,
    rng: &dyn RandomSource,
) -> Signal {
    let len = sample.chars().count();
    if len < thresholds.typing_min_len {
        Signal::new(SignalKind::Typing, rewards.typing_short.draw(rng), Verdict::Fail)
    } else if len > thresholds.typing_max_len {
        Signal::new(SignalKind::Typing, rewards.typing_long.draw(rng), Verdict::Fail)
    } else {
        Signal::new(SignalKind::Typing, rewards.typing_natural.draw(rng), Verdict::Pass)
    }
}
