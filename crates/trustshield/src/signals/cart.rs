//! Shopping-pattern anomaly rules.
//!
//! Three rules run on every cart mutation in a fixed order:
//! high value (one-shot warning), value lock, luxury-only lock. Both lock
//! rules compare against the lock state from before the mutation, so they
//! can fire together on the same add but never again once locked.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{Rewards, Thresholds};
use crate::random::RandomSource;
use crate::signals::{Signal, SignalKind, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartObservation {
    pub cart_value: u64,
    pub luxury_count: u32,
    pub low_medium_count: u32,
    pub already_warned: bool,
    pub already_locked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CartRule {
    HighValue,
    ValueLock,
    LuxuryOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartFinding {
    pub rule: CartRule,
    pub signal: Signal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartAssessment {
    pub findings: Vec<CartFinding>,
    /// Sets the one-shot high-value flag.
    pub warn: bool,
    pub lock: bool,
}

impl CartAssessment {
    pub fn fired(&self, rule: CartRule) -> bool {
        self.findings.iter().any(|finding| finding.rule == rule)
    }
}

pub fn cart_anomaly(
    observation: &CartObservation,
    thresholds: &Thresholds,
    rewards: &Rewards,
    rng: &dyn RandomSource,
) -> CartAssessment {
    let mut assessment = CartAssessment::default();

    if observation.cart_value > thresholds.cart_warn_value && !observation.already_warned {
        assessment.warn = true;
        assessment.findings.push(CartFinding {
            rule: CartRule::HighValue,
            signal: Signal::new(
                SignalKind::CartAnomaly,
                rewards.cart_high_value.draw(rng),
                Verdict::Warn,
            ),
        });
    }

    if observation.cart_value > thresholds.cart_lock_value && !observation.already_locked {
        assessment.lock = true;
        assessment.findings.push(CartFinding {
            rule: CartRule::ValueLock,
            signal: Signal::new(
                SignalKind::CartAnomaly,
                rewards.cart_value_lock.draw(rng),
                Verdict::Fail,
            ),
        });
    }

    if observation.luxury_count >= thresholds.luxury_only_count
        && observation.low_medium_count == 0
        && !observation.already_locked
    {
        assessment.lock = true;
        assessment.findings.push(CartFinding {
            rule: CartRule::LuxuryOnly,
            signal: Signal::new(
                SignalKind::CartAnomaly,
                rewards.cart_luxury_only.draw(rng),
                Verdict::Fail,
            ),
        });
    }

    assessment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::PinnedRandom;

    fn observe(cart_value: u64, luxury: u32, low_medium: u32) -> CartObservation {
        CartObservation {
            cart_value,
            luxury_count: luxury,
            low_medium_count: low_medium,
            already_warned: false,
            already_locked: false,
        }
    }

    fn assess(observation: CartObservation) -> CartAssessment {
        cart_anomaly(
            &observation,
            &Thresholds::default(),
            &Rewards::default(),
            &PinnedRandom::low(),
        )
    }

    #[test]
    fn quiet_cart_has_no_findings() {
        let assessment = assess(observe(500, 0, 4));
        assert!(assessment.findings.is_empty());
        assert!(!assessment.lock);
    }

    #[test]
    fn high_value_warns_once() {
        let first = assess(observe(540, 0, 5));
        assert!(first.warn);
        assert_eq!(first.findings.len(), 1);
        assert_eq!(first.findings[0].signal.delta, -8);

        let second = assess(CartObservation {
            already_warned: true,
            ..observe(560, 0, 6)
        });
        assert!(second.findings.is_empty());
    }

    #[test]
    fn crossing_lock_value_fires_warn_and_lock_together() {
        let assessment = assess(observe(900, 1, 0));
        assert!(assessment.fired(CartRule::HighValue));
        assert!(assessment.fired(CartRule::ValueLock));
        assert!(assessment.lock);
        let lock = assessment
            .findings
            .iter()
            .find(|f| f.rule == CartRule::ValueLock)
            .map(|f| f.signal);
        assert_eq!(lock.map(|s| (s.delta, s.verdict)), Some((-15, Verdict::Fail)));
    }

    #[test]
    fn lock_does_not_repeat_penalty() {
        let assessment = assess(CartObservation {
            already_warned: true,
            already_locked: true,
            ..observe(2_000, 6, 0)
        });
        assert!(assessment.findings.is_empty());
    }

    #[test]
    fn luxury_only_rule_is_independent_of_value() {
        let thresholds = Thresholds {
            cart_warn_value: u64::MAX,
            cart_lock_value: u64::MAX,
            ..Thresholds::default()
        };
        let rng = PinnedRandom::high();
        let rewards = Rewards::default();

        let six = cart_anomaly(&observe(5_400, 6, 0), &thresholds, &rewards, &rng);
        assert!(six.lock);
        assert_eq!(six.findings.len(), 1);
        assert_eq!(six.findings[0].rule, CartRule::LuxuryOnly);
        assert_eq!(six.findings[0].signal.delta, -7);

        let mixed = cart_anomaly(&observe(4_515, 5, 1), &thresholds, &rewards, &rng);
        assert!(!mixed.lock);
        assert!(mixed.findings.is_empty());
    }
}
