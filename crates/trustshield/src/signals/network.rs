use crate::config::Rewards;
use crate::gates::verifiers::GeoPolicy;
use crate::random::RandomSource;
use crate::signals::{Signal, SignalKind, Verdict};

/// Compares the login IP with the last one recorded for the session.
///
/// Updating the stored IP is the registry's job; see
/// [`DeviceRegistry::check_drift`](crate::identity::DeviceRegistry::check_drift).
pub fn ip_consistency(
    current_ip: &str,
    last_known_ip: &str,
    rewards: &Rewards,
    rng: &dyn RandomSource,
) -> Signal {
    if current_ip == last_known_ip {
        Signal::new(SignalKind::IpConsistency, rewards.ip_consistent.draw(rng), Verdict::Pass)
    } else {
        Signal::new(SignalKind::IpConsistency, rewards.ip_changed.draw(rng), Verdict::Warn)
    }
}

/// Geo-location has no score effect of its own; it only feeds the
/// zero-trust gate.
pub fn geo_check(requested_location: &str, current_location: &str, policy: &dyn GeoPolicy) -> Signal {
    Signal::neutral(SignalKind::Geo, policy.check(requested_location, current_location))
}
