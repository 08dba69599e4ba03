//! Device fingerprints and IP drift per session.

use std::time::{Duration, SystemTime};

use moka::sync::Cache;
use sha2::{Digest, Sha256};

use crate::config::SessionSettings;
use crate::error::{EngineError, EngineResult};
use crate::random::RandomSource;

/// Lowercase hex SHA-256 of `value`; the only form identifiers take in
/// audit output.
pub fn sha256_hex(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

/// Hash of agent, IP and a random nonce, so identical agent/IP pairs still
/// get session-unique fingerprints.
pub fn fingerprint(user_agent: &str, ip: &str, rng: &dyn RandomSource) -> String {
    let nonce = rng.range(10_000, 99_999);
    sha256_hex(&format!("{user_agent}-{ip}-{nonce}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRegistration {
    pub session_id: String,
    pub fingerprint_hash: String,
    pub last_ip: String,
    pub first_seen: SystemTime,
}

/// One registration per active session, destroyed on logout.
///
/// Callers mutate a session's registration only while holding that
/// session's lock. Idle expiry or `max_sessions` eviction drops a
/// registration like a logout does: the next login registers a fresh
/// fingerprint.
pub struct DeviceRegistry {
    cache: Cache<String, DeviceRegistration>,
}

impl DeviceRegistry {
    pub fn new(settings: &SessionSettings) -> Self {
        let cache = Cache::builder()
            .max_capacity(settings.max_sessions.max(1))
            .time_to_idle(Duration::from_secs(settings.idle_seconds.max(1)))
            .build();
        Self { cache }
    }

    pub fn register(
        &self,
        session_id: &str,
        user_agent: &str,
        ip: &str,
        rng: &dyn RandomSource,
    ) -> String {
        let registration = DeviceRegistration {
            session_id: session_id.to_string(),
            fingerprint_hash: fingerprint(user_agent, ip, rng),
            last_ip: ip.to_string(),
            first_seen: SystemTime::now(),
        };
        let hash = registration.fingerprint_hash.clone();
        self.cache.insert(session_id.to_string(), registration);
        hash
    }

    pub fn get(&self, session_id: &str) -> Option<DeviceRegistration> {
        self.cache.get(session_id)
    }

    pub fn last_ip(&self, session_id: &str) -> Option<String> {
        self.cache.get(session_id).map(|r| r.last_ip)
    }

    /// `true` when `new_ip` differs from the stored IP. The stored IP is
    /// replaced either way, so each check re-baselines.
    pub fn check_drift(&self, session_id: &str, new_ip: &str) -> EngineResult<bool> {
        let mut registration = self.cache.get(session_id).ok_or_else(|| {
            EngineError::validation(format!("no device registration for session {session_id}"))
        })?;
        let drifted = registration.last_ip != new_ip;
        registration.last_ip = new_ip.to_string();
        self.cache.insert(session_id.to_string(), registration);
        Ok(drifted)
    }

    pub fn remove(&self, session_id: &str) -> Option<DeviceRegistration> {
        self.cache.remove(session_id)
    }
}
