//! Narrow interfaces behind every stand-in check.
//!
//! The stubs here are intentionally permissive demonstrations: substring
//! geo matching, any OTP of the right length, a single shared re-auth
//! secret, a coin-flip device attestation and an always-passing TPM. Real
//! implementations replace them without touching gate logic.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::random::RandomSource;
use crate::signals::Verdict;

pub trait GeoPolicy: Send + Sync {
    fn check(&self, requested_location: &str, current_location: &str) -> Verdict;
}

pub trait OtpVerifier: Send + Sync {
    fn verify(&self, code: &str) -> bool;
}

pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, supplied: &str) -> bool;
}

pub trait DeviceAttestor: Send + Sync {
    fn attest(&self, device_id: &str, rng: &dyn RandomSource) -> Verdict;
}

pub trait TpmAttestor: Send + Sync {
    fn attest(&self, device_id: &str) -> Verdict;
}

/// Passes when the allowed region name appears in either location string.
#[derive(Debug, Clone)]
pub struct SubstringGeoPolicy {
    allowed_region: String,
}

impl SubstringGeoPolicy {
    pub fn new(allowed_region: impl Into<String>) -> Self {
        Self {
            allowed_region: allowed_region.into(),
        }
    }
}

impl GeoPolicy for SubstringGeoPolicy {
    fn check(&self, requested_location: &str, current_location: &str) -> Verdict {
        if self.allowed_region.is_empty() {
            return Verdict::Fail;
        }
        if requested_location.contains(&self.allowed_region)
            || current_location.contains(&self.allowed_region)
        {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}

/// Accepts any code of exactly `length` characters.
#[derive(Debug, Clone)]
pub struct LengthOtpVerifier {
    length: usize,
}

impl LengthOtpVerifier {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl OtpVerifier for LengthOtpVerifier {
    fn verify(&self, code: &str) -> bool {
        code.chars().count() == self.length
    }
}

/// Plain equality against one configured secret.
#[derive(Clone)]
pub struct SharedSecretVerifier {
    secret: String,
}

impl SharedSecretVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for SharedSecretVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecretVerifier").finish_non_exhaustive()
    }
}

impl CredentialVerifier for SharedSecretVerifier {
    fn verify(&self, supplied: &str) -> bool {
        supplied == self.secret
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RandomDeviceAttestor {
    pass_probability: f64,
}

impl RandomDeviceAttestor {
    pub fn new(pass_probability: f64) -> Self {
        Self { pass_probability }
    }
}

impl DeviceAttestor for RandomDeviceAttestor {
    fn attest(&self, _device_id: &str, rng: &dyn RandomSource) -> Verdict {
        if rng.chance(self.pass_probability) {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StubTpm;

impl TpmAttestor for StubTpm {
    fn attest(&self, _device_id: &str) -> Verdict {
        Verdict::Pass
    }
}

/// The set of checks the gates consult.
#[derive(Clone)]
pub struct Verifiers {
    pub geo: Arc<dyn GeoPolicy>,
    pub otp: Arc<dyn OtpVerifier>,
    pub credentials: Arc<dyn CredentialVerifier>,
    pub device: Arc<dyn DeviceAttestor>,
    pub tpm: Arc<dyn TpmAttestor>,
}

impl Verifiers {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            geo: Arc::new(SubstringGeoPolicy::new(config.geo.allowed_region.clone())),
            otp: Arc::new(LengthOtpVerifier::new(config.otp_length)),
            credentials: Arc::new(SharedSecretVerifier::new(
                config.checkout.reauth_secret.clone(),
            )),
            device: Arc::new(RandomDeviceAttestor::new(config.device_trust_pass_probability)),
            tpm: Arc::new(StubTpm),
        }
    }
}
