use crate::gates::verifiers::{DeviceAttestor, TpmAttestor};
use crate::random::RandomSource;
use crate::signals::{Signal, SignalKind};

pub fn device_trust_check(
    device_id: &str,
    attestor: &dyn DeviceAttestor,
    rng: &dyn RandomSource,
) -> Signal {
    Signal::neutral(SignalKind::DeviceTrust, attestor.attest(device_id, rng))
}

pub fn tpm_check(device_id: &str, attestor: &dyn TpmAttestor) -> Signal {
    Signal::neutral(SignalKind::Tpm, attestor.attest(device_id))
}
