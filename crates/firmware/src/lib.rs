//! Firmware integrity monitoring library.
//!
//! This crate provides the integrity side of the trust engine:
//! - SHA-256 digests of opaque firmware images
//! - Discovery of monitored artifacts next to a trusted baseline
//! - Parallel scans that restore tampered artifacts from the baseline
//! - Per-artifact status tracking across scans

pub mod digest;
pub mod error;
pub mod monitor;
pub mod types;

// Re-export main types
pub use digest::{hash_bytes, hash_file, Digest256};
pub use error::{FirmwareError, Result};
pub use monitor::{ArtifactSet, FirmwareMonitor};
pub use types::{ArtifactReport, ArtifactSpec, IntegrityStatus, ScanAction, ScanReport};
