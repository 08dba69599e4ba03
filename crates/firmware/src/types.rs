use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Integrity state of a monitored artifact.
///
/// Every artifact starts as `Unknown` and moves to `Safe` or `Compromised`
/// on each scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityStatus {
    Unknown,
    Safe,
    Compromised,
}

/// What the monitor did about an artifact during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ScanAction {
    /// Digest matched the baseline; the file was not touched.
    None,
    /// The artifact was overwritten with the baseline and re-verified.
    Recovered,
    /// Restoration failed or the digest still differs afterwards.
    Unrecoverable { reason: String },
}

/// A file watched against the baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSpec {
    pub label: String,
    pub path: PathBuf,
}

/// One entry per artifact per scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactReport {
    pub artifact: String,
    pub path: PathBuf,
    /// Status found by this scan, before any action was taken.
    pub prior_status: IntegrityStatus,
    pub action: ScanAction,
    /// Final status left behind by the previous scan (`Unknown` on the first).
    pub previous_scan: IntegrityStatus,
    /// Hex digest observed before action; `None` when the file was unreadable.
    pub observed_hash: Option<String>,
}

impl ArtifactReport {
    /// Final status once the action has run.
    pub fn final_status(&self) -> IntegrityStatus {
        match self.action {
            ScanAction::None | ScanAction::Recovered => IntegrityStatus::Safe,
            ScanAction::Unrecoverable { .. } => IntegrityStatus::Compromised,
        }
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self.action, ScanAction::Recovered)
    }

    pub fn is_unrecoverable(&self) -> bool {
        matches!(self.action, ScanAction::Unrecoverable { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub baseline_hash: String,
    pub artifacts: Vec<ArtifactReport>,
}

impl ScanReport {
    pub fn recovered(&self) -> usize {
        self.artifacts.iter().filter(|a| a.is_recovered()).count()
    }

    pub fn unrecoverable(&self) -> usize {
        self.artifacts.iter().filter(|a| a.is_unrecoverable()).count()
    }
}
