use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FirmwareError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Baseline not found: {0}")]
    BaselineMissing(PathBuf),

    #[error("Artifact pattern error: {0}")]
    Pattern(String),

    #[error("Artifact {artifact} could not be restored: {reason}")]
    Unrecoverable { artifact: String, reason: String },
}

pub type Result<T> = std::result::Result<T, FirmwareError>;
