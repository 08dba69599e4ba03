//! Baseline comparison and automatic restoration.
//!
//! A scan hashes the trusted baseline once, then checks every monitored
//! artifact in parallel. A mismatching artifact is overwritten with the
//! baseline content and hashed again; only a matching re-hash counts as
//! recovered.
//!
//! Scans on one monitor run one at a time. A restore writes a sibling
//! temporary file and renames it over the artifact, so a concurrent reader
//! sees either the old bytes or the full baseline.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rayon::prelude::*;

use crate::digest::{hash_file, Digest256};
use crate::error::{FirmwareError, Result};
use crate::types::{ArtifactReport, ArtifactSpec, IntegrityStatus, ScanAction, ScanReport};

/// Which files a monitor watches.
#[derive(Debug, Clone)]
pub enum ArtifactSet {
    /// Every file in `dir` whose name ends with `suffix`.
    Discover { dir: PathBuf, suffix: String },
    /// A fixed list.
    Listed(Vec<ArtifactSpec>),
}

#[derive(Debug)]
pub struct FirmwareMonitor {
    baseline: PathBuf,
    artifacts: ArtifactSet,
    last_status: Mutex<HashMap<String, IntegrityStatus>>,
    scan_lock: Mutex<()>,
}

impl FirmwareMonitor {
    pub fn new(baseline: impl Into<PathBuf>, artifacts: ArtifactSet) -> Self {
        Self {
            baseline: baseline.into(),
            artifacts,
            last_status: Mutex::new(HashMap::new()),
            scan_lock: Mutex::new(()),
        }
    }

    pub fn baseline(&self) -> &Path {
        &self.baseline
    }

    /// Status left by the most recent scan, `Unknown` if never scanned.
    pub fn status_of(&self, label: &str) -> IntegrityStatus {
        self.last_status
            .lock()
            .get(label)
            .copied()
            .unwrap_or(IntegrityStatus::Unknown)
    }

    /// Resolves the monitored artifacts, sorted by label.
    pub fn artifacts(&self) -> Result<Vec<ArtifactSpec>> {
        let mut specs = match &self.artifacts {
            ArtifactSet::Listed(specs) => specs.clone(),
            ArtifactSet::Discover { dir, suffix } => discover(dir, suffix, &self.baseline)?,
        };
        specs.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(specs)
    }

    pub fn scan(&self) -> Result<ScanReport> {
        let _scanning = self.scan_lock.lock();
        if !self.baseline.is_file() {
            return Err(FirmwareError::BaselineMissing(self.baseline.clone()));
        }
        let baseline_hash = hash_file(&self.baseline)?;
        let specs = self.artifacts()?;
        log::debug!(
            "firmware scan starting: {} artifacts against {}",
            specs.len(),
            self.baseline.display()
        );

        let mut reports: Vec<ArtifactReport> = specs
            .par_iter()
            .map(|spec| self.check_artifact(spec, &baseline_hash))
            .collect();

        {
            let mut last = self.last_status.lock();
            for report in &mut reports {
                report.previous_scan = last
                    .insert(report.artifact.clone(), report.final_status())
                    .unwrap_or(IntegrityStatus::Unknown);
            }
        }

        let report = ScanReport {
            baseline_hash: baseline_hash.to_hex(),
            artifacts: reports,
        };
        log::info!(
            "firmware scan finished: {} artifacts, {} recovered, {} unrecoverable",
            report.artifacts.len(),
            report.recovered(),
            report.unrecoverable()
        );
        Ok(report)
    }

    fn check_artifact(&self, spec: &ArtifactSpec, baseline_hash: &Digest256) -> ArtifactReport {
        let observed = hash_file(&spec.path);
        let observed_hash = observed.as_ref().ok().map(Digest256::to_hex);

        let (prior_status, action) = match observed {
            Ok(digest) if digest == *baseline_hash => (IntegrityStatus::Safe, ScanAction::None),
            _ => {
                let action = match self.recover(spec, baseline_hash) {
                    Ok(()) => ScanAction::Recovered,
                    Err(error) => {
                        log::warn!("firmware artifact {} left compromised: {error}", spec.label);
                        ScanAction::Unrecoverable {
                            reason: error.to_string(),
                        }
                    }
                };
                (IntegrityStatus::Compromised, action)
            }
        };

        ArtifactReport {
            artifact: spec.label.clone(),
            path: spec.path.clone(),
            prior_status,
            action,
            previous_scan: IntegrityStatus::Unknown,
            observed_hash,
        }
    }

    fn recover(&self, spec: &ArtifactSpec, baseline_hash: &Digest256) -> Result<()> {
        let tmp_path = restore_path(&spec.path);
        std::fs::copy(&self.baseline, &tmp_path).map_err(|error| {
            let _ = std::fs::remove_file(&tmp_path);
            FirmwareError::Unrecoverable {
                artifact: spec.label.clone(),
                reason: format!("restore copy failed: {error}"),
            }
        })?;
        std::fs::rename(&tmp_path, &spec.path).map_err(|error| {
            let _ = std::fs::remove_file(&tmp_path);
            FirmwareError::Unrecoverable {
                artifact: spec.label.clone(),
                reason: format!("restore rename failed: {error}"),
            }
        })?;
        let after = hash_file(&spec.path).map_err(|error| FirmwareError::Unrecoverable {
            artifact: spec.label.clone(),
            reason: format!("re-verification failed: {error}"),
        })?;
        if after != *baseline_hash {
            return Err(FirmwareError::Unrecoverable {
                artifact: spec.label.clone(),
                reason: "digest mismatch persists after restore".to_string(),
            });
        }
        log::info!("firmware artifact {} restored from baseline", spec.label);
        Ok(())
    }
}

fn restore_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".restore");
    path.with_file_name(name)
}

fn discover(dir: &Path, suffix: &str, baseline: &Path) -> Result<Vec<ArtifactSpec>> {
    let pattern = dir.join(format!("*{suffix}"));
    let pattern = pattern
        .to_str()
        .ok_or_else(|| FirmwareError::Pattern(format!("non-utf8 path {}", dir.display())))?;
    let entries = glob::glob(pattern).map_err(|error| FirmwareError::Pattern(error.to_string()))?;

    let mut specs = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(error) => {
                log::warn!("skipping unreadable firmware entry: {error}");
                continue;
            }
        };
        if path == baseline || !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let label = name.strip_suffix(suffix).unwrap_or(name).to_string();
        specs.push(ArtifactSpec { label, path });
    }
    Ok(specs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::hash_bytes;
    use tempfile::tempdir;

    const BASELINE: &[u8] = b"BASELINE_FIRMWARE_IMAGE_\x00\x00\x00\x00";

    fn fixture(dir: &Path, tampered: &[&str], clean: &[&str]) -> PathBuf {
        let baseline = dir.join("baseline_firmware.bin");
        std::fs::write(&baseline, BASELINE).expect("baseline");
        for label in tampered {
            let body = format!("{}_ATTACK_VECTOR_", label.to_uppercase());
            std::fs::write(dir.join(format!("{label}_modified.bin")), body).expect("tampered");
        }
        for label in clean {
            std::fs::write(dir.join(format!("{label}_modified.bin")), BASELINE).expect("clean");
        }
        baseline
    }

    fn discover_set(dir: &Path) -> ArtifactSet {
        ArtifactSet::Discover {
            dir: dir.to_path_buf(),
            suffix: "_modified.bin".to_string(),
        }
    }

    #[test]
    fn discovers_artifacts_sorted_without_baseline() {
        let dir = tempdir().expect("tempdir");
        let baseline = fixture(dir.path(), &["moonbounce", "lojax"], &["boothole"]);
        std::fs::write(dir.path().join("notes.txt"), "ignored").expect("write");

        let monitor = FirmwareMonitor::new(baseline, discover_set(dir.path()));
        let labels: Vec<String> = monitor
            .artifacts()
            .expect("artifacts")
            .into_iter()
            .map(|a| a.label)
            .collect();
        assert_eq!(labels, vec!["boothole", "lojax", "moonbounce"]);
    }

    #[test]
    fn matching_artifact_is_safe_and_untouched() {
        let dir = tempdir().expect("tempdir");
        let baseline = fixture(dir.path(), &[], &["evil_maid"]);
        let path = dir.path().join("evil_maid_modified.bin");
        let modified_before = std::fs::metadata(&path).and_then(|m| m.modified()).ok();

        let monitor = FirmwareMonitor::new(baseline, discover_set(dir.path()));
        let report = monitor.scan().expect("scan");

        assert_eq!(report.artifacts.len(), 1);
        let entry = &report.artifacts[0];
        assert_eq!(entry.prior_status, IntegrityStatus::Safe);
        assert_eq!(entry.action, ScanAction::None);
        assert_eq!(entry.previous_scan, IntegrityStatus::Unknown);
        assert_eq!(
            std::fs::metadata(&path).and_then(|m| m.modified()).ok(),
            modified_before
        );
    }

    #[test]
    fn tampered_artifact_is_recovered_then_safe() {
        let dir = tempdir().expect("tempdir");
        let baseline = fixture(dir.path(), &["lojax"], &[]);
        let monitor = FirmwareMonitor::new(baseline, discover_set(dir.path()));

        let first = monitor.scan().expect("first scan");
        assert_eq!(first.artifacts[0].prior_status, IntegrityStatus::Compromised);
        assert_eq!(first.artifacts[0].action, ScanAction::Recovered);
        assert_eq!(
            std::fs::read(dir.path().join("lojax_modified.bin")).expect("read"),
            BASELINE
        );

        let second = monitor.scan().expect("second scan");
        assert_eq!(second.artifacts[0].prior_status, IntegrityStatus::Safe);
        assert_eq!(second.artifacts[0].action, ScanAction::None);
        assert_eq!(second.artifacts[0].previous_scan, IntegrityStatus::Safe);
        assert_eq!(monitor.status_of("lojax"), IntegrityStatus::Safe);
    }

    #[test]
    fn missing_listed_artifact_is_restored() {
        let dir = tempdir().expect("tempdir");
        let baseline = fixture(dir.path(), &[], &[]);
        let path = dir.path().join("boothole_modified.bin");
        let monitor = FirmwareMonitor::new(
            baseline,
            ArtifactSet::Listed(vec![ArtifactSpec {
                label: "BootHole".to_string(),
                path: path.clone(),
            }]),
        );

        let report = monitor.scan().expect("scan");
        assert_eq!(report.artifacts[0].observed_hash, None);
        assert!(report.artifacts[0].is_recovered());
        assert_eq!(hash_file(&path).expect("hash"), hash_bytes(BASELINE));
    }

    #[test]
    fn restore_failure_is_reported_per_artifact() {
        let dir = tempdir().expect("tempdir");
        let baseline = fixture(dir.path(), &["moonbounce"], &[]);
        let monitor = FirmwareMonitor::new(
            baseline,
            ArtifactSet::Listed(vec![
                ArtifactSpec {
                    label: "ghost".to_string(),
                    path: dir.path().join("no-such-dir").join("ghost_modified.bin"),
                },
                ArtifactSpec {
                    label: "moonbounce".to_string(),
                    path: dir.path().join("moonbounce_modified.bin"),
                },
            ]),
        );

        let report = monitor.scan().expect("scan continues");
        assert_eq!(report.unrecoverable(), 1);
        assert_eq!(report.recovered(), 1);
        assert_eq!(monitor.status_of("ghost"), IntegrityStatus::Compromised);
    }

    #[test]
    fn concurrent_scans_recover_exactly_once() {
        let dir = tempdir().expect("tempdir");
        let baseline = dir.path().join("baseline_firmware.bin");
        let image = BASELINE.repeat(64 * 1024);
        std::fs::write(&baseline, &image).expect("baseline");
        let artifact = dir.path().join("lojax_modified.bin");
        let monitor = FirmwareMonitor::new(baseline, discover_set(dir.path()));

        for round in 0..8 {
            std::fs::write(&artifact, b"LOJAX_ATTACK_VECTOR_").expect("tamper");
            let reports: Vec<ScanReport> = std::thread::scope(|scope| {
                let handles: Vec<_> = (0..4)
                    .map(|_| scope.spawn(|| monitor.scan().expect("scan")))
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| handle.join().expect("join"))
                    .collect()
            });

            let unrecoverable: usize = reports.iter().map(ScanReport::unrecoverable).sum();
            let recovered: usize = reports.iter().map(ScanReport::recovered).sum();
            assert_eq!(unrecoverable, 0, "round {round}");
            assert_eq!(recovered, 1, "round {round}");
            assert_eq!(monitor.status_of("lojax"), IntegrityStatus::Safe);
        }
        assert_eq!(std::fs::read(&artifact).expect("read"), image);
        assert!(!dir.path().join("lojax_modified.bin.restore").exists());
    }

    #[test]
    fn missing_baseline_fails_whole_scan() {
        let dir = tempdir().expect("tempdir");
        let monitor = FirmwareMonitor::new(
            dir.path().join("baseline_firmware.bin"),
            discover_set(dir.path()),
        );
        assert!(matches!(
            monitor.scan(),
            Err(FirmwareError::BaselineMissing(_))
        ));
    }
}
