use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use firmware::{ArtifactSet, ArtifactSpec};

use crate::catalog::{default_items, CatalogItem};
use crate::error::{EngineError, EngineResult};
use crate::random::DeltaRange;

pub const ENGINE_CONFIG_FILENAME: &str = "trustshield.json";
pub const ENGINE_CONFIG_VERSION: &str = "1.0.0";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub version: String,
    pub scores: ScoreSettings,
    pub thresholds: Thresholds,
    pub rewards: Rewards,
    pub device_trust_pass_probability: f64,
    pub geo: GeoSettings,
    pub checkout: CheckoutSettings,
    pub otp_length: usize,
    pub admin: AdminSettings,
    pub catalog: Vec<CatalogItem>,
    pub sessions: SessionSettings,
    pub firmware: FirmwareSettings,
    pub audit: AuditSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreSettings {
    pub initial_global: u8,
    pub initial_session: u8,
    /// ScoreEvents kept in memory per subject; oldest dropped first.
    pub history_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub mfa_bypass: u8,
    pub typing_min_len: usize,
    pub typing_max_len: usize,
    pub cart_warn_value: u64,
    pub cart_lock_value: u64,
    pub luxury_only_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Rewards {
    pub typing_natural: DeltaRange,
    pub typing_short: DeltaRange,
    pub typing_long: DeltaRange,
    pub ip_consistent: DeltaRange,
    pub ip_changed: DeltaRange,
    pub zero_trust_granted: DeltaRange,
    pub zero_trust_denied: DeltaRange,
    pub mfa_bypass: DeltaRange,
    pub otp_verified: DeltaRange,
    pub cart_high_value: DeltaRange,
    pub cart_value_lock: DeltaRange,
    pub cart_luxury_only: DeltaRange,
    pub checkout_direct: DeltaRange,
    pub checkout_reauth_passed: DeltaRange,
    pub checkout_reauth_failed: DeltaRange,
    pub admin_anomaly: DeltaRange,
    pub firmware_recovered: DeltaRange,
    pub firmware_safe: DeltaRange,
    pub honeypot: DeltaRange,
    pub payment: DeltaRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoSettings {
    pub allowed_region: String,
    pub current_location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutSettings {
    pub reauth_secret: String,
    pub default_shipping: String,
    pub default_payment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSettings {
    pub denylist: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub idle_seconds: u64,
    pub max_sessions: u64,
    pub default_user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FirmwareSettings {
    /// Relative paths resolve against the engine home directory.
    pub dir: PathBuf,
    pub baseline: String,
    pub suffix: String,
    /// Empty means every `*{suffix}` file in `dir`.
    pub artifacts: Vec<FirmwareArtifact>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirmwareArtifact {
    pub label: String,
    pub file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSettings {
    pub capacity: usize,
    pub bus_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: ENGINE_CONFIG_VERSION.to_string(),
            scores: ScoreSettings::default(),
            thresholds: Thresholds::default(),
            rewards: Rewards::default(),
            device_trust_pass_probability: 0.8,
            geo: GeoSettings::default(),
            checkout: CheckoutSettings::default(),
            otp_length: 6,
            admin: AdminSettings::default(),
            catalog: default_items(),
            sessions: SessionSettings::default(),
            firmware: FirmwareSettings::default(),
            audit: AuditSettings::default(),
            server: ServerSettings::default(),
        }
    }
}

impl Default for ScoreSettings {
    fn default() -> Self {
        Self {
            initial_global: 70,
            initial_session: 70,
            history_limit: 256,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            mfa_bypass: 75,
            typing_min_len: 10,
            typing_max_len: 100,
            cart_warn_value: 500,
            cart_lock_value: 600,
            luxury_only_count: 6,
        }
    }
}

impl Default for Rewards {
    fn default() -> Self {
        Self {
            typing_natural: DeltaRange::new(10, 20),
            typing_short: DeltaRange::new(-25, -15),
            typing_long: DeltaRange::new(-30, -20),
            ip_consistent: DeltaRange::new(5, 10),
            ip_changed: DeltaRange::new(-30, -20),
            zero_trust_granted: DeltaRange::new(3, 7),
            zero_trust_denied: DeltaRange::new(-10, -5),
            mfa_bypass: DeltaRange::new(3, 7),
            otp_verified: DeltaRange::new(1, 4),
            cart_high_value: DeltaRange::new(-8, -3),
            cart_value_lock: DeltaRange::new(-15, -10),
            cart_luxury_only: DeltaRange::new(-12, -7),
            checkout_direct: DeltaRange::new(3, 7),
            checkout_reauth_passed: DeltaRange::new(5, 10),
            checkout_reauth_failed: DeltaRange::new(-8, -3),
            admin_anomaly: DeltaRange::new(-5, -2),
            firmware_recovered: DeltaRange::new(5, 10),
            firmware_safe: DeltaRange::new(1, 3),
            honeypot: DeltaRange::new(-15, -8),
            payment: DeltaRange::new(2, 5),
        }
    }
}

impl Default for GeoSettings {
    fn default() -> Self {
        Self {
            allowed_region: "Bengaluru".to_string(),
            current_location: "Bengaluru, Karnataka, India".to_string(),
        }
    }
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            reauth_secret: "password123".to_string(),
            default_shipping: "123 Main St, Anytown".to_string(),
            default_payment: "Visa ending 1234".to_string(),
        }
    }
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            denylist: vec!["download customer data".to_string()],
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_seconds: 86_400,
            max_sessions: 10_000,
            default_user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Default for FirmwareSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("firmware"),
            baseline: "baseline_firmware.bin".to_string(),
            suffix: "_modified.bin".to_string(),
            artifacts: Vec::new(),
        }
    }
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            capacity: 4096,
            bus_capacity: 256,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:4840".to_string(),
        }
    }
}

impl FirmwareSettings {
    pub fn resolved_dir(&self, home: &Path) -> PathBuf {
        if self.dir.is_absolute() {
            self.dir.clone()
        } else {
            home.join(&self.dir)
        }
    }

    pub fn baseline_path(&self, home: &Path) -> PathBuf {
        self.resolved_dir(home).join(&self.baseline)
    }

    pub fn artifact_set(&self, home: &Path) -> ArtifactSet {
        let dir = self.resolved_dir(home);
        if self.artifacts.is_empty() {
            return ArtifactSet::Discover {
                dir,
                suffix: self.suffix.clone(),
            };
        }
        ArtifactSet::Listed(
            self.artifacts
                .iter()
                .map(|artifact| ArtifactSpec {
                    label: artifact.label.clone(),
                    path: dir.join(&artifact.file),
                })
                .collect(),
        )
    }
}

impl EngineConfig {
    pub fn load_or_create(dir: &Path) -> EngineResult<Self> {
        std::fs::create_dir_all(dir).map_err(|error| {
            EngineError::Config(format!(
                "failed to create engine directory {}: {error}",
                dir.display()
            ))
        })?;

        let path = config_path(dir);
        if !path.exists() {
            let config = EngineConfig::default();
            write_config(&path, &config)?;
            return Ok(config);
        }

        let data = std::fs::read_to_string(&path).map_err(|error| {
            EngineError::Config(format!(
                "failed to read engine config {}: {error}",
                path.display()
            ))
        })?;
        let mut config: EngineConfig = serde_json::from_str(&data).map_err(|error| {
            EngineError::Config(format!(
                "failed to parse engine config {}: {error}",
                path.display()
            ))
        })?;

        if config.version != ENGINE_CONFIG_VERSION {
            config = migrate_config(config)?;
            write_config(&path, &config)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.scores.initial_global > 100 || self.scores.initial_session > 100 {
            return Err(EngineError::Config(
                "initial scores must be within 0..=100".to_string(),
            ));
        }
        if self.thresholds.typing_min_len > self.thresholds.typing_max_len {
            return Err(EngineError::Config(format!(
                "typing_min_len {} exceeds typing_max_len {}",
                self.thresholds.typing_min_len, self.thresholds.typing_max_len
            )));
        }
        if !(0.0..=1.0).contains(&self.device_trust_pass_probability) {
            return Err(EngineError::Config(format!(
                "device_trust_pass_probability {} is not a probability",
                self.device_trust_pass_probability
            )));
        }
        if self.otp_length == 0 {
            return Err(EngineError::Config("otp_length must be positive".to_string()));
        }
        if self.audit.capacity == 0 || self.audit.bus_capacity == 0 {
            return Err(EngineError::Config(
                "audit capacities must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn migrate_config(config: EngineConfig) -> EngineResult<EngineConfig> {
    Err(EngineError::Config(format!(
        "unsupported config version {} (expected {ENGINE_CONFIG_VERSION})",
        config.version
    )))
}

pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(ENGINE_CONFIG_FILENAME)
}

fn write_config(path: &Path, config: &EngineConfig) -> EngineResult<()> {
    let data = serde_json::to_string_pretty(config).map_err(|error| {
        EngineError::Config(format!("failed to serialize engine config: {error}"))
    })?;
    std::fs::write(path, data).map_err(|error| {
        EngineError::Config(format!(
            "failed to write engine config {}: {error}",
            path.display()
        ))
    })
}
