use crate::error::{PortierError, Result};
use crate::types::Target;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "portier.yaml";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Secret
// ---------------------------------------------------------------------------

/// A credential that must never reach logs. `Debug` prints a placeholder.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Secret(<unset>)")
        } else {
            f.write_str("Secret(***)")
        }
    }
}

// ---------------------------------------------------------------------------
// ApiConfig
// ---------------------------------------------------------------------------

/// Remote lock API the unlock calls go to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub token: Secret,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.nuki.io".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: Secret::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ---------------------------------------------------------------------------
// TargetsConfig
// ---------------------------------------------------------------------------

/// Lock identifiers on the remote API, one per target.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetsConfig {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub floor: String,
}

impl TargetsConfig {
    pub fn lock_id(&self, target: Target) -> &str {
        match target {
            Target::Street => &self.street,
            Target::Floor => &self.floor,
        }
    }
}

// ---------------------------------------------------------------------------
// DelayConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayConfig {
    #[serde(default = "default_delay_secs")]
    pub default_secs: u64,
    #[serde(default = "default_max_delay_secs")]
    pub max_secs: u64,
}

fn default_delay_secs() -> u64 {
    50
}

/// Upper bound accepted for `delay.max_secs`: one week.
pub const MAX_DELAY_CEILING_SECS: u64 = 7 * 86_400;

fn default_max_delay_secs() -> u64 {
    3600
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            default_secs: default_delay_secs(),
            max_secs: default_max_delay_secs(),
        }
    }
}

impl DelayConfig {
    /// Resolve a requested override into the delay actually used.
    ///
    /// `None` and `Some(0)` fall back to `default_secs`.
    pub fn effective(&self, requested: Option<u64>) -> Result<u64> {
        match requested {
            None | Some(0) => Ok(self.default_secs),
            Some(secs) if secs > self.max_secs => Err(PortierError::DelayTooLong {
                requested: secs,
                max: self.max_secs,
            }),
            Some(secs) => Ok(secs),
        }
    }
}

// ---------------------------------------------------------------------------
// SchedulerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Arm the second lock even when the first unlock failed.
    #[serde(default)]
    pub arm_after_failure: bool,
    /// Seconds an idle per-key actor waits for mail before retiring.
    #[serde(default = "default_idle_secs")]
    pub idle_secs: u64,
    #[serde(default = "default_mailbox")]
    pub mailbox: usize,
}

fn default_idle_secs() -> u64 {
    300
}

fn default_mailbox() -> usize {
    16
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            arm_after_failure: false,
            idle_secs: default_idle_secs(),
            mailbox: default_mailbox(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: u32,
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default)]
    pub auth_key: Secret,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub targets: TargetsConfig,
    #[serde(default)]
    pub delay: DelayConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

fn default_listen() -> String {
    "0.0.0.0:8787".to_string()
}

fn default_store_path() -> PathBuf {
    PathBuf::from("portier.db")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            listen: default_listen(),
            auth_key: Secret::default(),
            api: ApiConfig::default(),
            targets: TargetsConfig::default(),
            delay: DelayConfig::default(),
            scheduler: SchedulerConfig::default(),
            store_path: default_store_path(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PortierError::ConfigNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Resolve `store_path` against the directory holding the config file.
    pub fn resolved_store_path(&self, config_path: &Path) -> PathBuf {
        if self.store_path.is_absolute() {
            return self.store_path.clone();
        }
        config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|dir| dir.join(&self.store_path))
            .unwrap_or_else(|| self.store_path.clone())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|_| PortierError::InvalidConfig(format!("listen address '{}'", self.listen)))
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut out = Vec::new();
        let mut push = |level: WarnLevel, message: String| {
            out.push(ConfigWarning { level, message });
        };

        if self.auth_key.is_empty() {
            push(WarnLevel::Error, "auth_key is not set".to_string());
        } else if self.auth_key.expose().len() < 16 {
            push(
                WarnLevel::Warning,
                "auth_key is shorter than 16 characters".to_string(),
            );
        }

        if self.api.token.is_empty() {
            push(WarnLevel::Error, "api.token is not set".to_string());
        }
        if !self.api.base_url.starts_with("https://") {
            push(
                WarnLevel::Warning,
                format!("api.base_url '{}' is not https", self.api.base_url),
            );
        }
        if self.api.timeout_secs == 0 {
            push(WarnLevel::Error, "api.timeout_secs must be > 0".to_string());
        }

        for target in Target::all() {
            if self.targets.lock_id(*target).trim().is_empty() {
                push(
                    WarnLevel::Error,
                    format!("targets.{target} lock id is not set"),
                );
            }
        }
        if !self.targets.street.is_empty() && self.targets.street == self.targets.floor {
            push(
                WarnLevel::Warning,
                "targets.street and targets.floor point at the same lock".to_string(),
            );
        }

        if self.delay.default_secs == 0 {
            push(WarnLevel::Error, "delay.default_secs must be > 0".to_string());
        }
        if self.delay.default_secs > self.delay.max_secs {
            push(
                WarnLevel::Error,
                format!(
                    "delay.default_secs ({}) exceeds delay.max_secs ({})",
                    self.delay.default_secs, self.delay.max_secs
                ),
            );
        }

        if self.delay.max_secs > MAX_DELAY_CEILING_SECS {
            push(
                WarnLevel::Error,
                format!(
                    "delay.max_secs ({}) exceeds the {MAX_DELAY_CEILING_SECS}s ceiling",
                    self.delay.max_secs
                ),
            );
        }

        if self.scheduler.mailbox == 0 {
            push(WarnLevel::Error, "scheduler.mailbox must be > 0".to_string());
        }
        if self.scheduler.arm_after_failure {
            push(
                WarnLevel::Warning,
                "scheduler.arm_after_failure is on: the floor lock opens even if the street lock failed"
                    .to_string(),
            );
        }

        if self.listen_addr().is_err() {
            push(
                WarnLevel::Error,
                format!("listen '{}' is not a socket address", self.listen),
            );
        }

        out
    }

    pub fn has_errors(warnings: &[ConfigWarning]) -> bool {
        warnings.iter().any(|w| w.level == WarnLevel::Error)
    }
}

/// Starter file written by `portier config init`.
pub const SAMPLE_CONFIG: &str = r#"# portier configuration
version: 1
listen: 0.0.0.0:8787

# Value the Authorization header must carry. Prefer PORTIER_AUTH_KEY.
auth_key: ""

api:
  base_url: https://api.nuki.io
  # Bearer token for the lock API. Prefer PORTIER_API_TOKEN.
  token: ""
  timeout_secs: 10

# Smartlock ids on the remote API.
targets:
  street: ""
  floor: ""

delay:
  default_secs: 50
  max_secs: 3600

scheduler:
  arm_after_failure: false
  idle_secs: 300
  mailbox: 16

store_path: portier.db
"#;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config {
            auth_key: Secret::new("a-very-long-shared-secret"),
            api: ApiConfig {
                token: Secret::new("api-token"),
                ..ApiConfig::default()
            },
            targets: TargetsConfig {
                street: "111".to_string(),
                floor: "222".to_string(),
            },
            ..Config::default()
        }
    }

    #[test]
    fn sample_config_parses_with_defaults() {
        let cfg: Config = serde_yaml::from_str(SAMPLE_CONFIG).unwrap();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.delay.default_secs, 50);
        assert_eq!(cfg.api.base_url, "https://api.nuki.io");
        assert!(!cfg.scheduler.arm_after_failure);
    }

    #[test]
    fn minimal_yaml_fills_defaults() {
        let cfg: Config = serde_yaml::from_str("version: 1\n").unwrap();
        assert_eq!(cfg.listen, "0.0.0.0:8787");
        assert_eq!(cfg.api.timeout_secs, 10);
        assert_eq!(cfg.scheduler.idle_secs, 300);
        assert_eq!(cfg.store_path, PathBuf::from("portier.db"));
    }

    #[test]
    fn secret_debug_is_redacted() {
        let cfg = valid();
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("a-very-long-shared-secret"));
        assert!(!dbg.contains("api-token"));
        assert!(dbg.contains("Secret(***)"));
    }

    #[test]
    fn valid_config_has_no_errors() {
        let warnings = valid().validate();
        assert!(!Config::has_errors(&warnings), "{warnings:?}");
    }

    #[test]
    fn default_config_reports_missing_secrets() {
        let warnings = Config::default().validate();
        assert!(Config::has_errors(&warnings));
        let messages: Vec<_> = warnings.iter().map(|w| w.message.as_str()).collect();
        assert!(messages.contains(&"auth_key is not set"));
        assert!(messages.contains(&"api.token is not set"));
        assert!(messages.contains(&"targets.street lock id is not set"));
        assert!(messages.contains(&"targets.floor lock id is not set"));
    }

    #[test]
    fn default_delay_above_max_is_error() {
        let mut cfg = valid();
        cfg.delay.default_secs = 100;
        cfg.delay.max_secs = 60;
        assert!(Config::has_errors(&cfg.validate()));
    }

    #[test]
    fn max_delay_above_ceiling_is_error() {
        let mut cfg = valid();
        cfg.delay.max_secs = MAX_DELAY_CEILING_SECS;
        assert!(!Config::has_errors(&cfg.validate()));

        cfg.delay.max_secs = u64::MAX;
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.starts_with("delay.max_secs")));
    }

    #[test]
    fn effective_delay_rules() {
        let delay = DelayConfig::default();
        assert_eq!(delay.effective(None).unwrap(), 50);
        assert_eq!(delay.effective(Some(0)).unwrap(), 50);
        assert_eq!(delay.effective(Some(5)).unwrap(), 5);
        assert!(matches!(
            delay.effective(Some(7200)),
            Err(PortierError::DelayTooLong { requested: 7200, max: 3600 })
        ));
    }

    #[test]
    fn load_missing_file_is_config_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = Config::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, PortierError::ConfigNotFound(_)));
    }

    #[test]
    fn load_reads_written_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        let yaml = "version: 1\nauth_key: a-very-long-shared-secret\ntargets:\n  street: \"111\"\n  floor: \"222\"\n";
        std::fs::write(&path, yaml).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.auth_key.expose(), "a-very-long-shared-secret");
        assert_eq!(loaded.targets.lock_id(Target::Floor), "222");
    }

    #[test]
    fn store_path_resolves_next_to_config() {
        let cfg = Config::default();
        assert_eq!(
            cfg.resolved_store_path(Path::new("/etc/portier/portier.yaml")),
            PathBuf::from("/etc/portier/portier.db")
        );
        assert_eq!(
            cfg.resolved_store_path(Path::new("portier.yaml")),
            PathBuf::from("portier.db")
        );
    }
}
