//! Configuration for the Skyward security core

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Prefix of environment variables overriding security settings
pub const ENV_PREFIX: &str = "SKYWARD_SECURITY";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Unsupported key management mode: {0}")]
    UnsupportedKeyManagement(String),
}

/// Where keys live. Only the local file store exists today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyManagementMode {
    Local,
}

impl FromStr for KeyManagementMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(KeyManagementMode::Local),
            other => Err(ConfigError::UnsupportedKeyManagement(other.to_string())),
        }
    }
}

impl fmt::Display for KeyManagementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyManagementMode::Local => f.write_str("local"),
        }
    }
}

/// Raw settings as they appear in config files and the environment
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    pub encryption: bool,
    pub audit_logging: bool,
    pub key_management: String,
    pub audit_log_path: String,
    pub key_store_path: String,
    /// Seconds
    pub rotation_period: u64,
    pub default_key: String,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            encryption: true,
            audit_logging: true,
            key_management: "local".to_string(),
            audit_log_path: "./.skyward/audit.log".to_string(),
            key_store_path: "./.skyward/keys.json".to_string(),
            rotation_period: 90 * 24 * 60 * 60,
            default_key: "default".to_string(),
        }
    }
}

/// Security configuration, fixed for the lifetime of the process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityConfig {
    pub encryption_enabled: bool,
    pub audit_logging_enabled: bool,
    pub key_management_mode: KeyManagementMode,
    pub audit_log_path: PathBuf,
    pub key_store_path: PathBuf,
    /// Advisory; nothing rotates keys automatically
    pub key_rotation_period: Duration,
    /// Key used for sensitive-field encryption, seeded into an empty store
    pub default_key: String,
}

impl SecurityConfig {
    /// Load configuration from `.env`, an optional file and the environment.
    ///
    /// Later sources win: defaults, then the file, then `SKYWARD_SECURITY_*`
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();
        Self::load_with_env(path, None)
    }

    /// Like [`load`](Self::load) but reads variables from `env` instead of
    /// the process environment when given.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(env),
        );

        let settings: SecuritySettings = builder.build()?.try_deserialize()?;
        Self::from_settings(settings)
    }

    /// Validate raw settings
    pub fn from_settings(settings: SecuritySettings) -> Result<Self, ConfigError> {
        Ok(Self {
            encryption_enabled: settings.encryption,
            audit_logging_enabled: settings.audit_logging,
            key_management_mode: settings.key_management.parse()?,
            audit_log_path: PathBuf::from(settings.audit_log_path),
            key_store_path: PathBuf::from(settings.key_store_path),
            key_rotation_period: Duration::from_secs(settings.rotation_period),
            default_key: settings.default_key,
        })
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        // The default settings always carry a supported mode
        Self {
            encryption_enabled: true,
            audit_logging_enabled: true,
            key_management_mode: KeyManagementMode::Local,
            audit_log_path: PathBuf::from("./.skyward/audit.log"),
            key_store_path: PathBuf::from("./.skyward/keys.json"),
            key_rotation_period: Duration::from_secs(SecuritySettings::default().rotation_period),
            default_key: "default".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SecurityConfig::load_with_env(None, Some(HashMap::new())).unwrap();
        assert_eq!(config, SecurityConfig::default());
        assert_eq!(config.key_rotation_period, Duration::from_secs(7_776_000));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
encryption = false
audit_log_path = "/var/log/skyward/audit.log"
rotation_period = 3600
default_key = "primary"
"#
        )
        .unwrap();

        let config =
            SecurityConfig::load_with_env(Some(file.path()), Some(HashMap::new())).unwrap();

        assert!(!config.encryption_enabled);
        assert!(config.audit_logging_enabled);
        assert_eq!(config.audit_log_path, PathBuf::from("/var/log/skyward/audit.log"));
        assert_eq!(config.key_rotation_period, Duration::from_secs(3600));
        assert_eq!(config.default_key, "primary");
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "audit_logging = true").unwrap();

        let env = HashMap::from([
            ("SKYWARD_SECURITY_AUDIT_LOGGING".to_string(), "false".to_string()),
            ("SKYWARD_SECURITY_KEY_STORE_PATH".to_string(), "/tmp/keys.json".to_string()),
        ]);
        let config = SecurityConfig::load_with_env(Some(file.path()), Some(env)).unwrap();

        assert!(!config.audit_logging_enabled);
        assert_eq!(config.key_store_path, PathBuf::from("/tmp/keys.json"));
    }

    #[test]
    fn test_unknown_key_management_rejected() {
        let settings = SecuritySettings {
            key_management: "hsm".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            SecurityConfig::from_settings(settings),
            Err(ConfigError::UnsupportedKeyManagement(mode)) if mode == "hsm"
        ));
        assert_eq!("LOCAL".parse::<KeyManagementMode>().unwrap(), KeyManagementMode::Local);
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = SecurityConfig::load_with_env(
            Some(Path::new("/nonexistent/skyward.toml")),
            Some(HashMap::new()),
        );
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }
}
