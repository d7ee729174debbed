//! Configuration loading for the REWIND TUI.
//!
//! All fields are required unless explicitly marked optional. No defaults.

use rewind_core::{ReplayConfig, MAX_PLAYBACK_SPEED, MIN_PLAYBACK_SPEED};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV_VAR: &str = "REWIND_TUI_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TuiConfig {
    pub run_id: String,
    pub source: SourceConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    pub request_timeout_ms: u64,
    pub refresh_interval_ms: u64,
    pub persistence_path: PathBuf,
    pub error_log_path: PathBuf,
    pub export_dir: PathBuf,
    pub initial_speed: f64,
    pub theme: ThemeConfig,
    pub reconnect: ReconnectConfig,
}

/// Where run data comes from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// A JSON file holding the four record arrays.
    File { path: PathBuf },
    /// `GET {api_base_url}/runs/{run_id}/replay`.
    Http { api_base_url: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    pub api_key: Option<String>,
    pub jwt: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeConfig {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconnectConfig {
    pub initial_ms: u64,
    pub max_ms: u64,
    pub multiplier: f64,
    pub jitter_ms: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or REWIND_TUI_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl TuiConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.run_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "run_id",
                reason: "must not be empty".to_string(),
            });
        }
        match &self.source {
            SourceConfig::File { path } => {
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "source.path",
                        reason: "must not be empty".to_string(),
                    });
                }
            }
            SourceConfig::Http { api_base_url } => {
                if api_base_url.trim().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "source.api_base_url",
                        reason: "must not be empty".to_string(),
                    });
                }
                if self.auth.api_key.is_none() && self.auth.jwt.is_none() {
                    return Err(ConfigError::InvalidValue {
                        field: "auth",
                        reason: "api_key or jwt must be provided for http sources".to_string(),
                    });
                }
            }
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "refresh_interval_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.persistence_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "persistence_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.error_log_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "error_log_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.export_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "export_dir",
                reason: "must not be empty".to_string(),
            });
        }
        if !(MIN_PLAYBACK_SPEED..=MAX_PLAYBACK_SPEED).contains(&self.initial_speed) {
            return Err(ConfigError::InvalidValue {
                field: "initial_speed",
                reason: format!(
                    "must be within [{}, {}]",
                    MIN_PLAYBACK_SPEED, MAX_PLAYBACK_SPEED
                ),
            });
        }
        if self.theme.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "theme.name",
                reason: "must not be empty".to_string(),
            });
        }
        if self.theme.name.to_ascii_lowercase() != "synthbrute" {
            return Err(ConfigError::InvalidValue {
                field: "theme.name",
                reason: "only 'synthbrute' is supported".to_string(),
            });
        }
        if self.reconnect.initial_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "reconnect.initial_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.reconnect.max_ms < self.reconnect.initial_ms {
            return Err(ConfigError::InvalidValue {
                field: "reconnect.max_ms",
                reason: "must be >= initial_ms".to_string(),
            });
        }
        if self.reconnect.multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "reconnect.multiplier",
                reason: "must be >= 1.0".to_string(),
            });
        }
        Ok(())
    }

    /// Replay engine settings derived from this config.
    pub fn replay_config(&self) -> ReplayConfig {
        ReplayConfig {
            default_speed: self.initial_speed,
            ..ReplayConfig::default()
        }
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
run_id = "run-42"
request_timeout_ms = 5000
refresh_interval_ms = 2000
persistence_path = "tmp/rewind-tui.json"
error_log_path = "tmp/rewind-tui.log"
export_dir = "tmp/exports"
initial_speed = 1.0

[source]
kind = "http"
api_base_url = "http://localhost:8080"

[auth]
api_key = "key"

[theme]
name = "synthbrute"

[reconnect]
initial_ms = 250
max_ms = 5000
multiplier = 1.5
jitter_ms = 100
"#;

    #[test]
    fn test_parses_http_source() {
        let config = TuiConfig::from_toml(SAMPLE).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.source,
            SourceConfig::Http {
                api_base_url: "http://localhost:8080".to_string()
            }
        );
        assert_eq!(config.replay_config().default_speed, 1.0);
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let contents = SAMPLE.replace("initial_speed = 1.0", "initial_speed = 1.0\nbogus = 1");
        assert!(matches!(
            TuiConfig::from_toml(&contents),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_file_source_needs_no_auth() {
        let contents = SAMPLE
            .replace("kind = \"http\"\napi_base_url = \"http://localhost:8080\"", "kind = \"file\"\npath = \"run.json\"")
            .replace("[auth]\napi_key = \"key\"\n", "");
        let config = TuiConfig::from_toml(&contents).unwrap();
        assert_eq!(
            config.source,
            SourceConfig::File {
                path: PathBuf::from("run.json")
            }
        );
        assert!(config.validate().is_ok());
    }
}
