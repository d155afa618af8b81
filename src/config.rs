//! Configuration loading and defaults.
//!
//! Configuration is resolved in order of precedence (highest wins):
//!
//! 1. **Environment variables** — `TERMPLAT_SECURE_DIR`, `TERMPLAT_LOG_FILE`,
//!    `TERMPLAT_FONT`
//! 2. **Config file** — path via `--config <path>`, or `termplat.toml` in CWD
//! 3. **Compiled defaults** — see each field's default value below
//!
//! The TOML file mirrors the struct hierarchy:
//!
//! ```toml
//! config_version = 71
//!
//! [logging]
//! level = "info"
//! debug_log = "debug.log"   # optional
//!
//! [paths]
//! secure_dir = "~/.termplat/sockets"
//! dir_mode = "777"
//!
//! [session]
//! log_file = "$HOME/termplat-logs/session.log"
//! font = "Monospace 12"
//! ```
//!
//! Files written before version 71 stored `log_file` literally, so any `$` or
//! `~` in it is escaped on load.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::dirs::DEFAULT_DIR_MODE;
use crate::filename::Filename;
use crate::fontspec::FontSpec;

/// First config version whose `log_file` may contain expansions.
pub const EXPANSION_CONFIG_VERSION: u32 = 71;

const DEFAULT_CONFIG_FILE: &str = "termplat.toml";

/// Errors from [`Config::load`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level configuration, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Format version of the file (default: current).
    #[serde(default = "default_config_version")]
    pub config_version: u32,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// tracing filter level (default `info`). Overridden by `RUST_LOG` env var.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Debug sink file. Unset disables it.
    #[serde(default)]
    pub debug_log: Option<Filename>,
}

/// Directory locations and creation modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Owner-only directory for sockets and other private state (path template).
    #[serde(default = "default_secure_dir")]
    pub secure_dir: Filename,
    /// Octal mode for directories created by `mkdir-path` (default `777`).
    #[serde(default = "default_dir_mode")]
    pub dir_mode: String,
}

/// Persisted per-session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session log file (path template).
    #[serde(default = "default_log_file")]
    pub log_file: Filename,
    #[serde(default = "default_font")]
    pub font: FontSpec,
}

fn default_config_version() -> u32 {
    EXPANSION_CONFIG_VERSION
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_secure_dir() -> Filename {
    Filename::new("~/.termplat/sockets")
}
fn default_dir_mode() -> String {
    format!("{DEFAULT_DIR_MODE:o}")
}
fn default_log_file() -> Filename {
    Filename::new("$HOME/termplat-logs/session.log")
}
fn default_font() -> FontSpec {
    FontSpec::new("Monospace 12")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            logging: LoggingConfig::default(),
            paths: PathsConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            debug_log: None,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            secure_dir: default_secure_dir(),
            dir_mode: default_dir_mode(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
            font: default_font(),
        }
    }
}

impl LoggingConfig {
    /// `debug_log` with `$VAR` and `~` expanded.
    #[must_use]
    pub fn debug_log_path(&self) -> Option<Filename> {
        self.debug_log.clone().map(Filename::expand)
    }
}

impl PathsConfig {
    /// `secure_dir` with `$VAR` and `~` expanded.
    #[must_use]
    pub fn secure_dir_path(&self) -> Filename {
        self.secure_dir.clone().expand()
    }

    /// `dir_mode` parsed as octal, or [`DEFAULT_DIR_MODE`] if it is invalid.
    #[must_use]
    pub fn dir_mode_bits(&self) -> u32 {
        match u32::from_str_radix(self.dir_mode.trim_start_matches("0o"), 8) {
            Ok(mode) if mode <= 0o7777 => mode,
            _ => {
                warn!("invalid dir_mode {:?}, using {DEFAULT_DIR_MODE:o}", self.dir_mode);
                DEFAULT_DIR_MODE
            }
        }
    }
}

impl SessionConfig {
    /// `log_file` with `$VAR` and `~` expanded.
    #[must_use]
    pub fn log_file_path(&self) -> Filename {
        self.log_file.clone().expand()
    }
}

impl Config {
    /// Load configuration with the precedence chain: env vars > file > defaults.
    ///
    /// If `path` is `Some`, that file must exist. Otherwise `termplat.toml` in
    /// the current directory is used when present.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(Path::new(p))?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        // Env var overrides
        if let Ok(dir) = std::env::var("TERMPLAT_SECURE_DIR") {
            config.paths.secure_dir = Filename::new(dir);
        }
        if let Ok(log) = std::env::var("TERMPLAT_LOG_FILE") {
            config.session.log_file = Filename::new(log);
        }
        if let Ok(font) = std::env::var("TERMPLAT_FONT") {
            config.session.font = FontSpec::new(font);
        }

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse TOML text and migrate legacy fields.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(content)?;
        config.migrate();
        Ok(config)
    }

    fn migrate(&mut self) {
        if self.config_version >= EXPANSION_CONFIG_VERSION {
            return;
        }
        info!(
            "migrating config from version {} to {EXPANSION_CONFIG_VERSION}",
            self.config_version
        );
        self.session.log_file = std::mem::take(&mut self.session.log_file).escape_expansions();
        self.config_version = EXPANSION_CONFIG_VERSION;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.config_version, EXPANSION_CONFIG_VERSION);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.debug_log.is_none());
        assert_eq!(config.paths.secure_dir.as_str(), "~/.termplat/sockets");
        assert_eq!(config.paths.dir_mode_bits(), 0o777);
        assert_eq!(config.session.font.name(), "Monospace 12");
    }

    #[test]
    fn sections_override_defaults() {
        let config = Config::parse(
            r#"
            [logging]
            level = "debug"
            debug_log = "/tmp/d.log"

            [paths]
            dir_mode = "0o750"

            [session]
            log_file = "~/x/$USER.log"
            font = "Fixed 10"
            "#,
        )
        .unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.debug_log.unwrap().as_str(), "/tmp/d.log");
        assert_eq!(config.paths.dir_mode_bits(), 0o750);
        assert_eq!(config.session.log_file.as_str(), "~/x/$USER.log");
        assert_eq!(config.session.font.name(), "Fixed 10");
    }

    #[test]
    fn legacy_log_file_is_escaped() {
        let config = Config::parse(
            r#"
            config_version = 70
            [session]
            log_file = "/logs/$weird~name.log"
            "#,
        )
        .unwrap();
        assert_eq!(config.config_version, EXPANSION_CONFIG_VERSION);
        assert_eq!(config.session.log_file.as_str(), "/logs/\\$weird\\~name.log");
    }

    #[test]
    fn path_templates_are_expanded_on_access() {
        let config = Config::parse(
            r#"
            [logging]
            debug_log = "${TERMPLAT_TEST_NEVER_SET}/debug.log"

            [paths]
            secure_dir = "/run/${TERMPLAT_TEST_NEVER_SET}sock"

            [session]
            log_file = "/logs/\\$literal.log"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.logging.debug_log_path().unwrap().as_str(),
            "/debug.log"
        );
        assert_eq!(config.paths.secure_dir_path().as_str(), "/run/sock");
        assert_eq!(config.session.log_file_path().as_str(), "/logs/$literal.log");
        // The stored templates are left untouched.
        assert_eq!(
            config.logging.debug_log.as_ref().unwrap().as_str(),
            "${TERMPLAT_TEST_NEVER_SET}/debug.log"
        );
    }

    #[test]
    fn tilde_in_debug_log_uses_home() {
        let config = Config::parse("[logging]\ndebug_log = \"~/debug.log\"\n").unwrap();
        let expected = format!("{}/debug.log", std::env::var("HOME").unwrap_or_default());
        assert_eq!(config.logging.debug_log_path().unwrap().as_str(), expected);
    }

    #[test]
    fn secure_dir_is_a_filename_in_toml() {
        let config = Config::parse("[paths]\nsecure_dir = \"/tmp/s\"\n").unwrap();
        assert_eq!(config.paths.secure_dir, Filename::new("/tmp/s"));
    }

    #[test]
    fn invalid_dir_mode_falls_back() {
        let paths = PathsConfig {
            dir_mode: "rwx".into(),
            ..PathsConfig::default()
        };
        assert_eq!(paths.dir_mode_bits(), DEFAULT_DIR_MODE);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = Config::load(Some("/nonexistent/termplat.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[paths\n").unwrap();
        let err = Config::load(tmp.path().to_str()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
