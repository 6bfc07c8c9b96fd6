//! Process-wide framework configuration.
//!
//! # Responsibility
//! - Parse framework settings from TOML.
//! - Expose one active configuration per process.
//!
//! # Invariants
//! - `page_size` is always within `1..=max_page_size` after normalization.
//! - The active configuration can be installed once; later installs are
//!   rejected unless identical.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

static ACTIVE_CONFIG: OnceCell<CoreConfig> = OnceCell::new();

fn default_page_size() -> u32 {
    20
}

fn default_max_page_size() -> u32 {
    1000
}

fn default_log_level() -> String {
    crate::logging::default_log_level().to_string()
}

/// Framework settings. Every field has a default, so an empty document is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Default page size for paged queries.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Upper bound applied to caller-provided page sizes.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Absolute directory for rolling logs. Logging stays off when absent.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    /// SQLite file path. In-memory when absent.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            log_level: default_log_level(),
            log_dir: None,
            database_path: None,
        }
    }
}

impl CoreConfig {
    /// Parses and normalizes a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let parsed: Self = toml::from_str(source).map_err(ConfigError::Parse)?;
        parsed.normalized()
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.to_path_buf(),
            source: err,
        })?;
        Self::from_toml_str(&source)
    }

    /// Clamps a requested page size into the configured bounds. Never 0.
    pub fn clamp_page_size(&self, requested: u32) -> u32 {
        let size = match requested {
            0 => self.page_size,
            value => value.min(self.max_page_size),
        };
        size.max(1)
    }

    fn normalized(mut self) -> Result<Self, ConfigError> {
        if self.max_page_size == 0 {
            return Err(ConfigError::Invalid(
                "max_page_size must be greater than 0".to_string(),
            ));
        }
        if self.page_size == 0 {
            self.page_size = default_page_size();
        }
        self.page_size = self.page_size.min(self.max_page_size);
        Ok(self)
    }
}

/// Installs the process-wide configuration.
///
/// The configuration is normalized first; a zero `max_page_size` is
/// rejected. Re-installing an identical configuration is a no-op.
pub fn install_config(config: CoreConfig) -> Result<(), ConfigError> {
    let config = config.normalized()?;
    let installed = ACTIVE_CONFIG.get_or_init(|| config.clone());
    if *installed != config {
        return Err(ConfigError::AlreadyInstalled);
    }
    Ok(())
}

/// Returns the installed configuration, or defaults when none was installed.
pub fn active_config() -> CoreConfig {
    ACTIVE_CONFIG.get().cloned().unwrap_or_default()
}

/// Shortcut for the active default page size.
pub fn page_size() -> u32 {
    ACTIVE_CONFIG
        .get()
        .map_or_else(default_page_size, |config| config.page_size)
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    Invalid(String),
    AlreadyInstalled,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
            Self::AlreadyInstalled => {
                write!(f, "a different configuration is already installed")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) | Self::AlreadyInstalled => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{install_config, ConfigError, CoreConfig};

    #[test]
    fn empty_document_uses_defaults() {
        let config = CoreConfig::from_toml_str("").expect("empty config should parse");
        assert_eq!(config.page_size, 20);
        assert_eq!(config.max_page_size, 1000);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn page_size_is_clamped_to_max() {
        let config = CoreConfig::from_toml_str("page_size = 500\nmax_page_size = 100\n")
            .expect("config should parse");
        assert_eq!(config.page_size, 100);
        assert_eq!(config.clamp_page_size(0), 100);
        assert_eq!(config.clamp_page_size(5000), 100);
        assert_eq!(config.clamp_page_size(7), 7);
    }

    #[test]
    fn zero_max_page_size_is_rejected() {
        let err = CoreConfig::from_toml_str("max_page_size = 0").expect_err("must fail");
        assert!(err.to_string().contains("max_page_size"));
    }

    #[test]
    fn install_rejects_zero_max_page_size() {
        let config = CoreConfig {
            page_size: 0,
            max_page_size: 0,
            ..CoreConfig::default()
        };
        let err = install_config(config).expect_err("zero bounds must be rejected");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn clamp_never_returns_zero_for_literal_configs() {
        let config = CoreConfig {
            page_size: 0,
            max_page_size: 0,
            ..CoreConfig::default()
        };
        assert_eq!(config.clamp_page_size(0), 1);
        assert_eq!(config.clamp_page_size(50), 1);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("diboot.toml");
        std::fs::write(&path, "page_size = 5\ndatabase_path = \"/tmp/diboot.db\"\n")
            .expect("write config");
        let config = CoreConfig::load(&path).expect("config should load");
        assert_eq!(config.page_size, 5);
        assert_eq!(
            config.database_path.as_deref(),
            Some(std::path::Path::new("/tmp/diboot.db"))
        );
    }
}
