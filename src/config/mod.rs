//! Configuration loading and management.
//!
//! This module is split into logical submodules, following the same shape
//! `slircd-ng` uses for its own (much larger) configuration:
//! - [`types`]: the three INI sections (`IrchuuConfig`, `IrcConfig`, `TelegramConfig`)
//! - [`defaults`]: default value functions used as serde field defaults
//! - [`validation`]: cross-field validation run once at startup
//! - [`paths`]: XDG config/data directory resolution and first-run population

mod defaults;
mod paths;
mod types;
mod validation;

pub use defaults::{LAYER, VERSION};
pub use paths::{data_dir, default_config_path, populate_default_config};
pub use types::{IrcConfig, IrchuuConfig, TelegramConfig};
pub use validation::{validate, ValidationError};

use thiserror::Error;

/// Top-level, fully parsed configuration: the three INI sections plus the
/// path it was loaded from (kept around so `-data` defaulting and rehash
/// messages can refer back to it).
#[derive(Debug, Clone)]
pub struct Config {
    pub irchuu: IrchuuConfig,
    pub irc: IrcConfig,
    pub telegram: TelegramConfig,
}

/// Errors that can occur while reading or validating the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse INI at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ini::Error,
    },
    #[error("missing section [{0}]")]
    MissingSection(&'static str),
    #[error("invalid value for {section}.{key}: {value}")]
    InvalidValue {
        section: &'static str,
        key: &'static str,
        value: String,
    },
    #[error("configuration is invalid:\n{}", .0.join("\n"))]
    Invalid(Vec<String>),
}

impl Config {
    /// Load and validate the configuration file at `path`.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let conf = ini::Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(source) => ConfigError::Io {
                path: path.to_string(),
                source,
            },
            source => ConfigError::Parse {
                path: path.to_string(),
                source,
            },
        })?;

        let irchuu = types::IrchuuConfig::from_ini(&conf)?;
        let irc = types::IrcConfig::from_ini(&conf)?;
        let telegram = types::TelegramConfig::from_ini(&conf)?;

        let config = Config {
            irchuu,
            irc,
            telegram,
        };

        if let Err(errors) = validate(&config) {
            return Err(ConfigError::Invalid(
                errors.into_iter().map(|e| e.to_string()).collect(),
            ));
        }

        Ok(config)
    }
}
