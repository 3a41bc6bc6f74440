//! File-based settings for the CLI
//!
//! ```toml
//! log_filter = "tagging=debug,info"
//!
//! [tagging]
//! duplicate_policy = "reuse_existing"
//! max_label_len = 64
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tagging::TaggingConfig;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to render settings: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

pub type SettingsResult<T> = Result<T, SettingsError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_filter: String,
    pub tagging: TaggingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            tagging: TaggingConfig::default(),
        }
    }
}

impl Settings {
    /// Read settings from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> SettingsResult<Self> {
        let settings = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                toml::from_str(&raw).map_err(|source| SettingsError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            None => Self::default(),
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> SettingsResult<()> {
        if self.log_filter.trim().is_empty() {
            return Err(SettingsError::Invalid {
                message: "Log filter cannot be empty".to_string(),
            });
        }
        self.tagging
            .validate()
            .map_err(|message| SettingsError::Invalid { message })
    }

    pub fn to_toml(&self) -> SettingsResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
