//! Application settings, read from a RON file.
//!
//! Looked up at `$MAILPDF_SETTINGS`, else `./mailpdf.ron`. A missing file
//! means defaults; every field may be omitted.

use std::fs;
use std::path::{Path, PathBuf};

use engine_logging::LogDestination;
use log::LevelFilter;
use mailpdf_core::{Locale, WizardSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SETTINGS_ENV: &str = "MAILPDF_SETTINGS";
const SETTINGS_FILENAME: &str = "mailpdf.ron";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("unknown log level '{0}'")]
    LogLevel(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogTarget {
    #[default]
    File,
    Terminal,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub target: LogTarget,
    pub level: String,
    pub file: PathBuf,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            target: LogTarget::File,
            level: "info".to_string(),
            file: PathBuf::from("mailpdf.log"),
        }
    }
}

impl LogSettings {
    pub fn destination(&self) -> LogDestination {
        match self.target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }

    pub fn level_filter(&self) -> Result<LevelFilter, SettingsError> {
        self.level
            .parse()
            .map_err(|_| SettingsError::LogLevel(self.level.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub locale: Locale,
    pub log: LogSettings,
    pub wizard: WizardSettings,
}

pub fn settings_path() -> PathBuf {
    std::env::var_os(SETTINGS_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(SETTINGS_FILENAME))
}

pub fn load_settings(path: &Path) -> Result<AppSettings, SettingsError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(AppSettings::default());
        }
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let settings: AppSettings = ron::from_str(&content).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    settings.log.level_filter()?;
    Ok(settings)
}
