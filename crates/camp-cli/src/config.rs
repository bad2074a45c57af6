//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use camp_core::{ClassCatalog, ProgramCalendar, RetryConfig};
use chrono::{NaiveDate, Utc};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    #[serde(default)]
    pub program: ProgramConfig,

    /// Retry policy for commands that write.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Replaces the built-in class catalog when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<ClassCatalog>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramConfig {
    /// Calendar date of day 1.
    pub start_date: NaiveDate,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            start_date: Utc::now().date_naive(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("start_date", &self.program.start_date)
            .field("retry", &self.retry)
            .field(
                "classes",
                &self.classes.as_ref().map(|c| c.offerings().len()),
            )
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("camp.db"),
            program: ProgramConfig::default(),
            retry: RetryConfig::default(),
            classes: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Later sources win: defaults, the user config file, `config_path`, then
    /// `CAMP_*` environment variables (`__` separates nested keys, e.g.
    /// `CAMP_RETRY__MAX_RETRIES`).
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("CAMP_").split("__"));

        figment.extract()
    }

    pub const fn calendar(&self) -> ProgramCalendar {
        ProgramCalendar::new(self.program.start_date)
    }

    /// The configured class catalog, or the built-in one.
    pub fn class_catalog(&self) -> ClassCatalog {
        self.classes.clone().unwrap_or_default()
    }
}

/// Returns the platform-specific config directory for camp.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("camp"))
}

/// Returns the platform-specific data directory for camp.
///
/// On Linux: `~/.local/share/camp`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("camp"))
}
