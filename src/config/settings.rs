//! Settings loading from config.toml
//!
//! Every field has a default, so a missing file or a partial file still yields a
//! usable configuration. Durations are given in milliseconds, with `-1`
//! meaning "disabled".

use crate::{
    core::{
        control::DEFAULT_MAX_ROWS,
        message::{DEFAULT_TIMEOUT, MessageOptions},
        paged::{AccessPolicy, DEFAULT_GO_TO_PAGE_THRESHOLD, PagedOptions},
    },
    errors::{Error, Result},
};
use serde::Deserialize;
use std::{path::Path, time::Duration};
use tracing::info;

/// Default location of the settings file.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Interactive component behaviour
    pub components: ComponentSettings,
    /// Economy minigame tunables
    pub economy: EconomySettings,
}

/// `[components]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ComponentSettings {
    /// Lifetime of interactive messages in milliseconds, `-1` disables
    pub timeout_ms: i64,
    /// Action rows available per message
    pub max_rows: usize,
    /// Page count above which paged views offer a go-to-page control
    pub go_to_page_threshold: usize,
    /// Delay before a single-user paged view opens to everyone, `-1` never opens
    pub open_after_ms: i64,
}

impl Default for ComponentSettings {
    fn default() -> Self {
        Self {
            timeout_ms: i64::try_from(DEFAULT_TIMEOUT.as_millis()).unwrap_or(i64::MAX),
            max_rows: DEFAULT_MAX_ROWS,
            go_to_page_threshold: DEFAULT_GO_TO_PAGE_THRESHOLD,
            open_after_ms: 30_000,
        }
    }
}

/// Converts a millisecond setting into a duration. Negative values disable it.
fn millis(value: i64) -> Option<Duration> {
    u64::try_from(value).ok().map(Duration::from_millis)
}

impl ComponentSettings {
    /// Options for a plain interactive message.
    #[must_use]
    pub fn message_options(&self) -> MessageOptions {
        MessageOptions {
            timeout: millis(self.timeout_ms),
            max_rows: self.max_rows,
        }
    }

    /// Options for a paged view operated by `user_id` until it opens up.
    #[must_use]
    pub fn paged_options_for(&self, user_id: impl Into<String>) -> PagedOptions {
        PagedOptions {
            access: AccessPolicy::User {
                user_id: user_id.into(),
                open_after: millis(self.open_after_ms),
            },
            go_to_page_threshold: self.go_to_page_threshold,
            message: self.message_options(),
        }
    }
}

/// `[economy]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EconomySettings {
    /// Coins a new wallet starts with
    pub starting_balance: i64,
    /// Coins granted by `/daily`
    pub daily_reward: i64,
    /// Hours between two `/daily` claims
    pub daily_cooldown_hours: i64,
    /// Ranks shown per leaderboard page
    pub leaderboard_page_size: usize,
}

impl Default for EconomySettings {
    fn default() -> Self {
        Self {
            starting_balance: 0,
            daily_reward: 100,
            daily_cooldown_hours: 24,
            leaderboard_page_size: 10,
        }
    }
}

impl Settings {
    /// Checks values that parse fine but Discord would reject later.
    ///
    /// # Errors
    /// Returns [`Error::Config`] when `max_rows` is outside `1..=5`.
    pub fn validate(&self) -> Result<()> {
        let max_rows = self.components.max_rows;
        if !(1..=DEFAULT_MAX_ROWS).contains(&max_rows) {
            return Err(Error::Config {
                message: format!(
                    "components.max_rows must be between 1 and {DEFAULT_MAX_ROWS}, got {max_rows}"
                ),
            });
        }
        Ok(())
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read, the TOML is invalid or a value
/// is out of range.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    let settings: Settings = toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    settings.validate()?;
    Ok(settings)
}

/// Loads settings from `CONFIG_PATH` (default `./config.toml`), falling back to
/// defaults when the file does not exist.
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if !Path::new(&path).exists() {
        info!("No settings file at {path}, using defaults");
        return Ok(Settings::default());
    }
    load_settings(path)
}
