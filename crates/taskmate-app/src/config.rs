use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use taskmate_core::{SortKey, StatusFilter};
use time::UtcOffset;

const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration loaded from `<data dir>/config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// `[defaults]` table.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

impl AppConfig {
    /// Load configuration from the data directory. A missing file yields defaults.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read, parsed or validated.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let config_path = dir.as_ref().join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;
        config.defaults.validate()?;
        Ok(config)
    }
}

/// Initial list settings and identity used when the command line is silent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Ordering applied to listings.
    pub sort: SortKey,
    /// Status facet applied to listings.
    pub status: StatusFilter,
    /// Owner whose tasks are shown.
    pub owner: Option<String>,
    /// Offset used to map due instants onto calendar days.
    pub utc_offset_hours: i8,
}

impl DefaultsConfig {
    /// Offset for calendar-day comparisons.
    ///
    /// # Errors
    /// Returns an error when the configured hour offset is out of range.
    pub fn utc_offset(&self) -> Result<UtcOffset> {
        UtcOffset::from_hms(self.utc_offset_hours, 0, 0)
            .with_context(|| format!("invalid utc_offset_hours: {}", self.utc_offset_hours))
    }

    fn validate(&self) -> Result<()> {
        if !(-12..=14).contains(&self.utc_offset_hours) {
            bail!(
                "utc_offset_hours must be between -12 and 14, got {}",
                self.utc_offset_hours
            );
        }
        if self.owner.as_deref().is_some_and(|owner| owner.trim().is_empty()) {
            bail!("owner must not be blank");
        }
        Ok(())
    }
}
