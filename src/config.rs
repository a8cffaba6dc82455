//! Configuration Management

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::group::FilterOptions;
use crate::reference::{CsvOniSource, CsvWaterBalanceSource};

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where saved and filtered groups are written
    pub output_dir: PathBuf,
    /// Filter pass defaults
    pub filter: FilterConfig,
    /// Local reference table exports
    pub reference: ReferenceConfig,
}

/// Filter pass defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Also write the non-matching members
    pub diff: bool,
    /// Move instead of copy
    pub move_files: bool,
    /// Suffix of the complement directory
    pub diff_suffix: String,
}

/// Reference table locations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// CSV export of the ONI season table
    pub oni_table: Option<PathBuf>,
    /// CSV export of monthly water-balance values
    pub water_balance_table: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            filter: FilterConfig::default(),
            reference: ReferenceConfig::default(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            diff: false,
            move_files: false,
            diff_suffix: "diff".to_string(),
        }
    }
}

impl Config {
    /// Read a JSON config file; missing sections take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(Error::fs("read", path))?;
        let config: Config = serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values are usable before any filesystem work starts.
    pub fn validate(&self) -> Result<()> {
        let suffix = &self.filter.diff_suffix;
        if suffix.trim().is_empty() {
            return Err(Error::Config("diff_suffix must not be empty".to_string()));
        }
        if suffix.contains(&['/', '\\'][..]) {
            return Err(Error::Config(format!(
                "diff_suffix must not contain path separators, got {suffix:?}"
            )));
        }
        let tables = [&self.reference.oni_table, &self.reference.water_balance_table];
        for table in tables.into_iter().flatten() {
            if !table.is_file() {
                return Err(Error::Config(format!(
                    "reference table {} does not exist",
                    table.display()
                )));
            }
        }
        Ok(())
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            name: None,
            diff: self.filter.diff,
            move_files: self.filter.move_files,
            diff_suffix: self.filter.diff_suffix.clone(),
        }
    }

    pub fn oni_source(&self) -> Option<CsvOniSource> {
        self.reference.oni_table.as_ref().map(CsvOniSource::new)
    }

    pub fn water_balance_source(&self) -> Option<CsvWaterBalanceSource> {
        self.reference
            .water_balance_table
            .as_ref()
            .map(CsvWaterBalanceSource::new)
    }
}
