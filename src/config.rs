//! Report configuration.
//!
//! Values come from an optional TOML file; every field has a default and the
//! command line overrides whatever the file sets.

use crate::data::{NormalizeRules, PipelineConfig, PriceRule};
use crate::data::normalizer::DEFAULT_DATE_FORMATS;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_TARGET_PRODUCT: &str = "pink morsel";
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("target_product must not be empty")]
    EmptyProduct,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub data_dir: PathBuf,
    pub target_product: String,
    /// Reference date marked on the chart (e.g. a price change).
    pub event_date: NaiveDate,
    pub strict: bool,
    pub price_rule: PriceRule,
    pub date_formats: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            target_product: DEFAULT_TARGET_PRODUCT.to_string(),
            event_date: default_event_date(),
            strict: false,
            price_rule: PriceRule::default(),
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// 2021-01-15, the Pink Morsel price increase.
pub fn default_event_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 1, 15).unwrap_or_default()
}

impl ReportConfig {
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: ReportConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_product.trim().is_empty() {
            return Err(ConfigError::EmptyProduct);
        }
        Ok(())
    }

    pub fn normalize_rules(&self) -> NormalizeRules {
        NormalizeRules::new(&self.target_product)
            .with_price_rule(self.price_rule.clone())
            .with_date_formats(self.date_formats.clone())
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            data_dir: self.data_dir.clone(),
            strict: self.strict,
            rules: self.normalize_rules(),
        }
    }
}
