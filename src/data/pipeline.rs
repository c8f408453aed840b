//! Sales Pipeline Module
//! Runs Loader -> Normalizer -> Aggregator once and returns the table with diagnostics.

use crate::data::normalizer::{normalize, DropCounts, NormalizeRules};
use crate::data::{DataLoadError, DataLoader, SalesTable};
use serde::Serialize;
use std::path::PathBuf;

/// Everything the core needs for one run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub strict: bool,
    pub rules: NormalizeRules,
}

/// Non-fatal conditions observed during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineWarning {
    /// A source file was skipped in non-strict mode.
    SourceSkipped { path: PathBuf, reason: String },
    /// The data directory held no CSV files.
    NoSources { dir: PathBuf },
    /// Every row was filtered out.
    EmptyResult,
}

/// Data-quality report returned alongside the table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub files_loaded: Vec<PathBuf>,
    pub rows_read: usize,
    pub rows_kept: usize,
    pub drops: DropCounts,
    pub warnings: Vec<PipelineWarning>,
}

/// Output of a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub table: SalesTable,
    pub diagnostics: Diagnostics,
}

impl PipelineReport {
    /// Degraded-mode result used when loading failed outright.
    pub fn empty() -> Self {
        Self {
            table: SalesTable::empty(),
            diagnostics: Diagnostics {
                warnings: vec![PipelineWarning::EmptyResult],
                ..Default::default()
            },
        }
    }
}

/// Explicit pipeline object; each `run` builds an independent table.
pub struct SalesPipeline {
    config: PipelineConfig,
}

impl SalesPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(&self) -> Result<PipelineReport, DataLoadError> {
        let loader = DataLoader::new(self.config.strict);
        let mut diagnostics = Diagnostics::default();

        let raws = match loader.load_dir(&self.config.data_dir) {
            Ok(loaded) => {
                diagnostics.files_loaded = loaded.files;
                diagnostics
                    .warnings
                    .extend(loaded.skipped.into_iter().map(|e| PipelineWarning::SourceSkipped {
                        path: e.path().to_path_buf(),
                        reason: e.to_string(),
                    }));
                loaded.records
            }
            Err(DataLoadError::NoCsvFiles { path }) if !self.config.strict => {
                tracing::warn!(dir = %path.display(), "no CSV files found");
                diagnostics.warnings.push(PipelineWarning::NoSources { dir: path });
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        diagnostics.rows_read = raws.len();
        let normalized = normalize(&raws, &self.config.rules);
        diagnostics.drops = normalized.drops;

        let table = SalesTable::aggregate(normalized.records);
        diagnostics.rows_kept = table.len();
        if table.is_empty() {
            diagnostics.warnings.push(PipelineWarning::EmptyResult);
        }

        tracing::info!(
            files = diagnostics.files_loaded.len(),
            rows_read = diagnostics.rows_read,
            rows_kept = diagnostics.rows_kept,
            product_mismatch = diagnostics.drops.product_mismatch,
            invalid_rows = diagnostics.drops.invalid(),
            "pipeline run complete"
        );
        if let Some((first, last)) = table.date_range() {
            tracing::info!(%first, %last, "sales date range");
        }

        Ok(PipelineReport { table, diagnostics })
    }
}
