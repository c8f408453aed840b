//! CSV Data Loader Module
//! Discovers CSV files in a directory and reads them into raw records using Polars.

use crate::data::RawRecord;
use polars::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("Source directory not found: {}", path.display())]
    MissingDirectory { path: PathBuf },
    #[error("Failed to read directory {}: {source}", path.display())]
    UnreadableDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No CSV files found in {}", path.display())]
    NoCsvFiles { path: PathBuf },
    #[error("Failed to load CSV {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
    #[error("Missing required column `{column}` in {}", path.display())]
    MissingColumn { path: PathBuf, column: String },
}

impl DataLoadError {
    /// Path of the directory or file the error refers to.
    pub fn path(&self) -> &Path {
        match self {
            DataLoadError::MissingDirectory { path }
            | DataLoadError::UnreadableDirectory { path, .. }
            | DataLoadError::NoCsvFiles { path }
            | DataLoadError::Malformed { path, .. }
            | DataLoadError::MissingColumn { path, .. } => path,
        }
    }
}

/// Rows loaded from a directory plus the files that were skipped.
#[derive(Debug, Default)]
pub struct LoadedSources {
    pub records: Vec<RawRecord>,
    pub files: Vec<PathBuf>,
    pub skipped: Vec<DataLoadError>,
}

/// Reads every CSV file directly inside a directory.
pub struct DataLoader {
    strict: bool,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new(false)
    }
}

impl DataLoader {
    /// In strict mode the first bad file fails the whole load.
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    /// List `*.csv` files in `dir` (no recursion), sorted by path.
    pub fn discover_csv_files(dir: &Path) -> Result<Vec<PathBuf>, DataLoadError> {
        if !dir.is_dir() {
            return Err(DataLoadError::MissingDirectory {
                path: dir.to_path_buf(),
            });
        }

        let unreadable = |source| DataLoadError::UnreadableDirectory {
            path: dir.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(unreadable)? {
            let path = entry.map_err(unreadable)?.path();
            let is_csv = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false);
            if is_csv && path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        Ok(files)
    }

    /// Load all rows from a directory in file-then-row order.
    pub fn load_dir(&self, dir: &Path) -> Result<LoadedSources, DataLoadError> {
        let files = Self::discover_csv_files(dir)?;
        if files.is_empty() {
            return Err(DataLoadError::NoCsvFiles {
                path: dir.to_path_buf(),
            });
        }

        let mut loaded = LoadedSources::default();
        for path in files {
            match Self::load_file(&path) {
                Ok(mut records) => {
                    tracing::debug!(file = %path.display(), rows = records.len(), "loaded source file");
                    loaded.records.append(&mut records);
                    loaded.files.push(path);
                }
                Err(e) if !self.strict => {
                    tracing::warn!(error = %e, "skipping source file");
                    loaded.skipped.push(e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(loaded)
    }

    /// Load one CSV file. Every cell is read as text.
    pub fn load_file(path: &Path) -> Result<Vec<RawRecord>, DataLoadError> {
        let malformed = |source| DataLoadError::Malformed {
            path: path.to_path_buf(),
            source,
        };

        // A zero-length schema inference reads every column as String
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(malformed)?;

        let header_map = build_header_map(&df);
        let cells = |name: &str| -> Result<Vec<String>, DataLoadError> {
            let actual = header_map
                .get(name)
                .ok_or_else(|| DataLoadError::MissingColumn {
                    path: path.to_path_buf(),
                    column: name.to_string(),
                })?;
            string_cells(&df, actual).map_err(malformed)
        };

        let product = cells("product")?;
        let price = cells("price")?;
        let quantity = cells("quantity")?;
        let date = cells("date")?;
        let region = cells("region")?;

        let records = product
            .into_iter()
            .zip(price)
            .zip(quantity)
            .zip(date)
            .zip(region)
            .map(|((((product, price), quantity), date), region)| RawRecord {
                product,
                price,
                quantity,
                date,
                region,
            })
            .collect();

        Ok(records)
    }
}

/// Map normalized header names to the names Polars gave the columns.
/// When two headers normalize to the same name the leftmost one wins.
fn build_header_map(df: &DataFrame) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for name in df.get_column_names() {
        map.entry(normalize_header_name(name.as_str()))
            .or_insert_with(|| name.to_string());
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').to_lowercase()
}

fn string_cells(df: &DataFrame, column: &str) -> PolarsResult<Vec<String>> {
    let column = df.column(column)?;
    let series = column.as_materialized_series();
    let values = series
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect();
    Ok(values)
}
