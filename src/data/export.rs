//! CSV export of the sales table (`sales,date,region`).

use crate::data::SalesTable;
use polars::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
    #[error("Failed to encode CSV: {0}")]
    Encode(#[from] PolarsError),
}

/// Build the export frame. Sales are kept as decimal text so no precision is lost.
pub fn sales_frame(table: &SalesTable) -> PolarsResult<DataFrame> {
    let records = table.records();
    let sales: Vec<String> = records.iter().map(|r| r.sales.to_string()).collect();
    let dates: Vec<String> = records
        .iter()
        .map(|r| r.date.format("%Y-%m-%d").to_string())
        .collect();
    let regions: Vec<String> = records.iter().map(|r| r.region.clone()).collect();

    DataFrame::new(vec![
        Column::new("sales".into(), sales),
        Column::new("date".into(), dates),
        Column::new("region".into(), regions),
    ])
}

/// Serialize the table to CSV into any writer.
pub fn write_sales_csv_to<W: Write>(writer: &mut W, table: &SalesTable) -> Result<(), ExportError> {
    let mut df = sales_frame(table)?;
    CsvWriter::new(writer).include_header(true).finish(&mut df)?;
    Ok(())
}

/// Serialize the table to CSV bytes.
pub fn sales_csv_bytes(table: &SalesTable) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_sales_csv_to(&mut buf, table)?;
    Ok(buf)
}

/// Write the table to a CSV file.
pub fn write_sales_csv(path: &Path, table: &SalesTable) -> Result<(), ExportError> {
    let mut file = File::create(path).map_err(|source| ExportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let mut df = sales_frame(table)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .map_err(|source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!(path = %path.display(), rows = table.len(), "exported sales CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CleanRecord;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn csv_has_header_and_sorted_rows() {
        let table = SalesTable::aggregate(vec![
            CleanRecord {
                price: Decimal::from_str("3.00").unwrap(),
                quantity: 10,
                date: NaiveDate::from_ymd_opt(2021, 1, 12).unwrap(),
                region: "north".into(),
            },
            CleanRecord {
                price: Decimal::from_str("0.25").unwrap(),
                quantity: 3,
                date: NaiveDate::from_ymd_opt(2021, 1, 10).unwrap(),
                region: "south, east".into(),
            },
        ]);

        let csv = String::from_utf8(sales_csv_bytes(&table).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec!["sales,date,region", "0.75,2021-01-10,\"south, east\"", "30.00,2021-01-12,north"]
        );
    }

    #[test]
    fn create_failure_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("output.csv");
        match write_sales_csv(&path, &SalesTable::empty()) {
            Err(ExportError::Create { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn write_failure_names_the_path() {
        let path = std::path::Path::new("/dev/full");
        let err = write_sales_csv(path, &SalesTable::empty()).unwrap_err();
        match &err {
            ExportError::Write { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("/dev/full"));
    }

    #[test]
    fn empty_table_writes_header_only() {
        let csv = String::from_utf8(sales_csv_bytes(&SalesTable::empty()).unwrap()).unwrap();
        assert_eq!(csv.trim_end(), "sales,date,region");
    }
}
