use rust_decimal::Decimal;
use sales_visualiser::config::ReportConfig;
use sales_visualiser::data::export::sales_csv_bytes;
use sales_visualiser::data::{
    DataLoadError, PipelineConfig, PipelineReport, PipelineWarning, RegionSelector, SalesPipeline,
};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tempfile::{tempdir, TempDir};

const HEADER: &str = "product,price,quantity,date,region";

fn write_csv(dir: &Path, name: &str, rows: &[&str]) {
    let mut content = format!("{HEADER}\n");
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(dir.join(name), content).unwrap();
}

fn pipeline_config(dir: &Path) -> PipelineConfig {
    ReportConfig {
        data_dir: dir.to_path_buf(),
        ..ReportConfig::default()
    }
    .pipeline_config()
}

fn run(dir: &Path) -> PipelineReport {
    SalesPipeline::new(pipeline_config(dir)).run().unwrap()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn sample_dir() -> TempDir {
    let dir = tempdir().unwrap();
    write_csv(
        dir.path(),
        "daily_sales_data_0.csv",
        &[
            "pink morsel,$3.00,10,2021-01-16,north",
            "gummy bear,$5.00,100,2021-01-10,north",
            "Pink Morsel,$3.00,4,2021-01-10,south",
        ],
    );
    write_csv(
        dir.path(),
        "daily_sales_data_1.csv",
        &[
            "PINK MORSEL,$5.00,2,2021-01-10,east",
            "pink morsel,abc,3,2021-01-11,west",
            "pink morsel,$5.00,1,2021-01-12,north",
        ],
    );
    dir
}

#[test]
fn target_product_row_becomes_sales_record() {
    let dir = tempdir().unwrap();
    write_csv(dir.path(), "a.csv", &["Pink Morsel,$3.00,10,2021-01-15,north"]);

    let report = run(dir.path());
    let records = report.table.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].sales, dec("30.00"));
    assert_eq!(records[0].date.to_string(), "2021-01-15");
    assert_eq!(records[0].region, "north");
}

#[test]
fn other_products_and_bad_prices_are_dropped() {
    let dir = sample_dir();
    let report = run(dir.path());

    assert_eq!(report.diagnostics.rows_read, 6);
    assert_eq!(report.diagnostics.rows_kept, 4);
    assert_eq!(report.diagnostics.drops.product_mismatch, 1);
    assert_eq!(report.diagnostics.drops.invalid_price, 1);
    assert!(report.table.records().iter().all(|r| r.region != "west"));
}

#[test]
fn rows_sorted_by_date_with_file_order_kept_for_ties() {
    let dir = sample_dir();
    let report = run(dir.path());

    let rows: Vec<(String, &str)> = report
        .table
        .records()
        .iter()
        .map(|r| (r.date.to_string(), r.region.as_str()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("2021-01-10".to_string(), "south"),
            ("2021-01-10".to_string(), "east"),
            ("2021-01-12".to_string(), "north"),
            ("2021-01-16".to_string(), "north"),
        ]
    );
}

#[test]
fn partition_all_and_single_region() {
    let dir = sample_dir();
    let report = run(dir.path());
    let table = &report.table;

    let all = table.partition(&RegionSelector::All);
    assert_eq!(all.len(), table.len());

    let north = table.partition(&"north".parse().unwrap());
    assert_eq!(north.len(), 2);
    assert!(north.iter().all(|r| r.region == "north"));
    assert!(north.windows(2).all(|w| w[0].date <= w[1].date));

    assert!(table.partition(&RegionSelector::Region("mars".into())).is_empty());
    assert_eq!(table.total_sales(&RegionSelector::All), dec("57.00"));
}

#[test]
fn repeated_runs_export_identical_bytes() {
    let dir = sample_dir();
    let first = sales_csv_bytes(&run(dir.path()).table).unwrap();
    let second = sales_csv_bytes(&run(dir.path()).table).unwrap();
    assert_eq!(first, second);
    assert!(String::from_utf8(first).unwrap().starts_with("sales,date,region\n"));
}

#[test]
fn thousands_separators_in_prices() {
    let dir = tempdir().unwrap();
    write_csv(
        dir.path(),
        "a.csv",
        &["pink morsel,\"$1,234.50\",2,2021-02-01,west"],
    );

    let report = run(dir.path());
    assert_eq!(report.table.records()[0].sales, dec("2469.00"));
}

#[test]
fn overflowing_sales_are_dropped_not_fatal() {
    let dir = tempdir().unwrap();
    write_csv(
        dir.path(),
        "a.csv",
        &[
            "pink morsel,$79228162514264337593543950335,2,2021-01-10,north",
            "pink morsel,$79228162514264337593543950335,1,2021-01-10,north",
            "pink morsel,$79228162514264337593543950335,1,2021-01-11,south",
        ],
    );

    let report = run(dir.path());
    assert_eq!(report.table.len(), 2);
    assert_eq!(report.diagnostics.drops.sales_overflow, 1);
    assert_eq!(report.table.total_sales(&RegionSelector::All), Decimal::MAX);
}

#[test]
fn undecodable_file_is_skipped_unless_strict() {
    let dir = tempdir().unwrap();
    write_csv(dir.path(), "a.csv", &["pink morsel,$3.00,10,2021-01-15,north"]);
    let mut bad = format!("{HEADER}\n").into_bytes();
    bad.extend_from_slice(b"pink morsel,$3.00,10,2021-01-15,\xff\xfe\n");
    fs::write(dir.path().join("b.csv"), bad).unwrap();

    let report = run(dir.path());
    assert_eq!(report.table.len(), 1);
    assert_eq!(report.diagnostics.files_loaded.len(), 1);
    assert!(matches!(
        report.diagnostics.warnings.as_slice(),
        [PipelineWarning::SourceSkipped { path, .. }] if path.ends_with("b.csv")
    ));

    let strict = PipelineConfig {
        strict: true,
        ..pipeline_config(dir.path())
    };
    let result = SalesPipeline::new(strict).run();
    assert!(matches!(result, Err(DataLoadError::Malformed { .. })));
}

#[test]
fn empty_directory_gives_empty_table() {
    let dir = tempdir().unwrap();
    let report = run(dir.path());
    assert!(report.table.is_empty());
}

#[test]
fn missing_directory_is_an_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");
    let result = SalesPipeline::new(pipeline_config(&missing)).run();
    assert!(matches!(result, Err(DataLoadError::MissingDirectory { .. })));
}

#[test]
fn read_rows_are_either_kept_or_dropped() {
    let dir = sample_dir();
    let report = run(dir.path());

    let drops = &report.diagnostics.drops;
    assert_eq!(
        report.diagnostics.rows_read,
        report.diagnostics.rows_kept + drops.total()
    );
    assert!(report.table.records().iter().all(|r| r.sales > Decimal::ZERO));
}
