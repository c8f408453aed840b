//! Command line definition.

use crate::config::ReportConfig;
use crate::data::RegionSelector;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sales-visualiser")]
#[command(about = "Regional sales pipeline and chart viewer")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Options shared by every subcommand; they override the config file.
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the daily sales CSV files
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Product to keep (case-insensitive)
    #[arg(long, global = true)]
    pub product: Option<String>,

    /// Event date marked on the chart (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub event_date: Option<NaiveDate>,

    /// Fail on the first unreadable source
    #[arg(long, global = true)]
    pub strict: bool,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Apply command line overrides on top of file values.
    pub fn apply(&self, config: &mut ReportConfig) {
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(product) = &self.product {
            config.target_product = product.clone();
        }
        if let Some(date) = self.event_date {
            config.event_date = date;
        }
        if self.strict {
            config.strict = true;
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Launch the interactive viewer
    View,
    /// Write the sales table to CSV and print the first rows
    Export {
        #[arg(long, default_value = "output.csv")]
        output: PathBuf,
    },
    /// Render the static PNG chart
    Chart {
        #[arg(long, default_value = "sales.png")]
        output: PathBuf,
        #[arg(long, default_value = RegionSelector::ALL)]
        region: RegionSelector,
        #[arg(long, default_value_t = 1200)]
        width: u32,
        #[arg(long, default_value_t = 700)]
        height: u32,
        /// Open the image in the system viewer
        #[arg(long)]
        open: bool,
    },
    /// Print diagnostics and the event impact statistics
    Summary {
        #[arg(long, default_value = RegionSelector::ALL)]
        region: RegionSelector,
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_view() {
        let cli = Cli::try_parse_from(["sales-visualiser"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.global.strict);
    }

    #[test]
    fn global_flags_override_config() {
        let cli = Cli::try_parse_from([
            "sales-visualiser",
            "summary",
            "--region",
            "north",
            "--data-dir",
            "sales",
            "--product",
            "gummy bear",
            "--event-date",
            "2020-06-01",
            "--strict",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Summary {
                region: RegionSelector::Region("north".into()),
                json: false,
            })
        );

        let mut config = ReportConfig::default();
        cli.global.apply(&mut config);
        assert_eq!(config.data_dir, PathBuf::from("sales"));
        assert_eq!(config.target_product, "gummy bear");
        assert_eq!(config.event_date, NaiveDate::from_ymd_opt(2020, 6, 1).unwrap());
        assert!(config.strict);
    }

    #[test]
    fn chart_defaults() {
        let cli = Cli::try_parse_from(["sales-visualiser", "chart"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Chart {
                output: PathBuf::from("sales.png"),
                region: RegionSelector::All,
                width: 1200,
                height: 700,
                open: false,
            })
        );
    }

    #[test]
    fn bad_event_date_is_rejected() {
        let result = Cli::try_parse_from(["sales-visualiser", "--event-date", "15/01/2021"]);
        assert!(result.is_err());
    }
}
