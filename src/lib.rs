//! Sales Visualiser - regional sales CSV pipeline with interactive and static charts.
//!
//! The core (`data`) turns a directory of daily sales CSV files into a
//! date-sorted [`data::SalesTable`]. `stats`, `charts` and `gui` only read that
//! table.

pub mod charts;
pub mod cli;
pub mod config;
pub mod data;
pub mod gui;
pub mod logging;
pub mod stats;
