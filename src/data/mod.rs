//! Data module - CSV loading, normalization and aggregation

mod aggregator;
pub mod export;
mod loader;
pub mod normalizer;
mod pipeline;
mod record;
mod shared;

pub use aggregator::{DailyTotal, RegionSelector, SalesTable};
pub use loader::{DataLoadError, DataLoader, LoadedSources};
pub use normalizer::{normalize, DropCounts, NormalizeRules, Normalized, PriceRule};
pub use pipeline::{Diagnostics, PipelineConfig, PipelineReport, PipelineWarning, SalesPipeline};
pub use record::{CleanRecord, RawRecord, SalesRecord};
pub use shared::SharedTable;
