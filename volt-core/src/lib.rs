//! volt-core: domain types and pure computations for the Volt bill tracker

pub mod export;
pub mod record;
pub mod stats;

pub use export::{EXPORT_HEADERS, ONGOING_LABEL, export_rows};
pub use record::{BillRecord, Status, ValidationError};
pub use stats::{ChartPoint, Totals, chart_series, compute_totals};
