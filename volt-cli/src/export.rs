//! Writes the record list to a spreadsheet (CSV) file.

use anyhow::{Context, Result};
use std::path::Path;

use volt_core::{BillRecord, EXPORT_HEADERS, export_rows};

/// Named for the dataset it holds.
pub const DEFAULT_EXPORT_FILE: &str = "electric_bills.csv";

pub fn write_csv(records: &[BillRecord], path: &Path) -> Result<()> {
    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    wtr.write_record(EXPORT_HEADERS)?;
    for row in export_rows(records) {
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}
