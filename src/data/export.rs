use std::path::Path;

use super::encoder::EncoderBank;
use super::model::Table;
use crate::error::{DashboardError, Result};

/// Write `table` to `path` as CSV: same columns in the same order as the
/// source, categorical codes decoded back to their strings.
pub fn export_csv(table: &Table, bank: &EncoderBank, path: &Path) -> Result<()> {
    let decoded = bank.decode_table(table)?;
    let export_err = |source: csv::Error| DashboardError::Export {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(export_err)?;
    writer.write_record(decoded.columns()).map_err(export_err)?;
    for row in decoded.rows() {
        writer
            .write_record(row.iter().map(|cell| cell.to_string()))
            .map_err(export_err)?;
    }
    writer
        .flush()
        .map_err(|e| export_err(csv::Error::from(e)))?;

    log::info!("Exported {} rows to {}", decoded.len(), path.display());
    Ok(())
}
