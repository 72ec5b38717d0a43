use std::io::Write;
use std::path::Path;

use crate::data::table::TableSource;
use crate::error::Result;

/// Write any table to CSV: a header row followed by the displayed cells.
pub fn write_csv<W: Write>(table: &dyn TableSource, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(table.column_names())?;
    let cols = table.column_names().len();
    for row in 0..table.row_count() {
        out.write_record((0..cols).map(|col| table.cell_text(row, col)))?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn export_csv(table: &dyn TableSource, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).map_err(csv::Error::from)?;
    write_csv(table, file)?;
    tracing::info!("Exported {} rows to {:?}", table.row_count(), path);
    Ok(())
}
