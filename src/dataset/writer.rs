//! Delimited-file output for frames.

use super::Frame;
use crate::error::Result;
use std::io::Write;

/// Write `frame` as comma-delimited text with a header row and no index.
///
/// Nulls are written as empty cells; numbers use the shortest representation
/// that reads back to the same `f64`.
pub fn write_frame<W: Write>(frame: &Frame, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(frame.names())?;

    let columns: Vec<_> = frame.iter().map(|(_, column)| column).collect();
    for row in 0..frame.n_rows() {
        wtr.write_record(columns.iter().map(|c| c.cell_to_string(row)))?;
    }

    wtr.flush()?;
    Ok(())
}
