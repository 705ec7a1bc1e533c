//! The cleaned snapshot on disk.
//!
//! One CSV row per `OrderRecord`, headed by `OrderRecord::COLUMNS`.

use crate::error::CleanerError;
use core_types::{OrderRecord, OrderTable};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

pub fn write_table<W: Write>(table: &OrderTable, writer: W) -> Result<(), CleanerError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if table.is_empty() {
        // serde only emits the header alongside the first record.
        csv_writer.write_record(OrderRecord::COLUMNS)?;
    }
    for row in table {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_path(table: &OrderTable, path: &Path) -> Result<(), CleanerError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_table(table, file)?;
    tracing::info!(path = %path.display(), rows = table.len(), "Canonical snapshot written.");
    Ok(())
}

/// Loads a canonical snapshot.
///
/// The header must carry every canonical column. A missing one is a broken
/// upstream contract and is reported as-is; nothing is defaulted here.
pub fn read_table<R: Read>(reader: R) -> Result<OrderTable, CleanerError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    for column in OrderRecord::COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(CleanerError::MissingColumn(column.to_string()));
        }
    }

    let rows = csv_reader
        .deserialize::<OrderRecord>()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(OrderTable::new(rows)?)
}

pub fn read_path(path: &Path) -> Result<OrderTable, CleanerError> {
    let file = File::open(path)?;
    let table = read_table(file)?;
    tracing::info!(path = %path.display(), rows = table.len(), "Canonical snapshot loaded.");
    Ok(table)
}
