//! Delimited-text export of records.
//!
//! Output is one header row followed by one row per record, each line
//! terminated by `\n`. Fields are quoted only when they contain the
//! delimiter, a quote or a line break.

use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use roster_core::collection::CsvRecord;
use roster_core::error::{Result, RosterError};

fn csv_error(err: impl std::fmt::Display) -> RosterError {
    RosterError::Serialization {
        format: "CSV".to_string(),
        message: err.to_string(),
    }
}

/// Serializes records with the given single-byte delimiter.
pub fn to_delimited<R: CsvRecord>(records: &[R], delimiter: u8) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(R::csv_header()).map_err(csv_error)?;
    for record in records {
        writer.write_record(record.csv_row()).map_err(csv_error)?;
    }

    let bytes = writer.into_inner().map_err(csv_error)?;
    String::from_utf8(bytes).map_err(csv_error)
}

/// File name for an export taken on `date`, e.g. `users_export_2025-03-01.csv`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("users_export_{}.csv", date.format("%Y-%m-%d"))
}
