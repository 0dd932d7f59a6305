//! CSV rendering of decoded readings
//!
//! Every field is quoted, matching the layout long-time users of the tool
//! feed into spreadsheets: date, power, price, temperatures, signal, missed
//! count, group key, and accuracy to three decimals.

use std::io::Write;

use crate::app::models::SemanticRecord;
use crate::output::{RecordSink, format_date};
use crate::{Error, Result};

const COLUMNS: &[&str] = &[
    "date", "pwr_Wh", "price", "temp_out", "temp_in", "signal", "missed", "kk", "accuracy",
];

/// Sink writing quoted CSV rows
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    /// Create a CSV sink over any writer
    pub fn new(out: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Always)
            .from_writer(out);
        Self { writer }
    }
}

fn csv_error(error: csv::Error) -> Error {
    match error.into_kind() {
        csv::ErrorKind::Io(source) => Error::output("CSV write failed", source),
        other => Error::output(
            "CSV write failed",
            std::io::Error::other(format!("{other:?}")),
        ),
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn begin(&mut self) -> Result<()> {
        self.writer.write_record(COLUMNS).map_err(csv_error)
    }

    fn write(&mut self, record: &SemanticRecord) -> Result<()> {
        let date = record
            .timestamp
            .map(format_date)
            .unwrap_or_default();
        let temp_out = record
            .temp_out
            .map(|t| t.to_string())
            .unwrap_or_default();

        self.writer
            .write_record(&[
                date,
                record.power_wh.to_string(),
                record.price.to_string(),
                temp_out,
                record.temp_in.to_string(),
                record.signal.to_string(),
                record.missed.to_string(),
                record.group_key.to_string(),
                format!("{:.3}", record.accuracy),
            ])
            .map_err(csv_error)
    }

    fn finish(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| Error::output("CSV flush failed", e))
    }
}
