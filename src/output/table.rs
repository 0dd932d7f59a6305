//! Default human-readable table rendering
//!
//! One fixed-width line per reading with derived kW, temperatures, and
//! ASCII bar columns for power and temperature trends. Rows whose timestamp
//! could not be reconstructed print `UNKNOWN` in the date column.

use std::io::Write;

use crate::app::models::SemanticRecord;
use crate::output::{RecordSink, format_date};
use crate::{Error, Result};

/// Sink writing aligned human-readable rows
pub struct TableSink<W: Write> {
    out: W,
}

impl<W: Write> TableSink<W> {
    /// Create a table sink over any writer
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> RecordSink for TableSink<W> {
    fn write(&mut self, record: &SemanticRecord) -> Result<()> {
        let date = record
            .timestamp
            .map(format_date)
            .unwrap_or_else(|| "UNKNOWN".to_string());
        let temp_out = record.temp_out.unwrap_or(0.0);
        let kw = f64::from(record.power_wh) * 4.0 / 1000.0;

        let bars_power = "!".repeat((record.power_wh / 50) as usize);
        let bars_out_neg = "-".repeat((-temp_out).max(0.0) as usize);
        let bars_out = ".".repeat(temp_out.max(0.0) as usize);
        let bars_in = ".".repeat(((record.temp_in - 17.0) * 4.0).max(0.0) as usize);

        writeln!(
            self.out,
            "{date} {row:5}: {accuracy:5.1}% kW={kw:4.2} pwr={power:4} \
             out={temp_out:5.1} in={temp_in:5.1} \
             {bars_power:<40}|{bars_out_neg:>30}{bars_out:<40} {bars_in:<50}",
            row = record.row,
            accuracy = record.accuracy,
            power = record.power_wh,
            temp_in = record.temp_in,
        )
        .map_err(|e| Error::output("table write failed", e))
    }

    fn finish(&mut self) -> Result<()> {
        self.out
            .flush()
            .map_err(|e| Error::output("table flush failed", e))
    }
}
