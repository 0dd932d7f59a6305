//! JSON array rendering of decoded readings
//!
//! Streams one JSON object per reading inside a single array, with unix
//! timestamps and `null` for absent values.

use std::io::Write;

use serde::Serialize;

use crate::app::models::SemanticRecord;
use crate::output::RecordSink;
use crate::{Error, Result};

/// Wire shape of one reading; field order is the output key order
#[derive(Serialize)]
struct JsonRow {
    timestamp: Option<i64>,
    #[serde(rename = "pwr_Wh")]
    pwr_wh: u16,
    price: f64,
    temp_out: Option<f64>,
    temp_in: f64,
    signal: i8,
    missed: u8,
    kk: u8,
    accuracy: f64,
}

impl From<&SemanticRecord> for JsonRow {
    fn from(record: &SemanticRecord) -> Self {
        Self {
            timestamp: record.timestamp.map(|dt| dt.timestamp()),
            pwr_wh: record.power_wh,
            price: record.price,
            temp_out: record.temp_out,
            temp_in: record.temp_in,
            signal: record.signal,
            missed: record.missed,
            kk: record.group_key,
            accuracy: record.accuracy,
        }
    }
}

/// Sink writing a JSON array of reading objects
pub struct JsonSink<W: Write> {
    out: W,
    started: bool,
}

impl<W: Write> JsonSink<W> {
    /// Create a JSON sink over any writer
    pub fn new(out: W) -> Self {
        Self {
            out,
            started: false,
        }
    }
}

impl<W: Write> RecordSink for JsonSink<W> {
    fn begin(&mut self) -> Result<()> {
        writeln!(self.out, "[").map_err(|e| Error::output("JSON write failed", e))
    }

    fn write(&mut self, record: &SemanticRecord) -> Result<()> {
        if self.started {
            writeln!(self.out, ",").map_err(|e| Error::output("JSON write failed", e))?;
        }
        self.started = true;

        let row = JsonRow::from(record);
        let rendered = serde_json::to_string(&row)
            .map_err(|e| Error::output("JSON encoding failed", e.into()))?;
        write!(self.out, "{rendered}").map_err(|e| Error::output("JSON write failed", e))
    }

    fn finish(&mut self) -> Result<()> {
        writeln!(self.out, "\n]").map_err(|e| Error::output("JSON write failed", e))?;
        self.out
            .flush()
            .map_err(|e| Error::output("JSON flush failed", e))
    }
}
