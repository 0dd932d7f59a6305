//! InfluxDB line-protocol rendering of decoded readings
//!
//! One line per reading: `<measurement>,kk=<tag> <fields> <unix_ts>`.
//! The opaque group key travels as a tag; integer fields get the `i`
//! suffix; zero power and absent outdoor temperature are omitted so they
//! do not pollute series with filler values.

use std::io::Write;

use crate::app::models::SemanticRecord;
use crate::output::RecordSink;
use crate::{Error, Result};

/// Sink writing InfluxDB line protocol
pub struct InfluxSink<W: Write> {
    out: W,
    measurement: String,
}

impl<W: Write> InfluxSink<W> {
    /// Create a line-protocol sink with the given measurement name
    pub fn new(out: W, measurement: impl Into<String>) -> Self {
        Self {
            out,
            measurement: measurement.into(),
        }
    }
}

impl<W: Write> RecordSink for InfluxSink<W> {
    fn write(&mut self, record: &SemanticRecord) -> Result<()> {
        let mut fields = Vec::with_capacity(7);
        if record.power_wh != 0 {
            fields.push(format!("pwr_Wh={}i", record.power_wh));
        }
        fields.push(format!("price={}", record.price));
        if let Some(temp_out) = record.temp_out {
            fields.push(format!("temp_out={temp_out}"));
        }
        fields.push(format!("temp_in={}", record.temp_in));
        fields.push(format!("signal={}i", record.signal));
        fields.push(format!("missed={}i", record.missed));
        fields.push(format!("accuracy={}", record.accuracy));

        let mut line = format!(
            "{},kk={} {}",
            self.measurement,
            record.group_key,
            fields.join(",")
        );
        // Without a timestamp the server assigns its own; better than a
        // fabricated one.
        if let Some(timestamp) = record.timestamp {
            line.push_str(&format!(" {}", timestamp.timestamp()));
        }

        writeln!(self.out, "{line}").map_err(|e| Error::output("line protocol write failed", e))
    }

    fn finish(&mut self) -> Result<()> {
        self.out
            .flush()
            .map_err(|e| Error::output("line protocol flush failed", e))
    }
}
