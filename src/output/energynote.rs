//! energynote.eu detailedReadings.csv rendering
//!
//! Third-party CSV dialect: a UTF-8 BOM, a fixed English header, and rows of
//! five-decimal values derived from the reading (cost, consumption in kWh,
//! and an estimated carbon figure at half the consumption).

use std::io::Write;

use crate::app::models::SemanticRecord;
use crate::output::RecordSink;
use crate::{Error, Result};

const HEADER: &str =
    "\u{feff}Date (yyyymmdd hh:mm),Cost (Kr),Extra Cost (Kr),Consumption (kWh),Carbon (kg)";

/// Sink writing the energynote.eu detailed-readings dialect
pub struct EnergynoteSink<W: Write> {
    out: W,
}

impl<W: Write> EnergynoteSink<W> {
    /// Create an energynote sink over any writer
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> RecordSink for EnergynoteSink<W> {
    fn begin(&mut self) -> Result<()> {
        writeln!(self.out, "{HEADER}").map_err(|e| Error::output("energynote write failed", e))
    }

    fn write(&mut self, record: &SemanticRecord) -> Result<()> {
        // The dialect has no notion of an unknown date; rows the congruence
        // search could not place are dropped.
        let Some(timestamp) = record.timestamp else {
            return Ok(());
        };

        let kwh = f64::from(record.power_wh) / 1000.0;
        let cost = kwh * record.price;
        let carbon = kwh / 2.0;

        writeln!(
            self.out,
            "{},{cost:7.5},{:7.5},{kwh:7.5},{carbon:7.5}",
            timestamp.format("%Y%m%d %H:%M"),
            0.0,
        )
        .map_err(|e| Error::output("energynote write failed", e))
    }

    fn finish(&mut self) -> Result<()> {
        self.out
            .flush()
            .map_err(|e| Error::output("energynote flush failed", e))
    }
}
