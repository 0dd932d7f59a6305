//! Output rendering for decoded readings
//!
//! The decoder produces [`SemanticRecord`]s and pushes them into a
//! [`RecordSink`]; one sink implementation exists per textual output format.
//! Rendering never feeds back into decoding, and diagnostics never travel
//! through sinks.

pub mod csv;
pub mod energynote;
pub mod influx;
pub mod json;
pub mod table;

use chrono::{DateTime, Utc};

use crate::Result;
use crate::app::models::SemanticRecord;

pub use self::csv::CsvSink;
pub use self::energynote::EnergynoteSink;
pub use self::influx::InfluxSink;
pub use self::json::JsonSink;
pub use self::table::TableSink;

/// Consumer of semantic records, one implementation per output format.
///
/// Sinks report a closed downstream consumer as a broken-pipe I/O error;
/// the decoder treats that as a clean end of the write phase.
pub trait RecordSink {
    /// Called once before the first record
    fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    /// Render one reading
    fn write(&mut self, record: &SemanticRecord) -> Result<()>;

    /// Called once after the last record
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Render a timestamp in the tool's standard date format
pub fn format_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
}
