//! Data models for SOLOII.DAT decoding
//!
//! This module contains the core data structures for representing decoded
//! header entries, raw data records, and the semantic readings handed to the
//! output layer. Fields whose meaning is unknown are kept verbatim as opaque
//! byte arrays named after their byte offset within the record.

use crate::constants::{EPOCH_UNIX_SECONDS, GAP_MARKER, SECONDS_PER_SLOT, TEMP_MISSING};
use chrono::{DateTime, Utc};
use serde::Serialize;

// =============================================================================
// Time Slot
// =============================================================================

/// A count of 15-minute periods since the format epoch, 2007-01-01 00:00:00 UTC.
///
/// This is the native time unit of the format; no record stores a full
/// timestamp. Values are reconstructed by
/// [`TimestampResolver`](crate::app::services::timestamp_resolver::TimestampResolver).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeSlot(pub i64);

impl TimeSlot {
    /// Unix timestamp of the start of this slot
    pub fn unix_seconds(self) -> i64 {
        EPOCH_UNIX_SECONDS + self.0 * SECONDS_PER_SLOT
    }

    /// Absolute UTC timestamp of the start of this slot
    pub fn datetime(self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.unix_seconds(), 0)
            .expect("slot timestamps are within chrono's representable range")
    }
}

// =============================================================================
// Header Entry
// =============================================================================

/// One decoded 35-byte header entry.
///
/// Only the tariff, budget, and time-window fields have known meaning; the
/// rest of the entry is reverse-engineered and retained as opaque bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderEntry {
    /// Bytes 0-1, unclassified
    pub unknown_00: [u8; 2],

    /// First tariff rate
    pub tariff_1: u16,

    /// Second tariff rate
    pub tariff_2: u16,

    /// Third tariff rate
    pub tariff_3: u16,

    /// Standing charge
    pub std_charge: u16,

    /// Yearly budget
    pub budget_yearly: u16,

    /// Bytes 12-15, unclassified
    pub unknown_12: [u8; 4],

    /// Start of the first tariff time window
    pub time_1_start: u8,
    /// End of the first tariff time window
    pub time_1_end: u8,
    /// Start of the second tariff time window
    pub time_2_start: u8,
    /// End of the second tariff time window
    pub time_2_end: u8,
    /// Start of the third tariff time window
    pub time_3_start: u8,
    /// End of the third tariff time window
    pub time_3_end: u8,

    /// Bytes 22-32, unclassified
    pub unknown_22: [u8; 11],

    /// Entry index, bytes 33-34
    pub index: u16,
}

// =============================================================================
// Data Record
// =============================================================================

/// One decoded 32-byte data record, raw fields as stored on the device.
///
/// The record's ordinal read position is not stored here; it is an ambient
/// property of the sequential read loop and is required alongside `index` to
/// reconstruct the timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRecord {
    /// Truncated 16-bit time index (true slot modulo 65536)
    pub index: u16,

    /// Bytes 2-3, unclassified (usually 0xFEFE)
    pub unknown_02: [u8; 2],

    /// Energy used in this slot, watt-hours
    pub power_wh: u16,

    /// Bytes 6-9, unclassified
    pub unknown_06: [u8; 4],

    /// Price in thousandths of the configured currency unit
    pub price_milliunits: i32,

    /// Bytes 14-22, unclassified
    pub unknown_14: [u8; 9],

    /// Raw outdoor temperature byte, 255 meaning no reading
    pub temp_out_raw: u8,

    /// Raw indoor temperature byte, always a reading
    pub temp_in_raw: u8,

    /// Transmitter signal level
    pub signal: i8,

    /// Bytes 26-27, unclassified (usually 0xFF00)
    pub unknown_26: [u8; 2],

    /// Count of missed transmissions in this slot; 255 marks the whole
    /// record as a gap
    pub missed: u8,

    /// Opaque per-record tag of unknown meaning
    pub group_key: u8,

    /// Bytes 30-31, unclassified
    pub unknown_30: [u8; 2],
}

impl DataRecord {
    /// Whether this record is a gap marker rather than a reading
    pub fn is_gap(&self) -> bool {
        self.missed == GAP_MARKER
    }

    /// Whether the outdoor temperature byte carries a reading
    pub fn has_temp_out(&self) -> bool {
        self.temp_out_raw != TEMP_MISSING
    }
}

// =============================================================================
// Semantic Record
// =============================================================================

/// A fully derived reading: the boundary the decoder exposes to output sinks.
///
/// Every output format renders this structure; none of them see raw records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticRecord {
    /// Absolute reading time, or `None` when the congruence search failed
    pub timestamp: Option<DateTime<Utc>>,

    /// Ordinal read position of the record within the data area
    pub row: u64,

    /// Energy used in this slot, watt-hours
    pub power_wh: u16,

    /// Price per kWh in currency units
    pub price: f64,

    /// Outdoor temperature in degrees, absent when the sensor had no reading
    pub temp_out: Option<f64>,

    /// Indoor temperature in degrees
    pub temp_in: f64,

    /// Transmitter signal level
    pub signal: i8,

    /// Reception accuracy percentage, `100 * (254 - missed) / 254`
    pub accuracy: f64,

    /// Raw missed-transmission count
    pub missed: u8,

    /// Opaque per-record tag, passed through unchanged
    pub group_key: u8,
}

// =============================================================================
// Gap Runs
// =============================================================================

/// A contiguous run of gap-marked rows, reported once when the run closes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GapRun {
    /// Row of the first gap record in the run
    pub start_row: u64,

    /// Row of the last gap record in the run
    pub end_row: u64,

    /// Number of gap records in the run
    pub run_length: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_zero_is_epoch() {
        let dt = TimeSlot(0).datetime();
        assert_eq!(dt.to_rfc3339(), "2007-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_slot_one_is_quarter_past() {
        let dt = TimeSlot(1).datetime();
        assert_eq!(dt.to_rfc3339(), "2007-01-01T00:15:00+00:00");
    }

    #[test]
    fn test_slot_unix_seconds() {
        assert_eq!(TimeSlot(0).unix_seconds(), 1_167_609_600);
        assert_eq!(TimeSlot(4).unix_seconds(), 1_167_609_600 + 3600);
    }
}
