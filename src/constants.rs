//! File layout and scaling constants for the SOLOII.DAT format
//!
//! This module contains the fixed byte offsets that divide a SOLOII.DAT file
//! into its four sections, the record widths, and the constants of the
//! implicit time encoding.

// =============================================================================
// File Sections
// =============================================================================

/// Six-byte ASCII signature at the start of every SOLOII.DAT file
pub const MAGIC: &[u8; 6] = b"SoloII";

/// Offset of the opaque pre-header bytes (between signature and header area)
pub const PRE_HEADER_OFFSET: u64 = 6;

/// Length of the opaque pre-header region
pub const PRE_HEADER_LEN: usize = 3;

/// Offset of the first header entry
pub const HEADER_AREA_OFFSET: u64 = 9;

/// Width of one header entry in bytes
pub const HEADER_ENTRY_LEN: usize = 35;

/// Capacity of the header area in entries
pub const HEADER_ENTRY_CAP: usize = 116;

/// Offset of the opaque bytes trailing the header area
pub const HEADER_TRAILER_OFFSET: u64 = 4069;

/// Length of the opaque header trailer region
pub const HEADER_TRAILER_LEN: usize = 27;

/// Offset of the opaque "extra data" region
pub const EXTRA_DATA_OFFSET: u64 = 4096;

/// Length of the opaque "extra data" region
pub const EXTRA_DATA_LEN: usize = 4096;

/// Bytes per row when hex-dumping the extra data region
pub const EXTRA_DUMP_ROW_LEN: usize = 64;

/// Offset of the first data record; data records run to end of file
pub const DATA_AREA_OFFSET: u64 = 8192;

/// Width of one data record in bytes
pub const DATA_RECORD_LEN: usize = 32;

// =============================================================================
// Time Encoding
// =============================================================================

/// Modulus of the ordinal row counter: the device wraps the row position at
/// 38912 = 19 * 2048
pub const ROW_MODULUS: i64 = 38_912;

/// Modulus of the stored 16-bit record index: 65536 = 32 * 2048
pub const INDEX_MODULUS: i64 = 65_536;

/// Upper bound on the congruence search quotient. The reduced modulus ratio
/// guarantees a solution below this bound whenever one exists.
pub const MAX_SLOT_QUOTIENT: i64 = 255;

/// Unix timestamp of the format epoch, 2007-01-01 00:00:00 UTC
pub const EPOCH_UNIX_SECONDS: i64 = 1_167_609_600;

/// Seconds per time slot (one reading every 15 minutes)
pub const SECONDS_PER_SLOT: i64 = 900;

// =============================================================================
// Field Sentinels and Scaling
// =============================================================================

/// Raw outdoor temperature byte meaning "no reading"
pub const TEMP_MISSING: u8 = 255;

/// `missed` byte value marking the entire record as a data gap
pub const GAP_MARKER: u8 = 255;

/// Divisor turning the raw signed 32-bit price into currency units
/// (three implied decimal digits)
pub const PRICE_SCALE: f64 = 1000.0;

/// Denominator of the accuracy percentage: `100 * (254 - missed) / 254`
pub const ACCURACY_BASE: f64 = 254.0;

/// Scale a raw temperature byte to degrees (0.5 degree resolution)
pub fn scale_temperature(raw: u8) -> f64 {
    f64::from(raw) / 2.0 - 30.0
}
