//! Fixed-width binary record decoding
//!
//! Pure byte-to-struct mappings for the two record shapes in a SOLOII.DAT
//! file: 35-byte header entries and 32-byte data records. All multi-byte
//! fields are little-endian. Callers must hand in exact-width buffers;
//! detecting end-of-section or truncation is the walk's job, not the codec's.

use byteorder::{ByteOrder, LittleEndian};

use crate::app::models::{DataRecord, HeaderEntry};
use crate::constants::{DATA_RECORD_LEN, HEADER_ENTRY_LEN};

/// Decode one 35-byte header entry.
///
/// Layout: two unclassified bytes, five u16 fields (tariffs, standing
/// charge, yearly budget), four unclassified bytes, six time-window bytes
/// (three start/end pairs), eleven unclassified bytes, and a trailing u16
/// entry index.
pub fn decode_header_entry(bytes: &[u8; HEADER_ENTRY_LEN]) -> HeaderEntry {
    HeaderEntry {
        unknown_00: [bytes[0], bytes[1]],
        tariff_1: LittleEndian::read_u16(&bytes[2..4]),
        tariff_2: LittleEndian::read_u16(&bytes[4..6]),
        tariff_3: LittleEndian::read_u16(&bytes[6..8]),
        std_charge: LittleEndian::read_u16(&bytes[8..10]),
        budget_yearly: LittleEndian::read_u16(&bytes[10..12]),
        unknown_12: bytes[12..16].try_into().expect("fixed slice width"),
        time_1_start: bytes[16],
        time_1_end: bytes[17],
        time_2_start: bytes[18],
        time_2_end: bytes[19],
        time_3_start: bytes[20],
        time_3_end: bytes[21],
        unknown_22: bytes[22..33].try_into().expect("fixed slice width"),
        index: LittleEndian::read_u16(&bytes[33..35]),
    }
}

/// Whether a 35-byte entry is the all-0xFF end-of-headers sentinel
pub fn is_end_of_headers(bytes: &[u8; HEADER_ENTRY_LEN]) -> bool {
    bytes.iter().all(|&b| b == 0xFF)
}

/// Decode one 32-byte data record.
///
/// Layout: u16 index, two unclassified bytes, u16 power in Wh, four
/// unclassified bytes, i32 price in milliunits, nine unclassified bytes,
/// outdoor and indoor temperature bytes, signed signal byte, two
/// unclassified bytes, missed count, group key, two unclassified bytes.
pub fn decode_data_record(bytes: &[u8; DATA_RECORD_LEN]) -> DataRecord {
    DataRecord {
        index: LittleEndian::read_u16(&bytes[0..2]),
        unknown_02: [bytes[2], bytes[3]],
        power_wh: LittleEndian::read_u16(&bytes[4..6]),
        unknown_06: bytes[6..10].try_into().expect("fixed slice width"),
        price_milliunits: LittleEndian::read_i32(&bytes[10..14]),
        unknown_14: bytes[14..23].try_into().expect("fixed slice width"),
        temp_out_raw: bytes[23],
        temp_in_raw: bytes[24],
        signal: bytes[25] as i8,
        unknown_26: [bytes[26], bytes[27]],
        missed: bytes[28],
        group_key: bytes[29],
        unknown_30: [bytes[30], bytes[31]],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data_bytes() -> [u8; DATA_RECORD_LEN] {
        let mut bytes = [0u8; DATA_RECORD_LEN];
        // index = 0x0102
        bytes[0] = 0x02;
        bytes[1] = 0x01;
        bytes[2] = 0xFE;
        bytes[3] = 0xFE;
        // power_wh = 320
        bytes[4] = 0x40;
        bytes[5] = 0x01;
        // price = -1500 milliunits
        let price = (-1500i32).to_le_bytes();
        bytes[10..14].copy_from_slice(&price);
        bytes[23] = 70; // temp_out 5.0
        bytes[24] = 40; // temp_in -10.0
        bytes[25] = 0x9C; // signal -100
        bytes[28] = 4; // missed
        bytes[29] = 7; // group key
        bytes
    }

    #[test]
    fn test_decode_data_record_fields() {
        let record = decode_data_record(&sample_data_bytes());
        assert_eq!(record.index, 0x0102);
        assert_eq!(record.unknown_02, [0xFE, 0xFE]);
        assert_eq!(record.power_wh, 320);
        assert_eq!(record.price_milliunits, -1500);
        assert_eq!(record.temp_out_raw, 70);
        assert_eq!(record.temp_in_raw, 40);
        assert_eq!(record.signal, -100);
        assert_eq!(record.missed, 4);
        assert_eq!(record.group_key, 7);
        assert!(!record.is_gap());
        assert!(record.has_temp_out());
    }

    #[test]
    fn test_decode_data_record_gap_and_sentinel() {
        let mut bytes = sample_data_bytes();
        bytes[23] = 255;
        bytes[28] = 255;
        let record = decode_data_record(&bytes);
        assert!(record.is_gap());
        assert!(!record.has_temp_out());
    }

    #[test]
    fn test_decode_header_entry_fields() {
        let mut bytes = [0u8; HEADER_ENTRY_LEN];
        bytes[0] = 165;
        bytes[1] = 33;
        // tariff_1 = 1234
        bytes[2..4].copy_from_slice(&1234u16.to_le_bytes());
        // budget_yearly = 50000
        bytes[10..12].copy_from_slice(&50_000u16.to_le_bytes());
        bytes[16] = 7; // time_1_start
        bytes[21] = 23; // time_3_end
        bytes[33..35].copy_from_slice(&3u16.to_le_bytes());

        let entry = decode_header_entry(&bytes);
        assert_eq!(entry.unknown_00, [165, 33]);
        assert_eq!(entry.tariff_1, 1234);
        assert_eq!(entry.budget_yearly, 50_000);
        assert_eq!(entry.time_1_start, 7);
        assert_eq!(entry.time_3_end, 23);
        assert_eq!(entry.index, 3);
    }

    #[test]
    fn test_end_of_headers_sentinel() {
        assert!(is_end_of_headers(&[0xFF; HEADER_ENTRY_LEN]));
        let mut almost = [0xFF; HEADER_ENTRY_LEN];
        almost[34] = 0xFE;
        assert!(!is_end_of_headers(&almost));
    }
}
