//! Sequential section walks over a SOLOII.DAT file
//!
//! Drives the header and data walks, owns the ambient row counter the
//! timestamp reconstruction depends on, and pushes semantic readings into a
//! [`RecordSink`]. Decoding is strictly sequential: the row counter is the
//! 0-based count of 32-byte records read, gaps included, so there is no
//! parallel or out-of-order path through here.

use std::io::Read;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::app::models::{GapRun, HeaderEntry};
use crate::app::services::field_transformer::{FieldTransformer, GapTracker};
use crate::app::services::record_codec::{
    decode_data_record, decode_header_entry, is_end_of_headers,
};
use crate::app::services::solo_file::read_full;
use crate::app::services::timestamp_resolver::TimestampResolver;
use crate::constants::{DATA_RECORD_LEN, HEADER_ENTRY_CAP, HEADER_ENTRY_LEN};
use crate::output::RecordSink;
use crate::{Error, Result};

/// Non-fatal conditions encountered during a walk.
///
/// These stop the affected section's walk but never the sibling sections;
/// everything decoded before the condition remains valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DecodeWarning {
    /// The header area reached its 116-entry capacity without an
    /// end-of-headers sentinel
    HeaderAreaFull { entries: usize },

    /// A section ended with a non-empty read shorter than one record
    TruncatedRecord {
        section: &'static str,
        length: usize,
    },
}

/// Counters and warnings accumulated over one decode run
#[derive(Debug, Clone, Default, Serialize)]
pub struct DecodeStats {
    /// Header entries decoded
    pub header_entries: usize,

    /// Data records read, gaps included
    pub records_read: u64,

    /// Semantic readings handed to the sink
    pub records_emitted: u64,

    /// Rows carrying the gap marker
    pub gap_rows: u64,

    /// Contiguous gap runs reported
    pub gap_runs: u64,

    /// Records whose timestamp could not be reconstructed
    pub unresolved_dates: u64,

    /// Non-fatal walk-stopping conditions
    pub warnings: Vec<DecodeWarning>,
}

/// Decoder for one SOLOII.DAT file.
///
/// Owns the timestamp resolver and its congruence cache; the cache is
/// derived from this file's counter drift, so one decoder must never be
/// reused across files.
#[derive(Debug, Default)]
pub struct SoloDecoder {
    resolver: TimestampResolver,
    transformer: FieldTransformer,
    stats: DecodeStats,
}

impl SoloDecoder {
    /// Create a decoder, with an optional time shift in hours applied to
    /// every resolved timestamp
    pub fn new(time_shift_hours: i64) -> Self {
        Self {
            resolver: TimestampResolver::new(),
            transformer: FieldTransformer::new(time_shift_hours),
            stats: DecodeStats::default(),
        }
    }

    /// Walk the header area and decode its entries.
    ///
    /// The reader must be positioned at the first header entry. Stops at the
    /// first all-0xFF sentinel entry or at the 116-entry capacity, whichever
    /// comes first; hitting the capacity without a sentinel is recorded as a
    /// [`DecodeWarning::HeaderAreaFull`].
    pub fn read_header_entries(&mut self, reader: &mut impl Read) -> Result<Vec<HeaderEntry>> {
        let mut entries = Vec::new();
        let mut buf = [0u8; HEADER_ENTRY_LEN];

        loop {
            let got = read_full(reader, &mut buf)
                .map_err(|e| Error::io("failed to read header entry", e))?;
            if got == 0 {
                break;
            }
            if got < HEADER_ENTRY_LEN {
                warn!(length = got, "truncated header entry, stopping header walk");
                self.stats.warnings.push(DecodeWarning::TruncatedRecord {
                    section: "header",
                    length: got,
                });
                break;
            }

            if is_end_of_headers(&buf) {
                debug!(entries = entries.len(), "end of headers");
                break;
            }

            entries.push(decode_header_entry(&buf));

            if entries.len() == HEADER_ENTRY_CAP {
                warn!(entries = entries.len(), "header area full");
                self.stats.warnings.push(DecodeWarning::HeaderAreaFull {
                    entries: entries.len(),
                });
                break;
            }
        }

        self.stats.header_entries = entries.len();
        Ok(entries)
    }

    /// Walk the data area, reconstruct timestamps, and push readings into
    /// the sink.
    ///
    /// The reader must be positioned at the first data record. Gap-marked
    /// rows advance the row counter and feed the resolver but are not
    /// emitted; a closed downstream consumer ends the walk cleanly.
    pub fn decode_data(&mut self, reader: &mut impl Read, sink: &mut dyn RecordSink) -> Result<()> {
        let mut buf = [0u8; DATA_RECORD_LEN];
        let mut row: u64 = 0;
        let mut gaps = GapTracker::new();

        if !self.sink_ok(sink.begin())? {
            return Ok(());
        }

        loop {
            let got = read_full(reader, &mut buf)
                .map_err(|e| Error::io("failed to read data record", e))?;
            if got == 0 {
                break;
            }
            if got < DATA_RECORD_LEN {
                warn!(length = got, "truncated data record, stopping data walk");
                self.stats.warnings.push(DecodeWarning::TruncatedRecord {
                    section: "data",
                    length: got,
                });
                break;
            }

            let record = decode_data_record(&buf);
            self.stats.records_read += 1;

            // Gap rows participate in the congruence sequence too.
            let slot = match self.resolver.resolve(row, record.index) {
                Ok(slot) => Some(slot),
                Err(Error::DateNotFound { .. }) => {
                    warn!(row, index = record.index, "date not found");
                    self.stats.unresolved_dates += 1;
                    None
                }
                Err(e) => return Err(e),
            };

            if record.is_gap() {
                self.stats.gap_rows += 1;
                gaps.observe(row, true);
            } else {
                if let Some(run) = gaps.observe(row, false) {
                    self.report_gap_run(run);
                }
                let reading = self.transformer.transform(&record, slot, row);
                if !self.sink_ok(sink.write(&reading))? {
                    return Ok(());
                }
                self.stats.records_emitted += 1;
            }

            row += 1;
        }

        if let Some(run) = gaps.finish(row) {
            self.report_gap_run(run);
        }
        if !self.sink_ok(sink.finish())? {
            return Ok(());
        }
        Ok(())
    }

    /// Statistics accumulated so far
    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    /// Consume the decoder and return its statistics
    pub fn into_stats(self) -> DecodeStats {
        self.stats
    }

    fn report_gap_run(&mut self, run: GapRun) {
        info!(
            run_length = run.run_length,
            start_row = run.start_row,
            end_row = run.end_row,
            "empty data rows"
        );
        self.stats.gap_runs += 1;
    }

    fn sink_ok(&self, result: Result<()>) -> Result<bool> {
        match result {
            Ok(()) => Ok(true),
            Err(e) if e.is_broken_pipe() => {
                debug!("output consumer closed, stopping cleanly");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::SemanticRecord;
    use std::io::Cursor;

    /// Sink collecting readings in memory
    #[derive(Default)]
    struct CollectSink {
        records: Vec<SemanticRecord>,
        finished: bool,
    }

    impl RecordSink for CollectSink {
        fn write(&mut self, record: &SemanticRecord) -> Result<()> {
            self.records.push(record.clone());
            Ok(())
        }

        fn finish(&mut self) -> Result<()> {
            self.finished = true;
            Ok(())
        }
    }

    /// Sink that reports a closed pipe on the nth write
    struct ClosingSink {
        accept: usize,
        written: usize,
    }

    impl RecordSink for ClosingSink {
        fn write(&mut self, _record: &SemanticRecord) -> Result<()> {
            if self.written == self.accept {
                return Err(Error::output(
                    "write failed",
                    std::io::Error::from(std::io::ErrorKind::BrokenPipe),
                ));
            }
            self.written += 1;
            Ok(())
        }
    }

    fn data_record_bytes(row: u64, missed: u8) -> [u8; DATA_RECORD_LEN] {
        let mut bytes = [0u8; DATA_RECORD_LEN];
        bytes[0..2].copy_from_slice(&(row as u16).to_le_bytes());
        bytes[4..6].copy_from_slice(&100u16.to_le_bytes());
        bytes[23] = 70;
        bytes[24] = 100;
        bytes[28] = missed;
        bytes
    }

    fn header_entry_bytes(index: u16) -> [u8; HEADER_ENTRY_LEN] {
        let mut bytes = [0u8; HEADER_ENTRY_LEN];
        bytes[33..35].copy_from_slice(&index.to_le_bytes());
        bytes
    }

    #[test]
    fn test_header_walk_stops_at_sentinel() {
        let mut area = Vec::new();
        area.extend_from_slice(&header_entry_bytes(1));
        area.extend_from_slice(&header_entry_bytes(2));
        area.extend_from_slice(&[0xFF; HEADER_ENTRY_LEN]);
        area.extend_from_slice(&header_entry_bytes(3)); // past the sentinel

        let mut decoder = SoloDecoder::new(0);
        let entries = decoder
            .read_header_entries(&mut Cursor::new(area))
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].index, 2);
        assert!(decoder.stats().warnings.is_empty());
    }

    #[test]
    fn test_header_walk_reports_full_area() {
        let mut area = Vec::new();
        for i in 0..HEADER_ENTRY_CAP + 4 {
            area.extend_from_slice(&header_entry_bytes(i as u16));
        }

        let mut decoder = SoloDecoder::new(0);
        let entries = decoder
            .read_header_entries(&mut Cursor::new(area))
            .unwrap();
        assert_eq!(entries.len(), HEADER_ENTRY_CAP);
        assert_eq!(
            decoder.stats().warnings,
            vec![DecodeWarning::HeaderAreaFull {
                entries: HEADER_ENTRY_CAP
            }]
        );
    }

    #[test]
    fn test_header_walk_reports_truncation() {
        let mut area = Vec::new();
        area.extend_from_slice(&header_entry_bytes(1));
        area.extend_from_slice(&[0u8; 10]); // short trailing entry

        let mut decoder = SoloDecoder::new(0);
        let entries = decoder
            .read_header_entries(&mut Cursor::new(area))
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            decoder.stats().warnings,
            vec![DecodeWarning::TruncatedRecord {
                section: "header",
                length: 10
            }]
        );
    }

    #[test]
    fn test_data_walk_emits_readings_in_order() {
        let mut area = Vec::new();
        for row in 0..3 {
            area.extend_from_slice(&data_record_bytes(row, 0));
        }

        let mut decoder = SoloDecoder::new(0);
        let mut sink = CollectSink::default();
        decoder
            .decode_data(&mut Cursor::new(area), &mut sink)
            .unwrap();

        assert!(sink.finished);
        assert_eq!(sink.records.len(), 3);
        assert_eq!(
            sink.records[0].timestamp.unwrap().to_rfc3339(),
            "2007-01-01T00:00:00+00:00"
        );
        assert_eq!(
            sink.records[2].timestamp.unwrap().to_rfc3339(),
            "2007-01-01T00:30:00+00:00"
        );
        assert_eq!(decoder.stats().records_read, 3);
        assert_eq!(decoder.stats().records_emitted, 3);
    }

    #[test]
    fn test_data_walk_suppresses_gap_rows_but_counts_them() {
        let mut area = Vec::new();
        area.extend_from_slice(&data_record_bytes(0, 0));
        area.extend_from_slice(&data_record_bytes(1, 255));
        area.extend_from_slice(&data_record_bytes(2, 255));
        area.extend_from_slice(&data_record_bytes(3, 0));
        area.extend_from_slice(&data_record_bytes(4, 255));

        let mut decoder = SoloDecoder::new(0);
        let mut sink = CollectSink::default();
        decoder
            .decode_data(&mut Cursor::new(area), &mut sink)
            .unwrap();

        assert_eq!(sink.records.len(), 2);
        // The row counter advanced through the gaps, so the record after
        // them still lands on its true slot.
        assert_eq!(
            sink.records[1].timestamp.unwrap().to_rfc3339(),
            "2007-01-01T00:45:00+00:00"
        );

        let stats = decoder.stats();
        assert_eq!(stats.records_read, 5);
        assert_eq!(stats.gap_rows, 3);
        assert_eq!(stats.gap_runs, 2); // one mid-file, one closed at EOF
    }

    #[test]
    fn test_data_walk_reports_trailing_truncation() {
        let mut area = Vec::new();
        area.extend_from_slice(&data_record_bytes(0, 0));
        area.extend_from_slice(&[0u8; 31]); // one byte short

        let mut decoder = SoloDecoder::new(0);
        let mut sink = CollectSink::default();
        decoder
            .decode_data(&mut Cursor::new(area), &mut sink)
            .unwrap();

        assert_eq!(sink.records.len(), 1);
        assert_eq!(
            decoder.stats().warnings,
            vec![DecodeWarning::TruncatedRecord {
                section: "data",
                length: 31
            }]
        );
    }

    #[test]
    fn test_data_walk_exact_multiple_is_clean() {
        let mut area = Vec::new();
        area.extend_from_slice(&data_record_bytes(0, 0));

        let mut decoder = SoloDecoder::new(0);
        let mut sink = CollectSink::default();
        decoder
            .decode_data(&mut Cursor::new(area), &mut sink)
            .unwrap();
        assert!(decoder.stats().warnings.is_empty());
    }

    #[test]
    fn test_data_walk_unresolvable_date_continues() {
        let mut area = Vec::new();
        // Row 0 with index 1: difference -1 has no solution.
        let mut bytes = data_record_bytes(0, 0);
        bytes[0..2].copy_from_slice(&1u16.to_le_bytes());
        area.extend_from_slice(&bytes);
        area.extend_from_slice(&data_record_bytes(1, 0));

        let mut decoder = SoloDecoder::new(0);
        let mut sink = CollectSink::default();
        decoder
            .decode_data(&mut Cursor::new(area), &mut sink)
            .unwrap();

        assert_eq!(sink.records.len(), 2);
        assert_eq!(sink.records[0].timestamp, None);
        assert!(sink.records[1].timestamp.is_some());
        assert_eq!(decoder.stats().unresolved_dates, 1);
    }

    #[test]
    fn test_closed_consumer_stops_cleanly() {
        let mut area = Vec::new();
        for row in 0..5 {
            area.extend_from_slice(&data_record_bytes(row, 0));
        }

        let mut decoder = SoloDecoder::new(0);
        let mut sink = ClosingSink {
            accept: 2,
            written: 0,
        };
        // No error even though the sink rejected the third write.
        decoder
            .decode_data(&mut Cursor::new(area), &mut sink)
            .unwrap();
        assert_eq!(decoder.stats().records_emitted, 2);
    }
}
