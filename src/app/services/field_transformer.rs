//! Raw-to-semantic field transformation
//!
//! Applies sentinel detection and physical-unit scaling to decoded data
//! records, and tracks runs of gap-marked rows so they can be reported as a
//! single event instead of row-by-row noise.

use chrono::Duration;

use crate::app::models::{DataRecord, GapRun, SemanticRecord, TimeSlot};
use crate::constants::{ACCURACY_BASE, PRICE_SCALE, scale_temperature};

/// Pure transformer from raw records to semantic readings.
///
/// Carries the caller-supplied time shift, a post-processing offset applied
/// after timestamp resolution and not part of resolution itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldTransformer {
    time_shift_hours: i64,
}

impl FieldTransformer {
    /// Create a transformer with an optional time shift in hours
    pub fn new(time_shift_hours: i64) -> Self {
        Self { time_shift_hours }
    }

    /// Derive the semantic reading for a non-gap record.
    ///
    /// `slot` is `None` when timestamp resolution failed for this record;
    /// the reading is still produced, with an absent timestamp.
    pub fn transform(&self, record: &DataRecord, slot: Option<TimeSlot>, row: u64) -> SemanticRecord {
        let timestamp = slot
            .map(TimeSlot::datetime)
            .map(|dt| dt + Duration::hours(self.time_shift_hours));

        SemanticRecord {
            timestamp,
            row,
            power_wh: record.power_wh,
            price: f64::from(record.price_milliunits) / PRICE_SCALE,
            temp_out: record
                .has_temp_out()
                .then(|| scale_temperature(record.temp_out_raw)),
            temp_in: scale_temperature(record.temp_in_raw),
            signal: record.signal,
            accuracy: 100.0 * (ACCURACY_BASE - f64::from(record.missed)) / ACCURACY_BASE,
            missed: record.missed,
            group_key: record.group_key,
        }
    }
}

/// Tracks consecutive gap-marked rows as a single run.
///
/// Gap rows still advance the row counter and still feed the timestamp
/// resolver; only their semantic payload is suppressed.
#[derive(Debug, Default)]
pub struct GapTracker {
    start_row: Option<u64>,
    count: u64,
}

impl GapTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record whether the given row is a gap.
    ///
    /// Returns the completed run when a non-gap row closes one.
    pub fn observe(&mut self, row: u64, is_gap: bool) -> Option<GapRun> {
        if is_gap {
            if self.start_row.is_none() {
                self.start_row = Some(row);
                self.count = 0;
            }
            self.count += 1;
            None
        } else {
            self.take_run(row)
        }
    }

    /// Close and return any open run at end of data
    pub fn finish(&mut self, next_row: u64) -> Option<GapRun> {
        self.take_run(next_row)
    }

    fn take_run(&mut self, next_row: u64) -> Option<GapRun> {
        let start_row = self.start_row.take()?;
        let run = GapRun {
            start_row,
            end_row: next_row - 1,
            run_length: self.count,
        };
        self.count = 0;
        Some(run)
    }
}
