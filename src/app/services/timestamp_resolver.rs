//! Timestamp reconstruction from truncated counters
//!
//! A SOLOII.DAT data record never stores a full timestamp. Each record
//! carries a 16-bit index `i` equal to the true 15-minute time slot modulo
//! 65536, while the record's 0-based read position `n` equals the same slot
//! modulo 38912. Both moduli share the factor 2048 (38912 = 19 * 2048,
//! 65536 = 32 * 2048), so the slot is recovered by solving
//!
//! ```text
//! T ≡ n (mod 38912)
//! T ≡ i (mod 65536)
//! ```
//!
//! for the smallest non-negative quotient `xn` with
//! `xn * 38912 + (n - i) ≡ 0 (mod 65536)`, giving `T = xn * 38912 + n`.
//! The solution depends only on the difference `n - i`, which stays constant
//! for long stretches of a file, so solved differences are memoized.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::app::models::TimeSlot;
use crate::constants::{INDEX_MODULUS, MAX_SLOT_QUOTIENT, ROW_MODULUS};
use crate::{Error, Result};

/// Resolver owning the per-run congruence cache.
///
/// One instance serves exactly one decode run; the cached differences are
/// derived from one file's counter drift and are meaningless for another
/// file's time base.
#[derive(Debug, Default)]
pub struct TimestampResolver {
    /// Memo of solved quotients keyed by the counter difference `n - i`
    cache: HashMap<i64, i64>,

    /// Number of searches actually run (cache misses)
    fresh_solves: u64,
}

impl TimestampResolver {
    /// Create a resolver with an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Recover the absolute time slot for a record.
    ///
    /// `row` is the 0-based ordinal read position of the record, counted over
    /// every record in the data area, gaps included. `index` is the stored
    /// 16-bit truncated time index. Fails with [`Error::DateNotFound`] when
    /// no quotient at or below the search bound satisfies both congruences,
    /// which only happens for internally inconsistent counter pairs.
    pub fn resolve(&mut self, row: u64, index: u16) -> Result<TimeSlot> {
        let n = row as i64;
        let diff = n - i64::from(index);

        let xn = match self.cache.get(&diff) {
            Some(&xn) => xn,
            None => {
                debug!(row, index, diff, "finding new date offset");
                let xn = self.solve(diff).ok_or_else(|| {
                    Error::date_not_found(row, index)
                })?;
                self.fresh_solves += 1;
                self.cache.insert(diff, xn);
                xn
            }
        };

        Ok(TimeSlot(xn * ROW_MODULUS + n))
    }

    /// Bounded search for the smallest quotient satisfying
    /// `xn * 38912 + diff ≡ 0 (mod 65536)`
    fn solve(&self, diff: i64) -> Option<i64> {
        for xn in 0..=MAX_SLOT_QUOTIENT {
            let remainder = (xn * ROW_MODULUS + diff).rem_euclid(INDEX_MODULUS);
            if remainder == 0 {
                if xn > 0 {
                    // Nonzero remainder at xn = 0 means the counters just
                    // wrapped relative to each other: a date boundary
                    // crossing, worth surfacing.
                    info!(diff, xn, "date offset changed");
                }
                debug!(diff, xn, "found new date offset");
                return Some(xn);
            }
        }
        None
    }

    /// Number of cache misses so far; test hook for cache consistency
    pub fn fresh_solves(&self) -> u64 {
        self.fresh_solves
    }

    /// Number of distinct differences resolved so far
    pub fn cached_diffs(&self) -> usize {
        self.cache.len()
    }
}
