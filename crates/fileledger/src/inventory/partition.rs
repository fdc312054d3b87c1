//! Static range partitioning of record ids across workers.
//!
//! With `n` records and `w` workers, `base = n / w`. Workers `1..w-1` take
//! exactly `base` ids each and the last worker takes the remainder:
//!
//! ```text
//! n = 7, w = 3, base = 2
//! worker 1: [1, 2]   worker 2: [3, 4]   worker 3: [5, 7]
//! ```
//!
//! Each range is a pure function of the worker ordinal, so workers need
//! nothing shared beyond `n` and `w`. There is no rebalancing: a worker that
//! draws a few huge files simply finishes last.

use crate::error::{InventoryError, Result};
use serde::Serialize;

/// Inclusive, 1-indexed span of record ids. Empty when `lo > hi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IdRange {
    pub lo: i64,
    pub hi: i64,
}

impl IdRange {
    pub fn new(lo: i64, hi: i64) -> Self {
        Self { lo, hi }
    }

    pub fn is_empty(&self) -> bool {
        self.lo > self.hi
    }

    /// Number of ids covered.
    pub fn len(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            (self.hi - self.lo + 1) as u64
        }
    }

    pub fn contains(&self, id: i64) -> bool {
        self.lo <= id && id <= self.hi
    }

    /// Consecutive sub-ranges of at most `size` ids covering this range.
    pub fn batches(self, size: usize) -> impl Iterator<Item = IdRange> {
        let step = size.max(1) as i64;
        let mut next = self.lo;
        std::iter::from_fn(move || {
            if next > self.hi {
                return None;
            }
            let lo = next;
            let hi = lo.saturating_add(step - 1).min(self.hi);
            next = hi + 1;
            Some(IdRange { lo, hi })
        })
    }
}

impl std::fmt::Display for IdRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "[]")
        } else {
            write!(f, "[{}, {}]", self.lo, self.hi)
        }
    }
}

/// Range for worker `ordinal` (1-based) out of `workers`, over `total` records.
pub fn range_for(ordinal: usize, total: u64, workers: usize) -> Result<IdRange> {
    if workers == 0 {
        return Err(InventoryError::Config(
            "cannot partition across zero workers".to_string(),
        ));
    }
    if ordinal == 0 || ordinal > workers {
        return Err(InventoryError::InvalidState(format!(
            "worker ordinal {} outside 1..={}",
            ordinal, workers
        )));
    }

    let total = i64::try_from(total)
        .map_err(|_| InventoryError::InvalidState(format!("record count {} too large", total)))?;
    let w = workers as i64;
    let base = total / w;
    let ordinal = ordinal as i64;

    let lo = 1 + (ordinal - 1) * base;
    let hi = if ordinal == w { total } else { lo + base - 1 };
    Ok(IdRange { lo, hi })
}

/// Ranges for all workers, in ordinal order.
pub fn partition(total: u64, workers: usize) -> Result<Vec<IdRange>> {
    if workers == 0 {
        return Err(InventoryError::Config(
            "cannot partition across zero workers".to_string(),
        ));
    }
    (1..=workers)
        .map(|ordinal| range_for(ordinal, total, workers))
        .collect()
}
