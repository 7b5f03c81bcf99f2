//! Diff algorithms and the types they share.
//!
//! Two algorithms produce the same output shape, a sorted vector of
//! [`SequenceDiff`]s: a dynamic-programming diff that supports a real-valued
//! per-match scoring function ([`dp`]) and a forward Myers diff ([`myers`]).
//! Which one runs is decided purely by input size, with the thresholds the
//! reference engine uses.

use std::ops::Range;
use std::time::{Duration, Instant};

use crate::sequence::{LineSequence, Sequence};

pub(crate) mod dp;
pub(crate) mod myers;

/// A pair of half-open index ranges describing one non-matching region on two
/// sequences. At least one of the ranges is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SequenceDiff {
    /// The covered range on the first (original) sequence.
    pub before: Range<u32>,
    /// The covered range on the second (modified) sequence.
    pub after: Range<u32>,
}

impl SequenceDiff {
    pub(crate) fn new(before: Range<u32>, after: Range<u32>) -> Self {
        SequenceDiff { before, after }
    }

    /// Returns whether elements are only inserted and not removed.
    pub(crate) fn is_pure_insertion(&self) -> bool {
        self.before.is_empty()
    }

    /// Returns whether elements are only removed and not inserted.
    pub(crate) fn is_pure_removal(&self) -> bool {
        self.after.is_empty()
    }

    /// Shifts both ranges by `delta`. The caller guarantees the result stays
    /// within the sequences.
    pub(crate) fn delta(&self, delta: i32) -> SequenceDiff {
        let shift = |range: &Range<u32>| {
            (range.start as i32 + delta) as u32..(range.end as i32 + delta) as u32
        };
        SequenceDiff::new(shift(&self.before), shift(&self.after))
    }

    /// Swaps the two sides.
    pub(crate) fn swapped(&self) -> SequenceDiff {
        SequenceDiff::new(self.after.clone(), self.before.clone())
    }

    /// The smallest diff covering both `self` and `other`.
    pub(crate) fn join(&self, other: &SequenceDiff) -> SequenceDiff {
        SequenceDiff::new(
            self.before.start.min(other.before.start)..self.before.end.max(other.before.end),
            self.after.start.min(other.after.start)..self.after.end.max(other.after.end),
        )
    }

    /// Per-side intersection with `other`; empty ranges where the sides do
    /// not overlap.
    pub(crate) fn intersect(&self, other: &SequenceDiff) -> SequenceDiff {
        let clamp = |a: &Range<u32>, b: &Range<u32>| {
            let start = a.start.max(b.start);
            start..a.end.min(b.end).max(start)
        };
        SequenceDiff::new(
            clamp(&self.before, &other.before),
            clamp(&self.after, &other.after),
        )
    }

    /// The start offsets of both ranges.
    pub(crate) fn starts(&self) -> (u32, u32) {
        (self.before.start, self.after.start)
    }

    /// The exclusive end offsets of both ranges.
    pub(crate) fn ends(&self) -> (u32, u32) {
        (self.before.end, self.after.end)
    }

    /// The aligned equal regions around `diffs` on sequences of the given
    /// lengths, oldest first. The result has one entry more than `diffs`;
    /// leading/trailing entries may be empty.
    pub(crate) fn invert(diffs: &[SequenceDiff], len1: u32, len2: u32) -> Vec<SequenceDiff> {
        let mut result = Vec::with_capacity(diffs.len() + 1);
        let mut last = (0, 0);
        for diff in diffs {
            result.push(SequenceDiff::new(
                last.0..diff.before.start,
                last.1..diff.after.start,
            ));
            last = diff.ends();
        }
        result.push(SequenceDiff::new(last.0..len1, last.1..len2));
        result
    }
}

/// What an algorithm returns: the diffs in source order plus whether the
/// deadline cut the computation short.
#[derive(Debug, Default)]
pub(crate) struct DiffResult {
    pub diffs: Vec<SequenceDiff>,
    pub hit_timeout: bool,
}

impl DiffResult {
    /// The coarsest valid answer: one diff spanning everything (or none when
    /// both sequences are empty).
    pub(crate) fn trivial(len1: usize, len2: usize) -> DiffResult {
        let diffs = if len1 == 0 && len2 == 0 {
            Vec::new()
        } else {
            vec![SequenceDiff::new(0..len1 as u32, 0..len2 as u32)]
        };
        DiffResult {
            diffs,
            hit_timeout: false,
        }
    }
}

/// A cooperative wall-clock deadline checked at natural inner-loop
/// boundaries (per DP row, per Myers `d` step, per shifted diff).
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    deadline: Option<Instant>,
}

impl Deadline {
    /// A deadline `ms` milliseconds from now; `0` means unlimited.
    pub(crate) fn after_ms(ms: u32) -> Deadline {
        let deadline = (ms != 0).then(|| Instant::now() + Duration::from_millis(u64::from(ms)));
        Deadline { deadline }
    }

    pub(crate) fn expired(&self) -> bool {
        self.deadline.map_or(false, |deadline| Instant::now() >= deadline)
    }
}

/// Upper bound on `len1 + len2` for the DP diff at line level.
const DP_LINE_LIMIT: usize = 1700;
/// Upper bound on `len1 + len2` for the DP diff at character level.
const DP_CHAR_LIMIT: usize = 500;

/// The line-level dispatcher.
///
/// Small inputs get the DP diff with a whitespace-sensitivity score: lines
/// whose raw text matches score `0.1` when empty and `1 + ln(1 + len)`
/// otherwise, while lines that match only once trimmed score `0.99`. That
/// steers the alignment toward pairing lines that are equal byte for byte,
/// which keeps whitespace-only changes localized. Large inputs fall back to
/// the Myers diff on the interned tokens.
pub(crate) fn line_diff(
    before: &LineSequence<'_>,
    after: &LineSequence<'_>,
    deadline: &Deadline,
) -> DiffResult {
    if before.len() + after.len() < DP_LINE_LIMIT {
        dp::diff(before, after, deadline, |offset1, offset2| {
            let modified = after.raw_line(offset2);
            if before.raw_line(offset1) == modified {
                if modified.is_empty() {
                    0.1
                } else {
                    1.0 + (1.0 + modified.len() as f64).ln()
                }
            } else {
                0.99
            }
        })
    } else {
        myers::diff(before, after, deadline)
    }
}

/// The character-level dispatcher.
///
/// Small inputs get the DP diff with a slight bonus for matches that sit at
/// high-scoring boundary positions; the factor is small enough that the
/// bonus only ever breaks ties between alignments with the same match
/// count. Large inputs fall back to the Myers diff.
pub(crate) fn char_diff<S: Sequence>(before: &S, after: &S, deadline: &Deadline) -> DiffResult {
    if before.len() + after.len() < DP_CHAR_LIMIT {
        dp::diff(before, after, deadline, |offset1, offset2| {
            1.0 + 0.0001 * (before.boundary_score(offset1) + after.boundary_score(offset2)) as f64
        })
    } else {
        myers::diff(before, after, deadline)
    }
}
