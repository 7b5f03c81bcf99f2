#![deny(missing_docs)]
//! Kamili-diff is an exact (kamili in Swahili) structured diff library for Rust.
//! Exact refers to the fact that kamili-diff reproduces the range output of the
//! diff engine behind a well known editor's side-by-side view: instead of a flat
//! edit script it returns a hierarchy of line alignments, each carrying optional
//! character-level inner changes with precise (line, column) positions.
//!
//! The pipeline mirrors that engine stage by stage:
//!
//! * Distinct (trimmed) lines are interned to dense ids so that all line
//!   equality checks during the diff are integer comparisons without any risk
//!   of hash collisions corrupting the result.
//! * A line-level alignment is computed either by a dynamic-programming diff
//!   with a length-aware scoring function (small inputs) or by a forward
//!   Myers diff (large inputs).
//! * Two layers of heuristics move diff boundaries to visually natural
//!   positions (low indentation, word edges) and coalesce diffs separated by
//!   insignificant matches.
//! * Every modified region is then re-diffed at character level on trimmed
//!   per-line slices, and the resulting offsets are translated back into
//!   exact positions in the original buffers.
//! * Equal regions are rescanned for lines that differ only in leading or
//!   trailing whitespace, which become dedicated alignments of their own.
//!
//! # API Overview
//!
//! The entry point is [`compute_diff`]. It takes the two buffers as slices of
//! line strings (no terminators, see [`sources::split_lines`]) plus
//! [`DiffOptions`], and returns a [`LinesDiff`]:
//!
//! ```
//! # use kamili_diff::{compute_diff, DiffOptions};
//! #
//! let original = ["fn foo() {", "    bar();", "}"];
//! let modified = ["fn foo() {", "    baz();", "}"];
//! let diff = compute_diff(&original, &modified, &DiffOptions::default());
//!
//! assert!(!diff.hit_timeout);
//! assert_eq!(diff.changes.len(), 1);
//! let change = &diff.changes[0];
//! assert_eq!((change.original.start, change.original.end), (2, 3));
//! assert_eq!((change.modified.start, change.modified.end), (2, 3));
//! // The inner change pins down `bar` -> `baz` within the line.
//! assert_eq!(change.inner_changes.len(), 1);
//! ```
//!
//! Cancellation is cooperative: when `max_computation_time_ms` is exceeded the
//! engine finishes with its best effort and flags the result via
//! [`LinesDiff::hit_timeout`] instead of returning an error. All stages keep
//! running after a timeout so the output is always well formed.

use std::fmt;

use crate::algorithm::{line_diff, Deadline, SequenceDiff};
use crate::intern::{trim_ws, Interner};
use crate::sequence::LineSequence;

mod algorithm;
mod heuristics;
mod intern;
mod refine;
mod sequence;
pub mod sources;

#[cfg(test)]
mod tests;

/// Options controlling a [`compute_diff`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOptions {
    /// When `true`, lines that differ only in leading/trailing whitespace are
    /// reported as unchanged. When `false` (the default) such lines still
    /// align at line level, but the whitespace delta is surfaced as an inner
    /// change of a dedicated [`LineRangeMapping`].
    pub ignore_trim_whitespace: bool,
    /// Wall-clock budget for the whole computation in milliseconds.
    /// `0` means no limit. On expiry the engine degrades gracefully,
    /// see [`LinesDiff::hit_timeout`].
    pub max_computation_time_ms: u32,
    /// Move detection is not implemented; this must be `false`.
    /// The field exists so the options struct matches the reference engine's
    /// input contract.
    pub compute_moves: bool,
    /// Additionally extend character diffs to subword boundaries
    /// (camel-case humps, letter/digit transitions). Defaults to `false`.
    pub extend_to_subwords: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        DiffOptions {
            ignore_trim_whitespace: false,
            max_computation_time_ms: 0,
            compute_moves: false,
            extend_to_subwords: false,
        }
    }
}

/// A position in a text buffer. Both `line` and `column` are 1-indexed and
/// counted in code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// 1-indexed line number.
    pub line: u32,
    /// 1-indexed column, in code points.
    pub column: u32,
}

impl Position {
    /// Creates a position from 1-indexed `line` and `column`.
    pub fn new(line: u32, column: u32) -> Position {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.line, self.column)
    }
}

/// A range between two [`Position`]s; the end position is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextRange {
    /// The first position covered by the range.
    pub start: Position,
    /// The first position after the range.
    pub end: Position,
}

impl TextRange {
    /// Creates a range from `start` (inclusive) to `end` (exclusive).
    pub fn new(start: Position, end: Position) -> TextRange {
        TextRange { start, end }
    }

    /// Returns `true` if the range covers no positions.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if `position` lies within the range.
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position < self.end
    }

    /// The smallest range covering both `self` and `other`.
    pub fn join(&self, other: &TextRange) -> TextRange {
        TextRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A 1-indexed, end-exclusive range of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineRange {
    /// The first line of the range.
    pub start: u32,
    /// The first line after the range.
    pub end: u32,
}

impl LineRange {
    /// Creates a line range from `start` (inclusive) to `end` (exclusive).
    pub fn new(start: u32, end: u32) -> LineRange {
        LineRange { start, end }
    }

    /// Returns `true` if the range covers no lines.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The number of lines covered by the range.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns `true` if the 1-indexed `line` lies within the range.
    pub fn contains(&self, line: u32) -> bool {
        self.start <= line && line < self.end
    }

    /// The smallest range covering both `self` and `other`.
    pub fn join(&self, other: &LineRange) -> LineRange {
        LineRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{})", self.start, self.end)
    }
}

/// A pair of [`TextRange`]s describing the same change on the original and
/// the modified buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeMapping {
    /// The changed range in the original buffer.
    pub original: TextRange,
    /// The corresponding range in the modified buffer.
    pub modified: TextRange,
}

impl fmt::Display for RangeMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.original, self.modified)
    }
}

/// A pair of [`LineRange`]s describing a changed region, together with the
/// character-level changes inside it.
///
/// An empty `original` range marks a pure insertion, an empty `modified`
/// range a pure removal; such mappings carry no inner changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRangeMapping {
    /// The changed lines in the original buffer.
    pub original: LineRange,
    /// The corresponding lines in the modified buffer.
    pub modified: LineRange,
    /// Character-level changes within the mapped lines, sorted by original
    /// start position. Inner ranges may extend to the end of the line just
    /// before the mapped region, which is how a change that swallows a line
    /// break is represented.
    pub inner_changes: Vec<RangeMapping>,
}

impl LineRangeMapping {
    /// Returns `true` if lines are only inserted and not removed in this mapping.
    pub fn is_pure_insertion(&self) -> bool {
        self.original.is_empty()
    }

    /// Returns `true` if lines are only removed and not inserted in this mapping.
    pub fn is_pure_removal(&self) -> bool {
        self.modified.is_empty()
    }
}

impl fmt::Display for LineRangeMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.original, self.modified)
    }
}

/// The result of [`compute_diff`]: all changed regions between the two
/// buffers in source order.
///
/// Consecutive mappings never overlap, on either side. The regions between
/// them consist of lines whose trimmed content matches pairwise.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinesDiff {
    /// The changed regions, sorted by [`LineRangeMapping::original`] start.
    pub changes: Vec<LineRangeMapping>,
    /// Set when the computation ran out of its time budget anywhere in the
    /// pipeline. The diff is still valid, but boundaries may not be minimal
    /// or fully polished. Callers should surface this to the user.
    pub hit_timeout: bool,
}

/// Computes the structured diff between `original` and `modified`.
///
/// Both buffers are given as slices of line contents without terminators.
/// Callers must split on `\n` only, keeping any trailing `\r` and keeping the
/// empty element after a final newline; [`sources::split_lines`] implements
/// exactly that contract.
///
/// The call never panics and never fails: unusual inputs (empty buffers,
/// one-sided emptiness) are valid and produce pure insertions/removals.
/// A timeout is reported in-band via [`LinesDiff::hit_timeout`].
pub fn compute_diff<S: AsRef<str>>(
    original: &[S],
    modified: &[S],
    options: &DiffOptions,
) -> LinesDiff {
    debug_assert!(!options.compute_moves, "move detection is not implemented");
    let original: Vec<&str> = original.iter().map(AsRef::as_ref).collect();
    let modified: Vec<&str> = modified.iter().map(AsRef::as_ref).collect();

    if original == modified {
        return LinesDiff::default();
    }

    let deadline = Deadline::after_ms(options.max_computation_time_ms);
    let consider_whitespace = !options.ignore_trim_whitespace;

    let mut interner = Interner::with_capacity(original.len() + modified.len());
    let before_tokens = original.iter().map(|l| interner.intern(trim_ws(l))).collect();
    let after_tokens = modified.iter().map(|l| interner.intern(trim_ws(l))).collect();
    debug_assert!(interner.len() as usize <= original.len() + modified.len());
    let before = LineSequence::new(before_tokens, &original);
    let after = LineSequence::new(after_tokens, &modified);

    let result = line_diff(&before, &after, &deadline);
    let mut hit_timeout = result.hit_timeout;

    let (mut diffs, timed_out) =
        heuristics::optimize_sequence_diffs(&before, &after, result.diffs, &deadline);
    hit_timeout |= timed_out;
    diffs = heuristics::remove_short_matches(diffs);
    diffs = heuristics::remove_very_short_matching_lines_between_diffs(&original, diffs);

    let mut changes = Vec::with_capacity(diffs.len());
    let mut last_before = 0u32;
    let mut last_after = 0u32;
    for diff in &diffs {
        if consider_whitespace {
            refine::scan_for_whitespace_changes(
                &original,
                &modified,
                last_before,
                last_after,
                diff.before.start - last_before,
                options.extend_to_subwords,
                &deadline,
                &mut changes,
                &mut hit_timeout,
            );
        }
        changes.push(line_range_mapping(
            &original,
            &modified,
            diff,
            options.extend_to_subwords,
            &deadline,
            &mut hit_timeout,
        ));
        last_before = diff.before.end;
        last_after = diff.after.end;
    }
    if consider_whitespace {
        refine::scan_for_whitespace_changes(
            &original,
            &modified,
            last_before,
            last_after,
            original.len() as u32 - last_before,
            options.extend_to_subwords,
            &deadline,
            &mut changes,
            &mut hit_timeout,
        );
    }

    LinesDiff { changes, hit_timeout }
}

/// Turns one line-level diff into its output mapping, refining two-sided
/// diffs down to character level. Pure insertions/removals carry no inner
/// changes.
fn line_range_mapping(
    original: &[&str],
    modified: &[&str],
    diff: &SequenceDiff,
    extend_to_subwords: bool,
    deadline: &Deadline,
    hit_timeout: &mut bool,
) -> LineRangeMapping {
    let outer_original = LineRange::new(diff.before.start + 1, diff.before.end + 1);
    let outer_modified = LineRange::new(diff.after.start + 1, diff.after.end + 1);
    let inner_changes = if diff.is_pure_insertion() || diff.is_pure_removal() {
        Vec::new()
    } else {
        let refined = refine::refine_diff(
            original,
            modified,
            diff,
            false,
            extend_to_subwords,
            deadline,
        );
        *hit_timeout |= refined.hit_timeout;
        refined.mappings
    };
    LineRangeMapping {
        original: outer_original,
        modified: outer_modified,
        inner_changes,
    }
}
