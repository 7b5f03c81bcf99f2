//! Character-level refinement of line diffs and the whitespace rescan.
//!
//! Each two-sided line diff is re-diffed on character sequences built over
//! its line span, runs through the same shift/join heuristics with
//! character boundary scores, gets extended to word (and optionally subword)
//! boundaries, loses insignificant gaps, and is finally translated back into
//! exact buffer positions.

use crate::algorithm::{char_diff, Deadline, SequenceDiff};
use crate::heuristics;
use crate::sequence::CharSequence;
use crate::{LineRange, LineRangeMapping, Position, RangeMapping, TextRange};

/// Inner changes of one refined line diff.
pub(crate) struct RefineResult {
    pub mappings: Vec<RangeMapping>,
    pub hit_timeout: bool,
}

/// Refines one line-level diff down to character-level range mappings.
///
/// With `consider_whitespace` unset the character sequences are built over
/// trimmed line slices, so indentation changes never show up here (the
/// whitespace rescan owns those); the trim is re-added during translation.
pub(crate) fn refine_diff(
    original: &[&str],
    modified: &[&str],
    diff: &SequenceDiff,
    consider_whitespace: bool,
    extend_to_subwords: bool,
    deadline: &Deadline,
) -> RefineResult {
    let range1 = char_range_of_line_diff(original, &diff.before);
    let range2 = char_range_of_line_diff(modified, &diff.after);
    let seq1 = CharSequence::new(original, &range1, consider_whitespace);
    let seq2 = CharSequence::new(modified, &range2, consider_whitespace);

    let result = char_diff(&seq1, &seq2, deadline);
    let mut hit_timeout = result.hit_timeout;

    let (mut diffs, timed_out) =
        heuristics::optimize_sequence_diffs(&seq1, &seq2, result.diffs, deadline);
    hit_timeout |= timed_out;
    diffs = heuristics::extend_diffs_to_whole_words(&seq1, &seq2, diffs, false);
    if extend_to_subwords {
        diffs = heuristics::extend_diffs_to_whole_words(&seq1, &seq2, diffs, true);
    }
    diffs = heuristics::remove_short_matches(diffs);
    diffs = heuristics::remove_very_short_matching_text_between_long_diffs(&seq1, diffs);

    let mappings = diffs
        .iter()
        .map(|d| RangeMapping {
            original: seq1.translate_range(&d.before),
            modified: seq2.translate_range(&d.after),
        })
        .collect();
    RefineResult {
        mappings,
        hit_timeout,
    }
}

/// The text span a line diff refines over.
///
/// The diff's `[start, end)` line indices map to column-1 positions first.
/// A start at a line start is then extended to the end of the previous line
/// (when one exists) so the preceding line break participates in the
/// character diff, and an end at a line start is pulled back the same way.
/// This mirrors the range normalization of the reference engine and keeps
/// the column arithmetic below consistent.
fn char_range_of_line_diff(lines: &[&str], line_range: &std::ops::Range<u32>) -> TextRange {
    let mut start = Position::new(line_range.start + 1, 1);
    let mut end = Position::new(line_range.end + 1, 1);
    if start.line > 1 {
        start = end_of_line(lines, start.line - 1);
    }
    if end.line > 1 {
        end = end_of_line(lines, end.line - 1);
    }
    TextRange::new(start, end)
}

fn end_of_line(lines: &[&str], line: u32) -> Position {
    Position::new(line, lines[line as usize - 1].chars().count() as u32 + 1)
}

/// Scans `count` aligned equal lines starting at `(start_original,
/// start_modified)` for pairs that differ only in whitespace, and appends a
/// dedicated mapping (with the whitespace delta as inner change) for each.
///
/// Lines in equal regions match once trimmed, so any raw difference here is
/// by definition whitespace-only; the inner changes come from a character
/// refinement with whitespace considered.
#[allow(clippy::too_many_arguments)]
pub(crate) fn scan_for_whitespace_changes(
    original: &[&str],
    modified: &[&str],
    start_original: u32,
    start_modified: u32,
    count: u32,
    extend_to_subwords: bool,
    deadline: &Deadline,
    changes: &mut Vec<LineRangeMapping>,
    hit_timeout: &mut bool,
) {
    for i in 0..count {
        let line_original = start_original + i;
        let line_modified = start_modified + i;
        if original[line_original as usize] == modified[line_modified as usize] {
            continue;
        }
        let diff = SequenceDiff::new(
            line_original..line_original + 1,
            line_modified..line_modified + 1,
        );
        let refined = refine_diff(
            original,
            modified,
            &diff,
            true,
            extend_to_subwords,
            deadline,
        );
        *hit_timeout |= refined.hit_timeout;
        changes.push(LineRangeMapping {
            original: LineRange::new(line_original + 1, line_original + 2),
            modified: LineRange::new(line_modified + 1, line_modified + 2),
            inner_changes: refined.mappings,
        });
    }
}
