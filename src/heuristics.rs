//! Heuristics that polish raw algorithm output.
//!
//! Both diff algorithms produce minimal alignments, but minimality leaves
//! boundary placement ambiguous: an insertion next to equal elements can
//! slide up or down freely. The passes in this module pick the placement a
//! human would: merge diffs that can be joined by sliding, move the rest to
//! the highest-scoring boundary, and coalesce diffs separated by matches too
//! small to be meaningful. All passes work on [`SequenceDiff`] vectors and
//! apply to lines and characters alike.

use std::ops::Range;

use crate::algorithm::{Deadline, SequenceDiff};
use crate::intern::trim_ws;
use crate::sequence::{CharSequence, Sequence};

/// Sliding further than this is never useful and only costs time.
const MAX_SHIFT: u32 = 100;

/// The shift-and-join pass.
///
/// Joining runs twice on purpose: a join can line diffs up so that another
/// join becomes possible, and re-evaluation after the first pass is what
/// unlocks it. Shifting runs last, on the joined result. The deadline is
/// consulted per diff; on expiry the remaining diffs stay unshifted and the
/// caller learns about it through the returned flag.
pub(crate) fn optimize_sequence_diffs<S: Sequence>(
    before: &S,
    after: &S,
    diffs: Vec<SequenceDiff>,
    deadline: &Deadline,
) -> (Vec<SequenceDiff>, bool) {
    let diffs = join_sequence_diffs_by_shifting(before, after, diffs);
    let diffs = join_sequence_diffs_by_shifting(before, after, diffs);
    shift_sequence_diffs(before, after, diffs, deadline)
}

/// Slides one-sided diffs left and right across equal elements; diffs that
/// meet while sliding merge into one.
fn join_sequence_diffs_by_shifting<S: Sequence>(
    seq1: &S,
    seq2: &S,
    diffs: Vec<SequenceDiff>,
) -> Vec<SequenceDiff> {
    if diffs.is_empty() {
        return diffs;
    }

    // Leftward: pull each one-sided diff toward its predecessor.
    let mut result: Vec<SequenceDiff> = Vec::with_capacity(diffs.len());
    let mut iter = diffs.into_iter();
    result.push(iter.next().expect("checked non-empty"));
    for mut cur in iter {
        let prev = result.last().expect("result starts non-empty");
        if cur.is_pure_insertion() || cur.is_pure_removal() {
            let gap = (cur.before.start - prev.before.end) as usize;
            let mut shift = 1;
            while shift <= gap {
                if !seq1.is_strongly_equal(
                    cur.before.start as usize - shift,
                    cur.before.end as usize - shift,
                ) || !seq2.is_strongly_equal(
                    cur.after.start as usize - shift,
                    cur.after.end as usize - shift,
                ) {
                    break;
                }
                shift += 1;
            }
            shift -= 1;
            if shift == gap {
                let prev = result.last_mut().expect("result starts non-empty");
                prev.before.end = cur.before.end - gap as u32;
                prev.after.end = cur.after.end - gap as u32;
                continue;
            }
            cur = cur.delta(-(shift as i32));
        }
        result.push(cur);
    }

    // Rightward: push each one-sided diff toward its successor.
    let mut joined: Vec<SequenceDiff> = Vec::with_capacity(result.len());
    for i in 0..result.len().saturating_sub(1) {
        let next = result[i + 1].clone();
        let mut cur = result[i].clone();
        if cur.is_pure_insertion() || cur.is_pure_removal() {
            let gap = (next.before.start - cur.before.end) as usize;
            let mut shift = 0;
            while shift < gap {
                if !seq1.is_strongly_equal(
                    cur.before.start as usize + shift,
                    cur.before.end as usize + shift,
                ) || !seq2.is_strongly_equal(
                    cur.after.start as usize + shift,
                    cur.after.end as usize + shift,
                ) {
                    break;
                }
                shift += 1;
            }
            if shift == gap {
                let next = &mut result[i + 1];
                next.before.start = cur.before.start + gap as u32;
                next.after.start = cur.after.start + gap as u32;
                continue;
            }
            if shift > 0 {
                cur = cur.delta(shift as i32);
            }
        }
        joined.push(cur);
    }
    if let Some(last) = result.last() {
        joined.push(last.clone());
    }
    joined
}

/// Moves every remaining one-sided diff to the offset (within the equal runs
/// on either side, capped at [`MAX_SHIFT`]) that maximizes the sum of
/// boundary scores at the resulting endpoints.
fn shift_sequence_diffs<S: Sequence>(
    seq1: &S,
    seq2: &S,
    mut diffs: Vec<SequenceDiff>,
    deadline: &Deadline,
) -> (Vec<SequenceDiff>, bool) {
    let mut hit_timeout = false;
    for i in 0..diffs.len() {
        if deadline.expired() {
            hit_timeout = true;
            break;
        }
        // Leave at least one element untouched next to the neighboring diffs.
        let valid1 = valid_range(&diffs, i, |d| &d.before, seq1.len() as u32);
        let valid2 = valid_range(&diffs, i, |d| &d.after, seq2.len() as u32);
        let diff = diffs[i].clone();
        if diff.is_pure_insertion() {
            diffs[i] = shift_diff_to_better_position(&diff, seq1, seq2, &valid1, &valid2);
        } else if diff.is_pure_removal() {
            diffs[i] = shift_diff_to_better_position(&diff.swapped(), seq2, seq1, &valid2, &valid1)
                .swapped();
        }
    }
    (diffs, hit_timeout)
}

fn valid_range(
    diffs: &[SequenceDiff],
    i: usize,
    side: impl Fn(&SequenceDiff) -> &Range<u32>,
    len: u32,
) -> Range<u32> {
    let start = if i > 0 { side(&diffs[i - 1]).end + 1 } else { 0 };
    let end = if i + 1 < diffs.len() {
        side(&diffs[i + 1]).start.saturating_sub(1)
    } else {
        len
    };
    start..end.max(start)
}

/// `diff` is a pure insertion into `seq2`; its empty range sits in `seq1`.
fn shift_diff_to_better_position<S: Sequence>(
    diff: &SequenceDiff,
    seq1: &S,
    seq2: &S,
    valid1: &Range<u32>,
    valid2: &Range<u32>,
) -> SequenceDiff {
    let mut delta_before = 1u32;
    while diff.before.start >= valid1.start + delta_before
        && diff.after.start >= valid2.start + delta_before
        && seq2.is_strongly_equal(
            (diff.after.start - delta_before) as usize,
            (diff.after.end - delta_before) as usize,
        )
        && delta_before < MAX_SHIFT
    {
        delta_before += 1;
    }
    delta_before -= 1;

    let mut delta_after = 0u32;
    while diff.before.start + delta_after < valid1.end
        && diff.after.end + delta_after < valid2.end
        && seq2.is_strongly_equal(
            (diff.after.start + delta_after) as usize,
            (diff.after.end + delta_after) as usize,
        )
        && delta_after < MAX_SHIFT
    {
        delta_after += 1;
    }

    if delta_before == 0 && delta_after == 0 {
        return diff.clone();
    }

    let mut best_delta = 0i32;
    let mut best_score = i32::MIN;
    for delta in -(delta_before as i32)..=(delta_after as i32) {
        let start2 = (diff.after.start as i32 + delta) as usize;
        let end2 = (diff.after.end as i32 + delta) as usize;
        let offset1 = (diff.before.start as i32 + delta) as usize;
        let score =
            seq1.boundary_score(offset1) + seq2.boundary_score(start2) + seq2.boundary_score(end2);
        if score > best_score {
            best_score = score;
            best_delta = delta;
        }
    }
    diff.delta(best_delta)
}

/// Merges adjacent diffs whose equal gap is at most two elements on both
/// sides.
pub(crate) fn remove_short_matches(diffs: Vec<SequenceDiff>) -> Vec<SequenceDiff> {
    let mut result: Vec<SequenceDiff> = Vec::with_capacity(diffs.len());
    for diff in diffs {
        match result.last_mut() {
            Some(last)
                if diff.before.start - last.before.end <= 2
                    && diff.after.start - last.after.end <= 2 =>
            {
                *last = last.join(&diff);
            }
            _ => result.push(diff),
        }
    }
    result
}

/// Merges line diffs separated by a trivial equal region: at most three
/// lines on both sides whose trimmed contents add up to at most four code
/// points, next to at least one diff spanning more than five lines. Repeats
/// until stable since every merge can enable the next one.
pub(crate) fn remove_very_short_matching_lines_between_diffs(
    original: &[&str],
    mut diffs: Vec<SequenceDiff>,
) -> Vec<SequenceDiff> {
    for _ in 0..10 {
        if diffs.len() < 2 {
            break;
        }
        let mut merged_any = false;
        let mut result: Vec<SequenceDiff> = Vec::with_capacity(diffs.len());
        for diff in diffs {
            let merge = result.last().map_or(false, |last| {
                let gap_before = diff.before.start - last.before.end;
                let gap_after = diff.after.start - last.after.end;
                let trivial_gap = gap_before <= 3 && gap_after <= 3 && {
                    let gap_text: usize = original
                        [last.before.end as usize..diff.before.start as usize]
                        .iter()
                        .map(|line| trim_ws(line).chars().count())
                        .sum();
                    gap_text <= 4
                };
                let long_neighbor = last.before.len() + last.after.len() > 5
                    || diff.before.len() + diff.after.len() > 5;
                trivial_gap && long_neighbor
            });
            if merge {
                let last = result.last_mut().expect("merge implies a previous diff");
                *last = last.join(&diff);
                merged_any = true;
            } else {
                result.push(diff);
            }
        }
        diffs = result;
        if !merged_any {
            break;
        }
    }
    diffs
}

/// Merges character diffs separated by an insignificant match: at most three
/// non-whitespace code points between them, next to at least one diff
/// spanning more than five elements. Whitespace-only gaps qualify regardless
/// of their width.
pub(crate) fn remove_very_short_matching_text_between_long_diffs(
    seq1: &CharSequence,
    mut diffs: Vec<SequenceDiff>,
) -> Vec<SequenceDiff> {
    for _ in 0..10 {
        if diffs.len() < 2 {
            break;
        }
        let mut merged_any = false;
        let mut result: Vec<SequenceDiff> = Vec::with_capacity(diffs.len());
        for diff in diffs {
            let merge = result.last().map_or(false, |last| {
                let gap = last.before.end..diff.before.start;
                let non_ws = gap.filter(|&i| !seq1.is_whitespace(i as usize)).count();
                let long_neighbor = last.before.len() + last.after.len() > 5
                    || diff.before.len() + diff.after.len() > 5;
                non_ws <= 3 && long_neighbor
            });
            if merge {
                let last = result.last_mut().expect("merge implies a previous diff");
                *last = last.join(&diff);
                merged_any = true;
            } else {
                result.push(diff);
            }
        }
        diffs = result;
        if !merged_any {
            break;
        }
    }
    diffs
}

/// Extends character diffs to whole words where that makes the diff clearer.
///
/// A diff boundary that cuts a word in two is widened to the full word on
/// both sides, but only when the characters the widening would swallow are
/// mostly changed already: if at least two thirds of the widened span is
/// equal text, the small change stays small (renaming one hump of an
/// identifier reads better than flagging the whole identifier).
///
/// Equal regions are consumed from a queue while widening: a word span that
/// swallows an entire equal region continues into the next diff, and the
/// consumed region must not be re-extended through by later diffs.
pub(crate) fn extend_diffs_to_whole_words(
    seq1: &CharSequence,
    seq2: &CharSequence,
    diffs: Vec<SequenceDiff>,
    subwords: bool,
) -> Vec<SequenceDiff> {
    if diffs.is_empty() {
        return diffs;
    }
    let find = |seq: &CharSequence, offset: u32| {
        if subwords {
            seq.find_subword_containing(offset)
        } else {
            seq.find_word_containing(offset)
        }
    };

    let equal_regions = SequenceDiff::invert(&diffs, seq1.len() as u32, seq2.len() as u32);
    let mut consumed = vec![false; equal_regions.len()];
    let mut additional: Vec<SequenceDiff> = Vec::new();
    let mut last_point = (0u32, 0u32);

    let scan_word = |pair: (u32, u32),
                         region_idx: usize,
                         consumed: &mut Vec<bool>,
                         additional: &mut Vec<SequenceDiff>,
                         last_point: &mut (u32, u32)| {
        if pair.0 < last_point.0 || pair.1 < last_point.1 {
            return;
        }
        let (Some(word1), Some(word2)) = (find(seq1, pair.0), find(seq2, pair.1)) else {
            return;
        };
        let mut word = SequenceDiff::new(word1, word2);
        let equal_part = word.intersect(&equal_regions[region_idx]);
        let mut equal1 = equal_part.before.len();
        let mut equal2 = equal_part.after.len();

        for idx in region_idx + 1..equal_regions.len() {
            if consumed[idx] {
                continue;
            }
            let next = &equal_regions[idx];
            let intersects = ranges_intersect(&next.before, &word.before)
                || ranges_intersect(&next.after, &word.after);
            if !intersects {
                break;
            }
            let (Some(v1), Some(v2)) = (find(seq1, next.before.start), find(seq2, next.after.start))
            else {
                break;
            };
            let v = SequenceDiff::new(v1, v2);
            let part = v.intersect(next);
            equal1 += part.before.len();
            equal2 += part.after.len();
            word = word.join(&v);
            if word.before.end >= next.before.end {
                consumed[idx] = true;
            } else {
                break;
            }
        }

        if 3 * (equal1 + equal2) < 2 * (word.before.len() + word.after.len()) {
            additional.push(word.clone());
        }
        *last_point = word.ends();
    };

    for (i, diff) in diffs.iter().enumerate() {
        scan_word(diff.starts(), i, &mut consumed, &mut additional, &mut last_point);
        scan_word(diff.ends(), i + 1, &mut consumed, &mut additional, &mut last_point);
    }

    merge_sequence_diffs(diffs, additional)
}

fn ranges_intersect(a: &Range<u32>, b: &Range<u32>) -> bool {
    a.start < b.end && b.start < a.end
}

/// Merges two sorted diff vectors, joining entries that overlap or touch.
fn merge_sequence_diffs(
    first: Vec<SequenceDiff>,
    second: Vec<SequenceDiff>,
) -> Vec<SequenceDiff> {
    let mut result: Vec<SequenceDiff> = Vec::with_capacity(first.len() + second.len());
    let mut first = first.into_iter().peekable();
    let mut second = second.into_iter().peekable();
    loop {
        let next = match (first.peek(), second.peek()) {
            (Some(a), Some(b)) => {
                if a.before.start < b.before.start {
                    first.next()
                } else {
                    second.next()
                }
            }
            (Some(_), None) => first.next(),
            (None, Some(_)) => second.next(),
            (None, None) => break,
        }
        .expect("peeked entry exists");
        match result.last_mut() {
            Some(last) if last.before.end >= next.before.start || last.after.end >= next.after.start => {
                *last = last.join(&next);
            }
            _ => result.push(next),
        }
    }
    result
}
