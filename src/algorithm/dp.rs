//! Dynamic-programming diff with a scoring function.
//!
//! An O(MN) LCS-style alignment over three flat matrices: cumulative score,
//! predecessor direction, and the length of the current diagonal run. Unlike
//! a plain LCS the per-match contribution comes from a caller-provided score,
//! which lets the line-level dispatcher prefer byte-identical line pairs and
//! the character-level dispatcher prefer matches at natural boundaries.

use crate::algorithm::{Deadline, DiffResult, SequenceDiff};
use crate::sequence::Sequence;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    None,
    Left,
    Top,
    Diagonal,
}

/// A flat row-major matrix with a sentinel row and column at index zero.
struct Matrix<T> {
    width: usize,
    data: Vec<T>,
}

impl<T: Copy> Matrix<T> {
    fn new(width: usize, height: usize, fill: T) -> Self {
        Matrix {
            width,
            data: vec![fill; width * height],
        }
    }

    fn get(&self, row: usize, column: usize) -> T {
        self.data[row * self.width + column]
    }

    fn set(&mut self, row: usize, column: usize, value: T) {
        self.data[row * self.width + column] = value;
    }
}

/// Computes the alignment of `before` and `after` and returns its
/// non-matching regions in source order.
///
/// `score` is consulted for equal element pairs only. Ties between a
/// diagonal step and a horizontal/vertical one go to the diagonal, which
/// keeps runs of consecutive matches together; ties between horizontal and
/// vertical go to the top. The deadline is checked once per row; on expiry
/// the filled prefix is backtracked and the unprocessed tail is reported as
/// one coarse diff.
pub(crate) fn diff<S: Sequence>(
    before: &S,
    after: &S,
    deadline: &Deadline,
    score: impl Fn(usize, usize) -> f64,
) -> DiffResult {
    let len1 = before.len();
    let len2 = after.len();
    if len1 == 0 || len2 == 0 {
        return DiffResult::trivial(len1, len2);
    }

    let mut lcs = Matrix::new(len2 + 1, len1 + 1, 0.0f64);
    let mut directions = Matrix::new(len2 + 1, len1 + 1, Direction::None);
    let mut lengths = Matrix::new(len2 + 1, len1 + 1, 0u32);

    let mut filled_rows = len1;
    let mut hit_timeout = false;
    for i in 1..=len1 {
        if deadline.expired() {
            filled_rows = i - 1;
            hit_timeout = true;
            break;
        }
        for j in 1..=len2 {
            let top = lcs.get(i - 1, j);
            let left = lcs.get(i, j - 1);
            // Ties between Top and Left go to Top.
            let (mut best, mut direction) = if left > top {
                (left, Direction::Left)
            } else {
                (top, Direction::Top)
            };
            if before.get_element(i - 1) == after.get_element(j - 1) {
                let mut diagonal = lcs.get(i - 1, j - 1) + score(i - 1, j - 1);
                // An alignment that continues a diagonal run outscores one
                // that breaks it, which keeps runs of equal elements together
                // instead of scattering matches across the sequences.
                if directions.get(i - 1, j - 1) == Direction::Diagonal {
                    diagonal += f64::from(lengths.get(i - 1, j - 1));
                }
                // Ties against Top/Left go to the diagonal.
                if diagonal >= best {
                    best = diagonal;
                    direction = Direction::Diagonal;
                }
            }
            lcs.set(i, j, best);
            directions.set(i, j, direction);
            let run = if direction == Direction::Diagonal {
                lengths.get(i - 1, j - 1) + 1
            } else {
                0
            };
            lengths.set(i, j, run);
        }
    }

    let mut diffs = backtrack(&directions, filled_rows, len2);
    if filled_rows < len1 {
        // The rows that never got filled become one coarse trailing diff.
        let tail = SequenceDiff::new(filled_rows as u32..len1 as u32, len2 as u32..len2 as u32);
        match diffs.last_mut() {
            Some(last) if last.before.end == tail.before.start && last.after.end == tail.after.start => {
                last.before.end = tail.before.end;
            }
            _ => diffs.push(tail),
        }
    }
    DiffResult { diffs, hit_timeout }
}

/// Walks the direction matrix from `(rows, columns)` back to the origin.
/// Contiguous non-diagonal steps form one diff each.
fn backtrack(directions: &Matrix<Direction>, rows: usize, columns: usize) -> Vec<SequenceDiff> {
    let mut result = Vec::new();
    let mut last_aligned = (rows, columns);
    let mut i = rows;
    let mut j = columns;
    while i > 0 && j > 0 {
        match directions.get(i, j) {
            Direction::Diagonal => {
                if (i, j) != last_aligned {
                    result.push(SequenceDiff::new(
                        i as u32..last_aligned.0 as u32,
                        j as u32..last_aligned.1 as u32,
                    ));
                }
                i -= 1;
                j -= 1;
                last_aligned = (i, j);
            }
            Direction::Left => j -= 1,
            // `None` only appears in unfilled cells after a timeout; treat it
            // like Top so the walk always terminates.
            Direction::Top | Direction::None => i -= 1,
        }
    }
    if last_aligned != (0, 0) {
        result.push(SequenceDiff::new(
            0..last_aligned.0 as u32,
            0..last_aligned.1 as u32,
        ));
    }
    result.reverse();
    result
}
