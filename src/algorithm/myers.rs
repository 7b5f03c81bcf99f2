//! Forward Myers diff.
//!
//! The classical O((N+M)D) furthest-reaching forward search from "An O(ND)
//! Difference Algorithm and Its Variations". The V array lives in one flat
//! allocation indexed by diagonal with a fixed offset. Snake paths are
//! recorded in an arena of nodes linked by integer handles, so reconstruction
//! needs no pointer graph and the whole search frees in one deallocation.

use crate::algorithm::{Deadline, DiffResult, SequenceDiff};
use crate::sequence::Sequence;

const NO_NODE: u32 = u32::MAX;

/// One snake: `len` equal elements starting at `(x, y)`, preceded by the
/// node `prev` points at.
struct SnakeNode {
    prev: u32,
    x: u32,
    y: u32,
    len: u32,
}

/// Computes the alignment of `before` and `after` and returns its
/// non-matching regions in source order.
///
/// The deadline is checked once per edit-distance step `d`. On expiry the
/// uncovered remainder is reported as a single coarse diff spanning both
/// sequences, which later (cheap) stages can still polish.
pub(crate) fn diff<S: Sequence>(before: &S, after: &S, deadline: &Deadline) -> DiffResult {
    let len1 = before.len();
    let len2 = after.len();
    if len1 == 0 || len2 == 0 {
        return DiffResult::trivial(len1, len2);
    }

    // Diagonal k ranges over [-len2, len1]; index with a fixed offset.
    let offset = len2 as isize + 1;
    let mut v = vec![0i32; len1 + len2 + 3];
    let mut path_by_diagonal = vec![NO_NODE; len1 + len2 + 3];
    let mut arena: Vec<SnakeNode> = Vec::new();

    let snake_len = |x: usize, y: usize| before.equal_run(after, x, y, usize::MAX);

    let start_run = snake_len(0, 0);
    v[offset as usize] = start_run as i32;
    if start_run > 0 {
        arena.push(SnakeNode {
            prev: NO_NODE,
            x: 0,
            y: 0,
            len: start_run as u32,
        });
        path_by_diagonal[offset as usize] = 0;
    }
    if start_run == len1 && start_run == len2 {
        return DiffResult::default();
    }

    let mut final_diagonal = 0isize;
    let mut d = 0usize;
    'search: loop {
        d += 1;
        if deadline.expired() {
            return DiffResult {
                diffs: vec![SequenceDiff::new(0..len1 as u32, 0..len2 as u32)],
                hit_timeout: true,
            };
        }
        let lower = -(d.min(len2 + d % 2) as isize);
        let upper = d.min(len1 + d % 2) as isize;
        let mut k = lower;
        while k <= upper {
            let idx = (k + offset) as usize;
            // The furthest x reachable by stepping down from diagonal k+1 or
            // right from diagonal k-1.
            let x_down = if k == upper { -1 } else { v[idx + 1] };
            let x_right = if k == lower { -1 } else { v[idx - 1] + 1 };
            let x = x_down.max(x_right).min(len1 as i32);
            let y = x as isize - k;
            if x < 0 || y < 0 || x as usize > len1 || y as usize > len2 {
                k += 2;
                continue;
            }
            let run = snake_len(x as usize, y as usize);
            let new_x = x + run as i32;
            v[idx] = new_x;
            let prev = if x == x_down {
                path_by_diagonal[idx + 1]
            } else {
                path_by_diagonal[idx - 1]
            };
            path_by_diagonal[idx] = if run > 0 {
                arena.push(SnakeNode {
                    prev,
                    x: x as u32,
                    y: y as u32,
                    len: run as u32,
                });
                (arena.len() - 1) as u32
            } else {
                prev
            };
            if new_x as usize == len1 && (new_x as isize - k) as usize == len2 {
                final_diagonal = k;
                break 'search;
            }
            k += 2;
        }
    }

    let mut diffs = Vec::new();
    let mut node = path_by_diagonal[(final_diagonal + offset) as usize];
    let mut last_aligned = (len1 as u32, len2 as u32);
    loop {
        let snake_end = if node == NO_NODE {
            (0, 0)
        } else {
            let snake = &arena[node as usize];
            (snake.x + snake.len, snake.y + snake.len)
        };
        if snake_end != last_aligned {
            diffs.push(SequenceDiff::new(
                snake_end.0..last_aligned.0,
                snake_end.1..last_aligned.1,
            ));
        }
        if node == NO_NODE {
            break;
        }
        let snake = &arena[node as usize];
        last_aligned = (snake.x, snake.y);
        node = snake.prev;
    }
    diffs.reverse();
    DiffResult {
        diffs,
        hit_timeout: false,
    }
}
