use std::fmt::Write as _;

use expect_test::{expect, Expect};

use crate::{compute_diff, DiffOptions, LineRange, LinesDiff, Position, TextRange};

fn render(diff: &LinesDiff) -> String {
    let mut out = String::new();
    for change in &diff.changes {
        writeln!(out, "{change}").unwrap();
        for inner in &change.inner_changes {
            writeln!(out, "  {inner}").unwrap();
        }
    }
    if diff.hit_timeout {
        writeln!(out, "hit timeout").unwrap();
    }
    out
}

fn check(original: &[&str], modified: &[&str], expected: Expect) {
    let diff = compute_diff(original, modified, &DiffOptions::default());
    check_invariants(original, modified, &diff);
    expected.assert_eq(&render(&diff));
}

/// The structural guarantees every output upholds: mappings sorted and
/// non-overlapping on both sides, equal gaps aligned, inner changes inside
/// the extended line span of their mapping.
fn check_invariants(original: &[&str], modified: &[&str], diff: &LinesDiff) {
    let mut last = (1u32, 1u32);
    for change in &diff.changes {
        assert!(change.original.start >= last.0, "overlap on original side");
        assert!(change.modified.start >= last.1, "overlap on modified side");
        assert_eq!(
            change.original.start - last.0,
            change.modified.start - last.1,
            "equal gap not aligned"
        );
        assert!(change.original.end >= change.original.start);
        assert!(change.modified.end >= change.modified.start);
        assert!(
            !(change.original.is_empty() && change.modified.is_empty()),
            "empty mapping"
        );
        for inner in &change.inner_changes {
            assert!(inner.original.start <= inner.original.end);
            assert!(inner.modified.start <= inner.modified.end);
            let lower = change.original.start.saturating_sub(1).max(1);
            assert!(inner.original.start.line >= lower);
            assert!(inner.original.end.line <= change.original.end);
            let lower = change.modified.start.saturating_sub(1).max(1);
            assert!(inner.modified.start.line >= lower);
            assert!(inner.modified.end.line <= change.modified.end);
            assert!(inner.original.start.column >= 1 && inner.modified.start.column >= 1);
        }
        last = (change.original.end, change.modified.end);
    }
    assert!(last.0 <= original.len() as u32 + 1);
    assert!(last.1 <= modified.len() as u32 + 1);
    assert_eq!(
        original.len() as u32 + 1 - last.0,
        modified.len() as u32 + 1 - last.1,
        "trailing equal region not aligned"
    );
}

#[test]
fn range_join_and_contains() {
    let a = LineRange::new(2, 4);
    let b = LineRange::new(3, 6);
    assert_eq!(a.join(&b), LineRange::new(2, 6));
    assert!(a.contains(2) && a.contains(3));
    assert!(!a.contains(1) && !a.contains(4));

    let r1 = TextRange::new(Position::new(1, 2), Position::new(1, 5));
    let r2 = TextRange::new(Position::new(1, 4), Position::new(2, 1));
    assert_eq!(
        r1.join(&r2),
        TextRange::new(Position::new(1, 2), Position::new(2, 1))
    );
    assert!(r1.contains(Position::new(1, 2)));
    assert!(r1.contains(Position::new(1, 4)));
    assert!(!r1.contains(Position::new(1, 5)));
}

#[test]
fn identical_buffers() {
    let lines = ["a", "b", "c"];
    let diff = compute_diff(&lines, &lines, &DiffOptions::default());
    assert!(diff.changes.is_empty());
    assert!(!diff.hit_timeout);
}

#[test]
fn single_character_replacement() {
    check(
        &["hello"],
        &["hallo"],
        expect![[r#"
            [1,2) -> [1,2)
              (1,2)-(1,3) -> (1,2)-(1,3)
        "#]],
    );
}

#[test]
fn line_removal_has_no_inner_changes() {
    check(
        &["line1", "line2", "line3"],
        &["line1", "line3"],
        expect![[r#"
            [2,3) -> [2,2)
        "#]],
    );
}

#[test]
fn line_insertion_has_no_inner_changes() {
    check(
        &["line1", "line3"],
        &["line1", "line2", "line3"],
        expect![[r#"
            [2,2) -> [2,3)
        "#]],
    );
}

#[test]
fn word_rename_stays_on_the_changed_hump() {
    check(
        &["class MyOldClassName { }"],
        &["class MyNewClassName { }"],
        expect![[r#"
            [1,2) -> [1,2)
              (1,9)-(1,12) -> (1,9)-(1,12)
        "#]],
    );
}

#[test]
fn indentation_change_is_localized() {
    check(
        &["    code"],
        &["        code"],
        expect![[r#"
            [1,2) -> [1,2)
              (1,1)-(1,1) -> (1,1)-(1,5)
        "#]],
    );
}

#[test]
fn indentation_change_between_equal_lines() {
    check(
        &["a", "  b", "c"],
        &["a", "    b", "c"],
        expect![[r#"
            [2,3) -> [2,3)
              (2,1)-(2,1) -> (2,1)-(2,3)
        "#]],
    );
}

#[test]
fn ignore_trim_whitespace_hides_indentation_changes() {
    let diff = compute_diff(
        &["    code"],
        &["        code"],
        &DiffOptions {
            ignore_trim_whitespace: true,
            ..DiffOptions::default()
        },
    );
    assert!(diff.changes.is_empty());
    assert!(!diff.hit_timeout);
}

#[test]
fn boundary_prefers_the_braces() {
    check(
        &["{", "  x", "}"],
        &["{", "  y", "}"],
        expect![[r#"
            [2,3) -> [2,3)
              (2,3)-(2,4) -> (2,3)-(2,4)
        "#]],
    );
}

#[test]
fn pure_insertion_into_empty_buffer() {
    let empty: [&str; 0] = [];
    check(
        &empty,
        &["x", "y"],
        expect![[r#"
            [1,1) -> [1,3)
        "#]],
    );
}

#[test]
fn pure_removal_into_empty_buffer() {
    let empty: [&str; 0] = [];
    check(
        &["x", "y"],
        &empty,
        expect![[r#"
            [1,3) -> [1,1)
        "#]],
    );
}

#[test]
fn subword_extension_is_opt_in() {
    check(
        &["fooBar"],
        &["fooByz"],
        expect![[r#"
            [1,2) -> [1,2)
              (1,5)-(1,7) -> (1,5)-(1,7)
        "#]],
    );
    let diff = compute_diff(
        &["fooBar"],
        &["fooByz"],
        &DiffOptions {
            extend_to_subwords: true,
            ..DiffOptions::default()
        },
    );
    assert_eq!(
        render(&diff),
        "[1,2) -> [1,2)\n  (1,4)-(1,7) -> (1,4)-(1,7)\n"
    );
}

#[test]
fn insertion_pairs_the_byte_identical_line() {
    // The middle line exists twice once trimmed; the scoring pairs the raw
    // identical `  a` lines, so the new `    a` is the inserted one.
    check(
        &["if {", "  a", "}"],
        &["if {", "    a", "  a", "}"],
        expect![[r#"
            [2,2) -> [2,3)
        "#]],
    );
}

#[test]
fn refinement_translates_through_differing_trims() {
    // Two renamed occurrences in one hunk; the second line is also
    // re-indented, so the same trimmed offset maps to different columns on
    // the two sides.
    check(
        &["fn main() {", "    let x = 1;", "    print(x);", "}"],
        &["fn main() {", "    let y = 1;", "        print(y);", "}"],
        expect![[r#"
            [2,4) -> [2,4)
              (2,9)-(2,10) -> (2,9)-(2,10)
              (3,11)-(3,12) -> (3,15)-(3,16)
        "#]],
    );
}

#[test]
fn large_input_takes_the_myers_path() {
    let original: Vec<String> = (1..=3000).map(|i| format!("line{i}")).collect();
    let mut modified = original.clone();
    modified[1499] = "line1500!".to_string();
    let diff = compute_diff(&original, &modified, &DiffOptions::default());
    assert!(!diff.hit_timeout);
    assert_eq!(diff.changes.len(), 1);
    let change = &diff.changes[0];
    assert_eq!((change.original.start, change.original.end), (1500, 1501));
    assert_eq!((change.modified.start, change.modified.end), (1500, 1501));
    assert_eq!(change.inner_changes.len(), 1);
}

#[test]
fn crlf_only_difference_is_detected() {
    // `\r` is not stripped by trimming, so a terminator change is a real
    // change at line level.
    let diff = compute_diff(&["a\r", "b"], &["a", "b"], &DiffOptions::default());
    assert_eq!(diff.changes.len(), 1);
    assert_eq!(diff.changes[0].original, LineRange::new(1, 2));
}

#[test]
fn multiple_disjoint_changes_stay_disjoint() {
    let original = ["fn a() {", "    one();", "}", "", "fn b() {", "    two();", "}"];
    let modified = ["fn a() {", "    uno();", "}", "", "fn b() {", "    dos();", "}"];
    let diff = compute_diff(&original, &modified, &DiffOptions::default());
    check_invariants(&original, &modified, &diff);
    assert_eq!(diff.changes.len(), 2);
    assert_eq!(diff.changes[0].original, LineRange::new(2, 3));
    assert_eq!(diff.changes[1].original, LineRange::new(6, 7));
}

#[test]
fn deterministic_across_runs() {
    let original = ["foo", "  bar", "baz", "quux"];
    let modified = ["foo", "    bar", "qux", "quux"];
    let first = compute_diff(&original, &modified, &DiffOptions::default());
    let second = compute_diff(&original, &modified, &DiffOptions::default());
    assert_eq!(first, second);
}

#[test]
fn timeout_degrades_to_a_coarse_diff() {
    // Two disjoint buffers large enough that the Myers search cannot finish
    // within a millisecond; every stage must still produce valid output.
    let original: Vec<String> = (0..20_000).map(|i| format!("old{i}")).collect();
    let modified: Vec<String> = (0..20_000).map(|i| format!("new{i}")).collect();
    let diff = compute_diff(
        &original,
        &modified,
        &DiffOptions {
            max_computation_time_ms: 1,
            ..DiffOptions::default()
        },
    );
    assert!(diff.hit_timeout);
    assert!(!diff.changes.is_empty());
    let original: Vec<&str> = original.iter().map(String::as_str).collect();
    let modified: Vec<&str> = modified.iter().map(String::as_str).collect();
    check_invariants(&original, &modified, &diff);
}

#[test]
fn invariants_hold_across_assorted_inputs() {
    let cases: &[(&[&str], &[&str])] = &[
        (&["a"], &[""]),
        (&[""], &["a"]),
        (&["a", "b"], &["b", "a"]),
        (&["x", "", "y"], &["x", "y"]),
        (
            &["if x {", "    foo()", "}"],
            &["if x {", "    foo()", "    bar()", "}"],
        ),
        (&["aaa bbb ccc"], &["aaa xxx ccc"]),
        (
            &["one", "two", "three", "four"],
            &["four", "three", "two", "one"],
        ),
    ];
    for (original, modified) in cases {
        let diff = compute_diff(original, modified, &DiffOptions::default());
        assert!(!diff.hit_timeout);
        check_invariants(original, modified, &diff);
    }
}
