use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use kamili_diff::{compute_diff, DiffOptions};

/// Editor-shaped synthetic buffers: indented blocks with braces and the
/// occasional blank line.
fn synthetic_buffer(lines: usize, seed: usize) -> Vec<String> {
    (0..lines)
        .map(|i| match (i + seed) % 7 {
            0 => "fn handler() {".to_string(),
            1 => format!("    let value_{i} = compute({i});"),
            2 => format!("    if value_{i} > {seed} {{"),
            3 => format!("        emit(value_{i});"),
            4 => "    }".to_string(),
            5 => "}".to_string(),
            _ => String::new(),
        })
        .collect()
}

fn bench_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("lines_diff");
    for &size in &[200usize, 1_000, 10_000] {
        let original = synthetic_buffer(size, 0);

        // Identical buffers: the fast path.
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("identical", size), &size, |b, _| {
            b.iter(|| {
                black_box(compute_diff(
                    black_box(&original),
                    black_box(&original),
                    &DiffOptions::default(),
                ))
            })
        });

        // One changed character in the middle; exercises the DP path below
        // the dispatch threshold and the Myers path above it.
        let mut modified = original.clone();
        let mid = size / 2;
        modified[mid] = format!("{}!", modified[mid]);
        group.bench_with_input(BenchmarkId::new("single_edit", size), &size, |b, _| {
            b.iter(|| {
                black_box(compute_diff(
                    black_box(&original),
                    black_box(&modified),
                    &DiffOptions::default(),
                ))
            })
        });

        // Indentation churn on every third line; exercises the whitespace
        // rescan and character refinement.
        let reindented: Vec<String> = original
            .iter()
            .enumerate()
            .map(|(i, line)| {
                if i % 3 == 0 && !line.is_empty() {
                    format!("  {line}")
                } else {
                    line.clone()
                }
            })
            .collect();
        group.bench_with_input(BenchmarkId::new("reindent", size), &size, |b, _| {
            b.iter(|| {
                black_box(compute_diff(
                    black_box(&original),
                    black_box(&reindented),
                    &DiffOptions::default(),
                ))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_lines);
criterion_main!(benches);
