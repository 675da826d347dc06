use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use quill::{
    ReferenceText,
    cursor::CursorMapper,
    reconcile::Reconciliation,
    scoring::{Accuracy, Cpm},
};

/// Build a snippet of `lines` indented lines
fn make_snippet(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("{}let value_{i} = compute({i});", "    ".repeat(i % 3)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn benchmark_full_recompute(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_recompute");

    // Snippets range from a short function to a long file
    let line_counts = vec![10, 100, 1000];

    for lines in line_counts {
        let snippet = make_snippet(lines);
        let reference = ReferenceText::new(&snippet).unwrap();

        // Half the text typed, with an error every 10 characters
        let input: Vec<char> = snippet
            .chars()
            .take(snippet.len() / 2)
            .enumerate()
            .map(|(i, c)| if i % 10 == 0 { '#' } else { c })
            .collect();

        group.bench_with_input(
            BenchmarkId::new("compute", format!("{lines}lines")),
            &(reference, input),
            |b, (reference, input)| {
                b.iter(|| Reconciliation::compute(black_box(input), black_box(reference)))
            },
        );
    }

    group.finish();
}

fn benchmark_cursor_mapping(c: &mut Criterion) {
    let mut group = c.benchmark_group("cursor_mapping");

    for lines in [10, 100, 1000] {
        let reference = ReferenceText::new(&make_snippet(lines)).unwrap();
        let offsets: Vec<usize> = (0..=reference.flat_len()).step_by(7).collect();

        group.bench_with_input(
            BenchmarkId::new("line_index_for", format!("{lines}lines")),
            &(reference, offsets),
            |b, (reference, offsets)| {
                let mapper = CursorMapper::new(reference);
                b.iter(|| {
                    for offset in offsets {
                        black_box(mapper.line_index_for(black_box(*offset)));
                        black_box(mapper.is_at_line_end(black_box(*offset)));
                    }
                })
            },
        );
    }

    group.finish();
}

fn benchmark_metric_formulas(c: &mut Criterion) {
    let mut group = c.benchmark_group("metric_formulas");

    let test_cases = vec![
        (100, 90, 30), // Half a minute
        (300, 280, 60), // A full run
        (5000, 4000, 600), // A long custom budget
    ];

    for (typed, correct, elapsed) in test_cases {
        group.bench_with_input(
            BenchmarkId::new("cpm_and_accuracy", format!("{typed}chars_{elapsed}s")),
            &(typed, correct, elapsed),
            |b, &(typed, correct, elapsed)| {
                b.iter(|| {
                    (
                        Cpm::calculate(black_box(typed), black_box(elapsed)),
                        Accuracy::calculate(black_box(correct), black_box(typed)),
                    )
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_full_recompute,
    benchmark_cursor_mapping,
    benchmark_metric_formulas
);
criterion_main!(benches);
