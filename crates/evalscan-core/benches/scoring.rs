use criterion::{black_box, criterion_group, criterion_main, Criterion};

use evalscan_core::model::EvaluationRecord;
use evalscan_core::percent::parse_block;
use evalscan_core::score::{compute_category_score, score_record};
use evalscan_core::statistics::compute_aggregate_stats;

fn block_lines(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let a = i % 30;
            let b = 100 - a;
            format!("Statement number {i} about the course. 0% 0% {a}% 0% 0% {b}%")
        })
        .collect()
}

fn bench_category_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("category_score");

    let one = block_lines(1);
    let ten = block_lines(10);
    let hundred = block_lines(100);

    group.bench_function("1_line", |b| {
        b.iter(|| compute_category_score(black_box(&one)))
    });

    group.bench_function("10_lines", |b| {
        b.iter(|| compute_category_score(black_box(&ten)))
    });

    group.bench_function("100_lines", |b| {
        b.iter(|| compute_category_score(black_box(&hundred)))
    });

    group.finish();
}

fn bench_parse_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_block");

    let six = "Presented material in a clear and organized way. 5% 0% 0% 0% 21% 73%";
    let prose = "The lectures were mostly fine although some weeks dragged on.";

    group.bench_function("six_tokens", |b| b.iter(|| parse_block(black_box(six))));
    group.bench_function("prose", |b| b.iter(|| parse_block(black_box(prose))));

    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_stats");

    for size in [10, 100, 1000] {
        let scores: Vec<_> = (0..size)
            .map(|i| {
                let mut r = EvaluationRecord::new(i as u64);
                r.dept = Some("MATH".into());
                r.course_number = Some(format!("{:05}", 10000 + i % 20));
                r.instructors = Some(vec![format!("Instructor {}", i % 7)]);
                r.the_instructor = Some(block_lines(3));
                r.overall = Some(block_lines(2));
                score_record(&r)
            })
            .collect();

        group.bench_function(format!("{size}_evaluations"), |b| {
            b.iter(|| compute_aggregate_stats(black_box(&scores)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_category_score, bench_parse_block, bench_aggregate);
criterion_main!(benches);
