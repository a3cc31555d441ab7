//! Path composition benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use geneva::{clean_path, join_paths};

fn bench_join_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("join_paths");

    group.bench_function("root_relative", |b| {
        b.iter(|| join_paths(black_box(""), black_box("/hello/:name")))
    });
    group.bench_function("nested_group", |b| {
        b.iter(|| join_paths(black_box("/api/v1"), black_box("users/:id/")))
    });
    group.bench_function("dot_segments", |b| {
        b.iter(|| join_paths(black_box("/api/v1/"), black_box("../v2/./users")))
    });

    group.finish();
}

fn bench_clean_path(c: &mut Criterion) {
    c.bench_function("clean_path", |b| {
        b.iter(|| clean_path(black_box("/a//b/./c/../d/")))
    });
}

criterion_group!(benches, bench_join_paths, bench_clean_path);
criterion_main!(benches);
