//! Handler chain benchmarks
//!
//! Measures dispatch of a matched request through chains of increasing
//! length, plus the cost of routing misses.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geneva::prelude::*;

fn pass_through(c: &mut Context) {
    c.next();
}

fn app_with_middleware(layers: usize) -> App {
    let mut r = Engine::with_config(ServerConfig::default().log_filter("off"));
    for _ in 0..layers {
        r.use_middleware(pass_through);
    }
    r.get("/users/:id", |c: &mut Context| {
        let id = c.param("id").to_string();
        c.string(StatusCode::OK, id);
    });
    r.build().unwrap()
}

fn request(path: &str) -> http::Request<Bytes> {
    http::Request::builder()
        .uri(path)
        .body(Bytes::new())
        .unwrap()
}

fn bench_chain_length(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_length");

    for layers in [0, 1, 3, 5, 10, 20].iter() {
        let app = app_with_middleware(*layers);
        group.bench_with_input(BenchmarkId::new("middleware", layers), layers, |b, _| {
            b.iter(|| app.dispatch(black_box(request("/users/42"))))
        });
    }

    group.finish();
}

fn bench_context_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("context_store");

    for keys in [1, 8, 32].iter() {
        let r = Engine::with_config(ServerConfig::default().log_filter("off"));
        let n = *keys;
        r.get("/store", move |c: &mut Context| {
            for i in 0..n {
                c.set(i.to_string(), i);
            }
            let found = (0..n)
                .filter(|i| c.get_as::<usize>(&i.to_string()).is_some())
                .count();
            c.status(if found == n {
                StatusCode::OK
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            });
        });
        let app = r.build().unwrap();

        group.bench_with_input(BenchmarkId::new("keys", keys), keys, |b, _| {
            b.iter(|| app.dispatch(black_box(request("/store"))))
        });
    }

    group.finish();
}

fn bench_routing_miss(c: &mut Criterion) {
    let app = app_with_middleware(3);

    c.bench_function("routing_miss/not_found", |b| {
        b.iter(|| app.dispatch(black_box(request("/missing"))))
    });
}

criterion_group!(benches, bench_chain_length, bench_context_store, bench_routing_miss);
criterion_main!(benches);
