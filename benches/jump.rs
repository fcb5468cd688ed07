// Copyright 2020 Developers of the Rand project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use core::time::Duration;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand_core::RngCore;
use rand_streams::{JumpableRng, Mrg32k3a, Mt19937, Streams};

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = draw, jump, init_streams
);
criterion_main!(benches);

pub fn draw(c: &mut Criterion) {
    let mut g = c.benchmark_group("draw");
    g.warm_up_time(Duration::from_millis(500));
    g.measurement_time(Duration::from_millis(1000));

    let mut rng = Mrg32k3a::new(1);
    g.bench_function("mrg32k3a", |b| b.iter(|| black_box(rng.next_u32())));
    let mut rng = Mt19937::new(1);
    g.bench_function("mt19937", |b| b.iter(|| black_box(rng.next_u32())));

    g.finish()
}

pub fn jump(c: &mut Criterion) {
    let mut g = c.benchmark_group("jump");
    g.sample_size(20);

    let mut rng = Mrg32k3a::new(1);
    g.bench_function("mrg32k3a_1e12", |b| {
        b.iter(|| rng.jump(black_box(1_000_000_000_000)).unwrap())
    });
    let mut rng = Mt19937::new(1);
    g.bench_function("mt19937_1e12", |b| {
        b.iter(|| rng.jump(black_box(1_000_000_000_000)).unwrap())
    });
    g.bench_function("mt19937_op_only", |b| {
        b.iter(|| Mt19937::jump_op(black_box(1_000_000_000_000)).unwrap())
    });

    g.finish()
}

pub fn init_streams(c: &mut Criterion) {
    let mut g = c.benchmark_group("init_streams");
    g.sample_size(20);

    g.bench_function("mrg32k3a_16", |b| {
        b.iter(|| Streams::<Mrg32k3a>::new(1, 16, black_box(1 << 40)).unwrap())
    });
    g.bench_function("mt19937_4", |b| {
        b.iter(|| Streams::<Mt19937>::new(1, 4, black_box(1 << 40)).unwrap())
    });

    g.finish()
}
