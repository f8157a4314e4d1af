use criterion::{black_box, criterion_group, criterion_main, Criterion};

use stackc::compile_str;

fn criterion_benchmark(c: &mut Criterion) {
    let source = include_str!("../programs/counter.stk");

    c.bench_function("compile counter", |b| {
        b.iter(|| black_box(compile_str(black_box(source))))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
