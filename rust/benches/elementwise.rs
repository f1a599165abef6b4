use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};


pub fn add_benchmark(c: &mut Criterion) {
    let dimensions = native::dimensions();
    let inputs: (Vec<f32>, Vec<f32>) = (
        native::generate_random_vector(dimensions),
        native::generate_random_vector(dimensions),
    );
    let pool = simdmath::PoolConfig::default().try_spawn().unwrap();
    let mut output = vec![0.0_f32; dimensions];

    let mut group = c.benchmark_group("SIMD Add");

    for i in 0..=5 {
        group.bench_with_input(BenchmarkId::new("SimdMath", i), &i, |b, _| {
            b.iter(|| simdmath::add_into(&inputs.0, &inputs.1, &mut output))
        });
        group.bench_with_input(BenchmarkId::new("SimdMath Parallel", i), &i, |b, _| {
            b.iter(|| simdmath::add_par_into(&inputs.0, &inputs.1, &mut output, &pool))
        });
        group.bench_with_input(BenchmarkId::new("Rust Native", i), &i, |b, _| {
            b.iter(|| native::add_cpu(&inputs.0, &inputs.1))
        });
    }
}

pub fn multiply_benchmark(c: &mut Criterion) {
    let dimensions = native::dimensions();
    let inputs: (Vec<f32>, Vec<f32>) = (
        native::generate_random_vector(dimensions),
        native::generate_random_vector(dimensions),
    );

    let mut group = c.benchmark_group("SIMD Multiply");

    for i in 0..=5 {
        group.bench_with_input(BenchmarkId::new("SimdMath", i), &i, |b, _| {
            b.iter(|| simdmath::multiply(&inputs.0, &inputs.1))
        });
        group.bench_with_input(BenchmarkId::new("Rust Native", i), &i, |b, _| {
            b.iter(|| native::multiply_cpu(&inputs.0, &inputs.1))
        });
    }
}

criterion_group!(benches, add_benchmark, multiply_benchmark);
criterion_main!(benches);
