// benches/analysis_benchmark.rs
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use streak_rs::analysis::*;
use streak_rs::*;

fn decay_curve(size: usize) -> (Vec<f64>, Vec<f64>) {
    let x: Vec<f64> = (0..size).map(|i| -5.0 + 10.0 * i as f64 / (size - 1) as f64).collect();
    let y = x
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let wobble = 1e-3 * ((i as f64 * 12.9898).sin() * 43758.5453).fract();
            let signal = if v > -2.0 { (-(v + 2.0)).exp() } else { 0.0 };
            signal + 0.1 + wobble
        })
        .collect();
    (x, y)
}

fn full_size_dataset() -> StreakDataset {
    let layout = U8167Layout::default();
    let time: Vec<f32> = (0..layout.time_resolution).map(|i| i as f32 * 0.01).collect();
    let wavelength: Vec<f32> = (0..layout.wavelength_resolution).map(|i| 400.0 + i as f32).collect();
    let intensity: Vec<u16> = (0..layout.sample_count()).map(|i| (i % 4096) as u16).collect();
    StreakDataset::from_axes(&time, &wavelength, &intensity).unwrap()
}

fn benchmark_codec(c: &mut Criterion) {
    let data = full_size_dataset();
    let bytes = StreakWriter::new().encode(&data).unwrap();

    let mut group = c.benchmark_group("codec");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("encode", |b| b.iter(|| StreakWriter::new().encode(&data).unwrap()));
    group.bench_function("decode", |b| b.iter(|| read_bytes(&bytes).unwrap()));
    group.bench_function("aggregate_along_time", |b| b.iter(|| data.aggregate_along_time(None)));
    group.finish();
}

fn benchmark_spline(c: &mut Criterion) {
    let mut group = c.benchmark_group("smoothing_spline");

    for size in [100, 1000, 10000].iter() {
        let (x, y) = decay_curve(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| SmoothingSpline::fit(&x, &y).unwrap());
        });
    }

    group.finish();
}

fn benchmark_analysis(c: &mut Criterion) {
    let (x, y) = decay_curve(1000);

    c.bench_function("find_scdc", |b| {
        b.iter(|| find_scdc(&x, &y, &ScdcOptions::default()).unwrap())
    });
    c.bench_function("determine_fit_range", |b| {
        b.iter(|| determine_fit_range(&x, &y, &FitRangeOptions::default()).unwrap())
    });
    c.bench_function("curve_fit", |b| {
        let options = FitOptions::new(vec![1.0, 1.0]);
        b.iter(|| curve_fit(|t, p| p[0] * (-(t + 2.0) / p[1]).exp(), &x, &y, &options))
    });
}

criterion_group!(benches, benchmark_codec, benchmark_spline, benchmark_analysis);
criterion_main!(benches);
