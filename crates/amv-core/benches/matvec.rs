use amv_core::{init, BlockedReduction, Dispatcher, KernelConfig, Strategy};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tracing_subscriber::EnvFilter;

const SIZES: [usize; 10] = [1, 10, 20, 50, 100, 200, 500, 1000, 1200, 1500];

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

fn bench_adaptive(c: &mut Criterion) {
    init_logging();
    let dispatcher = Dispatcher::with_defaults();
    let mut group = c.benchmark_group("adaptive");
    for &n in &SIZES {
        let (a, x) = init::deterministic(n).unwrap();
        let mut y = vec![0; n];
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &_n| {
            b.iter(|| dispatcher.multiply(&a, &x, &mut y).unwrap());
        });
    }
    group.finish();
}

fn bench_forced(c: &mut Criterion) {
    let dispatcher = Dispatcher::with_defaults();
    for strategy in [
        Strategy::Sequential,
        Strategy::FlatParallel,
        Strategy::BlockedParallel,
    ] {
        let mut group = c.benchmark_group(format!("forced/{}", strategy));
        for &n in &[50, 200, 1000] {
            let (a, x) = init::deterministic(n).unwrap();
            let mut y = vec![0; n];
            let kernel = dispatcher.kernel(strategy);
            group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &_n| {
                b.iter(|| kernel.multiply(a.view(), &x, &mut y).unwrap());
            });
        }
        group.finish();
    }
}

fn bench_reduction(c: &mut Criterion) {
    let mut group = c.benchmark_group("blocked_reduction");
    let (a, x) = init::deterministic(1500).unwrap();
    for reduction in [BlockedReduction::Atomic, BlockedReduction::RowOwned] {
        let dispatcher =
            Dispatcher::new(KernelConfig::default().with_reduction(reduction)).unwrap();
        let mut y = vec![0; 1500];
        group.bench_with_input(
            BenchmarkId::from_parameter(reduction),
            &reduction,
            |b, _| {
                b.iter(|| dispatcher.multiply(&a, &x, &mut y).unwrap());
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_adaptive, bench_forced, bench_reduction);
criterion_main!(benches);
