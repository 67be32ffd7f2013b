// this module benchmarks host and device vector operations and transposes

use std::sync::Arc;

use arith::{BN254Fr, Field};
use ark_std::test_rng;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use gpu::{Device, DeviceId, DeviceProperties};
use goldilocks::Goldilocks;
use mersenne31::M31;
use tynm::type_name;
use vec_ops::{
    BatchLayout, Dispatcher, KernelField, MemoryView, MemoryViewMut, VecOp, VecOpsConfig,
};

const LOG_SIZES: [usize; 3] = [12, 16, 20];

fn random_vec<F: Field>(n: usize) -> Vec<F> {
    let mut rng = test_rng();
    (0..n).map(|_| F::random_unsafe(&mut rng)).collect()
}

fn bench_vec_op<F: KernelField>(c: &mut Criterion, device: &Arc<Device>) {
    let mut group = c.benchmark_group(format!("vec-op<{}>", type_name::<F>()));
    let host = Dispatcher::host();
    let dispatcher = Dispatcher::with_device(device.clone());

    for (op, log_n) in [VecOp::Add, VecOp::Mul]
        .into_iter()
        .flat_map(|op| LOG_SIZES.map(|log_n| (op, log_n)))
    {
        let n = 1 << log_n;
        let a = random_vec::<F>(n);
        let b = random_vec::<F>(n);

        let mut out = vec![F::zero(); n];
        let cfg = VecOpsConfig::default();
        group.bench_with_input(BenchmarkId::new(format!("host {op}"), log_n), &n, |bench, _| {
            bench.iter(|| {
                host.vec_op(
                    op,
                    MemoryView::host(&a),
                    MemoryView::host(&b),
                    MemoryViewMut::host(&mut out),
                    &cfg,
                )
            })
        });

        let a = device.alloc_from_host(&a).unwrap();
        let b = device.alloc_from_host(&b).unwrap();
        let mut out = device.alloc::<F>(n).unwrap();
        let cfg = VecOpsConfig::default().on_device();
        group.bench_with_input(BenchmarkId::new(format!("device {op}"), log_n), &n, |bench, _| {
            bench.iter(|| {
                dispatcher.vec_op(
                    op,
                    MemoryView::device(&a),
                    MemoryView::device(&b),
                    MemoryViewMut::device(&mut out),
                    &cfg,
                )
            })
        });
    }
    group.finish();
}

fn bench_transpose<F: KernelField>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("transpose<{}>", type_name::<F>()));
    let dispatcher = Dispatcher::host();

    for log_n in LOG_SIZES {
        let rows = 1 << (log_n / 2);
        let cols = 1 << (log_n - log_n / 2);
        let input = random_vec::<F>(rows * cols);
        let mut out = vec![F::zero(); rows * cols];
        let cfg = VecOpsConfig::default();
        group.bench_with_input(
            BenchmarkId::new(format!("{rows}x{cols}"), log_n),
            &log_n,
            |bench, _| {
                bench.iter(|| {
                    dispatcher.transpose(
                        MemoryView::host(&input),
                        rows,
                        cols,
                        MemoryViewMut::host(&mut out),
                        &cfg,
                    )
                })
            },
        );

        // the same element count as 4 interleaved matrices
        let (rows, cols) = (rows / 2, cols / 2);
        let cfg = VecOpsConfig::default().with_batch(4, BatchLayout::Columns);
        group.bench_with_input(
            BenchmarkId::new(format!("4 x {rows}x{cols} columns"), log_n),
            &log_n,
            |bench, _| {
                bench.iter(|| {
                    dispatcher.transpose(
                        MemoryView::host(&input),
                        rows,
                        cols,
                        MemoryViewMut::host(&mut out),
                        &cfg,
                    )
                })
            },
        );
    }
    group.finish();
}

fn criterion_benchmark(c: &mut Criterion) {
    let device = Arc::new(Device::new(DeviceId(0), DeviceProperties::default()).unwrap());

    bench_vec_op::<M31>(c, &device);
    bench_vec_op::<Goldilocks>(c, &device);
    bench_vec_op::<BN254Fr>(c, &device);

    bench_transpose::<M31>(c);
    bench_transpose::<BN254Fr>(c);
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
