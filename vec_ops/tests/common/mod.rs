#![allow(dead_code)]

use std::sync::Arc;

use arith::Field;
use gpu::{Device, DeviceId, DeviceProperties};
use rand::RngCore;
use vec_ops::{
    Dispatcher, KernelField, MemoryView, MemoryViewMut, ReduceOp, VecOp, VecOpsConfig,
    VecOpsResult,
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn random_vec<F: Field>(n: usize, mut rng: impl RngCore) -> Vec<F> {
    (0..n).map(|_| F::random_unsafe(&mut rng)).collect()
}

pub fn small_values<F: Field>(values: &[u64]) -> Vec<F> {
    values.iter().map(|&v| F::from_u64(v)).collect()
}

pub fn new_device(id: u32) -> Arc<Device> {
    Arc::new(Device::new(DeviceId(id), DeviceProperties::default()).unwrap())
}

// ====================================
// references, written directly against the field operators
// ====================================

pub fn reference_vec_op<F: Field>(op: VecOp, a: &[F], b: &[F]) -> Vec<F> {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| match op {
            VecOp::Add => x + y,
            VecOp::Sub => x - y,
            VecOp::Mul => x * y,
        })
        .collect()
}

pub fn reference_transpose<F: Field>(m: &[F], rows: usize, cols: usize) -> Vec<F> {
    let mut out = vec![F::zero(); m.len()];
    for i in 0..rows {
        for j in 0..cols {
            out[j * rows + i] = m[i * cols + j];
        }
    }
    out
}

/// Runs every operation either on host buffers or on freshly uploaded device
/// buffers, and always hands back host vectors.
#[derive(Clone)]
pub struct Harness {
    pub dispatcher: Dispatcher,
}

impl Harness {
    pub fn host() -> Self {
        Self {
            dispatcher: Dispatcher::host(),
        }
    }

    pub fn device() -> Self {
        Self {
            dispatcher: Dispatcher::with_device(new_device(0)),
        }
    }

    pub fn all() -> [Harness; 2] {
        [Self::host(), Self::device()]
    }

    pub fn name(&self) -> &'static str {
        match self.dispatcher.device() {
            None => "host",
            Some(_) => "device",
        }
    }

    fn device_cfg(&self, cfg: &VecOpsConfig) -> VecOpsConfig {
        cfg.clone().on_device()
    }

    fn finish(&self, cfg: &VecOpsConfig) {
        let device = self.dispatcher.device().unwrap();
        if cfg.is_async {
            device.synchronize(cfg.stream).unwrap();
        }
    }

    pub fn vec_op<F: KernelField>(
        &self,
        op: VecOp,
        a: &[F],
        b: &[F],
        cfg: &VecOpsConfig,
    ) -> VecOpsResult<Vec<F>> {
        match self.dispatcher.device() {
            None => {
                let mut out = vec![F::zero(); a.len()];
                self.dispatcher.vec_op(
                    op,
                    MemoryView::host(a),
                    MemoryView::host(b),
                    MemoryViewMut::host(&mut out),
                    cfg,
                )?;
                Ok(out)
            }
            Some(device) => {
                let cfg = self.device_cfg(cfg);
                let a = device.alloc_from_host(a).unwrap();
                let b = device.alloc_from_host(b).unwrap();
                let mut out = device.alloc::<F>(a.len()).unwrap();
                self.dispatcher.vec_op(
                    op,
                    MemoryView::device(&a),
                    MemoryView::device(&b),
                    MemoryViewMut::device(&mut out),
                    &cfg,
                )?;
                self.finish(&cfg);
                Ok(out.to_host_vec().unwrap())
            }
        }
    }

    pub fn scalar_vec_op<F: KernelField>(
        &self,
        op: VecOp,
        scalars: &[F],
        b: &[F],
        cfg: &VecOpsConfig,
    ) -> VecOpsResult<Vec<F>> {
        match self.dispatcher.device() {
            None => {
                let mut out = vec![F::zero(); b.len()];
                self.dispatcher.scalar_vec_op(
                    op,
                    MemoryView::host(scalars),
                    MemoryView::host(b),
                    MemoryViewMut::host(&mut out),
                    cfg,
                )?;
                Ok(out)
            }
            Some(device) => {
                let cfg = self.device_cfg(cfg);
                let s = device.alloc_from_host(scalars).unwrap();
                let b = device.alloc_from_host(b).unwrap();
                let mut out = device.alloc::<F>(b.len()).unwrap();
                self.dispatcher.scalar_vec_op(
                    op,
                    MemoryView::device(&s),
                    MemoryView::device(&b),
                    MemoryViewMut::device(&mut out),
                    &cfg,
                )?;
                self.finish(&cfg);
                Ok(out.to_host_vec().unwrap())
            }
        }
    }

    pub fn accumulate<F: KernelField>(
        &self,
        a: &[F],
        b: &[F],
        cfg: &VecOpsConfig,
    ) -> VecOpsResult<Vec<F>> {
        match self.dispatcher.device() {
            None => {
                let mut acc = a.to_vec();
                self.dispatcher
                    .accumulate(MemoryViewMut::host(&mut acc), MemoryView::host(b), cfg)?;
                Ok(acc)
            }
            Some(device) => {
                let cfg = self.device_cfg(cfg);
                let mut acc = device.alloc_from_host(a).unwrap();
                let b = device.alloc_from_host(b).unwrap();
                self.dispatcher.accumulate(
                    MemoryViewMut::device(&mut acc),
                    MemoryView::device(&b),
                    &cfg,
                )?;
                self.finish(&cfg);
                Ok(acc.to_host_vec().unwrap())
            }
        }
    }

    pub fn reduce<F: KernelField>(
        &self,
        op: ReduceOp,
        a: &[F],
        cfg: &VecOpsConfig,
    ) -> VecOpsResult<Vec<F>> {
        match self.dispatcher.device() {
            None => {
                let mut out = vec![F::zero(); cfg.batch_size];
                self.dispatcher
                    .vec_reduce(op, MemoryView::host(a), MemoryViewMut::host(&mut out), cfg)?;
                Ok(out)
            }
            Some(device) => {
                let cfg = self.device_cfg(cfg);
                let a = device.alloc_from_host(a).unwrap();
                let mut out = device.alloc::<F>(cfg.batch_size).unwrap();
                self.dispatcher.vec_reduce(
                    op,
                    MemoryView::device(&a),
                    MemoryViewMut::device(&mut out),
                    &cfg,
                )?;
                self.finish(&cfg);
                Ok(out.to_host_vec().unwrap())
            }
        }
    }

    pub fn transpose<F: KernelField>(
        &self,
        input: &[F],
        rows: usize,
        cols: usize,
        cfg: &VecOpsConfig,
    ) -> VecOpsResult<Vec<F>> {
        match self.dispatcher.device() {
            None => {
                let mut out = vec![F::zero(); input.len()];
                self.dispatcher.transpose(
                    MemoryView::host(input),
                    rows,
                    cols,
                    MemoryViewMut::host(&mut out),
                    cfg,
                )?;
                Ok(out)
            }
            Some(device) => {
                let cfg = self.device_cfg(cfg);
                let input = device.alloc_from_host(input).unwrap();
                let mut out = device.alloc::<F>(input.len()).unwrap();
                self.dispatcher.transpose(
                    MemoryView::device(&input),
                    rows,
                    cols,
                    MemoryViewMut::device(&mut out),
                    &cfg,
                )?;
                self.finish(&cfg);
                Ok(out.to_host_vec().unwrap())
            }
        }
    }

    pub fn bit_reverse<F: KernelField>(
        &self,
        input: &[F],
        cfg: &VecOpsConfig,
    ) -> VecOpsResult<Vec<F>> {
        match self.dispatcher.device() {
            None => {
                let mut out = vec![F::zero(); input.len()];
                self.dispatcher.bit_reverse(
                    MemoryView::host(input),
                    MemoryViewMut::host(&mut out),
                    cfg,
                )?;
                Ok(out)
            }
            Some(device) => {
                let cfg = self.device_cfg(cfg);
                let input = device.alloc_from_host(input).unwrap();
                let mut out = device.alloc::<F>(input.len()).unwrap();
                self.dispatcher.bit_reverse(
                    MemoryView::device(&input),
                    MemoryViewMut::device(&mut out),
                    &cfg,
                )?;
                self.finish(&cfg);
                Ok(out.to_host_vec().unwrap())
            }
        }
    }

    pub fn bit_reverse_inplace<F: KernelField>(
        &self,
        data: &[F],
        cfg: &VecOpsConfig,
    ) -> VecOpsResult<Vec<F>> {
        match self.dispatcher.device() {
            None => {
                let mut data = data.to_vec();
                self.dispatcher
                    .bit_reverse_inplace(MemoryViewMut::host(&mut data), cfg)?;
                Ok(data)
            }
            Some(device) => {
                let cfg = self.device_cfg(cfg);
                let mut data = device.alloc_from_host(data).unwrap();
                self.dispatcher
                    .bit_reverse_inplace(MemoryViewMut::device(&mut data), &cfg)?;
                self.finish(&cfg);
                Ok(data.to_host_vec().unwrap())
            }
        }
    }
}
