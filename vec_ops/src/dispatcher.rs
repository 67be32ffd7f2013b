use std::sync::Arc;

use gpu::{Device, DeviceId};

use crate::{
    backend::{DeviceBackend, HostBackend, HostPools},
    errors::{invalid_argument, unsupported},
    layout::BatchPlan,
    transpose,
    vec_ops::{self, ReduceOp, VecOp},
    KernelField, MemoryLocation, MemoryView, MemoryViewMut, VecOpsConfig, VecOpsResult,
};

/// Placement of one operand as seen by validation.
struct Operand {
    name: &'static str,
    flagged_on_device: bool,
    location: MemoryLocation,
    device: Option<DeviceId>,
}

impl Operand {
    fn input<F>(name: &'static str, flagged_on_device: bool, view: &MemoryView<'_, F>) -> Self {
        Self {
            name,
            flagged_on_device,
            location: view.location(),
            device: view.device_id(),
        }
    }

    fn output<F>(name: &'static str, flagged_on_device: bool, view: &MemoryViewMut<'_, F>) -> Self {
        Self {
            name,
            flagged_on_device,
            location: view.location(),
            device: view.device_id(),
        }
    }
}

#[inline]
fn expect_len(name: &str, actual: usize, expected: usize) -> VecOpsResult<()> {
    if actual != expected {
        return Err(invalid_argument!(
            "`{name}` holds {actual} elements, expected {expected}"
        ));
    }
    Ok(())
}

/// Single entry point for every operation family.
///
/// Each call validates element counts first, then placement, and only then
/// touches a backend; the first failing check is returned and nothing is
/// written. Host-resident calls run on the host backend, device-resident calls
/// on the device this dispatcher was built with.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    device: Option<Arc<Device>>,
    host_pools: HostPools,
}

impl Dispatcher {
    /// A dispatcher without a device backend; device views are rejected.
    pub fn host() -> Self {
        Self::default()
    }

    pub fn with_device(device: Arc<Device>) -> Self {
        Self {
            device: Some(device),
            host_pools: HostPools::default(),
        }
    }

    #[inline]
    pub fn device(&self) -> Option<&Arc<Device>> {
        self.device.as_ref()
    }

    /// Check config flags against the views and pick the backend.
    ///
    /// Returns `None` for host execution and the device for device execution.
    fn resolve_placement(
        &self,
        cfg: &VecOpsConfig,
        operands: &[Operand],
    ) -> VecOpsResult<Option<&Device>> {
        for op in operands {
            let flagged = if op.flagged_on_device {
                MemoryLocation::Device
            } else {
                MemoryLocation::Host
            };
            if flagged != op.location {
                return Err(invalid_argument!(
                    "config places `{}` on {flagged} but the view is on {}",
                    op.name,
                    op.location
                ));
            }
        }

        let location = operands[0].location;
        if operands.iter().any(|op| op.location != location) {
            let placement = operands
                .iter()
                .map(|op| format!("{}={}", op.name, op.location))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(unsupported!("mixed host/device operands ({placement})"));
        }

        if location == MemoryLocation::Host {
            return Ok(None);
        }

        let device = self
            .device
            .as_deref()
            .ok_or_else(|| unsupported!("device operands but no device backend is configured"))?;
        if let Some(op) = operands.iter().find(|op| op.device != Some(device.id())) {
            return Err(unsupported!(
                "`{}` lives on {:?} but the backend drives {}",
                op.name,
                op.device,
                device.id()
            ));
        }
        if let Some(stream) = cfg.stream {
            if !device.has_stream(stream) {
                return Err(invalid_argument!("{stream} is not a stream of {}", device.id()));
            }
        }
        Ok(Some(device))
    }

    // ====================================
    // vector operations
    // ====================================

    /// `out = a op b` element-wise over every batch.
    pub fn vec_op<F: KernelField>(
        &self,
        op: VecOp,
        a: MemoryView<'_, F>,
        b: MemoryView<'_, F>,
        out: MemoryViewMut<'_, F>,
        cfg: &VecOpsConfig,
    ) -> VecOpsResult<()> {
        let plan = BatchPlan::new(a.len(), cfg.batch_size, cfg.batch_layout)?;
        expect_len("b", b.len(), plan.total())?;
        expect_len("out", out.len(), plan.total())?;

        let device = self.resolve_placement(
            cfg,
            &[
                Operand::input("a", cfg.is_a_on_device, &a),
                Operand::input("b", cfg.is_b_on_device, &b),
                Operand::output("out", cfg.is_result_on_device, &out),
            ],
        )?;
        log::debug!("vec_op {op} over {plan:?} on {:?}", a.location());

        match (device, a, b, out) {
            (None, MemoryView::Host(a), MemoryView::Host(b), MemoryViewMut::Host(out)) => {
                HostBackend::new(cfg, &self.host_pools)
                    .run(|| vec_ops::elementwise(op, a, b, out, &plan))
            }
            (
                Some(device),
                MemoryView::Device(a),
                MemoryView::Device(b),
                MemoryViewMut::Device(out),
            ) => DeviceBackend::new(device, cfg).launch_binary(
                a,
                b,
                out,
                plan.total(),
                move |a, b, out| vec_ops::elementwise(op, a, b, out, &plan),
            ),
            _ => Err(unsupported!("operand placement changed during dispatch")),
        }
    }

    /// `out[k][i] = scalars[k] op b[k][i]`; `scalars` holds one element per
    /// batch and uses the `a` placement flag.
    pub fn scalar_vec_op<F: KernelField>(
        &self,
        op: VecOp,
        scalars: MemoryView<'_, F>,
        b: MemoryView<'_, F>,
        out: MemoryViewMut<'_, F>,
        cfg: &VecOpsConfig,
    ) -> VecOpsResult<()> {
        let plan = BatchPlan::new(b.len(), cfg.batch_size, cfg.batch_layout)?;
        expect_len("scalars", scalars.len(), plan.batch_size())?;
        expect_len("out", out.len(), plan.total())?;

        let device = self.resolve_placement(
            cfg,
            &[
                Operand::input("scalars", cfg.is_a_on_device, &scalars),
                Operand::input("b", cfg.is_b_on_device, &b),
                Operand::output("out", cfg.is_result_on_device, &out),
            ],
        )?;
        log::debug!("scalar_vec_op {op} over {plan:?} on {:?}", b.location());

        match (device, scalars, b, out) {
            (None, MemoryView::Host(s), MemoryView::Host(b), MemoryViewMut::Host(out)) => {
                HostBackend::new(cfg, &self.host_pools)
                    .run(|| vec_ops::scalar_op(op, s, b, out, &plan))
            }
            (
                Some(device),
                MemoryView::Device(s),
                MemoryView::Device(b),
                MemoryViewMut::Device(out),
            ) => DeviceBackend::new(device, cfg).launch_binary(
                s,
                b,
                out,
                plan.total(),
                move |s, b, out| vec_ops::scalar_op(op, s, b, out, &plan),
            ),
            _ => Err(unsupported!("operand placement changed during dispatch")),
        }
    }

    /// `a += b` in place.
    pub fn accumulate<F: KernelField>(
        &self,
        a: MemoryViewMut<'_, F>,
        b: MemoryView<'_, F>,
        cfg: &VecOpsConfig,
    ) -> VecOpsResult<()> {
        let plan = BatchPlan::new(a.len(), cfg.batch_size, cfg.batch_layout)?;
        expect_len("b", b.len(), plan.total())?;

        let device = self.resolve_placement(
            cfg,
            &[
                Operand::output("a", cfg.is_a_on_device, &a),
                Operand::input("b", cfg.is_b_on_device, &b),
            ],
        )?;
        log::debug!("accumulate over {plan:?} on {:?}", b.location());

        match (device, a, b) {
            (None, MemoryViewMut::Host(a), MemoryView::Host(b)) => {
                HostBackend::new(cfg, &self.host_pools).run(|| vec_ops::accumulate(a, b))
            }
            (Some(device), MemoryViewMut::Device(a), MemoryView::Device(b)) => {
                DeviceBackend::new(device, cfg).launch_update(
                    a,
                    b,
                    plan.total(),
                    vec_ops::accumulate,
                )
            }
            _ => Err(unsupported!("operand placement changed during dispatch")),
        }
    }

    /// `out[k]` = sum or product of batch `k`; `out` holds one element per
    /// batch.
    pub fn vec_reduce<F: KernelField>(
        &self,
        op: ReduceOp,
        a: MemoryView<'_, F>,
        out: MemoryViewMut<'_, F>,
        cfg: &VecOpsConfig,
    ) -> VecOpsResult<()> {
        let plan = BatchPlan::new(a.len(), cfg.batch_size, cfg.batch_layout)?;
        expect_len("out", out.len(), plan.batch_size())?;

        let device = self.resolve_placement(
            cfg,
            &[
                Operand::input("a", cfg.is_a_on_device, &a),
                Operand::output("out", cfg.is_result_on_device, &out),
            ],
        )?;
        log::debug!("vec_reduce {op} over {plan:?} on {:?}", a.location());

        match (device, a, out) {
            (None, MemoryView::Host(a), MemoryViewMut::Host(out)) => {
                HostBackend::new(cfg, &self.host_pools).run(|| vec_ops::reduce(op, a, out, &plan))
            }
            (Some(device), MemoryView::Device(a), MemoryViewMut::Device(out)) => {
                DeviceBackend::new(device, cfg).launch_unary(
                    a,
                    out,
                    plan.total(),
                    move |a, out| vec_ops::reduce(op, a, out, &plan),
                )
            }
            _ => Err(unsupported!("operand placement changed during dispatch")),
        }
    }

    // ====================================
    // permutations
    // ====================================

    /// Transpose each `rows x cols` row-major matrix of the batch into a
    /// `cols x rows` one. `input` uses the `a` placement flag.
    pub fn transpose<F: KernelField>(
        &self,
        input: MemoryView<'_, F>,
        rows: usize,
        cols: usize,
        out: MemoryViewMut<'_, F>,
        cfg: &VecOpsConfig,
    ) -> VecOpsResult<()> {
        if rows == 0 || cols == 0 {
            return Err(invalid_argument!(
                "matrix dimensions must be positive, got {rows}x{cols}"
            ));
        }
        if cfg.batch_size == 0 {
            return Err(invalid_argument!("batch size must be at least 1"));
        }
        let total = rows
            .checked_mul(cols)
            .and_then(|n| n.checked_mul(cfg.batch_size))
            .ok_or_else(|| {
                invalid_argument!("{rows}x{cols}x{} elements overflow", cfg.batch_size)
            })?;
        expect_len("input", input.len(), total)?;
        expect_len("out", out.len(), total)?;
        let plan = BatchPlan::new(total, cfg.batch_size, cfg.batch_layout)?;

        let device = self.resolve_placement(
            cfg,
            &[
                Operand::input("input", cfg.is_a_on_device, &input),
                Operand::output("out", cfg.is_result_on_device, &out),
            ],
        )?;
        log::debug!("transpose {rows}x{cols} over {plan:?} on {:?}", input.location());

        match (device, input, out) {
            (None, MemoryView::Host(input), MemoryViewMut::Host(out)) => {
                HostBackend::new(cfg, &self.host_pools)
                    .run(|| transpose::transpose(input, out, rows, cols, &plan))
            }
            (Some(device), MemoryView::Device(input), MemoryViewMut::Device(out)) => {
                DeviceBackend::new(device, cfg).launch_unary(
                    input,
                    out,
                    total,
                    move |input, out| transpose::transpose(input, out, rows, cols, &plan),
                )
            }
            _ => Err(unsupported!("operand placement changed during dispatch")),
        }
    }

    /// Bit-reversal permutation of every batch; the per-batch length must be a
    /// power of two. `input` uses the `a` placement flag.
    pub fn bit_reverse<F: KernelField>(
        &self,
        input: MemoryView<'_, F>,
        out: MemoryViewMut<'_, F>,
        cfg: &VecOpsConfig,
    ) -> VecOpsResult<()> {
        let plan = bit_reverse_plan(input.len(), cfg)?;
        expect_len("out", out.len(), plan.total())?;

        let device = self.resolve_placement(
            cfg,
            &[
                Operand::input("input", cfg.is_a_on_device, &input),
                Operand::output("out", cfg.is_result_on_device, &out),
            ],
        )?;
        log::debug!("bit_reverse over {plan:?} on {:?}", input.location());

        match (device, input, out) {
            (None, MemoryView::Host(input), MemoryViewMut::Host(out)) => {
                HostBackend::new(cfg, &self.host_pools)
                    .run(|| vec_ops::bit_reverse(input, out, &plan))
            }
            (Some(device), MemoryView::Device(input), MemoryViewMut::Device(out)) => {
                DeviceBackend::new(device, cfg).launch_unary(
                    input,
                    out,
                    plan.total(),
                    move |input, out| vec_ops::bit_reverse(input, out, &plan),
                )
            }
            _ => Err(unsupported!("operand placement changed during dispatch")),
        }
    }

    /// In-place variant of [`Dispatcher::bit_reverse`]; placement follows the
    /// `a` flag.
    pub fn bit_reverse_inplace<F: KernelField>(
        &self,
        inout: MemoryViewMut<'_, F>,
        cfg: &VecOpsConfig,
    ) -> VecOpsResult<()> {
        let plan = bit_reverse_plan(inout.len(), cfg)?;

        let device = self.resolve_placement(
            cfg,
            &[Operand::output("inout", cfg.is_a_on_device, &inout)],
        )?;
        log::debug!("bit_reverse_inplace over {plan:?} on {:?}", inout.location());

        match (device, inout) {
            (None, MemoryViewMut::Host(data)) => {
                HostBackend::new(cfg, &self.host_pools)
                    .run(|| vec_ops::bit_reverse_inplace(data, &plan))
            }
            (Some(device), MemoryViewMut::Device(data)) => DeviceBackend::new(device, cfg)
                .launch_inplace(data, plan.total(), move |data| {
                    vec_ops::bit_reverse_inplace(data, &plan)
                }),
            _ => Err(unsupported!("operand placement changed during dispatch")),
        }
    }
}

fn bit_reverse_plan(total: usize, cfg: &VecOpsConfig) -> VecOpsResult<BatchPlan> {
    let plan = BatchPlan::new(total, cfg.batch_size, cfg.batch_layout)?;
    if plan.total() > 0 && !plan.per_batch().is_power_of_two() {
        return Err(invalid_argument!(
            "bit reversal needs a power-of-two batch length, got {}",
            plan.per_batch()
        ));
    }
    Ok(plan)
}
