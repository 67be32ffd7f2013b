use std::{fmt, str::FromStr};

use rayon::prelude::*;

use crate::{
    errors::invalid_argument,
    layout::{reverse_index, BatchPlan},
    BatchLayout, KernelField, VecOpsError,
};

/// Below this many elements per task rayon splitting costs more than it saves.
pub(crate) const MIN_PAR_LEN: usize = 1 << 12;

/// Element-wise binary operation selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VecOp {
    Add,
    Sub,
    Mul,
}

impl VecOp {
    #[inline(always)]
    pub fn apply<F: KernelField>(self, a: &F, b: &F) -> F {
        match self {
            VecOp::Add => *a + b,
            VecOp::Sub => *a - b,
            VecOp::Mul => *a * b,
        }
    }
}

impl TryFrom<u8> for VecOp {
    type Error = VecOpsError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(VecOp::Add),
            1 => Ok(VecOp::Sub),
            2 => Ok(VecOp::Mul),
            _ => Err(invalid_argument!("unknown vector operation code {code}")),
        }
    }
}

impl FromStr for VecOp {
    type Err = VecOpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "add" => Ok(VecOp::Add),
            "sub" => Ok(VecOp::Sub),
            "mul" => Ok(VecOp::Mul),
            _ => Err(invalid_argument!("unknown vector operation `{s}`")),
        }
    }
}

impl fmt::Display for VecOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VecOp::Add => write!(f, "add"),
            VecOp::Sub => write!(f, "sub"),
            VecOp::Mul => write!(f, "mul"),
        }
    }
}

/// Per-batch reduction selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReduceOp {
    Sum,
    Product,
}

impl ReduceOp {
    #[inline]
    pub fn identity<F: KernelField>(self) -> F {
        match self {
            ReduceOp::Sum => F::zero(),
            ReduceOp::Product => F::one(),
        }
    }

    #[inline]
    fn fold<'a, F: KernelField>(self, iter: impl Iterator<Item = &'a F>) -> F {
        match self {
            ReduceOp::Sum => iter.sum(),
            ReduceOp::Product => iter.product(),
        }
    }
}

impl fmt::Display for ReduceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReduceOp::Sum => write!(f, "sum"),
            ReduceOp::Product => write!(f, "product"),
        }
    }
}

/// `out[x] = a[x] op b[x]` for every flat index `x`.
///
/// Under either layout every flat index belongs to exactly one
/// `(batch, position)` pair and all three buffers share that mapping, so one
/// flat pass computes every batch without crossing batch boundaries.
pub(crate) fn elementwise<F: KernelField>(
    op: VecOp,
    a: &[F],
    b: &[F],
    out: &mut [F],
    plan: &BatchPlan,
) {
    debug_assert!(a.len() == plan.total() && b.len() == plan.total() && out.len() == plan.total());

    out.par_iter_mut()
        .zip(a.par_iter().zip(b.par_iter()))
        .with_min_len(MIN_PAR_LEN)
        .for_each(|(o, (x, y))| *o = op.apply(x, y));
}

/// `out[k][i] = scalars[k] op b[k][i]`: one scalar per batch.
pub(crate) fn scalar_op<F: KernelField>(
    op: VecOp,
    scalars: &[F],
    b: &[F],
    out: &mut [F],
    plan: &BatchPlan,
) {
    debug_assert!(scalars.len() == plan.batch_size());
    if plan.total() == 0 {
        return;
    }

    match plan.layout() {
        BatchLayout::Contiguous => {
            let n = plan.per_batch();
            out.par_chunks_mut(n)
                .zip(b.par_chunks(n))
                .zip(scalars.par_iter())
                .for_each(|((out_k, b_k), s)| {
                    out_k
                        .iter_mut()
                        .zip(b_k)
                        .for_each(|(o, y)| *o = op.apply(s, y))
                });
        }
        BatchLayout::Columns => {
            // each row of the implicit matrix holds position i of every batch
            let width = plan.batch_size();
            out.par_chunks_mut(width)
                .zip(b.par_chunks(width))
                .for_each(|(out_row, b_row)| {
                    out_row
                        .iter_mut()
                        .zip(b_row.iter().zip(scalars))
                        .for_each(|(o, (y, s))| *o = op.apply(s, y))
                });
        }
    }
}

/// `a[x] += b[x]` in place.
pub(crate) fn accumulate<F: KernelField>(a: &mut [F], b: &[F]) {
    debug_assert_eq!(a.len(), b.len());

    a.par_iter_mut()
        .zip(b.par_iter())
        .with_min_len(MIN_PAR_LEN)
        .for_each(|(x, y)| *x += y);
}

/// `out[k]` = reduction of batch `k`.
pub(crate) fn reduce<F: KernelField>(op: ReduceOp, a: &[F], out: &mut [F], plan: &BatchPlan) {
    debug_assert!(out.len() == plan.batch_size());
    let n = plan.per_batch();
    if n == 0 {
        out.fill(op.identity());
        return;
    }

    match plan.layout() {
        BatchLayout::Contiguous => out
            .par_iter_mut()
            .zip(a.par_chunks(n))
            .for_each(|(o, batch)| *o = op.fold(batch.iter())),
        BatchLayout::Columns => {
            let width = plan.batch_size();
            out.par_iter_mut()
                .enumerate()
                .for_each(|(k, o)| *o = op.fold(a.iter().skip(k).step_by(width)))
        }
    }
}

/// `out[rev(i)] = input[i]` within every batch of `2^m` elements.
pub(crate) fn bit_reverse<F: KernelField>(input: &[F], out: &mut [F], plan: &BatchPlan) {
    if plan.total() == 0 {
        return;
    }
    let n = plan.per_batch();
    debug_assert!(n.is_power_of_two());
    let log_n = n.trailing_zeros();
    let (block, cell) = plan.block_geometry();

    // the permutation is an involution, so gathering from rev(i) is the same
    // as scattering to it
    out.par_chunks_mut(block)
        .zip(input.par_chunks(block))
        .for_each(|(out_block, in_block)| {
            out_block
                .par_chunks_mut(cell)
                .enumerate()
                .with_min_len((MIN_PAR_LEN / cell).max(1))
                .for_each(|(i, out_cell)| {
                    let r = reverse_index(i, log_n);
                    out_cell.copy_from_slice(&in_block[r * cell..(r + 1) * cell]);
                })
        });
}

/// In-place bit reversal; swaps each pair `(i, rev(i))` once.
pub(crate) fn bit_reverse_inplace<F: KernelField>(data: &mut [F], plan: &BatchPlan) {
    if plan.total() == 0 {
        return;
    }
    let n = plan.per_batch();
    debug_assert!(n.is_power_of_two());
    let log_n = n.trailing_zeros();
    let (block, cell) = plan.block_geometry();

    data.par_chunks_mut(block).for_each(|block| {
        for i in 0..n {
            let r = reverse_index(i, log_n);
            if i < r {
                let (lo, hi) = block.split_at_mut(r * cell);
                lo[i * cell..(i + 1) * cell].swap_with_slice(&mut hi[..cell]);
            }
        }
    });
}
