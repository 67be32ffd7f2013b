use rayon::prelude::*;

use crate::{layout::BatchPlan, KernelField};

/// Number of elements of `F` that fit in a 64KiB working set.
pub(crate) const fn cache_batch_size<F: Sized>() -> usize {
    const CACHE_SIZE: usize = 1 << 16;
    CACHE_SIZE / std::mem::size_of::<F>()
}

/// Transpose every `rows x cols` row-major matrix of the batch:
/// `out[j * rows + i] = input[i * cols + j]`.
///
/// Works on the cells of [`BatchPlan::block_geometry`]: with a contiguous
/// layout each block is one matrix of single-element cells, with a columns
/// layout the whole buffer is one matrix whose cells carry that entry of every
/// batch. Either way a cell moves as a unit and never crosses into another
/// batch.
pub(crate) fn transpose<F: KernelField>(
    input: &[F],
    out: &mut [F],
    rows: usize,
    cols: usize,
    plan: &BatchPlan,
) {
    debug_assert_eq!(plan.per_batch(), rows * cols);
    debug_assert!(input.len() == plan.total() && out.len() == plan.total());

    let (block, cell) = plan.block_geometry();
    let min_cells = (cache_batch_size::<F>() / cell).max(1);

    out.par_chunks_mut(block)
        .zip(input.par_chunks(block))
        .for_each(|(out_block, in_block)| {
            out_block
                .par_chunks_mut(cell)
                .enumerate()
                .with_min_len(min_cells)
                .for_each(|(dst, out_cell)| {
                    // dst = j * rows + i gathers from src = i * cols + j
                    let src = (dst % rows) * cols + dst / rows;
                    out_cell.copy_from_slice(&in_block[src * cell..(src + 1) * cell]);
                })
        });
}
