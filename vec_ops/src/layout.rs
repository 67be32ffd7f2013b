use crate::{errors::invalid_argument, BatchLayout, VecOpsResult};

/// Resolved batching geometry of one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlan {
    batch_size: usize,
    per_batch: usize,
    layout: BatchLayout,
}

impl BatchPlan {
    /// Split `total` elements into `batch_size` equal batches.
    pub fn new(total: usize, batch_size: usize, layout: BatchLayout) -> VecOpsResult<Self> {
        if batch_size == 0 {
            return Err(invalid_argument!("batch size must be at least 1"));
        }
        if total % batch_size != 0 {
            return Err(invalid_argument!(
                "{total} elements do not split into {batch_size} equal batches"
            ));
        }
        Ok(Self {
            batch_size,
            per_batch: total / batch_size,
            // a single batch reads the same under both layouts
            layout: if batch_size == 1 {
                BatchLayout::Contiguous
            } else {
                layout
            },
        })
    }

    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[inline]
    pub fn per_batch(&self) -> usize {
        self.per_batch
    }

    #[inline]
    pub fn layout(&self) -> BatchLayout {
        self.layout
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.per_batch * self.batch_size
    }

    /// Flat index of element `pos` of batch `batch`.
    #[inline(always)]
    pub fn index(&self, batch: usize, pos: usize) -> usize {
        match self.layout {
            BatchLayout::Contiguous => batch * self.per_batch + pos,
            BatchLayout::Columns => pos * self.batch_size + batch,
        }
    }

    /// `(block_len, cell_width)` such that the buffer is a sequence of
    /// independent blocks, each holding `per_batch` cells of `cell_width`
    /// consecutive elements, and cell `i` of a block carries position `i` of
    /// every batch in that block.
    ///
    /// Contiguous: one block per batch, cells of one element.
    /// Columns: a single block, each cell holds one position of all batches.
    #[inline]
    pub(crate) fn block_geometry(&self) -> (usize, usize) {
        match self.layout {
            BatchLayout::Contiguous => (self.per_batch, 1),
            BatchLayout::Columns => (self.total(), self.batch_size),
        }
    }
}

/// Reverse the low `log_n` bits of `i`.
#[inline(always)]
pub(crate) fn reverse_index(i: usize, log_n: u32) -> usize {
    if log_n == 0 {
        0
    } else {
        i.reverse_bits() >> (usize::BITS - log_n)
    }
}
