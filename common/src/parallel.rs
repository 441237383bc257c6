//! Row-parallel processing for row-major image buffers.
//!
//! Rows are split into one contiguous block per rayon worker. Each block is a
//! disjoint `&mut` slice of whole rows, so workers never share output memory
//! and no synchronization is needed inside a single pass. The call blocks
//! until every block is done.

use rayon::prelude::*;

/// Number of rows per block so that `height` splits into one block per worker.
///
/// Minimum of 1 row per block.
#[inline]
pub fn rows_per_block(height: usize) -> usize {
    let workers = rayon::current_num_threads().max(1);
    height.div_ceil(workers).max(1)
}

/// Runs `f(first_row, rows)` on disjoint row blocks of `data` in parallel.
///
/// `data.len()` must be a multiple of `width`. `rows` always holds whole rows.
pub fn for_each_row_block<T, F>(data: &mut [T], width: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    if data.is_empty() || width == 0 {
        return;
    }
    assert_eq!(data.len() % width, 0, "data must hold whole rows");

    let block_rows = rows_per_block(data.len() / width);
    data.par_chunks_mut(width * block_rows)
        .enumerate()
        .for_each(|(block, rows)| f(block * block_rows, rows));
}
