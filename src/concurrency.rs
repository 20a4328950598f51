//! Concurrency helper: limit the number of input files processed in parallel.

use anyhow::Result;
use rayon::prelude::*;

/// At most `limit` items in flight; `limit <= 1` runs sequentially on the caller's thread.
pub fn for_each_limited<T, F>(items: &[T], limit: usize, f: F) -> Result<()>
where
    T: Sync,
    F: Sync + Fn(usize, &T) -> Result<()>,
{
    if limit <= 1 {
        for (i, item) in items.iter().enumerate() {
            f(i, item)?;
        }
        return Ok(());
    }
    for (c, chunk) in items.chunks(limit).enumerate() {
        chunk
            .par_iter()
            .enumerate()
            .try_for_each(|(j, item)| f(c * limit + j, item))?;
    }
    Ok(())
}
