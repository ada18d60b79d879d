//! Concurrency helper: bounded, order-preserving map used for review lookups.

use rayon::prelude::*;

/// Apply `f` to every item with at most `limit` calls in flight, returning results in
/// input order. `limit <= 1` runs sequentially on the calling thread.
pub fn map_ordered_limited<T, R, F>(items: &[T], limit: usize, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Sync + Fn(&T) -> R,
{
    if limit <= 1 || items.len() <= 1 {
        return items.iter().map(&f).collect();
    }

    // Lookups are I/O-bound, so size a dedicated pool to the limit instead of
    // borrowing the global (CPU-sized) one.
    let pool = match rayon::ThreadPoolBuilder::new().num_threads(limit).build() {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(error = %e, "Could not build lookup thread pool; running sequentially");
            return items.iter().map(&f).collect();
        }
    };

    let mut out = Vec::with_capacity(items.len());
    pool.install(|| {
        for chunk in items.chunks(limit) {
            // collect() on an indexed parallel iterator keeps chunk order
            let part: Vec<R> = chunk.par_iter().map(|item| f(item)).collect();
            out.extend(part);
        }
    });
    out
}
