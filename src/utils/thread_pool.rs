use crate::error::FpResult;
use rayon::ThreadPoolBuilder;
use std::sync::LazyLock;

static NUM_CPUS: LazyLock<usize> = LazyLock::new(|| {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
});

/// Hardware concurrency available to this process
#[must_use]
pub fn available_threads() -> usize {
    *NUM_CPUS
}

/// Resolve a configured thread count, `0` meaning "all available"
#[must_use]
pub fn resolve_thread_count(configured: usize) -> usize {
    if configured == 0 {
        available_threads()
    } else {
        configured
    }
}

/// Build a dedicated hashing pool with `num_threads` workers.
///
/// The pool is owned by the caller and shuts down when it is dropped.
///
/// # Errors
///
/// Returns an error if the operating system refuses to spawn the threads
pub fn build_pool(num_threads: usize) -> FpResult<rayon::ThreadPool> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(num_threads.max(1))
        .thread_name(|i| format!("fpf-hasher-{i}"))
        .build()?;
    Ok(pool)
}
