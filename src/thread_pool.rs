//! Shared thread pool for parallel pair evaluation.
//!
//! Every evaluation run fans its ordered secret pairs out over the same
//! process-wide pool, so repeated runs do not rebuild threads and the
//! library never competes with a caller-configured global rayon pool.

#[cfg(feature = "parallel")]
use rayon::ThreadPool;

#[cfg(feature = "parallel")]
use std::sync::OnceLock;

#[cfg(feature = "parallel")]
static THREAD_POOL: OnceLock<ThreadPool> = OnceLock::new();

/// Get or initialize the shared evaluation pool.
///
/// Workers are named `leakbox-worker-N` so interleaved debug output from
/// concurrent pair evaluations can be attributed to a thread.
#[cfg(feature = "parallel")]
pub fn shared_pool() -> &'static ThreadPool {
    THREAD_POOL.get_or_init(|| {
        rayon::ThreadPoolBuilder::new()
            .thread_name(|i| format!("leakbox-worker-{}", i))
            .build()
            .expect("Failed to build evaluation thread pool")
    })
}

/// Run `op` inside the shared evaluation pool.
#[cfg(feature = "parallel")]
pub fn install<OP, R>(op: OP) -> R
where
    OP: FnOnce() -> R + Send,
    R: Send,
{
    shared_pool().install(op)
}

#[cfg(not(feature = "parallel"))]
pub fn install<OP, R>(op: OP) -> R
where
    OP: FnOnce() -> R,
{
    // No parallel feature - just execute directly
    op()
}
