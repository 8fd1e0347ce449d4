use rayon::ThreadPoolBuilder;
use log::info;

use crate::error::{Result, WorldError};

// A wrapper around Rayon's ThreadPool used for layout generation and parallel body integration
pub struct ThreadPool {
    pool: rayon::ThreadPool,
    num_threads: usize,
}

impl ThreadPool {
    // Builds a dedicated pool; `size == 0` sizes it to the machine's cores
    pub fn new(size: usize) -> Result<ThreadPool> {
        let num_threads = if size > 0 { size } else { num_cpus::get() };

        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("worldgen-worker-{i}"))
            .build()
            .map_err(|e| WorldError::ThreadPool(e.to_string()))?;

        info!("Created thread pool with {} threads", num_threads);

        Ok(ThreadPool { pool, num_threads })
    }

    // Run a closure inside the pool so nested rayon iterators use its workers
    pub fn install<F, R>(&self, op: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    // Execute a parallel task on a slice of data, results keep the input order
    pub fn par_execute<T, F, R>(&self, data: &[T], f: F) -> Vec<R>
    where
        T: Send + Sync,
        F: Fn(&T) -> R + Send + Sync,
        R: Send,
    {
        use rayon::prelude::*;
        self.pool.install(|| data.par_iter().map(f).collect())
    }
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool").field("num_threads", &self.num_threads).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_size() {
        let pool = ThreadPool::new(2).unwrap();
        assert_eq!(pool.num_threads(), 2);
    }

    #[test]
    fn test_zero_uses_cpu_count() {
        let pool = ThreadPool::new(0).unwrap();
        assert_eq!(pool.num_threads(), num_cpus::get());
    }

    #[test]
    fn test_par_execute_keeps_order() {
        let pool = ThreadPool::new(3).unwrap();
        let input: Vec<u32> = (0..100).collect();
        let doubled = pool.par_execute(&input, |v| v * 2);
        assert_eq!(doubled, input.iter().map(|v| v * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_install_runs_on_pool() {
        let pool = ThreadPool::new(2).unwrap();
        let threads = pool.install(rayon::current_num_threads);
        assert_eq!(threads, 2);
    }
}
