//! Worker pool configuration.
//!
//! Parallel kernels never touch rayon's global pool. Callers build a pool once
//! and pass it to every `*_par` call.
//!
//! ```rust
//! use simdmath::PoolConfig;
//!
//! let pool = PoolConfig::default()
//!     .num_threads(4)
//!     .thread_name_prefix("kernel")
//!     .try_spawn()
//!     .unwrap();
//! assert_eq!(pool.current_num_threads(), 4);
//! ```

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{KernelError, Result};

/// Builder for the [`ThreadPool`] the parallel kernels run on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolConfig {
    num_threads: Option<usize>,
    thread_name_prefix: Option<String>,
    stack_size: Option<usize>,
}

impl PoolConfig {
    /// A pool with exactly one worker, for reproducible runs.
    pub fn single_worker() -> Self {
        Self::default().num_threads(1)
    }

    /// Number of workers. Zero, or leaving it unset, lets rayon pick one per
    /// logical CPU.
    pub fn num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Workers are named `{prefix}-{index}`.
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = Some(prefix.into());
        self
    }

    /// Stack size of each worker, in bytes.
    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Spawns the pool.
    pub fn try_spawn(&self) -> Result<ThreadPool> {
        let mut builder = ThreadPoolBuilder::new();
        if let Some(num_threads) = self.num_threads {
            builder = builder.num_threads(num_threads);
        }
        if let Some(prefix) = self.thread_name_prefix.clone() {
            builder = builder.thread_name(move |index| format!("{prefix}-{index}"));
        }
        if let Some(bytes) = self.stack_size {
            builder = builder.stack_size(bytes);
        }

        let pool = builder.build().map_err(|error| KernelError::PoolUnavailable {
            reason: error.to_string(),
        })?;
        log::debug!("spawned kernel pool with {} worker(s)", pool.current_num_threads());
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_worker_has_one_thread() {
        let pool = PoolConfig::single_worker().try_spawn().unwrap();
        assert_eq!(pool.current_num_threads(), 1);
    }

    #[test]
    fn workers_are_named() {
        let pool = PoolConfig::default()
            .num_threads(2)
            .thread_name_prefix("simdmath")
            .stack_size(4 << 20)
            .try_spawn()
            .unwrap();
        let name = pool.install(|| std::thread::current().name().map(str::to_owned));
        assert!(name.unwrap().starts_with("simdmath-"));
    }

    #[test]
    fn builder_is_plain_data() {
        let config = PoolConfig::default().num_threads(3);
        assert_eq!(config.clone(), config);
        assert_ne!(config, PoolConfig::single_worker());
    }
}
