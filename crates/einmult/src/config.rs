//! Execution configuration: strategy selection, thread count, flop counter.

use std::sync::atomic::{AtomicU64, Ordering};

/// Execution strategy for the contraction core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Native blocked-GEMM strategies (the default).
    #[default]
    Blocked,
    /// Materialize operands into contiguous scratch and run one classic GEMM
    /// per batch element.
    BlasBridge,
    /// Plain nested-loop evaluation. Slow; intended as the correctness
    /// yardstick for the other strategies.
    Reference,
}

/// Explicit handle carrying everything a contraction call needs besides its
/// operands. Cheap to construct; callers typically keep one per component.
#[derive(Debug, Default)]
pub struct Config {
    backend: Backend,
    num_threads: Option<usize>,
    flops: AtomicU64,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the execution strategy.
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Override the thread count. Zero is treated as one.
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads.max(1));
        self
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Thread count for the next contraction call: explicit override, then
    /// the `EINMULT_NUM_THREADS` / `OMP_NUM_THREADS` environment variables,
    /// then the hardware parallelism.
    pub fn num_threads(&self) -> usize {
        if let Some(n) = self.num_threads {
            return n;
        }
        for key in ["EINMULT_NUM_THREADS", "OMP_NUM_THREADS"] {
            if let Ok(value) = std::env::var(key) {
                if let Ok(n) = value.trim().parse::<usize>() {
                    if n > 0 {
                        return n;
                    }
                }
            }
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    /// Floating-point operations counted so far (2·m·n·k·batch per GEMM-class
    /// contraction, incremented by the gang master).
    pub fn flops(&self) -> u64 {
        self.flops.load(Ordering::Relaxed)
    }

    /// Reset the flop counter to zero.
    pub fn reset_flops(&self) {
        self.flops.store(0, Ordering::Relaxed);
    }

    pub(crate) fn add_flops(&self, n: u64) {
        self.flops.fetch_add(n, Ordering::Relaxed);
    }
}
