use crate::maximum_flow::error::Result;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Fixed set of worker threads that runs a batch of independent units and
/// returns once every unit has finished.
pub(crate) struct WorkerPool {
    pool: ThreadPool,
}

impl WorkerPool {
    // 0 threads picks rayon's default, one per logical core
    pub fn new(num_threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new().num_threads(num_threads).thread_name(|i| format!("push-relabel-{}", i)).build()?;
        Ok(Self { pool })
    }

    #[inline]
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Runs `work` once per unit and waits for all of them.
    ///
    /// Every effect of the batch is visible to the caller when this returns.
    /// The first error stops the remaining units from being started.
    pub fn run<T, W>(&self, units: &[T], work: W) -> Result<()>
    where
        T: Sync,
        W: Fn(&T) -> Result<()> + Sync + Send,
    {
        self.pool.install(|| units.par_iter().try_for_each(|unit| work(unit)))
    }
}
