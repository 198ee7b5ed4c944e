use crate::error::MergeResult;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// How per-customer work is scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExecMode {
    Sequential,
    /// Run on a dedicated rayon pool; `threads` defaults to the CPU count.
    Parallel { threads: Option<usize> },
}

impl Default for ExecMode {
    fn default() -> Self {
        Self::Parallel { threads: None }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Runner {
    pub mode: ExecMode,
}

impl Runner {
    #[must_use]
    pub const fn new(mode: ExecMode) -> Self {
        Self { mode }
    }

    #[must_use]
    pub const fn sequential() -> Self {
        Self::new(ExecMode::Sequential)
    }

    #[must_use]
    pub const fn parallel(threads: Option<usize>) -> Self {
        Self::new(ExecMode::Parallel { threads })
    }

    /// Apply `f` to every item and return the results in input order.
    ///
    /// The parallel path collects through an indexed iterator, so its output
    /// is identical to the sequential one. The first error wins; remaining
    /// items may or may not have been processed.
    ///
    /// # Errors
    /// Any error returned by `f`, or a failure to build the thread pool.
    pub fn map_ordered<I, O, F>(&self, items: &[I], f: F) -> MergeResult<Vec<O>>
    where
        I: Sync,
        O: Send,
        F: Fn(&I) -> MergeResult<O> + Sync + Send,
    {
        match self.mode {
            ExecMode::Sequential => items.iter().map(f).collect(),
            ExecMode::Parallel { threads } => {
                let threads = threads.unwrap_or_else(num_cpus::get).max(1);
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("offer-merge-{i}"))
                    .build()?;
                pool.install(|| items.par_iter().map(f).collect())
            }
        }
    }
}
