//! Thread hint for candidate scoring.
//!
//! A [`Parallelism`] travels with the suggester and the worker. The worker
//! turns it into a dedicated rayon pool once, and each ranking decides per
//! call whether its candidate list is long enough to fan out.

use serde::{Deserialize, Serialize};

/// How many threads candidate scoring may use.
///
/// Each candidate split is one unit of work, so a ranking with fewer than
/// two candidates always runs on the calling thread.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parallelism {
    /// Score candidates one after another on the calling thread.
    #[default]
    Sequential,
    /// Score candidates on up to `n` threads. `Parallel(0)` and
    /// `Parallel(1)` behave like `Sequential`.
    Parallel(usize),
}

impl Parallelism {
    /// Hint for a thread count; `0` means every thread rayon has.
    pub fn threads(n: usize) -> Self {
        let n = if n == 0 { rayon::current_num_threads() } else { n };
        if n > 1 {
            Self::Parallel(n)
        } else {
            Self::Sequential
        }
    }

    /// Threads this hint allows, at least one.
    #[inline]
    pub fn thread_count(self) -> usize {
        match self {
            Self::Sequential => 1,
            Self::Parallel(n) => n.max(1),
        }
    }

    /// Whether ranking `n_candidates` features should use `par_iter`.
    #[inline]
    pub fn fans_out(self, n_candidates: usize) -> bool {
        self.thread_count().min(n_candidates) > 1
    }

    /// Pool the worker installs around each request.
    ///
    /// `None` means score on the worker thread itself, either because the
    /// hint is sequential or because rayon could not start the threads.
    pub fn scoring_pool(self) -> Option<rayon::ThreadPool> {
        let n_threads = self.thread_count();
        if n_threads <= 1 {
            return None;
        }
        match rayon::ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .thread_name(|i| format!("featuretree-score-{i}"))
            .build()
        {
            Ok(pool) => Some(pool),
            Err(e) => {
                tracing::warn!(error = %e, n_threads, "scoring pool unavailable, scoring sequentially");
                None
            }
        }
    }
}
