//! Static fork-join partitioning of a grid's outer axis.
//!
//! Workers are fresh OS threads per call, joined before `run` returns; the
//! caller observes a plain synchronous call. Each worker receives one
//! contiguous z-range and must only touch output voxels inside it, which is
//! what lets the convolution pass write without any locking.

use std::ops::Range;
use std::thread;

/// Partition `[0, extent)` into `workers` contiguous, disjoint ranges.
///
/// `base = extent / workers` slices per worker, with the remainder handed to
/// the earliest workers one slice each. Trailing ranges may be empty when
/// `extent < workers`.
pub fn slice_ranges(extent: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let base = extent / workers;
    let remainder = extent % workers;
    (0..workers)
        .map(|i| {
            let start = i * base + i.min(remainder);
            let len = base + usize::from(i < remainder);
            start..start + len
        })
        .collect()
}

/// Fork-join scheduler over the outer (z) axis of a voxel grid.
#[derive(Debug, Clone)]
pub struct SliceScheduler {
    workers: usize,
    #[cfg(test)]
    spawn_cap: Option<usize>,
}

impl SliceScheduler {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            #[cfg(test)]
            spawn_cap: None,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `work` over `[0, extent)`, fanned out across this scheduler's
    /// workers.
    ///
    /// With one worker the closure runs once on the calling thread. Otherwise
    /// one named thread is spawned per non-empty range and all are joined
    /// before returning; a worker panic is propagated after the join. If a
    /// thread cannot be spawned, the already-started workers are joined and
    /// the whole range is rerun sequentially, so the caller never observes a
    /// partially-threaded result.
    pub fn run<F>(&self, extent: usize, work: F)
    where
        F: Fn(Range<usize>) + Sync,
    {
        if self.workers <= 1 || extent <= 1 {
            work(0..extent);
            return;
        }

        let mut spawn_failed = false;
        thread::scope(|scope| {
            let mut started = 0usize;
            for (i, range) in slice_ranges(extent, self.workers)
                .into_iter()
                .filter(|r| !r.is_empty())
                .enumerate()
            {
                if started >= self.spawn_budget() {
                    spawn_failed = true;
                    break;
                }
                let work = &work;
                let spawned = thread::Builder::new()
                    .name(format!("voxel-slice-{i}"))
                    .spawn_scoped(scope, move || work(range));
                match spawned {
                    Ok(_) => started += 1,
                    Err(err) => {
                        tracing::debug!(
                            "worker spawn failed after {started} threads ({err}), \
                             falling back to sequential pass"
                        );
                        spawn_failed = true;
                        break;
                    }
                }
            }
            // Leaving the scope joins every started worker and propagates
            // the first panic.
        });

        if spawn_failed {
            // Workers own disjoint slices, so rerunning the full range
            // deterministically overwrites whatever the partial fan-out wrote.
            work(0..extent);
        }
    }

    #[cfg(test)]
    fn spawn_budget(&self) -> usize {
        self.spawn_cap.unwrap_or(usize::MAX)
    }

    #[cfg(not(test))]
    fn spawn_budget(&self) -> usize {
        usize::MAX
    }
}
