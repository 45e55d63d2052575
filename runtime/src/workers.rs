use std::env;
use std::sync::OnceLock;

use crate::{Error, Result};

static WORKER_THREADS: OnceLock<Result<usize>> = OnceLock::new();

/// Resolve the worker-thread count used by CPU-parallel operator passes.
///
/// Priority:
/// 1. `num_threads` argument
/// 2. `VOXEL_CPU_THREADS` environment variable
/// 3. `std::thread::available_parallelism()`
///
/// The count is resolved once per process; the first call wins and later
/// calls return the cached value regardless of their argument.
pub fn init_worker_threads(num_threads: Option<usize>) -> Result<usize> {
    WORKER_THREADS
        .get_or_init(|| {
            let configured = match num_threads {
                Some(n) => Some(n),
                None => read_cpu_threads_from_env()?,
            };
            match configured {
                Some(0) => Err(Error::Config("worker thread count must be >= 1".into())),
                Some(n) => Ok(n),
                None => Ok(detected_parallelism()),
            }
        })
        .clone()
}

/// Worker-thread count for the current process, resolving it on first use.
pub fn worker_threads() -> usize {
    // A configuration error degrades to single-threaded operation rather
    // than failing an operator call that never asked for explicit setup.
    init_worker_threads(None).unwrap_or(1)
}

fn detected_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn read_cpu_threads_from_env() -> Result<Option<usize>> {
    let raw = match env::var("VOXEL_CPU_THREADS") {
        Ok(v) => v,
        Err(env::VarError::NotPresent) => return Ok(None),
        Err(e) => {
            return Err(Error::Config(format!(
                "failed to read VOXEL_CPU_THREADS: {e}"
            )))
        }
    };

    let parsed: usize = raw.parse().map_err(|_| {
        Error::Config(format!(
            "VOXEL_CPU_THREADS must be a positive integer, got '{raw}'"
        ))
    })?;
    if parsed == 0 {
        return Err(Error::Config("VOXEL_CPU_THREADS must be >= 1".into()));
    }
    Ok(Some(parsed))
}
