pub mod scheduler;
pub mod workers;

pub use scheduler::{slice_ranges, SliceScheduler};
pub use workers::{init_worker_threads, worker_threads};

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
