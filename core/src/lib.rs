pub mod buffer;
pub mod grid;
pub mod view;

pub use buffer::*;
pub use grid::*;
pub use view::*;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid output: {0}")]
    InvalidOutput(String),

    #[error("Out of memory: {0}")]
    OutOfMemory(String),
}
