pub mod convolve;
pub mod gaussian;
pub mod weights;

pub use convolve::{convolve_at, BoundaryPolicy};
pub use gaussian::GaussianFilter;
pub use weights::WeightCache;

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("Invalid sigma: {0} (must be finite and > 0)")]
    InvalidSigma(f32),

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error(transparent)]
    Core(#[from] voxel_core::Error),
}

pub type Result<T> = std::result::Result<T, FilterError>;
