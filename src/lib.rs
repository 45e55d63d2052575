//! Facade over the voxel-processing workspace.
//!
//! Re-exports the buffer model, the fork-join runtime, and the Gaussian
//! filter so hosts can depend on a single crate.

pub use voxel_core::{
    ElementType, GridBuffer, GridLayout, GridView, GridViewMut, RawGrid, SliceWriter,
};
pub use voxel_filter::{BoundaryPolicy, FilterError, GaussianFilter, WeightCache};
pub use voxel_runtime::{slice_ranges, SliceScheduler};

/// Configure the process-wide worker-thread count before the first filter is
/// constructed. See [`voxel_runtime::init_worker_threads`].
pub fn init_worker_threads(num_threads: Option<usize>) -> voxel_runtime::Result<usize> {
    voxel_runtime::init_worker_threads(num_threads)
}
