//! The Gaussian filter operator: parameter state, cache lifecycle, and the
//! fan-out over the output grid.

use voxel_core::{ElementType, GridView, GridViewMut, RawGrid};
use voxel_runtime::SliceScheduler;

use crate::{convolve_at, BoundaryPolicy, FilterError, Result, WeightCache};

/// 3D Gaussian blur over plane 0 of an `F32` voxel grid.
///
/// A plain constructible value: no registration, no process-wide state. The
/// weight cache is rebuilt synchronously whenever radius or sigma changes,
/// which the `&mut self` setters serialize against `&self::apply` at compile
/// time — the cache can never change under a running pass.
#[derive(Debug, Clone)]
pub struct GaussianFilter {
    weights: WeightCache,
    boundary: BoundaryPolicy,
    worker_threads: usize,
}

impl GaussianFilter {
    pub const DEFAULT_RADIUS: usize = 1;
    pub const DEFAULT_SIGMA: f32 = 1.0;

    /// Filter with default parameters (radius 1, sigma 1.0) and the
    /// process-wide worker-thread count, captured once here.
    pub fn new() -> Result<Self> {
        Ok(Self {
            weights: WeightCache::build(Self::DEFAULT_RADIUS, Self::DEFAULT_SIGMA)?,
            boundary: BoundaryPolicy::default(),
            worker_threads: voxel_runtime::worker_threads(),
        })
    }

    pub fn with_params(mut self, radius: usize, sigma: f32) -> Result<Self> {
        self.weights = WeightCache::build(radius, sigma)?;
        Ok(self)
    }

    pub fn with_boundary_policy(mut self, policy: BoundaryPolicy) -> Self {
        self.boundary = policy;
        self
    }

    pub fn with_worker_threads(mut self, workers: usize) -> Self {
        self.worker_threads = workers.max(1);
        self
    }

    pub fn radius(&self) -> usize {
        self.weights.radius()
    }

    pub fn sigma(&self) -> f32 {
        self.weights.sigma()
    }

    pub fn boundary_policy(&self) -> BoundaryPolicy {
        self.boundary
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    /// Set the kernel half-width, rebuilding the weight cache before
    /// returning. On error the previous cache stays intact.
    pub fn set_radius(&mut self, radius: usize) -> Result<()> {
        self.weights = WeightCache::build(radius, self.weights.sigma())?;
        Ok(())
    }

    /// Set the kernel spread, rebuilding the weight cache before returning.
    /// Non-finite or non-positive sigma is rejected and the previous cache
    /// stays intact.
    pub fn set_sigma(&mut self, sigma: f32) -> Result<()> {
        self.weights = WeightCache::build(self.weights.radius(), sigma)?;
        Ok(())
    }

    /// Blur `input` into `output`, plane 0 only.
    ///
    /// Non-`F32` grids are a defined no-op: the call succeeds and the output
    /// keeps whatever the host put there. A zero extent on any axis likewise
    /// returns without computing. The z-axis is partitioned across a fresh
    /// fork-join pass per call; with one worker everything runs on the
    /// calling thread, and both paths produce bit-identical output.
    pub fn apply(&self, input: &GridView<'_>, output: &mut GridViewMut<'_>) -> Result<()> {
        if input.element() != ElementType::F32 || output.element() != ElementType::F32 {
            return Ok(());
        }
        let dims = input.dims();
        if dims != output.dims() {
            return Err(FilterError::DimensionMismatch(format!(
                "input extents {:?} vs output extents {:?}",
                dims,
                output.dims()
            )));
        }
        if input.layout().is_empty() {
            return Ok(());
        }

        let writer = output.writer();
        let scheduler = SliceScheduler::new(self.worker_threads);
        scheduler.run(dims[2], |z_range| {
            for z in z_range {
                for y in 0..dims[1] {
                    for x in 0..dims[0] {
                        let value = convolve_at(&self.weights, input, x, y, z, self.boundary);
                        // SAFETY: (x, y, z) is inside the grid, the output is
                        // F32, and workers own disjoint z-ranges.
                        unsafe { writer.write(x, y, z, value) };
                    }
                }
            }
        });
        Ok(())
    }

    /// Host entry point over raw descriptor/pointer pairs.
    ///
    /// # Safety
    ///
    /// Non-null data pointers must address memory covering their layouts,
    /// with `output` exclusively borrowed, for the duration of the call.
    pub unsafe fn apply_raw(&self, input: &RawGrid, output: &mut RawGrid) -> Result<()> {
        let input_view = input
            .view()
            .ok_or_else(|| voxel_core::Error::InvalidInput("input grid has no data".into()))?;
        let mut output_view = output
            .view_mut()
            .ok_or_else(|| voxel_core::Error::InvalidOutput("output grid has no data".into()))?;
        self.apply(&input_view, &mut output_view)
    }
}
