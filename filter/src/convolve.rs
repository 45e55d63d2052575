//! Per-voxel convolution against a precomputed weight kernel.

use voxel_core::{ElementType, GridView};

use crate::WeightCache;

/// How edge voxels account for neighbors that fall outside the grid.
///
/// Out-of-bounds neighbors never contribute a sample; the policies differ
/// only in whether the missing weight is compensated for. The policy is a
/// fixed property of the filter and never varies with the worker count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryPolicy {
    /// Divide by the in-bounds weight total, so edge voxels are unbiased
    /// averages over the neighborhood that actually exists.
    #[default]
    Renormalized,
    /// Return the raw weighted sum; edge voxels are attenuated because
    /// missing neighbors are not compensated for.
    Unnormalized,
}

/// Weighted average of the neighborhood around `(x, y, z)`, plane 0.
///
/// Neighbors are visited x-fastest, then y, then z, the order the cache was
/// built in, so weight `i` always pairs with the i-th neighbor offset no
/// matter where the kernel is centered. In-bounds tests are three per-axis
/// clamped ranges computed once per call. Pure and side-effect free: safe to
/// call concurrently from any number of workers over the same read-only view
/// and cache.
///
/// Returns 0.0 for a non-`F32` view or a center outside the grid; callers
/// validate both up front.
pub fn convolve_at(
    cache: &WeightCache,
    input: &GridView<'_>,
    x: usize,
    y: usize,
    z: usize,
    policy: BoundaryPolicy,
) -> f32 {
    let dims = input.dims();
    if input.element() != ElementType::F32 || !input.layout().contains(x, y, z) {
        return 0.0;
    }

    let radius = cache.radius() as isize;
    let weights = cache.weights();
    let (x, y, z) = (x as isize, y as isize, z as isize);

    // Per-axis valid bounds, clamped to the grid.
    let x_lo = (x - radius).max(0);
    let x_hi = (x + radius).min(dims[0] as isize - 1);
    let y_lo = (y - radius).max(0);
    let y_hi = (y + radius).min(dims[1] as isize - 1);
    let z_lo = (z - radius).max(0);
    let z_hi = (z + radius).min(dims[2] as isize - 1);

    let mut sum = 0.0f32;
    let mut total = 0.0f32;
    let mut weight_idx = 0usize;

    for nz in (z - radius)..=(z + radius) {
        let z_in = nz >= z_lo && nz <= z_hi;
        for ny in (y - radius)..=(y + radius) {
            let yz_in = z_in && ny >= y_lo && ny <= y_hi;
            for nx in (x - radius)..=(x + radius) {
                let weight = weights[weight_idx];
                weight_idx += 1;
                if yz_in && nx >= x_lo && nx <= x_hi {
                    // SAFETY: the clamped per-axis bounds keep the neighbor
                    // inside the grid, and the view was checked to be F32.
                    let sample =
                        unsafe { input.sample_unchecked(nx as usize, ny as usize, nz as usize) };
                    sum += sample * weight;
                    total += weight;
                }
            }
        }
    }

    match policy {
        BoundaryPolicy::Renormalized => {
            if total > 0.0 {
                sum / total
            } else {
                0.0
            }
        }
        BoundaryPolicy::Unnormalized => sum,
    }
}
