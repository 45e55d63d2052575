//! Dense spherical-Gaussian weight kernel, precomputed once per
//! (radius, sigma) pair.

use crate::{FilterError, Result};

/// Flattened `(2r+1)^3` Gaussian kernel, normalized to sum to 1.
///
/// Each axis of the kernel is mapped onto `[-1, 1]` before the Gaussian is
/// evaluated, so the kernel always spans the unit ball and `sigma` controls
/// falloff on that fixed scale rather than in voxel units. Entries are laid
/// out x-fastest, then y, then z, matching the neighbor iteration order of
/// [`crate::convolve_at`].
#[derive(Debug, Clone)]
pub struct WeightCache {
    radius: usize,
    sigma: f32,
    weights: Vec<f32>,
}

impl WeightCache {
    /// Build the full kernel for `(radius, sigma)`.
    ///
    /// A non-finite or non-positive sigma is rejected so NaN can never reach
    /// an output buffer. Radius 0 yields the single-entry identity kernel.
    pub fn build(radius: usize, sigma: f32) -> Result<Self> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(FilterError::InvalidSigma(sigma));
        }

        let diameter = 2 * radius + 1;
        let entries = diameter
            .checked_mul(diameter)
            .and_then(|partial| partial.checked_mul(diameter))
            .ok_or_else(|| {
                voxel_core::Error::OutOfMemory(format!(
                    "kernel radius {radius} overflows the address space"
                ))
            })?;
        let mut weights = Vec::new();
        weights.try_reserve_exact(entries).map_err(|e| {
            voxel_core::Error::OutOfMemory(format!("kernel of {entries} weights: {e}"))
        })?;

        if diameter == 1 {
            weights.push(1.0);
            return Ok(Self {
                radius,
                sigma,
                weights,
            });
        }

        let half_extent = (diameter - 1) as f32;
        let falloff = 2.0 * sigma * sigma;
        let mut total = 0.0f32;
        for gz in 0..diameter {
            let norm_z = (gz as f32 / half_extent) * 2.0 - 1.0;
            for gy in 0..diameter {
                let norm_y = (gy as f32 / half_extent) * 2.0 - 1.0;
                for gx in 0..diameter {
                    let norm_x = (gx as f32 / half_extent) * 2.0 - 1.0;
                    let weight =
                        (-(norm_x * norm_x + norm_y * norm_y + norm_z * norm_z) / falloff).exp();
                    weights.push(weight);
                    total += weight;
                }
            }
        }

        if total > 0.0 {
            for weight in &mut weights {
                *weight /= total;
            }
        } else {
            // Unreachable given the sigma guard; degrade to "no filtering"
            // rather than dividing by zero.
            weights.fill(0.0);
            weights[entries / 2] = 1.0;
        }

        Ok(Self {
            radius,
            sigma,
            weights,
        })
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    pub fn diameter(&self) -> usize {
        2 * self.radius + 1
    }

    /// Kernel entries in x-fastest, then y, then z order.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}
