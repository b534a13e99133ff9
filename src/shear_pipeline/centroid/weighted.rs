//! Iteratively reweighted center of mass.
//!
//! Each pass multiplies the raw image by a unit-amplitude separable Gaussian
//! window centered on the current estimate and takes the center of mass of the
//! product. Bright pixels far from the spot lose their pull after the first
//! pass, so the estimate settles on the dominant blob near the initial guess.

use ndarray::{Array2, ArrayView2};
use tracing::{debug, trace, warn};

use crate::shear_pipeline::centroid::center_of_mass::center_of_mass;
use crate::shear_pipeline::centroid::types::{
    CentroidConfig, CentroidEstimate, NonConvergencePolicy,
};
use crate::shear_pipeline::common::error::{Result, ShearError};
use crate::shear_pipeline::common::types::Centroid;

/// One axis of the weighting window: `exp(-2 (p - centre)² / width²)`.
pub fn gaussian_weight(position: f64, centre: f64, width: f64) -> f64 {
    let d = position - centre;
    (-2.0 * d * d / (width * width)).exp()
}

/// Center of mass of `image` multiplied by a window centered at `centre`.
pub fn weighted_center_of_mass(
    image: &ArrayView2<f64>,
    centre: Centroid,
    width: f64,
) -> Result<Centroid> {
    let (rows, cols) = image.dim();
    let wx: Vec<f64> = (0..cols).map(|c| gaussian_weight(c as f64, centre.x, width)).collect();
    let wy: Vec<f64> = (0..rows).map(|r| gaussian_weight(r as f64, centre.y, width)).collect();

    let weighted = Array2::from_shape_fn((rows, cols), |(r, c)| image[[r, c]] * (wx[c] * wy[r]));

    center_of_mass(&weighted.view()).map_err(|_| {
        ShearError::DegenerateRegion(format!(
            "no intensity left under the weighting window at ({:.2}, {:.2})",
            centre.x, centre.y
        ))
    })
}

/// Refines the plain center of mass until consecutive estimates move by at
/// most `config.end_condition`. At least one reweighting pass always runs.
pub fn iteratively_weighted_center_of_mass(
    image: &ArrayView2<f64>,
    config: &CentroidConfig,
) -> Result<CentroidEstimate> {
    config.validate()?;
    let width = config.weighting_width();

    let mut estimate = center_of_mass(image)?;
    let mut last_step = f64::INFINITY;

    for iteration in 1..=config.max_iterations {
        let next = weighted_center_of_mass(image, estimate, width)?;
        last_step = next.distance(&estimate);
        estimate = next;

        trace!(iteration, step = last_step, x = estimate.x, y = estimate.y, "Reweighted");

        if last_step <= config.end_condition {
            debug!(iterations = iteration, x = estimate.x, y = estimate.y, "Centroid converged");
            return Ok(CentroidEstimate {
                centroid: estimate,
                iterations: iteration,
                converged: true,
            });
        }
    }

    match config.non_convergence {
        NonConvergencePolicy::Fail => Err(ShearError::NotConverged {
            iterations: config.max_iterations,
            last_step,
        }),
        NonConvergencePolicy::BestEffort => {
            warn!(
                iterations = config.max_iterations,
                last_step, "Centroid did not converge, returning last estimate"
            );
            Ok(CentroidEstimate {
                centroid: estimate,
                iterations: config.max_iterations,
                converged: false,
            })
        }
    }
}
