//! Centroid estimator settings and results

use crate::shear_pipeline::common::error::{Result, ShearError};
use crate::shear_pipeline::common::types::Centroid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CentroidMode {
    /// Single pass intensity-weighted mean position
    CenterOfMass,
    /// Center of mass refined under a Gaussian window until it settles
    #[default]
    IterativelyWeighted,
}

/// What to do when the reweighted estimator reaches `max_iterations`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonConvergencePolicy {
    /// Fail with `ShearError::NotConverged`
    #[default]
    Fail,
    /// Return the last estimate flagged as not converged
    BestEffort,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CentroidConfig {
    pub mode: CentroidMode,
    /// Nominal spot FWHM in samples; the weighting window is three times wider
    pub spot_fwhm: f64,
    /// Largest step between iterations accepted as converged, in samples
    pub end_condition: f64,
    pub max_iterations: usize,
    pub non_convergence: NonConvergencePolicy,
}

impl Default for CentroidConfig {
    fn default() -> Self {
        Self {
            mode: CentroidMode::IterativelyWeighted,
            spot_fwhm: 50.0,
            end_condition: 0.01,
            max_iterations: 100,
            non_convergence: NonConvergencePolicy::Fail,
        }
    }
}

impl CentroidConfig {
    /// 1/e² radius of the weighting window.
    pub fn weighting_width(&self) -> f64 {
        3.0 * self.spot_fwhm
    }

    pub fn validate(&self) -> Result<()> {
        if !self.spot_fwhm.is_finite() || self.spot_fwhm <= 0.0 {
            return Err(ShearError::InvalidConfig(format!(
                "spot FWHM must be positive, got {}",
                self.spot_fwhm
            )));
        }
        if !self.end_condition.is_finite() || self.end_condition < 0.0 {
            return Err(ShearError::InvalidConfig(format!(
                "end condition must be non-negative, got {}",
                self.end_condition
            )));
        }
        if self.max_iterations == 0 {
            return Err(ShearError::InvalidConfig(
                "max iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CentroidEstimate {
    pub centroid: Centroid,
    /// Reweighting passes performed; zero for the plain center of mass
    pub iterations: usize,
    pub converged: bool,
}
