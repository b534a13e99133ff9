//! Measurement configuration
//!
//! Calibration constants (regions, spot width, convergence threshold, bit
//! depth) are always passed in explicitly through these types.

use std::time::Duration;

use crate::shear_pipeline::acquisition::{AcquisitionSettings, GrabStrategy};
use crate::shear_pipeline::centroid::{CentroidConfig, CentroidMode, NonConvergencePolicy};
use crate::shear_pipeline::common::error::{Result, ShearError};
use crate::shear_pipeline::common::types::Roi;
use crate::shear_pipeline::reduce::BitDepthScale;
use crate::shear_pipeline::region::BackgroundPatch;

/// Region and centroid settings for the shear calculator.
#[derive(Debug, Clone, PartialEq)]
pub struct ShearConfig {
    pub box_1: Roi,
    pub box_2: Roi,
    /// Signal-free corner shared by both regions for background removal
    pub background_patch: BackgroundPatch,
    pub centroid: CentroidConfig,
    /// Evaluate the two regions on the rayon pool instead of one after the other
    pub parallel_regions: bool,
}

impl Default for ShearConfig {
    fn default() -> Self {
        Self {
            box_1: Roi::new(0, 500, 0, 500),
            box_2: Roi::new(600, 1000, 600, 1000),
            background_patch: BackgroundPatch::default(),
            centroid: CentroidConfig::default(),
            parallel_regions: false,
        }
    }
}

impl ShearConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, roi) in [("box 1", &self.box_1), ("box 2", &self.box_2)] {
            if roi.is_empty() {
                return Err(ShearError::InvalidConfig(format!("{name} region {roi} is empty")));
            }
        }
        if self.background_patch.rows == 0 || self.background_patch.cols == 0 {
            return Err(ShearError::InvalidConfig(
                "background patch must not be empty".to_string(),
            ));
        }
        self.centroid.validate()
    }
}

/// Everything the measurement façade needs besides its collaborators.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeterConfig {
    pub acquisition: AcquisitionSettings,
    pub bit_depth: BitDepthScale,
    pub shear: ShearConfig,
}

impl MeterConfig {
    pub fn builder() -> MeterConfigBuilder {
        MeterConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        self.acquisition.validate()?;
        if self.bit_depth.source_bits == 0
            || self.bit_depth.source_bits > 32
            || self.bit_depth.target_bits > 32
        {
            return Err(ShearError::InvalidConfig(format!(
                "unsupported bit depths {} -> {}",
                self.bit_depth.source_bits, self.bit_depth.target_bits
            )));
        }
        self.shear.validate()
    }
}

/// Builder for MeterConfig
#[derive(Default)]
pub struct MeterConfigBuilder {
    box_1: Option<Roi>,
    box_2: Option<Roi>,
    background_patch: Option<BackgroundPatch>,
    centroid_mode: Option<CentroidMode>,
    spot_fwhm: Option<f64>,
    end_condition: Option<f64>,
    max_iterations: Option<usize>,
    non_convergence: Option<NonConvergencePolicy>,
    parallel_regions: Option<bool>,
    bit_depth: Option<BitDepthScale>,
    burst_size: Option<usize>,
    buffer_count: Option<usize>,
    grab_strategy: Option<GrabStrategy>,
    timeout_frame_periods: Option<f64>,
    warmup: Option<Duration>,
}

impl MeterConfigBuilder {
    pub fn box_1(mut self, roi: Roi) -> Self {
        self.box_1 = Some(roi);
        self
    }

    pub fn box_2(mut self, roi: Roi) -> Self {
        self.box_2 = Some(roi);
        self
    }

    pub fn background_patch(mut self, patch: BackgroundPatch) -> Self {
        self.background_patch = Some(patch);
        self
    }

    pub fn centroid_mode(mut self, mode: CentroidMode) -> Self {
        self.centroid_mode = Some(mode);
        self
    }

    pub fn spot_fwhm(mut self, fwhm: f64) -> Self {
        self.spot_fwhm = Some(fwhm);
        self
    }

    pub fn end_condition(mut self, end_condition: f64) -> Self {
        self.end_condition = Some(end_condition);
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    pub fn non_convergence(mut self, policy: NonConvergencePolicy) -> Self {
        self.non_convergence = Some(policy);
        self
    }

    pub fn parallel_regions(mut self, enable: bool) -> Self {
        self.parallel_regions = Some(enable);
        self
    }

    pub fn bit_depth(mut self, scale: BitDepthScale) -> Self {
        self.bit_depth = Some(scale);
        self
    }

    pub fn burst_size(mut self, frames: usize) -> Self {
        self.burst_size = Some(frames);
        self
    }

    pub fn buffer_count(mut self, buffers: usize) -> Self {
        self.buffer_count = Some(buffers);
        self
    }

    pub fn grab_strategy(mut self, strategy: GrabStrategy) -> Self {
        self.grab_strategy = Some(strategy);
        self
    }

    pub fn timeout_frame_periods(mut self, periods: f64) -> Self {
        self.timeout_frame_periods = Some(periods);
        self
    }

    pub fn warmup(mut self, warmup: Duration) -> Self {
        self.warmup = Some(warmup);
        self
    }

    pub fn build(self) -> MeterConfig {
        let default = MeterConfig::default();
        let acquisition = default.acquisition;
        let shear = default.shear;
        let centroid = shear.centroid;

        MeterConfig {
            acquisition: AcquisitionSettings {
                burst_size: self.burst_size.unwrap_or(acquisition.burst_size),
                buffer_count: self.buffer_count.unwrap_or(acquisition.buffer_count),
                strategy: self.grab_strategy.unwrap_or(acquisition.strategy),
                timeout_frame_periods: self
                    .timeout_frame_periods
                    .unwrap_or(acquisition.timeout_frame_periods),
                warmup: self.warmup.unwrap_or(acquisition.warmup),
                ..acquisition
            },
            bit_depth: self.bit_depth.unwrap_or(default.bit_depth),
            shear: ShearConfig {
                box_1: self.box_1.unwrap_or(shear.box_1),
                box_2: self.box_2.unwrap_or(shear.box_2),
                background_patch: self.background_patch.unwrap_or(shear.background_patch),
                centroid: CentroidConfig {
                    mode: self.centroid_mode.unwrap_or(centroid.mode),
                    spot_fwhm: self.spot_fwhm.unwrap_or(centroid.spot_fwhm),
                    end_condition: self.end_condition.unwrap_or(centroid.end_condition),
                    max_iterations: self.max_iterations.unwrap_or(centroid.max_iterations),
                    non_convergence: self.non_convergence.unwrap_or(centroid.non_convergence),
                },
                parallel_regions: self.parallel_regions.unwrap_or(shear.parallel_regions),
            },
        }
    }
}
