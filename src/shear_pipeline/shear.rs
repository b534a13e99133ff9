//! Two-spot shear measurement on a reduced frame.

use std::time::SystemTime;

use ndarray::Array2;
use tracing::{debug, info, instrument};

use crate::shear_pipeline::centroid::{estimate_centroid, CentroidEstimate};
use crate::shear_pipeline::common::error::{Result, ShearError};
use crate::shear_pipeline::common::types::{Roi, ShearVector};
use crate::shear_pipeline::config::ShearConfig;
use crate::shear_pipeline::region::{background_level, extract_region};

/// Spot positions found in one frame, in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionCentroids {
    pub timestamp: SystemTime,
    pub box_1: CentroidEstimate,
    pub box_2: CentroidEstimate,
}

impl RegionCentroids {
    pub fn shear(&self) -> ShearVector {
        ShearVector::between(self.box_1.centroid, self.box_2.centroid)
    }
}

#[derive(Debug, Clone)]
pub struct ShearCalculator {
    config: ShearConfig,
}

impl ShearCalculator {
    pub fn new(config: ShearConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ShearConfig {
        &self.config
    }

    #[instrument(skip(self, frame), fields(rows = frame.nrows(), cols = frame.ncols()))]
    pub fn locate_spots(&self, frame: &Array2<f64>) -> Result<RegionCentroids> {
        let background = {
            let _span = tracing::info_span!("background_level").entered();
            background_level(frame, &self.config.background_patch)?
        };
        debug!(background, "Background level from calibration patch");

        let box_1 = &self.config.box_1;
        let box_2 = &self.config.box_2;

        let (box_1, box_2) = if self.config.parallel_regions {
            rayon::join(
                || self.locate_in(frame, 1, box_1, background),
                || self.locate_in(frame, 2, box_2, background),
            )
        } else {
            (
                self.locate_in(frame, 1, box_1, background),
                self.locate_in(frame, 2, box_2, background),
            )
        };

        let centroids = RegionCentroids {
            timestamp: SystemTime::now(),
            box_1: box_1?,
            box_2: box_2?,
        };

        info!(
            box_1_x = centroids.box_1.centroid.x,
            box_1_y = centroids.box_1.centroid.y,
            box_2_x = centroids.box_2.centroid.x,
            box_2_y = centroids.box_2.centroid.y,
            "Spots located"
        );
        Ok(centroids)
    }

    pub fn shear(&self, frame: &Array2<f64>) -> Result<ShearVector> {
        Ok(self.locate_spots(frame)?.shear())
    }

    fn locate_in(
        &self,
        frame: &Array2<f64>,
        index: usize,
        roi: &Roi,
        background: f64,
    ) -> Result<CentroidEstimate> {
        let _span = tracing::info_span!("locate_spot", index, roi = %roi).entered();

        let region = extract_region(frame, roi, background)?;
        let mut estimate =
            estimate_centroid(&region.view(), &self.config.centroid).map_err(|e| match e {
                ShearError::DegenerateRegion(msg) => {
                    ShearError::DegenerateRegion(format!("box {index} ({roi}): {msg}"))
                }
                other => other,
            })?;

        estimate.centroid = roi.to_global(estimate.centroid);
        Ok(estimate)
    }
}
