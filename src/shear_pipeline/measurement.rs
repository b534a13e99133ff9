//! Measurement façade
//!
//! `ShearMeter` is the object a remote-call layer exposes. Each operation runs
//! the whole capture, reduce, locate sequence synchronously and either returns
//! a complete result or an error; nothing partial is ever returned and failed
//! captures are not retried.

#[cfg(test)]
mod tests;

use std::sync::Mutex;
use std::time::SystemTime;

use ndarray::Array2;
use tracing::{info, instrument};

use crate::shear_pipeline::acquisition::{grab_burst, AcquisitionSource};
use crate::shear_pipeline::centroid::CentroidEstimate;
use crate::shear_pipeline::common::error::{Result, ShearError};
use crate::shear_pipeline::common::types::ShearVector;
use crate::shear_pipeline::config::MeterConfig;
use crate::shear_pipeline::reduce::FrameReducer;
use crate::shear_pipeline::reference::ReferenceFrameStore;
use crate::shear_pipeline::shear::{RegionCentroids, ShearCalculator};

/// Complete record of one shear measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShearMeasurement {
    pub timestamp: SystemTime,
    pub box_1: CentroidEstimate,
    pub box_2: CentroidEstimate,
    pub shear: ShearVector,
}

impl From<RegionCentroids> for ShearMeasurement {
    fn from(spots: RegionCentroids) -> Self {
        Self {
            timestamp: spots.timestamp,
            box_1: spots.box_1,
            box_2: spots.box_2,
            shear: spots.shear(),
        }
    }
}

pub struct ShearMeter<S: AcquisitionSource> {
    // one caller at a time holds the device
    source: Mutex<S>,
    dark: Array2<f64>,
    reducer: FrameReducer,
    calculator: ShearCalculator,
    config: MeterConfig,
}

impl<S: AcquisitionSource> ShearMeter<S> {
    /// Validates `config` and loads the dark frame once up front.
    pub fn new(source: S, store: &dyn ReferenceFrameStore, config: MeterConfig) -> Result<Self> {
        config.validate()?;
        let dark = store.load_dark()?;
        let calculator = ShearCalculator::new(config.shear.clone())?;

        info!(
            dark_rows = dark.nrows(),
            dark_cols = dark.ncols(),
            box_1 = %config.shear.box_1,
            box_2 = %config.shear.box_2,
            "Shear meter ready"
        );

        Ok(Self {
            source: Mutex::new(source),
            dark,
            reducer: FrameReducer::new(config.bit_depth),
            calculator,
            config,
        })
    }

    /// Captures a burst and returns the dark-corrected mean frame.
    #[instrument(skip(self))]
    pub fn grab_frame(&self, exposure_ms: f64, framerate_hz: f64) -> Result<Array2<f64>> {
        let settings = self.config.acquisition.with_exposure(exposure_ms, framerate_hz);

        let burst = {
            let _span = tracing::info_span!("acquire_burst").entered();
            let mut source = self
                .source
                .lock()
                .map_err(|_| {
                    ShearError::CaptureFailed("acquisition device lock poisoned".to_string())
                })?;
            grab_burst(&mut *source, &settings)?
        };

        let _span = tracing::info_span!("reduce_burst").entered();
        self.reducer.reduce(&burst, &self.dark)
    }

    /// Captures a frame and locates both spots.
    #[instrument(skip(self))]
    pub fn measure(&self, exposure_ms: f64, framerate_hz: f64) -> Result<ShearMeasurement> {
        let frame = self.grab_frame(exposure_ms, framerate_hz)?;
        let measurement = self.measure_frame(&frame)?;

        info!(
            dx = measurement.shear.dx,
            dy = measurement.shear.dy,
            "Shear measured"
        );
        Ok(measurement)
    }

    pub fn get_shear(&self, exposure_ms: f64, framerate_hz: f64) -> Result<ShearVector> {
        Ok(self.measure(exposure_ms, framerate_hz)?.shear)
    }

    /// Locates both spots in an already reduced frame without capturing.
    pub fn measure_frame(&self, frame: &Array2<f64>) -> Result<ShearMeasurement> {
        Ok(self.calculator.locate_spots(frame)?.into())
    }

    pub fn shear_of_frame(&self, frame: &Array2<f64>) -> Result<ShearVector> {
        self.calculator.shear(frame)
    }

    pub fn config(&self) -> &MeterConfig {
        &self.config
    }

    pub fn dark_frame(&self) -> &Array2<f64> {
        &self.dark
    }
}
