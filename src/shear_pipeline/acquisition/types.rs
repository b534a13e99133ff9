//! Acquisition settings

use std::time::Duration;

use crate::shear_pipeline::common::error::{Result, ShearError};

/// How the device buffers frames while a burst is retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrabStrategy {
    /// Drop stale frames and always hand out the newest one
    #[default]
    LatestImageOnly,
    /// Deliver every frame in capture order
    OneByOne,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionSettings {
    pub exposure_ms: f64,
    pub frame_rate_hz: f64,
    /// Frames averaged per measurement
    pub burst_size: usize,
    /// Driver-side frame buffers
    pub buffer_count: usize,
    pub strategy: GrabStrategy,
    /// Retrieval timeout in frame periods of the reported frame rate
    pub timeout_frame_periods: f64,
    /// Settling delay between opening the device and the first retrieval
    pub warmup: Duration,
}

impl Default for AcquisitionSettings {
    fn default() -> Self {
        Self {
            exposure_ms: 1.0,
            frame_rate_hz: 30.0,
            burst_size: 30,
            buffer_count: 80,
            strategy: GrabStrategy::LatestImageOnly,
            timeout_frame_periods: 5.0,
            warmup: Duration::from_secs(1),
        }
    }
}

impl AcquisitionSettings {
    /// Same settings with the per-call exposure and frame rate.
    pub fn with_exposure(&self, exposure_ms: f64, frame_rate_hz: f64) -> Self {
        Self {
            exposure_ms,
            frame_rate_hz,
            ..self.clone()
        }
    }

    /// Retrieval timeout derived from the frame rate the device reports.
    pub fn frame_timeout(&self, reported_frame_rate_hz: f64) -> Result<Duration> {
        if !reported_frame_rate_hz.is_finite() || reported_frame_rate_hz <= 0.0 {
            return Err(ShearError::InvalidConfig(format!(
                "device reports unusable frame rate {reported_frame_rate_hz} Hz"
            )));
        }
        let seconds = self.timeout_frame_periods / reported_frame_rate_hz;
        Duration::try_from_secs_f64(seconds).map_err(|e| {
            ShearError::InvalidConfig(format!(
                "frame rate {reported_frame_rate_hz} Hz gives unusable timeout {seconds} s: {e}"
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !self.exposure_ms.is_finite() || self.exposure_ms <= 0.0 {
            return Err(ShearError::InvalidConfig(format!(
                "exposure must be positive, got {} ms",
                self.exposure_ms
            )));
        }
        if !self.frame_rate_hz.is_finite() || self.frame_rate_hz <= 0.0 {
            return Err(ShearError::InvalidConfig(format!(
                "frame rate must be positive, got {} Hz",
                self.frame_rate_hz
            )));
        }
        if !self.timeout_frame_periods.is_finite() || self.timeout_frame_periods <= 0.0 {
            return Err(ShearError::InvalidConfig(format!(
                "timeout must span a positive number of frame periods, got {}",
                self.timeout_frame_periods
            )));
        }
        if self.buffer_count == 0 {
            return Err(ShearError::InvalidConfig(
                "at least one frame buffer is required".to_string(),
            ));
        }
        Ok(())
    }
}
