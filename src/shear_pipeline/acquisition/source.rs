use std::time::Duration;

use ndarray::Array2;

use crate::shear_pipeline::acquisition::types::AcquisitionSettings;
use crate::shear_pipeline::common::error::Result;

/// Device that delivers raw frames.
///
/// Implementations report `ShearError::DeviceNotConnected` when the device is
/// absent and `ShearError::CaptureTimeout` when no frame arrives in time.
pub trait AcquisitionSource {
    fn open(&mut self) -> Result<()>;

    /// Applies exposure, frame rate, buffering and grab strategy. Called on an open device.
    fn configure(&mut self, settings: &AcquisitionSettings) -> Result<()>;

    /// Blocks until the next frame arrives or `timeout` elapses.
    fn retrieve_frame(&mut self, timeout: Duration) -> Result<Array2<u16>>;

    fn close(&mut self) -> Result<()>;

    /// Frame rate currently in effect, which may differ from the requested one.
    fn frame_rate_hz(&self) -> f64;

    fn exposure_ms(&self) -> f64;
}
