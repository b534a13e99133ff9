//! Synthetic frames and a scripted camera for tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use ndarray::Array2;

use crate::shear_pipeline::acquisition::{AcquisitionSettings, AcquisitionSource};
use crate::shear_pipeline::common::error::{Result, ShearError};

/// Adds `amplitude * exp(-2(x-x0)²/w²) * exp(-2(y-y0)²/w²)` to `frame`.
pub fn add_gaussian(frame: &mut Array2<f64>, x0: f64, y0: f64, amplitude: f64, width: f64) {
    for ((row, col), sample) in frame.indexed_iter_mut() {
        let dx = col as f64 - x0;
        let dy = row as f64 - y0;
        *sample += amplitude
            * (-2.0 * dx * dx / (width * width)).exp()
            * (-2.0 * dy * dy / (width * width)).exp();
    }
}

pub fn gaussian_frame(
    rows: usize,
    cols: usize,
    x0: f64,
    y0: f64,
    amplitude: f64,
    width: f64,
) -> Array2<f64> {
    let mut frame = Array2::zeros((rows, cols));
    add_gaussian(&mut frame, x0, y0, amplitude, width);
    frame
}

/// Two spots of amplitude 100, width 10 at (100, 100) and (700, 700) on a 1000x1000 frame.
pub fn two_spot_frame() -> Array2<f64> {
    let mut frame = gaussian_frame(1000, 1000, 100.0, 100.0, 100.0, 10.0);
    add_gaussian(&mut frame, 700.0, 700.0, 100.0, 10.0);
    frame
}

/// Quantizes a float frame into u16 samples.
pub fn to_raw(frame: &Array2<f64>) -> Array2<u16> {
    frame.mapv(|v| v.round().clamp(0.0, u16::MAX as f64) as u16)
}

/// Calls observed by a `MockCamera`, shared so tests can inspect it after
/// the camera has been moved elsewhere.
#[derive(Debug, Default)]
pub struct CameraLog {
    pub opens: usize,
    pub closes: usize,
    pub retrieved: usize,
    pub configured: Vec<AcquisitionSettings>,
    pub timeouts: Vec<Duration>,
}

pub struct MockCamera {
    frames: Vec<Array2<u16>>,
    pub connected: bool,
    /// Time out once this many frames have been delivered in one session
    pub timeout_after: Option<usize>,
    /// Frame rate the device claims regardless of what was requested
    pub reported_frame_rate_hz: Option<f64>,
    /// Report a failure from close after releasing the device
    pub close_fails: bool,
    frame_rate_hz: f64,
    exposure_ms: f64,
    is_open: bool,
    delivered: usize,
    pub log: Arc<Mutex<CameraLog>>,
}

impl MockCamera {
    pub fn new(frames: Vec<Array2<u16>>) -> Self {
        Self {
            frames,
            connected: true,
            timeout_after: None,
            reported_frame_rate_hz: None,
            close_fails: false,
            frame_rate_hz: 30.0,
            exposure_ms: 1.0,
            is_open: false,
            delivered: 0,
            log: Arc::new(Mutex::new(CameraLog::default())),
        }
    }
}

impl AcquisitionSource for MockCamera {
    fn open(&mut self) -> Result<()> {
        if !self.connected {
            return Err(ShearError::DeviceNotConnected("mock camera unplugged".to_string()));
        }
        assert!(!self.is_open, "device opened while already open");
        self.is_open = true;
        self.delivered = 0;
        self.log.lock().unwrap().opens += 1;
        Ok(())
    }

    fn configure(&mut self, settings: &AcquisitionSettings) -> Result<()> {
        self.exposure_ms = settings.exposure_ms;
        self.frame_rate_hz = settings.frame_rate_hz;
        self.log.lock().unwrap().configured.push(settings.clone());
        Ok(())
    }

    fn retrieve_frame(&mut self, timeout: Duration) -> Result<Array2<u16>> {
        assert!(self.is_open, "retrieve_frame on a closed device");
        self.log.lock().unwrap().timeouts.push(timeout);

        if self.timeout_after.is_some_and(|n| self.delivered >= n) || self.frames.is_empty() {
            return Err(ShearError::CaptureTimeout {
                timeout_ms: timeout.as_millis() as u64,
            });
        }

        let frame = self.frames[self.delivered % self.frames.len()].clone();
        self.delivered += 1;
        self.log.lock().unwrap().retrieved += 1;
        Ok(frame)
    }

    fn close(&mut self) -> Result<()> {
        self.is_open = false;
        self.log.lock().unwrap().closes += 1;
        if self.close_fails {
            return Err(ShearError::CaptureFailed(
                "mock camera failed to close".to_string(),
            ));
        }
        Ok(())
    }

    fn frame_rate_hz(&self) -> f64 {
        self.reported_frame_rate_hz.unwrap_or(self.frame_rate_hz)
    }

    fn exposure_ms(&self) -> f64 {
        self.exposure_ms
    }
}
