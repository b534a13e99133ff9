//! Replays recorded frames as if they came from a camera.

use std::path::PathBuf;
use std::time::Duration;

use ndarray::Array2;
use tracing::{debug, info};

use crate::shear_pipeline::acquisition::source::AcquisitionSource;
use crate::shear_pipeline::acquisition::types::AcquisitionSettings;
use crate::shear_pipeline::common::error::{Result, ShearError};
use crate::shear_pipeline::tiff_io::load_gray_tiff_u16;

/// Hands out a fixed list of 8/16-bit grayscale TIFF frames in order,
/// starting over from the first file on every `open` and wrapping around when
/// a burst is longer than the recording.
pub struct TiffReplaySource {
    paths: Vec<PathBuf>,
    next: usize,
    is_open: bool,
    exposure_ms: f64,
    frame_rate_hz: f64,
}

impl TiffReplaySource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            next: 0,
            is_open: false,
            exposure_ms: AcquisitionSettings::default().exposure_ms,
            frame_rate_hz: AcquisitionSettings::default().frame_rate_hz,
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl AcquisitionSource for TiffReplaySource {
    fn open(&mut self) -> Result<()> {
        if self.paths.is_empty() {
            return Err(ShearError::DeviceNotConnected(
                "no recorded frames to replay".to_string(),
            ));
        }
        if let Some(missing) = self.paths.iter().find(|p| !p.is_file()) {
            return Err(ShearError::DeviceNotConnected(format!(
                "recorded frame {} not found",
                missing.display()
            )));
        }

        self.next = 0;
        self.is_open = true;
        info!(frames = self.paths.len(), "Replay source opened");
        Ok(())
    }

    fn configure(&mut self, settings: &AcquisitionSettings) -> Result<()> {
        if !self.is_open {
            return Err(ShearError::CaptureFailed("replay source is not open".to_string()));
        }
        // only reported back, the recording itself is unaffected
        self.exposure_ms = settings.exposure_ms;
        self.frame_rate_hz = settings.frame_rate_hz;
        Ok(())
    }

    fn retrieve_frame(&mut self, _timeout: Duration) -> Result<Array2<u16>> {
        if !self.is_open {
            return Err(ShearError::CaptureFailed("replay source is not open".to_string()));
        }

        let path = &self.paths[self.next % self.paths.len()];
        self.next += 1;
        debug!(path = %path.display(), "Replaying frame");

        load_gray_tiff_u16(path).map_err(|e| ShearError::CaptureFailed(e.to_string()))
    }

    fn close(&mut self) -> Result<()> {
        self.is_open = false;
        Ok(())
    }

    fn frame_rate_hz(&self) -> f64 {
        self.frame_rate_hz
    }

    fn exposure_ms(&self) -> f64 {
        self.exposure_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shear_pipeline::acquisition::grab_burst;
    use crate::shear_pipeline::tiff_io::{save_frame_tiff, TiffCompression};

    #[test]
    fn test_replays_in_order_and_wraps() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..2)
            .map(|i| {
                let path = dir.path().join(format!("frame_{i}.tiff"));
                let frame = Array2::from_elem((3, 4), (i + 1) as f64 * 10.0);
                save_frame_tiff(&path, &frame, TiffCompression::None).unwrap();
                path
            })
            .collect();

        let mut source = TiffReplaySource::new(paths);
        let settings = AcquisitionSettings {
            burst_size: 3,
            warmup: Duration::ZERO,
            ..AcquisitionSettings::default()
        };

        let burst = grab_burst(&mut source, &settings).unwrap();

        let firsts: Vec<u16> = burst.iter().map(|f| f[[0, 0]]).collect();
        assert_eq!(firsts, vec![10, 20, 10]);
        assert!(!source.is_open);
    }

    #[test]
    fn test_missing_recording_is_not_connected() {
        let mut source = TiffReplaySource::new(vec![PathBuf::from("/nonexistent/frame.tiff")]);
        assert!(matches!(source.open(), Err(ShearError::DeviceNotConnected(_))));

        let mut empty = TiffReplaySource::new(Vec::new());
        assert!(matches!(empty.open(), Err(ShearError::DeviceNotConnected(_))));
    }
}
