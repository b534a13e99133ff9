use std::time::Duration;

use ndarray::Array2;
use tracing::{debug, info, instrument, warn};

use crate::shear_pipeline::acquisition::source::AcquisitionSource;
use crate::shear_pipeline::acquisition::types::AcquisitionSettings;
use crate::shear_pipeline::common::error::{Result, ShearError};

/// Open device handle. [`close`](Self::close) reports a failed close to the
/// caller; a session dropped without it is closed on drop and any failure is
/// only logged.
pub struct AcquisitionSession<'a, S: AcquisitionSource + ?Sized> {
    source: &'a mut S,
    closed: bool,
}

impl<'a, S: AcquisitionSource + ?Sized> AcquisitionSession<'a, S> {
    pub fn open(source: &'a mut S) -> Result<Self> {
        source.open()?;
        debug!("Acquisition device opened");
        Ok(Self {
            source,
            closed: false,
        })
    }

    pub fn source(&mut self) -> &mut S {
        self.source
    }

    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.source.close()?;
        debug!("Acquisition device closed");
        Ok(())
    }
}

impl<S: AcquisitionSource + ?Sized> Drop for AcquisitionSession<'_, S> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        match self.source.close() {
            Ok(()) => debug!("Acquisition device closed"),
            Err(e) => warn!(error = %e, "Failed to close acquisition device"),
        }
    }
}

/// Opens the device, applies `settings`, retrieves `settings.burst_size`
/// frames and closes the device again.
#[instrument(
    skip(source, settings),
    fields(
        burst = settings.burst_size,
        exposure_ms = settings.exposure_ms,
        frame_rate_hz = settings.frame_rate_hz
    )
)]
pub fn grab_burst<S: AcquisitionSource + ?Sized>(
    source: &mut S,
    settings: &AcquisitionSettings,
) -> Result<Vec<Array2<u16>>> {
    if settings.burst_size == 0 {
        return Err(ShearError::EmptyBurst);
    }
    settings.validate()?;

    let mut session = AcquisitionSession::open(source)?;
    let device = session.source();

    device.configure(settings)?;

    let reported_rate = device.frame_rate_hz();
    let timeout = settings.frame_timeout(reported_rate)?;
    debug!(
        reported_rate,
        exposure_ms = device.exposure_ms(),
        timeout_ms = timeout.as_millis() as u64,
        "Device configured"
    );

    if settings.warmup > Duration::ZERO {
        std::thread::sleep(settings.warmup);
    }

    let mut frames = Vec::with_capacity(settings.burst_size);
    while frames.len() < settings.burst_size {
        frames.push(device.retrieve_frame(timeout)?);
    }
    session.close()?;

    info!(frames = frames.len(), "Burst captured");
    Ok(frames)
}
