use crate::capture::{CaptureBackend, GenericBackend};
use crate::config::DeviceConfig;
use crate::error::CameraError;
use crate::frame::Frame;
use crate::normalize::normalize;
use crate::pacing::PacingScheduler;

/// An opened capture session: one backend, one pacing scheduler, one
/// immutable configuration.
///
/// The session lifecycle is encoded in ownership. `open` hands back a
/// session only once the backend opened successfully, and `close`
/// consumes the session, so polling after close cannot be written.
pub struct CameraSession {
    backend: Box<dyn CaptureBackend>,
    scheduler: PacingScheduler,
    config: DeviceConfig,
}

impl CameraSession {
    /// Open `backend` with `config` and wrap it in a paced session.
    pub fn open(
        mut backend: Box<dyn CaptureBackend>,
        config: DeviceConfig,
    ) -> Result<Self, CameraError> {
        backend.open(&config)?;
        let scheduler = PacingScheduler::new(backend.pacing(), config.target_fps);
        Ok(Self {
            backend,
            scheduler,
            config,
        })
    }

    /// Open a session over the built-in webcam backend.
    pub fn open_generic(config: DeviceConfig) -> Result<Self, CameraError> {
        Self::open(Box::new(GenericBackend::new()), config)
    }

    /// Produce the next normalized frame and its capture timestamp in
    /// seconds. On a capture error the session stays open and the call
    /// may simply be repeated.
    pub fn next_frame(&mut self) -> Result<(Frame, f64), CameraError> {
        let (raw, timestamp) = self.scheduler.acquire(self.backend.as_mut())?;
        let frame = normalize(raw, self.backend.channel_order(), &self.config);
        Ok((frame, timestamp))
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Release the underlying device.
    pub fn close(mut self) {
        self.backend.close();
    }
}
