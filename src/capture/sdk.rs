//! Machine-vision SDK backend.
//!
//! The vendor SDK is treated as an opaque capability behind two small
//! traits: a system object hands out camera handles by index, and a
//! handle grabs frames. The glue that adapts a concrete SDK lives next
//! to its bindings, outside this crate; tests use in-process fakes.

use crate::capture::{AcquisitionPacing, Capabilities, CaptureBackend};
use crate::config::{DeviceConfig, DeviceSelector};
use crate::error::CameraError;
use crate::frame::{ChannelOrder, Frame};

/// SDK "system" object, constructed by the caller from the SDK's
/// installation path.
pub trait VisionSystem {
    type Camera: VisionCamera;

    fn open_camera(&self, index: u32) -> Result<Self::Camera, CameraError>;
}

/// One SDK camera handle.
pub trait VisionCamera {
    fn set_frame_size(&mut self, width: u32, height: u32) -> Result<(), CameraError>;

    /// Exposure time in microseconds.
    fn set_exposure_micros(&mut self, micros: f64) -> Result<(), CameraError>;

    fn set_gain(&mut self, gain: f64) -> Result<(), CameraError>;

    /// Acquire the next frame, blocking until the SDK delivers one.
    fn grab_frame(&mut self) -> Result<Frame, CameraError>;

    /// Channel order of frames this camera delivers.
    fn channel_order(&self) -> ChannelOrder;

    fn release(&mut self);
}

/// Capture backend over a vendor machine-vision SDK.
pub struct SdkBackend<S: VisionSystem> {
    system: S,
    camera: Option<S::Camera>,
    order: ChannelOrder,
}

impl<S: VisionSystem> SdkBackend<S> {
    pub fn new(system: S) -> Self {
        Self {
            system,
            camera: None,
            order: ChannelOrder::Rgb,
        }
    }

    /// The SDK exposes no configurable choices beyond what `DeviceConfig`
    /// already carries.
    pub fn discover() -> Capabilities {
        Capabilities::new()
    }
}

impl<S: VisionSystem> CaptureBackend for SdkBackend<S> {
    fn open(&mut self, config: &DeviceConfig) -> Result<(), CameraError> {
        // Resolve the frame size before touching the SDK: a crop
        // rectangle derives it, otherwise the configured resolution.
        let (width, height) = config.effective_size().ok_or_else(|| {
            CameraError::Configuration(
                "frame size is not set: configure a resolution or a crop rectangle".to_string(),
            )
        })?;
        let index = match config.device {
            DeviceSelector::Index(index) => index,
            DeviceSelector::FileSource => {
                return Err(CameraError::Configuration(
                    "machine-vision backend requires a device index".to_string(),
                ))
            }
        };

        let mut camera = self.system.open_camera(index)?;
        camera.set_frame_size(width, height)?;
        if let Some(exposure) = config.exposure {
            camera.set_exposure_micros(exposure)?;
        }
        if let Some(gain) = config.gain {
            camera.set_gain(gain)?;
        }

        self.order = camera.channel_order();
        self.camera = Some(camera);
        tracing::info!("Machine-vision camera {} open at {}x{}", index, width, height);
        Ok(())
    }

    fn acquire_raw(&mut self) -> Result<Frame, CameraError> {
        let camera = self
            .camera
            .as_mut()
            .ok_or_else(|| CameraError::Capture("camera is not open".to_string()))?;
        camera.grab_frame()
    }

    fn close(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            camera.release();
            tracing::info!("Machine-vision camera released");
        }
    }

    fn channel_order(&self) -> ChannelOrder {
        self.order
    }

    fn pacing(&self) -> AcquisitionPacing {
        // SDK grabs return as fast as they are requested; the scheduler
        // throttles delivery.
        AcquisitionPacing::FreeRunning
    }
}
