use ndarray::Array3;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, ControlValueSetter, FrameFormat, KnownCameraControl,
    RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::Camera;

use crate::capture::{AcquisitionPacing, Capabilities, CaptureBackend, OptionValue};
use crate::config::{DeviceConfig, DeviceSelector};
use crate::error::CameraError;
use crate::frame::{ChannelOrder, Frame};

/// V4L2 exposure-mode control id. nokhwa names no auto-exposure control,
/// so the toggle goes through the platform id.
const CID_EXPOSURE_AUTO: u128 = 0x009a_0901;

/// Webcam backend over the platform's generic video-capture API.
///
/// Requires a real device index; file sources are rejected.
pub struct GenericBackend {
    camera: Option<Camera>,
}

impl GenericBackend {
    pub fn new() -> Self {
        Self { camera: None }
    }

    /// Probe available device indices and report configurable options.
    ///
    /// Opens successive indices starting at 0 and stops at the first one
    /// that fails to open, treating the failure as "no more devices".
    /// Every probed device is released before this returns.
    pub fn discover() -> Capabilities {
        let mut devices = Vec::new();
        let mut index = 0u32;
        loop {
            let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::None);
            match Camera::new(CameraIndex::Index(index), requested) {
                Ok(camera) => {
                    drop(camera);
                    devices.push(OptionValue::Index(index));
                    index += 1;
                }
                Err(_) => break,
            }
        }
        tracing::debug!("Probed {} capture device(s)", devices.len());

        let mut capabilities = Capabilities::new();
        capabilities.insert("device".to_string(), devices);
        capabilities.insert(
            "display".to_string(),
            vec![OptionValue::Bool(true), OptionValue::Bool(false)],
        );
        capabilities
    }
}

impl Default for GenericBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureBackend for GenericBackend {
    fn open(&mut self, config: &DeviceConfig) -> Result<(), CameraError> {
        let index = match config.device {
            DeviceSelector::Index(index) => index,
            DeviceSelector::FileSource => {
                return Err(CameraError::Configuration(
                    "webcam backend requires a device index, not a file source".to_string(),
                ))
            }
        };

        let requested = match config.resolution {
            Some((width, height)) => {
                let format = CameraFormat::new(
                    Resolution::new(width, height),
                    FrameFormat::MJPEG,
                    config.target_fps.unwrap_or(30.0).round() as u32,
                );
                RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(format))
            }
            None => RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution),
        };

        tracing::info!("Opening capture device {}", index);
        let mut camera = Camera::new(CameraIndex::Index(index), requested)
            .map_err(|e| CameraError::Configuration(e.to_string()))?;

        // Exposure and gain are independent, order-insensitive calls. A
        // control the driver rejects is skipped and the device keeps its
        // default.
        if let Some(mode) = config.auto_exposure {
            let _ = camera.set_camera_control(
                KnownCameraControl::Other(CID_EXPOSURE_AUTO),
                ControlValueSetter::Integer(mode as i64),
            );
        }
        if let Some(exposure) = config.exposure {
            let _ = camera.set_camera_control(
                KnownCameraControl::Exposure,
                ControlValueSetter::Float(exposure),
            );
        }
        if let Some(gain) = config.gain {
            let _ = camera.set_camera_control(
                KnownCameraControl::Gain,
                ControlValueSetter::Float(gain),
            );
        }

        camera
            .open_stream()
            .map_err(|e| CameraError::Configuration(e.to_string()))?;

        let resolution = camera.resolution();
        tracing::info!(
            "Capture device {} open at {}x{}",
            index,
            resolution.width(),
            resolution.height()
        );

        self.camera = Some(camera);
        Ok(())
    }

    fn acquire_raw(&mut self) -> Result<Frame, CameraError> {
        let camera = self
            .camera
            .as_mut()
            .ok_or_else(|| CameraError::Capture("capture device is not open".to_string()))?;

        let buffer = camera
            .frame()
            .map_err(|e| CameraError::Capture(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::Capture(e.to_string()))?;

        let (width, height) = decoded.dimensions();
        let data = Array3::from_shape_vec(
            (height as usize, width as usize, 3),
            decoded.into_raw(),
        )
        .map_err(|e| CameraError::Capture(e.to_string()))?;
        Ok(Frame::Color(data))
    }

    fn close(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            let _ = camera.stop_stream();
            tracing::info!("Capture device released");
        }
    }

    fn channel_order(&self) -> ChannelOrder {
        // Frames are decoded to RGB on the way in.
        ChannelOrder::Rgb
    }

    fn pacing(&self) -> AcquisitionPacing {
        AcquisitionPacing::DevicePaced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_file_sources() {
        let mut backend = GenericBackend::new();
        let config = DeviceConfig::new(DeviceSelector::FileSource);
        let err = backend.open(&config).unwrap_err();
        assert!(matches!(err, CameraError::Configuration(_)));
    }

    #[test]
    fn acquire_before_open_is_a_capture_error() {
        let mut backend = GenericBackend::new();
        let err = backend.acquire_raw().unwrap_err();
        assert!(matches!(err, CameraError::Capture(_)));
    }

    #[test]
    fn close_without_open_is_a_no_op() {
        let mut backend = GenericBackend::new();
        backend.close();
        backend.close();
    }
}
