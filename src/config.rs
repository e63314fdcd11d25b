/// Which native device a capture backend should attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceSelector {
    /// Platform device index; 0 is the first camera.
    Index(u32),
    /// Marker for a pre-recorded file source. Kept on the configuration
    /// surface for callers that enumerate sources; both built-in backends
    /// reject it.
    FileSource,
}

/// Crop rectangle in pixel coordinates. Rows `[top, bottom)` and columns
/// `[left, right)` are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl CropRect {
    pub fn new(left: u32, right: u32, top: u32, bottom: u32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Size of the cropped region as (width, height).
    pub fn size(&self) -> (u32, u32) {
        (self.right - self.left, self.bottom - self.top)
    }
}

/// Capture parameters, fixed for the lifetime of a session.
///
/// Every knob except `display_enabled` and `display_scale` defaults to
/// absent/disabled; a backend only touches device state for knobs that
/// are set.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub device: DeviceSelector,
    /// Requested frame size as (width, height).
    pub resolution: Option<(u32, u32)>,
    pub auto_exposure: Option<f64>,
    /// Exposure time in microseconds.
    pub exposure: Option<f64>,
    pub gain: Option<f64>,
    /// Clockwise rotation applied during normalization.
    pub rotation_degrees: Option<f64>,
    pub crop: Option<CropRect>,
    pub target_fps: Option<f64>,
    pub display_enabled: bool,
    pub display_scale: f64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device: DeviceSelector::Index(0),
            resolution: None,
            auto_exposure: None,
            exposure: None,
            gain: None,
            rotation_degrees: None,
            crop: None,
            target_fps: None,
            display_enabled: true,
            display_scale: 1.0,
        }
    }
}

impl DeviceConfig {
    pub fn new(device: DeviceSelector) -> Self {
        Self {
            device,
            ..Self::default()
        }
    }

    /// Effective frame size as (width, height). A crop rectangle derives
    /// the size and overrides `resolution`.
    pub fn effective_size(&self) -> Option<(u32, u32)> {
        match self.crop {
            Some(crop) => Some(crop.size()),
            None => self.resolution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_leave_capture_knobs_disabled() {
        let config = DeviceConfig::default();
        assert_eq!(config.device, DeviceSelector::Index(0));
        assert!(config.resolution.is_none());
        assert!(config.auto_exposure.is_none());
        assert!(config.exposure.is_none());
        assert!(config.gain.is_none());
        assert!(config.rotation_degrees.is_none());
        assert!(config.crop.is_none());
        assert!(config.target_fps.is_none());
        assert!(config.display_enabled);
        assert_eq!(config.display_scale, 1.0);
    }

    #[test]
    fn crop_overrides_resolution() {
        let config = DeviceConfig {
            resolution: Some((1280, 720)),
            crop: Some(CropRect::new(100, 400, 50, 250)),
            ..DeviceConfig::default()
        };
        assert_eq!(config.effective_size(), Some((300, 200)));
    }

    #[test]
    fn effective_size_falls_back_to_resolution() {
        let config = DeviceConfig {
            resolution: Some((640, 480)),
            ..DeviceConfig::default()
        };
        assert_eq!(config.effective_size(), Some((640, 480)));
        assert_eq!(DeviceConfig::default().effective_size(), None);
    }
}
