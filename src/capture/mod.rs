mod generic;
pub mod sdk;

pub use generic::GenericBackend;
pub use sdk::SdkBackend;

use std::collections::BTreeMap;

use crate::config::DeviceConfig;
use crate::error::CameraError;
use crate::frame::{ChannelOrder, Frame};

/// How a backend's native read paces itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionPacing {
    /// The native read blocks until the device's next frame interval, so
    /// the scheduler adds no pacing of its own.
    DevicePaced,
    /// The native read returns as fast as it is called; the scheduler
    /// must throttle delivery to the target rate.
    FreeRunning,
}

/// One legal value for a configurable option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionValue {
    Bool(bool),
    Index(u32),
}

/// Option-name to legal-values mapping, offered to a configuration UI
/// before a `DeviceConfig` is built. Recomputed on every query.
pub type Capabilities = BTreeMap<String, Vec<OptionValue>>;

/// Trait for capture backends.
///
/// An implementation exclusively owns one native device handle between
/// `open` and `close`. Raw frames come out in the backend's native
/// channel order; normalization fixes them up downstream.
pub trait CaptureBackend {
    /// Open the native device and apply every configured capture knob.
    fn open(&mut self, config: &DeviceConfig) -> Result<(), CameraError>;

    /// Acquire one raw frame, blocking until the device delivers it.
    /// No timeout is imposed at this layer.
    fn acquire_raw(&mut self) -> Result<Frame, CameraError>;

    /// Release the native device handle.
    fn close(&mut self);

    /// Channel order of raw frames as this backend delivers them.
    fn channel_order(&self) -> ChannelOrder;

    /// Pacing capability of the native read.
    fn pacing(&self) -> AcquisitionPacing;
}
