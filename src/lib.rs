//! Uniform capture core over heterogeneous camera backends.
//!
//! Two backends (a generic webcam backend and a machine-vision SDK
//! backend) expose the same acquisition primitive behind
//! [`CaptureBackend`]. A [`CameraSession`] wraps one backend with a
//! pacing scheduler and a normalization pass, yielding
//! (frame, timestamp) pairs at a target rate regardless of whether the
//! device blocks on read or free-runs.

pub mod capture;
pub mod config;
pub mod error;
pub mod frame;
pub mod normalize;
pub mod pacing;
pub mod session;

pub use capture::sdk::{VisionCamera, VisionSystem};
pub use capture::{
    AcquisitionPacing, Capabilities, CaptureBackend, GenericBackend, OptionValue, SdkBackend,
};
pub use config::{CropRect, DeviceConfig, DeviceSelector};
pub use error::CameraError;
pub use frame::{ChannelOrder, Frame};
pub use pacing::PacingScheduler;
pub use session::CameraSession;
