use thiserror::Error;

/// Errors surfaced by capture backends and camera sessions.
#[derive(Debug, Error)]
pub enum CameraError {
    /// Required configuration is missing or incompatible with the chosen
    /// backend. Raised from `open`; no session is created.
    #[error("invalid camera configuration: {0}")]
    Configuration(String),

    /// A single frame acquisition failed. The session stays open and the
    /// caller may retry.
    #[error("frame acquisition failed: {0}")]
    Capture(String),
}
