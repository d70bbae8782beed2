//! Error taxonomy for the capture pipeline.

use thiserror::Error;

/// Failures surfaced by the offscreen rendering backend.
#[derive(Debug, Error)]
pub enum TargetError {
    /// The offscreen color or depth target could not be allocated.
    #[error("offscreen target allocation failed: {0}")]
    Allocation(String),
    /// Raw pixels could not be read back from the target.
    #[error("pixel readback failed: {0}")]
    Readback(String),
}

/// Failures of a single capture invocation.
///
/// None of these are retried automatically: a capture is cheap and
/// idempotent to re-trigger manually.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Capture was requested before any scene content was loaded.
    #[error("no scene loaded: load a model before capturing")]
    NoSceneLoaded,
    /// The rendering backend could not complete the offscreen pass.
    #[error("rendering backend unavailable: {0}")]
    Backend(#[from] TargetError),
    /// The restore traversal visited a different number of drawables than
    /// the substitute traversal recorded. Scene appearance state must be
    /// assumed inconsistent; the caller should prompt for a reload.
    #[error(
        "appearance restoration mismatch: substituted {substituted} drawables, revisited {revisited}"
    )]
    RestorationMismatch { substituted: usize, revisited: usize },
    /// Requested render target dimensions were zero.
    #[error("invalid capture resolution {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },
    /// Readback returned a byte count that violates the
    /// width * height * channels invariant.
    #[error("depth buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },
}
