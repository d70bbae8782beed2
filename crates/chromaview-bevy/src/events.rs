//! Bevy messages for cross-system communication in the capture pipeline.

use std::path::PathBuf;

use bevy::prelude::*;
use chromaview_core::CaptureSettings;

/// Inbound commands from the viewer frontend.
#[derive(Message)]
pub enum CaptureCommand {
    /// Run one depth capture and composite at the current settings.
    Capture,
    /// Replace the capture settings.
    SetSettings { settings: CaptureSettings },
    /// Write the composited chromadepth image into `dir`.
    ExportChromadepth { dir: PathBuf },
    /// Write the raw grayscale depth render into `dir`.
    ExportDepthMap { dir: PathBuf },
}

/// Fired when a capture and composite completed.
#[derive(Message)]
pub struct CaptureCompletedEvent {
    /// Width of the captured buffer.
    pub width: u32,
    /// Height of the captured buffer.
    pub height: u32,
}

/// Fired when a capture or export failed. `message` is user-visible.
#[derive(Message)]
pub struct CaptureFailedEvent {
    pub message: String,
}

/// Fired after a PNG was written.
#[derive(Message)]
pub struct ImageExportedEvent {
    pub path: PathBuf,
}
