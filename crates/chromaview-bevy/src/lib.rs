//! Chromaview Bevy Plugin — integrates depth capture into Bevy's ECS.
//!
//! Provides `ChromaviewPlugin` which registers the resources, messages, and
//! systems needed to trigger captures and exports from a Bevy application.

pub mod events;
pub mod resources;
pub mod systems;

use bevy::prelude::*;
use chromaview_gpu::{CaptureTarget, GpuContext};

use events::{CaptureCommand, CaptureCompletedEvent, CaptureFailedEvent, ImageExportedEvent};
use resources::{
    CaptureBackendState, CaptureCameraState, CaptureResultState, CaptureSceneState,
    CaptureSettingsState,
};
use systems::{handle_capture_commands, handle_export_commands};

/// Main Bevy plugin for the chromadepth capture pipeline.
///
/// Registers resources, messages, and systems for:
/// - Triggering a synchronous depth capture and composite on command
/// - Holding the latest capture artifacts for display collaborators
/// - Exporting the chromadepth and raw depth PNGs
pub struct ChromaviewPlugin;

impl Plugin for ChromaviewPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<CaptureCommand>()
            .add_message::<CaptureCompletedEvent>()
            .add_message::<CaptureFailedEvent>()
            .add_message::<ImageExportedEvent>()
            .init_resource::<CaptureSceneState>()
            .init_resource::<CaptureCameraState>()
            .init_resource::<CaptureSettingsState>()
            .init_resource::<CaptureResultState>()
            .add_systems(Startup, init_capture_backend)
            .add_systems(
                Update,
                (
                    handle_capture_commands,
                    handle_export_commands.after(handle_capture_commands),
                ),
            );
    }
}

/// Startup system: create the GPU context and offscreen capture target.
fn init_capture_backend(mut commands: Commands) {
    match GpuContext::create_blocking() {
        Ok(context) => {
            tracing::info!("capture backend initialized");
            let target = CaptureTarget::new(&context);
            commands.insert_resource(CaptureBackendState { context, target });
        }
        Err(e) => {
            tracing::error!("failed to initialize capture backend: {e}");
            tracing::warn!("depth capture will not function without a GPU context");
        }
    }
}
