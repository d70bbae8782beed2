//! Bevy systems for the capture pipeline.
//!
//! These systems are the ONLY place capture state changes. The frontend
//! sends commands via `CaptureCommand`, the systems run the synchronous
//! capture, and results land in `CaptureResultState` plus outbound messages.

use std::time::Instant;

use bevy::prelude::*;
use chromaview_core::{
    CHROMADEPTH_FILENAME, CaptureError, ColorRamp, DEPTH_MAP_FILENAME, TargetError, capture,
    composite,
};

use crate::events::{
    CaptureCommand, CaptureCompletedEvent, CaptureFailedEvent, ImageExportedEvent,
};
use crate::resources::{
    CaptureBackendState, CaptureCameraState, CaptureResultState, CaptureSceneState,
    CaptureSettingsState,
};

/// Process inbound capture and settings commands.
///
/// A capture runs synchronously within the frame: the substitute-render-
/// restore sequence must not interleave with other rendering of the scene,
/// and the result is either stored plus announced, or reported as a
/// distinct user-visible failure. Failures are never retried automatically.
pub fn handle_capture_commands(
    mut commands: MessageReader<CaptureCommand>,
    mut settings_state: ResMut<CaptureSettingsState>,
    scene_state: Res<CaptureSceneState>,
    camera_state: Res<CaptureCameraState>,
    mut backend: Option<ResMut<CaptureBackendState>>,
    mut results: ResMut<CaptureResultState>,
    mut completed: MessageWriter<CaptureCompletedEvent>,
    mut failed: MessageWriter<CaptureFailedEvent>,
) {
    for cmd in commands.read() {
        match cmd {
            CaptureCommand::SetSettings { settings } => {
                if settings_state.settings != *settings {
                    settings_state.settings = *settings;
                    tracing::info!(
                        "capture settings updated: {}x{}",
                        settings.width,
                        settings.height
                    );
                }
            }
            CaptureCommand::Capture => {
                let start = Instant::now();
                match run_capture(
                    &mut backend,
                    &scene_state,
                    &camera_state,
                    &settings_state,
                    &mut results,
                ) {
                    Ok((width, height)) => {
                        tracing::info!(
                            "capture complete: {}x{} in {:.2}ms",
                            width,
                            height,
                            start.elapsed().as_secs_f64() * 1000.0
                        );
                        completed.write(CaptureCompletedEvent { width, height });
                    }
                    Err(err) => {
                        tracing::warn!("capture failed: {err}");
                        failed.write(CaptureFailedEvent {
                            message: err.to_string(),
                        });
                    }
                }
            }
            // Exports are handled by `handle_export_commands`.
            CaptureCommand::ExportChromadepth { .. } | CaptureCommand::ExportDepthMap { .. } => {}
        }
    }
}

fn run_capture(
    backend: &mut Option<ResMut<CaptureBackendState>>,
    scene_state: &CaptureSceneState,
    camera_state: &CaptureCameraState,
    settings_state: &CaptureSettingsState,
    results: &mut CaptureResultState,
) -> Result<(u32, u32), CaptureError> {
    let Some(backend) = backend.as_deref_mut() else {
        return Err(CaptureError::Backend(TargetError::Allocation(
            "no GPU context available".into(),
        )));
    };
    let Some(scene) = scene_state.scene.as_ref() else {
        return Err(CaptureError::NoSceneLoaded);
    };

    let settings = settings_state.settings;

    // Per-scene capture lock: held across substitute, render, readback, and
    // restore so no concurrent capture or interactive render interleaves.
    let mut scene = scene.lock();
    let depth = capture(
        &mut *scene,
        &camera_state.camera,
        &mut backend.target,
        &settings,
    )?;
    drop(scene);

    let ramp = ColorRamp::new(settings.polarity);
    let image = composite(&depth, &ramp);

    let size = (depth.width(), depth.height());
    results.depth = Some(depth);
    results.image = Some(image);
    Ok(size)
}

/// Process export commands against the latest capture artifacts.
pub fn handle_export_commands(
    mut commands: MessageReader<CaptureCommand>,
    results: Res<CaptureResultState>,
    mut exported: MessageWriter<ImageExportedEvent>,
    mut failed: MessageWriter<CaptureFailedEvent>,
) {
    for cmd in commands.read() {
        match cmd {
            CaptureCommand::ExportChromadepth { dir } => {
                let Some(image) = results.image.as_ref() else {
                    failed.write(CaptureFailedEvent {
                        message: "nothing to export: run a capture first".into(),
                    });
                    continue;
                };
                let path = dir.join(CHROMADEPTH_FILENAME);
                match image.save_png(&path) {
                    Ok(()) => {
                        tracing::info!("wrote {}", path.display());
                        exported.write(ImageExportedEvent { path });
                    }
                    Err(err) => {
                        tracing::error!("chromadepth export failed: {err}");
                        failed.write(CaptureFailedEvent {
                            message: format!("export failed: {err}"),
                        });
                    }
                }
            }
            CaptureCommand::ExportDepthMap { dir } => {
                let Some(depth) = results.depth.as_ref() else {
                    failed.write(CaptureFailedEvent {
                        message: "nothing to export: run a capture first".into(),
                    });
                    continue;
                };
                let path = dir.join(DEPTH_MAP_FILENAME);
                match depth.save_grayscale_png(&path) {
                    Ok(()) => {
                        tracing::info!("wrote {}", path.display());
                        exported.write(ImageExportedEvent { path });
                    }
                    Err(err) => {
                        tracing::error!("depth map export failed: {err}");
                        failed.write(CaptureFailedEvent {
                            message: format!("export failed: {err}"),
                        });
                    }
                }
            }
            CaptureCommand::Capture | CaptureCommand::SetSettings { .. } => {}
        }
    }
}
