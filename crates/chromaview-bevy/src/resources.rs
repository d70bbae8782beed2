//! Bevy resources for the capture pipeline.

use std::sync::Arc;

use bevy::prelude::*;
use chromaview_core::{Camera, CaptureSettings, ChromadepthImage, DepthBuffer};
use chromaview_gpu::{CaptureTarget, GpuContext, MeshScene};
use glam::Vec3;
use parking_lot::Mutex;

/// The capture backend: device context plus offscreen target.
///
/// Inserted at startup when a GPU context is available; absent otherwise,
/// in which case capture commands fail with a backend message.
#[derive(Resource)]
pub struct CaptureBackendState {
    pub context: GpuContext,
    pub target: CaptureTarget,
}

/// The scene the viewer renders interactively, if a model is loaded.
///
/// The mutex is the per-scene capture lock: the substitute-render-restore
/// sequence holds it for its whole duration, so nothing else may render the
/// scene or mutate its appearances mid-capture.
#[derive(Resource, Default)]
pub struct CaptureSceneState {
    pub scene: Option<Arc<Mutex<MeshScene>>>,
}

/// The viewpoint the next capture renders from. The viewer keeps it in sync
/// with its interactive orbit controls.
#[derive(Resource)]
pub struct CaptureCameraState {
    pub camera: Camera,
}

impl Default for CaptureCameraState {
    fn default() -> Self {
        Self {
            camera: Camera::look_at_perspective(
                Vec3::new(0.0, 0.0, 3.0),
                Vec3::ZERO,
                std::f32::consts::FRAC_PI_4,
                1.0,
                0.1,
                100.0,
            ),
        }
    }
}

/// Current capture settings. 1024x1024 near-warm by default.
#[derive(Resource, Default)]
pub struct CaptureSettingsState {
    pub settings: CaptureSettings,
}

/// Latest capture artifacts, replaced on every successful capture.
///
/// The display collaborator draws `image` as a 2D pixel buffer; the export
/// system writes both as PNGs on command.
#[derive(Resource, Default)]
pub struct CaptureResultState {
    pub depth: Option<DepthBuffer>,
    pub image: Option<ChromadepthImage>,
}
