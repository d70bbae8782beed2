//! Fixed-viewpoint camera supplied by the viewer collaborator.

use glam::{Mat4, Vec3};

/// View and projection transforms for a single capture.
///
/// The capture pipeline never mutates the camera; the interactive viewer
/// owns it and hands it in per capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World-to-view transform.
    pub view: Mat4,
    /// View-to-clip transform.
    pub projection: Mat4,
}

impl Camera {
    /// Perspective camera at `eye` looking toward `target`, +Y up.
    pub fn look_at_perspective(
        eye: Vec3,
        target: Vec3,
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            view: Mat4::look_at_rh(eye, target, Vec3::Y),
            projection: Mat4::perspective_rh(fov_y, aspect, near, far),
        }
    }

    /// Combined clip-from-world transform.
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}
