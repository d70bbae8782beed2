//! Backend abstractions the capture orchestration renders through.
//!
//! Keeping these seams narrow (visit appearances, render, read back) lets
//! the compositor and ramp stay backend-agnostic and the orchestration be
//! unit tested without a graphics context.

use crate::camera::Camera;
use crate::error::TargetError;

/// A scene graph whose drawables expose swappable appearance slots.
///
/// Traversal order must be fixed and deterministic: the capture pass visits
/// appearances twice (substitute, then restore) and relies on both passes
/// seeing the same drawables in the same order.
pub trait DepthScene {
    /// Handle to a drawable's surface appearance.
    type Appearance: Clone + PartialEq;

    /// The shared depth-encoding appearance substituted during capture.
    fn depth_appearance(&self) -> Self::Appearance;

    /// Visit every drawable's appearance slot in traversal order.
    fn visit_appearances(&mut self, visit: &mut dyn FnMut(&mut Self::Appearance));
}

/// A render destination not displayed directly: render, then read back.
///
/// Implementations must leave the default render target bound when `render`
/// returns, on success and failure alike.
pub trait OffscreenTarget<S: DepthScene> {
    /// Render the scene through the camera into an offscreen surface of the
    /// given pixel dimensions.
    fn render(
        &mut self,
        scene: &S,
        camera: &Camera,
        width: u32,
        height: u32,
    ) -> Result<(), TargetError>;

    /// Read back the last rendered surface as raw RGBA bytes, row-major,
    /// origin top-left, native channel order.
    fn read_back(&mut self) -> Result<Vec<u8>, TargetError>;
}
