//! Depth-only capture orchestration: substitute, render, read back, restore.

use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::depth::DepthBuffer;
use crate::error::CaptureError;
use crate::ramp::RampPolarity;
use crate::scene::{DepthScene, OffscreenTarget};

/// Capture parameters chosen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// Offscreen target width in pixels.
    pub width: u32,
    /// Offscreen target height in pixels.
    pub height: u32,
    /// Which end of the depth range maps to the warm end of the spectrum.
    pub polarity: RampPolarity,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
            polarity: RampPolarity::default(),
        }
    }
}

/// Run one depth-only capture over the scene.
///
/// Substitutes every drawable's appearance with the scene's shared
/// depth-encoding appearance, renders once through `camera` into the
/// offscreen target, reads the raw pixels back, and restores the original
/// appearances in the same traversal order. Restoration runs on every exit
/// path, and a restoration mismatch takes precedence over a backend failure
/// because it leaves the scene's appearance state inconsistent.
///
/// An empty scene is not an error: the returned buffer holds the background
/// depth everywhere and the restoration list is empty.
///
/// Callers must serialize captures per scene. The substitute-render-restore
/// sequence is one uninterruptible unit with respect to anything else that
/// renders the scene or mutates its appearances.
pub fn capture<S, T>(
    scene: &mut S,
    camera: &Camera,
    target: &mut T,
    settings: &CaptureSettings,
) -> Result<DepthBuffer, CaptureError>
where
    S: DepthScene,
    T: OffscreenTarget<S>,
{
    if settings.width == 0 || settings.height == 0 {
        return Err(CaptureError::InvalidResolution {
            width: settings.width,
            height: settings.height,
        });
    }

    let depth_appearance = scene.depth_appearance();
    let mut originals = Vec::new();
    scene.visit_appearances(&mut |appearance| {
        originals.push(appearance.clone());
        *appearance = depth_appearance.clone();
    });
    tracing::debug!("substituted {} drawable appearances", originals.len());

    let rendered = target
        .render(scene, camera, settings.width, settings.height)
        .and_then(|()| target.read_back());

    restore_appearances(scene, originals)?;

    let bytes = rendered?;
    DepthBuffer::from_raw(bytes, settings.width, settings.height)
}

/// Replay recorded appearances over the scene in traversal order.
///
/// The drawable count must match the recorded list exactly. A mismatch
/// means the scene changed mid-capture; it is reported rather than silently
/// misassigning appearances.
fn restore_appearances<S: DepthScene>(
    scene: &mut S,
    originals: Vec<S::Appearance>,
) -> Result<(), CaptureError> {
    let substituted = originals.len();
    let mut queue = originals.into_iter();
    let mut revisited = 0usize;
    scene.visit_appearances(&mut |appearance| {
        revisited += 1;
        if let Some(original) = queue.next() {
            *appearance = original;
        }
    });
    if revisited != substituted {
        return Err(CaptureError::RestorationMismatch {
            substituted,
            revisited,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TargetError;
    use glam::Mat4;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum MockAppearance {
        Lit(u8),
        Depth,
    }

    struct MockScene {
        appearances: Vec<MockAppearance>,
        /// Drawables appended after each traversal, to simulate the scene
        /// changing between the substitute and restore passes.
        grow_per_visit: usize,
    }

    impl MockScene {
        fn with_drawables(count: usize) -> Self {
            Self {
                appearances: (0..count).map(|i| MockAppearance::Lit(i as u8)).collect(),
                grow_per_visit: 0,
            }
        }
    }

    impl DepthScene for MockScene {
        type Appearance = MockAppearance;

        fn depth_appearance(&self) -> MockAppearance {
            MockAppearance::Depth
        }

        fn visit_appearances(&mut self, visit: &mut dyn FnMut(&mut MockAppearance)) {
            for appearance in &mut self.appearances {
                visit(appearance);
            }
            for _ in 0..self.grow_per_visit {
                self.appearances.push(MockAppearance::Lit(0));
            }
        }
    }

    #[derive(Default)]
    struct MockTarget {
        fail_render: bool,
        fail_readback: bool,
        /// Truncate the readback by one pixel.
        short_readback: bool,
        /// Depth byte written into every pixel's red channel.
        depth_value: u8,
        rendered_size: Option<(u32, u32)>,
        /// Appearances observed at render time.
        seen: Vec<MockAppearance>,
    }

    impl MockTarget {
        fn uniform(depth_value: u8) -> Self {
            Self {
                depth_value,
                ..Self::default()
            }
        }
    }

    impl OffscreenTarget<MockScene> for MockTarget {
        fn render(
            &mut self,
            scene: &MockScene,
            _camera: &Camera,
            width: u32,
            height: u32,
        ) -> Result<(), TargetError> {
            if self.fail_render {
                return Err(TargetError::Allocation("target allocation refused".into()));
            }
            self.seen = scene.appearances.clone();
            self.rendered_size = Some((width, height));
            Ok(())
        }

        fn read_back(&mut self) -> Result<Vec<u8>, TargetError> {
            if self.fail_readback {
                return Err(TargetError::Readback("context lost".into()));
            }
            let (width, height) = self.rendered_size.expect("render before read_back");
            let mut len = width as usize * height as usize * 4;
            if self.short_readback {
                len -= 4;
            }
            let mut bytes = vec![0u8; len];
            for px in bytes.chunks_exact_mut(4) {
                px[0] = self.depth_value;
                px[3] = u8::MAX;
            }
            Ok(bytes)
        }
    }

    fn test_camera() -> Camera {
        Camera {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }

    fn small() -> CaptureSettings {
        CaptureSettings {
            width: 4,
            height: 4,
            polarity: RampPolarity::NearWarm,
        }
    }

    #[test]
    fn test_capture_renders_with_depth_appearance_everywhere() {
        let mut scene = MockScene::with_drawables(3);
        let mut target = MockTarget::uniform(10);
        capture(&mut scene, &test_camera(), &mut target, &small()).unwrap();
        assert_eq!(target.seen, vec![MockAppearance::Depth; 3]);
    }

    #[test]
    fn test_capture_restores_appearances_on_success() {
        let mut scene = MockScene::with_drawables(3);
        let before = scene.appearances.clone();
        let mut target = MockTarget::uniform(10);
        capture(&mut scene, &test_camera(), &mut target, &small()).unwrap();
        assert_eq!(scene.appearances, before);
    }

    #[test]
    fn test_capture_restores_appearances_after_render_failure() {
        let mut scene = MockScene::with_drawables(2);
        let before = scene.appearances.clone();
        let mut target = MockTarget {
            fail_render: true,
            ..MockTarget::default()
        };
        let err = capture(&mut scene, &test_camera(), &mut target, &small()).unwrap_err();
        assert!(matches!(
            err,
            CaptureError::Backend(TargetError::Allocation(_))
        ));
        assert_eq!(scene.appearances, before);
    }

    #[test]
    fn test_capture_restores_appearances_after_readback_failure() {
        let mut scene = MockScene::with_drawables(2);
        let before = scene.appearances.clone();
        let mut target = MockTarget {
            fail_readback: true,
            ..MockTarget::default()
        };
        let err = capture(&mut scene, &test_camera(), &mut target, &small()).unwrap_err();
        assert!(matches!(
            err,
            CaptureError::Backend(TargetError::Readback(_))
        ));
        assert_eq!(scene.appearances, before);
    }

    #[test]
    fn test_capture_fails_fast_when_scene_grows_mid_capture() {
        let mut scene = MockScene::with_drawables(2);
        scene.grow_per_visit = 1;
        let mut target = MockTarget::uniform(10);
        let err = capture(&mut scene, &test_camera(), &mut target, &small()).unwrap_err();
        assert!(matches!(
            err,
            CaptureError::RestorationMismatch {
                substituted: 2,
                revisited: 3,
            }
        ));
    }

    #[test]
    fn test_capture_empty_scene_yields_background_buffer() {
        let mut scene = MockScene::with_drawables(0);
        let mut target = MockTarget::uniform(255);
        let buffer = capture(&mut scene, &test_camera(), &mut target, &small()).unwrap();
        assert!(buffer.samples().all(|d| d == 255));
    }

    #[test]
    fn test_capture_empty_scene_after_nonempty_raises_no_mismatch() {
        let mut scene = MockScene::with_drawables(2);
        let mut target = MockTarget::uniform(10);
        capture(&mut scene, &test_camera(), &mut target, &small()).unwrap();

        scene.appearances.clear();
        capture(&mut scene, &test_camera(), &mut target, &small()).unwrap();
    }

    #[test]
    fn test_sequential_captures_are_byte_identical() {
        let mut scene = MockScene::with_drawables(3);
        let mut target = MockTarget::uniform(42);
        let first = capture(&mut scene, &test_camera(), &mut target, &small()).unwrap();
        let second = capture(&mut scene, &test_camera(), &mut target, &small()).unwrap();
        assert_eq!(first.raw_bytes(), second.raw_bytes());
    }

    #[test]
    fn test_capture_rejects_zero_resolution() {
        let mut scene = MockScene::with_drawables(1);
        let mut target = MockTarget::uniform(0);
        let settings = CaptureSettings {
            width: 0,
            height: 4,
            polarity: RampPolarity::NearWarm,
        };
        let err = capture(&mut scene, &test_camera(), &mut target, &settings).unwrap_err();
        assert!(matches!(err, CaptureError::InvalidResolution { .. }));
    }

    #[test]
    fn test_capture_rejects_short_readback() {
        let mut scene = MockScene::with_drawables(1);
        let mut target = MockTarget {
            short_readback: true,
            ..MockTarget::default()
        };
        let err = capture(&mut scene, &test_camera(), &mut target, &small()).unwrap_err();
        assert!(matches!(err, CaptureError::BufferSize { .. }));
    }

    #[test]
    fn test_default_settings_match_reference_resolution() {
        let settings = CaptureSettings::default();
        assert_eq!((settings.width, settings.height), (1024, 1024));
        assert_eq!(settings.polarity, RampPolarity::NearWarm);
    }
}
