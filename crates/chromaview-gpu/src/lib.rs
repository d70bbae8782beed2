//! Chromaview GPU — wgpu backend for the depth-only capture pass.
//!
//! This crate owns all GPU resources. No Bevy dependency: it exposes a
//! plain wgpu scene and offscreen target that `chromaview-bevy` wraps into
//! ECS resources and systems.

pub mod context;
pub mod mesh;
pub mod pipelines;
pub mod target;

pub use context::GpuContext;
pub use mesh::{Appearance, MeshScene, SceneMesh, Vertex};
pub use target::CaptureTarget;
