//! Scene meshes with swappable appearances.

use chromaview_core::DepthScene;
use glam::Mat4;
use wgpu::util::DeviceExt;

/// Vertex format for capture geometry: position only.
///
/// The depth pass needs no normals or texture coordinates, and the flat
/// interactive appearance colors per mesh, not per vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Surface appearance of one mesh, selecting the pipeline it draws with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Appearance {
    /// Interactive look: flat per-mesh color.
    Flat { color: [f32; 4] },
    /// Depth-encoding appearance substituted during capture.
    Depth,
}

/// One drawable: uploaded geometry plus a swappable appearance.
pub struct SceneMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub transform: Mat4,
    pub appearance: Appearance,
}

/// Flat list of drawables. Traversal order is insertion order, which keeps
/// the substitute and restore passes index-aligned.
#[derive(Default)]
pub struct MeshScene {
    pub meshes: Vec<SceneMesh>,
}

impl MeshScene {
    /// Upload a mesh and append it to the scene.
    pub fn push_mesh(
        &mut self,
        device: &wgpu::Device,
        vertices: &[Vertex],
        indices: &[u32],
        transform: Mat4,
        appearance: Appearance,
    ) {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("chromaview_mesh_vertices"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("chromaview_mesh_indices"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        self.meshes.push(SceneMesh {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            transform,
            appearance,
        });
    }

    /// Number of drawables in the scene.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// True when the scene holds no drawables.
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

impl DepthScene for MeshScene {
    type Appearance = Appearance;

    fn depth_appearance(&self) -> Appearance {
        Appearance::Depth
    }

    fn visit_appearances(&mut self, visit: &mut dyn FnMut(&mut Appearance)) {
        for mesh in &mut self.meshes {
            visit(&mut mesh.appearance);
        }
    }
}
