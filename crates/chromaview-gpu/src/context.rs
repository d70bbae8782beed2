//! Headless wgpu device creation.

use chromaview_core::TargetError;

/// Owned wgpu device and queue for offscreen capture.
///
/// All rendering and readback happens on whichever thread holds this
/// context; captures against one context must not interleave.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Create a headless device, blocking on adapter and device requests.
    pub fn create_blocking() -> Result<Self, TargetError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            ..Default::default()
        }))
        .map_err(|e| TargetError::Allocation(format!("no compatible GPU adapter: {e}")))?;

        tracing::info!("capture adapter: {}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("chromaview_device"),
            ..Default::default()
        }))
        .map_err(|e| TargetError::Allocation(format!("device request failed: {e}")))?;

        Ok(Self { device, queue })
    }
}
