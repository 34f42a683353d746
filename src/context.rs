//! GPU device and queue setup.
//!
//! Everything downstream takes a `&GpuContext` explicitly; there is no global
//! device state.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("no suitable GPU adapter found")]
    NoAdapter,
    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("GPU resource allocation failed: {0}")]
    Allocation(String),
    #[error("grid size {0} exceeds the dispatch limit ({1} max)")]
    GridTooLarge(u32, u32),
}

/// Owns the wgpu device and compute queue for one simulation.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    pub async fn new() -> Result<Self, SetupError> {
        let instance = wgpu::Instance::default();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(SetupError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("using adapter: {} ({:?})", info.name, info.backend);

        // Push constants carry {grid_size, should_red} to every kernel, and
        // the advection pass binds eleven storage buffers at once — above
        // both the downlevel and default limits.
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("terraflow device"),
                    required_features: wgpu::Features::PUSH_CONSTANTS,
                    required_limits: wgpu::Limits {
                        max_push_constant_size: 8,
                        max_storage_buffers_per_shader_stage: 16,
                        ..wgpu::Limits::default()
                    },
                },
                None,
            )
            .await?;

        Ok(Self { device, queue })
    }
}
