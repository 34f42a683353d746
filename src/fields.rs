//! GPU-resident storage for all simulation fields.
//!
//! Three grid topologies share one cubic domain of edge `grid_size` (G):
//! cell-centered scalars (G³), face-centered velocity components stored on a
//! uniformly oversized (G+1)·G·G layout, and a boundary mask padded by one
//! ghost cell on every side ((G+2)³). Scalars and velocities are
//! double-buffered; the boundary mask and the visualization texture are not.

use crate::context::GpuContext;

pub fn scalar_len(grid_size: u32) -> usize {
    let g = grid_size as usize;
    g * g * g
}

/// All three velocity components share the oversized (G+1)·G·G layout rather
/// than per-component staggering; kernels index accordingly.
pub fn velocity_len(grid_size: u32) -> usize {
    let g = grid_size as usize;
    (g + 1) * g * g
}

pub fn boundary_len(grid_size: u32) -> usize {
    let b = grid_size as usize + 2;
    b * b * b
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarField {
    Density,
    Pressure,
    Density2,
    Pressure2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VelocityField {
    Vx,
    Vy,
    Vz,
    Vx2,
    Vy2,
    Vz2,
}

/// Owns every field buffer plus the 3D visualization texture. Allocated once
/// at setup, released together on drop; there is no partial teardown.
pub struct FieldBuffers {
    pub grid_size: u32,

    pub boundary: wgpu::Buffer,

    pub vx: wgpu::Buffer,
    pub vy: wgpu::Buffer,
    pub vz: wgpu::Buffer,
    pub vx2: wgpu::Buffer,
    pub vy2: wgpu::Buffer,
    pub vz2: wgpu::Buffer,

    pub density: wgpu::Buffer,
    pub pressure: wgpu::Buffer,
    pub density2: wgpu::Buffer,
    pub pressure2: wgpu::Buffer,

    pub density_tex: wgpu::Texture,
    pub density_tex_view: wgpu::TextureView,
}

impl FieldBuffers {
    pub fn allocate(ctx: &GpuContext, grid_size: u32) -> Self {
        let scalar_bytes = (scalar_len(grid_size) * std::mem::size_of::<f32>()) as u64;
        let velocity_bytes = (velocity_len(grid_size) * std::mem::size_of::<f32>()) as u64;
        let boundary_bytes = (boundary_len(grid_size) * std::mem::size_of::<f32>()) as u64;

        let boundary = Self::create_field_buffer(ctx, boundary_bytes, "boundary mask");

        let vx = Self::create_field_buffer(ctx, velocity_bytes, "vx");
        let vy = Self::create_field_buffer(ctx, velocity_bytes, "vy");
        let vz = Self::create_field_buffer(ctx, velocity_bytes, "vz");
        let vx2 = Self::create_field_buffer(ctx, velocity_bytes, "vx2");
        let vy2 = Self::create_field_buffer(ctx, velocity_bytes, "vy2");
        let vz2 = Self::create_field_buffer(ctx, velocity_bytes, "vz2");

        let density = Self::create_field_buffer(ctx, scalar_bytes, "density");
        let pressure = Self::create_field_buffer(ctx, scalar_bytes, "pressure");
        let density2 = Self::create_field_buffer(ctx, scalar_bytes, "density2");
        let pressure2 = Self::create_field_buffer(ctx, scalar_bytes, "pressure2");

        let density_tex = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("density texture"),
            size: wgpu::Extent3d {
                width: grid_size,
                height: grid_size,
                depth_or_array_layers: grid_size,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D3,
            format: wgpu::TextureFormat::R32Float,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let density_tex_view = density_tex.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            grid_size,
            boundary,
            vx,
            vy,
            vz,
            vx2,
            vy2,
            vz2,
            density,
            pressure,
            density2,
            pressure2,
            density_tex,
            density_tex_view,
        }
    }

    fn create_field_buffer(ctx: &GpuContext, size: u64, label: &str) -> wgpu::Buffer {
        // COPY_SRC so any field can be read back through a staging buffer.
        ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        })
    }

    pub fn scalar_buffer(&self, field: ScalarField) -> &wgpu::Buffer {
        match field {
            ScalarField::Density => &self.density,
            ScalarField::Pressure => &self.pressure,
            ScalarField::Density2 => &self.density2,
            ScalarField::Pressure2 => &self.pressure2,
        }
    }

    pub fn velocity_buffer(&self, field: VelocityField) -> &wgpu::Buffer {
        match field {
            VelocityField::Vx => &self.vx,
            VelocityField::Vy => &self.vy,
            VelocityField::Vz => &self.vz,
            VelocityField::Vx2 => &self.vx2,
            VelocityField::Vy2 => &self.vy2,
            VelocityField::Vz2 => &self.vz2,
        }
    }

    pub fn upload_scalar(&self, ctx: &GpuContext, field: ScalarField, data: &[f32]) {
        assert_eq!(data.len(), scalar_len(self.grid_size));
        ctx.queue
            .write_buffer(self.scalar_buffer(field), 0, bytemuck::cast_slice(data));
    }

    pub fn upload_velocity(&self, ctx: &GpuContext, field: VelocityField, data: &[f32]) {
        assert_eq!(data.len(), velocity_len(self.grid_size));
        ctx.queue
            .write_buffer(self.velocity_buffer(field), 0, bytemuck::cast_slice(data));
    }

    pub fn upload_boundary(&self, ctx: &GpuContext, data: &[f32]) {
        assert_eq!(data.len(), boundary_len(self.grid_size));
        ctx.queue
            .write_buffer(&self.boundary, 0, bytemuck::cast_slice(data));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_math() {
        assert_eq!(scalar_len(4), 64);
        assert_eq!(velocity_len(4), 5 * 4 * 4);
        assert_eq!(boundary_len(4), 6 * 6 * 6);
    }

    #[test]
    fn velocity_layout_is_uniformly_oversized() {
        // All three components share one layout; none of them is G³.
        for g in [4, 16, 64] {
            assert_eq!(velocity_len(g), scalar_len(g) + (g * g) as usize);
        }
    }
}
