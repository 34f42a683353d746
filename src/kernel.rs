//! Compute kernel binding and dispatch.
//!
//! A `Kernel` pairs one compute pipeline with one bind group. The binding
//! contract is positional: storage buffers occupy ascending binding indices in
//! the order given, followed by storage textures. The kernel's numerical
//! method is opaque to the host — only this buffer-order contract and the
//! push-constant block are shared with the shader.

use bytemuck::{Pod, Zeroable};

use crate::context::GpuContext;

/// Workgroup size of every kernel; dispatches are linear, `ceil(len / 32)`
/// thread groups on one axis.
pub const WORKGROUP_SIZE: u32 = 32;

pub fn thread_groups(len: usize) -> u32 {
    (len as u32 + WORKGROUP_SIZE - 1) / WORKGROUP_SIZE
}

/// Push-constant block shared by all kernels. `should_red` is only meaningful
/// to the relaxation kernel (red phase = 1, black = 0).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct PushConstants {
    pub grid_size: i32,
    pub should_red: i32,
}

pub struct Kernel {
    label: String,
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    workgroups: u32,
}

impl Kernel {
    pub fn build(
        ctx: &GpuContext,
        shader: &wgpu::ShaderModule,
        entry_point: &str,
        buffers: &[&wgpu::Buffer],
        textures: &[&wgpu::TextureView],
        workgroups: u32,
        label: &str,
    ) -> Self {
        let mut layout_entries = Vec::with_capacity(buffers.len() + textures.len());

        for binding in 0..buffers.len() {
            layout_entries.push(wgpu::BindGroupLayoutEntry {
                binding: binding as u32,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: false },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            });
        }

        for i in 0..textures.len() {
            layout_entries.push(wgpu::BindGroupLayoutEntry {
                binding: (buffers.len() + i) as u32,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::StorageTexture {
                    access: wgpu::StorageTextureAccess::WriteOnly,
                    format: wgpu::TextureFormat::R32Float,
                    view_dimension: wgpu::TextureViewDimension::D3,
                },
                count: None,
            });
        }

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(label),
                    entries: &layout_entries,
                });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(label),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[wgpu::PushConstantRange {
                    stages: wgpu::ShaderStages::COMPUTE,
                    range: 0..std::mem::size_of::<PushConstants>() as u32,
                }],
            });

        let pipeline = ctx
            .device
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                module: shader,
                entry_point,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            });

        let mut bind_entries = Vec::with_capacity(buffers.len() + textures.len());
        for (binding, buffer) in buffers.iter().enumerate() {
            bind_entries.push(wgpu::BindGroupEntry {
                binding: binding as u32,
                resource: buffer.as_entire_binding(),
            });
        }
        for (i, view) in textures.iter().enumerate() {
            bind_entries.push(wgpu::BindGroupEntry {
                binding: (buffers.len() + i) as u32,
                resource: wgpu::BindingResource::TextureView(view),
            });
        }

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &bind_group_layout,
            entries: &bind_entries,
        });

        Self {
            label: label.to_string(),
            pipeline,
            bind_group,
            workgroups,
        }
    }

    /// Begins a compute pass with this kernel's pipeline and bind group set.
    /// Callers push constants and dispatch, possibly more than once.
    pub fn begin<'e>(&'e self, encoder: &'e mut wgpu::CommandEncoder) -> wgpu::ComputePass<'e> {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(&self.label),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass
    }

    pub fn dispatch(&self, pass: &mut wgpu::ComputePass, push: PushConstants) {
        pass.set_push_constants(0, bytemuck::bytes_of(&push));
        pass.dispatch_workgroups(self.workgroups, 1, 1);
    }

    /// Records a single-dispatch invocation into the encoder.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, push: PushConstants) {
        let mut pass = self.begin(encoder);
        self.dispatch(&mut pass, push);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_group_rounding() {
        assert_eq!(thread_groups(1), 1);
        assert_eq!(thread_groups(32), 1);
        assert_eq!(thread_groups(33), 2);
        assert_eq!(thread_groups(64 * 64 * 64), 8192);
    }

    #[test]
    fn push_constants_are_eight_bytes() {
        assert_eq!(std::mem::size_of::<PushConstants>(), 8);
    }
}
