//! Density rasterization into the shared 3D visualization texture.
//!
//! Runs strictly after advection within a tick and reads the buffer
//! generation advection just wrote — the `Forward` variant therefore reads
//! the secondary pair, `Reverse` the primary pair. The texture itself exists
//! singly and is overwritten every tick.

use crate::context::GpuContext;
use crate::fields::{scalar_len, FieldBuffers};
use crate::kernel::{thread_groups, Kernel, PushConstants};
use crate::scheduler::Direction;

pub struct TextureWritePass {
    forward: Kernel,
    reverse: Kernel,
    grid_size: u32,
}

impl TextureWritePass {
    pub fn new(ctx: &GpuContext, fields: &FieldBuffers) -> Self {
        let shader = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("write_texture shader"),
                source: wgpu::ShaderSource::Wgsl(
                    include_str!("shaders/write_texture.wgsl").into(),
                ),
            });

        let workgroups = thread_groups(scalar_len(fields.grid_size));

        // Read pair at bindings 3/4, the other generation's pair after it.
        let forward = Kernel::build(
            ctx,
            &shader,
            "main",
            &[
                &fields.vx,
                &fields.vy,
                &fields.vz,
                &fields.density2,
                &fields.pressure2,
                &fields.density,
                &fields.pressure,
                &fields.boundary,
            ],
            &[&fields.density_tex_view],
            workgroups,
            "write_texture forward",
        );

        let reverse = Kernel::build(
            ctx,
            &shader,
            "main",
            &[
                &fields.vx,
                &fields.vy,
                &fields.vz,
                &fields.density,
                &fields.pressure,
                &fields.density2,
                &fields.pressure2,
                &fields.boundary,
            ],
            &[&fields.density_tex_view],
            workgroups,
            "write_texture reverse",
        );

        Self {
            forward,
            reverse,
            grid_size: fields.grid_size,
        }
    }

    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, direction: Direction) {
        let kernel = match direction {
            Direction::Forward => &self.forward,
            Direction::Reverse => &self.reverse,
        };
        kernel.encode(
            encoder,
            PushConstants {
                grid_size: self.grid_size as i32,
                should_red: 0,
            },
        );
    }
}
