//! Semi-Lagrangian advection.
//!
//! Transports velocity, density, and pressure along the velocity field over
//! one time step. Fields are never read and written in place: the pass reads
//! one full buffer generation and writes the other. Both direction variants
//! are built once at setup and selected by the scheduler.

use crate::context::GpuContext;
use crate::fields::{velocity_len, FieldBuffers};
use crate::kernel::{thread_groups, Kernel, PushConstants};
use crate::scheduler::Direction;

pub struct AdvectionPass {
    forward: Kernel,
    reverse: Kernel,
    grid_size: u32,
}

impl AdvectionPass {
    pub fn new(ctx: &GpuContext, fields: &FieldBuffers) -> Self {
        let shader = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("advect shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/advect.wgsl").into()),
            });

        let workgroups = thread_groups(velocity_len(fields.grid_size));

        // Binding order is the wire contract with the kernel: read quintuple,
        // write quintuple, boundary mask, then the visualization texture.
        let forward = Kernel::build(
            ctx,
            &shader,
            "main",
            &[
                &fields.vx,
                &fields.vy,
                &fields.vz,
                &fields.density,
                &fields.pressure,
                &fields.vx2,
                &fields.vy2,
                &fields.vz2,
                &fields.density2,
                &fields.pressure2,
                &fields.boundary,
            ],
            &[&fields.density_tex_view],
            workgroups,
            "advect forward",
        );

        let reverse = Kernel::build(
            ctx,
            &shader,
            "main",
            &[
                &fields.vx2,
                &fields.vy2,
                &fields.vz2,
                &fields.density2,
                &fields.pressure2,
                &fields.vx,
                &fields.vy,
                &fields.vz,
                &fields.density,
                &fields.pressure,
                &fields.boundary,
            ],
            &[&fields.density_tex_view],
            workgroups,
            "advect reverse",
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
