//! Boundary-constrained velocity relaxation.
//!
//! Iteratively smooths the velocity components toward a boundary- and
//! incompressibility-consistent state, in place — the same buffers are read
//! and written on every invocation, with the red/black parity split keeping
//! each sub-dispatch race-free.

use crate::context::GpuContext;
use crate::fields::{scalar_len, FieldBuffers};
use crate::kernel::{thread_groups, Kernel, PushConstants};
use crate::scheduler::relax_phases;

pub struct RelaxationPass {
    kernel: Kernel,
    grid_size: u32,
}

impl RelaxationPass {
    pub fn new(ctx: &GpuContext, fields: &FieldBuffers) -> Self {
        let shader = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("gauss_seidel shader"),
                source: wgpu::ShaderSource::Wgsl(
                    include_str!("shaders/gauss_seidel.wgsl").into(),
                ),
            });

        let kernel = Kernel::build(
            ctx,
            &shader,
            "main",
            &[&fields.vx, &fields.vy, &fields.vz, &fields.boundary],
            &[],
            thread_groups(scalar_len(fields.grid_size)),
            "gauss_seidel",
        );

        Self {
            kernel,
            grid_size: fields.grid_size,
        }
    }

    /// Records one full invocation: exactly two sub-dispatches, red strictly
    /// before black, in a single command buffer. Ordering between them relies
    /// on in-order execution within the command buffer plus the parity
    /// partition; no barrier is inserted.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = self.kernel.begin(encoder);
        for phase in relax_phases() {
            self.kernel.dispatch(
                &mut pass,
                PushConstants {
                    grid_size: self.grid_size as i32,
                    should_red: phase.flag(),
                },
            );
        }
    }
}
