//! The simulation itself: owns the GPU context, field storage, and the three
//! compute passes, and drives the per-tick schedule.
//!
//! Every dispatch for a tick is recorded into its own command buffer,
//! submitted, and awaited to queue idle before the next one is recorded.
//! That serializes the whole pipeline but makes every cross-dispatch
//! read-after-write ordering hold by construction, with no barriers beyond
//! command-buffer ordering.

use std::path::Path;

use thiserror::Error;

use crate::advect::AdvectionPass;
use crate::config::{SimConfig, MAX_GRID_SIZE};
use crate::context::{GpuContext, SetupError};
use crate::fields::{boundary_len, scalar_len, velocity_len, FieldBuffers, ScalarField, VelocityField};
use crate::init;
use crate::relax::RelaxationPass;
use crate::scheduler::{plan_tick, Generation};
use crate::texture_write::TextureWritePass;

#[derive(Debug, Error)]
pub enum TickError {
    #[error("GPU validation failure during {stage}: {message}")]
    Validation {
        stage: &'static str,
        message: String,
    },
    #[error("GPU out of memory during {stage}: {message}")]
    OutOfMemory {
        stage: &'static str,
        message: String,
    },
    #[error("readback channel closed before the buffer was mapped")]
    ReadbackChannel,
    #[error("failed to map readback buffer: {0}")]
    ReadbackMap(#[from] wgpu::BufferAsyncError),
}

pub struct FlowSim {
    ctx: GpuContext,
    config: SimConfig,
    fields: FieldBuffers,
    relax: RelaxationPass,
    advect: AdvectionPass,
    texture_write: TextureWritePass,
    generation: Generation,
    ticks: u64,
    tick_submissions: u64,
}

impl FlowSim {
    pub async fn new(config: SimConfig) -> Result<Self, SetupError> {
        let ctx = GpuContext::new().await?;
        Self::with_context(ctx, config).await
    }

    /// Builds the simulation on an existing context. All GPU resources are
    /// created inside error scopes: any allocation or pipeline failure here
    /// is setup-fatal.
    pub async fn with_context(ctx: GpuContext, config: SimConfig) -> Result<Self, SetupError> {
        if config.grid_size > MAX_GRID_SIZE {
            return Err(SetupError::GridTooLarge(config.grid_size, MAX_GRID_SIZE));
        }

        ctx.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let fields = FieldBuffers::allocate(&ctx, config.grid_size);
        let relax = RelaxationPass::new(&ctx, &fields);
        let advect = AdvectionPass::new(&ctx, &fields);
        let texture_write = TextureWritePass::new(&ctx, &fields);

        let validation = ctx.device.pop_error_scope();
        let oom = ctx.device.pop_error_scope();
        ctx.device.poll(wgpu::Maintain::Wait);
        if let Some(error) = validation.await {
            return Err(SetupError::Allocation(error.to_string()));
        }
        if let Some(error) = oom.await {
            return Err(SetupError::Allocation(error.to_string()));
        }

        let mut sim = Self {
            ctx,
            config,
            fields,
            relax,
            advect,
            texture_write,
            generation: Generation::Ping,
            ticks: 0,
            tick_submissions: 0,
        };
        sim.seed_initial_fields();

        if let Some(path) = sim.config.terrain.clone() {
            sim.load_terrain(&path);
        }

        Ok(sim)
    }

    /// Uploads the t=0 field contents: a constant x-inflow on the domain's
    /// inlet/outlet faces, zero vy/vz, density stream seeds on the mid-height
    /// plane, and a closed-box boundary with the inflow vent reopened.
    /// Buffers not written here stay at wgpu's zero initialization.
    fn seed_initial_fields(&self) {
        let g = self.config.grid_size as usize;

        let vx = init::wall_inflow(self.config.inflow_velocity, g + 1, g, g);
        let vy = init::uniform_fill(0.0, velocity_len(self.config.grid_size));
        let vz = init::uniform_fill(0.0, velocity_len(self.config.grid_size));

        let mut density = init::uniform_fill(0.0, scalar_len(self.config.grid_size));
        init::seed_density_streams(
            &mut density,
            g,
            self.config.density_streams as usize,
            self.config.stream_density,
        );

        let mut boundary = init::boundary_shell(g + 2);
        if let Some(obstacle) = self.config.obstacle {
            init::add_obstacle_cylinder(
                &mut boundary,
                g + 2,
                obstacle.radius,
                obstacle.offset_x,
                obstacle.offset_y,
            );
        }
        init::open_inflow_vent(&mut boundary, g);

        self.fields.upload_velocity(&self.ctx, VelocityField::Vx, &vx);
        self.fields.upload_velocity(&self.ctx, VelocityField::Vy, &vy);
        self.fields.upload_velocity(&self.ctx, VelocityField::Vz, &vz);
        self.fields
            .upload_scalar(&self.ctx, ScalarField::Density, &density);
        self.fields.upload_boundary(&self.ctx, &boundary);
    }

    /// Replaces the boundary mask with terrain geometry from a heightmap
    /// file. A missing or malformed file degrades, not fails: the previous
    /// boundary stays active and the simulation continues.
    pub fn load_terrain(&mut self, path: &Path) {
        match init::parse_heightmap(path) {
            Ok(map) => {
                log::info!("terrain heightmap: {} x {}", map.size_x, map.size_y);
                let g = self.config.grid_size as usize;
                let mut mask = init::terrain_boundary(&map, g);
                init::open_inflow_vent(&mut mask, g);
                self.fields.upload_boundary(&self.ctx, &mask);
            }
            Err(err) => {
                log::warn!("terrain load failed, keeping previous boundary: {err}");
            }
        }
    }

    /// Advances the simulation by one tick: the fixed relaxation invocations,
    /// one advection in the current generation's direction, and the matching
    /// texture write. Any GPU error fails the tick before the next dispatch
    /// proceeds; there is no retry.
    pub async fn tick(&mut self) -> Result<(), TickError> {
        let (plan, next) = plan_tick(self.generation);

        for _ in 0..plan.relax_invocations {
            let mut encoder = self.create_encoder("relaxation");
            self.relax.encode(&mut encoder);
            self.submit_and_wait(encoder, "relaxation").await?;
        }

        let mut encoder = self.create_encoder("advection");
        self.advect.encode(&mut encoder, plan.direction);
        self.submit_and_wait(encoder, "advection").await?;

        let mut encoder = self.create_encoder("texture write");
        self.texture_write.encode(&mut encoder, plan.direction);
        self.submit_and_wait(encoder, "texture write").await?;

        self.generation = next;
        self.ticks += 1;
        Ok(())
    }

    fn create_encoder(&self, label: &str) -> wgpu::CommandEncoder {
        self.ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) })
    }

    /// Submits one command buffer and blocks until the queue is idle, which
    /// is the full execution and memory-visibility barrier the schedule
    /// relies on. GPU errors raised by the submission surface here as typed
    /// failures.
    async fn submit_and_wait(
        &mut self,
        encoder: wgpu::CommandEncoder,
        stage: &'static str,
    ) -> Result<(), TickError> {
        let device = &self.ctx.device;
        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        self.ctx.queue.submit(std::iter::once(encoder.finish()));

        let validation = device.pop_error_scope();
        let oom = device.pop_error_scope();
        device.poll(wgpu::Maintain::Wait);
        self.tick_submissions += 1;

        if let Some(error) = validation.await {
            return Err(TickError::Validation {
                stage,
                message: error.to_string(),
            });
        }
        if let Some(error) = oom.await {
            return Err(TickError::OutOfMemory {
                stage,
                message: error.to_string(),
            });
        }
        Ok(())
    }

    /// Copies one scalar field into a staging buffer and maps it back to the
    /// host. Not part of the tick schedule; used by tests and the demo
    /// binary's progress metric.
    pub async fn read_scalar(&self, field: ScalarField) -> Result<Vec<f32>, TickError> {
        self.read_buffer(
            self.fields.scalar_buffer(field),
            scalar_len(self.config.grid_size),
        )
        .await
    }

    /// Reads back the boundary mask, ghost shell included.
    pub async fn read_boundary(&self) -> Result<Vec<f32>, TickError> {
        self.read_buffer(&self.fields.boundary, boundary_len(self.config.grid_size))
            .await
    }

    async fn read_buffer(&self, buffer: &wgpu::Buffer, len: usize) -> Result<Vec<f32>, TickError> {
        let size = (len * std::mem::size_of::<f32>()) as u64;

        let staging = self.ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("field readback"),
            size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self.create_encoder("field readback");
        encoder.copy_buffer_to_buffer(buffer, 0, &staging, 0, size);
        self.ctx.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (sender, receiver) = tokio::sync::oneshot::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.ctx.device.poll(wgpu::Maintain::Wait);

        receiver.await.map_err(|_| TickError::ReadbackChannel)??;

        let data = slice.get_mapped_range();
        let out: Vec<f32> = bytemuck::cast_slice(&data).to_vec();
        drop(data);
        staging.unmap();
        Ok(out)
    }

    /// Overwrites one scalar field from host data. Intended for seeding test
    /// scenarios before the first tick.
    pub fn write_scalar(&self, field: ScalarField, data: &[f32]) {
        self.fields.upload_scalar(&self.ctx, field, data);
    }

    /// The generation holding the latest data, i.e. the read set for the next
    /// tick's advection.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// The density buffer belonging to the current generation.
    pub fn current_density_field(&self) -> ScalarField {
        match self.generation {
            Generation::Ping => ScalarField::Density,
            Generation::Pong => ScalarField::Density2,
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Total command-buffer submissions made by `tick` calls so far.
    pub fn tick_submissions(&self) -> u64 {
        self.tick_submissions
    }

    pub fn grid_size(&self) -> u32 {
        self.config.grid_size
    }

    /// The visualization texture an external renderer samples after
    /// transitioning it to shader-read layout.
    pub fn density_texture(&self) -> &wgpu::TextureView {
        &self.fields.density_tex_view
    }

    pub fn context(&self) -> &GpuContext {
        &self.ctx
    }
}
