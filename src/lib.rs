//! Real-time 3D Eulerian fluid simulation driven entirely by GPU compute
//! passes.
//!
//! A cubic grid of velocity, density, and pressure fields is relaxed and
//! advected each tick by dispatched compute kernels, then rasterized into a
//! volumetric density texture for an external renderer. The host side owns
//! the data model, the double-buffering protocol, and the dispatch schedule;
//! the per-cell numerics live in the WGSL kernels.

pub mod advect;
pub mod config;
pub mod context;
pub mod fields;
pub mod init;
pub mod kernel;
pub mod relax;
pub mod scheduler;
pub mod sim;
pub mod texture_write;

pub use config::{ObstacleConfig, SimConfig};
pub use context::{GpuContext, SetupError};
pub use fields::{FieldBuffers, ScalarField, VelocityField};
pub use scheduler::{Direction, Generation, RELAX_ITERATIONS, SUBMISSIONS_PER_TICK};
pub use sim::{FlowSim, TickError};
