//! End-to-end GPU tests. These need a live adapter; on machines without one
//! they print a notice and return early instead of failing.

use terraflow::{
    FlowSim, Generation, GpuContext, ScalarField, SimConfig, SUBMISSIONS_PER_TICK,
};

async fn create_sim(config: SimConfig) -> Option<FlowSim> {
    let ctx = match GpuContext::new().await {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("No compatible GPU adapter found; skipping test ({err}).");
            return None;
        }
    };
    match FlowSim::with_context(ctx, config).await {
        Ok(sim) => Some(sim),
        Err(err) => {
            eprintln!("GPU setup failed; skipping test ({err}).");
            None
        }
    }
}

fn tiny_config() -> SimConfig {
    SimConfig {
        grid_size: 4,
        inflow_velocity: 0.0,
        density_streams: 0,
        ..SimConfig::default()
    }
}

#[tokio::test]
async fn first_tick_writes_the_other_generation() {
    let Some(mut sim) = create_sim(tiny_config()).await else {
        return;
    };

    // Zero density everywhere except one seeded cell at the origin.
    let mut density = vec![0.0f32; 4 * 4 * 4];
    density[0] = 2.0;
    sim.write_scalar(ScalarField::Density, &density);

    assert_eq!(sim.generation(), Generation::Ping);
    sim.tick().await.expect("tick should succeed");

    // The secondary generation now holds the advected result and is the read
    // set for the next tick.
    assert_eq!(sim.generation(), Generation::Pong);
    assert_eq!(sim.current_density_field(), ScalarField::Density2);

    let advected = sim
        .read_scalar(ScalarField::Density2)
        .await
        .expect("readback should succeed");
    assert_eq!(advected.len(), 4 * 4 * 4);
    assert!(advected.iter().all(|v| v.is_finite()));
    // The seeded inlet cell is held by the advection kernel, so the written
    // generation carries the seed forward.
    assert_eq!(advected[0], 2.0);
}

#[tokio::test]
async fn tick_issues_exactly_twelve_submissions() {
    let Some(mut sim) = create_sim(tiny_config()).await else {
        return;
    };

    sim.tick().await.expect("tick should succeed");
    assert_eq!(sim.tick_submissions(), SUBMISSIONS_PER_TICK as u64);

    sim.tick().await.expect("tick should succeed");
    assert_eq!(sim.tick_submissions(), 2 * SUBMISSIONS_PER_TICK as u64);
}

#[tokio::test]
async fn generations_alternate_across_ticks() {
    let Some(mut sim) = create_sim(tiny_config()).await else {
        return;
    };

    assert_eq!(sim.generation(), Generation::Ping);
    for n in 1..=4u64 {
        sim.tick().await.expect("tick should succeed");
        let expected = if n % 2 == 0 {
            Generation::Ping
        } else {
            Generation::Pong
        };
        assert_eq!(sim.generation(), expected, "after {n} ticks");
    }
    assert_eq!(sim.ticks(), 4);
}

#[tokio::test]
async fn failed_terrain_load_keeps_previous_boundary() {
    let Some(mut sim) = create_sim(tiny_config()).await else {
        return;
    };

    let before = sim.read_boundary().await.expect("readback should succeed");
    sim.load_terrain(std::path::Path::new("does_not_exist.txt"));
    let after = sim.read_boundary().await.expect("readback should succeed");

    assert_eq!(before, after, "boundary must stay at its prior state");

    // The simulation keeps running on the degraded path.
    sim.tick().await.expect("tick should succeed");
}

#[tokio::test]
async fn simulation_stays_finite_over_ticks() {
    let config = SimConfig {
        grid_size: 8,
        inflow_velocity: 2.0,
        density_streams: 4,
        ..SimConfig::default()
    };
    let Some(mut sim) = create_sim(config).await else {
        return;
    };

    for _ in 0..3 {
        sim.tick().await.expect("tick should succeed");
    }

    let density = sim
        .read_scalar(sim.current_density_field())
        .await
        .expect("readback should succeed");
    assert!(density.iter().all(|v| v.is_finite()));
}
