use std::path::Path;

use terraflow::{FlowSim, SimConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    let config = if args.len() > 1 {
        SimConfig::from_file(Path::new(&args[1]))?
    } else {
        SimConfig::default()
    };
    let ticks: u64 = if args.len() > 2 { args[2].parse()? } else { 200 };

    let rt = tokio::runtime::Runtime::new()?;

    let mut sim = match rt.block_on(FlowSim::new(config)) {
        Ok(sim) => sim,
        Err(err) => {
            eprintln!("simulation setup failed: {err}");
            std::process::exit(1);
        }
    };

    log::info!(
        "simulation ready: {0}x{0}x{0} grid, {1} ticks",
        sim.grid_size(),
        ticks
    );

    for tick in 0..ticks {
        rt.block_on(sim.tick())?;

        if tick % 20 == 0 {
            let density = rt.block_on(sim.read_scalar(sim.current_density_field()))?;
            let mass: f32 = density.iter().sum();
            log::info!(
                "tick {tick}: generation {:?}, total density {mass:.3}",
                sim.generation()
            );
        }
    }

    log::info!(
        "done: {} ticks, {} dispatch submissions",
        sim.ticks(),
        sim.tick_submissions()
    );
    Ok(())
}
