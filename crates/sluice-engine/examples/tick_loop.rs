//! Run a grid world on its own thread and feed it random commands.
//!
//! ```text
//! RUST_LOG=sluice_engine=debug cargo run -p sluice-engine --example tick_loop
//! ```

use std::thread;
use std::time::Duration;

use sluice_core::{CellCoord, EntityId};
use sluice_engine::{DriverConfig, GridWorld, SimulationThread, TransportConfig};
use sluice_test_utils::CommandGenerator;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut world = GridWorld::new(32, 32);
    for id in 0..4 {
        world.spawn(EntityId(id), CellCoord::new(0, 0))?;
    }

    let config = DriverConfig {
        tick_rate_hz: 30.0,
        report_channel: Some(64),
        ..DriverConfig::default()
    };
    let sim = SimulationThread::spawn(config, TransportConfig::for_commands(128), world)?;

    let tx = sim.sender();
    let mut generator = CommandGenerator::new(42, 32, 32, 4);
    for _ in 0..60 {
        for cmd in generator.batch(20) {
            // Rejections are counted in the metrics; drop and move on.
            let _ = tx.send(&cmd);
        }
        thread::sleep(Duration::from_millis(10));
    }

    if let Some(reports) = sim.reports() {
        for report in reports.try_iter().take(5) {
            tracing::info!(
                tick = report.tick.0,
                step = report.step.0,
                dispatched = report.dispatched,
                rejected = report.rejected,
                "tick"
            );
        }
    }

    let metrics = sim.metrics().snapshot();
    let world = sim.into_simulation()?;
    tracing::info!(?metrics, final_step = world.current_step().0, "done");
    for (id, cell) in world.entities() {
        tracing::info!(entity = %id, %cell, "entity");
    }
    Ok(())
}
