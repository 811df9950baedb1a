//! A tick driver on its own thread, with a producer-facing handle.
//!
//! ```text
//! Producer thread(s)               Simulation thread ("sluice-sim")
//!     |                                   |
//!     |--sender().send(cmd)-------------->| input queue (Arc, mutex)
//!     |   Err(QueueFull) if saturated     |
//!     |                                   | transfer_pending()
//!     |                                   | dispatch processing batch
//!     |                                   | step simulation
//!     |<--reports() (bounded, optional)---| try_send(TickReport)
//!     |                                   | park_timeout(budget - elapsed)
//!     |                                   |
//!     |--shutdown()---------------------->| RunState::Stopped + unpark
//!     |<--join: TickDriver<S>-------------|
//! ```

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::Receiver;

use sluice_core::{Simulation, StepId};

use crate::config::{ConfigError, DriverConfig, TransportConfig};
use crate::control::{RunControl, RunState};
use crate::metrics::{TickReport, TransportMetrics};
use crate::tick::TickDriver;
use crate::transport::{CommandSender, CommandTransport};

/// Thread name given to the simulation thread.
pub const THREAD_NAME: &str = "sluice-sim";

/// Outcome of [`SimulationThread::shutdown`].
#[derive(Debug)]
pub struct ShutdownReport {
    /// Time from the stop request to the join completing.
    pub total_ms: u64,
    /// Whether the thread was joined cleanly. False if it panicked.
    pub joined: bool,
    /// Ticks completed over the thread's lifetime.
    pub ticks: u64,
    /// Final simulation step, if the driver was recovered.
    pub final_step: Option<StepId>,
}

/// A [`TickDriver`] running on a dedicated thread.
///
/// Dropping the handle shuts the thread down.
pub struct SimulationThread<S: Simulation + 'static> {
    control: Arc<RunControl>,
    sender: CommandSender,
    metrics: Arc<TransportMetrics>,
    reports: Option<Receiver<TickReport>>,
    handle: Option<JoinHandle<TickDriver<S>>>,
    finished: Option<TickDriver<S>>,
}

impl<S: Simulation + 'static> SimulationThread<S> {
    /// Validate both configs, build the transport, and start ticking.
    pub fn spawn(
        driver_config: DriverConfig,
        transport_config: TransportConfig,
        simulation: S,
    ) -> Result<Self, ConfigError> {
        let transport = CommandTransport::new(&transport_config)?;
        let mut driver = TickDriver::new(&driver_config, transport, simulation)?;

        let control = driver.run_control();
        let sender = driver.sender();
        let metrics = driver.metrics();
        let reports = driver.take_reports();

        control.store(RunState::Running);
        let handle = thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || driver.run())
            .map_err(|e| {
                control.store(RunState::Stopped);
                ConfigError::ThreadSpawnFailed {
                    reason: e.to_string(),
                }
            })?;

        tracing::debug!(
            tick_rate_hz = driver_config.tick_rate_hz,
            max_commands = transport_config.max_commands,
            arena_bytes = transport_config.arena_bytes,
            "simulation thread spawned"
        );

        Ok(Self {
            control,
            sender,
            metrics,
            reports,
            handle: Some(handle),
            finished: None,
        })
    }

    /// A new producer handle.
    pub fn sender(&self) -> CommandSender {
        self.sender.clone()
    }

    /// Per-tick reports, if a report channel was configured.
    pub fn reports(&self) -> Option<&Receiver<TickReport>> {
        self.reports.as_ref()
    }

    /// Shared counters.
    pub fn metrics(&self) -> &TransportMetrics {
        &self.metrics
    }

    /// Current run state.
    pub fn run_state(&self) -> RunState {
        self.control.load()
    }

    /// Stop the tick loop and join the thread.
    ///
    /// Idempotent: later calls return a report with zero elapsed time.
    pub fn shutdown(&mut self) -> ShutdownReport {
        let start = Instant::now();
        let Some(handle) = self.handle.take() else {
            return ShutdownReport {
                total_ms: 0,
                joined: self.finished.is_some(),
                ticks: self.metrics.snapshot().ticks,
                final_step: self.finished.as_ref().map(TickDriver::step),
            };
        };

        self.control.stop();
        // The loop parks between ticks; wake it so it sees the stop now.
        handle.thread().unpark();

        let joined = match handle.join() {
            Ok(driver) => {
                self.finished = Some(driver);
                true
            }
            Err(_) => {
                tracing::error!("simulation thread panicked");
                false
            }
        };

        let report = ShutdownReport {
            total_ms: start.elapsed().as_millis() as u64,
            joined,
            ticks: self.metrics.snapshot().ticks,
            final_step: self.finished.as_ref().map(TickDriver::step),
        };
        tracing::debug!(
            total_ms = report.total_ms,
            joined,
            ticks = report.ticks,
            "simulation thread shut down"
        );
        report
    }

    /// Shut down and return the simulation.
    pub fn into_simulation(mut self) -> Result<S, ConfigError> {
        self.shutdown();
        self.finished
            .take()
            .map(TickDriver::into_simulation)
            .ok_or(ConfigError::SimulationRecoveryFailed)
    }
}

impl<S: Simulation + 'static> Drop for SimulationThread<S> {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.shutdown();
        }
    }
}

impl<S: Simulation + 'static> std::fmt::Debug for SimulationThread<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationThread")
            .field("run_state", &self.control.load())
            .field("joined", &self.handle.is_none())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use sluice_core::{CellCoord, Command, EntityId, StepControl};

    use crate::simulation::GridWorld;

    fn fast() -> DriverConfig {
        DriverConfig {
            tick_rate_hz: 500.0,
            ..DriverConfig::default()
        }
    }

    fn wait_for(mut done: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done() {
            assert!(Instant::now() < deadline, "timed out waiting");
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn lifecycle_start_and_shutdown() {
        let mut sim = SimulationThread::spawn(fast(), TransportConfig::default(), GridWorld::new(4, 4))
            .unwrap();
        assert_eq!(sim.run_state(), RunState::Running);
        wait_for(|| sim.metrics().snapshot().ticks >= 2);

        let report = sim.shutdown();
        assert!(report.joined);
        assert!(report.ticks >= 2);
        assert!(report.final_step.is_some());
        assert_eq!(sim.run_state(), RunState::Stopped);

        // Second call is a no-op.
        let again = sim.shutdown();
        assert_eq!(again.total_ms, 0);
        assert!(again.joined);
    }

    #[test]
    fn commands_reach_the_simulation() {
        let mut world = GridWorld::new(8, 8);
        world.spawn(EntityId(1), CellCoord::new(0, 0)).unwrap();
        let sim = SimulationThread::spawn(fast(), TransportConfig::default(), world).unwrap();

        let tx = sim.sender();
        tx.send(&Command::TerrainEdit {
            cell: CellCoord::new(2, 2),
            delta: 7,
        })
        .unwrap();
        tx.send(&Command::EntityMove {
            entity: EntityId(1),
            target: CellCoord::new(5, 5),
        })
        .unwrap();
        wait_for(|| sim.metrics().snapshot().dispatched >= 2);

        let world = sim.into_simulation().unwrap();
        assert_eq!(world.height_at(CellCoord::new(2, 2)), Some(7));
        assert_eq!(world.position(EntityId(1)), Some(CellCoord::new(5, 5)));
    }

    #[test]
    fn reports_are_published() {
        let config = DriverConfig {
            report_channel: Some(1024),
            start_paused: true,
            ..fast()
        };
        let sim = SimulationThread::spawn(config, TransportConfig::default(), GridWorld::new(1, 1))
            .unwrap();
        sim.sender()
            .send(&Command::Step(StepControl::Advance { steps: 2 }))
            .unwrap();

        let reports = sim.reports().unwrap();
        let mut advanced = 0;
        let deadline = Instant::now() + Duration::from_secs(5);
        while advanced < 2 {
            let report = reports
                .recv_deadline(deadline)
                .expect("report before deadline");
            advanced += report.steps_advanced;
        }
        assert_eq!(advanced, 2);
    }

    #[test]
    fn shutdown_is_prompt_at_slow_tick_rate() {
        let config = DriverConfig {
            tick_rate_hz: 0.5,
            ..DriverConfig::default()
        };
        let mut sim =
            SimulationThread::spawn(config, TransportConfig::default(), GridWorld::new(1, 1))
                .unwrap();
        wait_for(|| sim.metrics().snapshot().ticks >= 1);
        // Let the thread enter its two-second park.
        thread::sleep(Duration::from_millis(50));

        let start = Instant::now();
        let report = sim.shutdown();
        assert!(report.joined);
        assert!(
            start.elapsed() < Duration::from_millis(500),
            "shutdown took {:?}",
            start.elapsed()
        );
    }

    #[test]
    fn drop_triggers_shutdown() {
        let sim = SimulationThread::spawn(fast(), TransportConfig::default(), GridWorld::new(1, 1))
            .unwrap();
        let tx = sim.sender();
        drop(sim);
        // The input queue outlives the thread through the sender.
        tx.send(&Command::Step(StepControl::Play)).unwrap();
    }

    #[test]
    fn invalid_config_is_reported() {
        let err = SimulationThread::spawn(
            fast(),
            TransportConfig {
                max_commands: 0,
                arena_bytes: 16,
            },
            GridWorld::new(1, 1),
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::ZeroCommandCapacity);
    }
}
