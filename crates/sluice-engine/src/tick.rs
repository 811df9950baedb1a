//! The simulation tick driver.
//!
//! [`TickDriver`] owns a [`CommandTransport`] and a [`Simulation`]. Each
//! tick it moves pending commands into the processing queue, dispatches
//! them in push order, then advances the simulation by however many
//! steps the current step mode and any `Advance` commands call for, up to
//! `max_steps_per_tick`. Steps over the cap carry over to later ticks.
//!
//! ```text
//! producers ──send──▶ input ──transfer──▶ processing ──dispatch──▶ Simulation
//!                                                        │
//!                                         Play / Pause / Advance
//!                                                        ▼
//!                                              step mode + pending steps
//! ```

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TrySendError};

use sluice_core::{
    Command, DecodeError, SimError, Simulation, StepControl, StepId, TickId, TransferError,
};

use crate::config::{ConfigError, DriverConfig};
use crate::control::RunControl;
use crate::metrics::{TickReport, TransportMetrics};
use crate::transport::{CommandSender, CommandTransport};

/// Whether the driver advances the simulation on its own each tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepMode {
    /// One step per tick, plus any requested `Advance` steps.
    Playing,
    /// Only requested `Advance` steps.
    Paused,
}

/// Drains the transport into a simulation once per tick.
pub struct TickDriver<S: Simulation> {
    transport: CommandTransport,
    simulation: S,
    control: Arc<RunControl>,
    mode: StepMode,
    tick: TickId,
    step: StepId,
    tick_budget: Duration,
    max_steps_per_tick: u32,
    pending_steps: u64,
    report_tx: Option<Sender<TickReport>>,
    report_rx: Option<Receiver<TickReport>>,
}

impl<S: Simulation> TickDriver<S> {
    /// Create a stopped driver.
    ///
    /// The run state starts as [`RunState::Stopped`](crate::RunState);
    /// a supervisor sets it to running before calling [`run`](Self::run).
    pub fn new(
        config: &DriverConfig,
        transport: CommandTransport,
        simulation: S,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let tick_budget = config.tick_budget()?;
        let (report_tx, report_rx) = match config.report_channel {
            Some(capacity) => {
                let (tx, rx) = crossbeam_channel::bounded(capacity);
                (Some(tx), Some(rx))
            }
            None => (None, None),
        };
        Ok(Self {
            transport,
            simulation,
            control: Arc::new(RunControl::default()),
            mode: if config.start_paused {
                StepMode::Paused
            } else {
                StepMode::Playing
            },
            tick: TickId::default(),
            step: StepId::default(),
            tick_budget,
            max_steps_per_tick: config.max_steps_per_tick,
            pending_steps: 0,
            report_tx,
            report_rx,
        })
    }

    /// Execute one tick and return what it did.
    pub fn run_tick(&mut self) -> TickReport {
        let start = Instant::now();
        self.tick = TickId(self.tick.0 + 1);
        let mut report = TickReport::new(self.tick, self.step);
        let mut requested_steps = 0u32;

        match self.transport.transfer_pending() {
            Ok(moved) => {
                report.transferred = moved;
                requested_steps = self.dispatch(&mut report);
            }
            // Logged and counted by the transport. A leftover processing
            // batch is drained here so the next transfer can succeed.
            Err(TransferError::DestinationNotEmpty { pending }) => {
                report.transfer_rejected = true;
                tracing::warn!(
                    tick = self.tick.0,
                    pending,
                    "draining stale processing batch"
                );
                requested_steps = self.dispatch(&mut report);
            }
            Err(_) => report.transfer_rejected = true,
        }
        report.command_processing = start.elapsed();

        let auto = u64::from(self.mode == StepMode::Playing);
        self.pending_steps = self
            .pending_steps
            .saturating_add(u64::from(requested_steps))
            .saturating_add(auto);
        let steps = self.pending_steps.min(u64::from(self.max_steps_per_tick));
        self.pending_steps -= steps;
        for _ in 0..steps {
            self.step = StepId(self.step.0 + 1);
            self.simulation.step(self.step);
        }
        // Bounded by max_steps_per_tick, so the cast is lossless.
        report.steps_advanced = steps as u32;
        report.steps_deferred = self.pending_steps;
        report.step = self.step;
        report.total = start.elapsed();

        self.transport.metrics().record_tick(&report);
        report
    }

    /// Dispatch the processing batch. Returns the `Advance` steps requested.
    fn dispatch(&mut self, report: &mut TickReport) -> u32 {
        let Self {
            transport,
            simulation,
            mode,
            tick,
            ..
        } = self;
        let mut requested = 0u32;
        let mut batch = transport.begin_processing();

        for (index, decoded) in (&mut batch).enumerate() {
            let command = match decoded {
                Ok(command) => command,
                Err(error) => {
                    tracing::warn!(tick = tick.0, index, %error, "skipping undecodable command");
                    report.skipped += 1;
                    if let DecodeError::UnknownTag { tag } = error {
                        if !report.unknown_tags.contains(&tag) {
                            report.unknown_tags.push(tag);
                        }
                    }
                    continue;
                }
            };
            report.dispatched += 1;
            if let Err(error) = apply(simulation, mode, &mut requested, command) {
                tracing::debug!(
                    tick = tick.0,
                    index,
                    kind = command.kind_name(),
                    %error,
                    "simulation rejected command"
                );
                report.rejected += 1;
            }
        }

        batch.end();
        requested
    }

    /// Tick until the run state reads stopped.
    ///
    /// Each iteration runs one tick, publishes its report if a report
    /// channel is configured, and parks for the rest of the tick budget.
    /// [`Thread::unpark`](std::thread::Thread::unpark) cuts the park
    /// short. Input still pending when the loop exits is discarded.
    pub fn run(mut self) -> Self {
        tracing::debug!(
            budget_us = self.tick_budget.as_micros() as u64,
            mode = ?self.mode,
            "tick loop started"
        );

        while self.control.is_running() {
            let tick_start = Instant::now();
            let report = self.run_tick();

            if let Some(tx) = &self.report_tx {
                if let Err(TrySendError::Full(report)) = tx.try_send(report) {
                    tracing::trace!(tick = report.tick.0, "report channel full; dropping report");
                }
            }

            let deadline = tick_start + self.tick_budget;
            loop {
                if !self.control.is_running() {
                    break;
                }
                let now = Instant::now();
                match deadline.checked_duration_since(now) {
                    Some(remaining) if !remaining.is_zero() => thread::park_timeout(remaining),
                    _ => break,
                }
            }
        }

        let discarded = self.transport.discard_pending();
        tracing::debug!(
            ticks = self.tick.0,
            step = self.step.0,
            discarded,
            "tick loop stopped"
        );
        self
    }

    /// Handle for starting and stopping [`run`](Self::run).
    pub fn run_control(&self) -> Arc<RunControl> {
        Arc::clone(&self.control)
    }

    /// Take the receiving end of the report channel, if one was configured.
    pub fn take_reports(&mut self) -> Option<Receiver<TickReport>> {
        self.report_rx.take()
    }

    /// A new producer handle.
    pub fn sender(&self) -> CommandSender {
        self.transport.sender()
    }

    /// The transport being drained.
    pub fn transport(&self) -> &CommandTransport {
        &self.transport
    }

    /// Shared counters.
    pub fn metrics(&self) -> Arc<TransportMetrics> {
        self.transport.shared_metrics()
    }

    /// Current step mode.
    pub fn mode(&self) -> StepMode {
        self.mode
    }

    /// Override the step mode.
    pub fn set_mode(&mut self, mode: StepMode) {
        self.mode = mode;
    }

    /// Requested steps still waiting on the per-tick step cap.
    pub fn pending_steps(&self) -> u64 {
        self.pending_steps
    }

    /// Last completed tick.
    pub fn tick(&self) -> TickId {
        self.tick
    }

    /// Last simulation step.
    pub fn step(&self) -> StepId {
        self.step
    }

    /// The driven simulation.
    pub fn simulation(&self) -> &S {
        &self.simulation
    }

    /// Mutable access to the driven simulation.
    pub fn simulation_mut(&mut self) -> &mut S {
        &mut self.simulation
    }

    /// Consume the driver and return the simulation.
    pub fn into_simulation(self) -> S {
        self.simulation
    }
}

fn apply<S: Simulation>(
    simulation: &mut S,
    mode: &mut StepMode,
    requested: &mut u32,
    command: Command,
) -> Result<(), SimError> {
    match command {
        Command::TerrainEdit { cell, delta } => simulation.apply_terrain_edit(cell, delta),
        Command::EntityMove { entity, target } => simulation.move_entity(entity, target),
        Command::Step(StepControl::Play) => {
            *mode = StepMode::Playing;
            Ok(())
        }
        Command::Step(StepControl::Pause) => {
            *mode = StepMode::Paused;
            Ok(())
        }
        Command::Step(StepControl::Advance { steps }) => {
            *requested = requested.saturating_add(steps);
            Ok(())
        }
    }
}

impl<S: Simulation> std::fmt::Debug for TickDriver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickDriver")
            .field("tick", &self.tick)
            .field("step", &self.step)
            .field("mode", &self.mode)
            .field("pending_steps", &self.pending_steps)
            .field("run_state", &self.control.load())
            .finish_non_exhaustive()
    }
}
