//! Transport counters and per-tick reports.
//!
//! [`TransportMetrics`] is shared between producer handles and the tick
//! driver and is updated with relaxed atomics; a [`MetricsSnapshot`] is a
//! point-in-time copy for telemetry. [`TickReport`] describes one tick.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use smallvec::SmallVec;

use sluice_core::{StepId, TickId};

/// Cumulative counters for one transport.
///
/// Counters are independent; a snapshot taken while producers are active
/// may observe them at slightly different instants.
#[derive(Debug, Default)]
pub struct TransportMetrics {
    accepted: AtomicU64,
    queue_full: AtomicU64,
    arena_exhausted: AtomicU64,
    transfer_rejected: AtomicU64,
    transferred: AtomicU64,
    dispatched: AtomicU64,
    decode_failures: AtomicU64,
    handler_rejections: AtomicU64,
    ticks: AtomicU64,
}

// Compile-time assertion: TransportMetrics must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<TransportMetrics>();
};

impl TransportMetrics {
    pub(crate) fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_queue_full(&self) {
        self.queue_full.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_arena_exhausted(&self) {
        self.arena_exhausted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_transfer_rejected(&self) {
        self.transfer_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_transferred(&self, n: usize) {
        self.transferred.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_tick(&self, report: &TickReport) {
        self.dispatched
            .fetch_add(report.dispatched as u64, Ordering::Relaxed);
        self.decode_failures
            .fetch_add(report.skipped as u64, Ordering::Relaxed);
        self.handler_rejections
            .fetch_add(report.rejected as u64, Ordering::Relaxed);
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            accepted: self.accepted.load(Ordering::Relaxed),
            queue_full: self.queue_full.load(Ordering::Relaxed),
            arena_exhausted: self.arena_exhausted.load(Ordering::Relaxed),
            transfer_rejected: self.transfer_rejected.load(Ordering::Relaxed),
            transferred: self.transferred.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            handler_rejections: self.handler_rejections.load(Ordering::Relaxed),
            ticks: self.ticks.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`TransportMetrics`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Pushes accepted into the input queue.
    pub accepted: u64,
    /// Pushes rejected because every slot was in use.
    pub queue_full: u64,
    /// Pushes rejected because the arena was out of bytes.
    pub arena_exhausted: u64,
    /// Transfers refused by the processing queue.
    pub transfer_rejected: u64,
    /// Commands moved from input to processing.
    pub transferred: u64,
    /// Commands decoded and handed to a handler (successfully or not).
    pub dispatched: u64,
    /// Payloads skipped because they failed to decode.
    pub decode_failures: u64,
    /// Commands the simulation refused (unknown entity, out of bounds).
    pub handler_rejections: u64,
    /// Ticks completed by the driver.
    pub ticks: u64,
}

impl MetricsSnapshot {
    /// Total rejected pushes.
    pub fn push_rejections(&self) -> u64 {
        self.queue_full + self.arena_exhausted
    }
}

/// What one tick of the driver did.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    /// The tick that produced this report.
    pub tick: TickId,
    /// Simulation step after the tick.
    pub step: StepId,
    /// Commands moved out of the input queue this tick.
    pub transferred: usize,
    /// Whether the transfer was refused (input kept for next tick).
    pub transfer_rejected: bool,
    /// Commands decoded and dispatched.
    pub dispatched: usize,
    /// Payloads that failed to decode and were skipped.
    pub skipped: usize,
    /// Dispatched commands the simulation refused.
    pub rejected: usize,
    /// Unknown kind tags seen this tick, for diagnostics.
    pub unknown_tags: SmallVec<[u32; 4]>,
    /// Simulation steps run this tick.
    pub steps_advanced: u32,
    /// Requested steps left over for later ticks by the per-tick step cap.
    pub steps_deferred: u64,
    /// Time spent transferring and dispatching.
    pub command_processing: Duration,
    /// Wall-clock time for the whole tick, excluding the budget sleep.
    pub total: Duration,
}

impl TickReport {
    pub(crate) fn new(tick: TickId, step: StepId) -> Self {
        Self {
            tick,
            step,
            transferred: 0,
            transfer_rejected: false,
            dispatched: 0,
            skipped: 0,
            rejected: 0,
            unknown_tags: SmallVec::new(),
            steps_advanced: 0,
            steps_deferred: 0,
            command_processing: Duration::ZERO,
            total: Duration::ZERO,
        }
    }
}
