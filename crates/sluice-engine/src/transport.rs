//! The input/processing queue pair and its producer handle.
//!
//! Producers push into the input queue through cloned [`CommandSender`]s.
//! Once per tick the driver calls [`CommandTransport::transfer_pending`]
//! to move everything into the processing queue, then drains it with
//! [`CommandTransport::begin_processing`]. Producers therefore contend
//! with the driver only for the short transfer, never for the whole
//! dispatch pass.

use std::sync::Arc;

use sluice_core::{Command, PushError, TransferError};

use crate::config::{ConfigError, TransportConfig};
use crate::metrics::TransportMetrics;
use crate::queue::{CommandQueue, ProcessingBatch};

/// Cloneable producer handle onto a transport's input queue.
///
/// Sends never block on capacity: a full queue rejects immediately and
/// the caller decides whether to retry on a later tick.
#[derive(Clone)]
pub struct CommandSender {
    input: Arc<CommandQueue>,
    metrics: Arc<TransportMetrics>,
}

impl CommandSender {
    /// Encode and enqueue one command.
    pub fn send(&self, command: &Command) -> Result<(), PushError> {
        let result = self.input.push(command);
        self.record(result, command.kind_name())
    }

    /// Enqueue a raw payload. The driver skips payloads it cannot decode.
    pub fn send_bytes(&self, payload: &[u8]) -> Result<(), PushError> {
        let result = self.input.push_bytes(payload);
        self.record(result, "raw")
    }

    /// Commands waiting in the input queue.
    pub fn pending(&self) -> usize {
        self.input.len()
    }

    fn record(&self, result: Result<(), PushError>, kind: &'static str) -> Result<(), PushError> {
        match result {
            Ok(()) => self.metrics.record_accepted(),
            Err(PushError::QueueFull) => {
                self.metrics.record_queue_full();
                tracing::debug!(kind, capacity = self.input.max_commands(), "input queue full");
            }
            Err(PushError::ArenaExhausted {
                requested,
                remaining,
            }) => {
                self.metrics.record_arena_exhausted();
                tracing::warn!(kind, requested, remaining, "input arena exhausted");
            }
        }
        result
    }
}

impl std::fmt::Debug for CommandSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSender")
            .field("input", &self.input)
            .finish_non_exhaustive()
    }
}

/// Two identically-sized command queues and their shared counters.
pub struct CommandTransport {
    input: Arc<CommandQueue>,
    processing: CommandQueue,
    metrics: Arc<TransportMetrics>,
}

// Compile-time assertion: CommandTransport must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<CommandTransport>();
    assert::<CommandSender>();
};

impl CommandTransport {
    /// Build both queues from `config`.
    pub fn new(config: &TransportConfig) -> Result<Self, ConfigError> {
        let input = CommandQueue::with_config(config)?;
        let processing = CommandQueue::with_config(config)?;
        if !config.arena_fits_all_slots() {
            tracing::warn!(
                max_commands = config.max_commands,
                arena_bytes = config.arena_bytes,
                record_size = Command::WIRE_SIZE,
                "arena cannot hold a full queue of command records"
            );
        }
        Ok(Self {
            input: Arc::new(input),
            processing,
            metrics: Arc::new(TransportMetrics::default()),
        })
    }

    /// A new producer handle.
    pub fn sender(&self) -> CommandSender {
        CommandSender {
            input: Arc::clone(&self.input),
            metrics: Arc::clone(&self.metrics),
        }
    }

    /// Move every pending input command into the processing queue.
    ///
    /// On failure the input queue is left untouched, so its commands are
    /// retried on the next call.
    pub fn transfer_pending(&self) -> Result<usize, TransferError> {
        match CommandQueue::transfer(&self.processing, &self.input) {
            Ok(moved) => {
                self.metrics.record_transferred(moved);
                if moved > 0 {
                    tracing::trace!(moved, "transferred input to processing");
                }
                Ok(moved)
            }
            Err(error) => {
                self.metrics.record_transfer_rejected();
                tracing::error!(
                    %error,
                    pending = self.input.len(),
                    in_flight = self.processing.len(),
                    "command transfer refused; input kept for next tick"
                );
                Err(error)
            }
        }
    }

    /// Open the processing queue's batch.
    pub fn begin_processing(&self) -> ProcessingBatch<'_> {
        self.processing.begin_processing()
    }

    /// Commands waiting in the input queue.
    pub fn pending(&self) -> usize {
        self.input.len()
    }

    /// Commands transferred but not yet drained.
    pub fn in_flight(&self) -> usize {
        self.processing.len()
    }

    /// Drop everything still waiting in the input queue.
    pub fn discard_pending(&self) -> usize {
        self.input.clear()
    }

    /// Shared counters.
    pub fn metrics(&self) -> &TransportMetrics {
        &self.metrics
    }

    pub(crate) fn shared_metrics(&self) -> Arc<TransportMetrics> {
        Arc::clone(&self.metrics)
    }

    #[cfg(test)]
    pub(crate) fn processing_queue(&self) -> &CommandQueue {
        &self.processing
    }
}

impl std::fmt::Debug for CommandTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandTransport")
            .field("input", &self.input)
            .field("processing", &self.processing)
            .finish_non_exhaustive()
    }
}
