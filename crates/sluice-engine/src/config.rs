//! Transport and driver configuration, validation, and error types.
//!
//! All values are fixed at construction. Nothing here grows at runtime:
//! exceeding a configured capacity produces a rejection, not a resize.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use sluice_arena::ByteArena;
use sluice_core::Command;

// ── TransportConfig ────────────────────────────────────────────────

/// Capacities for the input/processing queue pair.
///
/// Both queues are created with the same values so that a full input
/// queue always fits into an empty processing queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportConfig {
    /// Maximum commands per queue. Default: 256. Must be at least 1.
    pub max_commands: usize,
    /// Arena size per queue in bytes. Default: 256 command records.
    /// Must be at least 1 and fit in a `u32`.
    pub arena_bytes: usize,
}

impl TransportConfig {
    /// Default slot count.
    pub const DEFAULT_MAX_COMMANDS: usize = 256;

    /// A config sized to hold exactly `max_commands` command records.
    pub fn for_commands(max_commands: usize) -> Self {
        Self {
            max_commands,
            arena_bytes: max_commands.saturating_mul(Command::WIRE_SIZE),
        }
    }

    /// Whether the arena can hold a full complement of command records.
    ///
    /// When false, pushes of typed commands can fail with
    /// `ArenaExhausted` before the slot index is full.
    pub fn arena_fits_all_slots(&self) -> bool {
        self.max_commands
            .checked_mul(Command::WIRE_SIZE)
            .is_some_and(|needed| needed <= self.arena_bytes)
    }

    /// Validate capacities.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_commands == 0 {
            return Err(ConfigError::ZeroCommandCapacity);
        }
        if self.arena_bytes == 0 {
            return Err(ConfigError::ZeroArenaCapacity);
        }
        if self.arena_bytes > ByteArena::MAX_CAPACITY {
            return Err(ConfigError::ArenaTooLarge {
                configured: self.arena_bytes,
            });
        }
        Ok(())
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::for_commands(Self::DEFAULT_MAX_COMMANDS)
    }
}

// ── DriverConfig ───────────────────────────────────────────────────

/// Configuration for the simulation tick driver.
#[derive(Clone, Debug, PartialEq)]
pub struct DriverConfig {
    /// Target tick rate. Each tick sleeps out the remainder of
    /// `1 / tick_rate_hz`. Default: 60.0.
    pub tick_rate_hz: f64,
    /// Start in the paused step mode. Default: false (auto-run).
    pub start_paused: bool,
    /// Capacity of the per-tick report channel. `None` disables reports.
    /// Default: `None`.
    pub report_channel: Option<usize>,
    /// Most simulation steps one tick may run. Requested steps beyond
    /// this carry over to later ticks. Default: 64. Must be at least 1.
    pub max_steps_per_tick: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            start_paused: false,
            report_channel: None,
            max_steps_per_tick: 64,
        }
    }
}

impl DriverConfig {
    /// Validate the tick rate, report channel, and step limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tick_budget()?;
        if self.report_channel == Some(0) {
            return Err(ConfigError::ReportChannelZero);
        }
        if self.max_steps_per_tick == 0 {
            return Err(ConfigError::ZeroStepLimit);
        }
        Ok(())
    }

    /// Wall-clock budget of one tick, `1 / tick_rate_hz`.
    ///
    /// Rejects rates whose period is not representable as a `Duration`:
    /// NaN, infinite, zero, negative, and rates so small that the period
    /// overflows.
    pub fn tick_budget(&self) -> Result<Duration, ConfigError> {
        let hz = self.tick_rate_hz;
        if !hz.is_finite() || hz <= 0.0 {
            return Err(ConfigError::InvalidTickRate { value: hz });
        }
        Duration::try_from_secs_f64(1.0 / hz)
            .map_err(|_| ConfigError::InvalidTickRate { value: hz })
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating configuration or starting threads.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// `max_commands` is zero.
    ZeroCommandCapacity,
    /// `arena_bytes` is zero.
    ZeroArenaCapacity,
    /// `arena_bytes` exceeds the `u32` offset range.
    ArenaTooLarge {
        /// The configured size.
        configured: usize,
    },
    /// tick_rate_hz is NaN, infinite, zero, negative, or too small for
    /// its period to fit in a `Duration`.
    InvalidTickRate {
        /// The invalid value.
        value: f64,
    },
    /// A report channel of capacity zero was requested.
    ReportChannelZero,
    /// `max_steps_per_tick` is zero.
    ZeroStepLimit,
    /// The simulation thread could not be spawned.
    ThreadSpawnFailed {
        /// OS error description.
        reason: String,
    },
    /// The simulation could not be recovered from its thread
    /// (the thread panicked).
    SimulationRecoveryFailed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCommandCapacity => write!(f, "max_commands must be at least 1"),
            Self::ZeroArenaCapacity => write!(f, "arena_bytes must be at least 1"),
            Self::ArenaTooLarge { configured } => {
                write!(f, "arena_bytes {configured} exceeds u32::MAX")
            }
            Self::InvalidTickRate { value } => {
                write!(f, "tick_rate_hz must be finite and positive, got {value}")
            }
            Self::ReportChannelZero => write!(f, "report channel capacity must be at least 1"),
            Self::ZeroStepLimit => write!(f, "max_steps_per_tick must be at least 1"),
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
            Self::SimulationRecoveryFailed => {
                write!(f, "simulation could not be recovered from its thread")
            }
        }
    }
}

impl Error for ConfigError {}
