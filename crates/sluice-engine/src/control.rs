//! Run state shared between a tick driver and its supervisor.

use std::sync::atomic::{AtomicU8, Ordering};

/// Whether the tick loop should keep running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum RunState {
    /// The loop exits at its next check.
    Stopped = 0,
    /// The loop keeps ticking.
    Running = 1,
}

impl RunState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Running,
            _ => Self::Stopped,
        }
    }
}

/// Atomic [`RunState`] cell.
///
/// Writes use `Release` and reads use `Acquire`, so everything the
/// supervisor did before stopping the loop is visible to the driver
/// once it observes [`RunState::Stopped`].
#[derive(Debug)]
pub struct RunControl {
    state: AtomicU8,
}

impl RunControl {
    /// A cell holding `state`.
    pub fn new(state: RunState) -> Self {
        Self {
            state: AtomicU8::new(state as u8),
        }
    }

    /// Current state.
    pub fn load(&self) -> RunState {
        RunState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Overwrite the state.
    pub fn store(&self, state: RunState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Set [`RunState::Stopped`] and return the previous state.
    pub fn stop(&self) -> RunState {
        RunState::from_u8(self.state.swap(RunState::Stopped as u8, Ordering::AcqRel))
    }

    /// Whether the state is [`RunState::Running`].
    pub fn is_running(&self) -> bool {
        self.load() == RunState::Running
    }
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new(RunState::Stopped)
    }
}
