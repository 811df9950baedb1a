//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during arena operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The allocation would run past the end of the arena.
    CapacityExceeded {
        /// Number of bytes requested.
        requested: usize,
        /// Bytes left between the cursor and the end of the arena.
        remaining: usize,
    },
    /// A read range falls outside the allocated prefix.
    OutOfRange {
        /// Start of the range.
        offset: usize,
        /// Length of the range.
        len: usize,
        /// Bytes allocated so far.
        used: usize,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested,
                remaining,
            } => write!(
                f,
                "arena capacity exceeded: requested {requested} bytes, {remaining} remaining"
            ),
            Self::OutOfRange { offset, len, used } => write!(
                f,
                "arena range {offset}..{} outside allocated {used} bytes",
                offset.saturating_add(*len)
            ),
        }
    }
}

impl Error for ArenaError {}
