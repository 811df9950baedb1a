//! Error types for the Sluice command transport.
//!
//! Organized by boundary: producer push, consumer transfer, record
//! decoding, and simulation dispatch. None of these are fatal; every
//! failure is a plain return value the caller decides how to handle.

use std::error::Error;
use std::fmt;

use crate::id::{CellCoord, EntityId};

/// Errors from pushing a payload into a command queue.
///
/// A failed push never mutates the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushError {
    /// Every command slot is in use.
    QueueFull,
    /// The payload does not fit in the remaining arena bytes.
    ///
    /// Frequent occurrences indicate the arena is undersized relative
    /// to the slot count.
    ArenaExhausted {
        /// Payload size in bytes.
        requested: usize,
        /// Arena bytes still free.
        remaining: usize,
    },
}

impl fmt::Display for PushError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueFull => write!(f, "command queue full"),
            Self::ArenaExhausted {
                requested,
                remaining,
            } => write!(
                f,
                "command arena exhausted: requested {requested} bytes, {remaining} remaining"
            ),
        }
    }
}

impl Error for PushError {}

/// Errors from transferring one queue's contents into another.
///
/// A failed transfer leaves both queues untouched. Under a correctly
/// operating tick driver none of these occur.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferError {
    /// Source and destination are the same queue.
    SameQueue,
    /// The destination still holds undrained commands.
    DestinationNotEmpty {
        /// Commands still in the destination.
        pending: usize,
    },
    /// The destination has fewer slots than the source has commands.
    InsufficientSlots {
        /// Commands in the source.
        needed: usize,
        /// Slot capacity of the destination.
        capacity: usize,
    },
    /// The destination arena is smaller than the source's used bytes.
    InsufficientArena {
        /// Bytes used in the source arena.
        needed: usize,
        /// Arena capacity of the destination.
        capacity: usize,
    },
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SameQueue => write!(f, "cannot transfer a queue into itself"),
            Self::DestinationNotEmpty { pending } => {
                write!(f, "destination queue not empty: {pending} commands pending")
            }
            Self::InsufficientSlots { needed, capacity } => write!(
                f,
                "destination has {capacity} slots, {needed} required"
            ),
            Self::InsufficientArena { needed, capacity } => write!(
                f,
                "destination arena holds {capacity} bytes, {needed} required"
            ),
        }
    }
}

impl Error for TransferError {}

/// Errors from decoding a command record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// The record is not exactly one command record long.
    LengthMismatch {
        /// Expected record size.
        expected: usize,
        /// Actual payload size.
        found: usize,
    },
    /// The kind tag is not one this build understands.
    UnknownTag {
        /// The unrecognised tag.
        tag: u32,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { expected, found } => {
                write!(f, "command record is {found} bytes, expected {expected}")
            }
            Self::UnknownTag { tag } => write!(f, "unknown command tag {tag}"),
        }
    }
}

impl Error for DecodeError {}

/// Errors returned by [`Simulation`](crate::Simulation) handlers.
///
/// The tick driver logs and counts these; they never stop the loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimError {
    /// The entity is not known to the simulation.
    UnknownEntity {
        /// The missing entity.
        entity: EntityId,
    },
    /// The cell lies outside the simulation grid.
    OutOfBounds {
        /// The offending cell.
        cell: CellCoord,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEntity { entity } => write!(f, "unknown entity {entity}"),
            Self::OutOfBounds { cell } => write!(f, "cell {cell} out of bounds"),
        }
    }
}

impl Error for SimError {}
