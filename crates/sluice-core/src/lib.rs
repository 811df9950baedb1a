//! Core types and traits for the Sluice command transport.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the command sum type, its fixed-size wire codec, strongly-typed IDs,
//! the error taxonomy shared by the queue and tick driver, and the
//! [`Simulation`] trait that the tick driver dispatches into.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod command;
pub mod error;
pub mod id;
pub mod traits;

pub use codec::WireRecord;
pub use command::{Command, StepControl};
pub use error::{DecodeError, PushError, SimError, TransferError};
pub use id::{CellCoord, EntityId, StepId, TickId};
pub use traits::Simulation;
