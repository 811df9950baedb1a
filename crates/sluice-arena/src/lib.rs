//! Fixed-capacity storage backing Sluice command queues.
//!
//! Provides a bump-allocated byte arena and an ordered slot index of
//! arena offsets. Neither type locks; both are owned by a command queue
//! and only touched while that queue's lock is held.
//!
//! # Architecture
//!
//! ```text
//! CommandQueue (sluice-engine, Mutex-guarded)
//! ├── ByteArena   Box<[u8]>, bump cursor, reset wholesale
//! └── SlotIndex   Box<[ArenaOffset]>, one entry per queued payload
//! ```
//!
//! Offsets rather than pointers are stored so that transferring a queue
//! is a pair of prefix copies with no rebasing: two arenas of equal
//! capacity lay out the same payloads at the same offsets.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod error;
pub mod handle;
pub mod slots;

pub use arena::ByteArena;
pub use error::ArenaError;
pub use handle::ArenaOffset;
pub use slots::SlotIndex;
