//! Relocatable arena handles.
//!
//! An [`ArenaOffset`] locates a payload relative to the start of its
//! arena. It stays valid when the arena's used prefix is copied into
//! another arena, which is what makes queue transfer a flat copy.

use std::fmt;

/// Byte offset of an allocation from the start of a [`ByteArena`](crate::ByteArena).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArenaOffset(pub(crate) u32);

impl ArenaOffset {
    /// Offset zero, the start of every arena.
    pub const ZERO: Self = Self(0);

    /// The offset as a slice index.
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ArenaOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{}", self.0)
    }
}
