//! Fixed-capacity bump allocator over a byte buffer.
//!
//! [`ByteArena`] hands out contiguous byte ranges by advancing a cursor.
//! Individual allocations are never freed; the whole arena is reset at
//! once when its owning queue has been drained. Unlike a growable
//! scratch region the backing buffer is sized once at construction and
//! an allocation that does not fit is refused, never satisfied by growth.

use crate::error::ArenaError;
use crate::handle::ArenaOffset;

/// Bump-allocated, fixed-capacity byte storage for command payloads.
///
/// # Example
///
/// ```
/// use sluice_arena::ByteArena;
///
/// let mut arena = ByteArena::new(8);
/// let a = arena.alloc_copy(&[1, 2, 3]).unwrap();
/// let b = arena.alloc_copy(&[4, 5]).unwrap();
/// assert_eq!(a.get(), 0);
/// assert_eq!(b.get(), 3);
/// assert!(arena.alloc_copy(&[0; 4]).is_err());
///
/// arena.reset();
/// assert_eq!(arena.used(), 0);
/// ```
pub struct ByteArena {
    /// Backing storage. Never resized after construction.
    data: Box<[u8]>,
    /// Bump cursor: number of bytes allocated so far.
    cursor: usize,
}

impl ByteArena {
    /// Largest supported capacity. Offsets are stored as `u32`.
    pub const MAX_CAPACITY: usize = u32::MAX as usize;

    /// Create a zeroed arena of exactly `capacity` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds [`MAX_CAPACITY`](Self::MAX_CAPACITY).
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity <= Self::MAX_CAPACITY,
            "ByteArena capacity {capacity} exceeds u32 offset range"
        );
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            cursor: 0,
        }
    }

    /// Reserve `size` bytes and return the offset of the reservation.
    ///
    /// Fails without moving the cursor if `cursor + size` would pass the
    /// end of the arena. Zero-sized allocations succeed and return the
    /// current cursor.
    pub fn allocate(&mut self, size: usize) -> Result<ArenaOffset, ArenaError> {
        let end = self
            .cursor
            .checked_add(size)
            .filter(|&end| end <= self.data.len())
            .ok_or(ArenaError::CapacityExceeded {
                requested: size,
                remaining: self.remaining(),
            })?;
        // cursor <= capacity <= MAX_CAPACITY, so this never truncates.
        let offset = ArenaOffset(self.cursor as u32);
        self.cursor = end;
        Ok(offset)
    }

    /// Allocate room for `bytes` and copy them in.
    pub fn alloc_copy(&mut self, bytes: &[u8]) -> Result<ArenaOffset, ArenaError> {
        let offset = self.allocate(bytes.len())?;
        let start = offset.get();
        self.data[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(offset)
    }

    /// Borrow the allocated bytes in `start..end`.
    pub fn bytes(&self, start: ArenaOffset, end: ArenaOffset) -> Result<&[u8], ArenaError> {
        let len = end.get().saturating_sub(start.get());
        let range = self.checked_range(start.get(), len)?;
        Ok(&self.data[range])
    }

    /// The whole allocated prefix.
    pub fn used_bytes(&self) -> &[u8] {
        &self.data[..self.cursor]
    }

    /// Replace this arena's contents with a copy of `other`'s allocated
    /// prefix. Offsets valid in `other` are valid here afterwards.
    ///
    /// Fails without modification if `other.used()` exceeds this arena's
    /// capacity.
    pub fn copy_from(&mut self, other: &ByteArena) -> Result<(), ArenaError> {
        let used = other.used();
        if used > self.data.len() {
            return Err(ArenaError::CapacityExceeded {
                requested: used,
                remaining: self.data.len(),
            });
        }
        self.data[..used].copy_from_slice(other.used_bytes());
        self.cursor = used;
        Ok(())
    }

    /// Move the cursor back to the start.
    ///
    /// Does not zero the backing storage. The caller must be certain no
    /// offset into this arena is still being read.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Bytes allocated so far.
    pub fn used(&self) -> usize {
        self.cursor
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Bytes still available.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    /// The cursor as an offset; the end of the last allocation.
    pub fn cursor(&self) -> ArenaOffset {
        ArenaOffset(self.cursor as u32)
    }

    fn checked_range(
        &self,
        offset: usize,
        len: usize,
    ) -> Result<std::ops::Range<usize>, ArenaError> {
        match offset.checked_add(len) {
            Some(end) if end <= self.cursor => Ok(offset..end),
            _ => Err(ArenaError::OutOfRange {
                offset,
                len,
                used: self.cursor,
            }),
        }
    }
}

impl std::fmt::Debug for ByteArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteArena")
            .field("used", &self.cursor)
            .field("capacity", &self.data.len())
            .finish()
    }
}
