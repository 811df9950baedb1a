//! Ordered, fixed-capacity index of arena offsets.

use crate::handle::ArenaOffset;

/// One [`ArenaOffset`] per queued payload, in insertion order.
///
/// Only the first [`len`](SlotIndex::len) entries are meaningful.
/// [`clear`](SlotIndex::clear) resets the counter but leaves stale
/// entries in place, so readers must never look past `len`.
pub struct SlotIndex {
    offsets: Box<[ArenaOffset]>,
    len: usize,
}

impl SlotIndex {
    /// Create an empty index with room for `capacity` offsets.
    pub fn new(capacity: usize) -> Self {
        Self {
            offsets: vec![ArenaOffset::ZERO; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    /// Append an offset. Returns `false` if the index is full.
    #[must_use]
    pub fn push(&mut self, offset: ArenaOffset) -> bool {
        if self.is_full() {
            return false;
        }
        self.offsets[self.len] = offset;
        self.len += 1;
        true
    }

    /// The offset at position `i`, if `i < len`.
    pub fn get(&self, i: usize) -> Option<ArenaOffset> {
        self.as_slice().get(i).copied()
    }

    /// The filled prefix.
    pub fn as_slice(&self) -> &[ArenaOffset] {
        &self.offsets[..self.len]
    }

    /// Copy `other`'s filled prefix over this index.
    ///
    /// Returns `false` without modification if `other` holds more
    /// entries than this index can.
    #[must_use]
    pub fn copy_from(&mut self, other: &SlotIndex) -> bool {
        if other.len > self.offsets.len() {
            return false;
        }
        self.offsets[..other.len].copy_from_slice(other.as_slice());
        self.len = other.len;
        true
    }

    /// Forget all entries.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Number of filled entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no entries are filled.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether every slot is filled.
    pub fn is_full(&self) -> bool {
        self.len == self.offsets.len()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.offsets.len()
    }
}

impl std::fmt::Debug for SlotIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotIndex")
            .field("len", &self.len)
            .field("capacity", &self.offsets.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_until_full() {
        let mut slots = SlotIndex::new(2);
        assert!(slots.push(ArenaOffset(0)));
        assert!(slots.push(ArenaOffset(20)));
        assert!(slots.is_full());
        assert!(!slots.push(ArenaOffset(40)));
        assert_eq!(slots.as_slice(), &[ArenaOffset(0), ArenaOffset(20)]);
    }

    #[test]
    fn get_is_bounded_by_len_not_capacity() {
        let mut slots = SlotIndex::new(4);
        assert!(slots.push(ArenaOffset(0)));
        assert!(slots.push(ArenaOffset(8)));
        slots.clear();
        assert!(slots.push(ArenaOffset(0)));
        // Position 1 still holds a stale entry from before clear().
        assert_eq!(slots.get(0), Some(ArenaOffset(0)));
        assert_eq!(slots.get(1), None);
    }

    #[test]
    fn copy_from_replaces_prefix() {
        let mut src = SlotIndex::new(4);
        assert!(src.push(ArenaOffset(0)));
        assert!(src.push(ArenaOffset(20)));
        let mut dst = SlotIndex::new(4);
        assert!(dst.push(ArenaOffset(99)));
        assert!(dst.copy_from(&src));
        assert_eq!(dst.as_slice(), src.as_slice());
    }

    #[test]
    fn copy_from_refuses_larger_source() {
        let mut src = SlotIndex::new(3);
        for i in 0..3 {
            assert!(src.push(ArenaOffset(i)));
        }
        let mut dst = SlotIndex::new(2);
        assert!(!dst.copy_from(&src));
        assert!(dst.is_empty());
    }
}
