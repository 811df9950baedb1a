//! Bounded, arena-backed command queue with a scoped processing window.
//!
//! [`CommandQueue`] couples a [`ByteArena`] and a [`SlotIndex`] behind a
//! single mutex. Every public entry point takes the lock for its whole
//! duration, so slot count, arena cursor, and offsets are only ever
//! observed together by one thread at a time.
//!
//! # Processing window
//!
//! [`begin_processing`](CommandQueue::begin_processing) returns a
//! [`ProcessingBatch`] that *holds* the lock until it is ended or
//! dropped. Payloads are read through the batch, and ending it resets
//! the queue for its next cycle. Reading without an open window, or
//! ending a window twice, is not expressible.
//!
//! # Transfer
//!
//! [`CommandQueue::transfer`] moves everything from one queue into an
//! empty one by copying the used arena prefix and the filled slot
//! offsets. Offsets are arena-relative, so they need no rebasing.
//! Locks are taken source first, then destination; the transport only
//! ever transfers input → processing, which keeps that order global.

use std::sync::{Mutex, MutexGuard, PoisonError};

use sluice_arena::{ByteArena, SlotIndex};
use sluice_core::{Command, DecodeError, PushError, TransferError, WireRecord};

use crate::config::{ConfigError, TransportConfig};

/// Mutable queue state. Only reachable through the queue's lock.
struct QueueState {
    arena: ByteArena,
    slots: SlotIndex,
    /// Next slot to hand out during a processing window.
    read_cursor: usize,
}

impl QueueState {
    /// Payload `i` spans from its own offset to the next payload's
    /// offset, or to the arena cursor for the last one.
    fn payload(&self, i: usize) -> Option<&[u8]> {
        let start = self.slots.get(i)?;
        let end = self.slots.get(i + 1).unwrap_or_else(|| self.arena.cursor());
        self.arena.bytes(start, end).ok()
    }

    fn reset(&mut self) {
        self.slots.clear();
        self.arena.reset();
        self.read_cursor = 0;
    }
}

/// A bounded FIFO of opaque command payloads backed by a fixed arena.
///
/// Capacities are fixed at construction. A push that would exceed
/// either the slot count or the arena is rejected immediately; nothing
/// blocks waiting for space.
///
/// # Examples
///
/// ```
/// use sluice_core::{CellCoord, Command};
/// use sluice_engine::CommandQueue;
///
/// let queue = CommandQueue::new(2, 64).unwrap();
/// let edit = Command::TerrainEdit { cell: CellCoord::new(1, 2), delta: 1 };
/// queue.push(&edit).unwrap();
///
/// let mut batch = queue.begin_processing();
/// assert_eq!(batch.len(), 1);
/// assert_eq!(batch.next(), Some(Ok(edit)));
/// assert_eq!(batch.next(), None);
/// batch.end();
///
/// assert!(queue.is_empty());
/// ```
pub struct CommandQueue {
    state: Mutex<QueueState>,
    max_commands: usize,
    arena_capacity: usize,
}

// Compile-time assertion: CommandQueue must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<CommandQueue>();
};

impl CommandQueue {
    /// Create an empty queue holding at most `max_commands` payloads in
    /// an arena of `arena_bytes` bytes.
    pub fn new(max_commands: usize, arena_bytes: usize) -> Result<Self, ConfigError> {
        Self::with_config(&TransportConfig {
            max_commands,
            arena_bytes,
        })
    }

    /// Create an empty queue from a validated [`TransportConfig`].
    pub fn with_config(config: &TransportConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            state: Mutex::new(QueueState {
                arena: ByteArena::new(config.arena_bytes),
                slots: SlotIndex::new(config.max_commands),
                read_cursor: 0,
            }),
            max_commands: config.max_commands,
            arena_capacity: config.arena_bytes,
        })
    }

    /// Blocking acquire. A poisoned lock is recovered: every mutation
    /// leaves the state consistent, and an unwinding processing window
    /// resets the queue on drop.
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Encode `command` into its fixed-size record and push it.
    pub fn push(&self, command: &Command) -> Result<(), PushError> {
        self.push_bytes(&command.encode())
    }

    /// Copy `payload` into the arena and append its offset.
    ///
    /// Fails with [`PushError::QueueFull`] if every slot is taken, or
    /// [`PushError::ArenaExhausted`] if the payload does not fit in the
    /// remaining arena bytes. A failed push changes nothing.
    pub fn push_bytes(&self, payload: &[u8]) -> Result<(), PushError> {
        let mut state = self.lock();
        if state.slots.is_full() {
            return Err(PushError::QueueFull);
        }
        let remaining = state.arena.remaining();
        let offset = state
            .arena
            .alloc_copy(payload)
            .map_err(|_| PushError::ArenaExhausted {
                requested: payload.len(),
                remaining,
            })?;
        let appended = state.slots.push(offset);
        debug_assert!(appended, "slot index filled between check and push");
        Ok(())
    }

    /// Move every payload from `src` into `dst`.
    ///
    /// Locks `src`, then `dst`. Fails, touching neither queue, if the
    /// two are the same queue, if `dst` is not empty, or if `dst` lacks
    /// the slots or arena bytes to hold `src`'s contents. On success
    /// `dst` holds `src`'s payloads in the same order, `src` is reset,
    /// and the number of payloads moved is returned.
    pub fn transfer(dst: &CommandQueue, src: &CommandQueue) -> Result<usize, TransferError> {
        if std::ptr::eq(dst, src) {
            return Err(TransferError::SameQueue);
        }

        let mut src_state = src.lock();
        let mut dst_state = dst.lock();

        if !dst_state.slots.is_empty() {
            return Err(TransferError::DestinationNotEmpty {
                pending: dst_state.slots.len(),
            });
        }
        let count = src_state.slots.len();
        if count > dst.max_commands {
            return Err(TransferError::InsufficientSlots {
                needed: count,
                capacity: dst.max_commands,
            });
        }
        let used = src_state.arena.used();
        if used > dst.arena_capacity {
            return Err(TransferError::InsufficientArena {
                needed: used,
                capacity: dst.arena_capacity,
            });
        }

        // Both copies were checked above.
        dst_state
            .arena
            .copy_from(&src_state.arena)
            .map_err(|_| TransferError::InsufficientArena {
                needed: used,
                capacity: dst.arena_capacity,
            })?;
        let copied = dst_state.slots.copy_from(&src_state.slots);
        debug_assert!(copied, "slot capacity checked before copy");
        dst_state.read_cursor = 0;
        src_state.reset();

        drop(dst_state);
        drop(src_state);
        Ok(count)
    }

    /// Open the processing window.
    ///
    /// Acquires the lock and keeps it inside the returned batch until
    /// the batch is ended or dropped. Any push or transfer touching this
    /// queue blocks for that whole period, so keep the window short.
    pub fn begin_processing(&self) -> ProcessingBatch<'_> {
        let mut guard = self.lock();
        guard.read_cursor = 0;
        ProcessingBatch { guard }
    }

    /// Discard all pending payloads. Returns how many were dropped.
    pub fn clear(&self) -> usize {
        let mut state = self.lock();
        let dropped = state.slots.len();
        state.reset();
        dropped
    }

    /// Whether no payloads are queued.
    pub fn is_empty(&self) -> bool {
        self.lock().slots.is_empty()
    }

    /// Number of queued payloads.
    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    /// Arena bytes in use.
    pub fn arena_used(&self) -> usize {
        self.lock().arena.used()
    }

    /// Maximum number of queued payloads.
    pub fn max_commands(&self) -> usize {
        self.max_commands
    }

    /// Arena capacity in bytes.
    pub fn arena_capacity(&self) -> usize {
        self.arena_capacity
    }
}

impl std::fmt::Debug for CommandQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandQueue")
            .field("max_commands", &self.max_commands)
            .field("arena_capacity", &self.arena_capacity)
            .finish_non_exhaustive()
    }
}

/// Exclusive access to a queue for one drain pass.
///
/// Holds the queue's lock. Payloads come out in push order via
/// [`get_next`](ProcessingBatch::get_next) (raw bytes) or the
/// [`Iterator`] impl (decoded commands). Iteration is bounded by the
/// number of queued payloads, never by capacity.
///
/// Ending the batch, explicitly or by drop, resets the queue and
/// releases the lock. Payloads not yet read are discarded.
#[must_use = "dropping the batch immediately discards every queued command"]
pub struct ProcessingBatch<'q> {
    guard: MutexGuard<'q, QueueState>,
}

impl ProcessingBatch<'_> {
    /// Number of payloads in this batch.
    pub fn len(&self) -> usize {
        self.guard.slots.len()
    }

    /// Whether the batch holds no payloads.
    pub fn is_empty(&self) -> bool {
        self.guard.slots.is_empty()
    }

    /// Payloads not yet handed out.
    pub fn remaining(&self) -> usize {
        self.guard.slots.len() - self.guard.read_cursor
    }

    /// The next raw payload, or `None` once every queued payload has
    /// been returned.
    pub fn get_next(&mut self) -> Option<&[u8]> {
        let state = &mut *self.guard;
        debug_assert!(state.read_cursor <= state.slots.len());
        if state.read_cursor >= state.slots.len() {
            return None;
        }
        let i = state.read_cursor;
        state.read_cursor += 1;
        let payload = state.payload(i);
        debug_assert!(payload.is_some(), "slot {i} points outside the arena");
        payload
    }

    /// End the window: reset the queue and release the lock.
    pub fn end(self) {
        drop(self);
    }
}

impl Iterator for ProcessingBatch<'_> {
    type Item = Result<Command, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.get_next().map(Command::decode)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for ProcessingBatch<'_> {}

impl Drop for ProcessingBatch<'_> {
    fn drop(&mut self) {
        self.guard.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_core::{CellCoord, EntityId, StepControl};

    fn edit(x: i32, y: i32, delta: i32) -> Command {
        Command::TerrainEdit {
            cell: CellCoord::new(x, y),
            delta,
        }
    }

    fn mv(id: u64, x: i32, y: i32) -> Command {
        Command::EntityMove {
            entity: EntityId(id),
            target: CellCoord::new(x, y),
        }
    }

    fn drain(queue: &CommandQueue) -> Vec<Command> {
        queue.begin_processing().map(|r| r.unwrap()).collect()
    }

    fn wire_queue(slots: usize) -> CommandQueue {
        CommandQueue::new(slots, slots * Command::WIRE_SIZE).unwrap()
    }

    // ── construction ───────────────────────────────────────────

    #[test]
    fn zero_capacities_rejected() {
        assert_eq!(
            CommandQueue::new(0, 64).unwrap_err(),
            ConfigError::ZeroCommandCapacity
        );
        assert_eq!(
            CommandQueue::new(4, 0).unwrap_err(),
            ConfigError::ZeroArenaCapacity
        );
    }

    #[test]
    fn new_queue_is_empty() {
        let q = CommandQueue::new(4, 128).unwrap();
        assert!(q.is_empty());
        assert_eq!(q.len(), 0);
        assert_eq!(q.arena_used(), 0);
        assert_eq!(q.max_commands(), 4);
        assert_eq!(q.arena_capacity(), 128);
    }

    // ── push ───────────────────────────────────────────────────

    #[test]
    fn fifo_order_preserved() {
        let q = wire_queue(8);
        let cmds = vec![
            edit(0, 0, 1),
            mv(1, 2, 3),
            Command::Step(StepControl::Pause),
            edit(4, 5, -2),
            Command::Step(StepControl::Advance { steps: 3 }),
        ];
        for c in &cmds {
            q.push(c).unwrap();
        }
        assert_eq!(drain(&q), cmds);
    }

    #[test]
    fn push_past_slot_capacity_rejected() {
        let q = CommandQueue::new(3, 1024).unwrap();
        for i in 0..3 {
            q.push(&edit(i, 0, 1)).unwrap();
        }
        assert_eq!(q.push(&edit(9, 9, 9)), Err(PushError::QueueFull));
        assert_eq!(q.len(), 3);
        assert_eq!(
            drain(&q),
            vec![edit(0, 0, 1), edit(1, 0, 1), edit(2, 0, 1)]
        );
    }

    #[test]
    fn push_past_arena_rejected_without_mutation() {
        let q = CommandQueue::new(8, 30).unwrap();
        q.push(&edit(1, 1, 1)).unwrap();
        let used = q.arena_used();
        assert_eq!(
            q.push(&edit(2, 2, 2)),
            Err(PushError::ArenaExhausted {
                requested: 20,
                remaining: 10
            })
        );
        assert_eq!(q.len(), 1);
        assert_eq!(q.arena_used(), used);

        // A smaller raw payload still fits.
        q.push_bytes(&[1, 2, 3, 4]).unwrap();
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn variable_sized_payloads_come_back_intact() {
        let q = CommandQueue::new(4, 64).unwrap();
        q.push_bytes(&[1]).unwrap();
        q.push_bytes(&[]).unwrap();
        q.push_bytes(&[2, 3, 4]).unwrap();

        let mut batch = q.begin_processing();
        assert_eq!(batch.get_next(), Some(&[1u8][..]));
        assert_eq!(batch.get_next(), Some(&[][..]));
        assert_eq!(batch.get_next(), Some(&[2u8, 3, 4][..]));
        assert_eq!(batch.get_next(), None);
    }

    // ── processing window ──────────────────────────────────────

    #[test]
    fn begin_reports_slot_count() {
        let q = wire_queue(4);
        q.push(&edit(0, 0, 1)).unwrap();
        q.push(&edit(0, 0, 2)).unwrap();
        let batch = q.begin_processing();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.size_hint(), (2, Some(2)));
    }

    #[test]
    fn end_resets_queue() {
        let q = wire_queue(4);
        q.push(&edit(0, 0, 1)).unwrap();
        q.push(&edit(0, 0, 2)).unwrap();

        let mut batch = q.begin_processing();
        while batch.next().is_some() {}
        batch.end();

        assert!(q.is_empty());
        assert_eq!(q.arena_used(), 0);

        q.push(&mv(7, 1, 1)).unwrap();
        assert_eq!(drain(&q), vec![mv(7, 1, 1)]);
    }

    #[test]
    fn partially_read_batch_discards_rest() {
        let q = wire_queue(4);
        q.push(&edit(0, 0, 1)).unwrap();
        q.push(&edit(0, 0, 2)).unwrap();
        {
            let mut batch = q.begin_processing();
            assert_eq!(batch.next(), Some(Ok(edit(0, 0, 1))));
        }
        assert!(q.is_empty());
    }

    #[test]
    fn iteration_bounded_by_count_not_capacity() {
        let q = wire_queue(4);
        for i in 0..4 {
            q.push(&edit(i, i, i)).unwrap();
        }
        drop(drain(&q));

        // Stale offsets for slots 1..4 remain in the index after reset.
        q.push(&mv(1, 0, 0)).unwrap();
        let mut batch = q.begin_processing();
        assert_eq!(batch.next(), Some(Ok(mv(1, 0, 0))));
        assert_eq!(batch.next(), None);
        assert_eq!(batch.get_next(), None);
    }

    #[test]
    fn undecodable_payload_surfaces_as_error() {
        let q = CommandQueue::new(4, 128).unwrap();
        let mut bogus = [0u8; Command::WIRE_SIZE];
        bogus[0..4].copy_from_slice(&77u32.to_le_bytes());
        q.push_bytes(&bogus).unwrap();
        q.push(&edit(1, 1, 1)).unwrap();

        let results: Vec<_> = q.begin_processing().collect();
        assert_eq!(
            results,
            vec![Err(DecodeError::UnknownTag { tag: 77 }), Ok(edit(1, 1, 1))]
        );
    }

    #[test]
    fn clear_drops_pending() {
        let q = wire_queue(4);
        q.push(&edit(0, 0, 1)).unwrap();
        q.push(&edit(0, 0, 1)).unwrap();
        assert_eq!(q.clear(), 2);
        assert!(q.is_empty());
        assert_eq!(q.arena_used(), 0);
    }

    // ── transfer ───────────────────────────────────────────────

    #[test]
    fn transfer_moves_everything_in_order() {
        let input = wire_queue(10);
        let processing = wire_queue(10);
        let cmds = [edit(1, 2, 1), mv(5, 3, 3), Command::Step(StepControl::Play)];
        for c in &cmds {
            input.push(c).unwrap();
        }

        assert_eq!(CommandQueue::transfer(&processing, &input), Ok(3));
        assert_eq!(input.len(), 0);
        assert_eq!(input.arena_used(), 0);
        assert_eq!(processing.len(), 3);
        assert_eq!(drain(&processing), cmds.to_vec());
    }

    #[test]
    fn transfer_of_empty_source_succeeds() {
        let input = wire_queue(4);
        let processing = wire_queue(4);
        assert_eq!(CommandQueue::transfer(&processing, &input), Ok(0));
        assert!(processing.is_empty());
    }

    #[test]
    fn transfer_into_non_empty_destination_rejected() {
        let input = wire_queue(4);
        let processing = wire_queue(4);
        input.push(&edit(1, 1, 1)).unwrap();
        input.push(&edit(2, 2, 2)).unwrap();
        processing.push(&mv(9, 0, 0)).unwrap();

        let input_used = input.arena_used();
        let processing_used = processing.arena_used();
        assert_eq!(
            CommandQueue::transfer(&processing, &input),
            Err(TransferError::DestinationNotEmpty { pending: 1 })
        );
        assert_eq!(input.len(), 2);
        assert_eq!(input.arena_used(), input_used);
        assert_eq!(processing.len(), 1);
        assert_eq!(processing.arena_used(), processing_used);
        assert_eq!(drain(&input), vec![edit(1, 1, 1), edit(2, 2, 2)]);
        assert_eq!(drain(&processing), vec![mv(9, 0, 0)]);
    }

    #[test]
    fn transfer_into_smaller_destination_rejected() {
        let input = wire_queue(4);
        let few_slots = CommandQueue::new(2, 1024).unwrap();
        let small_arena = CommandQueue::new(8, 50).unwrap();
        for i in 0..3 {
            input.push(&edit(i, 0, 0)).unwrap();
        }

        assert_eq!(
            CommandQueue::transfer(&few_slots, &input),
            Err(TransferError::InsufficientSlots {
                needed: 3,
                capacity: 2
            })
        );
        assert_eq!(
            CommandQueue::transfer(&small_arena, &input),
            Err(TransferError::InsufficientArena {
                needed: 60,
                capacity: 50
            })
        );
        assert_eq!(input.len(), 3);
    }

    #[test]
    fn transfer_into_self_rejected() {
        let q = wire_queue(4);
        q.push(&edit(0, 0, 0)).unwrap();
        assert_eq!(
            CommandQueue::transfer(&q, &q),
            Err(TransferError::SameQueue)
        );
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn transferred_source_accepts_new_pushes() {
        let input = wire_queue(2);
        let processing = wire_queue(2);
        input.push(&edit(0, 0, 1)).unwrap();
        input.push(&edit(0, 0, 2)).unwrap();
        CommandQueue::transfer(&processing, &input).unwrap();

        // Source is fully reset: both slots and arena available again.
        input.push(&edit(0, 0, 3)).unwrap();
        input.push(&edit(0, 0, 4)).unwrap();
        assert_eq!(drain(&processing), vec![edit(0, 0, 1), edit(0, 0, 2)]);
        assert_eq!(drain(&input), vec![edit(0, 0, 3), edit(0, 0, 4)]);
    }

    // ── scenarios ──────────────────────────────────────────────

    #[test]
    fn scenario_two_slot_queue_rejects_third_push() {
        let q = CommandQueue::new(2, 64).unwrap();
        let first = edit(1, 2, 1);
        let second = mv(5, 3, 3);
        q.push(&first).unwrap();
        q.push(&second).unwrap();
        assert_eq!(
            q.push(&Command::Step(StepControl::Play)),
            Err(PushError::QueueFull)
        );
        assert_eq!(drain(&q), vec![first, second]);
    }

    #[test]
    fn scenario_transfer_three_then_drain() {
        let a = wire_queue(10);
        let b = wire_queue(10);
        let cmds = [edit(0, 0, 1), edit(1, 1, 2), mv(3, 4, 5)];
        for c in &cmds {
            a.push(c).unwrap();
        }
        assert_eq!(CommandQueue::transfer(&b, &a), Ok(3));
        assert_eq!(a.len(), 0);
        assert_eq!(drain(&b), cmds.to_vec());
    }

    // ── proptest ───────────────────────────────────────────────

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_command() -> impl Strategy<Value = Command> {
            prop_oneof![
                (any::<i32>(), any::<i32>(), any::<i32>())
                    .prop_map(|(x, y, d)| edit(x, y, d)),
                (any::<u64>(), any::<i32>(), any::<i32>()).prop_map(|(id, x, y)| mv(id, x, y)),
                any::<u32>().prop_map(|steps| Command::Step(StepControl::Advance { steps })),
                Just(Command::Step(StepControl::Play)),
                Just(Command::Step(StepControl::Pause)),
            ]
        }

        proptest! {
            #[test]
            fn drain_returns_accepted_prefix_in_order(
                max in 1usize..16,
                arena_records in 1usize..16,
                cmds in prop::collection::vec(arb_command(), 0..32),
            ) {
                let q = CommandQueue::new(max, arena_records * Command::WIRE_SIZE).unwrap();
                let mut accepted = Vec::new();
                for c in &cmds {
                    if q.push(c).is_ok() {
                        accepted.push(*c);
                    }
                }
                // Fixed-size records: acceptance stops at the tighter bound.
                let bound = max.min(arena_records);
                prop_assert_eq!(accepted.len(), cmds.len().min(bound));
                prop_assert_eq!(q.len(), accepted.len());
                prop_assert_eq!(&accepted[..], &cmds[..accepted.len()]);
                prop_assert_eq!(drain(&q), accepted);
                prop_assert!(q.is_empty());
            }

            #[test]
            fn transfer_preserves_contents(
                cmds in prop::collection::vec(arb_command(), 0..16),
            ) {
                let input = wire_queue(16);
                let processing = wire_queue(16);
                for c in &cmds {
                    input.push(c).unwrap();
                }
                prop_assert_eq!(CommandQueue::transfer(&processing, &input), Ok(cmds.len()));
                prop_assert!(input.is_empty());
                prop_assert_eq!(drain(&processing), cmds);
            }
        }
    }
}
