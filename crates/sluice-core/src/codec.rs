//! Fixed-size binary record encoding for commands.
//!
//! Every [`Command`] encodes to exactly [`Command::WIRE_SIZE`] bytes: a
//! little-endian `u32` kind tag followed by a 16-byte payload area.
//! Payload fields are little-endian and unused payload bytes are zero.
//! The layout is in-process only: no magic, no version, no alignment
//! padding. It must not change for the lifetime of a running transport
//! because the consumer decodes raw bytes by offset.
//!
//! ```text
//! offset  0        4        8        12       16       20
//!         | tag    | payload ----------------------------|
//! terrain | 1      | x      | y      | delta  | 0      |
//! move    | 2      | entity (u64)    | x      | y      |
//! advance | 3      | steps  | 0 ...                    |
//! play    | 4      | 0 ...                             |
//! pause   | 5      | 0 ...                             |
//! ```

use crate::command::{Command, StepControl};
use crate::error::DecodeError;
use crate::id::{CellCoord, EntityId};

/// Tag for [`Command::TerrainEdit`].
pub const TAG_TERRAIN_EDIT: u32 = 1;
/// Tag for [`Command::EntityMove`].
pub const TAG_ENTITY_MOVE: u32 = 2;
/// Tag for [`StepControl::Advance`].
pub const TAG_STEP_ADVANCE: u32 = 3;
/// Tag for [`StepControl::Play`].
pub const TAG_STEP_PLAY: u32 = 4;
/// Tag for [`StepControl::Pause`].
pub const TAG_STEP_PAUSE: u32 = 5;

const TAG_LEN: usize = 4;
const PAYLOAD_LEN: usize = 16;

/// A value with a fixed-size, self-contained binary record.
///
/// Implemented by [`Command`]. The queue layer is byte-oriented; this
/// trait is the bridge between typed producers/consumers and the arena.
pub trait WireRecord: Sized {
    /// Exact encoded size in bytes.
    const RECORD_SIZE: usize;

    /// Encode into `buf`, which must be exactly `RECORD_SIZE` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `buf.len() != RECORD_SIZE`.
    fn encode_into(&self, buf: &mut [u8]);

    /// Decode a record previously produced by [`encode_into`](Self::encode_into).
    fn decode(bytes: &[u8]) -> Result<Self, DecodeError>;
}

impl Command {
    /// Size of one encoded command record in bytes.
    pub const WIRE_SIZE: usize = TAG_LEN + PAYLOAD_LEN;

    /// The kind tag written at the head of this command's record.
    pub fn tag(&self) -> u32 {
        match self {
            Self::TerrainEdit { .. } => TAG_TERRAIN_EDIT,
            Self::EntityMove { .. } => TAG_ENTITY_MOVE,
            Self::Step(StepControl::Advance { .. }) => TAG_STEP_ADVANCE,
            Self::Step(StepControl::Play) => TAG_STEP_PLAY,
            Self::Step(StepControl::Pause) => TAG_STEP_PAUSE,
        }
    }

    /// Encode into a fresh fixed-size record.
    pub fn encode(&self) -> [u8; Command::WIRE_SIZE] {
        let mut buf = [0u8; Command::WIRE_SIZE];
        self.encode_into(&mut buf);
        buf
    }
}

impl WireRecord for Command {
    const RECORD_SIZE: usize = Command::WIRE_SIZE;

    fn encode_into(&self, buf: &mut [u8]) {
        assert_eq!(
            buf.len(),
            Command::WIRE_SIZE,
            "command record buffer must be exactly {} bytes",
            Command::WIRE_SIZE
        );
        buf.fill(0);
        put_u32(buf, 0, self.tag());
        match *self {
            Self::TerrainEdit { cell, delta } => {
                put_i32(buf, 4, cell.x);
                put_i32(buf, 8, cell.y);
                put_i32(buf, 12, delta);
            }
            Self::EntityMove { entity, target } => {
                put_u64(buf, 4, entity.0);
                put_i32(buf, 12, target.x);
                put_i32(buf, 16, target.y);
            }
            Self::Step(StepControl::Advance { steps }) => {
                put_u32(buf, 4, steps);
            }
            Self::Step(StepControl::Play) | Self::Step(StepControl::Pause) => {}
        }
    }

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() != Command::WIRE_SIZE {
            return Err(DecodeError::LengthMismatch {
                expected: Command::WIRE_SIZE,
                found: bytes.len(),
            });
        }
        let tag = get_u32(bytes, 0);
        let cmd = match tag {
            TAG_TERRAIN_EDIT => Self::TerrainEdit {
                cell: CellCoord::new(get_i32(bytes, 4), get_i32(bytes, 8)),
                delta: get_i32(bytes, 12),
            },
            TAG_ENTITY_MOVE => Self::EntityMove {
                entity: EntityId(get_u64(bytes, 4)),
                target: CellCoord::new(get_i32(bytes, 12), get_i32(bytes, 16)),
            },
            TAG_STEP_ADVANCE => Self::Step(StepControl::Advance {
                steps: get_u32(bytes, 4),
            }),
            TAG_STEP_PLAY => Self::Step(StepControl::Play),
            TAG_STEP_PAUSE => Self::Step(StepControl::Pause),
            other => return Err(DecodeError::UnknownTag { tag: other }),
        };
        Ok(cmd)
    }
}

// ── Little-endian field helpers ─────────────────────────────────
//
// Callers have already checked the record length, so the fixed-width
// slices below are always in bounds.

fn put_u32(buf: &mut [u8], at: usize, v: u32) {
    buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

fn put_i32(buf: &mut [u8], at: usize, v: i32) {
    buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

fn put_u64(buf: &mut [u8], at: usize, v: u64) {
    buf[at..at + 8].copy_from_slice(&v.to_le_bytes());
}

fn get_u32(bytes: &[u8], at: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(raw)
}

fn get_i32(bytes: &[u8], at: usize) -> i32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[at..at + 4]);
    i32::from_le_bytes(raw)
}

fn get_u64(bytes: &[u8], at: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(raw)
}
