//! Byte-layout constants for the V2 (truecolour/PVRZ) container.

/// "BAM " version signature, bytes 0..4.
pub const SIGNATURE: [u8; 4] = *b"BAM ";
/// "V2  " version tag, bytes 4..8.
pub const VERSION_TAG: [u8; 4] = *b"V2  ";

/// Size of the V2 header, in bytes.
pub const HEADER_SIZE: usize = 32;
/// Size of one frame-table entry, in bytes.
pub const FRAME_ENTRY_SIZE: usize = 12;
/// Size of one cycle-table entry, in bytes.
pub const CYCLE_ENTRY_SIZE: usize = 4;
/// Size of one block-table entry, in bytes.
pub const BLOCK_ENTRY_SIZE: usize = 28;

/// Maximum side length of a PVRZ page.
pub const MAX_PAGE_SIDE: u32 = 1024;

/// Maximum number of cycle-table entries (cycle length) representable in a `u16`.
pub const MAX_CYCLE_ENTRIES: usize = u16::MAX as usize;
/// Maximum `pvrz_start_index` value per §4.8.
pub const MAX_PVRZ_START_INDEX: u32 = 99_999;
