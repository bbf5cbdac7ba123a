//! Byte-layout constants for the V1 (palettised) container.

/// "BAM " version signature, bytes 0..4.
pub const SIGNATURE: [u8; 4] = *b"BAM ";
/// "V1  " version tag, bytes 4..8.
pub const VERSION_TAG: [u8; 4] = *b"V1  ";
/// "BAMC" compressed-envelope signature.
pub const COMPRESSED_SIGNATURE: [u8; 4] = *b"BAMC";

/// Size of the uncompressed V1 header, in bytes.
pub const HEADER_SIZE: usize = 24;
/// Size of the "BAMC" compressed envelope prefix, in bytes.
pub const COMPRESSED_PREFIX_SIZE: usize = 12;
/// Size of one frame-table entry, in bytes.
pub const FRAME_ENTRY_SIZE: usize = 12;
/// Size of one cycle-table entry, in bytes.
pub const CYCLE_ENTRY_SIZE: usize = 4;
/// Number of palette entries (always exactly 256 in V1).
pub const PALETTE_ENTRIES: usize = 256;
/// Size of the palette table, in bytes.
pub const PALETTE_SIZE: usize = PALETTE_ENTRIES * 4;

/// Bit 31 of a frame's data offset: set means the frame data is stored raw;
/// clear means it is RLE-encoded.
pub const RAW_FLAG: u32 = 1 << 31;
/// Mask isolating the actual offset from [`RAW_FLAG`].
pub const OFFSET_MASK: u32 = !RAW_FLAG;

/// Maximum number of frames representable in a `u16` count.
pub const MAX_FRAMES: usize = u16::MAX as usize;
/// Maximum number of cycles representable in a `u8` count.
pub const MAX_CYCLES: usize = u8::MAX as usize;
/// Maximum number of lookup-table entries (cycle length) representable in a `u16`.
pub const MAX_CYCLE_ENTRIES: usize = u16::MAX as usize;
