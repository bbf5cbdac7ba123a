//! The 32-byte V2 container header.

use super::constants::{HEADER_SIZE, SIGNATURE, VERSION_TAG};
use crate::error::{BamError, Container, Result};

/// The fixed 32-byte V2 header.
///
/// ```text
/// Offset  Size  Field
/// ------  ----  -----------------------------
/// 0x00    4     signature "BAM "
/// 0x04    4     version tag "V2  "
/// 0x08    4     frame count (u32)
/// 0x0C    4     cycle count (u32)
/// 0x10    4     block count (u32)
/// 0x14    4     frame-table offset (u32)
/// 0x18    4     cycle-table offset (u32)
/// 0x1C    4     block-table offset (u32)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
	/// Number of entries in the frame table (one per raw, non-deduplicated position).
	pub frame_count: u32,
	/// Number of cycles in the cycle table.
	pub cycle_count: u32,
	/// Number of entries in the block table.
	pub block_count: u32,
	/// Byte offset of the frame table.
	pub frame_table_offset: u32,
	/// Byte offset of the cycle table.
	pub cycle_table_offset: u32,
	/// Byte offset of the block table.
	pub block_table_offset: u32,
}

impl Header {
	/// Parses a header from the first [`HEADER_SIZE`] bytes of `data`.
	pub fn from_bytes(data: &[u8]) -> Result<Self> {
		if data.len() < HEADER_SIZE {
			return Err(BamError::insufficient_data(Container::V2, HEADER_SIZE, data.len()));
		}
		if &data[0..4] != SIGNATURE {
			return Err(BamError::invalid_signature(Container::V2, &SIGNATURE, &data[0..4]));
		}
		if &data[4..8] != VERSION_TAG {
			return Err(BamError::invalid_signature(Container::V2, &VERSION_TAG, &data[4..8]));
		}
		Ok(Self {
			frame_count: u32::from_le_bytes(data[8..12].try_into()?),
			cycle_count: u32::from_le_bytes(data[12..16].try_into()?),
			block_count: u32::from_le_bytes(data[16..20].try_into()?),
			frame_table_offset: u32::from_le_bytes(data[20..24].try_into()?),
			cycle_table_offset: u32::from_le_bytes(data[24..28].try_into()?),
			block_table_offset: u32::from_le_bytes(data[28..32].try_into()?),
		})
	}

	/// Serialises the header to its 32-byte wire form.
	#[must_use]
	pub fn to_bytes(self) -> [u8; HEADER_SIZE] {
		let mut out = [0u8; HEADER_SIZE];
		out[0..4].copy_from_slice(&SIGNATURE);
		out[4..8].copy_from_slice(&VERSION_TAG);
		out[8..12].copy_from_slice(&self.frame_count.to_le_bytes());
		out[12..16].copy_from_slice(&self.cycle_count.to_le_bytes());
		out[16..20].copy_from_slice(&self.block_count.to_le_bytes());
		out[20..24].copy_from_slice(&self.frame_table_offset.to_le_bytes());
		out[24..28].copy_from_slice(&self.cycle_table_offset.to_le_bytes());
		out[28..32].copy_from_slice(&self.block_table_offset.to_le_bytes());
		out
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn header_roundtrips() {
		let header = Header {
			frame_count: 3,
			cycle_count: 1,
			block_count: 5,
			frame_table_offset: 32,
			cycle_table_offset: 68,
			block_table_offset: 72,
		};
		let bytes = header.to_bytes();
		assert_eq!(Header::from_bytes(&bytes).unwrap(), header);
	}

	#[test]
	fn rejects_wrong_version_tag() {
		let mut bytes = [0u8; HEADER_SIZE];
		bytes[0..4].copy_from_slice(b"BAM ");
		bytes[4..8].copy_from_slice(b"V1  ");
		assert!(Header::from_bytes(&bytes).is_err());
	}
}
