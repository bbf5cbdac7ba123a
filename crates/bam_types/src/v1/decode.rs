//! V1 container decoding: header + tables → in-memory frames and cycles.

use super::constants::{
	CYCLE_ENTRY_SIZE, FRAME_ENTRY_SIZE, MAX_CYCLES, MAX_FRAMES, OFFSET_MASK, PALETTE_SIZE, RAW_FLAG,
};
use super::header::Header;
use crate::color::Color;
use crate::error::{BamError, Container, Result};
use crate::frame::Frame;
use crate::palette::Palette;
use crate::rle;

/// The decoded contents of a V1 body: frames, cycles, palette, and the
/// transparent-index sentinel used by the RLE codec.
pub struct DecodedV1 {
	/// Decoded frames, indexed exactly as the on-disk frame table.
	pub frames: Vec<Frame>,
	/// Decoded cycles, each a list of frame indices.
	pub cycles: Vec<Vec<usize>>,
	/// The 256-entry palette.
	pub palette: Palette,
	/// The palette index used as the RLE transparent sentinel.
	pub transparent_index: u8,
}

/// Parses the uncompressed V1 body (header onward; the "BAMC" wrapper, if
/// any, must already have been stripped by the caller).
pub fn decode_body(data: &[u8]) -> Result<DecodedV1> {
	let header = Header::from_bytes(data)?;

	if header.frame_count == 0 {
		return Err(BamError::empty(Container::V1, "frame list"));
	}
	if header.cycle_count == 0 {
		return Err(BamError::empty(Container::V1, "cycle list"));
	}
	if usize::from(header.frame_count) > MAX_FRAMES {
		return Err(BamError::too_many(Container::V1, "frames", usize::from(header.frame_count), MAX_FRAMES));
	}
	if usize::from(header.cycle_count) > MAX_CYCLES {
		return Err(BamError::too_many(Container::V1, "cycles", usize::from(header.cycle_count), MAX_CYCLES));
	}

	let palette = read_palette(data, header.palette_offset as usize)?;

	let frame_table_offset = header.frame_table_offset as usize;
	let cycle_table_offset = frame_table_offset + usize::from(header.frame_count) * FRAME_ENTRY_SIZE;

	let mut raw_frames = Vec::with_capacity(usize::from(header.frame_count));
	for i in 0..usize::from(header.frame_count) {
		let ofs = frame_table_offset + i * FRAME_ENTRY_SIZE;
		raw_frames.push(read_frame_entry(data, ofs)?);
	}

	let mut cycles = Vec::with_capacity(usize::from(header.cycle_count));
	let mut max_lookup_end = 0usize;
	for i in 0..usize::from(header.cycle_count) {
		let ofs = cycle_table_offset + i * CYCLE_ENTRY_SIZE;
		if ofs + CYCLE_ENTRY_SIZE > data.len() {
			return Err(BamError::insufficient_data(Container::V1, ofs + CYCLE_ENTRY_SIZE, data.len()));
		}
		let length = u16::from_le_bytes(data[ofs..ofs + 2].try_into()?);
		let lookup_start = u16::from_le_bytes(data[ofs + 2..ofs + 4].try_into()?);
		max_lookup_end = max_lookup_end.max(usize::from(lookup_start) + usize::from(length));
		cycles.push((length, lookup_start));
	}

	let lookup_offset = header.lookup_offset as usize;
	let lookup_bytes_needed = max_lookup_end * 2;
	if lookup_offset + lookup_bytes_needed > data.len() {
		return Err(BamError::insufficient_data(Container::V1, lookup_offset + lookup_bytes_needed, data.len()));
	}
	let lookup: Vec<u16> = data[lookup_offset..lookup_offset + lookup_bytes_needed]
		.chunks_exact(2)
		.map(|c| u16::from_le_bytes([c[0], c[1]]))
		.collect();

	let mut resolved_cycles = Vec::with_capacity(cycles.len());
	for (length, lookup_start) in cycles {
		let mut entries = Vec::with_capacity(usize::from(length));
		for j in 0..usize::from(length) {
			let frame_index = lookup[usize::from(lookup_start) + j] as usize;
			if frame_index >= raw_frames.len() {
				return Err(BamError::index_out_of_range(Container::V1, frame_index, raw_frames.len()));
			}
			entries.push(frame_index);
		}
		if entries.is_empty() {
			return Err(BamError::empty(Container::V1, "cycle"));
		}
		resolved_cycles.push(entries);
	}

	let mut frames = Vec::with_capacity(raw_frames.len());
	for entry in raw_frames {
		let pixel_count = usize::from(entry.width) * usize::from(entry.height);
		let ofs = (entry.data_offset & OFFSET_MASK) as usize;
		let is_raw = entry.data_offset & RAW_FLAG != 0;
		let indices = if is_raw {
			if ofs + pixel_count > data.len() {
				return Err(BamError::insufficient_data(Container::V1, ofs + pixel_count, data.len()));
			}
			data[ofs..ofs + pixel_count].to_vec()
		} else {
			// The RLE stream has no explicit length prefix; it runs until it
			// has produced exactly pixel_count bytes, which `rle::decode`
			// enforces via `expected_len`. We hand it the remainder of the
			// file as a generous upper bound on the encoded stream length.
			rle::decode(&data[ofs..], header.transparent_index, pixel_count)?
		};
		frames.push(Frame::new_indexed(entry.width, entry.height, entry.cx, entry.cy, indices));
	}

	Ok(DecodedV1 { frames, cycles: resolved_cycles, palette, transparent_index: header.transparent_index })
}

struct RawFrameEntry {
	width: u16,
	height: u16,
	cx: i16,
	cy: i16,
	data_offset: u32,
}

fn read_frame_entry(data: &[u8], ofs: usize) -> Result<RawFrameEntry> {
	if ofs + FRAME_ENTRY_SIZE > data.len() {
		return Err(BamError::insufficient_data(Container::V1, ofs + FRAME_ENTRY_SIZE, data.len()));
	}
	Ok(RawFrameEntry {
		width: u16::from_le_bytes(data[ofs..ofs + 2].try_into()?),
		height: u16::from_le_bytes(data[ofs + 2..ofs + 4].try_into()?),
		cx: i16::from_le_bytes(data[ofs + 4..ofs + 6].try_into()?),
		cy: i16::from_le_bytes(data[ofs + 6..ofs + 8].try_into()?),
		data_offset: u32::from_le_bytes(data[ofs + 8..ofs + 12].try_into()?),
	})
}

fn read_palette(data: &[u8], ofs: usize) -> Result<Palette> {
	if ofs + PALETTE_SIZE > data.len() {
		return Err(BamError::insufficient_data(Container::V1, ofs + PALETTE_SIZE, data.len()));
	}
	let bytes: [u8; PALETTE_SIZE] = data[ofs..ofs + PALETTE_SIZE].try_into()?;
	let mut palette = Palette::from_argb_bytes(&bytes);
	// Slot 0 is always written as the green sentinel; normalise alpha=0 on
	// the remaining slots back to opaque per the wire-format contract.
	for i in 1..256 {
		if palette[i].a == 0 {
			let c = palette[i];
			palette[i] = Color::rgba(c.r, c.g, c.b, 255);
		}
	}
	Ok(palette)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::v1::encode::{EncodeInput, encode_body};
	use crate::v1::config::V1Config;

	#[test]
	fn decodes_the_single_pixel_scenario_from_the_worked_example() {
		let frame = Frame::new_indexed(1, 1, 0, 0, vec![0]);
		let input = EncodeInput {
			frames: vec![frame],
			cycles: vec![vec![0]],
			palette: {
				let mut p = Palette::blank();
				p[0] = crate::color::GREEN_SENTINEL;
				p
			},
			transparent_index: 0,
		};
		let bytes = encode_body(&input, &V1Config::default()).unwrap();
		let decoded = decode_body(&bytes).unwrap();
		assert_eq!(decoded.frames.len(), 1);
		assert_eq!(decoded.frames[0].width(), 1);
		assert_eq!(decoded.cycles, vec![vec![0]]);
		assert_eq!(decoded.palette[0], crate::color::GREEN_SENTINEL);
	}
}
