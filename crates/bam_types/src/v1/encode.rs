//! V1 container encoding: in-memory frames and cycles → header + tables.

use super::config::{RleMode, V1Config};
use super::constants::{
	CYCLE_ENTRY_SIZE, FRAME_ENTRY_SIZE, HEADER_SIZE, MAX_CYCLES, MAX_CYCLE_ENTRIES, MAX_FRAMES,
	PALETTE_SIZE, RAW_FLAG,
};
use super::header::Header;
use crate::error::{BamError, Container, Result};
use crate::frame::Frame;
use crate::palette::Palette;
use crate::rle;
use std::collections::HashMap;

/// Already-paletted input to [`encode_body`]: the palette engine (C2) has
/// already run by the time this is called.
pub struct EncodeInput {
	/// Paletted frames (each must hold [`crate::frame::PixelData::Indexed`]).
	pub frames: Vec<Frame>,
	/// Cycles, each a non-empty list of frame indices.
	pub cycles: Vec<Vec<usize>>,
	/// The final 256-entry palette, already normalised.
	pub palette: Palette,
	/// Palette slot used as the RLE transparent sentinel.
	pub transparent_index: u8,
}

/// Serialises `input` into an uncompressed V1 body (no "BAMC" wrapper).
pub fn encode_body(input: &EncodeInput, config: &V1Config) -> Result<Vec<u8>> {
	if input.frames.is_empty() {
		return Err(BamError::empty(Container::V1, "frame list"));
	}
	if input.cycles.is_empty() {
		return Err(BamError::empty(Container::V1, "cycle list"));
	}
	if input.frames.len() > MAX_FRAMES {
		return Err(BamError::too_many(Container::V1, "frames", input.frames.len(), MAX_FRAMES));
	}
	if input.cycles.len() > MAX_CYCLES {
		return Err(BamError::too_many(Container::V1, "cycles", input.cycles.len(), MAX_CYCLES));
	}
	for cycle in &input.cycles {
		for &frame_index in cycle {
			if frame_index >= input.frames.len() {
				return Err(BamError::index_out_of_range(Container::V1, frame_index, input.frames.len()));
			}
		}
	}
	let total_lookup_entries: usize = input.cycles.iter().map(Vec::len).sum();
	if total_lookup_entries > MAX_CYCLE_ENTRIES {
		return Err(BamError::too_many(
			Container::V1,
			"cycle entries",
			total_lookup_entries,
			MAX_CYCLE_ENTRIES,
		));
	}

	let frame_table_offset = HEADER_SIZE;
	let cycle_table_offset = frame_table_offset + input.frames.len() * FRAME_ENTRY_SIZE;
	let palette_offset = cycle_table_offset + input.cycles.len() * CYCLE_ENTRY_SIZE;
	if input.palette.entries().len() != 256 {
		return Err(BamError::PaletteTooSmall { expected: 256, actual: input.palette.entries().len() });
	}
	let lookup_offset = palette_offset + PALETTE_SIZE;
	let frame_data_start = lookup_offset + total_lookup_entries * 2;

	let mut frame_data = Vec::new();
	let mut frame_entries = Vec::with_capacity(input.frames.len());
	let mut dedup: HashMap<(Vec<u8>, bool), u32> = HashMap::new();

	for frame in &input.frames {
		let indices = frame.as_indexed().ok_or_else(|| BamError::Empty {
			container: Container::V1,
			what: "indexed pixel data (encode a palettised frame)",
		})?;

		let (payload, is_raw) = choose_encoding(indices, input.transparent_index, config.rle_mode);
		let key = (payload.clone(), is_raw);
		let data_offset = if let Some(&existing) = dedup.get(&key) {
			existing
		} else {
			let offset = u32::try_from(frame_data_start + frame_data.len())
				.expect("frame data offset fits in u32");
			frame_data.extend_from_slice(&payload);
			dedup.insert(key, offset);
			offset
		};

		let flagged_offset = if is_raw { data_offset | RAW_FLAG } else { data_offset };
		frame_entries.push((frame.width(), frame.height(), frame.cx(), frame.cy(), flagged_offset));
	}

	let mut lookup = Vec::with_capacity(total_lookup_entries);
	let mut cycle_entries = Vec::with_capacity(input.cycles.len());
	for cycle in &input.cycles {
		if cycle.is_empty() {
			return Err(BamError::empty(Container::V1, "cycle"));
		}
		let lookup_start = u16::try_from(lookup.len()).expect("lookup offset fits in u16");
		for &frame_index in cycle {
			lookup.push(u16::try_from(frame_index).expect("frame index fits in u16"));
		}
		cycle_entries.push((u16::try_from(cycle.len()).expect("cycle length fits in u16"), lookup_start));
	}

	let header = Header {
		frame_count: u16::try_from(input.frames.len()).expect("frame count fits in u16"),
		cycle_count: u8::try_from(input.cycles.len()).expect("cycle count fits in u8"),
		transparent_index: input.transparent_index,
		frame_table_offset: frame_table_offset as u32,
		palette_offset: palette_offset as u32,
		lookup_offset: lookup_offset as u32,
	};

	let mut out = Vec::with_capacity(frame_data_start + frame_data.len());
	out.extend_from_slice(&header.to_bytes());
	for (w, h, cx, cy, data_offset) in frame_entries {
		out.extend_from_slice(&w.to_le_bytes());
		out.extend_from_slice(&h.to_le_bytes());
		out.extend_from_slice(&cx.to_le_bytes());
		out.extend_from_slice(&cy.to_le_bytes());
		out.extend_from_slice(&data_offset.to_le_bytes());
	}
	for (length, lookup_start) in cycle_entries {
		out.extend_from_slice(&length.to_le_bytes());
		out.extend_from_slice(&lookup_start.to_le_bytes());
	}
	out.extend_from_slice(&write_palette(&input.palette, config.discard_alpha));
	for entry in lookup {
		out.extend_from_slice(&entry.to_le_bytes());
	}
	out.extend_from_slice(&frame_data);

	Ok(out)
}

fn write_palette(palette: &Palette, discard_alpha: bool) -> [u8; PALETTE_SIZE] {
	let mut bytes = palette.to_argb_bytes();
	// Slot 0 is always the green sentinel with A=0, per the wire contract.
	bytes[0..4].copy_from_slice(&crate::color::GREEN_SENTINEL.to_argb_u32().to_le_bytes());
	if discard_alpha {
		for chunk in bytes.chunks_exact_mut(4) {
			chunk[3] = 0;
		}
		bytes[3] = 0;
	}
	bytes
}

/// Picks the frame payload per `mode`, returning `(bytes, is_raw)`.
fn choose_encoding(indices: &[u8], transparent: u8, mode: RleMode) -> (Vec<u8>, bool) {
	match mode {
		RleMode::Off => (indices.to_vec(), true),
		RleMode::On => (rle::encode(indices, transparent), false),
		RleMode::Auto => {
			let encoded = rle::encode(indices, transparent);
			if encoded.len() < indices.len() {
				(encoded, false)
			} else {
				(indices.to_vec(), true)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::color::GREEN_SENTINEL;

	fn sample_input() -> EncodeInput {
		let frame = Frame::new_indexed(1, 1, 0, 0, vec![0]);
		let mut palette = Palette::blank();
		palette[0] = GREEN_SENTINEL;
		EncodeInput { frames: vec![frame], cycles: vec![vec![0]], palette, transparent_index: 0 }
	}

	#[test]
	fn matches_the_empty_1x1_worked_scenario_header_layout() {
		let input = sample_input();
		let bytes = encode_body(&input, &V1Config::default()).unwrap();
		assert_eq!(&bytes[0..4], b"BAM ");
		assert_eq!(&bytes[4..8], b"V1  ");
		assert_eq!(u16::from_le_bytes([bytes[8], bytes[9]]), 1);
		assert_eq!(bytes[10], 1);
		// Frame table entry: w=1 h=1 cx=0 cy=0, data offset bit31 set (raw, single byte)
		let frame_entry = &bytes[24..36];
		assert_eq!(&frame_entry[0..2], &1u16.to_le_bytes());
		assert_eq!(&frame_entry[2..4], &1u16.to_le_bytes());
	}

	#[test]
	fn rejects_cycle_referencing_missing_frame() {
		let mut input = sample_input();
		input.cycles = vec![vec![5]];
		assert!(encode_body(&input, &V1Config::default()).is_err());
	}

	#[test]
	fn identical_frames_share_one_data_block() {
		let frame_a = Frame::new_indexed(2, 2, 0, 0, vec![1, 1, 1, 1]);
		let frame_b = Frame::new_indexed(2, 2, 0, 0, vec![1, 1, 1, 1]);
		let mut palette = Palette::blank();
		palette[0] = GREEN_SENTINEL;
		let input = EncodeInput {
			frames: vec![frame_a, frame_b],
			cycles: vec![vec![0, 1]],
			palette,
			transparent_index: 0,
		};
		let bytes = encode_body(&input, &V1Config { rle_mode: RleMode::Off, ..V1Config::default() }).unwrap();
		let entry_a = &bytes[24..36];
		let entry_b = &bytes[36..48];
		let offset_a = u32::from_le_bytes(entry_a[8..12].try_into().unwrap());
		let offset_b = u32::from_le_bytes(entry_b[8..12].try_into().unwrap());
		assert_eq!(offset_a, offset_b);
	}
}
