//! V2 container decoding: header + tables + PVRZ blocks → deduplicated
//! in-memory frames and cycles.

use super::constants::{BLOCK_ENTRY_SIZE, CYCLE_ENTRY_SIZE, FRAME_ENTRY_SIZE};
use super::header::Header;
use crate::color::Color;
use crate::error::{BamError, Container, Result};
use crate::frame::Frame;
use crate::pvrz::Pvrz;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

struct RawFrameEntry {
	width: u16,
	height: u16,
	cx: i16,
	cy: i16,
	first_block: u16,
	block_count: u16,
}

struct RawBlockEntry {
	page: u32,
	sx: u32,
	sy: u32,
	w: u32,
	h: u32,
	dx: u32,
	dy: u32,
}

/// The decoded contents of a V2 body: hash-deduplicated frames and cycles
/// rewritten to reference them.
pub struct DecodedV2 {
	/// Deduplicated model frames, each `PixelData::Rgba`.
	pub frames: Vec<Frame>,
	/// Decoded cycles, each a list of indices into [`DecodedV2::frames`].
	pub cycles: Vec<Vec<usize>>,
}

/// Parses a V2 body, loading PVRZ pages on demand via `load_page`. Pages are
/// cached by index for the duration of one decode; `load_page` is
/// responsible for the search-path walk and for reporting
/// [`BamError::MissingPvrz`] when nothing matches.
pub fn decode_body(data: &[u8], mut load_page: impl FnMut(u32) -> Result<Pvrz>) -> Result<DecodedV2> {
	let header = Header::from_bytes(data)?;

	if header.frame_count == 0 {
		return Err(BamError::empty(Container::V2, "frame list"));
	}
	if header.cycle_count == 0 {
		return Err(BamError::empty(Container::V2, "cycle list"));
	}
	if header.block_count == 0 {
		return Err(BamError::empty(Container::V2, "block list"));
	}

	let raw_frames = read_frame_table(data, &header)?;
	let raw_blocks = read_block_table(data, &header)?;
	let raw_cycles = read_cycle_table(data, &header, raw_frames.len())?;

	let mut page_cache: HashMap<u32, Pvrz> = HashMap::new();
	let mut raw_rgba_frames: Vec<Frame> = Vec::with_capacity(raw_frames.len());

	for entry in &raw_frames {
		let mut pixels = vec![Color::default(); usize::from(entry.width) * usize::from(entry.height)];
		let first = usize::from(entry.first_block);
		let count = usize::from(entry.block_count);
		if first + count > raw_blocks.len() {
			return Err(BamError::index_out_of_range(Container::V2, first + count, raw_blocks.len()));
		}
		for block in &raw_blocks[first..first + count] {
			if !page_cache.contains_key(&block.page) {
				let page = load_page(block.page)?;
				page_cache.insert(block.page, page);
			}
			let page = &page_cache[&block.page];
			if block.sx + block.w > page.width() || block.sy + block.h > page.height() {
				return Err(BamError::index_out_of_range(
					Container::V2,
					(block.sx + block.w) as usize,
					page.width() as usize,
				));
			}
			if block.dx + block.w > u32::from(entry.width) || block.dy + block.h > u32::from(entry.height) {
				return Err(BamError::index_out_of_range(
					Container::V2,
					(block.dx + block.w) as usize,
					u32::from(entry.width) as usize,
				));
			}
			let page_image = page.get_image();
			for row in 0..block.h {
				for col in 0..block.w {
					let src = ((block.sy + row) * page.width() + (block.sx + col)) as usize;
					let dst = ((block.dy + row) * u32::from(entry.width) + (block.dx + col)) as usize;
					pixels[dst] = page_image[src];
				}
			}
		}
		raw_rgba_frames.push(Frame::new_rgba(entry.width, entry.height, entry.cx, entry.cy, pixels));
	}

	let mut seen: HashMap<u64, usize> = HashMap::new();
	let mut translation: Vec<usize> = Vec::with_capacity(raw_rgba_frames.len());
	let mut frames: Vec<Frame> = Vec::new();
	for frame in raw_rgba_frames {
		let hash = content_hash(&frame);
		if let Some(&existing) = seen.get(&hash) {
			translation.push(existing);
		} else {
			let index = frames.len();
			seen.insert(hash, index);
			translation.push(index);
			frames.push(frame);
		}
	}

	let mut cycles = Vec::with_capacity(raw_cycles.len());
	for (length, first_frame_index) in raw_cycles {
		let entries: Vec<usize> = (0..length)
			.map(|i| translation[first_frame_index + i])
			.collect();
		cycles.push(entries);
	}

	Ok(DecodedV2 { frames, cycles })
}

fn content_hash(frame: &Frame) -> u64 {
	let mut hasher = DefaultHasher::new();
	frame.width().hash(&mut hasher);
	frame.height().hash(&mut hasher);
	frame.cx().hash(&mut hasher);
	frame.cy().hash(&mut hasher);
	if let Some(pixels) = frame.as_rgba() {
		for c in pixels {
			c.r.hash(&mut hasher);
			c.g.hash(&mut hasher);
			c.b.hash(&mut hasher);
			c.a.hash(&mut hasher);
		}
	}
	hasher.finish()
}

fn read_frame_table(data: &[u8], header: &Header) -> Result<Vec<RawFrameEntry>> {
	let mut out = Vec::with_capacity(header.frame_count as usize);
	for i in 0..header.frame_count as usize {
		let ofs = header.frame_table_offset as usize + i * FRAME_ENTRY_SIZE;
		if ofs + FRAME_ENTRY_SIZE > data.len() {
			return Err(BamError::insufficient_data(Container::V2, ofs + FRAME_ENTRY_SIZE, data.len()));
		}
		out.push(RawFrameEntry {
			width: u16::from_le_bytes(data[ofs..ofs + 2].try_into()?),
			height: u16::from_le_bytes(data[ofs + 2..ofs + 4].try_into()?),
			cx: i16::from_le_bytes(data[ofs + 4..ofs + 6].try_into()?),
			cy: i16::from_le_bytes(data[ofs + 6..ofs + 8].try_into()?),
			first_block: u16::from_le_bytes(data[ofs + 8..ofs + 10].try_into()?),
			block_count: u16::from_le_bytes(data[ofs + 10..ofs + 12].try_into()?),
		});
	}
	Ok(out)
}

fn read_block_table(data: &[u8], header: &Header) -> Result<Vec<RawBlockEntry>> {
	let mut out = Vec::with_capacity(header.block_count as usize);
	for i in 0..header.block_count as usize {
		let ofs = header.block_table_offset as usize + i * BLOCK_ENTRY_SIZE;
		if ofs + BLOCK_ENTRY_SIZE > data.len() {
			return Err(BamError::insufficient_data(Container::V2, ofs + BLOCK_ENTRY_SIZE, data.len()));
		}
		out.push(RawBlockEntry {
			page: u32::from_le_bytes(data[ofs..ofs + 4].try_into()?),
			sx: u32::from_le_bytes(data[ofs + 4..ofs + 8].try_into()?),
			sy: u32::from_le_bytes(data[ofs + 8..ofs + 12].try_into()?),
			w: u32::from_le_bytes(data[ofs + 12..ofs + 16].try_into()?),
			h: u32::from_le_bytes(data[ofs + 16..ofs + 20].try_into()?),
			dx: u32::from_le_bytes(data[ofs + 20..ofs + 24].try_into()?),
			dy: u32::from_le_bytes(data[ofs + 24..ofs + 28].try_into()?),
		});
	}
	Ok(out)
}

fn read_cycle_table(data: &[u8], header: &Header, frame_count: usize) -> Result<Vec<(usize, usize)>> {
	let mut out = Vec::with_capacity(header.cycle_count as usize);
	for i in 0..header.cycle_count as usize {
		let ofs = header.cycle_table_offset as usize + i * CYCLE_ENTRY_SIZE;
		if ofs + CYCLE_ENTRY_SIZE > data.len() {
			return Err(BamError::insufficient_data(Container::V2, ofs + CYCLE_ENTRY_SIZE, data.len()));
		}
		let length = u16::from_le_bytes(data[ofs..ofs + 2].try_into()?) as usize;
		let first_frame_index = u16::from_le_bytes(data[ofs + 2..ofs + 4].try_into()?) as usize;
		if length == 0 {
			return Err(BamError::empty(Container::V2, "cycle"));
		}
		if first_frame_index + length > frame_count {
			return Err(BamError::index_out_of_range(Container::V2, first_frame_index + length, frame_count));
		}
		out.push((length, first_frame_index));
	}
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::v2::encode::{encode_body, EncodeInput};
	use crate::v2::config::V2Config;

	#[test]
	fn decodes_a_single_tile_roundtrip() {
		let frame = Frame::new_rgba(2, 2, 0, 0, vec![Color::rgb(10, 20, 30); 4]);
		let input = EncodeInput { frames: vec![frame], cycles: vec![vec![0]] };
		let output = encode_body(&input, &V2Config::default()).unwrap();
		let pages = output.pages.clone();
		let decoded = decode_body(&output.bytes, |page_index| {
			pages
				.iter()
				.find(|(i, _)| *i == page_index)
				.map(|(_, p)| p.clone())
				.ok_or(BamError::MissingPvrz { index: page_index, searched: 1 })
		})
		.unwrap();
		assert_eq!(decoded.frames.len(), 1);
		assert_eq!(decoded.cycles, vec![vec![0]]);
		assert_eq!(decoded.frames[0].width(), 2);
	}

	#[test]
	fn identical_frames_dedup_to_one_model_frame() {
		let frame_a = Frame::new_rgba(1, 1, 0, 0, vec![Color::rgb(5, 5, 5)]);
		let frame_b = Frame::new_rgba(1, 1, 0, 0, vec![Color::rgb(5, 5, 5)]);
		let input = EncodeInput { frames: vec![frame_a, frame_b], cycles: vec![vec![0, 1]] };
		let output = encode_body(&input, &V2Config::default()).unwrap();
		let pages = output.pages.clone();
		let decoded = decode_body(&output.bytes, |page_index| {
			pages
				.iter()
				.find(|(i, _)| *i == page_index)
				.map(|(_, p)| p.clone())
				.ok_or(BamError::MissingPvrz { index: page_index, searched: 1 })
		})
		.unwrap();
		assert_eq!(decoded.frames.len(), 1);
		assert_eq!(decoded.cycles, vec![vec![0, 0]]);
	}
}
