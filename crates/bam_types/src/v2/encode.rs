//! V2 container encoding: RGBA frames → tiled, packed PVRZ pages + header/tables.

use super::config::V2Config;
use super::constants::{
	BLOCK_ENTRY_SIZE, CYCLE_ENTRY_SIZE, FRAME_ENTRY_SIZE, HEADER_SIZE, MAX_CYCLE_ENTRIES, MAX_PAGE_SIDE,
};
use super::header::Header;
use crate::color::Color;
use crate::error::{BamError, Container, Result};
use crate::frame::Frame;
use crate::pack::Bin;
use crate::pvrz::{Point, Pvrz, Rect};

/// Input to [`encode_body`]: the model's own frame list and cycles. V2
/// encode does not deduplicate — cycles are flattened into a raw,
/// per-position frame table, one entry per cycle slot.
pub struct EncodeInput {
	/// The model's frames, each holding `PixelData::Rgba`.
	pub frames: Vec<Frame>,
	/// Cycles, each a non-empty list of indices into [`EncodeInput::frames`].
	pub cycles: Vec<Vec<usize>>,
}

/// Output of [`encode_body`]: the serialised container and the PVRZ pages
/// it references, keyed by `pvrz_start_index + local_index`.
pub struct EncodeOutput {
	/// The serialised V2 container bytes.
	pub bytes: Vec<u8>,
	/// Pages produced during packing, in page-index order.
	pub pages: Vec<(u32, Pvrz)>,
}

struct Tile {
	raw_frame: usize,
	src_x: u32,
	src_y: u32,
	w: u32,
	h: u32,
}

struct PlacedTile {
	tile: Tile,
	bin: usize,
	x: u32,
	y: u32,
}

/// Serialises `input` into a V2 container, tiling and packing frame pixels
/// into fresh PVRZ pages per §4.8.
pub fn encode_body(input: &EncodeInput, config: &V2Config) -> Result<EncodeOutput> {
	if input.frames.is_empty() {
		return Err(BamError::empty(Container::V2, "frame list"));
	}
	if input.cycles.is_empty() {
		return Err(BamError::empty(Container::V2, "cycle list"));
	}

	let mut raw_frames: Vec<&Frame> = Vec::new();
	let mut cycle_ranges: Vec<(usize, usize)> = Vec::with_capacity(input.cycles.len());
	for cycle in &input.cycles {
		if cycle.is_empty() {
			return Err(BamError::empty(Container::V2, "cycle"));
		}
		let first = raw_frames.len();
		for &frame_index in cycle {
			if frame_index >= input.frames.len() {
				return Err(BamError::index_out_of_range(Container::V2, frame_index, input.frames.len()));
			}
			raw_frames.push(&input.frames[frame_index]);
		}
		cycle_ranges.push((first, cycle.len()));
	}

	if raw_frames.len() > MAX_CYCLE_ENTRIES {
		return Err(BamError::too_many(Container::V2, "frames", raw_frames.len(), MAX_CYCLE_ENTRIES));
	}

	let mut tiles: Vec<Tile> = Vec::new();
	let mut frame_tile_range: Vec<(usize, usize)> = Vec::with_capacity(raw_frames.len());
	for (raw_index, frame) in raw_frames.iter().enumerate() {
		if frame.as_rgba().is_none() {
			return Err(BamError::Empty {
				container: Container::V2,
				what: "RGBA pixel data (encode a truecolour frame)",
			});
		}
		let w = u32::from(frame.width());
		let h = u32::from(frame.height());
		let first_tile = tiles.len();
		let mut y = 0;
		while y < h {
			let tile_h = (h - y).min(MAX_PAGE_SIDE);
			let mut x = 0;
			while x < w {
				let tile_w = (w - x).min(MAX_PAGE_SIDE);
				tiles.push(Tile { raw_frame: raw_index, src_x: x, src_y: y, w: tile_w, h: tile_h });
				x += tile_w;
			}
			y += tile_h;
		}
		frame_tile_range.push((first_tile, tiles.len() - first_tile));
	}

	let mut bins: Vec<Bin> = Vec::new();
	let mut bin_has_alpha: Vec<bool> = Vec::new();
	let mut placed: Vec<PlacedTile> = Vec::with_capacity(tiles.len());
	let cutoff = config.alpha_cutoff();

	for tile in tiles {
		let frame = raw_frames[tile.raw_frame];
		let pixels = frame.as_rgba().expect("validated RGBA above");
		let frame_w = u32::from(frame.width());

		let has_alpha = (tile.src_y..tile.src_y + tile.h).any(|row| {
			(tile.src_x..tile.src_x + tile.w)
				.any(|col| {
					let c = pixels[(row * frame_w + col) as usize];
					c.a > 0 && c.a < cutoff
				})
		});

		let mut placement = None;
		for (bin_index, bin) in bins.iter_mut().enumerate() {
			if let Some(p) = bin.insert(tile.w, tile.h) {
				placement = Some((bin_index, p));
				break;
			}
		}
		let (bin_index, p) = match placement {
			Some(found) => found,
			None => {
				let mut bin = Bin::new(MAX_PAGE_SIDE, MAX_PAGE_SIDE);
				let p = bin.insert(tile.w, tile.h).ok_or(BamError::PackingFailed {
					width: tile.w,
					height: tile.h,
					bin: MAX_PAGE_SIDE,
				})?;
				bins.push(bin);
				bin_has_alpha.push(false);
				(bins.len() - 1, p)
			}
		};
		if has_alpha {
			bin_has_alpha[bin_index] = true;
		}
		placed.push(PlacedTile { tile, bin: bin_index, x: p.x, y: p.y });
	}

	for bin in &mut bins {
		bin.shrink(config.allow_non_power_of_two_pages);
	}

	let mut pages: Vec<Pvrz> = bins
		.iter()
		.zip(bin_has_alpha.iter())
		.map(|(bin, &has_alpha)| {
			let mut page = Pvrz::new(bin.width(), bin.height(), config.format_for(has_alpha));
			page.set_quality(config.quality);
			page.set_weight_by_alpha(config.weight_by_alpha);
			page.set_perceptual_metric(config.perceptual_metric);
			page
		})
		.collect();

	let mut block_entries: Vec<(u32, u32, u32, u32, u32, u32, u32)> = Vec::with_capacity(placed.len());
	for placed_tile in &placed {
		let frame = raw_frames[placed_tile.tile.raw_frame];
		let frame_pixels = frame.as_rgba().expect("validated RGBA above");
		let frame_w = u32::from(frame.width());
		let src_rect = Rect {
			x: placed_tile.tile.src_x,
			y: placed_tile.tile.src_y,
			w: placed_tile.tile.w,
			h: placed_tile.tile.h,
		};
		pages[placed_tile.bin].set_image_rect(
			frame_pixels,
			frame_w,
			src_rect,
			Point { x: placed_tile.x, y: placed_tile.y },
		)?;
		let page_index = config.pvrz_start_index + placed_tile.bin as u32;
		block_entries.push((
			page_index,
			placed_tile.x,
			placed_tile.y,
			placed_tile.tile.w,
			placed_tile.tile.h,
			placed_tile.tile.src_x,
			placed_tile.tile.src_y,
		));
	}

	let frame_table_offset = HEADER_SIZE;
	let cycle_table_offset = frame_table_offset + raw_frames.len() * FRAME_ENTRY_SIZE;
	let block_table_offset = cycle_table_offset + cycle_ranges.len() * CYCLE_ENTRY_SIZE;

	let header = Header {
		frame_count: u32::try_from(raw_frames.len()).expect("frame count fits in u32"),
		cycle_count: u32::try_from(cycle_ranges.len()).expect("cycle count fits in u32"),
		block_count: u32::try_from(block_entries.len()).expect("block count fits in u32"),
		frame_table_offset: frame_table_offset as u32,
		cycle_table_offset: cycle_table_offset as u32,
		block_table_offset: block_table_offset as u32,
	};

	let mut out = Vec::new();
	out.extend_from_slice(&header.to_bytes());
	for (raw_index, frame) in raw_frames.iter().enumerate() {
		let (first_tile, tile_count) = frame_tile_range[raw_index];
		out.extend_from_slice(&frame.width().to_le_bytes());
		out.extend_from_slice(&frame.height().to_le_bytes());
		out.extend_from_slice(&frame.cx().to_le_bytes());
		out.extend_from_slice(&frame.cy().to_le_bytes());
		out.extend_from_slice(&u16::try_from(first_tile).expect("block index fits in u16").to_le_bytes());
		out.extend_from_slice(&u16::try_from(tile_count).expect("block count fits in u16").to_le_bytes());
	}
	for (first_frame_index, length) in &cycle_ranges {
		out.extend_from_slice(&u16::try_from(*length).expect("cycle length fits in u16").to_le_bytes());
		out.extend_from_slice(
			&u16::try_from(*first_frame_index).expect("frame index fits in u16").to_le_bytes(),
		);
	}
	for (page, sx, sy, w, h, dx, dy) in &block_entries {
		out.extend_from_slice(&page.to_le_bytes());
		out.extend_from_slice(&sx.to_le_bytes());
		out.extend_from_slice(&sy.to_le_bytes());
		out.extend_from_slice(&w.to_le_bytes());
		out.extend_from_slice(&h.to_le_bytes());
		out.extend_from_slice(&dx.to_le_bytes());
		out.extend_from_slice(&dy.to_le_bytes());
	}

	let pages = pages
		.drain(..)
		.enumerate()
		.map(|(i, page)| (config.pvrz_start_index + i as u32, page))
		.collect();

	Ok(EncodeOutput { bytes: out, pages })
}

#[cfg(test)]
mod tests {
	use super::*;

	fn solid_frame(w: u16, h: u16, color: Color) -> Frame {
		Frame::new_rgba(w, h, 0, 0, vec![color; usize::from(w) * usize::from(h)])
	}

	#[test]
	fn single_small_frame_packs_into_one_page() {
		let input = EncodeInput {
			frames: vec![solid_frame(4, 4, Color::rgb(1, 2, 3))],
			cycles: vec![vec![0]],
		};
		let output = encode_body(&input, &V2Config::default()).unwrap();
		assert_eq!(output.pages.len(), 1);
		assert_eq!(&output.bytes[0..4], b"BAM ");
		assert_eq!(&output.bytes[4..8], b"V2  ");
	}

	#[test]
	fn rejects_cycle_referencing_missing_frame() {
		let input = EncodeInput { frames: vec![solid_frame(1, 1, Color::default())], cycles: vec![vec![9]] };
		assert!(encode_body(&input, &V2Config::default()).is_err());
	}

	#[test]
	fn large_frame_is_tiled_across_multiple_placements() {
		let frame = solid_frame(1500, 10, Color::rgb(9, 9, 9));
		let input = EncodeInput { frames: vec![frame], cycles: vec![vec![0]] };
		let output = encode_body(&input, &V2Config::default()).unwrap();
		let header = Header::from_bytes(&output.bytes).unwrap();
		assert_eq!(header.block_count, 2);
	}

	#[test]
	fn frame_with_partial_alpha_upgrades_its_page_to_bc3() {
		let mut pixels = vec![Color::rgb(1, 1, 1); 4];
		pixels[0] = Color::rgba(1, 1, 1, 128);
		let frame = Frame::new_rgba(2, 2, 0, 0, pixels);
		let input = EncodeInput { frames: vec![frame], cycles: vec![vec![0]] };
		let output = encode_body(&input, &V2Config::default()).unwrap();
		assert_eq!(output.pages[0].1.format(), crate::pvrz::BlockFormat::Bc3);
	}

	#[test]
	fn force_bc1_keeps_translucent_pages_as_bc1() {
		let mut pixels = vec![Color::rgb(1, 1, 1); 4];
		pixels[0] = Color::rgba(1, 1, 1, 128);
		let frame = Frame::new_rgba(2, 2, 0, 0, pixels);
		let input = EncodeInput { frames: vec![frame], cycles: vec![vec![0]] };
		let config = V2Config { force_bc1: true, ..V2Config::default() };
		let output = encode_body(&input, &config).unwrap();
		assert_eq!(output.pages[0].1.format(), crate::pvrz::BlockFormat::Bc1);
	}
}
