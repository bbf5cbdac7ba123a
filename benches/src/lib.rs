//! Benchmark helper utilities for bam-rs.
//!
//! This module provides synthetic frame/palette generators shared by the
//! benchmark suite under `benches/codec.rs`.

use bam_types::color::Color;
use bam_types::frame::Frame;

/// Generates an RGBA frame of `width`x`height` filled with a repeating,
/// mildly irregular pattern so RLE encoding can't collapse it to a single run.
#[must_use]
pub fn generate_rgba_frame(width: u16, height: u16) -> Frame {
	let pixels = (0..u32::from(width) * u32::from(height))
		.map(|i| {
			let t = (i % 251) as u8;
			Color::rgba(t, t.wrapping_mul(3), t.wrapping_mul(7), if i % 17 == 0 { 0 } else { 255 })
		})
		.collect();
	Frame::new_rgba(width, height, 0, 0, pixels)
}

/// Generates an indexed frame of `width`x`height` using palette slots
/// `0..=255`, with long runs of index 0 to exercise the RLE codec.
#[must_use]
pub fn generate_indexed_frame(width: u16, height: u16) -> Frame {
	let indices = (0..usize::from(width) * usize::from(height))
		.map(|i| if i % 7 == 0 { ((i / 7) % 256) as u8 } else { 0 })
		.collect();
	Frame::new_indexed(width, height, 0, 0, indices)
}

/// A 256-entry palette with distinct, non-degenerate colours.
#[must_use]
pub fn generate_palette() -> [Color; 256] {
	std::array::from_fn(|i| {
		let i = i as u8;
		Color::rgba(i, i.wrapping_mul(2), i.wrapping_mul(5), 255)
	})
}

/// Common benchmark sizes for synthetic frames.
pub mod sizes {
	/// Tiny frame: 64x64 (4,096 pixels).
	pub const TINY: (u16, u16) = (64, 64);
	/// Small frame: 256x256 (65,536 pixels).
	pub const SMALL: (u16, u16) = (256, 256);
	/// Medium frame: 512x512 (262,144 pixels).
	pub const MEDIUM: (u16, u16) = (512, 512);
	/// Large frame: 1024x768 (786,432 pixels), the PVRZ page ceiling.
	pub const LARGE: (u16, u16) = (1024, 768);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn generate_rgba_frame_has_requested_dimensions() {
		let frame = generate_rgba_frame(16, 8);
		assert_eq!(frame.width(), 16);
		assert_eq!(frame.height(), 8);
		assert_eq!(frame.pixel_count(), 128);
	}

	#[test]
	fn generate_indexed_frame_has_requested_dimensions() {
		let frame = generate_indexed_frame(16, 8);
		assert_eq!(frame.as_indexed().unwrap().len(), 128);
	}
}
