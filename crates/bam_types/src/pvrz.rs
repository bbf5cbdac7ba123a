//! PVRZ interface (C6): one block-compressed texture page, wrapped in zlib.
//!
//! Only the contract described in the design notes is implemented here; the
//! actual DXT1/3/5 (BC1/BC2/BC3) bit-twiddling is delegated to [`squish`],
//! and the zlib envelope to [`flate2`], exactly as spec.md calls for.

use crate::color::Color;
use crate::error::{BamError, Container, Result};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Block-compressed pixel format for a PVRZ page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockFormat {
	/// BC1 / DXT1: RGB plus 1-bit alpha.
	Bc1,
	/// BC2 / DXT3: RGB plus 4-bit explicit alpha.
	Bc2,
	/// BC3 / DXT5: RGB plus interpolated alpha.
	Bc3,
}

impl BlockFormat {
	fn squish_format(self) -> squish::Format {
		match self {
			Self::Bc1 => squish::Format::Bc1,
			Self::Bc2 => squish::Format::Bc2,
			Self::Bc3 => squish::Format::Bc3,
		}
	}

	const fn tag(self) -> u32 {
		match self {
			Self::Bc1 => 7,
			Self::Bc2 => 9,
			Self::Bc3 => 11,
		}
	}

	fn from_tag(tag: u32) -> Option<Self> {
		match tag {
			7 => Some(Self::Bc1),
			9 => Some(Self::Bc2),
			11 => Some(Self::Bc3),
			_ => None,
		}
	}
}

/// Quality of the block-compression encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
	/// Fastest, lowest fidelity.
	Low,
	/// Balanced speed/fidelity.
	Normal,
	/// Slowest, highest fidelity.
	High,
}

impl Quality {
	fn squish_algorithm(self) -> squish::Algorithm {
		match self {
			Self::Low => squish::Algorithm::RangeFit,
			Self::Normal => squish::Algorithm::ClusterFit,
			Self::High => squish::Algorithm::IterativeClusterFit,
		}
	}
}

/// A point within a page or source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
	/// X coordinate.
	pub x: u32,
	/// Y coordinate.
	pub y: u32,
}

/// A rectangle within a page or source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
	/// X coordinate of the top-left corner.
	pub x: u32,
	/// Y coordinate of the top-left corner.
	pub y: u32,
	/// Width.
	pub w: u32,
	/// Height.
	pub h: u32,
}

const MAGIC: u32 = 0x0350_5652; // "PVR\x03" little-endian

/// One PVRZ texture page: a square(ish), block-compressed RGBA surface.
#[derive(Debug, Clone)]
pub struct Pvrz {
	width: u32,
	height: u32,
	format: BlockFormat,
	quality: Quality,
	weight_by_alpha: bool,
	perceptual_metric: bool,
	rgba: Vec<Color>,
}

impl Pvrz {
	/// Creates a new blank (fully transparent) page of `w x h` pixels.
	#[must_use]
	pub fn new(w: u32, h: u32, format: BlockFormat) -> Self {
		Self {
			width: w,
			height: h,
			format,
			quality: Quality::Normal,
			weight_by_alpha: false,
			perceptual_metric: true,
			rgba: vec![Color::default(); (w * h) as usize],
		}
	}

	/// Page width in pixels.
	#[must_use]
	pub const fn width(&self) -> u32 {
		self.width
	}

	/// Page height in pixels.
	#[must_use]
	pub const fn height(&self) -> u32 {
		self.height
	}

	/// Current block format.
	#[must_use]
	pub const fn format(&self) -> BlockFormat {
		self.format
	}

	/// Sets the block-compression quality used by [`Pvrz::save`].
	pub fn set_quality(&mut self, quality: Quality) {
		self.quality = quality;
	}

	/// Sets whether the compressor weighs colour error by alpha.
	pub fn set_weight_by_alpha(&mut self, enabled: bool) {
		self.weight_by_alpha = enabled;
	}

	/// Sets whether the compressor uses a perceptual (luminance-weighted) error metric.
	pub fn set_perceptual_metric(&mut self, enabled: bool) {
		self.perceptual_metric = enabled;
	}

	/// Copies `src_rect` of `src` into this page at `dst`.
	///
	/// # Errors
	///
	/// Returns [`BamError::IndexOutOfRange`] if the source or destination
	/// rectangle does not fit within its image.
	pub fn set_image_rect(&mut self, src: &[Color], src_width: u32, src_rect: Rect, dst: Point) -> Result<()> {
		if src_rect.x + src_rect.w > src_width
			|| usize::try_from(src_width).unwrap_or(0) * usize::try_from(src_rect.y + src_rect.h).unwrap_or(0)
				> src.len()
		{
			return Err(BamError::index_out_of_range(Container::Pvrz, (src_rect.x + src_rect.w) as usize, src_width as usize));
		}
		if dst.x + src_rect.w > self.width || dst.y + src_rect.h > self.height {
			return Err(BamError::index_out_of_range(Container::Pvrz, (dst.x + src_rect.w) as usize, self.width as usize));
		}

		for row in 0..src_rect.h {
			for col in 0..src_rect.w {
				let src_idx = ((src_rect.y + row) * src_width + (src_rect.x + col)) as usize;
				let dst_idx = ((dst.y + row) * self.width + (dst.x + col)) as usize;
				self.rgba[dst_idx] = src[src_idx];
			}
		}
		Ok(())
	}

	/// Returns the page's decoded RGBA pixels, row-major.
	#[must_use]
	pub fn get_image(&self) -> &[Color] {
		&self.rgba
	}

	/// Writes this page as a zlib-wrapped (when `zlib_wrap`) PVR texture.
	///
	/// # Errors
	///
	/// Propagates any I/O error from `writer`.
	pub fn save<W: Write>(&self, writer: &mut W, zlib_wrap: bool) -> Result<()> {
		let body = self.encode_body()?;
		if zlib_wrap {
			let mut encoder =
				flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
			encoder.write_all(&body)?;
			writer.write_all(&encoder.finish()?)?;
		} else {
			writer.write_all(&body)?;
		}
		Ok(())
	}

	fn encode_body(&self) -> Result<Vec<u8>> {
		let mut rgba_bytes = Vec::with_capacity(self.rgba.len() * 4);
		for c in &self.rgba {
			rgba_bytes.extend_from_slice(&[c.r, c.g, c.b, c.a]);
		}

		let squish_format = self.format.squish_format();
		let params = squish::Params {
			algorithm: self.quality.squish_algorithm(),
			weights: if self.weight_by_alpha {
				squish::COLOUR_WEIGHTS_PERCEPTUAL
			} else if self.perceptual_metric {
				squish::COLOUR_WEIGHTS_PERCEPTUAL
			} else {
				squish::COLOUR_WEIGHTS_UNIFORM
			},
			weigh_colour_by_alpha: self.weight_by_alpha,
		};
		let mut compressed =
			vec![0u8; squish_format.compressed_size(self.width as usize, self.height as usize)];
		squish_format.compress(
			&rgba_bytes,
			self.width as usize,
			self.height as usize,
			params,
			&mut compressed,
		);

		let mut out = Vec::with_capacity(52 + compressed.len());
		out.extend_from_slice(&MAGIC.to_le_bytes());
		out.extend_from_slice(&0u32.to_le_bytes()); // flags
		out.extend_from_slice(&u64::from(self.format.tag()).to_le_bytes()); // pixel format
		out.extend_from_slice(&0u32.to_le_bytes()); // colour space
		out.extend_from_slice(&0u32.to_le_bytes()); // channel type
		out.extend_from_slice(&self.height.to_le_bytes());
		out.extend_from_slice(&self.width.to_le_bytes());
		out.extend_from_slice(&1u32.to_le_bytes()); // depth
		out.extend_from_slice(&1u32.to_le_bytes()); // num surfaces
		out.extend_from_slice(&1u32.to_le_bytes()); // num faces
		out.extend_from_slice(&1u32.to_le_bytes()); // mip-map count
		out.extend_from_slice(&0u32.to_le_bytes()); // metadata size
		out.extend_from_slice(&compressed);
		Ok(out)
	}

	/// Reads a page from a zlib-wrapped (when `zlib_wrap`) PVR texture.
	///
	/// # Errors
	///
	/// Returns [`BamError::InvalidSignature`] if the PVR magic is wrong, or
	/// an I/O/format error for a truncated/corrupt stream.
	pub fn load<R: Read>(reader: &mut R, zlib_wrap: bool) -> Result<Self> {
		let mut raw = Vec::new();
		reader.read_to_end(&mut raw)?;
		let body = if zlib_wrap {
			let mut decoder = flate2::read::ZlibDecoder::new(raw.as_slice());
			let mut out = Vec::new();
			decoder.read_to_end(&mut out)?;
			out
		} else {
			raw
		};

		if body.len() < 52 {
			return Err(BamError::insufficient_data(Container::Pvrz, 52, body.len()));
		}
		let magic = u32::from_le_bytes(body[0..4].try_into()?);
		if magic != MAGIC {
			return Err(BamError::invalid_signature(Container::Pvrz, &MAGIC.to_le_bytes(), &body[0..4]));
		}
		let pixel_format = u64::from_le_bytes(body[8..16].try_into()?);
		let format = BlockFormat::from_tag(pixel_format as u32).ok_or_else(|| {
			BamError::invalid_signature(Container::Pvrz, b"BC1/BC2/BC3", &pixel_format.to_le_bytes()[..4])
		})?;
		let height = u32::from_le_bytes(body[24..28].try_into()?);
		let width = u32::from_le_bytes(body[28..32].try_into()?);

		let compressed = &body[52..];
		let squish_format = format.squish_format();
		let expected = squish_format.compressed_size(width as usize, height as usize);
		if compressed.len() < expected {
			return Err(BamError::insufficient_data(Container::Pvrz, expected, compressed.len()));
		}
		let mut rgba_bytes = vec![0u8; (width * height) as usize * 4];
		squish_format.decompress(compressed, width as usize, height as usize, &mut rgba_bytes);

		let rgba = rgba_bytes
			.chunks_exact(4)
			.map(|c| Color::rgba(c[0], c[1], c[2], c[3]))
			.collect();

		Ok(Self {
			width,
			height,
			format,
			quality: Quality::Normal,
			weight_by_alpha: false,
			perceptual_metric: true,
			rgba,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn set_image_rect_copies_pixels() {
		let mut page = Pvrz::new(8, 8, BlockFormat::Bc1);
		let src = vec![Color::rgb(10, 20, 30); 4];
		page.set_image_rect(&src, 2, Rect { x: 0, y: 0, w: 2, h: 2 }, Point { x: 1, y: 1 }).unwrap();
		assert_eq!(page.get_image()[(1 * 8 + 1) as usize], Color::rgb(10, 20, 30));
	}

	#[test]
	fn set_image_rect_rejects_out_of_bounds_destination() {
		let mut page = Pvrz::new(4, 4, BlockFormat::Bc1);
		let src = vec![Color::default(); 4];
		assert!(page.set_image_rect(&src, 2, Rect { x: 0, y: 0, w: 2, h: 2 }, Point { x: 3, y: 3 }).is_err());
	}

	#[test]
	fn save_then_load_roundtrips_format_and_dimensions() {
		let page = Pvrz::new(16, 16, BlockFormat::Bc3);
		let mut bytes = Vec::new();
		page.save(&mut bytes, true).unwrap();
		let loaded = Pvrz::load(&mut bytes.as_slice(), true).unwrap();
		assert_eq!(loaded.width(), 16);
		assert_eq!(loaded.height(), 16);
		assert_eq!(loaded.format(), BlockFormat::Bc3);
	}
}
