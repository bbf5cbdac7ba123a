//! Encode-time configuration for the V1 container.

use crate::color::Color;
use crate::palette::{QuantizeConfig, SortKey};
use serde::{Deserialize, Serialize};

/// Per-frame RLE policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RleMode {
	/// Always store frames raw.
	Off,
	/// Always RLE-encode frames.
	On,
	/// Encode both and keep whichever is smaller.
	#[default]
	Auto,
}

/// Encode-time configuration for the V1 (palettised) container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct V1Config {
	/// Per-frame RLE policy.
	pub rle_mode: RleMode,
	/// Whether to wrap the output in the "BAMC" zlib envelope.
	pub compressed: bool,
	/// Force alpha to zero in every palette slot on encode.
	pub discard_alpha: bool,
	/// Caller-supplied colours that must occupy the palette prefix, in order.
	pub fixed_colors: Vec<Color>,
	/// Palette slot sort key applied to slots after the reserved prefix.
	pub sort_key: SortKey,
	/// Whether to reverse the sorted region.
	pub sort_reversed: bool,
	/// Quantiser tuning; ignored when [`V1Config::remap_palette`] is set.
	pub quantize: QuantizeConfig,
	/// When set, frames are remapped onto this exact palette instead of quantised.
	pub remap_palette: Option<[Color; 256]>,
	/// Replace pixels matching this premultiplied colour key with transparent
	/// before encoding (implemented as a synthetic `replace` filter, C9).
	pub color_key: Option<Color>,
}

impl Default for V1Config {
	fn default() -> Self {
		Self {
			rle_mode: RleMode::default(),
			compressed: false,
			discard_alpha: false,
			fixed_colors: Vec::new(),
			sort_key: SortKey::default(),
			sort_reversed: false,
			quantize: QuantizeConfig::default(),
			remap_palette: None,
			color_key: None,
		}
	}
}
