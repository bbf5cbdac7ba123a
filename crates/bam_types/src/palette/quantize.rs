//! Palette construction by colour quantisation or by remapping against a
//! caller-supplied palette (C2, "quantise" half).

use crate::color::Color;
use crate::error::{BamError, Result};
use crate::frame::Frame;
use imagequant::{Attributes, Histogram, HistogramEntry, RGBA};
use log::debug;
use serde::{Deserialize, Serialize};

/// Weight given to the transparent sentinel and every fixed colour when
/// seeding the quantiser's histogram, so they are never dropped by the
/// quantiser even on images that barely use them.
const RESERVED_COLOR_WEIGHT: u32 = 1 << 20;

/// Configuration for [`quantize`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantizeConfig {
	/// Minimum acceptable quality, `0..=100`. Lowered automatically on retry.
	pub min_quality: u8,
	/// Maximum quality target, `0..=100`.
	pub max_quality: u8,
	/// Quantiser speed, `1..=10` (1 = slowest/best, 10 = fastest). Lowered automatically on retry.
	pub speed: u8,
	/// Dithering level applied to the quantised result, `0.0..=1.0`.
	pub dither: f32,
	/// Colours that must occupy the output palette, in order, starting at slot 1.
	pub fixed_colors: Vec<Color>,
}

impl Default for QuantizeConfig {
	fn default() -> Self {
		Self { min_quality: 70, max_quality: 100, speed: 4, dither: 1.0, fixed_colors: Vec::new() }
	}
}

fn to_rgba(c: Color) -> RGBA {
	RGBA::new(c.r, c.g, c.b, c.a)
}

fn from_rgba(c: RGBA) -> Color {
	Color::rgba(c.r, c.g, c.b, c.a)
}

/// Builds a 256-colour palette from `frames` by quantisation, retrying at
/// lower quality/speed on [`imagequant`]'s `QualityTooLow` failure per the
/// retry policy in the design notes: halve speed (floor 1), reduce min
/// quality by 5 (floor 0), until it succeeds or min quality reaches 0.
///
/// Returns one index buffer per frame plus the final 256-entry palette.
pub fn quantize(frames: &[&Frame], config: &QuantizeConfig) -> Result<(Vec<Vec<u8>>, [Color; 256])> {
	let mut min_quality = config.min_quality;
	let mut speed = config.speed.max(1);

	loop {
		match try_quantize(frames, config, min_quality, speed) {
			Ok(result) => return Ok(result),
			Err(QuantizeAttemptError::QualityTooLow) => {
				debug!(
					"quantisation missed quality floor at min_quality={min_quality} speed={speed}, retrying"
				);
				if min_quality == 0 {
					return Err(BamError::QuantizationFailed { min_quality, speed });
				}
				min_quality = min_quality.saturating_sub(5);
				speed = (speed / 2).max(1);
			}
			Err(QuantizeAttemptError::Other(err)) => return Err(err),
		}
	}
}

enum QuantizeAttemptError {
	QualityTooLow,
	Other(BamError),
}

fn try_quantize(
	frames: &[&Frame],
	config: &QuantizeConfig,
	min_quality: u8,
	speed: u8,
) -> std::result::Result<(Vec<Vec<u8>>, [Color; 256]), QuantizeAttemptError> {
	let map_err = |e: imagequant::Error| quantize_error(e, min_quality, speed);

	let mut attr = Attributes::new();
	attr.set_quality(min_quality, config.max_quality).map_err(map_err)?;
	attr.set_speed(i32::from(speed)).map_err(map_err)?;

	let mut histogram = Histogram::new(&attr);
	let mut seed_entries =
		vec![HistogramEntry { color: to_rgba(crate::color::TRANSPARENT), count: RESERVED_COLOR_WEIGHT }];
	seed_entries.extend(
		config.fixed_colors.iter().map(|&c| HistogramEntry { color: to_rgba(c), count: RESERVED_COLOR_WEIGHT }),
	);
	histogram.add_colors(&seed_entries, 0.0).map_err(map_err)?;

	let mut images = Vec::with_capacity(frames.len());
	for frame in frames {
		let pixels: Vec<RGBA> = match frame.as_rgba() {
			Some(px) => px.iter().map(|&c| to_rgba(c.unpremultiply())).collect(),
			None => {
				return Err(QuantizeAttemptError::Other(BamError::Empty {
					container: crate::error::Container::Model,
					what: "rgba frame for quantisation",
				}));
			}
		};
		let mut image = attr
			.new_image(pixels, usize::from(frame.width()), usize::from(frame.height()), 0.0)
			.map_err(map_err)?;
		histogram.add_image(&attr, &mut image).map_err(map_err)?;
		images.push(image);
	}

	let mut result = match histogram.quantize(&attr) {
		Ok(r) => r,
		Err(imagequant::Error::QualityTooLow) => return Err(QuantizeAttemptError::QualityTooLow),
		Err(e) => return Err(map_err(e)),
	};
	result.set_dithering_level(config.dither).map_err(map_err)?;

	let mut palette = [Color::default(); 256];
	let mut index_buffers = Vec::with_capacity(images.len());
	for mut image in images {
		let (pal, indices) = result.remapped(&mut image).map_err(map_err)?;
		for (slot, entry) in palette.iter_mut().zip(pal.iter()) {
			*slot = from_rgba(*entry);
		}
		index_buffers.push(indices);
	}

	Ok((index_buffers, palette))
}

fn quantize_error(err: imagequant::Error, min_quality: u8, speed: u8) -> QuantizeAttemptError {
	log::debug!("imagequant error at min_quality={min_quality} speed={speed}: {err}");
	QuantizeAttemptError::Other(BamError::QuantizationFailed { min_quality, speed })
}

/// Builds a 256-colour palette by remapping every frame against a
/// caller-supplied palette (the "remap" mode of C2): the supplied palette
/// is seeded as the only histogram input and the minimum quality is forced
/// to zero so the call cannot fail on quality grounds.
pub fn remap(frames: &[&Frame], palette: &[Color; 256]) -> Result<(Vec<Vec<u8>>, [Color; 256])> {
	let config = QuantizeConfig {
		min_quality: 0,
		max_quality: 100,
		speed: 1,
		dither: 1.0,
		fixed_colors: palette.to_vec(),
	};
	quantize(frames, &config)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_config_has_sane_bounds() {
		let config = QuantizeConfig::default();
		assert!(config.min_quality <= config.max_quality);
		assert!(config.speed >= 1);
	}
}
