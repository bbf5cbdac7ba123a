//! HSL-space colour filters: `hue`, `saturation`, `lightness`.

use super::{parse_f32, rgba_pixels, Filter};
use crate::color::Color;
use crate::error::Result;
use crate::frame::Frame;

fn map_hsl(frame: &Frame, filter_name: &'static str, frame_index: usize, f: impl Fn(f64, f64, f64) -> (f64, f64, f64)) -> Result<Frame> {
	let pixels = rgba_pixels(frame, filter_name, frame_index)?;
	let mapped: Vec<Color> = pixels
		.iter()
		.map(|&c| {
			let u = c.unpremultiply();
			let (h, s, l) = u.to_hsl();
			let (h2, s2, l2) = f(h, s, l);
			u.with_hsl(h2, s2, l2).premultiply()
		})
		.collect();
	Ok(Frame::new_rgba(frame.width(), frame.height(), frame.cx(), frame.cy(), mapped))
}

/// `hue`: additive offset to H, wrapped to `[0, 1)`.
#[derive(Debug, Clone, Copy)]
pub struct HueFilter {
	level: f32,
}

impl Default for HueFilter {
	fn default() -> Self {
		Self { level: 0.0 }
	}
}

impl Filter for HueFilter {
	fn name(&self) -> &'static str {
		"hue"
	}

	fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
		if key == "level" {
			self.level = parse_f32("hue", key, value, -180.0, 180.0)?;
		}
		Ok(())
	}

	fn process(&self, frame: &Frame, frame_index: usize, _all_frames: &[Frame]) -> Result<Frame> {
		let delta = f64::from(self.level) / 360.0;
		map_hsl(frame, self.name(), frame_index, |h, s, l| ((h + delta).rem_euclid(1.0), s, l))
	}
}

/// `saturation`: additive offset to S, clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct SaturationFilter {
	level: f32,
}

impl Default for SaturationFilter {
	fn default() -> Self {
		Self { level: 0.0 }
	}
}

impl Filter for SaturationFilter {
	fn name(&self) -> &'static str {
		"saturation"
	}

	fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
		if key == "level" {
			self.level = parse_f32("saturation", key, value, -100.0, 100.0)?;
		}
		Ok(())
	}

	fn process(&self, frame: &Frame, frame_index: usize, _all_frames: &[Frame]) -> Result<Frame> {
		let delta = f64::from(self.level) / 100.0;
		map_hsl(frame, self.name(), frame_index, |h, s, l| (h, (s + delta).clamp(0.0, 1.0), l))
	}
}

/// `lightness`: additive offset to L, clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct LightnessFilter {
	level: f32,
}

impl Default for LightnessFilter {
	fn default() -> Self {
		Self { level: 0.0 }
	}
}

impl Filter for LightnessFilter {
	fn name(&self) -> &'static str {
		"lightness"
	}

	fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
		if key == "level" {
			self.level = parse_f32("lightness", key, value, -100.0, 100.0)?;
		}
		Ok(())
	}

	fn process(&self, frame: &Frame, frame_index: usize, _all_frames: &[Frame]) -> Result<Frame> {
		let delta = f64::from(self.level) / 100.0;
		map_hsl(frame, self.name(), frame_index, |h, s, l| (h, s, (l + delta).clamp(0.0, 1.0)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hue_zero_is_identity_within_rounding() {
		let frame = Frame::new_rgba(1, 1, 0, 0, vec![Color::rgb(10, 200, 80)]);
		let out = HueFilter::default().process(&frame, 0, &[]).unwrap();
		let c = out.as_rgba().unwrap()[0].unpremultiply();
		assert!((i16::from(c.r) - 10).abs() <= 1);
		assert!((i16::from(c.g) - 200).abs() <= 1);
		assert!((i16::from(c.b) - 80).abs() <= 1);
	}

	#[test]
	fn saturation_negative_hundred_desaturates() {
		let frame = Frame::new_rgba(1, 1, 0, 0, vec![Color::rgb(200, 10, 10)]);
		let mut filter = SaturationFilter::default();
		filter.set_option("level", "-100").unwrap();
		let out = filter.process(&frame, 0, &[]).unwrap();
		let c = out.as_rgba().unwrap()[0].unpremultiply();
		assert!(c.r == c.g && c.g == c.b);
	}
}
