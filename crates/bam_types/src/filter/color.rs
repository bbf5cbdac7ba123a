//! Per-pixel colour filters that operate independently of frame geometry:
//! `brightness`, `contrast`, `gamma`, `balance`, `invert`, `replace`,
//! `posterize`, `alpha2color`, `color2alpha`.

use super::{clamp_channel, invalid_option, parse_argb, parse_bool, parse_f32, parse_i32, rgba_pixels, Filter};
use crate::color::Color;
use crate::error::Result;
use crate::frame::Frame;

fn map_pixels(frame: &Frame, filter_name: &'static str, frame_index: usize, f: impl Fn(Color) -> Color) -> Result<Frame> {
	let pixels = rgba_pixels(frame, filter_name, frame_index)?;
	let mapped: Vec<Color> = pixels.iter().map(|&c| f(c.unpremultiply()).premultiply()).collect();
	Ok(Frame::new_rgba(frame.width(), frame.height(), frame.cx(), frame.cy(), mapped))
}

/// `brightness`: additive offset on R, G, B (§4.10).
#[derive(Debug, Clone, Copy)]
pub struct BrightnessFilter {
	level: i32,
}

impl Default for BrightnessFilter {
	fn default() -> Self {
		Self { level: 0 }
	}
}

impl Filter for BrightnessFilter {
	fn name(&self) -> &'static str {
		"brightness"
	}

	fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
		if key == "level" {
			self.level = parse_i32("brightness", key, value, -255, 255)?;
		}
		Ok(())
	}

	fn process(&self, frame: &Frame, frame_index: usize, _all_frames: &[Frame]) -> Result<Frame> {
		let delta = self.level as f32 / 255.0;
		map_pixels(frame, self.name(), frame_index, |c| Color {
			r: clamp_channel(f32::from(c.r) / 255.0 + delta),
			g: clamp_channel(f32::from(c.g) / 255.0 + delta),
			b: clamp_channel(f32::from(c.b) / 255.0 + delta),
			a: c.a,
		})
	}
}

/// `contrast`: multiplicative stretch around the midpoint (§4.10, resolving
/// the source's two variants in favour of the `1 + level/255` mapping).
#[derive(Debug, Clone, Copy)]
pub struct ContrastFilter {
	level: i32,
}

impl Default for ContrastFilter {
	fn default() -> Self {
		Self { level: 0 }
	}
}

impl Filter for ContrastFilter {
	fn name(&self) -> &'static str {
		"contrast"
	}

	fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
		if key == "level" {
			self.level = parse_i32("contrast", key, value, -255, 255)?;
		}
		Ok(())
	}

	fn process(&self, frame: &Frame, frame_index: usize, _all_frames: &[Frame]) -> Result<Frame> {
		let factor = 1.0 + self.level as f32 / 255.0;
		let stretch = |v: f32| 0.5 + (v - 0.5) * factor;
		map_pixels(frame, self.name(), frame_index, |c| Color {
			r: clamp_channel(stretch(f32::from(c.r) / 255.0)),
			g: clamp_channel(stretch(f32::from(c.g) / 255.0)),
			b: clamp_channel(stretch(f32::from(c.b) / 255.0)),
			a: c.a,
		})
	}
}

/// `gamma`: power-law tone curve, `c' = c^(1/level)`.
#[derive(Debug, Clone, Copy)]
pub struct GammaFilter {
	level: f32,
}

impl Default for GammaFilter {
	fn default() -> Self {
		Self { level: 1.0 }
	}
}

impl Filter for GammaFilter {
	fn name(&self) -> &'static str {
		"gamma"
	}

	fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
		if key == "level" {
			self.level = parse_f32("gamma", key, value, 0.0001, 5.0)?;
		}
		Ok(())
	}

	fn process(&self, frame: &Frame, frame_index: usize, _all_frames: &[Frame]) -> Result<Frame> {
		let exponent = 1.0 / self.level;
		let curve = |v: f32| v.max(0.0).powf(exponent);
		map_pixels(frame, self.name(), frame_index, |c| Color {
			r: clamp_channel(curve(f32::from(c.r) / 255.0)),
			g: clamp_channel(curve(f32::from(c.g) / 255.0)),
			b: clamp_channel(curve(f32::from(c.b) / 255.0)),
			a: c.a,
		})
	}
}

/// `balance`: independent additive offset per channel, including alpha.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceFilter {
	red: i32,
	green: i32,
	blue: i32,
	alpha: i32,
}

impl Filter for BalanceFilter {
	fn name(&self) -> &'static str {
		"balance"
	}

	fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
		match key {
			"red" => self.red = parse_i32("balance", key, value, -255, 255)?,
			"green" => self.green = parse_i32("balance", key, value, -255, 255)?,
			"blue" => self.blue = parse_i32("balance", key, value, -255, 255)?,
			"alpha" => self.alpha = parse_i32("balance", key, value, -255, 255)?,
			_ => {}
		}
		Ok(())
	}

	fn process(&self, frame: &Frame, frame_index: usize, _all_frames: &[Frame]) -> Result<Frame> {
		let offset = |v: u8, level: i32| clamp_channel(f32::from(v) / 255.0 + level as f32 / 255.0);
		map_pixels(frame, self.name(), frame_index, |c| Color {
			r: offset(c.r, self.red),
			g: offset(c.g, self.green),
			b: offset(c.b, self.blue),
			a: offset(c.a, self.alpha),
		})
	}
}

/// `invert`: bitwise inverse of the selected channels.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvertFilter {
	red: bool,
	green: bool,
	blue: bool,
	alpha: bool,
}

impl Filter for InvertFilter {
	fn name(&self) -> &'static str {
		"invert"
	}

	fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
		match key {
			"red" => self.red = parse_bool("invert", key, value)?,
			"green" => self.green = parse_bool("invert", key, value)?,
			"blue" => self.blue = parse_bool("invert", key, value)?,
			"alpha" => self.alpha = parse_bool("invert", key, value)?,
			_ => {}
		}
		Ok(())
	}

	fn process(&self, frame: &Frame, frame_index: usize, _all_frames: &[Frame]) -> Result<Frame> {
		map_pixels(frame, self.name(), frame_index, |c| Color {
			r: if self.red { 255 - c.r } else { c.r },
			g: if self.green { 255 - c.g } else { c.g },
			b: if self.blue { 255 - c.b } else { c.b },
			a: if self.alpha { 255 - c.a } else { c.a },
		})
	}
}

/// `replace`: swaps pixels equal to a premultiplied match colour.
#[derive(Debug, Clone, Copy)]
pub struct ReplaceFilter {
	pattern_match: Color,
	replacement: Color,
}

impl Default for ReplaceFilter {
	fn default() -> Self {
		Self { pattern_match: Color::default(), replacement: Color::default() }
	}
}

impl ReplaceFilter {
	/// Builds a `replace` filter directly, bypassing the string option bag.
	/// Used by the V1 encoder's synthetic colour-key filter (§4.9).
	#[must_use]
	pub fn new(pattern_match: Color, replacement: Color) -> Self {
		Self { pattern_match: pattern_match.premultiply(), replacement: replacement.premultiply() }
	}
}

impl Filter for ReplaceFilter {
	fn name(&self) -> &'static str {
		"replace"
	}

	fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
		match key {
			"match" => self.pattern_match = parse_argb("replace", key, value)?.premultiply(),
			"color" => self.replacement = parse_argb("replace", key, value)?.premultiply(),
			_ => {}
		}
		Ok(())
	}

	fn process(&self, frame: &Frame, frame_index: usize, _all_frames: &[Frame]) -> Result<Frame> {
		let pixels = rgba_pixels(frame, self.name(), frame_index)?;
		let mapped: Vec<Color> =
			pixels.iter().map(|&c| if c == self.pattern_match { self.replacement } else { c }).collect();
		Ok(Frame::new_rgba(frame.width(), frame.height(), frame.cx(), frame.cy(), mapped))
	}
}

/// `posterize`: masks off the low `level` bits of R, G, B and sets the low
/// `level` bits of A.
#[derive(Debug, Clone, Copy, Default)]
pub struct PosterizeFilter {
	level: u8,
}

impl Filter for PosterizeFilter {
	fn name(&self) -> &'static str {
		"posterize"
	}

	fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
		if key == "level" {
			self.level = parse_i32("posterize", key, value, 0, 7)? as u8;
		}
		Ok(())
	}

	fn process(&self, frame: &Frame, frame_index: usize, _all_frames: &[Frame]) -> Result<Frame> {
		let mask = !0u8 << self.level;
		let set_bits = !(!0u8 << self.level);
		let pixels = rgba_pixels(frame, self.name(), frame_index)?;
		let mapped: Vec<Color> = pixels
			.iter()
			.map(|&c| {
				let u = c.unpremultiply();
				Color { r: u.r & mask, g: u.g & mask, b: u.b & mask, a: u.a | set_bits }.premultiply()
			})
			.collect();
		Ok(Frame::new_rgba(frame.width(), frame.height(), frame.cx(), frame.cy(), mapped))
	}
}

/// `alpha2color`: discards partial transparency (`A>0` becomes `A=255`).
#[derive(Debug, Default, Clone, Copy)]
pub struct Alpha2ColorFilter;

impl Filter for Alpha2ColorFilter {
	fn name(&self) -> &'static str {
		"alpha2color"
	}

	fn set_option(&mut self, _key: &str, _value: &str) -> Result<()> {
		Ok(())
	}

	fn process(&self, frame: &Frame, frame_index: usize, _all_frames: &[Frame]) -> Result<Frame> {
		map_pixels(frame, self.name(), frame_index, |c| Color { a: if c.a > 0 { 255 } else { 0 }, ..c })
	}
}

/// `color2alpha`: synthesises translucency from luminance on opaque pixels.
#[derive(Debug, Default, Clone, Copy)]
pub struct Color2AlphaFilter;

impl Filter for Color2AlphaFilter {
	fn name(&self) -> &'static str {
		"color2alpha"
	}

	fn set_option(&mut self, _key: &str, _value: &str) -> Result<()> {
		Ok(())
	}

	fn process(&self, frame: &Frame, frame_index: usize, _all_frames: &[Frame]) -> Result<Frame> {
		map_pixels(frame, self.name(), frame_index, |c| {
			if c.a == 255 {
				Color { a: c.r.max(c.g).max(c.b), ..c }
			} else {
				c
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn brightness_zero_is_identity() {
		let frame = Frame::new_rgba(1, 1, 0, 0, vec![Color::rgb(10, 20, 30)]);
		let out = BrightnessFilter::default().process(&frame, 0, &[]).unwrap();
		assert_eq!(out, frame);
	}

	#[test]
	fn posterize_level_three_matches_worked_example() {
		let frame = Frame::new_rgba(1, 1, 0, 0, vec![Color::rgba(0xAB, 0xCD, 0xEF, 0xFF)]);
		let mut filter = PosterizeFilter::default();
		filter.set_option("level", "3").unwrap();
		let out = filter.process(&frame, 0, &[]).unwrap();
		assert_eq!(out.as_rgba().unwrap()[0].unpremultiply(), Color::rgba(0xA8, 0xC8, 0xE8, 0xFF));
	}

	#[test]
	fn invert_all_false_is_identity() {
		let frame = Frame::new_rgba(1, 1, 0, 0, vec![Color::rgba(1, 2, 3, 4)]);
		let out = InvertFilter::default().process(&frame, 0, &[]).unwrap();
		assert_eq!(out, frame);
	}

	#[test]
	fn replace_matches_premultiplied_colour() {
		let key = Color::rgba(10, 20, 30, 128);
		let frame = Frame::new_rgba(1, 1, 0, 0, vec![key.premultiply()]);
		let filter = ReplaceFilter::new(key, Color::default());
		let out = filter.process(&frame, 0, &[]).unwrap();
		assert_eq!(out.as_rgba().unwrap()[0], Color::default());
	}

	#[test]
	fn color2alpha_ignores_translucent_pixels() {
		let frame = Frame::new_rgba(1, 1, 0, 0, vec![Color::rgba(10, 20, 30, 128).premultiply()]);
		let out = Color2AlphaFilter.process(&frame, 0, &[]).unwrap();
		assert_eq!(out, frame);
	}
}
