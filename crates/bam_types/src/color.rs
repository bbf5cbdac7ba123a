//! Colour representation shared by the palette engine, the filter pipeline,
//! and both container codecs.
//!
//! Colours are stored as plain 8-bit RGBA tuples. Whether a given `Color`
//! holds premultiplied or non-premultiplied components is a property of
//! *where* it is used (palette entries are non-premultiplied, RGBA pixels
//! are premultiplied), not of the type itself; [`Color::premultiply`] and
//! [`Color::unpremultiply`] make the conversion explicit at call sites.

use serde::{Deserialize, Serialize};

/// An 8-bit-per-channel RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Alpha channel.
	pub a: u8,
}

/// The sentinel transparent colour: fully transparent black.
pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };

/// The "green sentinel" written to V1 palette slot 0, treated as equivalent
/// to [`TRANSPARENT`] wherever slot 0 is read back.
pub const GREEN_SENTINEL: Color = Color { r: 0, g: 255, b: 0, a: 0 };

impl Color {
	/// Builds an opaque colour from RGB components.
	#[must_use]
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 255 }
	}

	/// Builds a colour from all four components.
	#[must_use]
	pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
		Self { r, g, b, a }
	}

	/// Decodes a colour from a little-endian `0xAARRGGBB` value, as stored
	/// in the V1 palette table.
	#[must_use]
	pub const fn from_argb_u32(value: u32) -> Self {
		let a = (value >> 24) as u8;
		let r = (value >> 16) as u8;
		let g = (value >> 8) as u8;
		let b = value as u8;
		Self { r, g, b, a }
	}

	/// Encodes this colour as a little-endian `0xAARRGGBB` value.
	#[must_use]
	pub const fn to_argb_u32(self) -> u32 {
		(self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
	}

	/// Whether this colour is the sentinel transparent entry (`A == 0`).
	#[must_use]
	pub const fn is_transparent(self) -> bool {
		self.a == 0
	}

	/// Scales R, G, B by `A/255`, producing the premultiplied form used for RGBA pixels.
	#[must_use]
	pub fn premultiply(self) -> Self {
		let a = self.a as u16;
		Self {
			r: ((self.r as u16 * a) / 255) as u8,
			g: ((self.g as u16 * a) / 255) as u8,
			b: ((self.b as u16 * a) / 255) as u8,
			a: self.a,
		}
	}

	/// Inverse of [`Color::premultiply`]; a no-op when `A == 0`.
	#[must_use]
	pub fn unpremultiply(self) -> Self {
		if self.a == 0 {
			return self;
		}
		let a = self.a as u16;
		Self {
			r: ((self.r as u16 * 255) / a).min(255) as u8,
			g: ((self.g as u16 * 255) / a).min(255) as u8,
			b: ((self.b as u16 * 255) / a).min(255) as u8,
			a: self.a,
		}
	}

	/// Perceptual lightness used by the `lightness` palette-sort key:
	/// `sqrt(0.299 R^2 + 0.587 G^2 + 0.114 B^2)` on normalised components.
	#[must_use]
	pub fn lightness(self) -> f64 {
		let r = f64::from(self.r) / 255.0;
		let g = f64::from(self.g) / 255.0;
		let b = f64::from(self.b) / 255.0;
		(0.299 * r * r + 0.587 * g * g + 0.114 * b * b).sqrt()
	}

	/// Converts to HSL, each component normalised to `[0, 1)`/`[0, 1]`.
	#[must_use]
	pub fn to_hsl(self) -> (f64, f64, f64) {
		let r = f64::from(self.r) / 255.0;
		let g = f64::from(self.g) / 255.0;
		let b = f64::from(self.b) / 255.0;
		let max = r.max(g).max(b);
		let min = r.min(g).min(b);
		let l = (max + min) / 2.0;
		if (max - min).abs() < f64::EPSILON {
			return (0.0, 0.0, l);
		}
		let d = max - min;
		let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
		let h = if (max - r).abs() < f64::EPSILON {
			(g - b) / d + if g < b { 6.0 } else { 0.0 }
		} else if (max - g).abs() < f64::EPSILON {
			(b - r) / d + 2.0
		} else {
			(r - g) / d + 4.0
		};
		(h / 6.0, s, l)
	}

	/// Builds a colour from HSL components (each normalised as in [`Color::to_hsl`]),
	/// preserving `self`'s alpha.
	#[must_use]
	pub fn with_hsl(self, h: f64, s: f64, l: f64) -> Self {
		let h = h.rem_euclid(1.0);
		if s <= 0.0 {
			let v = (l.clamp(0.0, 1.0) * 255.0).round() as u8;
			return Self { r: v, g: v, b: v, a: self.a };
		}
		let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
		let p = 2.0 * l - q;
		let r = hue_to_channel(p, q, h + 1.0 / 3.0);
		let g = hue_to_channel(p, q, h);
		let b = hue_to_channel(p, q, h - 1.0 / 3.0);
		Self {
			r: (r * 255.0).round().clamp(0.0, 255.0) as u8,
			g: (g * 255.0).round().clamp(0.0, 255.0) as u8,
			b: (b * 255.0).round().clamp(0.0, 255.0) as u8,
			a: self.a,
		}
	}
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
	let t = t.rem_euclid(1.0);
	if t < 1.0 / 6.0 {
		p + (q - p) * 6.0 * t
	} else if t < 0.5 {
		q
	} else if t < 2.0 / 3.0 {
		p + (q - p) * (2.0 / 3.0 - t) * 6.0
	} else {
		p
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn argb_u32_roundtrip() {
		let c = Color::rgba(0x11, 0x22, 0x33, 0x44);
		assert_eq!(Color::from_argb_u32(c.to_argb_u32()), c);
	}

	#[test]
	fn green_sentinel_is_transparent() {
		assert!(GREEN_SENTINEL.is_transparent());
	}

	#[test]
	fn premultiply_zero_alpha_is_black() {
		let c = Color::rgba(200, 150, 100, 0).premultiply();
		assert_eq!(c, Color::rgba(0, 0, 0, 0));
	}

	#[test]
	fn premultiply_full_alpha_is_identity() {
		let c = Color::rgba(200, 150, 100, 255);
		assert_eq!(c.premultiply(), c);
	}

	#[test]
	fn hsl_roundtrip_is_close() {
		let c = Color::rgb(10, 200, 80);
		let (h, s, l) = c.to_hsl();
		let back = c.with_hsl(h, s, l);
		assert!((i16::from(back.r) - i16::from(c.r)).abs() <= 1);
		assert!((i16::from(back.g) - i16::from(c.g)).abs() <= 1);
		assert!((i16::from(back.b) - i16::from(c.b)).abs() <= 1);
	}
}
