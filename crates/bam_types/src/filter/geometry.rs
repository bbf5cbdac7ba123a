//! Geometric filters that reshape a frame's pixel grid: `mirror`, `rotate`,
//! `resize`, `translate`.

use super::canvas::{crop, draw_into_on, trim_bbox_against};
use super::{invalid_option, parse_argb, parse_bool, parse_f32, rgba_pixels, Filter};
use crate::color::Color;
use crate::error::Result;
use crate::frame::Frame;

/// `translate`: adjusts `(cx, cy)` only; pixels are untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct TranslateFilter {
	x: i32,
	y: i32,
}

impl Filter for TranslateFilter {
	fn name(&self) -> &'static str {
		"translate"
	}

	fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
		match key {
			"x" => self.x = parse_i32_unbounded("translate", key, value)?,
			"y" => self.y = parse_i32_unbounded("translate", key, value)?,
			_ => {}
		}
		Ok(())
	}

	fn process(&self, frame: &Frame, _frame_index: usize, _all_frames: &[Frame]) -> Result<Frame> {
		let mut out = frame.clone();
		let cx = (i32::from(frame.cx()) + self.x).clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
		let cy = (i32::from(frame.cy()) + self.y).clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
		out.set_center(cx, cy);
		Ok(out)
	}
}

fn parse_i32_unbounded(filter_name: &'static str, key: &str, value: &str) -> Result<i32> {
	value.parse().map_err(|_| invalid_option(filter_name, 0, key, format!("'{value}' is not an integer")))
}

/// `mirror`: reflects pixels horizontally and/or vertically in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct MirrorFilter {
	horizontal: bool,
	vertical: bool,
	updatecenter: bool,
}

impl Filter for MirrorFilter {
	fn name(&self) -> &'static str {
		"mirror"
	}

	fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
		match key {
			"horizontal" => self.horizontal = parse_bool("mirror", key, value)?,
			"vertical" => self.vertical = parse_bool("mirror", key, value)?,
			"updatecenter" => self.updatecenter = parse_bool("mirror", key, value)?,
			_ => {}
		}
		Ok(())
	}

	fn process(&self, frame: &Frame, frame_index: usize, _all_frames: &[Frame]) -> Result<Frame> {
		let w = frame.width();
		let h = frame.height();
		let pixels = rgba_pixels(frame, self.name(), frame_index)?;
		let mut out = vec![Color::default(); pixels.len()];
		for y in 0..h {
			for x in 0..w {
				let src_x = if self.horizontal { w - 1 - x } else { x };
				let src_y = if self.vertical { h - 1 - y } else { y };
				let src_i = usize::from(src_y) * usize::from(w) + usize::from(src_x);
				let dst_i = usize::from(y) * usize::from(w) + usize::from(x);
				out[dst_i] = pixels[src_i];
			}
		}
		let (mut cx, mut cy) = (frame.cx(), frame.cy());
		if self.updatecenter {
			if self.horizontal {
				cx = (i32::from(w) - i32::from(frame.cx())) as i16;
			}
			if self.vertical {
				cy = (i32::from(h) - i32::from(frame.cy())) as i16;
			}
		}
		Ok(Frame::new_rgba(w, h, cx, cy, out))
	}
}

/// `rotate`: orthogonal rotations (multiples of 90°) are exact; other
/// angles use a bilinear sampler around the frame's own centre.
#[derive(Debug, Clone, Copy)]
pub struct RotateFilter {
	angle: f32,
	interpolate: bool,
	background: Color,
	updatecenter: bool,
}

impl Default for RotateFilter {
	fn default() -> Self {
		Self { angle: 0.0, interpolate: true, background: Color::default(), updatecenter: false }
	}
}

impl Filter for RotateFilter {
	fn name(&self) -> &'static str {
		"rotate"
	}

	fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
		match key {
			"angle" => self.angle = parse_f32("rotate", key, value, -36000.0, 36000.0)?,
			"interpolate" => self.interpolate = parse_bool("rotate", key, value)?,
			"background" => self.background = parse_argb("rotate", key, value)?,
			"updatecenter" => self.updatecenter = parse_bool("rotate", key, value)?,
			_ => {}
		}
		Ok(())
	}

	fn process(&self, frame: &Frame, frame_index: usize, all_frames: &[Frame]) -> Result<Frame> {
		let expanded = expand_to_union(frame, self.name(), frame_index, all_frames, self.background)?;

		let normalized = self.angle.rem_euclid(360.0);
		let rotated = if (normalized % 90.0).abs() < f32::EPSILON {
			let steps = (normalized / 90.0).round() as u32 % 4;
			let mut current = expanded;
			for _ in 0..steps {
				current = rotate90(&current, self.name(), frame_index)?;
			}
			current
		} else {
			rotate_affine(&expanded, self.name(), frame_index, normalized, self.interpolate, self.background)?
		};

		Ok(trim_background(&rotated, self.background))
	}
}

/// Expands `frame` to the union of every frame's dimensions in `all_frames`
/// (plus `frame` itself), padding the new margin with `background`. Per
/// §4.10 this runs before `rotate`/`resize` so a frame set with varying
/// sizes doesn't jitter around its own centre from frame to frame; the
/// padding is trimmed back off by [`trim_background`] once the transform
/// that needed the shared canvas has run.
fn expand_to_union(
	frame: &Frame,
	filter_name: &'static str,
	frame_index: usize,
	all_frames: &[Frame],
	background: Color,
) -> Result<Frame> {
	let pixels = rgba_pixels(frame, filter_name, frame_index)?;
	let union_w = all_frames.iter().map(Frame::width).max().unwrap_or_else(|| frame.width()).max(frame.width());
	let union_h = all_frames.iter().map(Frame::height).max().unwrap_or_else(|| frame.height()).max(frame.height());
	let expanded = draw_into_on(pixels, frame.width(), frame.height(), union_w, union_h, 0, 0, background);
	Ok(Frame::new_rgba(union_w, union_h, frame.cx(), frame.cy(), expanded))
}

/// Crops away any outer margin that's entirely `background`, shifting the
/// centre to match, the way [`CanvasFilter`](super::canvas::CanvasFilter)
/// trims transparent margins. Returns the sentinel frame if every pixel is
/// `background`.
fn trim_background(frame: &Frame, background: Color) -> Frame {
	let Some(pixels) = frame.as_rgba() else { return frame.clone() };
	let (w, h) = (frame.width(), frame.height());
	let Some((x0, y0, x1, y1)) = trim_bbox_against(pixels, w, h, background) else {
		return Frame::sentinel();
	};
	let new_w = x1 - x0 + 1;
	let new_h = y1 - y0 + 1;
	if new_w == w && new_h == h {
		return frame.clone();
	}
	let cropped = crop(pixels, w, x0, y0, new_w, new_h);
	let clamp = |v: i32| v.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
	let cx = clamp(i32::from(frame.cx()) - i32::from(x0));
	let cy = clamp(i32::from(frame.cy()) - i32::from(y0));
	Frame::new_rgba(new_w, new_h, cx, cy, cropped)
}

/// Rotates `frame` 90° (the companion rotation to the centre transform in
/// §4.10: `new_cx = old_cy`, `new_cy = (new_width - 1) - old_cx`).
fn rotate90(frame: &Frame, filter_name: &'static str, frame_index: usize) -> Result<Frame> {
	let w = usize::from(frame.width());
	let h = usize::from(frame.height());
	let pixels = rgba_pixels(frame, filter_name, frame_index)?;
	let mut out = vec![Color::default(); w * h];
	for ny in 0..w {
		for nx in 0..h {
			out[ny * h + nx] = pixels[(h - 1 - nx) * w + ny];
		}
	}
	let new_width = frame.height();
	let new_cx = frame.cy();
	let new_cy = (i32::from(new_width) - 1 - i32::from(frame.cx())) as i16;
	Ok(Frame::new_rgba(frame.height(), frame.width(), new_cx, new_cy, out))
}

fn rotate_affine(
	frame: &Frame,
	filter_name: &'static str,
	frame_index: usize,
	angle_degrees: f32,
	interpolate: bool,
	background: Color,
) -> Result<Frame> {
	let w = frame.width();
	let h = frame.height();
	let pixels = rgba_pixels(frame, filter_name, frame_index)?;

	// Fixed-point sampler: scale sin/cos by 16 and keep the low bits as the
	// bilinear blend weight, per the design notes' deterministic sampler.
	let rad = f64::from(angle_degrees).to_radians();
	let cos16 = (rad.cos() * 16.0).round() as i64;
	let sin16 = (rad.sin() * 16.0).round() as i64;

	let (cx, cy) = (f64::from(w) / 2.0, f64::from(h) / 2.0);
	let mut out = vec![background; usize::from(w) * usize::from(h)];

	for dy in 0..i64::from(h) {
		for dx in 0..i64::from(w) {
			let rel_x = dx as f64 - cx;
			let rel_y = dy as f64 - cy;
			// Inverse rotation (by -angle) to find the source sample point.
			let src_x16 = (rel_x * cos16 as f64 + rel_y * sin16 as f64) as i64;
			let src_y16 = (-rel_x * sin16 as f64 + rel_y * cos16 as f64) as i64;
			let src_x = src_x16 as f64 / 16.0 + cx;
			let src_y = src_y16 as f64 / 16.0 + cy;

			let sample = if interpolate {
				sample_bilinear(pixels, w, h, src_x, src_y, background)
			} else {
				sample_nearest(pixels, w, h, src_x, src_y, background)
			};
			out[(dy as usize) * usize::from(w) + dx as usize] = sample;
		}
	}

	Ok(Frame::new_rgba(w, h, frame.cx(), frame.cy(), out))
}

fn sample_nearest(pixels: &[Color], w: u16, h: u16, x: f64, y: f64, background: Color) -> Color {
	let (ix, iy) = (x.round() as i64, y.round() as i64);
	if ix < 0 || iy < 0 || ix >= i64::from(w) || iy >= i64::from(h) {
		return background;
	}
	pixels[(iy as usize) * usize::from(w) + ix as usize]
}

/// Fetches `(gx, gy)` as normalised `[r, g, b, a]` channels, or `background`
/// if it falls outside `w x h`. Shared by [`sample_bilinear`] and
/// [`sample_bicubic`].
fn fetch(pixels: &[Color], w: u16, h: u16, gx: i64, gy: i64, background: Color) -> [f64; 4] {
	if gx < 0 || gy < 0 || gx >= i64::from(w) || gy >= i64::from(h) {
		return [f64::from(background.r), f64::from(background.g), f64::from(background.b), f64::from(background.a)];
	}
	let c = pixels[(gy as usize) * usize::from(w) + gx as usize];
	[f64::from(c.r), f64::from(c.g), f64::from(c.b), f64::from(c.a)]
}

fn channels_to_color(channels: [f64; 4]) -> Color {
	Color {
		r: channels[0].round().clamp(0.0, 255.0) as u8,
		g: channels[1].round().clamp(0.0, 255.0) as u8,
		b: channels[2].round().clamp(0.0, 255.0) as u8,
		a: channels[3].round().clamp(0.0, 255.0) as u8,
	}
}

fn sample_bilinear(pixels: &[Color], w: u16, h: u16, x: f64, y: f64, background: Color) -> Color {
	let x0 = x.floor();
	let y0 = y.floor();
	let fx = x - x0;
	let fy = y - y0;
	let (x0i, y0i) = (x0 as i64, y0 as i64);
	let p00 = fetch(pixels, w, h, x0i, y0i, background);
	let p10 = fetch(pixels, w, h, x0i + 1, y0i, background);
	let p01 = fetch(pixels, w, h, x0i, y0i + 1, background);
	let p11 = fetch(pixels, w, h, x0i + 1, y0i + 1, background);
	let mut blended = [0.0; 4];
	for i in 0..4 {
		let top = p00[i] * (1.0 - fx) + p10[i] * fx;
		let bottom = p01[i] * (1.0 - fx) + p11[i] * fx;
		blended[i] = top * (1.0 - fy) + bottom * fy;
	}
	channels_to_color(blended)
}

/// Catmull-Rom bicubic convolution (`a = -0.5`) over the 4x4 neighbourhood
/// around `(x, y)`.
fn sample_bicubic(pixels: &[Color], w: u16, h: u16, x: f64, y: f64, background: Color) -> Color {
	fn cubic_weight(t: f64) -> f64 {
		const A: f64 = -0.5;
		let t = t.abs();
		if t <= 1.0 {
			(A + 2.0) * t.powi(3) - (A + 3.0) * t.powi(2) + 1.0
		} else if t < 2.0 {
			A * t.powi(3) - 5.0 * A * t.powi(2) + 8.0 * A * t - 4.0 * A
		} else {
			0.0
		}
	}

	let x0 = x.floor();
	let y0 = y.floor();
	let fx = x - x0;
	let fy = y - y0;
	let (x0i, y0i) = (x0 as i64, y0 as i64);

	let mut blended = [0.0; 4];
	for n in -1..=2i64 {
		let wy = cubic_weight(fy - n as f64);
		for m in -1..=2i64 {
			let wx = cubic_weight(fx - m as f64);
			let weight = wx * wy;
			let p = fetch(pixels, w, h, x0i + m, y0i + n, background);
			for i in 0..4 {
				blended[i] += p[i] * weight;
			}
		}
	}
	channels_to_color(blended)
}

/// Resampling kernel for `resize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResizeKind {
	Nearest,
	Bilinear,
	Bicubic,
	ScaleX,
}

/// `resize`: scales a frame by independent width/height factors.
#[derive(Debug, Clone, Copy)]
pub struct ResizeFilter {
	kind: ResizeKind,
	scale_width: f32,
	scale_height: f32,
	background: Color,
	updatecenter: bool,
}

impl Default for ResizeFilter {
	fn default() -> Self {
		Self {
			kind: ResizeKind::Nearest,
			scale_width: 1.0,
			scale_height: 1.0,
			background: Color::default(),
			updatecenter: false,
		}
	}
}

impl Filter for ResizeFilter {
	fn name(&self) -> &'static str {
		"resize"
	}

	fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
		match key {
			"type" => {
				self.kind = match value {
					"nearest" => ResizeKind::Nearest,
					"bilinear" => ResizeKind::Bilinear,
					"bicubic" => ResizeKind::Bicubic,
					"scalex" => ResizeKind::ScaleX,
					other => return Err(invalid_option("resize", 0, key, format!("unknown resize type '{other}'"))),
				};
			}
			"scalewidth" => self.scale_width = parse_f32("resize", key, value, 0.0001, 256.0)?,
			"scaleheight" => self.scale_height = parse_f32("resize", key, value, 0.0001, 256.0)?,
			"background" => self.background = parse_argb("resize", key, value)?,
			"updatecenter" => self.updatecenter = parse_bool("resize", key, value)?,
			_ => {}
		}
		Ok(())
	}

	fn process(&self, frame: &Frame, frame_index: usize, all_frames: &[Frame]) -> Result<Frame> {
		let expanded = expand_to_union(frame, self.name(), frame_index, all_frames, self.background)?;

		let resized = if self.kind == ResizeKind::ScaleX {
			if (self.scale_width - self.scale_height).abs() > f32::EPSILON {
				return Err(invalid_option(
					self.name(),
					0,
					"scaleheight",
					format!("scalex requires scaleheight ({}) to equal scalewidth ({})", self.scale_height, self.scale_width),
				));
			}
			resize_scalex(&expanded, self.name(), frame_index, self.scale_width, self.updatecenter)?
		} else {
			let new_w = ((f32::from(expanded.width()) * self.scale_width).round().max(1.0)) as u16;
			let new_h = ((f32::from(expanded.height()) * self.scale_height).round().max(1.0)) as u16;
			let pixels = rgba_pixels(&expanded, self.name(), frame_index)?;
			let mut out = vec![Color::default(); usize::from(new_w) * usize::from(new_h)];

			for dy in 0..new_h {
				for dx in 0..new_w {
					let src_x = f64::from(dx) / f64::from(self.scale_width);
					let src_y = f64::from(dy) / f64::from(self.scale_height);
					let sample = match self.kind {
						ResizeKind::Nearest => {
							sample_nearest(pixels, expanded.width(), expanded.height(), src_x, src_y, self.background)
						}
						ResizeKind::Bilinear => {
							sample_bilinear(pixels, expanded.width(), expanded.height(), src_x, src_y, self.background)
						}
						ResizeKind::Bicubic => {
							sample_bicubic(pixels, expanded.width(), expanded.height(), src_x, src_y, self.background)
						}
						ResizeKind::ScaleX => unreachable!("handled above"),
					};
					out[usize::from(dy) * usize::from(new_w) + usize::from(dx)] = sample;
				}
			}

			let (cx, cy) = scaled_center(&expanded, self.scale_width, self.scale_height, self.updatecenter);
			Frame::new_rgba(new_w, new_h, cx, cy, out)
		};

		Ok(trim_background(&resized, self.background))
	}
}

fn scaled_center(frame: &Frame, scale_w: f32, scale_h: f32, updatecenter: bool) -> (i16, i16) {
	if !updatecenter {
		return (frame.cx(), frame.cy());
	}
	let cx = (f32::from(frame.cx()) * scale_w).round() as i16;
	let cy = (f32::from(frame.cy()) * scale_h).round() as i16;
	(cx, cy)
}

/// `scalex`: applies the Scale2x/Scale3x pixel-art edge-detection kernels.
/// `factor` must decompose into a run of 2s and 3s (2, 3, 4, 6, 8, 9, ...);
/// each factor is applied in turn as a 2x or 3x edge-detection pass, so a
/// factor of 6 is a Scale2x pass followed by a Scale3x pass.
fn resize_scalex(
	frame: &Frame,
	filter_name: &'static str,
	frame_index: usize,
	scale: f32,
	updatecenter: bool,
) -> Result<Frame> {
	let factor = scale.round() as i64;
	if factor < 2 || (scale - factor as f32).abs() > f32::EPSILON || !factors_over_two_and_three(factor) {
		return Err(invalid_option(
			filter_name,
			0,
			"scalewidth",
			format!("scalex requires an integer factor built from 2 and 3, got {scale}"),
		));
	}

	let pixels = rgba_pixels(frame, filter_name, frame_index)?;
	let (mut current, mut w, mut h) = (pixels.to_vec(), frame.width(), frame.height());
	let mut remaining = factor;
	while remaining % 2 == 0 {
		let (next, nw, nh) = scale2x(&current, w, h);
		current = next;
		w = nw;
		h = nh;
		remaining /= 2;
	}
	while remaining % 3 == 0 {
		let (next, nw, nh) = scale3x(&current, w, h);
		current = next;
		w = nw;
		h = nh;
		remaining /= 3;
	}

	let scale_f = factor as f32;
	let (cx, cy) = scaled_center(frame, scale_f, scale_f, updatecenter);
	Ok(Frame::new_rgba(w, h, cx, cy, current))
}

/// AdvMAME2x/Scale2x: each source pixel expands to a 2x2 block whose corners
/// lean toward whichever orthogonal neighbour shares their diagonal and
/// disagrees with the other one, preserving diagonal edges instead of
/// blurring them the way bilinear resampling would.
fn scale2x(src: &[Color], w: u16, h: u16) -> (Vec<Color>, u16, u16) {
	let new_w = w * 2;
	let new_h = h * 2;
	let get = |x: i32, y: i32| -> Color {
		let cx = x.clamp(0, i32::from(w) - 1) as usize;
		let cy = y.clamp(0, i32::from(h) - 1) as usize;
		src[cy * usize::from(w) + cx]
	};
	let mut out = vec![Color::default(); usize::from(new_w) * usize::from(new_h)];
	for y in 0..i32::from(h) {
		for x in 0..i32::from(w) {
			let e = get(x, y);
			let b = get(x, y - 1);
			let d = get(x - 1, y);
			let f = get(x + 1, y);
			let hh = get(x, y + 1);

			let e0 = if d == b && b != hh && d != f { d } else { e };
			let e1 = if b == f && b != d && f != hh { f } else { e };
			let e2 = if d == hh && d != b && hh != f { d } else { e };
			let e3 = if hh == f && d != hh && b != f { f } else { e };

			let (ox, oy) = (usize::from(x as u16) * 2, usize::from(y as u16) * 2);
			let stride = usize::from(new_w);
			out[oy * stride + ox] = e0;
			out[oy * stride + ox + 1] = e1;
			out[(oy + 1) * stride + ox] = e2;
			out[(oy + 1) * stride + ox + 1] = e3;
		}
	}
	(out, new_w, new_h)
}

/// AdvMAME3x/Scale3x: the same edge-leaning idea as [`scale2x`] over a 3x3
/// neighbourhood, producing a 3x3 output block per source pixel.
fn scale3x(src: &[Color], w: u16, h: u16) -> (Vec<Color>, u16, u16) {
	let new_w = w * 3;
	let new_h = h * 3;
	let get = |x: i32, y: i32| -> Color {
		let cx = x.clamp(0, i32::from(w) - 1) as usize;
		let cy = y.clamp(0, i32::from(h) - 1) as usize;
		src[cy * usize::from(w) + cx]
	};
	let mut out = vec![Color::default(); usize::from(new_w) * usize::from(new_h)];
	for y in 0..i32::from(h) {
		for x in 0..i32::from(w) {
			let a = get(x - 1, y - 1);
			let b = get(x, y - 1);
			let c = get(x + 1, y - 1);
			let d = get(x - 1, y);
			let e = get(x, y);
			let f = get(x + 1, y);
			let g = get(x - 1, y + 1);
			let hh = get(x, y + 1);
			let i = get(x + 1, y + 1);

			let block = if b != hh && d != f {
				[
					if d == b { d } else { e },
					if (d == b && e != c) || (b == f && e != a) { b } else { e },
					if b == f { f } else { e },
					if (d == b && e != g) || (d == hh && e != a) { d } else { e },
					e,
					if (b == f && e != i) || (hh == f && e != c) { f } else { e },
					if d == hh { d } else { e },
					if (d == hh && e != i) || (hh == f && e != g) { hh } else { e },
					if hh == f { f } else { e },
				]
			} else {
				[e; 9]
			};

			let (ox, oy) = (usize::from(x as u16) * 3, usize::from(y as u16) * 3);
			let stride = usize::from(new_w);
			for (i, &c) in block.iter().enumerate() {
				out[(oy + i / 3) * stride + ox + i % 3] = c;
			}
		}
	}
	(out, new_w, new_h)
}

fn factors_over_two_and_three(mut n: i64) -> bool {
	while n % 2 == 0 {
		n /= 2;
	}
	while n % 3 == 0 {
		n /= 3;
	}
	n == 1
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn translate_adjusts_center_only() {
		let frame = Frame::new_rgba(1, 1, 0, 0, vec![Color::rgb(1, 2, 3)]);
		let mut filter = TranslateFilter::default();
		filter.set_option("x", "5").unwrap();
		filter.set_option("y", "-3").unwrap();
		let out = filter.process(&frame, 0, &[]).unwrap();
		assert_eq!((out.cx(), out.cy()), (5, -3));
		assert_eq!(out.as_rgba(), frame.as_rgba());
	}

	#[test]
	fn mirror_horizontal_matches_worked_example() {
		let frame = Frame::new_rgba(2, 1, 0, 0, vec![Color::rgb(1, 0, 0), Color::rgb(2, 0, 0)]);
		let mut filter = MirrorFilter::default();
		filter.set_option("horizontal", "true").unwrap();
		filter.set_option("updatecenter", "true").unwrap();
		let out = filter.process(&frame, 0, &[]).unwrap();
		assert_eq!(out.as_rgba().unwrap()[0], Color::rgb(2, 0, 0));
		assert_eq!(out.as_rgba().unwrap()[1], Color::rgb(1, 0, 0));
		assert_eq!((out.cx(), out.cy()), (2, 0));
	}

	#[test]
	fn mirror_false_false_is_identity() {
		let frame = Frame::new_rgba(2, 2, 1, 1, (0..4).map(|i| Color::rgb(i, i, i)).collect());
		let out = MirrorFilter::default().process(&frame, 0, &[]).unwrap();
		assert_eq!(out, frame);
	}

	#[test]
	fn rotate_zero_is_identity() {
		let frame = Frame::new_rgba(2, 3, 0, 0, (0..6).map(|i| Color::rgb(i, i, i)).collect());
		let out = RotateFilter::default().process(&frame, 0, &[]).unwrap();
		assert_eq!(out, frame);
	}

	#[test]
	fn rotate_90_four_times_is_identity() {
		let frame = Frame::new_rgba(2, 3, 5, 1, (0..6).map(|i| Color::rgb(i * 10, 0, 0)).collect());
		let mut filter = RotateFilter::default();
		filter.set_option("angle", "90").unwrap();
		let mut current = frame.clone();
		for _ in 0..4 {
			current = filter.process(&current, 0, &[]).unwrap();
		}
		assert_eq!(current.as_rgba(), frame.as_rgba());
		assert_eq!((current.cx(), current.cy()), (frame.cx(), frame.cy()));
	}

	#[test]
	fn resize_identity_scale_is_a_noop() {
		let frame = Frame::new_rgba(2, 2, 0, 0, (0..4).map(|i| Color::rgb(i, i, i)).collect());
		let out = ResizeFilter::default().process(&frame, 0, &[]).unwrap();
		assert_eq!(out.as_rgba(), frame.as_rgba());
	}

	#[test]
	fn scalex_doubles_each_axis() {
		let frame = Frame::new_rgba(1, 1, 0, 0, vec![Color::rgb(9, 9, 9)]);
		let mut filter = ResizeFilter::default();
		filter.set_option("type", "scalex").unwrap();
		filter.set_option("scalewidth", "2").unwrap();
		filter.set_option("scaleheight", "2").unwrap();
		let out = filter.process(&frame, 0, &[]).unwrap();
		assert_eq!((out.width(), out.height()), (2, 2));
	}

	#[test]
	fn scalex_requires_equal_width_and_height_factors() {
		let frame = Frame::new_rgba(1, 1, 0, 0, vec![Color::rgb(9, 9, 9)]);
		let mut filter = ResizeFilter::default();
		filter.set_option("type", "scalex").unwrap();
		filter.set_option("scalewidth", "2").unwrap();
		filter.set_option("scaleheight", "3").unwrap();
		assert!(filter.process(&frame, 0, &[]).is_err());
	}

	#[test]
	fn rotate_90_matches_the_worked_example() {
		// A 3-wide, 2-tall frame with pixels A..F (row-major); rotating 90°
		// clockwise yields a 2-wide, 3-tall frame reading D, A, E, B, F, C.
		let frame = Frame::new_rgba(
			3,
			2,
			0,
			0,
			vec![
				Color::rgb(b'A', 0, 0),
				Color::rgb(b'B', 0, 0),
				Color::rgb(b'C', 0, 0),
				Color::rgb(b'D', 0, 0),
				Color::rgb(b'E', 0, 0),
				Color::rgb(b'F', 0, 0),
			],
		);
		let mut filter = RotateFilter::default();
		filter.set_option("angle", "90").unwrap();
		let out = filter.process(&frame, 0, &[]).unwrap();
		assert_eq!((out.width(), out.height()), (2, 3));
		let expected = [b'D', b'A', b'E', b'B', b'F', b'C'];
		for (pixel, letter) in out.as_rgba().unwrap().iter().zip(expected) {
			assert_eq!(pixel.r, letter);
		}
	}

	#[test]
	fn rotate_expands_to_the_union_of_the_frame_set_before_trimming() {
		// A 1x1 frame rotated 90° alongside a wider sibling frame: the union
		// canvas pads it to 2x1 before rotating, and the background-coloured
		// padding is trimmed back off afterwards.
		let small = Frame::new_rgba(1, 1, 0, 0, vec![Color::rgb(7, 7, 7)]);
		let wide = Frame::new_rgba(2, 1, 0, 0, vec![Color::default(); 2]);
		let mut filter = RotateFilter::default();
		filter.set_option("angle", "90").unwrap();
		let out = filter.process(&small, 0, std::slice::from_ref(&wide)).unwrap();
		assert_eq!(out.as_rgba().unwrap(), &[Color::rgb(7, 7, 7)]);
	}
}
