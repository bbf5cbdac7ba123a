//! Canvas-shaping filters: `canvas` (trim/border/pad) and `split` (grid
//! tiling over the union of the current frame set).

use super::{invalid_option, parse_bool, rgba_pixels, Filter};
use crate::color::Color;
use crate::error::Result;
use crate::frame::Frame;

/// Horizontal alignment used by [`CanvasFilter`]'s `halign` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum HAlign {
	#[default]
	Left,
	Center,
	Right,
}

/// Vertical alignment used by [`CanvasFilter`]'s `valign` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum VAlign {
	#[default]
	Top,
	Center,
	Bottom,
}

/// `canvas`: trims transparent margins, adds a fixed border, then pads to a
/// minimum size with the requested alignment.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanvasFilter {
	trim: bool,
	border_l: u16,
	border_t: u16,
	border_r: u16,
	border_b: u16,
	min_w: u16,
	min_h: u16,
	halign: HAlign,
	valign: VAlign,
	updatecenter: bool,
}

impl Filter for CanvasFilter {
	fn name(&self) -> &'static str {
		"canvas"
	}

	fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
		match key {
			"trim" => self.trim = parse_bool("canvas", key, value)?,
			"borderleft" => self.border_l = parse_u16("canvas", key, value)?,
			"bordertop" => self.border_t = parse_u16("canvas", key, value)?,
			"borderright" => self.border_r = parse_u16("canvas", key, value)?,
			"borderbottom" => self.border_b = parse_u16("canvas", key, value)?,
			"minwidth" => self.min_w = parse_u16("canvas", key, value)?,
			"minheight" => self.min_h = parse_u16("canvas", key, value)?,
			"halign" => {
				self.halign = match value {
					"left" => HAlign::Left,
					"center" => HAlign::Center,
					"right" => HAlign::Right,
					other => return Err(invalid_option("canvas", 0, key, format!("unknown alignment '{other}'"))),
				};
			}
			"valign" => {
				self.valign = match value {
					"top" => VAlign::Top,
					"center" => VAlign::Center,
					"bottom" => VAlign::Bottom,
					other => return Err(invalid_option("canvas", 0, key, format!("unknown alignment '{other}'"))),
				};
			}
			"updatecenter" => self.updatecenter = parse_bool("canvas", key, value)?,
			_ => {}
		}
		Ok(())
	}

	fn process(&self, frame: &Frame, frame_index: usize, _all_frames: &[Frame]) -> Result<Frame> {
		let pixels = rgba_pixels(frame, self.name(), frame_index)?;
		let (mut w, mut h) = (frame.width(), frame.height());
		let (mut cx, mut cy) = (i32::from(frame.cx()), i32::from(frame.cy()));
		let mut pixels: Vec<Color> = pixels.to_vec();

		if self.trim {
			if let Some((x0, y0, x1, y1)) = trim_bbox(&pixels, w, h) {
				let new_w = x1 - x0 + 1;
				let new_h = y1 - y0 + 1;
				pixels = crop(&pixels, w, x0, y0, new_w, new_h);
				cx -= i32::from(x0);
				cy -= i32::from(y0);
				w = new_w;
				h = new_h;
			}
		}

		if self.border_l != 0 || self.border_t != 0 || self.border_r != 0 || self.border_b != 0 {
			let new_w = w + self.border_l + self.border_r;
			let new_h = h + self.border_t + self.border_b;
			pixels = draw_into(&pixels, w, h, new_w, new_h, self.border_l, self.border_t);
			cx += i32::from(self.border_l);
			cy += i32::from(self.border_t);
			w = new_w;
			h = new_h;
		}

		let (pad_left, new_w) = pad_axis(w, self.min_w, align_start(self.halign));
		let (pad_top, new_h) = pad_axis(h, self.min_h, align_start2(self.valign));
		if new_w != w || new_h != h {
			pixels = draw_into(&pixels, w, h, new_w, new_h, pad_left, pad_top);
			cx += i32::from(pad_left);
			cy += i32::from(pad_top);
			w = new_w;
			h = new_h;
		}

		if w == 0 || h == 0 {
			return Ok(Frame::sentinel());
		}

		let (out_cx, out_cy) = if self.updatecenter {
			(clamp_i16(cx), clamp_i16(cy))
		} else {
			(frame.cx(), frame.cy())
		};
		Ok(Frame::new_rgba(w, h, out_cx, out_cy, pixels))
	}
}

fn align_start(align: HAlign) -> Align {
	match align {
		HAlign::Left => Align::Start,
		HAlign::Center => Align::Center,
		HAlign::Right => Align::End,
	}
}

fn align_start2(align: VAlign) -> Align {
	match align {
		VAlign::Top => Align::Start,
		VAlign::Center => Align::Center,
		VAlign::Bottom => Align::End,
	}
}

enum Align {
	Start,
	Center,
	End,
}

/// Returns `(offset, new_size)`: `new_size` is `max(current, min)` and
/// `offset` is where `current` starts within it per `align`.
fn pad_axis(current: u16, min: u16, align: Align) -> (u16, u16) {
	if min <= current {
		return (0, current);
	}
	let total_pad = min - current;
	let offset = match align {
		Align::Start => 0,
		Align::Center => total_pad / 2,
		Align::End => total_pad,
	};
	(offset, min)
}

fn parse_u16(filter_name: &'static str, key: &str, value: &str) -> Result<u16> {
	value.parse().map_err(|_| invalid_option(filter_name, 0, key, format!("'{value}' is not in 0..=65535")))
}

pub(super) fn clamp_i16(v: i32) -> i16 {
	v.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Smallest rectangle (inclusive bounds) containing every pixel that doesn't
/// match `background`, or `None` if `pixels` is entirely `background`.
pub(super) fn trim_bbox_against(pixels: &[Color], w: u16, h: u16, background: Color) -> Option<(u16, u16, u16, u16)> {
	let (mut x0, mut y0) = (u16::MAX, u16::MAX);
	let (mut x1, mut y1) = (0u16, 0u16);
	let mut found = false;
	for y in 0..h {
		for x in 0..w {
			if pixels[usize::from(y) * usize::from(w) + usize::from(x)] != background {
				found = true;
				x0 = x0.min(x);
				y0 = y0.min(y);
				x1 = x1.max(x);
				y1 = y1.max(y);
			}
		}
	}
	found.then_some((x0, y0, x1, y1))
}

/// Smallest rectangle (inclusive bounds) containing every non-transparent
/// pixel, or `None` if `pixels` is entirely transparent.
fn trim_bbox(pixels: &[Color], w: u16, h: u16) -> Option<(u16, u16, u16, u16)> {
	let (mut x0, mut y0) = (u16::MAX, u16::MAX);
	let (mut x1, mut y1) = (0u16, 0u16);
	let mut found = false;
	for y in 0..h {
		for x in 0..w {
			if pixels[usize::from(y) * usize::from(w) + usize::from(x)].a != 0 {
				found = true;
				x0 = x0.min(x);
				y0 = y0.min(y);
				x1 = x1.max(x);
				y1 = y1.max(y);
			}
		}
	}
	found.then_some((x0, y0, x1, y1))
}

pub(super) fn crop(pixels: &[Color], src_w: u16, x0: u16, y0: u16, new_w: u16, new_h: u16) -> Vec<Color> {
	let mut out = Vec::with_capacity(usize::from(new_w) * usize::from(new_h));
	for y in 0..new_h {
		let row = usize::from(y0 + y) * usize::from(src_w) + usize::from(x0);
		out.extend_from_slice(&pixels[row..row + usize::from(new_w)]);
	}
	out
}

/// Draws `src` (`src_w x src_h`) into a fresh `dst_w x dst_h` transparent
/// canvas at `(at_x, at_y)`.
pub(super) fn draw_into(src: &[Color], src_w: u16, src_h: u16, dst_w: u16, dst_h: u16, at_x: u16, at_y: u16) -> Vec<Color> {
	draw_into_on(src, src_w, src_h, dst_w, dst_h, at_x, at_y, Color::default())
}

/// As [`draw_into`], but the canvas surrounding `src` is filled with `fill`
/// rather than assumed transparent (used by `rotate`/`resize`'s union-canvas
/// pass, which pads with the filter's own `background` option).
pub(super) fn draw_into_on(
	src: &[Color],
	src_w: u16,
	src_h: u16,
	dst_w: u16,
	dst_h: u16,
	at_x: u16,
	at_y: u16,
	fill: Color,
) -> Vec<Color> {
	let mut out = vec![fill; usize::from(dst_w) * usize::from(dst_h)];
	for y in 0..src_h {
		for x in 0..src_w {
			let src_i = usize::from(y) * usize::from(src_w) + usize::from(x);
			let dst_i = usize::from(at_y + y) * usize::from(dst_w) + usize::from(at_x + x);
			out[dst_i] = src[src_i];
		}
	}
	out
}

/// `split`: expands the canvas to the union of every frame currently in
/// play, then returns one cell of a `(splitw+1) x (splith+1)` grid. Per the
/// design notes' resolution of the source's dead second `canvas_add_border`
/// call, this filter emits only the requested cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitFilter {
	splitw: u8,
	splith: u8,
	segmentx: u8,
	segmenty: u8,
}

impl Filter for SplitFilter {
	fn name(&self) -> &'static str {
		"split"
	}

	fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
		match key {
			"splitw" => self.splitw = parse_u8_range("split", key, value, 0, 7)?,
			"splith" => self.splith = parse_u8_range("split", key, value, 0, 7)?,
			"segmentx" => self.segmentx = parse_u8_range("split", key, value, 0, 7)?,
			"segmenty" => self.segmenty = parse_u8_range("split", key, value, 0, 7)?,
			_ => {}
		}
		Ok(())
	}

	fn process(&self, frame: &Frame, frame_index: usize, all_frames: &[Frame]) -> Result<Frame> {
		if self.segmentx > self.splitw {
			return Err(invalid_option(
				self.name(),
				0,
				"segmentx",
				format!("segmentx {} exceeds splitw {}", self.segmentx, self.splitw),
			));
		}
		if self.segmenty > self.splith {
			return Err(invalid_option(
				self.name(),
				0,
				"segmenty",
				format!("segmenty {} exceeds splith {}", self.segmenty, self.splith),
			));
		}

		let union_w = all_frames.iter().map(Frame::width).max().unwrap_or_else(|| frame.width()).max(frame.width());
		let union_h = all_frames.iter().map(Frame::height).max().unwrap_or_else(|| frame.height()).max(frame.height());

		let pixels = rgba_pixels(frame, self.name(), frame_index)?;
		let expanded = draw_into(pixels, frame.width(), frame.height(), union_w, union_h, 0, 0);

		let cols = u16::from(self.splitw) + 1;
		let rows = u16::from(self.splith) + 1;
		let cell_w = union_w / cols;
		let cell_h = union_h / rows;

		let x0 = u16::from(self.segmentx) * cell_w;
		let y0 = u16::from(self.segmenty) * cell_h;
		let seg_w = if self.segmentx + 1 == cols as u8 { union_w - x0 } else { cell_w };
		let seg_h = if self.segmenty + 1 == rows as u8 { union_h - y0 } else { cell_h };
		if seg_w == 0 || seg_h == 0 {
			return Ok(Frame::sentinel());
		}

		let segment = crop(&expanded, union_w, x0, y0, seg_w, seg_h);
		let cx = i32::from(frame.cx()) - i32::from(x0);
		let cy = i32::from(frame.cy()) - i32::from(y0);
		Ok(Frame::new_rgba(seg_w, seg_h, clamp_i16(cx), clamp_i16(cy), segment))
	}
}

fn parse_u8_range(filter_name: &'static str, key: &str, value: &str, min: u8, max: u8) -> Result<u8> {
	let parsed: u8 = value.parse().map_err(|_| invalid_option(filter_name, 0, key, format!("'{value}' is not an integer")))?;
	if parsed < min || parsed > max {
		return Err(invalid_option(filter_name, 0, key, format!("{parsed} outside [{min}, {max}]")));
	}
	Ok(parsed)
}
