//! The frame filter pipeline (C9 registry/runner, C10 filters): an ordered
//! chain of pure per-frame transforms applied over the current frame set.
//!
//! Filters only ever see premultiplied RGBA frames: by the time a frame
//! enters the pipeline the model has already converted it out of its
//! on-disk palette (V1 quantisation happens *after* filtering, not before —
//! see the encode data-flow in the crate-level docs).

pub mod registry;
pub mod runner;

mod canvas;
mod color;
mod geometry;
mod hsl;
mod null;

pub use registry::create;
pub use runner::{run_chain, Concurrency};

use crate::color::Color;
use crate::error::{BamError, Result};
use crate::frame::Frame;

/// A single stage of the filter chain.
///
/// Implementations are stateless aside from the options set through
/// [`Filter::set_option`]; `process` must be a pure function of `frame`,
/// `frame_index`, and `all_frames` so the runner can execute it
/// concurrently with every other frame in the same pass.
pub trait Filter: Send + Sync {
	/// The filter's registry name, e.g. `"brightness"`.
	fn name(&self) -> &'static str;

	/// Sets a single option by its string key and value.
	///
	/// Unknown keys are silently ignored (the option bag tolerates them);
	/// a known key with an out-of-range or malformed value returns
	/// [`BamError::InvalidFilterOption`].
	fn set_option(&mut self, key: &str, value: &str) -> Result<()>;

	/// Applies this filter to `frame`, given the full previous-pass frame
	/// set in `all_frames` for filters that need cross-frame context
	/// (`split`, the canvas-union step of `rotate`/`resize`).
	fn process(&self, frame: &Frame, frame_index: usize, all_frames: &[Frame]) -> Result<Frame>;
}

/// Extracts the RGBA pixel slice from `frame`, or fails with
/// [`BamError::FilterFailed`] if the model handed a filter an indexed frame
/// (which should never happen: decode converts to RGBA immediately).
fn rgba_pixels<'a>(frame: &'a Frame, filter_name: &'static str, frame_index: usize) -> Result<&'a [Color]> {
	frame.as_rgba().ok_or_else(|| BamError::FilterFailed {
		filter_name,
		filter_index: 0,
		frame_index,
		message: "filter received an indexed frame; expected premultiplied RGBA".to_string(),
	})
}

fn invalid_option(
	filter_name: &'static str,
	filter_index: usize,
	key: &str,
	message: impl Into<String>,
) -> BamError {
	BamError::InvalidFilterOption { filter_name, filter_index, key: key.to_string(), message: message.into() }
}

fn parse_f32(
	filter_name: &'static str,
	key: &str,
	value: &str,
	min: f32,
	max: f32,
) -> Result<f32> {
	let parsed: f32 = value
		.parse()
		.map_err(|_| invalid_option(filter_name, 0, key, format!("'{value}' is not a number")))?;
	if parsed < min || parsed > max {
		return Err(invalid_option(filter_name, 0, key, format!("{parsed} outside [{min}, {max}]")));
	}
	Ok(parsed)
}

fn parse_i32(filter_name: &'static str, key: &str, value: &str, min: i32, max: i32) -> Result<i32> {
	let parsed: i32 = value
		.parse()
		.map_err(|_| invalid_option(filter_name, 0, key, format!("'{value}' is not an integer")))?;
	if parsed < min || parsed > max {
		return Err(invalid_option(filter_name, 0, key, format!("{parsed} outside [{min}, {max}]")));
	}
	Ok(parsed)
}

fn parse_bool(filter_name: &'static str, key: &str, value: &str) -> Result<bool> {
	match value {
		"true" | "1" | "yes" => Ok(true),
		"false" | "0" | "no" => Ok(false),
		_ => Err(invalid_option(filter_name, 0, key, format!("'{value}' is not a boolean"))),
	}
}

fn parse_argb(filter_name: &'static str, key: &str, value: &str) -> Result<Color> {
	let trimmed = value.trim_start_matches("0x").trim_start_matches("0X");
	let parsed = u32::from_str_radix(trimmed, 16)
		.map_err(|_| invalid_option(filter_name, 0, key, format!("'{value}' is not 0xAARRGGBB hex")))?;
	Ok(Color::from_argb_u32(parsed))
}

/// Clamps a normalised (0..1) channel and rescales it back to 0..255.
fn clamp_channel(value: f32) -> u8 {
	(value.clamp(0.0, 1.0) * 255.0).round() as u8
}
