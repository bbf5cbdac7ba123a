//! Stable palette sort by a selectable key (C3).

use crate::color::Color;
use serde::{Deserialize, Serialize};

/// Sort key for [`sort_palette`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortKey {
	/// Constant zero: sorting by `None` is a stable no-op.
	#[default]
	None,
	/// Perceptual lightness, see [`Color::lightness`].
	Lightness,
	/// HSL saturation.
	Saturation,
	/// HSL hue.
	Hue,
	/// Red channel, normalised.
	R,
	/// Green channel, normalised.
	G,
	/// Blue channel, normalised.
	B,
	/// Alpha channel, normalised.
	A,
}

fn key_value(key: SortKey, color: Color) -> f64 {
	match key {
		SortKey::None => 0.0,
		SortKey::Lightness => color.lightness(),
		SortKey::Saturation => color.to_hsl().1,
		SortKey::Hue => color.to_hsl().0,
		SortKey::R => f64::from(color.r) / 255.0,
		SortKey::G => f64::from(color.g) / 255.0,
		SortKey::B => f64::from(color.b) / 255.0,
		SortKey::A => f64::from(color.a) / 255.0,
	}
}

/// Stably sorts `entries[start_index..]` by `key`, optionally reversing the
/// sorted region afterward. Entries before `start_index` (typically the
/// transparent sentinel and any fixed colours) are left untouched.
///
/// Returns the permutation of the sorted region only: `result[i]` is the
/// index (relative to `start_index`) that the entry now at position
/// `start_index + i` originally occupied.
pub fn sort_palette(
	entries: &mut [Color; 256],
	start_index: usize,
	key: SortKey,
	reversed: bool,
) -> Vec<usize> {
	let region = &mut entries[start_index..];
	let mut indexed: Vec<(usize, Color)> = region.iter().copied().enumerate().collect();
	indexed.sort_by(|a, b| {
		key_value(key, a.1).partial_cmp(&key_value(key, b.1)).unwrap_or(std::cmp::Ordering::Equal)
	});
	if reversed {
		indexed.reverse();
	}
	let perm: Vec<usize> = indexed.iter().map(|(i, _)| *i).collect();
	for (slot, &(_, color)) in region.iter_mut().zip(indexed.iter()) {
		*slot = color;
	}
	perm
}
