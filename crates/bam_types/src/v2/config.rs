//! Encode-time configuration for the V2 container.

use crate::pvrz::{BlockFormat, Quality};
use serde::{Deserialize, Serialize};

/// Encode-time configuration for the V2 (truecolour/PVRZ) container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct V2Config {
	/// Block-compression quality passed to every PVRZ page.
	pub quality: Quality,
	/// Whether the block-compression error metric is weighted by alpha.
	pub weight_by_alpha: bool,
	/// Whether the block-compression error metric is perceptual (luminance-weighted).
	pub perceptual_metric: bool,
	/// Forces every page to BC1 even if it has translucent pixels, trading
	/// fidelity for file size.
	pub force_bc1: bool,
	/// Percentage (0..=100) of alpha values that must be fully transparent
	/// or fully opaque before a page is still considered alpha-free; see
	/// the alpha-threshold formula in §4.8.
	pub alpha_threshold_percent: u8,
	/// Whether the final page dimensions may be non-power-of-two.
	pub allow_non_power_of_two_pages: bool,
	/// First page index handed out during encode (`pvrz_start_index`, 0..=99999).
	pub pvrz_start_index: u32,
}

impl Default for V2Config {
	fn default() -> Self {
		Self {
			quality: Quality::Normal,
			weight_by_alpha: false,
			perceptual_metric: true,
			force_bc1: false,
			alpha_threshold_percent: 0,
			allow_non_power_of_two_pages: false,
			pvrz_start_index: 0,
		}
	}
}

impl V2Config {
	/// Converts [`V2Config::alpha_threshold_percent`] into the cutoff `C` from
	/// §4.8: a pixel "has alpha" iff its alpha lies in `(0, C)`.
	#[must_use]
	pub fn alpha_cutoff(&self) -> u8 {
		let p = f64::from(self.alpha_threshold_percent.min(100));
		(255.0 - (p * 2.55).round()).clamp(0.0, 255.0) as u8
	}

	/// Chooses the block format for a page, given whether any pixel on it
	/// triggered the alpha threshold.
	#[must_use]
	pub fn format_for(&self, has_alpha: bool) -> BlockFormat {
		if has_alpha && !self.force_bc1 {
			BlockFormat::Bc3
		} else {
			BlockFormat::Bc1
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn alpha_cutoff_at_zero_percent_is_255() {
		let config = V2Config { alpha_threshold_percent: 0, ..V2Config::default() };
		assert_eq!(config.alpha_cutoff(), 255);
	}

	#[test]
	fn alpha_cutoff_at_full_percent_is_zero() {
		let config = V2Config { alpha_threshold_percent: 100, ..V2Config::default() };
		assert_eq!(config.alpha_cutoff(), 0);
	}

	#[test]
	fn format_for_respects_force_bc1() {
		let config = V2Config { force_bc1: true, ..V2Config::default() };
		assert_eq!(config.format_for(true), BlockFormat::Bc1);
	}

	#[test]
	fn format_for_upgrades_to_bc3_when_alpha_present() {
		let config = V2Config::default();
		assert_eq!(config.format_for(true), BlockFormat::Bc3);
		assert_eq!(config.format_for(false), BlockFormat::Bc1);
	}
}
