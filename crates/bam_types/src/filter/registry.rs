//! Name → factory registry (C9). Static dispatch (tagged `Filter` impls)
//! does the actual work; this module exists only so configuration layers
//! can name a filter by string.

use super::canvas::{CanvasFilter, SplitFilter};
use super::color::{
	Alpha2ColorFilter, BalanceFilter, BrightnessFilter, Color2AlphaFilter, ContrastFilter,
	GammaFilter, InvertFilter, PosterizeFilter, ReplaceFilter,
};
use super::geometry::{MirrorFilter, ResizeFilter, RotateFilter, TranslateFilter};
use super::hsl::{HueFilter, LightnessFilter, SaturationFilter};
use super::null::NullFilter;
use super::Filter;
use crate::error::{BamError, Result};

/// Builds a new filter instance by its registry name.
///
/// # Errors
///
/// Returns [`BamError::UnknownFilter`] if `name` is not registered.
pub fn create(name: &str) -> Result<Box<dyn Filter>> {
	let filter: Box<dyn Filter> = match name {
		"null" => Box::new(NullFilter),
		"brightness" => Box::new(BrightnessFilter::default()),
		"contrast" => Box::new(ContrastFilter::default()),
		"gamma" => Box::new(GammaFilter::default()),
		"hue" => Box::new(HueFilter::default()),
		"saturation" => Box::new(SaturationFilter::default()),
		"lightness" => Box::new(LightnessFilter::default()),
		"balance" => Box::new(BalanceFilter::default()),
		"invert" => Box::new(InvertFilter::default()),
		"replace" => Box::new(ReplaceFilter::default()),
		"posterize" => Box::new(PosterizeFilter::default()),
		"alpha2color" => Box::new(Alpha2ColorFilter),
		"color2alpha" => Box::new(Color2AlphaFilter),
		"canvas" => Box::new(CanvasFilter::default()),
		"mirror" => Box::new(MirrorFilter::default()),
		"rotate" => Box::new(RotateFilter::default()),
		"resize" => Box::new(ResizeFilter::default()),
		"translate" => Box::new(TranslateFilter::default()),
		"split" => Box::new(SplitFilter::default()),
		other => return Err(BamError::UnknownFilter(other.to_string())),
	};
	Ok(filter)
}

/// The complete set of registered filter names, in the order §4.10 lists them.
pub const NAMES: &[&str] = &[
	"null",
	"brightness",
	"contrast",
	"gamma",
	"hue",
	"saturation",
	"lightness",
	"balance",
	"invert",
	"replace",
	"posterize",
	"alpha2color",
	"color2alpha",
	"canvas",
	"mirror",
	"rotate",
	"resize",
	"translate",
	"split",
];

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_registered_name_constructs() {
		for &name in NAMES {
			assert_eq!(create(name).unwrap().name(), name);
		}
	}

	#[test]
	fn unknown_name_is_an_error() {
		assert!(create("does-not-exist").is_err());
	}
}
