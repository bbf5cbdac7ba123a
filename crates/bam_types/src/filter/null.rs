//! The identity filter: the simplest possible [`super::Filter`] impl.

use super::Filter;
use crate::error::Result;
use crate::frame::Frame;

/// Clones the frame unchanged. Used as a chain placeholder and as the
/// baseline for idempotence tests on every other filter.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFilter;

impl Filter for NullFilter {
	fn name(&self) -> &'static str {
		"null"
	}

	fn set_option(&mut self, _key: &str, _value: &str) -> Result<()> {
		Ok(())
	}

	fn process(&self, frame: &Frame, _frame_index: usize, _all_frames: &[Frame]) -> Result<Frame> {
		Ok(frame.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn clones_the_frame() {
		let frame = Frame::sentinel();
		let out = NullFilter.process(&frame, 0, &[]).unwrap();
		assert_eq!(out, frame);
	}
}
