//! Error types for BAM container parsing, encoding, and the filter pipeline.

use thiserror::Error;

/// Tags an error with the container or subsystem that raised it, mirroring
/// the `file_type` tag carried by file-format errors elsewhere in this
/// family of crates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
	/// The V1 (palettised) container.
	V1,
	/// The V2 (truecolour/PVRZ) container.
	V2,
	/// A PVRZ texture page.
	Pvrz,
	/// The filter registry/runner.
	Filter,
	/// The in-memory BAM model.
	Model,
}

impl std::fmt::Display for Container {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Self::V1 => "V1",
			Self::V2 => "V2",
			Self::Pvrz => "PVRZ",
			Self::Filter => "filter",
			Self::Model => "model",
		};
		f.write_str(name)
	}
}

/// Unified error type for the BAM codec and filter pipeline.
#[derive(Debug, Error)]
pub enum BamError {
	/// Not enough bytes remained to satisfy a read.
	#[error("{container}: insufficient data: expected {expected} bytes, got {actual} bytes")]
	InsufficientData {
		/// Container that raised the error.
		container: Container,
		/// Number of bytes required.
		expected: usize,
		/// Number of bytes actually available.
		actual: usize,
	},

	/// The file signature did not match the expected magic bytes.
	#[error("{container}: invalid signature: expected {expected:02X?}, got {actual:02X?}")]
	InvalidSignature {
		/// Container that raised the error.
		container: Container,
		/// Expected signature bytes.
		expected: Vec<u8>,
		/// Bytes actually read.
		actual: Vec<u8>,
	},

	/// A count field was zero when the format requires at least one entry.
	#[error("{container}: {what} must not be empty")]
	Empty {
		/// Container that raised the error.
		container: Container,
		/// What was empty (e.g. "frame list", "cycle list", "block list").
		what: &'static str,
	},

	/// A count exceeded the format's fixed-width limit.
	#[error("{container}: too many {what}: {count} exceeds the limit of {limit}")]
	TooMany {
		/// Container that raised the error.
		container: Container,
		/// What there were too many of.
		what: &'static str,
		/// The count that was observed.
		count: usize,
		/// The maximum permitted count.
		limit: usize,
	},

	/// A cycle entry, block entry, or other index referenced something out of range.
	#[error("{container}: index {index} out of range (0..{limit})")]
	IndexOutOfRange {
		/// Container that raised the error.
		container: Container,
		/// Index that was out of range.
		index: usize,
		/// Exclusive upper bound of the valid range.
		limit: usize,
	},

	/// The palette did not have the required number of entries.
	#[error("palette too small: expected {expected} entries, got {actual}")]
	PaletteTooSmall {
		/// Expected entry count (always 256 for V1).
		expected: usize,
		/// Actual entry count.
		actual: usize,
	},

	/// RLE decoding would write more bytes than the destination can hold.
	#[error("RLE decode overflow: expected at most {expected} bytes, would write {actual}")]
	RleOverflow {
		/// Capacity of the destination buffer.
		expected: usize,
		/// Number of bytes the run would have written.
		actual: usize,
	},

	/// A PVRZ sidecar file referenced during decode could not be found.
	#[error("missing PVRZ page {index} (searched {searched} path(s))")]
	MissingPvrz {
		/// Page index that could not be resolved.
		index: u32,
		/// Number of search paths that were tried.
		searched: usize,
	},

	/// The 2D bin packer could not place a rectangle in a fresh bin.
	#[error("bin packer could not place a {width}x{height} rectangle in a {bin} bin")]
	PackingFailed {
		/// Requested rectangle width.
		width: u32,
		/// Requested rectangle height.
		height: u32,
		/// Bin side length that was attempted.
		bin: u32,
	},

	/// The palette quantiser failed even at the lowest quality/speed settings.
	#[error("quantisation failed after exhausting the retry budget (last min_quality={min_quality}, speed={speed})")]
	QuantizationFailed {
		/// Minimum quality at the final attempt.
		min_quality: u8,
		/// Speed at the final attempt.
		speed: u8,
	},

	/// A filter option value was out of range or otherwise malformed.
	#[error("filter '{filter_name}' (index {filter_index}) rejected option '{key}': {message}")]
	InvalidFilterOption {
		/// Name of the filter.
		filter_name: &'static str,
		/// Index of the filter within the chain.
		filter_index: usize,
		/// Option key that was rejected.
		key: String,
		/// Human-readable explanation.
		message: String,
	},

	/// A filter failed while processing a specific frame.
	#[error("filter '{filter_name}' (index {filter_index}) failed on frame {frame_index}: {message}")]
	FilterFailed {
		/// Name of the filter.
		filter_name: &'static str,
		/// Index of the filter within the chain.
		filter_index: usize,
		/// Index of the frame being processed.
		frame_index: usize,
		/// Human-readable explanation.
		message: String,
	},

	/// The requested filter name is not registered.
	#[error("unknown filter '{0}'")]
	UnknownFilter(String),

	/// An operation was attempted on a model whose error state is set.
	#[error("model is in an error state; call clear_error() before mutating or reading it")]
	PoisonedModel,

	/// Wraps an underlying I/O error.
	#[error(transparent)]
	Io(#[from] std::io::Error),

	/// Wraps a fixed-size slice conversion failure.
	#[error(transparent)]
	TryFromSlice(#[from] std::array::TryFromSliceError),
}

impl BamError {
	/// Builds an [`BamError::InsufficientData`].
	#[must_use]
	pub fn insufficient_data(container: Container, expected: usize, actual: usize) -> Self {
		Self::InsufficientData { container, expected, actual }
	}

	/// Builds an [`BamError::InvalidSignature`].
	#[must_use]
	pub fn invalid_signature(container: Container, expected: &[u8], actual: &[u8]) -> Self {
		Self::InvalidSignature { container, expected: expected.to_vec(), actual: actual.to_vec() }
	}

	/// Builds an [`BamError::Empty`].
	#[must_use]
	pub fn empty(container: Container, what: &'static str) -> Self {
		Self::Empty { container, what }
	}

	/// Builds an [`BamError::TooMany`].
	#[must_use]
	pub fn too_many(container: Container, what: &'static str, count: usize, limit: usize) -> Self {
		Self::TooMany { container, what, count, limit }
	}

	/// Builds an [`BamError::IndexOutOfRange`].
	#[must_use]
	pub fn index_out_of_range(container: Container, index: usize, limit: usize) -> Self {
		Self::IndexOutOfRange { container, index, limit }
	}
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, BamError>;
