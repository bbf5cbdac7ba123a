//! Core data types and codecs for the BAM sprite/animation container format.
//!
//! # Modules
//!
//! - [`color`] / [`frame`]: the pixel and frame data model.
//! - [`palette`]: 256-colour quantisation, normalisation, and stable sorting.
//! - [`rle`]: the V1 run-length codec.
//! - [`pack`]: 2-D bin packing used by the V2 page layout.
//! - [`pvrz`]: block-compressed (BC1/BC2/BC3) texture page I/O.
//! - [`v1`] / [`v2`]: the two container wire formats.
//! - [`filter`]: the pure-transform frame filter pipeline.
//! - [`model`]: the in-memory [`model::BamModel`] tying the above together.
//!
//! ```
//! use bam_types::prelude::*;
//!
//! let model = BamModel::empty(BamVersion::V1);
//! assert_eq!(model.frame_count(), 0);
//! ```

pub mod buffer;
pub mod color;
pub mod error;
pub mod filter;
pub mod frame;
pub mod model;
pub mod pack;
pub mod palette;
pub mod pvrz;
pub mod rle;
pub mod v1;
pub mod v2;

pub mod prelude;
