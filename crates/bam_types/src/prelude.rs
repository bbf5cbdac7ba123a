//! Prelude module for `bam_types`.
//!
//! This module provides a convenient way to import the types most callers
//! need: the in-memory model, the pixel/colour/frame data types, and the
//! V1/V2 container configs.
//!
//! ```
//! use bam_types::prelude::*;
//!
//! let model = BamModel::empty(BamVersion::V1);
//! assert_eq!(model.frame_count(), 0);
//! ```

#[doc(inline)]
pub use crate::color::Color;

#[doc(inline)]
pub use crate::frame::{Frame, PixelData};

#[doc(inline)]
pub use crate::error::{BamError, Result};

#[doc(inline)]
pub use crate::model::{BamModel, BamVersion};

#[doc(inline)]
pub use crate::palette::Palette;

#[doc(inline)]
pub use crate::v1::V1Config;

#[doc(inline)]
pub use crate::v2::V2Config;
