//! Prelude module for `bam_internal`.
//!
//! This module provides a convenient way to import commonly used types and traits.
//!
//! # Examples
//!
//! ```rust
//! use bam_internal::prelude::*;
//!
//! let model = BamModel::empty(BamVersion::V2);
//! ```

// Re-export everything from bam_types::prelude
#[doc(inline)]
pub use bam_types::prelude::*;

// Re-export the entire bam_types module for advanced usage
#[doc(inline)]
pub use bam_types;
