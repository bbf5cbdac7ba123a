//! Internal crate for `bam-rs`.
//!
//! This module is separated into its own crate to enable simple dynamic linking for `bam`,
//! and should not be used directly.
//!
//! # Examples
//!
//! ```rust
//! use bam_internal::prelude::*;
//!
//! let bam = BamModel::empty(BamVersion::V1);
//! assert_eq!(bam.frames().len(), 0);
//! ```

/// `use bam_internal::prelude::*;` to import commonly used items.
pub mod prelude;

// Re-export bam_types for convenience
pub use bam_types;
