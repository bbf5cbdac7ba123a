#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `bam-rs` decodes and encodes BAM sprite animation containers (palettised
//! V1 and truecolour/PVRZ-backed V2) and runs the per-frame filter pipeline
//! used to transform them.
//!
//! This crate is a thin re-export of [`bam_internal`]; the codec itself
//! lives in `bam_types`.

pub use bam_internal::*;
