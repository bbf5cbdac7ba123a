//! The V2 (truecolour, PVRZ-backed) BAM container: header, tables, and the
//! frame-tiling/bin-packing pipeline that produces PVRZ pages on encode.

pub mod config;
pub mod constants;
pub mod decode;
pub mod encode;
pub mod header;

pub use config::V2Config;
pub use decode::DecodedV2;
pub use encode::{EncodeInput, EncodeOutput};
pub use header::Header;

use crate::error::Result;
use crate::pvrz::Pvrz;

/// Decodes a V2 container, loading PVRZ pages on demand via `load_page`.
pub fn decode(data: &[u8], load_page: impl FnMut(u32) -> Result<Pvrz>) -> Result<DecodedV2> {
	decode::decode_body(data, load_page)
}

/// Encodes `input` as a V2 container, tiling and packing frames into fresh
/// PVRZ pages per `config`.
pub fn encode(input: &EncodeInput, config: &V2Config) -> Result<EncodeOutput> {
	encode::encode_body(input, config)
}
