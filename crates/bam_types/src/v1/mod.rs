//! The V1 (palettised) BAM container: header, tables, RLE frame data, and
//! the optional "BAMC" zlib envelope.

pub mod config;
pub mod constants;
pub mod decode;
pub mod encode;
pub mod header;

pub use config::{RleMode, V1Config};
pub use decode::DecodedV1;
pub use encode::EncodeInput;
pub use header::Header;

use constants::{COMPRESSED_PREFIX_SIZE, COMPRESSED_SIGNATURE, VERSION_TAG};
use crate::error::{BamError, Container, Result};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Decodes a V1 container, transparently stripping the "BAMC" envelope if present.
pub fn decode(data: &[u8]) -> Result<DecodedV1> {
	if data.len() >= 4 && &data[0..4] == COMPRESSED_SIGNATURE {
		decode::decode_body(&decompress(data)?)
	} else {
		decode::decode_body(data)
	}
}

/// Encodes `input` as a V1 container, wrapping it in the "BAMC" envelope
/// when `config.compressed` is set.
pub fn encode(input: &EncodeInput, config: &V1Config) -> Result<Vec<u8>> {
	let body = encode::encode_body(input, config)?;
	if config.compressed {
		Ok(compress(&body))
	} else {
		Ok(body)
	}
}

fn decompress(data: &[u8]) -> Result<Vec<u8>> {
	if data.len() < COMPRESSED_PREFIX_SIZE {
		return Err(BamError::insufficient_data(Container::V1, COMPRESSED_PREFIX_SIZE, data.len()));
	}
	if &data[4..8] != VERSION_TAG {
		return Err(BamError::invalid_signature(Container::V1, &VERSION_TAG, &data[4..8]));
	}
	let uncompressed_size = u32::from_le_bytes(data[8..12].try_into()?) as usize;
	let mut decoder = ZlibDecoder::new(&data[COMPRESSED_PREFIX_SIZE..]);
	let mut out = Vec::with_capacity(uncompressed_size);
	decoder.read_to_end(&mut out)?;
	Ok(out)
}

fn compress(body: &[u8]) -> Vec<u8> {
	let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
	// An in-memory Vec<u8> writer never fails.
	encoder.write_all(body).expect("zlib compression into a Vec cannot fail");
	let compressed = encoder.finish().expect("zlib compression into a Vec cannot fail");

	let mut out = Vec::with_capacity(COMPRESSED_PREFIX_SIZE + compressed.len());
	out.extend_from_slice(&COMPRESSED_SIGNATURE);
	out.extend_from_slice(&VERSION_TAG);
	out.extend_from_slice(&(body.len() as u32).to_le_bytes());
	out.extend_from_slice(&compressed);
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::color::GREEN_SENTINEL;
	use crate::frame::Frame;
	use crate::palette::Palette;

	fn sample_input() -> EncodeInput {
		let frame = Frame::new_indexed(2, 1, 0, 0, vec![0, 1]);
		let mut palette = Palette::blank();
		palette[0] = GREEN_SENTINEL;
		palette[1] = crate::color::Color::rgb(10, 20, 30);
		EncodeInput { frames: vec![frame], cycles: vec![vec![0]], palette, transparent_index: 0 }
	}

	#[test]
	fn compressed_envelope_roundtrips() {
		let input = sample_input();
		let config = V1Config { compressed: true, ..V1Config::default() };
		let bytes = encode(&input, &config).unwrap();
		assert_eq!(&bytes[0..4], b"BAMC");
		let decoded = decode(&bytes).unwrap();
		assert_eq!(decoded.frames.len(), 1);
		assert_eq!(decoded.palette[1], crate::color::Color::rgb(10, 20, 30));
	}

	#[test]
	fn uncompressed_roundtrips() {
		let input = sample_input();
		let bytes = encode(&input, &V1Config::default()).unwrap();
		assert_eq!(&bytes[0..4], b"BAM ");
		let decoded = decode(&bytes).unwrap();
		assert_eq!(decoded.frames.len(), 1);
	}
}
