//! Growable byte buffer with absolute-offset little-endian accessors.
//!
//! This is the leaf building block ("C1" in the design notes) that every
//! other codec in this crate reads and writes through: [`ByteBuffer`] never
//! panics on out-of-bounds access, instead surfacing a [`BamError`], and it
//! keeps its own first error sticky so callers that chain several operations
//! together can check once at the end rather than after every call.
//!
//! ```
//! use bam_types::buffer::ByteBuffer;
//!
//! let mut buf = ByteBuffer::with_capacity(16);
//! buf.set_u32(0, 0xDEAD_BEEF).unwrap();
//! assert_eq!(buf.get_u32(0).unwrap(), 0xDEAD_BEEF);
//! ```

use crate::error::{BamError, Container, Result};
use std::io::{Read, Write};

/// A growable byte array with bounds-checked little-endian accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteBuffer {
	data: Vec<u8>,
	sticky_error: Option<String>,
}

impl ByteBuffer {
	/// Creates an empty buffer.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates an empty buffer with room for at least `capacity` bytes.
	#[must_use]
	pub fn with_capacity(capacity: usize) -> Self {
		Self { data: Vec::with_capacity(capacity), sticky_error: None }
	}

	/// Wraps an existing byte vector.
	#[must_use]
	pub fn from_vec(data: Vec<u8>) -> Self {
		Self { data, sticky_error: None }
	}

	/// Returns the buffer contents as a byte slice.
	#[must_use]
	pub fn as_bytes(&self) -> &[u8] {
		&self.data
	}

	/// Consumes the buffer, returning the underlying byte vector.
	#[must_use]
	pub fn into_vec(self) -> Vec<u8> {
		self.data
	}

	/// Total length of the buffer in bytes.
	#[must_use]
	pub fn len(&self) -> usize {
		self.data.len()
	}

	/// Returns `true` if the buffer holds no bytes.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// Returns the first sticky error recorded since creation (or the last `clear`), if any.
	#[must_use]
	pub fn first_error(&self) -> Option<&str> {
		self.sticky_error.as_deref()
	}

	/// Clears the sticky error flag.
	pub fn clear_error(&mut self) {
		self.sticky_error = None;
	}

	fn record<T>(&mut self, result: Result<T>) -> Result<T> {
		if let Err(ref err) = result {
			self.sticky_error.get_or_insert_with(|| err.to_string());
		}
		result
	}

	fn check_range(&self, ofs: usize, len: usize) -> Result<()> {
		if ofs.checked_add(len).is_none_or(|end| end > self.data.len()) {
			return Err(BamError::insufficient_data(Container::Model, ofs + len, self.data.len()));
		}
		Ok(())
	}

	/// Reads a `u8` at `ofs`.
	pub fn get_u8(&self, ofs: usize) -> Result<u8> {
		self.check_range(ofs, 1)?;
		Ok(self.data[ofs])
	}

	/// Reads an `i8` at `ofs`.
	pub fn get_i8(&self, ofs: usize) -> Result<i8> {
		Ok(self.get_u8(ofs)? as i8)
	}

	/// Reads a little-endian `u16` at `ofs`.
	pub fn get_u16(&self, ofs: usize) -> Result<u16> {
		self.check_range(ofs, 2)?;
		Ok(u16::from_le_bytes([self.data[ofs], self.data[ofs + 1]]))
	}

	/// Reads a little-endian `i16` at `ofs`.
	pub fn get_i16(&self, ofs: usize) -> Result<i16> {
		Ok(self.get_u16(ofs)? as i16)
	}

	/// Reads a little-endian `u32` at `ofs`.
	pub fn get_u32(&self, ofs: usize) -> Result<u32> {
		self.check_range(ofs, 4)?;
		Ok(u32::from_le_bytes(self.data[ofs..ofs + 4].try_into()?))
	}

	/// Reads a little-endian `i32` at `ofs`.
	pub fn get_i32(&self, ofs: usize) -> Result<i32> {
		Ok(self.get_u32(ofs)? as i32)
	}

	/// Reads a fixed-length ASCII string at `ofs`, trimming trailing NUL bytes.
	pub fn get_fixed_str(&self, ofs: usize, len: usize) -> Result<String> {
		self.check_range(ofs, len)?;
		let raw = &self.data[ofs..ofs + len];
		let trimmed = raw.split(|&b| b == 0).next().unwrap_or(raw);
		Ok(String::from_utf8_lossy(trimmed).into_owned())
	}

	/// Writes a `u8` at `ofs`, growing the buffer if needed.
	pub fn set_u8(&mut self, ofs: usize, value: u8) -> Result<()> {
		self.ensure_len(ofs + 1);
		self.data[ofs] = value;
		Ok(())
	}

	/// Writes an `i8` at `ofs`, growing the buffer if needed.
	pub fn set_i8(&mut self, ofs: usize, value: i8) -> Result<()> {
		self.set_u8(ofs, value as u8)
	}

	/// Writes a little-endian `u16` at `ofs`, growing the buffer if needed.
	pub fn set_u16(&mut self, ofs: usize, value: u16) -> Result<()> {
		self.ensure_len(ofs + 2);
		self.data[ofs..ofs + 2].copy_from_slice(&value.to_le_bytes());
		Ok(())
	}

	/// Writes a little-endian `i16` at `ofs`, growing the buffer if needed.
	pub fn set_i16(&mut self, ofs: usize, value: i16) -> Result<()> {
		self.set_u16(ofs, value as u16)
	}

	/// Writes a little-endian `u32` at `ofs`, growing the buffer if needed.
	pub fn set_u32(&mut self, ofs: usize, value: u32) -> Result<()> {
		self.ensure_len(ofs + 4);
		self.data[ofs..ofs + 4].copy_from_slice(&value.to_le_bytes());
		Ok(())
	}

	/// Writes a little-endian `i32` at `ofs`, growing the buffer if needed.
	pub fn set_i32(&mut self, ofs: usize, value: i32) -> Result<()> {
		self.set_u32(ofs, value as u32)
	}

	/// Writes a fixed-length ASCII string at `ofs`, NUL-padding or truncating to `len`.
	pub fn set_fixed_str(&mut self, ofs: usize, len: usize, value: &str) -> Result<()> {
		self.ensure_len(ofs + len);
		let bytes = value.as_bytes();
		let copy_len = bytes.len().min(len);
		self.data[ofs..ofs + copy_len].copy_from_slice(&bytes[..copy_len]);
		for b in &mut self.data[ofs + copy_len..ofs + len] {
			*b = 0;
		}
		Ok(())
	}

	fn ensure_len(&mut self, min_len: usize) {
		if self.data.len() < min_len {
			self.data.resize(min_len, 0);
		}
	}

	/// Inserts `n` zero bytes at `ofs`, shifting everything after it to the right.
	pub fn insert(&mut self, ofs: usize, n: usize) -> Result<()> {
		let result = self.try_insert(ofs, n);
		self.record(result)
	}

	fn try_insert(&mut self, ofs: usize, n: usize) -> Result<()> {
		if ofs > self.data.len() {
			return Err(BamError::insufficient_data(Container::Model, ofs, self.data.len()));
		}
		self.data.splice(ofs..ofs, std::iter::repeat_n(0u8, n));
		Ok(())
	}

	/// Deletes `n` bytes starting at `ofs`, shifting everything after it to the left.
	pub fn delete(&mut self, ofs: usize, n: usize) -> Result<()> {
		let result = self.try_delete(ofs, n);
		self.record(result)
	}

	fn try_delete(&mut self, ofs: usize, n: usize) -> Result<()> {
		self.check_range(ofs, n)?;
		self.data.drain(ofs..ofs + n);
		Ok(())
	}

	/// Replaces the `n` bytes at `ofs` with their zlib-compressed form.
	pub fn compress(&mut self, ofs: usize, n: usize) -> Result<()> {
		let result = self.try_compress(ofs, n);
		self.record(result)
	}

	fn try_compress(&mut self, ofs: usize, n: usize) -> Result<()> {
		self.check_range(ofs, n)?;
		let mut encoder =
			flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
		encoder.write_all(&self.data[ofs..ofs + n])?;
		let compressed = encoder.finish()?;
		self.data.splice(ofs..ofs + n, compressed);
		Ok(())
	}

	/// Replaces the `n` compressed bytes at `ofs` with their zlib-decompressed form.
	pub fn decompress_replace(&mut self, ofs: usize, n: usize) -> Result<()> {
		let result = self.try_decompress_replace(ofs, n);
		self.record(result)
	}

	fn try_decompress_replace(&mut self, ofs: usize, n: usize) -> Result<()> {
		self.check_range(ofs, n)?;
		let mut decoder = flate2::read::ZlibDecoder::new(&self.data[ofs..ofs + n]);
		let mut decompressed = Vec::new();
		decoder.read_to_end(&mut decompressed)?;
		self.data.splice(ofs..ofs + n, decompressed);
		Ok(())
	}
}

impl From<Vec<u8>> for ByteBuffer {
	fn from(data: Vec<u8>) -> Self {
		Self::from_vec(data)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn roundtrips_little_endian_ints() {
		let mut buf = ByteBuffer::with_capacity(16);
		buf.set_u8(0, 0xAB).unwrap();
		buf.set_i16(1, -1234).unwrap();
		buf.set_u32(3, 0xCAFE_BABE).unwrap();
		assert_eq!(buf.get_u8(0).unwrap(), 0xAB);
		assert_eq!(buf.get_i16(1).unwrap(), -1234);
		assert_eq!(buf.get_u32(3).unwrap(), 0xCAFE_BABE);
	}

	#[test]
	fn out_of_bounds_reads_error() {
		let buf = ByteBuffer::with_capacity(2);
		assert!(buf.get_u32(0).is_err());
	}

	#[test]
	fn fixed_str_roundtrip_pads_and_trims() {
		let mut buf = ByteBuffer::with_capacity(8);
		buf.set_fixed_str(0, 8, "BAM ").unwrap();
		assert_eq!(buf.get_fixed_str(0, 8).unwrap(), "BAM ");
	}

	#[test]
	fn insert_and_delete_shift_bytes() {
		let mut buf = ByteBuffer::from_vec(vec![1, 2, 3, 4]);
		buf.insert(2, 2).unwrap();
		assert_eq!(buf.as_bytes(), &[1, 2, 0, 0, 3, 4]);
		buf.delete(2, 2).unwrap();
		assert_eq!(buf.as_bytes(), &[1, 2, 3, 4]);
	}

	#[test]
	fn compress_then_decompress_is_identity() {
		let mut buf = ByteBuffer::from_vec(b"hello hello hello hello".to_vec());
		let original_len = buf.len();
		buf.compress(0, original_len).unwrap();
		let compressed_len = buf.len();
		buf.decompress_replace(0, compressed_len).unwrap();
		assert_eq!(buf.as_bytes(), b"hello hello hello hello");
	}

	#[test]
	fn sticky_error_records_first_failure() {
		let mut buf = ByteBuffer::with_capacity(2);
		assert!(buf.delete(10, 1).is_err());
		assert!(buf.first_error().is_some());
	}
}
