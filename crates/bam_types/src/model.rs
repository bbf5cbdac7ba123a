//! The in-memory BAM container (C11): frames, cycles, filters, V1/V2
//! config, and the sticky error-state discipline described in §4.11.
//!
//! Decoded V1 frames are converted to premultiplied RGBA immediately on
//! import (see the [`crate::filter`] module docs): the model always holds
//! RGBA frames internally, and palettisation happens only as the last step
//! of a V1 export.

use crate::error::{BamError, Container, Result};
use crate::filter::{self, run_chain, Concurrency, Filter};
use crate::frame::Frame;
use crate::palette::{self, Palette};
use crate::pvrz::Pvrz;
use crate::v1::{self, EncodeInput as V1EncodeInput, V1Config};
use crate::v2::{self, EncodeInput as V2EncodeInput, V2Config};
use rayon::prelude::*;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Which on-disk container format the model targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BamVersion {
	/// Palettised, RLE-encoded, optionally zlib-wrapped.
	V1,
	/// Truecolour, block-compressed pixel data in external PVRZ pages.
	V2,
}

/// The in-memory BAM container: frames, cycles, filter chain, V1/V2
/// configuration, and the sticky error-state flag.
pub struct BamModel {
	version: BamVersion,
	frames: Vec<Frame>,
	cycles: Vec<Vec<usize>>,
	filters: Vec<Box<dyn Filter>>,
	v1_config: V1Config,
	v2_config: V2Config,
	concurrency: Concurrency,
	error: Option<String>,
}

impl BamModel {
	/// Creates an empty model targeting `version`, with no frames, cycles,
	/// or filters and default V1/V2 configuration.
	#[must_use]
	pub fn empty(version: BamVersion) -> Self {
		Self {
			version,
			frames: Vec::new(),
			cycles: Vec::new(),
			filters: Vec::new(),
			v1_config: V1Config::default(),
			v2_config: V2Config::default(),
			concurrency: Concurrency::default_for_host(),
			error: None,
		}
	}

	fn check_not_poisoned(&self) -> Result<()> {
		if self.error.is_some() {
			return Err(BamError::PoisonedModel);
		}
		Ok(())
	}

	fn poison(&mut self, err: BamError) -> BamError {
		self.error = Some(err.to_string());
		err
	}

	/// The container version this model targets.
	#[must_use]
	pub const fn version(&self) -> BamVersion {
		self.version
	}

	/// Changes the target version. Does not touch frames or cycles.
	pub fn set_version(&mut self, version: BamVersion) -> Result<()> {
		self.check_not_poisoned()?;
		self.version = version;
		Ok(())
	}

	/// All frames currently held by the model.
	#[must_use]
	pub fn frames(&self) -> &[Frame] {
		&self.frames
	}

	/// Number of frames currently held by the model.
	#[must_use]
	pub fn frame_count(&self) -> usize {
		self.frames.len()
	}

	/// All cycles currently held by the model.
	#[must_use]
	pub fn cycles(&self) -> &[Vec<usize>] {
		&self.cycles
	}

	/// The filter chain, in application order.
	#[must_use]
	pub fn filters(&self) -> &[Box<dyn Filter>] {
		&self.filters
	}

	/// The V1 encode-time configuration.
	#[must_use]
	pub const fn v1_config(&self) -> &V1Config {
		&self.v1_config
	}

	/// Replaces the V1 encode-time configuration.
	pub fn set_v1_config(&mut self, config: V1Config) -> Result<()> {
		self.check_not_poisoned()?;
		self.v1_config = config;
		Ok(())
	}

	/// The V2 encode-time configuration.
	#[must_use]
	pub const fn v2_config(&self) -> &V2Config {
		&self.v2_config
	}

	/// Replaces the V2 encode-time configuration.
	pub fn set_v2_config(&mut self, config: V2Config) -> Result<()> {
		self.check_not_poisoned()?;
		self.v2_config = config;
		Ok(())
	}

	/// Whether the filter chain and PVRZ page emission run on a bounded
	/// worker pool (§5's "global multithreading flag").
	#[must_use]
	pub const fn concurrency(&self) -> Concurrency {
		self.concurrency
	}

	/// Sets the global multithreading flag.
	pub fn set_concurrency(&mut self, concurrency: Concurrency) -> Result<()> {
		self.check_not_poisoned()?;
		self.concurrency = concurrency;
		Ok(())
	}

	/// Whether the model is in the sticky error state.
	#[must_use]
	pub fn is_error(&self) -> bool {
		self.error.is_some()
	}

	/// Clears the sticky error state. The only way to resume mutating or
	/// exporting the model after a failure; the model may be half-mutated.
	pub fn clear_error(&mut self) {
		self.error = None;
	}

	/// Appends `frame`, returning its index.
	pub fn add_frame(&mut self, frame: Frame) -> Result<usize> {
		self.check_not_poisoned()?;
		self.frames.push(frame);
		Ok(self.frames.len() - 1)
	}

	/// Inserts `frame` at `index`, shifting every frame at or after `index`
	/// up by one and incrementing cycle references `>= index` to match.
	pub fn insert_frame(&mut self, index: usize, frame: Frame) -> Result<()> {
		self.check_not_poisoned()?;
		if index > self.frames.len() {
			return Err(BamError::index_out_of_range(Container::Model, index, self.frames.len() + 1));
		}
		self.frames.insert(index, frame);
		for cycle in &mut self.cycles {
			for entry in cycle.iter_mut() {
				if *entry >= index {
					*entry += 1;
				}
			}
		}
		Ok(())
	}

	/// Removes the frame at `index`, removing matching cycle entries
	/// in-place and decrementing higher cycle references. Cycles left empty
	/// by the deletion are dropped entirely.
	pub fn delete_frame(&mut self, index: usize) -> Result<()> {
		self.check_not_poisoned()?;
		if index >= self.frames.len() {
			return Err(BamError::index_out_of_range(Container::Model, index, self.frames.len()));
		}
		self.frames.remove(index);
		for cycle in &mut self.cycles {
			cycle.retain(|&entry| entry != index);
			for entry in cycle.iter_mut() {
				if *entry > index {
					*entry -= 1;
				}
			}
		}
		self.cycles.retain(|cycle| !cycle.is_empty());
		Ok(())
	}

	/// Appends a new cycle. Every entry must reference an existing frame.
	pub fn add_cycle(&mut self, cycle: Vec<usize>) -> Result<()> {
		self.check_not_poisoned()?;
		if cycle.is_empty() {
			return Err(BamError::empty(Container::Model, "cycle"));
		}
		for &frame_index in &cycle {
			if frame_index >= self.frames.len() {
				return Err(BamError::index_out_of_range(Container::Model, frame_index, self.frames.len()));
			}
		}
		self.cycles.push(cycle);
		Ok(())
	}

	/// Appends a filter to the chain, built by registry name and configured
	/// with `options` in order.
	pub fn add_filter(&mut self, name: &str, options: &[(&str, &str)]) -> Result<()> {
		self.check_not_poisoned()?;
		let mut instance = filter::create(name)?;
		for &(key, value) in options {
			instance.set_option(key, value)?;
		}
		self.filters.push(instance);
		Ok(())
	}

	/// Runs the filter chain over a snapshot of the current frames, leaving
	/// [`BamModel::frames`] untouched, per the encode lifecycle in §3.
	fn filtered_frames(&self) -> Result<Vec<Frame>> {
		let mut working = run_chain(&self.filters, &self.frames, self.concurrency)?;
		if self.version == BamVersion::V1 {
			if let Some(color_key) = self.v1_config.color_key {
				let mut replace = filter::create("replace")?;
				replace.set_option("match", &format!("{:08X}", color_key.to_argb_u32()))?;
				replace.set_option("color", "00000000")?;
				working = run_chain(std::slice::from_ref(&replace), &working, self.concurrency)?;
			}
		}
		Ok(working)
	}

	/// Reads a BAM container from `reader`, replacing frames/cycles/version
	/// with what was decoded. PVRZ sidecars needed by a V2 container are
	/// searched for, in order, across `search_paths`.
	pub fn import<R: Read>(&mut self, reader: &mut R, search_paths: &[PathBuf]) -> Result<()> {
		self.check_not_poisoned()?;
		let mut data = Vec::new();
		if let Err(err) = reader.read_to_end(&mut data) {
			return Err(self.poison(BamError::Io(err)));
		}
		match self.import_bytes(&data, search_paths) {
			Ok(()) => Ok(()),
			Err(err) => Err(self.poison(err)),
		}
	}

	fn import_bytes(&mut self, data: &[u8], search_paths: &[PathBuf]) -> Result<()> {
		if data.len() < 8 {
			return Err(BamError::insufficient_data(Container::Model, 8, data.len()));
		}
		match &data[4..8] {
			tag if tag == v1::constants::VERSION_TAG => {
				let decoded = v1::decode(data)?;
				let mut frames = decoded.frames;
				for frame in &mut frames {
					frame.convert_to_rgba(decoded.palette.entries());
				}
				self.frames = frames;
				self.cycles = decoded.cycles;
				self.version = BamVersion::V1;
				self.v1_config.remap_palette = Some(*decoded.palette.entries());
			}
			tag if tag == v2::constants::VERSION_TAG => {
				let search_paths = search_paths.to_vec();
				let decoded = v2::decode(data, |page_index| load_pvrz(page_index, &search_paths))?;
				self.frames = decoded.frames;
				self.cycles = decoded.cycles;
				self.version = BamVersion::V2;
			}
			other => {
				return Err(BamError::invalid_signature(Container::Model, b"V1  / V2  ", other));
			}
		}
		Ok(())
	}

	/// Writes the model as a BAM container to `writer`. For a V2 model, any
	/// PVRZ pages produced by packing are written into `pvrz_dir` (created
	/// if missing) under their `mos<NNNN>.pvrz` names.
	pub fn export<W: Write>(&mut self, writer: &mut W, pvrz_dir: &Path) -> Result<()> {
		self.check_not_poisoned()?;
		match self.export_inner(writer, pvrz_dir) {
			Ok(()) => Ok(()),
			Err(err) => Err(self.poison(err)),
		}
	}

	fn export_inner<W: Write>(&self, writer: &mut W, pvrz_dir: &Path) -> Result<()> {
		let working = self.filtered_frames()?;

		match self.version {
			BamVersion::V1 => {
				let refs: Vec<&Frame> = working.iter().collect();
				let (index_buffers, raw_palette) = match self.v1_config.remap_palette {
					Some(palette) => palette::remap(&refs, &palette)?,
					None => palette::quantize(&refs, &self.v1_config.quantize)?,
				};

				let mut palette = Palette::new(raw_palette);
				let perm = palette.normalize(
					&self.v1_config.fixed_colors,
					self.v1_config.sort_key,
					self.v1_config.sort_reversed,
				)?;

				let mut paletted_frames = Vec::with_capacity(working.len());
				for (frame, mut indices) in working.iter().zip(index_buffers) {
					palette::remap_indices(&mut indices, &perm);
					paletted_frames.push(Frame::new_indexed(
						frame.width(),
						frame.height(),
						frame.cx(),
						frame.cy(),
						indices,
					));
				}

				let input = V1EncodeInput {
					frames: paletted_frames,
					cycles: self.cycles.clone(),
					palette,
					transparent_index: 0,
				};
				let bytes = v1::encode(&input, &self.v1_config)?;
				writer.write_all(&bytes)?;
			}
			BamVersion::V2 => {
				let input = V2EncodeInput { frames: working, cycles: self.cycles.clone() };
				let output = v2::encode(&input, &self.v2_config)?;
				writer.write_all(&output.bytes)?;
				std::fs::create_dir_all(pvrz_dir)?;
				write_pages(&output.pages, pvrz_dir, self.concurrency)?;
			}
		}
		Ok(())
	}
}

fn load_pvrz(page_index: u32, search_paths: &[PathBuf]) -> Result<Pvrz> {
	let filename = format!("mos{page_index:04}.pvrz");
	for dir in search_paths {
		let path = dir.join(&filename);
		if let Ok(mut file) = std::fs::File::open(&path) {
			return Pvrz::load(&mut file, true);
		}
	}
	Err(BamError::MissingPvrz { index: page_index, searched: search_paths.len() })
}

fn write_pages(pages: &[(u32, Pvrz)], pvrz_dir: &Path, concurrency: Concurrency) -> Result<()> {
	let write_one = |(page_index, page): &(u32, Pvrz)| -> Result<()> {
		let path = pvrz_dir.join(format!("mos{page_index:04}.pvrz"));
		let mut file = std::fs::File::create(path)?;
		page.save(&mut file, true)
	};
	match concurrency {
		Concurrency::Parallel => pages.par_iter().try_for_each(write_one),
		Concurrency::Serial => pages.iter().try_for_each(write_one),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::color::Color;

	fn solid_frame(color: Color) -> Frame {
		Frame::new_rgba(1, 1, 0, 0, vec![color])
	}

	#[test]
	fn empty_model_has_no_frames() {
		let model = BamModel::empty(BamVersion::V1);
		assert_eq!(model.frame_count(), 0);
		assert!(!model.is_error());
	}

	#[test]
	fn insert_frame_shifts_cycle_references() {
		let mut model = BamModel::empty(BamVersion::V1);
		model.add_frame(solid_frame(Color::default())).unwrap();
		model.add_frame(solid_frame(Color::default())).unwrap();
		model.add_cycle(vec![0, 1]).unwrap();
		model.insert_frame(0, solid_frame(Color::default())).unwrap();
		assert_eq!(model.cycles()[0], vec![1, 2]);
	}

	#[test]
	fn delete_frame_removes_matching_cycle_entries_and_shifts() {
		let mut model = BamModel::empty(BamVersion::V1);
		for _ in 0..3 {
			model.add_frame(solid_frame(Color::default())).unwrap();
		}
		model.add_cycle(vec![0, 1, 2]).unwrap();
		model.delete_frame(1).unwrap();
		assert_eq!(model.cycles()[0], vec![0, 1]);
	}

	#[test]
	fn add_cycle_rejects_out_of_range_frame() {
		let mut model = BamModel::empty(BamVersion::V1);
		assert!(model.add_cycle(vec![0]).is_err());
	}

	#[test]
	fn poisoned_model_rejects_mutation_until_cleared() {
		let mut model = BamModel::empty(BamVersion::V1);
		// Simulate the sticky state that import/export leave behind on failure.
		model.error = Some(BamError::PoisonedModel.to_string());
		assert!(model.add_frame(solid_frame(Color::default())).is_err());
		model.clear_error();
		assert!(model.add_frame(solid_frame(Color::default())).is_ok());
	}

	#[test]
	fn v1_roundtrip_with_remap_palette_preserves_frame_count() {
		let mut model = BamModel::empty(BamVersion::V1);
		model.add_frame(solid_frame(Color::rgb(10, 20, 30))).unwrap();
		model.add_cycle(vec![0]).unwrap();
		let mut palette_array = [Color::default(); 256];
		palette_array[1] = Color::rgb(10, 20, 30);
		model
			.set_v1_config(V1Config { remap_palette: Some(palette_array), ..V1Config::default() })
			.unwrap();

		let mut bytes = Vec::new();
		model.export(&mut bytes, Path::new("/tmp/unused")).unwrap();

		let mut roundtrip = BamModel::empty(BamVersion::V1);
		roundtrip.import(&mut bytes.as_slice(), &[]).unwrap();
		assert_eq!(roundtrip.frame_count(), 1);
		assert_eq!(roundtrip.cycles(), &[vec![0]]);
	}
}
