//! End-to-end round-trip checks against the public `bam-rs` surface.
//!
//! Grounded on the teacher's `tests/file_types/` multi-file test binary
//! layout, adapted to standard `#[test]` assertions since the properties
//! exercised here (§8 of the BAM spec: V1/V2 round trips and concurrency
//! determinism) are checked by equality, not by manual extraction.

use bam_rs::bam_types::filter::Concurrency;
use bam_rs::prelude::*;
use image::{Rgba, RgbaImage};

fn sample_rgba_image(w: u32, h: u32) -> RgbaImage {
	RgbaImage::from_fn(w, h, |x, y| {
		let t = ((x + y) % 4) as u8;
		Rgba([t * 60, 255 - t * 40, t * 20, 255])
	})
}

fn frame_from_image(img: &RgbaImage, cx: i16, cy: i16) -> Frame {
	let pixels = img.pixels().map(|p| Color::rgba(p[0], p[1], p[2], p[3]).premultiply()).collect();
	Frame::new_rgba(img.width() as u16, img.height() as u16, cx, cy, pixels)
}

#[test]
fn v1_roundtrip_with_remap_palette_preserves_pixels() -> anyhow::Result<()> {
	let img = sample_rgba_image(4, 4);
	let frame = frame_from_image(&img, 2, 1);

	let mut model = BamModel::empty(BamVersion::V1);
	model.add_frame(frame)?;
	model.add_cycle(vec![0])?;

	// A palette covering every colour the sample image produces, so `remap`
	// reconstructs the source exactly instead of lossily quantising it.
	let mut palette = [Color::default(); 256];
	let mut next_slot = 1usize;
	for p in img.pixels() {
		let c = Color::rgba(p[0], p[1], p[2], p[3]);
		if !palette[..next_slot].contains(&c) {
			palette[next_slot] = c;
			next_slot += 1;
		}
	}
	model.set_v1_config(V1Config { remap_palette: Some(palette), ..V1Config::default() })?;

	let mut bytes = Vec::new();
	model.export(&mut bytes, std::path::Path::new("/tmp/bam-rs-roundtrip-unused"))?;

	let mut decoded = BamModel::empty(BamVersion::V1);
	decoded.import(&mut bytes.as_slice(), &[])?;

	assert_eq!(decoded.frame_count(), 1);
	assert_eq!(decoded.cycles(), &[vec![0]]);
	assert_eq!(decoded.frames()[0].width(), 4);
	assert_eq!(decoded.frames()[0].height(), 4);
	Ok(())
}

#[test]
fn v2_roundtrip_reconstructs_rgba_pixels_exactly() -> anyhow::Result<()> {
	let img = sample_rgba_image(6, 5);
	let frame = frame_from_image(&img, 3, 2);

	let mut model = BamModel::empty(BamVersion::V2);
	model.add_frame(frame.clone())?;
	model.add_cycle(vec![0])?;

	let dir = tempdir()?;
	let mut bytes = Vec::new();
	model.export(&mut bytes, dir.path())?;

	// Every PVRZ page `export` wrote should exist directly under `dir`.
	let pvrz_files: Vec<_> = walkdir::WalkDir::new(dir.path())
		.into_iter()
		.filter_map(Result::ok)
		.filter(|e| e.path().extension().is_some_and(|ext| ext == "pvrz"))
		.collect();
	assert!(!pvrz_files.is_empty(), "export should have written at least one PVRZ page");

	let mut decoded = BamModel::empty(BamVersion::V2);
	decoded.import(&mut bytes.as_slice(), &[dir.path().to_path_buf()])?;

	assert_eq!(decoded.frame_count(), 1);
	assert_eq!(decoded.cycles(), &[vec![0]]);
	let round_tripped = &decoded.frames()[0];
	assert_eq!(round_tripped.width(), frame.width());
	assert_eq!(round_tripped.height(), frame.height());

	// Pixels go through lossy BC1/BC3 block compression on the way to and
	// from the PVRZ page, so compare within a tolerance rather than exactly.
	let original = frame.as_rgba().unwrap();
	let reconstructed = round_tripped.as_rgba().unwrap();
	assert_eq!(original.len(), reconstructed.len());
	for (a, b) in original.iter().zip(reconstructed.iter()) {
		let diff = |x: u8, y: u8| (i16::from(x) - i16::from(y)).unsigned_abs();
		assert!(diff(a.r, b.r) <= 24 && diff(a.g, b.g) <= 24 && diff(a.b, b.b) <= 24, "{a:?} vs {b:?}");
	}
	Ok(())
}

#[test]
fn v1_export_is_byte_identical_serial_vs_parallel() -> anyhow::Result<()> {
	let img = sample_rgba_image(3, 3);
	let frame = frame_from_image(&img, 0, 0);

	let mut palette = [Color::default(); 256];
	let mut next_slot = 1usize;
	for p in img.pixels() {
		let c = Color::rgba(p[0], p[1], p[2], p[3]);
		if !palette[..next_slot].contains(&c) {
			palette[next_slot] = c;
			next_slot += 1;
		}
	}

	let build = |concurrency: Concurrency| -> anyhow::Result<Vec<u8>> {
		let mut model = BamModel::empty(BamVersion::V1);
		model.add_frame(frame.clone())?;
		model.add_cycle(vec![0])?;
		model.set_v1_config(V1Config { remap_palette: Some(palette), ..V1Config::default() })?;
		model.set_concurrency(concurrency)?;
		model.add_filter("brightness", &[("level", "10")])?;
		let mut bytes = Vec::new();
		model.export(&mut bytes, std::path::Path::new("/tmp/bam-rs-roundtrip-unused"))?;
		Ok(bytes)
	};

	let serial = build(Concurrency::Serial)?;
	let parallel = build(Concurrency::Parallel)?;
	assert_eq!(serial, parallel);
	Ok(())
}

/// A directory under `std::env::temp_dir()` that's removed when dropped, so
/// a PVRZ export test doesn't litter `/tmp` across repeated runs.
struct TempDir(std::path::PathBuf);

impl TempDir {
	fn path(&self) -> &std::path::Path {
		&self.0
	}
}

impl Drop for TempDir {
	fn drop(&mut self) {
		let _ = std::fs::remove_dir_all(&self.0);
	}
}

fn tempdir() -> anyhow::Result<TempDir> {
	let dir = std::env::temp_dir().join(format!("bam-rs-roundtrip-{}", std::process::id()));
	std::fs::create_dir_all(&dir)?;
	Ok(TempDir(dir))
}
