//! Benchmark suite for the BAM V1/V2 container codecs and the RLE codec
//! that underlies V1 frame storage.
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml

use bam_benches::{generate_indexed_frame, generate_palette, generate_rgba_frame, sizes};
use bam_types::palette::Palette;
use bam_types::rle;
use bam_types::v1::{self, EncodeInput as V1Input, V1Config};
use bam_types::v2::{self, EncodeInput as V2Input, V2Config};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

/// Benchmark RLE encode/decode over a range of frame sizes.
fn bench_rle_roundtrip(c: &mut Criterion) {
	let mut group = c.benchmark_group("rle_roundtrip");

	for (name, (w, h)) in [("tiny", sizes::TINY), ("small", sizes::SMALL), ("medium", sizes::MEDIUM)] {
		let frame = generate_indexed_frame(w, h);
		let indices = frame.as_indexed().unwrap().to_vec();

		group.throughput(Throughput::Elements(indices.len() as u64));
		group.bench_with_input(BenchmarkId::new("encode", name), &indices, |b, data| {
			b.iter(|| black_box(rle::encode(black_box(data), 0)));
		});

		let encoded = rle::encode(&indices, 0);
		group.bench_with_input(BenchmarkId::new("decode", name), &encoded, |b, data| {
			b.iter(|| black_box(rle::decode(black_box(data), 0, indices.len()).unwrap()));
		});
	}

	group.finish();
}

fn v1_input(w: u16, h: u16) -> (V1Input, V1Config) {
	let frame = generate_indexed_frame(w, h);
	let palette = Palette::new(generate_palette());
	let input = V1Input {
		frames: vec![frame],
		cycles: vec![vec![0]],
		palette,
		transparent_index: 0,
	};
	(input, V1Config::default())
}

/// Benchmark full V1 container encode/decode.
fn bench_v1_roundtrip(c: &mut Criterion) {
	let mut group = c.benchmark_group("v1_roundtrip");

	for (name, (w, h)) in [("tiny", sizes::TINY), ("small", sizes::SMALL), ("medium", sizes::MEDIUM)] {
		let (input, config) = v1_input(w, h);
		group.throughput(Throughput::Elements(u64::from(w) * u64::from(h)));

		group.bench_with_input(BenchmarkId::new("encode", name), &(input, config), |b, (input, config)| {
			b.iter(|| black_box(v1::encode(black_box(input), black_box(config)).unwrap()));
		});

		let (input, config) = v1_input(w, h);
		let encoded = v1::encode(&input, &config).unwrap();
		group.bench_with_input(BenchmarkId::new("decode", name), &encoded, |b, data| {
			b.iter(|| black_box(v1::decode(black_box(data)).unwrap()));
		});
	}

	group.finish();
}

/// Benchmark V2 encode (tiling + packing) and decode (PVRZ blit + dedup)
/// across a couple of frame sizes, including one that forces multi-tile
/// packing at the 1024x1024 page ceiling.
fn bench_v2_roundtrip(c: &mut Criterion) {
	let mut group = c.benchmark_group("v2_roundtrip");
	group.sample_size(20);

	for (name, (w, h)) in [("small", sizes::SMALL), ("medium", sizes::MEDIUM), ("large", sizes::LARGE)] {
		let frame = generate_rgba_frame(w, h);
		let input = V2Input { frames: vec![frame], cycles: vec![vec![0]] };
		let config = V2Config::default();
		group.throughput(Throughput::Elements(u64::from(w) * u64::from(h)));

		group.bench_with_input(BenchmarkId::new("encode", name), &(input, config), |b, (input, config)| {
			b.iter(|| black_box(v2::encode(black_box(input), black_box(config)).unwrap()));
		});

		let frame = generate_rgba_frame(w, h);
		let input = V2Input { frames: vec![frame], cycles: vec![vec![0]] };
		let output = v2::encode(&input, &V2Config::default()).unwrap();
		let pages = output.pages.clone();
		group.bench_with_input(BenchmarkId::new("decode", name), &output.bytes, |b, bytes| {
			b.iter(|| {
				black_box(
					v2::decode(black_box(bytes), |page_index| {
						pages
							.iter()
							.find(|(i, _)| *i == page_index)
							.map(|(_, p)| p.clone())
							.ok_or(bam_types::error::BamError::MissingPvrz {
								index: page_index,
								searched: 1,
							})
					})
					.unwrap(),
				)
			});
		});
	}

	group.finish();
}

criterion_group!(benches, bench_rle_roundtrip, bench_v1_roundtrip, bench_v2_roundtrip);
criterion_main!(benches);
