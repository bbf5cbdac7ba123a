//! The filter chain runner (C9): drives `current`/`previous` frame arrays
//! through an ordered chain of [`Filter`]s, optionally in parallel.

use super::Filter;
use crate::error::Result;
use crate::frame::Frame;
use rayon::prelude::*;
use std::sync::Mutex;

/// Whether the runner is allowed to process frames of a single filter pass
/// concurrently. Mirrors the global multithreading flag in §5: default on
/// whenever more than one CPU is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concurrency {
	/// Run each filter pass across a bounded worker pool.
	Parallel,
	/// Run each filter pass on the calling thread, frame by frame.
	Serial,
}

impl Concurrency {
	/// The spec's default: parallel whenever more than one CPU is visible.
	#[must_use]
	pub fn default_for_host() -> Self {
		if rayon::current_num_threads() > 1 {
			Self::Parallel
		} else {
			Self::Serial
		}
	}
}

/// Runs every filter in `chain`, in order, over `frames`.
///
/// For each filter: `previous` is a snapshot of the input to this pass and
/// `current` accumulates this pass's output; `current` becomes the next
/// pass's `previous` once the whole pass completes. Frame *i* is only ever
/// handed `previous` (never a half-finished `current`), so passes are safe
/// to parallelise without cross-frame synchronisation.
///
/// On error, the first failure (by frame index) observed for that filter is
/// returned immediately; jobs already scheduled are allowed to finish, but
/// no job from a later filter ever starts.
pub fn run_chain(chain: &[Box<dyn Filter>], frames: &[Frame], concurrency: Concurrency) -> Result<Vec<Frame>> {
	let mut previous = frames.to_vec();

	for (filter_index, filter) in chain.iter().enumerate() {
		let current = match concurrency {
			Concurrency::Parallel => run_pass_parallel(filter.as_ref(), filter_index, &previous)?,
			Concurrency::Serial => run_pass_serial(filter.as_ref(), filter_index, &previous)?,
		};
		previous = current;
	}

	Ok(previous)
}

fn run_pass_serial(filter: &dyn Filter, filter_index: usize, previous: &[Frame]) -> Result<Vec<Frame>> {
	previous
		.iter()
		.enumerate()
		.map(|(i, frame)| tag_index(filter.process(frame, i, previous), filter, filter_index, i))
		.collect()
}

fn run_pass_parallel(filter: &dyn Filter, filter_index: usize, previous: &[Frame]) -> Result<Vec<Frame>> {
	let first_error: Mutex<Option<usize>> = Mutex::new(None);
	let mut results: Vec<Option<Frame>> = vec![None; previous.len()];

	let processed: Vec<(usize, Result<Frame>)> = previous
		.par_iter()
		.enumerate()
		.map(|(i, frame)| {
			if first_error.lock().expect("runner mutex poisoned").is_some() {
				return (i, Ok(frame.clone()));
			}
			let outcome = tag_index(filter.process(frame, i, previous), filter, filter_index, i);
			if outcome.is_err() {
				let mut guard = first_error.lock().expect("runner mutex poisoned");
				if guard.is_none() || guard.is_some_and(|existing| i < existing) {
					*guard = Some(i);
				}
			}
			(i, outcome)
		})
		.collect();

	let error_index = first_error.into_inner().expect("runner mutex poisoned");
	if let Some(index) = error_index {
		for (i, outcome) in processed {
			if i == index {
				return Err(outcome.expect_err("recorded as the first error"));
			}
		}
		unreachable!("recorded error index must appear in the processed set");
	}

	for (i, outcome) in processed {
		results[i] = Some(outcome?);
	}
	Ok(results.into_iter().map(|f| f.expect("every index was processed")).collect())
}

fn tag_index(
	result: Result<Frame>,
	filter: &dyn Filter,
	filter_index: usize,
	frame_index: usize,
) -> Result<Frame> {
	result.map_err(|err| match err {
		crate::error::BamError::FilterFailed { message, .. } => crate::error::BamError::FilterFailed {
			filter_name: filter.name(),
			filter_index,
			frame_index,
			message,
		},
		crate::error::BamError::InvalidFilterOption { key, message, .. } => {
			crate::error::BamError::InvalidFilterOption { filter_name: filter.name(), filter_index, key, message }
		}
		other => other,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::filter::registry::create;

	#[test]
	fn empty_chain_is_identity() {
		let frames = vec![Frame::sentinel()];
		let out = run_chain(&[], &frames, Concurrency::Serial).unwrap();
		assert_eq!(out, frames);
	}

	#[test]
	fn serial_and_parallel_agree() {
		let frames: Vec<Frame> = (0..8).map(|_| Frame::sentinel()).collect();
		let chain = vec![create("null").unwrap()];
		let serial = run_chain(&chain, &frames, Concurrency::Serial).unwrap();
		let parallel = run_chain(&chain, &frames, Concurrency::Parallel).unwrap();
		assert_eq!(serial, parallel);
	}
}
