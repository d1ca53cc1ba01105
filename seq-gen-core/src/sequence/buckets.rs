//! Percentile-bound n-gram buckets.
//!
//! Bounds map an n-gram length to a percentile window. The n-grams of the
//! longest bound length that satisfy every window are returned: the n-gram
//! itself must fall in its length's window, and when windows are defined for
//! shorter lengths, the relevant sub-n-grams must fall in those too.

use std::collections::{BTreeMap, HashSet};

use crate::error::Result;
use crate::sequence::analyzer::SequenceAnalyzer;

/// n-gram length to percentile window, `length -> (lower, upper)`.
///
/// An ordered map so buckets are always built from the shortest n-grams up.
pub type Bounds = BTreeMap<usize, (f64, f64)>;

/// Which sub-n-grams of a candidate must appear in the shorter bucket.
#[derive(Clone, Copy)]
enum Containment {
	/// Every window of the candidate.
	All,
	/// Only the candidate's prefix.
	Leading,
	/// Only the candidate's suffix.
	Trailing,
}

/// All n-grams within some bounds.
///
/// E.g. for the sequences "asdf" (frequency 1), "qwer" (2), and "uipo" (3),
/// the bounds `{2: (60, 100), 3: (0, 100)}` give the buckets
/// `["ip", "po", "ui"]` and `["asd", "sdf", "qwe", "wer", "ipo", "uip"]`,
/// and only "uip" and "ipo" have all their 2-grams in the shorter bucket.
///
/// # Errors
/// Returns `InvalidInput` if any window is not `0 <= lower <= upper <= 100`.
pub fn ngrams(analyzer: &SequenceAnalyzer, bounds: &Bounds) -> Result<Vec<String>> {
	build_bucket(bounds, Containment::All, |length, lower, upper| analyzer.ngrams(length, lower, upper))
}

/// All leading n-grams within some bounds.
///
/// Like `ngrams` but only the leading sub-n-grams must be within the
/// shorter windows, if defined.
pub fn ngrams_leading(analyzer: &SequenceAnalyzer, bounds: &Bounds) -> Result<Vec<String>> {
	build_bucket(bounds, Containment::Leading, |length, lower, upper| {
		analyzer.ngrams_leading(length, lower, upper)
	})
}

/// All trailing n-grams within some bounds.
///
/// Like `ngrams` but only the trailing sub-n-grams must be within the
/// shorter windows, if defined.
pub fn ngrams_trailing(analyzer: &SequenceAnalyzer, bounds: &Bounds) -> Result<Vec<String>> {
	build_bucket(bounds, Containment::Trailing, |length, lower, upper| {
		analyzer.ngrams_trailing(length, lower, upper)
	})
}

/// Fetches one bucket per bound length, shortest first, filters each bucket
/// down to the n-grams contained by the previous bucket, and returns the
/// bucket with the longest n-grams.
fn build_bucket<F>(bounds: &Bounds, containment: Containment, fetch: F) -> Result<Vec<String>>
where
	F: Fn(usize, f64, f64) -> Result<Vec<String>>,
{
	let mut buckets: Vec<(usize, Vec<String>)> = Vec::with_capacity(bounds.len());
	for (&length, &(lower, upper)) in bounds {
		buckets.push((length, fetch(length, lower, upper)?));
	}

	for i in 1..buckets.len() {
		// an empty bucket empties every longer bucket as well
		if buckets[i - 1].1.is_empty() || buckets[i].1.is_empty() {
			buckets[i].1 = Vec::new();
			continue;
		}
		let (length_shorter, shorter) = (buckets[i - 1].0, &buckets[i - 1].1);
		let allowed: HashSet<&str> = shorter.iter().map(String::as_str).collect();
		let filtered = buckets[i]
			.1
			.iter()
			.filter(|ngram| contains(ngram, length_shorter, &allowed, containment))
			.cloned()
			.collect();
		buckets[i].1 = filtered;
	}

	Ok(buckets.pop().map(|(_, bucket)| bucket).unwrap_or_default())
}

/// True if the required sub-n-grams of `ngram`, of length `length_sub`, are
/// all present in `allowed`.
fn contains(ngram: &str, length_sub: usize, allowed: &HashSet<&str>, containment: Containment) -> bool {
	let chars: Vec<char> = ngram.chars().collect();
	let windows: Box<dyn Iterator<Item = &[char]>> = match containment {
		Containment::All => Box::new(chars.windows(length_sub)),
		Containment::Leading => Box::new(std::iter::once(&chars[..length_sub])),
		Containment::Trailing => Box::new(std::iter::once(&chars[chars.len() - length_sub..])),
	};
	for window in windows {
		let sub: String = window.iter().collect();
		if !allowed.contains(sub.as_str()) {
			return false;
		}
	}
	true
}
