use std::collections::{HashMap, HashSet};

use super::DirectedEdges;
use crate::error::{Error, Result};

/// Finds edges between two pools of n-grams.
///
/// Using graph terminology, n-grams are vertices and two n-grams that
/// "overlap as much as possible" have a directed edge between them. Two
/// n-grams overlap as much as possible when they share a boundary substring
/// of length `min(len_start, len_end) - 1`.
///
/// E.g.
/// - "abc" and "bcd" overlap, and concatenate to "abcd".
/// - "abcd" and "de" overlap, the shared part being "d".
/// - "abcd" and "cdefg" do not overlap as much as possible: the shared
///   part "cd" leaves more than one element on both sides.
///
/// # Responsibilities
/// - Build the by-suffix and by-prefix multimaps once, at construction
/// - Answer `successors`/`predecessors` queries as pure map lookups
///
/// # Invariants
/// - All start n-grams share one length, all end n-grams share another,
///   both lengths >= 2
/// - `e ∈ successors(s)` iff `s ∈ predecessors(e)` (both maps are derived
///   from the same pools and the same overlap length)
#[derive(Debug, Clone)]
pub struct OverlapIndex {
	/// Length (in chars) of the start-pool n-grams.
	len_start: usize,
	/// Length (in chars) of the end-pool n-grams.
	len_end: usize,
	/// Length of the shared boundary, `min(len_start, len_end) - 1`.
	len_overlap: usize,
	/// Last `len_overlap` chars of a start n-gram -> start n-grams with that suffix.
	by_suffix: HashMap<String, HashSet<String>>,
	/// First `len_overlap` chars of an end n-gram -> end n-grams with that prefix.
	by_prefix: HashMap<String, HashSet<String>>,
}

impl OverlapIndex {
	/// Builds the index from a start pool and an end pool.
	///
	/// # Errors
	/// Returns `InvalidInput` if either pool is empty, or if any n-gram is
	/// shorter than two chars or does not match its pool's length.
	pub fn new<S: AsRef<str>>(start_ngrams: &[S], end_ngrams: &[S]) -> Result<Self> {
		if start_ngrams.is_empty() || end_ngrams.is_empty() {
			return Err(Error::invalid("must provide some start and end n-grams"));
		}

		let len_start = start_ngrams[0].as_ref().chars().count();
		let len_end = end_ngrams[0].as_ref().chars().count();
		if len_start < 2 || len_end < 2 {
			return Err(Error::invalid("n-grams must have a length greater than one"));
		}
		let len_overlap = len_start.min(len_end) - 1;

		let mut by_suffix: HashMap<String, HashSet<String>> = HashMap::new();
		for ngram in start_ngrams {
			let ngram = ngram.as_ref();
			check_len(ngram, len_start)?;
			let key = last_chars(ngram, len_overlap);
			by_suffix.entry(key).or_default().insert(ngram.to_owned());
		}

		let mut by_prefix: HashMap<String, HashSet<String>> = HashMap::new();
		for ngram in end_ngrams {
			let ngram = ngram.as_ref();
			check_len(ngram, len_end)?;
			let key = first_chars(ngram, len_overlap);
			by_prefix.entry(key).or_default().insert(ngram.to_owned());
		}

		Ok(Self { len_start, len_end, len_overlap, by_suffix, by_prefix })
	}

	/// All end-pool n-grams with an edge from `start_ngram`.
	///
	/// Returns an empty set when nothing overlaps.
	///
	/// # Errors
	/// Returns `InvalidInput` if `start_ngram` does not have the start pool's
	/// length.
	pub fn successors(&self, start_ngram: &str) -> Result<HashSet<String>> {
		check_len(start_ngram, self.len_start)?;
		let key = last_chars(start_ngram, self.len_overlap);
		Ok(self.by_prefix.get(&key).cloned().unwrap_or_default())
	}

	/// All start-pool n-grams with an edge to `end_ngram`.
	///
	/// Returns an empty set when nothing overlaps.
	///
	/// # Errors
	/// Returns `InvalidInput` if `end_ngram` does not have the end pool's
	/// length.
	pub fn predecessors(&self, end_ngram: &str) -> Result<HashSet<String>> {
		check_len(end_ngram, self.len_end)?;
		let key = first_chars(end_ngram, self.len_overlap);
		Ok(self.by_suffix.get(&key).cloned().unwrap_or_default())
	}

	/// Length of the overlap between connected n-grams.
	pub fn overlap_len(&self) -> usize {
		self.len_overlap
	}
}

impl DirectedEdges for OverlapIndex {
	type Vertex = String;

	fn successors(&self, vertex: &String) -> HashSet<String> {
		// Vertices handed to the graph come from the indexed pools, so the
		// length check cannot fail here.
		OverlapIndex::successors(self, vertex).unwrap_or_default()
	}

	fn predecessors(&self, vertex: &String) -> HashSet<String> {
		OverlapIndex::predecessors(self, vertex).unwrap_or_default()
	}
}

/// Validates the char count of an n-gram against its pool's length.
fn check_len(ngram: &str, expected: usize) -> Result<()> {
	if ngram.chars().count() != expected {
		return Err(Error::invalid(format!("n-gram '{}' is not of length {}", ngram, expected)));
	}
	Ok(())
}

/// Returns the first `n` chars of a string (UTF-8 safe).
fn first_chars(s: &str, n: usize) -> String {
	s.chars().take(n).collect()
}

/// Returns the last `n` chars of a string (UTF-8 safe).
fn last_chars(s: &str, n: usize) -> String {
	let skip = s.chars().count().saturating_sub(n);
	s.chars().skip(skip).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn pool(ngrams: &[&str]) -> Vec<String> {
		ngrams.iter().map(|s| (*s).to_owned()).collect()
	}

	#[test]
	fn successors_same_length() {
		let index = OverlapIndex::new(&pool(&["sdfg", "wefg", "werz", "1234"]), &pool(&["fgab", "rzxy", "nope"])).unwrap();
		assert_eq!(index.overlap_len(), 3);

		let successors = index.successors("werz").unwrap();
		assert_eq!(successors, HashSet::from(["rzxy".to_owned()]));
		assert!(index.successors("1234").unwrap().is_empty());
	}

	#[test]
	fn mixed_lengths_use_shorter_overlap() {
		// overlap of length 1: last char of start vs first char of end
		let index = OverlapIndex::new(&pool(&["abcd", "abce"]), &pool(&["de", "ef", "xy"])).unwrap();
		assert_eq!(index.overlap_len(), 1);
		assert_eq!(index.successors("abcd").unwrap(), HashSet::from(["de".to_owned()]));
		assert_eq!(index.successors("abce").unwrap(), HashSet::from(["ef".to_owned()]));
		assert_eq!(index.predecessors("de").unwrap(), HashSet::from(["abcd".to_owned()]));
		assert!(index.predecessors("xy").unwrap().is_empty());
	}

	#[test]
	fn index_symmetry() {
		let starts = pool(&["axx", "bxy", "cyx", "dzz"]);
		let ends = pool(&["xxq", "xyq", "yxq", "zzq"]);
		let index = OverlapIndex::new(&starts, &ends).unwrap();

		for s in &starts {
			for e in &ends {
				let forward = index.successors(s).unwrap().contains(e);
				let backward = index.predecessors(e).unwrap().contains(s);
				assert_eq!(forward, backward, "asymmetry between {} and {}", s, e);
			}
		}
	}

	#[test]
	fn rejects_empty_pools() {
		let empty: Vec<String> = Vec::new();
		assert!(matches!(OverlapIndex::new(&empty, &pool(&["ab"])), Err(Error::InvalidInput(_))));
		assert!(matches!(OverlapIndex::new(&pool(&["ab"]), &empty), Err(Error::InvalidInput(_))));
	}

	#[test]
	fn rejects_short_ngrams() {
		assert!(matches!(OverlapIndex::new(&pool(&["a"]), &pool(&["ab"])), Err(Error::InvalidInput(_))));
		assert!(matches!(OverlapIndex::new(&pool(&["ab"]), &pool(&["b"])), Err(Error::InvalidInput(_))));
	}

	#[test]
	fn rejects_uneven_pool() {
		assert!(matches!(OverlapIndex::new(&pool(&["abc", "ab"]), &pool(&["bc"])), Err(Error::InvalidInput(_))));
	}

	#[test]
	fn rejects_mismatched_query_length() {
		let index = OverlapIndex::new(&pool(&["abc"]), &pool(&["bcd"])).unwrap();
		assert!(matches!(index.successors("ab"), Err(Error::InvalidInput(_))));
		assert!(matches!(index.predecessors("bcde"), Err(Error::InvalidInput(_))));
	}

	#[test]
	fn multibyte_chars_count_as_one() {
		let index = OverlapIndex::new(&pool(&["héé", "hoo"]), &pool(&["ééz", "oop"])).unwrap();
		assert_eq!(index.successors("héé").unwrap(), HashSet::from(["ééz".to_owned()]));
		assert_eq!(index.predecessors("oop").unwrap(), HashSet::from(["hoo".to_owned()]));
	}
}
