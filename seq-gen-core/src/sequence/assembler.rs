use std::collections::HashSet;

use rand::Rng;
use rand::prelude::IteratorRandom;

use crate::error::{Error, Result};
use crate::graph::DirectedEdges;
use crate::graph::overlap_index::OverlapIndex;
use crate::graph::paths::AllPaths;
use crate::graph::reachability::ReachabilityGraph;

/// Creates new sequences given pools of leading/middle/trailing n-grams.
///
/// Sequences are created by taking one leading n-gram, one or more middle
/// n-grams, one trailing n-gram, and concatenating them with their overlaps
/// collapsed. The selected n-grams, in order, must "overlap as much as
/// possible" (see `OverlapIndex` for the definition of overlap used here).
/// The number of middle n-grams depends on the requested sequence length.
///
/// E.g. the n-grams ["Icter", "teri", "eris", "rise"] concatenate to
/// "Icterise".
///
/// Using graph terminology, n-grams are vertices and overlaps are directed
/// edges, so finding a run of overlapping n-grams translates to finding a
/// path from a set of start vertices to a set of end vertices.
///
/// # Responsibilities
/// - Build the leading-to-middle and middle-to-trailing overlap indexes
/// - Derive the middle-vertex count from the requested length
/// - Produce random or exhaustively enumerated sequences
#[derive(Debug)]
pub struct SequenceAssembler {
	/// Edges from leading n-grams into middle n-grams.
	leading_to_middle: OverlapIndex,
	/// Edges from middle n-grams into trailing n-grams.
	middle_to_trailing: OverlapIndex,
	/// Source of middle-vertex paths.
	middle: MiddlePaths,
	/// True if no sequence can be created.
	disconnected: bool,
}

/// How paths of middle vertices are produced.
#[derive(Debug)]
enum MiddlePaths {
	/// No middle vertex connects to both ends; the assembler is disconnected.
	None,
	/// Exactly one middle vertex per sequence: a path is one member of this
	/// set, no path finding needed.
	Single(HashSet<String>),
	/// Two or more middle vertices per sequence, produced by a reachability
	/// graph over middle-to-middle edges.
	Multi(ReachabilityGraph<OverlapIndex>),
}

impl SequenceAssembler {
	/// Prepares sequence creation for one target length.
	///
	/// # Parameters
	/// - `sequence_length`: length of the sequences to create.
	/// - `leading`/`middle`/`trailing`: the n-gram pools, each non-empty and
	///   of one uniform length >= 2.
	///
	/// # Errors
	/// Returns `InvalidInput` for malformed pools, or when
	/// `sequence_length` is below the single-middle-vertex minimum (see
	/// `single_middle_vertex_len`); callers are expected to filter requested
	/// lengths beforehand. A disconnected pool combination is not an error
	/// here; it is recorded and surfaced when a sequence is requested.
	pub fn new(
		sequence_length: usize,
		leading: &[String],
		middle: &[String],
		trailing: &[String],
	) -> Result<Self> {
		let leading_to_middle = OverlapIndex::new(leading, middle)?;
		let middle_to_trailing = OverlapIndex::new(middle, trailing)?;

		// any element works as the length representative, pools are uniform
		let len_leading = leading[0].chars().count();
		let len_middle = middle[0].chars().count();
		let len_trailing = trailing[0].chars().count();

		// how many middle vertices the requested length calls for
		let min_len = single_middle_vertex_len(len_leading, len_middle, len_trailing);
		if sequence_length < min_len {
			return Err(Error::invalid(format!(
				"sequence length {} is below the minimum achievable length {}",
				sequence_length, min_len
			)));
		}
		let num_middle_vertices = sequence_length - min_len + 1;

		// middle vertices with an edge from some leading vertex
		let start_vertices: HashSet<String> = leading
			.iter()
			.flat_map(|ngram| DirectedEdges::successors(&leading_to_middle, ngram))
			.collect();
		// middle vertices with an edge to some trailing vertex
		let end_vertices: HashSet<String> = trailing
			.iter()
			.flat_map(|ngram| DirectedEdges::predecessors(&middle_to_trailing, ngram))
			.collect();

		// no edges between middle and leading/trailing vertices
		if start_vertices.is_empty() || end_vertices.is_empty() {
			return Ok(Self {
				leading_to_middle,
				middle_to_trailing,
				middle: MiddlePaths::None,
				disconnected: true,
			});
		}

		// with one middle vertex no path finding needs to happen
		let (middle, disconnected) = if num_middle_vertices == 1 {
			let allowed: HashSet<String> = start_vertices.intersection(&end_vertices).cloned().collect();
			if allowed.is_empty() {
				(MiddlePaths::None, true)
			} else {
				(MiddlePaths::Single(allowed), false)
			}
		} else {
			let middle_to_middle = OverlapIndex::new(middle, middle)?;
			let graph = ReachabilityGraph::new(start_vertices, end_vertices, num_middle_vertices, middle_to_middle)?;
			let disconnected = graph.is_disconnected();
			(MiddlePaths::Multi(graph), disconnected)
		};

		Ok(Self { leading_to_middle, middle_to_trailing, middle, disconnected })
	}

	/// Returns true if no sequence can be created.
	pub fn is_disconnected(&self) -> bool {
		self.disconnected
	}

	/// Returns a random sequence.
	///
	/// # Errors
	/// Returns `Disconnected` if the provided n-grams are disconnected.
	pub fn random_sequence<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String> {
		if self.disconnected {
			return Err(Error::Disconnected);
		}

		// a random path through the middle vertices
		let path: Vec<String> = match &self.middle {
			MiddlePaths::Single(allowed) => {
				// non-empty, or the assembler would be disconnected
				vec![allowed.iter().choose(rng).cloned().unwrap()]
			}
			MiddlePaths::Multi(graph) => graph.random_path(rng)?,
			// disconnected was checked above
			MiddlePaths::None => unreachable!("no middle paths on a connected assembler"),
		};

		// random leading/trailing vertices with edges to the path's ends;
		// path ends come from the start/end sets, so neither can be empty
		let leading = DirectedEdges::predecessors(&self.leading_to_middle, &path[0])
			.into_iter()
			.choose(rng)
			.unwrap();
		let trailing = DirectedEdges::successors(&self.middle_to_trailing, path.last().unwrap())
			.into_iter()
			.choose(rng)
			.unwrap();

		let mut ngrams: Vec<&str> = Vec::with_capacity(path.len() + 2);
		ngrams.push(&leading);
		ngrams.extend(path.iter().map(String::as_str));
		ngrams.push(&trailing);
		Ok(concat_ngrams(&ngrams))
	}

	/// Returns a lazy iterator of all possible sequences.
	///
	/// For every path of middle n-grams, every legal leading and trailing
	/// n-gram combination is produced. Every call returns an independent
	/// iterator.
	///
	/// # Errors
	/// Returns `Disconnected` if the provided n-grams are disconnected.
	pub fn all_sequences(&self) -> Result<AllSequences<'_>> {
		if self.disconnected {
			return Err(Error::Disconnected);
		}

		let paths = match &self.middle {
			MiddlePaths::Single(allowed) => MiddlePathIter::Single(allowed.iter()),
			MiddlePaths::Multi(graph) => MiddlePathIter::Multi(graph.all_paths()?),
			MiddlePaths::None => unreachable!("no middle paths on a connected assembler"),
		};
		Ok(AllSequences { assembler: self, paths, current: None })
	}
}

/// Length of the sequence that results from using exactly one middle vertex.
///
/// This is the minimum length an assembler over pools of these lengths can
/// produce; one more middle vertex is needed per additional element.
pub fn single_middle_vertex_len(len_leading: usize, len_middle: usize, len_trailing: usize) -> usize {
	(len_leading.max(len_middle) + 1) + (len_trailing.max(len_middle) + 1) - len_middle
}

/// Concatenates a run of n-grams without duplicating the overlaps.
///
/// Adjacent n-grams are expected to overlap as much as possible; the
/// contents are trusted, not re-checked, since the n-grams were selected
/// through the overlap edge relation.
///
/// E.g. ["abc", "bcde", "ef"] concatenates to "abcdef".
fn concat_ngrams(ngrams: &[&str]) -> String {
	let mut result = ngrams[0].to_owned();
	let mut len_prev = ngrams[0].chars().count();
	for ngram in &ngrams[1..] {
		let len = ngram.chars().count();
		let len_overlap = len_prev.min(len) - 1;
		result.extend(ngram.chars().skip(len_overlap));
		len_prev = len;
	}
	result
}

/// Middle-vertex paths from either the single-vertex shortcut or the graph.
enum MiddlePathIter<'a> {
	Single(std::collections::hash_set::Iter<'a, String>),
	Multi(AllPaths<'a, OverlapIndex>),
}

impl<'a> Iterator for MiddlePathIter<'a> {
	type Item = Vec<String>;

	fn next(&mut self) -> Option<Self::Item> {
		match self {
			MiddlePathIter::Single(members) => members.next().map(|vertex| vec![vertex.clone()]),
			MiddlePathIter::Multi(paths) => paths.next(),
		}
	}
}

/// One middle path with the leading/trailing choices still to be emitted.
struct PathChoices {
	path: Vec<String>,
	leadings: Vec<String>,
	trailings: Vec<String>,
	leading_index: usize,
	trailing_index: usize,
}

/// Lazy cross product of middle paths with their legal leading and trailing
/// n-grams. See `SequenceAssembler::all_sequences`.
pub struct AllSequences<'a> {
	assembler: &'a SequenceAssembler,
	paths: MiddlePathIter<'a>,
	current: Option<PathChoices>,
}

impl<'a> Iterator for AllSequences<'a> {
	type Item = String;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			if let Some(current) = &mut self.current {
				if current.leading_index < current.leadings.len() {
					let mut ngrams: Vec<&str> = Vec::with_capacity(current.path.len() + 2);
					ngrams.push(&current.leadings[current.leading_index]);
					ngrams.extend(current.path.iter().map(String::as_str));
					ngrams.push(&current.trailings[current.trailing_index]);
					let sequence = concat_ngrams(&ngrams);

					current.trailing_index += 1;
					if current.trailing_index == current.trailings.len() {
						current.trailing_index = 0;
						current.leading_index += 1;
					}
					return Some(sequence);
				}
				self.current = None;
			}

			let path = self.paths.next()?;
			// path ends come from the start/end sets, so both lists are non-empty
			let leadings: Vec<String> = DirectedEdges::predecessors(&self.assembler.leading_to_middle, &path[0])
				.into_iter()
				.collect();
			let trailings: Vec<String> =
				DirectedEdges::successors(&self.assembler.middle_to_trailing, path.last().unwrap())
					.into_iter()
					.collect();
			self.current = Some(PathChoices { path, leadings, trailings, leading_index: 0, trailing_index: 0 });
		}
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;

	fn pool(ngrams: &[&str]) -> Vec<String> {
		ngrams.iter().map(|s| (*s).to_owned()).collect()
	}

	fn fixture_pools() -> (Vec<String>, Vec<String>, Vec<String>) {
		(
			pool(&["ax", "bx", "aa"]),
			pool(&["xx", "xy", "yx", "yy", "zz", "xz"]),
			pool(&["x1", "x2", "11"]),
		)
	}

	#[test]
	fn concat_collapses_overlaps() {
		assert_eq!(concat_ngrams(&["ax", "xx", "x1"]), "axx1");
		assert_eq!(concat_ngrams(&["abc", "bcde", "ef"]), "abcdef");
		assert_eq!(concat_ngrams(&["ax", "xzyzyzyx", "x1"]), "axzyzyzyx1");
	}

	#[test]
	fn single_middle_vertex_len_mixed_lengths() {
		assert_eq!(single_middle_vertex_len(2, 2, 2), 4);
		assert_eq!(single_middle_vertex_len(3, 4, 2), 6);
		assert_eq!(single_middle_vertex_len(2, 8, 2), 10);
	}

	#[test]
	fn all_sequences_of_length_five() {
		let (leading, middle, trailing) = fixture_pools();
		let assembler = SequenceAssembler::new(5, &leading, &middle, &trailing).unwrap();
		assert!(!assembler.is_disconnected());

		let sequences: HashSet<String> = assembler.all_sequences().unwrap().collect();
		let expected: HashSet<String> = pool(&[
			"axxx1", "bxxx1", "axyx1", "bxyx1", "axxx2", "bxxx2", "axyx2", "bxyx2",
		])
		.into_iter()
		.collect();
		assert_eq!(sequences, expected);
	}

	#[test]
	fn random_sequence_is_always_enumerable() {
		let (leading, middle, trailing) = fixture_pools();
		let assembler = SequenceAssembler::new(5, &leading, &middle, &trailing).unwrap();
		let all: HashSet<String> = assembler.all_sequences().unwrap().collect();

		let mut rng = StdRng::seed_from_u64(42);
		for _ in 0..100 {
			let sequence = assembler.random_sequence(&mut rng).unwrap();
			assert!(all.contains(&sequence), "unexpected sequence {}", sequence);
		}
	}

	#[test]
	fn single_middle_vertex_shortcut() {
		let (leading, middle, trailing) = fixture_pools();
		// length 4 needs exactly one middle vertex
		let assembler = SequenceAssembler::new(4, &leading, &middle, &trailing).unwrap();
		assert!(!assembler.is_disconnected());

		let sequences: HashSet<String> = assembler.all_sequences().unwrap().collect();
		let expected: HashSet<String> = pool(&["axx1", "axx2", "bxx1", "bxx2"]).into_iter().collect();
		assert_eq!(sequences, expected);

		let mut rng = StdRng::seed_from_u64(3);
		for _ in 0..20 {
			assert!(expected.contains(&assembler.random_sequence(&mut rng).unwrap()));
		}
	}

	#[test]
	fn disconnected_pools() {
		let assembler = SequenceAssembler::new(5, &pool(&["aa"]), &pool(&["xx"]), &pool(&["11"])).unwrap();
		assert!(assembler.is_disconnected());

		let mut rng = StdRng::seed_from_u64(0);
		assert_eq!(assembler.random_sequence(&mut rng), Err(Error::Disconnected));
		assert!(matches!(assembler.all_sequences(), Err(Error::Disconnected)));
	}

	#[test]
	fn length_below_minimum_is_rejected() {
		let (leading, middle, trailing) = fixture_pools();
		assert!(matches!(
			SequenceAssembler::new(3, &leading, &middle, &trailing),
			Err(Error::InvalidInput(_))
		));
	}

	#[test]
	fn empty_pool_is_rejected() {
		let (leading, middle, _) = fixture_pools();
		assert!(matches!(
			SequenceAssembler::new(5, &leading, &middle, &Vec::<String>::new()),
			Err(Error::InvalidInput(_))
		));
	}

	#[test]
	fn longer_middle_ngrams() {
		// middle longer than leading/trailing, two middle vertices
		let leading = pool(&["Ict"]);
		let middle = pool(&["Icter", "cteri", "teris", "erise"]);
		let trailing = pool(&["se"]);
		// single_len = (5 + 1) + (5 + 1) - 5 = 7
		let assembler = SequenceAssembler::new(8, &leading, &middle, &trailing).unwrap();
		assert!(!assembler.is_disconnected());
		let sequences: Vec<String> = assembler.all_sequences().unwrap().collect();
		assert_eq!(sequences, vec!["Icterise".to_owned()]);
	}
}
