use std::collections::{BTreeMap, HashSet};

use log::{debug, warn};
use rand::Rng;
use regex::Regex;

use crate::error::{Error, Result};
use crate::sequence::analyzer::SequenceAnalyzer;
use crate::sequence::assembler::{SequenceAssembler, single_middle_vertex_len};
use crate::sequence::buckets::{self, Bounds};

/// Creates new texts from analyzed training data.
///
/// One `SequenceAssembler` is prepared per text length appearing in the
/// training data, fed with the n-gram buckets the bounds select. Only
/// lengths already seen in the training data can be generated; lengths below
/// the minimum the buckets allow, and lengths whose n-grams turn out
/// disconnected, are skipped.
///
/// Generated text lengths follow the length distribution of the training
/// data.
pub struct TextGenerator {
	/// Text length to the assembler producing texts of that length.
	assemblers: BTreeMap<usize, SequenceAssembler>,
	/// Text length to its frequency in the training data.
	length_frequencies: BTreeMap<usize, f64>,
	/// The training sequences, for filtering when unique texts are requested.
	training_sequences: HashSet<String>,
}

impl TextGenerator {
	/// Builds assemblers for all usable lengths in the training data.
	///
	/// If any of the three n-gram buckets selected by the bounds comes out
	/// empty, no text can be created and an empty generator is returned.
	///
	/// # Errors
	/// Returns `InvalidInput` for malformed bounds, or when a bound selects
	/// n-grams shorter than two elements.
	pub fn new(bounds: &Bounds, analyzer: &SequenceAnalyzer) -> Result<Self> {
		let middle = buckets::ngrams(analyzer, bounds)?;
		let leading = buckets::ngrams_leading(analyzer, bounds)?;
		let trailing = buckets::ngrams_trailing(analyzer, bounds)?;

		let mut generator = Self {
			assemblers: BTreeMap::new(),
			length_frequencies: BTreeMap::new(),
			training_sequences: analyzer.sequences().map(str::to_owned).collect(),
		};

		if middle.is_empty() || leading.is_empty() || trailing.is_empty() {
			warn!("bounds select no usable n-grams, no text can be created");
			return Ok(generator);
		}

		// shortest achievable text, using one middle n-gram
		let min_len = single_middle_vertex_len(
			leading[0].chars().count(),
			middle[0].chars().count(),
			trailing[0].chars().count(),
		);

		for (&len_text, &frequency) in analyzer.sequence_length_frequencies() {
			if len_text < min_len {
				continue;
			}
			let assembler = SequenceAssembler::new(len_text, &leading, &middle, &trailing)?;
			if assembler.is_disconnected() {
				debug!("skipping length {}, n-grams are disconnected", len_text);
				continue;
			}
			generator.assemblers.insert(len_text, assembler);
			generator.length_frequencies.insert(len_text, frequency);
		}
		Ok(generator)
	}

	/// If no text can be created from the given bounds and training data.
	pub fn is_empty(&self) -> bool {
		self.assemblers.is_empty()
	}

	/// Some number of random texts of random lengths.
	///
	/// Text lengths are drawn weighted by their training-data frequency.
	/// With `unique` set, texts appearing in the training data, and texts
	/// already produced during the call, are filtered out, so fewer than
	/// `num_requested` texts may be returned.
	pub fn random_texts<R: Rng + ?Sized>(&self, num_requested: usize, unique: bool, rng: &mut R) -> Vec<String> {
		if self.is_empty() {
			return Vec::new();
		}

		let mut filter_set = if unique { self.training_sequences.clone() } else { HashSet::new() };
		let total_frequency: f64 = self.length_frequencies.values().sum();

		let mut result = Vec::with_capacity(num_requested);
		for _ in 0..num_requested {
			let len_text = self.random_text_length(total_frequency, rng);
			// every kept assembler is connected
			let text = self.assemblers[&len_text].random_sequence(rng).unwrap();
			if !filter_set.contains(&text) {
				if unique {
					filter_set.insert(text.clone());
				}
				result.push(text);
			}
		}
		result
	}

	/// All texts of all lengths appearing in the training data, shortest
	/// lengths first.
	///
	/// With `unique` set, texts appearing in the training data are filtered
	/// out.
	pub fn all_texts(&self, unique: bool) -> impl Iterator<Item = String> + '_ {
		self.assemblers
			.values()
			// every kept assembler is connected
			.flat_map(|assembler| assembler.all_sequences().unwrap())
			.filter(move |text| !unique || !self.training_sequences.contains(text))
	}

	/// A random text length, weighted by training-data frequency.
	fn random_text_length<R: Rng + ?Sized>(&self, total_frequency: f64, rng: &mut R) -> usize {
		let target = rng.random::<f64>() * total_frequency;
		let mut cumulative = 0.0;
		for (&len_text, &frequency) in &self.length_frequencies {
			cumulative += frequency;
			if target < cumulative {
				return len_text;
			}
		}
		// rounding can push the target past the last boundary
		*self.length_frequencies.keys().next_back().unwrap()
	}
}

/// Parses bound strings on the format `<LENGTH>:<LOWER>,<UPPER>`.
///
/// E.g. `["3:0,100", "5:25,75"]`. The length must be a positive integer and
/// the bounds must satisfy `0 <= lower < upper <= 100`.
///
/// # Errors
/// Returns `InvalidInput` for strings not matching the format or bounds out
/// of order.
pub fn parse_bounds<S: AsRef<str>>(bound_strings: &[S]) -> Result<Bounds> {
	// the pattern itself caps the bounds at 100
	let pattern = Regex::new(r"^(\d+):(100|\d\d?),(100|\d\d?)$").expect("pattern is valid");

	let mut result = Bounds::new();
	for bound_string in bound_strings {
		let bound_string = bound_string.as_ref();
		let captures = pattern
			.captures(bound_string)
			.ok_or_else(|| Error::invalid(format!("bound string {} does not match <LENGTH>:<LOWER>,<UPPER>", bound_string)))?;

		// the pattern only matches unsigned integers in range
		let length: usize = captures[1].parse().map_err(|_| Error::invalid("n-gram length out of range"))?;
		let lower: u32 = captures[2].parse().expect("matched digits");
		let upper: u32 = captures[3].parse().expect("matched digits");

		if lower >= upper {
			return Err(Error::invalid(format!("lower bound {} is not less than upper bound {}", lower, upper)));
		}
		result.insert(length, (f64::from(lower), f64::from(upper)));
	}
	Ok(result)
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;

	fn analyzer() -> SequenceAnalyzer {
		SequenceAnalyzer::new(&[("ab", 1.0), ("bc", 1.0), ("cd", 1.0), ("de", 1.0), ("xxxx", 1.0)]).unwrap()
	}

	fn analyzer_long() -> SequenceAnalyzer {
		SequenceAnalyzer::new(&[("ab", 1.0), ("bc", 1.0), ("cd", 1.0), ("de", 1.0), ("yyyyy", 1.0)]).unwrap()
	}

	fn bounds() -> Bounds {
		Bounds::from([(2, (0.0, 100.0))])
	}

	#[test]
	fn empty_when_no_length_is_achievable() {
		// only "xxxx" has 3-grams, and no training length reaches the
		// resulting minimum of five
		let generator = TextGenerator::new(&Bounds::from([(3, (0.0, 100.0))]), &analyzer()).unwrap();
		assert!(generator.is_empty());

		let generator = TextGenerator::new(&bounds(), &analyzer()).unwrap();
		assert!(!generator.is_empty());
	}

	#[test]
	fn empty_bounds_create_no_texts() {
		let generator = TextGenerator::new(&Bounds::new(), &analyzer()).unwrap();
		assert!(generator.is_empty());
		assert_eq!(generator.all_texts(false).count(), 0);
		let mut rng = StdRng::seed_from_u64(0);
		assert!(generator.random_texts(10, false, &mut rng).is_empty());
	}

	#[test]
	fn all_texts() {
		let generator = TextGenerator::new(&bounds(), &analyzer()).unwrap();
		let texts: HashSet<String> = generator.all_texts(false).collect();
		let expected: HashSet<String> = ["xxxx", "abcd", "bcde"].iter().map(|s| (*s).to_owned()).collect();
		assert_eq!(texts, expected);
	}

	#[test]
	fn all_texts_unique_excludes_training_data() {
		let generator = TextGenerator::new(&bounds(), &analyzer()).unwrap();
		let texts: HashSet<String> = generator.all_texts(true).collect();
		let expected: HashSet<String> = ["abcd", "bcde"].iter().map(|s| (*s).to_owned()).collect();
		assert_eq!(texts, expected);

		let generator = TextGenerator::new(&bounds(), &analyzer_long()).unwrap();
		let texts: HashSet<String> = generator.all_texts(false).collect();
		let expected: HashSet<String> = ["yyyyy", "abcde"].iter().map(|s| (*s).to_owned()).collect();
		assert_eq!(texts, expected);
	}

	#[test]
	fn random_texts_are_always_enumerable() {
		let generator = TextGenerator::new(&bounds(), &analyzer()).unwrap();
		let all: HashSet<String> = generator.all_texts(false).collect();

		let mut rng = StdRng::seed_from_u64(17);
		for text in generator.random_texts(100, false, &mut rng) {
			assert!(all.contains(&text), "unexpected text {}", text);
		}
	}

	#[test]
	fn random_texts_unique_excludes_training_data() {
		let generator = TextGenerator::new(&bounds(), &analyzer_long()).unwrap();

		let mut rng = StdRng::seed_from_u64(29);
		let texts = generator.random_texts(100, true, &mut rng);
		// "yyyyy" is training data and "abcde" can be produced only once
		assert!(texts.len() <= 1);
		for text in texts {
			assert_eq!(text, "abcde");
		}
	}

	#[test]
	fn parse_bounds_accepts_well_formed_strings() {
		let bounds = parse_bounds(&["3:0,100", "5:20,100"]).unwrap();
		assert_eq!(bounds[&3], (0.0, 100.0));
		assert_eq!(bounds[&5], (20.0, 100.0));
	}

	#[test]
	fn parse_bounds_rejects_malformed_strings() {
		assert!(matches!(parse_bounds(&["-3:0,100"]), Err(Error::InvalidInput(_))));
		assert!(matches!(parse_bounds(&["3:30,150"]), Err(Error::InvalidInput(_))));
		assert!(matches!(parse_bounds(&["3:-30,50"]), Err(Error::InvalidInput(_))));
		assert!(matches!(parse_bounds(&["3"]), Err(Error::InvalidInput(_))));
	}

	#[test]
	fn parse_bounds_rejects_reversed_bounds() {
		assert!(matches!(parse_bounds(&["3:70,30"]), Err(Error::InvalidInput(_))));
		assert!(matches!(parse_bounds(&["3:50,50"]), Err(Error::InvalidInput(_))));
	}
}
