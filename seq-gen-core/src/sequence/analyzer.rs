use std::collections::HashMap;
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::io::{build_output_path, get_filename, read_to_string};

/// Provides frequency analytics for a set of training sequences.
///
/// Sequences and their n-grams are analyzed by frequency. n-grams are
/// tracked separately as leading n-grams, trailing n-grams, and all n-grams
/// of a sequence, so that each class can be queried on its own.
///
/// # Responsibilities
/// - Accumulate n-gram and sequence frequencies at construction
/// - Answer percentile-window n-gram queries
/// - Merge with other analyzers and rescale frequencies (ex. combining
///   corpora with different weights)
///
/// # Invariants
/// - Every recorded frequency is strictly positive at construction; scaling
///   by zero is allowed afterwards
/// - The leading and trailing totals for one n-gram length are identical
///   (every sequence contributes exactly one of each per length)
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SequenceAnalyzer {
	/// n-gram length -> n-gram -> frequency, over all positions.
	freq: HashMap<usize, HashMap<String, f64>>,
	/// Same, restricted to leading n-grams.
	freq_leading: HashMap<usize, HashMap<String, f64>>,
	/// Same, restricted to trailing n-grams.
	freq_trailing: HashMap<usize, HashMap<String, f64>>,

	/// n-gram length -> total frequency over all n-grams of that length.
	total_freq: HashMap<usize, f64>,
	total_freq_leading: HashMap<usize, f64>,
	total_freq_trailing: HashMap<usize, f64>,

	/// Sequence length -> total frequency of sequences of that length.
	seq_len_freq: HashMap<usize, f64>,
	/// Sequence -> frequency.
	seq_freq: HashMap<String, f64>,
}

impl SequenceAnalyzer {
	/// Builds an analyzer from `(sequence, frequency)` pairs.
	///
	/// # Errors
	/// Returns `InvalidInput` if no sequences are provided or any frequency
	/// is not strictly positive.
	pub fn new<S: AsRef<str>>(sequence_frequencies: &[(S, f64)]) -> Result<Self> {
		if sequence_frequencies.is_empty() {
			return Err(Error::invalid("must provide some sequences"));
		}

		let mut analyzer = Self::default();
		for (sequence, frequency) in sequence_frequencies {
			analyzer.add_sequence(sequence.as_ref(), *frequency)?;
		}
		Ok(analyzer)
	}

	/// Records one sequence with its frequency, including every n-gram,
	/// leading n-gram, and trailing n-gram of the sequence.
	fn add_sequence(&mut self, sequence: &str, frequency: f64) -> Result<()> {
		if frequency <= 0.0 {
			return Err(Error::invalid("sequence frequency must be greater than zero"));
		}

		let chars: Vec<char> = sequence.chars().collect();
		let len_seq = chars.len();

		*self.seq_freq.entry(sequence.to_owned()).or_insert(0.0) += frequency;
		*self.seq_len_freq.entry(len_seq).or_insert(0.0) += frequency;

		for len_ngram in 1..=len_seq {
			let leading: String = chars[..len_ngram].iter().collect();
			*self.freq_leading.entry(len_ngram).or_default().entry(leading).or_insert(0.0) += frequency;
			*self.total_freq_leading.entry(len_ngram).or_insert(0.0) += frequency;

			let trailing: String = chars[len_seq - len_ngram..].iter().collect();
			*self.freq_trailing.entry(len_ngram).or_default().entry(trailing).or_insert(0.0) += frequency;
			*self.total_freq_trailing.entry(len_ngram).or_insert(0.0) += frequency;

			for window in chars.windows(len_ngram) {
				let ngram: String = window.iter().collect();
				*self.freq.entry(len_ngram).or_default().entry(ngram).or_insert(0.0) += frequency;
				*self.total_freq.entry(len_ngram).or_insert(0.0) += frequency;
			}
		}
		Ok(())
	}

	/// All n-grams of some length between two frequency percentiles.
	///
	/// Bounds are percentiles such that `0 <= lower <= upper <= 100`.
	///
	/// # Errors
	/// Returns `InvalidInput` for bounds outside that range.
	pub fn ngrams(&self, length: usize, lower_bound: f64, upper_bound: f64) -> Result<Vec<String>> {
		percentile_window(
			self.freq.get(&length),
			self.total_freq.get(&length).copied().unwrap_or(0.0),
			lower_bound,
			upper_bound,
		)
	}

	/// All leading n-grams of some length between two frequency percentiles.
	pub fn ngrams_leading(&self, length: usize, lower_bound: f64, upper_bound: f64) -> Result<Vec<String>> {
		percentile_window(
			self.freq_leading.get(&length),
			self.total_freq_leading.get(&length).copied().unwrap_or(0.0),
			lower_bound,
			upper_bound,
		)
	}

	/// All trailing n-grams of some length between two frequency percentiles.
	pub fn ngrams_trailing(&self, length: usize, lower_bound: f64, upper_bound: f64) -> Result<Vec<String>> {
		percentile_window(
			self.freq_trailing.get(&length),
			self.total_freq_trailing.get(&length).copied().unwrap_or(0.0),
			lower_bound,
			upper_bound,
		)
	}

	/// Sequence length to total frequency of sequences of that length.
	pub fn sequence_length_frequencies(&self) -> &HashMap<usize, f64> {
		&self.seq_len_freq
	}

	/// The original sequences used when creating the analyzer.
	pub fn sequences(&self) -> impl Iterator<Item = &str> {
		self.seq_freq.keys().map(String::as_str)
	}

	/// Sum of all added sequence frequencies.
	pub fn total_frequency(&self) -> f64 {
		self.seq_len_freq.values().sum()
	}

	/// Multiplies every recorded frequency by `factor`.
	///
	/// Percentile windows are unaffected; this only matters relative to
	/// other analyzers, when merging.
	///
	/// # Errors
	/// Returns `InvalidInput` for negative factors.
	pub fn scale(&mut self, factor: f64) -> Result<()> {
		if factor < 0.0 {
			return Err(Error::invalid("can not scale frequencies by a negative factor"));
		}

		for per_length in [&mut self.freq, &mut self.freq_leading, &mut self.freq_trailing] {
			for frequencies in per_length.values_mut() {
				for frequency in frequencies.values_mut() {
					*frequency *= factor;
				}
			}
		}
		for totals in [
			&mut self.total_freq,
			&mut self.total_freq_leading,
			&mut self.total_freq_trailing,
			&mut self.seq_len_freq,
		] {
			for frequency in totals.values_mut() {
				*frequency *= factor;
			}
		}
		for frequency in self.seq_freq.values_mut() {
			*frequency *= factor;
		}
		Ok(())
	}

	/// Merges another analyzer into this one by adding all frequencies.
	pub fn merge(&mut self, other: &Self) {
		for (mine, theirs) in [
			(&mut self.freq, &other.freq),
			(&mut self.freq_leading, &other.freq_leading),
			(&mut self.freq_trailing, &other.freq_trailing),
		] {
			for (length, frequencies) in theirs {
				let target = mine.entry(*length).or_default();
				for (ngram, frequency) in frequencies {
					*target.entry(ngram.clone()).or_insert(0.0) += frequency;
				}
			}
		}
		for (mine, theirs) in [
			(&mut self.total_freq, &other.total_freq),
			(&mut self.total_freq_leading, &other.total_freq_leading),
			(&mut self.total_freq_trailing, &other.total_freq_trailing),
			(&mut self.seq_len_freq, &other.seq_len_freq),
		] {
			for (length, frequency) in theirs {
				*mine.entry(*length).or_insert(0.0) += frequency;
			}
		}
		for (sequence, frequency) in &other.seq_freq {
			*self.seq_freq.entry(sequence.clone()).or_insert(0.0) += frequency;
		}
	}

	/// Merges analyzers after normalizing each to a total frequency of one,
	/// so every input corpus carries the same weight regardless of size.
	///
	/// The inputs are not mutated.
	///
	/// # Errors
	/// Returns `InvalidInput` if no analyzers are provided.
	pub fn merge_normalized(analyzers: &[Self]) -> Result<Self> {
		if analyzers.is_empty() {
			return Err(Error::invalid("must provide some analyzers to merge"));
		}

		let mut result = Self::default();
		for analyzer in analyzers {
			let mut normalized = analyzer.clone();
			let total = normalized.total_frequency();
			if total != 0.0 {
				// total is positive, scale can not fail
				normalized.scale(1.0 / total).unwrap();
			}
			result.merge(&normalized);
		}
		Ok(result)
	}

	/// Loads an analyzer from a corpus file, using a binary cache when one
	/// exists next to the corpus.
	///
	/// On a cache miss the corpus is parsed, partial analyzers are built in
	/// parallel over line chunks and merged, and the result is serialized
	/// with `postcard` for fast loading next time.
	pub fn from_corpus_file<P: AsRef<Path>>(
		filepath: P,
		format: &CorpusFormat,
	) -> std::result::Result<Self, Box<dyn std::error::Error>> {
		let binary_data_path = build_output_path(&filepath, "bin")?;
		if binary_data_path.exists() {
			debug!("loading cached analyzer for {}", get_filename(&filepath)?);
			let bytes = std::fs::read(binary_data_path)?;
			return Ok(postcard::from_bytes(&bytes)?);
		}
		Self::read_corpus_file(filepath, binary_data_path, format)
	}

	/// Parses a corpus file, builds partial analyzers in parallel, merges
	/// them, and caches the merged result.
	fn read_corpus_file<PF, PB>(
		filepath: PF,
		binary_data_path: PB,
		format: &CorpusFormat,
	) -> std::result::Result<Self, Box<dyn std::error::Error>>
	where
		PF: AsRef<Path>,
		PB: AsRef<Path>,
	{
		let contents = read_to_string(&filepath)?;
		let sequence_frequencies = format.parse(&contents)?;
		if sequence_frequencies.is_empty() {
			return Err(format!("file {} provided no data", get_filename(&filepath)?).into());
		}

		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = (sequence_frequencies.len() + chunks - 1) / chunks;

		let (tx, rx) = mpsc::channel();
		for chunk in sequence_frequencies.chunks(chunk_size) {
			let tx = tx.clone();
			let chunk: Vec<(String, f64)> = chunk.to_vec();

			thread::spawn(move || {
				// frequencies were validated during parsing
				let partial = SequenceAnalyzer::new(&chunk).expect("chunk frequencies already validated");
				tx.send(partial).expect("Failed to send from thread");
			});
		}
		drop(tx);

		let mut analyzer = Self::default();
		for partial in rx.iter() {
			analyzer.merge(&partial);
		}

		let bytes = postcard::to_stdvec(&analyzer)?;
		std::fs::write(binary_data_path, bytes)?;
		debug!("cached analyzer for {}", get_filename(&filepath)?);

		Ok(analyzer)
	}
}

/// How a corpus file is split into sequences and frequencies.
///
/// The sequence delimiter is a regex splitting the file into sequences.
/// If the file carries frequencies, a grouping regex with two capture
/// groups must be provided: the first group is the sequence, the second its
/// frequency. Sequences the grouping does not match are skipped.
///
/// E.g. a name list like "Smith:2376207" per line parses with a delimiter
/// of `\n` and a grouping of `(.+):(\d+)`.
#[derive(Debug, Clone)]
pub struct CorpusFormat {
	pub sequence_delimiter: String,
	pub frequency_grouping: Option<String>,
}

impl Default for CorpusFormat {
	fn default() -> Self {
		Self { sequence_delimiter: r"\n".to_owned(), frequency_grouping: None }
	}
}

impl CorpusFormat {
	/// Splits raw corpus contents into `(sequence, frequency)` pairs.
	fn parse(&self, contents: &str) -> std::result::Result<Vec<(String, f64)>, Box<dyn std::error::Error>> {
		let delimiter = Regex::new(&self.sequence_delimiter)?;
		let grouping = match &self.frequency_grouping {
			Some(pattern) => Some(Regex::new(pattern)?),
			None => None,
		};

		let mut result = Vec::new();
		for sequence in delimiter.split(contents) {
			if sequence.is_empty() {
				continue;
			}
			match &grouping {
				None => result.push((sequence.to_owned(), 1.0)),
				Some(grouping) => {
					// sequences that don't match the frequency pattern are skipped
					let Some(captures) = grouping.captures(sequence) else { continue };
					let sequence = captures.get(1).map(|m| m.as_str().to_owned()).unwrap_or_default();
					let frequency: f64 = captures.get(2).map(|m| m.as_str()).unwrap_or("").parse()?;
					if frequency > 0.0 {
						result.push((sequence, frequency));
					}
				}
			}
		}
		Ok(result)
	}
}

/// n-grams whose cumulative frequency percentile falls inside the window.
///
/// n-grams are walked in ascending frequency order (ties broken
/// lexicographically so results are deterministic) while tracking the
/// cumulative percentile. An n-gram is kept once the percentile reaches the
/// lower bound, and until it leaves the upper bound; the first n-gram past
/// the lower bound is always kept, even when it also passes the upper bound.
fn percentile_window(
	frequencies: Option<&HashMap<String, f64>>,
	total_frequency: f64,
	lower_bound: f64,
	upper_bound: f64,
) -> Result<Vec<String>> {
	if !(0.0 <= lower_bound && lower_bound <= upper_bound && upper_bound <= 100.0) {
		return Err(Error::invalid("bounds must be 0 <= lower <= upper <= 100"));
	}

	let mut result = Vec::new();
	let (Some(frequencies), true) = (frequencies, total_frequency > 0.0) else {
		return Ok(result);
	};

	let mut entries: Vec<(&String, f64)> = frequencies.iter().map(|(ngram, freq)| (ngram, *freq)).collect();
	entries.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));

	let mut cumulative = 0.0;
	let mut passed_lower = false;
	for (ngram, frequency) in entries {
		cumulative += frequency;
		let percentile = (100.0 * cumulative / total_frequency).round();
		if lower_bound <= percentile && (percentile <= upper_bound || !passed_lower) {
			passed_lower = true;
			result.push(ngram.clone());
		}
	}
	Ok(result)
}
