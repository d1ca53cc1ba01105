use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;

use seq_gen_core::sequence::analyzer::{CorpusFormat, SequenceAnalyzer};
use seq_gen_core::sequence::text_generator::{TextGenerator, parse_bounds};

/// Every window of a text, of the given length.
fn windows(text: &str, length: usize) -> Vec<String> {
	let chars: Vec<char> = text.chars().collect();
	chars.windows(length).map(|w| w.iter().collect()).collect()
}

#[test]
fn corpus_file_to_generated_words() {
	let dir = tempfile::tempdir().unwrap();
	let corpus_path = dir.path().join("names.txt");
	std::fs::write(
		&corpus_path,
		"Smith:2376207\nJohnson:1857160\nWilliams:1534042\nBrown:1380145\nJones:1362755\n",
	)
	.unwrap();

	let format = CorpusFormat {
		sequence_delimiter: r"\n".to_owned(),
		frequency_grouping: Some(r"(.+):(\d+)".to_owned()),
	};
	let analyzer = SequenceAnalyzer::from_corpus_file(&corpus_path, &format).unwrap();
	assert_eq!(analyzer.sequences().count(), 5);

	let bounds = parse_bounds(&["2:0,100"]).unwrap();
	let generator = TextGenerator::new(&bounds, &analyzer).unwrap();
	assert!(!generator.is_empty());

	// every produced text has a training-data length and is stitched
	// entirely from training-data 2-grams
	let allowed_lengths: HashSet<usize> = analyzer.sequence_length_frequencies().keys().copied().collect();
	let allowed_2grams: HashSet<String> = analyzer.ngrams(2, 0.0, 100.0).unwrap().into_iter().collect();

	let all: HashSet<String> = generator.all_texts(false).collect();
	assert!(!all.is_empty());
	for text in &all {
		assert!(allowed_lengths.contains(&text.chars().count()), "bad length for {}", text);
		for window in windows(text, 2) {
			assert!(allowed_2grams.contains(&window), "{} not in training data for {}", window, text);
		}
	}

	// random generation stays inside the enumerable set
	let mut rng = StdRng::seed_from_u64(99);
	for text in generator.random_texts(200, false, &mut rng) {
		assert!(all.contains(&text), "unexpected text {}", text);
	}

	// every training word of a generatable length is itself producible
	for word in ["Smith", "Jones", "Brown"] {
		assert!(all.contains(word), "{} should be producible", word);
	}
	let unique: HashSet<String> = generator.all_texts(true).collect();
	assert!(!unique.contains("Smith"));

	// the cached reload behaves like the first load
	assert!(dir.path().join("names.bin").exists());
	let cached = SequenceAnalyzer::from_corpus_file(&corpus_path, &format).unwrap();
	let cached_generator = TextGenerator::new(&bounds, &cached).unwrap();
	assert_eq!(cached_generator.all_texts(false).collect::<HashSet<_>>(), all);
}

#[test]
fn merged_corpora_generate_from_both() {
	let first = SequenceAnalyzer::new(&[("abcd", 7.0)]).unwrap();
	let second = SequenceAnalyzer::new(&[("wxyz", 1.0)]).unwrap();
	let merged = SequenceAnalyzer::merge_normalized(&[first, second]).unwrap();

	let bounds = parse_bounds(&["2:0,100"]).unwrap();
	let generator = TextGenerator::new(&bounds, &merged).unwrap();

	let all: HashSet<String> = generator.all_texts(false).collect();
	assert!(all.contains("abcd"));
	assert!(all.contains("wxyz"));
}

#[test]
fn narrow_bounds_can_select_nothing() {
	let analyzer = SequenceAnalyzer::new(&[("ab", 1.0), ("bc", 1.0), ("cd", 1.0)]).unwrap();

	// a window reaching no n-grams gives an empty generator, not an error
	let bounds = parse_bounds(&["9:0,100"]).unwrap();
	let generator = TextGenerator::new(&bounds, &analyzer).unwrap();
	assert!(generator.is_empty());
	assert_eq!(generator.all_texts(false).count(), 0);

	let mut rng = StdRng::seed_from_u64(0);
	assert!(generator.random_texts(5, false, &mut rng).is_empty());
}
