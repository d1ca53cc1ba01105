//! Top-level module for sequence analysis and creation.
//!
//! This half of the crate turns analyzed training data into new sequences:
//! - Frequency analytics over training sequences (`SequenceAnalyzer`)
//! - Percentile-bound n-gram selection (`buckets`)
//! - Sequence creation for one target length (`SequenceAssembler`)
//! - A high-level text generation interface (`TextGenerator`)

/// Frequency analytics for training sequences.
///
/// Supports percentile-window n-gram queries, merging and rescaling, and
/// cached loading from corpus files.
pub mod analyzer;

/// Percentile-bound n-gram buckets.
///
/// Selects the n-grams of the longest bound length whose sub-n-grams also
/// satisfy the windows defined for shorter lengths.
pub mod buckets;

/// Sequence creation for one target length.
///
/// Assembles sequences by overlapping a leading n-gram, a run of middle
/// n-grams, and a trailing n-gram.
pub mod assembler;

/// High-level interface for generating texts from training data.
///
/// Exposes bounds parsing, random generation weighted by training-data
/// length frequencies, and exhaustive enumeration.
pub mod text_generator;
