//! n-gram overlap-graph sequence generation library.
//!
//! This crate creates new sequences that resemble training data by chaining
//! n-grams that overlap as much as possible:
//! - Overlap-edge indexing and fixed-length path finding over an implicit
//!   graph of n-grams
//! - Frequency analysis of training sequences with percentile-based n-gram
//!   selection
//! - Random and exhaustive sequence creation, per length or weighted by the
//!   training data's length distribution
//!
//! The graph layer is generic over an edge lookup so it can be driven by
//! other vertex types than n-grams.

/// Error and result types shared across the crate.
pub mod error;

/// Implicit-graph machinery: overlap edges, reachability, path finding.
pub mod graph;

/// Sequence analysis and creation on top of the graph layer.
pub mod sequence;

/// I/O utilities (file loading, path helpers).
pub mod io;
