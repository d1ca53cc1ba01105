//! Implicit-graph machinery for overlapping n-grams.
//!
//! n-grams are treated as vertices of a directed graph that is never
//! materialized: edges exist between two n-grams that "overlap as much as
//! possible", and are discovered through precomputed prefix/suffix lookups.
//!
//! The module provides:
//! - An edge lookup seam (`DirectedEdges`)
//! - The overlap-edge index (`OverlapIndex`)
//! - The bidirectional-reachability graph (`ReachabilityGraph`)
//! - Random and exhaustive path production (`random_path`, `AllPaths`)

use std::collections::HashSet;
use std::hash::Hash;

/// Directed edge lookup between two sets of vertices.
///
/// This is the seam between the reachability graph and the underlying edge
/// representation. The production implementation is `OverlapIndex`; tests
/// drive the graph with a plain adjacency map instead.
///
/// # Invariants
/// An implementation must list every edge in both directions: for every
/// vertex `e` in `successors(s)`, `s` must be in `predecessors(e)`.
pub trait DirectedEdges {
	type Vertex: Clone + Eq + Hash;

	/// All vertices with an edge coming from `vertex`.
	fn successors(&self, vertex: &Self::Vertex) -> HashSet<Self::Vertex>;

	/// All vertices with an edge going to `vertex`.
	fn predecessors(&self, vertex: &Self::Vertex) -> HashSet<Self::Vertex>;
}

/// Overlap-edge index over two n-gram pools.
pub mod overlap_index;

#[cfg(test)]
pub(crate) mod test_graph {
	use std::collections::{HashMap, HashSet};

	use super::DirectedEdges;

	/// Adjacency-map edge lookup, only used for testing the graph layer.
	pub(crate) struct DirectedGraph {
		forward: HashMap<u32, HashSet<u32>>,
		backward: HashMap<u32, HashSet<u32>>,
	}

	impl DirectedGraph {
		pub(crate) fn new() -> Self {
			Self { forward: HashMap::new(), backward: HashMap::new() }
		}

		pub(crate) fn add_edge(&mut self, start: u32, end: u32) {
			self.forward.entry(start).or_default().insert(end);
			self.backward.entry(end).or_default().insert(start);
		}
	}

	impl DirectedEdges for DirectedGraph {
		type Vertex = u32;

		fn successors(&self, vertex: &u32) -> HashSet<u32> {
			self.forward.get(vertex).cloned().unwrap_or_default()
		}

		fn predecessors(&self, vertex: &u32) -> HashSet<u32> {
			self.backward.get(vertex).cloned().unwrap_or_default()
		}
	}
}

/// Step-set construction and connectivity.
pub mod reachability;

/// Random sampling and exhaustive enumeration of paths.
pub mod paths;
