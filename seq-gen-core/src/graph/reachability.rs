use std::collections::HashSet;

use super::DirectedEdges;
use crate::error::{Error, Result};

/// Finds the vertices that can participate in a fixed-length path between
/// two sets of vertices, using only an edge lookup.
///
/// By working against a `DirectedEdges` implementation instead of a whole
/// (potentially exponential) graph, memory stays bounded by the vertex pools
/// while paths between two sets of vertices can still be found.
///
/// A `ReachabilityGraph` is created on a per number-of-vertices basis: to
/// find paths of different lengths, multiple graphs must be created. Since
/// the number of vertices is fixed, the distance from the start set is
/// referred to as a step: all start vertices are at step 0, their neighbors
/// at step 1, and so on.
///
/// # Responsibilities
/// - Build the per-step sets of vertices reachable from both ends
/// - Record whether the start and end sets are disconnected
///
/// # Invariants
/// - After construction of a connected graph, every vertex at step `i` has
///   at least one edge from step `i - 1` and at least one edge to step
///   `i + 1`. This is necessary but not sufficient for lying on a complete
///   path, so traversals re-check step membership at every move.
#[derive(Debug)]
pub struct ReachabilityGraph<E: DirectedEdges> {
	/// Edge lookup shared by construction and traversal.
	edges: E,
	/// Number of path positions, including start and end.
	num_vertices: usize,
	/// One set of mutually reachable vertices per step.
	step_sets: Vec<HashSet<E::Vertex>>,
	/// True if no path exists from the start set to the end set.
	disconnected: bool,
}

impl<E: DirectedEdges> ReachabilityGraph<E> {
	/// Builds the step sets between `start_vertices` and `end_vertices`.
	///
	/// # Parameters
	/// - `start_vertices`: every found path starts with one of these.
	/// - `end_vertices`: every found path ends with one of these.
	/// - `num_vertices`: exact number of vertices per path, >= 2.
	/// - `edges`: the edge lookup. Note the importance of edges being listed
	///   in both directions, see `DirectedEdges`.
	///
	/// # Errors
	/// Returns `InvalidInput` if either vertex set is empty or
	/// `num_vertices < 2`. A disconnected graph is not an error here; it is
	/// recorded and surfaced when a path is requested.
	pub fn new(
		start_vertices: HashSet<E::Vertex>,
		end_vertices: HashSet<E::Vertex>,
		num_vertices: usize,
		edges: E,
	) -> Result<Self> {
		if start_vertices.is_empty() {
			return Err(Error::invalid("set of start vertices must be non empty"));
		}
		if end_vertices.is_empty() {
			return Err(Error::invalid("set of end vertices must be non empty"));
		}
		if num_vertices < 2 {
			return Err(Error::invalid("number of connected vertices must be greater than one"));
		}

		let mut graph = Self {
			edges,
			num_vertices,
			step_sets: vec![HashSet::new(); num_vertices],
			disconnected: false,
		};
		graph.step_sets[0] = start_vertices;
		graph.step_sets[num_vertices - 1] = end_vertices;
		graph.build_step_sets();
		Ok(graph)
	}

	/// If no path exists between the start and end vertices, the graph is
	/// disconnected.
	pub fn is_disconnected(&self) -> bool {
		self.disconnected
	}

	/// The per-step sets of mutually reachable vertices.
	///
	/// Only meaningful when the graph is connected; after an early
	/// disconnection the later sets are unfilled.
	pub fn step_sets(&self) -> &[HashSet<E::Vertex>] {
		&self.step_sets
	}

	pub(crate) fn num_vertices(&self) -> usize {
		self.num_vertices
	}

	pub(crate) fn edges(&self) -> &E {
		&self.edges
	}

	/// Populates the intermediate step sets and prunes them down to the
	/// vertices reachable from both ends.
	///
	/// One tree is grown from each end, always expanding the smaller of the
	/// two frontiers so the work is bounded by the meeting point rather than
	/// by the number of steps. Once the frontiers meet, a forward and a
	/// backward intersection sweep remove the vertices that only one of the
	/// trees can reach.
	fn build_step_sets(&mut self) {
		let mut earlier_index = 0;
		let mut later_index = self.num_vertices - 1;

		// grow the two frontiers toward each other
		while earlier_index < later_index - 1 {
			let new_set = if self.step_sets[earlier_index].len() < self.step_sets[later_index].len() {
				let expanded = expand(&self.edges, &self.step_sets[earlier_index], Direction::Forward);
				earlier_index += 1;
				self.step_sets[earlier_index] = expanded;
				&self.step_sets[earlier_index]
			} else {
				let expanded = expand(&self.edges, &self.step_sets[later_index], Direction::Backward);
				later_index -= 1;
				self.step_sets[later_index] = expanded;
				&self.step_sets[later_index]
			};

			// no new vertices means no path
			if new_set.is_empty() {
				self.disconnected = true;
				return;
			}
		}

		// forward sweep: keep only vertices with an edge from the previous step
		for i in earlier_index..self.num_vertices - 1 {
			let expanded = expand(&self.edges, &self.step_sets[i], Direction::Forward);
			self.step_sets[i + 1].retain(|vertex| expanded.contains(vertex));
			if self.step_sets[i + 1].is_empty() {
				self.disconnected = true;
				return;
			}
		}

		// backward sweep: keep only vertices with an edge to the next step
		for i in (1..=later_index).rev() {
			let expanded = expand(&self.edges, &self.step_sets[i], Direction::Backward);
			self.step_sets[i - 1].retain(|vertex| expanded.contains(vertex));
			if self.step_sets[i - 1].is_empty() {
				self.disconnected = true;
				return;
			}
		}
	}
}

enum Direction {
	Forward,
	Backward,
}

/// Union of the neighbor sets of every vertex in `set`.
fn expand<E: DirectedEdges>(edges: &E, set: &HashSet<E::Vertex>, direction: Direction) -> HashSet<E::Vertex> {
	set.iter()
		.flat_map(|vertex| match direction {
			Direction::Forward => edges.successors(vertex),
			Direction::Backward => edges.predecessors(vertex),
		})
		.collect()
}
