use rand::Rng;
use rand::prelude::IteratorRandom;

use super::DirectedEdges;
use super::reachability::ReachabilityGraph;
use crate::error::{Error, Result};

impl<E: DirectedEdges> ReachabilityGraph<E> {
	/// Gets a random path from a start vertex to an end vertex.
	///
	/// A random step is picked first, then a random vertex in that step's
	/// set. The path is grown outward from that seed, one random neighbor at
	/// a time in each direction, until the start and end steps are reached.
	///
	/// Note that this does not sample uniformly over the full path space:
	/// the seed-then-grow procedure leans toward paths reachable from
	/// high-fan-out seeds. This is a documented characteristic of the
	/// sampling, not an accuracy guarantee.
	///
	/// # Errors
	/// Returns `Disconnected` if no path exists.
	pub fn random_path<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<E::Vertex>> {
		if self.is_disconnected() {
			return Err(Error::Disconnected);
		}

		let num_vertices = self.num_vertices();
		let mut slots: Vec<Option<E::Vertex>> = vec![None; num_vertices];

		// pick a random step and a random vertex in that step to start with
		let seed_index = rng.random_range(0..num_vertices);
		// step sets of a connected graph are never empty
		slots[seed_index] = Some(self.step_sets()[seed_index].iter().choose(rng).cloned().unwrap());

		// fill earlier steps
		for i in (1..=seed_index).rev() {
			let current = slots[i].clone().unwrap();
			let choice = self
				.edges()
				.predecessors(&current)
				.into_iter()
				.filter(|vertex| self.step_sets()[i - 1].contains(vertex))
				.choose(rng);
			// the backward sweep guarantees a predecessor in the previous step
			slots[i - 1] = Some(choice.unwrap());
		}

		// fill later steps
		for i in seed_index..num_vertices - 1 {
			let current = slots[i].clone().unwrap();
			let choice = self
				.edges()
				.successors(&current)
				.into_iter()
				.filter(|vertex| self.step_sets()[i + 1].contains(vertex))
				.choose(rng);
			// the forward sweep guarantees a successor in the next step
			slots[i + 1] = Some(choice.unwrap());
		}

		Ok(slots.into_iter().map(|slot| slot.unwrap()).collect())
	}

	/// Gets an iterator of all possible paths from a start vertex to an end
	/// vertex.
	///
	/// Paths are produced lazily by an iterative depth first search; only
	/// one path's worth of backtracking state is kept. Every call returns an
	/// independent, restarted iterator.
	///
	/// # Errors
	/// Returns `Disconnected` if no path exists.
	pub fn all_paths(&self) -> Result<AllPaths<'_, E>> {
		if self.is_disconnected() {
			return Err(Error::Disconnected);
		}
		Ok(AllPaths::new(self))
	}
}

/// Lazy depth-first enumeration of every path through a `ReachabilityGraph`.
///
/// The traversal keeps an explicit list of not-yet-visited candidate
/// vertices per step, avoiding both recursion and materializing the path
/// space. Yields each complete path as it is reached.
pub struct AllPaths<'a, E: DirectedEdges> {
	graph: &'a ReachabilityGraph<E>,
	/// Vertices chosen so far, one per descended step.
	path: Vec<E::Vertex>,
	/// Unvisited sibling vertices at each step from the root.
	pending: Vec<Vec<E::Vertex>>,
}

impl<'a, E: DirectedEdges> AllPaths<'a, E> {
	fn new(graph: &'a ReachabilityGraph<E>) -> Self {
		// start by considering all reachable start vertices
		let first_candidates: Vec<E::Vertex> = graph.step_sets()[0].iter().cloned().collect();
		Self { graph, path: Vec::new(), pending: vec![first_candidates] }
	}
}

impl<'a, E: DirectedEdges> Iterator for AllPaths<'a, E> {
	type Item = Vec<E::Vertex>;

	fn next(&mut self) -> Option<Self::Item> {
		// while there are still unvisited paths
		loop {
			let depth = self.pending.len();
			if depth == 0 {
				return None;
			}
			match self.pending[depth - 1].pop() {
				// all vertices at the current step visited, step back
				None => {
					self.pending.pop();
				}
				Some(vertex) => {
					// update the current path with the vertex
					self.path.truncate(depth - 1);
					self.path.push(vertex.clone());

					if depth == self.graph.num_vertices() {
						// leaf vertex, a complete path
						return Some(self.path.clone());
					}

					// descend with all reachable vertices connected to vertex
					let next_candidates: Vec<E::Vertex> = self
						.graph
						.edges()
						.successors(&vertex)
						.into_iter()
						.filter(|candidate| self.graph.step_sets()[depth].contains(candidate))
						.collect();
					self.pending.push(next_candidates);
				}
			}
		}
	}
}
