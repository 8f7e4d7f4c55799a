//! Layered top-to-bottom placement for graphs nobody has arranged yet.
//!
//! Steps: drop a feedback arc set, rank by longest path over a topological
//! order, order each rank by barycenter sweeps, then assign row/column
//! coordinates.

use std::collections::HashMap;

use log::{debug, warn};
use petgraph::Direction;
use petgraph::algo::{greedy_feedback_arc_set, toposort};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;

use crate::model::{CaseGraph, NODE_HEIGHT, NODE_WIDTH};

/// Person indices as node weights; at most one edge per unordered pair.
type PersonGraph = StableDiGraph<usize, ()>;

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutOptions {
	/// Horizontal gap between boxes in the same rank.
	pub node_sep: f64,
	/// Vertical gap between ranks.
	pub rank_sep: f64,
	pub margin: f64,
	pub sweeps: usize,
}

impl Default for LayoutOptions {
	fn default() -> Self {
		Self {
			node_sep: 60.0,
			rank_sep: 80.0,
			margin: 40.0,
			sweeps: 4,
		}
	}
}

/// True when the graph has at least two persons, all still on their default grid slots.
pub fn needs_auto_layout(graph: &CaseGraph) -> bool {
	graph.persons.len() >= 2 && graph.has_default_layout()
}

/// Runs [`layered_layout`] when [`needs_auto_layout`] holds. Returns whether it ran.
pub fn apply_auto_layout(graph: &mut CaseGraph, opts: &LayoutOptions) -> bool {
	if !needs_auto_layout(graph) {
		return false;
	}
	layered_layout(graph, opts);
	true
}

fn person_graph(graph: &CaseGraph) -> PersonGraph {
	let mut g = PersonGraph::with_capacity(graph.persons.len(), graph.relationships.len());
	let index: HashMap<&str, NodeIndex> = graph
		.persons
		.iter()
		.enumerate()
		.map(|(i, p)| (p.id.as_str(), g.add_node(i)))
		.collect();
	for rel in &graph.relationships {
		let (Some(&s), Some(&t)) = (
			index.get(rel.source_id.as_str()),
			index.get(rel.target_id.as_str()),
		) else {
			continue;
		};
		if s == t || g.find_edge(s, t).is_some() || g.find_edge(t, s).is_some() {
			continue;
		}
		g.add_edge(s, t, ());
	}
	g
}

/// Repositions every person. Edge direction only seeds the ranking.
pub fn layered_layout(graph: &mut CaseGraph, opts: &LayoutOptions) {
	let n = graph.persons.len();
	if n == 0 {
		return;
	}
	let full = person_graph(graph);
	let ranks = longest_path_ranks(&full);
	let layers = order_layers(&full, &ranks, opts.sweeps);

	let row_width = |len: usize| len as f64 * NODE_WIDTH + len.saturating_sub(1) as f64 * opts.node_sep;
	let widest = layers.iter().map(|l| row_width(l.len())).fold(0.0, f64::max);
	for (rank, layer) in layers.iter().enumerate() {
		let left = opts.margin + (widest - row_width(layer.len())) / 2.0;
		let y = opts.margin + rank as f64 * (NODE_HEIGHT + opts.rank_sep);
		for (slot, &v) in layer.iter().enumerate() {
			let person = &mut graph.persons[full[v]];
			person.x = left + slot as f64 * (NODE_WIDTH + opts.node_sep);
			person.y = y;
		}
	}
	debug!("laid out {n} person(s) in {} rank(s)", layers.len());
}

/// Rank 0 for sources; every edge left after cycle removal points at least one rank down.
fn longest_path_ranks(full: &PersonGraph) -> HashMap<NodeIndex, usize> {
	let mut dag = full.clone();
	let feedback: Vec<_> = greedy_feedback_arc_set(&dag).map(|e| e.id()).collect();
	for edge in feedback {
		dag.remove_edge(edge);
	}

	let mut ranks: HashMap<NodeIndex, usize> = dag.node_indices().map(|v| (v, 0)).collect();
	let order = match toposort(&dag, None) {
		Ok(order) => order,
		Err(cycle) => {
			warn!("cycle left at person {} after arc removal", dag[cycle.node_id()]);
			return ranks;
		}
	};
	for v in order {
		let next = ranks[&v] + 1;
		for w in dag.neighbors_directed(v, Direction::Outgoing) {
			let rank = ranks.entry(w).or_default();
			*rank = (*rank).max(next);
		}
	}
	ranks
}

fn order_layers(full: &PersonGraph, ranks: &HashMap<NodeIndex, usize>, sweeps: usize) -> Vec<Vec<NodeIndex>> {
	let depth = ranks.values().copied().max().map_or(0, |r| r + 1);
	let mut layers = vec![Vec::new(); depth];
	for v in full.node_indices() {
		layers[ranks[&v]].push(v);
	}

	let mut slot: HashMap<NodeIndex, usize> = HashMap::new();
	let renumber = |layers: &[Vec<NodeIndex>], slot: &mut HashMap<NodeIndex, usize>| {
		for layer in layers {
			for (i, &v) in layer.iter().enumerate() {
				slot.insert(v, i);
			}
		}
	};
	renumber(&layers, &mut slot);

	for sweep in 0..sweeps {
		let down = sweep % 2 == 0;
		let order: Vec<usize> = if down {
			(1..depth).collect()
		} else {
			(0..depth.saturating_sub(1)).rev().collect()
		};
		for r in order {
			let fixed = if down { r - 1 } else { r + 1 };
			let mut keyed: Vec<(f64, NodeIndex)> = layers[r]
				.iter()
				.map(|&v| {
					let adjacent: Vec<f64> = full
						.neighbors_undirected(v)
						.filter(|u| ranks[u] == fixed)
						.map(|u| slot[&u] as f64)
						.collect();
					let key = if adjacent.is_empty() {
						slot[&v] as f64
					} else {
						adjacent.iter().sum::<f64>() / adjacent.len() as f64
					};
					(key, v)
				})
				.collect();
			keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
			layers[r] = keyed.into_iter().map(|(_, v)| v).collect();
			renumber(&layers, &mut slot);
		}
	}
	layers
}
