//! Working graph built from raw elements and connections.
//!
//! Nodes and links are stored in flat arenas; links refer to their endpoints by
//! arena index, resolved once here from the raw `from`/`to` ids. Elements that
//! take part in no connection are dropped.

use std::collections::{HashMap, HashSet};

use log::{debug, info, warn};

use super::category::{ConnectionCategory, ElementCategory, LinkDirection};
use super::error::Result;
use super::geometry::clamp_curvature;
use super::types::{RawConnection, RawElement, RawGraph};

/// Static data of a node. Positions live in the simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: String,
	pub label: String,
	pub category: ElementCategory,
	/// Visual radius, derived from the category.
	pub radius: f64,
	pub description: Option<String>,
	pub tags: Vec<String>,
}

/// A connection between two nodes of the same [`Graph`].
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
	pub id: String,
	/// Index of the source node in [`Graph::nodes`].
	pub source: usize,
	/// Index of the target node in [`Graph::nodes`].
	pub target: usize,
	pub category: ConnectionCategory,
	pub direction: LinkDirection,
	pub reversed: bool,
	pub delayed: bool,
	pub label: Option<String>,
	/// Clamped curvature when the connection is drawn curved.
	pub curvature: Option<f64>,
}

/// Node and link arenas plus lookup tables.
#[derive(Clone, Debug, Default)]
pub struct Graph {
	pub nodes: Vec<Node>,
	pub links: Vec<Link>,
	node_index: HashMap<String, usize>,
	link_index: HashMap<String, usize>,
	/// Undirected one-hop neighbors of every node, without duplicates.
	neighbors: Vec<Vec<usize>>,
	/// Number of link ends attached to every node (self loops count twice).
	degree: Vec<usize>,
}

impl Graph {
	pub fn node_index(&self, id: &str) -> Option<usize> {
		self.node_index.get(id).copied()
	}

	pub fn link_index(&self, id: &str) -> Option<usize> {
		self.link_index.get(id).copied()
	}

	pub fn node(&self, id: &str) -> Option<&Node> {
		self.node_index(id).map(|index| &self.nodes[index])
	}

	pub fn link(&self, id: &str) -> Option<&Link> {
		self.link_index(id).map(|index| &self.links[index])
	}

	pub fn neighbors(&self, index: usize) -> &[usize] {
		self.neighbors.get(index).map(Vec::as_slice).unwrap_or(&[])
	}

	pub fn degree(&self, index: usize) -> usize {
		self.degree.get(index).copied().unwrap_or(0)
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

/// Counters describing what the builder had to discard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildDiagnostics {
	/// Elements never referenced by a connection.
	pub isolated_elements: usize,
	/// Repeated element ids (the first occurrence is kept).
	pub duplicate_elements: usize,
	/// Connections whose endpoints did not resolve to a kept node.
	pub dropped_links: usize,
	/// Connections whose id was already taken; they receive a fresh id.
	pub renamed_links: usize,
}

/// Result of a graph build.
#[derive(Clone, Debug, Default)]
pub struct BuildOutput {
	pub graph: Graph,
	pub diagnostics: BuildDiagnostics,
}

/// Turns raw data into a [`Graph`].
pub struct GraphBuilder;

impl GraphBuilder {
	/// Parse and build in one step. Fails only when the document itself is
	/// malformed; inconsistent connections are dropped and counted.
	pub fn from_json(text: &str) -> Result<BuildOutput> {
		let raw = RawGraph::from_json(text)?;
		Ok(Self::build(&raw))
	}

	pub fn build(raw: &RawGraph) -> BuildOutput {
		let mut diagnostics = BuildDiagnostics::default();

		let referenced: HashSet<&str> = raw
			.connections
			.iter()
			.flat_map(|conn| [conn.from.as_str(), conn.to.as_str()])
			.collect();

		let mut nodes = Vec::new();
		let mut node_index = HashMap::new();
		for element in &raw.elements {
			if !referenced.contains(element.id.as_str()) {
				diagnostics.isolated_elements += 1;
				continue;
			}
			if node_index.contains_key(&element.id) {
				diagnostics.duplicate_elements += 1;
				continue;
			}
			node_index.insert(element.id.clone(), nodes.len());
			nodes.push(make_node(element));
		}

		let mut links = Vec::with_capacity(raw.connections.len());
		let mut link_index = HashMap::with_capacity(raw.connections.len());
		for (position, conn) in raw.connections.iter().enumerate() {
			let (Some(&source), Some(&target)) =
				(node_index.get(&conn.from), node_index.get(&conn.to))
			else {
				debug!(
					"evidence-map: dropping connection {} -> {} (unknown endpoint)",
					conn.from, conn.to
				);
				diagnostics.dropped_links += 1;
				continue;
			};

			let mut id = conn
				.id
				.clone()
				.filter(|id| !id.is_empty())
				.unwrap_or_else(|| format!("link-{position}"));
			if link_index.contains_key(&id) {
				diagnostics.renamed_links += 1;
				id = format!("{id}#{position}");
			}

			link_index.insert(id.clone(), links.len());
			links.push(make_link(id, source, target, conn));
		}

		let mut neighbors = vec![Vec::new(); nodes.len()];
		let mut degree = vec![0usize; nodes.len()];
		for link in &links {
			degree[link.source] += 1;
			degree[link.target] += 1;
			if link.source != link.target {
				neighbors[link.source].push(link.target);
				neighbors[link.target].push(link.source);
			}
		}
		for list in &mut neighbors {
			list.sort_unstable();
			list.dedup();
		}

		if diagnostics.dropped_links > 0 {
			warn!(
				"evidence-map: dropped {} connection(s) with unknown endpoints",
				diagnostics.dropped_links
			);
		}
		info!(
			"evidence-map: built graph with {} nodes, {} links ({} isolated elements skipped)",
			nodes.len(),
			links.len(),
			diagnostics.isolated_elements
		);

		BuildOutput {
			graph: Graph {
				nodes,
				links,
				node_index,
				link_index,
				neighbors,
				degree,
			},
			diagnostics,
		}
	}
}

fn make_node(element: &RawElement) -> Node {
	let attrs = &element.attributes;
	let category = ElementCategory::from_tag(attrs.element_type.as_deref());
	Node {
		id: element.id.clone(),
		label: attrs.label.clone().unwrap_or_default(),
		category,
		radius: category.radius(),
		description: attrs.description.clone(),
		tags: attrs.tags.clone(),
	}
}

fn make_link(id: String, source: usize, target: usize, conn: &RawConnection) -> Link {
	let attrs = &conn.attributes;
	Link {
		id,
		source,
		target,
		category: ConnectionCategory::from_tag(attrs.connection_type.as_deref()),
		direction: LinkDirection::from_tag(conn.direction.as_deref()),
		reversed: conn.reversed,
		delayed: conn.delayed,
		label: attrs.label.clone().filter(|label| !label.trim().is_empty()),
		curvature: attrs.curvature.map(clamp_curvature),
	}
}
