//! Hover, selection and drag state.
//!
//! The three axes are independent: hovering never touches the selection and a
//! drag never changes what is hovered. Every entry point takes ids as delivered
//! by the UI and tolerates ids that no longer exist in the current graph.

use std::collections::HashSet;

use log::debug;

use super::geometry::Point;
use super::graph::Graph;
use super::simulation::ForceSimulation;

/// What the pointer is over, as arena indices into the current graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoverTarget {
	Node(usize),
	Link(usize),
}

/// Visual state of a node or link derived from the hover.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FocusState {
	/// No hover in effect.
	#[default]
	Normal,
	/// Part of the hovered neighborhood.
	Active,
	Dimmed,
}

/// Seconds-scale speed of the dim transition; about 0.3s to settle.
const FOCUS_SPEED: f64 = 10.0;

/// Hover, selection and drag state for one graph, by arena index.
///
/// Also tracks `focus`, the eased strength of the hover dimming.
#[derive(Clone, Debug, Default)]
pub struct InteractionController {
	hovered: Option<HoverTarget>,
	selected: Option<usize>,
	dragging: Option<usize>,
	/// Connected set of the current hover, or of the last one while it fades out.
	connected: HashSet<usize>,
	/// 0 = everything at full visibility, 1 = dimming fully applied.
	focus: f64,
}

impl InteractionController {
	/// Hover a node; its neighbors join the connected set.
	pub fn hover_node(&mut self, graph: &Graph, id: &str) -> bool {
		let Some(index) = graph.node_index(id) else {
			debug!("evidence-map: hover on unknown node {id}");
			return false;
		};
		self.hovered = Some(HoverTarget::Node(index));
		self.connected.clear();
		self.connected.insert(index);
		self.connected.extend(graph.neighbors(index).iter().copied());
		true
	}

	/// Hover a link; only its two endpoints are connected.
	pub fn hover_link(&mut self, graph: &Graph, id: &str) -> bool {
		let Some(index) = graph.link_index(id) else {
			debug!("evidence-map: hover on unknown link {id}");
			return false;
		};
		let link = &graph.links[index];
		self.hovered = Some(HoverTarget::Link(index));
		self.connected.clear();
		self.connected.insert(link.source);
		self.connected.insert(link.target);
		true
	}

	/// Drop the hover. The connected set is kept so dimming can fade out.
	pub fn clear_hover(&mut self) {
		self.hovered = None;
	}

	/// Toggle the selection of a link.
	pub fn select_link(&mut self, graph: &Graph, id: &str) -> bool {
		let Some(index) = graph.link_index(id) else {
			debug!("evidence-map: select on unknown link {id}");
			return false;
		};
		self.selected = if self.selected == Some(index) {
			None
		} else {
			Some(index)
		};
		true
	}

	pub fn clear_selection(&mut self) {
		self.selected = None;
	}

	/// Pin the node where it is and keep the layout warm while it moves.
	///
	/// Only one node is dragged at a time; starting a drag releases any node
	/// still held by an earlier one.
	pub fn drag_start(&mut self, graph: &Graph, sim: &mut ForceSimulation, id: &str) -> bool {
		let Some(index) = graph.node_index(id) else {
			debug!("evidence-map: drag start on unknown node {id}");
			return false;
		};
		let Some(position) = sim.position(index) else {
			return false;
		};
		if let Some(previous) = self.dragging.take() {
			if previous != index {
				debug!("evidence-map: drag start while another node is held, releasing it");
				sim.unpin(previous);
			}
		}
		if !sim.pin(index, position) {
			return false;
		}
		self.dragging = Some(index);
		sim.set_alpha_target(sim.config().drag_alpha_target);
		sim.restart();
		true
	}

	/// Move the dragged node. The new position is visible in the next snapshot.
	pub fn drag_move(
		&mut self,
		graph: &Graph,
		sim: &mut ForceSimulation,
		id: &str,
		x: f64,
		y: f64,
	) -> bool {
		match graph.node_index(id) {
			Some(index) if self.dragging == Some(index) => sim.pin(index, Point::new(x, y)),
			_ => {
				debug!("evidence-map: drag move on node {id} that is not being dragged");
				false
			}
		}
	}

	/// Release the dragged node and let the layout cool down again.
	pub fn drag_end(&mut self, graph: &Graph, sim: &mut ForceSimulation, id: &str) -> bool {
		match graph.node_index(id) {
			Some(index) if self.dragging == Some(index) => {
				sim.unpin(index);
				sim.set_alpha_target(0.0);
				self.dragging = None;
				true
			}
			_ => {
				debug!("evidence-map: drag end on node {id} that is not being dragged");
				false
			}
		}
	}

	/// Ease the dim transition toward the current hover.
	pub fn tick(&mut self, dt: f64) {
		let target = if self.hovered.is_some() { 1.0 } else { 0.0 };
		let factor = 1.0 - (-FOCUS_SPEED * dt.max(0.0)).exp();
		self.focus += (target - self.focus) * factor;
		if target == 0.0 && self.focus < 0.005 {
			self.focus = 0.0;
			self.connected.clear();
		}
	}

	/// Forget everything. Used when the graph is replaced.
	pub fn reset(&mut self) {
		*self = Self::default();
	}

	pub fn hovered(&self) -> Option<HoverTarget> {
		self.hovered
	}

	pub fn hovered_node(&self) -> Option<usize> {
		match self.hovered {
			Some(HoverTarget::Node(index)) => Some(index),
			_ => None,
		}
	}

	pub fn hovered_link(&self) -> Option<usize> {
		match self.hovered {
			Some(HoverTarget::Link(index)) => Some(index),
			_ => None,
		}
	}

	pub fn selected(&self) -> Option<usize> {
		self.selected
	}

	pub fn dragging(&self) -> Option<usize> {
		self.dragging
	}

	pub fn focus(&self) -> f64 {
		self.focus
	}

	pub fn is_connected(&self, node: usize) -> bool {
		self.connected.contains(&node)
	}

	/// Focus state under the current hover only.
	pub fn node_state(&self, node: usize) -> FocusState {
		if self.hovered.is_none() {
			FocusState::Normal
		} else {
			self.classify_node(node)
		}
	}

	pub fn link_state(&self, graph: &Graph, link: usize) -> FocusState {
		if self.hovered.is_none() {
			FocusState::Normal
		} else {
			self.classify_link(graph, link)
		}
	}

	/// Like [`Self::node_state`], but keeps classifying against the last
	/// hover while the dimming fades out.
	pub fn fading_node_state(&self, node: usize) -> FocusState {
		if self.connected.is_empty() {
			FocusState::Normal
		} else {
			self.classify_node(node)
		}
	}

	pub fn fading_link_state(&self, graph: &Graph, link: usize) -> FocusState {
		if self.connected.is_empty() {
			FocusState::Normal
		} else {
			self.classify_link(graph, link)
		}
	}

	fn classify_node(&self, node: usize) -> FocusState {
		if self.connected.contains(&node) {
			FocusState::Active
		} else {
			FocusState::Dimmed
		}
	}

	fn classify_link(&self, graph: &Graph, link: usize) -> FocusState {
		match graph.links.get(link) {
			Some(link)
				if self.connected.contains(&link.source)
					&& self.connected.contains(&link.target) =>
			{
				FocusState::Active
			}
			_ => FocusState::Dimmed,
		}
	}
}
