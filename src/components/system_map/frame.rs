//! Per-frame render output.
//!
//! A [`RenderFrame`] is everything a painter needs for one frame, in world
//! coordinates: resolved node circles, routed link paths with their stroke
//! styling, and link label placements. It is rebuilt from scratch every frame
//! out of the graph, a simulation snapshot and the interaction state.

use super::category::LinkDirection;
use super::geometry::Point;
use super::graph::{Graph, Link};
use super::interaction::{FocusState, InteractionController};
use super::routing::{EdgePath, Endpoint, route, route_curved};
use super::simulation::Snapshot;
use super::theme::{Color, Theme};

/// Extra weight given to a node or link the user is pointing at or selected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StrokeEmphasis {
	#[default]
	Normal,
	Hovered,
	Selected,
}

/// One node circle and its label.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeVisual {
	pub id: String,
	pub label: String,
	/// Center, in world coordinates.
	pub position: Point,
	/// Drawn radius, already scaled for hover.
	pub radius: f64,
	pub fill: Color,
	/// Overall opacity after hover dimming.
	pub opacity: f64,
	pub emphasis: StrokeEmphasis,
	pub font_size: f64,
	/// Horizontal distance from the center to the start of the label.
	pub label_offset: f64,
}

/// One routed link and its stroke.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkVisual {
	pub id: String,
	/// Path trimmed to the rims of both endpoints.
	pub path: EdgePath,
	/// Category width, plus the emphasis extra when hovered or selected.
	pub stroke_width: f64,
	pub color: Color,
	/// Stroke opacity after hover dimming.
	pub opacity: f64,
	pub emphasis: StrokeEmphasis,
	/// Delayed effects are drawn dashed.
	pub dashed: bool,
	/// Arrowhead at the source end, pointing into the source node.
	pub arrow_at_start: bool,
	/// Arrowhead at the target end, pointing into the target node.
	pub arrow_at_end: bool,
}

/// A link label, centered on its link and rotated along it.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelGeometry {
	pub link_id: String,
	pub text: String,
	pub anchor: Point,
	/// Tangent angle at the anchor in degrees, flipped by 180 when needed to
	/// stay within `[-90, 90]`. The raw tangent is
	/// [`EdgePath::label_anchor`]'s `rotation_degrees`, which points from
	/// source to target; the flip keeps text upright and drops that direction.
	pub rotation_degrees: f64,
	pub opacity: f64,
}

/// Everything needed to paint one frame, in world coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderFrame {
	/// Simulation tick the frame was built from.
	pub tick: u64,
	pub alpha: f64,
	/// Nodes in arena order; unplaced nodes are skipped.
	pub nodes: Vec<NodeVisual>,
	/// Links in arena order.
	pub links: Vec<LinkVisual>,
	/// Labels of links that carry one.
	pub labels: Vec<LabelGeometry>,
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
	from + (to - from) * t.clamp(0.0, 1.0)
}

/// Fold an angle in `(-180, 180]` into `[-90, 90]`.
fn readable(degrees: f64) -> f64 {
	if degrees > 90.0 {
		degrees - 180.0
	} else if degrees < -90.0 {
		degrees + 180.0
	} else {
		degrees
	}
}

/// Route `link` against the positions in `snapshot`, curved when the link
/// carries a non-zero curvature.
pub fn link_path(graph: &Graph, snapshot: &Snapshot, link: &Link) -> EdgePath {
	let endpoint = |node: usize| {
		let radius = graph.nodes.get(node).map_or(0.0, |n| n.radius);
		match snapshot.position(node) {
			Some(position) => Endpoint::new(position, radius),
			None => Endpoint::unplaced(radius),
		}
	};
	let (source, target) = (endpoint(link.source), endpoint(link.target));
	match link.curvature {
		Some(curvature) if curvature != 0.0 => route_curved(&source, &target, curvature),
		_ => route(&source, &target),
	}
}

impl RenderFrame {
	/// Resolve styles, paths and labels for every node and link.
	pub fn build(
		graph: &Graph,
		snapshot: &Snapshot,
		interaction: &InteractionController,
		theme: &Theme,
	) -> Self {
		let focus = interaction.focus();
		let hovered_node = interaction.hovered_node();
		let hovered_link = interaction.hovered_link();
		let selected = interaction.selected();

		let nodes = graph
			.nodes
			.iter()
			.enumerate()
			.filter_map(|(index, node)| {
				let position = snapshot.position(index)?;
				let style = node.category.style();
				let hovered = hovered_node == Some(index);

				let dimmed = match interaction.fading_node_state(index) {
					FocusState::Dimmed => theme.node.dimmed_opacity,
					FocusState::Normal | FocusState::Active => 1.0,
				};

				Some(NodeVisual {
					id: node.id.clone(),
					label: node.label.clone(),
					position,
					radius: if hovered {
						node.radius * theme.node.hovered_radius_scale
					} else {
						node.radius
					},
					fill: style.fill,
					opacity: lerp(1.0, dimmed, focus),
					emphasis: if hovered {
						StrokeEmphasis::Hovered
					} else {
						StrokeEmphasis::Normal
					},
					font_size: style.font_size,
					label_offset: style.label_offset,
				})
			})
			.collect();

		let mut links = Vec::with_capacity(graph.links.len());
		let mut labels = Vec::new();
		for (index, link) in graph.links.iter().enumerate() {
			let path = link_path(graph, snapshot, link);

			let emphasis = if selected == Some(index) {
				StrokeEmphasis::Selected
			} else if hovered_link == Some(index) {
				StrokeEmphasis::Hovered
			} else {
				StrokeEmphasis::Normal
			};

			let edge = &theme.edge;
			let focused = match interaction.fading_link_state(graph, index) {
				FocusState::Normal => edge.base_opacity,
				FocusState::Active => edge.active_opacity,
				FocusState::Dimmed => edge.dimmed_opacity,
			};
			let opacity = lerp(edge.base_opacity, focused, focus);

			let mut stroke_width = link.category.stroke_width();
			if emphasis != StrokeEmphasis::Normal {
				stroke_width += edge.emphasis_width;
			}

			let (arrow_at_start, arrow_at_end) = match link.direction {
				LinkDirection::Undirected => (false, false),
				LinkDirection::Mutual => (true, true),
				LinkDirection::Directed => (link.reversed, !link.reversed),
			};

			if let (Some(text), Some(anchor)) = (&link.label, path.label_anchor()) {
				labels.push(LabelGeometry {
					link_id: link.id.clone(),
					text: text.clone(),
					anchor: anchor.position,
					rotation_degrees: readable(anchor.rotation_degrees),
					opacity: lerp(1.0, (focused / edge.active_opacity).min(1.0), focus),
				});
			}

			links.push(LinkVisual {
				id: link.id.clone(),
				path,
				stroke_width,
				color: if emphasis == StrokeEmphasis::Selected {
					edge.selected_color
				} else {
					edge.color
				},
				opacity,
				emphasis,
				dashed: link.delayed,
				arrow_at_start,
				arrow_at_end,
			});
		}

		Self {
			tick: snapshot.tick,
			alpha: snapshot.alpha,
			nodes,
			links,
			labels,
		}
	}

	pub fn node(&self, id: &str) -> Option<&NodeVisual> {
		self.nodes.iter().find(|node| node.id == id)
	}

	pub fn link(&self, id: &str) -> Option<&LinkVisual> {
		self.links.iter().find(|link| link.id == id)
	}
}
