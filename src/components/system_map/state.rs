//! Map state shared by the canvas component and its event handlers.
//!
//! Owns the current graph together with its simulation and interaction state,
//! plus the pan/zoom transform. Rebuilding from new data swaps all three at
//! once and bumps the tick generation, so callbacks bound to the previous
//! graph turn inert.

use log::{debug, info};

use super::config::MapConfig;
use super::frame::{RenderFrame, link_path};
use super::geometry::Point;
use super::graph::{BuildDiagnostics, Graph, GraphBuilder};
use super::interaction::InteractionController;
use super::scheduler::{TickGuard, TickToken};
use super::simulation::{ForceSimulation, SimulationConfig};
use super::theme::Theme;
use super::types::RawGraph;

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 4.0;
/// Zoom applied around the viewport center when a graph is first shown.
pub const INITIAL_ZOOM: f64 = 0.75;

/// `MouseEvent.button` of the main mouse button.
pub const PRIMARY_BUTTON: i16 = 0;

/// Screen distance a press may travel before it stops counting as a click.
const CLICK_SLOP: f64 = 3.0;
/// Extra screen pixels around a node that still count as a hit.
const NODE_HIT_SLOP: f64 = 2.0;
/// Screen distance from a link path that counts as a hit.
const LINK_HIT_WIDTH: f64 = 5.0;

/// Pan and zoom transform from world to screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor, clamped to `MIN_ZOOM..=MAX_ZOOM`.
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	/// Initial zoom, scaled around the center of a `width`×`height` viewport.
	pub fn centered(width: f64, height: f64) -> Self {
		Self {
			x: width / 2.0 * (1.0 - INITIAL_ZOOM),
			y: height / 2.0 * (1.0 - INITIAL_ZOOM),
			k: INITIAL_ZOOM,
		}
	}

	pub fn screen_to_world(&self, sx: f64, sy: f64) -> Point {
		Point::new((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	pub fn world_to_screen(&self, point: Point) -> (f64, f64) {
		(point.x * self.k + self.x, point.y * self.k + self.y)
	}

	/// Multiply the zoom by `factor`, keeping the world point under
	/// `(sx, sy)` in place.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let k = (self.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = k;
	}
}

/// What the primary pointer button is doing.
#[derive(Clone, Debug, Default, PartialEq)]
enum PointerState {
	#[default]
	Idle,
	Dragging {
		id: String,
		/// World offset from the pointer to the node center.
		grab: Point,
	},
	Panning {
		start: (f64, f64),
		origin: (f64, f64),
		moved: bool,
	},
}

/// Everything behind one map canvas: graph, layout, interaction and view.
pub struct SystemMapState {
	graph: Graph,
	diagnostics: BuildDiagnostics,
	simulation: ForceSimulation,
	interaction: InteractionController,
	config: SimulationConfig,
	pub theme: Theme,
	/// Current pan and zoom.
	pub transform: ViewTransform,
	pointer: PointerState,
	suppress_click: bool,
	guard: TickGuard,
	/// Canvas width in CSS pixels.
	pub width: f64,
	/// Canvas height in CSS pixels.
	pub height: f64,
}

impl SystemMapState {
	/// Build the graph from `raw` and warm the layout up for a
	/// `width`×`height` canvas.
	pub fn new(raw: &RawGraph, config: &MapConfig, width: f64, height: f64) -> Self {
		let simulation_config = config.simulation.clone().with_viewport(width, height);
		let (graph, diagnostics, simulation) = Self::layout(raw, &simulation_config);
		Self {
			graph,
			diagnostics,
			simulation,
			interaction: InteractionController::default(),
			config: simulation_config,
			theme: config.theme.clone().into(),
			transform: ViewTransform::centered(width, height),
			pointer: PointerState::Idle,
			suppress_click: false,
			guard: TickGuard::new(),
			width,
			height,
		}
	}

	fn layout(
		raw: &RawGraph,
		config: &SimulationConfig,
	) -> (Graph, BuildDiagnostics, ForceSimulation) {
		let built = GraphBuilder::build(raw);
		let mut simulation = ForceSimulation::new(&built.graph, config.clone());
		simulation.warm_start(config.warm_start_ticks);
		(built.graph, built.diagnostics, simulation)
	}

	/// Replace the graph. The new graph, simulation and interaction state are
	/// fully built before anything is swapped in.
	pub fn replace_data(&mut self, raw: &RawGraph) -> BuildDiagnostics {
		let (graph, diagnostics, simulation) = Self::layout(raw, &self.config);

		self.guard.invalidate();
		self.graph = graph;
		self.diagnostics = diagnostics;
		self.simulation = simulation;
		self.interaction.reset();
		self.pointer = PointerState::Idle;
		self.suppress_click = false;

		info!(
			"evidence-map: graph replaced (generation {})",
			self.guard.generation()
		);
		diagnostics
	}

	/// Token that stays live until the next [`Self::replace_data`].
	pub fn token(&self) -> TickToken {
		self.guard.token()
	}

	pub fn generation(&self) -> u64 {
		self.guard.generation()
	}

	/// Advance the layout by one tick and the hover fade by `dt` seconds.
	/// Returns whether the layout moved.
	pub fn advance(&mut self, dt: f64) -> bool {
		self.interaction.tick(dt);
		self.simulation.advance()
	}

	/// Render output for the current snapshot.
	pub fn frame(&self) -> RenderFrame {
		RenderFrame::build(
			&self.graph,
			&self.simulation.snapshot(),
			&self.interaction,
			&self.theme,
		)
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	pub fn graph(&self) -> &Graph {
		&self.graph
	}

	pub fn diagnostics(&self) -> BuildDiagnostics {
		self.diagnostics
	}

	pub fn simulation(&self) -> &ForceSimulation {
		&self.simulation
	}

	pub fn interaction(&self) -> &InteractionController {
		&self.interaction
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Point {
		self.transform.screen_to_world(sx, sy)
	}

	/// Top-most node under the screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let world = self.screen_to_graph(sx, sy);
		let slop = NODE_HIT_SLOP / self.transform.k;
		(0..self.graph.nodes.len()).rev().find(|&index| {
			self.simulation
				.position(index)
				.is_some_and(|p| p.distance(world) <= self.graph.nodes[index].radius + slop)
		})
	}

	/// Closest link within hit distance of the screen point.
	pub fn link_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let world = self.screen_to_graph(sx, sy);
		let reach = LINK_HIT_WIDTH / self.transform.k;
		let snapshot = self.simulation.snapshot();

		self.graph
			.links
			.iter()
			.enumerate()
			.filter_map(|(index, link)| {
				let distance = link_path(&self.graph, &snapshot, link).distance_to(world)?;
				(distance <= reach).then_some((index, distance))
			})
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(index, _)| index)
	}

	pub fn hover_node(&mut self, id: &str) -> bool {
		self.interaction.hover_node(&self.graph, id)
	}

	pub fn hover_link(&mut self, id: &str) -> bool {
		self.interaction.hover_link(&self.graph, id)
	}

	pub fn clear_hover(&mut self) {
		self.interaction.clear_hover();
	}

	pub fn select_link(&mut self, id: &str) -> bool {
		self.interaction.select_link(&self.graph, id)
	}

	pub fn clear_selection(&mut self) {
		self.interaction.clear_selection();
	}

	pub fn drag_start(&mut self, id: &str) -> bool {
		self.interaction
			.drag_start(&self.graph, &mut self.simulation, id)
	}

	pub fn drag_move(&mut self, id: &str, x: f64, y: f64) -> bool {
		self.interaction
			.drag_move(&self.graph, &mut self.simulation, id, x, y)
	}

	pub fn drag_end(&mut self, id: &str) -> bool {
		self.interaction
			.drag_end(&self.graph, &mut self.simulation, id)
	}

	/// Button pressed: the primary button grabs a node or starts panning.
	/// Other buttons, and presses while a gesture is already running, are
	/// ignored.
	pub fn pointer_down(&mut self, sx: f64, sy: f64, button: i16) {
		if button != PRIMARY_BUTTON || self.pointer != PointerState::Idle {
			return;
		}
		self.suppress_click = false;
		if let Some(index) = self.node_at_position(sx, sy) {
			let id = self.graph.nodes[index].id.clone();
			let center = self.simulation.position(index).unwrap_or_default();
			if self.drag_start(&id) {
				self.pointer = PointerState::Dragging {
					grab: center - self.screen_to_graph(sx, sy),
					id,
				};
				return;
			}
		}
		self.pointer = PointerState::Panning {
			start: (sx, sy),
			origin: (self.transform.x, self.transform.y),
			moved: false,
		};
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		match &mut self.pointer {
			PointerState::Dragging { id, grab } => {
				let (id, target) = (id.clone(), self.transform.screen_to_world(sx, sy) + *grab);
				self.drag_move(&id, target.x, target.y);
			}
			PointerState::Panning {
				start,
				origin,
				moved,
			} => {
				let (dx, dy) = (sx - start.0, sy - start.1);
				if dx.hypot(dy) > CLICK_SLOP {
					*moved = true;
				}
				self.transform.x = origin.0 + dx;
				self.transform.y = origin.1 + dy;
			}
			PointerState::Idle => self.update_hover(sx, sy),
		}
	}

	fn update_hover(&mut self, sx: f64, sy: f64) {
		if let Some(index) = self.node_at_position(sx, sy) {
			if self.interaction.hovered_node() != Some(index) {
				let id = self.graph.nodes[index].id.clone();
				self.hover_node(&id);
			}
		} else if let Some(index) = self.link_at_position(sx, sy) {
			if self.interaction.hovered_link() != Some(index) {
				let id = self.graph.links[index].id.clone();
				self.hover_link(&id);
			}
		} else if self.interaction.hovered().is_some() {
			self.clear_hover();
		}
	}

	pub fn pointer_up(&mut self) {
		match std::mem::take(&mut self.pointer) {
			PointerState::Dragging { id, .. } => {
				self.drag_end(&id);
				self.suppress_click = true;
			}
			PointerState::Panning { moved, .. } => self.suppress_click = moved,
			PointerState::Idle => {}
		}
	}

	/// Pointer left the canvas: end any gesture and drop the hover.
	pub fn pointer_leave(&mut self) {
		self.pointer_up();
		self.clear_hover();
	}

	/// Click selects the link under the pointer; a click on empty space
	/// clears the selection.
	pub fn click(&mut self, sx: f64, sy: f64) {
		if std::mem::take(&mut self.suppress_click) {
			return;
		}
		if let Some(index) = self.link_at_position(sx, sy) {
			let id = self.graph.links[index].id.clone();
			self.select_link(&id);
		} else if self.node_at_position(sx, sy).is_none() {
			debug!("evidence-map: click on empty space");
			self.clear_selection();
		}
	}

	/// Zoom one wheel step around the pointer.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		self.transform.zoom_at(sx, sy, factor);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn raw() -> RawGraph {
		RawGraph::from_value(json!({
			"elements": [ { "id": "a" }, { "id": "b" }, { "id": "c" } ],
			"connections": [
				{ "id": "ab", "from": "a", "to": "b" },
				{ "id": "bc", "from": "b", "to": "c" }
			]
		}))
		.unwrap()
	}

	fn state() -> SystemMapState {
		SystemMapState::new(&raw(), &MapConfig::default(), 800.0, 600.0)
	}

	fn screen_of(state: &SystemMapState, id: &str) -> (f64, f64) {
		let index = state.graph().node_index(id).unwrap();
		state
			.transform
			.world_to_screen(state.simulation().position(index).unwrap())
	}

	#[test]
	fn initial_view_zooms_around_the_center() {
		let view = ViewTransform::centered(800.0, 600.0);
		assert_eq!(view.k, 0.75);
		assert_eq!(view.world_to_screen(Point::new(400.0, 300.0)), (400.0, 300.0));
	}

	#[test]
	fn zoom_is_clamped_and_keeps_the_anchor() {
		let mut view = ViewTransform::centered(800.0, 600.0);
		let anchor = view.screen_to_world(120.0, 80.0);
		for _ in 0..100 {
			view.zoom_at(120.0, 80.0, 1.1);
		}
		assert_eq!(view.k, MAX_ZOOM);
		let (sx, sy) = view.world_to_screen(anchor);
		assert!((sx - 120.0).abs() < 1e-6 && (sy - 80.0).abs() < 1e-6);

		for _ in 0..100 {
			view.zoom_at(0.0, 0.0, 0.9);
		}
		assert_eq!(view.k, MIN_ZOOM);
	}

	#[test]
	fn warm_start_runs_before_first_frame() {
		let state = state();
		assert!(state.simulation().tick_count() > 0);
		assert_eq!(state.frame().nodes.len(), 3);
	}

	#[test]
	fn hit_testing_finds_nodes() {
		let state = state();
		let (sx, sy) = screen_of(&state, "b");
		let b = state.graph().node_index("b");
		assert_eq!(state.node_at_position(sx, sy), b);
		assert_eq!(state.node_at_position(-5000.0, -5000.0), None);
	}

	#[test]
	fn pointer_drag_moves_the_node_and_releases_it() {
		let mut state = state();
		let (sx, sy) = screen_of(&state, "a");
		let a = state.graph().node_index("a").unwrap();

		state.pointer_down(sx, sy, PRIMARY_BUTTON);
		assert_eq!(state.interaction().dragging(), Some(a));
		state.pointer_move(sx + 30.0, sy);
		let (nx, _) = screen_of(&state, "a");
		assert!((nx - (sx + 30.0)).abs() < 1e-6);

		state.pointer_up();
		assert_eq!(state.interaction().dragging(), None);
		assert_eq!(state.simulation().pinned(a), None);
	}

	#[test]
	fn presses_during_a_drag_do_not_grab_another_node() {
		let mut state = state();
		let (a, b) = (
			state.graph().node_index("a").unwrap(),
			state.graph().node_index("b").unwrap(),
		);
		let (ax, ay) = screen_of(&state, "a");
		let (bx, by) = screen_of(&state, "b");

		state.pointer_down(ax, ay, PRIMARY_BUTTON);
		state.pointer_down(bx, by, 2);
		state.pointer_down(bx, by, PRIMARY_BUTTON);
		assert_eq!(state.interaction().dragging(), Some(a));
		assert_eq!(state.simulation().pinned(b), None);

		state.pointer_up();
		assert_eq!(state.simulation().pinned(a), None);
		assert_eq!(state.interaction().dragging(), None);
	}

	#[test]
	fn secondary_button_starts_nothing() {
		let mut state = state();
		let (sx, sy) = screen_of(&state, "a");
		let before = state.transform;
		state.pointer_down(sx, sy, 2);
		state.pointer_move(sx + 40.0, sy + 40.0);
		assert_eq!(state.interaction().dragging(), None);
		assert_eq!(state.transform, before);
	}

	#[test]
	fn background_drag_pans_without_selecting() {
		let mut state = state();
		state.pointer_down(-4000.0, -4000.0, PRIMARY_BUTTON);
		state.pointer_move(-3950.0, -3980.0);
		state.pointer_up();
		assert_eq!(state.transform.x, ViewTransform::centered(800.0, 600.0).x + 50.0);
		state.click(-3950.0, -3980.0);
		assert_eq!(state.interaction().selected(), None);
	}

	#[test]
	fn dropping_the_state_kills_its_tokens() {
		let state = state();
		let token = state.token();
		assert!(token.is_live());
		drop(state);
		assert!(!token.is_live());
	}

	#[test]
	fn replace_data_resets_everything_and_kills_old_tokens() {
		let mut state = state();
		let token = state.token();
		state.hover_node("a");
		state.select_link("ab");

		let diagnostics = state.replace_data(
			&RawGraph::from_value(json!({
				"elements": [ { "id": "x" }, { "id": "y" }, { "id": "lonely" } ],
				"connections": [ { "id": "xy", "from": "x", "to": "y" } ]
			}))
			.unwrap(),
		);

		assert!(!token.is_live());
		assert!(state.token().is_live());
		assert_eq!(diagnostics.isolated_elements, 1);
		assert_eq!(state.interaction().hovered(), None);
		assert_eq!(state.interaction().selected(), None);
		assert_eq!(state.graph().nodes.len(), 2);
		assert!(!state.hover_node("a"));
	}
}
