//! Force-directed layout engine.
//!
//! The engine owns every node position. It is driven one tick at a time by the
//! caller (the frame loop, or a test) and exposes its state through immutable
//! [`Snapshot`]s. Cooling follows the usual alpha schedule: alpha moves toward
//! `alpha_target` by `alpha_decay` each tick and ticking stops once it falls
//! below `alpha_min`.

mod forces;
mod placement;

pub use placement::Placement;

use log::{debug, trace, warn};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Deserialize;

use super::geometry::Point;
use super::graph::Graph;
use forces::{Body, Spring};

/// Tunables of the layout. Every field has a default, so a partial JSON object
/// is enough to override a few of them.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
	/// Viewport width; the center force pulls toward `width / 2`.
	pub width: f64,
	/// Viewport height; the center force pulls toward `height / 2`.
	pub height: f64,
	/// Rest length of every link spring.
	pub link_distance: f64,
	/// Many-body strength per node. Negative values repel.
	pub charge_strength: f64,
	/// Distances below this are clamped before computing charge.
	pub charge_distance_min: f64,
	/// Node pairs further apart than this do not interact.
	pub charge_distance_max: f64,
	/// How far the centroid is shifted toward the center each tick, 0 to 1.
	pub center_strength: f64,
	/// Collision radius; nodes with a larger visual radius use their own.
	pub collision_radius: f64,
	pub collision_strength: f64,
	/// Ticking stops once alpha falls below this.
	pub alpha_min: f64,
	/// Fraction of the gap to `alpha_target` closed per tick.
	pub alpha_decay: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// Alpha target held while a node is being dragged.
	pub drag_alpha_target: f64,
	/// Ticks run synchronously before the first paint.
	pub warm_start_ticks: usize,
	/// Seed for initial placement and coincident-node jiggle.
	pub seed: u64,
	/// How nodes are placed before the first tick.
	pub placement: Placement,
	/// Half-width of the square used by [`Placement::Jitter`].
	pub initial_spread: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			width: 800.0,
			height: 600.0,
			link_distance: 150.0,
			charge_strength: -300.0,
			charge_distance_min: 1.0,
			charge_distance_max: 350.0,
			center_strength: 1.0,
			collision_radius: 40.0,
			collision_strength: 1.0,
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			velocity_decay: 0.4,
			drag_alpha_target: 0.3,
			warm_start_ticks: 300,
			seed: 0x5eed_cafe,
			placement: Placement::default(),
			initial_spread: 100.0,
		}
	}
}

impl SimulationConfig {
	pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
		self.width = width;
		self.height = height;
		self.sanitized()
	}

	/// Replace values that would break the integrator with their defaults.
	pub fn sanitized(mut self) -> Self {
		let defaults = Self::default();

		fn keep_if(value: &mut f64, fallback: f64, valid: impl Fn(f64) -> bool) {
			if !value.is_finite() || !valid(*value) {
				*value = fallback;
			}
		}

		keep_if(&mut self.width, defaults.width, |v| v > 0.0);
		keep_if(&mut self.height, defaults.height, |v| v > 0.0);
		keep_if(&mut self.link_distance, defaults.link_distance, |v| v >= 0.0);
		keep_if(&mut self.charge_strength, defaults.charge_strength, |_| true);
		keep_if(&mut self.charge_distance_min, defaults.charge_distance_min, |v| v > 0.0);
		keep_if(&mut self.charge_distance_max, defaults.charge_distance_max, |v| v > 0.0);
		keep_if(&mut self.center_strength, defaults.center_strength, |v| (0.0..=1.0).contains(&v));
		keep_if(&mut self.collision_radius, defaults.collision_radius, |v| v >= 0.0);
		keep_if(&mut self.collision_strength, defaults.collision_strength, |v| v >= 0.0);
		keep_if(&mut self.alpha_min, defaults.alpha_min, |v| (0.0..1.0).contains(&v));
		keep_if(&mut self.alpha_decay, defaults.alpha_decay, |v| v > 0.0 && v <= 1.0);
		keep_if(&mut self.velocity_decay, defaults.velocity_decay, |v| (0.0..=1.0).contains(&v));
		keep_if(&mut self.drag_alpha_target, defaults.drag_alpha_target, |v| (0.0..=1.0).contains(&v));
		keep_if(&mut self.initial_spread, defaults.initial_spread, |v| v >= 0.0);
		self
	}

	pub fn center(&self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}
}

/// Immutable copy of the layout at one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
	/// Ticks run when the snapshot was taken.
	pub tick: u64,
	pub alpha: f64,
	/// Indexed like [`Graph::nodes`].
	pub positions: Vec<Point>,
}

impl Snapshot {
	pub fn position(&self, index: usize) -> Option<Point> {
		self.positions.get(index).copied()
	}
}

/// Counters for conditions the engine recovered from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimulationDiagnostics {
	/// Positions that went non-finite and were restored.
	pub non_finite_resets: u64,
}

/// Force-directed layout over one graph.
///
/// Node `i` of the graph is body `i` here. Forces run in the order link,
/// charge, center, collision, then velocities are integrated.
pub struct ForceSimulation {
	config: SimulationConfig,
	bodies: Vec<Body>,
	springs: Vec<Spring>,
	radii: Vec<f64>,
	rng: SmallRng,
	alpha: f64,
	alpha_target: f64,
	running: bool,
	tick: u64,
	diagnostics: SimulationDiagnostics,
}

impl ForceSimulation {
	/// Place every node of `graph` and build the springs. Nothing ticks yet.
	pub fn new(graph: &Graph, config: SimulationConfig) -> Self {
		let config = config.sanitized();
		let mut rng = SmallRng::seed_from_u64(config.seed);

		let bodies = placement::initial_positions(
			graph.nodes.len(),
			config.center(),
			config.initial_spread,
			config.placement,
			&mut rng,
		)
		.into_iter()
		.map(Body::at)
		.collect();

		let springs = graph
			.links
			.iter()
			.filter(|link| link.source != link.target)
			.map(|link| {
				Spring::new(
					link.source,
					link.target,
					graph.degree(link.source),
					graph.degree(link.target),
				)
			})
			.collect();

		let radii = graph
			.nodes
			.iter()
			.map(|node| config.collision_radius.max(node.radius))
			.collect();

		Self {
			config,
			bodies,
			springs,
			radii,
			rng,
			alpha: 1.0,
			alpha_target: 0.0,
			running: true,
			tick: 0,
			diagnostics: SimulationDiagnostics::default(),
		}
	}

	/// Run one tick unconditionally: cool, apply forces, integrate.
	pub fn tick(&mut self) {
		let cfg = &self.config;
		self.alpha = (self.alpha + (self.alpha_target - self.alpha) * cfg.alpha_decay).max(0.0);
		let alpha = self.alpha;

		forces::apply_links(
			&mut self.bodies,
			&self.springs,
			cfg.link_distance,
			alpha,
			&mut self.rng,
		);
		forces::apply_charge(
			&mut self.bodies,
			cfg.charge_strength,
			cfg.charge_distance_min,
			cfg.charge_distance_max,
			alpha,
			&mut self.rng,
		);
		forces::apply_center(&mut self.bodies, cfg.center(), cfg.center_strength);
		forces::apply_collision(
			&mut self.bodies,
			&self.radii,
			cfg.collision_strength,
			&mut self.rng,
		);

		self.integrate();
		self.tick += 1;
		trace!("evidence-map: tick {} alpha {:.5}", self.tick, self.alpha);
	}

	fn integrate(&mut self) {
		let keep = 1.0 - self.config.velocity_decay;

		for (index, body) in self.bodies.iter_mut().enumerate() {
			if let Some(pin) = body.pin {
				body.position = pin;
				body.velocity = Point::ZERO;
				body.last_good = pin;
				continue;
			}

			body.velocity = body.velocity * keep;
			body.position += body.velocity;

			if body.position.is_finite() && body.velocity.is_finite() {
				body.last_good = body.position;
			} else {
				warn!(
					"evidence-map: node {index} left the finite plane at tick {}, restoring",
					self.tick
				);
				body.position = body.last_good;
				body.velocity = Point::ZERO;
				self.diagnostics.non_finite_resets += 1;
			}
		}
	}

	/// Tick once if the engine is running. Returns whether a tick ran.
	/// Tick once unless the layout has settled. Returns whether it ticked.
	pub fn advance(&mut self) -> bool {
		if !self.running {
			return false;
		}
		self.tick();
		if self.alpha < self.config.alpha_min {
			self.running = false;
			debug!("evidence-map: layout settled after {} ticks", self.tick);
		}
		true
	}

	/// Run up to `ticks` ticks synchronously, stopping early once settled.
	pub fn warm_start(&mut self, ticks: usize) {
		for _ in 0..ticks {
			if !self.advance() {
				break;
			}
		}
		debug!(
			"evidence-map: warm start done at tick {} (alpha {:.4})",
			self.tick, self.alpha
		);
	}

	/// Resume ticking. Alpha is left where it is; raise the target to reheat.
	pub fn restart(&mut self) {
		self.running = true;
	}

	pub fn stop(&mut self) {
		self.running = false;
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	pub fn is_settled(&self) -> bool {
		self.alpha < self.config.alpha_min
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	/// Alpha cools toward this value, clamped to `0..=1`.
	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = if target.is_finite() {
			target.clamp(0.0, 1.0)
		} else {
			0.0
		};
	}

	/// Fix node `index` at `point`. The position changes immediately, not on
	/// the next tick.
	pub fn pin(&mut self, index: usize, point: Point) -> bool {
		if !point.is_finite() {
			warn!("evidence-map: refusing non-finite pin for node {index}");
			return false;
		}
		let Some(body) = self.bodies.get_mut(index) else {
			return false;
		};
		body.pin = Some(point);
		body.position = point;
		body.velocity = Point::ZERO;
		body.last_good = point;
		true
	}

	pub fn unpin(&mut self, index: usize) -> bool {
		match self.bodies.get_mut(index) {
			Some(body) => body.pin.take().is_some(),
			None => false,
		}
	}

	pub fn pinned(&self, index: usize) -> Option<Point> {
		self.bodies.get(index).and_then(|body| body.pin)
	}

	pub fn position(&self, index: usize) -> Option<Point> {
		self.bodies.get(index).map(|body| body.position)
	}

	pub fn velocity(&self, index: usize) -> Option<Point> {
		self.bodies.get(index).map(|body| body.velocity)
	}

	pub fn snapshot(&self) -> Snapshot {
		Snapshot {
			tick: self.tick,
			alpha: self.alpha,
			positions: self.bodies.iter().map(|body| body.position).collect(),
		}
	}

	pub fn tick_count(&self) -> u64 {
		self.tick
	}

	pub fn diagnostics(&self) -> SimulationDiagnostics {
		self.diagnostics
	}

	pub fn is_empty(&self) -> bool {
		self.bodies.is_empty()
	}

	pub fn config(&self) -> &SimulationConfig {
		&self.config
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::system_map::graph::GraphBuilder;
	use serde_json::json;

	fn graph() -> Graph {
		let raw = crate::components::system_map::types::RawGraph::from_value(json!({
			"elements": [
				{ "id": "a", "attributes": { "element type": "Core Story" } },
				{ "id": "b" }, { "id": "c" }, { "id": "d" }, { "id": "e" }
			],
			"connections": [
				{ "from": "a", "to": "b" },
				{ "from": "a", "to": "c" },
				{ "from": "b", "to": "c" },
				{ "from": "c", "to": "d" },
				{ "from": "d", "to": "e" },
				{ "from": "e", "to": "e" }
			]
		}))
		.unwrap();
		GraphBuilder::build(&raw).graph
	}

	fn run(config: SimulationConfig, ticks: usize) -> Snapshot {
		let mut sim = ForceSimulation::new(&graph(), config);
		for _ in 0..ticks {
			sim.tick();
		}
		sim.snapshot()
	}

	#[test]
	fn same_seed_same_layout() {
		let first = run(SimulationConfig::default(), 50);
		let second = run(SimulationConfig::default(), 50);
		assert_eq!(first, second);

		let other = run(
			SimulationConfig {
				seed: 42,
				..Default::default()
			},
			50,
		);
		assert_ne!(first.positions, other.positions);
	}

	#[test]
	fn alpha_decays_monotonically_until_settled() {
		let mut sim = ForceSimulation::new(&graph(), SimulationConfig::default());
		assert_eq!(sim.alpha(), 1.0);

		let mut previous = sim.alpha();
		let mut ticks = 0;
		while sim.advance() {
			assert!(sim.alpha() < previous);
			previous = sim.alpha();
			ticks += 1;
			assert!(ticks < 1000, "never settled");
		}
		assert!(sim.is_settled());
		assert!(!sim.is_running());
		// the schedule reaches alpha_min in roughly 300 ticks
		assert!((295..=305).contains(&ticks), "{ticks}");
		assert!(!sim.advance());
	}

	#[test]
	fn pinned_node_stays_put() {
		let mut sim = ForceSimulation::new(&graph(), SimulationConfig::default());
		let spot = Point::new(500.0, 500.0);
		assert!(sim.pin(0, spot));
		assert_eq!(sim.position(0), Some(spot));

		for _ in 0..100 {
			sim.tick();
			assert_eq!(sim.position(0), Some(spot));
			assert_eq!(sim.velocity(0), Some(Point::ZERO));
		}

		assert!(sim.unpin(0));
		assert!(!sim.unpin(0));
		assert_eq!(sim.pinned(0), None);
	}

	#[test]
	fn pin_rejects_bad_input() {
		let mut sim = ForceSimulation::new(&graph(), SimulationConfig::default());
		assert!(!sim.pin(0, Point::new(f64::NAN, 1.0)));
		assert!(!sim.pin(99, Point::ZERO));
		assert_eq!(sim.pinned(0), None);
	}

	#[test]
	fn settled_layout_has_no_overlaps() {
		let graph = graph();
		let mut sim = ForceSimulation::new(&graph, SimulationConfig::default());
		sim.warm_start(1000);
		assert!(sim.is_settled());

		let snap = sim.snapshot();
		for i in 0..graph.nodes.len() {
			for j in (i + 1)..graph.nodes.len() {
				let gap = snap.positions[i].distance(snap.positions[j]);
				assert!(
					gap >= graph.nodes[i].radius + graph.nodes[j].radius,
					"{i} and {j} overlap at {gap}"
				);
			}
		}
	}

	#[test]
	fn drag_target_keeps_the_engine_warm() {
		let mut sim = ForceSimulation::new(&graph(), SimulationConfig::default());
		sim.warm_start(1000);
		assert!(sim.is_settled());

		sim.set_alpha_target(0.3);
		sim.restart();
		for _ in 0..400 {
			assert!(sim.advance());
		}
		assert!(sim.alpha() > 0.25);

		sim.set_alpha_target(0.0);
		let before = sim.alpha();
		sim.advance();
		assert!(sim.alpha() < before);
	}

	#[test]
	fn non_finite_positions_are_restored() {
		let mut sim = ForceSimulation::new(&graph(), SimulationConfig::default());
		sim.tick();
		let good = sim.position(1).unwrap();

		sim.bodies[1].velocity = Point::new(f64::NAN, 0.0);
		sim.integrate();

		assert_eq!(sim.position(1), Some(good));
		assert_eq!(sim.velocity(1), Some(Point::ZERO));
		assert_eq!(sim.diagnostics().non_finite_resets, 1);
		for _ in 0..10 {
			sim.tick();
		}
		assert!(sim.snapshot().positions.iter().all(|p| p.is_finite()));
	}

	#[test]
	fn config_is_sanitized_and_partially_deserializable() {
		let config: SimulationConfig =
			serde_json::from_value(json!({ "seed": 9, "placement": "phyllotaxis" })).unwrap();
		assert_eq!(config.seed, 9);
		assert_eq!(config.placement, Placement::Phyllotaxis);
		assert_eq!(config.link_distance, 150.0);

		let fixed = SimulationConfig {
			velocity_decay: 7.0,
			width: f64::NAN,
			..Default::default()
		}
		.sanitized();
		assert_eq!(fixed.velocity_decay, 0.4);
		assert_eq!(fixed.width, 800.0);

		let sized = SimulationConfig::default().with_viewport(1000.0, 400.0);
		assert_eq!(sized.center(), Point::new(500.0, 200.0));
	}

	#[test]
	fn empty_graph_ticks_harmlessly() {
		let mut sim = ForceSimulation::new(&Graph::default(), SimulationConfig::default());
		sim.warm_start(10);
		assert!(sim.is_empty());
		assert_eq!(sim.snapshot().positions, Vec::<Point>::new());
	}
}
