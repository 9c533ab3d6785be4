//! Force kernels applied once per tick, in order: link, charge, center,
//! collision.
//!
//! Every kernel writes into body velocities (the center force moves positions
//! directly). Pinned bodies never receive velocity changes, see [`Body::push`].

use rand::rngs::SmallRng;

use super::super::geometry::Point;
use super::placement::jiggle;

/// Dynamic state of one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Body {
	pub position: Point,
	pub velocity: Point,
	pub pin: Option<Point>,
	/// Most recent finite position, restored if integration goes non-finite.
	pub last_good: Point,
}

impl Body {
	pub fn at(position: Point) -> Self {
		Self {
			position,
			velocity: Point::ZERO,
			pin: None,
			last_good: position,
		}
	}

	/// Position expected after this tick's velocity is applied.
	fn predicted(&self) -> Point {
		self.position + self.velocity
	}

	pub fn push(&mut self, delta: Point) {
		if self.pin.is_none() {
			self.velocity += delta;
		}
	}
}

/// A link prepared for the spring kernel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Spring {
	pub source: usize,
	pub target: usize,
	/// `1 / min(degree(source), degree(target))`; busy nodes get softer springs.
	pub strength: f64,
	/// Share of the correction taken by the target, by relative degree.
	pub bias: f64,
}

impl Spring {
	pub fn new(source: usize, target: usize, source_degree: usize, target_degree: usize) -> Self {
		let (ds, dt) = (source_degree.max(1) as f64, target_degree.max(1) as f64);
		Self {
			source,
			target,
			strength: 1.0 / ds.min(dt),
			bias: ds / (ds + dt),
		}
	}
}

fn nonzero(mut delta: Point, rng: &mut SmallRng) -> Point {
	if delta.x == 0.0 {
		delta.x = jiggle(rng);
	}
	if delta.y == 0.0 {
		delta.y = jiggle(rng);
	}
	delta
}

/// Pull linked bodies toward `distance` apart.
pub(super) fn apply_links(
	bodies: &mut [Body],
	springs: &[Spring],
	distance: f64,
	alpha: f64,
	rng: &mut SmallRng,
) {
	for spring in springs {
		let (source, target) = (bodies[spring.source], bodies[spring.target]);
		let delta = nonzero(target.predicted() - source.predicted(), rng);
		let length = delta.length();
		let correction = delta * ((length - distance) / length * alpha * spring.strength);

		bodies[spring.target].push(correction * -spring.bias);
		bodies[spring.source].push(correction * (1.0 - spring.bias));
	}
}

/// Pairwise repulsion (`strength < 0`) limited to `max_distance`.
pub(super) fn apply_charge(
	bodies: &mut [Body],
	strength: f64,
	min_distance: f64,
	max_distance: f64,
	alpha: f64,
	rng: &mut SmallRng,
) {
	let max_sq = max_distance * max_distance;
	let min_sq = min_distance * min_distance;

	for i in 0..bodies.len() {
		for j in (i + 1)..bodies.len() {
			let delta = bodies[j].position - bodies[i].position;
			if delta.length_sq() >= max_sq {
				continue;
			}

			let delta = nonzero(delta, rng);
			let mut dist_sq = delta.length_sq();
			if dist_sq < min_sq {
				dist_sq = (min_sq * dist_sq).sqrt();
			}

			let weight = strength * alpha / dist_sq;
			bodies[i].push(delta * weight);
			bodies[j].push(delta * -weight);
		}
	}
}

/// Shift free bodies so the mean position moves toward `center`.
pub(super) fn apply_center(bodies: &mut [Body], center: Point, strength: f64) {
	if bodies.is_empty() {
		return;
	}

	let mut sum = Point::ZERO;
	for body in bodies.iter() {
		sum += body.position;
	}
	let shift = (sum / bodies.len() as f64 - center) * strength;

	for body in bodies.iter_mut().filter(|body| body.pin.is_none()) {
		body.position -= shift;
	}
}

/// Separate bodies whose collision circles overlap.
pub(super) fn apply_collision(
	bodies: &mut [Body],
	radii: &[f64],
	strength: f64,
	rng: &mut SmallRng,
) {
	for i in 0..bodies.len() {
		let ri = radii[i];
		let ri_sq = ri * ri;
		let predicted_i = bodies[i].predicted();

		for j in (i + 1)..bodies.len() {
			let rj = radii[j];
			let reach = ri + rj;
			let delta = predicted_i - bodies[j].predicted();
			if delta.length_sq() >= reach * reach {
				continue;
			}

			let delta = nonzero(delta, rng);
			let distance = delta.length();
			let push = delta * ((reach - distance) / distance * strength);
			let rj_sq = rj * rj;
			let share = rj_sq / (ri_sq + rj_sq);

			bodies[i].push(push * share);
			bodies[j].push(push * -(1.0 - share));
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;

	fn rng() -> SmallRng {
		SmallRng::seed_from_u64(11)
	}

	#[test]
	fn stretched_spring_pulls_together() {
		let mut bodies = [
			Body::at(Point::new(0.0, 0.0)),
			Body::at(Point::new(300.0, 0.0)),
		];
		let springs = [Spring::new(0, 1, 1, 1)];
		apply_links(&mut bodies, &springs, 150.0, 1.0, &mut rng());

		// (300 - 150) / 300 * 300 = 150, split evenly
		assert!((bodies[0].velocity.x - 75.0).abs() < 1e-9);
		assert!((bodies[1].velocity.x + 75.0).abs() < 1e-9);
	}

	#[test]
	fn compressed_spring_pushes_apart_scaled_by_alpha() {
		let mut bodies = [
			Body::at(Point::new(0.0, 0.0)),
			Body::at(Point::new(50.0, 0.0)),
		];
		apply_links(&mut bodies, &[Spring::new(0, 1, 1, 1)], 150.0, 0.5, &mut rng());
		assert!(bodies[0].velocity.x < 0.0);
		assert!(bodies[1].velocity.x > 0.0);
		assert!((bodies[1].velocity.x - 25.0).abs() < 1e-9);
	}

	#[test]
	fn spring_strength_follows_degree() {
		let spring = Spring::new(0, 1, 4, 1);
		assert_eq!(spring.strength, 1.0);
		assert_eq!(spring.bias, 0.8);
		assert_eq!(Spring::new(0, 1, 2, 4).strength, 0.5);
	}

	#[test]
	fn charge_repels_within_range_only() {
		let mut near = [
			Body::at(Point::new(0.0, 0.0)),
			Body::at(Point::new(100.0, 0.0)),
		];
		apply_charge(&mut near, -300.0, 1.0, 350.0, 1.0, &mut rng());
		assert!(near[0].velocity.x < 0.0);
		assert!(near[1].velocity.x > 0.0);
		assert_eq!(near[0].velocity.x, -near[1].velocity.x);

		let mut far = [
			Body::at(Point::new(0.0, 0.0)),
			Body::at(Point::new(400.0, 0.0)),
		];
		apply_charge(&mut far, -300.0, 1.0, 350.0, 1.0, &mut rng());
		assert_eq!(far[0].velocity, Point::ZERO);
		assert_eq!(far[1].velocity, Point::ZERO);
	}

	#[test]
	fn coincident_bodies_separate_without_nan() {
		let mut bodies = [Body::at(Point::new(5.0, 5.0)), Body::at(Point::new(5.0, 5.0))];
		let mut rng = rng();
		apply_charge(&mut bodies, -300.0, 1.0, 350.0, 1.0, &mut rng);
		apply_collision(&mut bodies, &[40.0, 40.0], 1.0, &mut rng);
		for body in &bodies {
			assert!(body.velocity.is_finite());
		}
		assert_ne!(bodies[0].velocity, bodies[1].velocity);
	}

	#[test]
	fn center_moves_free_bodies_only() {
		let mut bodies = [
			Body::at(Point::new(0.0, 0.0)),
			Body::at(Point::new(100.0, 0.0)),
		];
		bodies[1].pin = Some(Point::new(100.0, 0.0));
		apply_center(&mut bodies, Point::new(100.0, 0.0), 1.0);
		assert_eq!(bodies[0].position, Point::new(50.0, 0.0));
		assert_eq!(bodies[1].position, Point::new(100.0, 0.0));
	}

	#[test]
	fn collision_splits_by_radius() {
		let mut bodies = [
			Body::at(Point::new(0.0, 0.0)),
			Body::at(Point::new(40.0, 0.0)),
		];
		apply_collision(&mut bodies, &[40.0, 40.0], 1.0, &mut rng());
		// overlap of 40 split evenly between equal radii
		assert!((bodies[0].velocity.x + 20.0).abs() < 1e-9);
		assert!((bodies[1].velocity.x - 20.0).abs() < 1e-9);
	}

	#[test]
	fn pinned_bodies_ignore_pushes() {
		let mut body = Body::at(Point::new(1.0, 1.0));
		body.pin = Some(Point::new(1.0, 1.0));
		body.push(Point::new(10.0, 10.0));
		assert_eq!(body.velocity, Point::ZERO);
	}
}
