//! Initial node placement.

use std::f64::consts::PI;

use rand::Rng;
use rand::rngs::SmallRng;
use serde::Deserialize;

use super::super::geometry::Point;

/// Strategy for the starting layout before any tick has run.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
	/// Uniform random jitter in a square around the center (seeded).
	#[default]
	Jitter,
	/// Deterministic sunflower spiral around the center.
	Phyllotaxis,
}

/// Radius step of the phyllotaxis spiral.
const SPIRAL_STEP: f64 = 10.0;

pub(super) fn initial_positions(
	count: usize,
	center: Point,
	spread: f64,
	placement: Placement,
	rng: &mut SmallRng,
) -> Vec<Point> {
	match placement {
		Placement::Jitter => (0..count)
			.map(|_| {
				center
					+ Point::new(
						rng.gen_range(-1.0..=1.0) * spread,
						rng.gen_range(-1.0..=1.0) * spread,
					)
			})
			.collect(),
		Placement::Phyllotaxis => {
			let golden_angle = PI * (3.0 - 5.0_f64.sqrt());
			(0..count)
				.map(|i| {
					let radius = SPIRAL_STEP * (0.5 + i as f64).sqrt();
					center + Point::from_angle(i as f64 * golden_angle) * radius
				})
				.collect()
		}
	}
}

/// Tiny random offset used instead of dividing by a zero distance.
pub(super) fn jiggle(rng: &mut SmallRng) -> f64 {
	(rng.r#gen::<f64>() - 0.5) * 1e-6
}
