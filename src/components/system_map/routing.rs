//! Radius-aware edge routing between simulated nodes.
//!
//! Edges are trimmed so they start on the rim of the source circle and stop on
//! the rim of the target circle instead of at the centers. Routing is a pure
//! function of two endpoint snapshots and is recomputed every frame.

use std::fmt::Write as _;

use super::geometry::{CurvedPath, LabelAnchor, Point, curved_path};

/// One end of an edge: a node's center (if known) and its radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Endpoint {
	pub position: Option<Point>,
	pub radius: f64,
}

impl Endpoint {
	pub fn new(position: Point, radius: f64) -> Self {
		Self {
			position: Some(position),
			radius,
		}
	}

	/// An endpoint whose node has no position yet.
	pub fn unplaced(radius: f64) -> Self {
		Self {
			position: None,
			radius,
		}
	}

	fn center(&self) -> Option<Point> {
		self.position.filter(|p| p.is_finite())
	}
}

/// Drawable geometry of one edge.
#[derive(Clone, Debug, PartialEq)]
pub enum EdgePath {
	/// Nothing to draw; an endpoint has no usable position.
	Empty,
	Straight { start: Point, end: Point },
	Curved(CurvedPath),
}

impl EdgePath {
	pub fn is_empty(&self) -> bool {
		matches!(self, EdgePath::Empty)
	}

	/// First and last point of the path.
	pub fn endpoints(&self) -> Option<(Point, Point)> {
		match self {
			EdgePath::Empty => None,
			EdgePath::Straight { start, end } => Some((*start, *end)),
			EdgePath::Curved(curve) => Some((curve.start, curve.end)),
		}
	}

	/// Label placement halfway along the path.
	pub fn label_anchor(&self) -> Option<LabelAnchor> {
		match self {
			EdgePath::Empty => None,
			EdgePath::Straight { start, end } => {
				let delta = *end - *start;
				let angle = if delta.length_sq() == 0.0 {
					0.0
				} else {
					delta.y.atan2(delta.x)
				};
				Some(LabelAnchor {
					position: *start + delta * 0.5,
					rotation_degrees: angle.to_degrees(),
				})
			}
			EdgePath::Curved(curve) => Some(curve.label_anchor(0.5)),
		}
	}

	/// Point halfway along the path.
	pub fn midpoint(&self) -> Option<Point> {
		self.label_anchor().map(|anchor| anchor.position)
	}

	/// Direction of travel at the end of the path (radians), for arrowheads.
	pub fn end_angle(&self) -> Option<f64> {
		match self {
			EdgePath::Empty => None,
			EdgePath::Straight { start, end } => Some(straight_angle(*start, *end)),
			EdgePath::Curved(curve) => Some(curve.angle_at(1.0)),
		}
	}

	/// Direction of travel at the start of the path (radians).
	pub fn start_angle(&self) -> Option<f64> {
		match self {
			EdgePath::Empty => None,
			EdgePath::Straight { start, end } => Some(straight_angle(*start, *end)),
			EdgePath::Curved(curve) => Some(curve.angle_at(0.0)),
		}
	}

	/// Shortest distance from `point` to the drawn path.
	///
	/// Curves are approximated by a short polyline, which is plenty for pointer
	/// hit testing.
	pub fn distance_to(&self, point: Point) -> Option<f64> {
		const CURVE_SEGMENTS: usize = 16;

		match self {
			EdgePath::Empty => None,
			EdgePath::Straight { start, end } => Some(segment_distance(point, *start, *end)),
			EdgePath::Curved(curve) => {
				let mut best = f64::INFINITY;
				let mut previous = curve.start;
				for step in 1..=CURVE_SEGMENTS {
					let next = curve.point_at(step as f64 / CURVE_SEGMENTS as f64);
					best = best.min(segment_distance(point, previous, next));
					previous = next;
				}
				Some(best)
			}
		}
	}

	/// SVG path data. Empty paths produce an empty string.
	pub fn to_svg(&self) -> String {
		match self {
			EdgePath::Empty => String::new(),
			EdgePath::Straight { start, end } => {
				let mut out = String::with_capacity(40);
				let _ = write!(out, "M{},{}L{},{}", start.x, start.y, end.x, end.y);
				out
			}
			EdgePath::Curved(curve) => curve.to_svg(),
		}
	}
}

fn straight_angle(start: Point, end: Point) -> f64 {
	let delta = end - start;
	if delta.length_sq() == 0.0 {
		0.0
	} else {
		delta.y.atan2(delta.x)
	}
}

fn segment_distance(point: Point, a: Point, b: Point) -> f64 {
	let ab = b - a;
	let len_sq = ab.length_sq();
	if len_sq == 0.0 {
		return point.distance(a);
	}
	let ap = point - a;
	let t = ((ap.x * ab.x + ap.y * ab.y) / len_sq).clamp(0.0, 1.0);
	point.distance(a + ab * t)
}

/// Trimmed endpoints along the center line, or `None` when either center is
/// unknown. Coincident centers use an angle of `0`.
fn trimmed(source: &Endpoint, target: &Endpoint) -> Option<(Point, Point)> {
	let (from, to) = (source.center()?, target.center()?);
	let delta = to - from;
	let angle = if delta.length_sq() == 0.0 {
		0.0
	} else {
		delta.y.atan2(delta.x)
	};
	let direction = Point::from_angle(angle);

	Some((
		from + direction * source.radius,
		to - direction * target.radius,
	))
}

/// Straight edge from the rim of `source` to the rim of `target`.
pub fn route(source: &Endpoint, target: &Endpoint) -> EdgePath {
	match trimmed(source, target) {
		Some((start, end)) => EdgePath::Straight { start, end },
		None => EdgePath::Empty,
	}
}

/// Curved edge between the same trimmed endpoints as [`route`].
pub fn route_curved(source: &Endpoint, target: &Endpoint, curvature: f64) -> EdgePath {
	match trimmed(source, target) {
		Some((start, end)) => EdgePath::Curved(curved_path(start, end, curvature)),
		None => EdgePath::Empty,
	}
}
