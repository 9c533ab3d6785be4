//! Plane geometry and cubic Bézier helpers for curved connections.
//!
//! A curved connection is a cubic Bézier whose two control points sit at the
//! 1/3 and 2/3 marks of the straight segment, both pushed sideways by the same
//! offset. The offset is a percentage of the segment length given by the
//! connection's curvature, so the bend scales with the distance between nodes.

use std::fmt::Write as _;
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};

/// Curvature values are clamped into `[-MAX_CURVATURE, MAX_CURVATURE]`.
pub const MAX_CURVATURE: f64 = 40.0;

/// A point (or vector) in simulation coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn length_sq(self) -> f64 {
		self.x * self.x + self.y * self.y
	}

	pub fn length(self) -> f64 {
		self.length_sq().sqrt()
	}

	pub fn distance(self, other: Point) -> f64 {
		(other - self).length()
	}

	pub fn is_finite(self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}

	/// Counter-clockwise perpendicular, `(-y, x)`.
	pub fn perp(self) -> Self {
		Self::new(-self.y, self.x)
	}

	/// Unit vector pointing at `angle` radians.
	pub fn from_angle(angle: f64) -> Self {
		Self::new(angle.cos(), angle.sin())
	}
}

impl Add for Point {
	type Output = Point;

	fn add(self, rhs: Point) -> Point {
		Point::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl AddAssign for Point {
	fn add_assign(&mut self, rhs: Point) {
		self.x += rhs.x;
		self.y += rhs.y;
	}
}

impl Sub for Point {
	type Output = Point;

	fn sub(self, rhs: Point) -> Point {
		Point::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl SubAssign for Point {
	fn sub_assign(&mut self, rhs: Point) {
		self.x -= rhs.x;
		self.y -= rhs.y;
	}
}

impl Mul<f64> for Point {
	type Output = Point;

	fn mul(self, rhs: f64) -> Point {
		Point::new(self.x * rhs, self.y * rhs)
	}
}

impl Div<f64> for Point {
	type Output = Point;

	fn div(self, rhs: f64) -> Point {
		Point::new(self.x / rhs, self.y / rhs)
	}
}

/// Clamp a user supplied curvature into the supported range. `NaN` becomes 0.
pub fn clamp_curvature(curvature: f64) -> f64 {
	if curvature.is_nan() {
		return 0.0;
	}
	curvature.clamp(-MAX_CURVATURE, MAX_CURVATURE)
}

/// A cubic Bézier from `start` to `end` through two control points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurvedPath {
	pub start: Point,
	pub end: Point,
	pub controls: [Point; 2],
}

/// Position and orientation of a label placed on a path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelAnchor {
	pub position: Point,
	/// Rotation in degrees, so the label reads along the path.
	pub rotation_degrees: f64,
}

/// Build the curved path between two points.
///
/// Coincident endpoints have no defined perpendicular; the result is then a
/// stub whose control points both sit on `start`.
pub fn curved_path(start: Point, end: Point, curvature: f64) -> CurvedPath {
	let delta = end - start;
	let distance = delta.length();
	if distance == 0.0 || !distance.is_finite() {
		return CurvedPath {
			start,
			end,
			controls: [start, start],
		};
	}

	let offset = distance * (clamp_curvature(curvature) / 100.0);
	let shift = delta.perp() * (offset / distance);

	CurvedPath {
		start,
		end,
		controls: [
			start + delta / 3.0 + shift,
			start + delta * 2.0 / 3.0 + shift,
		],
	}
}

/// Evaluate the cubic Bézier at `t` (clamped into `[0, 1]`).
///
/// The endpoints are returned verbatim at `t = 0` and `t = 1`.
pub fn point_at_t(start: Point, end: Point, controls: [Point; 2], t: f64) -> Point {
	let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
	if t == 0.0 {
		return start;
	}
	if t == 1.0 {
		return end;
	}

	let [c1, c2] = controls;
	let u = 1.0 - t;
	let uu = u * u;
	let tt = t * t;

	start * (uu * u) + c1 * (3.0 * uu * t) + c2 * (3.0 * u * tt) + end * (tt * t)
}

/// Direction of travel along the curve at `t`, in radians.
///
/// Falls back to `0.0` where the derivative vanishes (degenerate curves).
pub fn tangent_angle_at_t(start: Point, end: Point, controls: [Point; 2], t: f64) -> f64 {
	let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
	let [c1, c2] = controls;
	let u = 1.0 - t;
	let uu = u * u;
	let tt = t * t;

	let derivative = start * (-3.0 * uu)
		+ c1 * (3.0 * uu - 6.0 * t * u)
		+ c2 * (6.0 * t * u - 3.0 * tt)
		+ end * (3.0 * tt);

	if derivative.length_sq() == 0.0 || !derivative.is_finite() {
		return 0.0;
	}
	derivative.y.atan2(derivative.x)
}

impl CurvedPath {
	pub fn point_at(&self, t: f64) -> Point {
		point_at_t(self.start, self.end, self.controls, t)
	}

	pub fn angle_at(&self, t: f64) -> f64 {
		tangent_angle_at_t(self.start, self.end, self.controls, t)
	}

	/// Where to put a label at `t`, rotated to follow the curve.
	pub fn label_anchor(&self, t: f64) -> LabelAnchor {
		LabelAnchor {
			position: self.point_at(t),
			rotation_degrees: self.angle_at(t).to_degrees(),
		}
	}

	/// SVG path data, `M x,y C c1 c2 end`.
	pub fn to_svg(&self) -> String {
		let [c1, c2] = self.controls;
		let mut out = String::with_capacity(64);
		let _ = write!(
			out,
			"M {},{} C {},{} {},{} {},{}",
			self.start.x, self.start.y, c1.x, c1.y, c2.x, c2.y, self.end.x, self.end.y
		);
		out
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const EPS: f64 = 1e-9;

	fn close(a: Point, b: Point) -> bool {
		(a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
	}

	#[test]
	fn endpoints_are_exact() {
		let cases = [
			(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 20.0),
			(Point::new(-3.5, 7.25), Point::new(12.0, -40.0), -15.0),
			(Point::new(1e6, 1e6), Point::new(-1e6, 3.0), 40.0),
			(Point::new(5.0, 5.0), Point::new(5.0, 5.0), 10.0),
		];
		for (start, end, curvature) in cases {
			let path = curved_path(start, end, curvature);
			assert_eq!(point_at_t(start, end, path.controls, 0.0), start);
			assert_eq!(point_at_t(start, end, path.controls, 1.0), end);
		}
	}

	#[test]
	fn curvature_is_clamped() {
		let (start, end) = (Point::new(10.0, 20.0), Point::new(210.0, 120.0));
		assert_eq!(curved_path(start, end, 500.0), curved_path(start, end, 40.0));
		assert_eq!(curved_path(start, end, -500.0), curved_path(start, end, -40.0));
		assert_eq!(clamp_curvature(f64::NAN), 0.0);
	}

	#[test]
	fn zero_curvature_is_collinear() {
		let (start, end) = (Point::new(0.0, 0.0), Point::new(300.0, 150.0));
		let path = curved_path(start, end, 0.0);
		let direction = end - start;
		for control in path.controls {
			let rel = control - start;
			let cross = direction.x * rel.y - direction.y * rel.x;
			assert!(cross.abs() < EPS);
		}
		assert!(close(path.controls[0], Point::new(100.0, 50.0)));
		assert!(close(path.controls[1], Point::new(200.0, 100.0)));
	}

	#[test]
	fn offset_is_a_percentage_of_length() {
		// Horizontal segment of length 300 with curvature 20 bends by 60 units
		// towards +y (the counter-clockwise perpendicular).
		let path = curved_path(Point::new(0.0, 0.0), Point::new(300.0, 0.0), 20.0);
		assert!(close(path.controls[0], Point::new(100.0, 60.0)));
		assert!(close(path.controls[1], Point::new(200.0, 60.0)));

		let mid = path.point_at(0.5);
		assert!((mid.x - 150.0).abs() < EPS);
		assert!((mid.y - 45.0).abs() < EPS);
	}

	#[test]
	fn tangent_follows_the_curve() {
		let straight = curved_path(Point::new(0.0, 0.0), Point::new(0.0, 100.0), 0.0);
		assert!((straight.angle_at(0.5) - std::f64::consts::FRAC_PI_2).abs() < EPS);

		let bent = curved_path(Point::new(0.0, 0.0), Point::new(300.0, 0.0), 20.0);
		assert!(bent.angle_at(0.0) > 0.0);
		assert!(bent.angle_at(0.5).abs() < EPS);
		assert!(bent.angle_at(1.0) < 0.0);
		assert!(bent.label_anchor(0.5).rotation_degrees.abs() < EPS);
	}

	#[test]
	fn degenerate_path_falls_back() {
		let p = Point::new(4.0, 4.0);
		let path = curved_path(p, p, 30.0);
		assert_eq!(path.controls, [p, p]);
		assert_eq!(path.point_at(0.5), p);
		assert_eq!(path.angle_at(0.5), 0.0);
	}

	#[test]
	fn svg_output() {
		let path = curved_path(Point::new(0.0, 0.0), Point::new(300.0, 0.0), 0.0);
		assert_eq!(path.to_svg(), "M 0,0 C 100,0 200,0 300,0");
	}
}
