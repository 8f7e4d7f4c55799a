//! Curved edge geometry shared by drawing and hit-testing.

use crate::geometry::{Point, Rect};

/// Bow of the curve relative to the distance between centres.
pub const BOW_RATIO: f64 = 0.15;
pub const MAX_BOW: f64 = 60.0;
/// Visible stroke width, in screen pixels.
pub const EDGE_WIDTH: f64 = 2.0;
/// Pointer tolerance around a curve, in screen pixels.
pub const EDGE_HIT_TOLERANCE: f64 = 8.0;
pub const ARROW_SIZE: f64 = 10.0;

const SAMPLES: usize = 32;

/// Quadratic Bézier from the source centre to the target centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeCurve {
	pub start: Point,
	pub control: Point,
	pub end: Point,
}

impl EdgeCurve {
	/// `None` when both centres coincide.
	pub fn between(start: Point, end: Point) -> Option<Self> {
		let delta = end - start;
		let len = delta.length();
		if len < 1e-3 {
			return None;
		}
		let normal = Point::new(-delta.y / len, delta.x / len);
		let bow = (len * BOW_RATIO).min(MAX_BOW);
		Some(Self {
			start,
			control: start.lerp(end, 0.5) + normal * bow,
			end,
		})
	}

	pub fn point_at(&self, t: f64) -> Point {
		let u = 1.0 - t;
		self.start * (u * u) + self.control * (2.0 * u * t) + self.end * (t * t)
	}

	pub fn tangent_at(&self, t: f64) -> Point {
		(self.control - self.start) * (2.0 * (1.0 - t)) + (self.end - self.control) * (2.0 * t)
	}

	/// Where the label pill is centred.
	pub fn label_anchor(&self) -> Point {
		self.control
	}

	/// Approximate distance from `p` to the curve.
	pub fn distance_to(&self, p: Point) -> f64 {
		let mut prev = self.start;
		let mut best = f64::INFINITY;
		for i in 1..=SAMPLES {
			let next = self.point_at(i as f64 / SAMPLES as f64);
			best = best.min(segment_distance(p, prev, next));
			prev = next;
		}
		best
	}

	/// Curve parameter at which the curve enters `target` (searched from the
	/// midpoint towards the end).
	pub fn entry_t(&self, target: &Rect) -> f64 {
		let (mut lo, mut hi) = (0.5, 1.0);
		if target.contains(self.point_at(lo)) {
			return lo;
		}
		for _ in 0..24 {
			let mid = (lo + hi) / 2.0;
			if target.contains(self.point_at(mid)) {
				hi = mid;
			} else {
				lo = mid;
			}
		}
		hi
	}

	/// Triangle `[tip, left, right]` pointing into `target`, sized in canvas units.
	pub fn arrowhead(&self, target: &Rect, size: f64) -> [Point; 3] {
		let t = self.entry_t(target);
		let tip = self.point_at(t);
		let dir = self.tangent_at(t);
		let len = dir.length().max(1e-9);
		let (ux, uy) = (dir.x / len, dir.y / len);
		let back = tip - Point::new(ux, uy) * size;
		let side = Point::new(-uy, ux) * (size * 0.5);
		[tip, back + side, back - side]
	}
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
	let ab = b - a;
	let len2 = ab.x * ab.x + ab.y * ab.y;
	if len2 < 1e-12 {
		return p.distance(a);
	}
	let t = (((p.x - a.x) * ab.x + (p.y - a.y) * ab.y) / len2).clamp(0.0, 1.0);
	p.distance(a + ab * t)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bow_is_proportional_then_capped() {
		let short = EdgeCurve::between(Point::new(0.0, 0.0), Point::new(100.0, 0.0)).unwrap();
		assert!((short.control.y - 15.0).abs() < 1e-9);
		let long = EdgeCurve::between(Point::new(0.0, 0.0), Point::new(1000.0, 0.0)).unwrap();
		assert!((long.control.y - MAX_BOW).abs() < 1e-9);
	}

	#[test]
	fn opposite_directions_bow_opposite_ways() {
		let (a, b) = (Point::new(0.0, 0.0), Point::new(200.0, 0.0));
		let ab = EdgeCurve::between(a, b).unwrap();
		let ba = EdgeCurve::between(b, a).unwrap();
		assert!(ab.control.y > 0.0 && ba.control.y < 0.0);
	}

	#[test]
	fn coincident_centres_have_no_curve() {
		assert!(EdgeCurve::between(Point::new(5.0, 5.0), Point::new(5.0, 5.0)).is_none());
	}

	#[test]
	fn distance_is_small_on_curve_and_large_off_it() {
		let curve = EdgeCurve::between(Point::new(0.0, 0.0), Point::new(300.0, 0.0)).unwrap();
		assert!(curve.distance_to(curve.point_at(0.37)) < 0.5);
		assert!(curve.distance_to(Point::new(150.0, -40.0)) > EDGE_HIT_TOLERANCE);
	}

	#[test]
	fn arrow_tip_sits_on_target_border() {
		let target = Rect::new(330.0, -28.0, 140.0, 56.0);
		let curve = EdgeCurve::between(Point::new(0.0, 0.0), target.center()).unwrap();
		let [tip, left, right] = curve.arrowhead(&target, ARROW_SIZE);
		assert!((tip.x - target.x).abs() < 0.5 || (tip.y - target.y).abs() < 0.5);
		assert!(!target.contains(left) || !target.contains(right));
	}
}
