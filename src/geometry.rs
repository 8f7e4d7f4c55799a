//! Small 2D value types shared by the model, viewport and renderer.

use std::ops::{Add, Div, Mul, Sub};

/// A point or vector in either screen or canvas space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn length(self) -> f64 {
		(self.x * self.x + self.y * self.y).sqrt()
	}

	pub fn distance(self, other: Point) -> f64 {
		(self - other).length()
	}

	pub fn lerp(self, other: Point, t: f64) -> Point {
		self + (other - self) * t
	}
}

impl Add for Point {
	type Output = Point;

	fn add(self, rhs: Point) -> Point {
		Point::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl Sub for Point {
	type Output = Point;

	fn sub(self, rhs: Point) -> Point {
		Point::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl Mul<f64> for Point {
	type Output = Point;

	fn mul(self, k: f64) -> Point {
		Point::new(self.x * k, self.y * k)
	}
}

impl Div<f64> for Point {
	type Output = Point;

	fn div(self, k: f64) -> Point {
		Point::new(self.x / k, self.y / k)
	}
}

/// Axis-aligned rectangle given by its top-left corner and size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl Rect {
	pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
		Self {
			x,
			y,
			width,
			height,
		}
	}

	pub fn center(&self) -> Point {
		Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
	}

	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
	}

	/// Smallest rectangle covering both.
	pub fn union(&self, other: &Rect) -> Rect {
		let (x0, y0) = (self.x.min(other.x), self.y.min(other.y));
		let (x1, y1) = (
			(self.x + self.width).max(other.x + other.width),
			(self.y + self.height).max(other.y + other.height),
		);
		Rect::new(x0, y0, x1 - x0, y1 - y0)
	}
}
