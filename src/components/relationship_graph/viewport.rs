use crate::geometry::{Point, Rect};
use crate::model::PersonNode;

pub const MIN_ZOOM: f64 = 0.3;
pub const MAX_ZOOM: f64 = 2.0;
/// Screen pixels kept free around the content by [`Viewport::fit_to_view`].
pub const FIT_PADDING: f64 = 50.0;

/// Maps screen pixels (relative to the canvas' top-left) to canvas space:
/// `screen = canvas * zoom + pan`.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
	pub zoom: f64,
	pub pan: Point,
}

impl Default for Viewport {
	fn default() -> Self {
		Self {
			zoom: 1.0,
			pan: Point::default(),
		}
	}
}

impl Viewport {
	pub fn screen_to_canvas(&self, screen: Point) -> Point {
		(screen - self.pan) / self.zoom
	}

	pub fn canvas_to_screen(&self, canvas: Point) -> Point {
		canvas * self.zoom + self.pan
	}

	/// Scales by `factor` keeping the canvas point under `screen` fixed.
	pub fn zoom_at(&mut self, screen: Point, factor: f64) {
		let anchor = self.screen_to_canvas(screen);
		self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		self.pan = screen - anchor * self.zoom;
	}

	/// One wheel notch zooms by 10%.
	pub fn wheel_factor(delta_y: f64) -> f64 {
		if delta_y > 0.0 { 0.9 } else { 1.1 }
	}

	pub fn pan_by(&mut self, screen_delta: Point) {
		self.pan = self.pan + screen_delta;
	}

	/// Zooms and centres so every person box fits in a `width`×`height`
	/// canvas. Leaves the viewport untouched for fewer than two persons.
	pub fn fit_to_view(&mut self, persons: &[PersonNode], width: f64, height: f64) -> bool {
		if persons.len() < 2 {
			return false;
		}
		let Some(bounds) = persons
			.iter()
			.map(PersonNode::bounds)
			.reduce(|acc, b| acc.union(&b))
		else {
			return false;
		};
		let (avail_w, avail_h) = (
			(width - 2.0 * FIT_PADDING).max(1.0),
			(height - 2.0 * FIT_PADDING).max(1.0),
		);
		let zoom = (avail_w / bounds.width.max(1.0))
			.min(avail_h / bounds.height.max(1.0))
			.clamp(MIN_ZOOM, MAX_ZOOM);
		self.zoom = zoom;
		self.pan = Point::new(width / 2.0, height / 2.0) - bounds.center() * zoom;
		true
	}

	/// The canvas-space rectangle currently visible.
	pub fn visible_rect(&self, width: f64, height: f64) -> Rect {
		let origin = self.screen_to_canvas(Point::default());
		Rect::new(origin.x, origin.y, width / self.zoom, height / self.zoom)
	}
}
