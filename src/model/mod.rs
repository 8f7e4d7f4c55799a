//! Persons, relationships and the case graph that owns them.

mod convert;
mod graph;
mod role;

pub use convert::{
	RawId, RawPerson, RawRelationship, default_position, parse_graph, person_from_raw,
	relationship_from_raw,
};
pub use graph::CaseGraph;
pub use role::Role;

use crate::geometry::{Point, Rect};

/// Footprint of every person box on the canvas.
pub const NODE_WIDTH: f64 = 140.0;
pub const NODE_HEIGHT: f64 = 56.0;

#[derive(Clone, Debug, PartialEq)]
pub struct PersonNode {
	pub id: String,
	pub name: String,
	pub role: Role,
	pub description: Option<String>,
	/// Top-left corner in canvas space.
	pub x: f64,
	pub y: f64,
}

impl PersonNode {
	pub fn position(&self) -> Point {
		Point::new(self.x, self.y)
	}

	pub fn bounds(&self) -> Rect {
		Rect::new(self.x, self.y, NODE_WIDTH, NODE_HEIGHT)
	}

	pub fn center(&self) -> Point {
		self.bounds().center()
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct RelationshipEdge {
	pub id: String,
	pub source_id: String,
	pub target_id: String,
	pub label: String,
	pub memo: Option<String>,
	pub directed: bool,
}

impl RelationshipEdge {
	pub fn touches(&self, person_id: &str) -> bool {
		self.source_id == person_id || self.target_id == person_id
	}

	/// True when the edge joins `a` and `b` in either direction.
	pub fn joins(&self, a: &str, b: &str) -> bool {
		(self.source_id == a && self.target_id == b) || (self.source_id == b && self.target_id == a)
	}
}

/// Fields the user edits for a person.
#[derive(Clone, Debug, PartialEq)]
pub struct PersonDraft {
	pub name: String,
	pub role: Role,
	pub description: Option<String>,
}

/// A relationship about to be created.
#[derive(Clone, Debug, PartialEq)]
pub struct RelationshipDraft {
	pub source_id: String,
	pub target_id: String,
	pub label: String,
	pub memo: Option<String>,
	pub directed: bool,
}

/// Editable fields of an existing relationship.
#[derive(Clone, Debug, PartialEq)]
pub struct RelationshipChange {
	pub label: String,
	pub memo: Option<String>,
	pub directed: bool,
}
