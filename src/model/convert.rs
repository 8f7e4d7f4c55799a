//! Strict boundary between store payloads and the typed case graph.
//!
//! Every record is parsed on its own. Records that are malformed, incomplete
//! or that point at persons we did not keep are dropped and logged; they never
//! reach the editor.

use std::collections::HashSet;

use log::warn;
use serde::Deserialize;
use serde_json::Value;

use super::{CaseGraph, PersonNode, RelationshipEdge, Role};
use crate::geometry::Point;

/// Integer ids from the store, tolerated as strings too.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawId {
	Int(i64),
	Text(String),
}

impl RawId {
	fn into_id(self) -> Option<String> {
		match self {
			RawId::Int(n) => Some(n.to_string()),
			RawId::Text(s) => {
				let s = s.trim();
				(!s.is_empty()).then(|| s.to_string())
			}
		}
	}
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawPerson {
	#[serde(default)]
	pub id: Option<RawId>,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub role: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub position_x: Option<f64>,
	#[serde(default)]
	pub position_y: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawRelationship {
	#[serde(default)]
	pub id: Option<RawId>,
	#[serde(default)]
	pub source_person_id: Option<RawId>,
	#[serde(default)]
	pub target_person_id: Option<RawId>,
	#[serde(default)]
	pub relationship_type: Option<String>,
	#[serde(default)]
	pub label: Option<String>,
	#[serde(default)]
	pub memo: Option<String>,
	#[serde(default)]
	pub is_directed: Option<bool>,
}

#[derive(Deserialize)]
struct GraphPayload {
	#[serde(default)]
	persons: Vec<Value>,
	#[serde(default)]
	relationships: Vec<Value>,
}

/// Grid slot given to the `index`-th person when the store has no position.
pub fn default_position(index: usize) -> Point {
	Point::new(
		300.0 + (index % 3) as f64 * 200.0,
		200.0 + (index / 3) as f64 * 150.0,
	)
}

fn non_blank(s: Option<String>) -> Option<String> {
	s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Builds a person from a store record, or `None` when id, name or role is missing.
pub fn person_from_raw(raw: RawPerson, index: usize) -> Option<PersonNode> {
	let id = raw.id.and_then(RawId::into_id)?;
	let name = non_blank(raw.name)?;
	let role = non_blank(raw.role)?;
	let fallback = default_position(index);
	Some(PersonNode {
		id,
		name,
		role: Role::normalize(&role),
		description: non_blank(raw.description),
		x: raw.position_x.filter(|v| v.is_finite()).unwrap_or(fallback.x),
		y: raw.position_y.filter(|v| v.is_finite()).unwrap_or(fallback.y),
	})
}

/// Builds an edge from a store record. Endpoint existence is checked by the caller.
pub fn relationship_from_raw(raw: RawRelationship) -> Option<RelationshipEdge> {
	let id = raw.id.and_then(RawId::into_id)?;
	let source_id = raw.source_person_id.and_then(RawId::into_id)?;
	let target_id = raw.target_person_id.and_then(RawId::into_id)?;
	let label = non_blank(raw.label)
		.or_else(|| non_blank(raw.relationship_type))
		.unwrap_or_default();
	Some(RelationshipEdge {
		id,
		source_id,
		target_id,
		label,
		memo: non_blank(raw.memo),
		directed: raw.is_directed.unwrap_or(false),
	})
}

/// Parses the bulk `GET /relationships/{case}` payload.
///
/// Fails only when the document itself is not a graph object.
pub fn parse_graph(text: &str) -> Result<CaseGraph, serde_json::Error> {
	let payload: GraphPayload = serde_json::from_str(text)?;
	Ok(convert(payload.persons, payload.relationships))
}

fn convert(persons: Vec<Value>, relationships: Vec<Value>) -> CaseGraph {
	let mut graph = CaseGraph::default();
	let mut ids = HashSet::new();

	for value in persons {
		let raw = match serde_json::from_value::<RawPerson>(value) {
			Ok(raw) => raw,
			Err(err) => {
				warn!("dropping malformed person record: {err}");
				continue;
			}
		};
		let Some(person) = person_from_raw(raw, graph.persons.len()) else {
			warn!("dropping person record without id, name or role");
			continue;
		};
		if !ids.insert(person.id.clone()) {
			warn!("dropping duplicate person {}", person.id);
			continue;
		}
		graph.persons.push(person);
	}

	for value in relationships {
		let edge = match serde_json::from_value::<RawRelationship>(value) {
			Ok(raw) => relationship_from_raw(raw),
			Err(err) => {
				warn!("dropping malformed relationship record: {err}");
				continue;
			}
		};
		let Some(edge) = edge else {
			warn!("dropping relationship record without id or endpoints");
			continue;
		};
		if !ids.contains(&edge.source_id) || !ids.contains(&edge.target_id) {
			warn!("dropping relationship {} with a dangling endpoint", edge.id);
			continue;
		}
		if edge.source_id == edge.target_id {
			warn!("dropping self-referencing relationship {}", edge.id);
			continue;
		}
		if graph.connects(&edge.source_id, &edge.target_id) {
			warn!("dropping relationship {} duplicating an existing pair", edge.id);
			continue;
		}
		graph.relationships.push(edge);
	}

	graph
}
