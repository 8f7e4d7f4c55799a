use log::debug;

use super::{PersonDraft, PersonNode, RelationshipChange, RelationshipEdge, default_position};
use crate::error::ValidationError;

/// The persons and relationships of one case, as last confirmed by the store
/// (plus locally dragged positions).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CaseGraph {
	pub persons: Vec<PersonNode>,
	pub relationships: Vec<RelationshipEdge>,
}

impl CaseGraph {
	pub fn person(&self, id: &str) -> Option<&PersonNode> {
		self.persons.iter().find(|p| p.id == id)
	}

	pub fn person_mut(&mut self, id: &str) -> Option<&mut PersonNode> {
		self.persons.iter_mut().find(|p| p.id == id)
	}

	pub fn relationship(&self, id: &str) -> Option<&RelationshipEdge> {
		self.relationships.iter().find(|r| r.id == id)
	}

	/// True when any edge joins the unordered pair `{a, b}`.
	pub fn connects(&self, a: &str, b: &str) -> bool {
		self.relationships.iter().any(|r| r.joins(a, b))
	}

	/// Checks a prospective edge against the graph before it is sent anywhere.
	pub fn validate_relationship(
		&self,
		source_id: &str,
		target_id: &str,
		label: &str,
	) -> Result<(), ValidationError> {
		if source_id == target_id {
			return Err(ValidationError::SelfLoop);
		}
		for id in [source_id, target_id] {
			if self.person(id).is_none() {
				return Err(ValidationError::UnknownPerson(id.to_string()));
			}
		}
		if self.connects(source_id, target_id) {
			return Err(ValidationError::DuplicateEdge);
		}
		if label.trim().is_empty() {
			return Err(ValidationError::EmptyLabel);
		}
		Ok(())
	}

	/// Adds a person confirmed by the store, replacing any stale copy.
	pub fn insert_person(&mut self, person: PersonNode) {
		match self.person_mut(&person.id) {
			Some(existing) => *existing = person,
			None => self.persons.push(person),
		}
	}

	pub fn update_person(&mut self, id: &str, draft: &PersonDraft) -> bool {
		let Some(person) = self.person_mut(id) else {
			return false;
		};
		person.name = draft.name.clone();
		person.role = draft.role;
		person.description = draft.description.clone();
		true
	}

	pub fn move_person(&mut self, id: &str, x: f64, y: f64) -> bool {
		let Some(person) = self.person_mut(id) else {
			return false;
		};
		person.x = x;
		person.y = y;
		true
	}

	/// Removes a person and every edge incident to it. Returns the removed edge ids.
	pub fn remove_person(&mut self, id: &str) -> Vec<String> {
		self.persons.retain(|p| p.id != id);
		let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.relationships)
			.into_iter()
			.partition(|r| r.touches(id));
		self.relationships = kept;
		debug!("removed person {id} and {} incident relationship(s)", removed.len());
		removed.into_iter().map(|r| r.id).collect()
	}

	pub fn insert_relationship(&mut self, edge: RelationshipEdge) {
		match self.relationships.iter_mut().find(|r| r.id == edge.id) {
			Some(existing) => *existing = edge,
			None => self.relationships.push(edge),
		}
	}

	pub fn update_relationship(&mut self, id: &str, change: &RelationshipChange) -> bool {
		let Some(edge) = self.relationships.iter_mut().find(|r| r.id == id) else {
			return false;
		};
		edge.label = change.label.clone();
		edge.memo = change.memo.clone();
		edge.directed = change.directed;
		true
	}

	pub fn remove_relationship(&mut self, id: &str) -> bool {
		let before = self.relationships.len();
		self.relationships.retain(|r| r.id != id);
		self.relationships.len() != before
	}

	/// True when nobody has been placed yet: every person still sits on the
	/// grid slot the converter assigns by index.
	pub fn has_default_layout(&self) -> bool {
		self.persons.iter().enumerate().all(|(i, p)| p.position() == default_position(i))
	}
}
