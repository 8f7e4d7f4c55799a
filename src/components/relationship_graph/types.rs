use crate::model::{
	PersonDraft, PersonNode, RelationshipChange, RelationshipDraft, RelationshipEdge, Role,
};

/// Which dialog is open over the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogKind {
	Person,
	Relationship,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum LoadStatus {
	#[default]
	Loading,
	Ready,
	Failed(String),
}

/// Contents of the person dialog. `editing` is `None` when creating.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PersonForm {
	pub editing: Option<String>,
	pub name: String,
	pub role: Role,
	pub description: String,
}

impl PersonForm {
	pub fn edit(person: &PersonNode) -> Self {
		Self {
			editing: Some(person.id.clone()),
			name: person.name.clone(),
			role: person.role,
			description: person.description.clone().unwrap_or_default(),
		}
	}

	pub fn is_valid(&self) -> bool {
		!self.name.trim().is_empty()
	}

	pub fn draft(&self) -> PersonDraft {
		let description = self.description.trim();
		PersonDraft {
			name: self.name.trim().to_string(),
			role: self.role,
			description: (!description.is_empty()).then(|| description.to_string()),
		}
	}
}

/// Contents of the relationship dialog. `editing` is `None` when creating.
/// `conflict` marks a pair that is already connected.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RelationshipForm {
	pub editing: Option<String>,
	pub source_id: String,
	pub target_id: String,
	pub source_name: String,
	pub target_name: String,
	pub label: String,
	pub memo: String,
	pub directed: bool,
	pub conflict: bool,
}

impl RelationshipForm {
	pub fn create(source: &PersonNode, target: &PersonNode) -> Self {
		Self {
			source_id: source.id.clone(),
			target_id: target.id.clone(),
			source_name: source.name.clone(),
			target_name: target.name.clone(),
			..Self::default()
		}
	}

	pub fn edit(edge: &RelationshipEdge, source_name: &str, target_name: &str) -> Self {
		Self {
			editing: Some(edge.id.clone()),
			source_id: edge.source_id.clone(),
			target_id: edge.target_id.clone(),
			source_name: source_name.to_string(),
			target_name: target_name.to_string(),
			label: edge.label.clone(),
			memo: edge.memo.clone().unwrap_or_default(),
			directed: edge.directed,
			conflict: false,
		}
	}

	pub fn is_valid(&self) -> bool {
		!self.label.trim().is_empty() && self.source_id != self.target_id && !self.conflict
	}

	fn memo(&self) -> Option<String> {
		let memo = self.memo.trim();
		(!memo.is_empty()).then(|| memo.to_string())
	}

	pub fn draft(&self) -> RelationshipDraft {
		RelationshipDraft {
			source_id: self.source_id.clone(),
			target_id: self.target_id.clone(),
			label: self.label.trim().to_string(),
			memo: self.memo(),
			directed: self.directed,
		}
	}

	pub fn change(&self) -> RelationshipChange {
		RelationshipChange {
			label: self.label.trim().to_string(),
			memo: self.memo(),
			directed: self.directed,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn blank_fields_disable_submit() {
		let mut person = PersonForm::default();
		assert!(!person.is_valid());
		person.name = "  Choi ".into();
		assert!(person.is_valid());
		assert_eq!(person.draft().name, "Choi");
		assert_eq!(person.draft().description, None);

		let mut rel = RelationshipForm {
			source_id: "1".into(),
			target_id: "2".into(),
			..RelationshipForm::default()
		};
		assert!(!rel.is_valid());
		rel.label = "spouse".into();
		assert!(rel.is_valid());
		rel.target_id = "1".into();
		assert!(!rel.is_valid());
	}

	#[test]
	fn relationship_form_trims_memo() {
		let form = RelationshipForm {
			source_id: "1".into(),
			target_id: "2".into(),
			label: " manager ".into(),
			memo: "   ".into(),
			directed: true,
			..RelationshipForm::default()
		};
		let draft = form.draft();
		assert_eq!(draft.label, "manager");
		assert_eq!(draft.memo, None);
		assert!(form.change().directed);
	}

	#[test]
	fn already_connected_pair_cannot_be_saved() {
		let form = RelationshipForm {
			source_id: "1".into(),
			target_id: "2".into(),
			label: "spouse".into(),
			conflict: true,
			..RelationshipForm::default()
		};
		assert!(!form.is_valid());
	}
}
