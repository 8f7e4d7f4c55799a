use serde::{Deserialize, Serialize};

/// The part a person plays in the case narrative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	Victim,
	Perpetrator,
	Witness,
	Colleague,
	#[default]
	Unknown,
}

impl Role {
	pub const ALL: [Role; 5] = [
		Role::Victim,
		Role::Perpetrator,
		Role::Witness,
		Role::Colleague,
		Role::Unknown,
	];

	/// Wire form sent to the relationship store.
	pub fn as_str(self) -> &'static str {
		match self {
			Role::Victim => "victim",
			Role::Perpetrator => "perpetrator",
			Role::Witness => "witness",
			Role::Colleague => "colleague",
			Role::Unknown => "unknown",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Role::Victim => "Victim",
			Role::Perpetrator => "Perpetrator",
			Role::Witness => "Witness",
			Role::Colleague => "Colleague",
			Role::Unknown => "Unknown",
		}
	}

	pub fn color(self) -> &'static str {
		match self {
			Role::Victim => "#2ca02c",
			Role::Perpetrator => "#d62728",
			Role::Witness => "#1f77b4",
			Role::Colleague => "#ff7f0e",
			Role::Unknown => "#7f7f7f",
		}
	}

	/// Maps any backend role string onto the closed set. Never fails.
	pub fn normalize(raw: &str) -> Role {
		match raw.trim().to_lowercase().as_str() {
			"victim" | "plaintiff" | "accuser" | "complainant" | "피해자" => Role::Victim,
			"perpetrator" | "defendant" | "accused" | "offender" | "suspect" | "가해자" => {
				Role::Perpetrator
			}
			"witness" | "bystander" | "observer" | "목격자" => Role::Witness,
			"colleague" | "superior" | "subordinate" | "coworker" | "manager" | "동료" | "상사" => {
				Role::Colleague
			}
			_ => Role::Unknown,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn canonical_names_map_to_themselves() {
		for role in Role::ALL {
			assert_eq!(Role::normalize(role.as_str()), role);
		}
	}

	#[test]
	fn legacy_names_are_remapped() {
		assert_eq!(Role::normalize("plaintiff"), Role::Victim);
		assert_eq!(Role::normalize("Accuser"), Role::Victim);
		assert_eq!(Role::normalize(" defendant "), Role::Perpetrator);
		assert_eq!(Role::normalize("superior"), Role::Colleague);
		assert_eq!(Role::normalize("피해자"), Role::Victim);
	}

	#[test]
	fn anything_else_is_unknown() {
		for raw in ["", "judge", "VICTIMS", "123", "🙂"] {
			assert_eq!(Role::normalize(raw), Role::Unknown, "{raw:?}");
		}
	}
}
