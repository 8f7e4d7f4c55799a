//! Error types for the relationship store and local validation.

use thiserror::Error;

/// A request against the relationship store failed.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ApiError {
	#[error("network error: {0}")]
	Network(String),
	#[error("server responded with HTTP {status}: {message}")]
	Status { status: u16, message: String },
	#[error("unexpected response: {0}")]
	Decode(String),
}

impl From<serde_json::Error> for ApiError {
	fn from(err: serde_json::Error) -> Self {
		ApiError::Decode(err.to_string())
	}
}

/// A local edit was rejected before reaching the store.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
	#[error("a person needs a name")]
	EmptyName,
	#[error("a relationship needs a label")]
	EmptyLabel,
	#[error("a person cannot be related to themselves")]
	SelfLoop,
	#[error("these two people are already connected")]
	DuplicateEdge,
	#[error("unknown person `{0}`")]
	UnknownPerson(String),
}
