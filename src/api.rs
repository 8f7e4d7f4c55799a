//! Client for the case relationship store.
//!
//! Requests are built as plain [`ApiRequest`] values so the wire contract can
//! be checked without a browser, then sent through the window `fetch`.

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestCredentials, RequestInit, RequestMode, Response};

use crate::error::ApiError;
use crate::geometry::Point;
use crate::model::{
	CaseGraph, PersonDraft, PersonNode, RawPerson, RawRelationship, RelationshipChange,
	RelationshipDraft, RelationshipEdge, parse_graph, person_from_raw, relationship_from_raw,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
	Get,
	Post,
	Put,
	Patch,
	Delete,
}

impl Method {
	pub fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}

/// One round trip against the store, before it is sent.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
	pub method: Method,
	/// Path relative to the base URL, including any query string.
	pub path: String,
	pub body: Option<Value>,
}

#[derive(Serialize)]
struct PersonBody<'a> {
	name: &'a str,
	role: &'a str,
	description: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	position_x: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	position_y: Option<f64>,
}

/// Store ids are integers; anything else is passed through as text.
fn id_value(id: &str) -> Value {
	id.parse::<i64>().map(Value::from).unwrap_or_else(|_| Value::from(id))
}

fn person_body(draft: &PersonDraft, position: Option<Point>) -> Value {
	serde_json::to_value(PersonBody {
		name: draft.name.trim(),
		role: draft.role.as_str(),
		description: draft.description.as_deref().unwrap_or(""),
		position_x: position.map(|p| p.x.round()),
		position_y: position.map(|p| p.y.round()),
	})
	.unwrap_or_default()
}

fn relationship_fields(label: &str, memo: Option<&str>, directed: bool) -> serde_json::Map<String, Value> {
	let mut body = serde_json::Map::new();
	body.insert("relationship_type".into(), Value::from(label.trim()));
	body.insert("label".into(), Value::from(label.trim()));
	body.insert("memo".into(), memo.map(Value::from).unwrap_or(Value::Null));
	body.insert("is_directed".into(), Value::from(directed));
	body
}

/// Request façade for one case. Holds no mutable state.
#[derive(Clone, Debug)]
pub struct RelationshipApi {
	base_url: String,
	case_id: String,
}

impl RelationshipApi {
	pub fn new(base_url: &str, case_id: &str) -> Self {
		Self {
			base_url: base_url.trim_end_matches('/').to_string(),
			case_id: case_id.to_string(),
		}
	}

	pub fn case_id(&self) -> &str {
		&self.case_id
	}

	fn case_path(&self) -> String {
		format!("/relationships/{}", self.case_id)
	}

	pub fn fetch_graph_request(&self) -> ApiRequest {
		ApiRequest {
			method: Method::Get,
			path: self.case_path(),
			body: None,
		}
	}

	pub fn create_person_request(&self, draft: &PersonDraft, position: Point) -> ApiRequest {
		ApiRequest {
			method: Method::Post,
			path: format!("{}/persons", self.case_path()),
			body: Some(person_body(draft, Some(position))),
		}
	}

	pub fn update_person_request(&self, id: &str, draft: &PersonDraft) -> ApiRequest {
		ApiRequest {
			method: Method::Put,
			path: format!("{}/persons/{id}", self.case_path()),
			body: Some(person_body(draft, None)),
		}
	}

	pub fn delete_person_request(&self, id: &str) -> ApiRequest {
		ApiRequest {
			method: Method::Delete,
			path: format!("{}/persons/{id}", self.case_path()),
			body: None,
		}
	}

	/// Coordinates are rounded to whole canvas units.
	pub fn save_position_request(&self, id: &str, x: f64, y: f64) -> ApiRequest {
		ApiRequest {
			method: Method::Patch,
			path: format!(
				"{}/persons/{id}/position?position_x={}&position_y={}",
				self.case_path(),
				x.round(),
				y.round()
			),
			body: None,
		}
	}

	pub fn create_relationship_request(&self, draft: &RelationshipDraft) -> ApiRequest {
		let mut body = relationship_fields(&draft.label, draft.memo.as_deref(), draft.directed);
		body.insert("source_person_id".into(), id_value(&draft.source_id));
		body.insert("target_person_id".into(), id_value(&draft.target_id));
		ApiRequest {
			method: Method::Post,
			path: format!("{}/relationships", self.case_path()),
			body: Some(Value::Object(body)),
		}
	}

	pub fn update_relationship_request(&self, id: &str, change: &RelationshipChange) -> ApiRequest {
		let body = relationship_fields(&change.label, change.memo.as_deref(), change.directed);
		ApiRequest {
			method: Method::Put,
			path: format!("{}/relationships/{id}", self.case_path()),
			body: Some(Value::Object(body)),
		}
	}

	pub fn delete_relationship_request(&self, id: &str) -> ApiRequest {
		ApiRequest {
			method: Method::Delete,
			path: format!("{}/relationships/{id}", self.case_path()),
			body: None,
		}
	}

	/// Sends a request and returns the response body text.
	pub async fn send(&self, request: &ApiRequest) -> Result<String, ApiError> {
		let url = format!("{}{}", self.base_url, request.path);
		debug!("{} {}", request.method.as_str(), url);

		let opts = RequestInit::new();
		opts.set_method(request.method.as_str());
		opts.set_mode(RequestMode::Cors);
		opts.set_credentials(RequestCredentials::Include);
		if let Some(body) = &request.body {
			opts.set_body(&body.to_string().into());
		}

		let req = Request::new_with_str_and_init(&url, &opts)
			.map_err(|e| ApiError::Network(format!("{e:?}")))?;
		if request.body.is_some() {
			req.headers()
				.set("Content-Type", "application/json")
				.map_err(|e| ApiError::Network(format!("{e:?}")))?;
		}

		let window = web_sys::window().ok_or_else(|| ApiError::Network("no window".into()))?;
		let resp: Response = JsFuture::from(window.fetch_with_request(&req))
			.await
			.map_err(|e| ApiError::Network(format!("{e:?}")))?
			.dyn_into()
			.map_err(|_| ApiError::Decode("fetch did not yield a Response".into()))?;

		let text = JsFuture::from(resp.text().map_err(|e| ApiError::Decode(format!("{e:?}")))?)
			.await
			.map_err(|e| ApiError::Network(format!("{e:?}")))?
			.as_string()
			.unwrap_or_default();

		if !resp.ok() {
			return Err(ApiError::Status {
				status: resp.status(),
				message: text,
			});
		}
		Ok(text)
	}

	async fn send_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ApiError> {
		let text = self.send(request).await?;
		Ok(serde_json::from_str(&text)?)
	}

	pub async fn fetch_graph(&self) -> Result<CaseGraph, ApiError> {
		let text = self.send(&self.fetch_graph_request()).await?;
		Ok(parse_graph(&text)?)
	}

	/// `index` is the slot the person will take, used for its fallback position.
	pub async fn add_person(
		&self,
		draft: &PersonDraft,
		position: Point,
		index: usize,
	) -> Result<PersonNode, ApiError> {
		let raw: RawPerson = self
			.send_json(&self.create_person_request(draft, position))
			.await?;
		person_from_raw(raw, index)
			.ok_or_else(|| ApiError::Decode("created person is missing id, name or role".into()))
	}

	pub async fn update_person(&self, id: &str, draft: &PersonDraft) -> Result<(), ApiError> {
		self.send(&self.update_person_request(id, draft)).await.map(drop)
	}

	pub async fn delete_person(&self, id: &str) -> Result<(), ApiError> {
		self.send(&self.delete_person_request(id)).await.map(drop)
	}

	pub async fn save_position(&self, id: &str, x: f64, y: f64) -> Result<(), ApiError> {
		self.send(&self.save_position_request(id, x, y)).await.map(drop)
	}

	pub async fn add_relationship(
		&self,
		draft: &RelationshipDraft,
	) -> Result<RelationshipEdge, ApiError> {
		let raw: RawRelationship = self
			.send_json(&self.create_relationship_request(draft))
			.await?;
		relationship_from_raw(raw)
			.ok_or_else(|| ApiError::Decode("created relationship is missing id or endpoints".into()))
	}

	pub async fn update_relationship(
		&self,
		id: &str,
		change: &RelationshipChange,
	) -> Result<(), ApiError> {
		self.send(&self.update_relationship_request(id, change))
			.await
			.map(drop)
	}

	pub async fn delete_relationship(&self, id: &str) -> Result<(), ApiError> {
		self.send(&self.delete_relationship_request(id)).await.map(drop)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::Role;
	use serde_json::json;

	fn api() -> RelationshipApi {
		RelationshipApi::new("https://legal.example/api/", "42")
	}

	#[test]
	fn paths_are_case_scoped() {
		let api = api();
		assert_eq!(api.fetch_graph_request().path, "/relationships/42");
		assert_eq!(api.delete_person_request("7").path, "/relationships/42/persons/7");
		assert_eq!(
			api.delete_relationship_request("9").method,
			Method::Delete
		);
		assert_eq!(
			api.delete_relationship_request("9").path,
			"/relationships/42/relationships/9"
		);
	}

	#[test]
	fn position_save_rounds_into_query() {
		let req = api().save_position_request("7", 120.4, -33.6);
		assert_eq!(req.method, Method::Patch);
		assert_eq!(
			req.path,
			"/relationships/42/persons/7/position?position_x=120&position_y=-34"
		);
		assert_eq!(req.body, None);
	}

	#[test]
	fn person_bodies_follow_wire_names() {
		let draft = PersonDraft {
			name: " Park ".into(),
			role: Role::Witness,
			description: None,
		};
		let create = api().create_person_request(&draft, Point::new(10.2, 20.7));
		assert_eq!(create.method, Method::Post);
		assert_eq!(
			create.body,
			Some(json!({
				"name": "Park",
				"role": "witness",
				"description": "",
				"position_x": 10.0,
				"position_y": 21.0
			}))
		);

		let update = api().update_person_request("3", &draft);
		assert_eq!(update.method, Method::Put);
		assert_eq!(
			update.body,
			Some(json!({ "name": "Park", "role": "witness", "description": "" }))
		);
	}

	#[test]
	fn relationship_body_sends_integer_ids() {
		let draft = RelationshipDraft {
			source_id: "1".into(),
			target_id: "tmp-2".into(),
			label: "manager".into(),
			memo: Some("direct report".into()),
			directed: true,
		};
		let req = api().create_relationship_request(&draft);
		assert_eq!(
			req.body,
			Some(json!({
				"source_person_id": 1,
				"target_person_id": "tmp-2",
				"relationship_type": "manager",
				"label": "manager",
				"memo": "direct report",
				"is_directed": true
			}))
		);
	}

	#[test]
	fn relationship_update_has_no_endpoints() {
		let change = RelationshipChange {
			label: "friend".into(),
			memo: None,
			directed: false,
		};
		let req = api().update_relationship_request("5", &change);
		assert_eq!(req.path, "/relationships/42/relationships/5");
		assert_eq!(
			req.body,
			Some(json!({
				"relationship_type": "friend",
				"label": "friend",
				"memo": null,
				"is_directed": false
			}))
		);
	}
}
