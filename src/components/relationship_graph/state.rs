use log::{debug, info};

use super::edge_geometry::{EDGE_HIT_TOLERANCE, EdgeCurve};
use super::interaction::{GestureOutcome, HitTarget, Interaction, PointerButton, Selection};
use super::layout::{LayoutOptions, apply_auto_layout};
use super::viewport::Viewport;
use crate::error::ApiError;
use crate::geometry::Point;
use crate::model::{
	CaseGraph, NODE_HEIGHT, NODE_WIDTH, PersonDraft, PersonNode, RelationshipChange,
	RelationshipEdge,
};

/// Radius of the connect handle drawn on a node's right edge, canvas units.
pub const HANDLE_RADIUS: f64 = 6.0;
/// Hit radius of the connect handle, screen pixels.
pub const HANDLE_HIT_RADIUS: f64 = 10.0;

/// Everything the canvas draws and the pointer handlers mutate.
pub struct EditorState {
	pub graph: CaseGraph,
	pub viewport: Viewport,
	pub interaction: Interaction,
	pub selection: Selection,
	pub hover: Option<String>,
	pub width: f64,
	pub height: f64,
}

/// Connect handle centre for a person box.
pub fn handle_center(person: &PersonNode) -> Point {
	Point::new(person.x + NODE_WIDTH, person.y + NODE_HEIGHT / 2.0)
}

impl EditorState {
	/// Lays out untouched graphs, then fits them into the canvas.
	pub fn new(mut graph: CaseGraph, width: f64, height: f64, layout: &LayoutOptions) -> Self {
		if apply_auto_layout(&mut graph, layout) {
			debug!("auto layout applied to {} person(s)", graph.persons.len());
		}
		let mut state = Self {
			graph,
			viewport: Viewport::default(),
			interaction: Interaction::Idle,
			selection: Selection::None,
			hover: None,
			width,
			height,
		};
		state.fit_view();
		state
	}

	/// Fit-to-view. Fewer than two persons leave the viewport as it is.
	pub fn fit_view(&mut self) -> bool {
		self.viewport.fit_to_view(&self.graph.persons, self.width, self.height)
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	pub fn zoom_at(&mut self, screen: Point, factor: f64) {
		self.viewport.zoom_at(screen, factor);
	}

	pub fn on_wheel(&mut self, screen: Point, delta_y: f64) {
		self.zoom_at(screen, Viewport::wheel_factor(delta_y));
	}

	/// Canvas point at the middle of the visible area.
	pub fn visible_center(&self) -> Point {
		self.viewport.visible_rect(self.width, self.height).center()
	}

	pub fn hit_test(&self, screen: Point) -> HitTarget {
		let world = self.viewport.screen_to_canvas(screen);
		let zoom = self.viewport.zoom;

		// Topmost (last drawn) first.
		for person in self.graph.persons.iter().rev() {
			if handle_center(person).distance(world) * zoom <= HANDLE_HIT_RADIUS {
				return HitTarget::ConnectHandle(person.id.clone());
			}
			if person.bounds().contains(world) {
				return HitTarget::Node(person.id.clone());
			}
		}

		let tolerance = EDGE_HIT_TOLERANCE / zoom;
		let mut best: Option<(f64, &str)> = None;
		for rel in &self.graph.relationships {
			let (Some(s), Some(t)) = (
				self.graph.person(&rel.source_id),
				self.graph.person(&rel.target_id),
			) else {
				continue;
			};
			let Some(curve) = EdgeCurve::between(s.center(), t.center()) else {
				continue;
			};
			let d = curve.distance_to(world);
			if d <= tolerance && best.is_none_or(|(bd, _)| d < bd) {
				best = Some((d, rel.id.as_str()));
			}
		}
		match best {
			Some((_, id)) => HitTarget::Edge(id.to_string()),
			None => HitTarget::Background,
		}
	}

	/// Starts a gesture. Ignored while another one is running.
	pub fn pointer_down(&mut self, screen: Point, button: PointerButton) {
		if !self.interaction.is_idle() {
			return;
		}
		if button == PointerButton::Middle {
			self.interaction = Interaction::Panning {
				last: screen,
				moved: false,
				from_background: false,
			};
			return;
		}
		if button != PointerButton::Primary {
			return;
		}

		let world = self.viewport.screen_to_canvas(screen);
		match self.hit_test(screen) {
			HitTarget::ConnectHandle(source_id) => {
				self.interaction = Interaction::Connecting {
					source_id,
					pointer: world,
				};
			}
			HitTarget::Node(node_id) => {
				let Some(person) = self.graph.person(&node_id) else {
					return;
				};
				self.interaction = Interaction::DraggingNode {
					grab_offset: world - person.position(),
					node_id: node_id.clone(),
					moved: false,
				};
				self.selection = Selection::Node(node_id);
			}
			HitTarget::Edge(edge_id) => {
				self.selection = Selection::Edge(edge_id);
			}
			HitTarget::Background => {
				self.interaction = Interaction::Panning {
					last: screen,
					moved: false,
					from_background: true,
				};
			}
		}
	}

	pub fn pointer_move(&mut self, screen: Point) {
		if self.interaction.is_idle() {
			self.hover = match self.hit_test(screen) {
				HitTarget::Node(id) | HitTarget::ConnectHandle(id) => Some(id),
				_ => None,
			};
			return;
		}
		let world = self.viewport.screen_to_canvas(screen);
		match &mut self.interaction {
			Interaction::Idle => {}
			Interaction::DraggingNode {
				node_id,
				grab_offset,
				moved,
			} => {
				let target = world - *grab_offset;
				if self.graph.move_person(node_id, target.x, target.y) {
					*moved = true;
				}
			}
			Interaction::Connecting { pointer, .. } => *pointer = world,
			Interaction::Panning { last, moved, .. } => {
				let delta = screen - *last;
				*last = screen;
				if delta != Point::default() {
					*moved = true;
					self.viewport.pan_by(delta);
				}
			}
		}
	}

	/// Finishes the current gesture and reports what should follow it.
	pub fn pointer_up(&mut self, screen: Point) -> Option<GestureOutcome> {
		match std::mem::take(&mut self.interaction) {
			Interaction::Idle => None,
			Interaction::DraggingNode { node_id, moved, .. } => {
				if !moved {
					return None;
				}
				let person = self.graph.person(&node_id)?;
				Some(GestureOutcome::SavePosition {
					person_id: node_id,
					x: person.x.round(),
					y: person.y.round(),
				})
			}
			Interaction::Connecting { source_id, .. } => {
				let world = self.viewport.screen_to_canvas(screen);
				let target = self
					.graph
					.persons
					.iter()
					.rev()
					.find(|p| p.bounds().contains(world))?;
				if target.id == source_id || self.graph.connects(&source_id, &target.id) {
					debug!("discarding connection {source_id} -> {}", target.id);
					return None;
				}
				Some(GestureOutcome::ConnectRequest {
					target_id: target.id.clone(),
					source_id,
				})
			}
			Interaction::Panning {
				moved,
				from_background,
				..
			} => {
				if from_background && !moved {
					self.selection = Selection::None;
				}
				None
			}
		}
	}

	/// Leaving the canvas ends a drag as a release would. Pans and pending
	/// connections are dropped.
	pub fn pointer_leave(&mut self) -> Option<GestureOutcome> {
		self.hover = None;
		match self.interaction {
			Interaction::Connecting { .. } => {
				self.interaction = Interaction::Idle;
				None
			}
			Interaction::Panning { .. } => {
				self.interaction = Interaction::Idle;
				None
			}
			_ => self.pointer_up(Point::default()),
		}
	}

	// Store results. The graph changes only for an `Ok`; an `Err` is handed
	// back untouched.

	pub fn apply_person_added(&mut self, result: Result<PersonNode, ApiError>) -> Result<(), ApiError> {
		let person = result?;
		info!("added person {} ({})", person.id, person.name);
		self.selection = Selection::Node(person.id.clone());
		self.graph.insert_person(person);
		Ok(())
	}

	pub fn apply_person_updated(
		&mut self,
		id: &str,
		draft: &PersonDraft,
		result: Result<(), ApiError>,
	) -> Result<(), ApiError> {
		result?;
		self.graph.update_person(id, draft);
		Ok(())
	}

	/// Incident relationships go with the person.
	pub fn apply_person_deleted(&mut self, id: &str, result: Result<(), ApiError>) -> Result<(), ApiError> {
		result?;
		let dropped = self.graph.remove_person(id);
		info!("deleted person {id} with {} relationship(s)", dropped.len());
		self.prune_selection();
		Ok(())
	}

	pub fn apply_relationship_added(
		&mut self,
		result: Result<RelationshipEdge, ApiError>,
	) -> Result<(), ApiError> {
		let edge = result?;
		info!("added relationship {} ({})", edge.id, edge.label);
		self.selection = Selection::Edge(edge.id.clone());
		self.graph.insert_relationship(edge);
		Ok(())
	}

	pub fn apply_relationship_updated(
		&mut self,
		id: &str,
		change: &RelationshipChange,
		result: Result<(), ApiError>,
	) -> Result<(), ApiError> {
		result?;
		self.graph.update_relationship(id, change);
		Ok(())
	}

	pub fn apply_relationship_deleted(&mut self, id: &str, result: Result<(), ApiError>) -> Result<(), ApiError> {
		result?;
		self.graph.remove_relationship(id);
		info!("deleted relationship {id}");
		self.prune_selection();
		Ok(())
	}

	/// Drops selection entries that no longer exist in the graph.
	pub fn prune_selection(&mut self) {
		let stale = match &self.selection {
			Selection::None => false,
			Selection::Node(id) => self.graph.person(id).is_none(),
			Selection::Edge(id) => self.graph.relationship(id).is_none(),
		};
		if stale {
			self.selection = Selection::None;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::Role;

	fn person(id: &str, x: f64, y: f64) -> PersonNode {
		PersonNode {
			id: id.into(),
			name: id.to_uppercase(),
			role: Role::Witness,
			description: None,
			x,
			y,
		}
	}

	/// Identity viewport, hand-placed persons so auto layout stays out of the way.
	fn editor(edges: &[(&str, &str, &str)]) -> EditorState {
		let graph = CaseGraph {
			persons: vec![
				person("a", 0.0, 0.0),
				person("b", 400.0, 0.0),
				person("c", 0.0, 300.0),
			],
			relationships: edges
				.iter()
				.map(|&(id, s, t)| RelationshipEdge {
					id: id.into(),
					source_id: s.into(),
					target_id: t.into(),
					label: "knows".into(),
					memo: None,
					directed: false,
				})
				.collect(),
		};
		let mut state = EditorState::new(graph, 1000.0, 800.0, &LayoutOptions::default());
		state.viewport = Viewport::default();
		state
	}

	#[test]
	fn hit_test_prefers_handle_then_node_then_edge() {
		let state = editor(&[("ab", "a", "b")]);
		assert_eq!(
			state.hit_test(Point::new(NODE_WIDTH, NODE_HEIGHT / 2.0)),
			HitTarget::ConnectHandle("a".into())
		);
		assert_eq!(state.hit_test(Point::new(20.0, 20.0)), HitTarget::Node("a".into()));
		let curve = EdgeCurve::between(
			state.graph.person("a").unwrap().center(),
			state.graph.person("b").unwrap().center(),
		)
		.unwrap();
		let on_edge = curve.point_at(0.5) + Point::new(0.0, 5.0);
		assert_eq!(state.hit_test(on_edge), HitTarget::Edge("ab".into()));
		assert_eq!(state.hit_test(Point::new(900.0, 700.0)), HitTarget::Background);
	}

	#[test]
	fn drag_moves_node_and_saves_once_rounded() {
		let mut state = editor(&[]);
		state.pointer_down(Point::new(10.0, 10.0), PointerButton::Primary);
		assert_eq!(state.selection, Selection::Node("a".into()));

		state.pointer_move(Point::new(60.25, 30.0));
		assert_eq!(state.graph.person("a").unwrap().position(), Point::new(50.25, 20.0));
		state.pointer_move(Point::new(110.75, 45.25));
		assert_eq!(
			state.graph.person("a").unwrap().position(),
			Point::new(100.75, 35.25)
		);

		let outcome = state.pointer_up(Point::new(110.75, 45.25));
		assert_eq!(
			outcome,
			Some(GestureOutcome::SavePosition {
				person_id: "a".into(),
				x: 101.0,
				y: 35.0
			})
		);
		assert!(state.interaction.is_idle());
		assert_eq!(state.pointer_up(Point::new(0.0, 0.0)), None);
	}

	#[test]
	fn consecutive_drags_issue_independent_saves() {
		let mut state = editor(&[]);
		let mut saves = Vec::new();

		state.pointer_down(Point::new(10.0, 10.0), PointerButton::Primary);
		state.pointer_move(Point::new(30.0, 50.0));
		saves.extend(state.pointer_up(Point::new(30.0, 50.0)));

		state.pointer_down(Point::new(410.0, 10.0), PointerButton::Primary);
		state.pointer_move(Point::new(420.0, 25.0));
		saves.extend(state.pointer_up(Point::new(420.0, 25.0)));

		assert_eq!(
			saves,
			vec![
				GestureOutcome::SavePosition {
					person_id: "a".into(),
					x: 20.0,
					y: 40.0
				},
				GestureOutcome::SavePosition {
					person_id: "b".into(),
					x: 410.0,
					y: 15.0
				},
			]
		);
		assert_eq!(state.graph.person("a").unwrap().position(), Point::new(20.0, 40.0));
	}

	#[test]
	fn click_without_move_saves_nothing() {
		let mut state = editor(&[]);
		state.pointer_down(Point::new(10.0, 10.0), PointerButton::Primary);
		assert_eq!(state.pointer_up(Point::new(10.0, 10.0)), None);
	}

	#[test]
	fn drag_respects_zoom_and_grab_offset() {
		let mut state = editor(&[]);
		state.viewport = Viewport {
			zoom: 2.0,
			pan: Point::new(100.0, 50.0),
		};
		// Canvas (5, 5) inside person a.
		state.pointer_down(Point::new(110.0, 60.0), PointerButton::Primary);
		state.pointer_move(Point::new(130.0, 80.0));
		assert_eq!(state.graph.person("a").unwrap().position(), Point::new(10.0, 10.0));
	}

	#[test]
	fn connecting_onto_another_node_requests_edge() {
		let mut state = editor(&[]);
		state.pointer_down(Point::new(NODE_WIDTH, NODE_HEIGHT / 2.0), PointerButton::Primary);
		assert!(matches!(state.interaction, Interaction::Connecting { .. }));
		state.pointer_move(Point::new(450.0, 20.0));
		assert_eq!(
			state.interaction,
			Interaction::Connecting {
				source_id: "a".into(),
				pointer: Point::new(450.0, 20.0)
			}
		);
		assert_eq!(
			state.pointer_up(Point::new(450.0, 20.0)),
			Some(GestureOutcome::ConnectRequest {
				source_id: "a".into(),
				target_id: "b".into()
			})
		);
		assert!(state.interaction.is_idle());
	}

	#[test]
	fn connecting_onto_existing_pair_self_or_void_is_discarded() {
		let mut state = editor(&[("ba", "b", "a")]);
		let handle = Point::new(NODE_WIDTH, NODE_HEIGHT / 2.0);
		for release in [Point::new(450.0, 20.0), Point::new(20.0, 20.0), Point::new(900.0, 700.0)] {
			state.pointer_down(handle, PointerButton::Primary);
			assert_eq!(state.pointer_up(release), None);
			assert!(state.interaction.is_idle());
		}
	}

	#[test]
	fn background_drag_pans_and_click_clears_selection() {
		let mut state = editor(&[]);
		state.selection = Selection::Node("a".into());

		state.pointer_down(Point::new(800.0, 600.0), PointerButton::Primary);
		state.pointer_move(Point::new(820.0, 590.0));
		state.pointer_move(Point::new(830.0, 600.0));
		assert_eq!(state.viewport.pan, Point::new(30.0, 0.0));
		state.pointer_up(Point::new(830.0, 600.0));
		assert_eq!(state.selection, Selection::Node("a".into()));

		state.pointer_down(Point::new(800.0, 600.0), PointerButton::Primary);
		state.pointer_up(Point::new(800.0, 600.0));
		assert_eq!(state.selection, Selection::None);
	}

	#[test]
	fn middle_button_pans_even_over_nodes() {
		let mut state = editor(&[]);
		state.pointer_down(Point::new(10.0, 10.0), PointerButton::Middle);
		state.pointer_move(Point::new(15.0, 12.0));
		assert_eq!(state.viewport.pan, Point::new(5.0, 2.0));
		assert_eq!(state.graph.person("a").unwrap().position(), Point::new(0.0, 0.0));
		assert_eq!(state.pointer_up(Point::new(15.0, 12.0)), None);
	}

	#[test]
	fn second_press_during_gesture_is_ignored() {
		let mut state = editor(&[]);
		state.pointer_down(Point::new(10.0, 10.0), PointerButton::Primary);
		state.pointer_down(Point::new(800.0, 600.0), PointerButton::Middle);
		assert_eq!(state.interaction.dragged_node(), Some("a"));
	}

	#[test]
	fn leaving_canvas_ends_drag_with_save() {
		let mut state = editor(&[]);
		state.pointer_down(Point::new(10.0, 10.0), PointerButton::Primary);
		state.pointer_move(Point::new(20.0, 10.0));
		assert!(matches!(
			state.pointer_leave(),
			Some(GestureOutcome::SavePosition { .. })
		));
		assert!(state.interaction.is_idle());
	}

	#[test]
	fn wheel_zoom_keeps_pointer_anchor() {
		let mut state = editor(&[]);
		let cursor = Point::new(250.0, 140.0);
		let before = state.viewport.screen_to_canvas(cursor);
		state.on_wheel(cursor, -120.0);
		assert!((state.viewport.zoom - 1.1).abs() < 1e-12);
		assert!(state.viewport.screen_to_canvas(cursor).distance(before) < 1e-9);
	}

	#[test]
	fn new_state_lays_out_default_graph_and_fits_it() {
		let graph = crate::model::parse_graph(
			r#"{"persons": [
				{"id": 1, "name": "A", "role": "victim"},
				{"id": 2, "name": "B", "role": "perpetrator"},
				{"id": 3, "name": "C", "role": "witness"}
			], "relationships": [
				{"id": 1, "source_person_id": 1, "target_person_id": 2, "label": "assault"},
				{"id": 2, "source_person_id": 2, "target_person_id": 3, "label": "colleague"}
			]}"#,
		)
		.unwrap();
		let state = EditorState::new(graph, 1000.0, 800.0, &LayoutOptions::default());
		assert!(!state.graph.has_default_layout());
		assert_eq!(state.graph.relationships[0].source_id, "1");
		assert_eq!(state.graph.relationships[1].target_id, "3");
		assert_ne!(state.viewport, Viewport::default());
	}

	#[test]
	fn prune_selection_forgets_deleted_items() {
		let mut state = editor(&[("ab", "a", "b")]);
		state.selection = Selection::Edge("ab".into());
		state.graph.remove_person("b");
		state.prune_selection();
		assert_eq!(state.selection, Selection::None);
	}

	fn offline() -> ApiError {
		ApiError::Network("offline".into())
	}

	#[test]
	fn fit_with_one_person_keeps_the_viewport() {
		let graph = CaseGraph {
			persons: vec![person("a", 10.0, 10.0)],
			relationships: Vec::new(),
		};
		let mut state = EditorState::new(graph, 1000.0, 800.0, &LayoutOptions::default());
		let custom = Viewport {
			zoom: 1.5,
			pan: Point::new(-200.0, 40.0),
		};
		state.viewport = custom.clone();
		assert!(!state.fit_view());
		assert_eq!(state.viewport, custom);
	}

	#[test]
	fn failed_mutations_leave_graph_and_selection_alone() {
		let mut state = editor(&[("ab", "a", "b")]);
		state.selection = Selection::Node("a".into());
		let before = state.graph.clone();

		assert!(state.apply_person_added(Err(offline())).is_err());
		let draft = PersonDraft {
			name: "Renamed".into(),
			role: Role::Victim,
			description: None,
		};
		assert!(state.apply_person_updated("a", &draft, Err(offline())).is_err());
		assert!(state.apply_person_deleted("a", Err(offline())).is_err());
		let change = RelationshipChange {
			label: "spouse".into(),
			memo: None,
			directed: true,
		};
		assert!(state.apply_relationship_updated("ab", &change, Err(offline())).is_err());
		assert!(state.apply_relationship_deleted("ab", Err(offline())).is_err());
		let rejected = ApiError::Status {
			status: 409,
			message: "duplicate".into(),
		};
		assert!(state.apply_relationship_added(Err(rejected)).is_err());

		assert_eq!(state.graph, before);
		assert_eq!(state.selection, Selection::Node("a".into()));
	}

	#[test]
	fn deleting_selected_person_cascades_and_clears_selection() {
		let mut state = editor(&[("ab", "a", "b"), ("bc", "b", "c")]);
		state.selection = Selection::Node("b".into());
		assert!(state.apply_person_deleted("b", Ok(())).is_ok());
		assert!(state.graph.person("b").is_none());
		assert!(state.graph.relationships.is_empty());
		assert_eq!(state.selection, Selection::None);
	}

	#[test]
	fn deleting_selected_edge_clears_selection() {
		let mut state = editor(&[("ab", "a", "b")]);
		state.selection = Selection::Edge("ab".into());
		assert!(state.apply_relationship_deleted("ab", Ok(())).is_ok());
		assert!(state.graph.relationships.is_empty());
		assert_eq!(state.selection, Selection::None);
	}

	#[test]
	fn accepted_additions_are_inserted_and_selected() {
		let mut state = editor(&[]);
		let added = person("d", 600.0, 300.0);
		assert!(state.apply_person_added(Ok(added.clone())).is_ok());
		assert_eq!(state.graph.person("d"), Some(&added));
		assert_eq!(state.selection, Selection::Node("d".into()));

		let edge = RelationshipEdge {
			id: "ad".into(),
			source_id: "a".into(),
			target_id: "d".into(),
			label: "sibling".into(),
			memo: None,
			directed: false,
		};
		assert!(state.apply_relationship_added(Ok(edge)).is_ok());
		assert!(state.graph.connects("d", "a"));
		assert_eq!(state.selection, Selection::Edge("ad".into()));
	}

	#[test]
	fn accepted_updates_change_the_graph() {
		let mut state = editor(&[("ab", "a", "b")]);
		let draft = PersonDraft {
			name: "Kim".into(),
			role: Role::Victim,
			description: Some("caller".into()),
		};
		assert!(state.apply_person_updated("a", &draft, Ok(())).is_ok());
		let a = state.graph.person("a").unwrap();
		assert_eq!((a.name.as_str(), a.role), ("Kim", Role::Victim));

		let change = RelationshipChange {
			label: "spouse".into(),
			memo: Some("married 2019".into()),
			directed: true,
		};
		assert!(state.apply_relationship_updated("ab", &change, Ok(())).is_ok());
		let ab = state.graph.relationship("ab").unwrap();
		assert_eq!(ab.label, "spouse");
		assert!(ab.directed);
	}
}
