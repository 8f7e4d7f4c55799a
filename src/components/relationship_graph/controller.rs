//! Bridges pointer events, dialogs and the relationship store.
//!
//! Every store mutation except position saves is applied locally only after
//! the store accepts it. Async results are dropped once the editor has been
//! unmounted.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, error, info, warn};

use super::interaction::{GestureOutcome, HitTarget, PointerButton, Selection};
use super::layout::LayoutOptions;
use super::state::EditorState;
use super::types::{DialogKind, LoadStatus, PersonForm, RelationshipForm};
use crate::api::RelationshipApi;
use crate::error::ApiError;
use crate::geometry::Point;
use crate::model::{NODE_HEIGHT, NODE_WIDTH};

/// Reactive handles the view binds to. All `Copy`.
#[derive(Clone, Copy)]
pub struct EditorSignals {
	pub status: RwSignal<LoadStatus>,
	pub selection: RwSignal<Selection>,
	pub selected_label: RwSignal<String>,
	pub dialog: RwSignal<Option<DialogKind>>,
	pub person_form: RwSignal<PersonForm>,
	pub relationship_form: RwSignal<RelationshipForm>,
	pub busy: RwSignal<bool>,
}

impl EditorSignals {
	pub fn new() -> Self {
		Self {
			status: RwSignal::new(LoadStatus::Loading),
			selection: RwSignal::new(Selection::None),
			selected_label: RwSignal::new(String::new()),
			dialog: RwSignal::new(None),
			person_form: RwSignal::new(PersonForm::default()),
			relationship_form: RwSignal::new(RelationshipForm::default()),
			busy: RwSignal::new(false),
		}
	}
}

fn notify(message: &str) {
	error!("{message}");
	if let Some(window) = web_sys::window() {
		let _ = window.alert_with_message(message);
	}
}

fn confirm(message: &str) -> bool {
	web_sys::window()
		.and_then(|w| w.confirm_with_message(message).ok())
		.unwrap_or(false)
}

#[derive(Clone)]
pub struct EditorController {
	state: Rc<RefCell<Option<EditorState>>>,
	api: RelationshipApi,
	mounted: Rc<Cell<bool>>,
	size: Rc<Cell<(f64, f64)>>,
	layout: LayoutOptions,
	pub signals: EditorSignals,
}

impl EditorController {
	pub fn new(api: RelationshipApi, layout: LayoutOptions) -> Self {
		Self {
			state: Rc::new(RefCell::new(None)),
			api,
			mounted: Rc::new(Cell::new(true)),
			size: Rc::new(Cell::new((800.0, 600.0))),
			layout,
			signals: EditorSignals::new(),
		}
	}

	/// Called when the owning view is torn down. Pending store results are
	/// ignored from then on.
	pub fn unmount(&self) {
		self.mounted.set(false);
	}

	pub fn is_mounted(&self) -> bool {
		self.mounted.get()
	}

	pub fn with_state<R>(&self, f: impl FnOnce(&mut EditorState) -> R) -> Option<R> {
		self.state.borrow_mut().as_mut().map(f)
	}

	pub fn set_size(&self, width: f64, height: f64) {
		self.size.set((width, height));
		self.with_state(|s| s.resize(width, height));
	}

	/// Fetches the whole graph, replacing whatever is loaded.
	pub fn load(&self) {
		self.signals.status.set(LoadStatus::Loading);
		let this = self.clone();
		spawn_local(async move {
			let result = this.api.fetch_graph().await;
			if !this.is_mounted() {
				return;
			}
			match result {
				Ok(graph) => {
					info!(
						"loaded case {}: {} person(s), {} relationship(s)",
						this.api.case_id(),
						graph.persons.len(),
						graph.relationships.len()
					);
					let (w, h) = this.size.get();
					*this.state.borrow_mut() = Some(EditorState::new(graph, w, h, &this.layout));
					this.sync_selection();
					this.signals.status.set(LoadStatus::Ready);
				}
				Err(err) => {
					error!("loading case {} failed: {err}", this.api.case_id());
					this.signals.status.set(LoadStatus::Failed(err.to_string()));
				}
			}
		});
	}

	/// Mirrors the editor selection into the signals the toolbar reads.
	fn sync_selection(&self) {
		let (selection, label) = self
			.with_state(|s| {
				s.prune_selection();
				let label = match &s.selection {
					Selection::None => String::new(),
					Selection::Node(id) => s.graph.person(id).map(|p| p.name.clone()).unwrap_or_default(),
					Selection::Edge(id) => s
						.graph
						.relationship(id)
						.map(|r| r.label.clone())
						.unwrap_or_default(),
				};
				(s.selection.clone(), label)
			})
			.unwrap_or_default();
		if self.signals.selection.get_untracked() != selection {
			self.signals.selection.set(selection);
		}
		if self.signals.selected_label.get_untracked() != label {
			self.signals.selected_label.set(label);
		}
	}

	pub fn cursor(&self) -> &'static str {
		self.state
			.borrow()
			.as_ref()
			.map(|s| s.interaction.cursor())
			.unwrap_or("default")
	}

	pub fn pointer_down(&self, screen: Point, button: PointerButton) {
		self.with_state(|s| s.pointer_down(screen, button));
		self.sync_selection();
	}

	pub fn pointer_move(&self, screen: Point) {
		self.with_state(|s| s.pointer_move(screen));
	}

	pub fn pointer_up(&self, screen: Point) {
		let outcome = self.with_state(|s| s.pointer_up(screen)).flatten();
		self.sync_selection();
		if let Some(outcome) = outcome {
			self.handle_outcome(outcome);
		}
	}

	pub fn pointer_leave(&self) {
		if let Some(outcome) = self.with_state(|s| s.pointer_leave()).flatten() {
			self.handle_outcome(outcome);
		}
	}

	pub fn wheel(&self, screen: Point, delta_y: f64) {
		self.with_state(|s| s.on_wheel(screen, delta_y));
	}

	/// Zooms around the canvas centre.
	pub fn zoom_by(&self, factor: f64) {
		let (w, h) = self.size.get();
		self.with_state(|s| s.zoom_at(Point::new(w / 2.0, h / 2.0), factor));
	}

	pub fn fit_view(&self) {
		self.with_state(|s| s.fit_view());
	}

	fn handle_outcome(&self, outcome: GestureOutcome) {
		match outcome {
			GestureOutcome::SavePosition { person_id, x, y } => self.save_position(person_id, x, y),
			GestureOutcome::ConnectRequest {
				source_id,
				target_id,
			} => {
				let form = self.with_state(|s| {
					let source = s.graph.person(&source_id)?;
					let target = s.graph.person(&target_id)?;
					let mut form = RelationshipForm::create(source, target);
					form.conflict = s.graph.connects(&source_id, &target_id);
					Some(form)
				});
				if let Some(form) = form.flatten() {
					self.signals.relationship_form.set(form);
					self.signals.dialog.set(Some(DialogKind::Relationship));
				}
			}
		}
	}

	/// Fire-and-forget. The dragged position stays even if the store refuses it.
	fn save_position(&self, person_id: String, x: f64, y: f64) {
		let api = self.api.clone();
		spawn_local(async move {
			match api.save_position(&person_id, x, y).await {
				Ok(()) => debug!("saved position of {person_id} at ({x}, {y})"),
				Err(err) => warn!("saving position of {person_id} failed: {err}"),
			}
		});
	}

	pub fn open_add_person(&self) {
		self.signals.person_form.set(PersonForm::default());
		self.signals.dialog.set(Some(DialogKind::Person));
	}

	/// Opens the edit dialog for whatever is selected.
	pub fn open_edit_selected(&self) {
		let selection = self.with_state(|s| s.selection.clone()).unwrap_or_default();
		match selection {
			Selection::None => {}
			Selection::Node(id) => {
				let Some(form) = self.with_state(|s| s.graph.person(&id).map(PersonForm::edit)).flatten() else {
					return;
				};
				self.signals.person_form.set(form);
				self.signals.dialog.set(Some(DialogKind::Person));
			}
			Selection::Edge(id) => {
				let form = self.with_state(|s| {
					let edge = s.graph.relationship(&id)?;
					let name = |pid: &str| s.graph.person(pid).map(|p| p.name.clone()).unwrap_or_default();
					Some(RelationshipForm::edit(edge, &name(&edge.source_id), &name(&edge.target_id)))
				});
				if let Some(form) = form.flatten() {
					self.signals.relationship_form.set(form);
					self.signals.dialog.set(Some(DialogKind::Relationship));
				}
			}
		}
	}

	/// Double click: select whatever is under the pointer and edit it.
	pub fn edit_at(&self, screen: Point) {
		self.with_state(|s| {
			s.selection = match s.hit_test(screen) {
				HitTarget::Node(id) | HitTarget::ConnectHandle(id) => Selection::Node(id),
				HitTarget::Edge(id) => Selection::Edge(id),
				HitTarget::Background => Selection::None,
			};
		});
		self.sync_selection();
		self.open_edit_selected();
	}

	pub fn close_dialog(&self) {
		self.signals.dialog.set(None);
	}

	/// Settles a finished store call unless the view has gone away. Success
	/// closes the dialog; failure alerts and leaves everything as it was.
	fn finish(&self, failure: &str, apply: impl FnOnce(&mut EditorState) -> Result<(), ApiError>) -> bool {
		if !self.is_mounted() {
			debug!("dropping result after unmount: {failure}");
			return false;
		}
		self.signals.busy.set(false);
		match self.with_state(apply) {
			Some(Ok(())) => {
				self.sync_selection();
				self.close_dialog();
				true
			}
			Some(Err(err)) => {
				notify(&format!("{failure}: {err}"));
				false
			}
			None => false,
		}
	}

	pub fn submit_person(&self) {
		let form = self.signals.person_form.get_untracked();
		if !form.is_valid() || self.signals.busy.get_untracked() {
			return;
		}
		let draft = form.draft();
		let this = self.clone();
		match form.editing {
			None => {
				let Some((position, index)) = self.with_state(|s| {
					let center = s.visible_center();
					(
						center - Point::new(NODE_WIDTH / 2.0, NODE_HEIGHT / 2.0),
						s.graph.persons.len(),
					)
				}) else {
					return;
				};
				self.signals.busy.set(true);
				spawn_local(async move {
					let result = this.api.add_person(&draft, position, index).await;
					let failure = format!("Could not add {}", draft.name);
					this.finish(&failure, |s| s.apply_person_added(result));
				});
			}
			Some(id) => {
				self.signals.busy.set(true);
				spawn_local(async move {
					let result = this.api.update_person(&id, &draft).await;
					let failure = format!("Could not update {}", draft.name);
					this.finish(&failure, |s| s.apply_person_updated(&id, &draft, result));
				});
			}
		}
	}

	pub fn submit_relationship(&self) {
		let form = self.signals.relationship_form.get_untracked();
		if !form.is_valid() || self.signals.busy.get_untracked() {
			return;
		}
		let this = self.clone();
		match form.editing.clone() {
			None => {
				let draft = form.draft();
				let check = self.with_state(|s| {
					s.graph
						.validate_relationship(&draft.source_id, &draft.target_id, &draft.label)
				});
				if let Some(Err(reason)) = check {
					debug!("relationship rejected locally: {reason}");
					return;
				}
				self.signals.busy.set(true);
				spawn_local(async move {
					let result = this.api.add_relationship(&draft).await;
					this.finish("Could not add relationship", |s| s.apply_relationship_added(result));
				});
			}
			Some(id) => {
				let change = form.change();
				self.signals.busy.set(true);
				spawn_local(async move {
					let result = this.api.update_relationship(&id, &change).await;
					this.finish("Could not update relationship", |s| {
						s.apply_relationship_updated(&id, &change, result)
					});
				});
			}
		}
	}

	/// Deletes the selection after the user confirms.
	pub fn delete_selected(&self) {
		let selection = self.with_state(|s| s.selection.clone()).unwrap_or_default();
		let this = self.clone();
		match selection {
			Selection::None => {}
			Selection::Node(id) => {
				let Some((name, edges)) = self
					.with_state(|s| {
						let name = s.graph.person(&id).map(|p| p.name.clone())?;
						let edges = s.graph.relationships.iter().filter(|r| r.touches(&id)).count();
						Some((name, edges))
					})
					.flatten()
				else {
					return;
				};
				if !confirm(&format!("Delete {name} and {edges} relationship(s)?")) {
					return;
				}
				spawn_local(async move {
					let result = this.api.delete_person(&id).await;
					this.finish(&format!("Could not delete {name}"), |s| {
						s.apply_person_deleted(&id, result)
					});
				});
			}
			Selection::Edge(id) => {
				if !confirm("Delete this relationship?") {
					return;
				}
				spawn_local(async move {
					let result = this.api.delete_relationship(&id).await;
					this.finish("Could not delete relationship", |s| {
						s.apply_relationship_deleted(&id, result)
					});
				});
			}
		}
	}

	pub fn render(&self, ctx: &web_sys::CanvasRenderingContext2d) {
		if let Some(state) = self.state.borrow().as_ref() {
			super::render::render(state, ctx);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::{CaseGraph, PersonNode, Role};

	fn controller() -> EditorController {
		let ctl = EditorController::new(RelationshipApi::new("/api", "7"), LayoutOptions::default());
		let person = |id: &str, x: f64| PersonNode {
			id: id.into(),
			name: id.to_uppercase(),
			role: Role::Colleague,
			description: None,
			x,
			y: 0.0,
		};
		let graph = CaseGraph {
			persons: vec![person("a", 0.0), person("b", 400.0)],
			relationships: Vec::new(),
		};
		*ctl.state.borrow_mut() = Some(EditorState::new(graph, 800.0, 600.0, &LayoutOptions::default()));
		ctl
	}

	#[test]
	fn results_after_unmount_are_dropped() {
		let ctl = controller();
		let before = ctl.with_state(|s| s.graph.clone());
		ctl.unmount();
		let added = PersonNode {
			id: "c".into(),
			name: "C".into(),
			role: Role::Witness,
			description: None,
			x: 0.0,
			y: 300.0,
		};
		assert!(!ctl.finish("Could not add C", |s| s.apply_person_added(Ok(added))));
		assert!(!ctl.finish("Could not delete A", |s| s.apply_person_deleted("a", Ok(()))));
		assert_eq!(ctl.with_state(|s| s.graph.clone()), before);
	}

	#[test]
	fn accepted_result_closes_dialog_and_mirrors_selection() {
		let ctl = controller();
		ctl.signals.busy.set(true);
		ctl.signals.dialog.set(Some(DialogKind::Person));
		let added = PersonNode {
			id: "c".into(),
			name: "Choi".into(),
			role: Role::Witness,
			description: None,
			x: 0.0,
			y: 300.0,
		};
		assert!(ctl.finish("Could not add Choi", |s| s.apply_person_added(Ok(added))));
		assert!(!ctl.signals.busy.get_untracked());
		assert_eq!(ctl.signals.dialog.get_untracked(), None);
		assert_eq!(ctl.signals.selection.get_untracked(), Selection::Node("c".into()));
		assert_eq!(ctl.signals.selected_label.get_untracked(), "Choi");
	}
}
