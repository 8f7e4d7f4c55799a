use leptos::prelude::*;

use super::controller::EditorController;
use super::types::DialogKind;
use crate::model::Role;

fn display_when(dialog: RwSignal<Option<DialogKind>>, kind: DialogKind) -> impl Fn() -> &'static str {
	move || {
		if dialog.get() == Some(kind) {
			"flex"
		} else {
			"none"
		}
	}
}

pub fn person_dialog(controller: EditorController) -> impl IntoView {
	let (form, busy) = (controller.signals.person_form, controller.signals.busy);
	let display = display_when(controller.signals.dialog, DialogKind::Person);
	let (submit, cancel) = (controller.clone(), controller);

	view! {
		<div class="dialog-backdrop" style:display=display>
			<form
				class="dialog"
				on:submit=move |ev| {
					ev.prevent_default();
					submit.submit_person();
				}
			>
				<h2>
					{move || if form.with(|f| f.editing.is_some()) { "Edit person" } else { "Add person" }}
				</h2>
				<label>
					"Name"
					<input
						type="text"
						prop:value=move || form.with(|f| f.name.clone())
						on:input=move |ev| form.update(|f| f.name = event_target_value(&ev))
					/>
				</label>
				<label>
					"Role"
					<select on:change=move |ev| {
						let value = event_target_value(&ev);
						form.update(|f| f.role = Role::normalize(&value));
					}>
						{Role::ALL
							.into_iter()
							.map(|role| {
								view! {
									<option
										value=role.as_str()
										selected=move || form.with(|f| f.role == role)
									>
										{role.label()}
									</option>
								}
							})
							.collect_view()}
					</select>
				</label>
				<label>
					"Description"
					<textarea
						prop:value=move || form.with(|f| f.description.clone())
						on:input=move |ev| form.update(|f| f.description = event_target_value(&ev))
					/>
				</label>
				<div class="dialog-actions">
					<button type="button" on:click=move |_| cancel.close_dialog()>
						"Cancel"
					</button>
					<button type="submit" disabled=move || !form.with(|f| f.is_valid()) || busy.get()>
						"Save"
					</button>
				</div>
			</form>
		</div>
	}
}

pub fn relationship_dialog(controller: EditorController) -> impl IntoView {
	let (form, busy) = (controller.signals.relationship_form, controller.signals.busy);
	let display = display_when(controller.signals.dialog, DialogKind::Relationship);
	let (submit, cancel) = (controller.clone(), controller);

	view! {
		<div class="dialog-backdrop" style:display=display>
			<form
				class="dialog"
				on:submit=move |ev| {
					ev.prevent_default();
					submit.submit_relationship();
				}
			>
				<h2>
					{move || {
						if form.with(|f| f.editing.is_some()) {
							"Edit relationship"
						} else {
							"New relationship"
						}
					}}
				</h2>
				<p class="dialog-subtitle">
					{move || form.with(|f| format!("{} → {}", f.source_name, f.target_name))}
				</p>
				<label>
					"Relationship"
					<input
						type="text"
						placeholder="e.g. supervisor, spouse"
						prop:value=move || form.with(|f| f.label.clone())
						on:input=move |ev| form.update(|f| f.label = event_target_value(&ev))
					/>
				</label>
				<label>
					"Memo"
					<textarea
						prop:value=move || form.with(|f| f.memo.clone())
						on:input=move |ev| form.update(|f| f.memo = event_target_value(&ev))
					/>
				</label>
				<label class="checkbox">
					<input
						type="checkbox"
						prop:checked=move || form.with(|f| f.directed)
						on:change=move |ev| form.update(|f| f.directed = event_target_checked(&ev))
					/>
					"Directed"
				</label>
				<div class="dialog-actions">
					<button type="button" on:click=move |_| cancel.close_dialog()>
						"Cancel"
					</button>
					<button type="submit" disabled=move || !form.with(|f| f.is_valid()) || busy.get()>
						"Save"
					</button>
				</div>
			</form>
		</div>
	}
}
