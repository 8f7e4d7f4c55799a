use leptos::prelude::*;

/// Landing page: pick a case to open its relationship graph.
#[component]
pub fn Home() -> impl IntoView {
	let case_id = RwSignal::new(String::new());
	let target = move || format!("/cases/{}/relationships", case_id.get().trim());

	view! {
		<div class="home">
			<h1>"Case relationships"</h1>
			<p class="subtitle">
				"Drag people to arrange them. Drag from a handle to connect two people. Scroll to zoom, drag the background to pan."
			</p>
			<label>
				"Case number"
				<input
					type="text"
					prop:value=move || case_id.get()
					on:input=move |ev| case_id.set(event_target_value(&ev))
				/>
			</label>
			<a
				class="button"
				href=target
				class:disabled=move || case_id.with(|id| id.trim().is_empty())
			>
				"Open"
			</a>
		</div>
	}
}
