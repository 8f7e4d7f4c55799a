use leptos::prelude::*;
use leptos_router::hooks::use_params_map;

use crate::components::relationship_graph::RelationshipGraphEditor;

/// `/cases/:case_id/relationships`
#[component]
pub fn CaseRelationships() -> impl IntoView {
	let params = use_params_map();
	let case_id = move || params.with(|p| p.get("case_id")).filter(|id| !id.is_empty());

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			<div class="case-graph-page">
				{move || {
					case_id()
						.map(|id| {
							let title = format!("Case {id}");
							view! {
								<h1 class="case-title">{title}</h1>
								<RelationshipGraphEditor case_id=id />
							}
						})
				}}
			</div>
		</ErrorBoundary>
	}
}
