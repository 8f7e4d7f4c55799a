use case_relationship_graph::config::AppConfig;
use case_relationship_graph::{App, init_logging};
use leptos::prelude::*;

fn main() {
	let config = AppConfig::from_document();
	init_logging(config.level());
	leptos::mount::mount_to_body(move || view! { <App config=config.clone() /> });
}
