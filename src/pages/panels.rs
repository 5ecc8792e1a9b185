use leptos::prelude::*;

use crate::graph::Node;
use crate::state::{Status, StatusSnapshot};

/// Loading and error affordances. Errors stay visible until the next request.
#[component]
pub fn StatusBanner(#[prop(into)] snapshot: Signal<StatusSnapshot>) -> impl IntoView {
	move || {
		let s = snapshot.get();
		match (s.status, s.error) {
			(Status::Loading, _) => Some(view! { <div class="banner loading">"Loading graph…"</div> }.into_any()),
			(Status::Failed, Some(message)) => {
				Some(view! { <div class="banner error">{format!("Error: {message}")}</div> }.into_any())
			}
			_ => None,
		}
	}
}

/// Id, tag and properties of the selected node, plus a button to expand it.
#[component]
pub fn NodeDetails(
	#[prop(into)] node: Signal<Option<Node>>,
	#[prop(optional)] on_explore: Option<Callback<()>>,
) -> impl IntoView {
	move || {
		node.get().map(|n| {
			let tag = n.kind.tag().unwrap_or("N/A").to_string();
			let properties = n
				.properties
				.iter()
				.map(|(key, value)| {
					view! {
						<tr>
							<th>{key.clone()}</th>
							<td>{value.to_string()}</td>
						</tr>
					}
				})
				.collect_view();
			let fields = n
				.fields
				.iter()
				.map(|f| {
					let marker = match (f.is_primary_key, f.is_foreign_key) {
						(true, true) => "PK FK",
						(true, false) => "PK",
						(false, true) => "FK",
						(false, false) => "",
					};
					view! {
						<tr title=f.description.clone().unwrap_or_default()>
							<th>{f.name.clone()}</th>
							<td>{f.type_descriptor.clone()}</td>
							<td class="key-marker">{marker}</td>
						</tr>
					}
				})
				.collect_view();
			view! {
				<div class="node-details">
					<h3>{n.label.clone()}</h3>
					<dl>
						<dt>"ID"</dt>
						<dd>{n.id.clone()}</dd>
						<dt>"Tag"</dt>
						<dd>{tag}</dd>
					</dl>
					<table class="properties">{properties}{fields}</table>
					{on_explore.map(|cb| view! {
						<button type="button" on:click=move |_| cb.run(())>"Explore neighbors"</button>
					})}
				</div>
			}
		})
	}
}
