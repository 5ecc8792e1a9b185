use leptos::prelude::*;
use leptos::task::spawn_local;

use super::panels::{NodeDetails, StatusBanner};
use crate::components::er_diagram::ErDiagramCanvas;
use crate::config::ExplorerConfig;
use crate::graph::{GraphModel, Node, PropertyValue};
use crate::interaction::Intent;
use crate::state::{DiagramParams, GraphSession, GraphStateMachine, Request};

const SAMPLE_DATA_SOURCE: &str = "demo";

/// ER diagram of one data source. Clicking a table shows its columns.
#[component]
pub fn Schema() -> impl IntoView {
	let config = ExplorerConfig::from_env();
	let canvas_height = config.canvas_height;
	let machine = RwSignal::new(GraphStateMachine::new());
	let controller = RwSignal::new(config.controller(false));
	let session = StoredValue::new_local(GraphSession::new(config.adapter(), machine));

	let initial_source = if config.api_base_url.is_none() { SAMPLE_DATA_SOURCE } else { "" };
	let data_source = RwSignal::new(initial_source.to_string());
	let diagram_id = RwSignal::new(String::new());

	let run = move |intents: Vec<Intent>| {
		if let Some(pending) = session.with_value(|s| s.perform(intents)) {
			spawn_local(pending);
		}
	};
	let load = move || {
		let source = data_source.get_untracked().trim().to_string();
		if source.is_empty() {
			return;
		}
		let diagram = diagram_id.get_untracked().trim().to_string();
		controller.update(|c| {
			c.clear();
		});
		run(vec![Intent::Fetch(Request::Diagram(DiagramParams {
			data_source_id: source,
			diagram_id: (!diagram.is_empty()).then_some(diagram),
		}))]);
	};
	load();

	let model = Memo::new(move |_| machine.with(|m| m.model().clone()));
	let snapshot = Memo::new(move |_| machine.with(GraphStateMachine::snapshot));
	let hovered_edge = Signal::derive(move || controller.with(|c| c.hovered_edge().map(String::from)));
	let selected = Signal::derive(move || controller.with(|c| c.selected().cloned()));
	let selected_id = Signal::derive(move || controller.with(|c| c.selected().map(|n| n.id.clone())));

	Effect::new(move |_| {
		let m: GraphModel = model.get();
		controller.update(|c| c.retain_selection(|id| m.contains_node(id)));
	});

	let on_table_click = Callback::new(move |table: Node| {
		let intents = controller.try_update(|c| c.click_node(&table)).unwrap_or_default();
		run(intents);
	});
	let on_edge_hover = Callback::new(move |edge: Option<String>| {
		controller.update(|c| c.hover_edge(edge.as_deref()));
	});

	let relationship = move || {
		let id = hovered_edge.get()?;
		model.with(|m| {
			let edge = m.edge(&id)?;
			let columns = |key: &str| match edge.properties.iter().find(|(k, _)| k == key) {
				Some((_, PropertyValue::Text(cols))) => cols.clone(),
				_ => String::new(),
			};
			let text = format!(
				"{}.{} → {}.{} ({})",
				edge.source,
				columns("source_columns"),
				edge.target,
				columns("target_columns"),
				edge.label
			);
			Some(view! { <div class="edge-details">{text}</div> })
		})
	};

	view! {
		<div class="explorer">
			<form
				class="toolbar"
				on:submit=move |ev| {
					ev.prevent_default();
					load();
				}
			>
				<input
					type="text"
					placeholder="Data source id"
					prop:value=move || data_source.get()
					on:input=move |ev| data_source.set(event_target_value(&ev))
				/>
				<input
					type="text"
					placeholder="Diagram id (optional)"
					prop:value=move || diagram_id.get()
					on:input=move |ev| diagram_id.set(event_target_value(&ev))
				/>
				<button type="submit">"Load diagram"</button>
			</form>

			<StatusBanner snapshot=snapshot />

			<div class="workspace">
				<div class="canvas-frame" style=format!("height: {canvas_height}px;")>
					<Show
						when=move || !model.with(GraphModel::is_empty)
						fallback=|| view! { <p class="empty">"No tables to show."</p> }
					>
						<ErDiagramCanvas
							data=model
							highlighted_edge=hovered_edge
							selected=selected_id
							on_table_click=on_table_click
							on_edge_hover=on_edge_hover
							height=Some(canvas_height)
						/>
					</Show>
				</div>
				<aside class="side-panel">
					<NodeDetails node=selected />
					{relationship}
				</aside>
			</div>
		</div>
	}
}
