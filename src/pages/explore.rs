use leptos::prelude::*;
use leptos::task::spawn_local;

use super::panels::{NodeDetails, StatusBanner};
use crate::components::force_graph::ForceGraphCanvas;
use crate::config::ExplorerConfig;
use crate::graph::{GraphModel, Node};
use crate::interaction::{HOPS_RANGE, Intent, LIMIT_PER_NODE_RANGE};
use crate::state::{GraphSession, GraphStateMachine, Status};

/// Knowledge-graph explorer: search for nodes, then click to expand their
/// neighbourhood.
#[component]
pub fn Explore() -> impl IntoView {
	let config = ExplorerConfig::from_env();
	let (params, canvas_height) = (config.simulation.clone(), config.canvas_height);
	let machine = RwSignal::new(GraphStateMachine::new());
	let controller = RwSignal::new(config.controller(true));
	let session = StoredValue::new_local(GraphSession::new(config.adapter(), machine));

	let run = move |intents: Vec<Intent>| {
		if let Some(pending) = session.with_value(|s| s.perform(intents)) {
			spawn_local(pending);
		}
	};

	let model = Memo::new(move |_| machine.with(|m| m.model().clone()));
	let snapshot = Memo::new(move |_| machine.with(GraphStateMachine::snapshot));
	let hovered_edge = Signal::derive(move || controller.with(|c| c.hovered_edge().map(String::from)));
	let central_node = Signal::derive(move || snapshot.with(|s| s.central_node_id.clone()));
	let selected = Signal::derive(move || controller.with(|c| c.selected().cloned()));

	Effect::new(move |_| {
		let m: GraphModel = model.get();
		controller.update(|c| c.retain_selection(|id| m.contains_node(id)));
	});

	let on_node_click = Callback::new(move |node: Node| {
		let intents = controller.try_update(|c| c.click_node(&node)).unwrap_or_default();
		run(intents);
	});
	let on_edge_hover = Callback::new(move |edge: Option<String>| {
		controller.update(|c| c.hover_edge(edge.as_deref()));
	});
	let on_explore = Callback::new(move |_: ()| {
		run(controller.with_untracked(|c| c.explore_selected()));
	});

	let on_submit = move |ev: leptos::ev::SubmitEvent| {
		ev.prevent_default();
		let intents = controller.try_update(|c| c.submit_search()).unwrap_or_default();
		run(intents);
	};
	let on_clear = move |_| {
		let intents = controller.try_update(|c| c.clear()).unwrap_or_default();
		run(intents);
	};

	let hovered_details = move || {
		let id = hovered_edge.get()?;
		model.with(|m| {
			m.edge(&id).map(|e| {
				let props = e
					.properties
					.iter()
					.map(|(k, v)| format!("{k}: {v}"))
					.collect::<Vec<_>>()
					.join(", ");
				view! {
					<div class="edge-details">
						<strong>{e.label.clone()}</strong>
						" "
						{format!("{} → {}", e.source, e.target)}
						<span class="muted">{props}</span>
					</div>
				}
			})
		})
	};

	view! {
		<div class="explorer">
			<form class="toolbar" on:submit=on_submit>
				<input
					type="search"
					placeholder="Search nodes by name, label or property"
					prop:value=move || controller.with(|c| c.search_text().to_string())
					on:input=move |ev| controller.update(|c| c.set_search_text(event_target_value(&ev)))
				/>
				<button type="submit" disabled=move || snapshot.with(|s| s.status == Status::Loading)>
					"Search"
				</button>
				<button type="button" on:click=on_clear>
					"Clear"
				</button>

				<label>
					"Hops "
					<input
						type="number"
						min=HOPS_RANGE.0.to_string()
						max=HOPS_RANGE.1.to_string()
						prop:value=move || controller.with(|c| c.hops().to_string())
						on:change=move |ev| {
							if let Ok(hops) = event_target_value(&ev).parse() {
								controller.update(|c| c.set_hops(hops));
							}
						}
					/>
				</label>
				<label>
					"Limit / node "
					<input
						type="number"
						min=LIMIT_PER_NODE_RANGE.0.to_string()
						max=LIMIT_PER_NODE_RANGE.1.to_string()
						prop:value=move || controller.with(|c| c.limit_per_node().to_string())
						on:change=move |ev| {
							if let Ok(limit) = event_target_value(&ev).parse() {
								controller.update(|c| c.set_limit_per_node(limit));
							}
						}
					/>
				</label>
				<label>
					"Edge types "
					<input
						type="text"
						placeholder="e.g. WORKS_AT,KNOWS"
						prop:value=move || controller.with(|c| c.edge_types().join(","))
						on:change=move |ev| controller.update(|c| c.set_edge_types(&event_target_value(&ev)))
					/>
				</label>
			</form>

			<StatusBanner snapshot=snapshot />

			<div class="workspace">
				<div class="canvas-frame" style=format!("height: {canvas_height}px;")>
					<Show
						when=move || !model.with(GraphModel::is_empty)
						fallback=|| view! { <p class="empty">"Search for a node to start exploring."</p> }
					>
						<ForceGraphCanvas
							data=model
							highlighted_edge=hovered_edge
							central_node=central_node
							on_node_click=on_node_click
							on_edge_hover=on_edge_hover
							params=params.clone()
							height=Some(canvas_height)
						/>
					</Show>
				</div>
				<aside class="side-panel">
					<NodeDetails node=selected on_explore=on_explore />
					{hovered_details}
				</aside>
			</div>
		</div>
	}
}
