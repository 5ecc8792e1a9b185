use std::cell::RefCell;
use std::rc::Rc;

use leptos::html::Canvas;
use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, MouseEvent, WheelEvent};

use super::render;
use super::state::ErDiagramState;
use crate::components::{CanvasHooks, canvas_size, pointer};
use crate::graph::{GraphModel, Node};
use crate::layout::Viewport;

type SharedState = Rc<RefCell<Option<ErDiagramState>>>;

/// Schema canvas: tables as cards in three columns, foreign keys as arrows
/// labelled with their cardinality.
#[component]
pub fn ErDiagramCanvas(
	#[prop(into)] data: Signal<GraphModel>,
	#[prop(optional, into)] highlighted_edge: MaybeProp<String>,
	#[prop(optional, into)] selected: MaybeProp<String>,
	#[prop(optional)] on_table_click: Option<Callback<Node>>,
	#[prop(optional)] on_edge_hover: Option<Callback<Option<String>>>,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let hooks = CanvasHooks::default();
	hooks.release_on_cleanup();
	let state_init = state.clone();

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if state_init.borrow().is_some() {
			return;
		}
		let (w, h) = canvas_size(&canvas, width, height);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("canvas has no 2d context");
			return;
		};
		let mut initial = ErDiagramState::new(data.get_untracked(), Viewport::new(w, h));
		initial.highlighted_edge = highlighted_edge.get_untracked();
		initial.selected = selected.get_untracked();
		*state_init.borrow_mut() = Some(initial);

		let state_resize = state_init.clone();
		hooks.watch_resize(canvas.clone(), width, height, move |viewport| {
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(viewport);
			}
		});

		let state_anim = state_init.clone();
		hooks.animate(move || {
			if !canvas.is_connected() {
				return false;
			}
			if let Some(ref s) = *state_anim.borrow() {
				render::render(s, &ctx);
			}
			true
		});
	});

	let state_data = state.clone();
	Effect::new(move |_| {
		let model = data.get();
		if let Some(ref mut s) = *state_data.borrow_mut() {
			s.load(model);
		}
	});

	let state_marks = state.clone();
	Effect::new(move |_| {
		let (edge, table) = (highlighted_edge.get(), selected.get());
		if let Some(ref mut s) = *state_marks.borrow_mut() {
			s.highlighted_edge = edge;
			s.selected = table;
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.begin_pan(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		let edge_change = {
			let mut guard = state_mm.borrow_mut();
			let Some(s) = guard.as_mut() else {
				return;
			};
			if s.pan.active {
				s.pan_to(x, y);
				None
			} else {
				let edge = if s.table_at_position(x, y).is_none() { s.edge_at_position(x, y) } else { None };
				(edge != s.pointer_edge).then(|| {
					s.pointer_edge = edge.clone();
					if on_edge_hover.is_none() {
						s.highlighted_edge = edge.clone();
					}
					edge
				})
			}
		};
		if let (Some(edge), Some(cb)) = (edge_change, on_edge_hover) {
			cb.run(edge);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let clicked = {
			let mut guard = state_mu.borrow_mut();
			let Some(s) = guard.as_mut() else {
				return;
			};
			let is_click = s.end_pan();
			let hit = pointer(canvas_ref, &ev).and_then(|(x, y)| s.table_at_position(x, y).cloned());
			match hit {
				Some(node) if is_click => {
					if on_table_click.is_none() {
						s.selected = Some(node.id.clone());
					}
					Some(node)
				}
				_ => None,
			}
		};
		if let (Some(node), Some(cb)) = (clicked, on_table_click) {
			cb.run(node);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let had_edge = {
			let mut guard = state_ml.borrow_mut();
			let Some(s) = guard.as_mut() else {
				return;
			};
			s.end_pan();
			if on_edge_hover.is_none() {
				s.highlighted_edge = None;
			}
			s.pointer_edge.take().is_some()
		};
		if let (true, Some(cb)) = (had_edge, on_edge_hover) {
			cb.run(None);
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.zoom_at(x, y, if ev.delta_y() > 0.0 { 0.9 } else { 1.1 });
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="er-diagram-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: default;"
		/>
	}
}
