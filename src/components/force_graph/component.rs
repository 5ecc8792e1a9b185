use std::cell::RefCell;
use std::rc::Rc;

use leptos::html::Canvas;
use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, MouseEvent, WheelEvent};

use super::render;
use super::state::ForceGraphState;
use crate::components::{CanvasHooks, canvas_size, pointer};
use crate::graph::{GraphModel, Node};
use crate::layout::Viewport;
use crate::layout::force::SimulationParameters;

type SharedState = Rc<RefCell<Option<ForceGraphState>>>;

/// Force-directed canvas for knowledge-graph snapshots. Replacing `data`
/// reloads the simulation; nodes that survive keep their position.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<GraphModel>,
	#[prop(optional, into)] highlighted_edge: MaybeProp<String>,
	#[prop(optional, into)] central_node: MaybeProp<String>,
	#[prop(optional)] on_node_click: Option<Callback<Node>>,
	#[prop(optional)] on_edge_hover: Option<Callback<Option<String>>>,
	#[prop(optional)] params: SimulationParameters,
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
		let mut initial = ForceGraphState::new(data.get_untracked(), Viewport::new(w, h), params.clone());
		initial.highlighted_edge = highlighted_edge.get_untracked();
		initial.central_node = central_node.get_untracked();
		*state_init.borrow_mut() = Some(initial);

		let state_resize = state_init.clone();
		hooks.watch_resize(canvas.clone(), width, height, move |viewport| {
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(viewport);
			}
		});

		let state_anim = state_init.clone();
		hooks.animate(move || {
			// unmounted: stop scheduling frames
			if !canvas.is_connected() {
				return false;
			}
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(0.016);
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
		let (edge, central) = (highlighted_edge.get(), central_node.get());
		if let Some(ref mut s) = *state_marks.borrow_mut() {
			s.highlighted_edge = edge;
			s.central_node = central;
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			match s.node_at_position(x, y) {
				Some(id) => s.begin_drag(id, x, y),
				None => s.begin_pan(x, y),
			}
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
			if s.drag.active {
				s.drag_to(x, y);
				None
			} else if s.pan.active {
				s.pan_to(x, y);
				None
			} else {
				let node = s.node_at_position(x, y);
				let edge = if node.is_none() { s.edge_at_position(x, y) } else { None };
				s.set_hover(node);
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
	let on_mouseup = move |_: MouseEvent| {
		let clicked = {
			let mut guard = state_mu.borrow_mut();
			let Some(s) = guard.as_mut() else {
				return;
			};
			s.pan.active = false;
			s.end_drag().and_then(|id| s.model.node(&id).cloned())
		};
		if let (Some(node), Some(cb)) = (clicked, on_node_click) {
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
			s.end_drag();
			s.pan.active = false;
			s.set_hover(None);
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
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			s.zoom_at(x, y, factor);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
