//! Canvas surfaces. Each one keeps its view state in an `Rc<RefCell<..>>`,
//! redraws on `requestAnimationFrame` and reports gestures through callbacks.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::html::Canvas;
use leptos::prelude::*;
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, MouseEvent};

use crate::layout::Viewport;

pub mod er_diagram;
pub mod force_graph;

type Hook = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Pointer position relative to the canvas' top-left corner.
fn pointer(canvas_ref: NodeRef<Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?;
	let rect = canvas.get_bounding_client_rect();
	Some((ev.client_x() as f64 - rect.left(), ev.client_y() as f64 - rect.top()))
}

/// Explicit dimensions win, then the parent's box, then 800x600.
fn canvas_size(canvas: &HtmlCanvasElement, width: Option<f64>, height: Option<f64>) -> (f64, f64) {
	let parent = canvas.parent_element();
	let w = width
		.or_else(|| parent.as_ref().map(|p| p.client_width() as f64))
		.filter(|w| *w > 0.0)
		.unwrap_or(800.0);
	let h = height
		.or_else(|| parent.as_ref().map(|p| p.client_height() as f64))
		.filter(|h| *h > 0.0)
		.unwrap_or(600.0);
	(w, h)
}

fn schedule(frame: &RefCell<Option<Closure<dyn FnMut()>>>, frame_id: &Cell<Option<i32>>) {
	let Some(window) = web_sys::window() else {
		return;
	};
	if let Some(cb) = frame.borrow().as_ref() {
		frame_id.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
	}
}

/// Closures a mounted canvas hands to the browser: its frame loop and its
/// window resize listener. Both capture the canvas state, so they must be
/// released on unmount for that state to be dropped.
#[derive(Clone, Default)]
struct CanvasHooks {
	frame: Hook,
	frame_id: Rc<Cell<Option<i32>>>,
	resize: Hook,
}

impl CanvasHooks {
	/// Calls `draw` once per animation frame until it returns `false` or the
	/// hooks are released.
	fn animate(&self, mut draw: impl FnMut() -> bool + 'static) {
		let frame = Rc::downgrade(&self.frame);
		let frame_id = Rc::clone(&self.frame_id);
		*self.frame.borrow_mut() = Some(Closure::new(move || {
			frame_id.set(None);
			if !draw() {
				return;
			}
			if let Some(frame) = frame.upgrade() {
				schedule(&frame, &frame_id);
			}
		}));
		schedule(&self.frame, &self.frame_id);
	}

	/// Resizes the canvas with the window and hands the new viewport to
	/// `on_resize`.
	fn watch_resize(
		&self,
		canvas: HtmlCanvasElement,
		width: Option<f64>,
		height: Option<f64>,
		mut on_resize: impl FnMut(Viewport) + 'static,
	) {
		let Some(window) = web_sys::window() else {
			return;
		};
		let cb = Closure::<dyn FnMut()>::new(move || {
			let (w, h) = canvas_size(&canvas, width, height);
			canvas.set_width(w as u32);
			canvas.set_height(h as u32);
			on_resize(Viewport::new(w, h));
		});
		let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		*self.resize.borrow_mut() = Some(cb);
	}

	fn is_active(&self) -> bool {
		self.frame.borrow().is_some() || self.resize.borrow().is_some()
	}

	/// Cancels the pending frame, unhooks the resize listener and drops both
	/// closures.
	fn release(&self) {
		if let Some(window) = web_sys::window() {
			if let Some(id) = self.frame_id.take() {
				let _ = window.cancel_animation_frame(id);
			}
			if let Some(cb) = self.resize.borrow().as_ref() {
				let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		self.frame.borrow_mut().take();
		self.resize.borrow_mut().take();
	}

	/// Releases the hooks when the current reactive owner is cleaned up.
	fn release_on_cleanup(&self) {
		let hooks = SendWrapper::new(self.clone());
		on_cleanup(move || hooks.take().release());
	}
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
	use wasm_bindgen_test::*;

	use super::*;

	fn detached_canvas() -> HtmlCanvasElement {
		web_sys::window()
			.and_then(|w| w.document())
			.and_then(|d| d.create_element("canvas").ok())
			.and_then(|e| e.dyn_into::<HtmlCanvasElement>().ok())
			.unwrap()
	}

	#[wasm_bindgen_test]
	fn release_drops_captured_state() {
		let state = Rc::new(RefCell::new(0_u32));
		let hooks = CanvasHooks::default();

		let frame_state = Rc::clone(&state);
		hooks.animate(move || {
			*frame_state.borrow_mut() += 1;
			true
		});
		let resize_state = Rc::clone(&state);
		hooks.watch_resize(detached_canvas(), Some(10.0), Some(10.0), move |_| {
			*resize_state.borrow_mut() += 1;
		});
		assert!(hooks.is_active());
		assert_eq!(Rc::strong_count(&state), 3);

		hooks.release();
		assert!(!hooks.is_active());
		assert_eq!(hooks.frame_id.get(), None);
		assert_eq!(Rc::strong_count(&state), 1);
	}

	#[wasm_bindgen_test]
	fn frame_loop_holds_no_reference_to_itself() {
		let hooks = CanvasHooks::default();
		hooks.animate(|| true);
		assert_eq!(Rc::strong_count(&hooks.frame), 1);
		hooks.release();
	}
}
