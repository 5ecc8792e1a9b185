use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::ForceGraphState;
use crate::geometry::{EdgeGeometry, Stroke, node_colors};
use crate::graph::Node;

const BACKGROUND: &str = "#fafbfc";
const EDGE_RGB: &str = "150, 160, 175";
const EDGE_HIGHLIGHT_RGB: &str = "22, 119, 255";

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.viewport.width, state.viewport.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	let edges = state.edges();
	draw_edges(state, &edges, ctx);
	draw_nodes(state, ctx);
	draw_edge_labels(state, &edges, ctx);
	ctx.restore();
}

fn draw_edges(state: &ForceGraphState, edges: &[EdgeGeometry], ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (dash, gap) = (8.0 / k, 4.0 / k);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let t = ease_out_cubic(state.hover.highlight_t);
	let radius = state.node_radius();

	for edge in edges {
		if edge.is_degenerate() {
			continue;
		}
		let near_hover = state.is_highlighted(&edge.source) && state.is_highlighted(&edge.target);
		let lit = edge.stroke == Stroke::Highlighted;

		// t=0: every edge at 0.6; t=1: hover edges at 0.9, the rest at 0.15
		let alpha = if lit {
			0.9
		} else if near_hover {
			0.6 + 0.3 * t
		} else {
			0.6 - 0.45 * t
		};
		let rgb = if lit { EDGE_HIGHLIGHT_RGB } else { EDGE_RGB };
		let width = edge.stroke.width() / k.max(0.5);

		ctx.set_stroke_style_str(&format!("rgba({rgb}, {alpha})"));
		ctx.set_line_width(width);
		if lit {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(&JsValue::from_f64(dash), &JsValue::from_f64(gap)));
			ctx.set_line_dash_offset(dash_offset);
		}

		let (ux, uy) = edge.direction();
		let (left, right) = (edge.arrow.left, edge.arrow.right);
		ctx.begin_path();
		ctx.move_to(edge.start.x + ux * radius, edge.start.y + uy * radius);
		ctx.line_to((left.x + right.x) / 2.0, (left.y + right.y) / 2.0);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		ctx.set_fill_style_str(&format!("rgba({rgb}, {})", (alpha + 0.2).min(1.0)));
		ctx.begin_path();
		ctx.move_to(edge.arrow.tip.x, edge.arrow.tip.y);
		ctx.line_to(edge.arrow.left.x, edge.arrow.left.y);
		ctx.line_to(edge.arrow.right.x, edge.arrow.right.y);
		ctx.close_path();
		ctx.fill();
	}
}

fn draw_edge_labels(state: &ForceGraphState, edges: &[EdgeGeometry], ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	if k < 0.4 {
		return;
	}
	ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(1.0)));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	for edge in edges {
		if edge.label.text.is_empty() || edge.length <= state.node_radius() * 2.5 {
			continue;
		}
		let p = edge.label.position;
		let w = ctx.measure_text(&edge.label.text).map(|m| m.width()).unwrap_or(0.0);
		ctx.set_fill_style_str("rgba(255, 255, 255, 0.85)");
		ctx.fill_rect(p.x - w / 2.0 - 2.0, p.y - 6.0 / k.max(1.0), w + 4.0, 12.0 / k.max(1.0));
		ctx.set_fill_style_str(if edge.stroke == Stroke::Highlighted { "#1677ff" } else { "#5c6470" });
		let _ = ctx.fill_text(&edge.label.text, p.x, p.y);
	}
	ctx.set_text_align("start");
	ctx.set_text_baseline("alphabetic");
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);
	let base = state.node_radius();

	// dimmed nodes first so highlighted ones draw on top
	for node in state.model.nodes() {
		if has_highlight && state.is_highlighted(&node.id) {
			continue;
		}
		let Some(p) = state.sim.position(&node.id) else {
			continue;
		};
		let (alpha, radius) = if has_highlight {
			(1.0 - 0.7 * t, base * (1.0 - 0.15 * t))
		} else {
			(1.0, base)
		};
		ctx.set_global_alpha(alpha);
		draw_node(state, ctx, node, p.x, p.y, radius, k);
		ctx.set_global_alpha(1.0);
	}

	if !has_highlight {
		return;
	}

	for node in state.model.nodes() {
		if !state.is_highlighted(&node.id) {
			continue;
		}
		let Some(p) = state.sim.position(&node.id) else {
			continue;
		};
		let is_hovered = state.is_hovered(&node.id);
		let (radius, glow_radius) = if is_hovered {
			(base * (1.0 + 0.15 * t), base * (1.4 + 0.6 * t))
		} else {
			(base * (1.0 + 0.08 * t), base * (1.2 + 0.3 * t))
		};

		if t > 0.01 {
			if let Ok(gradient) = ctx.create_radial_gradient(p.x, p.y, radius * 0.3, p.x, p.y, glow_radius) {
				let alpha = if is_hovered { 0.35 * t } else { 0.2 * t };
				let _ = gradient.add_color_stop(0.0, &format!("rgba(91, 143, 249, {alpha})"));
				let _ = gradient.add_color_stop(0.6, &format!("rgba(91, 143, 249, {})", alpha * 0.3));
				let _ = gradient.add_color_stop(1.0, "rgba(91, 143, 249, 0)");
				ctx.begin_path();
				let _ = ctx.arc(p.x, p.y, glow_radius, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}
		draw_node(state, ctx, node, p.x, p.y, radius, k);
	}
}

fn draw_node(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	node: &Node,
	x: f64,
	y: f64,
	radius: f64,
	k: f64,
) {
	let colors = node_colors(&node.kind);
	let central = state.central_node.as_deref() == Some(node.id.as_str());

	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(colors.fill);
	ctx.fill();
	ctx.set_stroke_style_str(colors.stroke);
	let outline = if central { 3.0 } else { 1.5 };
	ctx.set_line_width(outline / k.max(0.5));
	ctx.stroke();

	ctx.set_fill_style_str("#1f2329");
	ctx.set_font(&format!("{}px sans-serif", 12.0 / k.max(1.0)));
	ctx.set_text_align("center");
	let _ = ctx.fill_text(&node.label, x, y + radius + 14.0 / k.max(1.0));
	ctx.set_text_align("start");
}
