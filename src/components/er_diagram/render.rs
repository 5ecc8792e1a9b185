use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{CARD_WIDTH, ErDiagramState, HEADER_HEIGHT, ROW_HEIGHT};
use crate::geometry::{EdgeGeometry, Stroke};
use crate::graph::Node;

const BACKGROUND: &str = "#f7f8fa";
const CARD_FILL: &str = "#ffffff";
const CARD_BORDER: &str = "#c9cdd4";
const HEADER_FILL: &str = "#5b8ff9";
const SELECTED_BORDER: &str = "#1677ff";

pub fn render(state: &ErDiagramState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.viewport.width, state.viewport.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	let edges = state.edges();
	for edge in &edges {
		draw_edge(edge, ctx, state.transform.k);
	}
	for node in state.model.nodes() {
		draw_card(state, node, ctx);
	}
	for edge in &edges {
		draw_edge_label(edge, ctx);
	}
	ctx.restore();
}

fn draw_edge(edge: &EdgeGeometry, ctx: &CanvasRenderingContext2d, k: f64) {
	let lit = edge.stroke == Stroke::Highlighted;
	let color = if lit { SELECTED_BORDER } else { "#8a919f" };
	ctx.set_stroke_style_str(color);
	ctx.set_fill_style_str(color);
	ctx.set_line_width(edge.stroke.width() / k.max(0.5));
	if lit {
		let _ = ctx.set_line_dash(&js_sys::Array::of2(&JsValue::from_f64(6.0), &JsValue::from_f64(3.0)));
	}
	let (left, right) = (edge.arrow.left, edge.arrow.right);
	ctx.begin_path();
	ctx.move_to(edge.start.x, edge.start.y);
	ctx.line_to((left.x + right.x) / 2.0, (left.y + right.y) / 2.0);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	ctx.begin_path();
	ctx.move_to(edge.arrow.tip.x, edge.arrow.tip.y);
	ctx.line_to(left.x, left.y);
	ctx.line_to(right.x, right.y);
	ctx.close_path();
	ctx.fill();
}

fn draw_edge_label(edge: &EdgeGeometry, ctx: &CanvasRenderingContext2d) {
	if edge.label.text.is_empty() {
		return;
	}
	let p = edge.label.position;
	ctx.set_font("bold 11px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let w = ctx.measure_text(&edge.label.text).map(|m| m.width()).unwrap_or(0.0);
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.9)");
	ctx.fill_rect(p.x - w / 2.0 - 4.0, p.y - 8.0, w + 8.0, 16.0);
	ctx.set_fill_style_str(if edge.stroke == Stroke::Highlighted { SELECTED_BORDER } else { "#4e5969" });
	let _ = ctx.fill_text(&edge.label.text, p.x, p.y);
	ctx.set_text_align("start");
	ctx.set_text_baseline("alphabetic");
}

fn draw_card(state: &ErDiagramState, node: &Node, ctx: &CanvasRenderingContext2d) {
	let Some((x, y, w, h)) = state.card_rect(node) else {
		return;
	};
	let selected = state.selected.as_deref() == Some(node.id.as_str());

	ctx.set_fill_style_str(CARD_FILL);
	ctx.fill_rect(x, y, w, h);
	ctx.set_fill_style_str(HEADER_FILL);
	ctx.fill_rect(x, y, w, HEADER_HEIGHT);
	ctx.set_stroke_style_str(if selected { SELECTED_BORDER } else { CARD_BORDER });
	ctx.set_line_width(if selected { 2.5 } else { 1.0 });
	ctx.stroke_rect(x, y, w, h);

	ctx.set_fill_style_str("#ffffff");
	ctx.set_font("bold 13px sans-serif");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text_with_max_width(&node.label, x + 10.0, y + HEADER_HEIGHT / 2.0, CARD_WIDTH - 20.0);

	ctx.set_font("12px sans-serif");
	if node.fields.is_empty() {
		ctx.set_fill_style_str("#86909c");
		let _ = ctx.fill_text("no columns", x + 10.0, y + HEADER_HEIGHT + ROW_HEIGHT / 2.0);
	}
	for (i, field) in node.fields.iter().enumerate() {
		let row_y = y + HEADER_HEIGHT + ROW_HEIGHT * (i as f64 + 0.5);
		let marker = match (field.is_primary_key, field.is_foreign_key) {
			(true, true) => "PK FK",
			(true, false) => "PK",
			(false, true) => "FK",
			(false, false) => "",
		};
		ctx.set_fill_style_str(if field.is_primary_key { "#d46b08" } else { "#7e57c2" });
		let _ = ctx.fill_text(marker, x + 8.0, row_y);
		ctx.set_fill_style_str("#1d2129");
		let _ = ctx.fill_text_with_max_width(&field.name, x + 48.0, row_y, 80.0);
		ctx.set_fill_style_str("#86909c");
		ctx.set_text_align("right");
		let _ = ctx.fill_text_with_max_width(&field.type_descriptor, x + w - 8.0, row_y, 64.0);
		ctx.set_text_align("start");
	}
	ctx.set_text_baseline("alphabetic");
}
