use crate::geometry::{self, ArrowStyle, EdgeGeometry};
use crate::graph::{GraphModel, Node, NodeId};
use crate::layout::{Padding, PositionMap, ViewTransform, Viewport, columnar};

pub const CARD_WIDTH: f64 = 200.0;
pub const HEADER_HEIGHT: f64 = 28.0;
pub const ROW_HEIGHT: f64 = 20.0;
const CARD_GAP: f64 = 40.0;
const EDGE_HIT_TOLERANCE: f64 = 5.0;

pub fn card_height(node: &Node) -> f64 {
	HEADER_HEIGHT + ROW_HEIGHT * node.fields.len().max(1) as f64
}

/// Distance from a card's centre to its border along `(ux, uy)`.
pub fn card_inset(ux: f64, uy: f64, half_w: f64, half_h: f64) -> f64 {
	let tx = if ux.abs() > f64::EPSILON { half_w / ux.abs() } else { f64::INFINITY };
	let ty = if uy.abs() > f64::EPSILON { half_h / uy.abs() } else { f64::INFINITY };
	tx.min(ty)
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

pub struct ErDiagramState {
	pub model: GraphModel,
	pub positions: PositionMap,
	pub transform: ViewTransform,
	pub viewport: Viewport,
	pub pan: PanState,
	pub highlighted_edge: Option<String>,
	pub pointer_edge: Option<String>,
	pub selected: Option<NodeId>,
}

impl ErDiagramState {
	pub fn new(model: GraphModel, viewport: Viewport) -> Self {
		let mut state = Self {
			model: GraphModel::default(),
			positions: PositionMap::new(),
			transform: ViewTransform::default(),
			viewport,
			pan: PanState::default(),
			highlighted_edge: None,
			pointer_edge: None,
			selected: None,
		};
		state.load(model);
		state
	}

	/// Lays the model out in columns on a canvas tall enough for its cards,
	/// then fits that to the viewport.
	pub fn load(&mut self, model: GraphModel) {
		let tallest = model.nodes().iter().map(card_height).fold(0.0, f64::max);
		let columns = columnar::assign_columns(&model);
		let longest = [&columns.left, &columns.middle, &columns.right]
			.iter()
			.map(|c| c.len())
			.max()
			.unwrap_or(0);
		let layout_viewport = Viewport::new(
			self.viewport.width.max(3.0 * (CARD_WIDTH + CARD_GAP) / 0.6),
			self.viewport.height.max((longest + 1) as f64 * (tallest + CARD_GAP)),
		);
		self.positions = columnar::layout(&model, layout_viewport);
		if self.selected.as_deref().is_some_and(|id| !model.contains_node(id)) {
			self.selected = None;
		}
		self.model = model;
		self.fit();
	}

	pub fn fit(&mut self) {
		let half = self
			.model
			.nodes()
			.iter()
			.map(|n| card_height(n).max(CARD_WIDTH) / 2.0)
			.fold(0.0, f64::max);
		self.transform = ViewTransform::fit(&self.positions, self.viewport, Padding::default(), half);
	}

	pub fn resize(&mut self, viewport: Viewport) {
		self.viewport = viewport;
		self.fit();
	}

	/// Card rectangle `(x, y, w, h)` of a placed node in graph space.
	pub fn card_rect(&self, node: &Node) -> Option<(f64, f64, f64, f64)> {
		let p = self.positions.get(&node.id)?;
		let h = card_height(node);
		Some((p.x - CARD_WIDTH / 2.0, p.y - h / 2.0, CARD_WIDTH, h))
	}

	/// Edges clipped to the card borders, with the arrow at the target card.
	pub fn edges(&self) -> Vec<EdgeGeometry> {
		let highlighted = self.highlighted_edge.as_deref();
		geometry::build(&self.model, &self.positions, highlighted, ArrowStyle::default())
			.into_iter()
			.filter_map(|g| {
				let edge = self.model.edge(&g.edge_id)?;
				let target = self.model.node(&edge.target)?;
				let (ux, uy) = g.direction();
				let inset = card_inset(ux, uy, CARD_WIDTH / 2.0, card_height(target) / 2.0);
				let arrow = ArrowStyle {
					target_inset: inset,
					..ArrowStyle::default()
				};
				geometry::edge_geometry(edge, &self.positions, highlighted, arrow)
			})
			.collect()
	}

	pub fn table_at_position(&self, sx: f64, sy: f64) -> Option<&Node> {
		let p = self.transform.screen_to_graph(sx, sy);
		self.model.nodes().iter().rev().find(|n| {
			self.card_rect(n)
				.is_some_and(|(x, y, w, h)| p.x >= x && p.x <= x + w && p.y >= y && p.y <= y + h)
		})
	}

	pub fn edge_at_position(&self, sx: f64, sy: f64) -> Option<String> {
		let p = self.transform.screen_to_graph(sx, sy);
		geometry::edge_at(&self.edges(), p, EDGE_HIT_TOLERANCE / self.transform.k).map(String::from)
	}

	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			moved: false,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	pub fn pan_to(&mut self, sx: f64, sy: f64) {
		let (dx, dy) = (sx - self.pan.start_x, sy - self.pan.start_y);
		if !self.pan.moved && dx.hypot(dy) < 3.0 {
			return;
		}
		self.pan.moved = true;
		self.transform.x = self.pan.transform_start_x + dx;
		self.transform.y = self.pan.transform_start_y + dy;
	}

	/// Ends a pan; `true` when the pointer never moved, i.e. a click.
	pub fn end_pan(&mut self) -> bool {
		let pan = std::mem::take(&mut self.pan);
		pan.active && !pan.moved
	}

	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		self.transform.zoom_at(sx, sy, factor);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{Edge, Field};

	fn schema() -> GraphModel {
		let users = Node::new("users", "users").with_field(Field {
			name: "id".into(),
			type_descriptor: "int".into(),
			is_primary_key: true,
			..Field::default()
		});
		let orders = Node::new("orders", "orders");
		GraphModel::from_parts(vec![users, orders], vec![Edge::new("users", "orders", "1:N").with_id("fk")])
	}

	#[test]
	fn inset_reaches_the_card_border() {
		assert_eq!(card_inset(1.0, 0.0, 100.0, 30.0), 100.0);
		assert_eq!(card_inset(0.0, -1.0, 100.0, 30.0), 30.0);
	}

	#[test]
	fn arrow_stops_at_target_card() {
		let s = ErDiagramState::new(schema(), Viewport::new(1000.0, 600.0));
		let edges = s.edges();
		assert_eq!(edges.len(), 1);
		let target = s.positions.get("orders").unwrap();
		let tip = edges[0].arrow.tip;
		assert!((target.x - tip.x - CARD_WIDTH / 2.0).abs() < 1e-6);
	}

	#[test]
	fn cards_are_hit_tested_in_screen_space() {
		let s = ErDiagramState::new(schema(), Viewport::new(1000.0, 600.0));
		let users = s.positions.get("users").unwrap();
		let (sx, sy) = s.transform.graph_to_screen(users);
		assert_eq!(s.table_at_position(sx, sy).map(|n| n.id.as_str()), Some("users"));
		assert!(s.table_at_position(1.0, 1.0).is_none());
	}

	#[test]
	fn stationary_press_is_a_click() {
		let mut s = ErDiagramState::new(schema(), Viewport::new(1000.0, 600.0));
		s.begin_pan(10.0, 10.0);
		s.pan_to(11.0, 11.0);
		assert!(s.end_pan());
		s.begin_pan(10.0, 10.0);
		s.pan_to(50.0, 10.0);
		assert!(!s.end_pan());
	}
}
