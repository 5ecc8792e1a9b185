use std::collections::HashSet;

use crate::geometry::{self, ArrowStyle, EdgeGeometry};
use crate::graph::{GraphModel, NodeId};
use crate::layout::force::{ForceSimulation, SimulationParameters};
use crate::layout::{Padding, Point, ViewTransform, Viewport};

/// Screen distance within which the pointer counts as on an edge.
pub const EDGE_HIT_TOLERANCE: f64 = 5.0;
/// Pointer travel below which a press and release is a click, not a drag.
const CLICK_SLOP: f64 = 3.0;

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node: Option<NodeId>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Point,
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<NodeId>,
	pub neighbors: HashSet<NodeId>,
	pub highlight_t: f64,
	pub prev_node: Option<NodeId>,
	pub prev_neighbors: HashSet<NodeId>,
	delay_t: f64,
}

pub struct ForceGraphState {
	pub model: GraphModel,
	pub sim: ForceSimulation,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub viewport: Viewport,
	pub highlighted_edge: Option<String>,
	/// Edge under the pointer, as last reported to the host.
	pub pointer_edge: Option<String>,
	pub central_node: Option<NodeId>,
	pub flow_time: f64,
	/// Keep the view fitted while the layout moves, until the user pans or zooms.
	auto_fit: bool,
}

impl ForceGraphState {
	pub fn new(model: GraphModel, viewport: Viewport, params: SimulationParameters) -> Self {
		Self {
			sim: ForceSimulation::new(&model, viewport, params),
			model,
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			viewport,
			highlighted_edge: None,
			pointer_edge: None,
			central_node: None,
			flow_time: 0.0,
			auto_fit: true,
		}
	}

	/// Swaps in a new snapshot. Nodes that survive keep their place.
	pub fn load(&mut self, model: GraphModel) {
		self.sim.load(&model);
		self.model = model;
		self.drag = DragState::default();
		self.set_hover(None);
		self.hover.prev_node = None;
		self.hover.prev_neighbors.clear();
		self.auto_fit = true;
	}

	pub fn node_radius(&self) -> f64 {
		self.sim.params().node_radius
	}

	pub fn fit(&mut self) {
		let radius = self.node_radius();
		self.transform = ViewTransform::fit(&self.sim.positions(), self.viewport, Padding::default(), radius);
	}

	pub fn edges(&self) -> Vec<EdgeGeometry> {
		let arrow = ArrowStyle {
			target_inset: self.node_radius(),
			..ArrowStyle::default()
		};
		geometry::build(
			&self.model,
			&self.sim.positions(),
			self.highlighted_edge.as_deref(),
			arrow,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<NodeId> {
		let p = self.transform.screen_to_graph(sx, sy);
		// radius is in graph space, scales with zoom like nodes
		self.sim.node_at(p, self.node_radius()).map(String::from)
	}

	pub fn edge_at_position(&self, sx: f64, sy: f64) -> Option<String> {
		let p = self.transform.screen_to_graph(sx, sy);
		let edges = self.edges();
		geometry::edge_at(&edges, p, EDGE_HIT_TOLERANCE / self.transform.k).map(String::from)
	}

	pub fn begin_drag(&mut self, id: NodeId, sx: f64, sy: f64) {
		let node_start = self.sim.position(&id).unwrap_or_default();
		self.drag = DragState {
			active: true,
			node: Some(id),
			start_x: sx,
			start_y: sy,
			node_start,
			moved: false,
		};
	}

	/// Moves the dragged node with the pointer and pins it there.
	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		let Some(id) = self.drag.node.clone() else {
			return;
		};
		let (dx, dy) = (sx - self.drag.start_x, sy - self.drag.start_y);
		if !self.drag.moved && dx.hypot(dy) < CLICK_SLOP {
			return;
		}
		self.drag.moved = true;
		let k = self.transform.k;
		let target = Point::new(self.drag.node_start.x + dx / k, self.drag.node_start.y + dy / k);
		self.sim.pin(&id, target);
		self.sim.reheat();
	}

	/// Ends a drag. Returns the node id when the gesture was a click.
	pub fn end_drag(&mut self) -> Option<NodeId> {
		let drag = std::mem::take(&mut self.drag);
		if drag.active && !drag.moved { drag.node } else { None }
	}

	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	pub fn pan_to(&mut self, sx: f64, sy: f64) {
		self.auto_fit = false;
		self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
		self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
	}

	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		self.auto_fit = false;
		self.transform.zoom_at(sx, sy, factor);
	}

	pub fn set_hover(&mut self, node: Option<NodeId>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// keep the old highlight around so it can fade out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.neighbors = match &node {
			Some(id) => self.model.neighbors(id).into_iter().map(String::from).collect(),
			None => HashSet::new(),
		};
		if node.is_some() && !was_hovering {
			self.hover.delay_t = 0.0;
		}
		self.hover.node = node;
	}

	pub fn is_highlighted(&self, id: &str) -> bool {
		self.hover.node.as_deref() == Some(id)
			|| self.hover.neighbors.contains(id)
			|| self.hover.prev_node.as_deref() == Some(id)
			|| self.hover.prev_neighbors.contains(id)
	}

	pub fn is_hovered(&self, id: &str) -> bool {
		self.hover.node.as_deref() == Some(id) || self.hover.prev_node.as_deref() == Some(id)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn tick(&mut self, dt: f64) {
		let was_settled = self.sim.is_settled();
		let budget = self.sim.params().steps_per_frame;
		let settled = self.sim.advance(budget);
		if self.auto_fit && !(was_settled && settled) {
			self.fit();
		}
		self.flow_time += dt;

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	pub fn resize(&mut self, viewport: Viewport) {
		self.viewport = viewport;
		self.sim.resize(viewport);
		if self.auto_fit {
			self.fit();
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{Edge, Node};

	fn model() -> GraphModel {
		GraphModel::from_parts(
			vec![Node::new("a", "a"), Node::new("b", "b"), Node::new("c", "c")],
			vec![Edge::new("a", "b", "r").with_id("ab")],
		)
	}

	fn settled() -> ForceGraphState {
		let mut s = ForceGraphState::new(model(), Viewport::new(800.0, 600.0), SimulationParameters::default());
		while !s.sim.is_settled() {
			s.tick(0.016);
		}
		s
	}

	#[test]
	fn hover_highlights_neighbours() {
		let mut s = settled();
		s.set_hover(Some("a".into()));
		assert!(s.is_highlighted("a") && s.is_highlighted("b"));
		assert!(!s.is_highlighted("c"));
		s.set_hover(None);
		assert!(s.is_hovered("a"), "previous hover fades out");
	}

	#[test]
	fn click_is_a_drag_without_movement() {
		let mut s = settled();
		s.begin_drag("a".into(), 10.0, 10.0);
		s.drag_to(11.0, 10.0);
		assert_eq!(s.end_drag().as_deref(), Some("a"));

		s.begin_drag("a".into(), 10.0, 10.0);
		s.drag_to(60.0, 10.0);
		assert_eq!(s.end_drag(), None);
		assert!(s.sim.is_pinned("a"));
	}

	#[test]
	fn hit_testing_goes_through_the_view_transform() {
		let s = settled();
		let a = s.sim.position("a").unwrap();
		let (sx, sy) = s.transform.graph_to_screen(a);
		assert_eq!(s.node_at_position(sx, sy).as_deref(), Some("a"));
	}

	#[test]
	fn reload_keeps_surviving_positions() {
		let mut s = settled();
		let before = s.sim.position("a");
		let mut nodes = model().nodes().to_vec();
		nodes.push(Node::new("d", "d"));
		s.load(GraphModel::from_parts(nodes, vec![Edge::new("a", "d", "r")]));
		assert_eq!(s.sim.position("a"), before);
		assert!(s.sim.position("d").is_some());
	}
}
