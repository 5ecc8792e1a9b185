//! Drawable primitives derived from positions and edges.
//!
//! Everything here is recomputed from a [`PositionMap`] on demand; hover only
//! changes the stroke of one edge, never its geometry.

use log::debug;

use crate::graph::{Edge, GraphModel, NodeId, NodeKind};
use crate::layout::{Point, PositionMap};

/// Stroke variant of an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stroke {
	/// Resting edge.
	Normal,
	/// Hovered edge.
	Highlighted,
}

impl Stroke {
	/// Line width in screen units.
	pub fn width(self) -> f64 {
		match self {
			Stroke::Normal => 1.5,
			Stroke::Highlighted => 2.5,
		}
	}
}

/// Edge label placement: the midpoint, counter-rotated so text reads
/// horizontally whatever the edge orientation.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelAnchor {
	/// Midpoint of the edge.
	pub position: Point,
	/// Rotation relative to the edge's own frame, in degrees (`-angle`).
	pub rotation_deg: f64,
	#[allow(missing_docs)]
	pub text: String,
}

/// Triangular arrowhead whose tip sits at the target end.
#[derive(Clone, Copy, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct Arrowhead {
	pub tip: Point,
	pub left: Point,
	pub right: Point,
	pub angle_deg: f64,
}

/// Arrowhead dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrowStyle {
	/// Distance between target centre and arrow tip, e.g. the node radius.
	pub target_inset: f64,
	/// Tip to base.
	pub length: f64,
	/// Across the base.
	pub width: f64,
}

impl Default for ArrowStyle {
	fn default() -> Self {
		Self {
			target_inset: 0.0,
			length: 8.0,
			width: 10.0,
		}
	}
}

/// Everything needed to draw and hit-test one edge.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeGeometry {
	#[allow(missing_docs)]
	pub edge_id: String,
	#[allow(missing_docs)]
	pub source: NodeId,
	#[allow(missing_docs)]
	pub target: NodeId,
	/// Source node position.
	pub start: Point,
	/// Target node position.
	pub end: Point,
	/// Euclidean distance between endpoint positions.
	pub length: f64,
	/// `atan2(dy, dx)` in degrees.
	pub angle_deg: f64,
	#[allow(missing_docs)]
	pub label: LabelAnchor,
	#[allow(missing_docs)]
	pub arrow: Arrowhead,
	#[allow(missing_docs)]
	pub stroke: Stroke,
}

impl EdgeGeometry {
	/// Unit direction from source to target; `(1, 0)` for zero-length edges.
	pub fn direction(&self) -> (f64, f64) {
		direction(self.start, self.end)
	}

	/// Endpoints coincide, so there is no direction to draw along.
	pub fn is_degenerate(&self) -> bool {
		self.length <= f64::EPSILON
	}

	/// Shortest distance from `p` to the segment.
	pub fn distance_to(&self, p: Point) -> f64 {
		let (dx, dy) = (self.end.x - self.start.x, self.end.y - self.start.y);
		let len_sq = dx * dx + dy * dy;
		if len_sq <= f64::EPSILON {
			return p.distance(self.start);
		}
		let t = (((p.x - self.start.x) * dx + (p.y - self.start.y) * dy) / len_sq).clamp(0.0, 1.0);
		p.distance(Point::new(self.start.x + t * dx, self.start.y + t * dy))
	}
}

fn direction(a: Point, b: Point) -> (f64, f64) {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len = dx.hypot(dy);
	if len <= f64::EPSILON {
		(1.0, 0.0)
	} else {
		(dx / len, dy / len)
	}
}

/// Geometry for one edge, or `None` when either endpoint has no position.
pub fn edge_geometry(
	edge: &Edge,
	positions: &PositionMap,
	highlighted: Option<&str>,
	arrow: ArrowStyle,
) -> Option<EdgeGeometry> {
	let start = positions.get(&edge.source)?;
	let end = positions.get(&edge.target)?;
	let (dx, dy) = (end.x - start.x, end.y - start.y);
	let angle_deg = dy.atan2(dx).to_degrees();

	let (ux, uy) = direction(start, end);
	let tip = Point::new(end.x - ux * arrow.target_inset, end.y - uy * arrow.target_inset);
	let back = Point::new(tip.x - ux * arrow.length, tip.y - uy * arrow.length);
	let (px, py) = (-uy * arrow.width * 0.5, ux * arrow.width * 0.5);

	Some(EdgeGeometry {
		edge_id: edge.id.clone(),
		source: edge.source.clone(),
		target: edge.target.clone(),
		start,
		end,
		length: dx.hypot(dy),
		angle_deg,
		label: LabelAnchor {
			position: Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0),
			rotation_deg: -angle_deg,
			text: edge.label.clone(),
		},
		arrow: Arrowhead {
			tip,
			left: Point::new(back.x + px, back.y + py),
			right: Point::new(back.x - px, back.y - py),
			angle_deg,
		},
		stroke: if highlighted == Some(edge.id.as_str()) {
			Stroke::Highlighted
		} else {
			Stroke::Normal
		},
	})
}

/// Geometry for every drawable edge of `model`, in model order. Edges whose
/// endpoint is missing from the model or from `positions` are skipped.
pub fn build(
	model: &GraphModel,
	positions: &PositionMap,
	highlighted: Option<&str>,
	arrow: ArrowStyle,
) -> Vec<EdgeGeometry> {
	model
		.edges()
		.iter()
		.filter_map(|edge| {
			let geometry = (model.contains_node(&edge.source) && model.contains_node(&edge.target))
				.then(|| edge_geometry(edge, positions, highlighted, arrow))
				.flatten();
			if geometry.is_none() {
				debug!(
					"edge {} skipped: endpoint {} -> {} has no position",
					edge.id, edge.source, edge.target
				);
			}
			geometry
		})
		.collect()
}

/// Id of the edge nearest to `p` within `tolerance`.
pub fn edge_at(geometry: &[EdgeGeometry], p: Point, tolerance: f64) -> Option<&str> {
	geometry
		.iter()
		.map(|g| (g, g.distance_to(p)))
		.filter(|(_, d)| *d <= tolerance)
		.min_by(|a, b| a.1.total_cmp(&b.1))
		.map(|(g, _)| g.edge_id.as_str())
}

/// Id of the node nearest to `p` within `radius`, searching in model order.
pub fn node_at<'a>(model: &'a GraphModel, positions: &PositionMap, p: Point, radius: f64) -> Option<&'a str> {
	model
		.nodes()
		.iter()
		.filter_map(|n| positions.get(&n.id).map(|q| (n, q.distance(p))))
		.filter(|(_, d)| *d < radius)
		.min_by(|a, b| a.1.total_cmp(&b.1))
		.map(|(n, _)| n.id.as_str())
}

/// Fill and stroke colours of a node circle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct NodeColors {
	pub fill: &'static str,
	pub stroke: &'static str,
}

/// Palette entry for a node kind; unknown kinds share the default.
pub fn node_colors(kind: &NodeKind) -> NodeColors {
	match kind {
		NodeKind::Person => NodeColors {
			fill: "#C6E5FF",
			stroke: "#5B8FF9",
		},
		NodeKind::Organization => NodeColors {
			fill: "#D5FFD6",
			stroke: "#5AD85A",
		},
		_ => NodeColors {
			fill: "#FFD8B8",
			stroke: "#F6BD16",
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::Node;

	fn positions(points: &[(&str, f64, f64)]) -> PositionMap {
		points
			.iter()
			.map(|(id, x, y)| (id.to_string(), Point::new(*x, *y)))
			.collect()
	}

	fn pair_model(edges: Vec<Edge>) -> GraphModel {
		GraphModel::from_parts(vec![Node::new("A", "A"), Node::new("B", "B")], edges)
	}

	#[test]
	fn length_angle_and_label() {
		let model = pair_model(vec![Edge::new("A", "B", "1:N")]);
		let pos = positions(&[("A", 0.0, 0.0), ("B", 30.0, 40.0)]);
		let g = &build(&model, &pos, None, ArrowStyle::default())[0];

		assert_eq!(g.length, 50.0);
		assert!((g.angle_deg - 53.130_102_354).abs() < 1e-6);
		assert_eq!(g.label.position, Point::new(15.0, 20.0));
		assert_eq!(g.label.rotation_deg, -g.angle_deg);
		assert_eq!(g.label.text, "1:N");
	}

	#[test]
	fn arrow_tip_at_target_minus_inset() {
		let model = pair_model(vec![Edge::new("A", "B", "r")]);
		let pos = positions(&[("A", 0.0, 0.0), ("B", 100.0, 0.0)]);
		let arrow = ArrowStyle {
			target_inset: 20.0,
			length: 8.0,
			width: 10.0,
		};
		let g = &build(&model, &pos, None, arrow)[0];
		assert_eq!(g.arrow.tip, Point::new(80.0, 0.0));
		assert_eq!(g.arrow.left, Point::new(72.0, 5.0));
		assert_eq!(g.arrow.right, Point::new(72.0, -5.0));
	}

	#[test]
	fn vertical_edge_points_down() {
		let model = pair_model(vec![Edge::new("A", "B", "r")]);
		let pos = positions(&[("A", 0.0, 0.0), ("B", 0.0, 10.0)]);
		let g = &build(&model, &pos, None, ArrowStyle::default())[0];
		assert!((g.angle_deg - 90.0).abs() < 1e-9);
		assert_eq!(g.direction(), (0.0, 1.0));
	}

	#[test]
	fn dangling_edges_are_skipped() {
		let model = pair_model(vec![Edge::new("A", "ghost", "r"), Edge::new("A", "B", "r")]);
		let pos = positions(&[("A", 0.0, 0.0), ("B", 10.0, 0.0)]);
		let built = build(&model, &pos, None, ArrowStyle::default());
		assert_eq!(built.len(), 1);
		assert_eq!(built[0].edge_id, model.edges()[1].id);
	}

	#[test]
	fn unpositioned_node_skips_its_edges() {
		let model = pair_model(vec![Edge::new("A", "B", "r")]);
		let pos = positions(&[("A", 0.0, 0.0)]);
		assert!(build(&model, &pos, None, ArrowStyle::default()).is_empty());
	}

	#[test]
	fn highlight_changes_stroke_only() {
		let model = pair_model(vec![Edge::new("A", "B", "r").with_id("e1")]);
		let pos = positions(&[("A", 0.0, 0.0), ("B", 10.0, 10.0)]);
		let plain = &build(&model, &pos, None, ArrowStyle::default())[0];
		let lit = &build(&model, &pos, Some("e1"), ArrowStyle::default())[0];
		assert_eq!(plain.stroke, Stroke::Normal);
		assert_eq!(lit.stroke, Stroke::Highlighted);
		assert_eq!(
			EdgeGeometry {
				stroke: Stroke::Normal,
				..lit.clone()
			},
			*plain
		);
	}

	#[test]
	fn zero_length_edge_is_safe() {
		let model = pair_model(vec![Edge::new("A", "A", "self")]);
		let pos = positions(&[("A", 5.0, 5.0)]);
		let g = &build(&model, &pos, None, ArrowStyle::default())[0];
		assert_eq!(g.length, 0.0);
		assert_eq!(g.angle_deg, 0.0);
		assert_eq!(g.direction(), (1.0, 0.0));
	}

	#[test]
	fn hit_testing() {
		let model = pair_model(vec![Edge::new("A", "B", "r").with_id("e1")]);
		let pos = positions(&[("A", 0.0, 0.0), ("B", 100.0, 0.0)]);
		let built = build(&model, &pos, None, ArrowStyle::default());

		assert_eq!(edge_at(&built, Point::new(50.0, 3.0), 4.0), Some("e1"));
		assert_eq!(edge_at(&built, Point::new(50.0, 30.0), 4.0), None);
		assert_eq!(edge_at(&built, Point::new(120.0, 0.0), 4.0), None);

		assert_eq!(node_at(&model, &pos, Point::new(95.0, 2.0), 12.0), Some("B"));
		assert_eq!(node_at(&model, &pos, Point::new(50.0, 0.0), 12.0), None);
	}

	#[test]
	fn touching_nodes_still_get_an_edge() {
		let style = ArrowStyle {
			target_inset: 20.0,
			..ArrowStyle::default()
		};
		let model = pair_model(vec![Edge::new("A", "B", "r")]);
		let touching = build(&model, &positions(&[("A", 0.0, 0.0), ("B", 40.0, 0.0)]), None, style);
		assert_eq!(touching.len(), 1);
		assert!(!touching[0].is_degenerate());
		assert_eq!(touching[0].arrow.tip, Point::new(20.0, 0.0));

		let stacked = build(&model, &positions(&[("A", 5.0, 5.0), ("B", 5.0, 5.0)]), None, style);
		assert!(stacked[0].is_degenerate());
	}

	#[test]
	fn colours_follow_kind() {
		assert_eq!(node_colors(&NodeKind::Person).stroke, "#5B8FF9");
		assert_eq!(node_colors(&NodeKind::Organization).fill, "#D5FFD6");
		assert_eq!(node_colors(&NodeKind::Tag("Project".into())), node_colors(&NodeKind::Untagged));
	}
}
