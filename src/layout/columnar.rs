//! Three-column placement for schema graphs: pure sources on the left, pure
//! targets on the right, everything that is both in the middle.
//!
//! The heuristic suits mostly acyclic, shallow graphs and makes no attempt at
//! crossing minimisation. It is deterministic for a given model and viewport.

use log::debug;

use super::{Point, PositionMap, Viewport};
use crate::graph::{GraphModel, Node, NodeRole};

/// Horizontal position of each column as a fraction of viewport width.
pub const COLUMN_X: [f64; 3] = [0.2, 0.5, 0.8];

/// Column membership in model order.
#[derive(Clone, Debug, Default, PartialEq)]
#[allow(missing_docs)]
pub struct Columns<'a> {
	pub left: Vec<&'a Node>,
	pub middle: Vec<&'a Node>,
	pub right: Vec<&'a Node>,
}

impl Columns<'_> {
	/// Node ids of one column, in order.
	pub fn ids(column: &[&Node]) -> Vec<String> {
		column.iter().map(|n| n.id.clone()).collect()
	}
}

fn contains(column: &[&Node], node: &Node) -> bool {
	column.iter().any(|n| n.id == node.id)
}

/// Splits the model into columns by edge direction. The left column is never
/// empty for a model with nodes.
pub fn assign_columns(model: &GraphModel) -> Columns<'_> {
	let classes = model.classify();
	let sources = classes.bucket(NodeRole::SourceOnly);
	let targets = classes.bucket(NodeRole::TargetOnly);
	let bridging = classes.bucket(NodeRole::Bridging);
	let isolated = classes.bucket(NodeRole::Isolated);

	let left: Vec<&Node> = if !sources.is_empty() {
		sources
	} else if let Some(first) = bridging.first() {
		vec![*first]
	} else {
		model.nodes().first().into_iter().collect()
	};

	let right: Vec<&Node> = if !targets.is_empty() { targets } else { isolated }
		.into_iter()
		.filter(|n| !contains(&left, n))
		.collect();

	let middle = bridging.into_iter().filter(|n| !contains(&left, n)).collect();

	Columns { left, middle, right }
}

fn stack(positions: &mut PositionMap, column: &[&Node], x: f64, height: f64) {
	let step = height / (column.len() + 1) as f64;
	for (i, node) in column.iter().enumerate() {
		positions.insert(node.id.clone(), Point::new(x, step * (i + 1) as f64));
	}
}

/// Places every column member; nodes that land in no column get no position.
pub fn layout(model: &GraphModel, viewport: Viewport) -> PositionMap {
	let columns = assign_columns(model);
	let mut positions = PositionMap::new();
	for (column, fraction) in [&columns.left, &columns.middle, &columns.right]
		.into_iter()
		.zip(COLUMN_X)
	{
		stack(&mut positions, column, viewport.width * fraction, viewport.height);
	}
	debug!(
		"columnar layout: {} left, {} middle, {} right, {} of {} nodes placed",
		columns.left.len(),
		columns.middle.len(),
		columns.right.len(),
		positions.len(),
		model.nodes().len()
	);
	positions
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::Edge;

	fn model(nodes: &[&str], edges: &[(&str, &str)]) -> GraphModel {
		GraphModel::from_parts(
			nodes.iter().map(|id| Node::new(*id, *id)).collect(),
			edges.iter().map(|(s, t)| Edge::new(*s, *t, "fk")).collect(),
		)
	}

	#[test]
	fn chain_spreads_over_three_columns() {
		let m = model(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
		let cols = assign_columns(&m);
		assert_eq!(Columns::ids(&cols.left), vec!["A"]);
		assert_eq!(Columns::ids(&cols.middle), vec!["B"]);
		assert_eq!(Columns::ids(&cols.right), vec!["C"]);

		let positions = layout(&m, Viewport::new(1000.0, 600.0));
		assert_eq!(positions.get("A"), Some(Point::new(200.0, 300.0)));
		assert_eq!(positions.get("B"), Some(Point::new(500.0, 300.0)));
		assert_eq!(positions.get("C"), Some(Point::new(800.0, 300.0)));
	}

	#[test]
	fn cycle_falls_back_to_first_bridging_node() {
		let m = model(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("C", "A")]);
		let cols = assign_columns(&m);
		assert_eq!(Columns::ids(&cols.left), vec!["A"]);
		assert_eq!(Columns::ids(&cols.middle), vec!["B", "C"]);
		assert!(cols.right.is_empty());
	}

	#[test]
	fn even_vertical_spacing() {
		let m = model(&["S", "T1", "T2", "T3"], &[("S", "T1"), ("S", "T2"), ("S", "T3")]);
		let positions = layout(&m, Viewport::new(100.0, 400.0));
		assert_eq!(positions.get("T1"), Some(Point::new(80.0, 100.0)));
		assert_eq!(positions.get("T2"), Some(Point::new(80.0, 200.0)));
		assert_eq!(positions.get("T3"), Some(Point::new(80.0, 300.0)));
	}

	#[test]
	fn isolated_nodes_fill_right_column_without_targets() {
		let m = model(&["A", "B", "X"], &[("A", "B"), ("B", "A")]);
		let cols = assign_columns(&m);
		assert_eq!(Columns::ids(&cols.left), vec!["A"]);
		assert_eq!(Columns::ids(&cols.middle), vec!["B"]);
		assert_eq!(Columns::ids(&cols.right), vec!["X"]);
	}

	#[test]
	fn isolated_nodes_unplaced_when_targets_exist() {
		let m = model(&["A", "B", "X"], &[("A", "B")]);
		let positions = layout(&m, Viewport::default());
		assert!(positions.contains("A") && positions.contains("B"));
		assert!(!positions.contains("X"));
	}

	#[test]
	fn fallback_node_is_not_placed_twice() {
		let m = model(&["A", "B"], &[("ghost", "A"), ("ghost", "B")]);
		let cols = assign_columns(&m);
		assert_eq!(Columns::ids(&cols.left), vec!["A"]);
		assert_eq!(Columns::ids(&cols.right), vec!["B"]);
	}

	#[test]
	fn empty_model_has_no_positions() {
		assert!(layout(&GraphModel::new(), Viewport::default()).is_empty());
	}
}
