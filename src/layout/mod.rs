//! Node placement. Two strategies share the same output, a [`PositionMap`]:
//! a one-shot columnar heuristic for ER diagrams and an iterative force
//! simulation for knowledge-graph neighbourhoods.

pub mod columnar;
pub mod force;
mod view;

use std::collections::HashMap;

use crate::graph::NodeId;

pub use view::{Padding, ViewTransform, MAX_ZOOM, MIN_ZOOM};

/// A position in graph space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[allow(missing_docs)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	#[allow(missing_docs)]
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean distance.
	pub fn distance(self, other: Point) -> f64 {
		(other.x - self.x).hypot(other.y - self.y)
	}
}

/// Drawing area in screen units.
#[derive(Clone, Copy, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
}

impl Viewport {
	#[allow(missing_docs)]
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	/// Midpoint of the drawing area.
	pub fn center(&self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}
}

impl Default for Viewport {
	fn default() -> Self {
		Self::new(800.0, 600.0)
	}
}

/// Node positions for one layout pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PositionMap(HashMap<NodeId, Point>);

#[allow(missing_docs)]
impl PositionMap {
	pub fn new() -> Self {
		Self::default()
	}

	/// Places `id`, replacing any earlier position.
	pub fn insert(&mut self, id: impl Into<NodeId>, point: Point) {
		self.0.insert(id.into(), point);
	}

	pub fn get(&self, id: &str) -> Option<Point> {
		self.0.get(id).copied()
	}

	pub fn contains(&self, id: &str) -> bool {
		self.0.contains_key(id)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &Point)> {
		self.0.iter()
	}

	/// Axis-aligned bounds as `(min, max)`, `None` when empty.
	pub fn bounds(&self) -> Option<(Point, Point)> {
		let mut points = self.0.values();
		let first = *points.next()?;
		Some(points.fold((first, first), |(lo, hi), p| {
			(
				Point::new(lo.x.min(p.x), lo.y.min(p.y)),
				Point::new(hi.x.max(p.x), hi.y.max(p.y)),
			)
		}))
	}
}

impl FromIterator<(NodeId, Point)> for PositionMap {
	fn from_iter<I: IntoIterator<Item = (NodeId, Point)>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}
