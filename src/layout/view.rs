//! Pan and zoom.

use super::{Point, PositionMap, Viewport};

/// Smallest zoom factor reachable by wheel or fit.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest zoom factor reachable by wheel or fit.
pub const MAX_ZOOM: f64 = 10.0;

/// Space kept free around the graph when fitting, in screen units.
#[derive(Clone, Copy, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct Padding {
	pub top: f64,
	pub right: f64,
	pub bottom: f64,
	pub left: f64,
}

impl Default for Padding {
	fn default() -> Self {
		Self {
			top: 20.0,
			right: 40.0,
			bottom: 50.0,
			left: 20.0,
		}
	}
}

/// Pan offset `(x, y)` and zoom factor `k` mapping graph space to screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal pan.
	pub x: f64,
	/// Vertical pan.
	pub y: f64,
	/// Zoom factor.
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	/// Inverse of [`Self::graph_to_screen`].
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Point {
		Point::new((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Maps a graph-space point to canvas pixels.
	pub fn graph_to_screen(&self, p: Point) -> (f64, f64) {
		(p.x * self.k + self.x, p.y * self.k + self.y)
	}

	/// Zooms by `factor` keeping the screen point `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
	}

	/// Scales and pans so every position, grown by `node_radius`, sits inside
	/// the padded viewport. An empty map yields the identity transform.
	pub fn fit(positions: &PositionMap, viewport: Viewport, padding: Padding, node_radius: f64) -> Self {
		let Some((lo, hi)) = positions.bounds() else {
			return Self::default();
		};
		let (min_x, min_y) = (lo.x - node_radius, lo.y - node_radius);
		let (bw, bh) = (
			(hi.x - lo.x + 2.0 * node_radius).max(1.0),
			(hi.y - lo.y + 2.0 * node_radius).max(1.0),
		);
		let avail_w = (viewport.width - padding.left - padding.right).max(1.0);
		let avail_h = (viewport.height - padding.top - padding.bottom).max(1.0);

		let k = (avail_w / bw).min(avail_h / bh).clamp(MIN_ZOOM, MAX_ZOOM);
		Self {
			x: padding.left + (avail_w - bw * k) / 2.0 - min_x * k,
			y: padding.top + (avail_h - bh * k) / 2.0 - min_y * k,
			k,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn zoom_keeps_anchor_fixed() {
		let mut t = ViewTransform { x: 10.0, y: 20.0, k: 1.0 };
		let before = t.screen_to_graph(200.0, 100.0);
		t.zoom_at(200.0, 100.0, 1.1);
		let after = t.screen_to_graph(200.0, 100.0);
		assert!((before.x - after.x).abs() < 1e-9);
		assert!((before.y - after.y).abs() < 1e-9);
	}

	#[test]
	fn zoom_is_clamped() {
		let mut t = ViewTransform::default();
		for _ in 0..100 {
			t.zoom_at(0.0, 0.0, 0.5);
		}
		assert_eq!(t.k, MIN_ZOOM);
	}

	#[test]
	fn fit_places_everything_inside_padding() {
		let positions: PositionMap = [
			("a".to_string(), Point::new(-300.0, 50.0)),
			("b".to_string(), Point::new(900.0, -400.0)),
			("c".to_string(), Point::new(100.0, 700.0)),
		]
		.into_iter()
		.collect();
		let viewport = Viewport::new(800.0, 600.0);
		let padding = Padding::default();
		let t = ViewTransform::fit(&positions, viewport, padding, 20.0);

		for (_, p) in positions.iter() {
			let (sx, sy) = t.graph_to_screen(*p);
			assert!(sx >= padding.left - 1e-6 && sx <= viewport.width - padding.right + 1e-6);
			assert!(sy >= padding.top - 1e-6 && sy <= viewport.height - padding.bottom + 1e-6);
		}
	}

	#[test]
	fn fit_of_nothing_is_identity() {
		let t = ViewTransform::fit(&PositionMap::new(), Viewport::default(), Padding::default(), 20.0);
		assert_eq!(t, ViewTransform::default());
	}
}
