//! Translates user gestures into local selection changes or graph requests.
//!
//! The controller owns transient view state only: search text, the selected
//! node, the hovered edge and the neighbour-expansion settings. Anything that
//! changes graph data comes back as an [`Intent`] for the session to carry out.

use crate::graph::Node;
use crate::state::fetch::{DEFAULT_HOPS, DEFAULT_LIMIT_PER_NODE, NeighborParams, SearchParams};
use crate::state::machine::Request;

/// Inclusive bounds on expansion depth.
pub const HOPS_RANGE: (u32, u32) = (1, 5);
/// Inclusive bounds on neighbours fetched per node.
pub const LIMIT_PER_NODE_RANGE: (u32, u32) = (5, 100);
#[allow(missing_docs)]
pub const DEFAULT_SEARCH_LIMIT: u32 = 50;

/// Something the graph state has to do in response to a gesture.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
	/// Drop the current graph and return to idle.
	ClearGraph,
	/// Run a request through the fetch adapter.
	Fetch(Request),
}

/// View state behind the search bar, the canvas and the side panel.
#[derive(Clone, Debug, PartialEq)]
pub struct InteractionController {
	search_text: String,
	selected: Option<Node>,
	hovered_edge: Option<String>,
	hops: u32,
	limit_per_node: u32,
	edge_types: Vec<String>,
	search_limit: u32,
	/// Clicking a node expands its neighbourhood when set, otherwise it only
	/// selects.
	expand_on_click: bool,
}

impl Default for InteractionController {
	fn default() -> Self {
		Self {
			search_text: String::new(),
			selected: None,
			hovered_edge: None,
			hops: DEFAULT_HOPS,
			limit_per_node: DEFAULT_LIMIT_PER_NODE,
			edge_types: Vec::new(),
			search_limit: DEFAULT_SEARCH_LIMIT,
			expand_on_click: true,
		}
	}
}

#[allow(missing_docs)]
impl InteractionController {
	pub fn new(expand_on_click: bool) -> Self {
		Self {
			expand_on_click,
			..Self::default()
		}
	}

	pub fn search_text(&self) -> &str {
		&self.search_text
	}

	pub fn selected(&self) -> Option<&Node> {
		self.selected.as_ref()
	}

	pub fn hovered_edge(&self) -> Option<&str> {
		self.hovered_edge.as_deref()
	}

	pub fn hops(&self) -> u32 {
		self.hops
	}

	pub fn limit_per_node(&self) -> u32 {
		self.limit_per_node
	}

	pub fn edge_types(&self) -> &[String] {
		&self.edge_types
	}

	pub fn set_search_text(&mut self, text: impl Into<String>) {
		self.search_text = text.into();
	}

	/// Clamped to [`HOPS_RANGE`].
	pub fn set_hops(&mut self, hops: u32) {
		self.hops = hops.clamp(HOPS_RANGE.0, HOPS_RANGE.1);
	}

	/// Clamped to [`LIMIT_PER_NODE_RANGE`].
	pub fn set_limit_per_node(&mut self, limit: u32) {
		self.limit_per_node = limit.clamp(LIMIT_PER_NODE_RANGE.0, LIMIT_PER_NODE_RANGE.1);
	}

	pub fn set_search_limit(&mut self, limit: u32) {
		self.search_limit = limit.clamp(1, 100);
	}

	/// Parses a comma separated filter; blanks are dropped.
	pub fn set_edge_types(&mut self, csv: &str) {
		self.edge_types = csv
			.split(',')
			.map(str::trim)
			.filter(|s| !s.is_empty())
			.map(String::from)
			.collect();
	}

	/// Blank queries do nothing. Otherwise the graph is cleared and a search
	/// issued for the trimmed text.
	pub fn submit_search(&mut self) -> Vec<Intent> {
		let query = self.search_text.trim();
		if query.is_empty() {
			return Vec::new();
		}
		let params = SearchParams {
			query: query.to_string(),
			limit: Some(self.search_limit),
			target_tags: Vec::new(),
		};
		self.selected = None;
		vec![Intent::ClearGraph, Intent::Fetch(Request::Search(params))]
	}

	/// Selects `node` for the side panel and, when expansion is enabled, asks
	/// for its neighbourhood.
	pub fn click_node(&mut self, node: &Node) -> Vec<Intent> {
		self.selected = Some(node.clone());
		if !self.expand_on_click {
			return Vec::new();
		}
		vec![Intent::Fetch(Request::ExpandNeighbors(self.neighbor_params(&node.id)))]
	}

	/// Re-issues expansion around the current selection.
	pub fn explore_selected(&self) -> Vec<Intent> {
		match &self.selected {
			Some(node) => vec![Intent::Fetch(Request::ExpandNeighbors(self.neighbor_params(&node.id)))],
			None => Vec::new(),
		}
	}

	/// Expansion request around `node_id` with the current settings.
	pub fn neighbor_params(&self, node_id: &str) -> NeighborParams {
		NeighborParams {
			node_id: node_id.to_string(),
			hops: self.hops,
			limit_per_node: self.limit_per_node,
			edge_types: self.edge_types.clone(),
		}
	}

	pub fn hover_edge(&mut self, edge_id: Option<&str>) {
		self.hovered_edge = edge_id.map(String::from);
	}

	pub fn leave_edge(&mut self) {
		self.hovered_edge = None;
	}

	/// Drops the selection when the node is gone from the current graph.
	pub fn retain_selection(&mut self, still_present: impl Fn(&str) -> bool) {
		if self.selected.as_ref().is_some_and(|n| !still_present(&n.id)) {
			self.selected = None;
		}
	}

	/// Resets local state and asks for the graph to be cleared. Expansion
	/// settings survive.
	pub fn clear(&mut self) -> Vec<Intent> {
		self.search_text.clear();
		self.selected = None;
		self.hovered_edge = None;
		vec![Intent::ClearGraph]
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::PropertyValue;

	#[test]
	fn blank_search_is_a_no_op() {
		let mut c = InteractionController::default();
		c.set_search_text("  \t ");
		assert!(c.submit_search().is_empty());
	}

	#[test]
	fn search_clears_then_fetches_trimmed_query() {
		let mut c = InteractionController::default();
		c.set_search_text("  Ada ");
		let intents = c.submit_search();
		assert_eq!(intents.len(), 2);
		assert_eq!(intents[0], Intent::ClearGraph);
		match &intents[1] {
			Intent::Fetch(Request::Search(p)) => {
				assert_eq!(p.query, "Ada");
				assert_eq!(p.limit, Some(DEFAULT_SEARCH_LIMIT));
			}
			other => panic!("unexpected intent {other:?}"),
		}
	}

	#[test]
	fn click_expands_with_settings_and_selects() {
		let mut c = InteractionController::default();
		c.set_hops(9);
		c.set_limit_per_node(1);
		c.set_edge_types(" WORKS_AT, ,KNOWS ");
		let node = Node::new("n1", "Ada").with_property("age", PropertyValue::Number(36.0));

		let intents = c.click_node(&node);
		assert_eq!(c.selected(), Some(&node));
		assert_eq!(
			intents,
			vec![Intent::Fetch(Request::ExpandNeighbors(NeighborParams {
				node_id: "n1".into(),
				hops: 5,
				limit_per_node: 5,
				edge_types: vec!["WORKS_AT".into(), "KNOWS".into()],
			}))]
		);
	}

	#[test]
	fn click_without_expansion_only_selects() {
		let mut c = InteractionController::new(false);
		let node = Node::new("t", "users");
		assert!(c.click_node(&node).is_empty());
		assert_eq!(c.selected().map(|n| n.id.as_str()), Some("t"));
	}

	#[test]
	fn hover_is_local() {
		let mut c = InteractionController::default();
		c.hover_edge(Some("e1"));
		assert_eq!(c.hovered_edge(), Some("e1"));
		c.leave_edge();
		assert_eq!(c.hovered_edge(), None);
	}

	#[test]
	fn clear_resets_local_state() {
		let mut c = InteractionController::default();
		c.set_search_text("ada");
		c.set_hops(3);
		c.click_node(&Node::new("n", "n"));
		c.hover_edge(Some("e"));

		assert_eq!(c.clear(), vec![Intent::ClearGraph]);
		assert_eq!(c.search_text(), "");
		assert_eq!(c.selected(), None);
		assert_eq!(c.hovered_edge(), None);
		assert_eq!(c.hops(), 3);
	}

	#[test]
	fn selection_dropped_when_node_disappears() {
		let mut c = InteractionController::default();
		c.click_node(&Node::new("gone", "gone"));
		c.retain_selection(|id| id == "other");
		assert_eq!(c.selected(), None);
	}
}
