//! Build-time configuration and defaults for the explorer views.

use std::rc::Rc;

use log::{info, warn};

use crate::interaction::{DEFAULT_SEARCH_LIMIT, HOPS_RANGE, LIMIT_PER_NODE_RANGE, InteractionController};
use crate::layout::force::SimulationParameters;
use crate::state::fetch::{DEFAULT_HOPS, DEFAULT_LIMIT_PER_NODE, DataFetchAdapter};
use crate::state::{HttpFetchAdapter, InMemoryGraph};

/// Baked in at compile time; when unset the views run against the bundled
/// sample graph.
const API_URL: Option<&str> = option_env!("GRAPH_EXPLORER_API_URL");

/// Settings shared by both views.
#[derive(Clone, Debug, PartialEq)]
pub struct ExplorerConfig {
	/// Graph service root without a trailing slash.
	pub api_base_url: Option<String>,
	/// Results per search.
	pub search_limit: u32,
	/// Initial expansion depth.
	pub neighbor_hops: u32,
	/// Initial neighbours fetched per node.
	pub neighbor_limit: u32,
	#[allow(missing_docs)]
	pub simulation: SimulationParameters,
	/// Canvas height in pixels.
	pub canvas_height: f64,
}

impl Default for ExplorerConfig {
	fn default() -> Self {
		Self {
			api_base_url: None,
			search_limit: DEFAULT_SEARCH_LIMIT,
			neighbor_hops: DEFAULT_HOPS,
			neighbor_limit: DEFAULT_LIMIT_PER_NODE,
			simulation: SimulationParameters::default(),
			canvas_height: 650.0,
		}
	}
}

impl ExplorerConfig {
	/// Defaults plus whatever the build environment provided.
	pub fn from_env() -> Self {
		Self::default().with_api_base_url(API_URL)
	}

	/// Blank urls count as unset.
	pub fn with_api_base_url(mut self, url: Option<&str>) -> Self {
		self.api_base_url = url
			.map(str::trim)
			.filter(|u| !u.is_empty())
			.map(|u| u.trim_end_matches('/').to_string());
		self
	}

	/// Clamped to [`HOPS_RANGE`].
	pub fn with_neighbor_hops(mut self, hops: u32) -> Self {
		self.neighbor_hops = hops.clamp(HOPS_RANGE.0, HOPS_RANGE.1);
		self
	}

	/// Clamped to [`LIMIT_PER_NODE_RANGE`].
	pub fn with_neighbor_limit(mut self, limit: u32) -> Self {
		self.neighbor_limit = limit.clamp(LIMIT_PER_NODE_RANGE.0, LIMIT_PER_NODE_RANGE.1);
		self
	}

	/// Clamped to `1..=100`.
	pub fn with_search_limit(mut self, limit: u32) -> Self {
		self.search_limit = limit.clamp(1, 100);
		self
	}

	/// The REST service when a base url is configured and valid, the bundled
	/// sample graph otherwise.
	pub fn adapter(&self) -> Rc<dyn DataFetchAdapter> {
		match self.api_base_url.as_deref().map(HttpFetchAdapter::new) {
			Some(Ok(http)) => {
				info!("using graph service at {}", http.base_url());
				Rc::new(http)
			}
			Some(Err(err)) => {
				warn!("{err}; falling back to the sample graph");
				Rc::new(InMemoryGraph::sample())
			}
			None => {
				info!("no graph service configured, using the sample graph");
				Rc::new(InMemoryGraph::sample())
			}
		}
	}

	/// A controller seeded with these defaults.
	pub fn controller(&self, expand_on_click: bool) -> InteractionController {
		let mut controller = InteractionController::new(expand_on_click);
		controller.set_hops(self.neighbor_hops);
		controller.set_limit_per_node(self.neighbor_limit);
		controller.set_search_limit(self.search_limit);
		controller
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let config = ExplorerConfig::default();
		assert_eq!(config.api_base_url, None);
		assert_eq!(config.search_limit, 50);
		assert_eq!(config.neighbor_hops, 1);
		assert_eq!(config.neighbor_limit, 25);
		assert_eq!(config.canvas_height, 650.0);
	}

	#[test]
	fn blank_url_is_unset() {
		assert_eq!(ExplorerConfig::default().with_api_base_url(Some("  ")).api_base_url, None);
		assert_eq!(
			ExplorerConfig::default()
				.with_api_base_url(Some("http://h:8000/api/v1/"))
				.api_base_url
				.as_deref(),
			Some("http://h:8000/api/v1")
		);
	}

	#[test]
	fn setters_clamp() {
		let config = ExplorerConfig::default()
			.with_neighbor_hops(0)
			.with_neighbor_limit(500)
			.with_search_limit(0);
		assert_eq!((config.neighbor_hops, config.neighbor_limit, config.search_limit), (1, 100, 1));
	}

	#[test]
	fn controller_takes_configured_defaults() {
		let c = ExplorerConfig::default().with_neighbor_hops(3).controller(true);
		assert_eq!(c.hops(), 3);
		assert_eq!(c.limit_per_node(), 25);
	}
}
