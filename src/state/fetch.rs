//! The seam between the state machine and wherever graph data comes from.

use futures::future::LocalBoxFuture;
use thiserror::Error;

use crate::graph::payload::{ErDiagramData, KgGraphData};

/// Expansion depth used until the user picks another.
pub const DEFAULT_HOPS: u32 = 1;
/// Neighbour cap used until the user picks another.
pub const DEFAULT_LIMIT_PER_NODE: u32 = 25;

/// Why a graph fetch failed. The `Display` text is what the user sees.
#[derive(Clone, Debug, Error, PartialEq)]
#[allow(missing_docs)]
pub enum FetchError {
	/// Network failure before any response arrived.
	#[error("could not reach the graph service: {0}")]
	Transport(String),
	/// Non-success HTTP status.
	#[error("graph service error ({status}): {message}")]
	Status { status: u16, message: String },
	/// Body did not match the expected payload.
	#[error("unexpected response from the graph service: {0}")]
	Decode(String),
	/// Rejected before sending, e.g. a malformed base url.
	#[error("invalid request: {0}")]
	InvalidRequest(String),
}

/// Full-text node search.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchParams {
	/// Search text, already trimmed.
	pub query: String,
	/// Result cap; the service default applies when absent.
	pub limit: Option<u32>,
	/// Restrict hits to these node tags.
	pub target_tags: Vec<String>,
}

impl SearchParams {
	#[allow(missing_docs)]
	pub fn new(query: impl Into<String>) -> Self {
		Self {
			query: query.into(),
			limit: None,
			target_tags: Vec::new(),
		}
	}
}

/// Neighbourhood expansion around one node.
#[derive(Clone, Debug, PartialEq)]
pub struct NeighborParams {
	/// Centre of the expansion.
	pub node_id: String,
	/// Depth in edges.
	pub hops: u32,
	/// Neighbours fetched per visited node.
	pub limit_per_node: u32,
	/// Empty means every edge type.
	pub edge_types: Vec<String>,
}

impl NeighborParams {
	/// Default depth and limit.
	pub fn new(node_id: impl Into<String>) -> Self {
		Self {
			node_id: node_id.into(),
			hops: DEFAULT_HOPS,
			limit_per_node: DEFAULT_LIMIT_PER_NODE,
			edge_types: Vec::new(),
		}
	}
}

/// ER diagram of a data source.
#[derive(Clone, Debug, PartialEq)]
pub struct DiagramParams {
	#[allow(missing_docs)]
	pub data_source_id: String,
	/// A saved diagram; the whole schema when absent.
	pub diagram_id: Option<String>,
}

/// Source of graph data. Calls are asynchronous and may resolve in any order;
/// timeouts are the adapter's business.
pub trait DataFetchAdapter {
	/// Nodes matching a query, with the edges among them.
	fn search_nodes<'a>(&'a self, params: &'a SearchParams) -> LocalBoxFuture<'a, Result<KgGraphData, FetchError>>;

	/// The neighbourhood of one node.
	fn fetch_neighbors<'a>(
		&'a self,
		params: &'a NeighborParams,
	) -> LocalBoxFuture<'a, Result<KgGraphData, FetchError>>;

	/// Tables and relationships of a schema.
	fn fetch_diagram<'a>(
		&'a self,
		params: &'a DiagramParams,
	) -> LocalBoxFuture<'a, Result<ErDiagramData, FetchError>>;
}
