//! [`DataFetchAdapter`] talking to the graph REST service.

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use log::{debug, warn};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::fetch::{DataFetchAdapter, DiagramParams, FetchError, NeighborParams, SearchParams};
use crate::graph::payload::{ErDiagramData, KgGraphData};

/// Fetches over HTTP with [`reqwest`].
pub struct HttpFetchAdapter {
	http: Client,
	base: Url,
}

impl HttpFetchAdapter {
	/// `base_url` is the API root, e.g. `http://localhost:8000/api/v1`.
	pub fn new(base_url: &str) -> Result<Self, FetchError> {
		let base = Url::parse(base_url)
			.map_err(|e| FetchError::InvalidRequest(format!("bad API base url {base_url:?}: {e}")))?;
		if base.cannot_be_a_base() {
			return Err(FetchError::InvalidRequest(format!("{base_url:?} cannot be used as a base url")));
		}
		Ok(Self {
			http: Client::new(),
			base,
		})
	}

	#[allow(missing_docs)]
	pub fn base_url(&self) -> &str {
		self.base.as_str()
	}

	/// Appends `segments` to the base path, percent-encoding each one.
	pub fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
		let mut url = self.base.clone();
		url.path_segments_mut()
			.map_err(|()| FetchError::InvalidRequest("base url has no path".into()))?
			.pop_if_empty()
			.extend(segments);
		Ok(url)
	}

	/// `visualize/search`; tags are sent comma separated.
	pub fn search_url(&self, params: &SearchParams) -> Result<Url, FetchError> {
		let mut url = self.endpoint(&["visualize", "search"])?;
		{
			let mut query = url.query_pairs_mut();
			query.append_pair("query_string", params.query.trim());
			if let Some(limit) = params.limit {
				query.append_pair("limit", &limit.to_string());
			}
			if !params.target_tags.is_empty() {
				query.append_pair("target_tags", &params.target_tags.join(","));
			}
		}
		Ok(url)
	}

	/// `visualize/neighbors/{node_id}`.
	pub fn neighbors_url(&self, params: &NeighborParams) -> Result<Url, FetchError> {
		let mut url = self.endpoint(&["visualize", "neighbors", &params.node_id])?;
		{
			let mut query = url.query_pairs_mut();
			query
				.append_pair("hops", &params.hops.to_string())
				.append_pair("limit_per_node", &params.limit_per_node.to_string());
			if !params.edge_types.is_empty() {
				query.append_pair("target_edge_types", &params.edge_types.join(","));
			}
		}
		Ok(url)
	}

	/// `er-diagrams/data-sources/{id}/diagram-data`, optionally narrowed to a
	/// saved diagram.
	pub fn diagram_url(&self, params: &DiagramParams) -> Result<Url, FetchError> {
		let mut url = self.endpoint(&["er-diagrams", "data-sources", &params.data_source_id, "diagram-data"])?;
		if let Some(diagram_id) = &params.diagram_id {
			url.query_pairs_mut().append_pair("diagram_id", diagram_id);
		}
		Ok(url)
	}

	async fn get<T: DeserializeOwned>(&self, url: Result<Url, FetchError>) -> Result<T, FetchError> {
		let url = url?;
		debug!("GET {url}");
		let response = self
			.http
			.get(url.clone())
			.header("Accept", "application/json")
			.send()
			.await
			.map_err(|e| FetchError::Transport(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			warn!("GET {url} returned {status}");
			return Err(FetchError::Status {
				status: status.as_u16(),
				message: error_message(&body, status.canonical_reason()),
			});
		}

		response.json().await.map_err(|e| FetchError::Decode(e.to_string()))
	}
}

/// Human readable message for an error body. Prefers the service's `detail`
/// field, then a short prefix of the raw body.
pub fn error_message(body: &str, reason: Option<&str>) -> String {
	let detail = serde_json::from_str::<Value>(body)
		.ok()
		.and_then(|v| v.get("detail").cloned())
		.map(|d| match d {
			Value::String(s) => s,
			other => other.to_string(),
		});
	match detail {
		Some(detail) => detail,
		None if !body.trim().is_empty() => body.trim().chars().take(200).collect(),
		None => reason.unwrap_or("request failed").to_string(),
	}
}

impl DataFetchAdapter for HttpFetchAdapter {
	fn search_nodes<'a>(&'a self, params: &'a SearchParams) -> LocalBoxFuture<'a, Result<KgGraphData, FetchError>> {
		self.get(self.search_url(params)).boxed_local()
	}

	fn fetch_neighbors<'a>(
		&'a self,
		params: &'a NeighborParams,
	) -> LocalBoxFuture<'a, Result<KgGraphData, FetchError>> {
		self.get(self.neighbors_url(params)).boxed_local()
	}

	fn fetch_diagram<'a>(
		&'a self,
		params: &'a DiagramParams,
	) -> LocalBoxFuture<'a, Result<ErDiagramData, FetchError>> {
		self.get(self.diagram_url(params)).boxed_local()
	}
}
