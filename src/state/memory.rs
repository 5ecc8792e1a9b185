//! A [`DataFetchAdapter`] over data held in memory. Used for the offline demo
//! and as the deterministic source in tests.

use std::collections::{HashSet, VecDeque};

use futures::FutureExt;
use futures::future::{LocalBoxFuture, ready};
use log::debug;
use serde_json::{Map, Value, json};

use super::fetch::{DataFetchAdapter, DiagramParams, FetchError, NeighborParams, SearchParams};
use crate::graph::payload::{
	ErDiagramData, KgEdge, KgGraphData, KgNode, RelationshipEdge, TableColumn, TableNode,
};

const DEFAULT_SEARCH_LIMIT: usize = 50;

#[derive(Clone, Debug, PartialEq)]
struct StoredDiagram {
	data_source_id: String,
	diagram_id: Option<String>,
	data: ErDiagramData,
}

/// A fixed graph plus any number of registered ER diagrams.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InMemoryGraph {
	graph: KgGraphData,
	diagrams: Vec<StoredDiagram>,
}

impl InMemoryGraph {
	/// Serves `graph` with no diagrams.
	pub fn new(graph: KgGraphData) -> Self {
		Self {
			graph,
			diagrams: Vec::new(),
		}
	}

	/// Registers `data` for `data_source_id`. A request without a diagram id
	/// gets the first diagram registered for the source.
	pub fn with_diagram(
		mut self,
		data_source_id: impl Into<String>,
		diagram_id: Option<&str>,
		data: ErDiagramData,
	) -> Self {
		self.diagrams.push(StoredDiagram {
			data_source_id: data_source_id.into(),
			diagram_id: diagram_id.map(String::from),
			data,
		});
		self
	}

	/// A small people-and-organisations graph plus one shop schema under the
	/// `demo` data source.
	pub fn sample() -> Self {
		let nodes = vec![
			kg_node("ada", "Ada Lovelace", Some("Person"), json!({"name": "Ada Lovelace", "born": 1815})),
			kg_node("charles", "Charles Babbage", Some("Person"), json!({"name": "Charles Babbage", "born": 1791})),
			kg_node("acme", "Acme Analytical Engines", Some("Organization"), json!({"city": "London"})),
			kg_node("royal", "Royal Society", Some("Organization"), json!({"founded": 1660})),
			kg_node("engine", "Analytical Engine", Some("Project"), json!({"status": "unfinished"})),
			kg_node("notes", "Notes on the Engine", None, json!({"year": 1843, "published": true})),
		];
		let edges = vec![
			kg_edge("ada", "acme", "WORKS_AT"),
			kg_edge("charles", "acme", "FOUNDED"),
			kg_edge("ada", "charles", "KNOWS"),
			kg_edge("charles", "royal", "MEMBER_OF"),
			kg_edge("acme", "engine", "BUILDS"),
			kg_edge("ada", "notes", "WROTE"),
			kg_edge("notes", "engine", "DESCRIBES"),
		];
		let graph = KgGraphData {
			nodes,
			edges,
			metadata: None,
		};
		Self::new(graph).with_diagram("demo", Some("shop"), shop_schema())
	}

	fn search(&self, params: &SearchParams) -> Result<KgGraphData, FetchError> {
		let query = params.query.trim().to_lowercase();
		if query.is_empty() {
			return Err(FetchError::InvalidRequest("query_string must not be empty".into()));
		}
		let limit = params.limit.map_or(DEFAULT_SEARCH_LIMIT, |l| l as usize);
		let nodes: Vec<KgNode> = self
			.graph
			.nodes
			.iter()
			.filter(|n| {
				params.target_tags.is_empty()
					|| n.tag.as_ref().is_some_and(|t| params.target_tags.contains(t))
			})
			.filter(|n| matches_query(n, &query))
			.take(limit)
			.cloned()
			.collect();
		debug!("in-memory search {query:?}: {} hits", nodes.len());
		Ok(self.subgraph(nodes, &[]))
	}

	fn neighbors(&self, params: &NeighborParams) -> Result<KgGraphData, FetchError> {
		if params.hops == 0 {
			return Err(FetchError::InvalidRequest("hops must be at least 1".into()));
		}
		if !self.graph.nodes.iter().any(|n| n.id == params.node_id) {
			debug!("in-memory expand: {} not found", params.node_id);
			return Ok(KgGraphData::default());
		}

		let mut seen: HashSet<&str> = HashSet::from([params.node_id.as_str()]);
		let mut queue = VecDeque::from([(params.node_id.as_str(), 0u32)]);
		while let Some((id, depth)) = queue.pop_front() {
			if depth >= params.hops {
				continue;
			}
			let mut taken = 0;
			for edge in self.edges_of_type(&params.edge_types) {
				if taken >= params.limit_per_node {
					break;
				}
				let other = if edge.source == id {
					edge.target.as_str()
				} else if edge.target == id {
					edge.source.as_str()
				} else {
					continue;
				};
				if seen.insert(other) {
					taken += 1;
					queue.push_back((other, depth + 1));
				}
			}
		}

		let nodes = self
			.graph
			.nodes
			.iter()
			.filter(|n| seen.contains(n.id.as_str()))
			.cloned()
			.collect();
		Ok(self.subgraph(nodes, &params.edge_types))
	}

	fn diagram(&self, params: &DiagramParams) -> Result<ErDiagramData, FetchError> {
		self.diagrams
			.iter()
			.filter(|d| d.data_source_id == params.data_source_id)
			.find(|d| params.diagram_id.is_none() || d.diagram_id == params.diagram_id)
			.map(|d| d.data.clone())
			.ok_or_else(|| FetchError::Status {
				status: 404,
				message: format!("no diagram for data source {}", params.data_source_id),
			})
	}

	fn edges_of_type<'a>(&'a self, types: &'a [String]) -> impl Iterator<Item = &'a KgEdge> + 'a {
		self.graph.edges.iter().filter(move |e| {
			types.is_empty() || e.label.as_ref().is_some_and(|l| types.contains(l))
		})
	}

	/// `nodes` plus every edge running between two of them.
	fn subgraph(&self, nodes: Vec<KgNode>, edge_types: &[String]) -> KgGraphData {
		let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
		let edges = self
			.edges_of_type(edge_types)
			.filter(|e| ids.contains(e.source.as_str()) && ids.contains(e.target.as_str()))
			.cloned()
			.collect();
		KgGraphData {
			nodes,
			edges,
			metadata: None,
		}
	}
}

fn matches_query(node: &KgNode, query: &str) -> bool {
	let hit = |s: &str| s.to_lowercase().contains(query);
	hit(&node.id)
		|| node.label.as_deref().is_some_and(hit)
		|| node
			.properties
			.iter()
			.flat_map(Map::values)
			.any(|v| v.as_str().is_some_and(hit))
}

impl DataFetchAdapter for InMemoryGraph {
	fn search_nodes<'a>(&'a self, params: &'a SearchParams) -> LocalBoxFuture<'a, Result<KgGraphData, FetchError>> {
		ready(self.search(params)).boxed_local()
	}

	fn fetch_neighbors<'a>(
		&'a self,
		params: &'a NeighborParams,
	) -> LocalBoxFuture<'a, Result<KgGraphData, FetchError>> {
		ready(self.neighbors(params)).boxed_local()
	}

	fn fetch_diagram<'a>(
		&'a self,
		params: &'a DiagramParams,
	) -> LocalBoxFuture<'a, Result<ErDiagramData, FetchError>> {
		ready(self.diagram(params)).boxed_local()
	}
}

fn kg_node(id: &str, label: &str, tag: Option<&str>, properties: Value) -> KgNode {
	KgNode {
		id: id.into(),
		label: Some(label.into()),
		tag: tag.map(String::from),
		properties: match properties {
			Value::Object(map) => Some(map),
			_ => None,
		},
	}
}

fn kg_edge(source: &str, target: &str, label: &str) -> KgEdge {
	KgEdge {
		id: None,
		source: source.into(),
		target: target.into(),
		label: Some(label.into()),
		properties: None,
	}
}

fn column(name: &str, data_type: &str, size: Option<u32>, pk: bool, fk: bool) -> TableColumn {
	TableColumn {
		name: name.into(),
		data_type: data_type.into(),
		size,
		is_primary_key: pk,
		is_foreign_key: fk,
		description: None,
	}
}

fn table(id: &str, columns: Vec<TableColumn>) -> TableNode {
	TableNode {
		id: id.into(),
		label: id.into(),
		columns,
	}
}

fn relationship(id: &str, source: &str, target: &str, kind: &str, from: &str, to: &str) -> RelationshipEdge {
	RelationshipEdge {
		id: id.into(),
		source: source.into(),
		target: target.into(),
		relationship_type: kind.into(),
		source_columns: vec![from.into()],
		target_columns: vec![to.into()],
		label: None,
	}
}

fn shop_schema() -> ErDiagramData {
	ErDiagramData {
		nodes: vec![
			table(
				"customers",
				vec![
					column("id", "uuid", None, true, false),
					column("email", "varchar", Some(255), false, false),
				],
			),
			table(
				"orders",
				vec![
					column("id", "uuid", None, true, false),
					column("customer_id", "uuid", None, false, true),
					column("placed_at", "timestamp", None, false, false),
				],
			),
			table(
				"order_items",
				vec![
					column("order_id", "uuid", None, true, true),
					column("product_id", "uuid", None, true, true),
					column("quantity", "int", None, false, false),
				],
			),
			table(
				"products",
				vec![
					column("id", "uuid", None, true, false),
					column("name", "varchar", Some(120), false, false),
				],
			),
			table("audit_log", vec![column("id", "bigint", None, true, false)]),
		],
		edges: vec![
			relationship("fk_orders_customer", "customers", "orders", "one_to_many", "id", "customer_id"),
			relationship("fk_items_order", "orders", "order_items", "one_to_many", "id", "order_id"),
			relationship("fk_items_product", "products", "order_items", "one_to_many", "id", "product_id"),
		],
	}
}

#[cfg(test)]
mod tests {
	use futures::executor::block_on;

	use super::*;

	fn ids(data: &KgGraphData) -> Vec<&str> {
		data.nodes.iter().map(|n| n.id.as_str()).collect()
	}

	#[test]
	fn search_matches_label_case_insensitively() {
		let g = InMemoryGraph::sample();
		let hits = block_on(g.search_nodes(&SearchParams::new("LOVELACE"))).unwrap();
		assert_eq!(ids(&hits), vec!["ada"]);
	}

	#[test]
	fn search_returns_edges_between_hits() {
		let g = InMemoryGraph::sample();
		let mut params = SearchParams::new("a");
		params.target_tags = vec!["Person".into()];
		let hits = block_on(g.search_nodes(&params)).unwrap();
		assert_eq!(ids(&hits), vec!["ada", "charles"]);
		assert_eq!(hits.edges.len(), 1);
		assert_eq!(hits.edges[0].label.as_deref(), Some("KNOWS"));
	}

	#[test]
	fn search_respects_limit() {
		let g = InMemoryGraph::sample();
		let mut params = SearchParams::new("e");
		params.limit = Some(2);
		assert_eq!(block_on(g.search_nodes(&params)).unwrap().nodes.len(), 2);
	}

	#[test]
	fn one_hop_neighbourhood() {
		let g = InMemoryGraph::sample();
		let data = block_on(g.fetch_neighbors(&NeighborParams::new("ada"))).unwrap();
		assert_eq!(ids(&data), vec!["ada", "charles", "acme", "notes"]);
	}

	#[test]
	fn two_hops_with_type_filter() {
		let g = InMemoryGraph::sample();
		let mut params = NeighborParams::new("ada");
		params.hops = 2;
		params.edge_types = vec!["KNOWS".into(), "MEMBER_OF".into()];
		let data = block_on(g.fetch_neighbors(&params)).unwrap();
		assert_eq!(ids(&data), vec!["ada", "charles", "royal"]);
		assert!(data.edges.iter().all(|e| e.label.as_deref() != Some("WORKS_AT")));
	}

	#[test]
	fn limit_per_node_caps_fan_out() {
		let g = InMemoryGraph::sample();
		let mut params = NeighborParams::new("ada");
		params.limit_per_node = 1;
		let data = block_on(g.fetch_neighbors(&params)).unwrap();
		assert_eq!(data.nodes.len(), 2);
	}

	#[test]
	fn unknown_node_has_empty_neighbourhood() {
		let g = InMemoryGraph::sample();
		let data = block_on(g.fetch_neighbors(&NeighborParams::new("nobody"))).unwrap();
		assert!(data.nodes.is_empty() && data.edges.is_empty());
	}

	#[test]
	fn diagram_lookup() {
		let g = InMemoryGraph::sample();
		let found = block_on(g.fetch_diagram(&DiagramParams {
			data_source_id: "demo".into(),
			diagram_id: None,
		}))
		.unwrap();
		assert_eq!(found.nodes.len(), 5);

		let missing = block_on(g.fetch_diagram(&DiagramParams {
			data_source_id: "demo".into(),
			diagram_id: Some("other".into()),
		}));
		assert!(matches!(missing, Err(FetchError::Status { status: 404, .. })));
	}
}
