use std::collections::{HashMap, HashSet};
use std::fmt;

use log::warn;

/// Node identifiers are opaque strings supplied by the data source.
pub type NodeId = String;

/// A scalar property value. Nodes and edges carry these keyed by name, with no
/// fixed schema.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
	/// JSON `null`.
	Null,
	/// JSON boolean.
	Bool(bool),
	/// Any JSON number.
	Number(f64),
	/// Strings, and arrays or objects flattened to their JSON text.
	Text(String),
}

impl fmt::Display for PropertyValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PropertyValue::Null => f.write_str("null"),
			PropertyValue::Bool(b) => write!(f, "{b}"),
			PropertyValue::Number(n) => write!(f, "{n}"),
			PropertyValue::Text(s) => f.write_str(s),
		}
	}
}

/// Ordered key/value property bag.
pub type Properties = Vec<(String, PropertyValue)>;

/// Domain category of a node. Drives colouring only.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeKind {
	/// Tagged `Person`.
	Person,
	/// Tagged `Organization`.
	Organization,
	/// An ER diagram table.
	Table,
	/// Any other tag, verbatim.
	Tag(String),
	/// No tag, or a blank one.
	#[default]
	Untagged,
}

impl NodeKind {
	/// Kind for a wire tag. Blank tags count as untagged.
	pub fn from_tag(tag: Option<&str>) -> Self {
		match tag.map(str::trim) {
			None | Some("") => NodeKind::Untagged,
			Some("Person") => NodeKind::Person,
			Some("Organization") => NodeKind::Organization,
			Some("Table") => NodeKind::Table,
			Some(other) => NodeKind::Tag(other.to_string()),
		}
	}

	/// Tag text as shown to the user, `None` for untagged nodes.
	pub fn tag(&self) -> Option<&str> {
		match self {
			NodeKind::Person => Some("Person"),
			NodeKind::Organization => Some("Organization"),
			NodeKind::Table => Some("Table"),
			NodeKind::Tag(tag) => Some(tag),
			NodeKind::Untagged => None,
		}
	}
}

/// A column of an ER table node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Field {
	/// Column name.
	pub name: String,
	/// Display type, e.g. `varchar(255)`.
	pub type_descriptor: String,
	/// Part of the primary key.
	pub is_primary_key: bool,
	/// References another table.
	pub is_foreign_key: bool,
	/// Free-text comment from the schema, if any.
	pub description: Option<String>,
}

/// A vertex of the graph: a knowledge-graph entity or an ER table.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Unique within one [`GraphModel`].
	pub id: NodeId,
	/// Display text.
	pub label: String,
	/// Category used for colouring.
	pub kind: NodeKind,
	/// Arbitrary properties in source order.
	pub properties: Properties,
	/// Only populated for ER table nodes.
	pub fields: Vec<Field>,
}

impl Node {
	/// Untagged node without properties or fields.
	pub fn new(id: impl Into<NodeId>, label: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
			kind: NodeKind::Untagged,
			properties: Vec::new(),
			fields: Vec::new(),
		}
	}

	/// Sets the kind.
	pub fn with_kind(mut self, kind: NodeKind) -> Self {
		self.kind = kind;
		self
	}

	/// Appends a property.
	pub fn with_property(mut self, key: impl Into<String>, value: PropertyValue) -> Self {
		self.properties.push((key.into(), value));
		self
	}

	/// Appends a table column.
	pub fn with_field(mut self, field: Field) -> Self {
		self.fields.push(field);
		self
	}

	/// First property named `key`.
	pub fn property(&self, key: &str) -> Option<&PropertyValue> {
		self.properties
			.iter()
			.find(|(k, _)| k == key)
			.map(|(_, v)| v)
	}
}

/// Cardinality of a foreign-key derived relationship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
	/// `1:1`
	OneToOne,
	/// `1:N`
	OneToMany,
	/// `N:1`
	ManyToOne,
	/// `N:M`
	ManyToMany,
}

impl RelationshipKind {
	/// Parses the snake_case wire value; anything unrecognised is many-to-one.
	pub fn from_wire(value: &str) -> Self {
		match value.trim().to_ascii_lowercase().as_str() {
			"one_to_one" => RelationshipKind::OneToOne,
			"one_to_many" => RelationshipKind::OneToMany,
			"many_to_many" => RelationshipKind::ManyToMany,
			_ => RelationshipKind::ManyToOne,
		}
	}

	/// Label drawn on the edge.
	pub fn short_label(self) -> &'static str {
		match self {
			RelationshipKind::OneToOne => "1:1",
			RelationshipKind::OneToMany => "1:N",
			RelationshipKind::ManyToOne => "N:1",
			RelationshipKind::ManyToMany => "N:M",
		}
	}
}

/// What an edge means: an ER cardinality, or a free-form knowledge-graph type.
#[derive(Clone, Debug, PartialEq)]
pub enum Relation {
	/// Foreign-key cardinality.
	Er(RelationshipKind),
	/// Knowledge-graph edge type such as `WORKS_AT`.
	Typed(String),
}

/// A directed connection between two nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	/// Empty until the edge is placed in a [`GraphModel`], which synthesizes one.
	pub id: String,
	/// Tail of the arrow.
	pub source: NodeId,
	/// Head of the arrow.
	pub target: NodeId,
	/// Text drawn at the midpoint.
	pub label: String,
	/// Semantic type of the edge.
	pub relation: Relation,
	/// Arbitrary properties in source order.
	pub properties: Properties,
}

impl Edge {
	/// Typed edge named after `label`, without an id yet.
	pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, label: impl Into<String>) -> Self {
		let label = label.into();
		Self {
			id: String::new(),
			source: source.into(),
			target: target.into(),
			relation: Relation::Typed(label.clone()),
			label,
			properties: Vec::new(),
		}
	}

	/// Sets an explicit id.
	pub fn with_id(mut self, id: impl Into<String>) -> Self {
		self.id = id.into();
		self
	}

	/// Sets the relation.
	pub fn with_relation(mut self, relation: Relation) -> Self {
		self.relation = relation;
		self
	}

	/// Appends a property.
	pub fn with_property(mut self, key: impl Into<String>, value: PropertyValue) -> Self {
		self.properties.push((key.into(), value));
		self
	}
}

/// Structural role of a node relative to the current edge set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeRole {
	/// Only ever an edge source.
	SourceOnly,
	/// Only ever an edge target.
	TargetOnly,
	/// Both a source and a target.
	Bridging,
	/// Touched by no edge.
	Isolated,
}

/// Per-node roles, in model order. Derived on demand, never stored on the model.
#[derive(Clone, Debug, PartialEq)]
pub struct Classification<'a> {
	roles: Vec<(&'a Node, NodeRole)>,
}

impl<'a> Classification<'a> {
	/// Role of node `id`, `None` if it is not in the model.
	pub fn role(&self, id: &str) -> Option<NodeRole> {
		self.roles
			.iter()
			.find(|(node, _)| node.id == id)
			.map(|(_, role)| *role)
	}

	/// Nodes with the given role, in model order.
	pub fn bucket(&self, role: NodeRole) -> Vec<&'a Node> {
		self.roles
			.iter()
			.filter(|(_, r)| *r == role)
			.map(|(node, _)| *node)
			.collect()
	}

	/// Every node with its role.
	pub fn iter(&self) -> impl Iterator<Item = (&'a Node, NodeRole)> + '_ {
		self.roles.iter().copied()
	}

	/// Number of classified nodes.
	pub fn len(&self) -> usize {
		self.roles.len()
	}

	/// True for an empty model.
	pub fn is_empty(&self) -> bool {
		self.roles.is_empty()
	}
}

/// One snapshot of graph data. Node and edge ids are unique; insertion order is
/// preserved.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphModel {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	index: HashMap<NodeId, usize>,
}

impl GraphModel {
	/// Empty snapshot.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a snapshot, dropping repeated node ids (first wins) and giving
	/// every edge a unique id.
	pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
		let mut index = HashMap::with_capacity(nodes.len());
		let mut kept = Vec::with_capacity(nodes.len());
		for node in nodes {
			if index.contains_key(&node.id) {
				warn!("duplicate node id {:?} ignored", node.id);
				continue;
			}
			index.insert(node.id.clone(), kept.len());
			kept.push(node);
		}

		let mut used: HashSet<String> = HashSet::with_capacity(edges.len());
		let mut triples: HashMap<(String, String, String), usize> = HashMap::new();
		let edges = edges
			.into_iter()
			.map(|mut edge| {
				let mut id = if edge.id.is_empty() {
					let key = (edge.source.clone(), edge.label.clone(), edge.target.clone());
					let n = triples.entry(key).or_insert(0);
					let id = format!("{}-{}-{}-{}", edge.source, edge.label, edge.target, n);
					*n += 1;
					id
				} else {
					edge.id.clone()
				};
				if used.contains(&id) {
					let base = id.clone();
					let mut suffix = 1;
					while used.contains(&id) {
						id = format!("{base}-{suffix}");
						suffix += 1;
					}
					warn!("edge id {base:?} repeated, renamed to {id:?}");
				}
				used.insert(id.clone());
				edge.id = id;
				edge
			})
			.collect();

		Self {
			nodes: kept,
			edges,
			index,
		}
	}

	/// Nodes in insertion order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Edges in insertion order, dangling ones included.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Node by id.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	/// Edge by id.
	pub fn edge(&self, id: &str) -> Option<&Edge> {
		self.edges.iter().find(|e| e.id == id)
	}

	/// Whether a node with this id exists.
	pub fn contains_node(&self, id: &str) -> bool {
		self.index.contains_key(id)
	}

	/// No nodes and no edges.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}

	/// Ids of nodes sharing an edge with `id`, in either direction.
	pub fn neighbors(&self, id: &str) -> HashSet<&str> {
		let mut out = HashSet::new();
		for edge in &self.edges {
			if edge.source == id {
				out.insert(edge.target.as_str());
			} else if edge.target == id {
				out.insert(edge.source.as_str());
			}
		}
		out
	}

	/// Classifies every node against the current edge set. Edges whose other
	/// endpoint is missing still count for the endpoint that is present.
	pub fn classify(&self) -> Classification<'_> {
		let sources: HashSet<&str> = self.edges.iter().map(|e| e.source.as_str()).collect();
		let targets: HashSet<&str> = self.edges.iter().map(|e| e.target.as_str()).collect();

		let roles = self
			.nodes
			.iter()
			.map(|node| {
				let id = node.id.as_str();
				let role = match (sources.contains(id), targets.contains(id)) {
					(true, false) => NodeRole::SourceOnly,
					(false, true) => NodeRole::TargetOnly,
					(true, true) => NodeRole::Bridging,
					(false, false) => NodeRole::Isolated,
				};
				(node, role)
			})
			.collect();
		Classification { roles }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn chain() -> GraphModel {
		GraphModel::from_parts(
			vec![Node::new("A", "A"), Node::new("B", "B"), Node::new("C", "C")],
			vec![Edge::new("A", "B", "r"), Edge::new("B", "C", "r")],
		)
	}

	#[test]
	fn classifies_chain() {
		let model = chain();
		let classes = model.classify();
		assert_eq!(classes.role("A"), Some(NodeRole::SourceOnly));
		assert_eq!(classes.role("B"), Some(NodeRole::Bridging));
		assert_eq!(classes.role("C"), Some(NodeRole::TargetOnly));
		assert_eq!(classes.role("missing"), None);
	}

	#[test]
	fn lone_node_is_isolated() {
		let model = GraphModel::from_parts(vec![Node::new("X", "X")], vec![]);
		assert_eq!(model.classify().bucket(NodeRole::Isolated).len(), 1);
	}

	#[test]
	fn dangling_edge_still_classifies_present_endpoint() {
		let model = GraphModel::from_parts(vec![Node::new("A", "A")], vec![Edge::new("A", "ghost", "r")]);
		assert_eq!(model.classify().role("A"), Some(NodeRole::SourceOnly));
	}

	#[test]
	fn synthesizes_unique_edge_ids() {
		let model = GraphModel::from_parts(
			vec![Node::new("A", "A"), Node::new("B", "B")],
			vec![
				Edge::new("A", "B", "knows"),
				Edge::new("A", "B", "knows"),
				Edge::new("B", "A", "knows").with_id("A-knows-B-0"),
			],
		);
		let ids: Vec<&str> = model.edges().iter().map(|e| e.id.as_str()).collect();
		assert_eq!(ids, vec!["A-knows-B-0", "A-knows-B-1", "A-knows-B-0-1"]);
	}

	#[test]
	fn first_duplicate_node_wins() {
		let model = GraphModel::from_parts(vec![Node::new("A", "first"), Node::new("A", "second")], vec![]);
		assert_eq!(model.nodes().len(), 1);
		assert_eq!(model.node("A").map(|n| n.label.as_str()), Some("first"));
	}

	#[test]
	fn neighbors_are_undirected() {
		let model = chain();
		let around_b = model.neighbors("B");
		assert!(around_b.contains("A") && around_b.contains("C"));
		assert_eq!(around_b.len(), 2);
	}

	#[test]
	fn relationship_wire_values() {
		assert_eq!(RelationshipKind::from_wire("one_to_many").short_label(), "1:N");
		assert_eq!(RelationshipKind::from_wire("many_to_many").short_label(), "N:M");
		assert_eq!(RelationshipKind::from_wire("undefined"), RelationshipKind::ManyToOne);
	}

	#[test]
	fn property_display() {
		assert_eq!(PropertyValue::Number(3.0).to_string(), "3");
		assert_eq!(PropertyValue::Bool(true).to_string(), "true");
		assert_eq!(PropertyValue::Null.to_string(), "null");
	}
}
