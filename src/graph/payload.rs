//! JSON payload shapes exchanged with the graph services, and their conversion
//! into [`GraphModel`] snapshots.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::model::{
	Edge, Field, GraphModel, Node, NodeKind, Properties, PropertyValue, Relation, RelationshipKind,
};

/// A knowledge-graph vertex as served by `/visualize/*`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KgNode {
	/// Node id.
	pub id: String,
	/// Display name; the id is shown when absent.
	#[serde(default)]
	pub label: Option<String>,
	/// Category such as `Person`.
	#[serde(default)]
	pub tag: Option<String>,
	/// Free-form JSON properties.
	#[serde(default)]
	pub properties: Option<Map<String, Value>>,
}

/// A knowledge-graph edge.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KgEdge {
	/// Optional id; one is synthesized when missing.
	#[serde(default)]
	pub id: Option<String>,
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Edge type name.
	#[serde(default)]
	pub label: Option<String>,
	/// Free-form JSON properties.
	#[serde(default)]
	pub properties: Option<Map<String, Value>>,
}

/// Response of the search and neighbour endpoints.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KgGraphData {
	/// Matched nodes.
	pub nodes: Vec<KgNode>,
	/// Edges among them; endpoints may be outside `nodes`.
	pub edges: Vec<KgEdge>,
	/// Service diagnostics, passed through untouched.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<Map<String, Value>>,
}

/// One column of a table in an ER payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TableColumn {
	/// Column name.
	pub name: String,
	/// SQL type name.
	pub data_type: String,
	/// Length for sized types such as `varchar`.
	#[serde(default)]
	pub size: Option<u32>,
	/// Part of the primary key.
	#[serde(default)]
	pub is_primary_key: bool,
	/// References another table.
	#[serde(default)]
	pub is_foreign_key: bool,
	/// Schema comment.
	#[serde(default)]
	pub description: Option<String>,
}

/// A table in an ER payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TableNode {
	/// Table id.
	pub id: String,
	/// Table name as displayed.
	pub label: String,
	/// Columns in declaration order.
	#[serde(default)]
	pub columns: Vec<TableColumn>,
}

/// A foreign-key relationship in an ER payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipEdge {
	/// Relationship id.
	pub id: String,
	/// Referenced table id.
	pub source: String,
	/// Referencing table id.
	pub target: String,
	/// `one_to_one`, `one_to_many`, `many_to_one` or `many_to_many`.
	pub relationship_type: String,
	/// Key columns on the source table.
	#[serde(default)]
	pub source_columns: Vec<String>,
	/// Key columns on the target table.
	#[serde(default)]
	pub target_columns: Vec<String>,
	/// Overrides the cardinality label when set.
	#[serde(default)]
	pub label: Option<String>,
}

/// Response of `/er-diagrams/data-sources/{id}/diagram-data`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ErDiagramData {
	/// Tables.
	pub nodes: Vec<TableNode>,
	/// Relationships between them.
	pub edges: Vec<RelationshipEdge>,
}

fn scalar(value: Value) -> PropertyValue {
	match value {
		Value::Null => PropertyValue::Null,
		Value::Bool(b) => PropertyValue::Bool(b),
		Value::Number(n) => n
			.as_f64()
			.map(PropertyValue::Number)
			.unwrap_or_else(|| PropertyValue::Text(n.to_string())),
		Value::String(s) => PropertyValue::Text(s),
		// nested values have no scalar form; keep them readable
		other => PropertyValue::Text(other.to_string()),
	}
}

fn properties(map: Option<Map<String, Value>>) -> Properties {
	map.map(|m| m.into_iter().map(|(k, v)| (k, scalar(v))).collect())
		.unwrap_or_default()
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|s| !s.trim().is_empty())
}

impl From<KgNode> for Node {
	fn from(node: KgNode) -> Self {
		let label = non_empty(node.label).unwrap_or_else(|| node.id.clone());
		Node {
			kind: NodeKind::from_tag(node.tag.as_deref()),
			properties: properties(node.properties),
			fields: Vec::new(),
			id: node.id,
			label,
		}
	}
}

impl From<KgEdge> for Edge {
	fn from(edge: KgEdge) -> Self {
		let label = edge.label.unwrap_or_default();
		Edge {
			id: edge.id.unwrap_or_default(),
			source: edge.source,
			target: edge.target,
			relation: Relation::Typed(label.clone()),
			label,
			properties: properties(edge.properties),
		}
	}
}

impl From<KgGraphData> for GraphModel {
	fn from(data: KgGraphData) -> Self {
		GraphModel::from_parts(
			data.nodes.into_iter().map(Node::from).collect(),
			data.edges.into_iter().map(Edge::from).collect(),
		)
	}
}

impl From<TableColumn> for Field {
	fn from(column: TableColumn) -> Self {
		let type_descriptor = match column.size {
			Some(size) => format!("{}({size})", column.data_type),
			None => column.data_type,
		};
		Field {
			name: column.name,
			type_descriptor,
			is_primary_key: column.is_primary_key,
			is_foreign_key: column.is_foreign_key,
			description: column.description,
		}
	}
}

impl From<TableNode> for Node {
	fn from(table: TableNode) -> Self {
		Node {
			label: non_empty(Some(table.label)).unwrap_or_else(|| table.id.clone()),
			id: table.id,
			kind: NodeKind::Table,
			properties: Vec::new(),
			fields: table.columns.into_iter().map(Field::from).collect(),
		}
	}
}

impl From<RelationshipEdge> for Edge {
	fn from(edge: RelationshipEdge) -> Self {
		let kind = RelationshipKind::from_wire(&edge.relationship_type);
		let label = non_empty(edge.label).unwrap_or_else(|| kind.short_label().to_string());
		let mut properties = Vec::new();
		if !edge.source_columns.is_empty() {
			properties.push((
				"source_columns".to_string(),
				PropertyValue::Text(edge.source_columns.join(", ")),
			));
		}
		if !edge.target_columns.is_empty() {
			properties.push((
				"target_columns".to_string(),
				PropertyValue::Text(edge.target_columns.join(", ")),
			));
		}
		Edge {
			id: edge.id,
			source: edge.source,
			target: edge.target,
			label,
			relation: Relation::Er(kind),
			properties,
		}
	}
}

impl From<ErDiagramData> for GraphModel {
	fn from(data: ErDiagramData) -> Self {
		GraphModel::from_parts(
			data.nodes.into_iter().map(Node::from).collect(),
			data.edges.into_iter().map(Edge::from).collect(),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn kg_payload_with_missing_optionals() {
		let data: KgGraphData = serde_json::from_str(
			r#"{
				"nodes": [
					{"id": "p1", "label": "Ada", "tag": "Person", "properties": {"name": "Ada", "age": 36, "tags": ["x"]}},
					{"id": "o1"}
				],
				"edges": [{"source": "p1", "target": "o1", "label": "WORKS_AT"}]
			}"#,
		)
		.unwrap();
		let model = GraphModel::from(data);

		let ada = model.node("p1").unwrap();
		assert_eq!(ada.kind, NodeKind::Person);
		let keys: Vec<&str> = ada.properties.iter().map(|(k, _)| k.as_str()).collect();
		assert_eq!(keys, vec!["name", "age", "tags"]);
		assert_eq!(ada.property("age"), Some(&PropertyValue::Number(36.0)));
		assert_eq!(ada.property("tags"), Some(&PropertyValue::Text("[\"x\"]".into())));

		let org = model.node("o1").unwrap();
		assert_eq!(org.label, "o1");
		assert_eq!(org.kind, NodeKind::Untagged);

		assert_eq!(model.edges()[0].id, "p1-WORKS_AT-o1-0");
	}

	#[test]
	fn er_payload_maps_cardinality_labels() {
		let data: ErDiagramData = serde_json::from_str(
			r#"{
				"nodes": [
					{"id": "users", "label": "users", "columns": [
						{"name": "id", "data_type": "int", "is_primary_key": true, "is_foreign_key": false}
					]},
					{"id": "orders", "label": "orders", "columns": [
						{"name": "user_id", "data_type": "varchar", "size": 36, "is_primary_key": false, "is_foreign_key": true}
					]}
				],
				"edges": [
					{"id": "r1", "source": "users", "target": "orders", "relationship_type": "one_to_many",
					 "source_columns": ["id"], "target_columns": ["user_id"]},
					{"id": "r2", "source": "orders", "target": "users", "relationship_type": "weird", "label": "custom"}
				]
			}"#,
		)
		.unwrap();
		let model = GraphModel::from(data);

		assert_eq!(model.edges()[0].label, "1:N");
		assert_eq!(model.edges()[0].relation, Relation::Er(RelationshipKind::OneToMany));
		assert_eq!(model.edges()[1].label, "custom");
		assert_eq!(model.edges()[1].relation, Relation::Er(RelationshipKind::ManyToOne));

		let orders = model.node("orders").unwrap();
		assert_eq!(orders.kind, NodeKind::Table);
		assert_eq!(orders.fields[0].type_descriptor, "varchar(36)");
		assert!(orders.fields[0].is_foreign_key);
	}
}
