//! Graph snapshots: nodes, edges and their derived structure.

mod model;
pub mod payload;

pub use model::{
	Classification, Edge, Field, GraphModel, Node, NodeId, NodeKind, NodeRole, Properties,
	PropertyValue, Relation, RelationshipKind,
};
