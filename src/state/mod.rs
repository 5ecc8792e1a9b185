//! Graph data lifecycle: fetching, request ordering and the state the views
//! render from.

pub mod fetch;
pub mod http;
pub mod machine;
pub mod memory;
pub mod session;

pub use fetch::{DataFetchAdapter, DiagramParams, FetchError, NeighborParams, SearchParams};
pub use http::HttpFetchAdapter;
pub use machine::{GraphEvent, GraphState, GraphStateMachine, Request, Status, StatusSnapshot, Ticket};
pub use memory::InMemoryGraph;
pub use session::{GraphSession, StateStore};
