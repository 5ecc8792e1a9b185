//! Lifecycle of the displayed graph data.
//!
//! The machine is a plain value: [`GraphStateMachine::apply`] takes it and an
//! event and returns the next state. Requests are numbered when issued and a
//! response is applied only if its number is higher than anything applied
//! before, so a slow response can never overwrite a newer one. `Clear` retires
//! every request still in flight.

use log::{debug, warn};

use super::fetch::{DiagramParams, FetchError, NeighborParams, SearchParams};
use crate::graph::{GraphModel, NodeId};

/// Where the displayed data stands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Status {
	/// Nothing loaded and nothing in flight.
	#[default]
	Idle,
	/// A request is in flight.
	Loading,
	/// The latest applied response succeeded.
	Succeeded,
	/// The latest applied response failed; the previous model is kept.
	Failed,
}

/// A fetch the machine can track.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum Request {
	Search(SearchParams),
	ExpandNeighbors(NeighborParams),
	Diagram(DiagramParams),
}

impl Request {
	fn name(&self) -> &'static str {
		match self {
			Request::Search(_) => "search",
			Request::ExpandNeighbors(_) => "expand",
			Request::Diagram(_) => "diagram",
		}
	}
}

/// An issued request and its sequence number.
#[derive(Clone, Debug, PartialEq)]
pub struct Ticket {
	/// Issue order, starting at 1.
	pub seq: u64,
	#[allow(missing_docs)]
	pub request: Request,
}

/// Input to [`GraphStateMachine::apply`].
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum GraphEvent {
	/// A request went out.
	Requested(Ticket),
	/// A response came back, possibly stale.
	Resolved {
		ticket: Ticket,
		outcome: Result<GraphModel, FetchError>,
	},
	/// Back to idle with an empty model.
	Clear,
}

/// Current data and status.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphState {
	/// Last successfully loaded graph.
	pub model: GraphModel,
	#[allow(missing_docs)]
	pub status: Status,
	/// Message of the latest failure, cleared by the next request.
	pub error: Option<String>,
	/// Anchor of the most recent neighbour expansion.
	pub central_node_id: Option<NodeId>,
}

/// What a host needs to draw loading and error affordances.
#[derive(Clone, Debug, Default, PartialEq)]
#[allow(missing_docs)]
pub struct StatusSnapshot {
	pub status: Status,
	pub error: Option<String>,
	pub central_node_id: Option<NodeId>,
}

/// Applies request events in issue order and drops stale responses.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphStateMachine {
	state: GraphState,
	issued: u64,
	applied: u64,
}

#[allow(missing_docs)]
impl GraphStateMachine {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn state(&self) -> &GraphState {
		&self.state
	}

	pub fn model(&self) -> &GraphModel {
		&self.state.model
	}

	pub fn status(&self) -> Status {
		self.state.status
	}

	/// Status fields without the model.
	pub fn snapshot(&self) -> StatusSnapshot {
		StatusSnapshot {
			status: self.state.status,
			error: self.state.error.clone(),
			central_node_id: self.state.central_node_id.clone(),
		}
	}

	/// Next ticket for `request`. Issuing it is a separate `Requested` event.
	pub fn ticket(&self, request: Request) -> Ticket {
		Ticket {
			seq: self.issued + 1,
			request,
		}
	}

	/// Whether `ticket`'s response would still be applied.
	pub fn is_current(&self, ticket: &Ticket) -> bool {
		ticket.seq > self.applied && ticket.seq <= self.issued
	}

	/// The next state after `event`.
	pub fn apply(mut self, event: GraphEvent) -> Self {
		match event {
			GraphEvent::Requested(ticket) => self.on_requested(ticket),
			GraphEvent::Resolved { ticket, outcome } => self.on_resolved(ticket, outcome),
			GraphEvent::Clear => {
				debug!("graph cleared, retiring requests up to #{}", self.issued);
				self.state = GraphState::default();
				self.applied = self.issued;
			}
		}
		self
	}

	/// [`Self::apply`] in place.
	pub fn dispatch(&mut self, event: GraphEvent) {
		*self = std::mem::take(self).apply(event);
	}

	/// Numbers `request`, records it as in flight and returns its ticket.
	pub fn issue(&mut self, request: Request) -> Ticket {
		let ticket = self.ticket(request);
		self.dispatch(GraphEvent::Requested(ticket.clone()));
		ticket
	}

	/// Applies a response; ignored unless it is the newest seen so far.
	pub fn resolve(&mut self, ticket: Ticket, outcome: Result<GraphModel, FetchError>) {
		self.dispatch(GraphEvent::Resolved { ticket, outcome });
	}

	/// Empties the graph and retires every request in flight.
	pub fn clear(&mut self) {
		self.dispatch(GraphEvent::Clear);
	}

	fn on_requested(&mut self, ticket: Ticket) {
		if ticket.seq <= self.issued {
			warn!("ignoring out-of-order ticket #{} (issued #{})", ticket.seq, self.issued);
			return;
		}
		debug!("{} request #{} in flight", ticket.request.name(), ticket.seq);
		self.issued = ticket.seq;
		self.state.status = Status::Loading;
		self.state.error = None;
		if let Request::ExpandNeighbors(params) = &ticket.request {
			self.state.central_node_id = Some(params.node_id.clone());
		}
	}

	fn on_resolved(&mut self, ticket: Ticket, outcome: Result<GraphModel, FetchError>) {
		if !self.is_current(&ticket) {
			debug!(
				"dropping stale {} response #{} (applied #{})",
				ticket.request.name(),
				ticket.seq,
				self.applied
			);
			return;
		}
		let latest = ticket.seq == self.issued;

		match outcome {
			Ok(model) => {
				debug!(
					"{} response #{}: {} nodes, {} edges",
					ticket.request.name(),
					ticket.seq,
					model.nodes().len(),
					model.edges().len()
				);
				self.applied = ticket.seq;
				self.state.model = model;
				self.state.error = None;
				if !matches!(ticket.request, Request::ExpandNeighbors(_)) {
					self.state.central_node_id = None;
				}
				self.state.status = if latest { Status::Succeeded } else { Status::Loading };
			}
			Err(err) if latest => {
				warn!("{} request #{} failed: {err}", ticket.request.name(), ticket.seq);
				self.applied = ticket.seq;
				self.state.status = Status::Failed;
				self.state.error = Some(err.to_string());
			}
			Err(err) => {
				debug!(
					"{} request #{} failed after being superseded: {err}",
					ticket.request.name(),
					ticket.seq
				);
			}
		}
	}
}
