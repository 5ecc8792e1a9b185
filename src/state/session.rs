//! Carries requests from the views to a fetch adapter and back into the
//! state machine.

use std::cell::RefCell;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use leptos::prelude::{RwSignal, Update};
use log::debug;

use super::fetch::{DataFetchAdapter, DiagramParams, FetchError, NeighborParams, SearchParams};
use super::machine::{GraphStateMachine, Request};
use crate::graph::GraphModel;
use crate::interaction::Intent;

/// Somewhere a [`GraphStateMachine`] lives. `update` returns `None` once the
/// owner is gone, e.g. after the hosting view unmounted.
pub trait StateStore {
	/// Runs `f` against the machine.
	fn update<R>(&self, f: impl FnOnce(&mut GraphStateMachine) -> R) -> Option<R>;
}

impl StateStore for Rc<RefCell<GraphStateMachine>> {
	fn update<R>(&self, f: impl FnOnce(&mut GraphStateMachine) -> R) -> Option<R> {
		Some(f(&mut self.borrow_mut()))
	}
}

/// Reactive store; `None` once the signal has been disposed.
impl StateStore for RwSignal<GraphStateMachine> {
	fn update<R>(&self, f: impl FnOnce(&mut GraphStateMachine) -> R) -> Option<R> {
		self.try_update(f)
	}
}

/// Runs `request` against `adapter` and converts the payload into a model.
pub async fn fetch<A>(adapter: &A, request: &Request) -> Result<GraphModel, FetchError>
where
	A: DataFetchAdapter + ?Sized,
{
	match request {
		Request::Search(params) => {
			if params.query.trim().is_empty() {
				return Err(FetchError::InvalidRequest("empty search query".into()));
			}
			adapter.search_nodes(params).await.map(GraphModel::from)
		}
		Request::ExpandNeighbors(params) => adapter.fetch_neighbors(params).await.map(GraphModel::from),
		Request::Diagram(params) => adapter.fetch_diagram(params).await.map(GraphModel::from),
	}
}

/// Binds a data source to a state machine. Requests are numbered as soon as
/// they are made; the returned future performs the fetch and applies the
/// outcome.
pub struct GraphSession<A: ?Sized, S> {
	adapter: Rc<A>,
	store: S,
}

impl<A: ?Sized, S: Clone> Clone for GraphSession<A, S> {
	fn clone(&self) -> Self {
		Self {
			adapter: Rc::clone(&self.adapter),
			store: self.store.clone(),
		}
	}
}

impl<A, S> GraphSession<A, S>
where
	A: DataFetchAdapter + ?Sized + 'static,
	S: StateStore + Clone + 'static,
{
	#[allow(missing_docs)]
	pub fn new(adapter: Rc<A>, store: S) -> Self {
		Self { adapter, store }
	}

	#[allow(missing_docs)]
	pub fn store(&self) -> &S {
		&self.store
	}

	/// Issues `request`. Returns `None`, without touching state, for a search
	/// with a blank query.
	pub fn request(&self, request: Request) -> Option<LocalBoxFuture<'static, ()>> {
		if let Request::Search(params) = &request {
			if params.query.trim().is_empty() {
				debug!("blank search ignored");
				return None;
			}
		}
		let ticket = self.store.update(|m| m.issue(request))?;
		let adapter = Rc::clone(&self.adapter);
		let store = self.store.clone();
		Some(
			async move {
				// cleared before we got to run
				if store.update(|m| m.is_current(&ticket)) != Some(true) {
					return;
				}
				let outcome = fetch(&*adapter, &ticket.request).await;
				store.update(|m| m.resolve(ticket, outcome));
			}
			.boxed_local(),
		)
	}

	/// Shorthand for a [`Request::Search`].
	pub fn search(&self, params: SearchParams) -> Option<LocalBoxFuture<'static, ()>> {
		self.request(Request::Search(params))
	}

	/// Shorthand for a [`Request::ExpandNeighbors`].
	pub fn expand(&self, params: NeighborParams) -> Option<LocalBoxFuture<'static, ()>> {
		self.request(Request::ExpandNeighbors(params))
	}

	/// Shorthand for a [`Request::Diagram`].
	pub fn load_diagram(&self, params: DiagramParams) -> Option<LocalBoxFuture<'static, ()>> {
		self.request(Request::Diagram(params))
	}

	/// Clears the machine, retiring requests in flight.
	pub fn clear(&self) {
		self.store.update(|m| m.clear());
	}

	/// Applies gesture outcomes in order. At most one fetch results, and its
	/// future is returned for the caller to spawn.
	pub fn perform(&self, intents: Vec<Intent>) -> Option<LocalBoxFuture<'static, ()>> {
		let mut pending = None;
		for intent in intents {
			match intent {
				Intent::ClearGraph => self.clear(),
				Intent::Fetch(request) => pending = self.request(request),
			}
		}
		pending
	}
}

#[cfg(test)]
mod tests {
	use futures::executor::block_on;

	use super::*;
	use crate::state::machine::Status;
	use crate::state::memory::InMemoryGraph;

	type Session = GraphSession<InMemoryGraph, Rc<RefCell<GraphStateMachine>>>;

	fn session() -> Session {
		GraphSession::new(
			Rc::new(InMemoryGraph::sample()),
			Rc::new(RefCell::new(GraphStateMachine::new())),
		)
	}

	fn status(s: &Session) -> Status {
		s.store().borrow().status()
	}

	#[test]
	fn search_then_expand() {
		let s = session();
		block_on(s.search(SearchParams::new("ada")).unwrap());
		assert_eq!(status(&s), Status::Succeeded);
		assert!(s.store().borrow().model().contains_node("ada"));

		block_on(s.expand(NeighborParams::new("ada")).unwrap());
		let machine = s.store().borrow();
		assert_eq!(machine.state().central_node_id.as_deref(), Some("ada"));
		assert!(machine.model().nodes().len() > 1);
	}

	#[test]
	fn blank_search_is_a_no_op() {
		let s = session();
		assert!(s.search(SearchParams::new("   ")).is_none());
		assert_eq!(*s.store().borrow(), GraphStateMachine::new());
	}

	#[test]
	fn awaiting_out_of_order_keeps_newest() {
		let s = session();
		let first = s.expand(NeighborParams::new("ada")).unwrap();
		let second = s.expand(NeighborParams::new("acme")).unwrap();
		block_on(second);
		block_on(first);

		let machine = s.store().borrow();
		assert_eq!(machine.state().central_node_id.as_deref(), Some("acme"));
		assert!(machine.model().contains_node("acme"));
		assert_eq!(machine.status(), Status::Succeeded);
	}

	#[test]
	fn clear_before_fetch_skips_it() {
		let s = session();
		let pending = s.search(SearchParams::new("ada")).unwrap();
		s.clear();
		block_on(pending);
		assert_eq!(status(&s), Status::Idle);
		assert!(s.store().borrow().model().is_empty());
	}

	#[test]
	fn unknown_diagram_fails_without_losing_graph() {
		let s = session();
		block_on(s.search(SearchParams::new("ada")).unwrap());
		let before = s.store().borrow().model().clone();

		block_on(
			s.load_diagram(DiagramParams {
				data_source_id: "nope".into(),
				diagram_id: None,
			})
			.unwrap(),
		);
		let machine = s.store().borrow();
		assert_eq!(machine.status(), Status::Failed);
		assert_eq!(machine.model(), &before);
		assert!(machine.state().error.is_some());
	}

	#[test]
	fn perform_clears_before_searching() {
		let s = session();
		block_on(s.expand(NeighborParams::new("ada")).unwrap());
		let pending = s.perform(vec![
			Intent::ClearGraph,
			Intent::Fetch(Request::Search(SearchParams::new("acme"))),
		]);
		{
			let machine = s.store().borrow();
			assert!(machine.model().is_empty());
			assert_eq!(machine.status(), Status::Loading);
		}
		block_on(pending.unwrap());
		assert!(s.store().borrow().model().contains_node("acme"));
	}
}
