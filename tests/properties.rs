//! Properties that hold for arbitrary graphs and event sequences.

use graph_explorer::geometry::{self, ArrowStyle};
use graph_explorer::graph::{Edge, GraphModel, Node, NodeRole};
use graph_explorer::layout::{Viewport, columnar};
use graph_explorer::state::{FetchError, GraphStateMachine, Request, SearchParams, Status, Ticket};
use proptest::prelude::*;

/// Up to eight nodes; edge endpoints may point past the node list, giving
/// dangling references.
fn arb_model() -> impl Strategy<Value = GraphModel> {
	(0usize..8)
		.prop_flat_map(|n| (Just(n), prop::collection::vec((0usize..n + 3, 0usize..n + 3), 0..16)))
		.prop_map(|(n, pairs)| {
			let nodes = (0..n).map(|i| Node::new(format!("n{i}"), format!("Node {i}"))).collect();
			let edges = pairs
				.into_iter()
				.map(|(s, t)| Edge::new(format!("n{s}"), format!("n{t}"), "rel"))
				.collect();
			GraphModel::from_parts(nodes, edges)
		})
}

#[derive(Clone, Debug)]
enum Step {
	Issue(String),
	ResolveOk(usize, bool),
	ResolveErr(usize),
	Clear,
}

fn arb_steps() -> impl Strategy<Value = Vec<Step>> {
	prop::collection::vec(
		prop_oneof![
			"[a-z]{1,4}".prop_map(Step::Issue),
			(0usize..6, any::<bool>()).prop_map(|(i, empty)| Step::ResolveOk(i, empty)),
			(0usize..6).prop_map(Step::ResolveErr),
			Just(Step::Clear),
		],
		0..24,
	)
}

fn replay(steps: &[Step]) -> (GraphStateMachine, Vec<Ticket>) {
	let mut machine = GraphStateMachine::new();
	let mut tickets = Vec::new();
	for step in steps {
		match step {
			Step::Issue(q) => tickets.push(machine.issue(Request::Search(SearchParams::new(q.clone())))),
			Step::ResolveOk(i, empty) => {
				if let Some(t) = tickets.get(*i).cloned() {
					let model = if *empty {
						GraphModel::new()
					} else {
						GraphModel::from_parts(vec![Node::new(format!("r{}", t.seq), "r")], vec![])
					};
					machine.resolve(t, Ok(model));
				}
			}
			Step::ResolveErr(i) => {
				if let Some(t) = tickets.get(*i).cloned() {
					machine.resolve(t, Err(FetchError::Transport("offline".into())));
				}
			}
			Step::Clear => machine.clear(),
		}
	}
	(machine, tickets)
}

proptest! {
	#[test]
	fn every_node_has_exactly_one_role(model in arb_model()) {
		let classes = model.classify();
		prop_assert_eq!(classes.len(), model.nodes().len());
		let total: usize = [NodeRole::SourceOnly, NodeRole::TargetOnly, NodeRole::Bridging, NodeRole::Isolated]
			.into_iter()
			.map(|role| classes.bucket(role).len())
			.sum();
		prop_assert_eq!(total, model.nodes().len());
		for node in model.nodes() {
			prop_assert!(classes.role(&node.id).is_some());
		}
	}

	#[test]
	fn columnar_layout_is_deterministic(model in arb_model()) {
		let viewport = Viewport::new(800.0, 600.0);
		prop_assert_eq!(columnar::layout(&model, viewport), columnar::layout(&model, viewport));
	}

	#[test]
	fn left_column_never_empty_for_non_empty_model(model in arb_model()) {
		let columns = columnar::assign_columns(&model);
		prop_assert_eq!(columns.left.is_empty(), model.nodes().is_empty());
	}

	#[test]
	fn columns_are_disjoint_and_placed_inside_viewport(model in arb_model()) {
		let viewport = Viewport::new(800.0, 600.0);
		let columns = columnar::assign_columns(&model);
		let mut seen = std::collections::HashSet::new();
		for node in columns.left.iter().chain(&columns.middle).chain(&columns.right) {
			prop_assert!(seen.insert(node.id.clone()), "{} placed twice", node.id);
		}
		let positions = columnar::layout(&model, viewport);
		prop_assert_eq!(positions.len(), seen.len());
		for (_, p) in positions.iter() {
			prop_assert!(p.x > 0.0 && p.x < viewport.width);
			prop_assert!(p.y > 0.0 && p.y < viewport.height);
		}
	}

	#[test]
	fn dangling_edges_are_never_drawn(model in arb_model()) {
		let positions = columnar::layout(&model, Viewport::new(800.0, 600.0));
		for g in geometry::build(&model, &positions, None, ArrowStyle::default()) {
			prop_assert!(model.contains_node(&g.source));
			prop_assert!(model.contains_node(&g.target));
			prop_assert!(g.length.is_finite());
		}
	}

	#[test]
	fn clear_always_returns_to_idle(steps in arb_steps()) {
		let (mut machine, tickets) = replay(&steps);
		machine.clear();
		prop_assert_eq!(machine.status(), Status::Idle);
		prop_assert!(machine.model().is_empty());
		prop_assert_eq!(&machine.state().error, &None);
		prop_assert_eq!(&machine.state().central_node_id, &None);

		let idle = machine.clone();
		for t in tickets {
			machine.resolve(t, Ok(GraphModel::from_parts(vec![Node::new("late", "late")], vec![])));
		}
		prop_assert_eq!(machine, idle);
	}

	#[test]
	fn only_resolved_models_are_shown(steps in arb_steps()) {
		let (machine, _) = replay(&steps);
		if let Some(node) = machine.model().nodes().first() {
			prop_assert!(node.id.starts_with('r'));
		}
		if machine.status() == Status::Failed {
			prop_assert!(machine.state().error.is_some());
		}
	}
}
