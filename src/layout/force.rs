//! Force-directed placement as an explicit stepper.
//!
//! Every node is a point mass. Each pair repels with a force proportional to
//! `-charge / distance²`, each edge pulls its endpoints toward `link_distance`
//! with stiffness `link_strength`, a weak gravity keeps the cloud centred and a
//! final pass pushes apart any pair closer than two node radii. The simulation
//! stops after `max_iterations` steps or once the summed displacement of a step
//! falls below `convergence_threshold`, whichever comes first.

use std::collections::HashMap;
use std::f64::consts::PI;

use log::debug;

use super::{Point, PositionMap, Viewport};
use crate::graph::{GraphModel, NodeId};

/// Distance at which a unit of charge produces a unit of repulsion.
const CHARGE_SCALE: f64 = 150.0;
/// Squared distances are floored to this to keep forces finite.
const MIN_DISTANCE_SQ: f64 = 1.0;
/// Radius of the circle new graphs are seeded on.
const SEED_RADIUS: f64 = 100.0;

/// Tuning for [`ForceSimulation`].
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationParameters {
	/// Negative values repel.
	pub charge: f64,
	/// Spring rest length.
	pub link_distance: f64,
	/// Spring stiffness.
	pub link_strength: f64,
	/// Visual radius used by overlap prevention.
	pub node_radius: f64,
	/// Fraction of velocity lost each step.
	pub velocity_decay: f64,
	/// Pull toward the viewport centre.
	pub gravity: f64,
	/// Upper bound on per-step movement of one node.
	pub max_speed: f64,
	/// Hard cap on steps before the layout counts as settled.
	pub max_iterations: usize,
	/// Steps taken per animation frame when driven incrementally.
	pub steps_per_frame: usize,
	/// Total displacement under which a step counts as converged.
	pub convergence_threshold: f64,
}

impl Default for SimulationParameters {
	fn default() -> Self {
		Self {
			charge: -100.0,
			link_distance: 150.0,
			link_strength: 0.1,
			node_radius: 20.0,
			velocity_decay: 0.4,
			gravity: 0.02,
			max_speed: 50.0,
			max_iterations: 300,
			steps_per_frame: 10,
			convergence_threshold: 0.5,
		}
	}
}

#[derive(Clone, Debug)]
struct Body {
	id: NodeId,
	position: Point,
	vx: f64,
	vy: f64,
	/// Pinned bodies are placed by the user and never moved by forces.
	pinned: bool,
}

/// Incremental force-directed layout over one [`GraphModel`].
#[derive(Clone, Debug)]
pub struct ForceSimulation {
	params: SimulationParameters,
	center: Point,
	bodies: Vec<Body>,
	index: HashMap<NodeId, usize>,
	springs: Vec<(usize, usize)>,
	iteration: usize,
	last_displacement: f64,
}

impl ForceSimulation {
	/// Seeds every node on a circle around the viewport centre.
	pub fn new(model: &GraphModel, viewport: Viewport, params: SimulationParameters) -> Self {
		let mut sim = Self {
			params,
			center: viewport.center(),
			bodies: Vec::new(),
			index: HashMap::new(),
			springs: Vec::new(),
			iteration: 0,
			last_displacement: f64::INFINITY,
		};
		sim.load(model);
		sim
	}

	/// Replaces the simulated graph. Nodes already present keep their position
	/// and pin; new nodes start next to a placed neighbour when one exists,
	/// otherwise on the seeding circle. The iteration budget is reset.
	pub fn load(&mut self, model: &GraphModel) {
		let previous: HashMap<NodeId, Body> = self
			.bodies
			.drain(..)
			.map(|body| (body.id.clone(), body))
			.collect();
		self.index.clear();

		let count = model.nodes().len().max(1) as f64;
		let mut fresh = Vec::new();
		for (i, node) in model.nodes().iter().enumerate() {
			let body = match previous.get(&node.id) {
				Some(body) => Body {
					vx: 0.0,
					vy: 0.0,
					..body.clone()
				},
				None => {
					fresh.push(i);
					let angle = i as f64 * 2.0 * PI / count;
					Body {
						id: node.id.clone(),
						position: Point::new(
							self.center.x + SEED_RADIUS * angle.cos(),
							self.center.y + SEED_RADIUS * angle.sin(),
						),
						vx: 0.0,
						vy: 0.0,
						pinned: false,
					}
				}
			};
			self.index.insert(node.id.clone(), i);
			self.bodies.push(body);
		}

		self.springs = model
			.edges()
			.iter()
			.filter_map(|edge| {
				let s = *self.index.get(&edge.source)?;
				let t = *self.index.get(&edge.target)?;
				(s != t).then_some((s, t))
			})
			.collect();

		if !previous.is_empty() {
			self.seed_near_neighbors(&fresh, &previous);
		}

		self.iteration = 0;
		self.last_displacement = f64::INFINITY;
		debug!(
			"force simulation loaded {} nodes ({} new), {} springs",
			self.bodies.len(),
			fresh.len(),
			self.springs.len()
		);
	}

	fn seed_near_neighbors(&mut self, fresh: &[usize], previous: &HashMap<NodeId, Body>) {
		for (n, &i) in fresh.iter().enumerate() {
			let anchor = self.springs.iter().find_map(|&(s, t)| {
				let other = if s == i {
					t
				} else if t == i {
					s
				} else {
					return None;
				};
				previous
					.contains_key(&self.bodies[other].id)
					.then(|| self.bodies[other].position)
			});
			if let Some(anchor) = anchor {
				let angle = n as f64 * 2.0 * PI / fresh.len() as f64;
				let reach = self.params.link_distance * 0.5;
				self.bodies[i].position =
					Point::new(anchor.x + reach * angle.cos(), anchor.y + reach * angle.sin());
			}
		}
	}

	#[allow(missing_docs)]
	pub fn params(&self) -> &SimulationParameters {
		&self.params
	}

	/// Steps taken since construction or the last reheat.
	pub fn iteration(&self) -> usize {
		self.iteration
	}

	/// Summed displacement of the most recent step.
	pub fn last_displacement(&self) -> f64 {
		self.last_displacement
	}

	/// True once converged or out of iterations.
	pub fn is_settled(&self) -> bool {
		self.iteration >= self.params.max_iterations
			|| self.last_displacement < self.params.convergence_threshold
	}

	/// Restarts the iteration budget, e.g. after a drag changes the picture.
	pub fn reheat(&mut self) {
		self.iteration = 0;
		self.last_displacement = f64::INFINITY;
	}

	/// Moves the gravity centre to the new viewport's midpoint.
	pub fn resize(&mut self, viewport: Viewport) {
		self.center = viewport.center();
	}

	#[allow(missing_docs)]
	pub fn position(&self, id: &str) -> Option<Point> {
		self.index.get(id).map(|&i| self.bodies[i].position)
	}

	/// Snapshot of every node's current position.
	pub fn positions(&self) -> PositionMap {
		self.bodies
			.iter()
			.map(|b| (b.id.clone(), b.position))
			.collect()
	}

	/// Fixes a node at `point` until [`ForceSimulation::release`].
	pub fn pin(&mut self, id: &str, point: Point) {
		if let Some(&i) = self.index.get(id) {
			let body = &mut self.bodies[i];
			body.position = point;
			body.vx = 0.0;
			body.vy = 0.0;
			body.pinned = true;
		}
	}

	/// Hands a pinned node back to the forces.
	pub fn release(&mut self, id: &str) {
		if let Some(&i) = self.index.get(id) {
			self.bodies[i].pinned = false;
		}
	}

	#[allow(missing_docs)]
	pub fn is_pinned(&self, id: &str) -> bool {
		self.index
			.get(id)
			.is_some_and(|&i| self.bodies[i].pinned)
	}

	/// Advances one step and returns the summed displacement of all nodes.
	pub fn step(&mut self) -> f64 {
		let n = self.bodies.len();
		let mut forces = vec![(0.0_f64, 0.0_f64); n];

		for i in 0..n {
			for j in (i + 1)..n {
				let (dx, dy) = separation(&self.bodies[i].position, &self.bodies[j].position, i, j);
				let dist = dx.hypot(dy);
				let dist_sq = (dist * dist).max(MIN_DISTANCE_SQ);
				let magnitude = -self.params.charge * CHARGE_SCALE / dist_sq;
				let (fx, fy) = (dx / dist * magnitude, dy / dist * magnitude);
				forces[i].0 -= fx;
				forces[i].1 -= fy;
				forces[j].0 += fx;
				forces[j].1 += fy;
			}
		}

		for &(s, t) in &self.springs {
			let (dx, dy) = separation(&self.bodies[s].position, &self.bodies[t].position, s, t);
			let dist = (dx * dx + dy * dy).sqrt().max(f64::EPSILON);
			let magnitude = self.params.link_strength * (dist - self.params.link_distance);
			let (fx, fy) = (dx / dist * magnitude, dy / dist * magnitude);
			forces[s].0 += fx;
			forces[s].1 += fy;
			forces[t].0 -= fx;
			forces[t].1 -= fy;
		}

		let keep = 1.0 - self.params.velocity_decay;
		let mut displacement = 0.0;
		for (body, (fx, fy)) in self.bodies.iter_mut().zip(forces) {
			if body.pinned {
				continue;
			}
			let gx = (self.center.x - body.position.x) * self.params.gravity;
			let gy = (self.center.y - body.position.y) * self.params.gravity;
			body.vx = (body.vx + fx + gx) * keep;
			body.vy = (body.vy + fy + gy) * keep;
			let speed = body.vx.hypot(body.vy);
			if speed > self.params.max_speed {
				let scale = self.params.max_speed / speed;
				body.vx *= scale;
				body.vy *= scale;
			}
			body.position.x += body.vx;
			body.position.y += body.vy;
			displacement += body.vx.hypot(body.vy);
		}

		displacement += self.resolve_overlaps();

		self.iteration += 1;
		self.last_displacement = displacement;
		displacement
	}

	/// Pushes apart pairs closer than two radii; returns the distance moved.
	fn resolve_overlaps(&mut self) -> f64 {
		let min_gap = 2.0 * self.params.node_radius;
		let mut moved = 0.0;
		let n = self.bodies.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let (a, b) = (&self.bodies[i], &self.bodies[j]);
				if a.pinned && b.pinned {
					continue;
				}
				let (dx, dy) = separation(&a.position, &b.position, i, j);
				let dist = (dx * dx + dy * dy).sqrt();
				if dist >= min_gap {
					continue;
				}
				let overlap = min_gap - dist;
				let (ux, uy) = if dist > f64::EPSILON {
					(dx / dist, dy / dist)
				} else {
					(1.0, 0.0)
				};
				let (share_a, share_b) = match (a.pinned, b.pinned) {
					(true, false) => (0.0, 1.0),
					(false, true) => (1.0, 0.0),
					_ => (0.5, 0.5),
				};
				self.bodies[i].position.x -= ux * overlap * share_a;
				self.bodies[i].position.y -= uy * overlap * share_a;
				self.bodies[j].position.x += ux * overlap * share_b;
				self.bodies[j].position.y += uy * overlap * share_b;
				moved += overlap;
			}
		}
		moved
	}

	/// Runs at most `budget` steps, stopping early once settled. Returns
	/// whether the simulation is settled afterwards.
	pub fn advance(&mut self, budget: usize) -> bool {
		for _ in 0..budget {
			if self.is_settled() {
				break;
			}
			self.step();
		}
		self.is_settled()
	}

	/// Runs to completion within the iteration cap.
	pub fn run(&mut self) -> PositionMap {
		let budget = self.params.max_iterations;
		self.advance(budget);
		debug!(
			"force simulation stopped after {} steps (displacement {:.3})",
			self.iteration, self.last_displacement
		);
		self.positions()
	}

	/// Id of the node nearest to `point` within `radius`, if any.
	pub fn node_at(&self, point: Point, radius: f64) -> Option<&str> {
		self.bodies
			.iter()
			.map(|b| (b, b.position.distance(point)))
			.filter(|(_, d)| *d < radius)
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(b, _)| b.id.as_str())
	}
}

/// Vector from `a` to `b`. Coincident points get a small deterministic offset
/// derived from their indices so they can separate.
fn separation(a: &Point, b: &Point, i: usize, j: usize) -> (f64, f64) {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	if dx == 0.0 && dy == 0.0 {
		let angle = (i * 31 + j * 17) as f64;
		(angle.cos() * 1e-3, angle.sin() * 1e-3)
	} else {
		(dx, dy)
	}
}

/// One-shot force layout, run until settled or out of iterations.
pub fn layout(model: &GraphModel, viewport: Viewport, params: SimulationParameters) -> PositionMap {
	ForceSimulation::new(model, viewport, params).run()
}
