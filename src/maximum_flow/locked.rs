//! Fine-grained locking.
//!
//! Every node owns a mutex guarding its height, its excess and the flow of
//! its outgoing edges. A push or relabel of `u` holds the locks of `u` and of
//! all targets of `u`, acquired in ascending node index, and releases them
//! before the next step. Active nodes are discharged in sweeps: one task per
//! active node, a join, then a fresh scan.

use crate::maximum_flow::discharge::{next_step, ResidualNetwork, Step};
use crate::maximum_flow::error::{Error, Result};
use crate::maximum_flow::flow::Flow;
use crate::maximum_flow::graph::Graph;
use crate::maximum_flow::pool::WorkerPool;
use crate::maximum_flow::preflow::settle_source;
use crate::maximum_flow::push_relabel::Statistics;
use parking_lot::{Mutex, MutexGuard};
use std::iter;
use std::sync::atomic::{AtomicUsize, Ordering};

struct NodeState<F> {
    height: usize,
    excess: F,
    // flow of each outgoing edge, in adjacency order
    flow: Vec<F>,
}

pub(crate) struct LockedNetwork<'g, F> {
    graph: &'g Graph<F>,
    source: usize,
    // position of every edge inside the adjacency of its tail
    slots: Vec<usize>,
    // u and the targets of u, ascending and deduplicated
    lock_order: Vec<Vec<usize>>,
    states: Vec<Mutex<NodeState<F>>>,
    pushes: AtomicUsize,
    relabels: AtomicUsize,
}

/// Solves in place: the graph is updated only if the run succeeds.
pub(crate) fn run<F: Flow>(graph: &mut Graph<F>, source: usize, sink: usize, pool: &WorkerPool, statistics: &mut Statistics) -> Result<()> {
    let states = {
        let network = LockedNetwork::new(graph, source);
        network.run(sink, pool, statistics)?;
        network.into_states()
    };

    for (u, state) in states.into_iter().enumerate() {
        graph.nodes[u].height = state.height;
        graph.nodes[u].excess = state.excess;
        for (slot, flow) in state.flow.into_iter().enumerate() {
            let edge_id = graph.adjacency[u][slot];
            graph.edges[edge_id].flow = flow;
        }
    }

    settle_source(graph, source, sink);
    Ok(())
}

impl<'g, F> LockedNetwork<'g, F>
where
    F: Flow,
{
    pub fn new(graph: &'g Graph<F>, source: usize) -> Self {
        let mut slots = vec![0; graph.num_edges()];
        for edges in graph.adjacency.iter() {
            for (slot, &edge_id) in edges.iter().enumerate() {
                slots[edge_id] = slot;
            }
        }

        let lock_order = graph
            .adjacency
            .iter()
            .enumerate()
            .map(|(u, edges)| {
                let mut members: Vec<usize> = iter::once(u).chain(edges.iter().map(|&edge_id| graph.edges[edge_id].to)).collect();
                members.sort_unstable();
                members.dedup();
                members
            })
            .collect();

        let states = graph
            .nodes
            .iter()
            .zip(graph.adjacency.iter())
            .map(|(node, edges)| {
                Mutex::new(NodeState {
                    height: node.height,
                    excess: node.excess,
                    flow: edges.iter().map(|&edge_id| graph.edges[edge_id].flow).collect(),
                })
            })
            .collect();

        Self { graph, source, slots, lock_order, states, pushes: AtomicUsize::new(0), relabels: AtomicUsize::new(0) }
    }

    pub fn run(&self, sink: usize, pool: &WorkerPool, statistics: &mut Statistics) -> Result<()> {
        loop {
            let active = self.active_nodes(sink)?;
            if active.is_empty() {
                break;
            }

            statistics.rounds += 1;
            log::debug!("sweep {}: {} active nodes", statistics.rounds, active.len());
            pool.run(&active, |&u| self.discharge(u))?;
        }

        statistics.pushes += self.pushes.swap(0, Ordering::Relaxed);
        statistics.relabels += self.relabels.swap(0, Ordering::Relaxed);
        Ok(())
    }

    fn into_states(self) -> Vec<NodeState<F>> {
        self.states.into_iter().map(Mutex::into_inner).collect()
    }

    // called between sweeps, when no worker holds a lock
    fn active_nodes(&self, sink: usize) -> Result<Vec<usize>> {
        let mut active = Vec::new();
        for (u, state) in self.states.iter().enumerate() {
            if u == self.source || u == sink {
                continue;
            }
            let excess = state.lock().excess;
            if excess < F::zero() {
                return Err(Error::InvariantViolation(format!("node {} has negative excess {}", self.graph.nodes[u].id, excess)));
            }
            if excess > F::zero() {
                active.push(u);
            }
        }
        Ok(active)
    }

    // pushes and relabels u until it has no excess left
    fn discharge(&self, u: usize) -> Result<()> {
        loop {
            let mut neighborhood = self.lock_neighborhood(u);
            match next_step(&neighborhood, u)? {
                Some(Step::Push { edge_id, delta }) => {
                    neighborhood.push(edge_id, delta);
                    self.pushes.fetch_add(1, Ordering::Relaxed);
                    log::trace!("push {} from {} to {}", delta, u, self.graph.edges[edge_id].to);
                }
                Some(Step::Relabel { height }) => {
                    neighborhood.state_mut(u).height = height;
                    self.relabels.fetch_add(1, Ordering::Relaxed);
                    log::trace!("relabel {} to {}", u, height);
                }
                None => return Ok(()),
            }
        }
    }

    fn lock_neighborhood(&self, u: usize) -> Neighborhood<'_, 'g, F> {
        let members = &self.lock_order[u];
        let guards = members.iter().map(|&v| self.states[v].lock()).collect();
        Neighborhood { network: self, members, guards }
    }
}

/// The locked state of a node and all of its targets.
struct Neighborhood<'a, 'g, F> {
    network: &'a LockedNetwork<'g, F>,
    members: &'a [usize],
    guards: Vec<MutexGuard<'a, NodeState<F>>>,
}

impl<'a, 'g, F> Neighborhood<'a, 'g, F>
where
    F: Flow,
{
    #[inline]
    fn position(&self, v: usize) -> usize {
        let i = self.members.partition_point(|&m| m < v);
        debug_assert_eq!(self.members.get(i), Some(&v), "node {} is not locked", v);
        i
    }

    #[inline]
    fn state(&self, v: usize) -> &NodeState<F> {
        &self.guards[self.position(v)]
    }

    #[inline]
    fn state_mut(&mut self, v: usize) -> &mut NodeState<F> {
        let i = self.position(v);
        &mut self.guards[i]
    }

    fn push(&mut self, edge_id: usize, delta: F) {
        let network = self.network;
        let edge = &network.graph.edges[edge_id];

        let tail = self.state_mut(edge.from);
        tail.flow[network.slots[edge_id]] += delta;
        tail.excess -= delta;

        let head = self.state_mut(edge.to);
        head.flow[network.slots[edge.rev]] -= delta;
        if edge.to != network.source {
            head.excess += delta;
        }
    }
}

impl<'a, 'g, F> ResidualNetwork<F> for Neighborhood<'a, 'g, F>
where
    F: Flow,
{
    #[inline]
    fn out_edges(&self, u: usize) -> &[usize] {
        &self.network.graph.adjacency[u]
    }

    #[inline]
    fn target(&self, edge_id: usize) -> usize {
        self.network.graph.edges[edge_id].to
    }

    #[inline]
    fn height(&self, u: usize) -> usize {
        self.state(u).height
    }

    #[inline]
    fn excess(&self, u: usize) -> F {
        self.state(u).excess
    }

    #[inline]
    fn residual_capacity(&self, edge_id: usize) -> F {
        let edge = &self.network.graph.edges[edge_id];
        edge.upper.saturating_sub(&self.state(edge.from).flow[self.network.slots[edge_id]])
    }
}
