//! Barrier-staged rounds.
//!
//! Every active node takes exactly one push or relabel per round. During the
//! parallel phase the graph is only read, so every node sees the state
//! committed by the previous round; pushes and relabels are written to
//! per-edge and per-node staging cells and applied in one pass after the
//! barrier.

use crate::maximum_flow::discharge::{next_step, Step};
use crate::maximum_flow::error::{Error, Result};
use crate::maximum_flow::flow::{Accumulator, Flow};
use crate::maximum_flow::graph::Graph;
use crate::maximum_flow::pool::WorkerPool;
use crate::maximum_flow::preflow::settle_source;
use crate::maximum_flow::push_relabel::Statistics;
use std::sync::atomic::{AtomicUsize, Ordering};

pub(crate) struct StagedRounds<F: Flow> {
    // pushes into the source leave its excess alone
    source: usize,
    // flow pushed along each edge by its tail
    forward: Vec<F::Accumulator>,
    // flow cancelled on each edge by a push along its pair
    reverse: Vec<F::Accumulator>,
    // new height of each relabelled node, 0 otherwise
    heights: Vec<AtomicUsize>,
    pushes: AtomicUsize,
    relabels: AtomicUsize,
}

impl<F> StagedRounds<F>
where
    F: Flow,
{
    pub fn new(graph: &Graph<F>, source: usize) -> Self {
        Self {
            source,
            forward: (0..graph.num_edges()).map(|_| F::Accumulator::zero()).collect(),
            reverse: (0..graph.num_edges()).map(|_| F::Accumulator::zero()).collect(),
            heights: (0..graph.num_nodes()).map(|_| AtomicUsize::new(0)).collect(),
            pushes: AtomicUsize::new(0),
            relabels: AtomicUsize::new(0),
        }
    }

    pub fn run(&mut self, graph: &mut Graph<F>, sink: usize, pool: &WorkerPool, statistics: &mut Statistics) -> Result<()> {
        loop {
            let active = active_nodes(graph, self.source, sink)?;
            if active.is_empty() {
                break;
            }

            statistics.rounds += 1;
            log::debug!("round {}: {} active nodes", statistics.rounds, active.len());
            self.round(graph, &active, pool)?;
        }

        statistics.pushes += self.pushes.swap(0, Ordering::Relaxed);
        statistics.relabels += self.relabels.swap(0, Ordering::Relaxed);
        settle_source(graph, self.source, sink);
        Ok(())
    }

    pub fn round(&mut self, graph: &mut Graph<F>, active: &[usize], pool: &WorkerPool) -> Result<()> {
        self.discharge_all(graph, active, pool)?;
        self.commit(graph)
    }

    fn discharge_all(&self, graph: &Graph<F>, active: &[usize], pool: &WorkerPool) -> Result<()> {
        pool.run(active, |&u| {
            match next_step(graph, u)? {
                Some(Step::Push { edge_id, delta }) => {
                    let edge = &graph.edges[edge_id];
                    self.forward[edge_id].add(delta);
                    self.reverse[edge.rev].add(-delta);
                    self.pushes.fetch_add(1, Ordering::Relaxed);
                    log::trace!("push {} from {} to {}", delta, u, edge.to);
                }
                Some(Step::Relabel { height }) => {
                    self.heights[u].store(height, Ordering::Relaxed);
                    self.relabels.fetch_add(1, Ordering::Relaxed);
                    log::trace!("relabel {} to {}", u, height);
                }
                None => {}
            }
            Ok(())
        })
    }

    // single-threaded, runs after the barrier
    fn commit(&self, graph: &mut Graph<F>) -> Result<()> {
        // a node relabelled in the same round as it received flow from u must
        // stay within h(u) + 1, the pair edge back to u is residual now
        let mut ceiling = vec![usize::MAX; graph.num_nodes()];

        for edge_id in 0..graph.num_edges() {
            let pushed = self.forward[edge_id].take();
            let cancelled = self.reverse[edge_id].take();
            if pushed.is_zero() && cancelled.is_zero() {
                continue;
            }

            let edge = &mut graph.edges[edge_id];
            edge.flow += pushed + cancelled;
            if edge.flow > edge.upper {
                return Err(Error::InvariantViolation(format!("edge {} carries {} over capacity {} after commit", edge_id, edge.flow, edge.upper)));
            }

            let (from, to) = (edge.from, edge.to);
            graph.nodes[from].excess -= pushed;
            if to == self.source {
                continue;
            }
            graph.nodes[to].excess += pushed;
            if pushed > F::zero() {
                ceiling[to] = ceiling[to].min(graph.nodes[from].height + 1);
            }
        }

        for (u, height) in self.heights.iter().enumerate() {
            let height = height.swap(0, Ordering::Relaxed);
            if height != 0 {
                graph.nodes[u].height = height.min(ceiling[u]);
            }
        }

        Ok(())
    }
}

/// Non-terminal nodes with positive excess, in index order.
pub(crate) fn active_nodes<F: Flow>(graph: &Graph<F>, source: usize, sink: usize) -> Result<Vec<usize>> {
    let mut active = Vec::new();
    for (u, node) in graph.nodes.iter().enumerate() {
        if u == source || u == sink {
            continue;
        }
        if node.excess < F::zero() {
            return Err(Error::InvariantViolation(format!("node {} has negative excess {}", node.id, node.excess)));
        }
        if node.excess > F::zero() {
            active.push(u);
        }
    }
    Ok(active)
}
