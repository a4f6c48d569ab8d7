//! Maximum flow by concurrent push-relabel.
//!
//! # Example
//!
//! ```
//! use parallel_maximum_flow::maximum_flow::{Discipline, Graph, PushRelabel};
//!
//! let mut graph = Graph::<i64>::default();
//! graph.add_nodes(1..=4).unwrap();
//! for (u, v, c) in [(1, 2, 10), (1, 3, 10), (2, 4, 10), (3, 4, 10)] {
//!     graph.add_edge(u, v, c).unwrap();
//! }
//!
//! let mut solver = PushRelabel::new(Discipline::Locked);
//! solver.num_threads = 2;
//! assert_eq!(solver.solve(1, 4, &mut graph).unwrap(), 20);
//! assert!(graph.edges().all(|e| e.carried_flow() <= e.upper));
//! ```

use crate::maximum_flow::error::{Error, Result};
use crate::maximum_flow::flow::Flow;
use crate::maximum_flow::graph::{Graph, NodeId};
use crate::maximum_flow::locked;
use crate::maximum_flow::pool::WorkerPool;
use crate::maximum_flow::preflow::preflow;
use crate::maximum_flow::sequential::SequentialFifo;
use crate::maximum_flow::staged::StagedRounds;

/// How discharges of different nodes are synchronized.
#[derive(Default, PartialEq, Eq, Debug, Clone, Copy)]
pub enum Discipline {
    /// One push or relabel per active node per round; all nodes read the
    /// state of the previous round and deltas are committed at the barrier.
    #[default]
    Staged,
    /// Per-node locks taken in ascending node order; pushes apply
    /// immediately.
    Locked,
    /// FIFO push-relabel on the calling thread.
    Sequential,
}

#[derive(Default, PartialEq, Eq, Debug, Clone)]
pub struct Statistics {
    /// Rounds (staged), sweeps (locked) or discharges (sequential).
    pub rounds: usize,
    pub pushes: usize,
    pub relabels: usize,
}

pub struct PushRelabel {
    pub discipline: Discipline,
    /// Number of worker threads, `0` for one per logical core.
    pub num_threads: usize,
    /// Check the final flow with [`Graph::check_flow`] before returning.
    pub verify: bool,
    statistics: Statistics,
}

impl Default for PushRelabel {
    fn default() -> Self {
        Self { discipline: Discipline::default(), num_threads: 0, verify: cfg!(debug_assertions), statistics: Statistics::default() }
    }
}

impl PushRelabel {
    pub fn new(discipline: Discipline) -> Self {
        Self { discipline, ..Self::default() }
    }

    /// Statistics of the last call to `solve`.
    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Computes a maximum flow from `source` to `sink` and returns its value.
    ///
    /// The flow is left in the graph. Calling this again on the same graph
    /// returns the same value.
    pub fn solve<F: Flow>(&mut self, source: NodeId, sink: NodeId, graph: &mut Graph<F>) -> Result<F> {
        let (s, t) = endpoints(graph, source, sink)?;
        self.statistics = Statistics::default();

        preflow(graph, s);
        if let Err(err) = self.run(graph, s, t) {
            log::error!("push-relabel aborted: {}", err);
            return Err(err);
        }
        if self.verify {
            graph.check_flow(source, sink)?;
        }

        let value = graph.nodes[t].excess;
        log::info!(
            "maximum flow from {} to {}: {} ({:?}, {} rounds, {} pushes, {} relabels)",
            source,
            sink,
            value,
            self.discipline,
            self.statistics.rounds,
            self.statistics.pushes,
            self.statistics.relabels
        );
        Ok(value)
    }

    /// Maximum flow from any of `sources` to any of `sinks`.
    ///
    /// A super-source and a super-sink with fresh ids are added to the graph.
    /// The super-source feeds each source with that source's total outgoing
    /// capacity, each sink drains into the super-sink with its total incoming
    /// capacity.
    pub fn solve_multi<F: Flow>(&mut self, sources: &[NodeId], sinks: &[NodeId], graph: &mut Graph<F>) -> Result<F> {
        let sources = terminal_set(graph, sources, "source")?;
        let sinks = terminal_set(graph, sinks, "sink")?;
        if let Some(id) = sources.iter().find(|&&id| sinks.binary_search(&id).is_ok()) {
            return Err(Error::InvalidEndpoint(format!("node {} is both a source and a sink", id)));
        }

        let Some((super_source, super_sink)) = graph.next_free_id().and_then(|id| Some((id, id.checked_add(1)?))) else {
            return Err(Error::InvalidEndpoint("no free node ids left for the super terminals".to_string()));
        };
        graph.add_node(super_source)?;
        graph.add_node(super_sink)?;

        for id in sources {
            let u = graph.node_index(id).ok_or(Error::UnknownNode(id))?;
            let upper = graph.neighbors(u).fold(F::zero(), |sum, e| sum.saturating_add(&e.upper));
            graph.add_edge(super_source, id, upper)?;
        }
        for id in sinks {
            let t = graph.node_index(id).ok_or(Error::UnknownNode(id))?;
            let upper = graph.neighbors(t).fold(F::zero(), |sum, e| sum.saturating_add(&graph.edges[e.rev].upper));
            graph.add_edge(id, super_sink, upper)?;
        }

        self.solve(super_source, super_sink, graph)
    }

    fn run<F: Flow>(&mut self, graph: &mut Graph<F>, source: usize, sink: usize) -> Result<()> {
        match self.discipline {
            Discipline::Staged => {
                let pool = WorkerPool::new(self.num_threads)?;
                log::debug!("staged rounds on {} threads", pool.num_threads());
                StagedRounds::new(graph, source).run(graph, sink, &pool, &mut self.statistics)
            }
            Discipline::Locked => {
                let pool = WorkerPool::new(self.num_threads)?;
                log::debug!("locked sweeps on {} threads", pool.num_threads());
                locked::run(graph, source, sink, &pool, &mut self.statistics)
            }
            Discipline::Sequential => SequentialFifo::new(graph).run(graph, source, sink, &mut self.statistics),
        }
    }
}

impl<F: Flow> Graph<F> {
    /// Maximum flow value with the default solver configuration.
    pub fn get_max_flow(&mut self, source: NodeId, sink: NodeId) -> Result<F> {
        PushRelabel::default().solve(source, sink, self)
    }
}

fn endpoints<F: Flow>(graph: &Graph<F>, source: NodeId, sink: NodeId) -> Result<(usize, usize)> {
    if source == sink {
        return Err(Error::InvalidEndpoint(format!("source and sink are both node {}", source)));
    }
    let s = graph.node_index(source).ok_or_else(|| Error::InvalidEndpoint(format!("source {} is not registered", source)))?;
    let t = graph.node_index(sink).ok_or_else(|| Error::InvalidEndpoint(format!("sink {} is not registered", sink)))?;
    Ok((s, t))
}

// sorted, deduplicated and registered
fn terminal_set<F: Flow>(graph: &Graph<F>, ids: &[NodeId], role: &str) -> Result<Vec<NodeId>> {
    if ids.is_empty() {
        return Err(Error::InvalidEndpoint(format!("no {} given", role)));
    }
    if let Some(id) = ids.iter().find(|&&id| !graph.contains_node(id)) {
        return Err(Error::InvalidEndpoint(format!("{} {} is not registered", role, id)));
    }
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}
