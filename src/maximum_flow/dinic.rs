use crate::maximum_flow::error::{Error, Result};
use crate::maximum_flow::flow::Flow;
use crate::maximum_flow::graph::{Graph, NodeId};
use std::collections::VecDeque;

/// Sequential blocking-flow solver, used to cross-check the push-relabel
/// engines.
///
/// Augments whatever flow is already stored in the graph and returns the
/// amount added.
#[derive(Default)]
pub struct Dinic {
    distances: Vec<usize>, // distance from u to sink in the residual network
    current_edge: Vec<usize>,
    que: VecDeque<usize>,
}

impl Dinic {
    pub fn solve<F: Flow>(&mut self, source: NodeId, sink: NodeId, graph: &mut Graph<F>) -> Result<F> {
        let s = graph.node_index(source).ok_or(Error::UnknownNode(source))?;
        let t = graph.node_index(sink).ok_or(Error::UnknownNode(sink))?;
        if s == t {
            return Err(Error::InvalidEndpoint(format!("source and sink are both node {}", source)));
        }

        let n = graph.num_nodes();
        self.distances.resize(n, n);
        self.current_edge.resize(n, 0);

        let upper = graph.neighbors(s).filter(|e| e.to != s).fold(F::zero(), |sum, e| sum.saturating_add(&e.residual_capacity()));
        let mut flow = F::zero();
        while flow < upper {
            self.update_distances(graph, s, t);

            // no s-t path
            if self.distances[s] >= n {
                break;
            }

            self.current_edge.fill(0);
            let delta = self.dfs(graph, s, t, upper - flow);
            if delta.is_zero() {
                break;
            }
            flow += delta;
        }

        log::debug!("dinic: {} units from {} to {}", flow, source, sink);
        Ok(flow)
    }

    // O(n + m)
    // if the sink is unreachable from u, distances[u] becomes n
    fn update_distances<F: Flow>(&mut self, graph: &Graph<F>, source: usize, sink: usize) {
        let n = graph.num_nodes();
        self.que.clear();
        self.que.push_back(sink);
        self.distances.fill(n);
        self.distances[sink] = 0;

        while let Some(v) = self.que.pop_front() {
            for e in graph.neighbors(v) {
                // e.to -> v
                if graph.edges[e.rev].residual_capacity() > F::zero() && self.distances[e.to] == n {
                    self.distances[e.to] = self.distances[v] + 1;
                    if e.to != source {
                        self.que.push_back(e.to);
                    }
                }
            }
        }
    }

    fn dfs<F: Flow>(&mut self, graph: &mut Graph<F>, u: usize, sink: usize, upper: F) -> F {
        if u == sink {
            return upper;
        }

        let mut res = F::zero();
        while self.current_edge[u] < graph.adjacency[u].len() {
            let edge_id = graph.adjacency[u][self.current_edge[u]];
            let (v, residual_capacity) = (graph.edges[edge_id].to, graph.edges[edge_id].residual_capacity());

            if residual_capacity > F::zero() && self.distances[u] == self.distances[v] + 1 {
                let d = self.dfs(graph, v, sink, residual_capacity.min(upper - res));
                if d > F::zero() {
                    graph.push(edge_id, d);
                    res += d;
                    if res == upper {
                        return res;
                    }
                }
            }
            self.current_edge[u] += 1;
        }
        self.distances[u] = graph.num_nodes();

        res
    }
}
