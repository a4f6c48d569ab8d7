use crate::maximum_flow::discharge::{next_step, Step};
use crate::maximum_flow::error::Result;
use crate::maximum_flow::flow::Flow;
use crate::maximum_flow::graph::Graph;
use crate::maximum_flow::preflow::settle_source;
use crate::maximum_flow::push_relabel::Statistics;
use crate::maximum_flow::staged::active_nodes;
use std::collections::VecDeque;

/// Single-threaded FIFO push-relabel on the graph itself.
pub(crate) struct SequentialFifo {
    active_nodes: VecDeque<usize>,
    in_queue: Vec<bool>,
}

impl SequentialFifo {
    pub fn new<F: Flow>(graph: &Graph<F>) -> Self {
        Self { active_nodes: VecDeque::new(), in_queue: vec![false; graph.num_nodes()] }
    }

    pub fn run<F: Flow>(&mut self, graph: &mut Graph<F>, source: usize, sink: usize, statistics: &mut Statistics) -> Result<()> {
        for u in active_nodes(graph, source, sink)? {
            self.enqueue(u);
        }

        while let Some(u) = self.active_nodes.pop_front() {
            self.in_queue[u] = false;
            statistics.rounds += 1;
            self.discharge(graph, u, source, sink, statistics)?;
        }

        settle_source(graph, source, sink);
        Ok(())
    }

    fn enqueue(&mut self, u: usize) {
        if !self.in_queue[u] {
            self.in_queue[u] = true;
            self.active_nodes.push_back(u);
        }
    }

    // push/relabel until u has no excess left
    fn discharge<F: Flow>(&mut self, graph: &mut Graph<F>, u: usize, source: usize, sink: usize, statistics: &mut Statistics) -> Result<()> {
        while let Some(step) = next_step(&*graph, u)? {
            match step {
                Step::Push { edge_id, delta } => {
                    let to = graph.edges[edge_id].to;
                    graph.push_flow(edge_id, delta);
                    graph.nodes[u].excess -= delta;
                    statistics.pushes += 1;
                    if to != source {
                        graph.nodes[to].excess += delta;
                    }
                    if to != source && to != sink {
                        self.enqueue(to);
                    }
                }
                Step::Relabel { height } => {
                    graph.nodes[u].height = height;
                    statistics.relabels += 1;
                }
            }
        }
        Ok(())
    }
}
