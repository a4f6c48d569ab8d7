use crate::maximum_flow::flow::Flow;
use crate::maximum_flow::graph::Graph;

/// Saturates every edge leaving `source` and lifts it to height `n`.
///
/// All other heights are reset to `0`, which is a valid labeling for any
/// feasible flow already stored in the graph. Returns the indices of the
/// nodes that received flow.
///
/// The excess of `source` is left alone here and by every scheduler: it may
/// feed more than `F::MAX` in total. [`settle_source`] restores it once the
/// run is over.
pub fn preflow<F: Flow>(graph: &mut Graph<F>, source: usize) -> Vec<usize> {
    for node in graph.nodes.iter_mut() {
        node.height = 0;
    }
    graph.nodes[source].height = graph.num_nodes();

    let mut reached = Vec::new();
    for i in 0..graph.adjacency[source].len() {
        let edge_id = graph.adjacency[source][i];
        let edge = &graph.edges[edge_id];
        let (to, delta) = (edge.to, edge.residual_capacity());
        if to == source || delta <= F::zero() {
            continue;
        }

        reached.push(to);
        graph.push_flow(edge_id, delta);
        graph.nodes[to].excess += delta;
    }

    log::debug!("preflow: {} edges saturated from node {}", reached.len(), graph.nodes[source].id);
    reached
}

/// Sets the excess of `source` to the negated excess of `sink`.
///
/// Excesses always sum to zero, so this is exact once every other node is
/// balanced.
pub(crate) fn settle_source<F: Flow>(graph: &mut Graph<F>, source: usize, sink: usize) {
    graph.nodes[source].excess = -graph.nodes[sink].excess;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> Graph<i64> {
        let mut graph = Graph::default();
        graph.add_nodes(1..=4).unwrap();
        for (u, v, c) in [(1, 2, 10), (1, 3, 7), (2, 4, 10), (3, 4, 10), (3, 1, 2)] {
            graph.add_edge(u, v, c).unwrap();
        }
        graph
    }

    #[test]
    fn preflow_saturates_source_edges() {
        let mut graph = diamond();
        let reached = preflow(&mut graph, 0);

        assert_eq!(reached, vec![1, 2]);
        assert_eq!(graph.node(1).unwrap().height, 4);
        assert_eq!(graph.excess(2), Some(10));
        assert_eq!(graph.excess(3), Some(7));
        assert_eq!(graph.excess(1), Some(0));
        assert!(graph.neighbors(0).all(|e| e.residual_capacity() == 0));

        // the antiparallel arc 3 -> 1 can now return its own capacity plus the pushed flow
        assert_eq!(graph.find_edge(3, 1).unwrap().residual_capacity(), 9);
    }

    #[test]
    fn preflow_resets_heights() {
        let mut graph = diamond();
        graph.nodes[2].height = 5;
        preflow(&mut graph, 0);
        assert_eq!(graph.nodes.iter().map(|node| node.height).collect::<Vec<_>>(), vec![4, 0, 0, 0]);
    }

    #[test]
    fn second_preflow_sends_nothing_new() {
        let mut graph = diamond();
        preflow(&mut graph, 0);
        assert!(preflow(&mut graph, 0).is_empty());
        assert_eq!(graph.excess(2), Some(10));
    }

    #[test]
    fn source_excess_is_not_accumulated() {
        let mut graph = Graph::<i64>::default();
        graph.add_nodes(1..=3).unwrap();
        graph.add_edge(1, 2, i64::MAX).unwrap();
        graph.add_edge(1, 3, i64::MAX).unwrap();

        assert_eq!(preflow(&mut graph, 0), vec![1, 2]);
        assert_eq!(graph.excess(1), Some(0));
        assert_eq!(graph.excess(2), Some(i64::MAX));
        assert_eq!(graph.excess(3), Some(i64::MAX));
    }

    #[test]
    fn settle_source_mirrors_the_sink() {
        let mut graph = diamond();
        graph.nodes[3].excess = 12;
        settle_source(&mut graph, 0, 3);
        assert_eq!(graph.excess(1), Some(-12));
    }
}
