use crate::maximum_flow::error::{Error, Result};
use crate::maximum_flow::flow::Flow;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};

pub type NodeId = i64;

#[derive(PartialEq, Debug, Clone)]
pub struct Node<F> {
    pub id: NodeId,
    pub height: usize,
    pub excess: F,
}

/// A directed arc of the residual network.
///
/// `flow` is the net flow of the pair `(from, to)` / `(to, from)`: pushing
/// along an edge raises its flow and lowers the flow of `rev` by the same
/// amount, so `flow` is negative when the pair carries flow the other way.
#[derive(PartialEq, Debug, Clone)]
pub struct Edge<F> {
    pub from: usize,
    pub to: usize,
    pub flow: F,
    pub upper: F,
    pub rev: usize,
}

impl<F: Flow> Edge<F> {
    /// Clamped to the largest value of `F` when `upper - flow` does not fit.
    #[inline]
    pub fn residual_capacity(&self) -> F {
        self.upper.saturating_sub(&self.flow)
    }

    /// Flow actually carried along this arc, always in `0..=upper`.
    #[inline]
    pub fn carried_flow(&self) -> F {
        self.flow.max(F::zero())
    }
}

#[derive(Debug, Clone)]
pub struct Graph<F> {
    pub(crate) nodes: Vec<Node<F>>,
    pub(crate) edges: Vec<Edge<F>>,
    pub(crate) adjacency: Vec<Vec<usize>>,
    index: HashMap<NodeId, usize>,
    arcs: HashMap<(usize, usize), usize>,
}

impl<F> Default for Graph<F> {
    fn default() -> Self {
        Self { nodes: Vec::new(), edges: Vec::new(), adjacency: Vec::new(), index: HashMap::new(), arcs: HashMap::new() }
    }
}

impl<F> Graph<F>
where
    F: Flow,
{
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    // return node index
    pub fn add_node(&mut self, id: NodeId) -> Result<usize> {
        let u = self.nodes.len();
        match self.index.entry(id) {
            Entry::Occupied(_) => Err(Error::DuplicateNode(id)),
            Entry::Vacant(entry) => {
                entry.insert(u);
                self.nodes.push(Node { id, height: 0, excess: F::zero() });
                self.adjacency.push(Vec::new());
                Ok(u)
            }
        }
    }

    pub fn add_nodes(&mut self, ids: impl IntoIterator<Item = NodeId>) -> Result<Vec<usize>> {
        ids.into_iter().map(|id| self.add_node(id)).collect()
    }

    /// Adds `upper` units of capacity from `from` to `to` and returns the edge index.
    ///
    /// An ordered pair owns at most one edge: adding to an existing pair
    /// (including the zero-capacity reverse placeholder created by an earlier
    /// call) accumulates its capacity. A new edge is always created together
    /// with its zero-capacity reverse edge.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, upper: F) -> Result<usize> {
        if upper < F::zero() {
            return Err(Error::NegativeCapacity { from, to, capacity: upper.to_string() });
        }
        let u = self.node_index(from).ok_or(Error::UnknownNode(from))?;
        let v = self.node_index(to).ok_or(Error::UnknownNode(to))?;

        if let Some(&edge_id) = self.arcs.get(&(u, v)) {
            let edge = &mut self.edges[edge_id];
            edge.upper = edge.upper.saturating_add(&upper);
            return Ok(edge_id);
        }

        let forward = self.edges.len();
        if u == v {
            // a loop is its own pair and never carries flow
            self.edges.push(Edge { from: u, to: u, flow: F::zero(), upper, rev: forward });
            self.adjacency[u].push(forward);
            self.arcs.insert((u, u), forward);
            return Ok(forward);
        }

        let backward = forward + 1;
        self.edges.push(Edge { from: u, to: v, flow: F::zero(), upper, rev: backward });
        self.edges.push(Edge { from: v, to: u, flow: F::zero(), upper: F::zero(), rev: forward });
        self.adjacency[u].push(forward);
        self.adjacency[v].push(backward);
        self.arcs.insert((u, v), forward);
        self.arcs.insert((v, u), backward);

        Ok(forward)
    }

    #[inline]
    pub fn node_index(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    #[inline]
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node<F>> {
        self.node_index(id).map(|u| &self.nodes[u])
    }

    pub fn nodes(&self) -> std::slice::Iter<Node<F>> {
        self.nodes.iter()
    }

    pub fn excess(&self, id: NodeId) -> Option<F> {
        self.node(id).map(|node| node.excess)
    }

    /// Smallest id strictly greater than every registered id, `None` if
    /// `NodeId::MAX` is registered.
    pub fn next_free_id(&self) -> Option<NodeId> {
        self.index.keys().max().map_or(Some(0), |&id| id.checked_add(1))
    }

    pub fn get_edge(&self, edge_id: usize) -> Option<Edge<F>> {
        self.edges.get(edge_id).cloned()
    }

    pub fn find_edge(&self, from: NodeId, to: NodeId) -> Option<&Edge<F>> {
        let (u, v) = (self.node_index(from)?, self.node_index(to)?);
        self.arcs.get(&(u, v)).map(|&edge_id| &self.edges[edge_id])
    }

    pub fn edges(&self) -> std::slice::Iter<Edge<F>> {
        self.edges.iter()
    }

    // outgoing edge indices of u in insertion order
    #[inline]
    pub fn out_edges(&self, u: usize) -> &[usize] {
        &self.adjacency[u]
    }

    #[inline]
    pub fn neighbors(&self, u: usize) -> impl Iterator<Item = &Edge<F>> + '_ {
        self.adjacency[u].iter().map(move |&edge_id| &self.edges[edge_id])
    }

    // moves delta along the pair, excesses untouched
    #[inline]
    pub(crate) fn push_flow(&mut self, edge_id: usize, delta: F) {
        let rev = self.edges[edge_id].rev;
        self.edges[edge_id].flow += delta;
        self.edges[rev].flow -= delta;
    }

    #[inline]
    pub(crate) fn push(&mut self, edge_id: usize, delta: F) {
        let (from, to) = (self.edges[edge_id].from, self.edges[edge_id].to);
        self.push_flow(edge_id, delta);
        self.nodes[from].excess -= delta;
        self.nodes[to].excess += delta;
    }

    /// Net flow leaving `source`.
    pub fn flow_value(&self, source: NodeId) -> Option<F> {
        let s = self.node_index(source)?;
        Some(self.neighbors(s).fold(F::zero(), |mut flow, edge| {
            flow += edge.flow;
            flow
        }))
    }

    /// Nodes reachable from `source` in the residual network.
    ///
    /// After a maximum flow has been computed these form the source side of a
    /// minimum cut.
    pub fn minimum_cut(&self, source: NodeId) -> Vec<NodeId> {
        let Some(s) = self.node_index(source) else {
            return Vec::new();
        };

        let mut cut = Vec::new();
        let mut visited = vec![false; self.num_nodes()];
        let mut que = VecDeque::from([s]);
        visited[s] = true;

        while let Some(u) = que.pop_front() {
            cut.push(self.nodes[u].id);
            for e in self.neighbors(u) {
                if !visited[e.to] && e.residual_capacity() > F::zero() {
                    visited[e.to] = true;
                    que.push_back(e.to);
                }
            }
        }

        cut
    }

    /// Verifies that the stored flow is a feasible flow from `source` to `sink`.
    ///
    /// Every edge must respect its capacity and mirror its pair, every
    /// excess must match the node's net inflow, and only the terminals may
    /// keep a nonzero excess.
    pub fn check_flow(&self, source: NodeId, sink: NodeId) -> Result<()> {
        let s = self.node_index(source).ok_or(Error::UnknownNode(source))?;
        let t = self.node_index(sink).ok_or(Error::UnknownNode(sink))?;

        for (edge_id, e) in self.edges.iter().enumerate() {
            if e.flow > e.upper {
                return Err(Error::InvariantViolation(format!("edge {} carries {} over capacity {}", edge_id, e.flow, e.upper)));
            }
            if self.edges[e.rev].flow != -e.flow {
                return Err(Error::InvariantViolation(format!("edge {} and its pair {} disagree on flow", edge_id, e.rev)));
            }
        }

        for (u, node) in self.nodes.iter().enumerate() {
            let inflow = self.neighbors(u).fold(F::zero(), |mut inflow, e| {
                inflow -= e.flow;
                inflow
            });
            if inflow != node.excess {
                return Err(Error::InvariantViolation(format!("node {} has excess {} but net inflow {}", node.id, node.excess, inflow)));
            }
            if u != s && u != t && !node.excess.is_zero() {
                return Err(Error::InvariantViolation(format!("node {} keeps excess {}", node.id, node.excess)));
            }
        }

        Ok(())
    }
}
