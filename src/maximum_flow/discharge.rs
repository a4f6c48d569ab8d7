//! The push/relabel step shared by every scheduler.
//!
//! A scheduler only decides *where* the state is read from and *how* the
//! resulting step is applied: in place, staged for a later commit, or under
//! a set of node locks.

use crate::maximum_flow::error::{Error, Result};
use crate::maximum_flow::flow::Flow;
use crate::maximum_flow::graph::Graph;

/// Read access to the residual network as seen by one discharge step.
pub(crate) trait ResidualNetwork<F: Flow> {
    fn out_edges(&self, u: usize) -> &[usize];

    fn target(&self, edge_id: usize) -> usize;

    fn height(&self, u: usize) -> usize;

    fn excess(&self, u: usize) -> F;

    fn residual_capacity(&self, edge_id: usize) -> F;
}

impl<F: Flow> ResidualNetwork<F> for Graph<F> {
    #[inline]
    fn out_edges(&self, u: usize) -> &[usize] {
        &self.adjacency[u]
    }

    #[inline]
    fn target(&self, edge_id: usize) -> usize {
        self.edges[edge_id].to
    }

    #[inline]
    fn height(&self, u: usize) -> usize {
        self.nodes[u].height
    }

    #[inline]
    fn excess(&self, u: usize) -> F {
        self.nodes[u].excess
    }

    #[inline]
    fn residual_capacity(&self, edge_id: usize) -> F {
        self.edges[edge_id].residual_capacity()
    }
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub(crate) enum Step<F> {
    Push { edge_id: usize, delta: F },
    Relabel { height: usize },
}

/// Decides the next push or relabel for `u`.
///
/// Among the residual edges of `u` the one whose target is lowest wins, the
/// first in adjacency order on ties. Returns `None` if `u` has no excess.
pub(crate) fn next_step<F, N>(network: &N, u: usize) -> Result<Option<Step<F>>>
where
    F: Flow,
    N: ResidualNetwork<F> + ?Sized,
{
    let excess = network.excess(u);
    if excess <= F::zero() {
        return Ok(None);
    }

    let mut lowest: Option<(usize, usize)> = None;
    for &edge_id in network.out_edges(u) {
        let v = network.target(edge_id);
        if v == u || network.residual_capacity(edge_id) <= F::zero() {
            continue;
        }
        let height = network.height(v);
        if lowest.map_or(true, |(_, min_height)| height < min_height) {
            lowest = Some((edge_id, height));
        }
    }

    // flow entered u along some edge whose pair is still residual
    let Some((edge_id, min_height)) = lowest else {
        return Err(Error::InvariantViolation(format!("active node {} has no residual edge", u)));
    };

    if min_height < network.height(u) {
        let delta = excess.min(network.residual_capacity(edge_id));
        Ok(Some(Step::Push { edge_id, delta }))
    } else {
        Ok(Some(Step::Relabel { height: min_height + 1 }))
    }
}
