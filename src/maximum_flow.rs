pub mod dinic;
mod discharge;
pub mod error;
pub mod flow;
pub mod graph;
mod locked;
mod pool;
pub mod preflow;
pub mod push_relabel;
mod sequential;
mod staged;

pub use dinic::Dinic;
pub use error::{Error, Result};
pub use flow::Flow;
pub use graph::{Edge, Graph, Node, NodeId};
pub use push_relabel::{Discipline, PushRelabel, Statistics};
