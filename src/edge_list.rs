//! Plain-text edge lists.
//!
//! An edge list looks as follows.
//!
//! 1. empty lines are allowed and ignored
//! 2. a line starting with `#` is a comment line and is ignored
//! 3. every other line holds one arc `<from> <to> <capacity>`, separated by
//!    whitespace, where `<from>` and `<to>` are integer node ids and
//!    `<capacity>` is an integer >= 0.
//!
//! Nodes are registered in the order in which their ids first appear.
//! Repeated arcs accumulate their capacities.

use crate::maximum_flow::{Error, Flow, Graph, NodeId, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

pub fn read<F, R>(reader: R) -> Result<Graph<F>>
where
    F: Flow,
    R: BufRead,
{
    let mut graph = Graph::default();

    for (i, line) in reader.lines().enumerate() {
        let line_number = i + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let &[from, to, capacity] = tokens.as_slice() else {
            return Err(Error::Parse { line: line_number, message: format!("expected `<from> <to> <capacity>`, got {} fields", tokens.len()) });
        };

        let from = parse_node(from, line_number)?;
        let to = parse_node(to, line_number)?;
        let capacity = F::from_str_radix(capacity, 10)
            .map_err(|_| Error::Parse { line: line_number, message: format!("invalid capacity `{}`", capacity) })?;

        for id in [from, to] {
            if !graph.contains_node(id) {
                graph.add_node(id)?;
            }
        }
        graph.add_edge(from, to, capacity).map_err(|err| Error::Parse { line: line_number, message: err.to_string() })?;
    }

    log::debug!("read edge list with {} nodes and {} edges", graph.num_nodes(), graph.num_edges());
    Ok(graph)
}

pub fn read_from_file<F: Flow>(path: impl AsRef<Path>) -> Result<Graph<F>> {
    read(BufReader::new(File::open(path)?))
}

/// Writes every arc that carries flow as `<from> <to> <flow>`.
pub fn write_flow<F, W>(graph: &Graph<F>, mut writer: W) -> Result<()>
where
    F: Flow,
    W: Write,
{
    let nodes: Vec<NodeId> = graph.nodes().map(|node| node.id).collect();
    for e in graph.edges().filter(|e| e.carried_flow() > F::zero()) {
        writeln!(writer, "{} {} {}", nodes[e.from], nodes[e.to], e.flow)?;
    }
    Ok(())
}

fn parse_node(token: &str, line: usize) -> Result<NodeId> {
    token.parse().map_err(|_| Error::Parse { line, message: format!("invalid node id `{}`", token) })
}
