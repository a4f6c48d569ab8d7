//! Reads an edge list, computes a maximum flow and prints the flow per arc.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use parallel_maximum_flow::edge_list;
use parallel_maximum_flow::maximum_flow::{Discipline, Graph, NodeId, PushRelabel};
use std::io;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DisciplineArg {
    /// Barrier-staged rounds
    Staged,
    /// Per-node locks
    Locked,
    /// Single-threaded FIFO
    Sequential,
}

impl From<DisciplineArg> for Discipline {
    fn from(arg: DisciplineArg) -> Self {
        match arg {
            DisciplineArg::Staged => Discipline::Staged,
            DisciplineArg::Locked => Discipline::Locked,
            DisciplineArg::Sequential => Discipline::Sequential,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "max_flow")]
#[command(about = "Maximum flow by concurrent push-relabel")]
struct CliArgs {
    /// Edge list with one `<from> <to> <capacity>` arc per line
    file: PathBuf,

    /// Source node id
    #[arg(allow_negative_numbers = true)]
    source: NodeId,

    /// Sink node id
    #[arg(allow_negative_numbers = true)]
    sink: NodeId,

    /// How discharges are synchronized
    #[arg(value_enum, default_value = "staged")]
    discipline: DisciplineArg,

    /// Worker threads, 0 for one per logical core
    #[arg(default_value_t = 0)]
    threads: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = CliArgs::parse();

    let mut graph: Graph<i64> = edge_list::read_from_file(&args.file)?;

    let mut solver = PushRelabel::new(args.discipline.into());
    solver.num_threads = args.threads;

    let flow = solver.solve(args.source, args.sink, &mut graph)?;
    println!("max flow: {}", flow);
    println!("{:?}", solver.statistics());
    println!("minimum cut: {:?}", graph.minimum_cut(args.source));
    edge_list::write_flow(&graph, io::stdout().lock())?;

    Ok(())
}
