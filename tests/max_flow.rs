use parallel_maximum_flow::edge_list;
use parallel_maximum_flow::maximum_flow::{Dinic, Discipline, Error, Graph, NodeId, PushRelabel};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use rstest::rstest;
use std::collections::HashSet;
use std::path::PathBuf;

fn build(num_nodes: NodeId, arcs: &[(NodeId, NodeId, i64)]) -> Graph<i64> {
    let mut graph = Graph::default();
    graph.add_nodes(1..=num_nodes).unwrap();
    for &(u, v, c) in arcs {
        graph.add_edge(u, v, c).unwrap();
    }
    graph
}

fn solver(discipline: Discipline, num_threads: usize) -> PushRelabel {
    let mut solver = PushRelabel::new(discipline);
    solver.num_threads = num_threads;
    solver.verify = true;
    solver
}

fn cut_capacity(graph: &Graph<i64>, source: NodeId) -> i64 {
    let side: HashSet<NodeId> = graph.minimum_cut(source).into_iter().collect();
    let ids: Vec<NodeId> = graph.nodes().map(|node| node.id).collect();
    graph.edges().filter(|e| side.contains(&ids[e.from]) && !side.contains(&ids[e.to])).map(|e| e.upper).sum()
}

fn random_graph(rng: &mut Pcg64Mcg, num_nodes: NodeId, num_arcs: usize, max_capacity: i64) -> Graph<i64> {
    let arcs: Vec<(NodeId, NodeId, i64)> = (0..num_arcs)
        .map(|_| (rng.random_range(1..=num_nodes), rng.random_range(1..=num_nodes), rng.random_range(0..=max_capacity)))
        .collect();
    build(num_nodes, &arcs)
}

fn data_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("data").join(name)
}

#[rstest]
#[case(2, &[(1, 2, 3)], 3)]
#[case(3, &[(1, 2, 2), (2, 3, 2), (1, 3, 1)], 3)]
#[case(2, &[(1, 2, 1), (2, 1, 1)], 1)]
#[case(4, &[(1, 2, 10), (1, 3, 10), (2, 4, 10), (3, 4, 10)], 20)]
#[case(4, &[(1, 2, 5), (3, 4, 5)], 0)]
#[case(2, &[], 0)]
#[case(3, &[(1, 2, 4), (2, 2, 9), (2, 3, 4)], 4)]
#[case(4, &[(1, 2, 3), (2, 3, 0), (3, 4, 3)], 0)]
fn small_graphs(
    #[case] num_nodes: NodeId,
    #[case] arcs: &[(NodeId, NodeId, i64)],
    #[case] expected: i64,
    #[values(Discipline::Staged, Discipline::Locked, Discipline::Sequential)] discipline: Discipline,
    #[values(1, 4)] num_threads: usize,
) {
    let mut graph = build(num_nodes, arcs);
    assert_eq!(solver(discipline, num_threads).solve(1, num_nodes, &mut graph).unwrap(), expected);

    assert!(graph.edges().all(|e| e.carried_flow() <= e.upper));
    assert!(graph.nodes().filter(|node| node.id != 1 && node.id != num_nodes).all(|node| node.excess == 0));
    assert_eq!(graph.flow_value(1), Some(expected));
    assert_eq!(cut_capacity(&graph, 1), expected);
}

#[rstest]
fn saturated_edges_reach_the_sink(#[values(Discipline::Staged, Discipline::Locked, Discipline::Sequential)] discipline: Discipline) {
    let mut graph = build(4, &[(1, 2, 10), (1, 3, 10), (2, 4, 10), (3, 4, 10)]);
    solver(discipline, 2).solve(1, 4, &mut graph).unwrap();

    for (u, v) in [(1, 2), (1, 3), (2, 4), (3, 4)] {
        assert_eq!(graph.find_edge(u, v).unwrap().carried_flow(), 10);
    }
    assert_eq!(graph.minimum_cut(1), vec![1]);
}

#[rstest]
fn sixty_four_bit_capacities(#[values(Discipline::Staged, Discipline::Locked, Discipline::Sequential)] discipline: Discipline) {
    let c = 4_000_000_000_000_000_000;
    let mut graph = build(4, &[(1, 2, c), (1, 3, c), (2, 4, c), (3, 4, c), (2, 3, c)]);
    assert_eq!(solver(discipline, 3).solve(1, 4, &mut graph).unwrap(), 2 * c);
}

#[rstest]
fn source_arcs_at_the_type_limit(#[values(Discipline::Staged, Discipline::Locked, Discipline::Sequential)] discipline: Discipline) {
    let max = i64::MAX;
    let mut graph = build(5, &[(1, 2, max), (1, 3, max), (1, 4, max), (2, 5, 1), (3, 5, 1), (4, 5, 1)]);

    assert_eq!(solver(discipline, 3).solve(1, 5, &mut graph).unwrap(), 3);
    assert_eq!(graph.excess(1), Some(-3));
    assert_eq!(graph.flow_value(1), Some(3));
}

#[rstest]
fn super_source_arcs_at_the_type_limit(#[values(Discipline::Staged, Discipline::Locked, Discipline::Sequential)] discipline: Discipline) {
    let max = i64::MAX;
    let mut graph = build(5, &[(1, 3, max), (2, 4, max), (3, 5, 1), (4, 5, 1)]);
    assert_eq!(solver(discipline, 2).solve_multi(&[1, 2], &[5], &mut graph).unwrap(), 2);
}

#[test]
fn narrow_flow_types() {
    let mut graph = Graph::<i32>::default();
    graph.add_nodes([10, 20, 30]).unwrap();
    graph.add_edge(10, 20, i32::MAX).unwrap();
    graph.add_edge(20, 30, 1_000).unwrap();
    assert_eq!(graph.get_max_flow(10, 30).unwrap(), 1_000);

    let mut graph = Graph::<isize>::default();
    graph.add_nodes([-1, 0]).unwrap();
    graph.add_edge(-1, 0, 6).unwrap();
    assert_eq!(graph.get_max_flow(-1, 0).unwrap(), 6);
}

#[rstest]
#[case("clrs.txt", 1, 6, 23)]
#[case("wide.txt", 1, 3, 1_000_000_000_004)]
fn edge_list_files(
    #[case] name: &str,
    #[case] source: NodeId,
    #[case] sink: NodeId,
    #[case] expected: i64,
    #[values(Discipline::Staged, Discipline::Locked, Discipline::Sequential)] discipline: Discipline,
) {
    let mut graph: Graph<i64> = edge_list::read_from_file(data_file(name)).unwrap();
    assert_eq!(solver(discipline, 4).solve(source, sink, &mut graph).unwrap(), expected);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
#[case(4)]
fn random_graphs_agree_with_dinic(#[case] seed: u64) {
    let mut rng = Pcg64Mcg::seed_from_u64(seed);

    for _ in 0..25 {
        let num_nodes = rng.random_range(2..=12);
        let num_arcs = rng.random_range(0..=40);
        let graph = random_graph(&mut rng, num_nodes, num_arcs, 20);

        let mut reference = graph.clone();
        let expected = Dinic::default().solve(1, num_nodes, &mut reference).unwrap();

        for discipline in [Discipline::Staged, Discipline::Locked, Discipline::Sequential] {
            let mut graph = graph.clone();
            let value = solver(discipline, 4).solve(1, num_nodes, &mut graph).unwrap();
            assert_eq!(value, expected, "{:?} on {} nodes, {} arcs", discipline, num_nodes, num_arcs);
            assert_eq!(cut_capacity(&graph, 1), expected);
        }
    }
}

#[rstest]
#[case(5)]
#[case(6)]
fn staged_rounds_stay_within_quadratic_bound(#[case] seed: u64) {
    let mut rng = Pcg64Mcg::seed_from_u64(seed);

    for _ in 0..20 {
        let num_nodes = rng.random_range(2..=16);
        let mut graph = random_graph(&mut rng, num_nodes, 3 * num_nodes as usize, 50);

        let mut solver = solver(Discipline::Staged, 4);
        solver.solve(1, num_nodes, &mut graph).unwrap();

        let n = graph.num_nodes();
        assert!(solver.statistics().rounds <= 4 * n * n, "{} rounds on {} nodes", solver.statistics().rounds, n);
        assert!(graph.nodes().all(|node| node.height < 2 * n));
    }
}

#[test]
fn disciplines_agree_on_a_dense_graph() {
    let mut rng = Pcg64Mcg::seed_from_u64(42);
    let graph = random_graph(&mut rng, 40, 600, 1_000);

    let values: Vec<i64> = [Discipline::Staged, Discipline::Locked, Discipline::Sequential]
        .into_iter()
        .map(|discipline| solver(discipline, 8).solve(1, 40, &mut graph.clone()).unwrap())
        .collect();
    assert_eq!(values[0], values[1]);
    assert_eq!(values[1], values[2]);
}

#[rstest]
fn solving_again_keeps_the_flow(#[values(Discipline::Staged, Discipline::Locked, Discipline::Sequential)] discipline: Discipline) {
    let mut graph = build(4, &[(1, 2, 3), (1, 3, 2), (2, 3, 5), (2, 4, 2), (3, 4, 3)]);
    let mut solver = solver(discipline, 2);
    assert_eq!(solver.solve(1, 4, &mut graph).unwrap(), 5);

    let flows: Vec<i64> = graph.edges().map(|e| e.flow).collect();
    assert_eq!(solver.solve(1, 4, &mut graph).unwrap(), 5);
    assert_eq!(graph.edges().map(|e| e.flow).collect::<Vec<_>>(), flows);
    assert_eq!(solver.statistics().pushes, 0);
}

#[test]
fn capacity_added_after_a_solve_is_used_by_the_next_one() {
    let mut graph = build(3, &[(1, 2, 4), (2, 3, 2)]);
    assert_eq!(graph.get_max_flow(1, 3).unwrap(), 2);

    graph.add_edge(2, 3, 1).unwrap();
    graph.add_edge(1, 3, 5).unwrap();
    assert_eq!(graph.get_max_flow(1, 3).unwrap(), 8);
}

#[rstest]
fn multiple_sources_and_sinks(#[values(Discipline::Staged, Discipline::Locked, Discipline::Sequential)] discipline: Discipline) {
    // 1 and 2 feed a shared hub 3 that drains into 4 and 5
    let mut graph = build(5, &[(1, 3, 4), (2, 3, 6), (3, 4, 3), (3, 5, 5)]);
    let value = solver(discipline, 2).solve_multi(&[1, 2], &[4, 5], &mut graph).unwrap();
    assert_eq!(value, 8);
    assert_eq!(graph.num_nodes(), 7);
}

#[test]
fn invalid_requests_leave_the_graph_untouched() {
    let mut graph = build(3, &[(1, 2, 1), (2, 3, 1)]);
    let before: Vec<i64> = graph.edges().map(|e| e.flow).collect();

    assert!(matches!(graph.get_max_flow(2, 2), Err(Error::InvalidEndpoint(_))));
    assert!(matches!(graph.get_max_flow(1, 7), Err(Error::InvalidEndpoint(_))));
    assert!(matches!(PushRelabel::default().solve_multi(&[1], &[1, 3], &mut graph), Err(Error::InvalidEndpoint(_))));

    assert_eq!(graph.edges().map(|e| e.flow).collect::<Vec<_>>(), before);
    assert_eq!(graph.num_nodes(), 3);
}

#[test]
fn unknown_nodes_are_reported_when_adding_edges() {
    let mut graph = build(2, &[]);
    assert!(matches!(graph.add_edge(1, 3, 1), Err(Error::UnknownNode(3))));
    assert!(matches!(graph.add_node(2), Err(Error::DuplicateNode(2))));
}
