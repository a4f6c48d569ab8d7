pub mod edge_list;
pub mod maximum_flow;
