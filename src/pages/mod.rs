pub mod case_graph;
pub mod home;
pub mod not_found;
