//! Cross-crate scenarios. Every test drives the real barrier, traffic,
//! tracing and experiment code against an in-process [`tb_sim::SimNetwork`].

pub mod barrier_flow;
pub mod experiment_flow;
pub mod fixtures;
pub mod topology_flow;
