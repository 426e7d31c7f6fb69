//! # Bench Runtime
//!
//! Library half of the `bench-runtime` binary, exposed for tests.
//!
//! - `cli` - command line and its mapping onto [`tb_05_experiment::ExperimentConfig`]
//! - `config` - TOML network descriptor of a deployed network
//! - `runtime` - network source selection and the run itself

pub mod cli;
pub mod config;
pub mod runtime;

pub use cli::Args;
pub use config::{ConfigError, NetworkDescriptor, TankEntry};
pub use runtime::BenchRuntime;
