//! # Tank-Bench Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # criterion benchmarks of the pure domain code
//! └── src/integration/  # Cross-crate scenarios on the simulated network
//!     ├── barrier_flow.rs      # barriers and traffic capture on live tanks
//!     ├── experiment_flow.rs   # full experiment runs
//!     └── topology_flow.rs     # generated topology → document → network
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p tb-tests
//!
//! # By category
//! cargo test -p tb-tests integration::experiment_flow
//!
//! # Benchmarks
//! cargo bench -p tb-tests
//! ```

pub mod integration;
