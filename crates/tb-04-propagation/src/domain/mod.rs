//! # Domain Layer for Propagation Tracing

mod estimate;
mod record;

pub use estimate::*;
pub use record::*;
