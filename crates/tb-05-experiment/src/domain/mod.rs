//! Pure experiment logic: funding arithmetic, transaction shape, broadcast
//! order and aggregation.

mod aggregate;
mod funding;
mod phase;
mod schedule;
mod transaction;

pub use aggregate::{ExperimentAggregate, ExperimentReport, IterationSummary};
pub use funding::{blocks_to_mine, eligible_utxos, COINBASE_MATURITY};
pub use phase::Phase;
pub use schedule::BroadcastSchedule;
pub use transaction::{split_outputs, GeneratedTransaction, TransactionPlan};
