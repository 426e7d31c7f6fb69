//! Pending-set record queries.

use async_trait::async_trait;
use shared_types::{NodeError, Tank};
use tracing::{debug, warn};

use super::{released, PropagationTracer, TraceRound};
use crate::domain::{MarkedTransaction, PropagationRecord};
use crate::errors::TraceError;

/// RPC code of a transaction missing from the pending set.
const NOT_IN_PENDING_SET: i64 = -5;

/// Reads `first_announce_time` and `accepted_time` from each tank's record
/// of the marked transaction once the round is released.
///
/// A tank that never accepted the marked transaction (its duplicate filter
/// dropped the relay) yields an empty record; transport failures stay fatal.
#[derive(Clone, Copy, Debug, Default)]
pub struct StateQueryTracer;

#[async_trait]
impl PropagationTracer for StateQueryTracer {
    fn name(&self) -> &'static str {
        "state"
    }

    async fn arm(
        &self,
        tanks: &[Tank],
        marked: &MarkedTransaction,
    ) -> Result<TraceRound, TraceError> {
        let mut round = TraceRound::new();
        for tank in tanks {
            let tank = tank.clone();
            let txid = marked.txid.clone();
            let gate = round.gate();
            round.spawn(async move {
                released(gate).await;
                match tank.handle.pending_entry(&txid).await {
                    Ok(entry) => {
                        debug!(tank = %tank.id, ?entry, "Pending entry read");
                        Ok(PropagationRecord::from_entry(tank.id, entry))
                    }
                    Err(NodeError::Rpc { code, .. }) if code == NOT_IN_PENDING_SET => {
                        warn!(tank = %tank.id, %txid, "Marked transaction not in pending set");
                        Ok(PropagationRecord::empty(tank.id))
                    }
                    Err(source) => Err(TraceError::Node {
                        tank: tank.id,
                        source,
                    }),
                }
            });
        }
        Ok(round)
    }
}
