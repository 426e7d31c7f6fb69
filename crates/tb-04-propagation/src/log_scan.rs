//! Recognition of the two log lines that time a transaction on one tank.
//!
//! ```text
//! 2024-05-01T10:00:00.123456Z [net] got inv: wtx 5f3a... peer=3
//! 2024-05-01T10:00:00.201337Z [mempool] AcceptToMemoryPool: peer=3: accepted 9c1d... (wtxid=5f3a...)
//! ```

use chrono::NaiveDateTime;
use shared_types::{TankId, Timestamp};

use crate::domain::{MarkedTransaction, PropagationRecord};

/// Format of the leading timestamp token.
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Parse the first whitespace-separated token as a UTC timestamp.
pub fn parse_timestamp(line: &str) -> Option<Timestamp> {
    let token = line.split_whitespace().next()?;
    NaiveDateTime::parse_from_str(token, LOG_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Exact substrings identifying the marked transaction's log lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogPatterns {
    pub announcement: String,
    pub acceptance: String,
}

impl LogPatterns {
    pub fn for_transaction(marked: &MarkedTransaction) -> Self {
        Self {
            announcement: format!("got inv: wtx {}", marked.wtxid),
            acceptance: format!("accepted {} (wtxid={})", marked.txid, marked.wtxid),
        }
    }
}

/// Builds one tank's record from its log lines.
#[derive(Debug)]
pub struct LogScanner {
    patterns: LogPatterns,
    record: PropagationRecord,
}

impl LogScanner {
    pub fn new(tank: TankId, patterns: LogPatterns) -> Self {
        Self {
            patterns,
            record: PropagationRecord::empty(tank),
        }
    }

    /// Consume one line. Returns `true` once both timestamps are known.
    ///
    /// Only the first announcement counts; lines without a parseable
    /// timestamp are ignored.
    pub fn feed(&mut self, line: &str) -> bool {
        if self.record.accepted.is_none() && line.contains(&self.patterns.acceptance) {
            self.record.accepted = parse_timestamp(line);
        } else if self.record.first_announce.is_none()
            && line.contains(&self.patterns.announcement)
        {
            self.record.first_announce = parse_timestamp(line);
        }
        self.is_done()
    }

    pub fn is_done(&self) -> bool {
        self.record.is_complete()
    }

    pub fn into_record(self) -> PropagationRecord {
        self.record
    }
}
