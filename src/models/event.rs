//! Events recognised in the node's output

use serde::{Serialize, Deserialize};

/// Classification of one complete line of node output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogEvent {
    /// A job finished and its results were posted in the given transaction
    JobFinished {
        /// Base58 signature of the transaction that paid out the job
        signature: String,
    },
    /// The node is waiting in a market queue
    QueuePosition {
        /// 1-based position in the queue
        position: u64,
        /// Number of nodes in the queue
        total: u64,
    },
    /// Any other line
    Noise,
}

impl LogEvent {
    /// Signature carried by a job-finished event
    pub fn job_signature(&self) -> Option<&str> {
        match self {
            LogEvent::JobFinished { signature } => Some(signature),
            _ => None,
        }
    }
}
