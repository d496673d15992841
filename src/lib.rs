//! A library for restaking compute node job rewards on Solana
//!
//! This crate watches the output of a compute node for finished jobs, reads
//! the payout each job transaction credited to the node's authority and
//! stakes it into the authority's vault with a single `topup` transaction.

pub mod config;
pub mod constants;
pub mod errors;
pub mod extractor;
pub mod ledger;
pub mod models;
pub mod pipeline;
pub mod scanner;
pub mod stake;
pub mod utils;

pub use errors::{StakerError, StakerResult};
pub use ledger::{LedgerClient, RetryPolicy, RetryingLedger, RpcLedger};
pub use models::{AuditEvent, LogEvent, TokenAmount};
pub use pipeline::{Pipeline, PipelineStats, StakingContext};
pub use scanner::LogEventScanner;

/// Version of the restaker
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
