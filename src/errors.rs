//! Error handling for the restaking pipeline.
//!
//! Every failure a staking cycle can run into has its own variant so the
//! orchestrator can report a stable reason name for it. Only a broken log
//! stream is fatal to the whole process; everything else ends one cycle.

use thiserror::Error;
use std::fmt;

/// Main error type for the restaker.
#[derive(Error, Debug)]
pub enum StakerError {
    /// The node's output stream could not be read any more.
    #[error("Log stream error: {0}")]
    StreamIo(String),

    /// The stake account (or another required account) does not exist on chain.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// The ledger has no confirmed transaction for the signature (yet).
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    /// The transaction was found but lacks the metadata needed to read it.
    #[error("Transaction malformed: {0}")]
    TransactionMalformed(String),

    /// The authority's token account holds less than the amount to stake.
    #[error("Insufficient funds: need {needed} raw units, have {available}")]
    InsufficientFunds {
        /// Raw units the stake transaction would move.
        needed: u64,
        /// Raw units currently held by the authority's token account.
        available: u64,
    },

    /// A stake transaction was requested for zero tokens.
    #[error("Refusing to stake a zero amount")]
    ZeroAmount,

    /// The stake transaction could not be assembled.
    #[error("Transaction build error: {0}")]
    TransactionBuild(String),

    /// The ledger rejected the stake transaction.
    #[error("Submission rejected: {0}")]
    SubmissionRejected(String),

    /// A token printed by the node is not a valid transaction signature.
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Account data exists but does not decode as the expected layout.
    #[error("Invalid account data: {0}")]
    InvalidAccountData(String),

    /// Summed credits do not fit into a raw `u64` amount.
    #[error("Token amount overflow while summing credits")]
    AmountOverflow,

    /// The balance check and the credited amount disagree on the mint's decimals.
    #[error("Decimals mismatch: amount uses {amount}, balance uses {balance}")]
    DecimalsMismatch {
        amount: u8,
        balance: u8,
    },

    /// Any other RPC failure.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Invalid command line or key material.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the restaker.
pub type StakerResult<T> = Result<T, StakerError>;

impl StakerError {
    /// Stable name of the error kind, used as the reason of a failed cycle.
    pub fn kind(&self) -> &'static str {
        match self {
            StakerError::StreamIo(_) => "StreamIOError",
            StakerError::AccountNotFound(_) => "AccountNotFound",
            StakerError::TransactionNotFound(_) => "TransactionNotFound",
            StakerError::TransactionMalformed(_) => "TransactionMalformed",
            StakerError::InsufficientFunds { .. } => "InsufficientFunds",
            StakerError::ZeroAmount => "ZeroAmount",
            StakerError::TransactionBuild(_) => "TransactionBuild",
            StakerError::SubmissionRejected(_) => "SubmissionRejected",
            StakerError::InvalidSignature(_) => "InvalidSignature",
            StakerError::InvalidAccountData(_) => "InvalidAccountData",
            StakerError::AmountOverflow => "AmountOverflow",
            StakerError::DecimalsMismatch { .. } => "DecimalsMismatch",
            StakerError::Rpc(_) => "RpcError",
            StakerError::Config(_) => "ConfigError",
            StakerError::Io(_) => "IoError",
        }
    }

    /// Whether this error must stop the whole pipeline rather than one cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StakerError::StreamIo(_))
    }
}

/// Context information for errors.
///
/// Records which component was doing what, and optionally for which
/// signature, when a foreign error surfaced.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Job transaction signature being processed, if applicable.
    pub signature: Option<String>,

    /// Component where the error occurred (e.g., "pda_resolver").
    pub component: String,

    /// Operation being performed when the error occurred (e.g., "fetch_stake_account").
    pub operation: String,

    /// Additional context details.
    pub details: Option<String>,
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "In {} while {}", self.component, self.operation)?;
        if let Some(signature) = &self.signature {
            write!(f, " for transaction {}", signature)?;
        }
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

/// Extension trait for adding context to foreign errors.
pub trait ErrorExt<T> {
    /// Add context to an error, classifying it into a `StakerError` variant.
    fn with_context(self, context: ErrorContext) -> StakerResult<T>;

    /// Add component/operation context to an error.
    fn with_simple_context(self, component: &str, operation: &str) -> StakerResult<T>;
}

impl<T, E: std::error::Error + 'static> ErrorExt<T> for Result<T, E> {
    fn with_context(self, context: ErrorContext) -> StakerResult<T> {
        self.map_err(|e| {
            let error_msg = format!("{}: {}", context, e);
            match e.to_string().to_lowercase() {
                s if s.contains("accountnotfound") || s.contains("could not find account") =>
                    StakerError::AccountNotFound(error_msg),
                s if s.contains("insufficient funds") || s.contains("insufficient lamports") =>
                    StakerError::SubmissionRejected(error_msg),
                s if s.contains("simulation failed") || s.contains("custom program error") =>
                    StakerError::SubmissionRejected(error_msg),
                s if s.contains("invalid type: null") =>
                    StakerError::TransactionNotFound(error_msg),
                _ => StakerError::Rpc(error_msg),
            }
        })
    }

    fn with_simple_context(self, component: &str, operation: &str) -> StakerResult<T> {
        self.with_context(ErrorContext {
            signature: None,
            component: component.to_string(),
            operation: operation.to_string(),
            details: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_stream_errors_are_fatal() {
        assert!(StakerError::StreamIo("closed".to_string()).is_fatal());
        assert!(!StakerError::TransactionNotFound("x".to_string()).is_fatal());
        assert!(!StakerError::InsufficientFunds { needed: 2, available: 1 }.is_fatal());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(StakerError::TransactionNotFound("x".into()).kind(), "TransactionNotFound");
        assert_eq!(StakerError::AccountNotFound("x".into()).kind(), "AccountNotFound");
        assert_eq!(StakerError::SubmissionRejected("x".into()).kind(), "SubmissionRejected");
    }

    #[test]
    fn test_context_classification() {
        let io: Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            "Transaction simulation failed: Error processing Instruction 1: custom program error: 0x1",
        ));
        let err = io.with_simple_context("stake_builder", "send_and_confirm").unwrap_err();
        assert!(matches!(err, StakerError::SubmissionRejected(_)));
        assert!(err.to_string().contains("In stake_builder while send_and_confirm"));

        let io: Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            "connection refused",
        ));
        let err = io.with_simple_context("ledger", "get_account").unwrap_err();
        assert!(matches!(err, StakerError::Rpc(_)));
    }

    #[test]
    fn test_null_transaction_result_is_not_found() {
        use solana_client::client_error::ClientError;
        use solana_transaction_status::EncodedConfirmedTransactionWithStatusMeta;

        // what the client reports for a signature the ledger has not indexed
        let null: Result<EncodedConfirmedTransactionWithStatusMeta, ClientError> =
            serde_json::from_value(serde_json::Value::Null).map_err(ClientError::from);
        let err = null
            .with_context(ErrorContext {
                signature: Some("5h3K".to_string()),
                component: "rpc_ledger".to_string(),
                operation: "get_transaction".to_string(),
                details: Some("confirmed".to_string()),
            })
            .unwrap_err();

        assert!(matches!(err, StakerError::TransactionNotFound(_)));
        assert!(err.to_string().contains("for transaction 5h3K (confirmed)"));
    }
}
