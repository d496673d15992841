//! Data models for the restaker

pub mod amount;
pub mod audit;
pub mod event;
pub mod stake_account;
pub mod transaction;

pub use self::amount::TokenAmount;
pub use self::audit::AuditEvent;
pub use self::event::LogEvent;
pub use self::stake_account::StakeAccount;
pub use self::transaction::ResolvedTransaction;
