//! Staking program client: address resolution and the restake transaction

pub mod builder;
pub mod pda;

pub use self::builder::{topup_instruction, StakeTransactionBuilder, Submission};
pub use self::pda::{derive_stake_address, derive_vault_address, PdaResolver, StakeAddresses};
