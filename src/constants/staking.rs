//! Staking program and node output constants

use solana_pubkey::{pubkey, Pubkey};

/// Staking program that owns the stake accounts and vaults.
pub const STAKING_PROGRAM_ID: Pubkey = pubkey!("nosScmHY2uR24Zh751PmGj9ww9QRNHewh9H59AfrTJE");

/// Token paid out for finished jobs and staked back into the vault.
pub const STAKING_MINT: Pubkey = pubkey!("nosXBVoaCTtYdLvKY6Csb4AC8JCdQKKAaWYtx2ZMoo7");

/// Decimal exponent of the staking mint when chain data does not say otherwise.
pub const DEFAULT_DECIMALS: u8 = 6;

/// Seed tag of the stake account PDA: `[STAKE_SEED, mint, authority]`.
pub const STAKE_SEED: &[u8] = b"stake";

/// Seed tag of the vault PDA: `[VAULT_SEED, mint, authority]`.
pub const VAULT_SEED: &[u8] = b"vault";

/// Default cluster endpoint.
pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Upper bound on a partial (unterminated) line held by the scanner.
pub const MAX_BUFFERED_BYTES: usize = 5 * 1024 * 1024;

/// Largest serialized transaction the cluster accepts.
pub const PACKET_DATA_SIZE: usize = 1232;

/// Marker printed by the node once a job's results are posted.
pub const JOB_FINISHED_MARKER: &str = "Job finished";

/// Marker printed by the node while it waits in a market queue.
pub const QUEUED_MARKER: &str = "QUEUED";

/// Text between the queued marker and the `N/M` position.
pub const QUEUE_POSITION_MARKER: &str = "at position";

/// SPL Token-2022 program, accepted alongside the classic token program.
pub const TOKEN_2022_PROGRAM_ID: Pubkey = pubkey!("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");
