//! Command line configuration

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use solana_keypair::Keypair;
use solana_pubkey::Pubkey;

use crate::constants::staking::{DEFAULT_DECIMALS, DEFAULT_RPC_URL, STAKING_MINT, STAKING_PROGRAM_ID};
use crate::errors::{StakerError, StakerResult};
use crate::ledger::RetryPolicy;
use crate::pipeline::dedup::DEFAULT_DEDUP_CAPACITY;

/// Environment variable overriding the default RPC URL
pub const RPC_URL_ENV: &str = "SOLANA_RPC_URL";

/// Environment variable overriding the default keypair path
pub const KEYPAIR_ENV: &str = "RESTAKE_KEYPAIR";

/// Runtime configuration of the restaker
#[derive(Debug, Clone, PartialEq)]
pub struct StakerConfig {
    pub rpc_url: String,
    pub keypair_path: PathBuf,
    pub program_id: Pubkey,
    pub mint: Pubkey,
    /// Decimals assumed when a payout carries no balance metadata
    pub default_decimals: u8,
    /// Backoff for payout transactions the ledger has not indexed yet
    pub retry: RetryPolicy,
    pub dry_run: bool,
    /// Print audit events as JSON lines instead of log lines
    pub json_audit: bool,
    pub dedup_capacity: usize,
    pub verbose: bool,
}

/// What the command line asked for
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(StakerConfig),
    Help,
    Version,
}

impl Default for StakerConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            keypair_path: default_keypair_path(),
            program_id: STAKING_PROGRAM_ID,
            mint: STAKING_MINT,
            default_decimals: DEFAULT_DECIMALS,
            retry: RetryPolicy::default(),
            dry_run: false,
            json_audit: false,
            dedup_capacity: DEFAULT_DEDUP_CAPACITY,
            verbose: false,
        }
    }
}

/// `~/.nosana/nosana_key.json`, where the node keeps its key
pub fn default_keypair_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".nosana").join("nosana_key.json")
}

impl StakerConfig {
    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(RPC_URL_ENV) {
            config.rpc_url = url;
        }
        if let Ok(path) = std::env::var(KEYPAIR_ENV) {
            config.keypair_path = PathBuf::from(path);
        }
        config
    }
}

/// Parse arguments (without the program name) on top of `base`
pub fn parse_args<I, S>(args: I, base: StakerConfig) -> StakerResult<Command>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    let mut config = base;

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = || {
            args.get(i + 1)
                .cloned()
                .ok_or_else(|| StakerError::Config(format!("Missing value for {}", flag)))
        };

        match flag {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-V" => return Ok(Command::Version),
            "--rpc-url" | "-u" => {
                config.rpc_url = value()?;
                i += 2;
            }
            "--keypair" | "-k" => {
                config.keypair_path = PathBuf::from(value()?);
                i += 2;
            }
            "--program-id" => {
                config.program_id = parse_pubkey(flag, &value()?)?;
                i += 2;
            }
            "--mint" => {
                config.mint = parse_pubkey(flag, &value()?)?;
                i += 2;
            }
            "--decimals" => {
                config.default_decimals = parse_number(flag, &value()?)?;
                i += 2;
            }
            "--retries" => {
                // retries on top of the first attempt
                let retries: u32 = parse_number(flag, &value()?)?;
                config.retry.max_attempts = retries.saturating_add(1);
                i += 2;
            }
            "--retry-delay-ms" => {
                config.retry.initial_delay = Duration::from_millis(parse_number(flag, &value()?)?);
                i += 2;
            }
            "--dedup-capacity" => {
                config.dedup_capacity = parse_number(flag, &value()?)?;
                i += 2;
            }
            "--dry-run" => {
                config.dry_run = true;
                i += 1;
            }
            "--json" => {
                config.json_audit = true;
                i += 1;
            }
            "--verbose" | "-v" => {
                config.verbose = true;
                i += 1;
            }
            other => return Err(StakerError::Config(format!("Unknown argument: {}", other))),
        }
    }

    Ok(Command::Run(config))
}

fn parse_pubkey(flag: &str, value: &str) -> StakerResult<Pubkey> {
    Pubkey::from_str(value)
        .map_err(|e| StakerError::Config(format!("Invalid address for {}: {} ({})", flag, value, e)))
}

fn parse_number<T: FromStr>(flag: &str, value: &str) -> StakerResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| StakerError::Config(format!("Invalid value for {}: {} ({})", flag, value, e)))
}

/// Load the authority keypair. The file must exist; there is no fallback.
pub fn load_authority(path: &Path) -> StakerResult<Keypair> {
    if !path.exists() {
        return Err(StakerError::Config(format!(
            "Keypair file not found: {}",
            path.display()
        )));
    }
    let contents = std::fs::read_to_string(path)?;
    let bytes: Vec<u8> = serde_json::from_str(contents.trim()).map_err(|e| {
        StakerError::Config(format!("Keypair {} is not a JSON byte array: {}", path.display(), e))
    })?;
    Keypair::from_bytes(&bytes).map_err(|e| {
        StakerError::Config(format!("Invalid keypair {}: {}", path.display(), e))
    })
}

/// Usage text
pub fn usage(program: &str) -> String {
    format!(
        "Usage:
  <node command> | {program} [OPTIONS]

Reads the node's output on stdin and stakes the tokens paid for every finished job.

Options:
  --rpc-url, -u URL        RPC endpoint (default: ${RPC_URL_ENV} or {DEFAULT_RPC_URL})
  --keypair, -k PATH       Authority keypair (default: ${KEYPAIR_ENV} or ~/.nosana/nosana_key.json)
  --program-id ADDRESS     Staking program
  --mint ADDRESS           Staked token mint
  --decimals N             Mint decimals when a payout carries none (default: {DEFAULT_DECIMALS})
  --retries N              Retries for payouts not yet indexed (default: 4)
  --retry-delay-ms MS      First retry delay, doubled each retry (default: 500)
  --dedup-capacity N       Job signatures remembered to skip repeats, 0 disables (default: {DEFAULT_DEDUP_CAPACITY})
  --dry-run                Build and check stake transactions without sending them
  --json                   Print audit events as JSON lines
  --verbose, -v            Debug logging
  --version, -V            Show version information
  --help, -h               Show this help"
    )
}
