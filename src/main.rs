use anyhow::Result;
use solana_auto_restake::config::{self, Command, StakerConfig};
use solana_auto_restake::ledger::{RetryingLedger, RpcLedger};
use solana_auto_restake::pipeline::{audit, AuditFormat, Pipeline, StakingContext};
use solana_auto_restake::scanner::LogEventScanner;
use env_logger::Builder;
use log::{LevelFilter, error, info};
use std::io::Write;
use std::sync::Arc;

// Simple CLI without clap
#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("solana-auto-restake");

    let command = match config::parse_args(args.iter().skip(1).cloned(), StakerConfig::from_env()) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("\n{}", config::usage(program));
            std::process::exit(2);
        }
    };

    let config = match command {
        Command::Version => {
            println!("Solana Auto Restake v{}", solana_auto_restake::VERSION);
            return Ok(());
        }
        Command::Help => {
            println!("Solana Auto Restake v{}", solana_auto_restake::VERSION);
            println!("\n{}", config::usage(program));
            return Ok(());
        }
        Command::Run(config) => config,
    };

    // Initialize logger
    Builder::new()
        .format(|buf, record| {
            let secs = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default();
            writeln!(buf, "{} [{}] - {}", secs, record.level(), record.args())
        })
        .filter(None, if config.verbose { LevelFilter::Debug } else { LevelFilter::Info })
        .parse_default_env()
        .init();

    let authority = config::load_authority(&config.keypair_path)?;
    let rpc = RpcLedger::new(&config.rpc_url);
    info!("RPC endpoint: {}", rpc.url());
    let ledger = RetryingLedger::new(rpc, config.retry);

    let ctx = StakingContext::new(ledger, authority)
        .with_program_id(config.program_id)
        .with_mint(config.mint, config.default_decimals)
        .with_dry_run(config.dry_run);

    info!("Restaking for authority {}", ctx.authority_pubkey());
    if config.dry_run {
        info!("Dry run: stake transactions will not be sent");
    }

    let (sink, receiver) = audit::channel();
    let format = if config.json_audit { AuditFormat::Json } else { AuditFormat::Log };
    let audit_task = audit::spawn_audit_logger(receiver, format);

    let mut pipeline = Pipeline::new(Arc::new(ctx), sink).with_dedup_capacity(config.dedup_capacity);
    let result = pipeline.run(LogEventScanner::new(tokio::io::stdin())).await;

    // Last sink goes away with the pipeline, which lets the audit task finish
    drop(pipeline);
    if let Err(e) = audit_task.await {
        error!("Audit task ended abnormally: {}", e);
    }

    let stats = result?;
    info!(
        "Done: {} staking cycle(s), {} duplicate job(s) skipped, {} queue update(s)",
        stats.cycles_started, stats.duplicates_skipped, stats.queue_updates
    );

    Ok(())
}
