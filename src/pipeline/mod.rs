//! Orchestration of scanning and staking
//!
//! The scanner runs on the caller's task. Every new job-finished event
//! spawns an independent staking cycle, so a slow ledger lookup never holds
//! up scanning or other cycles. Cycles finish in no particular order.

pub mod audit;
pub mod context;
pub mod dedup;

use std::sync::Arc;
use log::{debug, error, info, warn};
use tokio::io::AsyncRead;
use tokio::task::JoinSet;

use crate::errors::StakerResult;
use crate::extractor;
use crate::ledger::{LedgerClient, TransactionResolver};
use crate::models::amount::TokenAmount;
use crate::models::audit::AuditEvent;
use crate::models::event::LogEvent;
use crate::scanner::LogEventScanner;
use crate::stake::{PdaResolver, StakeTransactionBuilder, Submission};

pub use self::audit::{AuditFormat, AuditSink};
pub use self::context::StakingContext;
pub use self::dedup::RecentSignatures;

/// How a cycle that did not fail ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Tokens were staked in the given transaction
    Staked {
        signature: String,
        amount: TokenAmount,
    },
    /// Dry run: the stake transaction was built but not sent
    DryRun {
        amount: TokenAmount,
    },
    /// The job transaction credited nothing to the authority
    NoTokens,
}

/// Counters for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub cycles_started: usize,
    pub duplicates_skipped: usize,
    pub queue_updates: usize,
}

/// Resolve, extract and stake for one finished job.
///
/// The payout transaction and the stake addresses are looked up
/// concurrently. A zero credit ends the cycle without a transaction.
pub async fn run_cycle<L: LedgerClient>(
    ctx: &StakingContext<L>,
    job_signature: &str,
) -> StakerResult<CycleOutcome> {
    let authority = ctx.authority_pubkey();
    let resolver = TransactionResolver::new(&ctx.ledger);
    let pda = PdaResolver::new(&ctx.ledger, ctx.program_id);

    let (transaction, addresses) = tokio::try_join!(
        resolver.resolve(job_signature),
        pda.resolve(&authority, &ctx.mint)
    )?;

    let destination = ctx.authority_token_account();
    let amount = extractor::extract(&transaction, &destination, ctx.default_decimals)?;
    if amount.is_zero() {
        return Ok(CycleOutcome::NoTokens);
    }
    info!("Job {} paid {} tokens", job_signature, amount);

    let builder = StakeTransactionBuilder::new(&ctx.ledger, &ctx.authority, ctx.program_id, ctx.mint)
        .dry_run(ctx.dry_run);
    match builder.build_and_submit(amount, &addresses).await? {
        Submission::Confirmed(signature) => Ok(CycleOutcome::Staked {
            signature: signature.to_string(),
            amount,
        }),
        Submission::DryRun { .. } => Ok(CycleOutcome::DryRun { amount }),
    }
}

/// Run a cycle and report exactly one terminal audit event for it
pub async fn stake_and_report<L: LedgerClient>(
    ctx: Arc<StakingContext<L>>,
    audit: AuditSink,
    job_signature: String,
) {
    audit.emit(AuditEvent::StakingStarted {
        job_signature: job_signature.clone(),
    });

    let event = match run_cycle(&ctx, &job_signature).await {
        Ok(CycleOutcome::Staked { signature, amount }) => AuditEvent::StakingSucceeded {
            job_signature,
            signature,
            amount,
        },
        Ok(CycleOutcome::DryRun { amount }) => AuditEvent::StakingSkipped {
            job_signature,
            amount,
        },
        Ok(CycleOutcome::NoTokens) => AuditEvent::NoTokensReceived { job_signature },
        Err(e) => AuditEvent::StakingFailed {
            job_signature,
            reason: e.kind().to_string(),
            message: e.to_string(),
        },
    };
    audit.emit(event);
}

/// Scanner-to-staking orchestrator
pub struct Pipeline<L> {
    ctx: Arc<StakingContext<L>>,
    audit: AuditSink,
    recent: RecentSignatures,
}

impl<L: LedgerClient + 'static> Pipeline<L> {
    pub fn new(ctx: Arc<StakingContext<L>>, audit: AuditSink) -> Self {
        Self {
            ctx,
            audit,
            recent: RecentSignatures::default(),
        }
    }

    /// Remember this many job signatures for duplicate suppression
    pub fn with_dedup_capacity(mut self, capacity: usize) -> Self {
        self.recent = RecentSignatures::new(capacity);
        self
    }

    /// Consume the scanner until the stream ends or breaks.
    ///
    /// Cycles still in flight are awaited before returning, so each of them
    /// reports its terminal event. A broken stream is returned as an error
    /// after that; failed cycles never are.
    pub async fn run<R: AsyncRead + Unpin>(
        &mut self,
        mut scanner: LogEventScanner<R>,
    ) -> StakerResult<PipelineStats> {
        let mut stats = PipelineStats::default();
        let mut cycles = JoinSet::new();

        let result = loop {
            while let Some(joined) = cycles.try_join_next() {
                report_join(joined);
            }

            match scanner.next_event().await {
                Ok(Some(LogEvent::JobFinished { signature })) => {
                    if !self.recent.insert(&signature) {
                        debug!("Job transaction {} already handled, skipping", signature);
                        stats.duplicates_skipped += 1;
                        continue;
                    }
                    info!("Job finished in transaction {}", signature);
                    stats.cycles_started += 1;
                    cycles.spawn(stake_and_report(
                        Arc::clone(&self.ctx),
                        self.audit.clone(),
                        signature,
                    ));
                }
                Ok(Some(LogEvent::QueuePosition { position, total })) => {
                    stats.queue_updates += 1;
                    info!("Node queued at position {}/{}", position, total);
                }
                Ok(Some(LogEvent::Noise)) => {}
                Ok(None) => {
                    info!("Node output ended");
                    break Ok(());
                }
                Err(e) => {
                    error!("Node output stream broke: {}", e);
                    break Err(e);
                }
            }
        };

        if !cycles.is_empty() {
            info!("Waiting for {} staking cycle(s) in flight", cycles.len());
        }
        while let Some(joined) = cycles.join_next().await {
            report_join(joined);
        }

        result.map(|_| stats)
    }
}

fn report_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        warn!("Staking cycle task ended abnormally: {}", e);
    }
}
