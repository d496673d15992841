//! Audit channel between staking cycles and the console

use log::{error, info, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::models::audit::AuditEvent;

/// How the audit task renders events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditFormat {
    /// Through the logger
    Log,
    /// One JSON object per line on stdout
    Json,
}

/// Sending half of the audit channel, cloned into every cycle
#[derive(Debug, Clone)]
pub struct AuditSink {
    sender: UnboundedSender<AuditEvent>,
}

/// Create an audit channel
pub fn channel() -> (AuditSink, UnboundedReceiver<AuditEvent>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (AuditSink { sender }, receiver)
}

impl AuditSink {
    /// Never blocks; events are dropped with a warning once the receiver is gone
    pub fn emit(&self, event: AuditEvent) {
        if let Err(e) = self.sender.send(event) {
            warn!("Audit channel closed, dropping {:?}", e.0);
        }
    }
}

/// Human-readable form of an event
pub fn render(event: &AuditEvent) -> String {
    match event {
        AuditEvent::StakingStarted { job_signature } => {
            format!("Staking rewards of job transaction {}", job_signature)
        }
        AuditEvent::StakingSucceeded { job_signature, signature, amount } => format!(
            "Staked {} tokens from job {} in transaction {}",
            amount, job_signature, signature
        ),
        AuditEvent::StakingSkipped { job_signature, amount } => format!(
            "Dry run: {} tokens from job {} were not staked",
            amount, job_signature
        ),
        AuditEvent::NoTokensReceived { job_signature } => {
            format!("No tokens received in job transaction {}", job_signature)
        }
        AuditEvent::StakingFailed { job_signature, reason, message } => format!(
            "Staking rewards of job {} failed ({}): {}",
            job_signature, reason, message
        ),
    }
}

/// Drain the audit channel until every sink is dropped
pub fn spawn_audit_logger(
    mut receiver: UnboundedReceiver<AuditEvent>,
    format: AuditFormat,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            match format {
                AuditFormat::Json => match serde_json::to_string(&event) {
                    Ok(line) => println!("{}", line),
                    Err(e) => error!("Failed to serialize audit event: {}", e),
                },
                AuditFormat::Log => match &event {
                    AuditEvent::StakingFailed { .. } => error!("{}", render(&event)),
                    AuditEvent::NoTokensReceived { .. } | AuditEvent::StakingSkipped { .. } => {
                        warn!("{}", render(&event))
                    }
                    _ => info!("{}", render(&event)),
                },
            }
        }
    })
}
