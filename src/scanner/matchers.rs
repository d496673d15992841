//! Line classifiers for node output
//!
//! Each matcher is a pure function from one complete line to an optional
//! event. `classify` tries them in order and the first match wins.

use crate::constants::staking::{JOB_FINISHED_MARKER, QUEUED_MARKER, QUEUE_POSITION_MARKER};
use crate::models::event::LogEvent;

/// A pure line matcher
pub type Matcher = fn(&str) -> Option<LogEvent>;

/// Matchers in priority order
pub const MATCHERS: &[Matcher] = &[match_job_finished, match_queue_position];

/// Classify a complete line of node output
pub fn classify(line: &str) -> LogEvent {
    let clean = strip_ansi(line);
    MATCHERS
        .iter()
        .find_map(|matcher| matcher(&clean))
        .unwrap_or(LogEvent::Noise)
}

/// `... Job finished <signature> ...`
///
/// The token must be a full base58 signature; abbreviated forms such as
/// `5h3K...sig` are treated as noise.
pub fn match_job_finished(line: &str) -> Option<LogEvent> {
    let start = line.find(JOB_FINISHED_MARKER)? + JOB_FINISHED_MARKER.len();
    let token = line[start..].split_whitespace().next()?;
    // The node may print an explorer link instead of the bare signature
    let token = token.rsplit('/').next()?;
    let token = token.trim_matches(|c: char| !c.is_ascii_alphanumeric());

    if !is_signature(token) {
        return None;
    }
    Some(LogEvent::JobFinished {
        signature: token.to_string(),
    })
}

/// `... QUEUED  at position N/M ...`
pub fn match_queue_position(line: &str) -> Option<LogEvent> {
    let start = line.find(QUEUED_MARKER)? + QUEUED_MARKER.len();
    let rest = line[start..].trim_start();
    let rest = rest.strip_prefix(QUEUE_POSITION_MARKER)?.trim_start();

    let token = rest.split_whitespace().next()?;
    let (position, total) = token.split_once('/')?;
    let total = total.trim_end_matches(|c: char| !c.is_ascii_digit());

    Some(LogEvent::QueuePosition {
        position: position.parse().ok()?,
        total: total.parse().ok()?,
    })
}

/// Whether a token decodes to a 64-byte transaction signature
pub fn is_signature(token: &str) -> bool {
    matches!(bs58::decode(token).into_vec(), Ok(bytes) if bytes.len() == 64)
}

/// Remove ANSI escape sequences (colours, cursor movement) from a line
pub fn strip_ansi(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\u{1b}' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'[') {
            chars.next();
            // parameters and intermediates up to the final byte
            for c in chars.by_ref() {
                if ('@'..='~').contains(&c) {
                    break;
                }
            }
        } else {
            chars.next();
        }
    }
    out
}
