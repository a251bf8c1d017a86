//! Failure kinds for the agent's outbound adapters.
//!
//! Every failure a collaborator can produce is recovered at that component's
//! boundary and mapped into one of these kinds; callers always see a
//! structured result, never a propagated transport error or a panic.

use thiserror::Error;

/// Failures fetching the battery reading from the modem.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The modem did not answer at the transport level.
    #[error("modem unreachable: {0}")]
    Unreachable(String),

    /// The request exceeded its deadline.
    #[error("telemetry request timed out after {0}s")]
    Timeout(u64),

    /// The response arrived but the battery field was missing, malformed,
    /// or out of range.
    #[error("malformed telemetry payload: {0}")]
    Parse(String),
}

/// Failures issuing a command to the cloud device API.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The API could not be reached or the connection failed mid-request.
    #[error("cloud API transport failure: {0}")]
    Transport(String),

    /// The API answered but refused the command.
    #[error("cloud API rejected the command: {0}")]
    Rejected(String),
}

/// Failures delivering an escalation notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Credentials or recipient are not configured; delivery is skipped.
    #[error("notification transport not configured")]
    NotConfigured,

    /// The API answered with something other than 201 Created.
    #[error("notification API returned HTTP {0}")]
    Rejected(u16),

    #[error("notification transport failure: {0}")]
    Transport(String),
}
