//! Error types for the campaign engine.
//!
//! Variants map one-to-one onto the failure classes the campaign controller
//! distinguishes: fatal classes terminate a campaign, retryable classes are
//! absorbed by the backoff loop.

use thiserror::Error;

/// Unified error type for campaign operations.
#[derive(Error, Debug, Clone)]
pub enum SpammerError {
    /// Credential file missing a field, unreadable, or holding a malformed
    /// secret. Fatal: never retried.
    #[error("Credential storage error at '{path}': {reason}")]
    Storage { path: String, reason: String },

    /// Network or HTTP failure talking to the gateway. Retryable with
    /// backoff.
    #[error("Gateway transport error ({endpoint}): {reason}")]
    Transport { endpoint: String, reason: String },

    /// A rendered manifest failed static validation. This indicates a
    /// builder defect, not a transient condition. Fatal for the campaign.
    #[error("Manifest failed static validation: {detail}")]
    ManifestInvalid { detail: String },

    /// Cryptographic failure while notarizing. Fatal.
    #[error("Signing failed: {reason}")]
    Signing { reason: String },

    /// The ledger refused the transaction for a business reason. Surfaced
    /// to the caller; the controller does not auto-resolve the cause.
    #[error("Ledger rejected transaction {intent_hash}: {reason}")]
    LedgerRejected { intent_hash: String, reason: String },

    /// The gateway flagged the submission as a duplicate intent. Retryable:
    /// the next attempt draws a fresh nonce.
    #[error("Duplicate submission of intent {intent_hash}")]
    Duplicate { intent_hash: String },
}

impl SpammerError {
    /// True for error classes that terminate a campaign outright.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SpammerError::Storage { .. }
                | SpammerError::ManifestInvalid { .. }
                | SpammerError::Signing { .. }
        )
    }

    /// True for error classes the campaign loop retries with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SpammerError::Transport { .. } | SpammerError::Duplicate { .. }
        )
    }
}
