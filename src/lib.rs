//! Liquify spammer - transaction campaign engine for the Liquify component.
//!
//! Repeatedly constructs, signs, submits, and confirms ledger transactions
//! against a remote Gateway API until a caller-specified cumulative target
//! is reached, tolerating transient failures and randomizing transaction
//! parameters within caller-specified policies.
//!
//! # Architecture
//!
//! - [`identity`]: signing keypair and derived account, persisted once
//! - [`gateway`]: epoch read, transaction submit, and status poll over HTTP
//! - [`manifest`]: typed, statically validated instruction templates
//! - [`transaction`]: epoch windows, fresh nonces, notarization
//! - [`campaign`]: the sequential submit/confirm/retry state machine
//! - [`policy`]: fixed, bounded-random, and rotating parameter generation
//!
//! Campaigns run strictly sequentially per identity; independent campaigns
//! with distinct identities may run concurrently with no shared state.

pub mod backoff;
pub mod campaign;
pub mod config;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod manifest;
pub mod policy;
pub mod transaction;

pub use backoff::{BackoffPolicy, NoopSleeper, Sleeper, TokioSleeper};
pub use campaign::{
    AttemptRecord, CampaignController, CampaignKind, CampaignReport, CampaignRequest,
    CampaignState, CampaignStatus,
};
pub use config::{NetworkContext, SpammerConfig, ValidatorPair};
pub use error::SpammerError;
pub use gateway::{Gateway, HttpGateway, SubmitAck, TransactionOutcome};
pub use identity::Identity;
pub use manifest::{Manifest, ManifestTemplate};
pub use policy::{AmountMode, DiscountMode, ParameterPolicy, RotationMode};
pub use transaction::{Assembler, EpochWindow, SignedTransaction, EPOCH_HORIZON};

/// Install the default tracing subscriber: env-filtered, INFO by default.
pub fn setup_logger() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}
