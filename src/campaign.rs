//! Campaign controller.
//!
//! The orchestrating state machine: given a target cumulative amount and a
//! parameter policy, it loops pick-parameters, build-manifest, assemble,
//! submit, confirm, until the target is reached or a fatal error aborts the
//! campaign. Iterations run strictly sequentially; epoch windows and nonces
//! are attempt-scoped, and account state can be invalidated by the prior
//! transaction, so iteration N+1 never begins before iteration N's outcome
//! is known.

use crate::backoff::{BackoffPolicy, Sleeper};
use crate::config::{NetworkContext, ValidatorPair};
use crate::error::SpammerError;
use crate::gateway::{Gateway, TransactionOutcome};
use crate::identity::Identity;
use crate::manifest::{
    self, AddLiquidityParams, CollectFillsParams, ManifestTemplate, UnstakeParams,
};
use crate::policy::ParameterPolicy;
use crate::transaction::{Assembler, EpochWindow, SignedTransaction};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{info, warn};

/// Terminal state of a finished campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignStatus {
    Completed,
    Aborted,
}

/// Mutable campaign progress, exclusively owned by the controller.
///
/// `cumulative` is monotonically non-decreasing and only advances on a
/// confirmed success; `attempts` counts every submission regardless of
/// outcome.
#[derive(Debug, Clone)]
pub struct CampaignState {
    pub target: u64,
    pub cumulative: u64,
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
}

impl CampaignState {
    fn new(target: u64, already_done: u64) -> Self {
        Self {
            target,
            cumulative: already_done,
            attempts: 0,
            successes: 0,
            failures: 0,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.target.saturating_sub(self.cumulative)
    }
}

/// One per-attempt progress record, suitable for logging or assertions.
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    pub timestamp: DateTime<Utc>,
    pub intent_hash: String,
    pub outcome: TransactionOutcome,
    pub amount: u64,
    pub cumulative: u64,
}

/// The operation a campaign drives, with its fixed per-campaign knobs.
#[derive(Debug, Clone)]
pub enum CampaignKind {
    AddLiquidity {
        auto_unstake: bool,
        auto_refill: bool,
        refill_threshold: u64,
        automation_fee: u64,
    },
    Unstake {
        max_iterations: u8,
    },
}

/// A start request: target amount, parameter policy, rotation pool.
#[derive(Debug)]
pub struct CampaignRequest {
    pub kind: CampaignKind,
    /// Target cumulative amount, whole XRD.
    pub target: u64,
    /// Amount already committed before this run; campaigns resume with
    /// `remaining = target - already_done`.
    pub already_done: u64,
    pub policy: ParameterPolicy,
    /// Validator/LSU pairs rotated across unstake transactions.
    pub rotation_pool: Vec<ValidatorPair>,
    /// Optional plain-text message carried in each signed intent.
    pub message: String,
}

/// Final report of a campaign run. Aborts carry the fatal error alongside
/// the progress achieved, so a follow-up run can resume from `cumulative`.
#[derive(Debug)]
pub struct CampaignReport {
    pub status: CampaignStatus,
    pub state: CampaignState,
    pub records: Vec<AttemptRecord>,
    pub error: Option<SpammerError>,
}

/// Drives campaigns against one gateway with one identity.
pub struct CampaignController<G, S> {
    gateway: G,
    identity: Identity,
    net: NetworkContext,
    assembler: Assembler,
    sleeper: S,
    pacing: Duration,
    poll_wait: Duration,
    backoff: BackoffPolicy,
}

impl<G: Gateway, S: Sleeper> CampaignController<G, S> {
    pub fn new(
        gateway: G,
        identity: Identity,
        net: NetworkContext,
        sleeper: S,
        pacing: Duration,
        poll_wait: Duration,
        backoff: BackoffPolicy,
    ) -> Self {
        Self {
            gateway,
            identity,
            net,
            assembler: Assembler::new(),
            sleeper,
            pacing,
            poll_wait,
            backoff,
        }
    }

    /// Run a campaign to completion or abort.
    pub async fn run(&self, mut request: CampaignRequest) -> CampaignReport {
        let mut state = CampaignState::new(request.target, request.already_done);
        let mut records = Vec::new();
        let mut consecutive_failures: u32 = 0;

        info!(
            target_amount = state.target,
            already_done = state.cumulative,
            "Starting campaign"
        );

        while state.cumulative < state.target {
            // Refreshed every iteration: stale windows are
            // certain-rejection by the ledger.
            let epoch = match self.gateway.current_epoch().await {
                Ok(epoch) => epoch,
                Err(e) => {
                    warn!("Epoch refresh failed: {}", e);
                    consecutive_failures += 1;
                    self.sleeper
                        .sleep(self.backoff.delay(consecutive_failures - 1))
                        .await;
                    continue;
                }
            };
            let window = EpochWindow::from_current(epoch);

            let remaining = state.remaining();
            let amount = request.policy.next_amount(remaining);

            let template = match self.next_template(
                &request.kind,
                &mut request.policy,
                &request.rotation_pool,
                amount,
            ) {
                Ok(template) => template,
                Err(e) => return self.abort(state, records, e),
            };

            let manifest = match manifest::build(&template, &self.net) {
                Ok(manifest) => manifest,
                Err(e) => {
                    warn!(template = template.name(), amount, "Manifest invalid");
                    return self.abort(state, records, e);
                }
            };

            let tx = match self.assembler.assemble(
                &manifest,
                &self.identity,
                window,
                self.net.network_id,
                &request.message,
            ) {
                Ok(tx) => tx,
                Err(e) => return self.abort(state, records, e),
            };

            state.attempts += 1;
            let outcome = self.submit_and_confirm(&tx).await;

            let committed = matches!(outcome, TransactionOutcome::CommittedSuccess);
            if committed {
                state.successes += 1;
                state.cumulative += amount;
                consecutive_failures = 0;
                info!(
                    intent_hash = %tx.intent_hash,
                    amount,
                    cumulative = state.cumulative,
                    target_amount = state.target,
                    "Committed"
                );
            } else {
                state.failures += 1;
                consecutive_failures += 1;
                warn!(
                    intent_hash = %tx.intent_hash,
                    amount,
                    outcome = ?outcome,
                    "Attempt failed, backing off"
                );
            }

            records.push(AttemptRecord {
                timestamp: Utc::now(),
                intent_hash: tx.intent_hash.clone(),
                outcome,
                amount,
                cumulative: state.cumulative,
            });

            if !committed {
                self.sleeper
                    .sleep(self.backoff.delay(consecutive_failures - 1))
                    .await;
            }

            // Fixed pacing between iterations, success or failure.
            self.sleeper.sleep(self.pacing).await;
        }

        info!(
            cumulative = state.cumulative,
            attempts = state.attempts,
            "Campaign completed"
        );
        CampaignReport {
            status: CampaignStatus::Completed,
            state,
            records,
            error: None,
        }
    }

    /// Repeatedly request funds from the faucet. No target amount: a fixed
    /// iteration count with the usual pacing and backoff.
    pub async fn run_fund_requests(&self, recipient: &str, iterations: u32) -> CampaignReport {
        let mut state = CampaignState::new(0, 0);
        let mut records = Vec::new();
        let mut done: u32 = 0;
        let mut consecutive_failures: u32 = 0;

        while done < iterations {
            let epoch = match self.gateway.current_epoch().await {
                Ok(epoch) => epoch,
                Err(e) => {
                    warn!("Epoch refresh failed: {}", e);
                    consecutive_failures += 1;
                    self.sleeper
                        .sleep(self.backoff.delay(consecutive_failures - 1))
                        .await;
                    continue;
                }
            };
            let window = EpochWindow::from_current(epoch);

            let template = ManifestTemplate::FundRequest {
                recipient: recipient.to_string(),
            };
            let manifest = match manifest::build(&template, &self.net) {
                Ok(manifest) => manifest,
                Err(e) => return self.abort(state, records, e),
            };
            let tx = match self.assembler.assemble(
                &manifest,
                &self.identity,
                window,
                self.net.network_id,
                "",
            ) {
                Ok(tx) => tx,
                Err(e) => return self.abort(state, records, e),
            };

            state.attempts += 1;
            match self.gateway.submit(&tx.notarized_hex).await {
                Ok(_) => {
                    done += 1;
                    state.successes += 1;
                    consecutive_failures = 0;
                    info!(done, iterations, "Fund request submitted");
                    records.push(AttemptRecord {
                        timestamp: Utc::now(),
                        intent_hash: tx.intent_hash.clone(),
                        outcome: TransactionOutcome::Pending,
                        amount: 0,
                        cumulative: 0,
                    });
                }
                Err(e) => {
                    state.failures += 1;
                    consecutive_failures += 1;
                    warn!("Fund request failed: {}", e);
                    self.sleeper
                        .sleep(self.backoff.delay(consecutive_failures - 1))
                        .await;
                }
            }

            self.sleeper.sleep(self.pacing).await;
        }

        CampaignReport {
            status: CampaignStatus::Completed,
            state,
            records,
            error: None,
        }
    }

    /// Build, submit, and confirm a single collect-fills transaction.
    pub async fn collect_fills(&self, fills_to_collect: u64) -> Result<String, SpammerError> {
        let epoch = self.gateway.current_epoch().await?;
        let window = EpochWindow::from_current(epoch);

        let template = ManifestTemplate::CollectFills(CollectFillsParams {
            account: self.identity.account().to_string(),
            fills_to_collect,
        });
        let manifest = manifest::build(&template, &self.net)?;
        let tx = self
            .assembler
            .assemble(&manifest, &self.identity, window, self.net.network_id, "")?;

        let outcome = self.submit_and_confirm(&tx).await;
        match outcome {
            TransactionOutcome::CommittedSuccess => Ok(tx.intent_hash),
            TransactionOutcome::Rejected(reason) => Err(SpammerError::LedgerRejected {
                intent_hash: tx.intent_hash,
                reason,
            }),
            TransactionOutcome::Duplicate => Err(SpammerError::Duplicate {
                intent_hash: tx.intent_hash,
            }),
            TransactionOutcome::Pending => Err(SpammerError::Transport {
                endpoint: "/transaction/status".to_string(),
                reason: "still pending after bounded wait".to_string(),
            }),
            TransactionOutcome::TransportError(reason) => Err(SpammerError::Transport {
                endpoint: "/transaction/status".to_string(),
                reason,
            }),
        }
    }

    /// Submit a signed transaction, wait once, and read its status.
    ///
    /// A `Pending` result after the bounded wait is a temporary failure for
    /// the iteration, never success.
    async fn submit_and_confirm(&self, tx: &SignedTransaction) -> TransactionOutcome {
        let ack = match self.gateway.submit(&tx.notarized_hex).await {
            Ok(ack) => ack,
            Err(SpammerError::Transport { reason, .. }) => {
                return TransactionOutcome::TransportError(reason);
            }
            Err(e) => return TransactionOutcome::TransportError(e.to_string()),
        };
        if ack.duplicate {
            return TransactionOutcome::Duplicate;
        }

        self.sleeper.sleep(self.poll_wait).await;

        match self.gateway.poll_status(&tx.intent_hash).await {
            Ok(outcome) => outcome,
            Err(SpammerError::Transport { reason, .. }) => {
                TransactionOutcome::TransportError(reason)
            }
            Err(e) => TransactionOutcome::TransportError(e.to_string()),
        }
    }

    fn next_template(
        &self,
        kind: &CampaignKind,
        policy: &mut ParameterPolicy,
        rotation_pool: &[ValidatorPair],
        amount: u64,
    ) -> Result<ManifestTemplate, SpammerError> {
        match kind {
            CampaignKind::AddLiquidity {
                auto_unstake,
                auto_refill,
                refill_threshold,
                automation_fee,
            } => Ok(ManifestTemplate::AddLiquidity(AddLiquidityParams {
                account: self.identity.account().to_string(),
                amount,
                discount_bps: policy.next_discount(),
                auto_unstake: *auto_unstake,
                auto_refill: *auto_refill,
                refill_threshold: *refill_threshold,
                automation_fee: *automation_fee,
            })),
            CampaignKind::Unstake { max_iterations } => {
                if rotation_pool.is_empty() {
                    return Err(SpammerError::ManifestInvalid {
                        detail: "unstake campaign requires a non-empty rotation pool".to_string(),
                    });
                }
                let pair = policy.next_pair(rotation_pool);
                Ok(ManifestTemplate::Unstake(UnstakeParams {
                    account: self.identity.account().to_string(),
                    amount,
                    validator: pair.validator.clone(),
                    lsu_resource: pair.lsu.clone(),
                    max_iterations: *max_iterations,
                }))
            }
        }
    }

    fn abort(
        &self,
        state: CampaignState,
        records: Vec<AttemptRecord>,
        error: SpammerError,
    ) -> CampaignReport {
        warn!(
            cumulative = state.cumulative,
            target_amount = state.target,
            error = %error,
            "Campaign aborted; resume with remaining = target - cumulative"
        );
        CampaignReport {
            status: CampaignStatus::Aborted,
            state,
            records,
            error: Some(error),
        }
    }
}
