use async_trait::async_trait;
use liquify_spammer::{
    AmountMode, BackoffPolicy, CampaignController, CampaignKind, CampaignRequest, CampaignStatus,
    DiscountMode, Gateway, Identity, NetworkContext, NoopSleeper, ParameterPolicy, RotationMode,
    SpammerError, SubmitAck, TransactionOutcome, ValidatorPair,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted behavior for one submission attempt.
#[derive(Debug, Clone)]
enum Script {
    /// Transport failure on the submit call itself.
    TransportOnSubmit,
    /// Gateway acknowledges but flags a duplicate intent.
    Duplicate,
    /// Accepted; the follow-up status poll returns this outcome.
    Poll(TransactionOutcome),
}

/// In-memory gateway replaying a fixed script. Once the script is
/// exhausted every attempt commits successfully.
#[derive(Clone)]
struct MockGateway {
    inner: Arc<MockGatewayInner>,
}

struct MockGatewayInner {
    epoch: u64,
    script: Mutex<VecDeque<Script>>,
    pending_poll: Mutex<Option<TransactionOutcome>>,
    epoch_reads: Mutex<u64>,
}

impl MockGateway {
    fn new(script: Vec<Script>) -> Self {
        Self {
            inner: Arc::new(MockGatewayInner {
                epoch: 41_000,
                script: Mutex::new(script.into()),
                pending_poll: Mutex::new(None),
                epoch_reads: Mutex::new(0),
            }),
        }
    }

    fn epoch_reads(&self) -> u64 {
        *self.inner.epoch_reads.lock().unwrap()
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn current_epoch(&self) -> Result<u64, SpammerError> {
        *self.inner.epoch_reads.lock().unwrap() += 1;
        Ok(self.inner.epoch)
    }

    async fn submit(&self, _notarized_hex: &str) -> Result<SubmitAck, SpammerError> {
        let next = self
            .inner
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Script::Poll(TransactionOutcome::CommittedSuccess));
        match next {
            Script::TransportOnSubmit => Err(SpammerError::Transport {
                endpoint: "/transaction/submit".to_string(),
                reason: "connection reset".to_string(),
            }),
            Script::Duplicate => Ok(SubmitAck { duplicate: true }),
            Script::Poll(outcome) => {
                *self.inner.pending_poll.lock().unwrap() = Some(outcome);
                Ok(SubmitAck { duplicate: false })
            }
        }
    }

    async fn poll_status(&self, _intent_hash: &str) -> Result<TransactionOutcome, SpammerError> {
        Ok(self
            .inner
            .pending_poll
            .lock()
            .unwrap()
            .take()
            .unwrap_or(TransactionOutcome::Pending))
    }
}

fn stokenet() -> NetworkContext {
    NetworkContext {
        network_id: 2,
        gateway_url: "https://stokenet.radixdlt.com".to_string(),
        faucet_component: "component_tdx_2_1cptfaucet".to_string(),
        xrd_resource: "resource_tdx_2_1tknxrd".to_string(),
        liquify_component: "component_tdx_2_1crliquify".to_string(),
        liquidity_receipt: "resource_tdx_2_1n2receipt".to_string(),
        receipt_recipient: "account_tdx_2_1298dev".to_string(),
    }
}

fn controller(script: Vec<Script>) -> CampaignController<MockGateway, NoopSleeper> {
    controller_with_gateway(MockGateway::new(script))
}

fn controller_with_gateway(gateway: MockGateway) -> CampaignController<MockGateway, NoopSleeper> {
    let net = stokenet();
    let dir = tempfile::tempdir().unwrap();
    let identity = Identity::load_or_create(&dir.path().join("creds.json"), &net).unwrap();
    CampaignController::new(
        gateway,
        identity,
        net,
        NoopSleeper,
        Duration::from_millis(0),
        Duration::from_millis(0),
        BackoffPolicy::fixed(0),
    )
}

fn pool() -> Vec<ValidatorPair> {
    vec![ValidatorPair {
        validator: "validator_tdx_2_1sdlk".to_string(),
        lsu: "resource_tdx_2_1t5hp".to_string(),
    }]
}

fn liquidity_request(target: u64, already_done: u64, fixed_amount: u64) -> CampaignRequest {
    CampaignRequest {
        kind: CampaignKind::AddLiquidity {
            auto_unstake: true,
            auto_refill: true,
            refill_threshold: 10_000,
            automation_fee: 5,
        },
        target,
        already_done,
        policy: ParameterPolicy::with_seed(
            AmountMode::Fixed(fixed_amount),
            DiscountMode::Fixed(1000),
            RotationMode::Cycle,
            1,
        ),
        rotation_pool: pool(),
        message: String::new(),
    }
}

#[tokio::test]
async fn fixed_campaign_completes_in_exact_iterations() {
    let gateway = MockGateway::new(vec![]);
    let controller = controller_with_gateway(gateway.clone());
    let report = controller.run(liquidity_request(30_000, 0, 10_000)).await;

    assert_eq!(report.status, CampaignStatus::Completed);
    assert_eq!(report.state.cumulative, 30_000);
    assert_eq!(report.state.successes, 3);
    assert_eq!(report.state.failures, 0);
    assert_eq!(report.state.attempts, 3);
    assert_eq!(report.records.len(), 3);
    // Epoch is refreshed once per loop iteration.
    assert_eq!(gateway.epoch_reads(), 3);
}

#[tokio::test]
async fn cumulative_is_monotonic_and_advances_only_on_success() {
    let script = vec![
        Script::Poll(TransactionOutcome::Rejected("insufficient funds".into())),
        Script::Poll(TransactionOutcome::CommittedSuccess),
        Script::TransportOnSubmit,
        Script::Poll(TransactionOutcome::CommittedSuccess),
    ];
    let controller = controller(script);
    let report = controller.run(liquidity_request(20_000, 0, 10_000)).await;

    assert_eq!(report.status, CampaignStatus::Completed);
    let mut last = 0;
    for record in &report.records {
        assert!(record.cumulative >= last);
        if record.outcome == TransactionOutcome::CommittedSuccess {
            assert_eq!(record.cumulative, last + record.amount);
        } else {
            assert_eq!(record.cumulative, last);
        }
        last = record.cumulative;
    }
    assert_eq!(report.state.cumulative, 20_000);
}

#[tokio::test]
async fn transport_failure_retries_without_double_count() {
    let script = vec![
        Script::TransportOnSubmit,
        Script::Poll(TransactionOutcome::CommittedSuccess),
    ];
    let controller = controller(script);
    let report = controller.run(liquidity_request(10_000, 0, 10_000)).await;

    assert_eq!(report.status, CampaignStatus::Completed);
    assert_eq!(report.state.cumulative, 10_000);
    assert_eq!(report.state.failures, 1);
    assert_eq!(report.state.successes, 1);
    assert_eq!(report.state.attempts, 2);
}

#[tokio::test]
async fn duplicate_is_retried_like_a_failure() {
    let script = vec![
        Script::Duplicate,
        Script::Poll(TransactionOutcome::CommittedSuccess),
    ];
    let controller = controller(script);
    let report = controller.run(liquidity_request(10_000, 0, 10_000)).await;

    assert_eq!(report.status, CampaignStatus::Completed);
    assert_eq!(report.state.failures, 1);
    assert_eq!(report.state.successes, 1);
    assert!(report
        .records
        .iter()
        .any(|r| r.outcome == TransactionOutcome::Duplicate));
}

#[tokio::test]
async fn pending_after_bounded_poll_is_a_temporary_failure() {
    let script = vec![
        Script::Poll(TransactionOutcome::Pending),
        Script::Poll(TransactionOutcome::CommittedSuccess),
    ];
    let controller = controller(script);
    let report = controller.run(liquidity_request(10_000, 0, 10_000)).await;

    assert_eq!(report.status, CampaignStatus::Completed);
    assert_eq!(report.state.failures, 1);
    assert_eq!(report.state.successes, 1);
}

#[tokio::test]
async fn campaign_resumes_from_already_done() {
    let controller = controller(vec![]);
    // remaining = 10_000; the fixed 15_000 is capped to the remainder.
    let report = controller.run(liquidity_request(30_000, 20_000, 15_000)).await;

    assert_eq!(report.status, CampaignStatus::Completed);
    assert_eq!(report.state.cumulative, 30_000);
    assert_eq!(report.state.successes, 1);
    assert_eq!(report.records[0].amount, 10_000);
}

#[tokio::test]
async fn unstake_without_rotation_pool_aborts() {
    let controller = controller(vec![]);
    let request = CampaignRequest {
        kind: CampaignKind::Unstake { max_iterations: 26 },
        target: 100_000,
        already_done: 0,
        policy: ParameterPolicy::with_seed(
            AmountMode::Fixed(100_000),
            DiscountMode::Fixed(0),
            RotationMode::Cycle,
            1,
        ),
        rotation_pool: vec![],
        message: String::new(),
    };
    let report = controller.run(request).await;

    assert_eq!(report.status, CampaignStatus::Aborted);
    assert_eq!(report.state.cumulative, 0);
    assert!(matches!(
        report.error,
        Some(SpammerError::ManifestInvalid { .. })
    ));
}

#[tokio::test]
async fn unstake_campaign_rotates_and_completes() {
    let controller = controller(vec![]);
    let request = CampaignRequest {
        kind: CampaignKind::Unstake { max_iterations: 26 },
        target: 300_000,
        already_done: 0,
        policy: ParameterPolicy::with_seed(
            AmountMode::Fixed(100_000),
            DiscountMode::Fixed(0),
            RotationMode::Cycle,
            1,
        ),
        rotation_pool: pool(),
        message: String::new(),
    };
    let report = controller.run(request).await;

    assert_eq!(report.status, CampaignStatus::Completed);
    assert_eq!(report.state.successes, 3);
    assert_eq!(report.state.cumulative, 300_000);
}

#[tokio::test]
async fn collect_fills_returns_intent_hash_on_commit() {
    let controller = controller(vec![]);
    let intent_hash = controller.collect_fills(25).await.unwrap();
    assert!(intent_hash.starts_with("txid_"));
}

#[tokio::test]
async fn collect_fills_surfaces_ledger_rejection() {
    let controller = controller(vec![Script::Poll(TransactionOutcome::Rejected(
        "no receipt held".into(),
    ))]);
    let err = controller.collect_fills(25).await.unwrap_err();
    assert!(matches!(err, SpammerError::LedgerRejected { .. }));
}

#[tokio::test]
async fn fund_requests_run_for_exact_iteration_count() {
    let controller = controller(vec![]);
    let report = controller
        .run_fund_requests("account_tdx_2_1selfaccount", 5)
        .await;

    assert_eq!(report.status, CampaignStatus::Completed);
    assert_eq!(report.state.successes, 5);
    assert_eq!(report.records.len(), 5);
}
