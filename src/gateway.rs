//! Gateway API client.
//!
//! A stateless request/response wrapper around the three remote operations
//! the engine needs: read the current epoch, submit a notarized
//! transaction, and poll a transaction's status. No retry logic lives here;
//! retries are the campaign controller's responsibility.

use crate::error::SpammerError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

/// Terminal and intermediate outcomes of a submitted transaction.
///
/// `CommittedSuccess` and `Rejected` are terminal; `Duplicate` and
/// `TransportError` are retryable; `Pending` triggers one bounded re-poll
/// before being treated as a retryable failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
    CommittedSuccess,
    Rejected(String),
    Duplicate,
    Pending,
    TransportError(String),
}

/// Acknowledgment returned by the submit endpoint. Acceptance for
/// processing only; it does not imply ledger finality.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAck {
    #[serde(default)]
    pub duplicate: bool,
}

/// The three gateway operations, behind a trait so campaign tests can run
/// against a scripted in-memory gateway.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn current_epoch(&self) -> Result<u64, SpammerError>;
    async fn submit(&self, notarized_hex: &str) -> Result<SubmitAck, SpammerError>;
    async fn poll_status(&self, intent_hash: &str) -> Result<TransactionOutcome, SpammerError>;
}

#[derive(Debug, Deserialize)]
struct GatewayStatusResponse {
    ledger_state: LedgerState,
}

#[derive(Debug, Deserialize)]
struct LedgerState {
    epoch: u64,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    intent_status: Option<String>,
    status: Option<String>,
}

/// HTTP implementation of [`Gateway`] over the remote Gateway API.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    base_url: String,
    http: reqwest::Client,
}

impl HttpGateway {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<T, SpammerError> {
        let transport_err = |reason: String| SpammerError::Transport {
            endpoint: endpoint.to_string(),
            reason,
        };

        let response = self
            .http
            .post(format!("{}{}", self.base_url, endpoint))
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(transport_err(format!("HTTP {}: {}", status, text)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| transport_err(format!("malformed response: {}", e)))
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn current_epoch(&self) -> Result<u64, SpammerError> {
        let status: GatewayStatusResponse =
            self.post_json("/status/gateway-status", json!({})).await?;
        Ok(status.ledger_state.epoch)
    }

    async fn submit(&self, notarized_hex: &str) -> Result<SubmitAck, SpammerError> {
        self.post_json(
            "/transaction/submit",
            json!({ "notarized_transaction_hex": notarized_hex }),
        )
        .await
    }

    async fn poll_status(&self, intent_hash: &str) -> Result<TransactionOutcome, SpammerError> {
        let response: StatusResponse = self
            .post_json("/transaction/status", json!({ "intent_hash": intent_hash }))
            .await?;
        let status = response
            .intent_status
            .or(response.status)
            .unwrap_or_default();
        Ok(outcome_from_status(&status))
    }
}

/// Map the remote status vocabulary onto the closed outcome set.
///
/// Case variance is tolerated, and unrecognized strings map to `Pending`
/// rather than failing, so gateway API evolution does not break polling.
pub fn outcome_from_status(status: &str) -> TransactionOutcome {
    let normalized: String = status
        .chars()
        .filter(|c| *c != '_')
        .collect::<String>()
        .to_lowercase();

    match normalized.as_str() {
        "committedsuccess" => TransactionOutcome::CommittedSuccess,
        "committedfailure" => TransactionOutcome::Rejected(status.to_string()),
        s if s.contains("reject") => TransactionOutcome::Rejected(status.to_string()),
        s if s.contains("duplicate") => TransactionOutcome::Duplicate,
        _ => TransactionOutcome::Pending,
    }
}
