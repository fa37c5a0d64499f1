//! Configuration loader and network context.
//!
//! Configuration is read from a TOML file (see `config/stokenet.toml`).
//! Every address field defaults to the Stokenet deployment so a fresh
//! checkout runs against the test network without edits.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

/// Network id constants used by the gateway and address derivation.
pub const NETWORK_ID_MAINNET: u8 = 1;
pub const NETWORK_ID_STOKENET: u8 = 2;

const STOKENET_GATEWAY_URL: &str = "https://stokenet.radixdlt.com";
const STOKENET_FAUCET_COMPONENT: &str =
    "component_tdx_2_1cptxxxxxxxxxfaucetxxxxxxxxx000527798379xxxxxxxxxyulkzl";
const STOKENET_XRD_RESOURCE: &str =
    "resource_tdx_2_1tknxxxxxxxxxradxrdxxxxxxxxx009923554798xxxxxxxxxtfd2jc";
const STOKENET_RECEIPT_RECIPIENT: &str =
    "account_tdx_2_1298qr4yymzfvjfqn48f5k00r79snw695zln0lxele0c2jgrwsdhwkc";

/// Immutable per-process network parameters.
///
/// Read-only after initialization; shared by reference through the
/// controller, the manifest builder, and the assembler.
#[derive(Debug, Clone)]
pub struct NetworkContext {
    pub network_id: u8,
    pub gateway_url: String,
    pub faucet_component: String,
    pub xrd_resource: String,
    pub liquify_component: String,
    pub liquidity_receipt: String,
    pub receipt_recipient: String,
}

impl NetworkContext {
    /// Human-readable address prefix segment for this network.
    pub fn hrp(&self) -> &'static str {
        if self.network_id == NETWORK_ID_MAINNET {
            "rdx"
        } else {
            "tdx_2"
        }
    }
}

/// A (validator, derived liquid-stake resource) pair used to diversify
/// unstake traffic across several validators.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidatorPair {
    pub validator: String,
    pub lsu: String,
}

/// Configuration for the spammer, loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct SpammerConfig {
    /// Network name, "stokenet" or "mainnet".
    #[serde(default = "default_network")]
    pub network: String,
    /// Gateway API base URL.
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
    /// Path of the persisted credentials file.
    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,
    /// Faucet component address (fee lock + fund requests).
    #[serde(default = "default_faucet_component")]
    pub faucet_component: String,
    /// XRD resource address.
    #[serde(default = "default_xrd_resource")]
    pub xrd_resource: String,
    /// Deployed Liquify component address.
    pub liquify_component: String,
    /// Liquidity receipt resource address minted by the component.
    pub liquidity_receipt: String,
    /// Account that liquidity receipts are forwarded to.
    #[serde(default = "default_receipt_recipient")]
    pub receipt_recipient: String,
    /// Validator/LSU pairs rotated across unstake transactions.
    #[serde(default = "default_validator_pairs")]
    pub validator_pairs: Vec<ValidatorPair>,
    /// Fixed delay between loop iterations, milliseconds.
    #[serde(default = "default_pacing_delay_ms")]
    pub pacing_delay_ms: u64,
    /// Fixed backoff after a failed attempt, milliseconds.
    #[serde(default = "default_failure_backoff_ms")]
    pub failure_backoff_ms: u64,
    /// Bounded wait before the single status poll, milliseconds.
    #[serde(default = "default_poll_delay_ms")]
    pub poll_delay_ms: u64,
}

fn default_network() -> String {
    "stokenet".to_string()
}

fn default_gateway_url() -> String {
    STOKENET_GATEWAY_URL.to_string()
}

fn default_credentials_path() -> String {
    "creds.json".to_string()
}

fn default_faucet_component() -> String {
    STOKENET_FAUCET_COMPONENT.to_string()
}

fn default_xrd_resource() -> String {
    STOKENET_XRD_RESOURCE.to_string()
}

fn default_receipt_recipient() -> String {
    STOKENET_RECEIPT_RECIPIENT.to_string()
}

fn default_pacing_delay_ms() -> u64 {
    500
}

fn default_failure_backoff_ms() -> u64 {
    5000
}

fn default_poll_delay_ms() -> u64 {
    2000
}

/// Stokenet validator/LSU pairs used when the config file names none.
fn default_validator_pairs() -> Vec<ValidatorPair> {
    [
        (
            "validator_tdx_2_1sdlkptcwjpajqawnuya8r2mgl3eqt89hw27ww6du8kxmx3thmyu8l4",
            "resource_tdx_2_1t5hpjckz9tm63gqvxsl60ejhzvnlguly77tltvywnj06s2x9wjdxjn",
        ),
        (
            "validator_tdx_2_1sdtnujyn3720ymg8lakydkvc5tw4q3zecdj95akdwt9de362mvtd94",
            "resource_tdx_2_1t45l9ku3r5mwxazht2qutmhhk3660hqqvxkkyl8rxs20n9k2zv0w7t",
        ),
        (
            "validator_tdx_2_1svr6rmtd9ts5zx8d3euwmmp6mmjdtcj2q7zlmd8xjrn4qx7q5snkas",
            "resource_tdx_2_1t48zl3qmcv3pf24r0765q4zc6rrk83cfjv6wza2xksej80pcfd7p5g",
        ),
        (
            "validator_tdx_2_1sdvlm4e2x0mjr7mxkpfejz8m0tfwk0j937lxsw74t9lw3evhj5tlwk",
            "resource_tdx_2_1tkpwejwr35gg3xqc0advlv3c8nvs003nn0y80yw2757y5pcnf40qap",
        ),
        (
            "validator_tdx_2_1svwenmn2mkwf9vu5kegs9seql5j535rc3ddjcvg9v3j4d7lvnya70k",
            "resource_tdx_2_1thjlp88pc28eyfg3f2alq8zkggnr273j0saye4nj70vfnga6ldy7ru",
        ),
        (
            "validator_tdx_2_1sv5y2aedgkh5xrhge575e36pdmgrx0qwtg0xvldmmdy0je3rkhkhu2",
            "resource_tdx_2_1t5wwm4n6etcd6pxxfgnr5d0v9vd06qkruu74vx4tneu2jp7k27v3fm",
        ),
    ]
    .into_iter()
    .map(|(validator, lsu)| ValidatorPair {
        validator: validator.to_string(),
        lsu: lsu.to_string(),
    })
    .collect()
}

impl SpammerConfig {
    /// Load configuration from a TOML file.
    pub fn from_path(path: &str) -> Result<Self> {
        let content =
            fs::read_to_string(path).context(format!("Failed to read config from {}", path))?;
        toml::from_str(&content).context("Failed to parse config TOML")
    }

    /// Network id derived from the configured network name.
    pub fn network_id(&self) -> u8 {
        if self.network == "mainnet" {
            NETWORK_ID_MAINNET
        } else {
            NETWORK_ID_STOKENET
        }
    }

    /// Build the immutable network context used by the engine.
    pub fn network_context(&self) -> NetworkContext {
        NetworkContext {
            network_id: self.network_id(),
            gateway_url: self.gateway_url.clone(),
            faucet_component: self.faucet_component.clone(),
            xrd_resource: self.xrd_resource.clone(),
            liquify_component: self.liquify_component.clone(),
            liquidity_receipt: self.liquidity_receipt.clone(),
            receipt_recipient: self.receipt_recipient.clone(),
        }
    }
}
