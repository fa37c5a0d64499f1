//! Transaction assembler.
//!
//! Combines a manifest with a validity window derived from the current
//! epoch, a fresh nonce, and the identity's key to produce a notarized,
//! wire-ready transaction. Pure construction; no retry semantics.

use crate::error::SpammerError;
use crate::identity::Identity;
use crate::manifest::Manifest;
use rand::RngCore;
use secp256k1::{Message, Secp256k1, SignOnly};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::Mutex;

/// Fixed number of epochs a transaction stays valid after assembly.
pub const EPOCH_HORIZON: u64 = 1000;

/// Transaction validity window in ledger epochs.
///
/// A transaction is accepted only while the current epoch lies in
/// `[start, end)`. Recomputed from a fresh epoch read before every build,
/// since the epoch advances externally and stale windows are
/// certain-rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochWindow {
    pub start: u64,
    pub end: u64,
}

impl EpochWindow {
    pub fn from_current(epoch: u64) -> Self {
        Self {
            start: epoch,
            end: epoch + EPOCH_HORIZON,
        }
    }

    pub fn contains(&self, epoch: u64) -> bool {
        epoch >= self.start && epoch < self.end
    }
}

/// Source of freshness nonces over the full 32-bit range.
///
/// Nonce reuse across two transactions with otherwise-identical header
/// fields causes deduplication collisions, so the source tracks every
/// nonce it has issued in this process and re-draws on a hit.
#[derive(Debug, Default)]
pub struct NonceSource {
    issued: Mutex<HashSet<u32>>,
}

impl NonceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u32 {
        let mut issued = self.issued.lock().unwrap_or_else(|e| e.into_inner());
        let mut rng = rand::thread_rng();
        loop {
            let nonce = rng.next_u32();
            if issued.insert(nonce) {
                return nonce;
            }
        }
    }
}

/// A notarized, wire-ready transaction.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    /// Deterministic identifier of the intent content, used for polling.
    pub intent_hash: String,
    /// Hex-encoded notarized payload for the submit endpoint.
    pub notarized_hex: String,
    pub nonce: u32,
    pub epoch_window: EpochWindow,
}

/// Builds signed transactions from manifests.
pub struct Assembler {
    secp: Secp256k1<SignOnly>,
    nonces: NonceSource,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembler {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::signing_only(),
            nonces: NonceSource::new(),
        }
    }

    /// Produce a notarized transaction over {network id, epoch window,
    /// nonce, public key, manifest, message}, self-signed with the
    /// identity's key. Draws a fresh nonce per call.
    pub fn assemble(
        &self,
        manifest: &Manifest,
        identity: &Identity,
        window: EpochWindow,
        network_id: u8,
        message: &str,
    ) -> Result<SignedTransaction, SpammerError> {
        let nonce = self.nonces.next();
        let intent = encode_intent(manifest, identity, window, network_id, nonce, message);

        let digest: [u8; 32] = Sha256::digest(&intent).into();
        let signing_message = Message::from_digest(digest);
        let signature = self
            .secp
            .sign_ecdsa(&signing_message, identity.secret_key());

        let mut payload = intent;
        payload.extend_from_slice(&signature.serialize_compact());

        Ok(SignedTransaction {
            intent_hash: format!("txid_{}", hex::encode(digest)),
            notarized_hex: hex::encode(payload),
            nonce,
            epoch_window: window,
        })
    }
}

/// Deterministic intent encoding: header fields, then length-prefixed
/// manifest text and message.
fn encode_intent(
    manifest: &Manifest,
    identity: &Identity,
    window: EpochWindow,
    network_id: u8,
    nonce: u32,
    message: &str,
) -> Vec<u8> {
    let manifest_text = manifest.render();

    let mut intent = Vec::with_capacity(64 + manifest_text.len() + message.len());
    intent.push(network_id);
    intent.extend_from_slice(&window.start.to_be_bytes());
    intent.extend_from_slice(&window.end.to_be_bytes());
    intent.extend_from_slice(&nonce.to_be_bytes());
    intent.extend_from_slice(&identity.public_key().serialize());
    // Notary is signatory, zero tip. Matches the fixed header tail used by
    // every transaction this engine produces.
    intent.push(1);
    intent.extend_from_slice(&0u16.to_be_bytes());
    intent.extend_from_slice(&(manifest_text.len() as u64).to_be_bytes());
    intent.extend_from_slice(manifest_text.as_bytes());
    intent.extend_from_slice(&(message.len() as u64).to_be_bytes());
    intent.extend_from_slice(message.as_bytes());
    intent
}
