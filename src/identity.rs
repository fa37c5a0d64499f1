//! Identity provider.
//!
//! Owns the signing keypair and the account identifier derived from it.
//! Credentials persist in a small JSON file (`{"private_key": hex,
//! "account": display string}`) written exactly once, on first creation.
//! The secret never appears in logs: `Debug` prints the account only.

use crate::config::NetworkContext;
use crate::error::SpammerError;
use secp256k1::rand::rngs::OsRng;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// On-disk credential record. The hex secret must round-trip byte-exact.
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
struct Credentials {
    private_key: String,
    account: String,
}

/// A signing identity: secret key, derived public key, derived account.
///
/// The account identifier is a pure function of (public key, network id)
/// and is never mutated after creation.
#[derive(Clone)]
pub struct Identity {
    secret: SecretKey,
    public: PublicKey,
    account: String,
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("account", &self.account)
            .field("secret", &"***REDACTED***")
            .finish()
    }
}

impl Identity {
    /// Load the persisted identity, or generate and persist a new one if no
    /// credentials file exists yet.
    ///
    /// Fails with [`SpammerError::Storage`] if the file exists but is
    /// unreadable or malformed.
    pub fn load_or_create(path: &Path, net: &NetworkContext) -> Result<Self, SpammerError> {
        if path.exists() {
            Self::load(path, net)
        } else {
            let identity = Self::generate(net);
            identity.persist(path)?;
            info!("Generated new identity {}", identity.account);
            Ok(identity)
        }
    }

    fn generate(net: &NetworkContext) -> Self {
        let secp = Secp256k1::new();
        let secret = SecretKey::new(&mut OsRng);
        let public = PublicKey::from_secret_key(&secp, &secret);
        let account = derive_account(&public, net);
        Self {
            secret,
            public,
            account,
        }
    }

    fn load(path: &Path, net: &NetworkContext) -> Result<Self, SpammerError> {
        let storage_err = |reason: String| SpammerError::Storage {
            path: path.display().to_string(),
            reason,
        };

        let content = fs::read_to_string(path).map_err(|e| storage_err(e.to_string()))?;
        let creds: Credentials = serde_json::from_str(&content)
            .map_err(|e| storage_err(format!("malformed credentials: {}", e)))?;

        let mut secret_bytes =
            hex::decode(&creds.private_key).map_err(|e| storage_err(format!("bad hex: {}", e)))?;
        let secret = SecretKey::from_slice(&secret_bytes)
            .map_err(|e| storage_err(format!("invalid secret key: {}", e)));
        secret_bytes.zeroize();
        let secret = secret?;

        let secp = Secp256k1::new();
        let public = PublicKey::from_secret_key(&secp, &secret);
        let account = derive_account(&public, net);

        Ok(Self {
            secret,
            public,
            account,
        })
    }

    fn persist(&self, path: &Path) -> Result<(), SpammerError> {
        let creds = Credentials {
            private_key: hex::encode(self.secret.secret_bytes()),
            account: self.account.clone(),
        };
        let json = serde_json::to_string_pretty(&creds).map_err(|e| SpammerError::Storage {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        fs::write(path, json).map_err(|e| SpammerError::Storage {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    pub(crate) fn secret_key(&self) -> &SecretKey {
        &self.secret
    }
}

/// Derive the account display string from a public key and network id.
///
/// Pure in its inputs: the same key on the same network always yields the
/// same identifier.
fn derive_account(public: &PublicKey, net: &NetworkContext) -> String {
    let mut hasher = Sha256::new();
    hasher.update([net.network_id]);
    hasher.update(public.serialize());
    let digest = hasher.finalize();
    format!("account_{}_1{}", net.hrp(), hex::encode(&digest[..26]))
}
