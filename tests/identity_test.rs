use liquify_spammer::{Identity, NetworkContext, SpammerError};
use std::fs;

fn stokenet() -> NetworkContext {
    NetworkContext {
        network_id: 2,
        gateway_url: "https://stokenet.radixdlt.com".to_string(),
        faucet_component: "component_tdx_2_faucet".to_string(),
        xrd_resource: "resource_tdx_2_xrd".to_string(),
        liquify_component: "component_tdx_2_liquify".to_string(),
        liquidity_receipt: "resource_tdx_2_receipt".to_string(),
        receipt_recipient: "account_tdx_2_dev".to_string(),
    }
}

#[test]
fn load_or_create_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("creds.json");
    let net = stokenet();

    let first = Identity::load_or_create(&path, &net).unwrap();
    let second = Identity::load_or_create(&path, &net).unwrap();

    assert_eq!(first.account(), second.account());
    assert_eq!(first.public_key(), second.public_key());
}

#[test]
fn secret_round_trips_byte_exact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("creds.json");
    let net = stokenet();

    Identity::load_or_create(&path, &net).unwrap();
    let persisted = fs::read_to_string(&path).unwrap();
    let creds: serde_json::Value = serde_json::from_str(&persisted).unwrap();

    let secret_hex = creds["private_key"].as_str().unwrap();
    assert_eq!(hex::decode(secret_hex).unwrap().len(), 32);

    // A second load re-derives the same account that was persisted.
    let reloaded = Identity::load_or_create(&path, &net).unwrap();
    assert_eq!(creds["account"].as_str().unwrap(), reloaded.account());
}

#[test]
fn account_is_pure_in_key_and_network() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("creds.json");
    let net = stokenet();

    let identity = Identity::load_or_create(&path, &net).unwrap();
    assert!(identity.account().starts_with("account_tdx_2_1"));

    let mainnet = NetworkContext {
        network_id: 1,
        ..net
    };
    let on_mainnet = Identity::load_or_create(&path, &mainnet).unwrap();
    assert!(on_mainnet.account().starts_with("account_rdx_1"));
    assert_ne!(identity.account(), on_mainnet.account());
}

#[test]
fn corrupt_credentials_yield_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    let net = stokenet();

    let not_json = dir.path().join("bad.json");
    fs::write(&not_json, "not json at all").unwrap();
    assert!(matches!(
        Identity::load_or_create(&not_json, &net),
        Err(SpammerError::Storage { .. })
    ));

    let missing_field = dir.path().join("missing.json");
    fs::write(&missing_field, r#"{"account": "account_tdx_2_1abc"}"#).unwrap();
    assert!(matches!(
        Identity::load_or_create(&missing_field, &net),
        Err(SpammerError::Storage { .. })
    ));

    let short_secret = dir.path().join("short.json");
    fs::write(
        &short_secret,
        r#"{"private_key": "abcd", "account": "account_tdx_2_1abc"}"#,
    )
    .unwrap();
    assert!(matches!(
        Identity::load_or_create(&short_secret, &net),
        Err(SpammerError::Storage { .. })
    ));
}
