#![allow(dead_code)]

use entropy_ledger::crypto::{PassphraseVault, SigningIdentity};
use entropy_ledger::rotation::RotationPolicy;
use entropy_ledger::Ledger;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Shared 1024-bit identity; RSA key generation is too slow to repeat per test.
pub fn test_identity() -> &'static SigningIdentity {
    static IDENTITY: OnceLock<SigningIdentity> = OnceLock::new();
    IDENTITY.get_or_init(|| SigningIdentity::generate(1024).expect("generate test key"))
}

/// A second, unrelated identity for mismatch tests.
pub fn other_identity() -> &'static SigningIdentity {
    static IDENTITY: OnceLock<SigningIdentity> = OnceLock::new();
    IDENTITY.get_or_init(|| SigningIdentity::generate(1024).expect("generate test key"))
}

/// Make `identity` the active signer, anchoring its public key the way a
/// rotated private key is anchored.
pub async fn install_signer(ledger: &Ledger, identity: &SigningIdentity) {
    ledger
        .apply_rotation(
            identity.public_key_pem().trim().to_string(),
            RotationPolicy::Replace,
            Some(identity.clone()),
        )
        .await
        .expect("install signer");
}

/// Vault with a low iteration count so tests stay fast.
pub fn test_vault(passphrase: &str) -> PassphraseVault {
    PassphraseVault::new(passphrase.as_bytes(), b"test-salt", 1_000).expect("create vault")
}

/// Seal `plaintext` into `dir/name` and return the path.
pub fn write_sealed_key(dir: &Path, name: &str, plaintext: &str, vault: &PassphraseVault) -> PathBuf {
    let path = dir.join(name);
    let blob = vault.seal(plaintext.as_bytes()).expect("seal key");
    std::fs::write(&path, blob).expect("write key blob");
    path
}

/// Sample transfers used across tests.
pub fn sample_transfers() -> Vec<(&'static str, &'static str, &'static str)> {
    vec![
        ("alice", "bob", "10"),
        ("bob", "charlie", "2.5"),
        ("charlie", "dave", "100"),
        ("dave", "eve", "0.01"),
        ("eve", "alice", "7"),
    ]
}
