//! Passphrase-protected key blobs
//!
//! Key material at rest is sealed with AES-256-GCM under a key derived from
//! an operator passphrase via PBKDF2-HMAC-SHA256. Blob layout is
//! `nonce (12 bytes) || ciphertext`.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use sha2::Sha256;

use crate::error::{LedgerError, Result};

pub const NONCE_LEN: usize = 12;
pub const DEFAULT_KDF_ITERATIONS: u32 = 100_000;

/// Turns an encrypted key blob back into its plaintext.
pub trait KeyVault: Send + Sync {
    fn decrypt(&self, blob: &[u8]) -> Result<String>;
}

pub struct PassphraseVault {
    key: [u8; 32],
}

impl PassphraseVault {
    pub fn new(passphrase: &[u8], salt: &[u8], iterations: u32) -> Result<Self> {
        if passphrase.is_empty() {
            return Err(LedgerError::ConfigError(
                "Vault passphrase must not be empty".to_string(),
            ));
        }
        if iterations == 0 {
            return Err(LedgerError::ConfigError(
                "Vault KDF iterations must be positive".to_string(),
            ));
        }

        let mut key = [0u8; 32];
        pbkdf2::pbkdf2_hmac::<Sha256>(passphrase, salt, iterations, &mut key);
        Ok(Self { key })
    }

    fn cipher(&self) -> Result<Aes256Gcm> {
        Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| LedgerError::DecryptionError(format!("Failed to create cipher: {}", e)))
    }

    /// Encrypt `plaintext` into a blob that [`KeyVault::decrypt`] accepts.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let cipher = self.cipher()?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|e| LedgerError::DecryptionError(format!("Encryption failed: {}", e)))?;

        let mut blob = nonce_bytes.to_vec();
        blob.extend_from_slice(&ciphertext);
        Ok(blob)
    }
}

impl KeyVault for PassphraseVault {
    fn decrypt(&self, blob: &[u8]) -> Result<String> {
        if blob.len() <= NONCE_LEN {
            return Err(LedgerError::DecryptionError(
                "Ciphertext too short".to_string(),
            ));
        }

        let (nonce, ciphertext) = blob.split_at(NONCE_LEN);
        let plaintext = self
            .cipher()?
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| {
                LedgerError::DecryptionError(
                    "Authentication failed (wrong passphrase or corrupt blob)".to_string(),
                )
            })?;

        String::from_utf8(plaintext)
            .map_err(|e| LedgerError::DecryptionError(format!("Plaintext is not UTF-8: {}", e)))
    }
}

impl std::fmt::Debug for PassphraseVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PassphraseVault { .. }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Low iteration count keeps the tests fast.
    fn vault(passphrase: &str) -> PassphraseVault {
        PassphraseVault::new(passphrase.as_bytes(), b"test-salt", 1_000).unwrap()
    }

    #[test]
    fn test_seal_and_decrypt() {
        let v = vault("correct horse");
        let blob = v.seal(b"entropy-key-1").unwrap();
        assert_eq!(v.decrypt(&blob).unwrap(), "entropy-key-1");
    }

    #[test]
    fn test_wrong_passphrase() {
        let blob = vault("one").seal(b"secret").unwrap();
        assert!(matches!(
            vault("two").decrypt(&blob),
            Err(LedgerError::DecryptionError(_))
        ));
    }

    #[test]
    fn test_corrupt_and_short_blobs() {
        let v = vault("p");
        let mut blob = v.seal(b"secret").unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0xff;
        assert!(matches!(v.decrypt(&blob), Err(LedgerError::DecryptionError(_))));
        assert!(matches!(v.decrypt(&[0u8; 5]), Err(LedgerError::DecryptionError(_))));
    }

    #[test]
    fn test_non_utf8_plaintext() {
        let v = vault("p");
        let blob = v.seal(&[0xff, 0xfe, 0xfd]).unwrap();
        assert!(matches!(v.decrypt(&blob), Err(LedgerError::DecryptionError(_))));
    }

    #[test]
    fn test_rejects_empty_passphrase() {
        assert!(matches!(
            PassphraseVault::new(b"", b"salt", 10),
            Err(LedgerError::ConfigError(_))
        ));
    }
}
