pub mod signatures;
pub mod vault;

pub use signatures::{SignatureManager, SigningIdentity};
pub use vault::{KeyVault, PassphraseVault, DEFAULT_KDF_ITERATIONS};
