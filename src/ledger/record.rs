//! Transaction Record
//!
//! Immutable record of one submitted transaction, including the proof and
//! root captured at the moment it was anchored.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::{LedgerError, Result};
use crate::merkle::{hash_leaf, Hash, Proof};

fn amount_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").expect("amount regex is valid"))
}

/// Validated sender/recipient/amount triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub sender: String,
    pub recipient: String,
    pub amount: String,
}

impl TransactionRequest {
    /// Validate raw fields. Each must be present and non-empty after
    /// trimming; the amount must be a non-negative decimal.
    pub fn new(
        sender: Option<&str>,
        recipient: Option<&str>,
        amount: Option<&str>,
    ) -> Result<Self> {
        let sender = required("sender", sender)?;
        let recipient = required("recipient", recipient)?;
        let amount = required("amount", amount)?;

        if !amount_pattern().is_match(&amount) {
            return Err(LedgerError::invalid_amount(&amount));
        }

        Ok(Self {
            sender,
            recipient,
            amount,
        })
    }

    /// `"{sender}->{recipient}:{amount}"`, the string that is hashed and signed.
    pub fn canonical_string(&self) -> String {
        format!("{}->{}:{}", self.sender, self.recipient, self.amount)
    }

    pub fn leaf_hash(&self) -> Hash {
        hash_leaf(&self.canonical_string())
    }
}

fn required(field: &str, value: Option<&str>) -> Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(LedgerError::missing_field(field)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub index: usize,
    pub sender: String,
    pub recipient: String,
    pub amount: String,
    pub hash: Hash,
    #[serde(default, with = "base64_opt", skip_serializing_if = "Option::is_none")]
    pub signature: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer_public_key: Option<String>,
    pub proof: Proof,
    pub root_at_insertion: Hash,
    pub verified: Option<bool>,
    pub timestamp: DateTime<Utc>,
}

impl TransactionRecord {
    pub fn canonical_string(&self) -> String {
        format!("{}->{}:{}", self.sender, self.recipient, self.amount)
    }

    pub fn summary(&self) -> String {
        format!(
            "#{} {} ({}, root {})",
            self.index,
            self.canonical_string(),
            self.hash,
            self.root_at_insertion
        )
    }
}

/// Signatures travel as standard base64.
pub(crate) mod base64_opt {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|s| STANDARD.decode(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
