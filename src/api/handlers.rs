use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::error::LedgerError;
use crate::crypto::SignatureManager;
use crate::ledger::{KeyInclusion, LatestBlock, Ledger, TransactionRecord};
use crate::merkle::Hash;

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let status = match &self {
            LedgerError::ValidationError(_)
            | LedgerError::KeyFormatError(_)
            | LedgerError::UnsupportedKeyTypeError(_)
            | LedgerError::MalformedDigest(_) => StatusCode::BAD_REQUEST,
            LedgerError::NotFoundError(_) => StatusCode::NOT_FOUND,
            LedgerError::CapacityError(_) => StatusCode::SERVICE_UNAVAILABLE,
            LedgerError::DecryptionError(_)
            | LedgerError::EmptyInputError
            | LedgerError::IndexOutOfRangeError { .. }
            | LedgerError::ConfigError(_)
            | LedgerError::WatchError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if self.is_client_error() {
            warn!("Request rejected: {}", self);
        } else {
            error!("Request failed: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, LedgerError>;

/// Unwrap a JSON body, turning malformed or mistyped bodies into a 400
/// `ValidationError` instead of axum's plain-text 422.
fn extract_json<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, LedgerError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| LedgerError::ValidationError(rejection.body_text()))
}

/// Amounts may arrive as JSON strings or numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Text(String),
    Number(serde_json::Number),
}

impl AmountInput {
    fn into_text(self) -> String {
        match self {
            AmountInput::Text(s) => s,
            AmountInput::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitTransactionRequest {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub amount: Option<AmountInput>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTransactionResponse {
    pub transaction_hash: Hash,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    pub merkle_root: Hash,
    pub proof: Vec<Hash>,
}

impl From<&TransactionRecord> for SubmitTransactionResponse {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            transaction_hash: record.hash,
            signature: record.signature.as_ref().map(|s| STANDARD.encode(s)),
            merkle_root: record.root_at_insertion,
            proof: record.proof.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTransactionRequest {
    pub transaction_hash: Option<String>,
    pub proof: Option<Vec<String>>,
    pub merkle_root: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifySignatureRequest {
    pub payload: Option<String>,
    pub signature: Option<String>,
    pub public_key_pem: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishEntropyRequest {
    pub entropy_key: Option<String>,
    pub public_key_pem: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyKeyRequest {
    pub key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidResponse {
    pub valid: bool,
}

fn require<T>(value: Option<T>, field: &str) -> Result<T, LedgerError> {
    value.ok_or_else(|| LedgerError::missing_field(field))
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "entropy-ledger",
        "timestamp": chrono::Utc::now()
    }))
}

pub async fn submit_transaction(
    State(ledger): State<Ledger>,
    body: Result<Json<SubmitTransactionRequest>, JsonRejection>,
) -> ApiResult<SubmitTransactionResponse> {
    let request = extract_json(body)?;
    let amount = request.amount.map(AmountInput::into_text);
    let record = ledger
        .submit(
            request.sender.as_deref(),
            request.recipient.as_deref(),
            amount.as_deref(),
            None,
        )
        .await?;
    Ok(Json(SubmitTransactionResponse::from(&record)))
}

pub async fn list_transactions(State(ledger): State<Ledger>) -> Json<Vec<TransactionRecord>> {
    Json(ledger.list_transactions().await)
}

pub async fn get_transaction(
    State(ledger): State<Ledger>,
    Path(hash): Path<String>,
) -> ApiResult<TransactionRecord> {
    let hash = Hash::from_hex(&hash)?;
    Ok(Json(ledger.get_transaction(&hash).await?))
}

pub async fn verify_transaction(
    State(ledger): State<Ledger>,
    body: Result<Json<VerifyTransactionRequest>, JsonRejection>,
) -> ApiResult<ValidResponse> {
    let request = extract_json(body)?;
    let hash = Hash::from_hex(&require(request.transaction_hash, "transactionHash")?)?;
    let root = Hash::from_hex(&require(request.merkle_root, "merkleRoot")?)?;
    let proof = require(request.proof, "proof")?
        .iter()
        .map(|entry| Hash::from_hex(entry))
        .collect::<Result<Vec<_>, _>>()?;

    let valid = ledger.verify_transaction(&hash, &proof, &root);
    info!("Verified transaction {} against root {}: {}", hash, root, valid);
    Ok(Json(ValidResponse { valid }))
}

pub async fn verify_signature(
    State(ledger): State<Ledger>,
    body: Result<Json<VerifySignatureRequest>, JsonRejection>,
) -> ApiResult<ValidResponse> {
    let request = extract_json(body)?;
    let payload = require(request.payload, "payload")?;
    let signature = require(request.signature, "signature")?;
    let public_key_pem = require(request.public_key_pem, "publicKeyPem")?;

    // Undecodable signature bytes are an invalid signature, not an error.
    let valid = match STANDARD.decode(signature.trim()) {
        Ok(bytes) => ledger.signatures().verify(&payload, &bytes, &public_key_pem)?,
        Err(_) => {
            SignatureManager::parse_public_key(&public_key_pem)?;
            false
        }
    };
    Ok(Json(ValidResponse { valid }))
}

pub async fn publish_entropy_key(
    State(ledger): State<Ledger>,
    body: Result<Json<PublishEntropyRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let request = extract_json(body)?;
    ledger
        .publish_entropy_key(
            request.entropy_key.as_deref(),
            request.public_key_pem.as_deref(),
        )
        .await?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn latest_entropy_key(State(ledger): State<Ledger>) -> ApiResult<Value> {
    let latest = ledger.latest_entropy_key().await?;
    Ok(Json(json!({
        "entropyKey": latest.entropy_key,
        "timestamp": latest.timestamp,
    })))
}

pub async fn latest_block(State(ledger): State<Ledger>) -> Json<LatestBlock> {
    Json(ledger.latest_block().await)
}

pub async fn verify_merkle_key(
    State(ledger): State<Ledger>,
    body: Result<Json<VerifyKeyRequest>, JsonRejection>,
) -> ApiResult<KeyInclusion> {
    let request = extract_json(body)?;
    let key = require(request.key, "key")?;
    Ok(Json(ledger.verify_key(&key).await?))
}
