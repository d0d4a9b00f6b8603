//! HTTP surface
//!
//! Thin axum adapter over [`Ledger`]; every route maps to one ledger
//! operation and owns no state of its own.

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::ledger::Ledger;

pub fn router(ledger: Ledger) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/api/transactions",
            get(handlers::list_transactions).post(handlers::submit_transaction),
        )
        .route("/api/transactions/verify", post(handlers::verify_transaction))
        .route("/api/transactions/:hash", get(handlers::get_transaction))
        .route("/api/signatures/verify", post(handlers::verify_signature))
        .route("/api/entropy", post(handlers::publish_entropy_key))
        .route("/api/entropy/latest", get(handlers::latest_entropy_key))
        .route("/api/latest-block", get(handlers::latest_block))
        .route("/api/verify-merkle", post(handlers::verify_merkle_key))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .into_inner(),
        )
        .with_state(ledger)
}
