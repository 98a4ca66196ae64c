use axum::{extract::rejection::JsonRejection, extract::State, Json};
use bonsai_pay_lib::ProofInputs;
use serde_json::{json, Value};
use tracing::info;

use super::auth::AuthToken;
use super::error::AppError;
use super::models::{
    JwtRequest, RequestProofResponse, WaitProofRequest, WaitProofResponse,
};
use super::state::AppState;
use crate::prover::{explorer_url, ClaimProof};

/// Token to prove with: the header token, which the body must repeat if it
/// names one.
fn claim_token(auth: AuthToken, body: JwtRequest) -> Result<String, AppError> {
    match body.jwt {
        Some(jwt) if jwt != auth.0 => Err(AppError::Unauthorized(
            "Body token does not match the authentication token".into(),
        )),
        _ => Ok(auth.0),
    }
}

pub async fn request_proof(
    State(state): State<AppState>,
    auth: AuthToken,
    body: Result<Json<JwtRequest>, JsonRejection>,
) -> Result<Json<RequestProofResponse>, AppError> {
    let Json(body) = body?;
    let jwt = claim_token(auth, body)?;
    let claims = state.check_token(&jwt)?;

    let proof_id = state
        .backend
        .request_proof(&ProofInputs::new(state.provider, jwt))
        .await?;
    info!(%proof_id, claim_id = %claims.claim_id(), "proof requested");

    Ok(Json(RequestProofResponse {
        explorer_url: explorer_url(&proof_id),
        proof_id,
    }))
}

pub async fn wait_proof(
    State(state): State<AppState>,
    body: Result<Json<WaitProofRequest>, JsonRejection>,
) -> Result<Json<WaitProofResponse>, AppError> {
    let Json(WaitProofRequest { proof_id }) = body?;
    let proof_id = proof_id.trim().to_string();
    if proof_id.is_empty() {
        return Err(AppError::BadRequest("proof_id is required".into()));
    }

    let proof = state
        .backend
        .wait_proof(&proof_id, state.proof_timeout)
        .await?;
    info!(%proof_id, "proof delivered");

    Ok(Json(WaitProofResponse { proof, proof_id }))
}

pub async fn prove(
    State(state): State<AppState>,
    auth: AuthToken,
    body: Result<Json<JwtRequest>, JsonRejection>,
) -> Result<Json<ClaimProof>, AppError> {
    let Json(body) = body?;
    let jwt = claim_token(auth, body)?;
    let claims = state.check_token(&jwt)?;

    info!(claim_id = %claims.claim_id(), "proving locally");
    let proof = state
        .backend
        .prove(&ProofInputs::new(state.provider, jwt))
        .await?;
    Ok(Json(proof))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
