//! Client for the prover service, following the front-end's claim flow:
//! request a proof with the user's ID token, then wait for it.

use anyhow::{bail, Context, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::api::auth::HEADER_XAUTH;
use crate::api::models::{
    ErrorBody, JwtRequest, RequestProofResponse, WaitProofRequest, WaitProofResponse,
};
use crate::prover::ClaimProof;

pub const GOOGLE_CERTS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn request_proof(&self, jwt: &str) -> Result<RequestProofResponse> {
        let body = JwtRequest {
            jwt: Some(jwt.to_string()),
        };
        self.post("requestProof", Some(jwt), &body).await
    }

    pub async fn wait_proof(&self, proof_id: &str) -> Result<ClaimProof> {
        let body = WaitProofRequest {
            proof_id: proof_id.to_string(),
        };
        let response: WaitProofResponse = self.post("waitProof", None, &body).await?;
        Ok(response.proof)
    }

    /// Prove on the service's local prover in a single call.
    pub async fn prove(&self, jwt: &str) -> Result<ClaimProof> {
        let body = JwtRequest {
            jwt: Some(jwt.to_string()),
        };
        self.post("prove", Some(jwt), &body).await
    }

    /// Request a network proof and wait for it.
    pub async fn prove_remote(&self, jwt: &str) -> Result<ClaimProof> {
        let requested = self.request_proof(jwt).await?;
        info!(proof_id = %requested.proof_id, url = %requested.explorer_url, "waiting for proof");
        self.wait_proof(&requested.proof_id).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        route: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}/api/{route}", self.base_url);
        let mut request = self.http.post(&url).json(body);
        if let Some(token) = token {
            request = request.header(HEADER_XAUTH, token);
        }
        let response = request
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;
        decode(route, response).await
    }
}

async fn decode<T: DeserializeOwned>(route: &str, response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
        };
        bail!("{route} failed ({status}): {message}");
    }
    response
        .json::<T>()
        .await
        .with_context(|| format!("decoding {route} response"))
}

/// Fetch a provider's current JSON Web Key Set.
pub async fn fetch_jwks(url: &str) -> Result<serde_json::Value> {
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("GET {url}"))?
        .error_for_status()?;
    Ok(response.json().await?)
}
