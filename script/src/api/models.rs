use serde::{Deserialize, Serialize};

use crate::prover::ClaimProof;

/// Body of `requestProof` and `prove`. The token may be omitted when it is
/// sent in the auth header.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JwtRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestProofResponse {
    pub proof_id: String,
    pub explorer_url: String,
}

/// Body of `waitProof`. The field is snake_case on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitProofRequest {
    pub proof_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitProofResponse {
    #[serde(flatten)]
    pub proof: ClaimProof,
    pub proof_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}
