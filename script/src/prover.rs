//! Proof backends.
//!
//! [`Sp1Backend`] proves the claim program with SP1, locally or on the
//! Succinct prover network. [`NativeBackend`] runs the same token validation
//! on the host and returns the public values with an empty proof, the form
//! accepted by mock verifiers; it is meant for development and tests.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{keccak256, Address, Bytes, B256};
use alloy::sol_types::SolCall;
use anyhow::Context;
use async_trait::async_trait;
use bonsai_pay_lib::{IdentityProvider, ProofInputs, PublicValues, PublicValuesError};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sp1_sdk::{
    EnvProver, HashableKey, NetworkProver, Prover, ProverClient,
    SP1ProofWithPublicValues, SP1ProvingKey, SP1Stdin, SP1VerifyingKey,
};
use tracing::{info, warn};

use crate::contract::IBonsaiPay;

/// Where in-progress network proofs can be inspected.
pub fn explorer_url(proof_id: &str) -> String {
    format!("https://explorer.succinct.xyz/proof/{proof_id}")
}

#[derive(Debug, thiserror::Error)]
pub enum ProverError {
    #[error("invalid proof id: {0}")]
    InvalidProofId(String),
    #[error("unknown proof id: {0}")]
    UnknownProof(String),
    #[error("timed out waiting for proof {0}")]
    Timeout(String),
    #[error("claim rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

// ---------------------------------------------------------------------------
// Proof artifacts
// ---------------------------------------------------------------------------

/// A proof ready to be passed to the custody contract's `claim`.
///
/// Serializes as `{ "proof": "0x…", "publicValues": "0x…" }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimProof {
    pub proof: Bytes,
    pub public_values: Bytes,
}

impl ClaimProof {
    pub fn public_values(&self) -> Result<PublicValues, PublicValuesError> {
        PublicValues::decode(&self.public_values)
    }

    /// ABI-encoded `claim(bytes proof, bytes publicValues)` call.
    pub fn claim_calldata(&self) -> Vec<u8> {
        IBonsaiPay::claimCall {
            proof: self.proof.clone(),
            publicValues: self.public_values.clone(),
        }
        .abi_encode()
    }

    fn from_sp1(proof: &SP1ProofWithPublicValues) -> Self {
        // Mock proofs have no verifiable bytes; mock verifiers expect an empty proof.
        let proof_bytes = if is_mock_prover() {
            Vec::new()
        } else {
            proof.bytes()
        };
        ClaimProof {
            proof: Bytes::from(proof_bytes),
            public_values: Bytes::from(proof.public_values.to_vec()),
        }
    }
}

fn is_mock_prover() -> bool {
    std::env::var("SP1_PROVER")
        .map(|p| p.eq_ignore_ascii_case("mock"))
        .unwrap_or(false)
}

/// Fixture for testing claim verification in the custody contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofFixture {
    pub msg_sender: Address,
    pub claim_id: B256,
    pub vkey: String,
    pub public_values: Bytes,
    pub proof: Bytes,
}

impl ProofFixture {
    pub fn new(proof: &ClaimProof, vkey: String) -> Result<Self, PublicValuesError> {
        let values = proof.public_values()?;
        Ok(ProofFixture {
            msg_sender: values.msgSender,
            claim_id: values.claimId,
            vkey,
            public_values: proof.public_values.clone(),
            proof: proof.proof.clone(),
        })
    }

    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("writing fixture to {}", path.display()))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ProofBackend: Send + Sync {
    /// Submit a proof request and return its ID without waiting.
    async fn request_proof(&self, inputs: &ProofInputs) -> Result<String, ProverError>;

    /// Wait for a previously requested proof.
    async fn wait_proof(&self, proof_id: &str, timeout: Duration)
        -> Result<ClaimProof, ProverError>;

    /// Prove synchronously.
    async fn prove(&self, inputs: &ProofInputs) -> Result<ClaimProof, ProverError>;
}

fn parse_proof_id(proof_id: &str) -> Result<B256, ProverError> {
    proof_id
        .parse::<B256>()
        .map_err(|_| ProverError::InvalidProofId(proof_id.to_string()))
}

/// Bound a wait by `timeout`, reporting expiry as [`ProverError::Timeout`].
async fn with_deadline<T, F>(proof_id: &str, timeout: Duration, wait: F) -> Result<T, ProverError>
where
    F: std::future::Future<Output = anyhow::Result<T>>,
{
    tokio::time::timeout(timeout, wait)
        .await
        .map_err(|_| ProverError::Timeout(proof_id.to_string()))?
        .map_err(ProverError::from)
}

fn stdin_for(inputs: &ProofInputs) -> SP1Stdin {
    let mut stdin = SP1Stdin::new();
    stdin.write(inputs);
    stdin
}

// ---------------------------------------------------------------------------
// SP1
// ---------------------------------------------------------------------------

struct Sp1Keys {
    local: EnvProver,
    pk: SP1ProvingKey,
    vk: SP1VerifyingKey,
}

/// SP1 backend: local proving through `ProverClient::from_env()` (honours
/// `SP1_PROVER`) and request/wait through the Succinct prover network
/// (requires `NETWORK_PRIVATE_KEY`).
pub struct Sp1Backend {
    keys: Arc<Sp1Keys>,
    network: Option<NetworkProver>,
}

impl Sp1Backend {
    pub fn new(elf: &[u8]) -> Self {
        let local = ProverClient::from_env();
        let (pk, vk) = local.setup(elf);
        info!(vkey = %vk.bytes32(), "claim program set up");

        let network = if std::env::var("NETWORK_PRIVATE_KEY").is_ok() {
            Some(ProverClient::builder().network().build())
        } else {
            warn!("NETWORK_PRIVATE_KEY not set, network proving disabled");
            None
        };

        Sp1Backend {
            keys: Arc::new(Sp1Keys { local, pk, vk }),
            network,
        }
    }

    /// bytes32 verification key, as configured in the custody contract.
    pub fn vkey(&self) -> String {
        self.keys.vk.bytes32()
    }

    /// Execute the program without proving. Returns the committed public
    /// values and the instruction count.
    pub fn execute(&self, elf: &[u8], inputs: &ProofInputs) -> anyhow::Result<(PublicValues, u64)> {
        let (output, report) = self.keys.local.execute(elf, &stdin_for(inputs)).run()?;
        let values = PublicValues::decode(output.as_slice())?;
        Ok((values, report.total_instruction_count()))
    }

    fn network(&self) -> Result<&NetworkProver, ProverError> {
        self.network
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("network proving requires NETWORK_PRIVATE_KEY").into())
    }
}

#[async_trait]
impl ProofBackend for Sp1Backend {
    async fn request_proof(&self, inputs: &ProofInputs) -> Result<String, ProverError> {
        let network = self.network()?;
        let request_id = network
            .prove(&self.keys.pk, &stdin_for(inputs))
            .plonk()
            .request_async()
            .await?;
        let proof_id = request_id.to_string();
        info!(%proof_id, url = %explorer_url(&proof_id), "proof requested");
        Ok(proof_id)
    }

    async fn wait_proof(
        &self,
        proof_id: &str,
        timeout: Duration,
    ) -> Result<ClaimProof, ProverError> {
        let request_id = parse_proof_id(proof_id)?;
        let network = self.network()?;
        // The deadline is enforced here so expiry maps to ProverError::Timeout.
        let proof =
            with_deadline(proof_id, timeout, network.wait_proof(request_id, None, None)).await?;
        info!(%proof_id, "proof fulfilled");
        Ok(ClaimProof::from_sp1(&proof))
    }

    async fn prove(&self, inputs: &ProofInputs) -> Result<ClaimProof, ProverError> {
        let keys = self.keys.clone();
        let stdin = stdin_for(inputs);
        let proof = tokio::task::spawn_blocking(move || {
            let proof = keys.local.prove(&keys.pk, &stdin).plonk().run()?;
            keys.local.verify(&proof, &keys.vk)?;
            anyhow::Ok(proof)
        })
        .await
        .context("proving task panicked")??;
        info!("proof generated and verified locally");
        Ok(ClaimProof::from_sp1(&proof))
    }
}

// ---------------------------------------------------------------------------
// Native
// ---------------------------------------------------------------------------

/// Host-side stand-in for the claim program. Proof IDs are random 32-byte
/// values, like network request IDs. A result is held in memory until it
/// has been waited for once.
#[derive(Default)]
pub struct NativeBackend {
    results: DashMap<B256, Result<ClaimProof, String>>,
}

impl NativeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn run(inputs: &ProofInputs) -> Result<ClaimProof, String> {
        let provider =
            IdentityProvider::try_from(inputs.identity_provider).map_err(|e| e.to_string())?;
        let claims = provider.validate(&inputs.jwt).map_err(|e| e.to_string())?;
        Ok(ClaimProof {
            proof: Bytes::new(),
            public_values: Bytes::from(claims.public_values().encode()),
        })
    }
}

#[async_trait]
impl ProofBackend for NativeBackend {
    async fn request_proof(&self, inputs: &ProofInputs) -> Result<String, ProverError> {
        let id = keccak256(uuid::Uuid::new_v4().as_bytes());
        self.results.insert(id, Self::run(inputs));
        Ok(id.to_string())
    }

    async fn wait_proof(
        &self,
        proof_id: &str,
        _timeout: Duration,
    ) -> Result<ClaimProof, ProverError> {
        let id = parse_proof_id(proof_id)?;
        let (_, result) = self
            .results
            .remove(&id)
            .ok_or_else(|| ProverError::UnknownProof(proof_id.to_string()))?;
        result.map_err(ProverError::Rejected)
    }

    async fn prove(&self, inputs: &ProofInputs) -> Result<ClaimProof, ProverError> {
        Self::run(inputs).map_err(ProverError::Rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sign_test_token, TEST_EMAIL};
    use bonsai_pay_lib::claim_id;

    #[tokio::test]
    async fn test_native_request_then_wait() {
        let backend = NativeBackend::new();
        let sender = Address::repeat_byte(0x42);
        let inputs = ProofInputs::new(IdentityProvider::Test, sign_test_token(sender));

        let proof_id = backend.request_proof(&inputs).await.unwrap();
        assert!(proof_id.starts_with("0x") && proof_id.len() == 66);

        let proof = backend
            .wait_proof(&proof_id, Duration::from_secs(1))
            .await
            .unwrap();
        assert!(proof.proof.is_empty());
        let values = proof.public_values().unwrap();
        assert_eq!(values.msgSender, sender);
        assert_eq!(values.claimId, claim_id(TEST_EMAIL));

        // Delivered results are dropped
        assert!(backend.results.is_empty());
        assert!(matches!(
            backend.wait_proof(&proof_id, Duration::from_secs(1)).await,
            Err(ProverError::UnknownProof(_))
        ));
    }

    #[tokio::test]
    async fn test_native_unknown_and_invalid_ids() {
        let backend = NativeBackend::new();
        assert!(matches!(
            backend.wait_proof("nope", Duration::from_secs(1)).await,
            Err(ProverError::InvalidProofId(_))
        ));
        assert!(matches!(
            backend
                .wait_proof(&B256::ZERO.to_string(), Duration::from_secs(1))
                .await,
            Err(ProverError::UnknownProof(_))
        ));
    }

    #[tokio::test]
    async fn test_native_rejects_bad_token() {
        let backend = NativeBackend::new();
        let inputs = ProofInputs::new(IdentityProvider::Test, "a.b.c");
        assert!(matches!(
            backend.prove(&inputs).await,
            Err(ProverError::Rejected(_))
        ));

        // The request is accepted; the failure surfaces when waiting.
        let proof_id = backend.request_proof(&inputs).await.unwrap();
        assert!(matches!(
            backend.wait_proof(&proof_id, Duration::from_secs(1)).await,
            Err(ProverError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn test_rejected_request_is_dropped_after_wait() {
        let backend = NativeBackend::new();
        let inputs = ProofInputs::new(IdentityProvider::Test, "a.b.c");
        let proof_id = backend.request_proof(&inputs).await.unwrap();
        assert_eq!(backend.results.len(), 1);
        let _ = backend.wait_proof(&proof_id, Duration::from_secs(1)).await;
        assert!(backend.results.is_empty());
    }

    #[tokio::test]
    async fn test_deadline_maps_to_timeout() {
        let result: Result<(), ProverError> = with_deadline(
            "0xabc",
            Duration::from_millis(10),
            std::future::pending::<anyhow::Result<()>>(),
        )
        .await;
        assert!(matches!(result, Err(ProverError::Timeout(id)) if id == "0xabc"));

        let result = with_deadline("0xabc", Duration::from_secs(1), async {
            Err::<(), _>(anyhow::anyhow!("request unfulfillable"))
        })
        .await;
        assert!(matches!(result, Err(ProverError::Backend(_))));

        let result = with_deadline("0xabc", Duration::from_secs(1), async { anyhow::Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[test]
    fn test_claim_proof_json_shape() {
        let proof = ClaimProof {
            proof: Bytes::from(vec![0xde, 0xad]),
            public_values: Bytes::from(vec![0x01]),
        };
        let json = serde_json::to_value(&proof).unwrap();
        assert_eq!(json["proof"], "0xdead");
        assert_eq!(json["publicValues"], "0x01");
        let parsed: ClaimProof = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, proof);
    }

    #[test]
    fn test_claim_calldata_selector() {
        let proof = ClaimProof {
            proof: Bytes::new(),
            public_values: Bytes::from(
                PublicValues::new(Address::repeat_byte(1), claim_id(TEST_EMAIL)).encode(),
            ),
        };
        let calldata = proof.claim_calldata();
        assert_eq!(&calldata[..4], IBonsaiPay::claimCall::SELECTOR.as_slice());
        let decoded = IBonsaiPay::claimCall::abi_decode(&calldata).unwrap();
        assert_eq!(decoded.publicValues, proof.public_values);
        assert!(decoded.proof.is_empty());
    }

    #[test]
    fn test_fixture_from_proof() {
        let sender = Address::repeat_byte(7);
        let proof = ClaimProof {
            proof: Bytes::from(vec![1, 2, 3]),
            public_values: Bytes::from(PublicValues::new(sender, claim_id(TEST_EMAIL)).encode()),
        };
        let fixture = ProofFixture::new(&proof, "0x00".into()).unwrap();
        assert_eq!(fixture.msg_sender, sender);
        let json = serde_json::to_value(&fixture).unwrap();
        assert!(json.get("msgSender").is_some());
        assert!(json.get("claimId").is_some());
    }

    #[test]
    fn test_explorer_url() {
        assert_eq!(
            explorer_url("0xabc"),
            "https://explorer.succinct.xyz/proof/0xabc"
        );
    }
}
