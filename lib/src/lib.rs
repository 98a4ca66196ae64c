//! Shared types for Bonsai Pay: claim IDs, guest inputs, the public values
//! committed by the claim program, and OIDC token validation.

pub mod certs;
pub mod oidc;

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, SolValue};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use oidc::{IdentityClaims, IdentityProvider, OidcError, Validator};

// =============================================================================
//                               CLAIM ID
// =============================================================================

/// Compute the claim ID for an email address.
///
/// claim_id = sha256(email_utf8_bytes)
///
/// The email is hashed exactly as given. No case folding or trimming is
/// applied, so depositor and claimant must agree on the spelling.
pub fn claim_id(email: &str) -> B256 {
    B256::from_slice(Sha256::digest(email.as_bytes()).as_slice())
}

// =============================================================================
//                        SP1 PROGRAM INPUT TYPES
// =============================================================================

/// Private inputs for the claim circuit.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProofInputs {
    /// Identity provider selector (see [`IdentityProvider`])
    pub identity_provider: U256,
    /// Raw OIDC ID token (compact JWS)
    pub jwt: String,
}

impl ProofInputs {
    pub fn new(provider: IdentityProvider, jwt: impl Into<String>) -> Self {
        ProofInputs {
            identity_provider: provider.into(),
            jwt: jwt.into(),
        }
    }
}

// =============================================================================
//                            PUBLIC VALUES
// =============================================================================

sol! {
    /// Journal committed by the claim program. Matches the custody contract:
    ///   abi.decode(publicValues, (address, bytes32))
    #[derive(Debug, PartialEq, Eq)]
    struct PublicValues {
        address msgSender;
        bytes32 claimId;
    }
}

/// Size of the ABI-encoded public values: two static 32-byte slots.
pub const PUBLIC_VALUES_LEN: usize = 64;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PublicValuesError {
    #[error("public values must be 64 bytes, got {0}")]
    Length(usize),
    #[error("malformed public values: {0}")]
    Abi(String),
}

impl PublicValues {
    pub fn new(msg_sender: Address, claim_id: B256) -> Self {
        PublicValues {
            msgSender: msg_sender,
            claimId: claim_id,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        self.abi_encode()
    }

    /// Decode the journal of a claim proof.
    ///
    /// Rejects trailing bytes and non-zero address padding.
    pub fn decode(bytes: &[u8]) -> Result<Self, PublicValuesError> {
        if bytes.len() != PUBLIC_VALUES_LEN {
            return Err(PublicValuesError::Length(bytes.len()));
        }
        if bytes[..12].iter().any(|b| *b != 0) {
            return Err(PublicValuesError::Abi("address slot is not left-padded".into()));
        }
        <PublicValues as SolValue>::abi_decode(bytes)
            .map_err(|e| PublicValuesError::Abi(e.to_string()))
    }
}

// =============================================================================
//                              TESTS
// =============================================================================
