//! OpenID Connect ID token validation.
//!
//! A claim is authorized by an RS256-signed ID token whose `email` claim
//! names the recipient and whose `nonce` claim carries the recipient's
//! checksummed wallet address. The same code runs inside the claim program
//! and on the host, where the prover service uses it to reject bad tokens
//! before spending prover time.

use alloy_primitives::{Address, B256, U256};
use jsonwebtoken::{
    decode, decode_header, errors::ErrorKind, jwk::JwkSet, Algorithm, DecodingKey, Validation,
};
use serde::{de, Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

use crate::{certs, claim_id, PublicValues};

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum OidcError {
    #[error("unknown identity provider {0}")]
    UnknownProvider(String),
    #[error("invalid key set: {0}")]
    InvalidKeySet(String),
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("unsupported algorithm {0:?}, expected RS256")]
    UnsupportedAlgorithm(Algorithm),
    #[error("token header has no key id")]
    MissingKeyId,
    #[error("no signing key with id {0}")]
    UnknownKeyId(String),
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("issuer {0} is not accepted")]
    InvalidIssuer(String),
    #[error("token audience does not match")]
    InvalidAudience,
    #[error("token expired at {0}")]
    Expired(u64),
    #[error("email address is not verified")]
    EmailNotVerified,
    #[error("token has no email claim")]
    MissingEmail,
    #[error("token has no nonce claim")]
    MissingNonce,
    #[error("nonce is not a checksummed address: {0}")]
    InvalidNonce(String),
}

// =============================================================================
//                          IDENTITY PROVIDERS
// =============================================================================

/// Identity providers whose keys are trusted by the claim program.
///
/// Encoded as an integer in [`crate::ProofInputs`]: Google = 0, Test = 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdentityProvider {
    Google,
    Test,
}

impl IdentityProvider {
    pub fn jwks(&self) -> &'static str {
        match self {
            IdentityProvider::Google => certs::GOOGLE_PUB_JWK,
            IdentityProvider::Test => certs::TEST_PUB_JWK,
        }
    }

    pub fn issuers(&self) -> &'static [&'static str] {
        match self {
            IdentityProvider::Google => &["accounts.google.com", "https://accounts.google.com"],
            IdentityProvider::Test => &["https://test.bonsai-pay.dev"],
        }
    }

    /// Validator over the provider's built-in keys, with no expiry check.
    pub fn validator(&self) -> Result<Validator, OidcError> {
        Validator::from_jwks(self.jwks(), self.issuers())
    }

    pub fn validate(&self, jwt: &str) -> Result<IdentityClaims, OidcError> {
        self.validator()?.validate(jwt)
    }
}

impl TryFrom<U256> for IdentityProvider {
    type Error = OidcError;

    fn try_from(value: U256) -> Result<Self, Self::Error> {
        if value == U256::ZERO {
            Ok(IdentityProvider::Google)
        } else if value == U256::from(1) {
            Ok(IdentityProvider::Test)
        } else {
            Err(OidcError::UnknownProvider(value.to_string()))
        }
    }
}

impl From<IdentityProvider> for U256 {
    fn from(provider: IdentityProvider) -> Self {
        match provider {
            IdentityProvider::Google => U256::ZERO,
            IdentityProvider::Test => U256::from(1),
        }
    }
}

impl FromStr for IdentityProvider {
    type Err = OidcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(IdentityProvider::Google),
            "test" => Ok(IdentityProvider::Test),
            other => Err(OidcError::UnknownProvider(other.to_string())),
        }
    }
}

impl fmt::Display for IdentityProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityProvider::Google => f.write_str("google"),
            IdentityProvider::Test => f.write_str("test"),
        }
    }
}

// =============================================================================
//                              VALIDATION
// =============================================================================

/// Claims extracted from a valid ID token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityClaims {
    pub email: String,
    /// Wallet address the claim is bound to
    pub nonce: Address,
}

impl IdentityClaims {
    pub fn claim_id(&self) -> B256 {
        claim_id(&self.email)
    }

    pub fn public_values(&self) -> PublicValues {
        PublicValues::new(self.nonce, self.claim_id())
    }
}

#[derive(Clone, Debug, Deserialize)]
struct TokenClaims {
    iss: String,
    exp: Option<u64>,
    email: Option<String>,
    #[serde(default, deserialize_with = "bool_or_string")]
    email_verified: Option<bool>,
    nonce: Option<String>,
}

/// Some providers send `email_verified` as the string "true" or "false".
fn bool_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Str(String),
    }

    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Flag::Bool(b)) => Ok(Some(b)),
        Some(Flag::Str(s)) => match s.as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            other => Err(de::Error::invalid_value(
                de::Unexpected::Str(other),
                &"true or false",
            )),
        },
    }
}

/// RS256 ID token validator over a fixed key set.
#[derive(Clone, Debug)]
pub struct Validator {
    keys: JwkSet,
    issuers: Vec<String>,
    audience: Option<String>,
    now: Option<u64>,
}

impl Validator {
    pub fn from_jwks(jwks: &str, issuers: &[&str]) -> Result<Self, OidcError> {
        let keys: JwkSet =
            serde_json::from_str(jwks).map_err(|e| OidcError::InvalidKeySet(e.to_string()))?;
        Ok(Validator {
            keys,
            issuers: issuers.iter().map(|s| s.to_string()).collect(),
            audience: None,
            now: None,
        })
    }

    /// Require the token's `aud` to contain `audience` (the OAuth client ID).
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Reject tokens whose `exp` is not after `now` (unix seconds).
    /// Unset inside the zkVM, which has no clock.
    pub fn at_time(mut self, now: u64) -> Self {
        self.now = Some(now);
        self
    }

    pub fn validate(&self, jwt: &str) -> Result<IdentityClaims, OidcError> {
        let header = decode_header(jwt).map_err(|e| OidcError::Malformed(e.to_string()))?;
        if header.alg != Algorithm::RS256 {
            return Err(OidcError::UnsupportedAlgorithm(header.alg));
        }
        let kid = header.kid.ok_or(OidcError::MissingKeyId)?;
        let jwk = self
            .keys
            .find(&kid)
            .ok_or_else(|| OidcError::UnknownKeyId(kid.clone()))?;
        let key =
            DecodingKey::from_jwk(jwk).map_err(|e| OidcError::InvalidKeySet(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        match &self.audience {
            Some(aud) => {
                validation.set_audience(&[aud.as_str()]);
                // jsonwebtoken skips the audience check when `aud` is absent
                validation.required_spec_claims.insert("aud".to_string());
            }
            None => validation.validate_aud = false,
        }

        let claims = decode::<TokenClaims>(jwt, &key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => OidcError::InvalidSignature,
                ErrorKind::InvalidAudience => OidcError::InvalidAudience,
                ErrorKind::MissingRequiredClaim(claim) if claim == "aud" => {
                    OidcError::InvalidAudience
                }
                _ => OidcError::Malformed(e.to_string()),
            })?
            .claims;

        if !self.issuers.iter().any(|iss| *iss == claims.iss) {
            return Err(OidcError::InvalidIssuer(claims.iss));
        }
        if let Some(now) = self.now {
            let exp = claims
                .exp
                .ok_or_else(|| OidcError::Malformed("token has no exp claim".into()))?;
            if exp <= now {
                return Err(OidcError::Expired(exp));
            }
        }
        if claims.email_verified == Some(false) {
            return Err(OidcError::EmailNotVerified);
        }
        let email = claims
            .email
            .filter(|e| !e.is_empty())
            .ok_or(OidcError::MissingEmail)?;
        let nonce = claims.nonce.ok_or(OidcError::MissingNonce)?;
        let nonce = Address::parse_checksummed(&nonce, None)
            .map_err(|_| OidcError::InvalidNonce(nonce.clone()))?;

        Ok(IdentityClaims { email, nonce })
    }
}

// =============================================================================
//                              TESTS
// =============================================================================
