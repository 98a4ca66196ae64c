use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bonsai_pay_lib::{IdentityClaims, IdentityProvider, Validator};

use super::error::AppError;
use crate::prover::ProofBackend;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn ProofBackend>,
    pub provider: IdentityProvider,
    /// Pre-built validator for the provider; checked against the clock per request
    pub validator: Validator,
    pub proof_timeout: Duration,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn ProofBackend>,
        provider: IdentityProvider,
        audience: Option<String>,
        proof_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let mut validator = provider.validator()?;
        if let Some(aud) = audience {
            validator = validator.with_audience(aud);
        }
        Ok(Self {
            backend,
            provider,
            validator,
            proof_timeout,
        })
    }

    /// Reject tokens the claim program would reject, plus expired ones,
    /// before any prover time is spent.
    pub fn check_token(&self, jwt: &str) -> Result<IdentityClaims, AppError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.validator
            .clone()
            .at_time(now)
            .validate(jwt)
            .map_err(|e| AppError::Unauthorized(e.to_string()))
    }
}
