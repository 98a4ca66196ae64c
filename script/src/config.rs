//! Command-line and environment configuration shared by the binaries.

use std::net::SocketAddr;
use std::time::Duration;

use alloy::{
    primitives::Address,
    providers::{Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use anyhow::{Context, Result};
use bonsai_pay_lib::IdentityProvider;
use clap::{Args, ValueEnum};

use crate::contract::CustodyClient;

/// Connection to the custody contract.
#[derive(Args, Debug, Clone)]
pub struct ChainArgs {
    /// Ethereum JSON-RPC endpoint
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: String,

    /// Custody contract address
    #[arg(long, env = "CUSTODY_ADDRESS")]
    pub custody_address: Address,

    /// Private key of the signing wallet (not needed for reads)
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,
}

impl ChainArgs {
    /// Read-only client.
    pub fn reader(&self) -> Result<CustodyClient<impl Provider>> {
        let provider = ProviderBuilder::new().connect_http(self.rpc_url.parse()?);
        Ok(CustodyClient::new(self.custody_address, provider, None))
    }

    /// Client that signs with `PRIVATE_KEY`.
    pub fn signer(&self) -> Result<CustodyClient<impl Provider>> {
        let signer: PrivateKeySigner = self
            .private_key
            .as_deref()
            .context("PRIVATE_KEY not set")?
            .parse()
            .context("invalid PRIVATE_KEY")?;
        let sender = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(signer)
            .connect_http(self.rpc_url.parse()?);
        Ok(CustodyClient::new(self.custody_address, provider, Some(sender)))
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// SP1 prover (local, or the prover network for request/wait)
    Sp1,
    /// Host-side validation with empty proofs, for mock verifiers
    Native,
}

/// Settings for proving claims.
#[derive(Args, Debug, Clone)]
pub struct ProverArgs {
    /// Identity provider that issued the tokens: google or test
    #[arg(long, env = "IDENTITY_PROVIDER", default_value = "google", value_parser = parse_provider)]
    pub identity_provider: IdentityProvider,

    /// Seconds to wait for a network proof
    #[arg(long, env = "PROOF_TIMEOUT_SECS", default_value_t = 300)]
    pub proof_timeout_secs: u64,
}

impl ProverArgs {
    pub fn proof_timeout(&self) -> Duration {
        Duration::from_secs(self.proof_timeout_secs)
    }
}

fn parse_provider(s: &str) -> Result<IdentityProvider, String> {
    s.parse().map_err(|e: bonsai_pay_lib::OidcError| e.to_string())
}

/// Prover service settings.
#[derive(clap::Parser, Debug, Clone)]
#[command(name = "bonsai-pay-server")]
#[command(about = "Proof request service for the Bonsai Pay front-end")]
pub struct ServerArgs {
    /// Address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8080")]
    pub bind_addr: SocketAddr,

    #[arg(long, env = "PROVER_BACKEND", value_enum, default_value_t = Backend::Sp1)]
    pub backend: Backend,

    /// Expected `aud` of incoming tokens (the OAuth client ID)
    #[arg(long, env = "OIDC_AUDIENCE")]
    pub audience: Option<String>,

    #[command(flatten)]
    pub prover: ProverArgs,
}
