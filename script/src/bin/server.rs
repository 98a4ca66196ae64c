//! Prover service for the Bonsai Pay front-end.
//!
//! Serves `/api/requestProof`, `/api/waitProof` and `/api/prove`.
//!
//! Usage:
//!   SP1_PROVER=network cargo run --release -p bonsai-pay-script --bin server
//!
//! Env vars (from .env):
//!   BIND_ADDR             - Listen address (default: 127.0.0.1:8080)
//!   PROVER_BACKEND        - sp1 or native (default: sp1)
//!   IDENTITY_PROVIDER     - google or test (default: google)
//!   OIDC_AUDIENCE         - Expected token audience (optional)
//!   PROOF_TIMEOUT_SECS    - Network proof wait limit (default: 300)
//!   NETWORK_PRIVATE_KEY   - Succinct Prover Network API key

use std::sync::Arc;

use anyhow::Result;
use bonsai_pay_script::{
    api::{create_router, AppState},
    config::{Backend, ServerArgs},
    prover::{NativeBackend, ProofBackend, Sp1Backend},
    CLAIM_ELF,
};
use clap::Parser;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    sp1_sdk::utils::setup_logger();
    let args = ServerArgs::parse();

    let backend: Arc<dyn ProofBackend> = match args.backend {
        Backend::Sp1 => Arc::new(Sp1Backend::new(CLAIM_ELF)),
        Backend::Native => {
            tracing::warn!("native backend produces unverifiable proofs");
            Arc::new(NativeBackend::new())
        }
    };

    let state = AppState::new(
        backend,
        args.prover.identity_provider,
        args.audience,
        args.prover.proof_timeout(),
    )?;
    let app = create_router(state);

    let listener = TcpListener::bind(args.bind_addr).await?;
    tracing::info!(
        addr = %args.bind_addr,
        provider = %args.prover.identity_provider,
        "prover service listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
