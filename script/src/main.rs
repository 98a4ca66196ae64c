//! Bonsai Pay CLI.
//!
//! Subcommands:
//!   vkey      - Print the claim program verification key
//!   execute   - Execute the claim program without proof generation (for testing)
//!   prove     - Generate a claim proof locally
//!   request   - Request a claim proof from the Succinct prover network
//!   wait      - Wait for a requested proof
//!   certs     - Fetch the identity provider's current signing keys
//!   deposit   - Deposit funds for an email address
//!   balance   - Show the balance held for an email address
//!   claim     - Submit a claim proof to the custody contract
//!   history   - List deposits and claims for an email address

use std::fs;
use std::path::{Path, PathBuf};

use alloy::primitives::utils::{format_ether, parse_ether};
use anyhow::{bail, Context, Result};
use bonsai_pay_lib::{ProofInputs, Validator};
use bonsai_pay_script::{
    client::{fetch_jwks, ApiClient, GOOGLE_CERTS_URL},
    config::{ChainArgs, ProverArgs},
    contract::CustodyEvent,
    prover::{explorer_url, ClaimProof, ProofBackend, ProofFixture, Sp1Backend},
    CLAIM_ELF,
};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bonsai-pay")]
#[command(about = "Deposit to and claim from Bonsai Pay with SP1 proofs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the verification key (for deploying the custody contract)
    Vkey,
    /// Execute the claim program without generating a proof (fast, for testing)
    Execute {
        /// OIDC ID token
        #[arg(long, env = "JWT", hide_env_values = true)]
        jwt: String,
        #[command(flatten)]
        prover: ProverArgs,
    },
    /// Generate a claim proof locally
    Prove {
        #[arg(long, env = "JWT", hide_env_values = true)]
        jwt: String,
        /// Path to write the proof JSON
        #[arg(long)]
        output: PathBuf,
        /// Also write a contract test fixture to this path
        #[arg(long)]
        fixture: Option<PathBuf>,
        #[command(flatten)]
        prover: ProverArgs,
    },
    /// Request a claim proof from the prover network
    Request {
        #[arg(long, env = "JWT", hide_env_values = true)]
        jwt: String,
        #[command(flatten)]
        prover: ProverArgs,
    },
    /// Wait for a network proof and write it out
    Wait {
        #[arg(long)]
        proof_id: String,
        #[arg(long)]
        output: PathBuf,
        #[command(flatten)]
        prover: ProverArgs,
    },
    /// Fetch the current Google signing keys
    Certs {
        #[arg(long, default_value = GOOGLE_CERTS_URL)]
        url: String,
    },
    /// Deposit funds claimable by the owner of an email address
    Deposit {
        #[arg(long)]
        email: String,
        /// Amount in ether (e.g. 0.01)
        #[arg(long)]
        amount: String,
        #[command(flatten)]
        chain: ChainArgs,
    },
    /// Show the unclaimed balance for an email address
    Balance {
        #[arg(long)]
        email: String,
        #[command(flatten)]
        chain: ChainArgs,
    },
    /// Claim funds with a proof file, or by requesting one from the prover service
    Claim {
        /// Proof JSON written by `prove` or `wait`
        #[arg(long, conflicts_with = "jwt")]
        proof: Option<PathBuf>,
        /// ID token to request a proof for
        #[arg(long, required_unless_present = "proof")]
        jwt: Option<String>,
        /// Prover service base URL
        #[arg(long, env = "API_HOST", default_value = "http://127.0.0.1:8080")]
        api_host: String,
        #[command(flatten)]
        chain: ChainArgs,
    },
    /// List deposits and claims for an email address
    History {
        #[arg(long)]
        email: String,
        /// First block to scan (the contract's deployment block)
        #[arg(long, env = "DEPLOY_BLOCK", default_value_t = 0)]
        from_block: u64,
        #[command(flatten)]
        chain: ChainArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    sp1_sdk::utils::setup_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Vkey => {
            let backend = Sp1Backend::new(CLAIM_ELF);
            println!("BONSAI_PAY_VKEY: 0x{}", backend.vkey().trim_start_matches("0x"));
        }
        Commands::Execute { jwt, prover } => {
            let backend = Sp1Backend::new(CLAIM_ELF);
            let inputs = ProofInputs::new(prover.identity_provider, jwt);
            let (values, cycles) = backend.execute(CLAIM_ELF, &inputs)?;
            println!("[claim] Execution successful. Cycles: {cycles}");
            println!("[claim] msgSender: {}", values.msgSender);
            println!("[claim] claimId:   {}", values.claimId);
        }
        Commands::Prove {
            jwt,
            output,
            fixture,
            prover,
        } => {
            let backend = Sp1Backend::new(CLAIM_ELF);
            let inputs = ProofInputs::new(prover.identity_provider, jwt);
            println!("[claim] Generating PLONK proof...");
            let proof = backend.prove(&inputs).await?;
            write_proof(&proof, &output)?;
            if let Some(path) = fixture {
                ProofFixture::new(&proof, backend.vkey())?.write(&path)?;
                println!("[claim] Fixture written to {}", path.display());
            }
        }
        Commands::Request { jwt, prover } => {
            let backend = Sp1Backend::new(CLAIM_ELF);
            let inputs = ProofInputs::new(prover.identity_provider, jwt);
            let proof_id = backend.request_proof(&inputs).await?;
            println!("Proof ID:   {proof_id}");
            println!("Proof Link: {}", explorer_url(&proof_id));
        }
        Commands::Wait {
            proof_id,
            output,
            prover,
        } => {
            let backend = Sp1Backend::new(CLAIM_ELF);
            let proof = backend
                .wait_proof(&proof_id, prover.proof_timeout())
                .await?;
            write_proof(&proof, &output)?;
        }
        Commands::Certs { url } => {
            let jwks = fetch_jwks(&url).await?;
            let text = serde_json::to_string_pretty(&jwks)?;
            // Must be usable as a built-in key set
            Validator::from_jwks(&text, &[])?;
            println!("{text}");
        }
        Commands::Deposit {
            email,
            amount,
            chain,
        } => {
            let amount = parse_ether(&amount).context("invalid amount")?;
            let custody = chain.signer()?;
            let tx = custody.deposit(&email, amount).await?;
            println!("Deposited {} ETH for {email}", format_ether(amount));
            println!("    Deposit tx: {tx}");
        }
        Commands::Balance { email, chain } => {
            let custody = chain.reader()?;
            let balance = custody.balance_of(&email).await?;
            println!("{email}: {} ETH", format_ether(balance));
        }
        Commands::Claim {
            proof,
            jwt,
            api_host,
            chain,
        } => {
            let custody = chain.signer()?;
            let proof = match (proof, jwt) {
                (Some(path), _) => read_proof(&path)?,
                (None, Some(jwt)) => {
                    println!("Requesting proof from {api_host} (this will take ~5 minutes)...");
                    ApiClient::new(api_host).prove_remote(&jwt).await?
                }
                (None, None) => bail!("either --proof or --jwt is required"),
            };
            let tx = custody.claim(&proof).await?;
            println!("    Claim tx: {tx}");
        }
        Commands::History {
            email,
            from_block,
            chain,
        } => {
            let custody = chain.reader()?;
            let entries = custody.history(&email, from_block).await?;
            println!("{} event(s) for {email}", entries.len());
            for entry in entries {
                let tx = entry.tx_hash.map(|h| h.to_string()).unwrap_or_default();
                match entry.event {
                    CustodyEvent::Deposited { amount } => {
                        println!("  #{} deposited {} ETH  {tx}", entry.block, format_ether(amount))
                    }
                    CustodyEvent::Claimed { recipient, amount } => println!(
                        "  #{} claimed   {} ETH by {recipient}  {tx}",
                        entry.block,
                        format_ether(amount)
                    ),
                }
            }
        }
    }

    Ok(())
}

fn write_proof(proof: &ClaimProof, path: &Path) -> Result<()> {
    let values = proof.public_values()?;
    println!(
        "[claim] Proof size: {} bytes, msgSender: {}, claimId: {}",
        proof.proof.len(),
        values.msgSender,
        values.claimId
    );
    println!("[claim] Calldata: 0x{}", hex::encode(proof.claim_calldata()));
    fs::write(path, serde_json::to_string_pretty(proof)?)?;
    println!("[claim] Proof written to {}", path.display());
    Ok(())
}

fn read_proof(path: &Path) -> Result<ClaimProof> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(serde_json::from_str(&json)?)
}
