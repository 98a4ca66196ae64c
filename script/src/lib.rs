//! Host side of Bonsai Pay: proof backends, the prover HTTP service, its
//! client, and the custody contract client.

pub mod api;
pub mod client;
pub mod config;
pub mod contract;
pub mod prover;

use sp1_sdk::include_elf;

pub const CLAIM_ELF: &[u8] = include_elf!("claim-program");
