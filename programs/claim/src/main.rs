//! SP1 Claim Circuit: prove ownership of an email address for a Bonsai Pay claim.
//!
//! Proves that the prover holds an ID token that:
//! - Is signed by a key of the selected identity provider
//! - Was issued by that provider
//! - Names a (verified) email address
//! - Carries the claimant's checksummed wallet address as its nonce
//!
//! Public values committed (64 bytes = 2 x 32-byte slots):
//!   [msgSender (left-padded), claimId = sha256(email)]
//! Matches the custody contract:
//!   abi.decode(publicValues, (address, bytes32))

#![no_main]
sp1_zkvm::entrypoint!(main);

use bonsai_pay_lib::{IdentityProvider, ProofInputs};

pub fn main() {
    // 1. Read the private inputs from the prover (host)
    let inputs = sp1_zkvm::io::read::<ProofInputs>();

    // 2. Resolve the identity provider
    let provider = IdentityProvider::try_from(inputs.identity_provider)
        .expect("unknown identity provider");

    // 3. Validate the token against the built-in key set. There is no clock
    //    in the zkVM, so expiry is left to the host.
    let claims = provider.validate(&inputs.jwt).expect("invalid ID token");

    // 4. Commit (msgSender, claimId)
    sp1_zkvm::io::commit_slice(&claims.public_values().encode());
}
