#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, B256, U256};
    use bonsai_pay_lib::*;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    const TEST_KEY: &str = include_str!("../../lib/fixtures/test_key.pem");

    /// Sign a token from the test identity provider.
    fn issue_token(email: &str, wallet: Address) -> String {
        issue_token_with(json!({
            "iss": "https://test.bonsai-pay.dev",
            "exp": 4_102_444_800u64,
            "email": email,
            "email_verified": true,
            "nonce": wallet.to_checksum(None),
        }))
    }

    fn issue_token_with(claims: Value) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(certs::TEST_KID.to_string());
        encode(
            &header,
            &claims,
            &EncodingKey::from_rsa_pem(TEST_KEY.as_bytes()).unwrap(),
        )
        .unwrap()
    }

    /// What the claim program commits for the given inputs.
    fn run_claim_program(inputs: &ProofInputs) -> Result<Vec<u8>, OidcError> {
        let provider = IdentityProvider::try_from(inputs.identity_provider)?;
        let claims = provider.validate(&inputs.jwt)?;
        Ok(claims.public_values().encode())
    }

    /// Balance bookkeeping of the custody contract, with proof verification
    /// reduced to decoding the public values.
    #[derive(Default)]
    struct Custody {
        balances: HashMap<B256, U256>,
        paid: HashMap<Address, U256>,
    }

    impl Custody {
        fn deposit(&mut self, claim_id: B256, amount: U256) {
            *self.balances.entry(claim_id).or_default() += amount;
        }

        fn balance_of(&self, claim_id: B256) -> U256 {
            self.balances.get(&claim_id).copied().unwrap_or_default()
        }

        fn claim(&mut self, caller: Address, public_values: &[u8]) -> Result<U256, String> {
            let values = PublicValues::decode(public_values).map_err(|e| e.to_string())?;
            if values.msgSender != caller {
                return Err("InvalidClaim: sender mismatch".into());
            }
            let amount = self.balance_of(values.claimId);
            if amount.is_zero() {
                return Err("InvalidClaim: no balance to claim".into());
            }
            self.balances.insert(values.claimId, U256::ZERO);
            *self.paid.entry(caller).or_default() += amount;
            Ok(amount)
        }
    }

    #[test]
    fn test_deposit_then_claim() {
        let email = "recipient@example.com";
        let wallet = Address::repeat_byte(0xC1);
        let mut custody = Custody::default();

        // Sender deposits under the recipient's claim ID
        custody.deposit(claim_id(email), U256::from(1_000u64));
        custody.deposit(claim_id(email), U256::from(500u64));
        assert_eq!(custody.balance_of(claim_id(email)), U256::from(1_500u64));

        // Recipient proves ownership of the email, bound to their wallet
        let inputs = ProofInputs::new(IdentityProvider::Test, issue_token(email, wallet));
        let public_values = run_claim_program(&inputs).unwrap();
        assert_eq!(public_values.len(), PUBLIC_VALUES_LEN);

        let paid = custody.claim(wallet, &public_values).unwrap();
        assert_eq!(paid, U256::from(1_500u64));
        assert_eq!(custody.balance_of(claim_id(email)), U256::ZERO);

        // Second claim finds nothing
        assert!(custody.claim(wallet, &public_values).is_err());
    }

    #[test]
    fn test_proof_cannot_be_replayed_by_another_wallet() {
        let email = "recipient@example.com";
        let wallet = Address::repeat_byte(0xC1);
        let thief = Address::repeat_byte(0xEE);
        let mut custody = Custody::default();
        custody.deposit(claim_id(email), U256::from(10u64));

        let inputs = ProofInputs::new(IdentityProvider::Test, issue_token(email, wallet));
        let public_values = run_claim_program(&inputs).unwrap();

        assert!(custody.claim(thief, &public_values).is_err());
        assert_eq!(custody.balance_of(claim_id(email)), U256::from(10u64));
    }

    #[test]
    fn test_claim_only_reaches_own_email() {
        let mut custody = Custody::default();
        custody.deposit(claim_id("alice@example.com"), U256::from(7u64));

        let wallet = Address::repeat_byte(0x0B);
        let inputs = ProofInputs::new(
            IdentityProvider::Test,
            issue_token("bob@example.com", wallet),
        );
        let public_values = run_claim_program(&inputs).unwrap();

        assert!(custody.claim(wallet, &public_values).is_err());
        assert_eq!(custody.balance_of(claim_id("alice@example.com")), U256::from(7u64));
    }

    #[test]
    fn test_program_rejects_wrong_provider() {
        let wallet = Address::repeat_byte(0x0C);
        let inputs = ProofInputs::new(
            IdentityProvider::Google,
            issue_token("carol@example.com", wallet),
        );
        assert!(matches!(
            run_claim_program(&inputs),
            Err(OidcError::UnknownKeyId(_))
        ));

        let inputs = ProofInputs {
            identity_provider: U256::from(9u64),
            jwt: issue_token("carol@example.com", wallet),
        };
        assert!(matches!(
            run_claim_program(&inputs),
            Err(OidcError::UnknownProvider(_))
        ));
    }

    #[test]
    fn test_program_ignores_expiry() {
        // The zkVM has no clock; expiry is enforced by the prover service.
        let wallet = Address::repeat_byte(0x0D);
        let jwt = issue_token_with(json!({
            "iss": "https://test.bonsai-pay.dev",
            "exp": 1u64,
            "email": "dave@example.com",
            "nonce": wallet.to_checksum(None),
        }));
        let inputs = ProofInputs::new(IdentityProvider::Test, jwt);
        let values = PublicValues::decode(&run_claim_program(&inputs).unwrap()).unwrap();
        assert_eq!(values.msgSender, wallet);
        assert_eq!(values.claimId, claim_id("dave@example.com"));
    }

    #[test]
    fn test_inputs_serialize_json() {
        let inputs = ProofInputs::new(
            IdentityProvider::Test,
            issue_token("erin@example.com", Address::repeat_byte(1)),
        );
        let json = serde_json::to_string_pretty(&inputs).unwrap();
        let parsed: ProofInputs = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, inputs);
    }

    #[test]
    fn test_public_values_hex_matches_contract_layout() {
        let wallet: Address = "0x00000000000000000000000000000000000000c1"
            .parse()
            .unwrap();
        let encoded = PublicValues::new(wallet, claim_id("")).encode();
        assert_eq!(
            hex::encode(encoded),
            concat!(
                "00000000000000000000000000000000000000000000000000000000000000c1",
                "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
            )
        );
    }
}
