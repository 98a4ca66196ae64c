//! Custody contract bindings and a thin client over them.

use alloy::{
    contract::Event,
    network::Ethereum,
    primitives::{Address, B256, U256},
    providers::Provider,
    rpc::types::Log,
    sol,
};
use anyhow::{ensure, Context, Result};
use bonsai_pay_lib::claim_id;
use tracing::info;

use crate::prover::ClaimProof;

sol! {
    #[sol(rpc)]
    interface IBonsaiPay {
        function balanceOf(bytes32 claimId) external view returns (uint256);
        function bonsaiPayVKey() external view returns (bytes32);
        function claim(bytes calldata proof, bytes calldata publicValues) external;
        function deposit(bytes32 claimId) external payable;
        function verifier() external view returns (address);

        event Claimed(address indexed recipient, bytes32 indexed claimId, uint256 amount);
        event Deposited(bytes32 indexed claimId, uint256 amount);

        error InvalidClaim(string message);
        error InvalidDeposit(string message);
        error TransferFailed();
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CustodyEvent {
    Deposited { amount: U256 },
    Claimed { recipient: Address, amount: U256 },
}

/// A custody event for one claim ID, positioned in the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub block: u64,
    pub log_index: u64,
    pub tx_hash: Option<B256>,
    pub event: CustodyEvent,
}

impl HistoryEntry {
    fn from_log(log: &Log, event: CustodyEvent) -> Self {
        HistoryEntry {
            block: log.block_number.unwrap_or(0),
            log_index: log.log_index.unwrap_or(0),
            tx_hash: log.transaction_hash,
            event,
        }
    }
}

/// Order entries as they happened on chain.
pub fn sort_history(entries: &mut [HistoryEntry]) {
    entries.sort_by_key(|e| (e.block, e.log_index));
}

pub struct CustodyClient<P> {
    contract: IBonsaiPay::IBonsaiPayInstance<P>,
    /// Signing account; `None` for read-only clients
    sender: Option<Address>,
}

impl<P: Provider> CustodyClient<P> {
    pub fn new(address: Address, provider: P, sender: Option<Address>) -> Self {
        CustodyClient {
            contract: IBonsaiPay::new(address, provider),
            sender,
        }
    }

    pub async fn balance_of(&self, email: &str) -> Result<U256> {
        Ok(self.contract.balanceOf(claim_id(email)).call().await?)
    }

    /// Deposit `amount` wei for whoever proves ownership of `email`.
    pub async fn deposit(&self, email: &str, amount: U256) -> Result<B256> {
        ensure!(amount > U256::ZERO, "deposit amount must be positive");
        self.sender.context("deposit requires PRIVATE_KEY")?;
        let id = claim_id(email);
        let receipt = self
            .contract
            .deposit(id)
            .value(amount)
            .send()
            .await?
            .get_receipt()
            .await?;
        ensure!(receipt.status(), "deposit reverted: {}", receipt.transaction_hash);
        info!(claim_id = %id, %amount, tx = %receipt.transaction_hash, "deposited");
        Ok(receipt.transaction_hash)
    }

    /// Submit a claim proof. The contract pays `msgSender`, so the proof
    /// must have been generated for the signing account.
    pub async fn claim(&self, proof: &ClaimProof) -> Result<B256> {
        let sender = self.sender.context("claim requires PRIVATE_KEY")?;
        let values = proof.public_values()?;
        ensure!(
            values.msgSender == sender,
            "proof is bound to {} but the signer is {sender}",
            values.msgSender
        );
        let receipt = self
            .contract
            .claim(proof.proof.clone(), proof.public_values.clone())
            .send()
            .await?
            .get_receipt()
            .await?;
        ensure!(receipt.status(), "claim reverted: {}", receipt.transaction_hash);
        info!(claim_id = %values.claimId, tx = %receipt.transaction_hash, "claimed");
        Ok(receipt.transaction_hash)
    }

    /// Deposits and claims for `email` since `from_block`, oldest first.
    pub async fn history(&self, email: &str, from_block: u64) -> Result<Vec<HistoryEntry>> {
        let id = claim_id(email);
        let mut entries = Vec::new();

        for (event, log) in self.deposited_filter(id, from_block).query().await? {
            entries.push(HistoryEntry::from_log(
                &log,
                CustodyEvent::Deposited { amount: event.amount },
            ));
        }
        for (event, log) in self.claimed_filter(id, from_block).query().await? {
            entries.push(HistoryEntry::from_log(
                &log,
                CustodyEvent::Claimed {
                    recipient: event.recipient,
                    amount: event.amount,
                },
            ));
        }

        sort_history(&mut entries);
        Ok(entries)
    }

    // claimId is the first indexed topic of Deposited and the second of Claimed.
    fn deposited_filter(
        &self,
        id: B256,
        from_block: u64,
    ) -> Event<&P, IBonsaiPay::Deposited, Ethereum> {
        self.contract.Deposited_filter().from_block(from_block).topic1(id)
    }

    fn claimed_filter(
        &self,
        id: B256,
        from_block: u64,
    ) -> Event<&P, IBonsaiPay::Claimed, Ethereum> {
        self.contract.Claimed_filter().from_block(from_block).topic2(id)
    }
}
