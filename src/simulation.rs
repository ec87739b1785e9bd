use std::sync::{Arc, Mutex};

use crate::{
    object::{format_quantity, Address},
    rpc::{TransactionReceipt, TransactionRequest, RPC},
};

pub const FAKE_COINBASE: &str = "0x627306090abab3a6e1400e9345bc60c78a8bef57";
pub const FAKE_CONTRACT_ADDRESS: &str = "0x8cdaf0cd259887258bc13a92c0a6da92698644c0";
pub const FAKE_NETWORK_ID: &str = "5777";
pub const FAKE_TX_HASH: &str =
    "0x2c7b6a4b3ed1c09f56bd7b5c3a3e2e1d2dbd6d6b0f1f3a1c0c4a1b7e9e1f0a11";

/// One request received by [`FakeRpcClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcCall {
    NetworkId,
    Coinbase,
    UnlockAccount {
        account: Address,
        passphrase: String,
        duration: u64,
    },
    SendTransaction(TransactionRequest),
    TransactionReceipt(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeReceipt {
    Success,
    Reverted,
    /// The transaction never gets mined
    Pending,
}

/// In-memory endpoint that answers like a dev node and records every call in order
#[derive(Clone)]
pub struct FakeRpcClient {
    coinbase: Option<Address>,
    unlock_result: bool,
    receipt: FakeReceipt,
    pending_polls: usize,
    calls: Arc<Mutex<Vec<RpcCall>>>,
}

impl Default for FakeRpcClient {
    fn default() -> Self {
        FakeRpcClient {
            coinbase: FAKE_COINBASE.parse().ok(),
            unlock_result: true,
            receipt: FakeReceipt::Success,
            pending_polls: 0,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FakeRpcClient {
    pub fn with_coinbase(mut self, coinbase: Option<Address>) -> Self {
        self.coinbase = coinbase;
        self
    }

    pub fn with_unlock_result(mut self, unlocked: bool) -> Self {
        self.unlock_result = unlocked;
        self
    }

    pub fn with_receipt(mut self, receipt: FakeReceipt) -> Self {
        self.receipt = receipt;
        self
    }

    /// Answer `null` to this many receipt queries before the receipt shows up
    pub fn with_pending_polls(mut self, polls: usize) -> Self {
        self.pending_polls = polls;
        self
    }

    pub fn calls(&self) -> Vec<RpcCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn record(&self, call: RpcCall) -> eyre::Result<usize> {
        let mut calls = self
            .calls
            .lock()
            .map_err(|_| eyre::eyre!("fake rpc call log poisoned"))?;
        calls.push(call);
        Ok(calls.len())
    }

    fn receipt_polls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, RpcCall::TransactionReceipt(_)))
            .count()
    }
}

#[async_trait::async_trait]
impl RPC for FakeRpcClient {
    async fn network_id(&self) -> eyre::Result<String> {
        self.record(RpcCall::NetworkId)?;
        Ok(FAKE_NETWORK_ID.to_string())
    }

    async fn coinbase(&self) -> eyre::Result<Option<Address>> {
        self.record(RpcCall::Coinbase)?;
        Ok(self.coinbase.clone())
    }

    async fn unlock_account(
        &self,
        account: &Address,
        passphrase: &str,
        duration: u64,
    ) -> eyre::Result<bool> {
        self.record(RpcCall::UnlockAccount {
            account: account.clone(),
            passphrase: passphrase.to_string(),
            duration,
        })?;
        Ok(self.unlock_result)
    }

    async fn send_transaction(&self, transaction: TransactionRequest) -> eyre::Result<String> {
        self.record(RpcCall::SendTransaction(transaction))?;
        Ok(FAKE_TX_HASH.to_string())
    }

    async fn transaction_receipt(
        &self,
        tx_hash: &str,
    ) -> eyre::Result<Option<TransactionReceipt>> {
        self.record(RpcCall::TransactionReceipt(tx_hash.to_string()))?;
        if self.receipt == FakeReceipt::Pending || self.receipt_polls() <= self.pending_polls {
            return Ok(None);
        }
        let reverted = self.receipt == FakeReceipt::Reverted;
        Ok(Some(TransactionReceipt {
            transaction_hash: tx_hash.to_string(),
            block_number: format_quantity(1),
            gas_used: format_quantity(if reverted { 21_000 } else { 241_005 }),
            contract_address: if reverted {
                None
            } else {
                Some(FAKE_CONTRACT_ADDRESS.parse()?)
            },
            status: Some(if reverted { "0x0" } else { "0x1" }.to_string()),
        }))
    }
}
