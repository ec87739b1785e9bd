use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use eyre::WrapErr;
use reqwest::Url;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::object::Address;

/// Transaction fields accepted by `eth_sendTransaction`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub from: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    pub data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    pub block_number: String,
    pub gas_used: String,
    #[serde(default)]
    pub contract_address: Option<Address>,
    /// `0x1` on success, `0x0` on revert, absent on pre-byzantium chains
    #[serde(default)]
    pub status: Option<String>,
}

impl TransactionReceipt {
    pub fn is_reverted(&self) -> bool {
        self.status.as_deref() == Some("0x0")
    }
}

/// The endpoint operations a migration needs
#[async_trait::async_trait]
pub trait RPC: Clone + Send + Sync {
    async fn network_id(&self) -> eyre::Result<String>;

    async fn coinbase(&self) -> eyre::Result<Option<Address>>;

    async fn unlock_account(
        &self,
        account: &Address,
        passphrase: &str,
        duration: u64,
    ) -> eyre::Result<bool>;

    async fn send_transaction(&self, transaction: TransactionRequest) -> eyre::Result<String>;

    async fn transaction_receipt(&self, tx_hash: &str)
        -> eyre::Result<Option<TransactionReceipt>>;
}

const NO_PARAMS: [(); 0] = [];

#[derive(Serialize)]
struct JsonRpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct JsonRpcResponse<R> {
    result: Option<R>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

/// HTTP JSON-RPC client of an Ethereum-compatible node
#[derive(Clone)]
pub struct RpcClient {
    client: reqwest::Client,
    url: Url,
    id: Arc<AtomicU64>,
}

impl RpcClient {
    pub fn new(url: Url) -> Self {
        RpcClient {
            client: reqwest::Client::new(),
            url,
            id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn call<P, R>(&self, method: &str, params: P) -> eyre::Result<Option<R>>
    where
        P: Serialize + Send,
        R: DeserializeOwned + Send,
    {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        tracing::debug!(method, id = request.id, url = %self.url, "rpc request");
        let response = self
            .client
            .post(self.url.clone())
            .json(&request)
            .send()
            .await
            .wrap_err_with(|| format!("{method}: cannot reach {}", self.url))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(eyre::eyre!("{method}: http status {status}: {body}"));
        }
        let response: JsonRpcResponse<R> = response
            .json()
            .await
            .wrap_err_with(|| format!("{method}: malformed response"))?;
        if let Some(error) = response.error {
            return Err(eyre::eyre!(
                "{method}: rpc error {}: {}",
                error.code,
                error.message
            ));
        }
        Ok(response.result)
    }
}

#[async_trait::async_trait]
impl RPC for RpcClient {
    async fn network_id(&self) -> eyre::Result<String> {
        self.call("net_version", NO_PARAMS)
            .await?
            .ok_or(eyre::eyre!("net_version: no network id returned"))
    }

    async fn coinbase(&self) -> eyre::Result<Option<Address>> {
        self.call("eth_coinbase", NO_PARAMS).await
    }

    async fn unlock_account(
        &self,
        account: &Address,
        passphrase: &str,
        duration: u64,
    ) -> eyre::Result<bool> {
        let unlocked = self
            .call("personal_unlockAccount", (account, passphrase, duration))
            .await?;
        Ok(unlocked.unwrap_or(false))
    }

    async fn send_transaction(&self, transaction: TransactionRequest) -> eyre::Result<String> {
        self.call("eth_sendTransaction", [transaction])
            .await?
            .ok_or(eyre::eyre!("eth_sendTransaction: no transaction hash returned"))
    }

    async fn transaction_receipt(
        &self,
        tx_hash: &str,
    ) -> eyre::Result<Option<TransactionReceipt>> {
        self.call("eth_getTransactionReceipt", [tx_hash]).await
    }
}
