use alloy_primitives::{Address, Bytes, TxHash, TxKind};
use alloy_provider::{Provider, ProviderBuilder, RootProvider};
use alloy_rpc_types_eth::{TransactionInput, TransactionReceipt, TransactionRequest};
use alloy_transport::{BoxTransport, TransportErrorKind, TransportResult};
use async_trait::async_trait;
use serde_json::Value;
use tracing::trace;
use url::Url;

use super::{LedgerProvider, LOG_TARGET};

/// A [`LedgerProvider`] speaking JSON-RPC over HTTP.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    url: Url,
    inner: RootProvider<BoxTransport>,
}

impl HttpProvider {
    pub fn new(url: Url) -> Self {
        let inner = ProviderBuilder::new().on_http(url.clone()).boxed();
        Self { url, inner }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl LedgerProvider for HttpProvider {
    async fn network_id(&self) -> TransportResult<u64> {
        let value: Value = self.inner.raw_request("net_version".into(), ()).await?;
        trace!(target: LOG_TARGET, url = %self.url, %value, "Fetched network id.");
        parse_network_id(&value)
    }

    async fn accounts(&self) -> TransportResult<Vec<Address>> {
        self.inner.get_accounts().await
    }

    async fn request_accounts(&self) -> TransportResult<Vec<Address>> {
        self.inner.raw_request("eth_requestAccounts".into(), ()).await
    }

    async fn code_at(&self, address: Address) -> TransportResult<Bytes> {
        self.inner.get_code_at(address).await
    }

    async fn call(&self, to: Address, input: Bytes) -> TransportResult<Bytes> {
        let tx = TransactionRequest {
            to: Some(TxKind::Call(to)),
            input: TransactionInput::new(input),
            ..Default::default()
        };
        self.inner.call(&tx).await
    }

    async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        input: Bytes,
    ) -> TransportResult<TxHash> {
        let tx = TransactionRequest {
            from: Some(from),
            to: Some(TxKind::Call(to)),
            input: TransactionInput::new(input),
            ..Default::default()
        };
        let pending = self.inner.send_transaction(tx).await?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> TransportResult<Option<TransactionReceipt>> {
        self.inner.get_transaction_receipt(hash).await
    }

    async fn block_number(&self) -> TransportResult<u64> {
        self.inner.get_block_number().await
    }

    async fn is_listening(&self) -> TransportResult<bool> {
        self.inner.raw_request("net_listening".into(), ()).await
    }
}

/// `net_version` is specified as a decimal string but some nodes answer with a number.
fn parse_network_id(value: &Value) -> TransportResult<u64> {
    let id = match value {
        Value::String(s) => s.parse::<u64>().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    };

    id.ok_or_else(|| TransportErrorKind::custom_str(&format!("invalid network id: {value}")))
}
