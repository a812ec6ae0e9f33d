//! Provider resolution.
//!
//! A provider is the JSON-RPC transport through which every call reaches the ledger. An
//! injected, wallet-style provider is preferred when one is configured and grants account
//! access; otherwise the client talks directly to the fixed local endpoint.

mod http;
pub mod watcher;

use std::fmt;
use std::sync::Arc;

use alloy_primitives::{Address, Bytes, TxHash};
use alloy_rpc_types_eth::TransactionReceipt;
use alloy_transport::TransportResult;
use async_trait::async_trait;
use tracing::{debug, info};

pub use self::http::HttpProvider;
pub use self::watcher::{ProviderEvent, ProviderWatcher};
use crate::config::ClientConfig;

pub(crate) const LOG_TARGET: &str = "ledger_client::provider";

/// The JSON-RPC surface the client needs from a ledger node.
#[async_trait]
pub trait LedgerProvider: fmt::Debug + Send + Sync {
    /// `net_version`, the network identifier deployments are keyed by.
    async fn network_id(&self) -> TransportResult<u64>;

    /// `eth_accounts`, the accounts the provider is authorized to sign for.
    async fn accounts(&self) -> TransportResult<Vec<Address>>;

    /// `eth_requestAccounts`, asks the wallet behind the provider for account access.
    async fn request_accounts(&self) -> TransportResult<Vec<Address>>;

    /// `eth_getCode` at the latest block.
    async fn code_at(&self, address: Address) -> TransportResult<Bytes>;

    /// `eth_call` against `to` with ABI encoded `input`.
    async fn call(&self, to: Address, input: Bytes) -> TransportResult<Bytes>;

    /// `eth_sendTransaction`, signing is left to the node or wallet holding `from`.
    async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        input: Bytes,
    ) -> TransportResult<TxHash>;

    /// `eth_getTransactionReceipt`, `None` while the transaction is pending.
    async fn transaction_receipt(&self, hash: TxHash)
        -> TransportResult<Option<TransactionReceipt>>;

    /// `eth_blockNumber`.
    async fn block_number(&self) -> TransportResult<u64>;

    /// `net_listening`.
    async fn is_listening(&self) -> TransportResult<bool>;
}

/// How the active provider was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// The injected wallet granted account access.
    Injected,
    /// An injected wallet was found but refused account access.
    DirectWalletDenied,
    /// No injected wallet, direct connection to the local endpoint.
    Direct,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Injected => write!(f, "Injected wallet"),
            ProviderKind::DirectWalletDenied => write!(f, "Direct (wallet denied)"),
            ProviderKind::Direct => write!(f, "Direct"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedProvider {
    pub kind: ProviderKind,
    pub provider: Arc<dyn LedgerProvider>,
}

/// Resolves the provider described by `config`.
///
/// Never fails: when neither endpoint answers, the failure surfaces on the first call made
/// through the returned provider.
pub async fn resolve_provider(config: &ClientConfig) -> ResolvedProvider {
    let injected = config.wallet_url.clone().map(|url| {
        debug!(target: LOG_TARGET, %url, "Found injected wallet endpoint.");
        Arc::new(HttpProvider::new(url)) as Arc<dyn LedgerProvider>
    });
    let direct = Arc::new(HttpProvider::new(config.rpc_url.clone()));

    resolve_from(injected, direct).await
}

/// Picks between an optional injected provider and the direct one.
///
/// The injected provider wins only if its authorization request succeeds. A denial is not an
/// error, it selects the direct provider.
pub async fn resolve_from(
    injected: Option<Arc<dyn LedgerProvider>>,
    direct: Arc<dyn LedgerProvider>,
) -> ResolvedProvider {
    let Some(injected) = injected else {
        info!(target: LOG_TARGET, "No injected wallet, using direct connection.");
        return ResolvedProvider { kind: ProviderKind::Direct, provider: direct };
    };

    match injected.request_accounts().await {
        Ok(accounts) => {
            info!(target: LOG_TARGET, accounts = accounts.len(), "Wallet access granted.");
            ResolvedProvider { kind: ProviderKind::Injected, provider: injected }
        }
        Err(error) => {
            info!(target: LOG_TARGET, %error, "Wallet access denied, using direct connection.");
            ResolvedProvider { kind: ProviderKind::DirectWalletDenied, provider: direct }
        }
    }
}
