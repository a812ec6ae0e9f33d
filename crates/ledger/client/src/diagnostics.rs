//! Step-by-step connectivity check of provider, network and contract.

use std::fmt;

use alloy_primitives::Address;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::manifest::DeploymentManifest;
use crate::provider::{resolve_provider, ProviderKind, ResolvedProvider};

const LOG_TARGET: &str = "ledger_client::diagnostics";

/// What a successful [`diagnose`] run found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionReport {
    pub provider: ProviderKind,
    pub network_id: u64,
    pub contract_address: Address,
    pub accounts: Vec<Address>,
    pub block_number: u64,
    /// Number of functions in the contract interface.
    pub contract_methods: usize,
}

impl ConnectionReport {
    pub fn active_account(&self) -> Option<Address> {
        self.accounts.first().copied()
    }
}

impl fmt::Display for ConnectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Network ID: {}", self.network_id)?;
        writeln!(f, "Contract Address: {}", self.contract_address)?;
        writeln!(f, "Accounts: {}", self.accounts.len())?;
        writeln!(f, "Block Number: {}", self.block_number)?;
        writeln!(f, "Provider: {}", self.provider)?;
        match self.active_account() {
            Some(account) => writeln!(f, "Active Account: {account}")?,
            None => writeln!(f, "Active Account: No accounts available")?,
        }
        write!(f, "Contract Methods: {}", self.contract_methods)
    }
}

/// Runs the diagnostics against the provider and manifest described by `config`.
pub async fn diagnose(config: &ClientConfig) -> Result<ConnectionReport> {
    let resolved = resolve_provider(config).await;
    let manifest = config.load_manifest()?;
    diagnose_with(&resolved, &manifest).await
}

/// Checks, in order, that the node listens, that the network has a deployment in `manifest`
/// and that the deployment has code. Stops at the first failure.
pub async fn diagnose_with(
    resolved: &ResolvedProvider,
    manifest: &DeploymentManifest,
) -> Result<ConnectionReport> {
    let provider = resolved.provider.as_ref();

    debug!(target: LOG_TARGET, provider = %resolved.kind, "Testing connection.");
    if !provider.is_listening().await.map_err(Error::ProviderUnavailable)? {
        return Err(Error::NotListening);
    }

    let network_id = provider.network_id().await.map_err(Error::ProviderUnavailable)?;
    let accounts = provider
        .accounts()
        .await
        .map_err(|source| Error::RpcCall { method: "eth_accounts", source })?;
    let block_number = provider
        .block_number()
        .await
        .map_err(|source| Error::RpcCall { method: "eth_blockNumber", source })?;
    debug!(target: LOG_TARGET, network_id, accounts = accounts.len(), block_number, "Network info.");

    let contract_address = manifest.address(network_id).ok_or_else(|| {
        Error::NetworkUnsupported { network_id, available: manifest.available_networks() }
    })?;

    let code = provider
        .code_at(contract_address)
        .await
        .map_err(|source| Error::RpcCall { method: "eth_getCode", source })?;
    if code.is_empty() {
        return Err(Error::ContractNotFound { address: contract_address });
    }

    Ok(ConnectionReport {
        provider: resolved.kind,
        network_id,
        contract_address,
        accounts,
        block_number,
        contract_methods: manifest.abi.functions().count(),
    })
}
