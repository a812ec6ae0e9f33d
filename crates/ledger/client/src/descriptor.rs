use std::sync::Arc;

use alloy_primitives::Address;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::manifest::{DeploymentManifest, InterfaceDescriptor};
use crate::provider::LedgerProvider;

const LOG_TARGET: &str = "ledger_client::descriptor";

/// The `{network, address, interface}` triple addressing the deployed contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkDescriptor {
    pub network_id: u64,
    pub contract_address: Address,
    pub interface: Arc<InterfaceDescriptor>,
}

/// Resolves the [`NetworkDescriptor`] of the provider's network from a deployment manifest.
///
/// The first successful resolution is cached, later calls return it without touching the
/// provider until [`DescriptorLoader::invalidate`] is called.
#[derive(Debug)]
pub struct DescriptorLoader {
    manifest: DeploymentManifest,
    interface: Arc<InterfaceDescriptor>,
    verify_code: bool,
    cached: Mutex<Option<NetworkDescriptor>>,
}

impl DescriptorLoader {
    pub fn new(manifest: DeploymentManifest) -> Self {
        let interface = Arc::new(manifest.abi.clone());
        Self { manifest, interface, verify_code: true, cached: Mutex::new(None) }
    }

    /// Whether to check that code is deployed at the manifest address. On by default.
    pub fn with_code_verification(mut self, verify_code: bool) -> Self {
        self.verify_code = verify_code;
        self
    }

    pub fn manifest(&self) -> &DeploymentManifest {
        &self.manifest
    }

    /// Resolves the descriptor for the network `provider` is connected to.
    ///
    /// Fails with [`Error::NetworkUnsupported`] when the manifest has no entry for the network id,
    /// in which case no further call is made, and with [`Error::ContractNotFound`] when the
    /// address holds no code.
    pub async fn load(&self, provider: &dyn LedgerProvider) -> Result<NetworkDescriptor> {
        if let Some(descriptor) = self.cached.lock().clone() {
            trace!(target: LOG_TARGET, network_id = descriptor.network_id, "Using cached descriptor.");
            return Ok(descriptor);
        }

        let network_id = provider.network_id().await.map_err(Error::ProviderUnavailable)?;
        debug!(target: LOG_TARGET, network_id, "Resolving contract descriptor.");

        let contract_address = self.manifest.address(network_id).ok_or_else(|| {
            Error::NetworkUnsupported {
                network_id,
                available: self.manifest.available_networks(),
            }
        })?;

        if self.verify_code {
            let code = provider
                .code_at(contract_address)
                .await
                .map_err(|source| Error::RpcCall { method: "eth_getCode", source })?;

            if code.is_empty() {
                return Err(Error::ContractNotFound { address: contract_address });
            }
        }

        let descriptor =
            NetworkDescriptor { network_id, contract_address, interface: self.interface.clone() };
        *self.cached.lock() = Some(descriptor.clone());

        debug!(target: LOG_TARGET, network_id, address = %contract_address, "Contract descriptor resolved.");
        Ok(descriptor)
    }

    /// Drops the cached descriptor, the next [`DescriptorLoader::load`] queries the provider.
    pub fn invalidate(&self) {
        self.cached.lock().take();
    }
}
