//! Typed binding of the supply chain contract.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};
use ledger_utils::{TransactionResult, TxnConfig};
use tracing::{debug, trace};

use crate::descriptor::NetworkDescriptor;
use crate::entity::{to_u64, Product, Supplier};
use crate::error::{Error, Result};
use crate::provider::LedgerProvider;
use crate::waiter::TransactionWaiter;

const LOG_TARGET: &str = "ledger_client::contract";

sol! {
    #[allow(missing_docs)]
    #[sol(all_derives)]
    interface SupplyChain {
        function createProduct(string name, string description, uint256 price) external;
        function registerSupplier(string name, string location, string contact) external;
        function transferProduct(uint256 productId, address to) external;
        function products(uint256 index) external view returns (uint256 id, string name, string description, uint256 price, address owner, uint256 created);
        function suppliers(address account) external view returns (string name, string location, string contact, bool isRegistered);
        function productCount() external view returns (uint256 count);
    }
}

/// The deployed contract bound to a provider.
///
/// Reads are `eth_call`s and need no account. Writes are `eth_sendTransaction`s from an account
/// the provider can sign for. Neither is retried here.
#[derive(Debug, Clone)]
pub struct ContractHandle {
    provider: Arc<dyn LedgerProvider>,
    descriptor: NetworkDescriptor,
}

impl ContractHandle {
    pub fn bind(provider: Arc<dyn LedgerProvider>, descriptor: NetworkDescriptor) -> Self {
        Self { provider, descriptor }
    }

    pub fn address(&self) -> Address {
        self.descriptor.contract_address
    }

    pub fn descriptor(&self) -> &NetworkDescriptor {
        &self.descriptor
    }

    pub fn provider(&self) -> &Arc<dyn LedgerProvider> {
        &self.provider
    }

    /// Calls a read-only function and decodes its return values.
    pub async fn read<C: SolCall>(&self, call: &C) -> Result<C::Return> {
        self.ensure_function(C::SIGNATURE, true)?;

        trace!(target: LOG_TARGET, method = C::SIGNATURE, "Calling contract.");
        let output = self
            .provider
            .call(self.address(), call.abi_encode().into())
            .await
            .map_err(|source| Error::RpcCall { method: C::SIGNATURE, source })?;

        C::abi_decode_returns(&output, true)
            .map_err(|source| Error::Decode { method: C::SIGNATURE, source })
    }

    /// Sends a state-changing function call from `from`.
    ///
    /// Returns as soon as the node accepted the transaction unless `txn.wait` is set, in which
    /// case the receipt is awaited and a reverted transaction is an error.
    pub async fn write<C: SolCall>(
        &self,
        call: &C,
        from: Address,
        txn: &TxnConfig,
    ) -> Result<TransactionResult> {
        self.ensure_function(C::SIGNATURE, false)?;

        let hash = self
            .provider
            .send_transaction(from, self.address(), call.abi_encode().into())
            .await
            .map_err(|source| Error::RpcCall { method: C::SIGNATURE, source })?;
        debug!(target: LOG_TARGET, method = C::SIGNATURE, %from, %hash, "Transaction sent.");

        if !txn.wait {
            return Ok(TransactionResult::Hash(hash));
        }

        let receipt = TransactionWaiter::new(hash, self.provider.as_ref()).await?;
        debug!(target: LOG_TARGET, %hash, block = ?receipt.block_number, "Transaction included.");

        if txn.receipt {
            Ok(TransactionResult::HashReceipt(hash, Box::new(receipt)))
        } else {
            Ok(TransactionResult::Hash(hash))
        }
    }

    pub async fn product_count(&self) -> Result<u64> {
        let count = self.read(&SupplyChain::productCountCall {}).await?.count;
        to_u64(count)
    }

    /// Reads the product stored at `index`. An index with no product behind it is
    /// [`Error::EntityNotFound`].
    pub async fn product(&self, index: u64) -> Result<Product> {
        let ret = self.read(&SupplyChain::productsCall { index: U256::from(index) }).await?;

        if ret.id.is_zero() {
            return Err(Error::EntityNotFound(index));
        }

        Product::try_from(ret)
    }

    pub async fn supplier(&self, account: Address) -> Result<Supplier> {
        let ret = self.read(&SupplyChain::suppliersCall { account }).await?;
        Ok(Supplier::from(ret))
    }

    fn ensure_function(&self, signature: &'static str, read_only: bool) -> Result<()> {
        let function = self
            .descriptor
            .interface
            .function(signature)
            .ok_or(Error::UnknownMethod(signature))?;

        match (read_only, function.is_read_only()) {
            (true, false) => Err(Error::MethodKind { method: signature, expected: "read-only" }),
            (false, true) => Err(Error::MethodKind { method: signature, expected: "state-changing" }),
            _ => Ok(()),
        }
    }
}
