//! In-memory provider emulating a node with the supply chain contract deployed.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use alloy_primitives::{address, Address, Bytes, TxHash, B256, U256};
use alloy_rpc_types_eth::TransactionReceipt;
use alloy_sol_types::{SolCall, SolInterface};
use alloy_transport::{TransportErrorKind, TransportResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use crate::contract::SupplyChain::{self, SupplyChainCalls};
use crate::contract::ContractHandle;
use crate::descriptor::NetworkDescriptor;
use crate::entity::{Product, Supplier};
use crate::manifest::DeploymentManifest;
use crate::provider::LedgerProvider;

/// Address of the contract in the bundled manifest.
pub const CONTRACT_ADDRESS: Address = address!("7F2340066f633d999b7da8EF78C0df75C852B478");
pub const ACCOUNT_A: Address = address!("627306090abaB3A6e1400e9345bC60c78a8BEf57");
pub const ACCOUNT_B: Address = address!("f17f52151EbEF6C7334FAD080c5704D77216b732");

/// Creation time given to every product created through the mock.
pub const CREATED_AT: u64 = 1_700_000_000;

/// A JSON-RPC request seen by the [`MockProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    NetworkId,
    Accounts,
    RequestAccounts,
    Code(Address),
    /// `eth_call`, identified by the selector of the contract function.
    Call([u8; 4]),
    Send { from: Address, to: Address, input: Bytes },
    Receipt(TxHash),
    BlockNumber,
    IsListening,
}

#[derive(Debug)]
struct PendingReceipt {
    receipt: TransactionReceipt,
    available_after: usize,
    polls: usize,
}

#[derive(Debug, Default)]
struct MockState {
    network_id: Option<u64>,
    listening: bool,
    authorized: bool,
    accounts: Vec<Address>,
    code: HashMap<Address, Bytes>,
    products: BTreeMap<u64, Product>,
    product_count: Option<u64>,
    failing_indices: BTreeSet<u64>,
    fail_count: bool,
    suppliers: HashMap<Address, Supplier>,
    write_error: Option<String>,
    block_number: u64,
    sent: u64,
    receipts: HashMap<TxHash, PendingReceipt>,
    calls: Vec<RecordedCall>,
}

impl MockState {
    fn count(&self) -> u64 {
        self.product_count.unwrap_or_else(|| self.products.keys().max().copied().unwrap_or(0))
    }

    fn apply(&mut self, from: Address, call: SupplyChainCalls) {
        match call {
            SupplyChainCalls::createProduct(call) => {
                let id = self.count() + 1;
                self.product_count = Some(id);
                self.products.insert(
                    id,
                    Product {
                        id,
                        name: call.name,
                        description: call.description,
                        price: call.price,
                        owner: from,
                        created_at: CREATED_AT,
                    },
                );
            }
            SupplyChainCalls::registerSupplier(call) => {
                self.suppliers.insert(
                    from,
                    Supplier {
                        name: call.name,
                        location: call.location,
                        contact: call.contact,
                        is_registered: true,
                    },
                );
            }
            SupplyChainCalls::transferProduct(call) => {
                let id = call.productId.to::<u64>();
                if let Some(product) = self.products.get_mut(&id) {
                    product.owner = call.to;
                }
            }
            _ => {}
        }
    }
}

/// A scriptable [`LedgerProvider`] recording every request it receives.
#[derive(Debug)]
pub struct MockProvider {
    state: Mutex<MockState>,
}

impl MockProvider {
    /// A listening node on `network_id` with the contract deployed at [`CONTRACT_ADDRESS`], no
    /// accounts and no products.
    pub fn new(network_id: u64) -> Self {
        let mut state = MockState {
            network_id: Some(network_id),
            listening: true,
            authorized: true,
            ..Default::default()
        };
        state.code.insert(CONTRACT_ADDRESS, Bytes::from_static(&[0x60, 0x80, 0x60, 0x40]));
        Self { state: Mutex::new(state) }
    }

    /// A provider failing every request.
    pub fn unreachable() -> Self {
        let provider = Self::new(0);
        provider.set_network_id(None);
        provider
    }

    pub fn with_accounts(mut self, accounts: Vec<Address>) -> Self {
        self.state.get_mut().accounts = accounts;
        self
    }

    pub fn deny_authorization(mut self) -> Self {
        self.state.get_mut().authorized = false;
        self
    }

    pub fn not_listening(mut self) -> Self {
        self.state.get_mut().listening = false;
        self
    }

    pub fn without_code(mut self) -> Self {
        self.state.get_mut().code.clear();
        self
    }

    pub fn with_products(mut self, products: Vec<Product>) -> Self {
        self.state.get_mut().products = products.into_iter().map(|p| (p.id, p)).collect();
        self
    }

    /// Overrides the value returned by `productCount()`.
    pub fn with_product_count(mut self, count: u64) -> Self {
        self.state.get_mut().product_count = Some(count);
        self
    }

    /// Makes `products(index)` fail.
    pub fn fail_index(mut self, index: u64) -> Self {
        self.state.get_mut().failing_indices.insert(index);
        self
    }

    /// Makes `productCount()` fail.
    pub fn fail_count(mut self) -> Self {
        self.state.get_mut().fail_count = true;
        self
    }

    /// Makes every `eth_sendTransaction` fail with `message`.
    pub fn fail_writes(mut self, message: &str) -> Self {
        self.state.get_mut().write_error = Some(message.to_string());
        self
    }

    pub fn with_supplier(mut self, account: Address, supplier: Supplier) -> Self {
        self.state.get_mut().suppliers.insert(account, supplier);
        self
    }

    pub fn with_block_number(mut self, block_number: u64) -> Self {
        self.state.get_mut().block_number = block_number;
        self
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        self.state.lock().accounts = accounts;
    }

    /// `None` makes the provider unreachable.
    pub fn set_network_id(&self, network_id: Option<u64>) {
        self.state.lock().network_id = network_id;
    }

    pub fn set_code(&self, address: Address, code: Bytes) {
        self.state.lock().code.insert(address, code);
    }

    /// Makes `receipt` the answer to the `polls`-th receipt request for `hash` and after.
    pub fn set_receipt_after(&self, hash: TxHash, receipt: TransactionReceipt, polls: usize) {
        self.state
            .lock()
            .receipts
            .insert(hash, PendingReceipt { receipt, available_after: polls, polls: 0 });
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// The recorded `eth_sendTransaction` requests.
    pub fn sent(&self) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|c| matches!(c, RecordedCall::Send { .. })).collect()
    }

    /// Number of `eth_call`s made to `C`.
    pub fn call_count<C: SolCall>(&self) -> usize {
        self.calls().into_iter().filter(|c| *c == RecordedCall::Call(C::SELECTOR)).count()
    }

    pub fn products(&self) -> Vec<Product> {
        self.state.lock().products.values().cloned().collect()
    }

    /// Records `call`, then fails if the node is unreachable.
    fn record(&self, call: RecordedCall) -> TransportResult<parking_lot::MutexGuard<'_, MockState>> {
        let mut state = self.state.lock();
        state.calls.push(call);
        if state.network_id.is_none() {
            return Err(TransportErrorKind::custom_str("error sending request: connection refused"));
        }
        Ok(state)
    }
}

#[async_trait]
impl LedgerProvider for MockProvider {
    async fn network_id(&self) -> TransportResult<u64> {
        let state = self.record(RecordedCall::NetworkId)?;
        Ok(state.network_id.unwrap_or_default())
    }

    async fn accounts(&self) -> TransportResult<Vec<Address>> {
        let state = self.record(RecordedCall::Accounts)?;
        Ok(state.accounts.clone())
    }

    async fn request_accounts(&self) -> TransportResult<Vec<Address>> {
        let state = self.record(RecordedCall::RequestAccounts)?;
        if !state.authorized {
            return Err(TransportErrorKind::custom_str("User rejected the request."));
        }
        Ok(state.accounts.clone())
    }

    async fn code_at(&self, address: Address) -> TransportResult<Bytes> {
        let state = self.record(RecordedCall::Code(address))?;
        Ok(state.code.get(&address).cloned().unwrap_or_default())
    }

    async fn call(&self, to: Address, input: Bytes) -> TransportResult<Bytes> {
        let selector = input.get(..4).and_then(|s| <[u8; 4]>::try_from(s).ok()).unwrap_or_default();
        let state = self.record(RecordedCall::Call(selector))?;

        if !state.code.contains_key(&to) {
            return Ok(Bytes::new());
        }

        let call = SupplyChainCalls::abi_decode(&input, true)
            .map_err(|e| TransportErrorKind::custom_str(&e.to_string()))?;

        let output = match call {
            SupplyChainCalls::productCount(_) => {
                if state.fail_count {
                    return Err(TransportErrorKind::custom_str("Returned error: internal error"));
                }
                SupplyChain::productCountCall::abi_encode_returns(&(U256::from(state.count()),))
            }
            SupplyChainCalls::products(call) => {
                let index = call.index.to::<u64>();
                if state.failing_indices.contains(&index) {
                    return Err(TransportErrorKind::custom_str(
                        "Returned error: VM Exception while processing transaction: revert",
                    ));
                }
                let ret = match state.products.get(&index) {
                    Some(p) => (
                        U256::from(p.id),
                        p.name.clone(),
                        p.description.clone(),
                        p.price,
                        p.owner,
                        U256::from(p.created_at),
                    ),
                    None => (U256::ZERO, String::new(), String::new(), U256::ZERO, Address::ZERO, U256::ZERO),
                };
                SupplyChain::productsCall::abi_encode_returns(&ret)
            }
            SupplyChainCalls::suppliers(call) => {
                let s = state.suppliers.get(&call.account).cloned().unwrap_or_default();
                SupplyChain::suppliersCall::abi_encode_returns(&(
                    s.name,
                    s.location,
                    s.contact,
                    s.is_registered,
                ))
            }
            _ => Vec::new(),
        };

        Ok(output.into())
    }

    async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        input: Bytes,
    ) -> TransportResult<TxHash> {
        let mut state = self.record(RecordedCall::Send { from, to, input: input.clone() })?;

        if let Some(message) = &state.write_error {
            return Err(TransportErrorKind::custom_str(message));
        }

        let call = SupplyChainCalls::abi_decode(&input, true)
            .map_err(|e| TransportErrorKind::custom_str(&e.to_string()))?;
        state.apply(from, call);

        state.sent += 1;
        state.block_number += 1;
        Ok(TxHash::left_padding_from(&state.sent.to_be_bytes()))
    }

    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> TransportResult<Option<TransactionReceipt>> {
        let mut state = self.record(RecordedCall::Receipt(hash))?;

        let Some(pending) = state.receipts.get_mut(&hash) else {
            return Ok(None);
        };
        pending.polls += 1;

        if pending.polls >= pending.available_after {
            Ok(Some(pending.receipt.clone()))
        } else {
            Ok(None)
        }
    }

    async fn block_number(&self) -> TransportResult<u64> {
        let state = self.record(RecordedCall::BlockNumber)?;
        Ok(state.block_number)
    }

    async fn is_listening(&self) -> TransportResult<bool> {
        let state = self.record(RecordedCall::IsListening)?;
        Ok(state.listening)
    }
}

/// A product owned by [`ACCOUNT_A`] priced at 1 ether.
pub fn product(id: u64, name: &str) -> Product {
    Product {
        id,
        name: name.to_string(),
        description: format!("{name} description"),
        price: U256::from(1_000_000_000_000_000_000u128),
        owner: ACCOUNT_A,
        created_at: CREATED_AT,
    }
}

/// A receipt of a transaction sent by [`ACCOUNT_A`] to the contract.
pub fn receipt(hash: TxHash, success: bool) -> TransactionReceipt {
    serde_json::from_value(json!({
        "type": "0x0",
        "status": if success { "0x1" } else { "0x0" },
        "cumulativeGasUsed": "0x5208",
        "logs": [],
        "logsBloom": format!("0x{}", "0".repeat(512)),
        "transactionHash": hash,
        "transactionIndex": "0x0",
        "blockHash": B256::repeat_byte(0x11),
        "blockNumber": "0x1",
        "gasUsed": "0x5208",
        "effectiveGasPrice": "0x3b9aca00",
        "from": ACCOUNT_A,
        "to": CONTRACT_ADDRESS,
        "contractAddress": null
    }))
    .expect("valid receipt")
}

/// A handle bound to `provider` with the bundled manifest on network 5777.
pub fn bound_handle(provider: Arc<MockProvider>) -> ContractHandle {
    let manifest = DeploymentManifest::bundled().expect("bundled manifest");
    let descriptor = NetworkDescriptor {
        network_id: 5777,
        contract_address: CONTRACT_ADDRESS,
        interface: Arc::new(manifest.abi),
    };
    ContractHandle::bind(provider, descriptor)
}
