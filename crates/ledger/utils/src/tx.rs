use std::fmt;

use alloy_primitives::TxHash;
use alloy_rpc_types_eth::TransactionReceipt;
use serde::{Deserialize, Serialize};

/// The transaction configuration to use when sending a transaction.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxnConfig {
    /// Poll for the transaction receipt before reporting the submission as done. Off by default:
    /// a mutation is considered successful as soon as the node accepted it.
    pub wait: bool,
    /// Return the receipt alongside the hash. Only meaningful together with `wait`.
    pub receipt: bool,
}

impl TxnConfig {
    pub fn init_wait() -> Self {
        Self { wait: true, ..Default::default() }
    }
}

#[derive(Debug, Clone)]
pub enum TransactionResult {
    /// The transaction hash.
    Hash(TxHash),
    /// The transaction hash and it's receipt.
    HashReceipt(TxHash, Box<TransactionReceipt>),
}

impl TransactionResult {
    pub fn transaction_hash(&self) -> TxHash {
        match self {
            TransactionResult::Hash(hash) | TransactionResult::HashReceipt(hash, _) => *hash,
        }
    }
}

impl fmt::Display for TransactionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionResult::Hash(hash) => write!(f, "Transaction hash: {hash}"),
            TransactionResult::HashReceipt(hash, receipt) => write!(
                f,
                "Transaction hash: {hash}\nReceipt: {}",
                serde_json::to_string_pretty(receipt).map_err(|_| fmt::Error)?
            ),
        }
    }
}
