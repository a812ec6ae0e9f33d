use alloy_primitives::{Address, U256};
use alloy_transport::TransportError;
use ledger_utils::parse::AddressParseError;
use ledger_utils::units::UnitsError;

use crate::manifest::ManifestError;
use crate::waiter::TransactionWaitingError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot connect to blockchain network: {0}")]
    ProviderUnavailable(#[source] TransportError),
    #[error("Cannot connect to blockchain network: node is not listening")]
    NotListening,
    #[error(
        "Contract not deployed on network {network_id}. Available networks: {}",
        join_networks(.available)
    )]
    NetworkUnsupported { network_id: u64, available: Vec<u64> },
    #[error("No contract code found at address {address}")]
    ContractNotFound { address: Address },
    #[error("No accounts available")]
    NoAccounts,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("`{method}` failed: {source}")]
    RpcCall {
        method: &'static str,
        #[source]
        source: TransportError,
    },
    #[error("Contract interface has no `{0}` function")]
    UnknownMethod(&'static str),
    #[error("`{method}` is not a {expected} function of the contract interface")]
    MethodKind { method: &'static str, expected: &'static str },
    #[error("Could not decode the output of `{method}`: {source}")]
    Decode {
        method: &'static str,
        #[source]
        source: alloy_sol_types::Error,
    },
    #[error("Product {0} is not populated")]
    EntityNotFound(u64),
    #[error("Value {0} does not fit in 64 bits")]
    ValueOverflow(U256),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    TransactionWaiting(#[from] TransactionWaitingError),
    #[error("Session disconnected: {0}")]
    Disconnected(String),
}

impl Error {
    /// The message shown to the user for a failed operation.
    ///
    /// RPC failures are surfaced with the node's own message, untouched.
    pub fn user_message(&self) -> String {
        match self {
            Error::RpcCall { source, .. } => source.to_string(),
            Error::ProviderUnavailable(source) => source.to_string(),
            other => other.to_string(),
        }
    }

    /// Whether the error leaves the session unusable until the user reconnects.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ProviderUnavailable(_)
                | Error::NotListening
                | Error::NetworkUnsupported { .. }
                | Error::ContractNotFound { .. }
                | Error::NoAccounts
                | Error::Manifest(_)
                | Error::Disconnected(_)
        )
    }
}

/// Client-side input errors. Raised before any RPC call is issued.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in all product fields")]
    IncompleteProduct,
    #[error("Please fill in all supplier fields")]
    IncompleteSupplier,
    #[error("Please select a product and enter transfer address")]
    IncompleteTransfer,
    #[error("Invalid Ethereum address format")]
    InvalidAddress(#[from] AddressParseError),
    #[error("Invalid price: {0}")]
    InvalidPrice(#[from] UnitsError),
    #[error("Invalid product id `{0}`")]
    InvalidProductId(String),
}

fn join_networks(networks: &[u64]) -> String {
    networks.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}
