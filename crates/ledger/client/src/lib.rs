#![cfg_attr(not(test), warn(unused_crate_dependencies))]

//! Chain client layer of the supply chain ledger.
//!
//! The layer is a pipeline: a [`provider`] is resolved (injected wallet first, fixed local
//! endpoint otherwise), the [`descriptor`] of the deployed contract is looked up for the
//! provider's network in the bundled [`manifest`], and a [`contract::ContractHandle`] is bound
//! from both. Reads go through the [`sync`] stage which enumerates the product collection,
//! writes go through the [`mutation`] stage which schedules a resync once the node accepted the
//! transaction. The [`session::Session`] owns all of it.

pub mod config;
pub mod contract;
pub mod descriptor;
pub mod diagnostics;
pub mod entity;
pub mod error;
pub mod manifest;
pub mod mutation;
pub mod provider;
pub mod session;
pub mod sync;
pub mod waiter;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::ClientConfig;
pub use contract::{ContractHandle, SupplyChain};
pub use descriptor::{DescriptorLoader, NetworkDescriptor};
pub use entity::{Product, Supplier};
pub use error::{Error, ValidationError};
pub use session::Session;
