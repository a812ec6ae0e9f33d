use alloy_primitives::{Address, U256};
use serde::Serialize;

use crate::contract::SupplyChain;
use crate::error::Error;

/// A product as stored on the ledger.
///
/// `price` is in the smallest unit and `created_at` in epoch seconds, both left unformatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub price: U256,
    pub owner: Address,
    pub created_at: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Supplier {
    pub name: String,
    pub location: String,
    pub contact: String,
    pub is_registered: bool,
}

impl TryFrom<SupplyChain::productsReturn> for Product {
    type Error = Error;

    fn try_from(value: SupplyChain::productsReturn) -> Result<Self, Self::Error> {
        Ok(Self {
            id: to_u64(value.id)?,
            name: value.name,
            description: value.description,
            price: value.price,
            owner: value.owner,
            created_at: to_u64(value.created)?,
        })
    }
}

impl From<SupplyChain::suppliersReturn> for Supplier {
    fn from(value: SupplyChain::suppliersReturn) -> Self {
        Self {
            name: value.name,
            location: value.location,
            contact: value.contact,
            is_registered: value.isRegistered,
        }
    }
}

pub(crate) fn to_u64(value: U256) -> Result<u64, Error> {
    u64::try_from(value).map_err(|_| Error::ValueOverflow(value))
}
