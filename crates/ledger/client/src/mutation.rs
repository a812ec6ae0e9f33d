//! Input validation and bookkeeping of the write path.
//!
//! A form is validated into the contract call it stands for before anything reaches the
//! provider. Validation is limited to presence, the address format and exact conversion of the
//! price into the smallest unit.

use std::fmt;
use std::time::Duration;

use alloy_primitives::U256;
use alloy_sol_types::SolCall;
use ledger_utils::parse::parse_address;
use ledger_utils::units::parse_ether;

use crate::contract::SupplyChain;
use crate::error::ValidationError;

/// The three state-changing operations of the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    CreateProduct,
    RegisterSupplier,
    TransferProduct,
}

impl Mutation {
    /// Status shown while the transaction is being submitted.
    pub fn pending_status(&self) -> &'static str {
        match self {
            Mutation::CreateProduct => "Creating product on blockchain...",
            Mutation::RegisterSupplier => "Registering supplier on blockchain...",
            Mutation::TransferProduct => "Transferring product ownership...",
        }
    }

    pub fn success_status(&self) -> &'static str {
        match self {
            Mutation::CreateProduct => "Product created successfully!",
            Mutation::RegisterSupplier => "Supplier registered successfully!",
            Mutation::TransferProduct => "Product transferred successfully!",
        }
    }

    pub fn failure_status(&self, message: &str) -> String {
        match self {
            Mutation::CreateProduct => format!("Failed to create product: {message}"),
            Mutation::RegisterSupplier => format!("Failed to register supplier: {message}"),
            Mutation::TransferProduct => format!("Transfer failed: {message}"),
        }
    }
}

/// Lifecycle of a single submission.
///
/// `Idle -> Validating -> Submitting -> Confirmed -> ScheduledResync -> Idle`, or
/// `Failed -> Idle` from either of the middle states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MutationPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Confirmed,
    ScheduledResync,
    Failed,
}

impl fmt::Display for MutationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// How long to wait after an accepted mutation before re-reading the collection.
///
/// The delay does not track the transaction, it only gives the node time to settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlePolicy {
    pub post_mutation_settle_delay: Duration,
}

impl SettlePolicy {
    pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(2000);

    pub fn new(post_mutation_settle_delay: Duration) -> Self {
        Self { post_mutation_settle_delay }
    }
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SETTLE_DELAY)
    }
}

/// User input for one of the [`Mutation`]s.
pub trait MutationForm {
    type Call: SolCall + Send + Sync;

    const MUTATION: Mutation;

    /// Checks the input and builds the contract call. Never touches the network.
    fn validate(&self) -> Result<Self::Call, ValidationError>;

    /// Resets the form after a successful submission.
    fn clear(&mut self);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    /// Decimal amount in ether, e.g. `"2.0"`.
    pub price: String,
}

impl MutationForm for ProductForm {
    type Call = SupplyChain::createProductCall;

    const MUTATION: Mutation = Mutation::CreateProduct;

    fn validate(&self) -> Result<Self::Call, ValidationError> {
        if self.name.is_empty() || self.description.is_empty() || self.price.is_empty() {
            return Err(ValidationError::IncompleteProduct);
        }

        let price = parse_ether(&self.price)?;

        Ok(SupplyChain::createProductCall {
            name: self.name.clone(),
            description: self.description.clone(),
            price,
        })
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplierForm {
    pub name: String,
    pub location: String,
    pub contact: String,
}

impl MutationForm for SupplierForm {
    type Call = SupplyChain::registerSupplierCall;

    const MUTATION: Mutation = Mutation::RegisterSupplier;

    fn validate(&self) -> Result<Self::Call, ValidationError> {
        if self.name.is_empty() || self.location.is_empty() || self.contact.is_empty() {
            return Err(ValidationError::IncompleteSupplier);
        }

        Ok(SupplyChain::registerSupplierCall {
            name: self.name.clone(),
            location: self.location.clone(),
            contact: self.contact.clone(),
        })
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferForm {
    pub product_id: String,
    pub recipient: String,
}

impl MutationForm for TransferForm {
    type Call = SupplyChain::transferProductCall;

    const MUTATION: Mutation = Mutation::TransferProduct;

    fn validate(&self) -> Result<Self::Call, ValidationError> {
        if self.product_id.is_empty() || self.recipient.is_empty() {
            return Err(ValidationError::IncompleteTransfer);
        }

        let to = parse_address(&self.recipient)?;
        let product_id = self
            .product_id
            .parse::<u64>()
            .map_err(|_| ValidationError::InvalidProductId(self.product_id.clone()))?;

        Ok(SupplyChain::transferProductCall { productId: U256::from(product_id), to })
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}
