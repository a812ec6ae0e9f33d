//! Deployment manifest of the supply chain contract.
//!
//! The manifest is the build artifact published by the contract deployment tooling: the
//! contract interface (`abi`) and, for every network the contract was migrated to, the address
//! it lives at (`networks`). A copy is bundled into the crate and is used unless another
//! manifest file is configured.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use alloy_primitives::Address;
use serde::Deserialize;

const BUNDLED_MANIFEST: &str = include_str!("../manifests/SupplyChain.json");

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Failed to read manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse manifest: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeployedNetwork {
    pub address: Address,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentManifest {
    #[serde(default, rename = "contractName")]
    pub contract_name: Option<String>,
    pub abi: InterfaceDescriptor,
    #[serde(default)]
    pub networks: BTreeMap<u64, DeployedNetwork>,
}

impl DeploymentManifest {
    /// The manifest compiled into the crate.
    pub fn bundled() -> Result<Self, ManifestError> {
        Self::from_json(BUNDLED_MANIFEST)
    }

    pub fn from_json(content: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load the manifest from a JSON artifact file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Exact lookup of the contract address deployed on `network_id`.
    pub fn address(&self, network_id: u64) -> Option<Address> {
        self.networks.get(&network_id).map(|network| network.address)
    }

    pub fn available_networks(&self) -> Vec<u64> {
        self.networks.keys().copied().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AbiParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub components: Vec<AbiParam>,
}

impl AbiParam {
    /// Canonical type of the parameter as used in function signatures.
    fn canonical_type(&self) -> String {
        match self.ty.strip_prefix("tuple") {
            Some(suffix) => {
                let inner =
                    self.components.iter().map(AbiParam::canonical_type).collect::<Vec<_>>();
                format!("({}){suffix}", inner.join(","))
            }
            None => self.ty.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiItem {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default)]
    pub outputs: Vec<AbiParam>,
    #[serde(default)]
    pub state_mutability: Option<String>,
    /// Pre-0.5 artifacts flag read-only functions with `constant` instead.
    #[serde(default)]
    pub constant: Option<bool>,
}

impl AbiItem {
    pub fn is_function(&self) -> bool {
        self.kind == "function"
    }

    /// `name(type,...)`, the string the function selector is derived from.
    pub fn signature(&self) -> String {
        let inputs = self.inputs.iter().map(AbiParam::canonical_type).collect::<Vec<_>>();
        format!("{}({})", self.name, inputs.join(","))
    }

    /// Whether calling the function leaves the ledger state untouched.
    pub fn is_read_only(&self) -> bool {
        match self.state_mutability.as_deref() {
            Some(mutability) => matches!(mutability, "view" | "pure"),
            None => self.constant.unwrap_or(false),
        }
    }
}

/// The contract interface: the list of ABI items from the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct InterfaceDescriptor(Vec<AbiItem>);

impl InterfaceDescriptor {
    pub fn new(items: Vec<AbiItem>) -> Self {
        Self(items)
    }

    pub fn functions(&self) -> impl Iterator<Item = &AbiItem> {
        self.0.iter().filter(|item| item.is_function())
    }

    /// Looks up a function by its full signature, e.g. `products(uint256)`.
    pub fn function(&self, signature: &str) -> Option<&AbiItem> {
        self.functions().find(|item| item.signature() == signature)
    }
}
