use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ledger_utils::TxnConfig;
use serde::Deserialize;
use url::Url;

use crate::manifest::{DeploymentManifest, ManifestError};
use crate::mutation::SettlePolicy;

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:7545";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Configuration of the chain client.
///
/// This [`ClientConfig`] is expected to be loaded from a TOML file, every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Endpoint of an injected, wallet-style provider. Tried first when present.
    pub wallet_url: Option<Url>,
    /// The fixed local endpoint used when no wallet grants access.
    pub rpc_url: Url,
    /// Deployment manifest to use instead of the bundled one.
    pub manifest: Option<PathBuf>,
    /// Check that code exists at the resolved contract address.
    pub verify_code: bool,
    /// Delay between an accepted mutation and the resync that follows it.
    pub settle_delay_ms: u64,
    pub txn: TxnConfig,
    /// Polling cadence of the provider watcher.
    pub watch_interval_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            wallet_url: None,
            rpc_url: default_rpc_url(),
            manifest: None,
            verify_code: true,
            settle_delay_ms: SettlePolicy::DEFAULT_SETTLE_DELAY.as_millis() as u64,
            txn: TxnConfig::default(),
            watch_interval_ms: 1000,
        }
    }
}

impl ClientConfig {
    /// Loads the configuration from a TOML file.
    pub fn from_toml<P: AsRef<Path>>(toml_path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&toml_path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// The configured manifest file, or the bundled manifest.
    pub fn load_manifest(&self) -> Result<DeploymentManifest, ManifestError> {
        match &self.manifest {
            Some(path) => DeploymentManifest::load(path),
            None => DeploymentManifest::bundled(),
        }
    }

    pub fn settle_policy(&self) -> SettlePolicy {
        SettlePolicy::new(Duration::from_millis(self.settle_delay_ms))
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watch_interval_ms)
    }
}

fn default_rpc_url() -> Url {
    Url::parse(DEFAULT_RPC_URL).expect("valid url")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_target_local_node() {
        let config = ClientConfig::default();
        assert_eq!(config.rpc_url.as_str(), "http://127.0.0.1:7545/");
        assert!(config.wallet_url.is_none());
        assert!(config.verify_code);
        assert_eq!(config.settle_policy(), SettlePolicy::default());
        assert!(!config.txn.wait);
    }

    #[test]
    fn loads_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            wallet_url = "http://127.0.0.1:1248"
            settle_delay_ms = 500

            [txn]
            wait = true
            "#
        )
        .unwrap();

        let config = ClientConfig::from_toml(file.path()).unwrap();

        assert_eq!(config.wallet_url.as_ref().unwrap().as_str(), "http://127.0.0.1:1248/");
        assert_eq!(config.rpc_url, default_rpc_url());
        assert_eq!(config.settle_policy().post_mutation_settle_delay, Duration::from_millis(500));
        assert!(config.txn.wait);
        assert!(!config.txn.receipt);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = toml::from_str::<ClientConfig>("rpc = \"http://localhost\"").unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn manifest_falls_back_to_bundled() {
        let manifest = ClientConfig::default().load_manifest().unwrap();
        assert_eq!(manifest.available_networks(), vec![5777]);

        let config = ClientConfig { manifest: Some("/nope.json".into()), ..Default::default() };
        assert!(matches!(config.load_manifest(), Err(ManifestError::Io(_))));
    }
}
