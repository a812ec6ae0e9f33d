use std::path::PathBuf;

use clap::Args;
use ledger_client::config::ClientConfig;
use ledger_utils::env::{
    LEDGER_MANIFEST_PATH_ENV_VAR, LEDGER_RPC_URL_ENV_VAR, LEDGER_WALLET_URL_ENV_VAR,
};
use tracing::trace;
use url::Url;

use super::transaction::TransactionOptions;

#[derive(Debug, Args, Clone, Default)]
#[command(next_help_heading = "Ledger options")]
pub struct LedgerOptions {
    #[arg(long, env = LEDGER_RPC_URL_ENV_VAR)]
    #[arg(value_name = "URL")]
    #[arg(help = "The local JSON-RPC endpoint used when no wallet grants access.")]
    #[arg(global = true)]
    pub rpc_url: Option<Url>,

    #[arg(long, env = LEDGER_WALLET_URL_ENV_VAR)]
    #[arg(value_name = "URL")]
    #[arg(help = "Endpoint of a wallet provider to request account access from first.")]
    #[arg(global = true)]
    pub wallet_url: Option<Url>,

    #[arg(long, env = LEDGER_MANIFEST_PATH_ENV_VAR)]
    #[arg(value_name = "PATH")]
    #[arg(help = "Deployment manifest of the contract. Defaults to the bundled one.")]
    #[arg(global = true)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long)]
    #[arg(help = "Skip the check that code is deployed at the contract address.")]
    #[arg(global = true)]
    pub skip_code_check: bool,
}

impl LedgerOptions {
    /// Builds the client configuration, command line (or environment) first, then `file`, then
    /// the defaults.
    pub fn client_config(
        &self,
        file: Option<ClientConfig>,
        transaction: &TransactionOptions,
    ) -> ClientConfig {
        let mut config = file.unwrap_or_default();

        if let Some(url) = self.rpc_url.as_ref() {
            trace!(?url, "Using RPC URL from command line.");
            config.rpc_url = url.clone();
        }

        if let Some(url) = self.wallet_url.as_ref() {
            trace!(?url, "Using wallet URL from command line.");
            config.wallet_url = Some(url.clone());
        }

        if let Some(path) = self.manifest_path.as_ref() {
            trace!(?path, "Using manifest from command line.");
            config.manifest = Some(path.clone());
        }

        if self.skip_code_check {
            config.verify_code = false;
        }

        config.txn = transaction.txn_config(config.txn);
        config
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    const ENV_WALLET: &str = "http://localhost:1248/";
    const FILE_RPC: &str = "http://localhost:6060/";
    const ARG_RPC: &str = "http://localhost:8545/";
    const DEFAULT_RPC: &str = "http://127.0.0.1:7545/";

    #[derive(clap::Parser)]
    struct Command {
        #[clap(flatten)]
        options: LedgerOptions,
        #[clap(flatten)]
        transaction: TransactionOptions,
    }

    impl Command {
        fn config(&self, file: Option<ClientConfig>) -> ClientConfig {
            self.options.client_config(file, &self.transaction)
        }
    }

    fn file_config() -> ClientConfig {
        ClientConfig { rpc_url: Url::parse(FILE_RPC).unwrap(), ..Default::default() }
    }

    #[test]
    fn wallet_url_read_from_env_variable() {
        std::env::set_var(LEDGER_WALLET_URL_ENV_VAR, ENV_WALLET);

        let cmd = Command::parse_from([""]);
        assert_eq!(cmd.config(None).wallet_url.unwrap().as_str(), ENV_WALLET);
    }

    #[test]
    fn url_exist_in_file_but_not_in_args() {
        let cmd = Command::parse_from([""]);
        assert_eq!(cmd.config(Some(file_config())).rpc_url.as_str(), FILE_RPC);
    }

    #[test]
    fn url_exists_in_both() {
        let cmd = Command::parse_from(["supplychain", "--rpc-url", ARG_RPC]);
        assert_eq!(cmd.config(Some(file_config())).rpc_url.as_str(), ARG_RPC);
    }

    #[test]
    fn url_exists_in_neither() {
        let cmd = Command::parse_from([""]);
        assert_eq!(cmd.config(None).rpc_url.as_str(), DEFAULT_RPC);
    }

    #[test]
    fn flags_apply_over_file() {
        let cmd = Command::parse_from(["supplychain", "--skip-code-check", "--wait"]);

        let config = cmd.config(Some(file_config()));

        assert!(!config.verify_code);
        assert!(config.txn.wait);
        assert_eq!(config.settle_delay_ms, 2000);
    }
}
