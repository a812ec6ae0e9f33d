pub const LEDGER_RPC_URL_ENV_VAR: &str = "LEDGER_RPC_URL";
pub const LEDGER_WALLET_URL_ENV_VAR: &str = "LEDGER_WALLET_URL";
pub const LEDGER_MANIFEST_PATH_ENV_VAR: &str = "LEDGER_MANIFEST_PATH";
pub const LEDGER_CONFIG_PATH_ENV_VAR: &str = "LEDGER_CONFIG_PATH";
