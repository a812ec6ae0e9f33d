use clap::Args;
use ledger_utils::TxnConfig;

#[derive(Debug, Clone, Args, Default)]
#[command(next_help_heading = "Transaction options")]
pub struct TransactionOptions {
    #[arg(long)]
    #[arg(help = "Wait until the transaction is included in a block, returning the hash.")]
    #[arg(long_help = "Wait until the transaction is included in a block, returning the hash. \
                       This polls the transaction receipt and fails if the transaction \
                       reverted. By default a mutation is reported as soon as the node \
                       accepted it.")]
    #[arg(global = true)]
    pub wait: bool,

    #[arg(long)]
    #[arg(
        help = "If --wait is set, returns the full transaction receipt. Otherwise, it is a no-op."
    )]
    #[arg(global = true)]
    pub receipt: bool,
}

impl TransactionOptions {
    /// Merges the flags over `file`, a flag can only switch an option on.
    pub fn txn_config(&self, file: TxnConfig) -> TxnConfig {
        TxnConfig { wait: self.wait || file.wait, receipt: self.receipt || file.receipt }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file() {
        let opts = TransactionOptions { wait: true, receipt: false };
        assert_eq!(opts.txn_config(TxnConfig::default()), TxnConfig::init_wait());

        let file = TxnConfig { wait: true, receipt: true };
        assert_eq!(TransactionOptions::default().txn_config(file), file);
    }
}
