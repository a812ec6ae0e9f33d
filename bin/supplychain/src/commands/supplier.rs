use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use ledger_client::config::ClientConfig;
use tracing::trace;

use crate::utils;

#[derive(Debug, Args)]
pub struct SupplierArgs {
    #[arg(help = "Address the supplier registered from. Defaults to the active account.")]
    pub address: Option<String>,
}

impl SupplierArgs {
    pub async fn run(self, config: &ClientConfig) -> Result<()> {
        trace!(args = ?self);

        let session = utils::connect(config).await?;
        let address = match self.address {
            Some(address) => address,
            None => session
                .active_account()
                .map(|a| a.to_checksum(None))
                .ok_or_else(|| anyhow!("No accounts available"))?,
        };

        let supplier = session.supplier(&address).await.map_err(|e| anyhow!(e.user_message()))?;

        if !supplier.is_registered {
            println!("{} is not a registered supplier.", address.cyan());
            return Ok(());
        }

        println!("{}", supplier.name.bold());
        println!("    location {}", supplier.location);
        println!("    contact  {}", supplier.contact);
        Ok(())
    }
}
