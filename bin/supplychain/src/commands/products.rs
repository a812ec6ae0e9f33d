use anyhow::{anyhow, Result};
use clap::Args;
use ledger_client::config::ClientConfig;
use tracing::trace;

use crate::utils;

#[derive(Debug, Args)]
pub struct ProductsArgs {}

impl ProductsArgs {
    pub async fn run(self, config: &ClientConfig) -> Result<()> {
        trace!(args = ?self);

        let session = utils::connect(config).await?;

        // A failed read must not print as an empty ledger.
        let products = session.sync().await.map_err(|e| anyhow!(e.user_message()))?;
        utils::print_products(&products);
        Ok(())
    }
}
