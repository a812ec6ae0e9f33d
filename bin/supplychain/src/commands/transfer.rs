use anyhow::Result;
use clap::Args;
use ledger_client::config::ClientConfig;
use ledger_client::mutation::TransferForm;
use tracing::trace;

use crate::utils;

#[derive(Debug, Args)]
pub struct TransferProductArgs {
    #[arg(help = "Id of the product to transfer.")]
    pub product_id: String,

    #[arg(help = "Address of the new owner.")]
    pub to: String,
}

impl TransferProductArgs {
    pub async fn run(self, config: &ClientConfig) -> Result<()> {
        trace!(args = ?self);

        let session = utils::connect(config).await?;
        let mut form = TransferForm { product_id: self.product_id, recipient: self.to };

        match session.transfer_product(&mut form).await {
            Ok(outcome) => utils::finish_mutation(&session, outcome).await,
            Err(err) => Err(utils::mutation_error(&session, err)),
        }
    }
}
