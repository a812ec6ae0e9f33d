use anyhow::Result;
use clap::Args;
use ledger_client::config::ClientConfig;
use ledger_client::mutation::ProductForm;
use tracing::trace;

use crate::utils;

#[derive(Debug, Args)]
pub struct CreateProductArgs {
    #[arg(help = "Name of the product.")]
    pub name: String,

    #[arg(help = "Description of the product.")]
    pub description: String,

    #[arg(help = "Price in ether, e.g. 2.5. Converted exactly to wei.")]
    pub price: String,
}

impl CreateProductArgs {
    pub async fn run(self, config: &ClientConfig) -> Result<()> {
        trace!(args = ?self);

        let session = utils::connect(config).await?;
        let mut form =
            ProductForm { name: self.name, description: self.description, price: self.price };

        match session.create_product(&mut form).await {
            Ok(outcome) => utils::finish_mutation(&session, outcome).await,
            Err(err) => Err(utils::mutation_error(&session, err)),
        }
    }
}
