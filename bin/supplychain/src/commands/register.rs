use anyhow::Result;
use clap::Args;
use ledger_client::config::ClientConfig;
use ledger_client::mutation::SupplierForm;
use tracing::trace;

use crate::utils;

#[derive(Debug, Args)]
pub struct RegisterSupplierArgs {
    #[arg(help = "Name of the supplier.")]
    pub name: String,

    #[arg(help = "Where the supplier is located.")]
    pub location: String,

    #[arg(help = "How to contact the supplier.")]
    pub contact: String,
}

impl RegisterSupplierArgs {
    pub async fn run(self, config: &ClientConfig) -> Result<()> {
        trace!(args = ?self);

        let session = utils::connect(config).await?;
        let mut form =
            SupplierForm { name: self.name, location: self.location, contact: self.contact };

        match session.register_supplier(&mut form).await {
            Ok(outcome) => utils::finish_mutation(&session, outcome).await,
            Err(err) => Err(utils::mutation_error(&session, err)),
        }
    }
}
