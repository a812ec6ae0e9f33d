use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use ledger_client::config::ClientConfig;
use ledger_client::diagnostics::diagnose;
use tracing::trace;

#[derive(Debug, Args)]
pub struct DoctorArgs {}

impl DoctorArgs {
    pub async fn run(self, config: &ClientConfig) -> Result<()> {
        trace!(args = ?self);

        match diagnose(config).await {
            Ok(report) => {
                println!("{}", "Connected Successfully!".green().bold());
                println!("{report}");
                Ok(())
            }
            Err(err) => {
                println!("{}", "Connection Failed".red().bold());
                Err(anyhow!(err.user_message()))
            }
        }
    }
}
