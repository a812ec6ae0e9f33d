#![cfg_attr(not(test), warn(unused_crate_dependencies))]

use std::process::exit;

use anyhow::Result;
use args::SupplychainArgs;
use clap::Parser;
use colored::Colorize;
use ledger_client::config::ClientConfig;
use tracing::trace;

mod args;
mod commands;
mod utils;

#[tokio::main]
async fn main() {
    let args = SupplychainArgs::parse();
    let _ = args.init_logging(&args.verbose);

    if let Err(err) = cli_main(args).await {
        eprintln!("{} {err:#}", "error:".red().bold());
        exit(1);
    }
}

async fn cli_main(args: SupplychainArgs) -> Result<()> {
    let file_config = match &args.config {
        Some(path) => Some(ClientConfig::from_toml(path)?),
        None => None,
    };

    let config = args.ledger.client_config(file_config, &args.transaction);
    trace!(?config, "Configuration built successfully.");

    commands::run(args.command, &config).await
}
