use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use ledger_utils::env::LEDGER_CONFIG_PATH_ENV_VAR;
use tracing::level_filters::LevelFilter;
use tracing_log::{AsTrace, LogTracer};
use tracing_subscriber::FmtSubscriber;

use crate::commands::options::ledger::LedgerOptions;
use crate::commands::options::transaction::TransactionOptions;
use crate::commands::Commands;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct SupplychainArgs {
    #[arg(long)]
    #[arg(global = true)]
    #[arg(env = LEDGER_CONFIG_PATH_ENV_VAR)]
    #[arg(help = "Path to a TOML client configuration file.")]
    pub config: Option<PathBuf>,

    #[clap(help = "Logging verbosity.")]
    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,

    #[command(flatten)]
    pub ledger: LedgerOptions,

    #[command(flatten)]
    pub transaction: TransactionOptions,

    #[command(subcommand)]
    pub command: Commands,
}

impl SupplychainArgs {
    pub fn init_logging(
        &self,
        clap_verbosity: &clap_verbosity_flag::Verbosity,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let verbose = clap_verbosity.log_level_filter().as_trace() >= LevelFilter::DEBUG;

        let default_log_filter: &str = if verbose {
            "none,hyper=off,reqwest=off,supplychain=trace,ledger_client=trace,ledger_utils=trace"
        } else {
            "none,hyper=off,reqwest=off,supplychain=info,ledger_client=warn"
        };

        LogTracer::init()?;

        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_log_filter)),
            )
            .finish();

        Ok(tracing::subscriber::set_global_default(subscriber)?)
    }
}
