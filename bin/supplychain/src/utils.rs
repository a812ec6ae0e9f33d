use std::sync::Arc;

use alloy_primitives::{Address, U256};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Local};
use colored::Colorize;
use ledger_client::config::ClientConfig;
use ledger_client::session::{connection_failed_status, MutationOutcome};
use ledger_client::{Error, Product, Session};
use ledger_utils::units::format_ether;
use tracing::trace;

use crate::commands::LOG_TARGET;

/// Connects a session, turning a failure into the connection status message.
pub async fn connect(config: &ClientConfig) -> Result<Arc<Session>> {
    let session = Session::connect(config).await.map_err(|e| anyhow!(connection_failed_status(&e)))?;
    trace!(target: LOG_TARGET, provider = %session.provider_kind(), "Session connected.");
    Ok(session)
}

/// The error to report for a failed mutation.
///
/// Invalid input is reported with its validation message, anything else with the status the
/// session recorded for the failure.
pub fn mutation_error(session: &Session, error: Error) -> anyhow::Error {
    match error {
        Error::Validation(e) => anyhow!(e),
        _ => anyhow!(session.status()),
    }
}

/// Prints the outcome of an accepted mutation and waits for the resync that follows it.
pub async fn finish_mutation(session: &Session, outcome: MutationOutcome) -> Result<()> {
    println!("{}", session.status().green());
    println!("{}", outcome.transaction);

    outcome.resync.await?;
    print_products(&session.current_entities());
    Ok(())
}

/// `1500000000000000000` -> `1.5 ETH`.
pub fn format_price(price: U256) -> String {
    format!("{} ETH", format_ether(price))
}

/// Epoch seconds as a local calendar string.
pub fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|utc| utc.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| secs.to_string())
}

/// `0x627306090abaB3A6e1400e9345bC60c78a8BEf57` -> `0x6273...Ef57`.
pub fn abbreviate_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

pub fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products on the ledger.");
        return;
    }

    for product in products {
        println!(
            "{} {} - {}",
            format!("#{}", product.id).bright_black(),
            product.name.bold(),
            format_price(product.price).yellow()
        );
        println!("    {}", product.description);
        println!(
            "    owner {}  created {}",
            abbreviate_address(&product.owner).cyan(),
            format_timestamp(product.created_at)
        );
    }
}
