use std::future::IntoFuture;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use ledger_client::config::ClientConfig;
use ledger_client::provider::ProviderEvent;
use tokio::sync::broadcast::error::RecvError;
use tracing::{trace, warn};

use super::LOG_TARGET;
use crate::utils;

#[derive(Debug, Args)]
pub struct WatchArgs {}

impl WatchArgs {
    pub async fn run(self, config: &ClientConfig) -> Result<()> {
        trace!(args = ?self);

        let session = utils::connect(config).await?;
        utils::print_products(&session.current_entities());

        let watcher = session.watcher();
        let mut events = watcher.subscribe();
        let worker = tokio::spawn(watcher.into_future());

        println!("{}", "Watching for account and network changes, press Ctrl-C to stop.".dimmed());

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(event) => {
                        match &event {
                            ProviderEvent::AccountsChanged(accounts) => match accounts.first() {
                                Some(account) => println!("Active account: {}", utils::abbreviate_address(account).cyan()),
                                None => println!("{}", "No accounts available".yellow()),
                            },
                            ProviderEvent::NetworkChanged(id) => println!("Network changed to {}", id.to_string().cyan()),
                        }

                        match session.handle_event(event).await {
                            Ok(()) => utils::print_products(&session.current_entities()),
                            Err(err) => println!("{}", err.user_message().red()),
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(target: LOG_TARGET, skipped, "Missed provider events.");
                    }
                    Err(RecvError::Closed) => break,
                },

                _ = tokio::signal::ctrl_c() => break,
            }
        }

        worker.abort();
        Ok(())
    }
}
