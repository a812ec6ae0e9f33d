//! Polls the provider for account and network changes.

use std::future::IntoFuture;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use futures::Future;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::{LedgerProvider, LOG_TARGET};

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// A change observed on the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The set of accounts exposed by the provider changed. The first one is the active account.
    AccountsChanged(Vec<Address>),
    /// The provider now points at a different network.
    NetworkChanged(u64),
}

/// Background worker broadcasting [`ProviderEvent`]s.
///
/// The first successful poll only records a baseline, events are emitted for later differences.
/// Poll failures are skipped, a provider that is briefly unreachable does not count as a change.
#[derive(Debug)]
pub struct ProviderWatcher {
    provider: Arc<dyn LedgerProvider>,
    interval: Duration,
    sender: broadcast::Sender<ProviderEvent>,
}

impl ProviderWatcher {
    pub fn new(provider: Arc<dyn LedgerProvider>, interval: Duration) -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { provider, interval, sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.sender.subscribe()
    }

    /// Polls until every receiver has been dropped.
    pub async fn run(self) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut accounts: Option<Vec<Address>> = None;
        let mut network: Option<u64> = None;

        loop {
            interval.tick().await;

            match self.provider.accounts().await {
                Ok(latest) => {
                    if accounts.as_ref().is_some_and(|known| *known != latest) {
                        info!(target: LOG_TARGET, accounts = latest.len(), "Accounts changed.");
                        if self.sender.send(ProviderEvent::AccountsChanged(latest.clone())).is_err()
                        {
                            break;
                        }
                    }
                    accounts = Some(latest);
                }
                Err(error) => debug!(target: LOG_TARGET, %error, "Polling accounts."),
            }

            match self.provider.network_id().await {
                Ok(latest) => {
                    if network.is_some_and(|known| known != latest) {
                        info!(target: LOG_TARGET, network_id = latest, "Network changed.");
                        if self.sender.send(ProviderEvent::NetworkChanged(latest)).is_err() {
                            break;
                        }
                    }
                    network = Some(latest);
                }
                Err(error) => debug!(target: LOG_TARGET, %error, "Polling network id."),
            }

            if self.sender.receiver_count() == 0 {
                break;
            }
        }

        debug!(target: LOG_TARGET, "Provider watcher stopped.");
    }
}

impl IntoFuture for ProviderWatcher {
    type Output = ();
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.run())
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;
    use crate::test_utils::MockProvider;

    const ALICE: Address = address!("627306090abaB3A6e1400e9345bC60c78a8BEf57");
    const BOB: Address = address!("f17f52151EbEF6C7334FAD080c5704D77216b732");

    #[tokio::test(start_paused = true)]
    async fn emits_account_and_network_changes() {
        let provider = Arc::new(MockProvider::new(5777).with_accounts(vec![ALICE]));
        let watcher = ProviderWatcher::new(provider.clone(), Duration::from_secs(1));
        let mut events = watcher.subscribe();
        let handle = tokio::spawn(watcher.into_future());

        // let the baseline poll happen
        tokio::time::sleep(Duration::from_millis(500)).await;

        provider.set_accounts(vec![BOB, ALICE]);
        assert_eq!(events.recv().await.unwrap(), ProviderEvent::AccountsChanged(vec![BOB, ALICE]));

        provider.set_network_id(Some(1337));
        assert_eq!(events.recv().await.unwrap(), ProviderEvent::NetworkChanged(1337));

        drop(events);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_provider_is_not_a_change() {
        let provider = Arc::new(MockProvider::new(5777).with_accounts(vec![ALICE]));
        let watcher = ProviderWatcher::new(provider.clone(), Duration::from_secs(1));
        let mut events = watcher.subscribe();
        let _handle = tokio::spawn(watcher.into_future());

        tokio::time::sleep(Duration::from_millis(500)).await;
        provider.set_network_id(None);
        tokio::time::sleep(Duration::from_secs(3)).await;
        provider.set_network_id(Some(5777));
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_matches::assert_matches!(events.try_recv(), Err(broadcast::error::TryRecvError::Empty));
    }
}
