use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use alloy_primitives::TxHash;
use alloy_rpc_types_eth::TransactionReceipt;
use alloy_transport::{TransportError, TransportResult};
use futures::FutureExt;
use tokio::time::{Instant, Interval};

use crate::provider::LedgerProvider;

#[derive(Debug, thiserror::Error)]
pub enum TransactionWaitingError {
    #[error("request timed out")]
    Timeout,
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
    #[error(transparent)]
    Provider(#[from] TransportError),
}

type ReceiptFuture<'a> =
    Pin<Box<dyn Future<Output = TransportResult<Option<TransactionReceipt>>> + Send + 'a>>;

/// A type that waits for a transaction to be included. The receipt is polled every `interval`
/// until one is returned or `timeout` elapses. A receipt with a failed status is reported as
/// [`TransactionWaitingError::Reverted`].
///
/// # Arguments
///
/// * `tx_hash` - The hash of the transaction to wait for.
/// * `interval` - Poll the receipt every `interval`. Defaults to 200 milliseconds.
/// * `timeout` - The maximum amount of time to wait for the receipt. Defaults to 60 seconds.
/// * `provider` - The provider to use for polling the receipt.
///
/// # Examples
///
/// ```ignore
/// let provider = HttpProvider::new("http://127.0.0.1:7545".parse()?);
/// let receipt = TransactionWaiter::new(tx_hash, &provider).await?;
/// ```
pub struct TransactionWaiter<'a> {
    tx_hash: TxHash,
    interval: Interval,
    timeout: Duration,
    started_at: Instant,
    provider: &'a dyn LedgerProvider,
    /// The future that gets the transaction receipt.
    future: Option<ReceiptFuture<'a>>,
}

impl<'a> TransactionWaiter<'a> {
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
    const DEFAULT_INTERVAL: Duration = Duration::from_millis(200);

    pub fn new(tx_hash: TxHash, provider: &'a dyn LedgerProvider) -> Self {
        Self {
            tx_hash,
            provider,
            future: None,
            timeout: Self::DEFAULT_TIMEOUT,
            started_at: Instant::now(),
            interval: tokio::time::interval_at(
                Instant::now() + Self::DEFAULT_INTERVAL,
                Self::DEFAULT_INTERVAL,
            ),
        }
    }

    pub fn with_interval(mut self, milisecond: u64) -> Self {
        let interval = Duration::from_millis(milisecond);
        self.interval = tokio::time::interval_at(Instant::now() + interval, interval);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl<'a> Future for TransactionWaiter<'a> {
    type Output = Result<TransactionReceipt, TransactionWaitingError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        loop {
            if this.started_at.elapsed() > this.timeout {
                return Poll::Ready(Err(TransactionWaitingError::Timeout));
            }

            if let Some(mut flush) = this.future.take() {
                match flush.poll_unpin(cx) {
                    Poll::Ready(Ok(Some(receipt))) => {
                        if receipt.status() {
                            return Poll::Ready(Ok(receipt));
                        }
                        return Poll::Ready(Err(TransactionWaitingError::Reverted(this.tx_hash)));
                    }

                    // still pending
                    Poll::Ready(Ok(None)) => {}

                    Poll::Ready(Err(e)) => {
                        return Poll::Ready(Err(TransactionWaitingError::Provider(e)));
                    }

                    Poll::Pending => {
                        this.future = Some(flush);
                        return Poll::Pending;
                    }
                }
            }

            if this.interval.poll_tick(cx).is_ready() {
                this.future = Some(this.provider.transaction_receipt(this.tx_hash));
            } else {
                break;
            }
        }

        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::test_utils::{receipt, MockProvider, RecordedCall};

    const HASH: TxHash = TxHash::repeat_byte(0xab);

    #[tokio::test(start_paused = true)]
    async fn resolves_once_receipt_is_available() {
        let provider = MockProvider::new(5777);
        provider.set_receipt_after(HASH, receipt(HASH, true), 3);

        let receipt = TransactionWaiter::new(HASH, &provider).await.unwrap();

        assert_eq!(receipt.transaction_hash, HASH);
        let polls = provider.calls().into_iter().filter(|c| *c == RecordedCall::Receipt(HASH));
        assert_eq!(polls.count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn reverted_receipt_is_an_error() {
        let provider = MockProvider::new(5777);
        provider.set_receipt_after(HASH, receipt(HASH, false), 1);

        let err = TransactionWaiter::new(HASH, &provider).await.unwrap_err();
        assert_matches!(err, TransactionWaitingError::Reverted(hash) if hash == HASH);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_without_receipt() {
        let provider = MockProvider::new(5777);

        let err = TransactionWaiter::new(HASH, &provider)
            .with_interval(500)
            .with_timeout(Duration::from_secs(2))
            .await
            .unwrap_err();

        assert_matches!(err, TransactionWaitingError::Timeout);
    }
}
