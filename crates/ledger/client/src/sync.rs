//! Enumeration of the product collection.
//!
//! The collection is indexed `1..=productCount()`. Every index is read with its own `eth_call`,
//! one after the other, so a sync costs `n + 1` round-trips and grows linearly with the
//! collection. There is no batching and no pagination.

use futures::stream::{self, Stream, StreamExt};
use tracing::{debug, warn};

use crate::contract::ContractHandle;
use crate::entity::Product;
use crate::error::Result;

const LOG_TARGET: &str = "ledger_client::sync";

/// Reads the whole product collection.
///
/// Fails only when the count cannot be read. A failed per-index read is logged and the index is
/// left out, the remaining products are returned in ascending index order.
pub async fn sync_entities(handle: &ContractHandle) -> Result<Vec<Product>> {
    let count = handle.product_count().await?;
    debug!(target: LOG_TARGET, count, "Syncing products.");

    let products = collect_successes(product_results(handle, count)).await;

    debug!(target: LOG_TARGET, count, synced = products.len(), "Products synced.");
    Ok(products)
}

/// Lazily reads indices `1..=count`, one at a time, yielding every outcome with its index.
pub fn product_results(
    handle: &ContractHandle,
    count: u64,
) -> impl Stream<Item = (u64, Result<Product>)> + '_ {
    stream::iter(1..=count).then(move |index| async move { (index, handle.product(index).await) })
}

/// Keeps the successful reads of `results`, in order.
pub async fn collect_successes<S, T, E>(results: S) -> Vec<T>
where
    S: Stream<Item = (u64, std::result::Result<T, E>)>,
    E: std::fmt::Display,
{
    results
        .filter_map(|(index, result)| async move {
            match result {
                Ok(item) => Some(item),
                Err(error) => {
                    warn!(target: LOG_TARGET, index, %error, "Skipping product.");
                    None
                }
            }
        })
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::test_utils::{bound_handle, product, MockProvider};

    #[tokio::test]
    async fn keeps_successes_in_order() {
        let results = stream::iter(vec![(1, Ok(1)), (2, Err("boom")), (3, Ok(3))]);
        assert_eq!(collect_successes(results).await, vec![1, 3]);
    }

    #[tokio::test]
    async fn empty_collection() {
        let provider = Arc::new(MockProvider::new(5777));
        let products = sync_entities(&bound_handle(provider)).await.unwrap();
        assert!(products.is_empty());
    }

    #[tokio::test]
    async fn tolerates_all_but_one_failure() {
        let provider = Arc::new(
            MockProvider::new(5777)
                .with_products((1..=4).map(|id| product(id, "item")).collect())
                .fail_index(1)
                .fail_index(2)
                .fail_index(4),
        );

        let products = sync_entities(&bound_handle(provider)).await.unwrap();

        assert_eq!(products.iter().map(|p| p.id).collect::<Vec<_>>(), vec![3]);
    }

    #[tokio::test]
    async fn unpopulated_indices_are_skipped() {
        let provider = Arc::new(
            MockProvider::new(5777)
                .with_products(vec![product(1, "a"), product(3, "c")])
                .with_product_count(3),
        );

        let products = sync_entities(&bound_handle(provider)).await.unwrap();

        assert_eq!(products.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[tokio::test]
    async fn count_failure_fails_the_sync() {
        let provider = Arc::new(MockProvider::new(5777).fail_count());
        assert!(sync_entities(&bound_handle(provider)).await.is_err());
    }
}
