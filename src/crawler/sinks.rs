//! Result sinks
//!
//! Two dedicated tasks own the writes of a crawl: one saves recipes, the other
//! records harvested links. Each holds its own store handle. A storage failure
//! cancels the whole crawl.

use crate::crawler::worker::{DiscoveryBatch, DocumentResult};
use crate::storage::{FrontierStore, StorageError, StorageResult};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Totals reported by the discovery sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveryTotals {
    /// Non-recipe pages marked DONE
    pub pages: u64,
    /// URLs that were new to the frontier
    pub new_urls: u64,
}

/// Saves every recipe received and marks its URL DONE
///
/// # Returns
///
/// The number of recipes saved
pub async fn run_document_sink<S: FrontierStore>(
    mut store: S,
    mut results: mpsc::Receiver<DocumentResult>,
    cancel: CancellationToken,
) -> StorageResult<u64> {
    let mut saved = 0u64;

    while let Some(result) = next_message(&mut results, &cancel).await {
        if let Err(e) = save_document(&mut store, &result) {
            tracing::error!("Failed to save recipe {}: {}", result.url, e);
            cancel.cancel();
            return Err(e);
        }
        saved += 1;
        // Releases the dispatch permit
        drop(result);
    }

    tracing::debug!("Document sink drained, {} recipes saved", saved);
    Ok(saved)
}

fn save_document<S: FrontierStore>(store: &mut S, result: &DocumentResult) -> StorageResult<()> {
    let payload = serde_json::to_string(&result.document)
        .map_err(|e| StorageError::Serialization(format!("{}: {}", result.url, e)))?;
    let id = store.record_document(&result.site_id, &result.url, &payload)?;
    tracing::debug!("Saved recipe {} as document {}", result.url, id);
    Ok(())
}

/// Records every discovery batch received
pub async fn run_discovery_sink<S: FrontierStore>(
    mut store: S,
    mut batches: mpsc::Receiver<DiscoveryBatch>,
    cancel: CancellationToken,
) -> StorageResult<DiscoveryTotals> {
    let mut totals = DiscoveryTotals::default();

    while let Some(batch) = next_message(&mut batches, &cancel).await {
        match store.record_discovery(&batch.site_id, &batch.source_url, &batch.discovered) {
            Ok(new_urls) => {
                tracing::debug!(
                    "{}: {} links, {} new",
                    batch.source_url,
                    batch.discovered.len(),
                    new_urls
                );
                totals.pages += 1;
                totals.new_urls += new_urls as u64;
            }
            Err(e) => {
                tracing::error!("Failed to record links of {}: {}", batch.source_url, e);
                cancel.cancel();
                return Err(e);
            }
        }
        drop(batch);
    }

    tracing::debug!(
        "Discovery sink drained, {} pages, {} new URLs",
        totals.pages,
        totals.new_urls
    );
    Ok(totals)
}

/// Next message, or `None` once the channel is closed and empty or the crawl is
/// cancelled
async fn next_message<T>(
    rx: &mut mpsc::Receiver<T>,
    cancel: &CancellationToken,
) -> Option<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        message = rx.recv() => message,
    }
}
