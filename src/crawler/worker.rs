//! Fetch workers
//!
//! A worker takes one dispatched URL at a time, asks the site to classify it and
//! routes the outcome to one of the two result sinks. Every message carries the
//! dispatch permit of its URL so the permit is released only once the sink has
//! persisted the outcome.

use crate::crawler::links::extract_links;
use crate::model::Recipe;
use crate::sites::{Classification, Site};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, OwnedSemaphorePermit};
use tokio_util::sync::CancellationToken;
use url::Url;

/// A claimed URL handed to the worker pool
#[derive(Debug)]
pub struct Dispatch {
    pub url: String,
    pub permit: OwnedSemaphorePermit,
}

/// A page the site recognised as a recipe
#[derive(Debug)]
pub struct DocumentResult {
    pub site_id: String,
    pub url: String,
    pub document: Recipe,
    pub permit: OwnedSemaphorePermit,
}

/// Links harvested from a page that was not a recipe
#[derive(Debug)]
pub struct DiscoveryBatch {
    pub site_id: String,
    pub source_url: String,
    pub discovered: Vec<String>,
    pub permit: OwnedSemaphorePermit,
}

/// Receiving end of the dispatch channel, shared by all workers
pub type SharedDispatch = Arc<Mutex<mpsc::Receiver<Dispatch>>>;

/// One fetch worker
pub struct Worker {
    pub id: usize,
    pub site: Arc<dyn Site>,
    pub client: Client,
    pub dispatch: SharedDispatch,
    pub documents: mpsc::Sender<DocumentResult>,
    pub discoveries: mpsc::Sender<DiscoveryBatch>,
    pub cancel: CancellationToken,
}

impl Worker {
    /// Processes dispatched URLs until the dispatch channel closes
    ///
    /// Cancellation abandons the URL being fetched; it stays IN_PROGRESS and is
    /// reclaimed by the next run.
    pub async fn run(self) {
        tracing::debug!("Worker {} started", self.id);
        let site_id = self.site.name().to_string();

        loop {
            let next = tokio::select! {
                _ = self.cancel.cancelled() => break,
                next = recv_shared(&self.dispatch) => next,
            };
            let Some(Dispatch { url, permit }) = next else {
                break;
            };

            let outcome = tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::debug!("Worker {} abandoned {}", self.id, url);
                    break;
                }
                outcome = self.site.classify(&self.client, &url) => outcome,
            };

            let delivered = match outcome {
                Classification::Document { document, .. } => {
                    tracing::info!("Recipe found: {}", url);
                    self.documents
                        .send(DocumentResult {
                            site_id: site_id.clone(),
                            url,
                            document,
                            permit,
                        })
                        .await
                        .is_ok()
                }
                Classification::NotDocument { body, reason } => {
                    tracing::debug!("Not a recipe: {}", reason);
                    let discovered = match Url::parse(&url) {
                        Ok(source) => extract_links(&body, &source),
                        Err(e) => {
                            tracing::warn!("Cannot resolve links of {}: {}", url, e);
                            Vec::new()
                        }
                    };
                    self.discoveries
                        .send(DiscoveryBatch {
                            site_id: site_id.clone(),
                            source_url: url,
                            discovered,
                            permit,
                        })
                        .await
                        .is_ok()
                }
            };

            if !delivered {
                tracing::debug!("Worker {}: result sink closed", self.id);
                break;
            }
        }

        tracing::debug!("Worker {} stopped", self.id);
    }
}

async fn recv_shared(dispatch: &SharedDispatch) -> Option<Dispatch> {
    dispatch.lock().await.recv().await
}
