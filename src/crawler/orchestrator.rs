//! Crawl orchestration
//!
//! The orchestrator seeds the frontier, then repeatedly claims pending URLs and
//! hands them to the worker pool through a bounded dispatch channel. A crawl
//! ends once the frontier has stayed empty for more than `idle_threshold`
//! consecutive polls.
//!
//! Shutdown is cooperative: the dispatch channel is closed, workers finish the
//! URLs they hold, the sinks drain their channels and every task is joined
//! before [`Orchestrator::run`] returns.

use crate::config::CrawlerConfig;
use crate::crawler::sinks::{run_discovery_sink, run_document_sink};
use crate::crawler::worker::{Dispatch, SharedDispatch, Worker};
use crate::sites::Site;
use crate::storage::{FrontierStore, StorageResult};
use crate::HarvestError;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tokio_util::sync::CancellationToken;

/// Summary of a finished crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Recipes saved during this run
    pub documents_saved: u64,
    /// Non-recipe pages whose links were harvested
    pub pages_harvested: u64,
    /// URLs added to the frontier during this run
    pub urls_discovered: u64,
    /// Number of times the frontier was polled
    pub polls: u64,
}

/// Drives one crawl of one site
pub struct Orchestrator<S> {
    site: Arc<dyn Site>,
    store: S,
    client: Client,
    config: CrawlerConfig,
    cancel: CancellationToken,
}

impl<S: FrontierStore + 'static> Orchestrator<S> {
    /// Creates a new orchestrator
    ///
    /// # Arguments
    ///
    /// * `site` - The site collaborator classifying pages
    /// * `store` - Frontier store; each sink gets its own reopened handle
    /// * `client` - HTTP client shared by the workers
    /// * `config` - Concurrency, poll interval and idle threshold
    pub fn new(site: Arc<dyn Site>, store: S, client: Client, config: CrawlerConfig) -> Self {
        Self {
            site,
            store,
            client,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Runs the crawl to completion
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The frontier went idle and every task drained
    /// * `Err(HarvestError)` - A storage error stopped the crawl; URLs that were
    ///   in flight stay IN_PROGRESS until the next run requeues them
    pub async fn run(mut self, start_url: &str) -> Result<CrawlReport, HarvestError> {
        let site_id = self.site.name().to_string();
        let concurrency = self.config.concurrency.max(1) as usize;

        tracing::info!("Starting crawl of {} from {}", site_id, start_url);
        self.store.seed(&site_id, start_url)?;
        let requeued = self.store.requeue_in_progress(&site_id)?;
        if requeued > 0 {
            tracing::info!(
                "Requeued {} URLs left in progress by a previous run",
                requeued
            );
        }

        let permits = Arc::new(Semaphore::new(concurrency));
        let (dispatch_tx, dispatch_rx) = mpsc::channel(concurrency);
        let dispatch_rx: SharedDispatch = Arc::new(Mutex::new(dispatch_rx));
        let (documents_tx, documents_rx) = mpsc::channel(concurrency);
        let (discoveries_tx, discoveries_rx) = mpsc::channel(concurrency);

        let document_sink = tokio::spawn(run_document_sink(
            self.store.reopen()?,
            documents_rx,
            self.cancel.clone(),
        ));
        let discovery_sink = tokio::spawn(run_discovery_sink(
            self.store.reopen()?,
            discoveries_rx,
            self.cancel.clone(),
        ));

        let workers: Vec<_> = (0..concurrency)
            .map(|id| {
                let worker = Worker {
                    id,
                    site: Arc::clone(&self.site),
                    client: self.client.clone(),
                    dispatch: Arc::clone(&dispatch_rx),
                    documents: documents_tx.clone(),
                    discoveries: discoveries_tx.clone(),
                    cancel: self.cancel.clone(),
                };
                tokio::spawn(worker.run())
            })
            .collect();
        // Sinks finish once every worker has dropped its senders
        drop(documents_tx);
        drop(discoveries_tx);
        drop(dispatch_rx);

        let polled = self
            .poll_frontier(&site_id, concurrency, &permits, &dispatch_tx)
            .await;
        if polled.is_err() {
            self.cancel.cancel();
        }
        drop(dispatch_tx);

        for worker in workers {
            worker.await?;
        }
        let documents = document_sink.await?;
        let discoveries = discovery_sink.await?;

        let polls = polled?;
        let documents_saved = documents?;
        let discoveries = discoveries?;

        let report = CrawlReport {
            documents_saved,
            pages_harvested: discoveries.pages,
            urls_discovered: discoveries.new_urls,
            polls,
        };
        tracing::info!(
            "Crawl of {} finished: {} recipes saved, {} pages harvested, {} new URLs",
            site_id,
            report.documents_saved,
            report.pages_harvested,
            report.urls_discovered
        );
        Ok(report)
    }

    /// Polls the frontier until it goes idle or the crawl is cancelled
    ///
    /// # Returns
    ///
    /// The number of polls made
    async fn poll_frontier(
        &mut self,
        site_id: &str,
        concurrency: usize,
        permits: &Arc<Semaphore>,
        dispatch: &mpsc::Sender<Dispatch>,
    ) -> StorageResult<u64> {
        let interval = self.config.poll_interval();
        let threshold = self.config.idle_threshold;
        let mut idle = 0u32;
        let mut polls = 0u64;

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
            polls += 1;

            let batch = self.store.claim(site_id, concurrency)?;
            if batch.is_empty() {
                idle += 1;
                tracing::debug!("No pending URLs ({}/{})", idle, threshold);
                if idle > threshold {
                    tracing::info!("Frontier idle for {} polls, stopping", idle);
                    break;
                }
                continue;
            }

            idle = 0;
            tracing::debug!("Dispatching {} URLs", batch.len());
            for url in batch {
                // Blocks while `concurrency` URLs are unresolved
                let permit = tokio::select! {
                    _ = self.cancel.cancelled() => return Ok(polls),
                    permit = Arc::clone(permits).acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return Ok(polls),
                    },
                };
                if dispatch.send(Dispatch { url, permit }).await.is_err() {
                    tracing::warn!("Worker pool closed, stopping dispatch");
                    return Ok(polls);
                }
            }

            if polls % 10 == 0 {
                tracing::info!(
                    "Progress: {} polls, {} URLs queued",
                    polls,
                    self.store.count_todo(site_id)?
                );
            }
        }

        Ok(polls)
    }
}
