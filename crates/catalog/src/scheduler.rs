//! Single-lane request scheduler for the rate-limited metadata API.
//!
//! All outbound calls funnel through one FIFO queue consumed by a single
//! worker task, which enforces a minimum wall-clock gap between issued
//! requests and retries rate-limited calls in place with a bounded budget.
//! The cache is consulted before queueing and populated before a caller
//! resolves, so a follow-up request for the same key hits the cache.

use crate::cache::CacheStore;
use shared::config::PacingConfig;
use shared::error::ApiError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, warn};

/// Boxed future returned by a fetch function
pub type FetchFuture = Pin<Box<dyn Future<Output = Result<serde_json::Value, ApiError>> + Send>>;

/// Fetch function invoked by the worker lane; called once per attempt
pub type FetchFn = Box<dyn Fn() -> FetchFuture + Send>;

/// One queued request, alive until it resolves or exhausts its retries
struct QueuedRequest {
    resource_key: String,
    retries_remaining: u32,
    fetch: FetchFn,
    respond: oneshot::Sender<Result<serde_json::Value, ApiError>>,
}

/// FIFO scheduler with pacing and bounded rate-limit retry
pub struct RequestScheduler {
    cache: Arc<CacheStore>,
    max_retries: u32,
    tx: mpsc::UnboundedSender<QueuedRequest>,
    worker: tokio::task::JoinHandle<()>,
}

impl RequestScheduler {
    /// Create a scheduler and spawn its worker lane
    pub fn new(cache: Arc<CacheStore>, pacing: PacingConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let max_retries = pacing.max_retries;
        let worker = tokio::spawn(worker_lane(rx, Arc::clone(&cache), pacing));

        Self {
            cache,
            max_retries,
            tx,
            worker,
        }
    }

    /// Resolve a resource, from cache when fresh, otherwise via the queue.
    ///
    /// Concurrent calls for the same key each become their own queue entry;
    /// only the cache collapses repeats that arrive after the first resolves.
    pub async fn schedule(&self, resource_key: &str, fetch: FetchFn) -> Result<serde_json::Value, ApiError> {
        if let Some(value) = self.cache.get(resource_key) {
            return Ok(value);
        }

        let (respond, response) = oneshot::channel();
        let request = QueuedRequest {
            resource_key: resource_key.to_string(),
            retries_remaining: self.max_retries,
            fetch,
            respond,
        };

        self.tx
            .send(request)
            .map_err(|_| ApiError::Network("request scheduler is shut down".to_string()))?;

        response
            .await
            .map_err(|_| ApiError::Network("request scheduler dropped the request".to_string()))?
    }
}

impl Drop for RequestScheduler {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

/// The single worker lane: strict FIFO issuance with a pacing gap.
async fn worker_lane(
    mut rx: mpsc::UnboundedReceiver<QueuedRequest>,
    cache: Arc<CacheStore>,
    pacing: PacingConfig,
) {
    let min_interval = Duration::from_millis(pacing.min_interval_ms);
    let backoff = min_interval * pacing.backoff_factor;
    let mut next_issue_at: Option<Instant> = None;

    while let Some(mut request) = rx.recv().await {
        let outcome = loop {
            if let Some(deadline) = next_issue_at {
                sleep_until(deadline).await;
            }
            next_issue_at = Some(Instant::now() + min_interval);

            debug!(
                key = %request.resource_key,
                retries_remaining = request.retries_remaining,
                "Issuing request"
            );

            match (request.fetch)().await {
                Ok(value) => break Ok(value),
                Err(e) if e.is_rate_limit() && request.retries_remaining > 0 => {
                    // Retried in place: the request stays at the head of the
                    // lane instead of rejoining the back of the queue.
                    request.retries_remaining -= 1;
                    warn!(
                        key = %request.resource_key,
                        backoff_ms = backoff.as_millis() as u64,
                        retries_remaining = request.retries_remaining,
                        "Rate limited by upstream, backing off"
                    );
                    sleep(backoff).await;
                }
                Err(e) if e.is_rate_limit() => {
                    warn!(key = %request.resource_key, "Rate limit retries exhausted");
                    break Err(ApiError::RateLimited);
                }
                Err(e) => {
                    warn!(key = %request.resource_key, error = %e, "Request failed");
                    break Err(e);
                }
            }
        };

        if let Ok(ref value) = outcome {
            // Populate before resolving so the next caller sees a hit
            cache.set(&request.resource_key, value.clone());
        }

        // A caller that went away mid-flight is not an error
        let _ = request.respond.send(outcome);
    }
}
