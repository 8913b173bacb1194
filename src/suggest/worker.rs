//! Background suggestion worker.
//!
//! Suggestions can take a while on wide datasets, so the interactive thread
//! hands requests to a dedicated worker thread over a channel and picks up
//! responses when they arrive. Only the newest pending request is served:
//! older requests still waiting in the queue are superseded and receive no
//! response. A request already being scored runs to completion; there is no
//! cancellation.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use serde::{Deserialize, Serialize};

use crate::data::{BinningStrategy, Dataset, Metadata, MetadataError};
use crate::parallelism::Parallelism;

use super::engine::FeatureSuggester;
use super::SuggestionCriterion;

// =============================================================================
// Protocol
// =============================================================================

/// A suggestion request: `{criterion, selected, metadata, dataset}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionRequest {
    pub criterion: SuggestionCriterion,
    pub selected: Vec<String>,
    pub metadata: Arc<Metadata>,
    pub dataset: Arc<Dataset>,
    #[serde(default)]
    pub strategy: BinningStrategy,
}

impl SuggestionRequest {
    /// Answer the request on the current thread.
    ///
    /// # Errors
    ///
    /// Fails on an invalid selection or mismatched dataset.
    pub fn handle(&self, parallelism: Parallelism) -> Result<String, MetadataError> {
        self.metadata.check_dataset(&self.dataset)?;
        FeatureSuggester::new(&self.metadata, &self.dataset, self.strategy)
            .with_parallelism(parallelism)
            .suggest(self.criterion, &self.selected)
    }
}

/// The worker's answer to one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    /// Ticket returned by [`SuggestionWorker::submit`].
    pub id: u64,
    /// Suggested feature, empty when there is none.
    pub suggestion: String,
    /// Why the request could not be scored, if it could not.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Time spent scoring.
    pub elapsed: Duration,
}

/// Worker communication errors.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("failed to spawn suggestion worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("suggestion worker has shut down")]
    Disconnected,

    #[error("timed out waiting for a suggestion")]
    Timeout,
}

struct Envelope {
    id: u64,
    request: SuggestionRequest,
}

// =============================================================================
// SuggestionWorker
// =============================================================================

/// Handle to a background suggestion thread.
///
/// Dropping the handle closes the request channel and joins the thread.
pub struct SuggestionWorker {
    requests: Option<Sender<Envelope>>,
    responses: Receiver<SuggestionResponse>,
    thread: Option<JoinHandle<()>>,
    next_id: u64,
}

impl SuggestionWorker {
    /// Start the worker thread.
    ///
    /// With a parallel hint the worker scores candidates on its own rayon
    /// pool of that size.
    pub fn spawn(parallelism: Parallelism) -> Result<Self, WorkerError> {
        let (request_tx, request_rx) = crossbeam_channel::unbounded::<Envelope>();
        let (response_tx, response_rx) = crossbeam_channel::unbounded();

        let thread = thread::Builder::new()
            .name("featuretree-suggest".into())
            .spawn(move || run(request_rx, response_tx, parallelism))?;

        Ok(Self {
            requests: Some(request_tx),
            responses: response_rx,
            thread: Some(thread),
            next_id: 0,
        })
    }

    /// Queue a request and return its ticket.
    pub fn submit(&mut self, request: SuggestionRequest) -> Result<u64, WorkerError> {
        let id = self.next_id;
        self.next_id += 1;
        self.requests
            .as_ref()
            .ok_or(WorkerError::Disconnected)?
            .send(Envelope { id, request })
            .map_err(|_| WorkerError::Disconnected)?;
        Ok(id)
    }

    /// Block until the next response arrives.
    pub fn recv(&self) -> Result<SuggestionResponse, WorkerError> {
        self.responses.recv().map_err(|_| WorkerError::Disconnected)
    }

    /// Wait at most `timeout` for the next response.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<SuggestionResponse, WorkerError> {
        self.responses.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => WorkerError::Timeout,
            RecvTimeoutError::Disconnected => WorkerError::Disconnected,
        })
    }

    /// A response if one is ready.
    pub fn try_recv(&self) -> Option<SuggestionResponse> {
        self.responses.try_recv().ok()
    }
}

impl Drop for SuggestionWorker {
    fn drop(&mut self) {
        self.requests.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!("suggestion worker panicked");
            }
        }
    }
}

fn run(
    requests: Receiver<Envelope>,
    responses: Sender<SuggestionResponse>,
    parallelism: Parallelism,
) {
    let pool = parallelism.scoring_pool();

    while let Ok(mut envelope) = requests.recv() {
        while let Ok(newer) = requests.try_recv() {
            tracing::debug!(superseded = envelope.id, by = newer.id, "dropping stale request");
            envelope = newer;
        }

        let started = Instant::now();
        let result = match &pool {
            Some(pool) => pool.install(|| envelope.request.handle(parallelism)),
            None => envelope.request.handle(Parallelism::Sequential),
        };

        let (suggestion, error) = match result {
            Ok(suggestion) => (suggestion, None),
            Err(e) => {
                tracing::warn!(id = envelope.id, error = %e, "suggestion request failed");
                (String::new(), Some(e.to_string()))
            }
        };

        let response = SuggestionResponse {
            id: envelope.id,
            suggestion,
            error,
            elapsed: started.elapsed(),
        };
        if responses.send(response).is_err() {
            break;
        }
    }

    tracing::debug!("suggestion worker stopped");
}
