//! Ties changes of the current query to story requests.
//!
//! Each trigger gets the next sequence number and produces exactly two
//! events on the outcome channel: `Started` right away and `Completed` once
//! the request resolves or times out. Requests are never cancelled; the
//! consumer decides whether a `Completed` for an older sequence number is
//! still wanted (see `SearchApp::handle_fetch_event`).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::error::FetchError;
use crate::hn_client::StorySource;
use crate::models::StoryRecord;

#[derive(Debug)]
pub enum FetchEvent {
    Started {
        seq: u64,
        query: String,
    },
    Completed {
        seq: u64,
        query: String,
        outcome: Result<Vec<StoryRecord>, FetchError>,
    },
}

impl FetchEvent {
    pub fn seq(&self) -> u64 {
        match self {
            FetchEvent::Started { seq, .. } | FetchEvent::Completed { seq, .. } => *seq,
        }
    }
}

pub struct FetchOrchestrator {
    source: Arc<dyn StorySource>,
    timeout: Duration,
    last_seq: u64,
    events_tx: mpsc::UnboundedSender<FetchEvent>,
}

impl FetchOrchestrator {
    pub fn new(
        source: Arc<dyn StorySource>,
        timeout: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<FetchEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let orchestrator = Self {
            source,
            timeout,
            last_seq: 0,
            events_tx,
        };
        (orchestrator, events_rx)
    }

    /// Starts one request for `query` and returns its sequence number.
    /// Must be called from within a tokio runtime.
    pub fn trigger(&mut self, query: String) -> u64 {
        self.last_seq += 1;
        let seq = self.last_seq;

        tracing::info!(seq, query = %query, "fetching stories");
        let _ = self.events_tx.send(FetchEvent::Started {
            seq,
            query: query.clone(),
        });

        let source = Arc::clone(&self.source);
        let timeout = self.timeout;
        let events_tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = match tokio::time::timeout(timeout, source.fetch_stories(&query)).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout(timeout)),
            };

            match &outcome {
                Ok(stories) => tracing::debug!(seq, count = stories.len(), "fetch completed"),
                Err(e) => tracing::warn!(seq, kind = e.kind(), error = %e, "fetch failed"),
            }

            // The receiver is gone only when the app is shutting down.
            let _ = events_tx.send(FetchEvent::Completed {
                seq,
                query,
                outcome,
            });
        });

        seq
    }

    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }

    /// Runs until the history is dropped: fetches the current query once
    /// up front, then once per change. Changes that land while the task is
    /// not yet awake collapse into a single fetch of the newest query.
    pub fn listen(mut self, mut current: watch::Receiver<Option<String>>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let query = current.borrow_and_update().clone();
                if let Some(query) = query {
                    self.trigger(query);
                }
                if current.changed().await.is_err() {
                    tracing::debug!("search history dropped, orchestrator stopping");
                    break;
                }
            }
        })
    }
}
