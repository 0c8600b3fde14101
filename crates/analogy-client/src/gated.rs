//! Search service whose responses are released by hand.
//!
//! Every call is forwarded to a `GatedCalls` receiver and stays pending until
//! the holder answers it. This makes response ordering fully controllable,
//! which is what race tests need: answer the second request first, then the
//! first, and observe what the caller keeps.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use analogy_types::Item;

use crate::error::ClientError;
use crate::service::SearchService;

/// A pending `search` call.
pub struct PendingSearch {
    /// Query text as received
    pub text: String,
    respond: oneshot::Sender<Result<Vec<Item>, ClientError>>,
}

impl PendingSearch {
    /// Release the call with `outcome`. Returns false if the caller went away.
    pub fn respond(self, outcome: Result<Vec<Item>, ClientError>) -> bool {
        self.respond.send(outcome).is_ok()
    }
}

/// A pending `nearest` call.
pub struct PendingNearest {
    /// Target vector as received
    pub vector: Vec<f32>,
    respond: oneshot::Sender<Result<Item, ClientError>>,
}

impl PendingNearest {
    /// Release the call with `outcome`. Returns false if the caller went away.
    pub fn respond(self, outcome: Result<Item, ClientError>) -> bool {
        self.respond.send(outcome).is_ok()
    }
}

/// A call captured by `GatedSearchService`.
pub enum PendingCall {
    Search(PendingSearch),
    Nearest(PendingNearest),
}

impl PendingCall {
    /// The call as a search, if it is one.
    pub fn into_search(self) -> Option<PendingSearch> {
        match self {
            PendingCall::Search(call) => Some(call),
            PendingCall::Nearest(_) => None,
        }
    }

    /// The call as a nearest lookup, if it is one.
    pub fn into_nearest(self) -> Option<PendingNearest> {
        match self {
            PendingCall::Nearest(call) => Some(call),
            PendingCall::Search(_) => None,
        }
    }
}

/// Receiving end of the captured calls, in arrival order.
pub struct GatedCalls {
    rx: mpsc::UnboundedReceiver<PendingCall>,
}

impl GatedCalls {
    /// Wait for the next call.
    pub async fn next(&mut self) -> Option<PendingCall> {
        self.rx.recv().await
    }

    /// Take the next call if one has already arrived.
    pub fn try_next(&mut self) -> Option<PendingCall> {
        self.rx.try_recv().ok()
    }
}

/// Search service that parks every call until released through `GatedCalls`.
pub struct GatedSearchService {
    calls: mpsc::UnboundedSender<PendingCall>,
}

impl GatedSearchService {
    /// Create the service and the receiver of its calls.
    pub fn new() -> (Arc<Self>, GatedCalls) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { calls: tx }), GatedCalls { rx })
    }
}

fn gate_closed() -> ClientError {
    ClientError::Request("gated call was dropped without a response".to_string())
}

#[async_trait]
impl SearchService for GatedSearchService {
    async fn search(&self, text: &str) -> Result<Vec<Item>, ClientError> {
        let (tx, rx) = oneshot::channel();
        self.calls
            .send(PendingCall::Search(PendingSearch {
                text: text.to_string(),
                respond: tx,
            }))
            .map_err(|_| gate_closed())?;
        rx.await.unwrap_or_else(|_| Err(gate_closed()))
    }

    async fn nearest(&self, vector: &[f32]) -> Result<Item, ClientError> {
        let (tx, rx) = oneshot::channel();
        self.calls
            .send(PendingCall::Nearest(PendingNearest {
                vector: vector.to_vec(),
                respond: tx,
            }))
            .map_err(|_| gate_closed())?;
        rx.await.unwrap_or_else(|_| Err(gate_closed()))
    }
}
