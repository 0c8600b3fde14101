//! In-memory search service for tests and offline runs.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use analogy_types::Item;

use crate::error::ClientError;
use crate::service::SearchService;

/// Maximum number of results returned by `search`, matching the deployed service.
pub const SEARCH_LIMIT: usize = 5;

/// Mock search service over a fixed corpus.
///
/// `search` matches titles case-insensitively; `nearest` returns the corpus
/// item with the smallest squared L2 distance, stripped of its vector like
/// the deployed endpoint. Failures can be injected per operation.
pub struct MockSearchService {
    corpus: Vec<Item>,
    latency: Option<Duration>,
    fail_search: AtomicBool,
    fail_nearest: AtomicBool,
    search_calls: AtomicUsize,
    nearest_calls: AtomicUsize,
    last_nearest_vector: Mutex<Option<Vec<f32>>>,
}

impl MockSearchService {
    /// Create a mock over the given corpus.
    pub fn new(corpus: Vec<Item>) -> Self {
        Self {
            corpus,
            latency: None,
            fail_search: AtomicBool::new(false),
            fail_nearest: AtomicBool::new(false),
            search_calls: AtomicUsize::new(0),
            nearest_calls: AtomicUsize::new(0),
            last_nearest_vector: Mutex::new(None),
        }
    }

    /// Delay every response by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make subsequent `search` calls fail (or succeed again).
    pub fn set_fail_search(&self, fail: bool) {
        self.fail_search.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `nearest` calls fail (or succeed again).
    pub fn set_fail_nearest(&self, fail: bool) {
        self.fail_nearest.store(fail, Ordering::SeqCst);
    }

    /// Number of `search` calls received.
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// Number of `nearest` calls received.
    pub fn nearest_calls(&self) -> usize {
        self.nearest_calls.load(Ordering::SeqCst)
    }

    /// The vector of the most recent `nearest` call.
    pub fn last_nearest_vector(&self) -> Option<Vec<f32>> {
        self.last_nearest_vector
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or(None)
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[async_trait]
impl SearchService for MockSearchService {
    async fn search(&self, text: &str) -> Result<Vec<Item>, ClientError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.fail_search.load(Ordering::SeqCst) {
            return Err(ClientError::Request("injected search failure".to_string()));
        }

        let needle = text.to_lowercase();
        Ok(self
            .corpus
            .iter()
            .filter(|item| item.title.to_lowercase().contains(&needle))
            .take(SEARCH_LIMIT)
            .cloned()
            .collect())
    }

    async fn nearest(&self, vector: &[f32]) -> Result<Item, ClientError> {
        self.nearest_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_nearest_vector.lock() {
            *last = Some(vector.to_vec());
        }
        self.simulate_latency().await;

        if self.fail_nearest.load(Ordering::SeqCst) {
            return Err(ClientError::Request("injected nearest failure".to_string()));
        }

        self.corpus
            .iter()
            .filter(|item| item.vector.len() == vector.len())
            .min_by(|a, b| {
                squared_distance(&a.vector, vector).total_cmp(&squared_distance(&b.vector, vector))
            })
            .map(|item| Item {
                vector: Vec::new(),
                ..item.clone()
            })
            .ok_or(ClientError::NoResults)
    }
}
