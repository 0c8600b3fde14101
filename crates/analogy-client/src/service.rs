//! The search service seam.

use async_trait::async_trait;

use analogy_types::Item;

use crate::error::ClientError;

/// Stateless transport to the embedding search service.
///
/// Implementations never retry, cache or mask failures: every error is
/// returned to the caller, which owns the recovery policy.
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Full-text search. Results are returned verbatim, in service order.
    async fn search(&self, text: &str) -> Result<Vec<Item>, ClientError>;

    /// The single item whose embedding is closest to `vector`.
    async fn nearest(&self, vector: &[f32]) -> Result<Item, ClientError>;
}
