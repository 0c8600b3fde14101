//! Client library for the embedding search service.
//!
//! This crate provides:
//! - `SearchService`, the transport seam used by the solver
//! - `HttpSearchService`, the HTTP implementation talking to the deployed endpoints
//! - `MockSearchService`, an in-memory implementation for tests and offline runs
//! - `GatedSearchService`, which parks calls until a test releases them
//!
//! # Example
//!
//! ```rust,no_run
//! use analogy_client::{HttpSearchService, SearchService};
//! use analogy_types::Settings;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::load(None)?;
//!     let service = HttpSearchService::from_settings(&settings.service)?;
//!
//!     let options = service.search("Paris").await?;
//!     if let Some(first) = options.first() {
//!         let nearest = service.nearest(&first.vector).await?;
//!         println!("{} -> {}", first.title, nearest.title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod gated;
pub mod http;
pub mod mock;
pub mod service;

pub use error::ClientError;
pub use gated::{GatedCalls, GatedSearchService, PendingCall, PendingNearest, PendingSearch};
pub use http::HttpSearchService;
pub use mock::MockSearchService;
pub use service::SearchService;

// Re-export Item for convenience
pub use analogy_types::Item;
