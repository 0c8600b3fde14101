//! # analogy-core
//!
//! Interactive state for the vector analogy solver.
//!
//! - `SearchSlot`: debounced text input that searches the service and keeps
//!   only the response for the latest request
//! - `AnalogyResolver`: combines the three selected vectors and looks up the
//!   nearest item, discarding responses for superseded operand triples
//! - `AnalogySolver`: three slots wired to one resolver
//!
//! State is published through `tokio::sync::watch` channels so any number of
//! views can observe it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use analogy_client::MockSearchService;
//! use analogy_core::AnalogySolver;
//! use analogy_types::{Operand, SignConvention};
//!
//! # async fn demo() {
//! let service = Arc::new(MockSearchService::new(Vec::new()));
//! let solver = AnalogySolver::with_options(
//!     service,
//!     Duration::from_millis(300),
//!     SignConvention::AddSubtract,
//! );
//!
//! solver.slot(Operand::A).on_text_changed("Paris");
//! let mut results = solver.subscribe();
//! results.changed().await.ok();
//! println!("{}", results.borrow().result.title);
//! # }
//! ```

pub mod arithmetic;
pub mod debounce;
pub mod error;
pub mod resolver;
pub mod slot;
pub mod solver;

pub use arithmetic::{combine, target_vector};
pub use debounce::Debouncer;
pub use error::SolverError;
pub use resolver::{AnalogyResolver, AnalogyState};
pub use slot::{EmptyOptions, QuerySlot, RequestToken, SearchSlot};
pub use solver::AnalogySolver;
