//! # analogy-types
//!
//! Shared domain types for the vector analogy solver.
//!
//! This crate defines the data structures used throughout the system:
//! - Items: Immutable records returned by the search service
//! - Sign conventions: How the three operand vectors are combined
//! - Settings: Layered configuration
//!
//! ## Usage
//!
//! ```rust
//! use analogy_types::{Item, ItemId, SignConvention};
//!
//! let item = Item::new(ItemId::Number(7), "Paris", "Paris is the capital of France.");
//! assert_eq!(item.identifier, ItemId::Number(7));
//! assert_eq!(SignConvention::default().to_string(), "a+b-c");
//! ```

pub mod config;
pub mod convention;
pub mod error;
pub mod item;

pub use config::{AnalogySettings, SearchSettings, ServiceEndpoints, ServiceSettings, Settings};
pub use convention::{Operand, SignConvention};
pub use error::AnalogyError;
pub use item::{Item, ItemId, PLACEHOLDER_ID};
