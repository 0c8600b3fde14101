//! Solver error types.

use thiserror::Error;

use analogy_types::{ItemId, Operand};

/// Errors raised inside the search slots and the resolver.
///
/// None of these are fatal: controllers log them and fall back to their last
/// good state.
#[derive(Debug, Error)]
pub enum SolverError {
    /// An operand carries no embedding vector
    #[error("Operand {operand} has no embedding vector")]
    MissingVector { operand: Operand },

    /// Operand vectors have different lengths
    #[error("Dimension mismatch: operand {operand} has {actual} components, expected {expected}")]
    DimensionMismatch {
        operand: Operand,
        expected: usize,
        actual: usize,
    },

    /// A selection named an item that is not among the slot's options
    #[error("Item {0} is not among the current options")]
    UnknownOption(ItemId),
}
