//! Element-wise analogy arithmetic.

use analogy_types::{Item, Operand, SignConvention};

use crate::error::SolverError;

/// Combine three vectors into the analogy target.
///
/// `a` is always added; the signs of `b` and `c` come from `convention`.
/// All three vectors must be non-empty and of equal length.
pub fn combine(
    convention: SignConvention,
    a: &[f32],
    b: &[f32],
    c: &[f32],
) -> Result<Vec<f32>, SolverError> {
    if a.is_empty() {
        return Err(SolverError::MissingVector {
            operand: Operand::A,
        });
    }

    for (operand, vector) in [(Operand::B, b), (Operand::C, c)] {
        if vector.is_empty() {
            return Err(SolverError::MissingVector { operand });
        }
        if vector.len() != a.len() {
            return Err(SolverError::DimensionMismatch {
                operand,
                expected: a.len(),
                actual: vector.len(),
            });
        }
    }

    let (b_sign, c_sign) = convention.signs();
    Ok(a.iter()
        .zip(b)
        .zip(c)
        .map(|((a, b), c)| a + b_sign * b + c_sign * c)
        .collect())
}

/// Target vector for three selected items.
pub fn target_vector(
    convention: SignConvention,
    a: &Item,
    b: &Item,
    c: &Item,
) -> Result<Vec<f32>, SolverError> {
    combine(convention, &a.vector, &b.vector, &c.vector)
}
