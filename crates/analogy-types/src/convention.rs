//! Analogy operands and sign conventions.
//!
//! Two phrasings of the same analogy exist: "What is to A as B is to C?"
//! resolves to `a + b - c`, while "What is to C as A is to B?" resolves to
//! `a - b + c`. The convention is chosen once, at composition time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnalogyError;

/// One of the three operand slots of an analogy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    A,
    B,
    C,
}

impl Operand {
    /// All operands in slot order.
    pub const ALL: [Operand; 3] = [Operand::A, Operand::B, Operand::C];

    /// Position of the operand in slot order.
    pub fn index(self) -> usize {
        match self {
            Operand::A => 0,
            Operand::B => 1,
            Operand::C => 2,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operand::A => "A",
            Operand::B => "B",
            Operand::C => "C",
        };
        f.write_str(name)
    }
}

/// How the three operand vectors are combined into the target vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SignConvention {
    /// `target = a + b - c`
    #[default]
    #[serde(rename = "a+b-c")]
    AddSubtract,

    /// `target = a - b + c`
    #[serde(rename = "a-b+c")]
    SubtractAdd,
}

impl SignConvention {
    /// Signs applied to the `b` and `c` vectors (`a` is always added).
    pub fn signs(self) -> (f32, f32) {
        match self {
            SignConvention::AddSubtract => (1.0, -1.0),
            SignConvention::SubtractAdd => (-1.0, 1.0),
        }
    }

    /// Natural-language form of the question this convention answers.
    pub fn phrase(self) -> &'static str {
        match self {
            SignConvention::AddSubtract => "What is to A as B is to C?",
            SignConvention::SubtractAdd => "What is to C as A is to B?",
        }
    }
}

impl fmt::Display for SignConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignConvention::AddSubtract => f.write_str("a+b-c"),
            SignConvention::SubtractAdd => f.write_str("a-b+c"),
        }
    }
}

impl FromStr for SignConvention {
    type Err = AnalogyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        match normalized.to_lowercase().as_str() {
            "a+b-c" | "add-subtract" => Ok(SignConvention::AddSubtract),
            "a-b+c" | "subtract-add" => Ok(SignConvention::SubtractAdd),
            other => Err(AnalogyError::InvalidInput(format!(
                "unknown sign convention '{}', expected 'a+b-c' or 'a-b+c'",
                other
            ))),
        }
    }
}
