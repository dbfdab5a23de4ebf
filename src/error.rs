//! Error types for CNF transformation.

use thiserror::Error;

use crate::types::Var;

/// Result type alias for fallible registry and transformation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to callers of the transformation.
///
/// A threshold overflow of the distributive expander is not listed here: it is
/// always recovered locally by falling back to the Tseytin encoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The registry could not find an unused name for the given prefix.
    #[error("no unused variable name with prefix '{prefix}' after {attempts} attempts")]
    NameExhaustion { prefix: String, attempts: usize },

    /// The input formula is not a proto-CNF (top-level AND of sub-formulas).
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A variable name is already taken in the registry.
    #[error("variable name '{0}' already exists")]
    DuplicateName(String),

    /// A variable index is not present in the registry.
    #[error("unknown variable: {0}")]
    UnknownVariable(Var),

    /// A variable name is not present in the registry.
    #[error("unknown variable name: '{0}'")]
    UnknownName(String),
}
