use thiserror::Error;

use crate::SEPARATOR;

/// A composite identifier string did not split into the expected number of
/// non-blank segments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("identifier '{value}' must have {arity} non-blank parts separated by '{SEPARATOR}'")]
pub struct MalformedIdentifier {
    /// The rejected input
    pub value: String,
    /// Number of segments that was expected
    pub arity: usize,
}

/// Composite identifiers are limited to two, three or four components.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("composite identifiers have 2 to 4 components, got {0}")]
pub struct UnsupportedArity(pub usize);
