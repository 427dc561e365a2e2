//! Model metadata as declared in a TOML manifest.
//!
//! The manifest is the generator's only input: a list of `[[model]]` tables
//! with their fields, identifiers and generation flags, plus `[[dto]]`
//! variant declarations and a `[generator]` section.

pub mod parser;
pub mod types;
pub mod validator;

pub use parser::{parse_manifest, parse_manifest_from_str};
pub use types::*;
pub use validator::{ValidationResult, validate_manifest, validate_model};
