//! Error types for the generation pipeline.
//!
//! Every fallible operation returns `ScrudResult<T>`. Errors raised while
//! resolving or building one model are recorded against that model in the
//! run report; only configuration problems and an empty model set abort a
//! whole run.
//!
//! ```
//! use scrudgen::errors::{ScrudError, ScrudErrorKind, ScrudResult};
//!
//! fn lookup(name: &str) -> ScrudResult<()> {
//!     Err(ScrudError::UnresolvableModel {
//!         model: name.to_string(),
//!         reason: "declares no identifier".to_string(),
//!     })
//! }
//!
//! let err = lookup("shop::model::Order").unwrap_err();
//! assert_eq!(err.kind(), ScrudErrorKind::UnresolvableModel);
//! ```

use scrudgen_codec::MalformedIdentifier;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumDiscriminants};
use thiserror::Error;

use crate::names::QualifiedName;

pub type ScrudResult<T> = Result<T, ScrudError>;

#[derive(Error, Debug, EnumDiscriminants)]
#[strum_discriminants(name(ScrudErrorKind))]
#[strum_discriminants(derive(Display, Serialize, Deserialize, Hash))]
#[strum_discriminants(serde(rename_all = "kebab-case"))]
#[strum_discriminants(strum(serialize_all = "kebab-case"))]
pub enum ScrudError {
    #[error("Unresolvable model '{model}': {reason}")]
    UnresolvableModel { model: String, reason: String },

    #[error("Duplicate artifact name: {0}")]
    DuplicateArtifactName(QualifiedName),

    #[error("Invalid attribute path '{path}' on model '{model}': {reason}")]
    InvalidAttributePath {
        model: String,
        path: String,
        reason: String,
    },

    #[error("Failed to write artifact {name}: {source}")]
    EmissionIo {
        name: QualifiedName,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render artifact {name}: {reason}")]
    Render { name: QualifiedName, reason: String },

    #[error("Configuration Error: {0}")]
    Configuration(String),

    #[error("Nothing to generate: {0}")]
    NothingToGenerate(String),

    #[error(transparent)]
    Malformed(#[from] MalformedIdentifier),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML Decode Error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML Encode Error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl ScrudError {
    pub fn kind(&self) -> ScrudErrorKind {
        ScrudErrorKind::from(self)
    }

    pub fn unresolvable(model: impl Into<String>, reason: impl Into<String>) -> Self {
        ScrudError::UnresolvableModel {
            model: model.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error ends the whole run rather than a single model.
    pub fn aborts_run(&self) -> bool {
        matches!(
            self,
            ScrudError::Configuration(_) | ScrudError::NothingToGenerate(_)
        )
    }
}
