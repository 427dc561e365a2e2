//! Commonly used types for driving a generation run.
//!
//! ```
//! use scrudgen::prelude::*;
//! ```

pub use crate::config::{GeneratorConfig, Settings};
pub use crate::descriptor::{ModelDescriptor, ModelGraph, Resolver, TypeIndex};
pub use crate::emitter::{
    ArtifactStore, EmitOutcome, Emitter, FsArtifactStore, MemoryArtifactStore, OutcomeKind,
};
pub use crate::errors::{ScrudError, ScrudErrorKind, ScrudResult};
pub use crate::metadata::{Manifest, parse_manifest, parse_manifest_from_str};
pub use crate::names::{Namespace, QualifiedName};
pub use crate::orchestrator::{
    ArtifactReport, ModelReport, ModelStatus, Orchestrator, RunOutcome, RunPhase, RunReport,
};
pub use crate::render::{Renderer, RustRenderer};
pub use crate::spec::{ArtifactKind, ArtifactSpec};
pub use scrudgen_codec::{FromIdentifier, Identifiable, MalformedIdentifier, Pair, Quadruple, Triple};
