//! # scrudgen
//!
//! Derives the CRUD layer of a model set from declarative metadata: DTOs,
//! DTO mappers, identifier adapters, repositories, service interfaces and
//! implementations, controllers and per-entity predicate factories.
//!
//! ## Pipeline
//!
//! - [`metadata`]: the TOML manifest declaring models, fields and DTO variants
//! - [`descriptor`]: resolves each declaration into a [`descriptor::ModelDescriptor`]
//! - [`builders`]: one spec builder per artifact kind, producing [`spec::ArtifactSpec`]s
//! - [`render`]: turns specs into formatted Rust source
//! - [`emitter`]: writes sources, never overwriting an existing artifact
//! - [`orchestrator`]: runs the whole thing and reports per model
//!
//! Composite identifiers are encoded and decoded by the companion
//! `scrudgen_codec` crate, which generated code depends on at runtime.
//!
//! ## Quick Start
//!
//! ```
//! use scrudgen::prelude::*;
//!
//! let manifest = parse_manifest_from_str(r#"
//! [[model]]
//! name = "Customer"
//! namespace = "shop::model"
//! identifier = { type = "u64" }
//!
//! [[model.field]]
//! name = "name"
//! type = "String"
//! "#)?;
//!
//! let config = GeneratorConfig::from_section(&manifest.generator, "generated", vec![])?;
//! let store = MemoryArtifactStore::new();
//! let mut orchestrator = Orchestrator::new(config, &store)?;
//!
//! let RunOutcome::Completed(report) = orchestrator.run(&manifest)? else {
//!     unreachable!("a fresh orchestrator always runs");
//! };
//! assert_eq!(report.model("Customer").unwrap().status, ModelStatus::Generated);
//! assert!(store.contents(&QualifiedName::parse("shop::dto::CustomerDto").unwrap()).is_some());
//! # Ok::<(), ScrudError>(())
//! ```

pub mod builders;
pub mod config;
pub mod descriptor;
pub mod emitter;
pub mod errors;
pub mod metadata;
pub mod names;
pub mod orchestrator;
pub mod prelude;
pub mod render;
pub mod spec;
