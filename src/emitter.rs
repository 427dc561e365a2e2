//! Artifact emission.
//!
//! The [`Emitter`] renders a spec and writes it through an [`ArtifactStore`]
//! unless an artifact with the same qualified name already exists. Existing
//! artifacts, whether left by an earlier run or relocated into a hand-written
//! source root, are never overwritten.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::Display;

use crate::errors::ScrudError;
use crate::names::QualifiedName;
use crate::render::{Renderer, RustRenderer};
use crate::spec::ArtifactSpec;

const SOURCE_EXTENSION: &str = "rs";

/// Existence checks and writes keyed by qualified name.
pub trait ArtifactStore {
    fn exists(&self, name: &QualifiedName) -> bool;

    /// Persist `contents` under `name`. Must not replace an existing artifact;
    /// a concurrent creation surfaces as [`io::ErrorKind::AlreadyExists`].
    fn write(&self, name: &QualifiedName, contents: &str) -> io::Result<()>;
}

/// Artifacts as files under an output root, one directory per namespace
/// segment.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    output_root: PathBuf,
    source_roots: Vec<PathBuf>,
}

impl FsArtifactStore {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            source_roots: Vec::new(),
        }
    }

    /// Also treat artifacts found under `roots` as existing.
    pub fn with_source_roots(mut self, roots: impl IntoIterator<Item = PathBuf>) -> Self {
        self.source_roots.extend(roots);
        self
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn path_of(&self, name: &QualifiedName) -> PathBuf {
        self.output_root.join(name.relative_file(SOURCE_EXTENSION))
    }
}

impl ArtifactStore for FsArtifactStore {
    fn exists(&self, name: &QualifiedName) -> bool {
        let relative = name.relative_file(SOURCE_EXTENSION);
        std::iter::once(&self.output_root)
            .chain(&self.source_roots)
            .any(|root| root.join(&relative).is_file())
    }

    fn write(&self, name: &QualifiedName, contents: &str) -> io::Result<()> {
        let path = self.path_of(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        file.write_all(contents.as_bytes())?;
        file.flush()
    }
}

/// In-memory store, mostly for tests.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    artifacts: RwLock<BTreeMap<QualifiedName, String>>,
    writes: AtomicUsize,
    failing: bool,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with_existing(self, names: impl IntoIterator<Item = QualifiedName>) -> Self {
        if let Ok(mut artifacts) = self.artifacts.write() {
            for name in names {
                artifacts.entry(name).or_default();
            }
        }
        self
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn contents(&self, name: &QualifiedName) -> Option<String> {
        self.artifacts.read().ok()?.get(name).cloned()
    }

    pub fn names(&self) -> Vec<QualifiedName> {
        self.artifacts
            .read()
            .map(|artifacts| artifacts.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn exists(&self, name: &QualifiedName) -> bool {
        self.artifacts
            .read()
            .map(|artifacts| artifacts.contains_key(name))
            .unwrap_or(false)
    }

    fn write(&self, name: &QualifiedName, contents: &str) -> io::Result<()> {
        if self.failing {
            return Err(io::Error::other("write target unavailable"));
        }
        let mut artifacts = self
            .artifacts
            .write()
            .map_err(|_| io::Error::other("artifact store lock poisoned"))?;
        if artifacts.contains_key(name) {
            return Err(io::Error::new(io::ErrorKind::AlreadyExists, name.to_string()));
        }
        artifacts.insert(name.clone(), contents.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl<S: ArtifactStore + ?Sized> ArtifactStore for &S {
    fn exists(&self, name: &QualifiedName) -> bool {
        (**self).exists(name)
    }

    fn write(&self, name: &QualifiedName, contents: &str) -> io::Result<()> {
        (**self).write(name, contents)
    }
}

/// Result of emitting one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitOutcome {
    Written,
    SkippedExisting,
    Failed(String),
}

/// Outcome without the failure reason, as stored in run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OutcomeKind {
    Written,
    SkippedExisting,
    Failed,
}

impl EmitOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            EmitOutcome::Written => OutcomeKind::Written,
            EmitOutcome::SkippedExisting => OutcomeKind::SkippedExisting,
            EmitOutcome::Failed(_) => OutcomeKind::Failed,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            EmitOutcome::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Renders and persists specs with skip-if-exists semantics.
pub struct Emitter<S, R = RustRenderer> {
    store: S,
    renderer: R,
}

impl<S: ArtifactStore, R: Renderer> Emitter<S, R> {
    pub fn new(store: S, renderer: R) -> Self {
        Self { store, renderer }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Emit one spec. The spec is consumed; nothing is written when an
    /// artifact with the same name already exists.
    pub fn emit(&self, spec: ArtifactSpec) -> EmitOutcome {
        if self.store.exists(&spec.name) {
            debug!("Skipping existing artifact {}", spec.name);
            return EmitOutcome::SkippedExisting;
        }

        let source = match self.renderer.render(&spec) {
            Ok(source) => source,
            Err(e) => {
                warn!("{e}");
                return EmitOutcome::Failed(e.to_string());
            }
        };

        match self.store.write(&spec.name, &source) {
            Ok(()) => {
                info!("Wrote {} ({})", spec.name, spec.kind);
                EmitOutcome::Written
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!("{} appeared while emitting, leaving it untouched", spec.name);
                EmitOutcome::SkippedExisting
            }
            Err(source) => {
                let e = ScrudError::EmissionIo {
                    name: spec.name.clone(),
                    source,
                };
                warn!("{e}");
                EmitOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::test_support::*;
    use crate::builders::{BuildContext, DtoBuilder};
    use crate::render::HEADER;
    use tempfile::TempDir;

    fn order_summary() -> ArtifactSpec {
        let (graph, naming) = shop();
        let order = model(&graph, "Order");
        DtoBuilder::new(BuildContext::new(&order, &graph, &naming))
            .build()
            .remove(0)
    }

    fn renderer() -> RustRenderer {
        RustRenderer::new("scrud_runtime", "scrudgen_codec").unwrap()
    }

    #[test]
    fn test_existing_artifact_is_skipped() {
        let spec = order_summary();
        let store = MemoryArtifactStore::new().with_existing([spec.name.clone()]);
        let emitter = Emitter::new(&store, renderer());
        assert_eq!(emitter.emit(spec), EmitOutcome::SkippedExisting);
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_written_artifact_carries_header() {
        let spec = order_summary();
        let name = spec.name.clone();
        let store = MemoryArtifactStore::new();
        let emitter = Emitter::new(&store, renderer());
        assert_eq!(emitter.emit(spec), EmitOutcome::Written);
        assert!(store.contents(&name).unwrap().starts_with(HEADER));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_io_failure_is_reported() {
        let store = MemoryArtifactStore::failing();
        let emitter = Emitter::new(&store, renderer());
        let outcome = emitter.emit(order_summary());
        assert_eq!(outcome.kind(), OutcomeKind::Failed);
        assert!(outcome.reason().unwrap().contains("write target unavailable"));
    }

    #[test]
    fn test_fs_store_layout_and_relocation() {
        let output = TempDir::new().unwrap();
        let sources = TempDir::new().unwrap();
        let store = FsArtifactStore::new(output.path())
            .with_source_roots([sources.path().to_path_buf()]);
        let spec = order_summary();
        let name = spec.name.clone();

        let emitter = Emitter::new(&store, renderer());
        assert_eq!(emitter.emit(spec.clone()), EmitOutcome::Written);
        let path = output.path().join("shop/dto/order_summary.rs");
        assert_eq!(store.path_of(&name), path);
        assert!(fs::read_to_string(&path).unwrap().starts_with(HEADER));

        // A direct write never replaces the file.
        let err = store.write(&name, "replacement").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);

        // Relocating the file into a source root still suppresses regeneration.
        let relocated = sources.path().join("shop/dto/order_summary.rs");
        fs::create_dir_all(relocated.parent().unwrap()).unwrap();
        fs::rename(&path, &relocated).unwrap();
        assert!(store.exists(&name));
        assert_eq!(emitter.emit(spec), EmitOutcome::SkippedExisting);
        assert!(!path.exists());
    }
}
