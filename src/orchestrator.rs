//! End-to-end generation runs.
//!
//! A run moves through [`RunPhase`]s in order:
//!
//! 1. `Discover`: the manifest must declare at least one model; the type
//!    index is built.
//! 2. `ResolveAll`: every model is resolved. Failures are recorded against
//!    the model and do not stop the run.
//! 3. `BuildSpecsInOrder` / `EmitAll`: predicate factories for every entity
//!    first, then per qualifying model its mappers, DTOs, identifier adapter,
//!    repository, services and controller. Each spec's name is claimed in the
//!    run's name registry before it is emitted.
//! 4. `Report`: one entry per model, one entry per artifact.
//!
//! An orchestrator is single-shot: a second `run` returns
//! [`RunOutcome::AlreadyRan`] without touching the store.

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use strum::Display;

use crate::builders::{BuildContext, Naming, PredicateFactoryBuilder, build_model_artifacts};
use crate::config::GeneratorConfig;
use crate::descriptor::{ModelDescriptor, ModelGraph, Resolver, TypeIndex};
use crate::emitter::{ArtifactStore, EmitOutcome, Emitter, OutcomeKind};
use crate::errors::{ScrudError, ScrudErrorKind, ScrudResult};
use crate::metadata::{Manifest, validate_manifest};
use crate::names::QualifiedName;
use crate::render::{Renderer, RustRenderer};
use crate::spec::{ArtifactKind, ArtifactSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RunPhase {
    Idle,
    Discover,
    ResolveAll,
    BuildSpecsInOrder,
    EmitAll,
    Report,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ModelStatus {
    /// At least one artifact written and none failed
    Generated,
    /// Every artifact already existed
    SkippedAllExisting,
    /// The model qualifies for no artifact kind
    Unqualified,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactReport {
    pub name: String,
    pub kind: ArtifactKind,
    pub outcome: OutcomeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelReport {
    pub model: String,
    pub status: ModelStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ScrudErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub artifacts: Vec<ArtifactReport>,
}

impl ModelReport {
    fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            status: ModelStatus::Unqualified,
            error_kind: None,
            reason: None,
            artifacts: Vec::new(),
        }
    }

    fn fail(&mut self, error: &ScrudError) {
        self.status = ModelStatus::Failed;
        self.error_kind = Some(error.kind());
        self.reason = Some(error.to_string());
    }

    pub fn is_failed(&self) -> bool {
        self.status == ModelStatus::Failed
    }

    pub fn artifact(&self, kind: ArtifactKind) -> Option<&ArtifactReport> {
        self.artifacts.iter().find(|artifact| artifact.kind == kind)
    }

    /// Derive the status from the artifact outcomes unless the model has
    /// already failed.
    fn settle(&mut self) {
        if self.is_failed() {
            return;
        }
        let failed = self
            .artifacts
            .iter()
            .filter(|artifact| artifact.outcome == OutcomeKind::Failed)
            .count();
        self.status = if failed > 0 {
            self.reason = Some(format!("{failed} artifact(s) failed to emit"));
            ModelStatus::Failed
        } else if self.artifacts.is_empty() {
            ModelStatus::Unqualified
        } else if self
            .artifacts
            .iter()
            .all(|artifact| artifact.outcome == OutcomeKind::SkippedExisting)
        {
            ModelStatus::SkippedAllExisting
        } else {
            ModelStatus::Generated
        };
    }
}

/// Per-model and per-artifact outcomes of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    #[serde(default)]
    pub models: Vec<ModelReport>,
}

impl RunReport {
    /// First report entry for a model, by qualified or simple name.
    pub fn model(&self, name: &str) -> Option<&ModelReport> {
        self.models.iter().find(|report| {
            report.model == name
                || QualifiedName::parse(&report.model).is_some_and(|qualified| qualified.name == name)
        })
    }

    pub fn artifacts(&self) -> impl Iterator<Item = &ArtifactReport> {
        self.models.iter().flat_map(|model| model.artifacts.iter())
    }

    pub fn count(&self, outcome: OutcomeKind) -> usize {
        self.artifacts().filter(|artifact| artifact.outcome == outcome).count()
    }

    pub fn has_failures(&self) -> bool {
        self.models.iter().any(ModelReport::is_failed)
    }

    pub fn to_toml(&self) -> ScrudResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(RunReport),
    /// The orchestrator had already run; nothing was done
    AlreadyRan,
}

/// Append-only set of artifact names claimed during a run.
#[derive(Debug, Default)]
pub struct NameRegistry {
    claimed: BTreeSet<QualifiedName>,
}

impl NameRegistry {
    /// Claim `name`; `false` when it was already claimed.
    pub fn claim(&mut self, name: &QualifiedName) -> bool {
        self.claimed.insert(name.clone())
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

struct ModelRun {
    report: ModelReport,
    descriptor: Option<Arc<ModelDescriptor>>,
}

pub struct Orchestrator<S, R = RustRenderer> {
    config: GeneratorConfig,
    naming: Naming,
    emitter: Emitter<S, R>,
    names: NameRegistry,
    phase: RunPhase,
}

impl<S: ArtifactStore> Orchestrator<S> {
    pub fn new(config: GeneratorConfig, store: S) -> ScrudResult<Self> {
        config.validate()?;
        let renderer = RustRenderer::from_config(&config)?;
        Ok(Self::with_renderer(config, store, renderer))
    }
}

impl<S: ArtifactStore, R: Renderer> Orchestrator<S, R> {
    pub fn with_renderer(config: GeneratorConfig, store: S, renderer: R) -> Self {
        Self {
            naming: Naming::from_settings(&config.settings),
            config,
            emitter: Emitter::new(store, renderer),
            names: NameRegistry::default(),
            phase: RunPhase::Idle,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn store(&self) -> &S {
        self.emitter.store()
    }

    /// Run the pipeline over `manifest`.
    ///
    /// Only run-level preconditions are returned as errors; everything that
    /// goes wrong for a single model ends up in the report.
    pub fn run(&mut self, manifest: &Manifest) -> ScrudResult<RunOutcome> {
        if self.phase != RunPhase::Idle {
            warn!("Generation already ran in phase {}, ignoring re-entry", self.phase);
            return Ok(RunOutcome::AlreadyRan);
        }

        self.enter(RunPhase::Discover);
        if manifest.models.is_empty() {
            self.phase = RunPhase::Done;
            return Err(ScrudError::NothingToGenerate(
                "the manifest declares no models".to_string(),
            ));
        }
        let validation = validate_manifest(manifest);
        for warning in &validation.warnings {
            warn!("{warning}");
        }
        let known_types: Vec<String> = self
            .config
            .known_types
            .iter()
            .chain(&manifest.generator.known_types)
            .cloned()
            .collect();
        let index = TypeIndex::build(manifest, &known_types);
        info!("Discovered {} model(s)", manifest.models.len());

        self.enter(RunPhase::ResolveAll);
        let (mut runs, graph) = self.resolve_all(manifest, &index);

        self.enter(RunPhase::BuildSpecsInOrder);
        for run in &mut runs {
            if let Some(descriptor) = run.descriptor.clone()
                && descriptor.traits.entity
            {
                let spec =
                    PredicateFactoryBuilder::new(BuildContext::new(&descriptor, &graph, &self.naming))
                        .build();
                if let Err(e) = self.claim_and_emit(&mut run.report, spec) {
                    error!("{}: {e}", run.report.model);
                    run.report.fail(&e);
                }
            }
        }

        self.enter(RunPhase::EmitAll);
        for run in &mut runs {
            let Some(descriptor) = run.descriptor.clone() else {
                continue;
            };
            if run.report.is_failed() || !descriptor.traits.scrud_bean {
                continue;
            }
            let ctx = BuildContext::new(&descriptor, &graph, &self.naming);
            let result = build_model_artifacts(ctx).and_then(|specs| {
                debug!("{}: {} artifact spec(s)", descriptor.name, specs.len());
                specs
                    .into_iter()
                    .try_for_each(|spec| self.claim_and_emit(&mut run.report, spec))
            });
            if let Err(e) = result {
                error!("{}: {e}", run.report.model);
                run.report.fail(&e);
            }
        }

        self.enter(RunPhase::Report);
        let models = runs
            .into_iter()
            .map(|mut run| {
                run.report.settle();
                run.report
            })
            .collect();
        let report = RunReport { models };
        info!(
            "Run finished: {} written, {} skipped, {} failed",
            report.count(OutcomeKind::Written),
            report.count(OutcomeKind::SkippedExisting),
            report.count(OutcomeKind::Failed)
        );

        self.phase = RunPhase::Done;
        Ok(RunOutcome::Completed(report))
    }

    fn enter(&mut self, phase: RunPhase) {
        debug!("Entering phase {phase}");
        self.phase = phase;
    }

    /// Resolve every model. Descriptors go into the graph in discovery
    /// order; a later model with an already taken name stays out of the
    /// graph but is still built, so its artifacts collide and get reported.
    fn resolve_all(&self, manifest: &Manifest, index: &TypeIndex) -> (Vec<ModelRun>, ModelGraph) {
        let resolver = Resolver::new(
            index,
            &self.naming,
            &manifest.dtos,
            &self.config.runtime_crate,
        );
        let mut graph = ModelGraph::new();
        let mut runs = Vec::with_capacity(manifest.models.len());

        for bag in &manifest.models {
            let mut report = ModelReport::new(bag.qualified_name());
            let descriptor = match resolver.resolve(bag) {
                Ok(descriptor) => {
                    let descriptor = Arc::new(descriptor);
                    if graph.get(&descriptor.name).is_none() {
                        graph.insert(Arc::clone(&descriptor));
                    }
                    Some(descriptor)
                }
                Err(e) => {
                    error!("{e}");
                    report.fail(&e);
                    None
                }
            };
            runs.push(ModelRun { report, descriptor });
        }
        info!("Resolved {} of {} model(s)", graph.len(), runs.len());
        (runs, graph)
    }

    /// Claim the spec's name and emit it. A name claimed earlier in the run
    /// fails the model.
    fn claim_and_emit(&mut self, report: &mut ModelReport, spec: ArtifactSpec) -> ScrudResult<()> {
        if !self.names.claim(&spec.name) {
            return Err(ScrudError::DuplicateArtifactName(spec.name));
        }
        let name = spec.name.to_string();
        let kind = spec.kind;
        let outcome = self.emitter.emit(spec);
        report.artifacts.push(ArtifactReport {
            name,
            kind,
            outcome: outcome.kind(),
            reason: outcome.reason().map(str::to_string),
        });
        if let EmitOutcome::Failed(reason) = &outcome {
            debug!("{}: artifact failed: {reason}", report.model);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::test_support::SHOP;
    use crate::emitter::MemoryArtifactStore;
    use crate::metadata::parse_manifest_from_str;
    use assert_matches::assert_matches;

    fn orchestrator<'a>(
        manifest: &Manifest,
        store: &'a MemoryArtifactStore,
    ) -> Orchestrator<&'a MemoryArtifactStore> {
        let config = GeneratorConfig::from_section(&manifest.generator, "generated", vec![]).unwrap();
        Orchestrator::new(config, store).unwrap()
    }

    fn completed(outcome: RunOutcome) -> RunReport {
        match outcome {
            RunOutcome::Completed(report) => report,
            RunOutcome::AlreadyRan => panic!("expected a completed run"),
        }
    }

    #[test]
    fn test_predicate_factories_come_first() {
        let manifest = parse_manifest_from_str(SHOP).unwrap();
        let store = MemoryArtifactStore::new();
        let report = completed(orchestrator(&manifest, &store).run(&manifest).unwrap());

        for model in &report.models {
            assert_eq!(model.artifacts[0].kind, ArtifactKind::PredicateFactory);
            assert_eq!(model.status, ModelStatus::Generated, "{}", model.model);
        }
        let order = report.model("Order").unwrap();
        let kinds: Vec<_> = order.artifacts.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ArtifactKind::PredicateFactory,
                ArtifactKind::Mapper,
                ArtifactKind::Dto,
                ArtifactKind::IdAdapter,
                ArtifactKind::Repository,
                ArtifactKind::ServiceInterface,
                ArtifactKind::ServiceImpl,
                ArtifactKind::Controller,
            ]
        );
        assert_eq!(store.write_count(), report.count(OutcomeKind::Written));
    }

    #[test]
    fn test_second_run_is_ignored() {
        let manifest = parse_manifest_from_str(SHOP).unwrap();
        let store = MemoryArtifactStore::new();
        let mut orchestrator = orchestrator(&manifest, &store);
        completed(orchestrator.run(&manifest).unwrap());
        let writes = store.write_count();

        assert_eq!(orchestrator.run(&manifest).unwrap(), RunOutcome::AlreadyRan);
        assert_eq!(store.write_count(), writes);
        assert_eq!(orchestrator.phase(), RunPhase::Done);
    }

    #[test]
    fn test_empty_manifest_aborts() {
        let manifest = Manifest::default();
        let store = MemoryArtifactStore::new();
        let result = orchestrator(&manifest, &store).run(&manifest);
        assert_matches!(result, Err(e) if e.aborts_run());
    }

    #[test]
    fn test_entity_only_model_gets_predicates_only() {
        let manifest = parse_manifest_from_str(
            r#"
[[model]]
name = "AuditEntry"
namespace = "ops::model"
scrud_bean = false
identifier = { type = "u64" }

[[model.field]]
name = "message"
type = "String"
"#,
        )
        .unwrap();
        let store = MemoryArtifactStore::new();
        let report = completed(orchestrator(&manifest, &store).run(&manifest).unwrap());
        let entry = report.model("AuditEntry").unwrap();
        assert_eq!(entry.artifacts.len(), 1);
        assert_eq!(entry.artifacts[0].name, "ops::model::AuditEntryPredicates");
    }

    #[test]
    fn test_report_serialises_to_toml() {
        let manifest = parse_manifest_from_str(SHOP).unwrap();
        let store = MemoryArtifactStore::new();
        let report = completed(orchestrator(&manifest, &store).run(&manifest).unwrap());
        let text = report.to_toml().unwrap();
        assert!(text.contains("status = \"generated\""));
        let parsed: RunReport = toml::from_str(&text).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_name_registry_is_append_only() {
        let mut registry = NameRegistry::default();
        let name = QualifiedName::parse("shop::dto::OrderDto").unwrap();
        assert!(registry.claim(&name));
        assert!(!registry.claim(&name));
        assert_eq!(registry.len(), 1);
    }
}
