// Shared fixtures for the integration tests
#![allow(dead_code)]

use scrudgen::prelude::*;

pub const SHOP: &str = include_str!("../fixtures/shop.toml");

pub fn shop() -> Manifest {
    parse_manifest_from_str(SHOP).unwrap()
}

pub fn qualified(path: &str) -> QualifiedName {
    QualifiedName::parse(path).unwrap()
}

/// Remove all whitespace so assertions survive formatting changes.
pub fn compact(source: &str) -> String {
    source.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Run a fresh orchestrator over `manifest` against `store`.
pub fn generate<S: ArtifactStore>(manifest: &Manifest, store: S) -> RunReport {
    let config = GeneratorConfig::from_section(&manifest.generator, "generated", vec![]).unwrap();
    let mut orchestrator = Orchestrator::new(config, store).unwrap();
    match orchestrator.run(manifest).unwrap() {
        RunOutcome::Completed(report) => report,
        RunOutcome::AlreadyRan => panic!("fresh orchestrator reported a previous run"),
    }
}
