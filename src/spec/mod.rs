//! Artifact specifications.
//!
//! An [`ArtifactSpec`] is the renderer-independent description of one
//! generated unit. Specs keep a shared, read-only reference to the model
//! descriptor that produced them.

pub mod entity_graph;
pub mod member;

pub use entity_graph::EntityGraph;
pub use member::*;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{Display, EnumIter};

use crate::descriptor::ModelDescriptor;
use crate::names::QualifiedName;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, Serialize, Deserialize,
)]
pub enum ArtifactKind {
    Dto,
    Mapper,
    IdAdapter,
    Repository,
    ServiceInterface,
    ServiceImpl,
    Controller,
    PredicateFactory,
}

impl ArtifactKind {
    /// Sub-namespace under the model's parent namespace; `None` places the
    /// artifact next to the model itself.
    pub fn sub_namespace(self) -> Option<&'static str> {
        match self {
            ArtifactKind::Dto => Some("dto"),
            ArtifactKind::Mapper => Some("mapper"),
            ArtifactKind::Repository => Some("repository"),
            ArtifactKind::ServiceInterface | ArtifactKind::ServiceImpl => Some("service"),
            ArtifactKind::Controller => Some("controller"),
            ArtifactKind::IdAdapter | ArtifactKind::PredicateFactory => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactSpec {
    pub name: QualifiedName,
    pub kind: ArtifactKind,
    pub members: Vec<Member>,
    pub doc: String,
    pub source: Arc<ModelDescriptor>,
}

impl ArtifactSpec {
    pub fn new(name: QualifiedName, kind: ArtifactKind, source: &Arc<ModelDescriptor>) -> Self {
        Self {
            name,
            kind,
            members: Vec::new(),
            doc: String::new(),
            source: Arc::clone(source),
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn push(&mut self, member: Member) {
        self.members.push(member);
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldMember> {
        self.members.iter().filter_map(|member| match member {
            Member::Field(field) => Some(field),
            _ => None,
        })
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.members.iter().filter_map(|member| match member {
            Member::Operation(operation) => Some(operation),
            _ => None,
        })
    }

    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations().find(|operation| operation.name == name)
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.members.iter().filter_map(|member| match member {
            Member::Dependency(dependency) => Some(dependency),
            _ => None,
        })
    }

    pub fn dependency(&self, role: DependencyRole) -> Option<&Dependency> {
        self.dependencies().find(|dependency| dependency.role == role)
    }

    pub fn identifier(&self) -> Option<&IdentifierContract> {
        self.members.iter().find_map(|member| match member {
            Member::Identifier(contract) => Some(contract),
            _ => None,
        })
    }

    pub fn entity_graph(&self) -> Option<&EntityGraph> {
        self.members.iter().find_map(|member| match member {
            Member::EntityGraph(graph) => Some(graph),
            _ => None,
        })
    }
}
