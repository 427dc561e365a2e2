//! Manifest type definitions
//!
//! Serde types for the TOML manifest describing the model set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumIter};

fn default_true() -> bool {
    true
}

/// Root manifest
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Manifest {
    #[serde(default)]
    pub generator: GeneratorSection,
    #[serde(default, rename = "model")]
    pub models: Vec<ModelBag>,
    #[serde(default, rename = "dto")]
    pub dtos: Vec<DtoBag>,
}

/// `[generator]` section
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GeneratorSection {
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
    #[serde(default)]
    pub known_types: Vec<String>,
    pub runtime_crate: Option<String>,
    pub codec_crate: Option<String>,
}

/// Raw per-model attributes as declared
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelBag {
    pub name: String,
    pub namespace: String,
    #[serde(default = "default_true")]
    pub entity: bool,
    #[serde(default = "default_true")]
    pub scrud_bean: bool,
    #[serde(default)]
    pub disableable: bool,
    #[serde(default)]
    pub audited: bool,
    #[serde(default)]
    pub dtos: Vec<String>,
    #[serde(default)]
    pub eager_fetch: Vec<String>,
    pub identifier: Option<IdentifierBag>,
    #[serde(default)]
    pub generate: GenerationBag,
    #[serde(default, rename = "field")]
    pub fields: Vec<FieldBag>,
}

impl ModelBag {
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.namespace, self.name)
        }
    }
}

/// Identifier declaration: either a scalar `type` or a `composite` slot list
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IdentifierBag {
    #[serde(default = "default_id_field")]
    pub field: String,
    pub r#type: Option<String>,
    pub composite: Option<Vec<CompositeSlotBag>>,
}

fn default_id_field() -> String {
    "id".to_string()
}

/// One component of a composite identifier
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompositeSlotBag {
    pub entity: String,
    #[serde(default = "default_slot_id_type")]
    pub id_type: String,
}

fn default_slot_id_type() -> String {
    "String".to_string()
}

/// `[model.generate]` flags
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationBag {
    #[serde(default = "default_true")]
    pub controller: bool,
    #[serde(default = "default_true")]
    pub service: bool,
    pub path_fragment: Option<String>,
    #[serde(default)]
    pub superclass: SuperclassBag,
}

impl Default for GenerationBag {
    fn default() -> Self {
        Self {
            controller: true,
            service: true,
            path_fragment: None,
            superclass: SuperclassBag::default(),
        }
    }
}

/// Superclass overrides per generated kind
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SuperclassBag {
    pub repository: Option<String>,
    pub service_impl: Option<String>,
    pub controller: Option<String>,
}

/// `[[model.field]]` entry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldBag {
    pub name: String,
    pub r#type: String,
    pub cardinality: Option<Cardinality>,
    /// Explicit relation target; otherwise taken from the declared type
    pub target: Option<String>,
    #[serde(default)]
    pub bidirectional: bool,
    pub reverse: Option<String>,
    #[serde(default)]
    pub optional: bool,
}

/// Relation cardinality annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Display, EnumIter)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Cardinality {
    None,
    OneToOne,
    ManyToOne,
    OneToMany,
    ManyToMany,
    Embedded,
}

/// `[[dto]]` entry declaring a DTO variant
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DtoBag {
    pub name: String,
    pub model: String,
    pub namespace: Option<String>,
    /// Subset of model fields; all fields when absent
    pub fields: Option<Vec<String>>,
}
