//! Model descriptors: the normalized, validated view of one model.
//!
//! Descriptors are produced by the [`Resolver`] from raw manifest entries,
//! are immutable once built and are shared read-only (behind `Arc`) by every
//! artifact specification derived from them.

pub mod graph;
pub mod resolver;
pub mod type_index;

pub use graph::ModelGraph;
pub use resolver::Resolver;
pub use type_index::{TypeIndex, TypeOrigin, element_type_name};

use scrudgen_codec::Arity;
use strum::Display;

use crate::metadata::Cardinality;
use crate::names::{Namespace, QualifiedName};

/// Resolved model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescriptor {
    pub name: QualifiedName,
    /// Namespace receiving generated siblings (`dto`, `repository`, ...)
    pub parent_namespace: Namespace,
    pub identifier: IdentifierShape,
    pub fields: Vec<FieldDescriptor>,
    pub dto_variants: Vec<DtoVariant>,
    pub flags: GenerationFlags,
    pub traits: ModelTraits,
    pub eager_fetch: Vec<String>,
}

impl ModelDescriptor {
    pub fn simple_name(&self) -> &str {
        &self.name.name
    }

    pub fn namespace(&self) -> &Namespace {
        &self.name.namespace
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn relations(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|field| field.relation.is_relation())
    }

    pub fn to_one_relations(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .iter()
            .filter(|field| field.relation == RelationKind::ToOne)
    }

    /// Related model types reachable through one relation field.
    pub fn related_types(&self) -> impl Iterator<Item = &QualifiedName> {
        self.relations().filter_map(|field| field.target.as_ref())
    }

    /// The first declared variant is the one embedded by other models' DTOs.
    pub fn primary_dto(&self) -> Option<&DtoVariant> {
        self.dto_variants.first()
    }
}

/// Identifier field plus its shape.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierShape {
    pub field: String,
    pub kind: IdentifierKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IdentifierKind {
    Scalar { id_type: String },
    Composite { arity: Arity, slots: Vec<CompositeSlot> },
}

impl IdentifierShape {
    pub fn is_composite(&self) -> bool {
        matches!(self.kind, IdentifierKind::Composite { .. })
    }

    pub fn arity(&self) -> Option<Arity> {
        match &self.kind {
            IdentifierKind::Scalar { .. } => None,
            IdentifierKind::Composite { arity, .. } => Some(*arity),
        }
    }
}

/// One component of a composite identifier: the related entity and the
/// type of that entity's own identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeSlot {
    pub entity: QualifiedName,
    pub id_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum RelationKind {
    Scalar,
    ToOne,
    ToMany,
    Embedded,
}

impl RelationKind {
    /// Classification looks only at the cardinality annotation, never at the
    /// container type.
    pub fn from_cardinality(cardinality: Option<Cardinality>) -> Self {
        match cardinality {
            None | Some(Cardinality::None) => RelationKind::Scalar,
            Some(Cardinality::OneToOne | Cardinality::ManyToOne) => RelationKind::ToOne,
            Some(Cardinality::OneToMany | Cardinality::ManyToMany) => RelationKind::ToMany,
            Some(Cardinality::Embedded) => RelationKind::Embedded,
        }
    }

    pub fn is_relation(self) -> bool {
        matches!(self, RelationKind::ToOne | RelationKind::ToMany)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub declared_type: String,
    pub relation: RelationKind,
    /// Resolved related type for relations and embedded values
    pub target: Option<QualifiedName>,
    /// Only set for bidirectional to-one relations
    pub reverse: Option<ReverseField>,
    pub optional: bool,
    /// Added by the resolver (audit and soft-delete columns)
    pub synthetic: bool,
}

impl FieldDescriptor {
    pub fn scalar(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            relation: RelationKind::Scalar,
            target: None,
            reverse: None,
            optional: false,
            synthetic: false,
        }
    }
}

/// Name of the field on the related side pointing back to the owner.
#[derive(Debug, Clone, PartialEq)]
pub struct ReverseField {
    pub name: String,
    pub one_to_one: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DtoVariant {
    pub name: String,
    pub namespace: Option<Namespace>,
    /// Field subset; `None` covers every field
    pub fields: Option<Vec<String>>,
}

impl DtoVariant {
    pub fn covering_all(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            fields: None,
        }
    }

    pub fn includes(&self, field: &str) -> bool {
        self.fields
            .as_ref()
            .is_none_or(|fields| fields.iter().any(|name| name == field))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationFlags {
    pub controller: bool,
    pub service: bool,
    pub path_fragment: Option<String>,
    pub superclass: Superclasses,
}

impl Default for GenerationFlags {
    fn default() -> Self {
        Self {
            controller: true,
            service: true,
            path_fragment: None,
            superclass: Superclasses::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Superclasses {
    pub repository: Option<String>,
    pub service_impl: Option<String>,
    pub controller: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModelTraits {
    pub entity: bool,
    pub scrud_bean: bool,
    pub disableable: bool,
    pub audited: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_kind_ignores_container() {
        assert_eq!(RelationKind::from_cardinality(None), RelationKind::Scalar);
        assert_eq!(
            RelationKind::from_cardinality(Some(Cardinality::ManyToOne)),
            RelationKind::ToOne
        );
        assert_eq!(
            RelationKind::from_cardinality(Some(Cardinality::ManyToMany)),
            RelationKind::ToMany
        );
        assert_eq!(RelationKind::ToMany.to_string(), "to-many");
        assert!(!RelationKind::Embedded.is_relation());
    }

    #[test]
    fn test_dto_variant_subset() {
        let all = DtoVariant::covering_all("OrderDto");
        assert!(all.includes("anything"));

        let subset = DtoVariant {
            name: "OrderSummary".to_string(),
            namespace: None,
            fields: Some(vec!["total".to_string()]),
        };
        assert!(subset.includes("total"));
        assert!(!subset.includes("customer"));
    }
}
