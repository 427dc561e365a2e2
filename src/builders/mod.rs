//! Artifact specification builders.
//!
//! Each builder turns one model descriptor (plus the run's model graph) into
//! zero or more [`ArtifactSpec`]s. Builders never look at emission state, so
//! the specs of a model are the same on every run.

pub mod controller;
pub mod dto;
pub mod id_adapter;
pub mod mapper;
pub mod naming;
pub mod predicate;
pub mod repository;
pub mod service;

pub use controller::ControllerBuilder;
pub use dto::DtoBuilder;
pub use id_adapter::IdAdapterBuilder;
pub use mapper::MapperBuilder;
pub use naming::Naming;
pub use predicate::PredicateFactoryBuilder;
pub use repository::RepositoryBuilder;
pub use service::ServiceBuilder;

use std::sync::Arc;

use crate::descriptor::{FieldDescriptor, ModelDescriptor, ModelGraph};
use crate::errors::ScrudResult;
use crate::names::QualifiedName;
use crate::spec::{ArtifactKind, ArtifactSpec, TypeRef};

/// Inputs shared by every builder for one model.
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    pub descriptor: &'a Arc<ModelDescriptor>,
    pub graph: &'a ModelGraph,
    pub naming: &'a Naming,
}

/// How a relation appears in a DTO.
#[derive(Debug, Clone, PartialEq)]
pub enum RelatedShape {
    /// Embed the related model's primary DTO
    Embedded {
        dto: QualifiedName,
        mapper: QualifiedName,
    },
    /// Collapse to the related model's encoded identifier
    Reference,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        descriptor: &'a Arc<ModelDescriptor>,
        graph: &'a ModelGraph,
        naming: &'a Naming,
    ) -> Self {
        Self {
            descriptor,
            graph,
            naming,
        }
    }

    pub fn artifact_name(&self, kind: ArtifactKind) -> QualifiedName {
        self.naming.model_artifact(self.descriptor, kind)
    }

    pub fn spec(&self, name: QualifiedName, kind: ArtifactKind) -> ArtifactSpec {
        ArtifactSpec::new(name, kind, self.descriptor)
    }

    pub fn model_type(&self) -> TypeRef {
        TypeRef::Named(self.descriptor.name.clone())
    }

    pub fn id_type(&self) -> TypeRef {
        TypeRef::Named(self.naming.id_alias(self.descriptor))
    }

    /// Embedding is only allowed when the related model has a generated DTO
    /// and cannot reach back to this model; otherwise the relation collapses
    /// to an identifier reference and DTO types stay acyclic.
    pub fn related_shape(&self, field: &FieldDescriptor) -> RelatedShape {
        let Some(target) = &field.target else {
            return RelatedShape::Reference;
        };
        let Some(related) = self.graph.get(target) else {
            return RelatedShape::Reference;
        };
        if !related.traits.scrud_bean || self.graph.reaches(target, &self.descriptor.name) {
            return RelatedShape::Reference;
        }
        match related.primary_dto() {
            Some(variant) => RelatedShape::Embedded {
                dto: self.naming.dto(related, variant),
                mapper: self.naming.mapper(related, variant),
            },
            None => RelatedShape::Reference,
        }
    }
}

/// Build the full DTO-to-controller pipeline of one model, in emission
/// order: mappers, DTOs, identifier adapter, repository, services,
/// controller.
pub fn build_model_artifacts(ctx: BuildContext<'_>) -> ScrudResult<Vec<ArtifactSpec>> {
    let mut specs = MapperBuilder::new(ctx).build();
    specs.extend(DtoBuilder::new(ctx).build());
    specs.push(IdAdapterBuilder::new(ctx).build());
    specs.push(RepositoryBuilder::new(ctx).build()?);
    specs.extend(ServiceBuilder::new(ctx).build());
    specs.extend(ControllerBuilder::new(ctx).build());
    Ok(specs)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::descriptor::{Resolver, TypeIndex};
    use crate::metadata::parse_manifest_from_str;

    pub const SHOP: &str = r#"
[generator]
known_types = ["shop::model::Address"]

[[model]]
name = "Customer"
namespace = "shop::model"
identifier = { type = "u64" }

[[model.field]]
name = "name"
type = "String"

[[model.field]]
name = "profile"
type = "Profile"
cardinality = "one-to-one"
bidirectional = true
reverse = "customer"

[[model.field]]
name = "orders"
type = "Vec<Order>"
cardinality = "one-to-many"

[[model]]
name = "Profile"
namespace = "shop::model"
identifier = { type = "u64" }

[[model.field]]
name = "bio"
type = "String"

[[model]]
name = "Order"
namespace = "shop::model"
disableable = true
audited = true
eager_fetch = ["customer", "customer.profile"]
identifier = { type = "u64" }

[[model.field]]
name = "customer"
type = "Customer"
cardinality = "many-to-one"
bidirectional = true
reverse = "orders"

[[model.field]]
name = "lines"
type = "Vec<OrderLine>"
cardinality = "one-to-many"

[[model.field]]
name = "shipping"
type = "Address"
cardinality = "embedded"

[[model.field]]
name = "total"
type = "u64"

[[model.field]]
name = "note"
type = "String"
optional = true

[[model.field]]
name = "paid"
type = "bool"

[[model]]
name = "OrderLine"
namespace = "shop::model"

[[model.identifier.composite]]
entity = "Order"
id_type = "u64"

[[model.identifier.composite]]
entity = "Product"

[[model.field]]
name = "product"
type = "Product"
cardinality = "many-to-one"

[[model.field]]
name = "quantity"
type = "u32"

[[model]]
name = "Product"
namespace = "catalog::model"
identifier = { type = "String" }

[model.generate]
controller = false

[[model.field]]
name = "title"
type = "String"

[[dto]]
name = "OrderSummary"
model = "Order"
fields = ["customer", "total"]
"#;

    pub fn resolve_all(manifest: &str) -> (ModelGraph, Naming) {
        let manifest = parse_manifest_from_str(manifest).unwrap();
        let index = TypeIndex::build(&manifest, &manifest.generator.known_types);
        let naming = Naming::default();
        let resolver = Resolver::new(&index, &naming, &manifest.dtos, "scrud_runtime");
        let mut graph = ModelGraph::new();
        for bag in &manifest.models {
            graph.insert(Arc::new(resolver.resolve(bag).unwrap()));
        }
        (graph, naming)
    }

    pub fn shop() -> (ModelGraph, Naming) {
        resolve_all(SHOP)
    }

    pub fn model(graph: &ModelGraph, simple: &str) -> Arc<ModelDescriptor> {
        graph
            .iter()
            .find(|descriptor| descriptor.simple_name() == simple)
            .cloned()
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_related_shape_collapses_cycles() {
        let (graph, naming) = shop();
        let order = model(&graph, "Order");
        let ctx = BuildContext::new(&order, &graph, &naming);

        // Customer has orders, so Order -> Customer is a cycle.
        let customer = order.field("customer").unwrap();
        assert_eq!(ctx.related_shape(customer), RelatedShape::Reference);

        let customer = model(&graph, "Customer");
        let ctx = BuildContext::new(&customer, &graph, &naming);
        assert_eq!(
            ctx.related_shape(customer.field("profile").unwrap()),
            RelatedShape::Embedded {
                dto: QualifiedName::parse("shop::dto::ProfileDto").unwrap(),
                mapper: QualifiedName::parse("shop::mapper::ProfileDtoMapper").unwrap(),
            }
        );
    }

    #[test]
    fn test_pipeline_order() {
        let (graph, naming) = shop();
        let order = model(&graph, "Order");
        let specs = build_model_artifacts(BuildContext::new(&order, &graph, &naming)).unwrap();
        let kinds: Vec<_> = specs.iter().map(|spec| spec.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ArtifactKind::Mapper,
                ArtifactKind::Dto,
                ArtifactKind::IdAdapter,
                ArtifactKind::Repository,
                ArtifactKind::ServiceInterface,
                ArtifactKind::ServiceImpl,
                ArtifactKind::Controller,
            ]
        );
        assert!(specs.iter().all(|spec| Arc::ptr_eq(&spec.source, &order)));
    }
}
