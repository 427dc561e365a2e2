//! Mapper specs, one per (model, DTO variant) pair.

use crate::builders::{BuildContext, RelatedShape};
use crate::descriptor::{DtoVariant, FieldDescriptor, RelationKind};
use crate::spec::{
    ArtifactKind, ArtifactSpec, Conversion, Dependency, DependencyRole, Failure, FieldCopy,
    IdConversion, MapDirection, Mapping, Member, Operation, OperationBody, Returns, TypeRef,
};

pub struct MapperBuilder<'a> {
    ctx: BuildContext<'a>,
}

impl<'a> MapperBuilder<'a> {
    pub fn new(ctx: BuildContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn build(&self) -> Vec<ArtifactSpec> {
        self.ctx
            .descriptor
            .dto_variants
            .iter()
            .map(|variant| self.build_variant(variant))
            .collect()
    }

    fn build_variant(&self, variant: &DtoVariant) -> ArtifactSpec {
        let descriptor = self.ctx.descriptor;
        let naming = self.ctx.naming;
        let dto = naming.dto(descriptor, variant);
        let adapter = self.ctx.artifact_name(ArtifactKind::IdAdapter);

        let mut spec = self
            .ctx
            .spec(naming.mapper(descriptor, variant), ArtifactKind::Mapper)
            .with_doc(format!("Converts between [`{}`] and [`{}`].", descriptor.name, dto));
        spec.push(Member::Dependency(Dependency {
            role: DependencyRole::IdAdapter,
            ty: TypeRef::Named(adapter.clone()),
        }));

        let included: Vec<&FieldDescriptor> = descriptor
            .fields
            .iter()
            .filter(|field| variant.includes(&field.name))
            .collect();

        let mapping = |direction: MapDirection| {
            let copies = included
                .iter()
                // Audit and soft-delete columns are owned by the persistence
                // layer and never taken from a DTO.
                .filter(|field| direction == MapDirection::ToDto || !field.synthetic)
                .map(|field| FieldCopy {
                    field: field.name.clone(),
                    conversion: self.conversion(field),
                })
                .collect();
            OperationBody::Map(Mapping {
                direction,
                model: descriptor.name.clone(),
                dto: dto.clone(),
                id: IdConversion {
                    field: descriptor.identifier.field.clone(),
                    adapter: adapter.clone(),
                },
                copies,
            })
        };

        let dto_type = TypeRef::Named(dto.clone());
        let model_type = self.ctx.model_type();

        spec.push(Member::Operation(
            Operation::new("to_dto", mapping(MapDirection::ToDto))
                .param_ref("model", model_type.clone())
                .returns(Returns::Value(dto_type.clone())),
        ));
        spec.push(Member::Operation(
            Operation::new("to_model", mapping(MapDirection::ToModel))
                .param_ref("dto", dto_type.clone())
                .returns(Returns::Value(model_type.clone()))
                .fails_with(Failure::Malformed),
        ));
        spec.push(Member::Operation(
            Operation::new("apply_to", mapping(MapDirection::OntoModel))
                .param_ref("dto", dto_type)
                .param_mut("model", model_type)
                .fails_with(Failure::Malformed)
                .doc("Copy the DTO's fields onto an existing model."),
        ));
        spec
    }

    fn conversion(&self, field: &FieldDescriptor) -> Conversion {
        match (field.relation, self.ctx.related_shape(field)) {
            (RelationKind::ToOne, RelatedShape::Embedded { mapper, .. }) => Conversion::Embed { mapper },
            (RelationKind::ToOne, RelatedShape::Reference) => Conversion::Reference,
            (RelationKind::ToMany, RelatedShape::Embedded { mapper, .. }) => {
                Conversion::EmbedList { mapper }
            }
            (RelationKind::ToMany, RelatedShape::Reference) => Conversion::ReferenceList,
            _ => Conversion::Direct,
        }
    }
}
