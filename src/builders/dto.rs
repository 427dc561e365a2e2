//! DTO specs, one per declared variant.

use log::debug;

use crate::builders::{BuildContext, RelatedShape};
use crate::descriptor::{DtoVariant, FieldDescriptor, RelationKind};
use crate::spec::{ArtifactKind, ArtifactSpec, FieldMember, Member, TypeRef};

pub struct DtoBuilder<'a> {
    ctx: BuildContext<'a>,
}

impl<'a> DtoBuilder<'a> {
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
        let name = self.ctx.naming.dto(descriptor, variant);
        let mut spec = self
            .ctx
            .spec(name, ArtifactKind::Dto)
            .with_doc(format!("Data transfer object for [`{}`].", descriptor.name));

        spec.push(Member::Field(FieldMember {
            name: descriptor.identifier.field.clone(),
            ty: TypeRef::optional(TypeRef::Text),
            source_field: Some(descriptor.identifier.field.clone()),
        }));

        for field in descriptor.fields.iter().filter(|f| variant.includes(&f.name)) {
            spec.push(Member::Field(FieldMember {
                name: field.name.clone(),
                ty: self.member_type(field),
                source_field: Some(field.name.clone()),
            }));
        }

        debug!("Built DTO spec {} ({} members)", spec.name, spec.members.len());
        spec
    }

    /// Relations never expose the raw related model: they either embed the
    /// related DTO or collapse to encoded identifiers.
    fn member_type(&self, field: &FieldDescriptor) -> TypeRef {
        match field.relation {
            RelationKind::Scalar | RelationKind::Embedded => {
                let declared = match (&field.relation, &field.target) {
                    (RelationKind::Embedded, Some(target)) => TypeRef::Named(target.clone()),
                    _ => TypeRef::Declared(field.declared_type.clone()),
                };
                if field.optional {
                    TypeRef::optional(declared)
                } else {
                    declared
                }
            }
            RelationKind::ToOne => match self.ctx.related_shape(field) {
                RelatedShape::Embedded { dto, .. } => TypeRef::optional(TypeRef::Named(dto)),
                RelatedShape::Reference => TypeRef::optional(TypeRef::Text),
            },
            RelationKind::ToMany => match self.ctx.related_shape(field) {
                RelatedShape::Embedded { dto, .. } => TypeRef::list(TypeRef::Named(dto)),
                RelatedShape::Reference => TypeRef::list(TypeRef::Text),
            },
        }
    }
}
