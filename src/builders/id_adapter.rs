//! Identifier adapter specs.
//!
//! Composite identifiers defer to the codec; scalar identifiers pass through
//! their string form.

use scrudgen_codec::SEPARATOR;

use crate::builders::BuildContext;
use crate::descriptor::IdentifierKind;
use crate::spec::{
    ArtifactKind, ArtifactSpec, CodecContract, CodecOperation, CodecSlot, Failure,
    IdentifierContract, Member, Operation, OperationBody, Returns, TypeRef, slot_names,
};

pub struct IdAdapterBuilder<'a> {
    ctx: BuildContext<'a>,
}

impl<'a> IdAdapterBuilder<'a> {
    pub fn new(ctx: BuildContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn build(&self) -> ArtifactSpec {
        let descriptor = self.ctx.descriptor;
        let alias = self.ctx.naming.id_alias(descriptor);

        let codec = match &descriptor.identifier.kind {
            IdentifierKind::Scalar { id_type } => CodecContract::Scalar {
                id_type: id_type.clone(),
            },
            IdentifierKind::Composite { arity, slots } => CodecContract::Composite {
                separator: SEPARATOR,
                arity: *arity,
                slots: slot_names(*arity)
                    .iter()
                    .zip(slots)
                    .map(|(slot, component)| CodecSlot {
                        slot: slot.to_string(),
                        entity: component.entity.clone(),
                        id_type: component.id_type.clone(),
                    })
                    .collect(),
            },
        };

        let mut spec = self
            .ctx
            .spec(self.ctx.artifact_name(ArtifactKind::IdAdapter), ArtifactKind::IdAdapter)
            .with_doc(format!(
                "Converts [`{}`] identifiers to and from their canonical string form.",
                descriptor.name
            ));
        spec.push(Member::Identifier(IdentifierContract {
            alias,
            model_field: descriptor.identifier.field.clone(),
            codec,
        }));

        let id_type = self.ctx.id_type();
        spec.push(Member::Operation(
            Operation::new("encode", OperationBody::Codec(CodecOperation::Encode))
                .param_ref("id", id_type.clone())
                .returns(Returns::Optional(TypeRef::Text)),
        ));
        spec.push(Member::Operation(
            Operation::new("decode", OperationBody::Codec(CodecOperation::Decode))
                .param_ref("raw", TypeRef::Text)
                .returns(Returns::Value(id_type))
                .fails_with(Failure::Malformed),
        ));
        spec
    }
}
