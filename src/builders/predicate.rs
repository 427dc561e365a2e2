//! Query predicate factories.
//!
//! Generated for every entity model, independent of the DTO pipeline. Each
//! field gets one constructor taking an operator and operand values; the
//! constructor returns `None` for operators the field's operand category does
//! not accept.

use quote::ToTokens;
use syn::{GenericArgument, PathArguments, Type};

use crate::builders::BuildContext;
use crate::descriptor::{FieldDescriptor, RelationKind};
use crate::spec::{
    ArtifactKind, ArtifactSpec, Member, OperandCategory, Operation, OperationBody,
    PredicateOperation, Returns, TypeRef,
};

pub struct PredicateFactoryBuilder<'a> {
    ctx: BuildContext<'a>,
}

impl<'a> PredicateFactoryBuilder<'a> {
    pub fn new(ctx: BuildContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn build(&self) -> ArtifactSpec {
        let descriptor = self.ctx.descriptor;
        let mut spec = self
            .ctx
            .spec(
                self.ctx.artifact_name(ArtifactKind::PredicateFactory),
                ArtifactKind::PredicateFactory,
            )
            .with_doc(format!("Filter predicates over [`{}`].", descriptor.name));

        for field in &descriptor.fields {
            let (operand, value) = self.operand(field);
            let path = match operand {
                OperandCategory::RelationId | OperandCategory::CollectionMembership => {
                    format!("{}.{}", field.name, self.related_id_field(field))
                }
                _ => field.name.clone(),
            };
            spec.push(Member::Operation(
                Operation::new(
                    field.name.clone(),
                    OperationBody::Predicate(PredicateOperation { path, operand }),
                )
                .param("operator", TypeRef::Runtime("predicate::Operator".to_string()))
                .param("values", TypeRef::list(value))
                .returns(Returns::Optional(TypeRef::Runtime(
                    "predicate::Predicate".to_string(),
                ))),
            ));
        }
        spec
    }

    /// Operand category of a field and the type of its operand values.
    pub fn operand(&self, field: &FieldDescriptor) -> (OperandCategory, TypeRef) {
        match field.relation {
            RelationKind::ToOne => (OperandCategory::RelationId, TypeRef::Text),
            RelationKind::ToMany => (OperandCategory::CollectionMembership, TypeRef::Text),
            RelationKind::Embedded => (
                OperandCategory::Embedded,
                field
                    .target
                    .clone()
                    .map(TypeRef::Named)
                    .unwrap_or_else(|| TypeRef::Declared(strip_option(&field.declared_type))),
            ),
            RelationKind::Scalar => {
                let value = strip_option(&field.declared_type);
                match last_segment(&value).as_deref() {
                    Some("String" | "str" | "char") => (OperandCategory::Text, TypeRef::Text),
                    Some("bool") => (OperandCategory::Boolean, TypeRef::Declared(value)),
                    _ => (OperandCategory::Comparable, TypeRef::Declared(value)),
                }
            }
        }
    }

    fn related_id_field(&self, field: &FieldDescriptor) -> String {
        field
            .target
            .as_ref()
            .and_then(|target| self.ctx.graph.get(target))
            .map(|related| related.identifier.field.clone())
            .unwrap_or_else(|| "id".to_string())
    }
}

/// `Option<T>` gives `T`; anything else is returned as written.
fn strip_option(declared: &str) -> String {
    let Ok(ty) = syn::parse_str::<Type>(declared) else {
        return declared.to_string();
    };
    if let Type::Path(path) = &ty
        && let Some(last) = path.path.segments.last()
        && last.ident == "Option"
        && let PathArguments::AngleBracketed(args) = &last.arguments
        && let Some(GenericArgument::Type(inner)) = args.args.first()
    {
        return inner.to_token_stream().to_string();
    }
    declared.to_string()
}

fn last_segment(declared: &str) -> Option<String> {
    match syn::parse_str::<Type>(declared).ok()? {
        Type::Path(path) => path.path.segments.last().map(|s| s.ident.to_string()),
        Type::Reference(reference) => match *reference.elem {
            Type::Path(path) => path.path.segments.last().map(|s| s.ident.to_string()),
            _ => None,
        },
        _ => None,
    }
}
