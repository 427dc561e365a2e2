//! Controller specs.
//!
//! Routes are relative to the controller's `BASE_PATH`. Handlers decode the
//! path identifier through the IdAdapter, call the service and map results
//! through the model's primary DTO mapper.

use heck::ToKebabCase;
use log::warn;

use crate::builders::BuildContext;
use crate::descriptor::FieldDescriptor;
use crate::names::QualifiedName;
use crate::spec::{
    ArtifactKind, ArtifactSpec, Constant, Dependency, DependencyRole, Failure, Handler,
    HandlerShape, HttpMethod, Member, Operation, OperationBody, Returns, Route, TypeRef,
};

pub struct ControllerBuilder<'a> {
    ctx: BuildContext<'a>,
}

fn handle(shape: HandlerShape, service_operation: impl Into<String>) -> OperationBody {
    OperationBody::Handle(Handler {
        shape,
        service_operation: service_operation.into(),
    })
}

fn route(method: HttpMethod, path: impl Into<String>) -> Route {
    Route {
        method,
        path: path.into(),
    }
}

impl<'a> ControllerBuilder<'a> {
    pub fn new(ctx: BuildContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn build(&self) -> Option<ArtifactSpec> {
        let descriptor = self.ctx.descriptor;
        if !descriptor.flags.controller {
            return None;
        }
        // Handlers call through the service interface.
        if !descriptor.flags.service {
            warn!(
                "{}: service generation is off, skipping the controller",
                descriptor.name
            );
            return None;
        }
        let naming = self.ctx.naming;

        let mut spec = self
            .ctx
            .spec(self.ctx.artifact_name(ArtifactKind::Controller), ArtifactKind::Controller)
            .with_doc(format!("REST endpoints for [`{}`].", descriptor.name));
        spec.push(Member::Constant(Constant {
            name: "BASE_PATH".to_string(),
            value: format!("/{}", naming.path_fragment(descriptor)),
        }));

        spec.push(Member::Dependency(Dependency {
            role: DependencyRole::Service,
            ty: TypeRef::Named(self.ctx.artifact_name(ArtifactKind::ServiceInterface)),
        }));
        let payload = match descriptor.primary_dto() {
            Some(variant) => {
                spec.push(Member::Dependency(Dependency {
                    role: DependencyRole::Mapper,
                    ty: TypeRef::Named(naming.mapper(descriptor, variant)),
                }));
                TypeRef::Named(naming.dto(descriptor, variant))
            }
            None => self.ctx.model_type(),
        };
        spec.push(Member::Dependency(Dependency {
            role: DependencyRole::IdAdapter,
            ty: TypeRef::Named(self.ctx.artifact_name(ArtifactKind::IdAdapter)),
        }));
        if let Some(base) = &descriptor.flags.superclass.controller {
            spec.push(Member::Dependency(Dependency {
                role: DependencyRole::Base,
                ty: TypeRef::Declared(base.clone()),
            }));
        }

        let mut operations = vec![
            Operation::new("get", handle(HandlerShape::GetById, "find_by_id"))
                .param_ref("id", TypeRef::Text)
                .returns(Returns::Optional(payload.clone()))
                .route(route(HttpMethod::Get, "/{id}")),
            Operation::new("list", handle(HandlerShape::List, "find_all"))
                .returns(Returns::Many(payload.clone()))
                .route(route(HttpMethod::Get, "")),
            Operation::new("count", handle(HandlerShape::Count, "count"))
                .returns(Returns::Count)
                .route(route(HttpMethod::Get, "/count")),
            Operation::new("exists", handle(HandlerShape::Exists, "exists_by_id"))
                .param_ref("id", TypeRef::Text)
                .returns(Returns::Flag)
                .route(route(HttpMethod::Get, "/{id}/exists")),
            Operation::new("create", handle(HandlerShape::Create, "save"))
                .param("body", payload.clone())
                .returns(Returns::Value(payload.clone()))
                .route(route(HttpMethod::Post, "")),
            Operation::new("patch", handle(HandlerShape::Patch, "patch"))
                .param_ref("id", TypeRef::Text)
                .param("body", payload.clone())
                .returns(Returns::Optional(payload))
                .route(route(HttpMethod::Patch, "/{id}")),
            Operation::new("delete", handle(HandlerShape::Delete, "delete_by_id"))
                .param_ref("id", TypeRef::Text)
                .route(route(HttpMethod::Delete, "/{id}")),
        ];

        for field in descriptor.to_one_relations() {
            if let Some(operation) = self.related_handler(field) {
                operations.push(operation);
            }
        }

        for mut operation in operations {
            operation.failure = Some(Failure::Runtime);
            spec.push(Member::Operation(operation));
        }
        Some(spec)
    }

    /// `GET /{id}/{relation}` for a to-one relation. Related models with a
    /// DTO are returned through its mapper.
    fn related_handler(&self, field: &FieldDescriptor) -> Option<Operation> {
        let target = field.target.as_ref()?;
        let (returns, mapper) = match self.related_dto(target) {
            Some((dto, mapper)) => (TypeRef::Named(dto), Some(mapper)),
            None => (TypeRef::Named(target.clone()), None),
        };
        Some(
            Operation::new(
                format!("get_{}", field.name),
                handle(
                    HandlerShape::Related { mapper },
                    self.ctx.naming.relation_finder(&field.name),
                ),
            )
            .param_ref("id", TypeRef::Text)
            .returns(Returns::Optional(returns))
            .route(route(
                HttpMethod::Get,
                format!("/{{id}}/{}", field.name.to_kebab_case()),
            )),
        )
    }

    fn related_dto(&self, target: &QualifiedName) -> Option<(QualifiedName, QualifiedName)> {
        let related = self.ctx.graph.get(target)?;
        if !related.traits.scrud_bean {
            return None;
        }
        let variant = related.primary_dto()?;
        Some((
            self.ctx.naming.dto(related, variant),
            self.ctx.naming.mapper(related, variant),
        ))
    }
}
