//! Repository specs.
//!
//! Every repository carries the same baseline operations plus one lookup per
//! to-one relation. The lookup queries the related type directly when the
//! relation's reverse field is known and joins from the owning type
//! otherwise.

use log::{debug, warn};

use crate::builders::BuildContext;
use crate::descriptor::{FieldDescriptor, ModelDescriptor};
use crate::errors::{ScrudError, ScrudResult};
use crate::spec::{
    ArtifactKind, ArtifactSpec, Dependency, DependencyRole, EntityGraph, Failure, Member,
    Operation, OperationBody, Persist, Query, QueryShape, Returns, TypeRef,
};

pub struct RepositoryBuilder<'a> {
    ctx: BuildContext<'a>,
}

impl<'a> RepositoryBuilder<'a> {
    pub fn new(ctx: BuildContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn build(&self) -> ScrudResult<ArtifactSpec> {
        let descriptor = self.ctx.descriptor;
        let mut spec = self
            .ctx
            .spec(self.ctx.artifact_name(ArtifactKind::Repository), ArtifactKind::Repository)
            .with_doc(format!("Persistence operations for [`{}`].", descriptor.name));

        if let Some(base) = &descriptor.flags.superclass.repository {
            spec.push(Member::Dependency(Dependency {
                role: DependencyRole::Base,
                ty: TypeRef::Declared(base.clone()),
            }));
        }
        if let Some(graph) = self.entity_graph()? {
            spec.push(Member::EntityGraph(graph));
        }

        for operation in self.operations() {
            spec.push(Member::Operation(operation));
        }
        Ok(spec)
    }

    /// Baseline operations followed by one lookup per to-one relation.
    pub fn operations(&self) -> Vec<Operation> {
        let descriptor = self.ctx.descriptor;
        let soft = descriptor.traits.disableable;
        let model = self.ctx.model_type();
        let id = self.ctx.id_type();
        let query = |shape| OperationBody::Query(Query {
            shape,
            not_disabled: soft,
        });

        let mut operations = vec![
            Operation::new("find_by_id", query(QueryShape::ById))
                .param_ref("id", id.clone())
                .returns(Returns::Optional(model.clone())),
            Operation::new("find_all", query(QueryShape::All)).returns(Returns::Many(model.clone())),
            Operation::new("count", query(QueryShape::Count)).returns(Returns::Count),
            Operation::new("exists_by_id", query(QueryShape::ExistsById))
                .param_ref("id", id.clone())
                .returns(Returns::Flag),
            Operation::new("save", OperationBody::Persist(Persist::Save))
                .param("entity", model.clone())
                .returns(Returns::Value(model.clone())),
            Operation::new("patch", OperationBody::Persist(Persist::Patch))
                .param_ref("id", id.clone())
                .param("delta", model.clone())
                .returns(Returns::Optional(model.clone()))
                .doc("Copy the non-absent fields of `delta` onto the persisted entity."),
            Operation::new("delete_by_id", OperationBody::Persist(Persist::DeleteById { soft }))
                .param_ref("id", id.clone()),
            Operation::new("delete_all", OperationBody::Persist(Persist::DeleteAll { soft })),
        ];

        for field in descriptor.to_one_relations() {
            match self.relation_lookup(descriptor, field) {
                Some(shape) => {
                    let target = field.target.clone().map(TypeRef::Named);
                    operations.push(
                        Operation::new(self.ctx.naming.relation_finder(&field.name), query(shape))
                            .param_ref("id", id.clone())
                            .returns(Returns::Optional(
                                target.unwrap_or_else(|| TypeRef::Declared(field.declared_type.clone())),
                            ))
                            .doc(format!(
                                "Resolve the `{}` of the {} with the given id.",
                                field.name,
                                descriptor.simple_name()
                            )),
                    );
                }
                None => warn!(
                    "{}.{}: to-one relation without a target, no lookup generated",
                    descriptor.name, field.name
                ),
            }
        }

        for operation in &mut operations {
            operation.failure = Some(Failure::Runtime);
        }
        operations
    }

    /// Query shape resolving `field` for a given owner id.
    pub fn relation_lookup(
        &self,
        descriptor: &ModelDescriptor,
        field: &FieldDescriptor,
    ) -> Option<QueryShape> {
        let target = field.target.clone()?;
        let shape = match &field.reverse {
            Some(reverse) => QueryShape::DirectEquality {
                root: target,
                reverse_field: reverse.name.clone(),
                reverse_is_collection: !reverse.one_to_one,
            },
            None => QueryShape::Join {
                root: descriptor.name.clone(),
                join_field: field.name.clone(),
                target,
            },
        };
        debug!("{}.{} resolved through {:?}", descriptor.name, field.name, shape);
        Some(shape)
    }

    /// Fetch plan from the model's eager-fetch paths.
    ///
    /// The first segment of each path must be a relation of the model; deeper
    /// segments are checked while they stay inside the run's model graph.
    pub fn entity_graph(&self) -> ScrudResult<Option<EntityGraph>> {
        let descriptor = self.ctx.descriptor;
        for path in &descriptor.eager_fetch {
            self.validate_path(path)?;
        }
        let graph = EntityGraph::from_paths(&descriptor.eager_fetch);
        Ok((!graph.is_empty()).then_some(graph))
    }

    fn validate_path(&self, path: &str) -> ScrudResult<()> {
        let descriptor = self.ctx.descriptor;
        let invalid = |reason: String| ScrudError::InvalidAttributePath {
            model: descriptor.name.to_string(),
            path: path.to_string(),
            reason,
        };

        let segments: Vec<&str> = path.split('.').map(str::trim).collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(invalid("empty path segment".to_string()));
        }

        let mut current: &ModelDescriptor = descriptor;
        for (depth, segment) in segments.iter().enumerate() {
            let is_last = depth + 1 == segments.len();
            let field = current.field(segment).ok_or_else(|| {
                invalid(format!("'{}' has no field '{segment}'", current.name))
            })?;
            if (depth == 0 || !is_last) && !field.relation.is_relation() {
                return Err(invalid(format!(
                    "'{segment}' on '{}' is not a relation",
                    current.name
                )));
            }
            match field.target.as_ref().and_then(|target| self.ctx.graph.get(target)) {
                Some(next) => current = &**next,
                // Outside the graph: nothing further to check.
                None => break,
            }
        }
        Ok(())
    }
}
