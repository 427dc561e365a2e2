//! Service interface and implementation specs.

use crate::builders::{BuildContext, RepositoryBuilder};
use crate::spec::{
    ArtifactKind, ArtifactSpec, Delegate, Dependency, DependencyRole, Member, OperationBody,
    TypeRef,
};

pub struct ServiceBuilder<'a> {
    ctx: BuildContext<'a>,
}

impl<'a> ServiceBuilder<'a> {
    pub fn new(ctx: BuildContext<'a>) -> Self {
        Self { ctx }
    }

    /// Interface and implementation, or nothing when services are suppressed.
    pub fn build(&self) -> Vec<ArtifactSpec> {
        let descriptor = self.ctx.descriptor;
        if !descriptor.flags.service {
            return Vec::new();
        }

        let interface_name = self.ctx.artifact_name(ArtifactKind::ServiceInterface);
        let operations = RepositoryBuilder::new(self.ctx).operations();

        let mut interface = self
            .ctx
            .spec(interface_name.clone(), ArtifactKind::ServiceInterface)
            .with_doc(format!("Service operations for [`{}`].", descriptor.name));
        for operation in &operations {
            let mut operation = operation.clone();
            operation.body = OperationBody::Abstract;
            interface.push(Member::Operation(operation));
        }

        let mut implementation = self
            .ctx
            .spec(
                self.ctx.artifact_name(ArtifactKind::ServiceImpl),
                ArtifactKind::ServiceImpl,
            )
            .with_doc(format!(
                "Default [`{}`] implementation backed by the repository.",
                interface_name
            ));
        implementation.push(Member::Dependency(Dependency {
            role: DependencyRole::Service,
            ty: TypeRef::Named(interface_name),
        }));
        implementation.push(Member::Dependency(Dependency {
            role: DependencyRole::Repository,
            ty: TypeRef::Named(self.ctx.artifact_name(ArtifactKind::Repository)),
        }));
        if let Some(base) = &descriptor.flags.superclass.service_impl {
            implementation.push(Member::Dependency(Dependency {
                role: DependencyRole::Base,
                ty: TypeRef::Declared(base.clone()),
            }));
        }
        for mut operation in operations {
            operation.body = OperationBody::Delegate(Delegate {
                role: DependencyRole::Repository,
                operation: operation.name.clone(),
            });
            implementation.push(Member::Operation(operation));
        }

        vec![interface, implementation]
    }
}
