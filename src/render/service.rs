use proc_macro2::TokenStream;
use quote::quote;

use super::Scope;
use crate::errors::ScrudResult;
use crate::spec::{DependencyRole, OperationBody};

pub(super) fn render_interface(scope: &Scope<'_>) -> ScrudResult<TokenStream> {
    let name = scope.own_ident()?;
    let doc = scope.doc();

    let mut methods = Vec::new();
    for operation in scope.spec().operations() {
        let signature = scope.signature(operation, Some(quote!(&self)))?;
        let doc = scope.operation_doc(operation);
        methods.push(quote! {
            #doc
            #signature;
        });
    }

    Ok(quote! {
        #doc
        pub trait #name {
            #(#methods)*
        }
    })
}

pub(super) fn render_impl(scope: &Scope<'_>) -> ScrudResult<TokenStream> {
    let name = scope.own_ident()?;
    let doc = scope.doc();
    let runtime = scope.runtime();
    let interface = scope.required(DependencyRole::Service)?;
    let repository = scope.required(DependencyRole::Repository)?;

    let (base_field, base_param, base_init) = match scope.dependency(DependencyRole::Base) {
        Some(base) => {
            let ty = scope.ty(&base.ty)?;
            (quote!(pub base: #ty,), quote!(, base: #ty), quote!(base,))
        }
        None => Default::default(),
    };

    let mut methods = Vec::new();
    for operation in scope.spec().operations() {
        let OperationBody::Delegate(delegate) = &operation.body else {
            return Err(scope.error(format!("'{}' does not delegate", operation.name)));
        };
        if delegate.role != DependencyRole::Repository {
            return Err(scope.error(format!(
                "'{}' delegates to the {} instead of the repository",
                operation.name, delegate.role
            )));
        }
        let signature = scope.signature(operation, Some(quote!(&self)))?;
        let target = scope.ident(&delegate.operation)?;
        let args = scope.forward_args(operation)?;
        methods.push(quote! {
            #signature {
                self.repository.#target(#(#args),*)
            }
        });
    }

    Ok(quote! {
        #doc
        pub struct #name<S> {
            repository: #repository<S>,
            #base_field
        }

        impl<S> #name<S> {
            pub fn new(repository: #repository<S> #base_param) -> Self {
                Self { repository, #base_init }
            }

            pub fn repository(&self) -> &#repository<S> {
                &self.repository
            }
        }

        impl<S: #runtime::Store> #interface for #name<S> {
            #(#methods)*
        }
    })
}

#[cfg(test)]
mod tests {
    use crate::builders::test_support::*;
    use crate::builders::{BuildContext, ServiceBuilder};
    use crate::render::tests::compact;
    use crate::render::{Renderer, RustRenderer};

    #[test]
    fn test_interface_and_delegating_impl() {
        let (graph, naming) = shop();
        let order = model(&graph, "Order");
        let specs = ServiceBuilder::new(BuildContext::new(&order, &graph, &naming)).build();
        let renderer = RustRenderer::new("scrud_runtime", "scrudgen_codec").unwrap();

        let interface = compact(&renderer.render(&specs[0]).unwrap());
        assert!(interface.contains("pubtraitOrderService{"));
        assert!(interface.contains("fnfind_customer(&self,id:&crate::shop::model::OrderId"));

        let implementation = compact(&renderer.render(&specs[1]).unwrap());
        assert!(implementation.contains(
            "impl<S:scrud_runtime::Store>crate::shop::service::OrderServiceforOrderServiceImpl<S>"
        ));
        assert!(implementation.contains("self.repository.patch(id,delta)"));
        assert!(implementation.contains("repository:crate::shop::repository::OrderRepository<S>,"));
    }
}
