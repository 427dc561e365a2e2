//! Repository source.
//!
//! Queries are built with the runtime's `Query` builder and run against a
//! generic `Store`. Reads of the model itself attach the entity graph when
//! one is declared.

use proc_macro2::TokenStream;
use quote::quote;

use super::{Scope, lit};
use crate::errors::ScrudResult;
use crate::spec::{
    DependencyRole, EntityGraph, Operation, OperationBody, Persist, Query, QueryShape, Returns,
};

pub(super) fn render(scope: &Scope<'_>) -> ScrudResult<TokenStream> {
    let spec = scope.spec();
    let name = scope.own_ident()?;
    let doc = scope.doc();
    let runtime = scope.runtime();

    let (base_field, base_param, base_init, base_accessor) =
        match scope.dependency(DependencyRole::Base) {
            Some(base) => {
                let ty = scope.ty(&base.ty)?;
                (
                    quote!(base: #ty,),
                    quote!(, base: #ty),
                    quote!(base,),
                    quote! {
                        pub fn base(&self) -> &#ty {
                            &self.base
                        }
                    },
                )
            }
            None => Default::default(),
        };

    let graph = spec.entity_graph();
    let graph_fn = graph.map(|graph| {
        let tokens = graph_tokens(scope, graph);
        quote! {
            /// Relations fetched together with the model.
            pub fn entity_graph() -> #runtime::EntityGraph {
                #tokens
            }
        }
    });

    let mut methods = Vec::new();
    for operation in spec.operations() {
        let signature = scope.signature(operation, Some(quote!(&self)))?;
        let doc = scope.operation_doc(operation);
        let body = match &operation.body {
            OperationBody::Query(query) => query_body(scope, operation, query, graph.is_some())?,
            OperationBody::Persist(persist) => persist_body(scope, persist)?,
            _ => return Err(scope.error(format!("'{}' is not a repository operation", operation.name))),
        };
        methods.push(quote! {
            #doc
            pub #signature {
                #body
            }
        });
    }

    Ok(quote! {
        #doc
        pub struct #name<S> {
            store: S,
            #base_field
        }

        impl<S> #name<S> {
            pub fn new(store: S #base_param) -> Self {
                Self { store, #base_init }
            }

            pub fn store(&self) -> &S {
                &self.store
            }

            #base_accessor
            #graph_fn
        }

        impl<S: #runtime::Store> #name<S> {
            #(#methods)*
        }
    })
}

fn graph_tokens(scope: &Scope<'_>, graph: &EntityGraph) -> TokenStream {
    let runtime = scope.runtime();
    let attributes = graph.attributes.iter().map(|attribute| lit(attribute));
    let subgraphs = graph.subgraphs.iter().map(|(name, inner)| {
        let name = lit(name);
        let inner = graph_tokens(scope, inner);
        quote!(.subgraph(#name, #inner))
    });
    quote! {
        #runtime::EntityGraph::new()
            #(.attribute(#attributes))*
            #(#subgraphs)*
    }
}

fn query_body(
    scope: &Scope<'_>,
    operation: &Operation,
    query: &Query,
    has_graph: bool,
) -> ScrudResult<TokenStream> {
    let runtime = scope.runtime();
    let model = scope.named(&scope.spec().source.name)?;

    let (builder, on_model) = match &query.shape {
        QueryShape::ById | QueryShape::ExistsById => {
            (quote!(#runtime::Query::<#model>::by_id(id)), true)
        }
        QueryShape::All | QueryShape::Count => (quote!(#runtime::Query::<#model>::all()), true),
        QueryShape::DirectEquality {
            root,
            reverse_field,
            reverse_is_collection,
        } => {
            let root = scope.named(root)?;
            let reverse_field = lit(reverse_field);
            let filter = if *reverse_is_collection {
                quote!(where_contains)
            } else {
                quote!(where_related)
            };
            (quote!(#runtime::Query::<#root>::all().#filter(#reverse_field, id)), false)
        }
        QueryShape::Join {
            root,
            join_field,
            target,
        } => {
            let root = scope.named(root)?;
            let target = scope.named(target)?;
            let join_field = lit(join_field);
            (
                quote!(#runtime::Query::<#root>::by_id(id).join::<#target>(#join_field)),
                true,
            )
        }
    };

    let not_disabled = (query.not_disabled && on_model).then(|| quote!(.not_disabled()));
    let fetches_model = matches!(query.shape, QueryShape::ById | QueryShape::All);
    let with_graph = (has_graph && fetches_model).then(|| quote!(.with_graph(Self::entity_graph())));

    let execute = match operation.returns {
        Returns::Optional(_) => quote!(fetch_optional),
        Returns::Many(_) => quote!(fetch_all),
        Returns::Count => quote!(count),
        Returns::Flag => quote!(exists),
        _ => return Err(scope.error(format!("'{}' has no query result shape", operation.name))),
    };

    Ok(quote! {
        self.store.#execute(#builder #not_disabled #with_graph)
    })
}

fn persist_body(scope: &Scope<'_>, persist: &Persist) -> ScrudResult<TokenStream> {
    let model = scope.named(&scope.spec().source.name)?;
    Ok(match persist {
        Persist::Save => quote!(self.store.save(entity)),
        Persist::Patch => quote!(self.store.patch(id, delta)),
        Persist::DeleteById { soft: true } => quote!(self.store.disable_by_id::<#model>(id)),
        Persist::DeleteById { soft: false } => quote!(self.store.delete_by_id::<#model>(id)),
        Persist::DeleteAll { soft: true } => quote!(self.store.disable_all::<#model>()),
        Persist::DeleteAll { soft: false } => quote!(self.store.delete_all::<#model>()),
    })
}

#[cfg(test)]
mod tests {
    use crate::builders::test_support::*;
    use crate::builders::{BuildContext, RepositoryBuilder};
    use crate::render::tests::compact;
    use crate::render::{Renderer, RustRenderer};

    fn render(simple: &str) -> String {
        let (graph, naming) = shop();
        let descriptor = model(&graph, simple);
        let spec = RepositoryBuilder::new(BuildContext::new(&descriptor, &graph, &naming))
            .build()
            .unwrap();
        compact(
            &RustRenderer::new("scrud_runtime", "scrudgen_codec")
                .unwrap()
                .render(&spec)
                .unwrap(),
        )
    }

    #[test]
    fn test_soft_delete_and_graph() {
        let source = render("Order");
        assert!(source.contains("pubstructOrderRepository<S>{"));
        assert!(source.contains("impl<S:scrud_runtime::Store>OrderRepository<S>"));
        assert!(source.contains("disable_by_id::<crate::shop::model::Order>(id)"));
        assert!(source.contains(".not_disabled()"));
        assert!(source.contains(".with_graph(Self::entity_graph())"));
        assert!(source.contains(".subgraph(\"customer\","));
    }

    #[test]
    fn test_relation_lookups() {
        let customer = render("Customer");
        assert!(customer.contains(
            "scrud_runtime::Query::<crate::shop::model::Profile>::all().where_related(\"customer\",id)"
        ));

        let line = render("OrderLine");
        assert!(line.contains(".join::<crate::catalog::model::Product>(\"product\")"));
        assert!(line.contains("delete_by_id::<crate::shop::model::OrderLine>(id)"));
    }
}
