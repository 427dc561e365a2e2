use proc_macro2::TokenStream;
use quote::quote;

use super::Scope;
use crate::errors::ScrudResult;
use crate::spec::{Conversion, MapDirection, Mapping, Operation, OperationBody};

pub(super) fn render(scope: &Scope<'_>) -> ScrudResult<TokenStream> {
    let name = scope.own_ident()?;
    let doc = scope.doc();

    let mut functions = Vec::new();
    for operation in scope.spec().operations() {
        let OperationBody::Map(mapping) = &operation.body else {
            return Err(scope.error(format!("'{}' is not a mapping", operation.name)));
        };
        functions.push(function(scope, operation, mapping)?);
    }

    Ok(quote! {
        #doc
        #[derive(Debug, Clone, Copy, Default)]
        pub struct #name;

        impl #name {
            #(#functions)*
        }
    })
}

fn function(scope: &Scope<'_>, operation: &Operation, mapping: &Mapping) -> ScrudResult<TokenStream> {
    let signature = scope.signature(operation, None)?;
    let doc = scope.operation_doc(operation);
    let model = scope.named(&mapping.model)?;
    let adapter = scope.named(&mapping.id.adapter)?;
    let id = scope.ident(&mapping.id.field)?;

    let body = match mapping.direction {
        MapDirection::ToDto => {
            let dto = scope.named(&mapping.dto)?;
            let copies = mapping
                .copies
                .iter()
                .map(|copy| {
                    let field = scope.ident(&copy.field)?;
                    let value = to_dto_value(scope, &copy.conversion, quote!(model.#field))?;
                    Ok(quote!(#field: #value))
                })
                .collect::<ScrudResult<Vec<_>>>()?;
            quote! {
                #dto {
                    #id: #adapter::encode(&model.#id),
                    #(#copies,)*
                }
            }
        }
        MapDirection::ToModel => {
            let assignments = assignments(scope, mapping, &adapter)?;
            quote! {
                let mut model = <#model as ::core::default::Default>::default();
                #assignments
                Ok(model)
            }
        }
        MapDirection::OntoModel => {
            let assignments = assignments(scope, mapping, &adapter)?;
            quote! {
                #assignments
                Ok(())
            }
        }
    };

    Ok(quote! {
        #doc
        pub #signature {
            #body
        }
    })
}

fn to_dto_value(
    scope: &Scope<'_>,
    conversion: &Conversion,
    source: TokenStream,
) -> ScrudResult<TokenStream> {
    let runtime = scope.runtime();
    Ok(match conversion {
        Conversion::Direct => quote!(#source.clone()),
        Conversion::Embed { mapper } => {
            let mapper = scope.named(mapper)?;
            quote!(#runtime::mapping::embed(&#source, #mapper::to_dto))
        }
        Conversion::EmbedList { mapper } => {
            let mapper = scope.named(mapper)?;
            quote!(#runtime::mapping::embed_all(&#source, #mapper::to_dto))
        }
        Conversion::Reference => quote!(#runtime::mapping::reference(&#source)),
        Conversion::ReferenceList => quote!(#runtime::mapping::references(&#source)),
    })
}

/// Statements copying DTO fields onto `model`. A missing DTO identifier
/// leaves the model's identifier untouched.
fn assignments(
    scope: &Scope<'_>,
    mapping: &Mapping,
    adapter: &TokenStream,
) -> ScrudResult<TokenStream> {
    let runtime = scope.runtime();
    let id = scope.ident(&mapping.id.field)?;
    let mut statements = vec![quote! {
        if let Some(raw) = dto.#id.as_deref() {
            model.#id = #adapter::decode(raw)?;
        }
    }];
    for copy in &mapping.copies {
        let field = scope.ident(&copy.field)?;
        let value = match &copy.conversion {
            Conversion::Direct => quote!(dto.#field.clone()),
            Conversion::Embed { mapper } => {
                let mapper = scope.named(mapper)?;
                quote!(#runtime::mapping::unembed(&dto.#field, #mapper::to_model)?)
            }
            Conversion::EmbedList { mapper } => {
                let mapper = scope.named(mapper)?;
                quote!(#runtime::mapping::unembed_all(&dto.#field, #mapper::to_model)?)
            }
            Conversion::Reference => quote!(#runtime::mapping::dereference(&dto.#field)?),
            Conversion::ReferenceList => {
                quote!(#runtime::mapping::dereference_all(&dto.#field)?)
            }
        };
        statements.push(quote!(model.#field = #value;));
    }
    Ok(quote!(#(#statements)*))
}
