use proc_macro2::TokenStream;
use quote::quote;

use super::{Scope, lit};
use crate::errors::ScrudResult;
use crate::spec::{CodecContract, CodecOperation, OperationBody, TypeRef};

pub(super) fn render(scope: &Scope<'_>) -> ScrudResult<TokenStream> {
    let spec = scope.spec();
    let name = scope.own_ident()?;
    let doc = scope.doc();
    let codec = scope.codec();
    let contract = spec
        .identifier()
        .ok_or_else(|| scope.error("identifier adapter without identifier contract"))?;
    let alias = scope.ident(&contract.alias.name)?;

    let (alias_type, encode, decode) = match &contract.codec {
        CodecContract::Scalar { id_type } => {
            let id_type = scope.ty(&TypeRef::Declared(id_type.clone()))?;
            (
                id_type,
                quote! {
                    Some(id.to_string()).filter(|encoded| !encoded.trim().is_empty())
                },
                quote! {
                    let malformed = || #codec::MalformedIdentifier {
                        value: raw.to_string(),
                        arity: 1,
                    };
                    if raw.trim().is_empty() {
                        return Err(malformed());
                    }
                    raw.parse::<#alias>().map_err(|_| malformed())
                },
            )
        }
        CodecContract::Composite { arity, slots, .. } => {
            let composite = match arity.get() {
                2 => quote!(#codec::Pair),
                3 => quote!(#codec::Triple),
                _ => quote!(#codec::Quadruple),
            };
            let entities = slots
                .iter()
                .map(|slot| scope.named(&slot.entity))
                .collect::<ScrudResult<Vec<_>>>()?;
            (
                quote!(#composite<#(#entities),*>),
                quote!(id.encode()),
                quote! {
                    #alias::decode_with(
                        raw,
                        #(<#entities as #codec::FromIdentifier>::from_identifier),*
                    )
                },
            )
        }
    };

    let alias_doc = lit(&format!(" Identifier of [`{}`].", spec.source.name));
    let mut functions = Vec::new();
    for operation in spec.operations() {
        let signature = scope.signature(operation, None)?;
        let body = match &operation.body {
            OperationBody::Codec(CodecOperation::Encode) => &encode,
            OperationBody::Codec(CodecOperation::Decode) => &decode,
            _ => return Err(scope.error(format!("'{}' is not a codec operation", operation.name))),
        };
        functions.push(quote! {
            pub #signature {
                #body
            }
        });
    }

    Ok(quote! {
        #[doc = #alias_doc]
        pub type #alias = #alias_type;

        #doc
        #[derive(Debug, Clone, Copy, Default)]
        pub struct #name;

        impl #name {
            #(#functions)*
        }
    })
}

#[cfg(test)]
mod tests {
    use crate::builders::test_support::*;
    use crate::builders::{BuildContext, IdAdapterBuilder};
    use crate::render::tests::compact;
    use crate::render::{Renderer, RustRenderer};

    fn render(simple: &str) -> String {
        let (graph, naming) = shop();
        let descriptor = model(&graph, simple);
        let spec = IdAdapterBuilder::new(BuildContext::new(&descriptor, &graph, &naming)).build();
        compact(
            &RustRenderer::new("scrud_runtime", "scrudgen_codec")
                .unwrap()
                .render(&spec)
                .unwrap(),
        )
    }

    #[test]
    fn test_composite_adapter_source() {
        let source = render("OrderLine");
        assert!(source.contains(
            "pubtypeOrderLineId=scrudgen_codec::Pair<crate::shop::model::Order,crate::catalog::model::Product"
        ));
        assert!(source.contains("id.encode()"));
        assert!(source.contains("OrderLineId::decode_with("));
        assert!(source.contains(
            "<crate::catalog::model::Productasscrudgen_codec::FromIdentifier>::from_identifier"
        ));
    }

    #[test]
    fn test_scalar_adapter_source() {
        let source = render("Order");
        assert!(source.contains("pubtypeOrderId=u64;"));
        assert!(source.contains("raw.parse::<OrderId>()"));
        assert!(source.contains("arity:1"));
    }
}
