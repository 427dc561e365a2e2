use proc_macro2::TokenStream;
use quote::quote;

use super::Scope;
use crate::errors::ScrudResult;
use crate::spec::TypeRef;

pub(super) fn render(scope: &Scope<'_>) -> ScrudResult<TokenStream> {
    let name = scope.own_ident()?;
    let doc = scope.doc();

    let mut fields = Vec::new();
    for field in scope.spec().fields() {
        let ident = scope.ident(&field.name)?;
        let ty = scope.ty(&field.ty)?;
        let attr = match field.ty {
            TypeRef::Optional(_) => {
                quote!(#[serde(default, skip_serializing_if = "Option::is_none")])
            }
            TypeRef::List(_) => quote!(#[serde(default)]),
            _ => TokenStream::new(),
        };
        fields.push(quote! {
            #attr
            pub #ident: #ty
        });
    }

    Ok(quote! {
        #doc
        #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
        pub struct #name {
            #(#fields,)*
        }
    })
}
