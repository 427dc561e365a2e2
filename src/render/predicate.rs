use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use strum::IntoEnumIterator;

use super::{Scope, lit};
use crate::errors::ScrudResult;
use crate::spec::{OperationBody, Operator};

pub(super) fn render(scope: &Scope<'_>) -> ScrudResult<TokenStream> {
    let name = scope.own_ident()?;
    let doc = scope.doc();
    let runtime = scope.runtime();
    let total = Operator::iter().count();

    let mut constructors = Vec::new();
    for operation in scope.spec().operations() {
        let OperationBody::Predicate(predicate) = &operation.body else {
            return Err(scope.error(format!("'{}' is not a predicate", operation.name)));
        };
        let signature = scope.signature(operation, None)?;
        let accepted = predicate.operand.operators();
        let fallback = (accepted.len() < total).then(|| quote!(_ => None,));
        let operators = accepted.iter().map(|op| format_ident!("{}", op.to_string()));
        let path = lit(&predicate.path);
        let operand_doc = lit(&format!(
            " Predicate on `{}` ({} operand).",
            predicate.path, predicate.operand
        ));
        constructors.push(quote! {
            #[doc = #operand_doc]
            pub #signature {
                match operator {
                    #(#runtime::predicate::Operator::#operators)|* => {
                        Some(#runtime::predicate::Predicate::new(#path, operator, values))
                    }
                    #fallback
                }
            }
        });
    }

    Ok(quote! {
        #doc
        #[derive(Debug, Clone, Copy, Default)]
        pub struct #name;

        impl #name {
            #(#constructors)*
        }
    })
}
