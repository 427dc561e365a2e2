//! Controller source.
//!
//! Handlers take the raw path identifier, decode it through the model's
//! IdAdapter and convert service results with the DTO mapper. The route
//! table is exposed as `ROUTES` for whichever HTTP layer mounts the
//! controller; the runtime error type is expected to absorb
//! `MalformedIdentifier` through `From`.

use proc_macro2::TokenStream;
use quote::quote;

use super::{Scope, lit};
use crate::errors::ScrudResult;
use crate::spec::{DependencyRole, Handler, HandlerShape, Member, OperationBody};

pub(super) fn render(scope: &Scope<'_>) -> ScrudResult<TokenStream> {
    let spec = scope.spec();
    let name = scope.own_ident()?;
    let doc = scope.doc();
    let interface = scope.required(DependencyRole::Service)?;
    let adapter = scope.required(DependencyRole::IdAdapter)?;
    let mapper = scope
        .dependency(DependencyRole::Mapper)
        .map(|mapper| scope.ty(&mapper.ty))
        .transpose()?;

    let base_path = spec
        .members
        .iter()
        .find_map(|member| match member {
            Member::Constant(constant) if constant.name == "BASE_PATH" => Some(constant.value.clone()),
            _ => None,
        })
        .unwrap_or_default();

    let constants = spec
        .members
        .iter()
        .filter_map(|member| match member {
            Member::Constant(constant) => Some(constant),
            _ => None,
        })
        .map(|constant| {
            let ident = scope.ident(&constant.name)?;
            let value = lit(&constant.value);
            Ok(quote!(pub const #ident: &'static str = #value;))
        })
        .collect::<ScrudResult<Vec<_>>>()?;

    let (base_field, base_param, base_init) = match scope.dependency(DependencyRole::Base) {
        Some(base) => {
            let ty = scope.ty(&base.ty)?;
            (quote!(pub base: #ty,), quote!(, base: #ty), quote!(base,))
        }
        None => Default::default(),
    };

    let mut routes = Vec::new();
    let mut handlers = Vec::new();
    for operation in spec.operations() {
        let OperationBody::Handle(handler) = &operation.body else {
            return Err(scope.error(format!("'{}' is not a handler", operation.name)));
        };
        let route = operation
            .route
            .as_ref()
            .ok_or_else(|| scope.error(format!("handler '{}' has no route", operation.name)))?;
        let method = lit(&route.method.to_string());
        let path = lit(&format!("{base_path}{}", route.path));
        let handler_name = lit(&operation.name);
        routes.push(quote!((#method, #path, #handler_name)));

        let route_doc = lit(&format!(" `{} {base_path}{}`", route.method, route.path));
        let signature = scope.signature(operation, Some(quote!(&self)))?;
        let body = handler_body(scope, handler, &adapter, mapper.as_ref())?;
        handlers.push(quote! {
            #[doc = #route_doc]
            pub #signature {
                #body
            }
        });
    }

    Ok(quote! {
        #doc
        pub struct #name<Svc> {
            service: Svc,
            #base_field
        }

        impl<Svc> #name<Svc> {
            #(#constants)*

            /// `(method, path, handler)` for every endpoint.
            pub const ROUTES: &'static [(&'static str, &'static str, &'static str)] = &[
                #(#routes),*
            ];

            pub fn new(service: Svc #base_param) -> Self {
                Self { service, #base_init }
            }
        }

        impl<Svc: #interface> #name<Svc> {
            #(#handlers)*
        }
    })
}

fn handler_body(
    scope: &Scope<'_>,
    handler: &Handler,
    adapter: &TokenStream,
    mapper: Option<&TokenStream>,
) -> ScrudResult<TokenStream> {
    let service = scope.ident(&handler.service_operation)?;
    let decode = quote!(let id = #adapter::decode(id)?;);
    let to_dto = |value: TokenStream| match mapper {
        Some(mapper) => quote!(#mapper::to_dto(&#value)),
        None => value,
    };
    let from_body = match mapper {
        Some(mapper) => quote!(#mapper::to_model(&body)?),
        None => quote!(body),
    };

    Ok(match &handler.shape {
        HandlerShape::GetById => {
            let convert = to_dto(quote!(found));
            quote! {
                #decode
                Ok(self.service.#service(&id)?.map(|found| #convert))
            }
        }
        HandlerShape::List => {
            let convert = to_dto(quote!(found));
            quote! {
                Ok(self.service.#service()?.into_iter().map(|found| #convert).collect())
            }
        }
        HandlerShape::Count => quote!(self.service.#service()),
        HandlerShape::Exists | HandlerShape::Delete => quote! {
            #decode
            self.service.#service(&id)
        },
        HandlerShape::Create => {
            let convert = to_dto(quote!(saved));
            quote! {
                let entity = #from_body;
                let saved = self.service.#service(entity)?;
                Ok(#convert)
            }
        }
        HandlerShape::Patch => {
            let convert = to_dto(quote!(patched));
            quote! {
                #decode
                let delta = #from_body;
                Ok(self.service.#service(&id, delta)?.map(|patched| #convert))
            }
        }
        HandlerShape::Related { mapper } => {
            let convert = match mapper {
                Some(mapper) => {
                    let mapper = scope.named(mapper)?;
                    quote!(#mapper::to_dto(&related))
                }
                None => quote!(related),
            };
            quote! {
                #decode
                Ok(self.service.#service(&id)?.map(|related| #convert))
            }
        }
    })
}
