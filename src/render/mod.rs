//! Rendering of artifact specifications to Rust source.
//!
//! Tokens are produced with `quote`, checked by parsing them back into a
//! `syn::File` and pretty-printed with `prettyplease`. Every rendered file
//! starts with [`HEADER`].
//!
//! Named types render as `crate::<path>`, except those listed as known types,
//! which render exactly as written. Generated files are meant to be mounted as
//! modules and glob re-exported by the namespace that owns them, so a
//! qualified name like `shop::dto::OrderDto` resolves to
//! `crate::shop::dto::OrderDto`.

mod controller;
mod dto;
mod id_adapter;
mod mapper;
mod predicate;
mod repository;
mod service;

use log::debug;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use std::collections::BTreeSet;
use syn::{Ident, Path, Type};

use crate::config::GeneratorConfig;
use crate::errors::{ScrudError, ScrudResult};
use crate::names::QualifiedName;
use crate::spec::{
    ArtifactKind, ArtifactSpec, Dependency, DependencyRole, Failure, Operation, Param, ParamMode,
    Returns, TypeRef,
};

/// Fixed comment block opening every generated file.
pub const HEADER: &str = "\
// @generated by scrudgen. Do not edit this file.
//
// It is overwritten only while it stays in the output directory. To customise
// it, move it into a hand-written source root under the same module path; a
// relocated copy is never regenerated.

";

/// Turns a specification into source text.
pub trait Renderer {
    fn render(&self, spec: &ArtifactSpec) -> ScrudResult<String>;
}

#[derive(Debug, Clone)]
pub struct RustRenderer {
    runtime: Path,
    codec: Path,
    known_types: BTreeSet<String>,
}

impl RustRenderer {
    pub fn new(runtime_crate: &str, codec_crate: &str) -> ScrudResult<Self> {
        let parse = |label: &str, path: &str| {
            syn::parse_str::<Path>(path).map_err(|e| {
                ScrudError::Configuration(format!("{label} '{path}' is not a valid path: {e}"))
            })
        };
        Ok(Self {
            runtime: parse("runtime crate", runtime_crate)?,
            codec: parse("codec crate", codec_crate)?,
            known_types: BTreeSet::new(),
        })
    }

    pub fn from_config(config: &GeneratorConfig) -> ScrudResult<Self> {
        Ok(Self::new(&config.runtime_crate, &config.codec_crate)?
            .with_known_types(config.known_types.iter().cloned()))
    }

    pub fn with_known_types(mut self, known: impl IntoIterator<Item = String>) -> Self {
        self.known_types.extend(
            known
                .into_iter()
                .filter_map(|path| QualifiedName::parse(&path))
                .map(|name| name.to_string()),
        );
        self
    }

    /// Unformatted tokens of one artifact.
    pub fn tokens(&self, spec: &ArtifactSpec) -> ScrudResult<TokenStream> {
        let scope = Scope {
            renderer: self,
            spec,
        };
        match spec.kind {
            ArtifactKind::Dto => dto::render(&scope),
            ArtifactKind::Mapper => mapper::render(&scope),
            ArtifactKind::IdAdapter => id_adapter::render(&scope),
            ArtifactKind::Repository => repository::render(&scope),
            ArtifactKind::ServiceInterface => service::render_interface(&scope),
            ArtifactKind::ServiceImpl => service::render_impl(&scope),
            ArtifactKind::Controller => controller::render(&scope),
            ArtifactKind::PredicateFactory => predicate::render(&scope),
        }
    }
}

impl Renderer for RustRenderer {
    fn render(&self, spec: &ArtifactSpec) -> ScrudResult<String> {
        let tokens = self.tokens(spec)?;
        let file: syn::File = syn::parse2(tokens).map_err(|e| ScrudError::Render {
            name: spec.name.clone(),
            reason: format!("generated tokens do not parse: {e}"),
        })?;
        let source = prettyplease::unparse(&file);
        debug!("Rendered {} ({} bytes)", spec.name, source.len());
        Ok(format!("{HEADER}{source}"))
    }
}

/// Rendering state for one spec.
pub(crate) struct Scope<'a> {
    renderer: &'a RustRenderer,
    spec: &'a ArtifactSpec,
}

impl<'a> Scope<'a> {
    pub fn spec(&self) -> &'a ArtifactSpec {
        self.spec
    }

    pub fn runtime(&self) -> &Path {
        &self.renderer.runtime
    }

    pub fn codec(&self) -> &Path {
        &self.renderer.codec
    }

    pub fn error(&self, reason: impl Into<String>) -> ScrudError {
        ScrudError::Render {
            name: self.spec.name.clone(),
            reason: reason.into(),
        }
    }

    /// Identifier for a generated item, falling back to a raw identifier for
    /// keywords.
    pub fn ident(&self, name: &str) -> ScrudResult<Ident> {
        syn::parse_str::<Ident>(name)
            .or_else(|_| syn::parse_str::<Ident>(&format!("r#{name}")))
            .map_err(|_| self.error(format!("'{name}' is not a valid identifier")))
    }

    /// Identifier of the artifact itself.
    pub fn own_ident(&self) -> ScrudResult<Ident> {
        self.ident(&self.spec.name.name)
    }

    pub fn doc(&self) -> TokenStream {
        doc_attr(&self.spec.doc)
    }

    pub fn named(&self, name: &QualifiedName) -> ScrudResult<TokenStream> {
        let written = name.to_string();
        let path = if self.renderer.known_types.contains(&written) {
            written
        } else {
            format!("crate::{written}")
        };
        let path: Path = syn::parse_str(&path)
            .map_err(|e| self.error(format!("'{name}' is not a valid path: {e}")))?;
        Ok(quote!(#path))
    }

    pub fn ty(&self, ty: &TypeRef) -> ScrudResult<TokenStream> {
        Ok(match ty {
            TypeRef::Declared(declared) => {
                let parsed: Type = syn::parse_str(declared).map_err(|e| {
                    self.error(format!("declared type '{declared}' does not parse: {e}"))
                })?;
                quote!(#parsed)
            }
            TypeRef::Named(name) => self.named(name)?,
            TypeRef::Text => quote!(String),
            TypeRef::Runtime(item) => {
                let item: Path = syn::parse_str(item)
                    .map_err(|e| self.error(format!("runtime item '{item}': {e}")))?;
                let runtime = self.runtime();
                quote!(#runtime::#item)
            }
            TypeRef::List(inner) => {
                let inner = self.ty(inner)?;
                quote!(Vec<#inner>)
            }
            TypeRef::Optional(inner) => {
                let inner = self.ty(inner)?;
                quote!(Option<#inner>)
            }
        })
    }

    pub fn param(&self, param: &Param) -> ScrudResult<TokenStream> {
        let name = self.ident(&param.name)?;
        let ty = match (param.mode, &param.ty) {
            (ParamMode::Ref, TypeRef::Text) => quote!(&str),
            (ParamMode::Ref, ty) => {
                let ty = self.ty(ty)?;
                quote!(&#ty)
            }
            (ParamMode::RefMut, ty) => {
                let ty = self.ty(ty)?;
                quote!(&mut #ty)
            }
            (ParamMode::Owned, ty) => self.ty(ty)?,
        };
        Ok(quote!(#name: #ty))
    }

    /// Return type, wrapped in `Result` when the operation can fail.
    pub fn return_type(&self, operation: &Operation) -> ScrudResult<TokenStream> {
        let value = match &operation.returns {
            Returns::Unit => quote!(()),
            Returns::Value(ty) => self.ty(ty)?,
            Returns::Optional(ty) => {
                let ty = self.ty(ty)?;
                quote!(Option<#ty>)
            }
            Returns::Many(ty) => {
                let ty = self.ty(ty)?;
                quote!(Vec<#ty>)
            }
            Returns::Count => quote!(u64),
            Returns::Flag => quote!(bool),
        };
        Ok(match operation.failure {
            Some(Failure::Runtime) => {
                let runtime = self.runtime();
                quote!(Result<#value, #runtime::Error>)
            }
            Some(Failure::Malformed) => {
                let codec = self.codec();
                quote!(Result<#value, #codec::MalformedIdentifier>)
            }
            None => value,
        })
    }

    /// `fn name(<receiver>, params) -> ret`, without body or visibility.
    pub fn signature(
        &self,
        operation: &Operation,
        receiver: Option<TokenStream>,
    ) -> ScrudResult<TokenStream> {
        let name = self.ident(&operation.name)?;
        let params = operation
            .params
            .iter()
            .map(|param| self.param(param))
            .collect::<ScrudResult<Vec<_>>>()?;
        let receiver = receiver.map(|receiver| quote!(#receiver,));
        let ret = self.return_type(operation)?;
        Ok(quote!(fn #name(#receiver #(#params),*) -> #ret))
    }

    /// Argument list forwarding an operation's parameters unchanged.
    pub fn forward_args(&self, operation: &Operation) -> ScrudResult<Vec<Ident>> {
        operation
            .params
            .iter()
            .map(|param| self.ident(&param.name))
            .collect()
    }

    pub fn operation_doc(&self, operation: &Operation) -> TokenStream {
        operation.doc.as_deref().map(doc_attr).unwrap_or_default()
    }

    pub fn dependency(&self, role: DependencyRole) -> Option<&'a Dependency> {
        self.spec.dependency(role)
    }

    /// Type of a dependency that must be present.
    pub fn required(&self, role: DependencyRole) -> ScrudResult<TokenStream> {
        let dependency = self
            .dependency(role)
            .ok_or_else(|| self.error(format!("missing {role} dependency")))?;
        self.ty(&dependency.ty)
    }
}

fn doc_attr(text: &str) -> TokenStream {
    if text.is_empty() {
        return TokenStream::new();
    }
    let lines = text.lines().map(|line| format!(" {line}"));
    quote!(#(#[doc = #lines])*)
}

/// `str` literal as tokens.
fn lit(value: &str) -> syn::LitStr {
    syn::LitStr::new(value, Span::call_site())
}
