//! Index of every type name visible to a run.

use std::collections::{BTreeMap, HashMap};
use syn::{GenericArgument, PathArguments, Type};

use crate::metadata::Manifest;
use crate::names::{Namespace, QualifiedName};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeOrigin {
    Model,
    Dto,
    Known,
}

/// Lookup table from qualified and simple names to declared types.
#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    types: BTreeMap<QualifiedName, TypeOrigin>,
    by_simple_name: HashMap<String, Vec<QualifiedName>>,
}

impl TypeIndex {
    pub fn build(manifest: &Manifest, known_types: &[String]) -> Self {
        let mut index = TypeIndex::default();
        for model in &manifest.models {
            if let Some(name) = QualifiedName::parse(&model.qualified_name()) {
                index.insert(name, TypeOrigin::Model);
            }
        }
        for dto in &manifest.dtos {
            let namespace = match &dto.namespace {
                Some(namespace) => Some(Namespace::new(namespace.as_str())),
                None => index
                    .resolve(&dto.model, &Namespace::default())
                    .map(|model| model.namespace.parent().child("dto")),
            };
            if let Some(namespace) = namespace {
                index.insert(namespace.qualify(&dto.name), TypeOrigin::Dto);
            }
        }
        for known in known_types {
            if let Some(name) = QualifiedName::parse(known) {
                index.insert(name, TypeOrigin::Known);
            }
        }
        index
    }

    pub fn insert(&mut self, name: QualifiedName, origin: TypeOrigin) {
        if self.types.insert(name.clone(), origin).is_none() {
            self.by_simple_name
                .entry(name.name.clone())
                .or_default()
                .push(name);
        }
    }

    pub fn origin(&self, name: &QualifiedName) -> Option<TypeOrigin> {
        self.types.get(name).copied()
    }

    pub fn is_model(&self, name: &QualifiedName) -> bool {
        self.origin(name) == Some(TypeOrigin::Model)
    }

    /// Resolve a type reference as seen from `from`.
    ///
    /// Qualified references must match exactly. A simple name is looked up
    /// in `from` first, then across the index; an ambiguous simple name does
    /// not resolve.
    pub fn resolve(&self, reference: &str, from: &Namespace) -> Option<QualifiedName> {
        let reference = reference.trim().trim_start_matches("crate::");
        if reference.contains("::") {
            let name = QualifiedName::parse(reference)?;
            return self.types.contains_key(&name).then_some(name);
        }

        let local = from.qualify(reference);
        if self.types.contains_key(&local) {
            return Some(local);
        }

        match self.by_simple_name.get(reference).map(Vec::as_slice) {
            Some([only]) => Some(only.clone()),
            _ => None,
        }
    }
}

/// Innermost element type of a declared type, as a path string.
///
/// `Vec<Order>` and `Option<Box<Order>>` both give `Order`; for multi
/// argument generics the last type argument wins.
pub fn element_type_name(declared: &str) -> Option<String> {
    let ty: Type = syn::parse_str(declared).ok()?;
    innermost(&ty)
}

fn innermost(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(type_path) => {
            let last = type_path.path.segments.last()?;
            if let PathArguments::AngleBracketed(args) = &last.arguments {
                let inner = args.args.iter().rev().find_map(|arg| match arg {
                    GenericArgument::Type(inner) => Some(inner),
                    _ => None,
                });
                if let Some(inner) = inner {
                    return innermost(inner);
                }
            }
            Some(
                type_path
                    .path
                    .segments
                    .iter()
                    .map(|segment| segment.ident.to_string())
                    .collect::<Vec<_>>()
                    .join("::"),
            )
        }
        Type::Reference(reference) => innermost(&reference.elem),
        Type::Paren(paren) => innermost(&paren.elem),
        Type::Group(group) => innermost(&group.elem),
        _ => None,
    }
}
