//! Namespace and qualified-name value types.
//!
//! Namespaces are `::`-separated module paths (`shop::model`). A qualified
//! name is a namespace plus a simple name and is the identity of every
//! generated artifact.

use derive_more::{Display, From, Into};
use heck::ToSnakeCase;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const PATH_SEPARATOR: &str = "::";

/// A `::`-separated module path.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Into, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(path: impl Into<String>) -> Self {
        let path: String = path.into();
        Self(path.trim_matches(':').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(PATH_SEPARATOR).filter(|segment| !segment.is_empty())
    }

    /// Namespace one level up; the root is its own parent.
    pub fn parent(&self) -> Namespace {
        match self.0.rsplit_once(PATH_SEPARATOR) {
            Some((parent, _)) => Namespace(parent.to_string()),
            None => Namespace::default(),
        }
    }

    pub fn child(&self, segment: &str) -> Namespace {
        if self.is_root() {
            Namespace(segment.to_string())
        } else {
            Namespace(format!("{}{PATH_SEPARATOR}{segment}", self.0))
        }
    }

    pub fn qualify(&self, name: impl Into<String>) -> QualifiedName {
        QualifiedName {
            namespace: self.clone(),
            name: name.into(),
        }
    }
}

/// Namespace plus simple name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct QualifiedName {
    pub namespace: Namespace,
    pub name: String,
}

impl QualifiedName {
    /// Parse `a::b::Name`; a bare `Name` lives in the root namespace.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim();
        if path.ends_with(PATH_SEPARATOR) {
            return None;
        }
        let path = path.trim_start_matches(':');
        let (namespace, name) = match path.rsplit_once(PATH_SEPARATOR) {
            Some((namespace, name)) => (Namespace::new(namespace), name),
            None => (Namespace::default(), path),
        };
        if name.is_empty() {
            return None;
        }
        Some(namespace.qualify(name))
    }

    pub fn path(&self) -> String {
        self.to_string()
    }

    /// Relative source file location: one directory per namespace segment,
    /// snake-cased simple name.
    pub fn relative_file(&self, extension: &str) -> PathBuf {
        let mut path: PathBuf = self.namespace.segments().collect();
        path.push(format!("{}.{extension}", self.name.to_snake_case()));
        path
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.namespace.is_root() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}{PATH_SEPARATOR}{}", self.namespace, self.name)
        }
    }
}

impl From<QualifiedName> for String {
    fn from(name: QualifiedName) -> Self {
        name.to_string()
    }
}

impl TryFrom<String> for QualifiedName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        QualifiedName::parse(&value).ok_or_else(|| format!("'{value}' is not a qualified name"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_parent_and_child() {
        let ns = Namespace::new("shop::model");
        assert_eq!(ns.parent(), Namespace::new("shop"));
        assert_eq!(ns.parent().child("dto"), Namespace::new("shop::dto"));
        assert_eq!(Namespace::new("shop").parent(), Namespace::default());
        assert_eq!(Namespace::default().child("dto").as_str(), "dto");
    }

    #[test]
    fn test_qualified_name_parse_and_display() {
        let name = QualifiedName::parse("shop::model::Order").unwrap();
        assert_eq!(name.namespace.as_str(), "shop::model");
        assert_eq!(name.name, "Order");
        assert_eq!(name.to_string(), "shop::model::Order");

        let bare = QualifiedName::parse("Order").unwrap();
        assert!(bare.namespace.is_root());
        assert_eq!(bare.to_string(), "Order");

        assert!(QualifiedName::parse("shop::").is_none());
        assert!(QualifiedName::parse("shop::model::").is_none());
        assert_eq!(QualifiedName::parse("::shop::Order").unwrap().to_string(), "shop::Order");
    }

    #[test]
    fn test_relative_file() {
        let name = QualifiedName::parse("shop::dto::OrderSummaryDto").unwrap();
        assert_eq!(
            name.relative_file("rs"),
            PathBuf::from("shop/dto/order_summary_dto.rs")
        );
    }
}
