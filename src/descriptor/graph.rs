//! The set of resolved models of one run.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::descriptor::{IdentifierKind, ModelDescriptor};
use crate::names::QualifiedName;

/// Resolved descriptors in discovery order, indexed by qualified name.
#[derive(Debug, Clone, Default)]
pub struct ModelGraph {
    models: BTreeMap<QualifiedName, Arc<ModelDescriptor>>,
    order: Vec<QualifiedName>,
}

impl ModelGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, descriptor: Arc<ModelDescriptor>) {
        let name = descriptor.name.clone();
        if self.models.insert(name.clone(), descriptor).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &QualifiedName) -> Option<&Arc<ModelDescriptor>> {
        self.models.get(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ModelDescriptor>> {
        self.order.iter().filter_map(|name| self.models.get(name))
    }

    /// Whether `to` is reachable from `from` through relation fields.
    ///
    /// A model always reaches itself.
    pub fn reaches(&self, from: &QualifiedName, to: &QualifiedName) -> bool {
        let mut seen = HashSet::new();
        let mut pending = vec![from];
        while let Some(current) = pending.pop() {
            if current == to {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(descriptor) = self.models.get(current) {
                pending.extend(descriptor.related_types());
            }
        }
        false
    }

    /// Scalar identifier type of a model, `None` for composites and models
    /// outside the graph.
    pub fn scalar_id_type(&self, name: &QualifiedName) -> Option<&str> {
        match &self.models.get(name)?.identifier.kind {
            IdentifierKind::Scalar { id_type } => Some(id_type),
            IdentifierKind::Composite { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::naming::Naming;
    use crate::descriptor::{Resolver, TypeIndex};
    use crate::metadata::parse_manifest_from_str;

    fn graph() -> ModelGraph {
        let manifest = parse_manifest_from_str(
            r#"
[[model]]
name = "Author"
namespace = "lib::model"
identifier = { type = "u64" }
[[model.field]]
name = "books"
type = "Vec<Book>"
cardinality = "one-to-many"

[[model]]
name = "Book"
namespace = "lib::model"
identifier = { type = "u64" }
[[model.field]]
name = "author"
type = "Author"
cardinality = "many-to-one"
[[model.field]]
name = "publisher"
type = "Publisher"
cardinality = "many-to-one"

[[model]]
name = "Publisher"
namespace = "lib::model"
identifier = { type = "String" }
"#,
        )
        .unwrap();
        let index = TypeIndex::build(&manifest, &[]);
        let naming = Naming::default();
        let resolver = Resolver::new(&index, &naming, &manifest.dtos, "scrud_runtime");
        let mut graph = ModelGraph::new();
        for bag in &manifest.models {
            graph.insert(Arc::new(resolver.resolve(bag).unwrap()));
        }
        graph
    }

    fn name(simple: &str) -> QualifiedName {
        QualifiedName::parse(&format!("lib::model::{simple}")).unwrap()
    }

    #[test]
    fn test_reachability() {
        let graph = graph();
        assert!(graph.reaches(&name("Book"), &name("Author")));
        assert!(graph.reaches(&name("Author"), &name("Book")));
        assert!(graph.reaches(&name("Author"), &name("Publisher")));
        assert!(!graph.reaches(&name("Publisher"), &name("Book")));
        assert!(graph.reaches(&name("Publisher"), &name("Publisher")));
    }

    #[test]
    fn test_discovery_order_and_lookup() {
        let graph = graph();
        let names: Vec<_> = graph.iter().map(|d| d.simple_name().to_string()).collect();
        assert_eq!(names, vec!["Author", "Book", "Publisher"]);
        assert_eq!(graph.scalar_id_type(&name("Publisher")), Some("String"));
        assert_eq!(graph.len(), 3);
    }
}
