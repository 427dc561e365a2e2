//! Eager-fetch plan attached to repository specs.

use serde::{Deserialize, Serialize};

/// Attribute nodes plus named subgraphs, mirroring a fetch-graph hint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityGraph {
    pub attributes: Vec<String>,
    pub subgraphs: Vec<(String, EntityGraph)>,
}

impl EntityGraph {
    /// Build a graph from dotted attribute paths.
    ///
    /// Paths are processed deepest-first (sorted, then reversed) so that
    /// intermediate subgraphs exist before their shallower siblings are
    /// added as plain attributes.
    pub fn from_paths<S: AsRef<str>>(paths: &[S]) -> Self {
        let mut paths: Vec<&str> = paths
            .iter()
            .map(|path| path.as_ref().trim())
            .filter(|path| !path.is_empty())
            .collect();
        paths.sort_unstable();
        paths.reverse();

        let mut graph = EntityGraph::default();
        for path in paths {
            let components: Vec<&str> = path.split('.').collect();
            let (last, parents) = match components.split_last() {
                Some(split) => split,
                None => continue,
            };
            let mut node = &mut graph;
            for parent in parents {
                node = node.subgraph_mut(parent);
            }
            node.add_attribute(last);
        }
        graph
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.subgraphs.is_empty()
    }

    pub fn add_attribute(&mut self, name: &str) {
        if !self.attributes.iter().any(|existing| existing == name) {
            self.attributes.push(name.to_string());
        }
    }

    pub fn subgraph(&self, name: &str) -> Option<&EntityGraph> {
        self.subgraphs
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, graph)| graph)
    }

    fn subgraph_mut(&mut self, name: &str) -> &mut EntityGraph {
        let position = match self.subgraphs.iter().position(|(existing, _)| existing == name) {
            Some(position) => position,
            None => {
                self.subgraphs.push((name.to_string(), EntityGraph::default()));
                self.subgraphs.len() - 1
            }
        };
        &mut self.subgraphs[position].1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_segments_are_attributes() {
        let graph = EntityGraph::from_paths(&["customer", "lines"]);
        assert_eq!(graph.attributes, vec!["lines", "customer"]);
        assert!(graph.subgraphs.is_empty());
    }

    #[test]
    fn test_dotted_paths_build_nested_subgraphs() {
        let graph = EntityGraph::from_paths(&[
            "customer",
            "customer.address",
            "customer.address.country",
        ]);

        assert_eq!(graph.attributes, vec!["customer"]);
        let customer = graph.subgraph("customer").unwrap();
        assert_eq!(customer.attributes, vec!["address"]);
        let address = customer.subgraph("address").unwrap();
        assert_eq!(address.attributes, vec!["country"]);
    }

    #[test]
    fn test_blank_paths_are_ignored() {
        let graph = EntityGraph::from_paths(&["", "  "]);
        assert!(graph.is_empty());
    }
}
