//! Namespace tree derivation.

use indexmap::IndexMap;

use super::ids::{ElementId, stable_id};
use super::Model;

/// One node of the namespace/package hierarchy.
#[derive(Clone, Debug)]
pub struct NamespaceNode {
    /// Segment name; empty for the root.
    pub name: String,
    /// Full `::`-joined path; empty for the root.
    pub path: String,
    /// Package id, derived from the full path so repeated builds
    /// reproduce identical ids.
    pub id: ElementId,
    pub children: IndexMap<String, NamespaceNode>,
    /// Ids of elements attached directly at this level.
    pub element_ids: Vec<ElementId>,
}

impl NamespaceNode {
    fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            id: stable_id(&["package", path]),
            children: IndexMap::new(),
            element_ids: Vec::new(),
        }
    }

    /// Insert an element id under the given namespace path, creating
    /// intermediate nodes as needed. An empty path attaches at `self`.
    pub fn insert(&mut self, namespace: &str, id: ElementId) {
        if namespace.is_empty() {
            self.element_ids.push(id);
            return;
        }
        let (head, rest) = match namespace.split_once("::") {
            Some((h, r)) => (h, r),
            None => (namespace, ""),
        };
        let child_path = if self.path.is_empty() {
            head.to_string()
        } else {
            format!("{}::{}", self.path, head)
        };
        let child = self
            .children
            .entry(head.to_string())
            .or_insert_with(|| NamespaceNode::new(head, &child_path));
        child.insert(rest, id);
    }

    /// Total number of namespace nodes below (and including) this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.values().map(NamespaceNode::node_count).sum::<usize>()
    }
}

/// Builds the package hierarchy from the model's qualified names.
pub struct NamespaceTree;

impl NamespaceTree {
    /// Split every element's namespace on `::` and grow the tree.
    /// Unqualified elements attach at the root. Also records each
    /// package id on the model for later lookups.
    pub fn build(model: &mut Model) -> NamespaceNode {
        let mut root = NamespaceNode::new("", "");
        for element in model.elements.values() {
            root.insert(&element.namespace, element.id.clone());
        }
        model.namespace_packages.clear();
        record_packages(&root, &mut model.namespace_packages);
        root
    }
}

fn record_packages(node: &NamespaceNode, map: &mut IndexMap<String, ElementId>) {
    for child in node.children.values() {
        map.insert(child.path.clone(), child.id.clone());
        record_packages(child, map);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Element, ElementData};

    fn element(qualified: &str) -> Element {
        Element::new(
            stable_id(&["element", qualified]),
            qualified,
            ElementData::Datatype,
        )
    }

    #[test]
    fn test_unqualified_at_root() {
        let mut model = Model::new();
        model.add_element(element("Foo"));
        let root = NamespaceTree::build(&mut model);
        assert_eq!(root.element_ids.len(), 1);
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_intermediate_segments_become_nodes() {
        let mut model = Model::new();
        model.add_element(element("a::b::Foo"));
        model.add_element(element("a::Bar"));
        let root = NamespaceTree::build(&mut model);
        let a = &root.children["a"];
        assert_eq!(a.element_ids.len(), 1);
        let b = &a.children["b"];
        assert_eq!(b.element_ids.len(), 1);
        assert_eq!(b.path, "a::b");
        assert_eq!(model.namespace_packages.len(), 2);
    }

    #[test]
    fn test_package_ids_reproducible() {
        let mut m1 = Model::new();
        m1.add_element(element("x::Foo"));
        let mut m2 = Model::new();
        m2.add_element(element("x::Foo"));
        let r1 = NamespaceTree::build(&mut m1);
        let r2 = NamespaceTree::build(&mut m2);
        assert_eq!(r1.children["x"].id, r2.children["x"].id);
    }
}
