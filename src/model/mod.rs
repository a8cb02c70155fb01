//! The semantic model: elements, derived edges, and the builders that
//! produce them.
//!
//! ```text
//! RawElement records ──► ModelBuilder ──► Model ──► NamespaceTree
//! ```
//!
//! The `Model` exclusively owns every entity for one build invocation.
//! Ids derive once (see [`ids`]) and are never mutated; iteration order
//! everywhere is insertion order, which makes repeated builds on
//! identical input reproducible down to the byte.

mod builder;
mod element;
mod ids;
mod namespace;
mod relations;

pub use builder::ModelBuilder;
pub use element::{
    BaseRef, ClassData, Direction, Element, ElementData, EnumData, Member, Operation, Parameter,
    TypedefData, Visibility, split_qualified,
};
pub use ids::{ElementId, derived_id, stable_id};
pub use namespace::{NamespaceNode, NamespaceTree};
pub use relations::{Aggregation, Association, Dependency, Generalization};

use indexmap::{IndexMap, IndexSet};

/// The assembled semantic model.
#[derive(Clone, Debug, Default)]
pub struct Model {
    /// All elements, in declaration order (stubs appended at the end).
    pub elements: IndexMap<ElementId, Element>,
    /// Qualified name → id, same order as `elements`.
    pub by_name: IndexMap<String, ElementId>,
    pub associations: Vec<Association>,
    pub generalizations: Vec<Generalization>,
    pub dependencies: Vec<Dependency>,
    /// Namespace path → package id, filled when the tree is built.
    pub namespace_packages: IndexMap<String, ElementId>,
    /// Structural invariant violations tolerated during the build.
    /// Strict-mode serialization turns these into hard errors.
    pub violations: Vec<String>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an element, indexing it by qualified name.
    ///
    /// The first element to claim a name wins the name index — later
    /// claimants stay addressable by id only.
    pub fn add_element(&mut self, element: Element) -> ElementId {
        let id = element.id.clone();
        if !self.by_name.contains_key(&element.qualified_name) {
            self.by_name.insert(element.qualified_name.clone(), id.clone());
        } else {
            tracing::debug!(name = %element.qualified_name, "duplicate qualified name, keeping first");
        }
        self.elements.insert(id.clone(), element);
        id
    }

    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn get_by_name(&self, qualified: &str) -> Option<&Element> {
        self.by_name.get(qualified).and_then(|id| self.elements.get(id))
    }

    /// Known qualified names in insertion order — the candidate set for
    /// token matching, and the documented first-declared tie-break.
    pub fn known_names(&self) -> IndexSet<String> {
        self.by_name.keys().cloned().collect()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
}
