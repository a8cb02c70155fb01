//! Derived edges: associations, generalizations, dependencies.

use super::ids::ElementId;

/// Association end aggregation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Aggregation {
    #[default]
    None,
    Shared,
    Composite,
}

impl Aggregation {
    /// The serialized attribute value; `None` is the format default and
    /// is not written.
    pub fn as_attr(&self) -> Option<&'static str> {
        match self {
            Aggregation::None => None,
            Aggregation::Shared => Some("shared"),
            Aggregation::Composite => Some("composite"),
        }
    }
}

/// Directed association between two elements.
#[derive(Clone, Debug)]
pub struct Association {
    pub src: ElementId,
    pub tgt: ElementId,
    pub aggregation: Aggregation,
    /// `*` for containers and arrays, `1` otherwise; profile overrides
    /// may substitute anything.
    pub multiplicity: Option<String>,
    /// End name, usually the owning member's name.
    pub name: Option<String>,
    /// Member of `src` this association was derived from, when any.
    /// Drives end materialization: a real field renders as a class-owned
    /// attribute instead of a synthesized association end.
    pub src_member: Option<String>,
    /// Precomputed end ids, filled during serialization planning.
    pub end_ids: Option<(ElementId, ElementId)>,
}

/// Inheritance edge.
#[derive(Clone, Debug)]
pub struct Generalization {
    pub child: ElementId,
    pub parent: ElementId,
    /// Inheritance access (`public`/`protected`/`private`).
    pub kind: String,
    pub is_virtual: bool,
    pub is_final: bool,
}

/// A used type that resolved to nothing.
#[derive(Clone, Debug)]
pub struct Dependency {
    /// Qualified name of the element that used the type.
    pub owner: String,
    /// The unresolved type text, verbatim.
    pub type_text: String,
}
