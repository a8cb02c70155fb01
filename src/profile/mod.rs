//! Type classification rules and profile overrides.
//!
//! Association derivation needs to know whether the outer type of a member
//! is a container, a smart pointer (and whether that flavor implies sole
//! ownership), or a plain type. Those decisions live here as one
//! data-driven table keyed by type keyword, seeded with the well-known
//! C++ standard and Boost names and mergeable with externally supplied
//! profile documents (JSON or YAML) — never as conditionals scattered
//! through the builder.

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::error::GenerateError;
use crate::model::Aggregation;

/// How a well-known type participates in association derivation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeClass {
    /// Element container: association multiplicity becomes `*`.
    Container,
    /// Smart pointer wrapper around a single element.
    SmartPointer {
        /// Sole-ownership flavors (`unique_ptr`) imply composite
        /// aggregation; the rest imply shared.
        sole_ownership: bool,
    },
}

/// One rule: classification plus optional derivation overrides.
#[derive(Clone, Debug)]
pub struct TypeRule {
    pub class: TypeClass,
    /// Template argument positions holding the element type. When set,
    /// only tokens from these arguments become association targets —
    /// `map<Key, Value>` associates with the value, not the key.
    pub element_args: Option<Vec<usize>>,
    /// Override for the generated association end name.
    pub end_name: Option<String>,
    /// Override for the derived aggregation.
    pub aggregation: Option<Aggregation>,
    /// Override for the derived multiplicity.
    pub multiplicity: Option<String>,
}

impl TypeRule {
    fn container() -> Self {
        Self {
            class: TypeClass::Container,
            element_args: None,
            end_name: None,
            aggregation: None,
            multiplicity: None,
        }
    }

    fn smart_pointer(sole_ownership: bool) -> Self {
        Self {
            class: TypeClass::SmartPointer { sole_ownership },
            element_args: None,
            end_name: None,
            aggregation: None,
            multiplicity: None,
        }
    }

    fn with_element_args(mut self, args: &[usize]) -> Self {
        self.element_args = Some(args.to_vec());
        self
    }
}

/// Profile document format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfileFormat {
    Json,
    Yaml,
}

/// The classification rule table.
///
/// Lookup is by the last `::` segment of the type's base name, so
/// `std::vector`, `boost::container::vector`, and a bare `vector` all hit
/// the same rule.
#[derive(Clone, Debug, Default)]
pub struct ProfileTable {
    rules: FxHashMap<String, TypeRule>,
}

const CONTAINER_KEYWORDS: &[&str] = &[
    "vector",
    "list",
    "forward_list",
    "deque",
    "set",
    "multiset",
    "unordered_set",
    "unordered_multiset",
    "queue",
    "priority_queue",
    "stack",
    "array",
    "valarray",
    "span",
    "initializer_list",
];

const MAP_KEYWORDS: &[&str] = &["map", "multimap", "unordered_map", "unordered_multimap"];

const SOLE_OWNERSHIP_POINTERS: &[&str] = &["unique_ptr", "auto_ptr", "scoped_ptr"];

const SHARED_POINTERS: &[&str] = &["shared_ptr", "weak_ptr", "intrusive_ptr"];

impl ProfileTable {
    /// The built-in rule set covering the C++ standard library and the
    /// common Boost spellings.
    pub fn builtin() -> Self {
        let mut rules = FxHashMap::default();
        for kw in CONTAINER_KEYWORDS {
            rules.insert(kw.to_string(), TypeRule::container());
        }
        for kw in MAP_KEYWORDS {
            // Value side only: the key is an index, not an element.
            rules.insert(kw.to_string(), TypeRule::container().with_element_args(&[1]));
        }
        for kw in SOLE_OWNERSHIP_POINTERS {
            rules.insert(kw.to_string(), TypeRule::smart_pointer(true));
        }
        for kw in SHARED_POINTERS {
            rules.insert(kw.to_string(), TypeRule::smart_pointer(false));
        }
        Self { rules }
    }

    /// Look up the rule for a type base name (`std::vector` → `vector`).
    pub fn rule_for(&self, base: &str) -> Option<&TypeRule> {
        let key = base.rsplit("::").next().unwrap_or(base).trim();
        self.rules.get(key)
    }

    /// Merge a profile document over the current table. Later documents
    /// win on keyword collisions.
    pub fn merge_document(&mut self, text: &str, format: ProfileFormat) -> Result<(), GenerateError> {
        let doc: ProfileDocument = match format {
            ProfileFormat::Json => {
                serde_json::from_str(text).map_err(|e| GenerateError::json(e.to_string()))?
            }
            ProfileFormat::Yaml => {
                serde_yaml::from_str(text).map_err(|e| GenerateError::yaml(e.to_string()))?
            }
        };

        for (keyword, entry) in doc.types {
            let class = match entry.classification.as_str() {
                "container" => TypeClass::Container,
                "smart_pointer" | "smart-pointer" => TypeClass::SmartPointer {
                    sole_ownership: entry.sole_ownership,
                },
                other => {
                    return Err(GenerateError::Unsupported(format!(
                        "unknown classification '{other}' for type '{keyword}'"
                    )));
                }
            };
            let aggregation = match entry.aggregation.as_deref() {
                None => None,
                Some("none") => Some(Aggregation::None),
                Some("shared") => Some(Aggregation::Shared),
                Some("composite") => Some(Aggregation::Composite),
                Some(other) => {
                    return Err(GenerateError::Unsupported(format!(
                        "unknown aggregation '{other}' for type '{keyword}'"
                    )));
                }
            };
            self.rules.insert(
                keyword,
                TypeRule {
                    class,
                    element_args: entry.element_args,
                    end_name: entry.end_name,
                    aggregation,
                    multiplicity: entry.multiplicity,
                },
            );
        }
        Ok(())
    }
}

/// On-disk profile document shape.
#[derive(Debug, Deserialize)]
struct ProfileDocument {
    #[serde(default)]
    types: std::collections::BTreeMap<String, ProfileEntry>,
}

#[derive(Debug, Deserialize)]
struct ProfileEntry {
    classification: String,
    #[serde(default, alias = "sole-ownership", alias = "owning")]
    sole_ownership: bool,
    #[serde(default, alias = "element-args", alias = "elementArgs")]
    element_args: Option<Vec<usize>>,
    #[serde(default, alias = "end-name", alias = "endName")]
    end_name: Option<String>,
    #[serde(default)]
    aggregation: Option<String>,
    #[serde(default)]
    multiplicity: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_container_lookup() {
        let table = ProfileTable::builtin();
        assert_eq!(table.rule_for("std::vector").unwrap().class, TypeClass::Container);
        assert_eq!(table.rule_for("vector").unwrap().class, TypeClass::Container);
        assert!(table.rule_for("Widget").is_none());
    }

    #[test]
    fn test_builtin_smart_pointers() {
        let table = ProfileTable::builtin();
        assert_eq!(
            table.rule_for("std::unique_ptr").unwrap().class,
            TypeClass::SmartPointer { sole_ownership: true }
        );
        assert_eq!(
            table.rule_for("boost::shared_ptr").unwrap().class,
            TypeClass::SmartPointer { sole_ownership: false }
        );
    }

    #[test]
    fn test_map_value_side_only() {
        let table = ProfileTable::builtin();
        let rule = table.rule_for("std::map").unwrap();
        assert_eq!(rule.element_args.as_deref(), Some(&[1][..]));
    }

    #[test]
    fn test_merge_yaml_override() {
        let mut table = ProfileTable::builtin();
        table
            .merge_document(
                "types:\n  QList:\n    classification: container\n    multiplicity: '*'\n",
                ProfileFormat::Yaml,
            )
            .unwrap();
        let rule = table.rule_for("QList").unwrap();
        assert_eq!(rule.class, TypeClass::Container);
        assert_eq!(rule.multiplicity.as_deref(), Some("*"));
    }

    #[test]
    fn test_merge_json_rejects_unknown_classification() {
        let mut table = ProfileTable::builtin();
        let err = table.merge_document(
            r#"{"types": {"Foo": {"classification": "magic"}}}"#,
            ProfileFormat::Json,
        );
        assert!(err.is_err());
    }
}
