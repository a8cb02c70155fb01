//! Semantic model construction from raw records.
//!
//! The builder runs the derivation passes in a fixed order: identity and
//! per-kind population first, then association / dependency /
//! generalization derivation against the complete name set. Every lookup
//! degrades to a default — nothing in here raises on malformed input.

use rustc_hash::FxHashSet;

use crate::ingest::{RawElement, RawMember, RawOperation};
use crate::profile::{ProfileTable, TypeClass};
use crate::typeexpr::{self, match_name, template_parts};

use super::element::{
    BaseRef, ClassData, Direction, Element, ElementData, EnumData, Member, Operation, Parameter,
    TypedefData, Visibility,
};
use super::ids::stable_id;
use super::relations::{Aggregation, Association, Dependency, Generalization};
use super::{ElementId, Model};

/// One recorded type usage, remembered for derivation.
struct UsedType {
    text: String,
    /// Member this usage came from; operations leave this empty.
    member: Option<String>,
}

/// Builds a [`Model`] from ingested records.
pub struct ModelBuilder<'a> {
    profiles: &'a ProfileTable,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(profiles: &'a ProfileTable) -> Self {
        Self { profiles }
    }

    pub fn build(&self, records: &[RawElement]) -> Model {
        let mut model = Model::new();
        let mut used_types: Vec<(ElementId, String, Vec<UsedType>)> = Vec::new();
        let mut taken: FxHashSet<String> = FxHashSet::default();

        for (ordinal, record) in records.iter().enumerate() {
            let (element, used) = self.build_element(record, ordinal, &taken, &mut model.violations);
            taken.insert(element.qualified_name.clone());
            let owner_name = element.qualified_name.clone();
            let id = model.add_element(element);
            if !used.is_empty() {
                used_types.push((id, owner_name, used));
            }
        }

        self.derive_associations(&mut model, &used_types);
        self.derive_generalizations(&mut model);

        model
    }

    // ------------------------------------------------------------------
    // Identity, classification, population
    // ------------------------------------------------------------------

    fn build_element(
        &self,
        record: &RawElement,
        ordinal: usize,
        taken: &FxHashSet<String>,
        violations: &mut Vec<String>,
    ) -> (Element, Vec<UsedType>) {
        // Name priority: qualified > display > short > generated opaque.
        let chosen = record
            .qualified_name
            .as_deref()
            .or(record.display_name.as_deref())
            .or(record.name.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| format!("__anon{ordinal}"));

        // Template metadata: explicit parameter list wins; otherwise a
        // `Base<Args>` shaped name is an instantiation and the canonical
        // name loses its argument list.
        let mut canonical = chosen.clone();
        let mut template_params = record.template_params.clone();
        let mut instantiation_of = None;
        let mut instantiation_args = Vec::new();
        if template_params.is_empty() {
            if let Some((base, args)) = template_parts(&chosen) {
                // Keep the spelled form when stripping would collide with
                // an already-declared element (a `Container<int>` record
                // next to the `Container` template definition).
                if taken.contains(&base) {
                    tracing::debug!(name = %chosen, "argument-stripped name taken, keeping spelling");
                } else {
                    canonical = base.clone();
                    template_params = args.clone();
                }
                instantiation_of = Some(base);
                instantiation_args = args;
            }
        }

        let kind = classify(record);
        let mut used = Vec::new();

        let data = match kind {
            RecordKind::Enum => ElementData::Enum(EnumData {
                literals: record
                    .enum_literals
                    .iter()
                    .map(|l| l.name().to_string())
                    .collect(),
            }),
            RecordKind::Typedef => ElementData::Typedef(TypedefData {
                underlying: record.underlying.clone().unwrap_or_default(),
            }),
            RecordKind::Datatype => {
                if !record.members.is_empty() {
                    tracing::warn!(
                        element = %canonical,
                        members = record.members.len(),
                        "datatype declares members, dropping them"
                    );
                    violations.push(format!(
                        "datatype '{}' declares {} member(s)",
                        canonical,
                        record.members.len()
                    ));
                }
                ElementData::Datatype
            }
            RecordKind::Package => ElementData::Package,
            RecordKind::Artifact => ElementData::Artifact,
            RecordKind::Class | RecordKind::Interface => {
                let mut class = ClassData {
                    template_params,
                    is_abstract: record.is_abstract.unwrap_or(false),
                    ..ClassData::default()
                };
                for (i, raw) in record.members.iter().enumerate() {
                    class.members.push(build_member(raw, i, &mut used));
                }
                for raw in &record.methods {
                    class.operations.push(build_operation(raw, &mut used));
                }
                for base in &record.bases {
                    class.bases.push(BaseRef {
                        name: base.name().to_string(),
                        access: base.access().to_string(),
                        is_virtual: base.is_virtual(),
                        is_final: base.is_final(),
                    });
                }
                if matches!(kind, RecordKind::Interface) {
                    ElementData::Interface(class)
                } else {
                    ElementData::Class(class)
                }
            }
        };

        let mut element = Element::new(stable_id(&["element", &canonical]), canonical, data);
        element.instantiation_of = instantiation_of;
        element.instantiation_args = instantiation_args;
        if !record.extra.is_empty() {
            element.metadata = serde_json::Value::Object(record.extra.clone());
        }
        (element, used)
    }

    // ------------------------------------------------------------------
    // Association and dependency derivation
    // ------------------------------------------------------------------

    fn derive_associations(
        &self,
        model: &mut Model,
        used_types: &[(ElementId, String, Vec<UsedType>)],
    ) {
        let known = model.known_names();

        for (owner_id, owner_name, used) in used_types {
            let mut dep_seen: FxHashSet<&str> = FxHashSet::default();

            for usage in used {
                let analysis = typeexpr::parse(&usage.text);
                if analysis.base.is_empty() {
                    continue;
                }
                let rule = self.profiles.rule_for(&analysis.base);

                // With an element-argument rule, only tokens from the
                // named argument positions become association targets.
                let candidate_text: Vec<String> = match rule.and_then(|r| r.element_args.clone()) {
                    Some(positions) if !analysis.template_args.is_empty() => {
                        match template_parts(&usage.text) {
                            Some((_, args)) => positions
                                .iter()
                                .filter_map(|&p| args.get(p).cloned())
                                .collect(),
                            None => vec![usage.text.clone()],
                        }
                    }
                    _ => vec![usage.text.clone()],
                };

                let mut matched: Vec<String> = Vec::new();
                for text in &candidate_text {
                    for hit in typeexpr::match_known(&typeexpr::extract_tokens(text), &known) {
                        if !matched.contains(&hit) {
                            matched.push(hit);
                        }
                    }
                }

                if matched.is_empty() {
                    // Unresolved used type, not an association target:
                    // record as a dependency, once per owner and text.
                    if dep_seen.insert(usage.text.as_str()) {
                        model.dependencies.push(Dependency {
                            owner: owner_name.clone(),
                            type_text: usage.text.clone(),
                        });
                    }
                    continue;
                }

                let mut aggregation = match rule.map(|r| r.class) {
                    Some(TypeClass::SmartPointer { sole_ownership: true }) => Aggregation::Composite,
                    Some(TypeClass::SmartPointer { sole_ownership: false }) => Aggregation::Shared,
                    _ => {
                        if analysis.is_pointer
                            || analysis.is_reference
                            || analysis.is_rvalue_reference
                        {
                            Aggregation::Shared
                        } else {
                            Aggregation::None
                        }
                    }
                };
                let mut multiplicity = if matches!(rule.map(|r| r.class), Some(TypeClass::Container))
                    || analysis.is_array
                {
                    "*".to_string()
                } else {
                    "1".to_string()
                };
                let mut end_name = usage.member.clone();
                if let Some(rule) = rule {
                    if let Some(a) = rule.aggregation {
                        aggregation = a;
                    }
                    if let Some(m) = &rule.multiplicity {
                        multiplicity = m.clone();
                    }
                    if let Some(n) = &rule.end_name {
                        end_name = Some(n.clone());
                    }
                }

                for target_name in matched {
                    let Some(tgt) = model.by_name.get(&target_name).cloned() else {
                        continue;
                    };
                    model.associations.push(Association {
                        src: owner_id.clone(),
                        tgt,
                        aggregation,
                        multiplicity: Some(multiplicity.clone()),
                        name: end_name.clone(),
                        src_member: usage.member.clone(),
                        end_ids: None,
                    });
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Generalization derivation
    // ------------------------------------------------------------------

    fn derive_generalizations(&self, model: &mut Model) {
        let known = model.known_names();
        let mut edges = Vec::new();

        for element in model.elements.values() {
            let Some(class) = element.class_data() else {
                continue;
            };
            for base in &class.bases {
                // Instantiation arguments never take part in the lookup:
                // `Container<int>` resolves against the declared
                // `Container` template.
                match match_name(base.name.trim(), &known)
                    .and_then(|name| model.by_name.get(&name).cloned())
                {
                    Some(parent) => edges.push(Generalization {
                        child: element.id.clone(),
                        parent,
                        kind: base.access.clone(),
                        is_virtual: base.is_virtual,
                        is_final: base.is_final,
                    }),
                    None => {
                        tracing::debug!(
                            child = %element.qualified_name,
                            base = %base.name,
                            "unresolved base class dropped"
                        );
                    }
                }
            }
        }

        model.generalizations = edges;
    }
}

// ----------------------------------------------------------------------
// Record helpers
// ----------------------------------------------------------------------

#[derive(Clone, Copy, Debug)]
enum RecordKind {
    Class,
    Interface,
    Enum,
    Typedef,
    Datatype,
    Package,
    Artifact,
}

/// Kind classification from hint keywords and boolean flags.
/// Ambiguity defaults to Class.
fn classify(record: &RawElement) -> RecordKind {
    if record.is_interface == Some(true) {
        return RecordKind::Interface;
    }
    if record.is_enum == Some(true) {
        return RecordKind::Enum;
    }
    let hint = record.kind.as_deref().unwrap_or("").to_ascii_lowercase();
    if hint.contains("interface") {
        RecordKind::Interface
    } else if hint.contains("enum") {
        RecordKind::Enum
    } else if hint.contains("typedef") || hint.contains("alias") || hint.contains("using") {
        RecordKind::Typedef
    } else if hint.contains("primitive") || hint.contains("datatype") {
        RecordKind::Datatype
    } else if hint.contains("namespace") || hint.contains("package") {
        RecordKind::Package
    } else if hint.contains("artifact") || hint.contains("file") {
        RecordKind::Artifact
    } else {
        RecordKind::Class
    }
}

fn build_member(raw: &RawMember, ordinal: usize, used: &mut Vec<UsedType>) -> Member {
    let name = raw
        .name
        .clone()
        .unwrap_or_else(|| format!("field{ordinal}"));
    let type_text = raw.type_name.clone().unwrap_or_default();
    if !type_text.is_empty() {
        used.push(UsedType {
            text: type_text.clone(),
            member: Some(name.clone()),
        });
    }
    Member {
        name,
        type_text,
        visibility: Visibility::parse_or(raw.visibility.as_deref(), Visibility::Private),
        is_static: raw.is_static,
        multiplicity: raw.multiplicity.clone(),
    }
}

fn build_operation(raw: &RawOperation, used: &mut Vec<UsedType>) -> Operation {
    let mut params = Vec::new();
    for (i, p) in raw.params.iter().enumerate() {
        let type_text = p.type_name.clone().unwrap_or_default();
        if !type_text.is_empty() {
            used.push(UsedType {
                text: type_text.clone(),
                member: None,
            });
        }
        params.push(Parameter {
            name: p.name.clone().unwrap_or_else(|| format!("p{i}")),
            type_text,
            direction: Direction::parse(p.direction.as_deref()),
            default: p.default.clone(),
        });
    }
    if let Some(ret) = &raw.return_type {
        if !ret.is_empty() {
            used.push(UsedType {
                text: ret.clone(),
                member: None,
            });
        }
    }
    Operation {
        name: raw.name.clone().unwrap_or_else(|| "operation".to_string()),
        return_type: raw.return_type.clone(),
        params,
        visibility: Visibility::parse_or(raw.visibility.as_deref(), Visibility::Public),
        is_static: raw.is_static,
        is_abstract: raw.is_abstract,
        is_const: raw.is_const,
        is_virtual: raw.is_virtual,
    }
}
