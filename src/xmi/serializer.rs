//! XMI document serialization.
//!
//! Streams the model as a two-namespace XMI dialect: the `xmi` namespace
//! carries identity (id/type/version), the `uml` namespace carries the
//! vocabulary. The consuming tool enforces referential integrity, so the
//! serializer's job is a document where every reference-bearing attribute
//! names an id declared somewhere in the same file.
//!
//! Before any byte is written, a pre-pass materializes stub datatypes for
//! referenced-but-undeclared type names (primitives excepted), prunes
//! associations with dead endpoints, and plans how each association's two
//! ends materialize — as class-owned attributes or as ends synthesized on
//! the association element.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use indexmap::IndexSet;
use quick_xml::events::BytesStart;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::GeneratorConfig;
use crate::error::GenerateError;
use crate::model::{
    ClassData, Element, ElementData, ElementId, Generalization, Member, Model, NamespaceNode,
    Operation, derived_id, stable_id,
};
use crate::typeexpr::{self, match_name};

use super::layout;
use super::writer::XmlStreamWriter;

/// Namespace URIs of the output dialect.
pub mod ns {
    pub const XMI: &str = "http://schema.omg.org/spec/XMI/2.1";
    pub const UML: &str = "http://schema.omg.org/spec/UML/2.1";
    pub const LAYOUT: &str = "http://schema.declxmi.io/spec/layout/1.0";
}

/// Built-in primitive names exempt from stub materialization.
///
/// Multi-word spellings (`unsigned long long`) are primitive when every
/// word is; a qualified name is checked by its last segment.
const PRIMITIVES: &[&str] = &[
    "void", "bool", "char", "wchar_t", "char8_t", "char16_t", "char32_t", "short", "int", "long",
    "float", "double", "signed", "unsigned", "auto", "size_t", "ssize_t", "ptrdiff_t", "int8_t",
    "uint8_t", "int16_t", "uint16_t", "int32_t", "uint32_t", "int64_t", "uint64_t", "intptr_t",
    "uintptr_t", "nullptr_t",
];

fn is_primitive(base: &str) -> bool {
    let last = base.rsplit("::").next().unwrap_or(base);
    let mut words = last.split_whitespace().peekable();
    if words.peek().is_none() {
        return false;
    }
    words.all(|w| PRIMITIVES.contains(&w))
}

/// Outcome counts for one write invocation.
#[derive(Clone, Debug, Default)]
pub struct WriteReport {
    pub elements: usize,
    pub stubs_created: usize,
    pub associations_written: usize,
    pub associations_pruned: usize,
    pub dependencies_written: usize,
    /// Structural violations tolerated under non-strict mode.
    pub tolerated_violations: Vec<String>,
}

// ----------------------------------------------------------------------
// Association end planning
// ----------------------------------------------------------------------

/// An end synthesized on the association element itself.
struct SynthEnd {
    type_id: ElementId,
    name: Option<String>,
    aggregation: Option<&'static str>,
    multiplicity: Option<String>,
}

/// One planned association end: either realized by a class-owned
/// attribute (whose id it reuses) or synthesized.
struct PlannedEnd {
    id: ElementId,
    synth: Option<SynthEnd>,
}

struct AssocPlan {
    id: ElementId,
    name: Option<String>,
    /// End typed with the association source.
    source: PlannedEnd,
    /// End typed with the association target.
    target: PlannedEnd,
    /// Both ends were synthesized; an annotation records that.
    annotated: bool,
}

/// Extra attributes an association contributes to a class-owned member.
struct AttrAssocInfo {
    assoc_id: ElementId,
    aggregation: Option<&'static str>,
    multiplicity: Option<String>,
}

type AttrAssocMap = FxHashMap<(ElementId, String), AttrAssocInfo>;

// ----------------------------------------------------------------------
// Serializer
// ----------------------------------------------------------------------

pub struct XmiSerializer {
    config: GeneratorConfig,
}

impl XmiSerializer {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Write the model document and the companion layout document.
    ///
    /// Takes the model mutably for the stub pre-pass (append-only) and
    /// association pruning; nothing else is modified.
    pub fn write(
        &self,
        model: &mut Model,
        tree: &NamespaceNode,
        model_path: &Path,
        layout_path: &Path,
    ) -> Result<WriteReport, GenerateError> {
        let model_out = BufWriter::new(File::create(model_path)?);
        let layout_out = BufWriter::new(File::create(layout_path)?);
        self.write_to(model, tree, model_out, layout_out)
    }

    /// Same as [`write`](Self::write) against arbitrary writers.
    pub fn write_to<M: Write, L: Write>(
        &self,
        model: &mut Model,
        tree: &NamespaceNode,
        model_out: M,
        layout_out: L,
    ) -> Result<WriteReport, GenerateError> {
        let mut tree = tree.clone();
        let mut report = WriteReport::default();

        report.stubs_created = self.materialize_stubs(model, &mut tree);
        report.associations_pruned = prune_associations(model);
        self.enforce_shapes(model, &mut report.tolerated_violations)?;

        let known = model.known_names();
        let (plans, attr_map) = self.plan_associations(model, &known);
        for (assoc, plan) in model.associations.iter_mut().zip(&plans) {
            assoc.end_ids = Some((plan.source.id.clone(), plan.target.id.clone()));
        }

        report.elements = model.element_count();
        report.associations_written = plans.len();
        report.dependencies_written =
            self.write_model_doc(model, &tree, &plans, &attr_map, &known, model_out)?;

        layout::write_layout(model, &self.config, layout_out)?;

        Ok(report)
    }

    // ------------------------------------------------------------------
    // Pre-passes
    // ------------------------------------------------------------------

    /// Create a stub Datatype for every referenced-but-undeclared type
    /// name, placed under its namespace. Returns the number created.
    fn materialize_stubs(&self, model: &mut Model, tree: &mut NamespaceNode) -> usize {
        let mut referenced: Vec<String> = Vec::new();
        for element in model.elements.values() {
            match &element.data {
                ElementData::Class(c) | ElementData::Interface(c) => {
                    for m in &c.members {
                        referenced.push(m.type_text.clone());
                    }
                    for op in &c.operations {
                        for p in &op.params {
                            referenced.push(p.type_text.clone());
                        }
                        if let Some(ret) = &op.return_type {
                            referenced.push(ret.clone());
                        }
                    }
                }
                ElementData::Typedef(t) => referenced.push(t.underlying.clone()),
                ElementData::Enum(_)
                | ElementData::Datatype
                | ElementData::Package
                | ElementData::Artifact => {}
            }
            for arg in &element.instantiation_args {
                referenced.push(arg.clone());
            }
        }
        for dep in &model.dependencies {
            referenced.push(dep.type_text.clone());
        }

        let mut known = model.known_names();
        let mut created = 0usize;
        for text in referenced {
            for token in typeexpr::extract_tokens(&text) {
                let name = typeexpr::template_base_of(&token.name).to_string();
                // decltype tokens carry their expression; not a stub name.
                if name.is_empty() || name.contains('(') {
                    continue;
                }
                if is_primitive(&name) || match_name(&name, &known).is_some() {
                    continue;
                }
                tracing::debug!(name = %name, "materializing stub datatype");
                let mut stub =
                    Element::new(stable_id(&["element", &name]), name.clone(), ElementData::Datatype);
                stub.is_stub = true;
                let namespace = stub.namespace.clone();
                let id = model.add_element(stub);
                tree.insert(&namespace, id);
                known.insert(name);
                created += 1;
            }
        }
        created
    }

    /// Structural shape checks: Enum needs at least one literal, a
    /// Datatype never owns attributes. Strict mode turns violations into
    /// errors; otherwise an empty enum gains a placeholder literal and
    /// the violation is reported.
    fn enforce_shapes(
        &self,
        model: &mut Model,
        tolerated: &mut Vec<String>,
    ) -> Result<(), GenerateError> {
        if self.config.strict && !model.violations.is_empty() {
            return Err(GenerateError::validation(model.violations.join("; ")));
        }
        tolerated.extend(model.violations.iter().cloned());

        let mut fixes: Vec<String> = Vec::new();
        for element in model.elements.values_mut() {
            if let ElementData::Enum(e) = &mut element.data {
                if e.literals.is_empty() {
                    if self.config.strict {
                        return Err(GenerateError::validation(format!(
                            "enum '{}' has no literals",
                            element.qualified_name
                        )));
                    }
                    tracing::warn!(
                        element = %element.qualified_name,
                        "enum has no literals, inserting placeholder"
                    );
                    e.literals.push("UNSPECIFIED".to_string());
                    fixes.push(format!(
                        "enum '{}' had no literals, placeholder inserted",
                        element.qualified_name
                    ));
                }
            }
        }
        tolerated.extend(fixes);
        Ok(())
    }

    /// Decide how each association's two ends materialize.
    fn plan_associations(&self, model: &Model, known: &IndexSet<String>) -> (Vec<AssocPlan>, AttrAssocMap) {
        let mut plans = Vec::with_capacity(model.associations.len());
        let mut attr_map: AttrAssocMap = FxHashMap::default();
        let mut claimed: FxHashSet<(ElementId, String)> = FxHashSet::default();
        let mut per_src: FxHashMap<ElementId, usize> = FxHashMap::default();

        for assoc in &model.associations {
            let ordinal = per_src.entry(assoc.src.clone()).or_insert(0);
            let tgt_name = model
                .get(&assoc.tgt)
                .map(|e| e.qualified_name.clone())
                .unwrap_or_default();
            let id = derived_id(&assoc.src, &["assoc", &ordinal.to_string(), &tgt_name]);
            *ordinal += 1;

            let self_ref = assoc.src == assoc.tgt;
            let aggregation = assoc.aggregation.as_attr();

            // A side owns the end when it has a real matching field that
            // no earlier association already claimed.
            let src_field = if self_ref {
                None
            } else {
                assoc.src_member.as_ref().filter(|m| {
                    has_member(model, &assoc.src, m)
                        && !claimed.contains(&(assoc.src.clone(), (*m).clone()))
                })
            };
            let tgt_field = if self_ref {
                None
            } else {
                find_member_typed(model, &assoc.tgt, &assoc.src, known)
                    .filter(|m| !claimed.contains(&(assoc.tgt.clone(), m.clone())))
            };

            let target = match src_field {
                Some(member) => {
                    let end_id = derived_id(&assoc.src, &["attr", member]);
                    claimed.insert((assoc.src.clone(), member.clone()));
                    attr_map.insert(
                        (assoc.src.clone(), member.clone()),
                        AttrAssocInfo {
                            assoc_id: id.clone(),
                            aggregation,
                            multiplicity: assoc.multiplicity.clone(),
                        },
                    );
                    PlannedEnd { id: end_id, synth: None }
                }
                None => PlannedEnd {
                    id: derived_id(&id, &["tgt"]),
                    synth: Some(SynthEnd {
                        type_id: assoc.tgt.clone(),
                        name: assoc.name.clone(),
                        aggregation,
                        multiplicity: assoc.multiplicity.clone(),
                    }),
                },
            };

            let source = match &tgt_field {
                Some(member) => {
                    let end_id = derived_id(&assoc.tgt, &["attr", member]);
                    claimed.insert((assoc.tgt.clone(), member.clone()));
                    attr_map.insert(
                        (assoc.tgt.clone(), member.clone()),
                        AttrAssocInfo {
                            assoc_id: id.clone(),
                            aggregation: None,
                            multiplicity: None,
                        },
                    );
                    PlannedEnd { id: end_id, synth: None }
                }
                None => PlannedEnd {
                    id: derived_id(&id, &["src"]),
                    synth: Some(SynthEnd {
                        type_id: assoc.src.clone(),
                        name: None,
                        aggregation: None,
                        multiplicity: None,
                    }),
                },
            };

            let annotated = source.synth.is_some() && target.synth.is_some();
            plans.push(AssocPlan {
                id,
                name: assoc.name.clone(),
                source,
                target,
                annotated,
            });
        }

        (plans, attr_map)
    }

    // ------------------------------------------------------------------
    // Document emission
    // ------------------------------------------------------------------

    fn write_model_doc<W: Write>(
        &self,
        model: &Model,
        tree: &NamespaceNode,
        plans: &[AssocPlan],
        attr_map: &AttrAssocMap,
        known: &IndexSet<String>,
        out: W,
    ) -> Result<usize, GenerateError> {
        let mut w = XmlStreamWriter::new(out);
        w.declaration()?;

        let mut root = BytesStart::new("xmi:XMI");
        root.push_attribute(("xmi:version", "2.1"));
        root.push_attribute(("xmlns:xmi", ns::XMI));
        root.push_attribute(("xmlns:uml", ns::UML));
        w.open(root)?;

        // The one root model node. No visibility attribute here.
        let model_id = stable_id(&["model", &self.config.model_name]);
        let mut model_elem = BytesStart::new("uml:Model");
        model_elem.push_attribute(("xmi:id", model_id.as_str()));
        model_elem.push_attribute(("name", self.config.model_name.as_str()));
        w.open(model_elem)?;

        let mut gens: FxHashMap<&ElementId, Vec<&Generalization>> = FxHashMap::default();
        for g in &model.generalizations {
            gens.entry(&g.child).or_default().push(g);
        }

        self.write_namespace(&mut w, model, tree, attr_map, &gens, known)?;

        for plan in plans {
            self.write_association(&mut w, plan)?;
        }

        let deps = self.write_dependencies(&mut w, model, known)?;

        w.close()?; // uml:Model
        w.close()?; // xmi:XMI
        let mut inner = w.finish()?;
        inner.flush()?;
        Ok(deps)
    }

    fn write_namespace<W: Write>(
        &self,
        w: &mut XmlStreamWriter<W>,
        model: &Model,
        node: &NamespaceNode,
        attr_map: &AttrAssocMap,
        gens: &FxHashMap<&ElementId, Vec<&Generalization>>,
        known: &IndexSet<String>,
    ) -> Result<(), GenerateError> {
        for id in &node.element_ids {
            if let Some(element) = model.get(id) {
                self.write_element(w, model, element, attr_map, gens, known)?;
            }
        }
        for child in node.children.values() {
            let mut pkg = BytesStart::new("packagedElement");
            pkg.push_attribute(("xmi:type", "uml:Package"));
            pkg.push_attribute(("xmi:id", child.id.as_str()));
            pkg.push_attribute(("name", child.name.as_str()));
            w.open(pkg)?;
            self.write_namespace(w, model, child, attr_map, gens, known)?;
            w.close()?;
        }
        Ok(())
    }

    fn write_element<W: Write>(
        &self,
        w: &mut XmlStreamWriter<W>,
        model: &Model,
        element: &Element,
        attr_map: &AttrAssocMap,
        gens: &FxHashMap<&ElementId, Vec<&Generalization>>,
        known: &IndexSet<String>,
    ) -> Result<(), GenerateError> {
        let mut start = BytesStart::new("packagedElement");
        start.push_attribute(("xmi:type", element.data.xmi_type()));
        start.push_attribute(("xmi:id", element.id.as_str()));
        start.push_attribute(("name", element.name.as_str()));

        match &element.data {
            ElementData::Class(class) | ElementData::Interface(class) => {
                if class.is_abstract {
                    start.push_attribute(("isAbstract", "true"));
                }
                w.open(start)?;
                self.write_template_signature(w, element, class)?;
                for g in gens.get(&element.id).into_iter().flatten() {
                    self.write_generalization(w, model, g)?;
                }
                for member in &class.members {
                    self.write_member(w, model, element, member, attr_map, known)?;
                }
                for (ordinal, op) in class.operations.iter().enumerate() {
                    self.write_operation(w, model, element, op, ordinal, known)?;
                }
                self.write_template_binding(w, model, element, known)?;
                w.close()?;
            }
            ElementData::Enum(e) => {
                w.open(start)?;
                for literal in &e.literals {
                    let mut lit = BytesStart::new("ownedLiteral");
                    lit.push_attribute(("xmi:type", "uml:EnumerationLiteral"));
                    lit.push_attribute((
                        "xmi:id",
                        derived_id(&element.id, &["lit", literal]).as_str(),
                    ));
                    lit.push_attribute(("name", literal.as_str()));
                    w.empty(lit)?;
                }
                w.close()?;
            }
            // Datatype owns no attributes, ever; typedef underlying is
            // rendered as a dependency edge at the model level.
            ElementData::Typedef(_)
            | ElementData::Datatype
            | ElementData::Package
            | ElementData::Artifact => {
                w.empty(start)?;
            }
        }
        Ok(())
    }

    fn write_generalization<W: Write>(
        &self,
        w: &mut XmlStreamWriter<W>,
        model: &Model,
        g: &Generalization,
    ) -> Result<(), GenerateError> {
        let parent_name = model
            .get(&g.parent)
            .map(|e| e.qualified_name.clone())
            .unwrap_or_default();
        let mut r#gen = BytesStart::new("generalization");
        r#gen.push_attribute(("xmi:id", derived_id(&g.child, &["gen", &parent_name]).as_str()));
        r#gen.push_attribute(("general", g.parent.as_str()));
        w.empty(r#gen)
    }

    fn write_member<W: Write>(
        &self,
        w: &mut XmlStreamWriter<W>,
        model: &Model,
        owner: &Element,
        member: &Member,
        attr_map: &AttrAssocMap,
        known: &IndexSet<String>,
    ) -> Result<(), GenerateError> {
        let attr_id = derived_id(&owner.id, &["attr", &member.name]);
        let mut attr = BytesStart::new("ownedAttribute");
        attr.push_attribute(("xmi:id", attr_id.as_str()));
        attr.push_attribute(("name", member.name.as_str()));
        attr.push_attribute(("visibility", member.visibility.as_str()));
        if member.is_static {
            attr.push_attribute(("isStatic", "true"));
        }
        if let Some(type_id) = resolve_type(&member.type_text, model, known) {
            attr.push_attribute(("type", type_id.as_str()));
        }

        let info = attr_map.get(&(owner.id.clone(), member.name.clone()));
        let mut multiplicity = member.multiplicity.clone();
        if let Some(info) = info {
            attr.push_attribute(("association", info.assoc_id.as_str()));
            if let Some(agg) = info.aggregation {
                attr.push_attribute(("aggregation", agg));
            }
            if info.multiplicity.is_some() {
                multiplicity = info.multiplicity.clone();
            }
        }

        // 1..1 is the format default for class-owned attributes; only
        // non-default multiplicities spell their bounds out.
        let needs_bounds = matches!(multiplicity.as_deref(), Some(m) if m != "1");
        if needs_bounds {
            w.open(attr)?;
            self.write_bounds(w, &attr_id, multiplicity.as_deref())?;
            w.close()?;
        } else {
            w.empty(attr)?;
        }
        Ok(())
    }

    fn write_operation<W: Write>(
        &self,
        w: &mut XmlStreamWriter<W>,
        model: &Model,
        owner: &Element,
        op: &Operation,
        ordinal: usize,
        known: &IndexSet<String>,
    ) -> Result<(), GenerateError> {
        // The ordinal keeps same-signature siblings distinct.
        let op_id = derived_id(&owner.id, &["op", &ordinal.to_string(), &op.signature()]);
        let mut start = BytesStart::new("ownedOperation");
        start.push_attribute(("xmi:id", op_id.as_str()));
        start.push_attribute(("name", op.name.as_str()));
        start.push_attribute(("visibility", op.visibility.as_str()));
        if op.is_static {
            start.push_attribute(("isStatic", "true"));
        }
        if op.is_abstract {
            start.push_attribute(("isAbstract", "true"));
        }
        if op.is_const {
            start.push_attribute(("isQuery", "true"));
        }

        let has_children = !op.params.is_empty() || op.return_type.is_some();
        if !has_children {
            return w.empty(start);
        }

        w.open(start)?;
        for (i, param) in op.params.iter().enumerate() {
            let param_id = derived_id(&op_id, &["param", &i.to_string()]);
            let mut p = BytesStart::new("ownedParameter");
            p.push_attribute(("xmi:id", param_id.as_str()));
            p.push_attribute(("name", param.name.as_str()));
            p.push_attribute(("direction", param.direction.as_str()));
            if let Some(type_id) = resolve_type(&param.type_text, model, known) {
                p.push_attribute(("type", type_id.as_str()));
            }
            match &param.default {
                Some(default) => {
                    w.open(p)?;
                    let mut dv = BytesStart::new("defaultValue");
                    dv.push_attribute(("xmi:type", "uml:LiteralString"));
                    dv.push_attribute(("xmi:id", derived_id(&param_id, &["default"]).as_str()));
                    dv.push_attribute(("value", default.as_str()));
                    w.empty(dv)?;
                    w.close()?;
                }
                None => w.empty(p)?,
            }
        }
        if let Some(ret) = &op.return_type {
            // The return value is a parameter of its own, with an id
            // derived from the operation so siblings never share it.
            let mut r = BytesStart::new("ownedParameter");
            r.push_attribute(("xmi:id", derived_id(&op_id, &["return"]).as_str()));
            r.push_attribute(("direction", "return"));
            if let Some(type_id) = resolve_type(ret, model, known) {
                r.push_attribute(("type", type_id.as_str()));
            }
            w.empty(r)?;
        }
        w.close()
    }

    /// Owned template signature, one parameter per template parameter
    /// name. Only under the configuration flag; all ids are self-derived
    /// so the signature can never dangle.
    fn write_template_signature<W: Write>(
        &self,
        w: &mut XmlStreamWriter<W>,
        element: &Element,
        class: &ClassData,
    ) -> Result<(), GenerateError> {
        if !self.config.emit_template_bindings || class.template_params.is_empty() {
            return Ok(());
        }
        let sig_id = derived_id(&element.id, &["tsig"]);
        let mut sig = BytesStart::new("ownedTemplateSignature");
        sig.push_attribute(("xmi:id", sig_id.as_str()));
        w.open(sig)?;
        for param in &class.template_params {
            let mut p = BytesStart::new("ownedParameter");
            p.push_attribute(("xmi:type", "uml:ClassifierTemplateParameter"));
            p.push_attribute(("xmi:id", derived_id(&sig_id, &["tparam", param]).as_str()));
            p.push_attribute(("name", param.as_str()));
            w.empty(p)?;
        }
        w.close()
    }

    /// Template binding back to the instantiated base's signature.
    ///
    /// Omitted — even under the flag — whenever the base, its signature,
    /// or any substituted argument id cannot be guaranteed present:
    /// downstream tooling rejects dangling signature references.
    fn write_template_binding<W: Write>(
        &self,
        w: &mut XmlStreamWriter<W>,
        model: &Model,
        element: &Element,
        known: &IndexSet<String>,
    ) -> Result<(), GenerateError> {
        if !self.config.emit_template_bindings {
            return Ok(());
        }
        let Some(base_name) = &element.instantiation_of else {
            return Ok(());
        };
        let Some(base) = match_name(base_name, known).and_then(|n| model.get_by_name(&n)) else {
            return Ok(());
        };
        if base.id == element.id {
            return Ok(());
        }
        let Some(base_class) = base.class_data() else {
            return Ok(());
        };
        if base_class.template_params.is_empty()
            || element.instantiation_args.len() > base_class.template_params.len()
        {
            return Ok(());
        }
        let mut actuals = Vec::with_capacity(element.instantiation_args.len());
        for arg in &element.instantiation_args {
            match resolve_type(arg, model, known) {
                Some(id) => actuals.push(id),
                None => return Ok(()), // unresolved argument, omit the binding
            }
        }

        let base_sig = derived_id(&base.id, &["tsig"]);
        let bind_id = derived_id(&element.id, &["tbind"]);
        let mut bind = BytesStart::new("templateBinding");
        bind.push_attribute(("xmi:id", bind_id.as_str()));
        bind.push_attribute(("signature", base_sig.as_str()));
        w.open(bind)?;
        for (i, actual) in actuals.iter().enumerate() {
            let formal = derived_id(&base_sig, &["tparam", &base_class.template_params[i]]);
            let mut subst = BytesStart::new("parameterSubstitution");
            subst.push_attribute(("xmi:id", derived_id(&bind_id, &["subst", &i.to_string()]).as_str()));
            subst.push_attribute(("formal", formal.as_str()));
            subst.push_attribute(("actual", actual.as_str()));
            w.empty(subst)?;
        }
        w.close()
    }

    fn write_association<W: Write>(
        &self,
        w: &mut XmlStreamWriter<W>,
        plan: &AssocPlan,
    ) -> Result<(), GenerateError> {
        let mut start = BytesStart::new("packagedElement");
        start.push_attribute(("xmi:type", "uml:Association"));
        start.push_attribute(("xmi:id", plan.id.as_str()));
        if let Some(name) = &plan.name {
            start.push_attribute(("name", name.as_str()));
        }
        let member_end = format!("{} {}", plan.source.id, plan.target.id);
        start.push_attribute(("memberEnd", member_end.as_str()));
        w.open(start)?;

        for end in [&plan.source, &plan.target] {
            let Some(synth) = &end.synth else { continue };
            let mut owned = BytesStart::new("ownedEnd");
            owned.push_attribute(("xmi:id", end.id.as_str()));
            if let Some(name) = &synth.name {
                owned.push_attribute(("name", name.as_str()));
            }
            owned.push_attribute(("type", synth.type_id.as_str()));
            owned.push_attribute(("association", plan.id.as_str()));
            if let Some(agg) = synth.aggregation {
                owned.push_attribute(("aggregation", agg));
            }
            w.open(owned)?;
            self.write_bounds(w, &end.id, synth.multiplicity.as_deref())?;
            w.close()?;
        }

        if plan.annotated {
            let mut comment = BytesStart::new("ownedComment");
            comment.push_attribute(("xmi:id", derived_id(&plan.id, &["comment"]).as_str()));
            comment.push_attribute(("annotatedElement", plan.id.as_str()));
            w.open(comment)?;
            let mut body = BytesStart::new("body");
            let body_id = derived_id(&plan.id, &["comment", "body"]);
            body.push_attribute(("xmi:id", body_id.as_str()));
            w.open(body)?;
            w.text("both association ends synthesized (source, target)")?;
            w.close()?;
            w.close()?;
        }

        w.close()
    }

    /// Lower/upper bounds: `*` → 0..unbounded, otherwise the literal
    /// (default 1..1). The unbounded upper uses the format's
    /// distinguished unlimited literal.
    fn write_bounds<W: Write>(
        &self,
        w: &mut XmlStreamWriter<W>,
        end_id: &ElementId,
        multiplicity: Option<&str>,
    ) -> Result<(), GenerateError> {
        let (lower, upper) = match multiplicity {
            Some("*") => ("0", "*"),
            Some(other) => match other.split_once("..") {
                Some((lo, hi)) => (lo, hi),
                None => (other, other),
            },
            None => ("1", "1"),
        };
        let mut lo = BytesStart::new("lowerValue");
        lo.push_attribute(("xmi:type", "uml:LiteralInteger"));
        lo.push_attribute(("xmi:id", derived_id(end_id, &["lower"]).as_str()));
        lo.push_attribute(("value", lower));
        w.empty(lo)?;
        let mut hi = BytesStart::new("upperValue");
        hi.push_attribute(("xmi:type", "uml:LiteralUnlimitedNatural"));
        hi.push_attribute(("xmi:id", derived_id(end_id, &["upper"]).as_str()));
        hi.push_attribute(("value", upper));
        w.empty(hi)
    }

    /// Dependency edges: builder-derived unresolved uses plus typedef
    /// underlying links. A dependency whose supplier still resolves to
    /// nothing (exempt primitives) is skipped — a dangling `supplier`
    /// would fail validation.
    fn write_dependencies<W: Write>(
        &self,
        w: &mut XmlStreamWriter<W>,
        model: &Model,
        known: &IndexSet<String>,
    ) -> Result<usize, GenerateError> {
        let mut written = 0usize;

        for element in model.elements.values() {
            let ElementData::Typedef(t) = &element.data else {
                continue;
            };
            if t.underlying.is_empty() {
                continue;
            }
            if let Some(supplier) = resolve_type(&t.underlying, model, known) {
                self.write_dependency_edge(w, &element.id, &supplier, &t.underlying)?;
                written += 1;
            }
        }

        for dep in &model.dependencies {
            let Some(client) = model.by_name.get(&dep.owner) else {
                continue;
            };
            match resolve_type(&dep.type_text, model, known) {
                Some(supplier) => {
                    self.write_dependency_edge(w, client, &supplier, &dep.type_text)?;
                    written += 1;
                }
                None => {
                    tracing::trace!(
                        owner = %dep.owner,
                        type_text = %dep.type_text,
                        "dependency supplier exempt from stubbing, edge skipped"
                    );
                }
            }
        }
        Ok(written)
    }

    fn write_dependency_edge<W: Write>(
        &self,
        w: &mut XmlStreamWriter<W>,
        client: &ElementId,
        supplier: &ElementId,
        discriminator: &str,
    ) -> Result<(), GenerateError> {
        let mut dep = BytesStart::new("packagedElement");
        dep.push_attribute(("xmi:type", "uml:Dependency"));
        dep.push_attribute(("xmi:id", derived_id(client, &["dep", discriminator]).as_str()));
        dep.push_attribute(("client", client.as_str()));
        dep.push_attribute(("supplier", supplier.as_str()));
        w.empty(dep)
    }
}

// ----------------------------------------------------------------------
// Free helpers
// ----------------------------------------------------------------------

/// Drop associations whose endpoints never resolved to a live element.
fn prune_associations(model: &mut Model) -> usize {
    let before = model.associations.len();
    let Model { elements, associations, .. } = model;
    associations.retain(|a| elements.contains_key(&a.src) && elements.contains_key(&a.tgt));
    let pruned = before - model.associations.len();
    if pruned > 0 {
        tracing::debug!(pruned, "pruned associations with dead endpoints");
    }
    pruned
}

/// Resolve a type text to the element its outer base names, if any.
fn resolve_type(text: &str, model: &Model, known: &IndexSet<String>) -> Option<ElementId> {
    let analysis = typeexpr::parse(text);
    if analysis.base.is_empty() || analysis.base.contains('(') {
        return None;
    }
    match_name(typeexpr::template_base_of(&analysis.base), known)
        .and_then(|name| model.by_name.get(&name).cloned())
}

fn has_member(model: &Model, owner: &ElementId, member: &str) -> bool {
    model
        .get(owner)
        .and_then(Element::class_data)
        .is_some_and(|c| c.members.iter().any(|m| m.name == member))
}

/// Find a member of `owner` whose type resolves to `wanted`.
fn find_member_typed(
    model: &Model,
    owner: &ElementId,
    wanted: &ElementId,
    known: &IndexSet<String>,
) -> Option<String> {
    let wanted_name = &model.get(wanted)?.qualified_name;
    let class = model.get(owner).and_then(Element::class_data)?;
    class
        .members
        .iter()
        .find(|m| {
            typeexpr::extract_tokens(&m.type_text)
                .iter()
                .any(|t| match_name(&t.name, known).as_deref() == Some(wanted_name.as_str()))
        })
        .map(|m| m.name.clone())
}
