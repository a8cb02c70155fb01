//! Fixed internal record shapes for the permissive input schema.

use serde::Deserialize;

/// The whole input document: a list of generic element records.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawInput {
    #[serde(default, alias = "declarations", alias = "records")]
    pub elements: Vec<RawElement>,
}

/// One parsed declaration as the extractor saw it.
///
/// Every field is optional; identity selection and kind classification
/// happen in the builder with conservative defaults.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawElement {
    #[serde(default, alias = "qualifiedName", alias = "full_name")]
    pub qualified_name: Option<String>,

    #[serde(default, alias = "displayName")]
    pub display_name: Option<String>,

    #[serde(default, alias = "shortName", alias = "short_name")]
    pub name: Option<String>,

    /// Kind hint: `class`, `struct`, `interface`, `enum`, `typedef`, ...
    #[serde(default, alias = "type", alias = "element_type")]
    pub kind: Option<String>,

    #[serde(default, alias = "isInterface")]
    pub is_interface: Option<bool>,

    #[serde(default, alias = "isEnum")]
    pub is_enum: Option<bool>,

    #[serde(default, alias = "isAbstract")]
    pub is_abstract: Option<bool>,

    #[serde(default, alias = "fields", alias = "attributes")]
    pub members: Vec<RawMember>,

    #[serde(default, alias = "operations", alias = "functions", alias = "member_functions")]
    pub methods: Vec<RawOperation>,

    #[serde(default, alias = "templateParameters", alias = "template_parameters")]
    pub template_params: Vec<String>,

    #[serde(default, alias = "enumerators", alias = "literals", alias = "values")]
    pub enum_literals: Vec<RawLiteral>,

    #[serde(
        default,
        alias = "underlying_type",
        alias = "underlyingType",
        alias = "aliased_type"
    )]
    pub underlying: Option<String>,

    #[serde(default, alias = "base_classes", alias = "baseClasses", alias = "superclasses")]
    pub bases: Vec<RawBase>,

    /// Everything the extractor emitted that this tool has no field for.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One data member / field.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawMember {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, alias = "type", alias = "data_type", alias = "type_text")]
    pub type_name: Option<String>,

    #[serde(default, alias = "access")]
    pub visibility: Option<String>,

    #[serde(default, alias = "static", alias = "isStatic")]
    pub is_static: bool,

    #[serde(default)]
    pub multiplicity: Option<String>,
}

/// One member function.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawOperation {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, alias = "returns", alias = "returnType", alias = "result_type")]
    pub return_type: Option<String>,

    #[serde(default, alias = "parameters", alias = "arguments", alias = "args")]
    pub params: Vec<RawParameter>,

    #[serde(default, alias = "access")]
    pub visibility: Option<String>,

    #[serde(default, alias = "static", alias = "isStatic")]
    pub is_static: bool,

    #[serde(
        default,
        alias = "is_pure_virtual",
        alias = "isAbstract",
        alias = "pure_virtual"
    )]
    pub is_abstract: bool,

    #[serde(default, alias = "isConst", alias = "const")]
    pub is_const: bool,

    #[serde(default, alias = "isVirtual", alias = "virtual")]
    pub is_virtual: bool,
}

/// One operation parameter.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawParameter {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, alias = "type", alias = "data_type", alias = "type_text")]
    pub type_name: Option<String>,

    /// `in`, `out`, `inout`; anything else falls back to `in`.
    #[serde(default)]
    pub direction: Option<String>,

    #[serde(default, alias = "default_value", alias = "defaultValue")]
    pub default: Option<String>,
}

/// Enumerator: either a bare name or an object with a name.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RawLiteral {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        value: Option<serde_json::Value>,
    },
}

impl RawLiteral {
    pub fn name(&self) -> &str {
        match self {
            RawLiteral::Name(n) => n,
            RawLiteral::Detailed { name, .. } => name,
        }
    }
}

/// Base class: either a bare name or an object with access/flags.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RawBase {
    Name(String),
    Detailed {
        name: String,
        #[serde(default, alias = "visibility")]
        access: Option<String>,
        #[serde(default, alias = "isVirtual", alias = "virtual")]
        is_virtual: bool,
        #[serde(default, alias = "isFinal", alias = "final")]
        is_final: bool,
    },
}

impl RawBase {
    pub fn name(&self) -> &str {
        match self {
            RawBase::Name(n) => n,
            RawBase::Detailed { name, .. } => name,
        }
    }

    pub fn access(&self) -> &str {
        match self {
            RawBase::Name(_) => "public",
            RawBase::Detailed { access, .. } => access.as_deref().unwrap_or("public"),
        }
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self, RawBase::Detailed { is_virtual: true, .. })
    }

    pub fn is_final(&self) -> bool {
        matches!(self, RawBase::Detailed { is_final: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_element() {
        let input: RawInput = serde_json::from_str(
            r#"{"elements":[{"name":"Point","kind":"class","members":[{"name":"x","type":"int"}]}]}"#,
        )
        .unwrap();
        assert_eq!(input.elements.len(), 1);
        let e = &input.elements[0];
        assert_eq!(e.name.as_deref(), Some("Point"));
        assert_eq!(e.kind.as_deref(), Some("class"));
        assert_eq!(e.members[0].type_name.as_deref(), Some("int"));
    }

    #[test]
    fn test_synonymous_field_names() {
        let input: RawInput = serde_json::from_str(
            r#"{"elements":[{
                "qualifiedName":"geo::Shape",
                "fields":[{"name":"area","data_type":"double","access":"protected"}],
                "operations":[{"name":"draw","returns":"void","arguments":[{"name":"ctx","type":"Canvas&"}]}],
                "base_classes":["Drawable"]
            }]}"#,
        )
        .unwrap();
        let e = &input.elements[0];
        assert_eq!(e.qualified_name.as_deref(), Some("geo::Shape"));
        assert_eq!(e.members[0].visibility.as_deref(), Some("protected"));
        assert_eq!(e.methods[0].return_type.as_deref(), Some("void"));
        assert_eq!(e.methods[0].params[0].type_name.as_deref(), Some("Canvas&"));
        assert_eq!(e.bases[0].name(), "Drawable");
    }

    #[test]
    fn test_detailed_base_and_literal() {
        let input: RawInput = serde_json::from_str(
            r#"{"elements":[
                {"name":"Derived","bases":[{"name":"Base","access":"private","virtual":true}]},
                {"name":"Color","kind":"enum","enumerators":[{"name":"Red","value":1},"Green"]}
            ]}"#,
        )
        .unwrap();
        let base = &input.elements[0].bases[0];
        assert_eq!(base.access(), "private");
        assert!(base.is_virtual());
        let lits = &input.elements[1].enum_literals;
        assert_eq!(lits[0].name(), "Red");
        assert_eq!(lits[1].name(), "Green");
    }

    #[test]
    fn test_unknown_fields_retained() {
        let input: RawInput = serde_json::from_str(
            r#"{"elements":[{"name":"Foo","source_file":"foo.hpp","line":42}]}"#,
        )
        .unwrap();
        let extra = &input.elements[0].extra;
        assert_eq!(extra["source_file"], "foo.hpp");
        assert_eq!(extra["line"], 42);
    }
}
