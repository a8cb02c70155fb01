//! Model elements: the tagged union over element kinds.

use super::ids::ElementId;

/// Member/operation visibility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    #[default]
    Private,
    Package,
}

impl Visibility {
    /// Parse a visibility string; unknown spellings get the fallback.
    pub fn parse_or(text: Option<&str>, fallback: Visibility) -> Visibility {
        match text.map(str::trim) {
            Some("public") => Visibility::Public,
            Some("protected") => Visibility::Protected,
            Some("private") => Visibility::Private,
            Some("package") => Visibility::Package,
            _ => fallback,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
            Visibility::Package => "package",
        }
    }
}

/// Parameter direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    In,
    Out,
    InOut,
    Return,
}

impl Direction {
    pub fn parse(text: Option<&str>) -> Direction {
        match text.map(str::trim) {
            Some("out") => Direction::Out,
            Some("inout") | Some("in_out") => Direction::InOut,
            Some("return") => Direction::Return,
            _ => Direction::In,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
            Direction::InOut => "inout",
            Direction::Return => "return",
        }
    }
}

/// One data member.
#[derive(Clone, Debug)]
pub struct Member {
    pub name: String,
    pub type_text: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub multiplicity: Option<String>,
}

/// One operation parameter.
#[derive(Clone, Debug)]
pub struct Parameter {
    pub name: String,
    pub type_text: String,
    pub direction: Direction,
    pub default: Option<String>,
}

/// One operation.
#[derive(Clone, Debug)]
pub struct Operation {
    pub name: String,
    pub return_type: Option<String>,
    pub params: Vec<Parameter>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_const: bool,
    pub is_virtual: bool,
}

impl Operation {
    /// Signature discriminator used in id derivation so sibling overloads
    /// stay distinguishable before the ordinal kicks in.
    pub fn signature(&self) -> String {
        let params: Vec<&str> = self.params.iter().map(|p| p.type_text.as_str()).collect();
        format!("{}({})", self.name, params.join(","))
    }
}

/// Declared base class reference (unresolved name form).
#[derive(Clone, Debug)]
pub struct BaseRef {
    pub name: String,
    pub access: String,
    pub is_virtual: bool,
    pub is_final: bool,
}

/// Payload for class-like elements (Class and Interface).
#[derive(Clone, Debug, Default)]
pub struct ClassData {
    pub members: Vec<Member>,
    pub operations: Vec<Operation>,
    pub template_params: Vec<String>,
    pub bases: Vec<BaseRef>,
    pub is_abstract: bool,
}

/// Payload for enumerations.
#[derive(Clone, Debug, Default)]
pub struct EnumData {
    pub literals: Vec<String>,
}

/// Payload for type aliases.
#[derive(Clone, Debug, Default)]
pub struct TypedefData {
    pub underlying: String,
}

/// Kind-specific element payload.
///
/// Consumption sites match exhaustively: a Datatype structurally cannot
/// carry members, and an Enum's literals live nowhere else.
#[derive(Clone, Debug)]
pub enum ElementData {
    Class(ClassData),
    Interface(ClassData),
    Enum(EnumData),
    Typedef(TypedefData),
    Datatype,
    Package,
    Artifact,
}

impl ElementData {
    /// Short kind name for logging and diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ElementData::Class(_) => "class",
            ElementData::Interface(_) => "interface",
            ElementData::Enum(_) => "enum",
            ElementData::Typedef(_) => "typedef",
            ElementData::Datatype => "datatype",
            ElementData::Package => "package",
            ElementData::Artifact => "artifact",
        }
    }

    /// The `xmi:type` value this kind serializes under.
    pub fn xmi_type(&self) -> &'static str {
        match self {
            ElementData::Class(_) => "uml:Class",
            ElementData::Interface(_) => "uml:Interface",
            ElementData::Enum(_) => "uml:Enumeration",
            ElementData::Typedef(_) => "uml:DataType",
            ElementData::Datatype => "uml:DataType",
            ElementData::Package => "uml:Package",
            ElementData::Artifact => "uml:Artifact",
        }
    }
}

/// One modeled entity.
#[derive(Clone, Debug)]
pub struct Element {
    pub id: ElementId,
    /// Canonical qualified name (`ns::Inner::Name`).
    pub qualified_name: String,
    /// Last segment of the qualified name.
    pub name: String,
    /// Leading segments; empty for root-level elements.
    pub namespace: String,
    pub is_stub: bool,
    /// Back-link to the template this element instantiates, when the
    /// chosen name carried an argument list.
    pub instantiation_of: Option<String>,
    pub instantiation_args: Vec<String>,
    /// Original extractor fields this tool has no model for.
    pub metadata: serde_json::Value,
    pub data: ElementData,
}

impl Element {
    pub fn new(id: ElementId, qualified_name: impl Into<String>, data: ElementData) -> Self {
        let qualified_name = qualified_name.into();
        let (namespace, name) = split_qualified(&qualified_name);
        Self {
            id,
            qualified_name,
            name,
            namespace,
            is_stub: false,
            instantiation_of: None,
            instantiation_args: Vec::new(),
            metadata: serde_json::Value::Null,
            data,
        }
    }

    /// Class-like payload, when this element has one.
    pub fn class_data(&self) -> Option<&ClassData> {
        match &self.data {
            ElementData::Class(c) | ElementData::Interface(c) => Some(c),
            _ => None,
        }
    }

    pub fn class_data_mut(&mut self) -> Option<&mut ClassData> {
        match &mut self.data {
            ElementData::Class(c) | ElementData::Interface(c) => Some(c),
            _ => None,
        }
    }
}

/// Split a qualified name into `(namespace, last segment)`.
pub fn split_qualified(qualified: &str) -> (String, String) {
    match qualified.rfind("::") {
        Some(pos) => (qualified[..pos].to_string(), qualified[pos + 2..].to_string()),
        None => (String::new(), qualified.to_string()),
    }
}
