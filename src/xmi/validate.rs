//! Post-hoc reference validation of a written document.
//!
//! Collects every declared id, then scans every reference-bearing
//! attribute and reports values with no matching declaration. The content
//! scan never raises — an unresolved reference is a finding, not an
//! error; only an unreadable or unparseable document is.

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use rustc_hash::FxHashSet;

use crate::error::GenerateError;

/// Attributes whose values must name a declared id. `memberEnd` holds a
/// space-separated id list; the rest hold a single id.
const REF_ATTRS: &[&str] = &[
    "type",
    "general",
    "client",
    "supplier",
    "association",
    "memberEnd",
    "formal",
    "actual",
    "signature",
    "annotatedElement",
    "idref",
    "xmi:idref",
];

/// One reference whose value is not declared anywhere in the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedRef {
    /// Attribute that carried the reference.
    pub attribute: String,
    /// The undeclared id value.
    pub value: String,
    /// Containing element, `tag` or `tag 'name'`, for diagnosis.
    pub context: String,
}

impl std::fmt::Display for UnresolvedRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}=\"{}\" in {}", self.attribute, self.value, self.context)
    }
}

/// Validate a document file on disk.
pub fn validate_file(path: &Path) -> Result<Vec<UnresolvedRef>, GenerateError> {
    let bytes = std::fs::read(path)?;
    validate_bytes(&bytes)
}

/// Validate document bytes. Empty vec means every reference resolved.
pub fn validate_bytes(input: &[u8]) -> Result<Vec<UnresolvedRef>, GenerateError> {
    let mut declared: FxHashSet<String> = FxHashSet::default();
    let mut references: Vec<UnresolvedRef> = Vec::new();

    let mut reader = Reader::from_reader(input);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                scan_element(e, &mut declared, &mut references)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(GenerateError::xml(format!(
                    "parse error at position {}: {e}",
                    reader.error_position()
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    references.retain(|r| !declared.contains(&r.value));
    Ok(references)
}

fn scan_element(
    e: &BytesStart<'_>,
    declared: &mut FxHashSet<String>,
    references: &mut Vec<UnresolvedRef>,
) -> Result<(), GenerateError> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut context = tag.clone();
    let mut pending: Vec<(String, String)> = Vec::new();

    for attr_result in e.attributes() {
        let attr =
            attr_result.map_err(|e| GenerateError::xml(format!("attribute error: {e}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| GenerateError::xml(format!("attribute value error: {e}")))?
            .to_string();

        match key.as_str() {
            "xmi:id" | "id" => {
                declared.insert(value);
            }
            "name" => {
                context = format!("{tag} '{value}'");
            }
            key if REF_ATTRS.contains(&key) => {
                if key == "memberEnd" {
                    for part in value.split_whitespace() {
                        pending.push((key.to_string(), part.to_string()));
                    }
                } else {
                    pending.push((key.to_string(), value));
                }
            }
            _ => {}
        }
    }

    for (attribute, value) in pending {
        references.push(UnresolvedRef {
            attribute,
            value,
            context: context.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_document_is_empty() {
        let doc = br#"<?xml version="1.0"?>
<xmi:XMI xmlns:xmi="x" xmlns:uml="u">
  <uml:Model xmi:id="m1" name="M">
    <packagedElement xmi:type="uml:Class" xmi:id="c1" name="Foo">
      <ownedAttribute xmi:id="a1" name="other" type="c2"/>
    </packagedElement>
    <packagedElement xmi:type="uml:Class" xmi:id="c2" name="Bar"/>
  </uml:Model>
</xmi:XMI>"#;
        assert!(validate_bytes(doc).unwrap().is_empty());
    }

    #[test]
    fn test_dangling_type_reported_with_context() {
        let doc = br#"<uml:Model xmi:id="m1" name="M">
  <packagedElement xmi:id="c1" name="Foo">
    <ownedAttribute xmi:id="a1" name="bad" type="missing"/>
  </packagedElement>
</uml:Model>"#;
        let refs = validate_bytes(doc).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].attribute, "type");
        assert_eq!(refs[0].value, "missing");
        assert_eq!(refs[0].context, "ownedAttribute 'bad'");
    }

    #[test]
    fn test_member_end_list_split() {
        let doc = br#"<uml:Model xmi:id="m1">
  <packagedElement xmi:id="as1" memberEnd="e1 e2">
    <ownedEnd xmi:id="e1" type="m1" association="as1"/>
  </packagedElement>
</uml:Model>"#;
        let refs = validate_bytes(doc).unwrap();
        // e2 is never declared; e1, m1, as1 are.
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].value, "e2");
    }

    #[test]
    fn test_forward_references_resolve() {
        let doc = br#"<uml:Model xmi:id="m1">
  <packagedElement xmi:id="c1" name="A">
    <generalization xmi:id="g1" general="c2"/>
  </packagedElement>
  <packagedElement xmi:id="c2" name="B"/>
</uml:Model>"#;
        assert!(validate_bytes(doc).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        assert!(validate_bytes(b"<a><b></a>").is_err());
    }
}
