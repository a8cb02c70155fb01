//! Ingestion of the external extraction tool's JSON.
//!
//! The input schema is permissive by design: the extractor emits
//! synonymous field names for qualified/display names, kind hints,
//! members, methods, template parameters, enumerator lists, and base
//! classes. All of that is absorbed here, once, into fixed record shapes
//! — the model builder never does optional-field lookups against raw
//! JSON. Unknown fields survive as opaque metadata on each record.

mod record;

pub use record::{
    RawBase, RawElement, RawInput, RawLiteral, RawMember, RawOperation, RawParameter,
};

use crate::error::GenerateError;

/// Parse the extraction tool's JSON document.
pub fn parse_input(text: &str) -> Result<RawInput, GenerateError> {
    serde_json::from_str(text).map_err(|e| GenerateError::json(e.to_string()))
}
