//! # declxmi
//!
//! Converts an externally-produced JSON description of parsed C/C++
//! declarations into a strict, validator-clean XMI model document plus a
//! companion diagram-layout document.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! xmi       → streaming serializer, layout document, reference validator
//!   ↓
//! model     → elements, stable ids, semantic builder, namespace tree
//!   ↓
//! profile   → container/smart-pointer classification rule table
//!   ↓
//! typeexpr  → recursive type-text parser and token matcher
//!   ↓
//! ingest    → permissive JSON → fixed record shapes
//!   ↓
//! config / error → generator configuration, error taxonomy
//! ```
//!
//! One invocation processes one input document start to finish, single
//! threaded: the model is fully built before serialization begins.

// ============================================================================
// MODULES (dependency order: error/config → ingest → typeexpr → profile →
// model → xmi)
// ============================================================================

/// Error taxonomy
mod error;

/// Generator configuration
mod config;

/// Ingestion: permissive input JSON → fixed internal records
pub mod ingest;

/// Type-expression parsing and token matching
pub mod typeexpr;

/// Classification rules and profile overrides
pub mod profile;

/// Semantic model: elements, builder, namespace tree
pub mod model;

/// XMI serialization, layout, validation
pub mod xmi;

pub use config::GeneratorConfig;
pub use error::GenerateError;
pub use ingest::{RawInput, parse_input};
pub use model::{Model, ModelBuilder, NamespaceTree};
pub use profile::{ProfileFormat, ProfileTable};
pub use xmi::{WriteReport, XmiSerializer, validate_bytes, validate_file};

use std::path::Path;

/// Run the whole pipeline: build the model from ingested records, derive
/// the namespace tree, and write both output documents.
///
/// This is the entry point a command-line collaborator calls; everything
/// it needs for an exit decision is in the returned [`WriteReport`] or
/// the error.
pub fn generate(
    input: &RawInput,
    profiles: &ProfileTable,
    config: &GeneratorConfig,
    model_path: &Path,
    layout_path: &Path,
) -> Result<WriteReport, GenerateError> {
    let builder = ModelBuilder::new(profiles);
    let mut model = builder.build(&input.elements);
    tracing::debug!(
        elements = model.element_count(),
        associations = model.associations.len(),
        dependencies = model.dependencies.len(),
        generalizations = model.generalizations.len(),
        "model built"
    );

    let tree = NamespaceTree::build(&mut model);
    XmiSerializer::new(config.clone()).write(&mut model, &tree, model_path, layout_path)
}
