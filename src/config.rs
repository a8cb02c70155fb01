//! Generator configuration.
//!
//! One explicit value threaded into the serializer constructor — there is
//! no process-wide default instance.

/// Configuration for model generation and layout emission.
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// Name of the root model node.
    pub model_name: String,

    /// Emit `ownedTemplateSignature` / `templateBinding` nodes for
    /// template classes and instantiations.
    ///
    /// Even when set, a signature or binding is omitted whenever any
    /// referenced parameter or argument id cannot be guaranteed present
    /// in the output — consuming tools reject dangling signature refs.
    pub emit_template_bindings: bool,

    /// Treat structural invariant violations (Enum without literals,
    /// Datatype with members) as hard errors instead of logged recoveries.
    pub strict: bool,

    /// Number of grid columns in the layout document.
    pub columns: u32,
    /// Horizontal grid step, in layout units.
    pub step_x: i32,
    /// Vertical grid step, in layout units.
    pub step_y: i32,
    /// Margin from the diagram origin to the first node.
    pub margin: i32,
    /// Fixed node width.
    pub node_width: i32,
    /// Fixed node height.
    pub node_height: i32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model_name: "Model".to_string(),
            emit_template_bindings: false,
            strict: false,
            columns: 8,
            step_x: 220,
            step_y: 160,
            margin: 40,
            node_width: 180,
            node_height: 120,
        }
    }
}

impl GeneratorConfig {
    /// Enable strict validation.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Enable template signature/binding emission.
    pub fn with_template_bindings(mut self, emit: bool) -> Self {
        self.emit_template_bindings = emit;
        self
    }

    /// Set the root model name.
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }
}
