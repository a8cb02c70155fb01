//! Type-expression parsing.
//!
//! Pure, stateless parsing of raw C/C++ type text into structured tokens
//! and analyses. The input comes from an external extraction tool and may
//! be truncated or corrupted; nothing in this module panics on malformed
//! text — the worst case is a partial or empty analysis.
//!
//! ```text
//! "std::map<std::string, std::vector<int>>"
//!     │
//!     ▼ parse
//! TypeAnalysis { base: "std::map", template_args: [String, vector<int>] }
//!     │
//!     ▼ extract_tokens
//! [std::map, std::string, std::vector, int]
//! ```

mod matcher;
mod parser;

pub use matcher::{match_known, match_name};
pub use parser::{
    TypeAnalysis, TypeToken, extract_tokens, is_plausible_argument, parse, split_template_args,
    strip_qualifiers, template_base_of, template_parts,
};
