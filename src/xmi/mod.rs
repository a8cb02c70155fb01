//! XMI serialization, layout emission, and reference validation.
//!
//! ```text
//! Model + NamespaceNode
//!     │
//!     ▼ XmiSerializer::write      (stub pre-pass, association planning,
//!     │                            streamed two-namespace emission)
//!     ├─► model document (.xmi)
//!     └─► layout document
//!             │
//!             ▼ validate_file     (declared ids vs. reference attrs)
//!         [UnresolvedRef]
//! ```

mod layout;
mod serializer;
mod validate;
mod writer;

pub use layout::write_layout;
pub use serializer::{WriteReport, XmiSerializer, ns};
pub use validate::{UnresolvedRef, validate_bytes, validate_file};
pub use writer::XmlStreamWriter;
