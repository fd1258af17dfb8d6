//! Draft-07 JSON Schema validation over a typed schema model.
//!
//! ```no_run
//! use json_osv::SchemaDocument;
//!
//! let schema: SchemaDocument = r#"{"type": "object", "required": ["id"]}"#.parse()?;
//! let result = schema.validate(&serde_json::json!({}));
//! assert!(!result.is_valid());
//! # Ok::<(), json_osv::SchemaLoadError>(())
//! ```
pub mod cli;
pub mod emit;
pub mod error;
pub mod jq_exec;
pub mod lower;
pub mod path_de;
pub mod pointer;
pub mod report;
pub mod resolve;
pub mod schema;
pub mod validate;

pub use error::{RefError, SchemaLoadError};
pub use pointer::Pointer;
pub use report::{ValidationResult, Violation, ViolationKind};
pub use schema::{NodeId, NodeKind, SchemaDocument, SchemaNode};
pub use validate::{Options, Validator};
