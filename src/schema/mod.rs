//! Native schema tree: typed field descriptors, normalization, and merging.
//!
//! A [`SchemaDefinition`] describes one sub-tree of the project configuration:
//! leaf descriptors carry a type, default, and description; object descriptors
//! carry named child properties. Fragments from every layer, module, and
//! adapted Standard Schema are normalized into this form before merging.

mod definition;
mod json_schema;
mod merge;

pub use definition::{SchemaDefinition, SchemaType};
pub use json_schema::{fragment_of, from_json_schema};
pub use merge::{merge, merge_all};
