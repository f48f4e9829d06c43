//! Form domain module.
//!
//! Declarative model definitions and the machinery the conversation uses to
//! walk them one leaf field at a time.
//!
//! # Module Structure
//!
//! - `definition`: `ModelDefinition`, `FieldDef`, `FieldKind` and the builder
//! - `descriptor`: `FieldDescriptor` and `derive_field_paths` (schema reflector)
//! - `values`: dotted-path flattening and unflattening of JSON values

mod definition;
mod descriptor;
pub mod values;

pub use definition::{FieldDef, FieldKind, ModelDefinition, ModelDefinitionBuilder};
pub use descriptor::{DescriptorKind, FieldDescriptor, derive_field_paths};
pub use values::FlatValues;
