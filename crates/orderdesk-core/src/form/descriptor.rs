//! Schema reflector: derives the ordered leaf fields of a definition.

use serde_json::Value;

use super::definition::{FieldKind, ModelDefinition};

/// Kind of a leaf field as seen by the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorKind {
    /// One text answer.
    Scalar,
    /// Zero or more text answers, terminated by a skip signal.
    ListOfScalar,
}

/// One leaf editable field: dotted path, prompt and kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Dotted path into the entity, e.g. `customer_info.full_name`.
    pub path: String,
    /// Prompt shown to the operator, e.g. `Customer -> Full name`.
    pub prompt: String,
    pub kind: DescriptorKind,
}

impl FieldDescriptor {
    /// The value a slot holds right after it has been prompted for.
    pub fn initial_value(&self) -> Value {
        match self.kind {
            DescriptorKind::Scalar => Value::Null,
            DescriptorKind::ListOfScalar => Value::Array(Vec::new()),
        }
    }
}

/// Derives the ordered leaf field descriptors of `definition`.
///
/// Fields are visited in declaration order; non-editable fields are skipped
/// and nested definitions are expanded in place with a `"{field}."` path
/// prefix and a `"{title} -> "` prompt prefix. The output only depends on the
/// definition, so "first unfilled field" is stable across calls.
pub fn derive_field_paths(definition: &ModelDefinition) -> Vec<FieldDescriptor> {
    let mut out = Vec::new();
    collect(definition, "", "", &mut out);
    out
}

fn collect(
    definition: &ModelDefinition,
    path_prefix: &str,
    prompt_prefix: &str,
    out: &mut Vec<FieldDescriptor>,
) {
    for field in definition.fields().iter().filter(|f| f.editable) {
        let path = format!("{}{}", path_prefix, field.name);
        match &field.kind {
            FieldKind::Nested(nested) => {
                collect(
                    nested,
                    &format!("{}.", path),
                    &format!("{}{} -> ", prompt_prefix, field.title),
                    out,
                );
            }
            FieldKind::List => out.push(FieldDescriptor {
                path,
                prompt: format!("{}{}", prompt_prefix, field.title),
                kind: DescriptorKind::ListOfScalar,
            }),
            FieldKind::Scalar => out.push(FieldDescriptor {
                path,
                prompt: format!("{}{}", prompt_prefix, field.title),
                kind: DescriptorKind::Scalar,
            }),
        }
    }
}
