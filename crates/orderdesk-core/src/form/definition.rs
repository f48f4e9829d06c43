//! Declarative model definitions.
//!
//! A `ModelDefinition` is the statically declared shape of an editable entity:
//! an ordered list of fields, each with a display title, an editability flag
//! and a kind. Definitions are built once at startup through
//! [`ModelDefinitionBuilder`], which rejects configuration defects up front.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{OrderdeskError, Result};

/// The kind of value a field holds.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// A single free-form text value.
    Scalar,
    /// An ordered sequence of text values.
    List,
    /// A structured sub-model whose leaves are edited individually.
    Nested(Arc<ModelDefinition>),
}

/// One declared field of a model definition.
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Field name as it appears in the serialized entity.
    pub name: &'static str,
    /// Human-readable title used for prompts and rendering.
    pub title: &'static str,
    pub kind: FieldKind,
    /// Whether the operator is asked for this field when filling the form.
    pub editable: bool,
}

/// A named structured type with an ordered set of fields.
#[derive(Debug, Clone)]
pub struct ModelDefinition {
    name: &'static str,
    fields: Vec<FieldDef>,
}

impl ModelDefinition {
    /// Starts building a definition with the given name.
    pub fn builder(name: &'static str) -> ModelDefinitionBuilder {
        ModelDefinitionBuilder {
            name,
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Builder for [`ModelDefinition`].
///
/// Fields are kept in the order they are added; that order is the prompt order.
#[derive(Debug)]
pub struct ModelDefinitionBuilder {
    name: &'static str,
    fields: Vec<FieldDef>,
}

impl ModelDefinitionBuilder {
    /// Adds an editable free-text field.
    pub fn scalar(self, name: &'static str, title: &'static str) -> Self {
        self.push(name, title, FieldKind::Scalar, true)
    }

    /// Adds an editable list-of-text field.
    pub fn list(self, name: &'static str, title: &'static str) -> Self {
        self.push(name, title, FieldKind::List, true)
    }

    /// Adds an editable nested sub-model.
    pub fn nested(
        self,
        name: &'static str,
        title: &'static str,
        definition: Arc<ModelDefinition>,
    ) -> Self {
        self.push(name, title, FieldKind::Nested(definition), true)
    }

    /// Adds a field that is part of the entity but never prompted for.
    pub fn hidden(self, name: &'static str, title: &'static str, kind: FieldKind) -> Self {
        self.push(name, title, kind, false)
    }

    fn push(mut self, name: &'static str, title: &'static str, kind: FieldKind, editable: bool) -> Self {
        self.fields.push(FieldDef {
            name,
            title,
            kind,
            editable,
        });
        self
    }

    /// Validates and finishes the definition.
    ///
    /// # Errors
    ///
    /// Returns `OrderdeskError::Config` when a field has an empty name or
    /// title, or when a field name is declared twice.
    pub fn build(self) -> Result<ModelDefinition> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(OrderdeskError::config(format!(
                    "definition '{}' declares a field without a name",
                    self.name
                )));
            }
            if field.title.trim().is_empty() {
                return Err(OrderdeskError::config(format!(
                    "field '{}.{}' has no display title",
                    self.name, field.name
                )));
            }
            if field.name.contains('.') {
                return Err(OrderdeskError::config(format!(
                    "field name '{}.{}' must not contain '.'",
                    self.name, field.name
                )));
            }
            if !seen.insert(field.name) {
                return Err(OrderdeskError::config(format!(
                    "field '{}.{}' is declared twice",
                    self.name, field.name
                )));
            }
        }

        Ok(ModelDefinition {
            name: self.name,
            fields: self.fields,
        })
    }
}
